pub mod dashboard;
pub mod form;
pub mod login;

use ratatui::{style::Style, text::Span};

use crate::ui::theme::Theme;

/// `key action` pairs rendered as a hint bar.
pub fn hint_spans(hints: &[(&'static str, &'static str)], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(*key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {action}")));
    }
    spans
}
