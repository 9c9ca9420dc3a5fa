use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};

use crate::{
    app::{FormField, FormState},
    ui::{
        components::{card::Card, centered_box},
        screens::hint_spans,
        theme::Theme,
    },
};

/// Add/edit form drawn over the dashboard.
pub fn render(frame: &mut Frame<'_>, area: Rect, form: &FormState, theme: &Theme) {
    let height = FormField::ALL.len() as u16 + 6;
    let rect = centered_box(56.min(area.width), height.min(area.height), area);
    frame.render_widget(Clear, rect);

    let card = Card::new(form.title_label().trim(), theme).focused(true);
    let inner = card.inner(rect);
    frame.render_widget(card.block(), rect);

    let mut constraints = vec![Constraint::Length(1); FormField::ALL.len()];
    constraints.push(Constraint::Length(1)); // Spacer
    constraints.push(Constraint::Length(1)); // Message
    constraints.push(Constraint::Length(1)); // Hints
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .horizontal_margin(1)
        .split(inner);

    for (row, field) in rows.iter().zip(FormField::ALL) {
        frame.render_widget(Paragraph::new(field_line(form, field, theme)), *row);
    }

    let n = FormField::ALL.len();
    if let Some(message) = &form.message {
        frame.render_widget(
            Paragraph::new(Span::styled(
                message.as_str(),
                Style::default().fg(theme.error),
            )),
            rows[n + 1],
        );
    }

    let hints = hint_spans(
        &[
            ("Tab", "next"),
            ("Enter", "save"),
            ("Esc", "cancel"),
        ],
        theme,
    );
    frame.render_widget(Paragraph::new(Line::from(hints)), rows[n + 2]);
}

fn field_line(form: &FormState, field: FormField, theme: &Theme) -> Line<'static> {
    let focused = form.focus == field;
    let label_style = if focused {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.dim)
    };

    let mut value = form.value(field).to_string();
    match field {
        FormField::Kind if focused => value.push_str("  (space to toggle)"),
        FormField::DueDate if value.is_empty() && !focused => value.push_str("YYYY-MM-DD"),
        _ if focused => value.push('│'),
        _ => {}
    }

    Line::from(vec![
        Span::styled(format!("{:<10}", field.label()), label_style),
        Span::styled(value, Style::default().fg(theme.text)),
    ])
}
