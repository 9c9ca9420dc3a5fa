use engine::Slice;
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::ui::{components::money::bucket_color, theme::Theme};

/// One stacked bar of `width` cells, a segment per slice.
///
/// Every slice gets at least one cell so thin slices stay visible.
pub fn breakdown_bar(slices: &[Slice], width: usize, theme: &Theme) -> Line<'static> {
    let cells = segment_widths(slices, width);
    let spans = slices
        .iter()
        .zip(cells)
        .map(|(slice, cells)| {
            Span::styled(
                "█".repeat(cells),
                Style::default().fg(bucket_color(slice.bucket, theme)),
            )
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

/// Legend line: bucket name and percentage, when the slice is wide enough
/// to be labelled.
pub fn breakdown_legend(slices: &[Slice], theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    for slice in slices {
        if !spans.is_empty() {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(
            "■ ",
            Style::default().fg(bucket_color(slice.bucket, theme)),
        ));
        spans.push(Span::styled(
            slice.bucket.label(),
            Style::default().fg(theme.text),
        ));
        if let Some(label) = slice.percent_label() {
            spans.push(Span::styled(
                format!(" {label}"),
                Style::default().fg(theme.dim),
            ));
        }
    }
    Line::from(spans)
}

fn segment_widths(slices: &[Slice], width: usize) -> Vec<usize> {
    if slices.is_empty() || width == 0 {
        return vec![0; slices.len()];
    }

    let mut widths: Vec<usize> = slices
        .iter()
        .map(|slice| ((slice.share * width as f64).round() as usize).max(1))
        .collect();

    // Rounding can overshoot; take the excess from the widest segment.
    let total: usize = widths.iter().sum();
    if total > width {
        if let Some(widest) = widths.iter_mut().max() {
            *widest = widest.saturating_sub(total - width);
        }
    }
    widths
}
