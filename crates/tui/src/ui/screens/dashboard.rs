use api_types::record::Record;
use chrono_tz::Tz;
use engine::{Summary, SummaryBucket};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use crate::{
    app::AppState,
    provider::RecordsState,
    ui::{
        components::{
            card::{Card, StatCard},
            charts,
            money::{bucket_amount, record_amount},
        },
        screens::hint_spans,
        theme::Theme,
    },
};

const DATE_FORMAT: &str = "%d %b %Y";
const EMPTY_STATE: &str = "Default values are shown until you add your first record";

pub fn render(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    records: &RecordsState,
    theme: &Theme,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Welcome
            Constraint::Length(4), // Stat cards
            Constraint::Length(4), // Breakdown
            Constraint::Min(3),    // Records
            Constraint::Length(1), // Status
            Constraint::Length(1), // Hints
        ])
        .split(area);

    let summary = Summary::from_records(&records.records);

    render_welcome(frame, layout[0], state, theme);
    render_stats(frame, layout[1], &summary, theme);
    render_breakdown(frame, layout[2], &summary, theme);
    render_records(frame, layout[3], state, records, theme);
    render_status(frame, layout[4], state, records, &summary, theme);

    let hints = hint_spans(
        &[
            ("j/k", "select"),
            ("a", "add"),
            ("e", "edit"),
            ("d", "delete"),
            ("r", "refresh"),
            ("x", "log out"),
            ("q", "quit"),
        ],
        theme,
    );
    frame.render_widget(Paragraph::new(Line::from(hints)), layout[5]);
}

fn render_welcome(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let email = state
        .session
        .as_ref()
        .map(|session| session.email.as_str())
        .unwrap_or("-");
    let line = Line::from(vec![
        Span::styled("finsync", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled("Signed in as ", Style::default().fg(theme.dim)),
        Span::styled(email.to_string(), Style::default().fg(theme.text)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_stats(frame: &mut Frame<'_>, area: Rect, summary: &Summary, theme: &Theme) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    let buckets = [
        SummaryBucket::Income,
        SummaryBucket::Expense,
        SummaryBucket::NetProfit,
    ];
    for (column, bucket) in columns.iter().zip(buckets) {
        let value = bucket_amount(summary.value(bucket), bucket, theme);
        let mut card = StatCard::new(bucket.label(), value, theme);
        if summary.shows_default(bucket) {
            card = card.subtitle("default");
        }
        card.render(frame, *column);
    }
}

fn render_breakdown(frame: &mut Frame<'_>, area: Rect, summary: &Summary, theme: &Theme) {
    let card = Card::new("Breakdown", theme);
    let inner = card.inner(area);
    let slices = summary.breakdown();

    let lines = if slices.is_empty() {
        vec![Line::from(Span::styled(
            "Nothing to chart",
            Style::default().fg(theme.dim),
        ))]
    } else {
        vec![
            charts::breakdown_bar(&slices, inner.width as usize, theme),
            charts::breakdown_legend(&slices, theme),
        ]
    };
    card.render_with(frame, area, Paragraph::new(lines));
}

fn render_records(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    records: &RecordsState,
    theme: &Theme,
) {
    let title = format!("Records ({})", records.records.len());
    let card = Card::new(&title, theme).focused(state.form.is_none());
    let inner = card.inner(area);
    frame.render_widget(card.block(), area);

    if records.records.is_empty() {
        let text = if records.loading {
            "Loading records..."
        } else {
            EMPTY_STATE
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme.dim))),
            inner,
        );
        return;
    }

    let items: Vec<ListItem<'_>> = records
        .records
        .iter()
        .map(|record| ListItem::new(record_line(record, state.timezone, theme)))
        .collect();
    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("› ");

    let mut list_state = ListState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(list, inner, &mut list_state);
}

fn record_line(record: &Record, tz: Tz, theme: &Theme) -> Line<'static> {
    let date = record
        .display_date()
        .with_timezone(&tz)
        .format(DATE_FORMAT)
        .to_string();

    let mut spans = vec![
        Span::styled(format!("{date:<13}"), Style::default().fg(theme.dim)),
        Span::styled(format!("{:<28}", record.title), Style::default().fg(theme.text)),
        record_amount(record.amount, record.kind, theme),
    ];
    if let Some(notes) = &record.notes {
        spans.push(Span::styled(
            format!("  {notes}"),
            Style::default().fg(theme.dim),
        ));
    }
    Line::from(spans)
}

fn render_status(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &AppState,
    records: &RecordsState,
    summary: &Summary,
    theme: &Theme,
) {
    let dim = Style::default().fg(theme.dim);
    let line = if let Some(busy) = state.busy {
        Line::from(Span::styled(busy, dim))
    } else if let Some(error) = &records.error {
        Line::from(Span::styled(error.clone(), Style::default().fg(theme.error)))
    } else if records.loading {
        Line::from(Span::styled("Loading...", dim))
    } else if summary.is_default() && !records.records.is_empty() {
        Line::from(Span::styled(
            "Totals marked default have no records yet",
            dim,
        ))
    } else {
        Line::default()
    };
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use api_types::record::RecordType;

    use super::*;

    #[test]
    fn record_line_shows_due_date_in_timezone() {
        let record = Record {
            id: "1".to_string(),
            title: "Rent".to_string(),
            amount: 15_000,
            kind: RecordType::Expense,
            created_at: "2026-01-01T00:00:00Z".parse().unwrap(),
            due_date: Some("2026-01-31T20:00:00Z".parse().unwrap()),
            notes: Some("flat".to_string()),
        };
        let text: String = record_line(&record, chrono_tz::Asia::Kolkata, &Theme::default())
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect();

        assert!(text.starts_with("01 Feb 2026"));
        assert!(text.contains("Rent"));
        assert!(text.contains("-₹15,000"));
        assert!(text.ends_with("flat"));
    }
}
