use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{AppState, LoginField},
    ui::{components::centered_box, screens::hint_spans, theme::Theme},
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let card_area = centered_box(40, 7, area);
    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .title(" finsync login ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Email
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Password
        ])
        .margin(1)
        .split(inner);

    let login = &state.login;
    render_input(
        frame,
        rows[0],
        "Email",
        &login.email,
        login.focus == LoginField::Email,
        theme,
    );
    render_input(
        frame,
        rows[2],
        "Password",
        &mask_password(&login.password),
        login.focus == LoginField::Password,
        theme,
    );

    let below = |offset: u16| Rect {
        x: card_area.x,
        y: card_area.y.saturating_add(card_area.height + offset),
        width: card_area.width,
        height: 1,
    };

    if let Some(message) = &login.message {
        frame.render_widget(
            Paragraph::new(Span::styled(
                message.as_str(),
                Style::default().fg(theme.error),
            ))
            .alignment(Alignment::Center),
            below(1).intersection(area),
        );
    }

    let hints = hint_spans(
        &[("Tab", "switch"), ("Enter", "sign in"), ("Ctrl+C", "quit")],
        theme,
    );
    frame.render_widget(
        Paragraph::new(Line::from(hints)).alignment(Alignment::Center),
        below(2).intersection(area),
    );
}

fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    theme: &Theme,
) {
    let cursor = if focused { "│" } else { "" };
    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.dim)
    };

    let line = Line::from(vec![
        Span::styled(format!("{label:<10}"), Style::default().fg(theme.dim)),
        Span::styled(format!("{value}{cursor}"), style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// One bullet per character.
fn mask_password(password: &str) -> String {
    "•".repeat(password.chars().count())
}
