pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::Frame;

use crate::{
    app::{AppState, Screen},
    provider::RecordsState,
};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
pub use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState, records: &RecordsState) {
    let area = frame.area();
    let theme = Theme::default();

    match state.screen {
        Screen::Login => screens::login::render(frame, area, state, &theme),
        Screen::Dashboard => screens::dashboard::render(frame, area, state, records, &theme),
        Screen::Form => {
            screens::dashboard::render(frame, area, state, records, &theme);
            if let Some(form) = &state.form {
                screens::form::render(frame, area, form, &theme);
            }
        }
    }

    components::toast::render(frame, area, state.toast.as_ref(), &theme);
}
