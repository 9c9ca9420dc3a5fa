use std::time::{Duration, Instant};

use api_types::record::{Record, RecordPatch};
use chrono_tz::Tz;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use crate::{
    client::{Client, ClientError},
    config::AppConfig,
    error::{AppError, Result},
    provider::{RecordDraft, RecordsApi, RecordsProvider},
    session::Session,
    ui,
};

pub use form::{FormField, FormMode, FormState};

mod form;

const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

#[derive(Debug)]
pub struct LoginState {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub message: Option<String>,
}

impl Default for LoginState {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            focus: LoginField::Email,
            message: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    pub shown_at: Instant,
}

/// UI state. Records live in the provider and are passed to the renderer
/// next to this.
#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub login: LoginState,
    pub session: Option<Session>,
    pub selected: usize,
    pub form: Option<FormState>,
    pub toast: Option<ToastState>,
    /// Label of the request waiting to run, if any.
    pub busy: Option<&'static str>,
    pub timezone: Tz,
}

impl AppState {
    fn new(session: Option<Session>, timezone: Tz) -> Self {
        let screen = if session.is_some() {
            Screen::Dashboard
        } else {
            Screen::Login
        };
        Self {
            screen,
            login: LoginState::default(),
            session,
            selected: 0,
            form: None,
            toast: None,
            busy: None,
            timezone,
        }
    }

    fn toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(ToastState {
            message: message.into(),
            level,
            shown_at: Instant::now(),
        });
    }

    fn clamp_selection(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

pub struct App<A = Client> {
    config: AppConfig,
    provider: RecordsProvider<A>,
    pub state: AppState,
    pending: Option<Pending>,
    loaded: bool,
    should_quit: bool,
}

impl App<Client> {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url, config.request_timeout())?;
        // The marker only gates the dashboard; an unreadable one means
        // signing in again.
        let session = Session::load(&config.session_file).unwrap_or_else(|err| {
            tracing::warn!("ignoring session marker {}: {err}", config.session_file);
            None
        });
        Self::with_api(config, client, session)
    }
}

impl<A: RecordsApi> App<A> {
    /// Builds the app around `api`, starting on the dashboard when a session
    /// marker exists.
    pub fn with_api(config: AppConfig, api: A, session: Option<Session>) -> Result<Self> {
        let timezone = config.timezone()?;
        Ok(Self {
            config,
            provider: RecordsProvider::new(api),
            state: AppState::new(session, timezone),
            pending: None,
            loaded: false,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            self.queue_first_load();
            self.expire_toast();

            terminal
                .draw(|frame| ui::render(frame, &self.state, self.provider.state()))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            // The frame above already shows the queued work as in progress.
            if self.pending.is_some() {
                self.run_pending().await;
                continue;
            }

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key).await?;
                    }
                }
            }
        }

        Ok(())
    }

    /// First refresh, queued once when the dashboard is entered.
    fn queue_first_load(&mut self) {
        if self.loaded || self.state.screen != Screen::Dashboard {
            return;
        }
        self.loaded = true;
        self.queue_refresh();
    }

    fn queue_refresh(&mut self) {
        let token = self.provider.start_refresh();
        self.queue(Pending::Refresh(token), None);
    }

    fn queue(&mut self, work: Pending, busy: Option<&'static str>) {
        self.state.busy = busy;
        self.pending = Some(work);
    }

    /// Runs the queued request and applies its outcome to the screens.
    async fn run_pending(&mut self) {
        let Some(work) = self.pending.take() else {
            return;
        };

        match work {
            Pending::Refresh(token) => self.provider.complete_refresh(token).await,
            Pending::Add(draft) => {
                let outcome = self.provider.add(draft).await;
                self.form_saved(outcome);
            }
            Pending::Update(id, patch) => {
                let outcome = self.provider.update(&id, patch).await;
                self.form_saved(outcome);
            }
            Pending::Remove { id, title } => match self.provider.remove(&id).await {
                Ok(()) => self
                    .state
                    .toast(ToastLevel::Success, format!("Deleted \"{title}\"")),
                Err(err) => self.state.toast(ToastLevel::Error, err.to_string()),
            },
        }

        self.state.busy = None;
        self.state.clamp_selection(self.provider.records().len());
    }

    fn form_saved(&mut self, outcome: std::result::Result<Record, ClientError>) {
        match outcome {
            Ok(record) => {
                self.close_form();
                self.state
                    .toast(ToastLevel::Success, format!("Saved \"{}\"", record.title));
            }
            Err(err) => {
                if let Some(form) = self.state.form.as_mut() {
                    form.message = Some(err.to_string());
                }
            }
        }
    }

    fn expire_toast(&mut self) {
        if self
            .state
            .toast
            .as_ref()
            .is_some_and(|toast| toast.shown_at.elapsed() >= TOAST_TTL)
        {
            self.state.toast = None;
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let action = ui::keymap::map_key(key);
        if action == ui::keymap::AppAction::Quit {
            self.should_quit = true;
            return Ok(());
        }

        match self.state.screen {
            Screen::Login => self.handle_login_key(action),
            Screen::Dashboard => self.handle_dashboard_key(action),
            Screen::Form => {
                self.handle_form_key(action);
                Ok(())
            }
        }
    }

    fn handle_login_key(&mut self, action: ui::keymap::AppAction) -> Result<()> {
        use ui::keymap::AppAction;

        let login = &mut self.state.login;
        match action {
            AppAction::NextField | AppAction::Up | AppAction::Down => {
                login.focus = match login.focus {
                    LoginField::Email => LoginField::Password,
                    LoginField::Password => LoginField::Email,
                };
            }
            AppAction::Backspace => {
                login_field_mut(login).pop();
            }
            AppAction::Input(ch) => login_field_mut(login).push(ch),
            AppAction::Submit => return self.attempt_login(),
            AppAction::Cancel | AppAction::Quit | AppAction::None => {}
        }
        Ok(())
    }

    fn attempt_login(&mut self) -> Result<()> {
        let email = self.state.login.email.trim();
        if email.is_empty() || self.state.login.password.is_empty() {
            self.state.login.message = Some("Email and password are required.".to_string());
            return Ok(());
        }

        let session = Session::new(email);
        session.save(&self.config.session_file)?;
        tracing::info!("session started for {}", session.email);

        self.state.session = Some(session);
        self.state.login = LoginState::default();
        self.state.screen = Screen::Dashboard;
        Ok(())
    }

    fn handle_dashboard_key(&mut self, action: ui::keymap::AppAction) -> Result<()> {
        use ui::keymap::AppAction;

        let len = self.provider.records().len();
        match action {
            AppAction::Up | AppAction::Input('k') => {
                self.state.selected = self.state.selected.saturating_sub(1);
            }
            AppAction::Down | AppAction::Input('j') => {
                if len > 0 {
                    self.state.selected = (self.state.selected + 1).min(len - 1);
                }
            }
            AppAction::Input('q') => self.should_quit = true,
            AppAction::Input('r') => self.queue_refresh(),
            AppAction::Input('a') => {
                self.state.form = Some(FormState::add());
                self.state.screen = Screen::Form;
            }
            AppAction::Input('e') | AppAction::Submit => {
                if let Some(record) = self.provider.records().get(self.state.selected) {
                    self.state.form = Some(FormState::edit(record, self.state.timezone));
                    self.state.screen = Screen::Form;
                }
            }
            AppAction::Input('d') => self.delete_selected(),
            AppAction::Input('x') => self.logout()?,
            _ => {}
        }
        Ok(())
    }

    fn delete_selected(&mut self) {
        let Some(record) = self.provider.records().get(self.state.selected) else {
            return;
        };
        let work = Pending::Remove {
            id: record.id.clone(),
            title: record.title.clone(),
        };
        self.queue(work, Some("Deleting..."));
    }

    fn logout(&mut self) -> Result<()> {
        Session::clear(&self.config.session_file)?;
        self.state.session = None;
        self.state.screen = Screen::Login;
        Ok(())
    }

    fn handle_form_key(&mut self, action: ui::keymap::AppAction) {
        use ui::keymap::AppAction;

        let Some(form) = self.state.form.as_mut() else {
            self.state.screen = Screen::Dashboard;
            return;
        };
        match action {
            AppAction::Cancel => self.close_form(),
            AppAction::NextField | AppAction::Down => form.advance_focus(),
            AppAction::Backspace => form.backspace(),
            AppAction::Input(ch) => form.input(ch),
            AppAction::Submit => self.submit_form(),
            AppAction::Up | AppAction::Quit | AppAction::None => {}
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.state.form.as_mut() else {
            return;
        };
        let tz = self.state.timezone;

        let request = match &form.mode {
            FormMode::Add => form.to_draft(tz).map(Pending::Add),
            FormMode::Edit(original) => form
                .to_patch(original, tz)
                .map(|patch| Pending::Update(original.id.clone(), patch)),
        };

        match request {
            Err(message) => form.message = Some(message),
            Ok(Pending::Update(_, patch)) if patch.is_empty() => self.close_form(),
            Ok(work) => {
                form.message = None;
                self.queue(work, Some("Saving..."));
            }
        }
    }

    fn close_form(&mut self) {
        self.state.form = None;
        self.state.screen = Screen::Dashboard;
        self.state.clamp_selection(self.provider.records().len());
    }
}

/// A request queued by a key press. It runs after the next frame is drawn,
/// so that frame shows it as in progress.
enum Pending {
    Refresh(u64),
    Add(RecordDraft),
    Update(String, RecordPatch),
    Remove { id: String, title: String },
}

fn login_field_mut(login: &mut LoginState) -> &mut String {
    match login.focus {
        LoginField::Email => &mut login.email,
        LoginField::Password => &mut login.password,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::provider::fake::FakeApi;

    fn config(name: &str) -> AppConfig {
        let dir = std::env::temp_dir().join(format!("finsync_app_{}", std::process::id()));
        AppConfig {
            session_file: dir.join(name).display().to_string(),
            ..AppConfig::default()
        }
    }

    fn signed_in(name: &str, api: FakeApi) -> App<FakeApi> {
        let session = Some(Session::new("ana@example.com"));
        App::with_api(config(name), api, session).unwrap()
    }

    /// One key press, followed by the request it queued, as the event loop
    /// does after drawing.
    async fn press(app: &mut App<FakeApi>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .await
            .unwrap();
        app.run_pending().await;
    }

    fn screen_text(app: &App<FakeApi>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| ui::render(frame, &app.state, app.provider.state()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    async fn type_text(app: &mut App<FakeApi>, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch)).await;
        }
    }

    async fn add_record(app: &mut App<FakeApi>, title: &str, amount: &str) {
        press(app, KeyCode::Char('a')).await;
        type_text(app, title).await;
        press(app, KeyCode::Tab).await;
        type_text(app, amount).await;
        press(app, KeyCode::Enter).await;
    }

    #[tokio::test]
    async fn login_needs_both_fields_and_writes_the_marker() {
        let config = config("login.json");
        let path = config.session_file.clone();
        let mut app = App::with_api(config, FakeApi::default(), None).unwrap();
        assert_eq!(app.state.screen, Screen::Login);

        type_text(&mut app, "ana@example.com").await;
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.state.screen, Screen::Login);
        assert!(app.state.login.message.is_some());

        press(&mut app, KeyCode::Tab).await;
        type_text(&mut app, "secret").await;
        press(&mut app, KeyCode::Enter).await;

        assert_eq!(app.state.screen, Screen::Dashboard);
        assert_eq!(
            Session::load(&path).unwrap(),
            Some(Session::new("ana@example.com"))
        );

        press(&mut app, KeyCode::Char('x')).await;
        assert_eq!(app.state.screen, Screen::Login);
        assert_eq!(Session::load(&path).unwrap(), None);
    }

    #[tokio::test]
    async fn form_adds_a_record_and_returns_to_dashboard() {
        let mut app = signed_in("add.json", FakeApi::default());
        app.queue_first_load();
        app.run_pending().await;

        add_record(&mut app, "Quarterly bonus", "25,000").await;

        assert_eq!(app.state.screen, Screen::Dashboard);
        assert!(app.state.form.is_none());
        let records = app.provider.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Quarterly bonus");
        assert_eq!(records[0].amount, 25_000);
        assert!(matches!(
            app.state.toast,
            Some(ToastState {
                level: ToastLevel::Success,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn invalid_form_stays_open_with_a_message() {
        let mut app = signed_in("invalid.json", FakeApi::default());

        add_record(&mut app, "Fuel", "-40").await;

        assert_eq!(app.state.screen, Screen::Form);
        let form = app.state.form.as_ref().unwrap();
        assert!(form.message.is_some());
        assert!(app.provider.records().is_empty());

        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.state.screen, Screen::Dashboard);
    }

    #[tokio::test]
    async fn letters_are_typed_in_the_form_but_quit_on_dashboard() {
        let mut app = signed_in("quit.json", FakeApi::default());

        press(&mut app, KeyCode::Char('a')).await;
        type_text(&mut app, "quarterly").await;
        assert!(!app.should_quit);
        assert_eq!(app.state.form.as_ref().unwrap().title, "quarterly");

        press(&mut app, KeyCode::Esc).await;
        press(&mut app, KeyCode::Char('q')).await;
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn edit_and_delete_act_on_the_selection() {
        let mut app = signed_in("edit.json", FakeApi::default());
        add_record(&mut app, "Salary", "60000").await;
        add_record(&mut app, "Rent", "15000").await;

        press(&mut app, KeyCode::Char('j')).await;
        assert_eq!(app.state.selected, 1);

        press(&mut app, KeyCode::Char('e')).await;
        assert_eq!(app.state.screen, Screen::Form);
        press(&mut app, KeyCode::Tab).await;
        press(&mut app, KeyCode::Backspace).await;
        press(&mut app, KeyCode::Backspace).await;
        press(&mut app, KeyCode::Backspace).await;
        press(&mut app, KeyCode::Backspace).await;
        press(&mut app, KeyCode::Backspace).await;
        type_text(&mut app, "16000").await;
        press(&mut app, KeyCode::Enter).await;

        assert_eq!(app.state.screen, Screen::Dashboard);
        assert_eq!(app.provider.records()[1].amount, 16_000);
        assert_eq!(app.provider.records()[1].title, "Rent");

        press(&mut app, KeyCode::Char('d')).await;
        let titles: Vec<_> = app
            .provider
            .records()
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, ["Salary"]);
        assert_eq!(app.state.selected, 0);
    }

    #[tokio::test]
    async fn failed_delete_shows_an_error_toast() {
        let api = FakeApi::default();
        let mut app = signed_in("delete.json", api.clone());
        add_record(&mut app, "Salary", "60000").await;

        api.fail_next("delete");
        press(&mut app, KeyCode::Char('d')).await;

        assert_eq!(app.provider.records().len(), 1);
        assert!(matches!(
            app.state.toast,
            Some(ToastState {
                level: ToastLevel::Error,
                ..
            })
        ));
        assert!(app.provider.state().error.is_some());
    }

    #[tokio::test]
    async fn first_frame_shows_loading_until_the_list_arrives() {
        let mut app = signed_in("loading.json", FakeApi::default());

        app.queue_first_load();
        assert!(app.provider.state().loading);
        assert!(screen_text(&app).contains("Loading records..."));

        app.run_pending().await;
        assert!(!app.provider.state().loading);
        let text = screen_text(&app);
        assert!(!text.contains("Loading"));
        assert!(text.contains("Default values are shown until you add your first record"));
    }

    #[tokio::test]
    async fn queued_delete_is_shown_before_it_runs() {
        let mut app = signed_in("busy.json", FakeApi::default());
        add_record(&mut app, "Salary", "60000").await;

        app.handle_key(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE))
            .await
            .unwrap();
        assert!(screen_text(&app).contains("Deleting..."));
        assert_eq!(app.provider.records().len(), 1);

        app.run_pending().await;
        assert!(app.provider.records().is_empty());
        assert_eq!(app.state.busy, None);
    }

    #[test]
    fn corrupt_session_marker_starts_at_login() {
        let config = config("corrupt.json");
        let path = std::path::Path::new(&config.session_file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "{not json").unwrap();

        let app = App::new(config).unwrap();
        assert_eq!(app.state.screen, Screen::Login);
        assert_eq!(app.state.session, None);
    }
}
