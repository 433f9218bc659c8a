// ============================================
// src/app.rs
// Terminal front end state and event loop
// ============================================

use std::io::Result;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::prelude::*;

use crate::bank::{Banks, spawn_loader};
use crate::config::Cli;
use crate::error::BankError;
use crate::session::{Action, CheckResult, Phase, SessionState};
use crate::ui;

// --------------------------------------------------
// Data structures
// --------------------------------------------------

/// Light / dark palette, toggled with F2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn base(self) -> Style {
        match self {
            Theme::Light => Style::default().fg(Color::Black).bg(Color::White),
            Theme::Dark => Style::default().fg(Color::White).bg(Color::Black),
        }
    }

    pub fn muted(self) -> Style {
        self.base().fg(Color::DarkGray)
    }

    pub fn accent(self) -> Style {
        match self {
            Theme::Light => self.base().fg(Color::Blue),
            Theme::Dark => self.base().fg(Color::Cyan),
        }
    }
}

/// One entry of the count menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountOption {
    pub label: String,
    pub count: usize,
}

/// Everything the terminal front end keeps around the session.
pub struct App {
    quiz_types: Vec<String>,
    counts: Vec<usize>,

    banks: Banks,
    loader: Option<Receiver<std::result::Result<Banks, BankError>>>,
    load_error: Option<String>,

    session: SessionState,
    rng: StdRng,

    /// Highlighted row on the type / count menus
    menu_cursor: usize,
    /// Blank that receives typed characters
    focus: usize,
    theme: Theme,

    started_at: Option<DateTime<Local>>,
    elapsed: Option<TimeDelta>,
    should_quit: bool,
}

impl App {
    /// Starts loading the banks in the background and opens on the type menu.
    pub fn new(cli: &Cli) -> Self {
        let mut app = Self::with_banks(cli, Banks::empty());
        app.loader = Some(spawn_loader(cli.bank_sources()));
        app
    }

    /// App over already loaded banks, no loader thread.
    pub fn with_banks(cli: &Cli, banks: Banks) -> Self {
        let rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            quiz_types: cli.quiz_types.clone(),
            counts: cli.counts.clone(),
            banks,
            loader: None,
            load_error: None,
            session: SessionState::new(),
            rng,
            menu_cursor: 0,
            focus: 0,
            theme: Theme::default(),
            started_at: None,
            elapsed: None,
            should_quit: false,
        }
    }

    // MARK: bank loading
    /// Picks up the loader result once it arrives.
    pub fn poll_loader(&mut self) {
        let Some(rx) = &self.loader else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(banks)) => {
                info!("banks ready: {} questions", banks.len());
                self.banks = banks;
                self.loader = None;
            }
            Ok(Err(err)) => {
                self.load_error = Some(err.to_string());
                self.loader = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                warn!("bank loader exited without a result");
                self.load_error = Some("bank loader stopped unexpectedly".into());
                self.loader = None;
            }
        }
    }

    // MARK: session dispatch
    /// Runs one action through the session reducer.
    pub fn dispatch(&mut self, action: Action) {
        let starts_pass = matches!(action, Action::StartQuiz(_) | Action::StartWrongQuiz);
        let before = self.session.phase();

        let session = std::mem::take(&mut self.session);
        self.session = session.apply(action, &self.banks, &mut self.rng);

        let after = self.session.phase();
        // A retry pass always leaves Finished, even when it lands back there
        if starts_pass && (after != before || before == Phase::Finished) {
            self.started_at = Some(Local::now());
            self.elapsed = None;
            self.focus = 0;
        }
        if after == Phase::Finished && self.elapsed.is_none() {
            self.elapsed = self.started_at.map(|start| Local::now() - start);
        }
        if after != before && matches!(after, Phase::SelectType | Phase::SelectCount) {
            self.menu_cursor = 0;
        }
        self.focus = self.focus.min(self.session.inputs().len().saturating_sub(1));
    }

    // MARK: key handling
    /// Maps one key press to session actions.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::F(2) => {
                self.theme = self.theme.toggled();
                return;
            }
            _ => {}
        }

        match self.session.phase() {
            Phase::SelectType => self.handle_type_menu(key.code),
            Phase::SelectCount => self.handle_count_menu(key.code),
            Phase::InProgress => self.handle_question(key),
            Phase::Finished => self.handle_summary(key.code),
        }
    }

    fn handle_type_menu(&mut self, code: KeyCode) {
        if let Some(idx) = self.menu_choice(code, self.quiz_types.len()) {
            let label = self.quiz_types[idx].clone();
            self.dispatch(Action::SelectType(label));
        }
    }

    fn handle_count_menu(&mut self, code: KeyCode) {
        if self.banks.is_empty() {
            return; // still loading
        }
        let options = self.count_options();
        if let Some(idx) = self.menu_choice(code, options.len()) {
            self.dispatch(Action::StartQuiz(options[idx].count));
        }
    }

    /// Shared Up/Down/Enter/digit navigation. Returns the chosen row.
    fn menu_choice(&mut self, code: KeyCode, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match code {
            KeyCode::Up => {
                self.menu_cursor = (self.menu_cursor + len - 1) % len;
                None
            }
            KeyCode::Down | KeyCode::Tab => {
                self.menu_cursor = (self.menu_cursor + 1) % len;
                None
            }
            KeyCode::Enter => Some(self.menu_cursor.min(len - 1)),
            KeyCode::Char(c) => c
                .to_digit(10)
                .map(|d| d as usize)
                .filter(|&d| (1..=len).contains(&d))
                .map(|d| d - 1),
            _ => None,
        }
    }

    fn handle_question(&mut self, key: KeyEvent) {
        let blanks = self.session.inputs().len();
        match key.code {
            // Same two operations a pointer click would trigger
            KeyCode::Enter => {
                if self.session.result() == CheckResult::Unanswered {
                    self.dispatch(Action::CheckAnswer);
                } else {
                    self.dispatch(Action::NextQuestion);
                    self.focus = 0;
                }
            }
            KeyCode::Tab | KeyCode::Down if blanks > 0 => {
                self.focus = (self.focus + 1) % blanks;
            }
            KeyCode::BackTab | KeyCode::Up if blanks > 0 => {
                self.focus = (self.focus + blanks - 1) % blanks;
            }
            KeyCode::Backspace => {
                if let Some(current) = self.session.inputs().get(self.focus) {
                    let mut value = current.clone();
                    value.pop();
                    self.dispatch(Action::RecordInput {
                        blank: self.focus,
                        value,
                    });
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(current) = self.session.inputs().get(self.focus) {
                    let mut value = current.clone();
                    value.push(c);
                    self.dispatch(Action::RecordInput {
                        blank: self.focus,
                        value,
                    });
                }
            }
            _ => {}
        }
    }

    fn handle_summary(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('r') if !self.session.wrong_notes().is_empty() => {
                self.dispatch(Action::StartWrongQuiz);
            }
            KeyCode::Char('s') => self.dispatch(Action::Restart),
            _ => {}
        }
    }

    // --------------------------------------------------
    // Queries for the renderer
    // --------------------------------------------------

    /// Configured counts plus "all questions".
    pub fn count_options(&self) -> Vec<CountOption> {
        let mut options: Vec<CountOption> = self
            .counts
            .iter()
            .map(|&count| CountOption {
                label: format!("{count} questions"),
                count,
            })
            .collect();
        options.push(CountOption {
            label: format!("All questions ({})", self.banks.len()),
            count: self.banks.len(),
        });
        options
    }

    pub fn quiz_types(&self) -> &[String] {
        &self.quiz_types
    }

    pub fn banks(&self) -> &Banks {
        &self.banks
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn menu_cursor(&self) -> usize {
        self.menu_cursor
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn elapsed(&self) -> Option<TimeDelta> {
        self.elapsed
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

// --------------------------------------------------
// Event loop
// --------------------------------------------------

pub fn run(terminal: &mut Terminal<impl Backend>, app: &mut App) -> Result<()> {
    while !app.should_quit() {
        app.poll_loader();
        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn app() -> App {
        let cli = Cli::parse_from(["blankquiz", "--seed", "3", "--count", "1"]);
        let banks = Banks::from_json_str(
            r#"{"1": "Unit load device: ___", "2": "Two blanks: ___ ___"}"#,
            r#"{"1": ["pallet"], "2": ["a", "b"]}"#,
        )
        .unwrap();
        App::with_banks(&cli, banks)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn count_menu_appends_all_questions() {
        let options = app().count_options();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].count, 1);
        assert_eq!(options[1].count, 2);
    }

    #[test]
    fn keyboard_drives_a_full_pass() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.session().phase(), Phase::SelectCount);
        assert_eq!(app.session().quiz_type(), Some("Forklift"));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session().phase(), Phase::InProgress);
        assert_eq!(app.session().pool().len(), 1);

        let question = app.session().current_question(app.banks()).unwrap().clone();
        for (i, answer) in question.answers.iter().enumerate() {
            if i > 0 {
                press(&mut app, KeyCode::Tab);
            }
            type_text(&mut app, answer);
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session().result(), CheckResult::Correct);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session().phase(), Phase::Finished);
        assert_eq!(app.session().score(), 1);
        assert!(app.elapsed().is_some());

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.session().phase(), Phase::SelectCount);
    }

    #[test]
    fn retry_key_only_works_with_wrong_notes() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "wrong");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session().result(), CheckResult::Incorrect);
        assert_eq!(app.session().wrong_notes()[0].input[0], "wron");

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.session().phase(), Phase::InProgress);
        assert!(app.session().is_retry());
        assert!(app.session().wrong_notes().is_empty());
    }

    #[test]
    fn count_menu_is_disabled_while_loading() {
        let cli = Cli::parse_from(["blankquiz"]);
        let mut app = App::with_banks(&cli, Banks::empty());
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session().phase(), Phase::SelectCount);
    }

    #[test]
    fn f2_toggles_theme_and_esc_quits() {
        let mut app = app();
        press(&mut app, KeyCode::F(2));
        assert_eq!(app.theme(), Theme::Dark);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit());
    }
}
