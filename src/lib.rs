//! Fill-in-the-blank quiz: bank loading, the session state machine, and a
//! ratatui front end that drives it.

pub mod app;
pub mod bank;
pub mod config;
pub mod error;
pub mod session;
pub mod ui;

pub use bank::{AnswerBank, BankSources, Banks, Question, QuestionBank};
pub use error::BankError;
pub use session::{Action, CheckResult, Phase, SessionState, SessionView, WrongNote};
