// ============================================
// src/main.rs
// ============================================

use std::io::{Result, stdout};

use clap::Parser;
use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use blankquiz::app::{self, App};
use blankquiz::config::Cli;

fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    log::info!("bank sources: {:?}", cli.bank_sources());

    let mut app_state = App::new(&cli);

    let mut terminal = setup_terminal()?;
    let outcome = app::run(&mut terminal, &mut app_state);
    // Restore even when the loop failed
    restore_terminal()?;
    outcome
}

fn setup_terminal() -> Result<Terminal<impl Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(Hide)?; // blanks draw their own cursor
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn restore_terminal() -> Result<()> {
    stdout().execute(Show)?;
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}
