// ============================================
// src/ui.rs
// Rendering of session snapshots
// ============================================

use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

use crate::app::{App, Theme};
use crate::session::{CheckResult, Phase, SessionView};

pub fn render(f: &mut Frame, app: &App) {
    let theme = app.theme();
    let size = f.area();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Blank Quiz ")
        .title_bottom(Line::from(key_hints(app)).style(theme.muted()))
        .style(theme.base());
    let inner_area = block.inner(size);
    f.render_widget(block, size);

    let view = app.session().view(app.banks());
    match view.phase {
        Phase::SelectType => render_type_menu(f, inner_area, app),
        Phase::SelectCount => render_count_menu(f, inner_area, app),
        Phase::InProgress => render_question(f, inner_area, app, &view),
        Phase::Finished => render_summary(f, inner_area, app, &view),
    }
}

fn key_hints(app: &App) -> String {
    let hints = match app.session().phase() {
        Phase::SelectType | Phase::SelectCount => "↑/↓ move  Enter select",
        Phase::InProgress => "Tab next blank  Enter check / next",
        Phase::Finished => "r retry wrong  s restart",
    };
    format!(" {hints}  F2 theme  Esc quit ")
}

/// Menu rows, the highlighted one inverted.
fn menu_lines<S: AsRef<str>>(
    items: impl IntoIterator<Item = S>,
    cursor: usize,
    theme: Theme,
) -> Vec<Line<'static>> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            let text = format!(" {}. {} ", i + 1, label.as_ref());
            if i == cursor {
                Line::from(Span::styled(text, theme.accent().reversed()))
            } else {
                Line::from(text)
            }
        })
        .collect()
}

fn render_type_menu(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![
        Line::from("Choose a quiz type").bold(),
        Line::from(""),
    ];
    lines.extend(menu_lines(app.quiz_types(), app.menu_cursor(), app.theme()));
    f.render_widget(Paragraph::new(lines).centered(), centered_rows(area, 4));
}

fn render_count_menu(f: &mut Frame, area: Rect, app: &App) {
    let theme = app.theme();
    let mut lines = Vec::new();
    if let Some(label) = app.session().quiz_type() {
        lines.push(Line::from(label.to_owned()).style(theme.muted()));
    }

    if app.banks().is_empty() {
        lines.push(Line::from("Loading questions...").style(theme.muted()));
        if let Some(err) = app.load_error() {
            lines.push(Line::from(err.to_owned()).style(theme.base().fg(Color::Red)));
        }
    } else {
        lines.push(Line::from("How many questions?").bold());
        lines.push(Line::from(""));
        let labels = app.count_options().into_iter().map(|option| option.label);
        lines.extend(menu_lines(labels, app.menu_cursor(), theme));
    }

    f.render_widget(
        Paragraph::new(lines).centered().wrap(Wrap { trim: true }),
        centered_rows(area, 6),
    );
}

fn render_question(f: &mut Frame, area: Rect, app: &App, view: &SessionView<'_>) {
    let Some(question) = view.question else {
        return;
    };
    let theme = app.theme();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                                 // [0] progress
            Constraint::Length(3),                                 // [1] prompt
            Constraint::Length(question.blank_count() as u16 + 1), // [2] blanks
            Constraint::Min(1),                                    // [3] verdict
        ])
        .split(area);

    // 0. progress gauge
    let ratio = view.position.saturating_sub(1) as f64 / view.pool_len.max(1) as f64;
    let label = format!(
        "{}{} / {}  (score {})",
        if view.retry { "retry " } else { "" },
        view.position,
        view.pool_len,
        view.score
    );
    let gauge = Gauge::default()
        .gauge_style(theme.accent())
        .ratio(ratio.min(1.0))
        .label(label);
    f.render_widget(gauge, chunks[0]);

    // 1. prompt
    f.render_widget(
        Paragraph::new(format!("{}. {}", view.position, question.prompt))
            .style(theme.base())
            .bold()
            .wrap(Wrap { trim: true }),
        chunks[1],
    );

    // 2. one line per blank
    let answered = view.result != CheckResult::Unanswered;
    let blanks: Vec<Line> = view
        .inputs
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let focused = i == app.focus() && !answered;
            let marker = if focused { "▶" } else { " " };
            let mut spans = vec![
                Span::styled(format!("{marker} Blank {}: ", i + 1), theme.muted()),
                Span::styled(value.clone(), theme.base()),
            ];
            if focused {
                spans.push(Span::styled(" ", theme.base().reversed()));
            }
            Line::from(spans)
        })
        .collect();
    f.render_widget(Paragraph::new(blanks), chunks[2]);

    // 3. verdict
    let verdict = match view.result {
        CheckResult::Unanswered => Line::from(""),
        CheckResult::Correct => Line::from(format!("Correct! (question #{})", question.id))
            .style(theme.base().fg(Color::Green)),
        CheckResult::Incorrect => Line::from(format!(
            "Wrong. Answer: {} (question #{})",
            question.answers.join(", "),
            question.id
        ))
        .style(theme.base().fg(Color::Red)),
    };
    f.render_widget(Paragraph::new(verdict).wrap(Wrap { trim: true }), chunks[3]);
}

fn render_summary(f: &mut Frame, area: Rect, app: &App, view: &SessionView<'_>) {
    let theme = app.theme();
    let mut lines = vec![
        Line::from("Quiz complete!").bold(),
        Line::from(format!(
            "Score: {} / {} (accuracy {:.1}%)",
            view.score,
            view.pool_len,
            view.accuracy * 100.0
        )),
    ];
    if let Some(elapsed) = app.elapsed() {
        lines.push(
            Line::from(format!(
                "Time: {:02}:{:02}",
                elapsed.num_minutes(),
                elapsed.num_seconds() % 60
            ))
            .style(Style::default().fg(Color::Yellow)),
        );
    }
    lines.push(Line::from(""));

    if view.wrong_notes.is_empty() {
        lines.push(Line::from("No wrong answers!").style(theme.base().fg(Color::Green)));
    } else {
        lines.push(Line::from("Wrong answers").bold());
        for note in view.wrong_notes {
            lines.push(Line::from(vec![
                Span::styled(format!("[{}] ", note.id), theme.accent()),
                Span::raw(note.prompt.clone()),
            ]));
            lines.push(
                Line::from(format!(
                    "    answer: {} / yours: {}",
                    note.correct.join(", "),
                    note.input.join(", ")
                ))
                .style(theme.muted()),
            );
        }
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

/// Vertically centres a block of roughly `rows` lines.
fn centered_rows(area: Rect, rows: u16) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Min(rows),
            Constraint::Fill(1),
        ])
        .split(area);
    chunks[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::Banks;
    use crate::config::Cli;
    use clap::Parser;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(70, 20)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn loading_notice_until_banks_arrive() {
        let cli = Cli::parse_from(["blankquiz"]);
        let mut app = App::with_banks(&cli, Banks::empty());
        assert!(screen(&app).contains("Logistics automation"));

        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(screen(&app).contains("Loading questions"));
    }

    #[test]
    fn question_screen_shows_prompt_and_blanks() {
        let cli = Cli::parse_from(["blankquiz", "--seed", "1"]);
        let banks =
            Banks::from_json_str(r#"{"7": "Fill ___ and ___"}"#, r#"{"7": ["x", "y"]}"#).unwrap();
        let mut app = App::with_banks(&cli, banks);
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        let text = screen(&app);
        assert!(text.contains("1. Fill ___ and ___"));
        assert!(text.contains("Blank 2"));
    }
}
