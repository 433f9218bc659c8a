// ============================================
// src/session.rs
// Quiz session state machine
// ============================================

use std::collections::BTreeSet;

use log::{debug, info};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::bank::{Banks, Question};

// --------------------------------------------------
// State types
// --------------------------------------------------

/// Screen the session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    SelectType,
    SelectCount,
    InProgress,
    Finished,
}

/// Verdict for the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckResult {
    #[default]
    Unanswered,
    Correct,
    Incorrect,
}

/// Snapshot of one incorrect answer, used to build a retry pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrongNote {
    pub id: String,
    pub prompt: String,
    pub correct: Vec<String>,
    /// Raw user input, before normalization
    pub input: Vec<String>,
}

/// Every mutation the front end may request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectType(String),
    StartQuiz(usize),
    RecordInput { blank: usize, value: String },
    CheckAnswer,
    NextQuestion,
    StartWrongQuiz,
    Restart,
}

/// Whole quiz state. Only the operations below change it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    phase: Phase,
    quiz_type: Option<String>,
    pool: Vec<String>,
    index: usize,
    inputs: Vec<String>,
    result: CheckResult,
    score: usize,
    wrong_notes: Vec<WrongNote>,
    retry: bool,
}

/// Read-only view handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub phase: Phase,
    pub quiz_type: Option<&'a str>,
    pub question: Option<&'a Question>,
    /// 1-based position of the current question
    pub position: usize,
    pub pool_len: usize,
    pub inputs: &'a [String],
    pub result: CheckResult,
    pub score: usize,
    pub wrong_notes: &'a [WrongNote],
    pub accuracy: f64,
    pub retry: bool,
}

// --------------------------------------------------
// Answer comparison
// --------------------------------------------------

/// Drops every whitespace character.
pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Blank-by-blank comparison after normalization. A missing input counts as empty.
pub fn is_correct(inputs: &[String], accepted: &[String]) -> bool {
    inputs.len() <= accepted.len()
        && accepted.iter().enumerate().all(|(i, answer)| {
            let given = inputs.get(i).map(String::as_str).unwrap_or("");
            normalize(given) == normalize(answer)
        })
}

// --------------------------------------------------
// Transitions
// --------------------------------------------------

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reducer entry point: consumes the state and returns the next one.
    pub fn apply<R: Rng + ?Sized>(mut self, action: Action, banks: &Banks, rng: &mut R) -> Self {
        match action {
            Action::SelectType(label) => self.select_type(label),
            Action::StartQuiz(count) => self.start_quiz(count, banks, rng),
            Action::RecordInput { blank, value } => self.record_input(blank, value),
            Action::CheckAnswer => self.check_answer(banks),
            Action::NextQuestion => self.next_question(banks),
            Action::StartWrongQuiz => self.start_wrong_quiz(banks, rng),
            Action::Restart => self.restart(),
        }
        self
    }

    pub fn select_type(&mut self, label: impl Into<String>) {
        if self.phase != Phase::SelectType {
            debug!("select_type ignored in {:?}", self.phase);
            return;
        }
        self.quiz_type = Some(label.into());
        self.phase = Phase::SelectCount;
    }

    /// Starts a pass over `min(requested, |bank|)` randomly chosen questions.
    /// Does nothing while the banks are still empty.
    pub fn start_quiz<R: Rng + ?Sized>(&mut self, requested: usize, banks: &Banks, rng: &mut R) {
        if self.phase != Phase::SelectCount {
            debug!("start_quiz ignored in {:?}", self.phase);
            return;
        }
        if banks.is_empty() {
            debug!("start_quiz ignored: banks not loaded");
            return;
        }

        let mut ids: Vec<String> = banks.ids().map(str::to_owned).collect();
        ids.shuffle(rng);
        ids.truncate(requested.min(banks.len()));

        info!("starting quiz with {} of {} questions", ids.len(), banks.len());
        self.wrong_notes.clear();
        self.retry = false;
        self.begin_pass(ids, banks);
    }

    /// Replays each missed question once, in random order.
    pub fn start_wrong_quiz<R: Rng + ?Sized>(&mut self, banks: &Banks, rng: &mut R) {
        if self.phase != Phase::Finished {
            debug!("start_wrong_quiz ignored in {:?}", self.phase);
            return;
        }

        let notes = std::mem::take(&mut self.wrong_notes);
        let unique: BTreeSet<String> = notes.into_iter().map(|note| note.id).collect();
        let mut ids: Vec<String> = unique.into_iter().collect();
        ids.shuffle(rng);

        info!("retrying {} missed questions", ids.len());
        self.retry = true;
        self.begin_pass(ids, banks);
    }

    /// Overwrites one blank of the current question.
    pub fn record_input(&mut self, blank: usize, value: String) {
        if self.phase != Phase::InProgress || self.result != CheckResult::Unanswered {
            debug!("record_input ignored in {:?}/{:?}", self.phase, self.result);
            return;
        }
        match self.inputs.get_mut(blank) {
            Some(slot) => *slot = value,
            None => debug!("record_input ignored: blank {blank} out of range"),
        }
    }

    /// Judges the current inputs once; later calls are no-ops until `next_question`.
    pub fn check_answer(&mut self, banks: &Banks) {
        if self.phase != Phase::InProgress || self.result != CheckResult::Unanswered {
            debug!("check_answer ignored in {:?}/{:?}", self.phase, self.result);
            return;
        }
        let Some(question) = self.current_question(banks) else {
            return;
        };

        if is_correct(&self.inputs, &question.answers) {
            self.score += 1;
            self.result = CheckResult::Correct;
        } else {
            self.wrong_notes.push(WrongNote {
                id: question.id.clone(),
                prompt: question.prompt.clone(),
                correct: question.answers.clone(),
                input: self.inputs.clone(),
            });
            self.result = CheckResult::Incorrect;
        }
    }

    pub fn next_question(&mut self, banks: &Banks) {
        if self.phase != Phase::InProgress || self.result == CheckResult::Unanswered {
            debug!("next_question ignored in {:?}/{:?}", self.phase, self.result);
            return;
        }

        if self.index + 1 < self.pool.len() {
            self.index += 1;
            self.result = CheckResult::Unanswered;
            self.reset_inputs(banks);
        } else {
            self.finish();
        }
    }

    /// Back to the count menu with the same quiz type.
    pub fn restart(&mut self) {
        if self.phase != Phase::Finished {
            debug!("restart ignored in {:?}", self.phase);
            return;
        }
        self.phase = Phase::SelectCount;
    }

    fn begin_pass(&mut self, pool: Vec<String>, banks: &Banks) {
        self.pool = pool;
        self.index = 0;
        self.score = 0;
        self.result = CheckResult::Unanswered;
        self.phase = Phase::InProgress;
        if self.pool.is_empty() {
            self.inputs.clear();
            self.finish();
        } else {
            self.reset_inputs(banks);
        }
    }

    fn reset_inputs(&mut self, banks: &Banks) {
        let blanks = self.current_question(banks).map_or(0, Question::blank_count);
        self.inputs = vec![String::new(); blanks];
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        info!(
            "quiz finished: {}/{} ({} wrong notes)",
            self.score,
            self.pool.len(),
            self.wrong_notes.len()
        );
    }

    // --------------------------------------------------
    // Queries
    // --------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn quiz_type(&self) -> Option<&str> {
        self.quiz_type.as_deref()
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn result(&self) -> CheckResult {
        self.result
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn wrong_notes(&self) -> &[WrongNote] {
        &self.wrong_notes
    }

    pub fn is_retry(&self) -> bool {
        self.retry
    }

    /// Questions judged so far in this pass.
    pub fn answered(&self) -> usize {
        self.score + self.wrong_notes.len()
    }

    /// `score / |pool|`, or 0.0 for an empty pool.
    pub fn accuracy(&self) -> f64 {
        if self.pool.is_empty() {
            0.0
        } else {
            self.score as f64 / self.pool.len() as f64
        }
    }

    pub fn current_question<'a>(&self, banks: &'a Banks) -> Option<&'a Question> {
        if self.phase != Phase::InProgress {
            return None;
        }
        self.pool.get(self.index).and_then(|id| banks.get(id))
    }

    pub fn view<'a>(&'a self, banks: &'a Banks) -> SessionView<'a> {
        SessionView {
            phase: self.phase,
            quiz_type: self.quiz_type(),
            question: self.current_question(banks),
            position: self.index + 1,
            pool_len: self.pool.len(),
            inputs: &self.inputs,
            result: self.result,
            score: self.score,
            wrong_notes: &self.wrong_notes,
            accuracy: self.accuracy(),
            retry: self.retry,
        }
    }
}
