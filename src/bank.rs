// ============================================
// src/bank.rs
// Question / answer banks and their one-shot loader
// ============================================

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use log::{info, warn};
use serde::Deserialize;

use crate::error::BankError;

/// One fill-in-the-blank question, joined from both banks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    /// Accepted answer per blank, in blank order
    pub answers: Vec<String>,
}

impl Question {
    pub fn blank_count(&self) -> usize {
        self.answers.len()
    }
}

/// `problems.json`: id -> prompt text
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank(pub BTreeMap<String, String>);

/// `answers.json`: id -> accepted answers, one per blank
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct AnswerBank(pub BTreeMap<String, Vec<String>>);

/// Both banks joined on identifier. Immutable once built.
///
/// An empty `Banks` stands for "still loading"; the session refuses to start
/// a quiz against it.
#[derive(Debug, Clone, Default)]
pub struct Banks {
    questions: BTreeMap<String, Question>,
}

impl Banks {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Joins the two banks. Ids missing from either side, and questions
    /// without any blank, are dropped.
    pub fn join(questions: QuestionBank, answers: AnswerBank) -> Self {
        let mut answers = answers.0;
        let mut joined = BTreeMap::new();

        for (id, prompt) in questions.0 {
            match answers.remove(&id) {
                Some(accepted) if accepted.is_empty() => {
                    warn!("question {id} has no blanks, skipping");
                }
                Some(accepted) => {
                    joined.insert(
                        id.clone(),
                        Question {
                            id,
                            prompt,
                            answers: accepted,
                        },
                    );
                }
                None => warn!("question {id} has no answers, skipping"),
            }
        }

        for id in answers.keys() {
            warn!("answers for {id} have no question, skipping");
        }

        Self { questions: joined }
    }

    pub fn from_json_str(problems: &str, answers: &str) -> Result<Self, serde_json::Error> {
        let questions: QuestionBank = serde_json::from_str(problems)?;
        let answers: AnswerBank = serde_json::from_str(answers)?;
        Ok(Self::join(questions, answers))
    }

    /// Reads and joins both bank files.
    pub fn load(problems: &Path, answers: &Path) -> Result<Self, BankError> {
        let questions: QuestionBank = read_json(problems)?;
        let accepted: AnswerBank = read_json(answers)?;
        let banks = Self::join(questions, accepted);
        if banks.is_empty() {
            return Err(BankError::Empty {
                path: problems.to_path_buf(),
            });
        }
        info!("loaded {} questions from {}", banks.len(), problems.display());
        Ok(banks)
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.get(id)
    }

    /// Identifiers in sorted order, so a seeded shuffle is reproducible.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.questions.keys().map(String::as_str)
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, BankError> {
    let text = fs::read_to_string(path).map_err(|source| BankError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| BankError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Locations of the two bank files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankSources {
    pub problems: PathBuf,
    pub answers: PathBuf,
}

// MARK: background load
/// Loads the banks off the UI thread. The receiver yields exactly one result.
pub fn spawn_loader(sources: BankSources) -> Receiver<Result<Banks, BankError>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = Banks::load(&sources.problems, &sources.answers);
        if let Err(err) = &result {
            warn!("bank load failed: {err}");
        }
        // The UI may already have quit
        let _ = tx.send(result);
    });
    rx
}
