// ============================================
// src/config.rs
// Command line options
// ============================================

use std::path::{Path, PathBuf};

use clap::Parser;
use directories::ProjectDirs;

use crate::bank::BankSources;

const PROBLEMS_FILE: &str = "problems.json";
const ANSWERS_FILE: &str = "answers.json";

/// Fill-in-the-blank quiz in the terminal.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Question bank (id -> prompt)
    #[arg(long, value_name = "PATH")]
    pub problems: Option<PathBuf>,

    /// Answer bank (id -> accepted answers per blank)
    #[arg(long, value_name = "PATH")]
    pub answers: Option<PathBuf>,

    /// Seed for question shuffling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Question counts offered on the count menu ("all" is always added)
    #[arg(long = "count", value_name = "N", default_values_t = [30usize, 60])]
    pub counts: Vec<usize>,

    /// Quiz types offered on the first screen
    #[arg(
        long = "quiz-type",
        value_name = "LABEL",
        default_values_t = [String::from("Logistics automation"), String::from("Forklift")]
    )]
    pub quiz_types: Vec<String>,
}

impl Cli {
    /// Explicit paths win, then the per-user data dir, then `./data`.
    pub fn bank_sources(&self) -> BankSources {
        let dir = default_bank_dir();
        BankSources {
            problems: self
                .problems
                .clone()
                .unwrap_or_else(|| dir.join(PROBLEMS_FILE)),
            answers: self
                .answers
                .clone()
                .unwrap_or_else(|| dir.join(ANSWERS_FILE)),
        }
    }
}

// MARK: default bank location
fn default_bank_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "blankquiz") {
        let data_dir = proj_dirs.data_dir();
        if has_banks(data_dir) {
            return data_dir.to_path_buf();
        }
    }
    PathBuf::from("data")
}

fn has_banks(dir: &Path) -> bool {
    dir.join(PROBLEMS_FILE).is_file() && dir.join(ANSWERS_FILE).is_file()
}
