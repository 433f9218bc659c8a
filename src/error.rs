// ============================================
// src/error.rs
// Error types for bank loading
// ============================================

use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading or parsing one of the two bank files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed bank file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no usable questions in {}", path.display())]
    Empty { path: PathBuf },
}
