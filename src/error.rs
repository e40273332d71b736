//! Error types for table building
//!
//! Fatal conditions abort a build; `Encoding` is raised per line and the
//! pipeline skips the offending word. Key conflicts are not errors at all,
//! see [`crate::store::InsertOutcome`].

use std::path::PathBuf;

use crate::pipeline::Stage;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Wordlist not found or unreadable: {path:?}")]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported algorithm: '{0}' (use --list-algorithms to see what is available)")]
    UnsupportedAlgorithm(String),

    #[error("Line {line} is not valid {encoding}")]
    Encoding { line: u64, encoding: &'static str },

    #[error("Unsupported input encoding: '{0}'")]
    UnsupportedEncoding(String),

    #[error("Table store unavailable while trying to {context}")]
    StoreUnavailable {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn store(context: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::StoreUnavailable { context, source }
    }

    /// Whether the pipeline may skip the current word and keep going
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Encoding { .. })
    }
}

/// A fatal error together with the pipeline stage it interrupted
#[derive(Debug, thiserror::Error)]
#[error("Build aborted during {stage}")]
pub struct BuildError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

pub type Result<T> = std::result::Result<T, Error>;
