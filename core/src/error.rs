//! Error taxonomy for the conversion core.
//!
//! Only genuine faults are errors. An empty candidate list, a degenerate
//! candidate kind or a clamped match index are ordinary return values.

use std::collections::TryReserveError;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The lexicon or the shared context could not be built. Fatal at startup.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// Malformed or empty input where a result is mandatory.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Resource exhaustion while building session state.
    #[error("allocation failed: {0}")]
    Allocation(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("table line {line}: {reason}")]
    Table { line: usize, reason: String },

    #[error("serialization error: {0}")]
    Serialize(#[from] bincode::Error),

    #[error("fst error: {0}")]
    Fst(#[from] fst::Error),
}

impl From<TryReserveError> for Error {
    fn from(e: TryReserveError) -> Self {
        Error::Allocation(e.to_string())
    }
}

impl Error {
    /// Collapse loading failures into `Initialization`, keeping the message.
    pub fn into_initialization(self) -> Self {
        match self {
            Error::Initialization(_) => self,
            other => Error::Initialization(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
