use std::path::PathBuf;

use thiserror::Error;

use crate::layer::LayerId;

/// Result type for history and layer operations
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors raised by the history buffer, the versioned state and the layer stack.
///
/// None of these are user-facing conditions: each one means the caller asked
/// for something its own capability flags or ids should have ruled out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    // Construction
    #[error("History capacity must be positive")]
    InvalidCapacity,

    #[error("{given} initial values do not fit in a history of capacity {capacity}")]
    TooManyInitialValues { given: usize, capacity: usize },

    // Addressing
    #[error("History index {index} is outside the retained window (start: {start:?}, length: {len})")]
    OutOfRange {
        index: usize,
        start: Option<usize>,
        len: usize,
    },

    #[error("Cannot write history index {index} past the end (length: {len})")]
    GapInHistory { index: usize, len: usize },

    // Cursor movement
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    // Layers
    #[error("Layer not found: {0}")]
    LayerNotFound(LayerId),

    #[error("Layer {0} is already in the stack")]
    DuplicateLayer(LayerId),
}

/// Errors raised while loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}
