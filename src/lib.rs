//! Editing-history engine for a raster image editor.
//!
//! A bounded undo/redo history with uncommitted "virtual" edits, and an
//! ordered layer collection built on it that knows how to move the current
//! selection through the render stack.

pub mod config;
pub mod error;
pub mod history;
pub mod layer;

pub use error::{ConfigError, HistoryError, HistoryResult};
pub use history::{HistoryBuffer, VersionedState, DEFAULT_CAPACITY};
pub use layer::{Edge, Layer, LayerId, LayerKind, LayerRecord, LayerSequence, LayerStack, Staging};
