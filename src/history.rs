//! Bounded undo/redo history.
//!
//! - [`HistoryBuffer`] - fixed-capacity log addressed by ever-increasing logical index
//! - [`VersionedState`] - committed/virtual value with undo and redo on top of the buffer

mod buffer;
mod versioned;


pub use buffer::HistoryBuffer;
pub use versioned::VersionedState;

/// History depth used when no capacity is given
pub const DEFAULT_CAPACITY: usize = 50;
