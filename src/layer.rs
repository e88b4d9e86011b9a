//! Ordered layer collection with history and selection-aware reordering.
//!
//! Layers are kept back to front: index `0` is drawn first (bottom of the
//! render stack), the last index is drawn last (top).
//!
//! ## Module Structure
//!
//! - [`record`] - the `Layer` record and its kinds
//! - [`sequence`] - per-stack id and default-name generator
//! - [`stack`] - `LayerStack`, the history-backed collection controller
//! - [`reorder`] - forward/backward/front/back permutations of the selection

pub mod record;
pub mod reorder;
pub mod sequence;
pub mod stack;


use std::fmt;

pub use record::{Layer, LayerKind, Transform};
pub use reorder::Edge;
pub use sequence::LayerSequence;
pub use stack::{LayerList, LayerStack, Staging};

/// Unique layer identifier, assigned by a [`LayerSequence`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the collection controller and the reordering engine need from a record.
///
/// Everything else about a record is opaque payload that is only ever copied.
pub trait LayerRecord: Clone {
    fn id(&self) -> LayerId;

    /// Selected records are the ones bulk edits and reorders act on
    fn is_selected(&self) -> bool;

    fn set_selected(&mut self, selected: bool);

    /// A copy of this record under a new identifier
    fn duplicate(&self, id: LayerId) -> Self;
}
