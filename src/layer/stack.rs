use std::rc::Rc;

use tracing::debug;

use super::reorder::{self, Edge};
use super::{Layer, LayerId, LayerRecord, LayerSequence};
use crate::error::{HistoryError, HistoryResult};
use crate::history::VersionedState;

/// Back-to-front list of layers as stored in one history entry.
///
/// Records are shared between snapshots; an edit replaces the `Rc` of the
/// records it touches and leaves every other `Rc` as it was.
pub type LayerList<L = Layer> = Vec<Rc<L>>;

/// Whether an edit becomes a history step or only a preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staging {
    /// Write a new history entry
    Commit,
    /// Change what readers see, leaving history untouched
    Virtual,
}

/// History-backed layer collection.
///
/// All reads see the current state, virtual edits included. Every mutation
/// builds a new list, so snapshots held by the history are never modified.
#[derive(Debug, Clone)]
pub struct LayerStack<L: LayerRecord = Layer> {
    state: VersionedState<LayerList<L>>,
    sequence: LayerSequence,
}

impl<L: LayerRecord> Default for LayerStack<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: LayerRecord> LayerStack<L> {
    /// Empty stack with the default history capacity
    pub fn new() -> Self {
        Self {
            state: VersionedState::new(Vec::new()),
            sequence: LayerSequence::new(),
        }
    }

    /// Empty stack keeping at most `capacity` history entries
    pub fn with_capacity(capacity: usize) -> HistoryResult<Self> {
        Self::from_layers(Vec::new(), capacity)
    }

    /// Stack starting from `layers` (back to front) as its only history entry
    pub fn from_layers(layers: Vec<L>, capacity: usize) -> HistoryResult<Self> {
        let mut sequence = LayerSequence::new();
        sequence.skip_past(layers.iter().map(|layer| layer.id()));
        let list: LayerList<L> = layers.into_iter().map(Rc::new).collect();
        Ok(Self {
            state: VersionedState::with_capacity(list, capacity)?,
            sequence,
        })
    }

    /// Replace the id/name generator. It is moved past every id the stack
    /// or its retained history holds, so undo can never revive a clash.
    pub fn with_sequence(mut self, sequence: LayerSequence) -> Self {
        self.sequence = sequence;
        let ids = self.known_ids();
        self.sequence.skip_past(ids);
        self
    }

    // === Reads ===

    pub fn layers(&self) -> &[Rc<L>] {
        self.state.current_state()
    }

    pub fn len(&self) -> usize {
        self.layers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers().is_empty()
    }

    pub fn position(&self, id: LayerId) -> Option<usize> {
        self.layers().iter().position(|layer| layer.id() == id)
    }

    pub fn get(&self, id: LayerId) -> Option<&Rc<L>> {
        self.layers().iter().find(|layer| layer.id() == id)
    }

    pub fn selected_ids(&self) -> Vec<LayerId> {
        self.layers()
            .iter()
            .filter(|layer| layer.is_selected())
            .map(|layer| layer.id())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.layers().iter().filter(|layer| layer.is_selected()).count()
    }

    pub fn has_selection(&self) -> bool {
        self.layers().iter().any(|layer| layer.is_selected())
    }

    pub fn history(&self) -> &VersionedState<LayerList<L>> {
        &self.state
    }

    pub fn sequence_mut(&mut self) -> &mut LayerSequence {
        &mut self.sequence
    }

    // === History ===

    pub fn can_undo(&self) -> bool {
        self.state.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.can_redo()
    }

    pub fn undo(&mut self) -> HistoryResult<()> {
        self.state.undo()
    }

    pub fn redo(&mut self) -> HistoryResult<()> {
        self.state.redo()
    }

    pub fn commit_virtual_state(&mut self) -> HistoryResult<()> {
        self.state.commit_virtual_state()
    }

    pub fn discard_virtual_state(&mut self) -> HistoryResult<()> {
        self.state.discard_virtual_state()
    }

    pub fn has_pending_changes(&self) -> bool {
        self.state.has_pending_changes()
    }

    // === Edits ===

    /// Put `layer` on top of the stack (`at_front`) or underneath everything.
    ///
    /// Fails if a layer with the same id is already present.
    pub fn add_layer(&mut self, layer: L, at_front: bool) -> HistoryResult<()> {
        if self.position(layer.id()).is_some() {
            return Err(HistoryError::DuplicateLayer(layer.id()));
        }
        debug!(id = %layer.id(), at_front, "adding layer");
        self.sequence.skip_past([layer.id()]);
        let layer = Rc::new(layer);
        let mut next = Vec::with_capacity(self.len() + 1);
        if at_front {
            next.extend_from_slice(self.layers());
            next.push(layer);
        } else {
            next.push(layer);
            next.extend_from_slice(self.layers());
        }
        self.state.set_state(next)
    }

    /// Replace the layer with `id` by `f(layer)`
    pub fn update_layer<F>(&mut self, id: LayerId, f: F, staging: Staging) -> HistoryResult<()>
    where
        F: FnOnce(&L) -> L,
    {
        let pos = self.position(id).ok_or(HistoryError::LayerNotFound(id))?;
        let mut next = self.layers().to_vec();
        let edited = Rc::new(f(next[pos].as_ref()));
        next[pos] = edited;
        self.apply(next, staging)
    }

    /// Replace every selected layer by `f(layer)`; unselected ones keep their `Rc`
    pub fn edit_selected_layers<F>(&mut self, mut f: F, staging: Staging) -> HistoryResult<()>
    where
        F: FnMut(&L) -> L,
    {
        let next = self
            .layers()
            .iter()
            .map(|layer| {
                if layer.is_selected() {
                    Rc::new(f(layer.as_ref()))
                } else {
                    Rc::clone(layer)
                }
            })
            .collect();
        self.apply(next, staging)
    }

    pub fn delete_selected_layers(&mut self) -> HistoryResult<()> {
        debug!(count = self.selected_count(), "deleting selected layers");
        let next = self
            .layers()
            .iter()
            .filter(|layer| !layer.is_selected())
            .cloned()
            .collect();
        self.state.set_state(next)
    }

    /// Follow each selected layer with a copy under a fresh id
    pub fn duplicate_selected_layers(&mut self) -> HistoryResult<()> {
        debug!(count = self.selected_count(), "duplicating selected layers");
        let mut next = Vec::with_capacity(self.len() + self.selected_count());
        for layer in self.state.current_state() {
            next.push(Rc::clone(layer));
            if layer.is_selected() {
                next.push(Rc::new(layer.duplicate(self.sequence.next_id())));
            }
        }
        self.state.set_state(next)
    }

    // === Selection ===

    /// Select `id` and deselect everything else
    pub fn select_only(&mut self, id: LayerId) -> HistoryResult<()> {
        if self.position(id).is_none() {
            return Err(HistoryError::LayerNotFound(id));
        }
        let next = self.with_selection(|layer| layer.id() == id);
        self.state.set_state(next)
    }

    pub fn toggle_selected(&mut self, id: LayerId) -> HistoryResult<()> {
        self.update_layer(
            id,
            |layer| {
                let mut next = layer.clone();
                next.set_selected(!layer.is_selected());
                next
            },
            Staging::Commit,
        )
    }

    pub fn select_all(&mut self) -> HistoryResult<()> {
        let next = self.with_selection(|_| true);
        self.state.set_state(next)
    }

    pub fn clear_selection(&mut self) -> HistoryResult<()> {
        let next = self.with_selection(|_| false);
        self.state.set_state(next)
    }

    // === Reordering ===

    pub fn can_move_layers_forward(&self) -> bool {
        reorder::can_move(self.layers(), Edge::Front)
    }

    pub fn can_move_layers_backward(&self) -> bool {
        reorder::can_move(self.layers(), Edge::Back)
    }

    pub fn can_bring_layers_to_front(&self) -> bool {
        reorder::can_move(self.layers(), Edge::Front)
    }

    pub fn can_send_layers_to_back(&self) -> bool {
        reorder::can_move(self.layers(), Edge::Back)
    }

    /// Move each selected layer one step toward the front. Returns whether anything moved.
    pub fn move_layers_forward(&mut self) -> HistoryResult<bool> {
        let next = reorder::step_toward(self.layers(), Edge::Front);
        self.reorder(next, "move forward")
    }

    /// Move each selected layer one step toward the back. Returns whether anything moved.
    pub fn move_layers_backward(&mut self) -> HistoryResult<bool> {
        let next = reorder::step_toward(self.layers(), Edge::Back);
        self.reorder(next, "move backward")
    }

    pub fn bring_layers_to_front(&mut self) -> HistoryResult<bool> {
        let next = reorder::jump_to(self.layers(), Edge::Front);
        self.reorder(next, "bring to front")
    }

    pub fn send_layers_to_back(&mut self) -> HistoryResult<bool> {
        let next = reorder::jump_to(self.layers(), Edge::Back);
        self.reorder(next, "send to back")
    }

    fn reorder(&mut self, next: Option<LayerList<L>>, op: &str) -> HistoryResult<bool> {
        match next {
            Some(next) => {
                debug!(op, "reordering layers");
                self.state.set_state(next)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Ids held by the current state or any retained history entry
    fn known_ids(&self) -> Vec<LayerId> {
        self.state
            .history()
            .iter()
            .flat_map(|(_, layers)| layers.iter())
            .chain(self.layers())
            .map(|layer| layer.id())
            .collect()
    }

    fn apply(&mut self, next: LayerList<L>, staging: Staging) -> HistoryResult<()> {
        match staging {
            Staging::Commit => self.state.set_state(next),
            Staging::Virtual => {
                self.state.set_virtual_state(next);
                Ok(())
            }
        }
    }

    fn with_selection<P>(&self, selected: P) -> LayerList<L>
    where
        P: Fn(&L) -> bool,
    {
        self.layers()
            .iter()
            .map(|layer| {
                let want = selected(layer.as_ref());
                if layer.is_selected() == want {
                    Rc::clone(layer)
                } else {
                    let mut next = L::clone(layer.as_ref());
                    next.set_selected(want);
                    Rc::new(next)
                }
            })
            .collect()
    }
}

impl LayerStack<Layer> {
    /// New empty raster layer with a default name, not yet added
    pub fn new_layer(&mut self, width: u32, height: u32) -> Layer {
        let id = self.sequence.next_id();
        let name = self.sequence.next_name();
        Layer::new(id, name, super::LayerKind::Raster { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::DEFAULT_CAPACITY;
    use crate::layer::LayerKind;

    #[test]
    fn test_new_stack_is_empty() {
        let stack: LayerStack = LayerStack::new();
        assert!(stack.is_empty());
        assert!(!stack.can_undo());
        assert_eq!(stack.history().capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_new_layer_uses_sequence() {
        let mut stack: LayerStack = LayerStack::new().with_sequence(LayerSequence::starting_at(7));
        let layer = stack.new_layer(10, 20);
        assert_eq!(layer.id, LayerId(7));
        assert_eq!(layer.name, "Layer 7");
        assert_eq!(layer.kind, LayerKind::Raster { width: 10, height: 20 });
        assert!(stack.is_empty());
    }

    #[test]
    fn test_from_layers_skips_existing_ids() {
        let layers = vec![
            Layer::new(LayerId(3), "a", LayerKind::Fill { color: [0; 4] }),
            Layer::new(LayerId(8), "b", LayerKind::Fill { color: [0; 4] }),
        ];
        let mut stack = LayerStack::from_layers(layers, 5).unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.sequence_mut().next_id(), LayerId(9));
        assert!(!stack.can_undo());
    }
}
