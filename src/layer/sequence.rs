use super::LayerId;

/// Source of fresh layer ids and default layer names.
///
/// Each `LayerStack` owns one, so independent editing sessions never share
/// a counter and tests can start from a known value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSequence {
    next_id: u64,
    next_name: u64,
}

impl Default for LayerSequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl LayerSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start both counters at `first`
    pub fn starting_at(first: u64) -> Self {
        Self {
            next_id: first,
            next_name: first,
        }
    }

    /// Make sure future ids are greater than every id in `ids`.
    ///
    /// The name counter moves along with it, so the first layer added to a
    /// preloaded stack is named after the id it receives.
    pub fn skip_past(&mut self, ids: impl IntoIterator<Item = LayerId>) {
        if let Some(max) = ids.into_iter().map(|id| id.0).max() {
            let first_free = max.saturating_add(1);
            self.next_id = self.next_id.max(first_free);
            self.next_name = self.next_name.max(first_free);
        }
    }

    pub fn next_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// "Layer 1", "Layer 2", ...
    pub fn next_name(&mut self) -> String {
        let name = format!("Layer {}", self.next_name);
        self.next_name = self.next_name.saturating_add(1);
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_and_names_increment_independently() {
        let mut seq = LayerSequence::new();
        assert_eq!(seq.next_id(), LayerId(1));
        assert_eq!(seq.next_id(), LayerId(2));
        assert_eq!(seq.next_name(), "Layer 1");
        assert_eq!(seq.next_id(), LayerId(3));
        assert_eq!(seq.next_name(), "Layer 2");
    }

    #[test]
    fn test_sequences_do_not_leak_between_instances() {
        let mut a = LayerSequence::new();
        let mut b = LayerSequence::new();
        a.next_id();
        a.next_name();
        assert_eq!(b.next_id(), LayerId(1));
        assert_eq!(b.next_name(), "Layer 1");
    }

    #[test]
    fn test_skip_past_existing_ids() {
        let mut seq = LayerSequence::starting_at(1);
        seq.skip_past([LayerId(4), LayerId(10), LayerId(2)]);
        assert_eq!(seq.next_id(), LayerId(11));

        // never moves backwards
        seq.skip_past([LayerId(3)]);
        assert_eq!(seq.next_id(), LayerId(12));
    }

    #[test]
    fn test_skip_past_moves_name_counter() {
        let mut seq = LayerSequence::new();
        seq.skip_past([LayerId(1)]);
        assert_eq!(seq.next_id(), LayerId(2));
        assert_eq!(seq.next_name(), "Layer 2");

        // a sequence already ahead keeps its names
        let mut seq = LayerSequence::starting_at(7);
        seq.skip_past([LayerId(2)]);
        assert_eq!(seq.next_name(), "Layer 7");
    }

    #[test]
    fn test_skip_past_max_id_does_not_overflow() {
        let mut seq = LayerSequence::new();
        seq.skip_past([LayerId(u64::MAX)]);
        assert_eq!(seq.next_id(), LayerId(u64::MAX));
        assert_eq!(seq.next_id(), LayerId(u64::MAX));
    }
}
