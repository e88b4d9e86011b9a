//! Selection-aware z-order permutations.
//!
//! Every operation keeps the relative order of the selected layers among
//! themselves and of the unselected layers among themselves. Capability and
//! movement both come from [`first_movable`], so a move reported as possible
//! always changes the order.

use std::rc::Rc;

use super::LayerRecord;

/// Which end of the render stack a move heads for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Top of the stack, highest index, drawn last
    Front,
    /// Bottom of the stack, index 0, drawn first
    Back,
}

/// Index of the selected layer closest to `edge` that is not already part of
/// the selected block sitting against `edge`.
///
/// Scans inward from `edge`: the first selected layer found after an
/// unselected one is movable. `None` when nothing is selected, everything is
/// selected, or the selection already hugs `edge`.
pub fn first_movable<L: LayerRecord>(layers: &[Rc<L>], edge: Edge) -> Option<usize> {
    let mut seen_unselected = false;
    let mut check = |i: usize| {
        if !layers[i].is_selected() {
            seen_unselected = true;
            false
        } else {
            seen_unselected
        }
    };

    match edge {
        Edge::Front => (0..layers.len()).rev().find(|&i| check(i)),
        Edge::Back => (0..layers.len()).find(|&i| check(i)),
    }
}

pub fn can_move<L: LayerRecord>(layers: &[Rc<L>], edge: Edge) -> bool {
    first_movable(layers, edge).is_some()
}

/// Move every selected layer one position toward `edge`.
///
/// Single adjacent-swap pass starting at `edge`: a selected layer whose
/// neighbour toward `edge` is unselected trades places with it. Returns
/// `None` when nothing can move.
pub fn step_toward<L: LayerRecord>(layers: &[Rc<L>], edge: Edge) -> Option<Vec<Rc<L>>> {
    first_movable(layers, edge)?;

    let mut next = layers.to_vec();
    match edge {
        Edge::Front => {
            for i in (0..next.len() - 1).rev() {
                if next[i].is_selected() && !next[i + 1].is_selected() {
                    next.swap(i, i + 1);
                }
            }
        }
        Edge::Back => {
            for i in 1..next.len() {
                if next[i].is_selected() && !next[i - 1].is_selected() {
                    next.swap(i - 1, i);
                }
            }
        }
    }
    Some(next)
}

/// Gather all selected layers into one block against `edge`.
///
/// Returns `None` when the selection already sits there.
pub fn jump_to<L: LayerRecord>(layers: &[Rc<L>], edge: Edge) -> Option<Vec<Rc<L>>> {
    first_movable(layers, edge)?;

    let (selected, unselected): (Vec<Rc<L>>, Vec<Rc<L>>) =
        layers.iter().cloned().partition(|layer| layer.is_selected());

    let next = match edge {
        Edge::Front => unselected.into_iter().chain(selected).collect(),
        Edge::Back => selected.into_iter().chain(unselected).collect(),
    };
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerId;

    /// Minimal record: a letter and a selection flag
    #[derive(Debug, Clone, PartialEq)]
    struct Tag(char, bool);

    impl LayerRecord for Tag {
        fn id(&self) -> LayerId {
            LayerId(self.0 as u64)
        }

        fn is_selected(&self) -> bool {
            self.1
        }

        fn set_selected(&mut self, selected: bool) {
            self.1 = selected;
        }

        fn duplicate(&self, _id: LayerId) -> Self {
            self.clone()
        }
    }

    /// Build from a pattern like "aBc": uppercase letters are selected
    fn tags(pattern: &str) -> Vec<Rc<Tag>> {
        pattern
            .chars()
            .map(|c| Rc::new(Tag(c.to_ascii_lowercase(), c.is_ascii_uppercase())))
            .collect()
    }

    fn pattern(layers: &[Rc<Tag>]) -> String {
        layers
            .iter()
            .map(|t| if t.1 { t.0.to_ascii_uppercase() } else { t.0 })
            .collect()
    }

    #[test]
    fn test_first_movable() {
        assert_eq!(first_movable(&tags("Abc"), Edge::Front), Some(0));
        assert_eq!(first_movable(&tags("abC"), Edge::Front), None);
        assert_eq!(first_movable(&tags("aBC"), Edge::Front), None);
        assert_eq!(first_movable(&tags("AbC"), Edge::Front), Some(0));
        assert_eq!(first_movable(&tags("AbC"), Edge::Back), Some(2));
        assert_eq!(first_movable(&tags("ABc"), Edge::Back), None);
    }

    #[test]
    fn test_step_forward_bubbles_each_selected_once() {
        assert_eq!(pattern(&step_toward(&tags("AbC"), Edge::Front).unwrap()), "bAC");
        assert_eq!(pattern(&step_toward(&tags("ABc"), Edge::Front).unwrap()), "cAB");
        assert_eq!(pattern(&step_toward(&tags("AbCd"), Edge::Front).unwrap()), "bAdC");
    }

    #[test]
    fn test_step_backward_bubbles_each_selected_once() {
        assert_eq!(pattern(&step_toward(&tags("aBC"), Edge::Back).unwrap()), "BCa");
        assert_eq!(pattern(&step_toward(&tags("AbC"), Edge::Back).unwrap()), "ACb");
        assert_eq!(pattern(&step_toward(&tags("aBcD"), Edge::Back).unwrap()), "BaDc");
    }

    #[test]
    fn test_jump_gathers_selection() {
        assert_eq!(pattern(&jump_to(&tags("AbCd"), Edge::Front).unwrap()), "bdAC");
        assert_eq!(pattern(&jump_to(&tags("aBcD"), Edge::Back).unwrap()), "BDac");
    }

    #[test]
    fn test_blocked_moves_return_none() {
        for layers in [tags(""), tags("a"), tags("A"), tags("abc"), tags("ABC")] {
            for edge in [Edge::Front, Edge::Back] {
                assert!(!can_move(&layers, edge));
                assert!(step_toward(&layers, edge).is_none());
                assert!(jump_to(&layers, edge).is_none());
            }
        }
        assert!(step_toward(&tags("aBC"), Edge::Front).is_none());
        assert!(jump_to(&tags("ABc"), Edge::Back).is_none());
    }
}
