//! This module defines the most basic data types that are used throughout all
//! the code of this crate (both at the abstraction and implementation
//! levels). These are also the types your client code is likely to work with.

// ----------------------------------------------------------------------------
// --- ACTION -------------------------------------------------------------
// ----------------------------------------------------------------------------
/// An action is nothing but an index into the (possibly state-dependent) set
/// of actions available at some state. Actions are numbered `0..num_actions(s)`.
pub type Action = usize;

// ----------------------------------------------------------------------------
// --- NODE HANDLE --------------------------------------------------------
// ----------------------------------------------------------------------------
/// A handle to a [`Node`](crate::Node) stored in the arena owned by a
/// [`NodeGraph`](crate::NodeGraph). Cheap to copy, cheap to hash; the only way
/// client code (and edges) ever reach a node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeHandle(pub(crate) usize);
impl NodeHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Sentinel value for `Node::idx` / `Node::low`, meaning "not currently part
/// of any Tarjan traversal" -- i.e. the spec's `+infinity`.
pub const IDX_INFINITY: usize = usize::MAX;

/// The numerical tolerance used when deciding whether a backup has violated
/// bound admissibility (a fresh upper bound higher than the previous one, or
/// a fresh lower bound lower than the previous one, by more than this much).
pub const EPS_SLACK: f64 = 1e-9;

/// The tolerance used when validating that an outcome distribution sums to 1.
pub const PROB_MASS_SLACK: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_handle_round_trips_its_index() {
        let h = NodeHandle(42);
        assert_eq!(42, h.index());
    }
}
