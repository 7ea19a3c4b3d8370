//! Bounds facades: the glue between the per-state scalar [`Bound`](crate::Bound)
//! trait a client supplies and the node graph, which needs to seed every
//! newly discovered node with an initial `(lb_val, ub_val)` pair and, for
//! convex (alpha-vector) value representations, needs to be told about every
//! backup so it can maintain its vector-valued representation.

pub mod trivial;
pub mod point;
pub mod convex;

pub use point::PointBounds;
pub use convex::{AlphaVector, ConvexBounds};

use crate::Node;

/// The facade the node graph and trial strategies talk to when they need
/// bounds for a newly discovered state, or need to report a completed
/// backup. [`PointBounds`] is a thin pass-through to the client's
/// [`Bound`](crate::Bound) pair; [`ConvexBounds`] additionally maintains a
/// vector-valued representation for POMDP belief states.
pub trait BoundsFacade {
    type State;

    /// Called once, before planning starts.
    fn initialize(&mut self, target_precision: f64);

    /// Returns the initial `(lower, upper)` bounds for a freshly discovered
    /// non-terminal state. `lower` is `None` when this facade does not track
    /// a lower bound at all.
    fn initial_bounds(&self, state: &Self::State) -> (Option<f64>, f64);

    /// Called after every completed backup at `node`. The default does
    /// nothing; [`ConvexBounds`] overrides it to fold the backup into its
    /// vector representation.
    fn on_backup(&mut self, _node: &Node<Self::State>) {}
}
