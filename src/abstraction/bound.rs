//! This module defines the [`Bound`] abstraction: an admissible scalar value
//! estimator queried whenever the node graph discovers a new fringe state.

/// An admissible bound (either lower or upper, direction is a property of how
/// the bound is used, not of this trait) on the optimal value function.
/// Implementations are free to do arbitrarily expensive precomputation in
/// [`initialize`](Bound::initialize); [`value_at`](Bound::value_at) is called
/// once per newly discovered state and should be cheap.
pub trait Bound {
    /// The state type this bound estimates over; always matches the
    /// `Problem::State` it was minted for.
    type State;

    /// Called once before the first query. Expensive precomputation (e.g.
    /// solving a relaxation, building a sawtooth support set) belongs here.
    fn initialize(&mut self, target_precision: f64);

    /// Returns an admissible estimate of the optimal value at `state`.
    fn value_at(&self, state: &Self::State) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstantBound(f64);
    impl Bound for ConstantBound {
        type State = ();
        fn initialize(&mut self, _target_precision: f64) {}
        fn value_at(&self, _state: &Self::State) -> f64 {
            self.0
        }
    }

    #[test]
    fn a_constant_bound_always_returns_the_same_value() {
        let mut b = ConstantBound(4.2);
        b.initialize(1e-3);
        assert_eq!(4.2, b.value_at(&()));
    }
}
