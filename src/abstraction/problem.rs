//! This module defines the basic abstractions a client implements when
//! describing an MDP or POMDP to be solved with heuristic search value
//! iteration. The single important abstraction a client must provide is
//! [`Problem`]; an admissible [`Bound`](crate::Bound) pair comes from the
//! problem itself via [`Problem::new_lower_bound`]/[`Problem::new_upper_bound`].

use crate::Bound;

/// One possible outcome of taking an action in some state: the id of the
/// outcome (used to index `QEntry::outcomes`), its probability, and the
/// state it leads to.
#[derive(Debug, Clone)]
pub struct Outcome<S> {
    pub id: usize,
    pub prob: f64,
    pub next_state: S,
}

/// The result of expanding `(state, action)`: the expected immediate reward
/// plus a sparse sequence of positive-probability outcomes. Outcomes need not
/// be dense or sorted by id; an id that never appears is taken to have
/// probability 0.
#[derive(Debug, Clone)]
pub struct Transition<S> {
    pub immediate_reward: f64,
    pub outcomes: Vec<Outcome<S>>,
}

/// This trait defines the "contract" of what defines a (PO)MDP solvable with
/// heuristic search value iteration. An implementation of this trait
/// effectively defines the dynamics of the problem being solved: a finite,
/// but possibly large, state set reachable from a known initial state, an
/// integer action space, finite per-action outcome sets, and a scalar
/// discounted reward.
pub trait Problem {
    /// The state type manipulated by this problem. Any implementation of
    /// `Problem` must specify what its own states look like.
    type State: Clone + Eq + std::hash::Hash;

    /// The discount factor `gamma` in `(0, 1]`.
    fn discount(&self) -> f64;

    /// Samples (deterministically or otherwise) the initial state of the
    /// problem.
    fn initial_state(&self) -> Self::State;

    /// Returns true iff `state` is terminal. Terminal states are created by
    /// the node graph with `lb_val = ub_val = 0` and no Q-entries.
    fn is_terminal_state(&self, state: &Self::State) -> bool;

    /// The number of actions available at `state`. May vary per state.
    fn num_actions(&self, state: &Self::State) -> usize;

    /// Expands `(state, action)` into its immediate reward and outcome set.
    /// `action` must be in `0..self.num_actions(state)`; outcome
    /// probabilities must sum to 1 within `crate::PROB_MASS_SLACK`. Violating
    /// either of these is a fatal precondition violation
    /// (`PlannerError::Precondition`) raised by the node graph at expansion
    /// time, not by this method itself.
    fn outcomes(&self, state: &Self::State, action: usize) -> Transition<Self::State>;

    /// Mints a fresh, uninitialized admissible lower bound for this problem.
    /// Returns `None` when this problem's value representation does not
    /// track a lower bound (e.g. plain RTDP/HDP without `track_lower_bound`).
    fn new_lower_bound(&self) -> Option<Box<dyn Bound<State = Self::State>>>;

    /// Mints a fresh, uninitialized admissible upper bound for this problem.
    fn new_upper_bound(&self) -> Box<dyn Bound<State = Self::State>>;

    /// Returns true iff this problem is partially observable. Gates the
    /// `ValueRepr::Convex` configuration option: it is a configuration error
    /// to request convex (alpha-vector) bounds for a fully-observable
    /// problem.
    fn is_pomdp(&self) -> bool {
        false
    }
}
