//! The search-node graph: an arena of [`Node`]s indexed by [`NodeHandle`],
//! interned by state so that two trials reaching the same state share a
//! single node. Children are referenced by index rather than by pointer,
//! which keeps the graph free of reference cycles even though the
//! underlying transition structure can (and for most interesting problems,
//! does) contain cycles.

use std::hash::Hash;
use std::sync::Arc;

use fxhash::FxHashMap;

use crate::error::{PlannerError, Result};
use crate::implementation::bounds::BoundsFacade;
use crate::{Problem, IDX_INFINITY, PROB_MASS_SLACK};

/// A node handle into some [`NodeGraph`]'s arena.
pub use crate::common::NodeHandle;

/// A single edge out of a `QEntry`, taken with probability `obs_prob`
/// conditional on having chosen the owning action.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub obs_prob: f64,
    pub target: NodeHandle,
}

/// The cached action-value entry for one action at some node: its immediate
/// reward, its (sparse) outcome set, and the two scalars last produced by
/// [`cache_q`](crate::cache_q).
#[derive(Debug, Clone)]
pub struct QEntry {
    pub immediate_reward: f64,
    pub outcomes: Vec<Option<Edge>>,
    pub lb_val: f64,
    pub ub_val: f64,
}

/// A node in the search graph: a state, its current bounds, and (once
/// expanded) its action-value entries. Fringe nodes (`q_entries.is_empty()`)
/// have not yet been expanded; terminal nodes are fringe forever with
/// `lb_val = ub_val = 0`.
///
/// `idx`/`low`/`prio` are scratch fields owned by the trial strategies: `idx`
/// and `low` implement HDP's online strongly-connected-component labeling,
/// `prio` holds FRTDP's most recently computed priority. They default to
/// `IDX_INFINITY`/`0.0` and are meaningless outside the strategy that set
/// them.
#[derive(Debug, Clone)]
pub struct Node<S> {
    pub state: Arc<S>,
    pub lb_val: f64,
    pub ub_val: f64,
    pub q_entries: Vec<QEntry>,
    pub is_solved: bool,
    pub idx: usize,
    pub low: usize,
    pub prio: f64,
}

impl<S> Node<S> {
    /// A node that has not yet been expanded (terminal nodes stay fringe
    /// forever).
    pub fn is_fringe(&self) -> bool {
        self.q_entries.is_empty()
    }
}

/// An arena of [`Node`]s, interned by state. Owns the entire reachable
/// portion of the state space discovered so far.
#[derive(Debug)]
pub struct NodeGraph<S> {
    arena: Vec<Node<S>>,
    index: FxHashMap<Arc<S>, NodeHandle>,
}

impl<S: Eq + Hash> Default for NodeGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Eq + Hash> NodeGraph<S> {
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn node(&self, handle: NodeHandle) -> &Node<S> {
        &self.arena[handle.index()]
    }

    pub fn node_mut(&mut self, handle: NodeHandle) -> &mut Node<S> {
        &mut self.arena[handle.index()]
    }

    /// Looks up or creates the node for `state`, seeding its bounds from
    /// `bounds` when it is newly discovered. Terminal states always get
    /// `lb_val = ub_val = 0` regardless of what `bounds` would have reported.
    pub fn get_node(
        &mut self,
        state: S,
        problem: &dyn Problem<State = S>,
        bounds: &dyn BoundsFacade<State = S>,
    ) -> NodeHandle
    where
        S: Clone,
    {
        let arc_state = Arc::new(state);
        if let Some(handle) = self.index.get(&arc_state) {
            return *handle;
        }
        let terminal = problem.is_terminal_state(&arc_state);
        let (lb_val, ub_val) = if terminal {
            (0.0, 0.0)
        } else {
            let (lower, upper) = bounds.initial_bounds(&arc_state);
            (lower.unwrap_or(f64::NEG_INFINITY), upper)
        };
        let node = Node {
            state: Arc::clone(&arc_state),
            lb_val,
            ub_val,
            q_entries: Vec::new(),
            is_solved: terminal,
            idx: IDX_INFINITY,
            low: IDX_INFINITY,
            prio: 0.0,
        };
        let handle = NodeHandle(self.arena.len());
        self.arena.push(node);
        self.index.insert(arc_state, handle);
        handle
    }

    /// Expands a fringe node: calls `problem.outcomes` for every action,
    /// interning every outcome's successor state. Returns
    /// `PlannerError::Precondition` if an action's outcome probabilities do
    /// not sum to 1 within [`PROB_MASS_SLACK`] or if a reward is `NaN`.
    pub fn expand(
        &mut self,
        handle: NodeHandle,
        problem: &dyn Problem<State = S>,
        bounds: &dyn BoundsFacade<State = S>,
    ) -> Result<()>
    where
        S: Clone,
    {
        debug_assert!(
            self.node(handle).is_fringe(),
            "expand() called on an already-expanded node"
        );
        let state = Arc::clone(&self.node(handle).state);
        let num_actions = problem.num_actions(&state);
        let mut q_entries = Vec::with_capacity(num_actions);
        for action in 0..num_actions {
            let transition = problem.outcomes(&state, action);
            if transition.immediate_reward.is_nan() {
                return Err(PlannerError::Precondition(format!(
                    "action {action} produced a NaN immediate reward"
                )));
            }
            let mut mass = 0.0;
            let mut outcomes: Vec<Option<Edge>> = Vec::new();
            for outcome in &transition.outcomes {
                mass += outcome.prob;
                if outcome.id >= outcomes.len() {
                    outcomes.resize(outcome.id + 1, None);
                }
                let child = self.get_node(outcome.next_state.clone(), problem, bounds);
                outcomes[outcome.id] = Some(Edge {
                    obs_prob: outcome.prob,
                    target: child,
                });
            }
            if (mass - 1.0).abs() > PROB_MASS_SLACK {
                return Err(PlannerError::Precondition(format!(
                    "action {action} outcome probabilities sum to {mass}, expected 1"
                )));
            }
            q_entries.push(QEntry {
                immediate_reward: transition.immediate_reward,
                outcomes,
                lb_val: f64::NEG_INFINITY,
                ub_val: f64::INFINITY,
            });
        }
        self.node_mut(handle).q_entries = q_entries;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implementation::bounds::trivial::{InverseDiscountUpperBound, ZeroLowerBound};
    use crate::implementation::bounds::PointBounds;
    use crate::{Outcome, Transition};

    #[derive(Clone, Eq, PartialEq, Hash, Debug)]
    enum S {
        Start,
        Mid,
        Goal,
    }

    struct Chain;
    impl Problem for Chain {
        type State = S;
        fn discount(&self) -> f64 {
            0.9
        }
        fn initial_state(&self) -> S {
            S::Start
        }
        fn is_terminal_state(&self, s: &S) -> bool {
            matches!(s, S::Goal)
        }
        fn num_actions(&self, _: &S) -> usize {
            1
        }
        fn outcomes(&self, s: &S, _action: usize) -> Transition<S> {
            let next = match s {
                S::Start => S::Mid,
                S::Mid => S::Goal,
                S::Goal => unreachable!("terminal states are never expanded"),
            };
            Transition {
                immediate_reward: 1.0,
                outcomes: vec![Outcome {
                    id: 0,
                    prob: 1.0,
                    next_state: next,
                }],
            }
        }
        fn new_lower_bound(&self) -> Option<Box<dyn crate::Bound<State = S>>> {
            Some(Box::new(ZeroLowerBound))
        }
        fn new_upper_bound(&self) -> Box<dyn crate::Bound<State = S>> {
            Box::new(InverseDiscountUpperBound::new(0.9))
        }
    }

    fn bounds() -> PointBounds<S> {
        PointBounds::new(
            Some(Box::new(ZeroLowerBound)),
            Box::new(InverseDiscountUpperBound::new(0.9)),
        )
    }

    #[test]
    fn get_node_interns_repeated_states_to_the_same_handle() {
        let mut graph: NodeGraph<S> = NodeGraph::new();
        let b = bounds();
        let h1 = graph.get_node(S::Start, &Chain, &b);
        let h2 = graph.get_node(S::Start, &Chain, &b);
        assert_eq!(h1, h2);
        assert_eq!(1, graph.len());
    }

    #[test]
    fn terminal_states_get_zero_bounds_and_are_solved() {
        let mut graph: NodeGraph<S> = NodeGraph::new();
        let b = bounds();
        let h = graph.get_node(S::Goal, &Chain, &b);
        let node = graph.node(h);
        assert_eq!(0.0, node.lb_val);
        assert_eq!(0.0, node.ub_val);
        assert!(node.is_solved);
        assert!(node.is_fringe());
    }

    #[test]
    fn non_terminal_states_are_seeded_from_the_bounds_facade() {
        let mut graph: NodeGraph<S> = NodeGraph::new();
        let b = bounds();
        let h = graph.get_node(S::Start, &Chain, &b);
        let node = graph.node(h);
        assert_eq!(0.0, node.lb_val);
        assert!((10.0 - node.ub_val).abs() < 1e-9);
        assert!(!node.is_solved);
    }

    #[test]
    fn expand_populates_q_entries_and_interns_successors() {
        let mut graph: NodeGraph<S> = NodeGraph::new();
        let b = bounds();
        let h = graph.get_node(S::Start, &Chain, &b);
        graph.expand(h, &Chain, &b).unwrap();
        assert_eq!(1, graph.node(h).q_entries.len());
        assert_eq!(2, graph.len());
        let edge = graph.node(h).q_entries[0].outcomes[0].unwrap();
        assert_eq!(1.0, edge.obs_prob);
    }

    struct BadMass;
    impl Problem for BadMass {
        type State = S;
        fn discount(&self) -> f64 {
            0.9
        }
        fn initial_state(&self) -> S {
            S::Start
        }
        fn is_terminal_state(&self, s: &S) -> bool {
            matches!(s, S::Goal)
        }
        fn num_actions(&self, _: &S) -> usize {
            1
        }
        fn outcomes(&self, _s: &S, _action: usize) -> Transition<S> {
            Transition {
                immediate_reward: 1.0,
                outcomes: vec![Outcome {
                    id: 0,
                    prob: 0.5,
                    next_state: S::Goal,
                }],
            }
        }
        fn new_lower_bound(&self) -> Option<Box<dyn crate::Bound<State = S>>> {
            None
        }
        fn new_upper_bound(&self) -> Box<dyn crate::Bound<State = S>> {
            Box::new(InverseDiscountUpperBound::new(0.9))
        }
    }

    #[test]
    fn expand_rejects_outcome_probabilities_that_do_not_sum_to_one() {
        let mut graph: NodeGraph<S> = NodeGraph::new();
        let b = bounds();
        let h = graph.get_node(S::Start, &BadMass, &b);
        let err = graph.expand(h, &BadMass, &b).unwrap_err();
        assert!(matches!(err, PlannerError::Precondition(_)));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already-expanded")]
    fn re_expanding_an_interior_node_is_a_debug_assertion() {
        let mut graph: NodeGraph<S> = NodeGraph::new();
        let b = bounds();
        let h = graph.get_node(S::Start, &Chain, &b);
        graph.expand(h, &Chain, &b).unwrap();
        let _ = graph.expand(h, &Chain, &b);
    }
}
