//! # hsvi-search
//! `hsvi-search` is a generic heuristic search value iteration engine for
//! solving (PO)MDPs. Rather than sweeping the full state space like classic
//! value iteration, it keeps an upper and a lower bound on the optimal value
//! function and runs repeated *trials* -- forward descents from the initial
//! state, biased toward the states still most uncertain, followed by a
//! backward pass that tightens the bounds it just visited. Four trial
//! strategies are provided, differing only in how a trial decides where to
//! descend and when to stop: [`RTDP`](implementation::strategy::rtdp),
//! [`LRTDP`](implementation::strategy::lrtdp) (Bonet & Geffner's "Labeled
//! RTDP"), [`HDP`](implementation::strategy::hdp) (Bonet & Geffner's
//! Tarjan-SCC-based labeling), and [`FRTDP`](implementation::strategy::frtdp)
//! (Smith & Simmons' "Focused RTDP"). The planner terminates as soon as the
//! bound gap at the initial state closes below a target precision (or, for
//! strategies that track only an upper bound, as soon as the greedy subtree
//! is labeled solved).
//!
//! ## Quick Example
//! The following solves a two-state chain MDP: a single action carries
//! `Start` to `Goal`, earning a reward of 1 on the way. This example is
//! intentionally the simplest possible (PO)MDP, since the point is to show
//! the shape of the `Problem`/`Bound`/`TrialDriver` triangle you need to
//! wire up, not to demonstrate an interesting planning problem.
//!
//! #### Describe the problem
//! The first thing to do is describe the dynamics of the (PO)MDP you want to
//! solve by implementing [`Problem`]. Its associated `State` type is whatever
//! hashable, cloneable representation you find convenient; the node graph
//! interns states behind an `Arc` so cloning one is cheap.
//! ```
//! use hsvi_search::*;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum ChainState {
//!     Start,
//!     Goal,
//! }
//!
//! struct Chain;
//! impl Problem for Chain {
//!     type State = ChainState;
//!
//!     fn discount(&self) -> f64 {
//!         0.95
//!     }
//!     fn initial_state(&self) -> Self::State {
//!         ChainState::Start
//!     }
//!     fn is_terminal_state(&self, state: &Self::State) -> bool {
//!         matches!(state, ChainState::Goal)
//!     }
//!     fn num_actions(&self, _state: &Self::State) -> usize {
//!         1
//!     }
//!     fn outcomes(&self, _state: &Self::State, _action: usize) -> Transition<Self::State> {
//!         Transition {
//!             immediate_reward: 1.0,
//!             outcomes: vec![Outcome { id: 0, prob: 1.0, next_state: ChainState::Goal }],
//!         }
//!     }
//!     fn new_lower_bound(&self) -> Option<Box<dyn Bound<State = Self::State>>> {
//!         Some(Box::new(trivial::ZeroLowerBound))
//!     }
//!     fn new_upper_bound(&self) -> Box<dyn Bound<State = Self::State>> {
//!         Box::new(trivial::InverseDiscountUpperBound::new(self.discount()))
//!     }
//! }
//! ```
//!
//! #### Wire up bounds and drive the planner
//! For a plain MDP, [`PointBounds`] wraps the scalar lower/upper bound pair
//! the problem mints. [`PlannerConfigBuilder`] picks a strategy (LRTDP by
//! default) and validates the resulting [`PlannerConfig`]; [`TrialDriver`]
//! then owns the node graph and repeatedly calls into the configured
//! strategy until the root converges.
//! ```
//! # use hsvi_search::*;
//! # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! # enum ChainState { Start, Goal }
//! # struct Chain;
//! # impl Problem for Chain {
//! #     type State = ChainState;
//! #     fn discount(&self) -> f64 { 0.95 }
//! #     fn initial_state(&self) -> Self::State { ChainState::Start }
//! #     fn is_terminal_state(&self, state: &Self::State) -> bool { matches!(state, ChainState::Goal) }
//! #     fn num_actions(&self, _state: &Self::State) -> usize { 1 }
//! #     fn outcomes(&self, _state: &Self::State, _action: usize) -> Transition<Self::State> {
//! #         Transition { immediate_reward: 1.0, outcomes: vec![Outcome { id: 0, prob: 1.0, next_state: ChainState::Goal }] }
//! #     }
//! #     fn new_lower_bound(&self) -> Option<Box<dyn Bound<State = Self::State>>> {
//! #         Some(Box::new(trivial::ZeroLowerBound))
//! #     }
//! #     fn new_upper_bound(&self) -> Box<dyn Bound<State = Self::State>> {
//! #         Box::new(trivial::InverseDiscountUpperBound::new(self.discount()))
//! #     }
//! # }
//! let problem = Chain;
//! let discount = problem.discount();
//! let bounds = PointBounds::new(
//!     Some(Box::new(trivial::ZeroLowerBound)),
//!     Box::new(trivial::InverseDiscountUpperBound::new(discount)),
//! );
//! let config = PlannerConfigBuilder::new().build(problem.is_pomdp()).unwrap();
//! let mut driver = TrialDriver::plan_init(Box::new(problem), Box::new(bounds), config);
//!
//! while !driver.root_converged() {
//!     driver.do_trial().unwrap();
//! }
//! let action = driver.choose_action(ChainState::Start).unwrap();
//! assert_eq!(0, action);
//! ```
//!
//! ## Going further
//! The four trial strategies live under [`implementation::strategy`](implementation::strategy); the
//! bounds facades (plain scalar [`PointBounds`] and the sawtooth/alpha-vector
//! [`ConvexBounds`] used for POMDPs) live under [`implementation::bounds`].
//! [`PlannerConfig`]'s fields and the `Strategy` variants they gate are the
//! natural place to start when tuning a run: RTDP's `depth_cap`, FRTDP's
//! `weight_threshold`, and HDP/LRTDP's `track_lower_bound` all trade search
//! effort for tighter termination guarantees.

mod common;
mod abstraction;
pub mod error;
mod implementation;

pub use abstraction::*;
pub use common::*;
pub use error::{PlannerError, Result};
pub use implementation::*;
