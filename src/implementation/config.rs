//! The planner configuration: a small, validated, constructor-checked
//! struct built through [`PlannerConfigBuilder`], in the same spirit as the
//! teacher crate's `mdd_builder`/`CompilationInput` construction idiom --
//! focused structs instead of a stringly-typed option map.

use crate::error::{PlannerError, Result};

/// Which trial strategy drives the search, plus the handful of numeric
/// knobs each strategy needs that the other three don't.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    /// Samples outcomes by probability with a seeded PRNG; does not
    /// provably terminate, so descent is capped at `depth_cap` steps.
    Rtdp { seed: u64, depth_cap: usize },
    /// Deterministic descent with a check-solved sweep after every trial.
    Lrtdp,
    /// Deterministic descent with online Tarjan SCC labeling.
    /// `track_lower_bound` mirrors the reference implementation's
    /// `USE_HDP_LOWER_BOUND` compile-time flag, as a runtime option.
    Hdp { track_lower_bound: bool },
    /// Priority-weighted outcome choice; descent stops once the
    /// cumulative trajectory weight falls below `weight_threshold`.
    Frtdp { weight_threshold: f64 },
}

/// Whether the node graph's bounds facade is a plain scalar pair
/// ([`Point`](ValueRepr::Point)) or a POMDP alpha-vector/sawtooth
/// representation ([`Convex`](ValueRepr::Convex)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRepr {
    Point,
    Convex,
}

/// Validated planner configuration. Construct through
/// [`PlannerConfigBuilder`]; there is no public constructor that skips
/// validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfig {
    pub strategy: Strategy,
    pub value_repr: ValueRepr,
    pub use_heuristic: bool,
    pub target_precision: f64,
    pub num_iterations: i32,
    pub min_order: i32,
    pub max_order: i32,
    pub max_wall_seconds: f64,
}

impl PlannerConfig {
    /// Resolves whether the planner should maintain a lower bound, folding
    /// in both whether the problem supplies one at all and, for HDP,
    /// whether `track_lower_bound` was requested.
    pub fn tracks_lower_bound(&self, problem_has_lower_bound: bool) -> bool {
        if !problem_has_lower_bound {
            return false;
        }
        match self.strategy {
            Strategy::Hdp { track_lower_bound } => track_lower_bound,
            _ => true,
        }
    }
}

/// Builder for [`PlannerConfig`]. Defaults: `target_precision = 1e-3`,
/// `num_iterations = 0`, `min_order = -3`, `max_order = 6`,
/// `max_wall_seconds = -1.0` (strategy-chosen budget), `use_heuristic =
/// true`, `value_repr = Point`, `strategy = Lrtdp`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfigBuilder {
    strategy: Strategy,
    value_repr: ValueRepr,
    use_heuristic: bool,
    target_precision: f64,
    num_iterations: i32,
    min_order: i32,
    max_order: i32,
    max_wall_seconds: f64,
}

impl Default for PlannerConfigBuilder {
    fn default() -> Self {
        Self {
            strategy: Strategy::Lrtdp,
            value_repr: ValueRepr::Point,
            use_heuristic: true,
            target_precision: 1e-3,
            num_iterations: 0,
            min_order: -3,
            max_order: 6,
            max_wall_seconds: -1.0,
        }
    }
}

impl PlannerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn value_repr(mut self, value_repr: ValueRepr) -> Self {
        self.value_repr = value_repr;
        self
    }

    pub fn use_heuristic(mut self, use_heuristic: bool) -> Self {
        self.use_heuristic = use_heuristic;
        self
    }

    pub fn target_precision(mut self, target_precision: f64) -> Self {
        self.target_precision = target_precision;
        self
    }

    pub fn num_iterations(mut self, num_iterations: i32) -> Self {
        self.num_iterations = num_iterations;
        self
    }

    pub fn bounds_log_order_range(mut self, min_order: i32, max_order: i32) -> Self {
        self.min_order = min_order;
        self.max_order = max_order;
        self
    }

    pub fn max_wall_seconds(mut self, max_wall_seconds: f64) -> Self {
        self.max_wall_seconds = max_wall_seconds;
        self
    }

    /// Validates and builds the configuration. `is_pomdp` must reflect the
    /// problem this configuration will plan over: `ValueRepr::Convex` is a
    /// configuration error for a fully-observable problem.
    pub fn build(self, is_pomdp: bool) -> Result<PlannerConfig> {
        if self.value_repr == ValueRepr::Convex && !is_pomdp {
            return Err(PlannerError::Configuration(
                "value_repr = Convex requires a POMDP problem".into(),
            ));
        }
        if self.target_precision <= 0.0 {
            return Err(PlannerError::Configuration(format!(
                "target_precision must be positive, got {}",
                self.target_precision
            )));
        }
        if self.min_order > self.max_order {
            return Err(PlannerError::Configuration(format!(
                "min_order ({}) must not exceed max_order ({})",
                self.min_order, self.max_order
            )));
        }
        if let Strategy::Frtdp { weight_threshold } = self.strategy {
            if weight_threshold <= 0.0 {
                return Err(PlannerError::Configuration(format!(
                    "frtdp weight_threshold must be positive, got {weight_threshold}"
                )));
            }
        }
        Ok(PlannerConfig {
            strategy: self.strategy,
            value_repr: self.value_repr,
            use_heuristic: self.use_heuristic,
            target_precision: self.target_precision,
            num_iterations: self.num_iterations,
            min_order: self.min_order,
            max_order: self.max_order,
            max_wall_seconds: self.max_wall_seconds,
        })
    }
}
