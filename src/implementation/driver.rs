//! [`TrialDriver`]: the shared loop/timing/termination control used by all
//! four trial strategies. Owns the node graph, the problem, and the bounds
//! facade; repeatedly calls into the configured strategy's `do_trial` until
//! the root converges or a wall-clock budget runs out.

use std::hash::Hash;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::error::Result;
use crate::implementation::backup::{max_lb_action, max_ub_action};
use crate::implementation::bounds::BoundsFacade;
use crate::implementation::bounds_log::BoundsLog;
use crate::implementation::config::{PlannerConfig, Strategy};
use crate::implementation::graph::NodeGraph;
use crate::implementation::strategy::{frtdp, hdp, lrtdp, rtdp};
use crate::{NodeHandle, Problem};

/// Drives repeated trials of whichever [`Strategy`] the supplied
/// [`PlannerConfig`] selects, against a node graph it owns exclusively.
pub struct TrialDriver<S> {
    graph: NodeGraph<S>,
    problem: Box<dyn Problem<State = S>>,
    bounds: Box<dyn BoundsFacade<State = S>>,
    config: PlannerConfig,
    root: NodeHandle,
    track_lower_bound: bool,
    trial_count: u64,
    start: Instant,
    bounds_log: BoundsLog,
    rng: Option<SmallRng>,
}

impl<S: Clone + Eq + Hash> TrialDriver<S> {
    /// `plan_init`: initializes the bounds facade, interns the initial
    /// state as the root node, and resolves whether a lower bound is
    /// tracked for the remainder of the run.
    pub fn plan_init(
        problem: Box<dyn Problem<State = S>>,
        mut bounds: Box<dyn BoundsFacade<State = S>>,
        config: PlannerConfig,
    ) -> Self {
        bounds.initialize(config.target_precision);
        let mut graph = NodeGraph::new();
        let initial_state = problem.initial_state();
        let root = graph.get_node(initial_state, problem.as_ref(), bounds.as_ref());
        let track_lower_bound = config.tracks_lower_bound(problem.new_lower_bound().is_some());
        let rng = match config.strategy {
            Strategy::Rtdp { seed, .. } => Some(SmallRng::seed_from_u64(seed)),
            _ => None,
        };
        Self {
            graph,
            problem,
            bounds,
            root,
            track_lower_bound,
            trial_count: 0,
            start: Instant::now(),
            bounds_log: BoundsLog::new(config.min_order, config.max_order),
            config,
            rng,
        }
    }

    /// `root_converged`: `root.ub_val - root.lb_val <= epsilon` when a
    /// lower bound is tracked, otherwise `root.is_solved` (RTDP without a
    /// lower bound has no bound-gap stopping rule and converges only via
    /// labeling or timeout).
    pub fn root_converged(&self) -> bool {
        let root = self.graph.node(self.root);
        if self.track_lower_bound {
            root.ub_val - root.lb_val <= self.config.target_precision
        } else {
            root.is_solved
        }
    }

    /// Runs a single trial of the configured strategy.
    pub fn do_trial(&mut self) -> Result<()> {
        match self.config.strategy {
            Strategy::Rtdp { depth_cap, .. } => {
                let rng = self.rng.as_mut().expect("TrialDriver always seeds an rng for Strategy::Rtdp");
                rtdp::do_trial(
                    &mut self.graph,
                    self.root,
                    self.problem.as_ref(),
                    self.bounds.as_mut(),
                    self.track_lower_bound,
                    depth_cap,
                    rng,
                )?;
            }
            Strategy::Lrtdp => {
                lrtdp::do_trial(
                    &mut self.graph,
                    self.root,
                    self.problem.as_ref(),
                    self.bounds.as_mut(),
                    self.track_lower_bound,
                    self.config.target_precision,
                )?;
            }
            Strategy::Hdp { .. } => {
                hdp::do_trial(
                    &mut self.graph,
                    self.root,
                    self.problem.as_ref(),
                    self.bounds.as_mut(),
                    self.track_lower_bound,
                    self.config.target_precision,
                )?;
            }
            Strategy::Frtdp { weight_threshold } => {
                frtdp::do_trial(
                    &mut self.graph,
                    self.root,
                    self.problem.as_ref(),
                    self.bounds.as_mut(),
                    weight_threshold,
                )?;
            }
        }
        self.trial_count += 1;
        log::trace!(
            "trial {} complete: root bounds = [{}, {}]",
            self.trial_count,
            self.graph.node(self.root).lb_val,
            self.graph.node(self.root).ub_val
        );
        self.maybe_emit_bounds_log();
        Ok(())
    }

    fn maybe_emit_bounds_log(&mut self) {
        let elapsed = self.start.elapsed().as_secs_f64();
        let node = self.graph.node(self.root);
        self.bounds_log.maybe_record(elapsed, node.lb_val, node.ub_val);
    }

    /// `plan_fixed_time`: runs trials until `root_converged()` or until
    /// `wall_budget` seconds have elapsed, whichever comes first. Returns
    /// whether the root converged.
    pub fn plan_fixed_time(&mut self, wall_budget: std::time::Duration) -> Result<bool> {
        let deadline = Instant::now() + wall_budget;
        while !self.root_converged() && Instant::now() < deadline {
            self.do_trial()?;
        }
        Ok(self.root_converged())
    }

    /// `choose_action`: interns `state` if new, ensures it is expanded and
    /// backed up, then returns its greedy action -- `argmax_a
    /// Q[a].lb_val` when a lower bound is tracked, `argmax_a Q[a].ub_val`
    /// otherwise.
    pub fn choose_action(&mut self, state: S) -> Result<usize> {
        let handle = self.graph.get_node(state, self.problem.as_ref(), self.bounds.as_ref());
        if self.graph.node(handle).is_fringe() {
            self.graph.expand(handle, self.problem.as_ref(), self.bounds.as_ref())?;
            crate::implementation::backup::update(
                &mut self.graph,
                handle,
                self.problem.discount(),
                self.track_lower_bound,
            )?;
            self.bounds.on_backup(self.graph.node(handle));
        }
        let action = if self.track_lower_bound {
            max_lb_action(&self.graph, handle)
        } else {
            max_ub_action(&self.graph, handle)
        };
        Ok(action)
    }

    /// `value_at`: the current `(lower, upper)` bounds at `state`,
    /// interning it if new.
    pub fn value_at(&mut self, state: S) -> (f64, f64) {
        let handle = self.graph.get_node(state, self.problem.as_ref(), self.bounds.as_ref());
        let node = self.graph.node(handle);
        (node.lb_val, node.ub_val)
    }

    pub fn root(&self) -> NodeHandle {
        self.root
    }

    pub fn trial_count(&self) -> u64 {
        self.trial_count
    }

    pub fn bounds_log(&self) -> &BoundsLog {
        &self.bounds_log
    }

    pub fn graph(&self) -> &NodeGraph<S> {
        &self.graph
    }
}
