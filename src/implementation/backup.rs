//! The Bellman backup operator: [`cache_q`] recomputes every action's cached
//! value from its children's current bounds, [`update`] additionally folds
//! those action values back up into the node's own bounds (enforcing
//! admissibility), and [`residual`] measures how much a node's own upper
//! bound disagrees with its best action's cached value.

use crate::error::{PlannerError, Result};
use crate::implementation::graph::NodeGraph;
use crate::{NodeHandle, EPS_SLACK};

/// The index of the action with the highest cached `ub_val`; ties break
/// toward the smallest index.
pub fn max_ub_action<S>(graph: &NodeGraph<S>, handle: NodeHandle) -> usize {
    let node = graph.node(handle);
    debug_assert!(!node.is_fringe(), "max_ub_action called on a fringe node");
    let mut best = 0;
    let mut best_val = f64::NEG_INFINITY;
    for (action, q) in node.q_entries.iter().enumerate() {
        if q.ub_val > best_val {
            best_val = q.ub_val;
            best = action;
        }
    }
    best
}

/// The index of the action with the highest cached `lb_val`; ties break
/// toward the smallest index.
pub fn max_lb_action<S>(graph: &NodeGraph<S>, handle: NodeHandle) -> usize {
    let node = graph.node(handle);
    debug_assert!(!node.is_fringe(), "max_lb_action called on a fringe node");
    let mut best = 0;
    let mut best_val = f64::NEG_INFINITY;
    for (action, q) in node.q_entries.iter().enumerate() {
        if q.lb_val > best_val {
            best_val = q.lb_val;
            best = action;
        }
    }
    best
}

/// Recomputes every `QEntry`'s `ub_val` (and, if `track_lower_bound`,
/// `lb_val`) from its children's current bounds:
/// `Q[a] = R(s, a) + gamma * sum_o obs_prob(o) * child(o).bound`. Does not
/// touch the node's own `lb_val`/`ub_val`; call [`update`] for that.
pub fn cache_q<S>(graph: &mut NodeGraph<S>, handle: NodeHandle, discount: f64, track_lower_bound: bool) {
    let num_actions = graph.node(handle).q_entries.len();
    for action in 0..num_actions {
        let (immediate_reward, outcomes) = {
            let q = &graph.node(handle).q_entries[action];
            (q.immediate_reward, q.outcomes.clone())
        };
        let mut ub_acc = 0.0;
        let mut lb_acc = 0.0;
        for edge in outcomes.iter().flatten() {
            let child = graph.node(edge.target);
            ub_acc += edge.obs_prob * child.ub_val;
            if track_lower_bound {
                lb_acc += edge.obs_prob * child.lb_val;
            }
        }
        let q = &mut graph.node_mut(handle).q_entries[action];
        q.ub_val = immediate_reward + discount * ub_acc;
        if track_lower_bound {
            q.lb_val = immediate_reward + discount * lb_acc;
        }
    }
}

/// Checks that `new_value` does not violate admissibility against
/// `previous`, according to `direction`: upper bounds must never increase,
/// lower bounds must never decrease. In debug builds a violation beyond
/// [`EPS_SLACK`] is a hard [`PlannerError::BoundAdmissibility`]; in release
/// builds it is silently clamped back to `previous` and logged at `warn`.
fn enforce_admissibility(
    state_repr: impl FnOnce() -> String,
    previous: f64,
    new_value: f64,
    is_upper: bool,
) -> Result<Option<f64>> {
    let violated = if is_upper {
        new_value > previous + EPS_SLACK
    } else {
        new_value < previous - EPS_SLACK
    };
    if !violated {
        return Ok(Some(new_value));
    }
    if cfg!(debug_assertions) {
        Err(PlannerError::BoundAdmissibility {
            state_repr: state_repr(),
            previous,
            attempted: new_value,
        })
    } else {
        log::warn!(
            "clamping {} bound at {}: attempted {}, keeping {}",
            if is_upper { "upper" } else { "lower" },
            state_repr(),
            new_value,
            previous
        );
        Ok(None)
    }
}

/// A full backup at `handle`: recomputes every action's cached value (via
/// [`cache_q`]), then folds `max_a Q[a].ub_val` (and, if tracked,
/// `max_a Q[a].lb_val`) back into the node's own bounds.
pub fn update<S>(
    graph: &mut NodeGraph<S>,
    handle: NodeHandle,
    discount: f64,
    track_lower_bound: bool,
) -> Result<()> {
    cache_q(graph, handle, discount, track_lower_bound);

    let a_star = max_ub_action(graph, handle);
    let new_ub = graph.node(handle).q_entries[a_star].ub_val;
    let previous_ub = graph.node(handle).ub_val;
    if let Some(applied) = enforce_admissibility(|| format!("{:?}", handle), previous_ub, new_ub, true)? {
        graph.node_mut(handle).ub_val = applied;
    }

    if track_lower_bound {
        let a_lb = max_lb_action(graph, handle);
        let new_lb = graph.node(handle).q_entries[a_lb].lb_val;
        let previous_lb = graph.node(handle).lb_val;
        if let Some(applied) = enforce_admissibility(|| format!("{:?}", handle), previous_lb, new_lb, false)? {
            graph.node_mut(handle).lb_val = applied;
        }
    }
    Ok(())
}

/// `|node.ub_val - max_a Q[a].ub_val|`, after a [`cache_q`] pass. Used by
/// LRTDP's `check_solved` sweep to decide whether a node's bound has
/// converged to within `target_precision`.
pub fn residual<S>(graph: &NodeGraph<S>, handle: NodeHandle) -> f64 {
    let a_star = max_ub_action(graph, handle);
    let node = graph.node(handle);
    (node.ub_val - node.q_entries[a_star].ub_val).abs()
}
