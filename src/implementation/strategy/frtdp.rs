//! FRTDP (Focused RTDP, Smith & Simmons AAAI 2006): deterministic descent
//! that always follows the single outcome with the largest
//! `obs_prob * (ub_val - lb_val)` -- the outcome most likely to still be
//! wrong by a lot -- and stops descending once the cumulative trajectory
//! weight falls below `weight_threshold`. Requires both bounds.

use std::hash::Hash;

use crate::error::Result;
use crate::implementation::backup::{max_ub_action, update};
use crate::implementation::bounds::BoundsFacade;
use crate::implementation::graph::NodeGraph;
use crate::{NodeHandle, Problem};

pub fn do_trial<S: Clone + Eq + Hash>(
    graph: &mut NodeGraph<S>,
    root: NodeHandle,
    problem: &dyn Problem<State = S>,
    bounds: &mut dyn BoundsFacade<State = S>,
    weight_threshold: f64,
) -> Result<()> {
    let discount = problem.discount();
    let mut trajectory = Vec::new();
    let mut current = root;
    let mut weight = 1.0;

    loop {
        trajectory.push(current);
        if graph.node(current).is_solved {
            break;
        }
        if graph.node(current).is_fringe() {
            graph.expand(current, problem, &*bounds)?;
        }
        update(graph, current, discount, true)?;
        bounds.on_backup(graph.node(current));

        if weight < weight_threshold {
            break;
        }
        let action = max_ub_action(graph, current);
        match choose_outcome(graph, current, action) {
            Some((next, obs_prob)) => {
                weight *= discount * obs_prob;
                current = next;
            }
            None => break,
        }
    }

    for &handle in trajectory.iter().rev() {
        if graph.node(handle).is_fringe() {
            continue;
        }
        update(graph, handle, discount, true)?;
        bounds.on_backup(graph.node(handle));
        let gap = (graph.node(handle).ub_val - graph.node(handle).lb_val).max(0.0);
        graph.node_mut(handle).prio = gap;
    }
    Ok(())
}

/// Picks the outcome maximizing `obs_prob * (child.ub_val - child.lb_val)`,
/// returning its handle and its own `obs_prob` (used by the caller to
/// update the cumulative trajectory weight).
fn choose_outcome<S>(graph: &NodeGraph<S>, handle: NodeHandle, action: usize) -> Option<(NodeHandle, f64)> {
    let node = graph.node(handle);
    let q = &node.q_entries[action];
    let mut best: Option<(NodeHandle, f64, f64)> = None;
    for edge in q.outcomes.iter().flatten() {
        let child = graph.node(edge.target);
        let gap = (child.ub_val - child.lb_val).max(0.0);
        let priority = edge.obs_prob * gap;
        if best.map_or(true, |(_, _, best_priority)| priority > best_priority) {
            best = Some((edge.target, edge.obs_prob, priority));
        }
    }
    best.map(|(target, obs_prob, _)| (target, obs_prob))
}
