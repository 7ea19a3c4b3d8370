//! LRTDP (Bonet & Geffner, "Labeled RTDP"): a deterministic greedy descent
//! -- no PRNG is needed, unlike plain RTDP -- followed by a check-solved
//! sweep that proves convergence on an explicit subtree and labels it
//! `solved`, giving the algorithm a finite-trials termination guarantee.

use std::hash::Hash;

use fxhash::FxHashSet;

use crate::error::Result;
use crate::implementation::backup::{cache_q, max_ub_action, residual, update};
use crate::implementation::bounds::BoundsFacade;
use crate::implementation::graph::NodeGraph;
use crate::{NodeHandle, Problem};

pub fn do_trial<S: Clone + Eq + Hash>(
    graph: &mut NodeGraph<S>,
    root: NodeHandle,
    problem: &dyn Problem<State = S>,
    bounds: &mut dyn BoundsFacade<State = S>,
    track_lower_bound: bool,
    target_precision: f64,
) -> Result<()> {
    let discount = problem.discount();
    let mut trajectory = Vec::new();
    let mut current = root;

    loop {
        trajectory.push(current);
        if graph.node(current).is_solved {
            break;
        }
        if graph.node(current).is_fringe() {
            graph.expand(current, problem, &*bounds)?;
        }
        update(graph, current, discount, track_lower_bound)?;
        bounds.on_backup(graph.node(current));

        let action = max_ub_action(graph, current);
        match most_likely_outcome(graph, current, action) {
            Some(next) => current = next,
            None => break,
        }
    }

    while let Some(handle) = trajectory.pop() {
        if !check_solved(graph, handle, problem, bounds, track_lower_bound, target_precision)? {
            break;
        }
    }
    Ok(())
}

/// Follows the single most probable outcome of `action`, ties breaking
/// toward the smallest outcome id. Deterministic, unlike RTDP's sampled
/// descent -- LRTDP needs no PRNG to terminate.
fn most_likely_outcome<S>(graph: &NodeGraph<S>, handle: NodeHandle, action: usize) -> Option<NodeHandle> {
    let node = graph.node(handle);
    let q = &node.q_entries[action];
    q.outcomes
        .iter()
        .flatten()
        .fold(None, |best: Option<(NodeHandle, f64)>, edge| match best {
            Some((_, best_prob)) if best_prob >= edge.obs_prob => best,
            _ => Some((edge.target, edge.obs_prob)),
        })
        .map(|(target, _)| target)
}

/// Attempts to prove that `root`'s greedy subtree has converged to within
/// `target_precision`. Explores only unsolved descendants reachable under
/// each node's current greedy action. If every residual in the explored set
/// is within tolerance, every explored node is labeled solved and this
/// returns `true`; otherwise every explored node is re-backed-up (in
/// reverse discovery order) and this returns `false`.
fn check_solved<S>(
    graph: &mut NodeGraph<S>,
    root: NodeHandle,
    problem: &dyn Problem<State = S>,
    bounds: &mut dyn BoundsFacade<State = S>,
    track_lower_bound: bool,
    target_precision: f64,
) -> Result<bool> {
    let discount = problem.discount();
    let mut open = vec![root];
    let mut seen: FxHashSet<NodeHandle> = FxHashSet::default();
    let mut closed: Vec<NodeHandle> = Vec::new();
    let mut converged = true;

    while let Some(handle) = open.pop() {
        if !seen.insert(handle) {
            continue;
        }
        if graph.node(handle).is_solved {
            continue;
        }
        closed.push(handle);
        cache_q(graph, handle, discount, track_lower_bound);
        if residual(graph, handle) > target_precision {
            converged = false;
            continue;
        }
        let action = max_ub_action(graph, handle);
        let children: Vec<NodeHandle> = graph.node(handle).q_entries[action]
            .outcomes
            .iter()
            .flatten()
            .map(|edge| edge.target)
            .collect();
        for child in children {
            if !seen.contains(&child) {
                open.push(child);
            }
        }
    }

    if converged {
        for &handle in &closed {
            graph.node_mut(handle).is_solved = true;
        }
    } else {
        while let Some(handle) = closed.pop() {
            update(graph, handle, discount, track_lower_bound)?;
            bounds.on_backup(graph.node(handle));
        }
    }
    Ok(converged)
}
