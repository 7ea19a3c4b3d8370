//! Plain RTDP: greedy descent with outcomes sampled by probability. Does not
//! provably converge; relies on `depth_cap` to keep a single trial finite
//! and on `TrialDriver::plan_fixed_time`'s wall-clock budget to keep a whole
//! run finite.

use std::hash::Hash;

use rand::rngs::SmallRng;
use rand::Rng;

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
    track_lower_bound: bool,
    depth_cap: usize,
    rng: &mut SmallRng,
) -> Result<()> {
    let discount = problem.discount();
    let mut trajectory = vec![root];
    let mut current = root;
    let mut depth = 0;

    while !graph.node(current).is_solved && depth < depth_cap {
        if graph.node(current).is_fringe() {
            graph.expand(current, problem, &*bounds)?;
        }
        update(graph, current, discount, track_lower_bound)?;
        bounds.on_backup(graph.node(current));

        let action = max_ub_action(graph, current);
        match sample_outcome(graph, current, action, rng) {
            Some(next) => {
                current = next;
                trajectory.push(current);
                depth += 1;
            }
            None => break,
        }
    }
    for &handle in trajectory.iter().rev() {
        if graph.node(handle).is_fringe() {
            continue;
        }
        update(graph, handle, discount, track_lower_bound)?;
        bounds.on_backup(graph.node(handle));
    }
    Ok(())
}

fn sample_outcome<S>(graph: &NodeGraph<S>, handle: NodeHandle, action: usize, rng: &mut SmallRng) -> Option<NodeHandle> {
    let node = graph.node(handle);
    let q = &node.q_entries[action];
    let mut roll: f64 = rng.gen();
    let mut last = None;
    for edge in q.outcomes.iter().flatten() {
        last = Some(edge.target);
        roll -= edge.obs_prob;
        if roll <= 0.0 {
            return Some(edge.target);
        }
    }
    last
}
