//! HDP (Bonet & Geffner): deterministic descent over *every*
//! positive-probability outcome of the greedy action, with online Tarjan
//! strongly-connected-component labeling so that an entire SCC is labeled
//! `solved` at once. Expressed over an explicit call-stack of frames rather
//! than native recursion, since trial trajectories can run thousands of
//! nodes deep.

use std::hash::Hash;

use fxhash::FxHashSet;

use crate::error::Result;
use crate::implementation::backup::{cache_q, max_ub_action, residual, update};
use crate::implementation::bounds::BoundsFacade;
use crate::implementation::graph::NodeGraph;
use crate::{NodeHandle, Problem, IDX_INFINITY};

#[derive(Debug, Clone, Copy)]
struct Frame {
    handle: NodeHandle,
    action: usize,
    next_outcome: usize,
    /// Set once some node reachable from this frame (itself included)
    /// returned [`Entry::Dirty`]; suppresses SCC-closing for this frame
    /// and propagates to its parent, mirroring `flag` in `HDP.cc`'s
    /// `trialRecurse`.
    dirty: bool,
}

/// The outcome of [`enter_node`]: either the node's residual was too large
/// to keep descending (its bound was refreshed and the caller's frame is
/// marked dirty, per SPEC_FULL.md step 3), or it was pushed onto the Tarjan
/// stack for normal SCC processing.
enum Entry {
    Dirty,
    Entered,
}

pub fn do_trial<S: Clone + Eq + Hash>(
    graph: &mut NodeGraph<S>,
    root: NodeHandle,
    problem: &dyn Problem<State = S>,
    bounds: &mut dyn BoundsFacade<State = S>,
    track_lower_bound: bool,
    target_precision: f64,
) -> Result<()> {
    if graph.node(root).is_solved {
        return Ok(());
    }

    let mut idx_counter = 0usize;
    let mut node_stack: Vec<NodeHandle> = Vec::new();
    let mut on_stack: FxHashSet<NodeHandle> = FxHashSet::default();
    let mut call_stack: Vec<Frame> = Vec::new();

    enter_node(
        graph,
        root,
        problem,
        bounds,
        track_lower_bound,
        target_precision,
        &mut idx_counter,
        &mut node_stack,
        &mut on_stack,
        &mut call_stack,
    )?;

    while let Some(frame) = call_stack.last().copied() {
        let handle = frame.handle;
        if graph.node(handle).is_solved {
            call_stack.pop();
            continue;
        }

        let num_outcomes = graph.node(handle).q_entries[frame.action].outcomes.len();
        if frame.next_outcome >= num_outcomes {
            call_stack.pop();
            if frame.dirty {
                update(graph, handle, problem.discount(), track_lower_bound)?;
                bounds.on_backup(graph.node(handle));
            } else {
                finalize_node(
                    graph,
                    handle,
                    problem,
                    bounds,
                    track_lower_bound,
                    target_precision,
                    &mut node_stack,
                    &mut on_stack,
                )?;
            }
            if let Some(parent) = call_stack.last_mut() {
                let child_low = graph.node(handle).low;
                let parent_low = graph.node(parent.handle).low;
                graph.node_mut(parent.handle).low = parent_low.min(child_low);
                if frame.dirty {
                    parent.dirty = true;
                }
            }
            continue;
        }

        let outcome_idx = frame.next_outcome;
        call_stack.last_mut().unwrap().next_outcome += 1;
        let edge = graph.node(handle).q_entries[frame.action].outcomes[outcome_idx];
        let Some(edge) = edge else { continue };
        let child = edge.target;
        if graph.node(child).is_solved {
            continue;
        }
        if graph.node(child).idx == IDX_INFINITY {
            let entry = enter_node(
                graph,
                child,
                problem,
                bounds,
                track_lower_bound,
                target_precision,
                &mut idx_counter,
                &mut node_stack,
                &mut on_stack,
                &mut call_stack,
            )?;
            if matches!(entry, Entry::Dirty) {
                call_stack.last_mut().unwrap().dirty = true;
            }
            let child_low = graph.node(child).low;
            let handle_low = graph.node(handle).low;
            graph.node_mut(handle).low = handle_low.min(child_low);
        } else if on_stack.contains(&child) {
            let child_idx = graph.node(child).idx;
            let handle_low = graph.node(handle).low;
            graph.node_mut(handle).low = handle_low.min(child_idx);
        }
    }

    for &handle in &node_stack {
        graph.node_mut(handle).idx = IDX_INFINITY;
        graph.node_mut(handle).low = IDX_INFINITY;
    }
    Ok(())
}

/// Expands and caches `handle`'s action values, then checks its residual
/// *before* joining the Tarjan stack: a residual above `target_precision`
/// means its bound was not yet trustworthy enough to recurse through, so
/// its bound is refreshed in place and `Entry::Dirty` is returned without
/// assigning `idx`/`low` or pushing onto `node_stack` (SPEC_FULL.md §4.6
/// step 3; `HDP.cc:146-158`). Otherwise the node is entered normally and
/// `Entry::Entered` is returned.
#[allow(clippy::too_many_arguments)]
fn enter_node<S: Clone + Eq + Hash>(
    graph: &mut NodeGraph<S>,
    handle: NodeHandle,
    problem: &dyn Problem<State = S>,
    bounds: &mut dyn BoundsFacade<State = S>,
    track_lower_bound: bool,
    target_precision: f64,
    idx_counter: &mut usize,
    node_stack: &mut Vec<NodeHandle>,
    on_stack: &mut FxHashSet<NodeHandle>,
    call_stack: &mut Vec<Frame>,
) -> Result<Entry> {
    if graph.node(handle).is_fringe() && !graph.node(handle).is_solved {
        graph.expand(handle, problem, &*bounds)?;
    }
    if graph.node(handle).is_solved {
        return Ok(Entry::Entered);
    }

    cache_q(graph, handle, problem.discount(), track_lower_bound);
    let action = max_ub_action(graph, handle);
    if residual(graph, handle) > target_precision {
        update(graph, handle, problem.discount(), track_lower_bound)?;
        bounds.on_backup(graph.node(handle));
        return Ok(Entry::Dirty);
    }

    graph.node_mut(handle).idx = *idx_counter;
    graph.node_mut(handle).low = *idx_counter;
    *idx_counter += 1;
    node_stack.push(handle);
    on_stack.insert(handle);
    call_stack.push(Frame {
        handle,
        action,
        next_outcome: 0,
        dirty: false,
    });
    Ok(Entry::Entered)
}

/// If `handle` is the root of its strongly-connected component
/// (`idx == low`), pops the whole component off `node_stack`, checks
/// whether every member's residual is within tolerance, and labels the
/// component solved if so (otherwise re-backs-up every member). Does
/// nothing if `handle` is not yet a component root.
fn finalize_node<S>(
    graph: &mut NodeGraph<S>,
    handle: NodeHandle,
    problem: &dyn Problem<State = S>,
    bounds: &mut dyn BoundsFacade<State = S>,
    track_lower_bound: bool,
    target_precision: f64,
    node_stack: &mut Vec<NodeHandle>,
    on_stack: &mut FxHashSet<NodeHandle>,
) -> Result<()> {
    let node = graph.node(handle);
    if node.idx != node.low {
        return Ok(());
    }

    let mut component = Vec::new();
    loop {
        let top = node_stack.pop().expect("an SCC root must be on the Tarjan stack");
        on_stack.remove(&top);
        component.push(top);
        if top == handle {
            break;
        }
    }

    let discount = problem.discount();
    let mut all_converged = true;
    for &member in &component {
        cache_q(graph, member, discount, track_lower_bound);
        if residual(graph, member) > target_precision {
            all_converged = false;
        }
    }

    if all_converged {
        for &member in &component {
            graph.node_mut(member).is_solved = true;
        }
    } else {
        for &member in component.iter().rev() {
            update(graph, member, discount, track_lower_bound)?;
            bounds.on_backup(graph.node(member));
        }
    }
    Ok(())
}
