//! [`ConvexBounds`]: the bounds facade used for POMDP belief-state value
//! representations. A belief is a probability distribution over the
//! underlying (fully observable) states, represented here as `Vec<f64>`.
//!
//! The lower bound is the standard POMDP alpha-vector representation: a set
//! of linear functionals of the belief, `V(b) = max_k (alpha_k . b)`. The
//! upper bound is Hauskrecht's sawtooth approximation: a convex, piecewise
//! linear function interpolated from a set of witness `(belief, value)`
//! support points plus the per-corner (pure-belief) upper bounds.

use super::BoundsFacade;
use crate::Node;

/// A single linear functional over belief space, `V(b) = coefficients . b`.
#[derive(Debug, Clone)]
pub struct AlphaVector {
    pub coefficients: Vec<f64>,
}

impl AlphaVector {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn value_at(&self, belief: &[f64]) -> f64 {
        debug_assert_eq!(self.coefficients.len(), belief.len());
        self.coefficients
            .iter()
            .zip(belief.iter())
            .map(|(c, b)| c * b)
            .sum()
    }
}

/// The convex (alpha-vector / sawtooth) bounds facade for POMDP belief
/// states. `corner_upper_bound(i)` must return an admissible upper bound on
/// the value of the pure belief that places all mass on state `i`; it seeds
/// the sawtooth interpolation before any witness point has been recorded.
pub struct ConvexBounds {
    num_states: usize,
    corner_upper_bound: Vec<f64>,
    alpha_vectors: Vec<AlphaVector>,
    witness_points: Vec<(Vec<f64>, f64)>,
}

impl ConvexBounds {
    pub fn new(corner_upper_bound: Vec<f64>) -> Self {
        Self {
            num_states: corner_upper_bound.len(),
            corner_upper_bound,
            alpha_vectors: Vec::new(),
            witness_points: Vec::new(),
        }
    }

    fn corner_sum(&self, belief: &[f64]) -> f64 {
        self.corner_upper_bound
            .iter()
            .zip(belief.iter())
            .map(|(c, b)| c * b)
            .sum()
    }

    /// Hauskrecht's sawtooth upper bound: the corner-interpolated value,
    /// tightened by every witness point whose projection through `belief`
    /// undercuts it.
    fn sawtooth_upper_bound(&self, belief: &[f64]) -> f64 {
        let mut best = self.corner_sum(belief);
        for (witness, value) in &self.witness_points {
            let corner_sum_witness = self.corner_sum(witness);
            let mut ratio = f64::INFINITY;
            for i in 0..self.num_states {
                if witness[i] > crate::PROB_MASS_SLACK {
                    ratio = ratio.min(belief[i] / witness[i]);
                }
            }
            if !ratio.is_finite() {
                continue;
            }
            let candidate = self.corner_sum(belief) - ratio * (corner_sum_witness - value);
            best = best.min(candidate);
        }
        best
    }

    fn alpha_lower_bound(&self, belief: &[f64]) -> f64 {
        self.alpha_vectors
            .iter()
            .map(|a| a.value_at(belief))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn add_alpha_vector(&mut self, alpha: AlphaVector) {
        self.alpha_vectors.push(alpha);
    }
}

impl BoundsFacade for ConvexBounds {
    type State = Vec<f64>;

    fn initialize(&mut self, _target_precision: f64) {}

    fn initial_bounds(&self, belief: &Vec<f64>) -> (Option<f64>, f64) {
        let lower = if self.alpha_vectors.is_empty() {
            None
        } else {
            Some(self.alpha_lower_bound(belief))
        };
        (lower, self.sawtooth_upper_bound(belief))
    }

    fn on_backup(&mut self, node: &Node<Vec<f64>>) {
        self.witness_points.push((node.state.as_ref().clone(), node.ub_val));
        // A flat functional at the node's own backed-up `lb_val`: sound everywhere
        // since `lb_val` is itself a global constant lower bound at this point (the
        // same convention `trivial::ZeroLowerBound` already uses), and it tightens
        // the max-over-alphas lower bound exactly where this node was just visited.
        if node.lb_val.is_finite() {
            self.add_alpha_vector(AlphaVector::new(vec![node.lb_val; self.num_states]));
        }
    }
}
