//! This module provides the abstractions for the two building blocks a
//! client must supply to use this crate: [`Problem`] describes the dynamics
//! of the (PO)MDP being solved, [`Bound`] describes an admissible value
//! estimator used to seed newly discovered states.

mod problem;
mod bound;

pub use problem::*;
pub use bound::*;
