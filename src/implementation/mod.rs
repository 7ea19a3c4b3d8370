//! Concrete implementations built on top of the `Problem`/`Bound`
//! abstractions: the search-node graph and its Bellman backup operator, the
//! four trial strategies, the bounds facades, the trial driver, the bounds
//! log, and the planner configuration.

pub mod graph;
pub mod backup;
pub mod bounds;
pub mod strategy;
pub mod driver;
pub mod bounds_log;
pub mod config;

pub use graph::*;
pub use backup::*;
pub use bounds::*;
pub use strategy::*;
pub use driver::*;
pub use bounds_log::*;
pub use config::*;
