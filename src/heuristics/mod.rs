//! Tour-improvement heuristics.
//!
//! This module exports the local search operators and metaheuristics applied
//! after the Christofides construction.

pub mod aco;
pub mod annealing;
pub mod local_search;

pub use aco::*;
pub use annealing::*;
pub use local_search::*;
