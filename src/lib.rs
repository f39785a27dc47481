//! Christofides TSP Solver Library
//!
//! Approximates the Traveling Salesman Problem over geo-located points with
//! the Christofides construction (minimum spanning tree, odd-degree vertex
//! matching, Eulerian circuit, Hamiltonian shortcut), then refines the tour
//! with local search and metaheuristics.
//!
//! # Features
//!
//! - Kruskal MST and minimum-weight perfect matching (greedy or exact)
//! - Iterative Hierholzer Eulerian traversal and first-visit shortcut
//! - Local search operators (random swap, 2-opt, two 3-opt variants, k-opt)
//! - Metaheuristics (simulated annealing, ant colony optimization)
//! - Pluggable distance metric and caller-owned operation recording
//!
//! # Example
//!
//! ```
//! use christofides_tsp::christofides::Christofides;
//! use christofides_tsp::graph::{euclidean, Graph, Node};
//! use christofides_tsp::heuristics::local_search::{LocalSearch, TwoOpt};
//!
//! let nodes = vec![
//!     Node::new(0, 0.0, 0.0),
//!     Node::new(1, 1.0, 0.0),
//!     Node::new(2, 1.0, 1.0),
//!     Node::new(3, 0.0, 1.0),
//! ];
//!
//! let mut graph = Graph::new(nodes, euclidean).unwrap();
//! graph.connect_all();
//!
//! let mut tour = Christofides::new().solve(&graph).unwrap();
//! TwoOpt::new().improve(&graph, &mut tour);
//!
//! assert_eq!(tour.len(), 4);
//! println!("Tour length: {:.2}", graph.tour_length(&tour));
//! ```

pub mod christofides;
pub mod error;
pub mod graph;
pub mod heuristics;
pub mod recorder;

pub use christofides::Christofides;
pub use error::{Error, Result};
pub use graph::{Graph, MatchingStrategy, Node};
