//! # Postrider Core
//!
//! Route-inspection (Chinese Postman) solver for undirected weighted
//! street networks.
//!
//! Given a connected, undirected, possibly-multi graph with non-negative
//! edge lengths, the solver computes a minimum-total-length closed walk
//! that traverses every edge at least once, optionally anchored at a
//! caller-supplied start vertex.
//!
//! ## Pipeline
//!
//! - **Parity analysis**: find the odd-degree vertices (always an even
//!   number of them).
//! - **Shortest-path oracle**: Dijkstra from each odd vertex, recording
//!   distances and the actual paths.
//! - **Matching**: minimum-weight perfect matching of the odd vertices
//!   over shortest-path distances (Edmonds blossom, O(n³)).
//! - **Augmentation**: copy the network and add one virtual edge per
//!   matched pair.
//! - **Circuit**: extract an Eulerian circuit (Hierholzer) and expand
//!   every virtual edge back into real streets.
//!
//! ## Quick Start
//!
//! ```rust
//! use postrider_core::graph::{Edge, RouteNetwork, Vertex};
//! use postrider_core::solver::{solve, SolveOptions};
//!
//! fn main() -> postrider_core::Result<()> {
//!     // A square block with one diagonal shortcut.
//!     let mut network = RouteNetwork::new();
//!     for id in 1..=4 {
//!         network.add_vertex(Vertex::new(id))?;
//!     }
//!     network.add_edge(Edge::new(10, 1, 2, 1.0)?)?;
//!     network.add_edge(Edge::new(11, 2, 3, 1.0)?)?;
//!     network.add_edge(Edge::new(12, 3, 4, 1.0)?)?;
//!     network.add_edge(Edge::new(13, 4, 1, 1.0)?)?;
//!     network.add_edge(Edge::new(14, 1, 3, 1.2)?)?;
//!
//!     let route = solve(&network, &SolveOptions::new().with_start(1))?;
//!
//!     // Every street covered; the diagonal is walked twice.
//!     assert!((route.total_length() - 6.4).abs() < 1e-9);
//!     let records = route.records(&network);
//!     assert_eq!(records.len(), route.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod augment;
pub mod circuit;
pub mod error;
pub mod graph;
pub mod matching;
pub mod oracle;
pub mod parity;
pub mod route;
pub mod solver;
#[cfg(test)]
mod solver_tests;

pub use error::{Error, Result};
pub use graph::{Edge, RouteNetwork, Trail, Vertex};
pub use route::{Route, RouteRecord, RouteSummary, Traversal};
pub use solver::{solve, solve_with_matcher, CancelToken, SolveOptions};
