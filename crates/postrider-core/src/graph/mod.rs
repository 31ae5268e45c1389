//! Route-network graph model.
//!
//! An undirected, weighted multigraph: vertices carry caller-supplied
//! attribute bags, edges carry a length, an attribute bag, and a
//! [`Trail`] tag separating original edges from parity-repair edges.
//!
//! # Example
//!
//! ```rust
//! use postrider_core::graph::{Edge, RouteNetwork, Vertex};
//!
//! let mut network = RouteNetwork::new();
//! for id in 1..=3 {
//!     network.add_vertex(Vertex::new(id)).unwrap();
//! }
//! network.add_edge(Edge::new(10, 1, 2, 1.0).unwrap()).unwrap();
//! network.add_edge(Edge::new(11, 2, 3, 2.0).unwrap()).unwrap();
//!
//! assert!(network.is_connected());
//! assert_eq!(network.degree(2), 2);
//! ```

mod network;
mod types;


pub use network::RouteNetwork;
pub use types::{Edge, Trail, Vertex};
