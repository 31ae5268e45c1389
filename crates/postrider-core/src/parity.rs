//! Degree parity analysis.
//!
//! A closed walk covering every edge exactly once exists iff the graph is
//! connected and every vertex has even degree. This module extracts the
//! odd-degree vertices whose parity must be repaired and enforces the
//! connectivity precondition the rest of the pipeline relies on.

use crate::error::{Error, Result};
use crate::graph::RouteNetwork;

/// Returns the odd-degree vertices of the network in ascending ID order.
///
/// Parallel edges each contribute to degree and self-loops contribute two,
/// so a self-loop never flips parity. By the handshake lemma the returned
/// set always has even cardinality.
#[must_use]
pub fn odd_vertices(network: &RouteNetwork) -> Vec<u64> {
    network
        .vertex_ids()
        .into_iter()
        .filter(|&id| network.degree(id) % 2 == 1)
        .collect()
}

/// Checks that every vertex is reachable from every other.
///
/// # Errors
///
/// Returns `Error::DisconnectedGraph` naming an unreachable vertex and the
/// search origin. Downstream shortest-path queries assume reachability, so
/// the solve aborts here before any real work happens.
pub fn ensure_connected(network: &RouteNetwork) -> Result<()> {
    let Some(&start) = network.vertex_ids().first() else {
        return Ok(());
    };
    match network.unreachable_from(start) {
        Some(unreached) => Err(Error::DisconnectedGraph(unreached, start)),
        None => Ok(()),
    }
}
