//! Parity repair by graph augmentation.
//!
//! Copies the input network and adds one augmented edge per matched
//! odd-vertex pair, weighted by the pair's shortest-path distance. Each
//! odd vertex gains exactly one incident edge from its single match, so
//! every vertex of the result has even degree, which together with
//! connectivity makes the augmented network Eulerian. The caller's
//! network is never touched.

use crate::error::{Error, Result};
use crate::graph::{Edge, RouteNetwork};
use crate::oracle::PathOracle;

/// Builds the augmented network for a matching over vertex IDs.
///
/// Augmented edge IDs come from the network's monotonic allocator, so
/// they never collide with caller-supplied IDs and are stable across
/// repeated solves of the same input.
///
/// # Errors
///
/// Returns `Error::UnreachablePair` if the oracle has no distance for a
/// matched pair (inconsistent pipeline state), or a graph error if an
/// endpoint is missing.
pub fn augment(
    network: &RouteNetwork,
    pairs: &[(u64, u64)],
    oracle: &PathOracle,
) -> Result<RouteNetwork> {
    let mut augmented = network.clone();
    for &(a, b) in pairs {
        let distance = oracle.distance(a, b).ok_or(Error::UnreachablePair(a, b))?;
        let id = augmented.allocate_edge_id();
        augmented.add_edge(Edge::augmented(id, a, b, distance)?)?;
    }
    Ok(augmented)
}
