//! Eulerian circuit extraction and augmented-edge expansion.
//!
//! The augmented network is all-even-degree and connected, hence
//! Eulerian. Hierholzer's algorithm extends a trail along unused edges
//! until stuck and splices in sub-circuits found from stuck points,
//! consuming every edge exactly once. Walking the circuit then produces
//! the final [`Route`]: original edges are emitted directly, augmented
//! edges are replaced by the precomputed shortest path between their
//! endpoints, hop by hop, with each hop carrying the real street's own
//! attributes.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};
use crate::graph::RouteNetwork;
use crate::oracle::PathOracle;
use crate::route::{Route, Traversal};

/// One step of an Eulerian circuit: the edge traversed and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitStep {
    /// Vertex the step leaves.
    pub from: u64,
    /// Vertex the step arrives at.
    pub to: u64,
    /// The traversed edge's ID.
    pub edge_id: u64,
}

/// Extracts an Eulerian circuit starting (and ending) at `start`.
///
/// Every edge of `network` is traversed exactly once; consecutive steps
/// share an endpoint and the walk is closed. The caller must have
/// established that the network is connected with all degrees even.
///
/// # Errors
///
/// Returns `Error::InvalidStartVertex` if `start` is not in the network.
pub fn eulerian_circuit(network: &RouteNetwork, start: u64) -> Result<Vec<CircuitStep>> {
    if !network.has_vertex(start) {
        return Err(Error::InvalidStartVertex(start));
    }

    // Hierholzer with an explicit stack. Each stack entry remembers the
    // edge used to reach it; reading the pop order backwards yields the
    // circuit with sub-circuits already spliced in.
    let mut used: FxHashSet<u64> = FxHashSet::default();
    let mut cursor: FxHashMap<u64, usize> = FxHashMap::default();
    let mut stack: Vec<(u64, Option<u64>)> = vec![(start, None)];
    let mut popped: Vec<(u64, Option<u64>)> = Vec::with_capacity(network.edge_count() + 1);

    while let Some(&(vertex, _)) = stack.last() {
        let incident = network.incident_edges(vertex);
        let position = cursor.entry(vertex).or_insert(0);
        let mut advanced = false;

        while *position < incident.len() {
            let edge_id = incident[*position];
            *position += 1;
            if used.insert(edge_id) {
                let next = network
                    .edge(edge_id)
                    .and_then(|edge| edge.other_endpoint(vertex))
                    .ok_or(Error::MissingEndpoint(edge_id, vertex))?;
                stack.push((next, Some(edge_id)));
                advanced = true;
                break;
            }
        }
        if !advanced {
            // Stuck: this vertex's edges are exhausted.
            popped.push(stack.pop().unwrap_or((vertex, None)));
        }
    }

    debug_assert_eq!(
        used.len(),
        network.edge_count(),
        "circuit must consume every edge; input was not Eulerian"
    );

    // Reverse pop order: each stored edge links its entry to the
    // preceding vertex.
    popped.reverse();
    let mut steps = Vec::with_capacity(network.edge_count());
    let mut previous = start;
    for &(vertex, via) in &popped {
        if let Some(edge_id) = via {
            steps.push(CircuitStep {
                from: previous,
                to: vertex,
                edge_id,
            });
        }
        previous = vertex;
    }
    Ok(steps)
}

/// Walks a circuit over the augmented network and emits the final route
/// against the original network.
///
/// Original steps are emitted as-is with their attribute bags. Augmented
/// steps are looked up in the oracle and replaced by the shortest path's
/// hops; each hop emits the minimum-weight real street between its
/// endpoints, carrying that street's own attributes.
///
/// # Errors
///
/// Returns `Error::UnreachablePair` if an augmented step has no oracle
/// path or a hop has no connecting street, and `Error::MissingEndpoint`
/// if a circuit step references an unknown edge (both indicate
/// inconsistent pipeline state).
pub fn expand_route(
    steps: &[CircuitStep],
    original: &RouteNetwork,
    augmented: &RouteNetwork,
    oracle: &PathOracle,
) -> Result<Route> {
    let mut traversals = Vec::with_capacity(steps.len());
    for step in steps {
        let edge = augmented
            .edge(step.edge_id)
            .ok_or(Error::MissingEndpoint(step.edge_id, step.from))?;

        if !edge.is_augmented() {
            traversals.push(Traversal::new(step.from, step.to, edge.clone()));
            continue;
        }

        let path = oracle
            .path(step.from, step.to)
            .ok_or(Error::UnreachablePair(step.from, step.to))?;
        for hop in path.windows(2) {
            let street = original
                .min_weight_between(hop[0], hop[1])
                .ok_or(Error::UnreachablePair(hop[0], hop[1]))?;
            traversals.push(Traversal::new(hop[0], hop[1], street.clone()));
        }
    }
    Ok(Route::new(traversals))
}
