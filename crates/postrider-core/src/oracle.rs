//! Pairwise shortest paths among odd-degree vertices.
//!
//! Runs Dijkstra once per odd vertex as source (amortized over all pairs
//! rather than once per pair) and records both the distance and the actual
//! vertex sequence of each shortest path. The sequences are needed later
//! to expand augmented edges back into real streets.
//!
//! The per-source searches are mutually independent; with the `parallel`
//! feature they fan out across a rayon pool and fan back into one table.

use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::graph::RouteNetwork;
use crate::solver::CancelToken;

/// Min-heap entry ordered by tentative distance, then vertex ID so equal
/// distances pop deterministically.
#[derive(Debug, Clone, Copy, PartialEq)]
struct QueueEntry {
    distance: f64,
    vertex: u64,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest-path table over the odd-degree vertex set.
///
/// Keys are unordered pairs stored as `(low, high)`; distances are
/// symmetric and non-negative.
#[derive(Debug, Clone, Default)]
pub struct PathOracle {
    distances: FxHashMap<(u64, u64), f64>,
    /// Vertex sequence from `low` to `high` for each pair key.
    paths: FxHashMap<(u64, u64), Vec<u64>>,
}

impl PathOracle {
    /// Computes shortest paths between every unordered pair of the given
    /// vertices.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnreachablePair` if some pair has no connecting
    /// path (cannot occur once connectivity has been checked, but guarded
    /// against inconsistent graph state), or `Error::Cancelled`.
    pub fn between(
        network: &RouteNetwork,
        vertices: &[u64],
        cancel: &CancelToken,
    ) -> Result<Self> {
        let mut ordered = vertices.to_vec();
        ordered.sort_unstable();
        ordered.dedup();
        // All but the greatest source: its pairs are already covered by
        // earlier runs.
        let sources = &ordered[..ordered.len().saturating_sub(1)];

        #[cfg(feature = "parallel")]
        let runs: Vec<(u64, SingleSource)> = sources
            .par_iter()
            .map(|&source| {
                cancel.check()?;
                Ok((source, single_source(network, source)))
            })
            .collect::<Result<_>>()?;

        #[cfg(not(feature = "parallel"))]
        let runs: Vec<(u64, SingleSource)> = sources
            .iter()
            .map(|&source| {
                cancel.check()?;
                Ok((source, single_source(network, source)))
            })
            .collect::<Result<_>>()?;

        let mut oracle = Self::default();
        for (source, run) in &runs {
            for &target in &ordered {
                if target <= *source {
                    continue;
                }
                let key = pair_key(*source, target);
                let Some(&distance) = run.distance.get(&target) else {
                    return Err(Error::UnreachablePair(*source, target));
                };
                oracle.distances.insert(key, distance);
                oracle.paths.insert(key, run.walk_back(*source, target));
            }
        }
        Ok(oracle)
    }

    /// Shortest-path distance between two vertices, if computed.
    #[must_use]
    pub fn distance(&self, a: u64, b: u64) -> Option<f64> {
        self.distances.get(&pair_key(a, b)).copied()
    }

    /// Shortest-path vertex sequence from `a` to `b`, if computed.
    #[must_use]
    pub fn path(&self, a: u64, b: u64) -> Option<Vec<u64>> {
        let sequence = self.paths.get(&pair_key(a, b))?;
        if a <= b {
            Some(sequence.clone())
        } else {
            let mut reversed = sequence.clone();
            reversed.reverse();
            Some(reversed)
        }
    }

    /// Number of pairs in the table.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.distances.len()
    }
}

fn pair_key(a: u64, b: u64) -> (u64, u64) {
    (a.min(b), a.max(b))
}

/// Result of one Dijkstra run.
#[derive(Debug)]
struct SingleSource {
    distance: FxHashMap<u64, f64>,
    predecessor: FxHashMap<u64, u64>,
}

impl SingleSource {
    /// Reconstructs the vertex sequence from `source` to `target`,
    /// oriented low-to-high to match the pair-key convention.
    fn walk_back(&self, source: u64, target: u64) -> Vec<u64> {
        let mut sequence = vec![target];
        let mut current = target;
        while current != source {
            current = self.predecessor[&current];
            sequence.push(current);
        }
        if source <= target {
            sequence.reverse();
        }
        sequence
    }
}

/// Dijkstra from a single source over the whole network. Parallel edges
/// are collapsed implicitly: every incident edge is relaxed, so only the
/// minimum-weight one ever settles a neighbor.
fn single_source(network: &RouteNetwork, source: u64) -> SingleSource {
    let mut distance: FxHashMap<u64, f64> = FxHashMap::default();
    let mut predecessor: FxHashMap<u64, u64> = FxHashMap::default();
    let mut heap = BinaryHeap::new();

    distance.insert(source, 0.0);
    heap.push(QueueEntry {
        distance: 0.0,
        vertex: source,
    });

    while let Some(QueueEntry {
        distance: settled,
        vertex,
    }) = heap.pop()
    {
        if settled > distance[&vertex] {
            continue; // stale entry
        }
        for &edge_id in network.incident_edges(vertex) {
            let Some(edge) = network.edge(edge_id) else {
                continue;
            };
            let Some(next) = edge.other_endpoint(vertex) else {
                continue;
            };
            let candidate = settled + edge.length();
            let improved = distance
                .get(&next)
                .is_none_or(|&known| candidate < known);
            if improved {
                distance.insert(next, candidate);
                predecessor.insert(next, vertex);
                heap.push(QueueEntry {
                    distance: candidate,
                    vertex: next,
                });
            }
        }
    }

    SingleSource {
        distance,
        predecessor,
    }
}
