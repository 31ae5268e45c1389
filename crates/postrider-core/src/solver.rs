//! The route-inspection solve pipeline.
//!
//! Wires the stages together: parity analysis, shortest-path oracle,
//! minimum-weight matching, augmentation, and circuit extraction with
//! expansion. Each call operates on an immutable snapshot of the input
//! network and returns a new [`Route`]; the augmented network is
//! discarded once the circuit is extracted.
//!
//! # Example
//!
//! ```rust
//! use postrider_core::graph::{Edge, RouteNetwork, Vertex};
//! use postrider_core::solver::{solve, SolveOptions};
//!
//! let mut network = RouteNetwork::new();
//! for id in 1..=4 {
//!     network.add_vertex(Vertex::new(id)).unwrap();
//! }
//! network.add_edge(Edge::new(10, 1, 2, 1.0).unwrap()).unwrap();
//! network.add_edge(Edge::new(11, 2, 3, 1.0).unwrap()).unwrap();
//! network.add_edge(Edge::new(12, 3, 4, 1.0).unwrap()).unwrap();
//! network.add_edge(Edge::new(13, 4, 1, 1.0).unwrap()).unwrap();
//! network.add_edge(Edge::new(14, 1, 3, 1.2).unwrap()).unwrap();
//!
//! let route = solve(&network, &SolveOptions::new().with_start(1)).unwrap();
//! assert!((route.total_length() - 6.4).abs() < 1e-9);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::augment::augment;
use crate::circuit::{eulerian_circuit, expand_route};
use crate::error::{Error, Result};
use crate::graph::RouteNetwork;
use crate::matching::{BlossomMatcher, PairWeights, WeightedMatcher};
use crate::oracle::PathOracle;
use crate::parity::{ensure_connected, odd_vertices};
use crate::route::Route;

/// Cooperative cancellation flag for a running solve.
///
/// Cloning shares the flag, so one handle can be kept by the caller and
/// another passed into the solve. Checked at odd-vertex-loop and
/// matching-stage granularity, since the O(n³) matching dominates wall
/// time on large inputs.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the associated solve.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Fails with `Error::Cancelled` once cancellation was requested.
    pub(crate) fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

/// Configuration for one solve invocation.
///
/// # Example
///
/// ```rust
/// use postrider_core::solver::{CancelToken, SolveOptions};
///
/// let cancel = CancelToken::new();
/// let options = SolveOptions::new()
///     .with_start(42)
///     .with_cancel_token(cancel.clone());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    start: Option<u64>,
    cancel: CancelToken,
}

impl SolveOptions {
    /// Creates default options: any start vertex, no cancellation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchors the route at a start vertex (builder pattern).
    #[must_use]
    pub fn with_start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    /// Attaches a cancellation token (builder pattern).
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The configured start vertex, if any.
    #[must_use]
    pub fn start(&self) -> Option<u64> {
        self.start
    }
}

/// Solves the route-inspection problem with the reference blossom
/// matcher.
///
/// Returns a minimum-total-length closed walk traversing every edge of
/// `network` at least once, anchored at the configured start vertex (or
/// the smallest vertex ID if none is given).
///
/// # Errors
///
/// See [`solve_with_matcher`].
pub fn solve(network: &RouteNetwork, options: &SolveOptions) -> Result<Route> {
    solve_with_matcher(network, options, &BlossomMatcher::new())
}

/// Solves the route-inspection problem with a caller-chosen matcher.
///
/// # Errors
///
/// - `Error::InvalidStartVertex` if the configured start is unknown.
/// - `Error::DisconnectedGraph` if the connectivity precondition fails.
/// - `Error::ImpossibleMatching`, `Error::UnreachablePair` on
///   inconsistent state (defensive; cannot occur on well-formed input).
/// - `Error::Cancelled` if the token fires mid-solve.
pub fn solve_with_matcher(
    network: &RouteNetwork,
    options: &SolveOptions,
    matcher: &dyn WeightedMatcher,
) -> Result<Route> {
    options.cancel.check()?;

    let start = match options.start {
        Some(start) => {
            if !network.has_vertex(start) {
                return Err(Error::InvalidStartVertex(start));
            }
            start
        }
        None => match network.vertex_ids().first() {
            Some(&smallest) => smallest,
            None => return Ok(Route::default()),
        },
    };

    ensure_connected(network)?;

    let odd = odd_vertices(network);
    debug_assert_eq!(odd.len() % 2, 0, "odd-degree vertex count must be even");
    info!(
        vertices = network.vertex_count(),
        edges = network.edge_count(),
        odd_vertices = odd.len(),
        "solving route inspection"
    );

    let (oracle, pairs) = if odd.is_empty() {
        // Already Eulerian; skip parity repair entirely.
        (PathOracle::default(), Vec::new())
    } else {
        debug!("computing shortest paths between odd vertex pairs");
        let oracle = PathOracle::between(network, &odd, &options.cancel)?;

        debug!("performing minimum weight matching");
        let weights = pair_weights(&odd, &oracle)?;
        let index_pairs = matcher.pair_all(&weights, &options.cancel)?;
        let pairs: Vec<(u64, u64)> = index_pairs
            .into_iter()
            .map(|(i, j)| (odd[i], odd[j]))
            .collect();
        (oracle, pairs)
    };

    let augmented = augment(network, &pairs, &oracle)?;
    options.cancel.check()?;

    debug!("creating eulerian circuit");
    let steps = eulerian_circuit(&augmented, start)?;
    let route = expand_route(&steps, network, &augmented, &oracle)?;

    info!(
        traversals = route.len(),
        total_length = route.total_length(),
        "route inspection solved"
    );
    Ok(route)
}

/// Builds the auxiliary complete graph over odd-vertex indices from the
/// oracle's distance table.
fn pair_weights(odd: &[u64], oracle: &PathOracle) -> Result<PairWeights> {
    let n = odd.len();
    let mut table = vec![0.0; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let distance = oracle
                .distance(odd[i], odd[j])
                .ok_or(Error::UnreachablePair(odd[i], odd[j]))?;
            table[i * n + j] = distance;
            table[j * n + i] = distance;
        }
    }
    Ok(PairWeights::from_fn(n, |i, j| table[i * n + j]))
}
