//! Error types for postrider-core.
//!
//! Every failure the solve pipeline can report is a variant of [`Error`].
//! All errors are detected synchronously at the stage that discovers them
//! and abort the solve; there is no partial result and no automatic retry.

use thiserror::Error;

/// Result type alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by graph construction and the solve pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The input graph is not connected; the solver requires every edge to
    /// be reachable from every vertex. The caller must repair the graph
    /// before re-invoking.
    #[error("graph is not connected: vertex {0} is unreachable from vertex {1}")]
    DisconnectedGraph(u64, u64),

    /// No path was found between two odd-degree vertices. Cannot occur on a
    /// connected graph; indicates inconsistent graph state.
    #[error("no path between odd vertices {0} and {1} despite connectivity check")]
    UnreachablePair(u64, u64),

    /// The odd-degree vertex set has odd cardinality. The handshake lemma
    /// guarantees this never happens for a well-formed graph, so it
    /// indicates a logic or data-integrity bug upstream.
    #[error("cannot pair an odd number of vertices ({0})")]
    ImpossibleMatching(usize),

    /// The caller-supplied start vertex is not present in the graph.
    #[error("start vertex {0} is not in the graph")]
    InvalidStartVertex(u64),

    /// Edge weights must be finite and non-negative.
    #[error("edge {0} has invalid weight {1}; weights must be finite and non-negative")]
    InvalidEdgeWeight(u64, f64),

    /// A vertex with this ID already exists.
    #[error("vertex with ID {0} already exists")]
    VertexExists(u64),

    /// An edge with this ID already exists.
    #[error("edge with ID {0} already exists")]
    EdgeExists(u64),

    /// An edge references a vertex that was never added.
    #[error("edge {0} references missing vertex {1}")]
    MissingEndpoint(u64, u64),

    /// The solve was cancelled through its [`CancelToken`].
    ///
    /// [`CancelToken`]: crate::solver::CancelToken
    #[error("solve cancelled")]
    Cancelled,
}
