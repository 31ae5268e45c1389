//! Undirected multigraph storage for route networks.
//!
//! Stores vertices and edges indexed by ID plus a per-vertex incidence
//! index for O(degree) neighborhood access. Parallel edges and self-loops
//! are permitted; self-loops contribute two to their vertex's degree, per
//! the standard graph-theory convention.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::collections::VecDeque;

use crate::error::{Error, Result};

use super::types::{Edge, Vertex};

/// Per-vertex incidence list. Street-graph degrees are small, so the
/// common case stays inline.
type IncidenceList = SmallVec<[u64; 4]>;

/// An undirected, weighted multigraph of vertices and edges.
///
/// The solver never mutates a caller's network in place: augmentation
/// operates on a clone (copy-on-write per solve invocation).
///
/// # Example
///
/// ```rust
/// use postrider_core::graph::{Edge, RouteNetwork, Vertex};
///
/// let mut network = RouteNetwork::new();
/// network.add_vertex(Vertex::new(1)).unwrap();
/// network.add_vertex(Vertex::new(2)).unwrap();
/// network.add_edge(Edge::new(10, 1, 2, 5.0).unwrap()).unwrap();
///
/// assert_eq!(network.degree(1), 1);
/// assert_eq!(network.total_length(), 5.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteNetwork {
    /// All vertices indexed by ID.
    vertices: FxHashMap<u64, Vertex>,
    /// All edges indexed by ID.
    edges: FxHashMap<u64, Edge>,
    /// Incidence index: vertex ID -> IDs of touching edges. A self-loop
    /// appears twice so that `degree` counts it twice.
    incident: FxHashMap<u64, IncidenceList>,
    /// Next fresh edge ID; always above every caller-supplied ID.
    next_edge_id: u64,
}

impl RouteNetwork {
    /// Creates a new empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a network with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(expected_vertices: usize, expected_edges: usize) -> Self {
        Self {
            vertices: FxHashMap::with_capacity_and_hasher(expected_vertices, Default::default()),
            edges: FxHashMap::with_capacity_and_hasher(expected_edges, Default::default()),
            incident: FxHashMap::with_capacity_and_hasher(expected_vertices, Default::default()),
            next_edge_id: 0,
        }
    }

    /// Builds an undirected network from directed arcs by dropping
    /// direction. A pair of reciprocal arcs with equal length is merged
    /// into a single undirected edge (a two-way street); everything else
    /// is kept as a parallel edge, so minimum-weight information between
    /// any vertex pair survives the conversion.
    ///
    /// # Errors
    ///
    /// Propagates the same errors as [`add_vertex`](Self::add_vertex) and
    /// [`add_edge`](Self::add_edge).
    pub fn from_directed_arcs<V, A>(vertices: V, arcs: A) -> Result<Self>
    where
        V: IntoIterator<Item = Vertex>,
        A: IntoIterator<Item = Edge>,
    {
        let mut network = Self::new();
        for vertex in vertices {
            network.add_vertex(vertex)?;
        }
        // Stored arcs not yet matched by a reverse twin, keyed by
        // (source, target, length bits).
        let mut unmatched: FxHashMap<(u64, u64, u64), u32> = FxHashMap::default();
        for arc in arcs {
            let (source, target) = arc.endpoints();
            let bits = arc.length().to_bits();
            if source != target {
                if let Some(surplus) = unmatched.get_mut(&(target, source, bits)) {
                    if *surplus > 0 {
                        // Reverse twin of an already-stored arc; merge.
                        *surplus -= 1;
                        continue;
                    }
                }
            }
            *unmatched.entry((source, target, bits)).or_insert(0) += 1;
            network.add_edge(arc)?;
        }
        Ok(network)
    }

    // ── Vertices ───────────────────────────────────────────────────────

    /// Adds a vertex to the network.
    ///
    /// # Errors
    ///
    /// Returns `Error::VertexExists` if a vertex with the same ID is
    /// already present.
    pub fn add_vertex(&mut self, vertex: Vertex) -> Result<()> {
        let id = vertex.id();
        if self.vertices.contains_key(&id) {
            return Err(Error::VertexExists(id));
        }
        self.vertices.insert(id, vertex);
        Ok(())
    }

    /// Gets a vertex by ID.
    #[must_use]
    pub fn vertex(&self, id: u64) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// Returns true if a vertex with the given ID exists.
    #[must_use]
    pub fn has_vertex(&self, id: u64) -> bool {
        self.vertices.contains_key(&id)
    }

    /// Returns the number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns all vertex IDs in ascending order.
    #[must_use]
    pub fn vertex_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.vertices.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    // ── Edges ──────────────────────────────────────────────────────────

    /// Adds an edge to the network, indexing both endpoints.
    ///
    /// # Errors
    ///
    /// Returns `Error::EdgeExists` if an edge with the same ID is already
    /// present, or `Error::MissingEndpoint` if either endpoint vertex has
    /// not been added.
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        let id = edge.id();
        let (source, target) = edge.endpoints();

        if self.edges.contains_key(&id) {
            return Err(Error::EdgeExists(id));
        }
        for endpoint in [source, target] {
            if !self.vertices.contains_key(&endpoint) {
                return Err(Error::MissingEndpoint(id, endpoint));
            }
        }

        self.incident.entry(source).or_default().push(id);
        // A self-loop contributes two endpoint slots.
        self.incident.entry(target).or_default().push(id);

        self.next_edge_id = self.next_edge_id.max(id + 1);
        self.edges.insert(id, edge);
        Ok(())
    }

    /// Gets an edge by ID.
    #[must_use]
    pub fn edge(&self, id: u64) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns all edge IDs in ascending order.
    #[must_use]
    pub fn edge_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.edges.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterates over all edges in unspecified order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Returns the IDs of edges touching a vertex. A self-loop is listed
    /// twice. The slice is empty for isolated or unknown vertices.
    #[must_use]
    pub fn incident_edges(&self, vertex: u64) -> &[u64] {
        self.incident.get(&vertex).map_or(&[], |ids| ids.as_slice())
    }

    /// Returns the degree of a vertex, counting parallel edges and
    /// counting self-loops twice.
    #[must_use]
    pub fn degree(&self, vertex: u64) -> usize {
        self.incident.get(&vertex).map_or(0, SmallVec::len)
    }

    /// Returns the minimum-length edge connecting two adjacent vertices,
    /// ignoring parallel edges of greater length. Ties resolve to the
    /// smallest edge ID so repeated solves agree.
    #[must_use]
    pub fn min_weight_between(&self, a: u64, b: u64) -> Option<&Edge> {
        let mut best: Option<&Edge> = None;
        for &edge_id in self.incident_edges(a) {
            let Some(edge) = self.edges.get(&edge_id) else {
                continue;
            };
            if edge.other_endpoint(a) != Some(b) {
                continue;
            }
            best = match best {
                Some(current)
                    if (current.length(), current.id()) <= (edge.length(), edge.id()) =>
                {
                    Some(current)
                }
                _ => Some(edge),
            };
        }
        best
    }

    /// Sum of all edge lengths, each counted once.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.edges.values().map(Edge::length).sum()
    }

    /// Allocates a fresh edge ID above every existing one.
    pub fn allocate_edge_id(&mut self) -> u64 {
        let id = self.next_edge_id;
        self.next_edge_id += 1;
        id
    }

    // ── Connectivity ───────────────────────────────────────────────────

    /// Breadth-first search for a vertex unreachable from `start`.
    /// Returns `None` when every vertex is reachable.
    #[must_use]
    pub fn unreachable_from(&self, start: u64) -> Option<u64> {
        if !self.vertices.contains_key(&start) {
            return self.vertices.keys().copied().next();
        }
        let mut seen: FxHashSet<u64> = FxHashSet::default();
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for &edge_id in self.incident_edges(current) {
                if let Some(next) = self
                    .edges
                    .get(&edge_id)
                    .and_then(|edge| edge.other_endpoint(current))
                {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        // Report the smallest missing ID for a stable error message.
        self.vertex_ids()
            .into_iter()
            .find(|id| !seen.contains(id))
    }

    /// Returns true when every vertex is reachable from every other.
    /// The empty network is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        match self.vertex_ids().first() {
            Some(&start) => self.unreachable_from(start).is_none(),
            None => true,
        }
    }
}
