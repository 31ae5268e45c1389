//! Externally consumed solve results.
//!
//! A [`Route`] is the ordered list of edge traversals covering every
//! original edge at least once, with augmented traversals already
//! expanded into real streets. [`RouteRecord`] maps one traversal onto
//! the tabular shape the persistence collaborator consumes, and
//! [`RouteSummary`] reduces a route to its headline statistics.

use serde::{Deserialize, Serialize};

use crate::graph::{Edge, RouteNetwork};

/// Edge name used when the attribute bag has no usable name.
pub const UNKNOWN_NAME: &str = "unknown";

/// Column order of the tabular record mapping, header row first.
pub const RECORD_COLUMNS: [&str; 8] = [
    "START NODE",
    "END NODE",
    "NAME",
    "START LAT",
    "START LON",
    "END LAT",
    "END LON",
    "LENGTH",
];

/// One directed traversal of an original edge.
///
/// The carried [`Edge`] is always an original edge with its own attribute
/// bag; expansion never synthesizes attributes for augmented traversals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traversal {
    from: u64,
    to: u64,
    edge: Edge,
}

impl Traversal {
    /// Creates a traversal of `edge` in the direction `from` -> `to`.
    #[must_use]
    pub fn new(from: u64, to: u64, edge: Edge) -> Self {
        Self { from, to, edge }
    }

    /// Start vertex of this traversal.
    #[must_use]
    pub fn from(&self) -> u64 {
        self.from
    }

    /// End vertex of this traversal.
    #[must_use]
    pub fn to(&self) -> u64 {
        self.to
    }

    /// The traversed edge.
    #[must_use]
    pub fn edge(&self) -> &Edge {
        &self.edge
    }

    /// Edge length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.edge.length()
    }

    /// Edge name, falling back to [`UNKNOWN_NAME`].
    #[must_use]
    pub fn name_or_unknown(&self) -> &str {
        self.edge.name().unwrap_or(UNKNOWN_NAME)
    }
}

/// The solved route: a closed walk traversing every original edge at
/// least once.
///
/// Consecutive traversals share an endpoint and the last `to` equals the
/// first `from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Route {
    traversals: Vec<Traversal>,
}

impl Route {
    /// Wraps an ordered traversal list.
    #[must_use]
    pub fn new(traversals: Vec<Traversal>) -> Self {
        Self { traversals }
    }

    /// The ordered traversals.
    #[must_use]
    pub fn traversals(&self) -> &[Traversal] {
        &self.traversals
    }

    /// Number of traversals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.traversals.len()
    }

    /// Returns true for a route with no traversals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traversals.is_empty()
    }

    /// The implied vertex sequence: first `from` followed by every `to`.
    #[must_use]
    pub fn vertex_sequence(&self) -> Vec<u64> {
        let Some(first) = self.traversals.first() else {
            return Vec::new();
        };
        let mut sequence = Vec::with_capacity(self.traversals.len() + 1);
        sequence.push(first.from());
        sequence.extend(self.traversals.iter().map(Traversal::to));
        sequence
    }

    /// Total traversed length, counting revisited streets every time.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.traversals.iter().map(Traversal::length).sum()
    }

    /// Maps every traversal onto a tabular record, passing vertex
    /// positions through from `network`.
    #[must_use]
    pub fn records(&self, network: &RouteNetwork) -> Vec<RouteRecord> {
        self.traversals
            .iter()
            .map(|t| RouteRecord::from_traversal(t, network))
            .collect()
    }

    /// Reduces the route against its network to summary statistics.
    #[must_use]
    pub fn summary(&self, network: &RouteNetwork) -> RouteSummary {
        let total = self.total_length();
        let distinct = network.total_length();
        RouteSummary {
            total_length: total,
            distinct_edge_length: distinct,
            repeated_length: total - distinct,
        }
    }
}

/// Tabular form of one traversal. Field order matches
/// [`RECORD_COLUMNS`]; positions are pass-through vertex attributes and
/// may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Start vertex ID.
    pub start_node: u64,
    /// End vertex ID.
    pub end_node: u64,
    /// Street name, `"unknown"` when absent.
    pub name: String,
    /// Start latitude, if the vertex carries one.
    pub start_lat: Option<f64>,
    /// Start longitude, if the vertex carries one.
    pub start_lon: Option<f64>,
    /// End latitude, if the vertex carries one.
    pub end_lat: Option<f64>,
    /// End longitude, if the vertex carries one.
    pub end_lon: Option<f64>,
    /// Street length rounded to 3 decimal places, 0 when absent.
    pub length: f64,
}

impl RouteRecord {
    /// Builds the record for one traversal.
    #[must_use]
    pub fn from_traversal(traversal: &Traversal, network: &RouteNetwork) -> Self {
        let position = |vertex: u64, key: &str| {
            network
                .vertex(vertex)
                .and_then(|v| v.numeric_property(key))
        };
        Self {
            start_node: traversal.from(),
            end_node: traversal.to(),
            name: traversal.name_or_unknown().to_string(),
            start_lat: position(traversal.from(), "lat"),
            start_lon: position(traversal.from(), "lon"),
            end_lat: position(traversal.to(), "lat"),
            end_lon: position(traversal.to(), "lon"),
            length: round3(traversal.length()),
        }
    }
}

/// Headline statistics over a route: how long it is, how much street it
/// covers, and how much of it is repeated ground.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Total traversed length, revisits included.
    pub total_length: f64,
    /// Combined length of all distinct streets, each counted once.
    pub distinct_edge_length: f64,
    /// Length attributable to revisited (augmented) streets.
    pub repeated_length: f64,
}

/// Rounds to 3 decimal places, half away from zero.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
