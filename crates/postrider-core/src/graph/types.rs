//! Vertex and edge types for route networks.
//!
//! Vertices are identity plus a caller-supplied attribute bag (position,
//! labels); they carry no algorithmic state. Edges join two vertices with a
//! non-negative length, an attribute bag (name, original payload), and a
//! [`Trail`] tag distinguishing original edges from parity-repair edges.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Marks whether an edge was present in the input graph or added during
/// parity repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trail {
    /// Edge supplied by the caller.
    Original,
    /// Synthetic edge standing in for the shortest real path between a
    /// matched odd-vertex pair.
    Augmented,
}

/// A vertex in the route network.
///
/// # Example
///
/// ```rust
/// use postrider_core::graph::Vertex;
/// use serde_json::json;
/// use std::collections::HashMap;
///
/// let mut props = HashMap::new();
/// props.insert("lat".to_string(), json!(50.99));
/// props.insert("lon".to_string(), json!(-118.19));
///
/// let vertex = Vertex::new(1).with_properties(props);
/// assert_eq!(vertex.id(), 1);
/// assert_eq!(vertex.numeric_property("lat"), Some(50.99));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vertex {
    id: u64,
    properties: HashMap<String, Value>,
}

impl Vertex {
    /// Creates a new vertex with the given ID and no attributes.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            properties: HashMap::new(),
        }
    }

    /// Adds attributes to this vertex (builder pattern).
    #[must_use]
    pub fn with_properties(mut self, properties: HashMap<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    /// Returns the vertex ID.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns all attributes of this vertex.
    #[must_use]
    pub fn properties(&self) -> &HashMap<String, Value> {
        &self.properties
    }

    /// Returns a specific attribute value, if present.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Returns an attribute as `f64`, if present and numeric.
    #[must_use]
    pub fn numeric_property(&self, name: &str) -> Option<f64> {
        self.properties.get(name).and_then(Value::as_f64)
    }

    /// Sets an attribute value.
    pub fn set_property(&mut self, name: &str, value: Value) {
        self.properties.insert(name.to_string(), value);
    }
}

/// An undirected edge in the route network.
///
/// The `source`/`target` order is storage order only; traversal treats the
/// pair as unordered. Parallel edges between the same vertex pair are
/// permitted and distinguished by ID.
///
/// # Example
///
/// ```rust
/// use postrider_core::graph::{Edge, Trail};
///
/// let edge = Edge::new(100, 1, 2, 37.5).unwrap();
/// assert_eq!(edge.endpoints(), (1, 2));
/// assert_eq!(edge.trail(), Trail::Original);
/// assert_eq!(edge.other_endpoint(2), Some(1));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    id: u64,
    source: u64,
    target: u64,
    length: f64,
    trail: Trail,
    properties: HashMap<String, Value>,
}

impl Edge {
    /// Creates a new original edge with the given ID, endpoints, and length.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidEdgeWeight` if the length is negative, NaN,
    /// or infinite.
    pub fn new(id: u64, source: u64, target: u64, length: f64) -> Result<Self> {
        if !length.is_finite() || length < 0.0 {
            return Err(Error::InvalidEdgeWeight(id, length));
        }
        Ok(Self {
            id,
            source,
            target,
            length,
            trail: Trail::Original,
            properties: HashMap::new(),
        })
    }

    /// Creates an augmented edge standing in for the shortest path between
    /// a matched pair of odd vertices.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidEdgeWeight` if the length is negative, NaN,
    /// or infinite.
    pub fn augmented(id: u64, source: u64, target: u64, length: f64) -> Result<Self> {
        let mut edge = Self::new(id, source, target, length)?;
        edge.trail = Trail::Augmented;
        Ok(edge)
    }

    /// Adds attributes to this edge (builder pattern).
    #[must_use]
    pub fn with_properties(mut self, properties: HashMap<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    /// Returns the edge ID.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the endpoint pair in storage order.
    #[must_use]
    pub fn endpoints(&self) -> (u64, u64) {
        (self.source, self.target)
    }

    /// Returns the endpoint opposite `vertex`, or `None` if `vertex` is not
    /// an endpoint. For a self-loop the loop vertex is its own opposite.
    #[must_use]
    pub fn other_endpoint(&self, vertex: u64) -> Option<u64> {
        if vertex == self.source {
            Some(self.target)
        } else if vertex == self.target {
            Some(self.source)
        } else {
            None
        }
    }

    /// Returns true if `vertex` is an endpoint of this edge.
    #[must_use]
    pub fn touches(&self, vertex: u64) -> bool {
        vertex == self.source || vertex == self.target
    }

    /// Returns true if both endpoints are the same vertex.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Returns the edge length (weight).
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Returns the trail tag.
    #[must_use]
    pub fn trail(&self) -> Trail {
        self.trail
    }

    /// Returns true for parity-repair edges.
    #[must_use]
    pub fn is_augmented(&self) -> bool {
        self.trail == Trail::Augmented
    }

    /// Returns all attributes of this edge.
    #[must_use]
    pub fn properties(&self) -> &HashMap<String, Value> {
        &self.properties
    }

    /// Returns a specific attribute value, if present.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Returns the edge name, unwrapping list-valued payloads to their
    /// first element. Street data sometimes stores multiple names per way.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self.properties.get("name") {
            Some(Value::String(s)) => Some(s.as_str()),
            Some(Value::Array(values)) => values.first().and_then(Value::as_str),
            _ => None,
        }
    }
}
