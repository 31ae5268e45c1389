//! Minimum-weight perfect matching over the odd-degree vertex set.
//!
//! The solver builds an auxiliary complete graph whose vertices are the
//! odd-degree vertices and whose edge weights are shortest-path distances,
//! then asks a [`WeightedMatcher`] for a perfect matching of minimum total
//! weight. The matcher is a pluggable capability: [`BlossomMatcher`] is
//! the reference implementation (Edmonds primal-dual, O(n³));
//! [`ExhaustiveMatcher`] is a bounded-size exact alternative useful for
//! small odd sets and for cross-checking.
//!
//! # Example
//!
//! ```rust
//! use postrider_core::matching::{BlossomMatcher, PairWeights, WeightedMatcher};
//! use postrider_core::solver::CancelToken;
//!
//! // Four vertices; pairing (0,1) + (2,3) costs 2.0, anything else more.
//! let weights = PairWeights::from_fn(4, |i, j| {
//!     if (i, j) == (0, 1) || (i, j) == (2, 3) { 1.0 } else { 10.0 }
//! });
//! let pairs = BlossomMatcher::new()
//!     .pair_all(&weights, &CancelToken::new())
//!     .unwrap();
//! assert_eq!(pairs, vec![(0, 1), (2, 3)]);
//! ```

mod blossom;
mod exhaustive;

#[cfg(test)]
mod exhaustive_tests;

pub use blossom::BlossomMatcher;
pub use exhaustive::ExhaustiveMatcher;

use crate::error::{Error, Result};
use crate::solver::CancelToken;

/// Symmetric pairwise weights over vertices indexed `0..len`.
///
/// This is the auxiliary complete graph of the matching stage, stored
/// densely; the diagonal is unused.
#[derive(Debug, Clone)]
pub struct PairWeights {
    len: usize,
    weights: Vec<f64>,
}

impl PairWeights {
    /// Builds a weight table by evaluating `weight_of(i, j)` for every
    /// pair `i < j`.
    pub fn from_fn<F>(len: usize, mut weight_of: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut weights = vec![0.0; len * len];
        for i in 0..len {
            for j in (i + 1)..len {
                let w = weight_of(i, j);
                weights[i * len + j] = w;
                weights[j * len + i] = w;
            }
        }
        Self { len, weights }
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true when the table covers no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Weight of the pair `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds or `i == j`.
    #[must_use]
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        assert!(i != j, "pair weight requested for identical vertices");
        self.weights[i * self.len + j]
    }

    /// Total weight of a set of pairs.
    #[must_use]
    pub fn total(&self, pairs: &[(usize, usize)]) -> f64 {
        pairs.iter().map(|&(i, j)| self.weight(i, j)).sum()
    }
}

/// Capability for computing a minimum-weight perfect matching over a
/// complete auxiliary graph.
pub trait WeightedMatcher {
    /// Returns `len / 2` disjoint pairs covering every vertex exactly
    /// once, minimizing total pair weight. Pairs are normalized to
    /// `(low, high)` and sorted for deterministic output.
    ///
    /// # Errors
    ///
    /// Returns `Error::ImpossibleMatching` if the vertex count is odd,
    /// or `Error::Cancelled`.
    fn pair_all(
        &self,
        weights: &PairWeights,
        cancel: &CancelToken,
    ) -> Result<Vec<(usize, usize)>>;
}

/// Shared precondition: a perfect matching needs an even vertex count.
fn ensure_even(weights: &PairWeights) -> Result<()> {
    if weights.len() % 2 != 0 {
        return Err(Error::ImpossibleMatching(weights.len()));
    }
    Ok(())
}

/// Normalizes matcher output: each pair `(low, high)`, pairs ascending.
fn normalize(mut pairs: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    for pair in &mut pairs {
        if pair.0 > pair.1 {
            *pair = (pair.1, pair.0);
        }
    }
    pairs.sort_unstable();
    pairs
}
