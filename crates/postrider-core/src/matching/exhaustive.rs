//! Exhaustive minimum-weight perfect matching for small vertex sets.
//!
//! Enumerates pairings recursively with branch-and-bound pruning. The
//! search visits `(n - 1)!!` pairings in the worst case, so this matcher
//! is only suitable for small odd-vertex sets; it exists as the simple
//! swap-in alternative to [`BlossomMatcher`](super::BlossomMatcher) and
//! as an independent oracle in tests.

use crate::error::Result;
use crate::solver::CancelToken;

use super::{ensure_even, normalize, PairWeights, WeightedMatcher};

/// Exact matcher by exhaustive enumeration.
///
/// Pruning assumes non-negative pair weights, which shortest-path
/// distance tables always satisfy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveMatcher;

impl ExhaustiveMatcher {
    /// Creates the matcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl WeightedMatcher for ExhaustiveMatcher {
    fn pair_all(
        &self,
        weights: &PairWeights,
        cancel: &CancelToken,
    ) -> Result<Vec<(usize, usize)>> {
        ensure_even(weights)?;
        if weights.is_empty() {
            return Ok(Vec::new());
        }

        let mut search = Search {
            weights,
            cancel,
            used: vec![false; weights.len()],
            current: Vec::with_capacity(weights.len() / 2),
            best_weight: f64::INFINITY,
            best: Vec::new(),
        };
        search.descend(0.0)?;
        Ok(normalize(search.best))
    }
}

struct Search<'a> {
    weights: &'a PairWeights,
    cancel: &'a CancelToken,
    used: Vec<bool>,
    current: Vec<(usize, usize)>,
    best_weight: f64,
    best: Vec<(usize, usize)>,
}

impl Search<'_> {
    /// Pairs the lowest unused vertex with every remaining candidate.
    /// Strict improvement keeps the first-found optimum, so ties resolve
    /// to the lexicographically smallest pairing.
    fn descend(&mut self, accumulated: f64) -> Result<()> {
        self.cancel.check()?;

        let Some(first) = self.used.iter().position(|&used| !used) else {
            if accumulated < self.best_weight {
                self.best_weight = accumulated;
                self.best = self.current.clone();
            }
            return Ok(());
        };

        self.used[first] = true;
        for partner in (first + 1)..self.weights.len() {
            if self.used[partner] {
                continue;
            }
            let extended = accumulated + self.weights.weight(first, partner);
            if extended >= self.best_weight {
                continue; // cannot improve; weights are non-negative
            }
            self.used[partner] = true;
            self.current.push((first, partner));
            self.descend(extended)?;
            self.current.pop();
            self.used[partner] = false;
        }
        self.used[first] = false;
        Ok(())
    }
}
