//! Tests for the exhaustive matcher.

use super::exhaustive::ExhaustiveMatcher;
use super::{PairWeights, WeightedMatcher};
use crate::error::Error;
use crate::solver::CancelToken;

#[test]
fn test_two_vertices() {
    let weights = PairWeights::from_fn(2, |_, _| 3.0);
    let pairs = ExhaustiveMatcher::new()
        .pair_all(&weights, &CancelToken::new())
        .unwrap();
    assert_eq!(pairs, vec![(0, 1)]);
}

#[test]
fn test_four_vertices_picks_minimum() {
    // (0,1)+(2,3) = 11, (0,2)+(1,3) = 4, (0,3)+(1,2) = 11.
    let weights = PairWeights::from_fn(4, |i, j| match (i, j) {
        (0, 2) | (1, 3) => 2.0,
        (0, 1) | (2, 3) => 5.5,
        _ => 9.0,
    });
    let pairs = ExhaustiveMatcher::new()
        .pair_all(&weights, &CancelToken::new())
        .unwrap();
    assert_eq!(pairs, vec![(0, 2), (1, 3)]);
}

#[test]
fn test_tie_resolves_lexicographically() {
    let weights = PairWeights::from_fn(4, |_, _| 1.0);
    let pairs = ExhaustiveMatcher::new()
        .pair_all(&weights, &CancelToken::new())
        .unwrap();
    assert_eq!(pairs, vec![(0, 1), (2, 3)]);
}

#[test]
fn test_rejects_odd_count() {
    let weights = PairWeights::from_fn(5, |_, _| 1.0);
    let err = ExhaustiveMatcher::new()
        .pair_all(&weights, &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, Error::ImpossibleMatching(5)));
}

#[test]
fn test_empty_set() {
    let weights = PairWeights::from_fn(0, |_, _| 0.0);
    let pairs = ExhaustiveMatcher::new()
        .pair_all(&weights, &CancelToken::new())
        .unwrap();
    assert!(pairs.is_empty());
}

#[test]
fn test_cancellation() {
    let weights = PairWeights::from_fn(4, |_, _| 1.0);
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = ExhaustiveMatcher::new()
        .pair_all(&weights, &cancel)
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[test]
fn test_every_vertex_appears_exactly_once() {
    let weights = PairWeights::from_fn(8, |i, j| ((i * 31 + j * 17) % 23) as f64 + 1.0);
    let pairs = ExhaustiveMatcher::new()
        .pair_all(&weights, &CancelToken::new())
        .unwrap();

    assert_eq!(pairs.len(), 4);
    let mut seen = vec![false; 8];
    for (a, b) in pairs {
        assert!(!seen[a] && !seen[b]);
        seen[a] = true;
        seen[b] = true;
    }
    assert!(seen.into_iter().all(|s| s));
}
