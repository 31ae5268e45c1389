//! Property-based invariants of the solve pipeline.
//!
//! Random connected multigraphs are generated from a spanning chain plus
//! arbitrary extra edges (parallels and self-loops included); every
//! solve must produce a closed walk covering all streets, and the
//! blossom matcher must agree with the exhaustive matcher on total
//! weight.

use proptest::{
    collection::vec,
    prelude::{prop_assert, prop_assert_eq, Strategy},
    proptest,
    test_runner::Config as ProptestConfig,
};

use postrider_core::graph::{Edge, RouteNetwork, Vertex};
use postrider_core::matching::ExhaustiveMatcher;
use postrider_core::parity::odd_vertices;
use postrider_core::solver::{solve, solve_with_matcher, SolveOptions};

const MAX_VERTICES: usize = 9;

/// Raw material for a random connected multigraph.
#[derive(Debug, Clone)]
struct RawGraph {
    vertex_count: usize,
    chain_weights: Vec<f64>,
    extras: Vec<(usize, usize, f64)>,
    start_pick: usize,
}

fn raw_graph_strategy() -> impl Strategy<Value = RawGraph> {
    (
        2..=MAX_VERTICES,
        vec(0.05_f64..25.0, MAX_VERTICES),
        vec(
            (0..MAX_VERTICES, 0..MAX_VERTICES, 0.05_f64..25.0),
            0..=14,
        ),
        0..MAX_VERTICES,
    )
        .prop_map(|(vertex_count, chain_weights, extras, start_pick)| RawGraph {
            vertex_count,
            chain_weights,
            extras,
            start_pick,
        })
}

/// Builds a connected network: a chain over all vertices guarantees
/// connectivity, extras add parallels, chords, and self-loops.
fn build(raw: &RawGraph) -> (RouteNetwork, u64) {
    let n = raw.vertex_count;
    let mut network = RouteNetwork::new();
    for id in 0..n {
        network.add_vertex(Vertex::new(id as u64)).unwrap();
    }
    let mut next_edge = 0_u64;
    for i in 0..n - 1 {
        let edge = Edge::new(next_edge, i as u64, i as u64 + 1, raw.chain_weights[i]).unwrap();
        network.add_edge(edge).unwrap();
        next_edge += 1;
    }
    for &(a, b, weight) in &raw.extras {
        let edge = Edge::new(next_edge, (a % n) as u64, (b % n) as u64, weight).unwrap();
        network.add_edge(edge).unwrap();
        next_edge += 1;
    }
    (network, (raw.start_pick % n) as u64)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    #[test]
    fn odd_vertex_count_is_always_even(raw in raw_graph_strategy()) {
        let (network, _) = build(&raw);
        prop_assert_eq!(odd_vertices(&network).len() % 2, 0);
    }

    #[test]
    fn route_is_a_closed_walk_over_every_street(raw in raw_graph_strategy()) {
        let (network, start) = build(&raw);
        let route = solve(&network, &SolveOptions::new().with_start(start)).unwrap();

        // Closed and anchored.
        let sequence = route.vertex_sequence();
        prop_assert_eq!(sequence.first().copied(), Some(start));
        prop_assert_eq!(sequence.last().copied(), Some(start));

        // Consecutive traversals chain, and each follows its edge.
        for pair in route.traversals().windows(2) {
            prop_assert_eq!(pair[0].to(), pair[1].from());
        }
        for traversal in route.traversals() {
            let (a, b) = traversal.edge().endpoints();
            prop_assert!(
                (traversal.from(), traversal.to()) == (a, b)
                    || (traversal.from(), traversal.to()) == (b, a)
            );
        }

        // Every original street appears at least once.
        for edge_id in network.edge_ids() {
            prop_assert!(
                route.traversals().iter().any(|t| t.edge().id() == edge_id),
                "street {} missing from route", edge_id
            );
        }

        // No augmented edge leaks into the result.
        prop_assert!(route.traversals().iter().all(|t| !t.edge().is_augmented()));
    }

    #[test]
    fn total_length_never_beats_the_street_sum(raw in raw_graph_strategy()) {
        let (network, start) = build(&raw);
        let route = solve(&network, &SolveOptions::new().with_start(start)).unwrap();
        let summary = route.summary(&network);

        prop_assert!(summary.total_length >= summary.distinct_edge_length - 1e-9);
        prop_assert!(summary.repeated_length >= -1e-9);

        // An already-even network is walked without any repeats.
        if odd_vertices(&network).is_empty() {
            prop_assert!(summary.repeated_length.abs() < 1e-9);
        }
    }

    #[test]
    fn blossom_agrees_with_exhaustive_on_total_length(raw in raw_graph_strategy()) {
        let (network, start) = build(&raw);
        let options = SolveOptions::new().with_start(start);

        let blossom = solve(&network, &options).unwrap();
        let exhaustive =
            solve_with_matcher(&network, &options, &ExhaustiveMatcher::new()).unwrap();

        let difference = (blossom.total_length() - exhaustive.total_length()).abs();
        prop_assert!(
            difference < 1e-6,
            "blossom {} vs exhaustive {}",
            blossom.total_length(),
            exhaustive.total_length()
        );
    }

    #[test]
    fn repeated_solves_are_identical(raw in raw_graph_strategy()) {
        let (network, start) = build(&raw);
        let options = SolveOptions::new().with_start(start);

        let first = solve(&network, &options).unwrap();
        let second = solve(&network, &options).unwrap();

        prop_assert_eq!(first.total_length(), second.total_length());
        prop_assert_eq!(first.vertex_sequence(), second.vertex_sequence());
    }
}
