//! Tests for the solve pipeline.

use serde_json::json;
use std::collections::HashMap;

use super::graph::{Edge, RouteNetwork, Vertex};
use super::matching::ExhaustiveMatcher;
use super::solver::{solve, solve_with_matcher, CancelToken, SolveOptions};
use crate::error::Error;

/// The worked example: 4-cycle A(1)-B(2)-C(3)-D(4) with unit weights
/// plus diagonal A-C of weight 1.2.
fn cycle_with_diagonal() -> RouteNetwork {
    let mut network = RouteNetwork::new();
    for id in 1..=4 {
        network.add_vertex(Vertex::new(id)).unwrap();
    }
    network.add_edge(Edge::new(10, 1, 2, 1.0).unwrap()).unwrap();
    network.add_edge(Edge::new(11, 2, 3, 1.0).unwrap()).unwrap();
    network.add_edge(Edge::new(12, 3, 4, 1.0).unwrap()).unwrap();
    network.add_edge(Edge::new(13, 4, 1, 1.0).unwrap()).unwrap();
    network.add_edge(Edge::new(14, 1, 3, 1.2).unwrap()).unwrap();
    network
}

#[test]
fn test_worked_example_total_length() {
    let network = cycle_with_diagonal();
    let route = solve(&network, &SolveOptions::new().with_start(1)).unwrap();

    // 4.0 (cycle) + 1.2 (diagonal) + 1.2 (diagonal traversed again).
    assert!((route.total_length() - 6.4).abs() < 1e-9);

    let summary = route.summary(&network);
    assert!((summary.repeated_length - 1.2).abs() < 1e-9);
}

#[test]
fn test_route_is_closed_walk_from_start() {
    let route = solve(&cycle_with_diagonal(), &SolveOptions::new().with_start(3)).unwrap();
    let sequence = route.vertex_sequence();
    assert_eq!(sequence.first(), Some(&3));
    assert_eq!(sequence.last(), Some(&3));
}

#[test]
fn test_every_original_edge_is_covered() {
    let network = cycle_with_diagonal();
    let route = solve(&network, &SolveOptions::new()).unwrap();

    for edge_id in network.edge_ids() {
        assert!(
            route.traversals().iter().any(|t| t.edge().id() == edge_id),
            "edge {edge_id} missing from route"
        );
    }
}

#[test]
fn test_already_eulerian_graph_skips_matching() {
    let mut network = RouteNetwork::new();
    for id in 1..=3 {
        network.add_vertex(Vertex::new(id)).unwrap();
    }
    network.add_edge(Edge::new(10, 1, 2, 1.0).unwrap()).unwrap();
    network.add_edge(Edge::new(11, 2, 3, 2.0).unwrap()).unwrap();
    network.add_edge(Edge::new(12, 3, 1, 3.0).unwrap()).unwrap();

    let route = solve(&network, &SolveOptions::new()).unwrap();
    assert_eq!(route.len(), 3);
    assert!((route.total_length() - network.total_length()).abs() < 1e-9);

    let summary = route.summary(&network);
    assert!(summary.repeated_length.abs() < 1e-9);
}

#[test]
fn test_default_start_is_smallest_vertex() {
    let route = solve(&cycle_with_diagonal(), &SolveOptions::new()).unwrap();
    assert_eq!(route.vertex_sequence().first(), Some(&1));
}

#[test]
fn test_invalid_start_vertex() {
    let err = solve(&cycle_with_diagonal(), &SolveOptions::new().with_start(77)).unwrap_err();
    assert!(matches!(err, Error::InvalidStartVertex(77)));
}

#[test]
fn test_disconnected_graph_fails_before_solving() {
    let mut network = cycle_with_diagonal();
    network.add_vertex(Vertex::new(50)).unwrap();
    network.add_vertex(Vertex::new(51)).unwrap();
    network.add_edge(Edge::new(20, 50, 51, 1.0).unwrap()).unwrap();

    let err = solve(&network, &SolveOptions::new()).unwrap_err();
    assert!(matches!(err, Error::DisconnectedGraph(_, _)));
}

#[test]
fn test_empty_network_yields_empty_route() {
    let route = solve(&RouteNetwork::new(), &SolveOptions::new()).unwrap();
    assert!(route.is_empty());
    assert!(route.vertex_sequence().is_empty());
}

#[test]
fn test_cancellation_before_start() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let options = SolveOptions::new().with_cancel_token(cancel);
    let err = solve(&cycle_with_diagonal(), &options).unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[test]
fn test_repeated_solves_agree_on_total_length() {
    let network = cycle_with_diagonal();
    let options = SolveOptions::new().with_start(1);
    let first = solve(&network, &options).unwrap();
    let second = solve(&network, &options).unwrap();
    assert_eq!(first.total_length(), second.total_length());
    assert_eq!(first.vertex_sequence(), second.vertex_sequence());
}

#[test]
fn test_exhaustive_matcher_gives_same_total_length() {
    let network = cycle_with_diagonal();
    let options = SolveOptions::new().with_start(1);
    let blossom = solve(&network, &options).unwrap();
    let exhaustive =
        solve_with_matcher(&network, &options, &ExhaustiveMatcher::new()).unwrap();
    assert!((blossom.total_length() - exhaustive.total_length()).abs() < 1e-9);
}

#[test]
fn test_records_pass_positions_through() {
    let mut network = RouteNetwork::new();
    let mut props = HashMap::new();
    props.insert("lat".to_string(), json!(51.0));
    props.insert("lon".to_string(), json!(-118.2));
    network.add_vertex(Vertex::new(1).with_properties(props)).unwrap();
    network.add_vertex(Vertex::new(2)).unwrap();

    let mut street = HashMap::new();
    street.insert("name".to_string(), json!("Bridge Road"));
    network
        .add_edge(Edge::new(10, 1, 2, 2.0004).unwrap().with_properties(street))
        .unwrap();
    network.add_edge(Edge::new(11, 2, 1, 3.0).unwrap()).unwrap();

    let route = solve(&network, &SolveOptions::new().with_start(1)).unwrap();
    let records = route.records(&network);

    assert_eq!(records.len(), 2);
    let named = records.iter().find(|r| r.name == "Bridge Road").unwrap();
    assert_eq!(named.length, 2.0); // rounded to 3 decimals
    let unnamed = records.iter().find(|r| r.name == "unknown").unwrap();
    assert_eq!(unnamed.length, 3.0);

    let from_one = records.iter().find(|r| r.start_node == 1).unwrap();
    assert_eq!(from_one.start_lat, Some(51.0));
    assert_eq!(from_one.start_lon, Some(-118.2));
    let into_one = records.iter().find(|r| r.end_node == 1).unwrap();
    assert_eq!(into_one.end_lat, Some(51.0));
}
