//! End-to-end solver scenarios over street-like networks.

use serde_json::json;
use std::collections::HashMap;

use postrider_core::graph::{Edge, RouteNetwork, Vertex};
use postrider_core::solver::{solve, SolveOptions};

fn street_vertex(id: u64, lat: f64, lon: f64) -> Vertex {
    let mut props = HashMap::new();
    props.insert("lat".to_string(), json!(lat));
    props.insert("lon".to_string(), json!(lon));
    Vertex::new(id).with_properties(props)
}

fn street_edge(id: u64, a: u64, b: u64, length: f64, name: &str) -> Edge {
    let mut props = HashMap::new();
    props.insert("name".to_string(), json!(name));
    Edge::new(id, a, b, length).unwrap().with_properties(props)
}

/// 3x3 street grid; vertex (row, col) has ID `3 * row + col + 1`.
fn street_grid() -> RouteNetwork {
    let mut network = RouteNetwork::new();
    for row in 0..3_u64 {
        for col in 0..3_u64 {
            let id = 3 * row + col + 1;
            #[allow(clippy::cast_precision_loss)]
            let (lat, lon) = (51.0 + row as f64 * 0.001, -118.2 + col as f64 * 0.001);
            network.add_vertex(street_vertex(id, lat, lon)).unwrap();
        }
    }
    let mut next_edge = 100;
    for row in 0..3_u64 {
        for col in 0..3_u64 {
            let id = 3 * row + col + 1;
            if col < 2 {
                network
                    .add_edge(street_edge(next_edge, id, id + 1, 110.0, "East Street"))
                    .unwrap();
                next_edge += 1;
            }
            if row < 2 {
                network
                    .add_edge(street_edge(next_edge, id, id + 3, 95.0, "North Avenue"))
                    .unwrap();
                next_edge += 1;
            }
        }
    }
    network
}

#[test]
fn grid_route_covers_every_street() {
    let network = street_grid();
    let route = solve(&network, &SolveOptions::new().with_start(1)).unwrap();

    for edge_id in network.edge_ids() {
        assert!(
            route.traversals().iter().any(|t| t.edge().id() == edge_id),
            "street {edge_id} missing from route"
        );
    }

    let sequence = route.vertex_sequence();
    assert_eq!(sequence.first(), Some(&1));
    assert_eq!(sequence.last(), Some(&1));
}

#[test]
fn grid_route_chains_traversals() {
    let network = street_grid();
    let route = solve(&network, &SolveOptions::new().with_start(5)).unwrap();

    for pair in route.traversals().windows(2) {
        assert_eq!(pair[0].to(), pair[1].from());
    }
    for traversal in route.traversals() {
        let (a, b) = traversal.edge().endpoints();
        assert!(
            (traversal.from(), traversal.to()) == (a, b)
                || (traversal.from(), traversal.to()) == (b, a),
            "traversal direction must follow its edge"
        );
    }
}

#[test]
fn grid_summary_accounts_for_repeats() {
    let network = street_grid();
    let route = solve(&network, &SolveOptions::new()).unwrap();
    let summary = route.summary(&network);

    assert!(summary.total_length >= summary.distinct_edge_length);
    assert!(summary.repeated_length >= 0.0);
    assert!(
        (summary.total_length - summary.distinct_edge_length - summary.repeated_length).abs()
            < 1e-9
    );
    // The grid has four odd-degree vertices (edge midpoints), so some
    // street must be walked twice.
    assert!(summary.repeated_length > 0.0);
}

#[test]
fn grid_records_have_positions_and_names() {
    let network = street_grid();
    let route = solve(&network, &SolveOptions::new().with_start(1)).unwrap();
    let records = route.records(&network);

    assert_eq!(records.len(), route.len());
    for record in &records {
        assert!(record.start_lat.is_some());
        assert!(record.start_lon.is_some());
        assert!(record.end_lat.is_some());
        assert!(record.end_lon.is_some());
        assert!(record.name == "East Street" || record.name == "North Avenue");
        assert!(record.length == 110.0 || record.length == 95.0);
    }
}

#[test]
fn complete_graph_on_four_vertices() {
    // K4 with unit lengths: every vertex has odd degree 3, pairwise
    // distances are all 1, so the optimal route is 6 + 2 = 8.
    let mut network = RouteNetwork::new();
    for id in 1..=4 {
        network.add_vertex(Vertex::new(id)).unwrap();
    }
    let mut next_edge = 10;
    for a in 1..=4_u64 {
        for b in (a + 1)..=4 {
            network
                .add_edge(Edge::new(next_edge, a, b, 1.0).unwrap())
                .unwrap();
            next_edge += 1;
        }
    }

    let route = solve(&network, &SolveOptions::new().with_start(1)).unwrap();
    assert!((route.total_length() - 8.0).abs() < 1e-9);
}

#[test]
fn two_way_streets_from_directed_arcs() {
    let vertices = vec![
        street_vertex(1, 51.0, -118.2),
        street_vertex(2, 51.001, -118.2),
        street_vertex(3, 51.001, -118.199),
    ];
    // Each street appears as a reciprocal arc pair.
    let arcs = vec![
        street_edge(10, 1, 2, 50.0, "Mill Road"),
        street_edge(11, 2, 1, 50.0, "Mill Road"),
        street_edge(12, 2, 3, 60.0, "Mill Road"),
        street_edge(13, 3, 2, 60.0, "Mill Road"),
        street_edge(14, 3, 1, 70.0, "Cross Lane"),
        street_edge(15, 1, 3, 70.0, "Cross Lane"),
    ];
    let network = RouteNetwork::from_directed_arcs(vertices, arcs).unwrap();

    assert_eq!(network.edge_count(), 3);
    let route = solve(&network, &SolveOptions::new().with_start(1)).unwrap();
    // The triangle is Eulerian once direction is dropped.
    assert!((route.total_length() - 180.0).abs() < 1e-9);
}

#[test]
fn bridge_street_is_walked_twice() {
    // Two triangles joined by a bridge: the bridge's endpoints are the
    // only odd vertices and the bridge itself is the shortest repair.
    let mut network = RouteNetwork::new();
    for id in 1..=6 {
        network.add_vertex(Vertex::new(id)).unwrap();
    }
    for &(id, a, b) in &[
        (10, 1, 2),
        (11, 2, 3),
        (12, 3, 1),
        (13, 4, 5),
        (14, 5, 6),
        (15, 6, 4),
    ] {
        network.add_edge(Edge::new(id, a, b, 1.0).unwrap()).unwrap();
    }
    network.add_edge(Edge::new(16, 3, 4, 0.5).unwrap()).unwrap();

    let route = solve(&network, &SolveOptions::new().with_start(1)).unwrap();
    assert!((route.total_length() - 7.0).abs() < 1e-9);

    let bridge_uses = route
        .traversals()
        .iter()
        .filter(|t| t.edge().id() == 16)
        .count();
    assert_eq!(bridge_uses, 2);
}
