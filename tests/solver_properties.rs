//! Cross-checks between the path solvers and overlay synthesis on random networks

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use transit_graph::{
    bfs, travel_minutes, Algorithm, Graph, LineRequest, Mode, NetworkConfig, StopIdentity, StopKey,
    StopRole, TransitNetwork,
};

const WALK_KMH: f64 = 5.0;

/// Random stops around Porto with `edges` random walking edges
fn random_graph(rng: &mut StdRng, stops: i64, edges: usize) -> Graph {
    let mut graph = Graph::new();
    let mut placed = Vec::new();
    for id in 0..stops {
        let stop = StopIdentity::base(
            id,
            -8.62 + rng.random_range(0.0..0.03),
            41.14 + rng.random_range(0.0..0.03),
        );
        graph.add_vertex(stop);
        placed.push(stop);
    }
    for _ in 0..edges {
        let a = placed[rng.random_range(0..placed.len())];
        let b = placed[rng.random_range(0..placed.len())];
        if a == b {
            continue;
        }
        let seq = graph.next_sequence_id();
        graph.add_edge(a, b, travel_minutes(a.distance_km(&b), WALK_KMH), seq);
    }
    graph
}

fn assert_valid_path(graph: &Graph, path: &[StopIdentity], origin: StopKey, destination: StopKey) {
    assert_eq!(path.first().map(StopIdentity::key), Some(origin));
    assert_eq!(path.last().map(StopIdentity::key), Some(destination));
    assert!(graph.path_weight(path).is_some(), "path uses a missing edge");
}

#[test]
fn test_solvers_agree_on_cost() {
    let mut rng = StdRng::seed_from_u64(31);
    for round in 0..5 {
        let graph = random_graph(&mut rng, 40, 160);
        let stops: Vec<StopKey> = graph.all_vertices().iter().map(|v| v.stop().key()).collect();
        let mut network = TransitNetwork::new(graph, NetworkConfig::default());

        for _ in 0..30 {
            let origin = stops[rng.random_range(0..stops.len())];
            let destination = stops[rng.random_range(0..stops.len())];

            let paths: Vec<Vec<StopIdentity>> = Algorithm::ALL
                .iter()
                .map(|&a| network.shortest_path(origin, destination, a).unwrap())
                .collect();

            let reachable = bfs(network.graph(), origin).any(|s| s.key() == destination);
            for (algorithm, path) in Algorithm::ALL.iter().zip(&paths) {
                assert_eq!(!path.is_empty(), reachable, "round {round}: {algorithm} disagrees with BFS");
            }
            if !reachable {
                continue;
            }

            let costs: Vec<f64> = paths
                .iter()
                .map(|p| {
                    assert_valid_path(network.graph(), p, origin, destination);
                    network.graph().path_weight(p).unwrap()
                })
                .collect();
            for cost in &costs[1..] {
                assert!((cost - costs[0]).abs() < 1e-9, "round {round}: costs {costs:?}");
            }
        }
    }
}

#[test]
fn test_subpaths_are_optimal() {
    let mut rng = StdRng::seed_from_u64(8);
    let graph = random_graph(&mut rng, 30, 120);
    let stops: Vec<StopKey> = graph.all_vertices().iter().map(|v| v.stop().key()).collect();
    let mut network = TransitNetwork::new(graph, NetworkConfig::default());

    for _ in 0..20 {
        let origin = stops[rng.random_range(0..stops.len())];
        let destination = stops[rng.random_range(0..stops.len())];
        let path = network.shortest_path(origin, destination, Algorithm::Dijkstra).unwrap();
        if path.len() < 3 {
            continue;
        }

        let mid = path.len() / 2;
        let prefix = network
            .shortest_path(origin, path[mid], Algorithm::Dijkstra)
            .unwrap();
        let head = network.graph().path_weight(&path[..=mid]).unwrap();
        let best = network.graph().path_weight(&prefix).unwrap();
        assert!((head - best).abs() < 1e-9);
    }
}

/// Bidirectional 7x7 walking grid
fn grid_network() -> TransitNetwork {
    grid_network_of(7)
}

/// Bidirectional `n x n` walking grid
fn grid_network_of(n: i64) -> TransitNetwork {
    let mut graph = Graph::new();
    let at = |r: i64, c: i64| StopIdentity::base(r * n + c, -8.62 + c as f64 * 0.003, 41.14 + r as f64 * 0.003);
    for r in 0..n {
        for c in 0..n {
            graph.add_vertex(at(r, c));
        }
    }
    for r in 0..n {
        for c in 0..n {
            for (nr, nc) in [(r + 1, c), (r, c + 1)] {
                if nr < n && nc < n {
                    let (a, b) = (at(r, c), at(nr, nc));
                    let w = travel_minutes(a.distance_km(&b), WALK_KMH);
                    let seq = graph.next_sequence_id();
                    graph.add_edge(a, b, w, seq);
                    let seq = graph.next_sequence_id();
                    graph.add_edge(b, a, w, seq);
                }
            }
        }
    }
    TransitNetwork::new(graph, NetworkConfig::default())
}

#[test]
fn test_synthesis_preserves_graph_consistency() {
    let mut network = grid_network();
    let base_vertices = network.graph().vertex_count();
    let mut rng = StdRng::seed_from_u64(99);
    let request = LineRequest {
        subway_lines: 3,
        subway_min_stops: 6,
        bus_lines: 4,
        bus_min_stops: 4,
    };

    assert_eq!(network.synthesize_lines(&request, &mut rng).unwrap(), 7);
    let graph = network.graph();
    assert!(graph.vertex_count() > base_vertices);

    for vertex in graph.all_vertices() {
        for edge in vertex.edges() {
            assert!(edge.target.index() < graph.vertex_count());
            assert!(edge.weight >= 0.0);
        }
    }

    for line in network.lines() {
        let min = if line.mode() == Mode::Subway { 6 } else { 4 };
        assert!(line.len() >= min);

        let stops = line.identities();
        for stop in &stops {
            assert_eq!(stop.mode, line.mode());
            assert!(graph.get_vertex(StopKey::base(stop.id)).is_some());
        }
        // Consecutive line stops are joined by segment edges
        assert!(graph.path_weight(&stops).is_some());
    }
}

#[test]
fn test_lines_never_slow_down_routes() {
    let mut network = grid_network();
    let stops: Vec<StopKey> = network
        .graph()
        .all_vertices()
        .iter()
        .map(|v| v.stop().key())
        .collect();
    let pairs: Vec<(StopKey, StopKey)> = stops.iter().step_by(5).zip(stops.iter().rev().step_by(3)).map(|(a, b)| (*a, *b)).collect();

    let before: Vec<f64> = pairs
        .iter()
        .map(|&(a, b)| {
            let path = network.shortest_path(a, b, Algorithm::Dijkstra).unwrap();
            network.graph().path_weight(&path).unwrap()
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(4);
    let request = LineRequest {
        subway_lines: 2,
        subway_min_stops: 5,
        bus_lines: 2,
        bus_min_stops: 5,
    };
    network.synthesize_lines(&request, &mut rng).unwrap();

    for (&(a, b), old) in pairs.iter().zip(before) {
        for algorithm in Algorithm::ALL {
            let path = network.shortest_path(a, b, algorithm).unwrap();
            let cost = network.graph().path_weight(&path).unwrap();
            assert!(cost <= old + 1e-9, "{algorithm} {a} -> {b}: {cost} > {old}");
        }
    }
}

#[test]
fn test_journal_mirrors_synthesis() {
    let mut network = grid_network();
    network.graph_mut().enable_journal();
    let edges_before = network.graph().edge_count();
    let mut rng = StdRng::seed_from_u64(12);
    let request = LineRequest {
        bus_lines: 1,
        bus_min_stops: 3,
        ..LineRequest::default()
    };
    network.synthesize_lines(&request, &mut rng).unwrap();

    let added_edges = network.graph().edge_count() - edges_before;
    let line_len = network.lines()[0].len();
    let events = network.graph_mut().drain_events();
    let vertex_events = events
        .iter()
        .filter(|e| matches!(e, transit_graph::GraphEvent::VertexAdded { .. }))
        .count();

    assert_eq!(vertex_events, line_len);
    assert_eq!(events.len() - vertex_events, added_edges);
}

#[test]
fn test_paths_never_revisit_a_stop() {
    let mut network = grid_network_of(8);
    let base: Vec<StopKey> = network
        .graph()
        .all_vertices()
        .iter()
        .map(|v| v.stop().key())
        .collect();
    let mut rng = StdRng::seed_from_u64(5);
    let request = LineRequest {
        subway_lines: 6,
        subway_min_stops: 5,
        bus_lines: 8,
        bus_min_stops: 4,
    };
    network.synthesize_lines(&request, &mut rng).unwrap();

    for _ in 0..300 {
        let origin = base[rng.random_range(0..base.len())];
        let destination = base[rng.random_range(0..base.len())];
        for algorithm in Algorithm::ALL {
            let path = network.shortest_path(origin, destination, algorithm).unwrap();
            let mut seen = HashSet::new();
            for stop in &path {
                assert!(
                    seen.insert(stop.key()),
                    "{algorithm} {origin} -> {destination} revisits {stop}: {path:?}"
                );
            }
        }
    }
}

#[test]
fn test_each_overlay_stop_has_one_board_and_one_alight() {
    let mut network = grid_network();
    let mut rng = StdRng::seed_from_u64(21);
    let request = LineRequest {
        subway_lines: 4,
        subway_min_stops: 4,
        bus_lines: 5,
        bus_min_stops: 3,
    };
    network.synthesize_lines(&request, &mut rng).unwrap();

    // (boards expected, alights expected) per overlay stop across every line
    let mut expected: HashMap<StopKey, (bool, bool)> = HashMap::new();
    for line in network.lines() {
        for (i, stop) in line.stops().iter().enumerate() {
            let entry = expected.entry(stop.stop.key()).or_default();
            match line.role_of(i) {
                Some(StopRole::Origin) => entry.0 = true,
                Some(StopRole::Terminus) => entry.1 = true,
                Some(StopRole::Intermediate) => *entry = (true, true),
                None => unreachable!(),
            }
        }
    }

    let graph = network.graph();
    for (key, (boards, alights)) in expected {
        let base = graph.vertex_id(StopKey::base(key.id)).unwrap();
        let overlay = graph.vertex_id(key).unwrap();
        let board_edges = graph
            .vertex(base)
            .edges()
            .iter()
            .filter(|e| e.target == overlay)
            .count();
        let alight_edges = graph
            .vertex(overlay)
            .edges()
            .iter()
            .filter(|e| e.target == base)
            .count();

        assert_eq!(board_edges, boards as usize, "board edges at {key}");
        assert_eq!(alight_edges, alights as usize, "alight edges at {key}");
    }
}
