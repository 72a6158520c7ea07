//! Common test utilities and fixture graphs.

use flightpath_lib::{AirportId, GeoPoint, Graph, LinkWeights, MapPosition, RouteMetric};

/// Build a graph from `(code, x, y)` airports and `(u, v, distance, cost, duration)` links.
pub fn graph_from(airports: &[(&str, f64, f64)], links: &[(usize, usize, f64, f64, f64)]) -> Graph {
    let mut graph = Graph::new();
    for &(code, x, y) in airports {
        graph
            .add_airport(code, format!("{code} airport"), MapPosition::new(x, y), GeoPoint::default())
            .expect("unique code");
    }
    for &(u, v, distance, cost, duration) in links {
        graph
            .add_link(u, v, LinkWeights::new(distance, cost, duration))
            .expect("valid link");
    }
    graph
}

/// `A-B-C` is the short way round, `A-D-C` the detour.
///
/// ```text
///        D
///       / \
///  A - B - C
/// ```
#[allow(dead_code)]
pub fn diamond() -> Graph {
    graph_from(
        &[
            ("AAA", 0.0, 0.0),
            ("BBB", 10.0, 0.0),
            ("CCC", 20.0, 0.0),
            ("DDD", 10.0, 10.0),
        ],
        &[
            (0, 1, 10.0, 100.0, 60.0),
            (1, 2, 10.0, 100.0, 60.0),
            (0, 3, 15.0, 90.0, 80.0),
            (3, 2, 15.0, 90.0, 80.0),
        ],
    )
}

/// Small deterministic linear congruential generator for fixture graphs.
#[allow(dead_code)]
pub struct Lcg(u64);

#[allow(dead_code)]
impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1))
    }

    pub fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Random graph whose link distances are never shorter than the straight
/// line between endpoints, so the A* heuristic stays admissible.
#[allow(dead_code)]
pub fn random_graph(seed: u64, nodes: usize, density: f64) -> Graph {
    let mut rng = Lcg::new(seed);
    let mut graph = Graph::new();
    for i in 0..nodes {
        let position = MapPosition::new(rng.next_f64() * 100.0, rng.next_f64() * 100.0);
        graph
            .add_airport(format!("N{i:02}"), format!("Node {i}"), position, GeoPoint::default())
            .expect("unique code");
    }
    for u in 0..nodes {
        for v in (u + 1)..nodes {
            if rng.next_f64() >= density {
                continue;
            }
            let straight = graph.airports()[u]
                .position
                .distance_to(&graph.airports()[v].position);
            let weights = LinkWeights::new(
                straight * (1.0 + rng.next_f64()),
                1.0 + rng.next_f64() * 50.0,
                5.0 + rng.next_f64() * 120.0,
            );
            graph.add_link(u, v, weights).expect("valid link");
        }
    }
    graph
}

/// Minimum total weight over every simple path, by exhaustive enumeration.
#[allow(dead_code)]
pub fn brute_force_best(graph: &Graph, start: AirportId, goal: AirportId, metric: RouteMetric) -> Option<f64> {
    fn walk(
        graph: &Graph,
        node: AirportId,
        goal: AirportId,
        metric: RouteMetric,
        visited: &mut Vec<bool>,
        so_far: f64,
        best: &mut Option<f64>,
    ) {
        if node == goal {
            if best.map_or(true, |b| so_far < b) {
                *best = Some(so_far);
            }
            return;
        }
        for edge in graph.neighbours(node) {
            if visited[edge.target] || !graph.is_available(node, edge.target) {
                continue;
            }
            visited[edge.target] = true;
            walk(graph, edge.target, goal, metric, visited, so_far + edge.weight(metric), best);
            visited[edge.target] = false;
        }
    }

    let mut visited = vec![false; graph.len()];
    visited[start] = true;
    let mut best = None;
    walk(graph, start, goal, metric, &mut visited, 0.0, &mut best);
    best
}

/// Compare floats produced by different summation orders.
#[allow(dead_code)]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}
