use criterion::{criterion_group, criterion_main, Criterion};
use flightpath_lib::{
    build_simulation_graph, plan_route, Graph, RouteAlgorithm, RouteMetric, RouteRequest,
};
use once_cell::sync::Lazy;
use std::hint::black_box;

static GRAPH: Lazy<Graph> = Lazy::new(|| build_simulation_graph().expect("catalog builds"));
static STORMY_GRAPH: Lazy<Graph> = Lazy::new(|| {
    let mut graph = build_simulation_graph().expect("catalog builds");
    let sea = graph.airport_id_by_code("SEA").expect("SEA present");
    let sfo = graph.airport_id_by_code("SFO").expect("SFO present");
    graph
        .set_condition(sea, sfo, true, "Thunderstorm")
        .expect("valid segment");
    graph
});
static DIJKSTRA_REQUEST: Lazy<RouteRequest> = Lazy::new(|| RouteRequest::new("SEA", "MIA"));
static ASTAR_REQUEST: Lazy<RouteRequest> =
    Lazy::new(|| RouteRequest::new("SEA", "MIA").with_algorithm(RouteAlgorithm::AStar));
static BELLMAN_FORD_REQUEST: Lazy<RouteRequest> = Lazy::new(|| {
    RouteRequest::new("SEA", "MIA")
        .with_algorithm(RouteAlgorithm::BellmanFord)
        .with_metric(RouteMetric::Cost)
});
static REROUTE_REQUEST: Lazy<RouteRequest> = Lazy::new(|| RouteRequest::new("SEA", "SFO"));

fn benchmark_pathfinding(c: &mut Criterion) {
    let graph = &*GRAPH;

    c.bench_function("dijkstra_sea_mia", |b| {
        let request = &*DIJKSTRA_REQUEST;
        b.iter(|| {
            let plan = plan_route(graph, request).expect("route exists");
            black_box(plan.hop_count())
        });
    });

    c.bench_function("astar_sea_mia", |b| {
        let request = &*ASTAR_REQUEST;
        b.iter(|| {
            let plan = plan_route(graph, request).expect("route exists");
            black_box(plan.steps.len())
        });
    });

    c.bench_function("bellman_ford_cost_sea_mia", |b| {
        let request = &*BELLMAN_FORD_REQUEST;
        b.iter(|| {
            let plan = plan_route(graph, request).expect("route exists");
            black_box(plan.totals.cost)
        });
    });

    c.bench_function("reroute_sea_sfo", |b| {
        let stormy = &*STORMY_GRAPH;
        let request = &*REROUTE_REQUEST;
        b.iter(|| {
            let plan = plan_route(stormy, request).expect("route exists");
            black_box(plan.rerouted)
        });
    });
}

criterion_group!(benches, benchmark_pathfinding);
criterion_main!(benches);
