mod common;

use common::{approx_eq, brute_force_best, diamond};
use flightpath_lib::{
    build_booking_graph, build_simulation_graph, plan_route, suggest_routes, Error,
    RouteAlgorithm, RouteMetric, RouteRequest,
};

#[test]
fn dijkstra_route_plan_succeeds() {
    let graph = build_simulation_graph().expect("catalog builds");
    let request = RouteRequest::new("SEA", "MIA");
    let plan = plan_route(&graph, &request).expect("route exists");

    assert_eq!(plan.algorithm, RouteAlgorithm::Dijkstra);
    assert_eq!(plan.start, graph.airport_id_by_code("SEA").unwrap());
    assert_eq!(plan.goal, graph.airport_id_by_code("MIA").unwrap());
    assert!(plan.hop_count() >= 2);
    assert!(!plan.rerouted);
    assert_eq!(plan.baseline, plan.steps);
}

#[test]
fn every_algorithm_reaches_every_simulation_airport() {
    let graph = build_simulation_graph().expect("catalog builds");
    for algorithm in RouteAlgorithm::ALL {
        for goal in 1..graph.len() {
            let request = RouteRequest::new("0", goal.to_string()).with_algorithm(algorithm);
            let plan = plan_route(&graph, &request)
                .unwrap_or_else(|err| panic!("{algorithm} to {goal}: {err}"));
            assert_eq!(plan.steps.last(), Some(&goal));
        }
    }
}

#[test]
fn catalog_routes_are_optimal_per_metric() {
    let graph = build_booking_graph().expect("catalog builds");
    let sea = graph.airport_id_by_code("SEA").unwrap();
    let dfw = graph.airport_id_by_code("DFW").unwrap();
    for metric in RouteMetric::ALL {
        let plan = plan_route(&graph, &RouteRequest::new("SEA", "DFW").with_metric(metric)).unwrap();
        let best = brute_force_best(&graph, sea, dfw, metric).unwrap();
        assert!(approx_eq(plan.totals.get(metric), best), "{metric}");
    }
}

#[test]
fn unknown_airport_is_reported_with_suggestions() {
    let graph = build_simulation_graph().expect("catalog builds");
    let error = plan_route(&graph, &RouteRequest::new("SEX", "MIA")).expect_err("unknown start");
    assert!(format!("{error}").contains("Did you mean 'SEA'"), "{error}");
}

#[test]
fn disconnected_booking_airport_has_no_route() {
    // AUG is only linked to BOS; close that link both ways.
    let mut graph = build_booking_graph().expect("catalog builds");
    let bos = graph.airport_id_by_code("BOS").unwrap();
    let aug = graph.airport_id_by_code("AUG").unwrap();
    graph.set_available(bos, aug, false).unwrap();

    let error = plan_route(&graph, &RouteRequest::new("SEA", "AUG")).expect_err("unreachable");
    assert!(matches!(error, Error::RouteNotFound { .. }));
    assert!(format!("{error}").contains("no route found"));
}

#[test]
fn suggestions_cover_every_metric() {
    let graph = diamond();
    let suggestions = suggest_routes(&graph, "AAA", "CCC", RouteAlgorithm::Dijkstra).unwrap();
    let labels: Vec<_> = suggestions.iter().map(|s| s.label).collect();
    assert_eq!(labels, ["Shortest", "Cheapest", "Fastest"]);

    let steps: Vec<_> = suggestions
        .iter()
        .map(|s| s.plan.as_ref().map(|plan| plan.steps.clone()))
        .collect();
    assert_eq!(
        steps,
        [Some(vec![0, 1, 2]), Some(vec![0, 3, 2]), Some(vec![0, 1, 2])]
    );
}

#[test]
fn suggestions_mark_unreachable_goals() {
    let mut graph = diamond();
    graph.set_available(1, 2, false).unwrap();
    graph.set_available(3, 2, false).unwrap();
    let suggestions = suggest_routes(&graph, "AAA", "CCC", RouteAlgorithm::AStar).unwrap();
    assert!(suggestions.iter().all(|s| s.plan.is_none()));

    assert!(matches!(
        suggest_routes(&graph, "AAA", "QQQ", RouteAlgorithm::AStar),
        Err(Error::UnknownAirport { .. })
    ));
}

#[test]
fn plan_serialises_with_stable_names() {
    let graph = diamond();
    let request = RouteRequest::new("AAA", "CCC")
        .with_algorithm(RouteAlgorithm::BellmanFord)
        .with_metric(RouteMetric::Duration);
    let plan = plan_route(&graph, &request).unwrap();
    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["algorithm"], "bellman-ford");
    assert_eq!(json["metric"], "duration");
    assert_eq!(json["totals"]["duration"], 120.0);
}
