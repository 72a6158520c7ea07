mod common;

use common::diamond;
use flightpath_lib::routing::{reroute, DijkstraPlanner};
use flightpath_lib::{
    plan_route, Error, ExplorationTrace, RouteAlgorithm, RouteDecision, RouteMetric, RouteRequest,
};

#[test]
fn adverse_baseline_segment_forces_detour() {
    let mut graph = diamond();
    graph.set_condition(0, 1, true, "Thunderstorm").unwrap();

    let plan = plan_route(&graph, &RouteRequest::new("AAA", "CCC")).expect("detour exists");
    assert!(plan.rerouted);
    assert_eq!(plan.steps, vec![0, 3, 2]);
    assert_eq!(plan.baseline, vec![0, 1, 2]);
    assert_eq!(plan.avoided.len(), 1);
    assert_eq!(plan.avoided[0].label, "AAA-BBB");
    assert_eq!(plan.avoided[0].reason, "Thunderstorm");
    assert_eq!(plan.totals.distance, 30.0);
}

#[test]
fn caller_graph_is_left_untouched() {
    let mut graph = diamond();
    graph.set_condition(1, 2, true, "Snow").unwrap();
    let before = graph.overlay().clone();

    for algorithm in RouteAlgorithm::ALL {
        let request = RouteRequest::new("AAA", "CCC").with_algorithm(algorithm);
        let plan = plan_route(&graph, &request).expect("detour exists");
        assert_eq!(plan.steps, vec![0, 3, 2], "{algorithm}");
    }
    assert_eq!(graph.overlay(), &before);
    assert!(!graph.is_available(1, 2));
    assert!(graph.is_available(0, 1));
}

#[test]
fn clear_baseline_is_direct() {
    let mut graph = diamond();
    // Adverse, but not on the baseline.
    graph.set_condition(0, 3, true, "Rain").unwrap();

    let planner = DijkstraPlanner::new(RouteMetric::Distance);
    let decision = reroute(&graph, &planner, 0, 2, &mut ExplorationTrace::disabled()).unwrap();
    assert_eq!(
        decision,
        RouteDecision::Direct {
            path: Some(vec![0, 1, 2]),
            baseline: Some(vec![0, 1, 2]),
        }
    );
    assert!(!decision.is_rerouted());
    assert!(decision.avoided().is_empty());
}

#[test]
fn rerouted_without_alternative_reports_no_route() {
    let mut graph = diamond();
    graph.set_condition(0, 1, true, "Tornado").unwrap();
    graph.set_condition(0, 3, true, "Tornado").unwrap();

    let planner = DijkstraPlanner::new(RouteMetric::Distance);
    let decision = reroute(&graph, &planner, 0, 2, &mut ExplorationTrace::disabled()).unwrap();
    assert!(decision.is_rerouted());
    assert_eq!(decision.path(), None);
    assert_eq!(decision.baseline(), Some(&[0, 1, 2][..]));

    let err = plan_route(&graph, &RouteRequest::new("AAA", "CCC")).unwrap_err();
    assert!(matches!(err, Error::RouteNotFound { .. }));
}

#[test]
fn only_baseline_adverse_segments_are_closed() {
    let mut graph = diamond();
    graph.set_condition(0, 1, true, "Squall").unwrap();
    // Reopen it without clearing the label: rerouting still avoids it.
    graph.set_available(0, 1, true).unwrap();

    let plan = plan_route(&graph, &RouteRequest::new("AAA", "CCC")).unwrap();
    assert!(plan.rerouted);
    assert_eq!(plan.steps, vec![0, 3, 2]);
}

#[test]
fn trace_belongs_to_the_final_search() {
    let mut graph = diamond();
    graph.set_condition(0, 1, true, "Ash").unwrap();

    let request = RouteRequest::new("AAA", "CCC").with_trace(true);
    let plan = plan_route(&graph, &request).unwrap();
    assert!(plan.trace.is_enabled());
    assert!(!plan.trace.is_empty());
    assert!(!plan.trace.edges().contains(&(0, 1)));
}

#[test]
fn manually_closed_baseline_segment_is_avoided() {
    let mut graph = diamond();
    graph.set_available(1, 2, false).unwrap();

    let plan = plan_route(&graph, &RouteRequest::new("AAA", "CCC")).unwrap();
    assert!(plan.rerouted);
    assert_eq!(plan.steps, vec![0, 3, 2]);
    assert_eq!(plan.avoided[0].label, "BBB-CCC");
    assert_eq!(plan.avoided[0].reason, flightpath_lib::routing::CLOSED_REASON);
}

#[test]
fn baseline_is_ranked_by_distance_for_cost_requests() {
    let mut graph = diamond();
    graph.set_condition(0, 1, true, "Thunderstorm").unwrap();

    // By cost alone AAA-DDD-CCC is cheapest and clear, but the distance
    // baseline AAA-BBB-CCC crosses the storm.
    for algorithm in RouteAlgorithm::ALL {
        let request = RouteRequest::new("AAA", "CCC")
            .with_algorithm(algorithm)
            .with_metric(RouteMetric::Cost);
        let plan = plan_route(&graph, &request).unwrap();
        assert!(plan.rerouted, "{algorithm}");
        assert_eq!(plan.baseline, vec![0, 1, 2], "{algorithm}");
        assert_eq!(plan.steps, vec![0, 3, 2], "{algorithm}");
        assert_eq!(plan.avoided.len(), 1, "{algorithm}");
        assert_eq!(plan.avoided[0].label, "AAA-BBB");
        assert_eq!(plan.totals.cost, 180.0);
    }
}

#[test]
fn direct_cost_route_differs_from_distance_baseline() {
    let graph = diamond();

    let planner = DijkstraPlanner::new(RouteMetric::Cost);
    let mut trace = ExplorationTrace::recording();
    let decision = reroute(&graph, &planner, 0, 2, &mut trace).unwrap();
    assert!(!decision.is_rerouted());
    assert_eq!(decision.path(), Some(&[0, 3, 2][..]));
    assert_eq!(decision.baseline(), Some(&[0, 1, 2][..]));
    assert!(!trace.is_empty());
}
