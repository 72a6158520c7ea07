//! Route planning module for flight routing.
//!
//! This module provides:
//! - [`RouteAlgorithm`] - Supported search algorithms (Dijkstra, A*, Bellman-Ford)
//! - [`RouteRequest`] - High-level route planning request
//! - [`RoutePlan`] - Planned route result, including rerouting details
//! - [`plan_route`] - Main entry point for computing routes
//! - [`forecast_baseline`] / [`plan_route_with_weather`] - Forecast the baseline, then plan around it
//! - [`suggest_routes`] - Shortest / cheapest / fastest suggestion set
//!
//! # Strategy Pattern
//!
//! Each algorithm is encapsulated in its own [`RoutePlanner`] implementation,
//! so new algorithms can be added without touching the orchestration logic.
//!
//! # Example
//!
//! ```
//! use flightpath_lib::{build_simulation_graph, plan_route, RouteRequest};
//!
//! let graph = build_simulation_graph()?;
//! let plan = plan_route(&graph, &RouteRequest::new("SEA", "LAX"))?;
//! assert_eq!(plan.steps.first(), Some(&0));
//! # Ok::<(), flightpath_lib::Error>(())
//! ```

mod planner;
mod reroute;

pub use planner::{
    select_planner, AStarPlanner, BellmanFordPlanner, DijkstraPlanner, RoutePlanner,
};
pub use reroute::{reroute, RouteDecision, CLOSED_REASON};

use reroute::baseline_path;

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{AdverseSegment, AirportId, Graph, RouteMetric};
use crate::path::ExplorationTrace;
use crate::resolve::resolve_airport;
use crate::totals::{aggregate_totals, RouteTotals};
use crate::weather::{apply_route_weather, SegmentWeather, WeatherSource};

/// Supported routing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteAlgorithm {
    /// Dijkstra's algorithm (default).
    #[default]
    Dijkstra,
    /// A* search guided by map distance.
    #[serde(rename = "a-star")]
    AStar,
    /// Bellman-Ford with negative-cycle detection.
    #[serde(rename = "bellman-ford")]
    BellmanFord,
}

impl RouteAlgorithm {
    pub const ALL: [RouteAlgorithm; 3] = [
        RouteAlgorithm::Dijkstra,
        RouteAlgorithm::AStar,
        RouteAlgorithm::BellmanFord,
    ];
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteAlgorithm::Dijkstra => "dijkstra",
            RouteAlgorithm::AStar => "a-star",
            RouteAlgorithm::BellmanFord => "bellman-ford",
        };
        f.write_str(value)
    }
}

/// High-level route planning request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    /// Airport code or numeric index.
    pub start: String,
    /// Airport code or numeric index.
    pub goal: String,
    pub algorithm: RouteAlgorithm,
    pub metric: RouteMetric,
    /// Record every relaxation attempt of the final search.
    pub record_trace: bool,
}

impl RouteRequest {
    /// Dijkstra by distance, without a trace.
    pub fn new(start: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            goal: goal.into(),
            algorithm: RouteAlgorithm::default(),
            metric: RouteMetric::default(),
            record_trace: false,
        }
    }

    pub fn with_algorithm(mut self, algorithm: RouteAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_metric(mut self, metric: RouteMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_trace(mut self, record_trace: bool) -> Self {
        self.record_trace = record_trace;
        self
    }

    fn not_found(&self) -> Error {
        Error::RouteNotFound {
            start: self.start.clone(),
            goal: self.goal.clone(),
        }
    }
}

/// Planned route returned by the library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub algorithm: RouteAlgorithm,
    pub metric: RouteMetric,
    pub start: AirportId,
    pub goal: AirportId,
    pub steps: Vec<AirportId>,
    pub totals: RouteTotals,
    /// Whether adverse or closed segments forced a detour.
    pub rerouted: bool,
    /// Shortest path by distance with every segment open.
    pub baseline: Vec<AirportId>,
    /// Impaired segments on the baseline that were avoided.
    pub avoided: Vec<AdverseSegment>,
    pub trace: ExplorationTrace,
}

impl RoutePlan {
    /// Number of hops in the route.
    pub fn hop_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// Compute a route using the requested algorithm and metric.
///
/// This is the main entry point for route planning. It:
/// 1. Resolves airport tokens to indices
/// 2. Selects the planner strategy
/// 3. Applies the rerouting policy
/// 4. Aggregates totals over the chosen path
///
/// The graph is never mutated.
///
/// # Errors
///
/// [`Error::UnknownAirport`] for unresolvable tokens, [`Error::RouteNotFound`]
/// when no path exists over available segments, and any error raised by the
/// search itself (for example [`Error::NegativeCycle`]).
pub fn plan_route(graph: &Graph, request: &RouteRequest) -> Result<RoutePlan> {
    let start = resolve_airport(graph, &request.start)?;
    let goal = resolve_airport(graph, &request.goal)?;

    let planner = select_planner(request);
    let mut trace = if request.record_trace {
        ExplorationTrace::recording()
    } else {
        ExplorationTrace::disabled()
    };

    let decision = reroute(graph, planner.as_ref(), start, goal, &mut trace)?;
    let steps = decision
        .path()
        .map(<[AirportId]>::to_vec)
        .ok_or_else(|| request.not_found())?;
    let totals = aggregate_totals(graph, &steps, request.metric)?;

    debug!(
        "planned {}->{} via {} by {}: {} hops",
        graph.code(start),
        graph.code(goal),
        request.algorithm,
        request.metric,
        steps.len().saturating_sub(1)
    );

    Ok(RoutePlan {
        algorithm: request.algorithm,
        metric: request.metric,
        start,
        goal,
        rerouted: decision.is_rerouted(),
        baseline: decision.baseline().map(<[AirportId]>::to_vec).unwrap_or_default(),
        avoided: decision.avoided().to_vec(),
        steps,
        totals,
        trace,
    })
}

/// Forecast the weather along the open-network baseline and record it on
/// `graph`.
///
/// The baseline is ranked by distance whatever the request's metric, so the
/// segments forecast are the ones [`plan_route`] checks for impairments.
///
/// Segments on the baseline are reset to whatever the forecast says, so
/// closures that must survive the forecast are applied afterwards.
pub fn forecast_baseline(
    graph: &mut Graph,
    request: &RouteRequest,
    source: &dyn WeatherSource,
    departure: NaiveDateTime,
) -> Result<Vec<SegmentWeather>> {
    let start = resolve_airport(graph, &request.start)?;
    let goal = resolve_airport(graph, &request.goal)?;

    let planner = select_planner(request);
    let baseline = baseline_path(
        graph,
        planner.as_ref(),
        start,
        goal,
        &mut ExplorationTrace::disabled(),
    )?
    .ok_or_else(|| request.not_found())?;

    apply_route_weather(graph, &baseline, source, departure)
}

/// [`forecast_baseline`] followed by [`plan_route`].
///
/// Returns the plan together with the per-segment weather of the baseline.
pub fn plan_route_with_weather(
    graph: &mut Graph,
    request: &RouteRequest,
    source: &dyn WeatherSource,
    departure: NaiveDateTime,
) -> Result<(RoutePlan, Vec<SegmentWeather>)> {
    let weather = forecast_baseline(graph, request, source, departure)?;
    let plan = plan_route(graph, request)?;
    Ok((plan, weather))
}

/// One entry of the suggestion set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSuggestion {
    pub metric: RouteMetric,
    /// `Shortest`, `Cheapest`, or `Fastest`.
    pub label: &'static str,
    /// `None` when the goal is unreachable.
    pub plan: Option<RoutePlan>,
}

/// Plan one route per metric between the same endpoints.
///
/// Unreachable goals yield `None` entries rather than an error; unknown
/// airports and search failures still propagate.
pub fn suggest_routes(
    graph: &Graph,
    start: &str,
    goal: &str,
    algorithm: RouteAlgorithm,
) -> Result<Vec<RouteSuggestion>> {
    let mut suggestions = Vec::with_capacity(RouteMetric::ALL.len());
    for metric in RouteMetric::ALL {
        let request = RouteRequest::new(start, goal)
            .with_algorithm(algorithm)
            .with_metric(metric);
        let plan = match plan_route(graph, &request) {
            Ok(plan) => Some(plan),
            Err(Error::RouteNotFound { .. }) => None,
            Err(err) => return Err(err),
        };
        suggestions.push(RouteSuggestion {
            metric,
            label: metric.superlative(),
            plan,
        });
    }
    Ok(suggestions)
}
