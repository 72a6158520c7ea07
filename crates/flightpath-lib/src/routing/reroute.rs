//! Weather-aware rerouting.
//!
//! The baseline is always the distance-ranked path over a fully open shadow
//! of the graph, found with the requested algorithm. When it crosses an
//! adverse or closed segment, those segments are closed on a working copy and
//! the search is repeated with the requested metric. Neither search touches
//! the caller's availability state.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::graph::{AdverseSegment, AirportId, Graph, RouteMetric};
use crate::path::ExplorationTrace;

use super::planner::planner_for;
use super::RoutePlanner;

/// Reason recorded for segments closed without an adverse condition.
pub const CLOSED_REASON: &str = "Closed";

/// Outcome of the rerouting policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RouteDecision {
    /// The baseline crosses no impaired segment (or does not exist).
    /// `path` is ranked by the planner's metric and equals `baseline` when
    /// that metric is distance.
    Direct {
        path: Option<Vec<AirportId>>,
        baseline: Option<Vec<AirportId>>,
    },
    /// The baseline crossed impaired segments, so they were closed and the
    /// search repeated. `path` is `None` when no alternative exists.
    Rerouted {
        path: Option<Vec<AirportId>>,
        baseline: Vec<AirportId>,
        avoided: Vec<AdverseSegment>,
    },
}

impl RouteDecision {
    /// Path to fly, if any.
    pub fn path(&self) -> Option<&[AirportId]> {
        match self {
            RouteDecision::Direct { path, .. } | RouteDecision::Rerouted { path, .. } => {
                path.as_deref()
            }
        }
    }

    pub fn is_rerouted(&self) -> bool {
        matches!(self, RouteDecision::Rerouted { .. })
    }

    /// Shortest path by distance with every segment open.
    pub fn baseline(&self) -> Option<&[AirportId]> {
        match self {
            RouteDecision::Direct { baseline, .. } => baseline.as_deref(),
            RouteDecision::Rerouted { baseline, .. } => Some(baseline),
        }
    }

    /// Impaired segments that forced the reroute.
    pub fn avoided(&self) -> &[AdverseSegment] {
        match self {
            RouteDecision::Direct { .. } => &[],
            RouteDecision::Rerouted { avoided, .. } => avoided,
        }
    }
}

/// Apply the rerouting policy for `start`→`goal` using `planner`.
///
/// The baseline is searched by distance with `planner`'s algorithm; the path
/// returned is ranked by `planner`'s metric. `trace` ends up holding the
/// attempts of whichever search produced the returned path.
pub fn reroute(
    graph: &Graph,
    planner: &dyn RoutePlanner,
    start: AirportId,
    goal: AirportId,
    trace: &mut ExplorationTrace,
) -> Result<RouteDecision> {
    let by_distance = planner.metric() == RouteMetric::Distance;
    let baseline = baseline_path(graph, planner, start, goal, trace)?;
    let Some(baseline) = baseline else {
        return Ok(RouteDecision::Direct {
            path: None,
            baseline: None,
        });
    };

    let avoided = impaired_segments(graph, &baseline);
    if avoided.is_empty() {
        debug!(
            "baseline {}->{} crosses no impaired segment",
            graph.code(start),
            graph.code(goal)
        );
        let path = if by_distance {
            Some(baseline.clone())
        } else {
            trace.clear();
            planner.find_path(graph, start, goal, trace)?
        };
        return Ok(RouteDecision::Direct {
            path,
            baseline: Some(baseline),
        });
    }

    let mut working = graph.clone();
    for segment in &avoided {
        working.set_available(segment.from, segment.to, false)?;
    }
    trace.clear();
    let path = planner.find_path(&working, start, goal, trace)?;

    info!(
        "rerouted {}->{} around {}: {}",
        graph.code(start),
        graph.code(goal),
        avoided
            .iter()
            .map(|segment| format!("{} ({})", segment.label, segment.reason))
            .collect::<Vec<_>>()
            .join(", "),
        if path.is_some() { "alternative found" } else { "no alternative" }
    );

    Ok(RouteDecision::Rerouted {
        path,
        baseline,
        avoided,
    })
}

/// Distance-ranked path over a fully open shadow of `graph`, found with the
/// algorithm of `planner`.
pub(crate) fn baseline_path(
    graph: &Graph,
    planner: &dyn RoutePlanner,
    start: AirportId,
    goal: AirportId,
    trace: &mut ExplorationTrace,
) -> Result<Option<Vec<AirportId>>> {
    let shadow = graph.fully_open();
    if planner.metric() == RouteMetric::Distance {
        return planner.find_path(&shadow, start, goal, trace);
    }
    planner_for(planner.algorithm(), RouteMetric::Distance).find_path(&shadow, start, goal, trace)
}

/// Adverse segments along `path`, followed by segments that are closed in
/// `graph` without carrying an adverse condition.
fn impaired_segments(graph: &Graph, path: &[AirportId]) -> Vec<AdverseSegment> {
    let mut impaired = graph.segments_with_adverse_condition(path);
    for pair in path.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        if graph.is_available(from, to) || graph.condition(from, to).adverse {
            continue;
        }
        impaired.push(AdverseSegment {
            from,
            to,
            label: format!("{}-{}", graph.code(from), graph.code(to)),
            reason: CLOSED_REASON.to_string(),
        });
    }
    impaired
}
