use serde::Serialize;
use tracing::error;

use crate::error::{Error, Result};
use crate::graph::{AirportId, Graph, RouteMetric};

/// Aggregate distance, cost, and duration along a path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RouteTotals {
    pub distance: f64,
    pub cost: f64,
    /// Minutes.
    pub duration: f64,
}

impl RouteTotals {
    /// Total for a single metric.
    pub fn get(&self, metric: RouteMetric) -> f64 {
        match metric {
            RouteMetric::Distance => self.distance,
            RouteMetric::Cost => self.cost,
            RouteMetric::Duration => self.duration,
        }
    }
}

/// Sum the link weights along `path`.
///
/// Each hop uses the parallel link that ranks best under `metric`, which is
/// the link a search over the same graph would have taken. Paths with fewer
/// than two airports have zero totals.
///
/// # Errors
///
/// Returns [`Error::MissingSegment`] when two consecutive airports are not
/// linked. A path produced by a search over the same graph never triggers
/// this, so it signals an internal consistency fault.
pub fn aggregate_totals(graph: &Graph, path: &[AirportId], metric: RouteMetric) -> Result<RouteTotals> {
    let mut totals = RouteTotals::default();
    for pair in path.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let Some(edge) = graph.best_edge(from, to, metric) else {
            error!(
                "path segment {}-{} missing from graph",
                graph.code(from),
                graph.code(to)
            );
            return Err(Error::MissingSegment { from, to });
        };
        totals.distance += edge.weights.distance;
        totals.cost += edge.weights.cost;
        totals.duration += edge.weights.duration;
    }
    Ok(totals)
}
