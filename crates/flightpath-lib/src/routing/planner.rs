//! Route planning strategies implementing the Strategy pattern.
//!
//! This module provides the `RoutePlanner` trait and one implementation per
//! search algorithm (Dijkstra, A*, Bellman-Ford). The strategy pattern allows
//! adding new algorithms without modifying the `plan_route` orchestrator.

use tracing::debug;

use crate::error::Result;
use crate::graph::{AirportId, Graph, RouteMetric};
use crate::path::{find_route_a_star, find_route_bellman_ford, find_route_dijkstra, ExplorationTrace};

use super::{RouteAlgorithm, RouteRequest};

/// Trait for route planning strategies.
///
/// Each implementation encapsulates a specific pathfinding algorithm and the
/// metric it ranks by.
pub trait RoutePlanner: Send + Sync {
    /// The algorithm identifier for this planner.
    fn algorithm(&self) -> RouteAlgorithm;

    /// The weight dimension used to rank candidate paths.
    fn metric(&self) -> RouteMetric;

    /// Execute the search over the available edges of `graph`.
    ///
    /// Returns `Ok(None)` when the goal is unreachable.
    fn find_path(
        &self,
        graph: &Graph,
        start: AirportId,
        goal: AirportId,
        trace: &mut ExplorationTrace,
    ) -> Result<Option<Vec<AirportId>>>;

    /// Whether the planner is guaranteed to return an optimal path for its metric.
    fn is_exact(&self) -> bool {
        true
    }
}

/// Dijkstra's algorithm planner.
#[derive(Debug, Clone, Default)]
pub struct DijkstraPlanner {
    metric: RouteMetric,
}

impl DijkstraPlanner {
    pub fn new(metric: RouteMetric) -> Self {
        Self { metric }
    }
}

impl RoutePlanner for DijkstraPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::Dijkstra
    }

    fn metric(&self) -> RouteMetric {
        self.metric
    }

    fn find_path(
        &self,
        graph: &Graph,
        start: AirportId,
        goal: AirportId,
        trace: &mut ExplorationTrace,
    ) -> Result<Option<Vec<AirportId>>> {
        Ok(find_route_dijkstra(graph, start, goal, self.metric, trace))
    }
}

/// A* planner guided by straight-line distance between map positions.
///
/// The heuristic only matches the distance metric; ranking by cost or
/// duration still works but may return a suboptimal path.
#[derive(Debug, Clone, Default)]
pub struct AStarPlanner {
    metric: RouteMetric,
}

impl AStarPlanner {
    pub fn new(metric: RouteMetric) -> Self {
        Self { metric }
    }
}

impl RoutePlanner for AStarPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::AStar
    }

    fn metric(&self) -> RouteMetric {
        self.metric
    }

    fn find_path(
        &self,
        graph: &Graph,
        start: AirportId,
        goal: AirportId,
        trace: &mut ExplorationTrace,
    ) -> Result<Option<Vec<AirportId>>> {
        if self.metric != RouteMetric::Distance {
            debug!(
                "a* ranking by {} uses a distance heuristic; result may be suboptimal",
                self.metric
            );
        }
        Ok(find_route_a_star(graph, start, goal, self.metric, trace))
    }

    fn is_exact(&self) -> bool {
        self.metric == RouteMetric::Distance
    }
}

/// Bellman-Ford planner. Slower, but reports negative cycles instead of
/// silently returning a wrong answer.
#[derive(Debug, Clone, Default)]
pub struct BellmanFordPlanner {
    metric: RouteMetric,
}

impl BellmanFordPlanner {
    pub fn new(metric: RouteMetric) -> Self {
        Self { metric }
    }
}

impl RoutePlanner for BellmanFordPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::BellmanFord
    }

    fn metric(&self) -> RouteMetric {
        self.metric
    }

    fn find_path(
        &self,
        graph: &Graph,
        start: AirportId,
        goal: AirportId,
        trace: &mut ExplorationTrace,
    ) -> Result<Option<Vec<AirportId>>> {
        find_route_bellman_ford(graph, start, goal, self.metric, trace)
    }
}

/// Select the appropriate planner for a given request.
pub fn select_planner(request: &RouteRequest) -> Box<dyn RoutePlanner> {
    planner_for(request.algorithm, request.metric)
}

pub(crate) fn planner_for(algorithm: RouteAlgorithm, metric: RouteMetric) -> Box<dyn RoutePlanner> {
    match algorithm {
        RouteAlgorithm::Dijkstra => Box::new(DijkstraPlanner::new(metric)),
        RouteAlgorithm::AStar => Box::new(AStarPlanner::new(metric)),
        RouteAlgorithm::BellmanFord => Box::new(BellmanFordPlanner::new(metric)),
    }
}
