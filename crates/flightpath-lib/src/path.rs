use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};

use serde::Serialize;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::graph::{AirportId, Graph, RouteMetric};

/// Ordered log of edge-relaxation attempts made during a search.
///
/// Only used for diagnostics and visual overlays. A disabled trace records
/// nothing, so callers that do not need it pay no allocation cost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExplorationTrace {
    #[serde(skip)]
    enabled: bool,
    edges: Vec<(AirportId, AirportId)>,
}

impl ExplorationTrace {
    /// A trace that records every relaxation attempt.
    pub fn recording() -> Self {
        Self {
            enabled: true,
            edges: Vec::new(),
        }
    }

    /// A trace that records nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn record(&mut self, from: AirportId, to: AirportId) {
        if self.enabled {
            self.edges.push((from, to));
        }
    }

    /// Relaxation attempts in the order they happened.
    pub fn edges(&self) -> &[(AirportId, AirportId)] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn into_edges(self) -> Vec<(AirportId, AirportId)> {
        self.edges
    }

    /// Drop recorded attempts but keep the enabled flag.
    pub fn clear(&mut self) {
        self.edges.clear();
    }
}

/// Find the shortest route by distance using Dijkstra without tracing.
pub fn find_route(graph: &Graph, start: AirportId, goal: AirportId) -> Option<Vec<AirportId>> {
    find_route_dijkstra(
        graph,
        start,
        goal,
        RouteMetric::Distance,
        &mut ExplorationTrace::disabled(),
    )
}

/// Run Dijkstra's algorithm over available edges, ranking by `metric`.
///
/// Stale frontier entries are skipped lazily and the search stops as soon as
/// the goal is popped. Ties go to the lowest airport index.
pub fn find_route_dijkstra(
    graph: &Graph,
    start: AirportId,
    goal: AirportId,
    metric: RouteMetric,
    trace: &mut ExplorationTrace,
) -> Option<Vec<AirportId>> {
    if !graph.contains(start) || !graph.contains(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut distances = vec![f64::INFINITY; graph.len()];
    let mut parents: Vec<Option<AirportId>> = vec![None; graph.len()];
    let mut queue = BinaryHeap::new();

    distances[start] = 0.0;
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        let current_distance = distances[entry.node];
        if entry.cost.0 > current_distance {
            continue;
        }

        if entry.node == goal {
            break;
        }

        for edge in graph.neighbours(entry.node) {
            let next = edge.target;
            if !graph.is_available(entry.node, next) {
                continue;
            }
            trace.record(entry.node, next);

            let next_cost = current_distance + edge.weight(metric);
            if next_cost < distances[next] {
                distances[next] = next_cost;
                parents[next] = Some(entry.node);
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    debug!(
        "dijkstra {}->{} by {}: total {:.2}",
        graph.code(start),
        graph.code(goal),
        metric,
        distances[goal]
    );
    reconstruct_path(&parents, start, goal)
}

/// Run A* search, ranking by `metric` with a straight-line heuristic over
/// map positions.
///
/// The heuristic is always positional distance. It is admissible and
/// consistent only when `metric` is [`RouteMetric::Distance`] and link
/// distances are at least the straight-line separation of their endpoints.
/// With cost or duration the ranking may be suboptimal.
pub fn find_route_a_star(
    graph: &Graph,
    start: AirportId,
    goal: AirportId,
    metric: RouteMetric,
    trace: &mut ExplorationTrace,
) -> Option<Vec<AirportId>> {
    if !graph.contains(start) || !graph.contains(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let heuristic = |node: AirportId| -> f64 {
        match (graph.airport(node), graph.airport(goal)) {
            (Some(a), Some(b)) => a.position.distance_to(&b.position),
            _ => 0.0,
        }
    };

    let mut g_score = vec![f64::INFINITY; graph.len()];
    let mut f_score = vec![f64::INFINITY; graph.len()];
    let mut parents: Vec<Option<AirportId>> = vec![None; graph.len()];
    let mut open_set: BTreeSet<(FloatOrd, AirportId)> = BTreeSet::new();

    g_score[start] = 0.0;
    f_score[start] = heuristic(start);
    open_set.insert((FloatOrd(f_score[start]), start));

    while let Some((_, current)) = open_set.pop_first() {
        if current == goal {
            break;
        }

        for edge in graph.neighbours(current) {
            let next = edge.target;
            if !graph.is_available(current, next) {
                continue;
            }
            trace.record(current, next);

            let tentative_g = g_score[current] + edge.weight(metric);
            if tentative_g < g_score[next] {
                open_set.remove(&(FloatOrd(f_score[next]), next));
                parents[next] = Some(current);
                g_score[next] = tentative_g;
                f_score[next] = tentative_g + heuristic(next);
                open_set.insert((FloatOrd(f_score[next]), next));
            }
        }
    }

    debug!(
        "a* {}->{} by {}: total {:.2}",
        graph.code(start),
        graph.code(goal),
        metric,
        g_score[goal]
    );
    reconstruct_path(&parents, start, goal)
}

/// Run Bellman-Ford over available edges, ranking by `metric`.
///
/// Relaxes every available edge for `|V| - 1` rounds (stopping early once a
/// round changes nothing) and then checks for a negative cycle.
///
/// # Errors
///
/// Returns [`Error::NegativeCycle`] if a further relaxation is still possible
/// after the final round.
pub fn find_route_bellman_ford(
    graph: &Graph,
    start: AirportId,
    goal: AirportId,
    metric: RouteMetric,
    trace: &mut ExplorationTrace,
) -> Result<Option<Vec<AirportId>>> {
    if !graph.contains(start) || !graph.contains(goal) {
        return Ok(None);
    }

    let n = graph.len();
    let mut distances = vec![f64::INFINITY; n];
    let mut parents: Vec<Option<AirportId>> = vec![None; n];
    distances[start] = 0.0;

    for round in 0..n.saturating_sub(1) {
        let mut changed = false;
        for (from, edge) in graph.edges() {
            let to = edge.target;
            if !graph.is_available(from, to) || distances[from] == f64::INFINITY {
                continue;
            }
            trace.record(from, to);

            let candidate = distances[from] + edge.weight(metric);
            if candidate < distances[to] {
                distances[to] = candidate;
                parents[to] = Some(from);
                changed = true;
            }
        }
        if !changed {
            debug!("bellman-ford converged after {} rounds", round + 1);
            break;
        }
    }

    for (from, edge) in graph.edges() {
        let to = edge.target;
        if !graph.is_available(from, to) || distances[from] == f64::INFINITY {
            continue;
        }
        if distances[from] + edge.weight(metric) < distances[to] {
            error!(
                "graph contains a negative cycle through {}-{}",
                graph.code(from),
                graph.code(to)
            );
            return Err(Error::NegativeCycle { start });
        }
    }

    if start == goal {
        return Ok(Some(vec![start]));
    }
    Ok(reconstruct_path(&parents, start, goal))
}

/// Walk predecessors back from `goal`. Returns `None` when the walk does not
/// end at `start`, meaning the goal was never reached.
fn reconstruct_path(
    parents: &[Option<AirportId>],
    start: AirportId,
    goal: AirportId,
) -> Option<Vec<AirportId>> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start || path.len() > parents.len() {
            break;
        }
        current = parents[node];
    }
    path.reverse();

    match (path.first(), path.last()) {
        (Some(&first), Some(&last)) if first == start && last == goal => Some(path),
        _ => None,
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: AirportId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: AirportId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost, then index.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
