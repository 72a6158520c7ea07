use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::{GeoPoint, MapPosition};

/// Index of an airport within a [`Graph`]. Stable for the lifetime of the graph.
pub type AirportId = usize;

/// Condition label applied to segments that have no adverse weather.
pub const CLEAR_CONDITION: &str = "Clear";

static OPEN_SEGMENT: Lazy<SegmentState> = Lazy::new(SegmentState::default);

/// Weight dimension used to rank candidate paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteMetric {
    /// Rank by link distance (default).
    #[default]
    Distance,
    /// Rank by ticket cost.
    Cost,
    /// Rank by flight duration in minutes.
    Duration,
}

impl RouteMetric {
    /// All metrics, in the order they are presented to users.
    pub const ALL: [RouteMetric; 3] = [
        RouteMetric::Distance,
        RouteMetric::Cost,
        RouteMetric::Duration,
    ];

    /// Label describing the optimal route under this metric.
    pub fn superlative(self) -> &'static str {
        match self {
            RouteMetric::Distance => "Shortest",
            RouteMetric::Cost => "Cheapest",
            RouteMetric::Duration => "Fastest",
        }
    }
}

impl fmt::Display for RouteMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteMetric::Distance => "distance",
            RouteMetric::Cost => "cost",
            RouteMetric::Duration => "duration",
        };
        f.write_str(value)
    }
}

/// Airport node stored in the routing graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub position: MapPosition,
    pub location: GeoPoint,
}

/// The three independent weights carried by every link.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LinkWeights {
    pub distance: f64,
    pub cost: f64,
    /// Minutes.
    pub duration: f64,
}

impl LinkWeights {
    pub const fn new(distance: f64, cost: f64, duration: f64) -> Self {
        Self {
            distance,
            cost,
            duration,
        }
    }

    /// Weight for the selected metric.
    pub fn get(&self, metric: RouteMetric) -> f64 {
        match metric {
            RouteMetric::Distance => self.distance,
            RouteMetric::Cost => self.cost,
            RouteMetric::Duration => self.duration,
        }
    }

    fn validate(&self, from: AirportId, to: AirportId) -> Result<()> {
        for metric in RouteMetric::ALL {
            let value = self.get(metric);
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidWeight {
                    from,
                    to,
                    metric: match metric {
                        RouteMetric::Distance => "distance",
                        RouteMetric::Cost => "cost",
                        RouteMetric::Duration => "duration",
                    },
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Directed view of a link within the routing graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub target: AirportId,
    pub weights: LinkWeights,
}

impl Edge {
    pub fn weight(&self, metric: RouteMetric) -> f64 {
        self.weights.get(metric)
    }
}

/// Weather annotation attached to a directed segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentCondition {
    pub adverse: bool,
    pub reason: String,
}

impl Default for SegmentCondition {
    fn default() -> Self {
        Self {
            adverse: false,
            reason: CLEAR_CONDITION.to_string(),
        }
    }
}

/// Availability plus condition for one directed segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentState {
    pub available: bool,
    pub condition: SegmentCondition,
}

impl Default for SegmentState {
    fn default() -> Self {
        Self {
            available: true,
            condition: SegmentCondition::default(),
        }
    }
}

/// Adverse segment found along a path, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdverseSegment {
    pub from: AirportId,
    pub to: AirportId,
    /// `FROM-TO` airport codes.
    pub label: String,
    pub reason: String,
}

/// Mutable availability state layered over the immutable topology.
///
/// Directed pairs without an entry are open with a clear condition, so a
/// freshly added airport needs no initialisation. Cloning the overlay is all
/// it takes to probe an alternative without touching the caller's state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionOverlay {
    segments: HashMap<(AirportId, AirportId), SegmentState>,
}

impl ConditionOverlay {
    fn get(&self, from: AirportId, to: AirportId) -> &SegmentState {
        self.segments.get(&(from, to)).unwrap_or(&OPEN_SEGMENT)
    }

    fn entry(&mut self, from: AirportId, to: AirportId) -> &mut SegmentState {
        self.segments.entry((from, to)).or_default()
    }

    fn open_all(&mut self) {
        for state in self.segments.values_mut() {
            state.available = true;
        }
    }

    /// Number of directed segments that are currently closed.
    pub fn closed_count(&self) -> usize {
        self.segments.values().filter(|s| !s.available).count()
    }
}

/// Weighted multigraph of airports with a per-directed-edge availability overlay.
///
/// Airports and links live in shared arenas; cloning a graph copies the
/// overlay and bumps reference counts, so rerouting probes never duplicate
/// the topology.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    airports: Arc<Vec<Airport>>,
    code_index: Arc<HashMap<String, AirportId>>,
    adjacency: Arc<Vec<Vec<Edge>>>,
    overlay: ConditionOverlay,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an airport and return its index.
    ///
    /// Codes must be unique so token resolution is never ambiguous.
    pub fn add_airport(
        &mut self,
        code: impl Into<String>,
        name: impl Into<String>,
        position: MapPosition,
        location: GeoPoint,
    ) -> Result<AirportId> {
        let code = code.into();
        if self.code_index.contains_key(&code) {
            return Err(Error::DuplicateAirport { code });
        }

        let id = self.airports.len();
        Arc::make_mut(&mut self.code_index).insert(code.clone(), id);
        Arc::make_mut(&mut self.airports).push(Airport {
            code,
            name: name.into(),
            position,
            location,
        });
        Arc::make_mut(&mut self.adjacency).push(Vec::new());
        Ok(id)
    }

    /// Insert a bidirectional link with identical weights in both directions.
    pub fn add_link(&mut self, u: AirportId, v: AirportId, weights: LinkWeights) -> Result<()> {
        self.check_index(u)?;
        self.check_index(v)?;
        if u == v {
            return Err(Error::SelfLoop { index: u });
        }
        weights.validate(u, v)?;

        self.insert_link(u, v, weights);
        Ok(())
    }

    /// Insert a link without weight validation so tests can build
    /// pathological graphs (negative weights).
    #[cfg(test)]
    pub(crate) fn add_link_unchecked(&mut self, u: AirportId, v: AirportId, weights: LinkWeights) {
        self.insert_link(u, v, weights);
    }

    fn insert_link(&mut self, u: AirportId, v: AirportId, weights: LinkWeights) {
        let adjacency = Arc::make_mut(&mut self.adjacency);
        adjacency[u].push(Edge { target: v, weights });
        adjacency[v].push(Edge { target: u, weights });
        *self.overlay.entry(u, v) = SegmentState::default();
        *self.overlay.entry(v, u) = SegmentState::default();
    }

    /// Number of airports in the graph.
    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    pub fn contains(&self, id: AirportId) -> bool {
        id < self.airports.len()
    }

    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    pub fn airport(&self, id: AirportId) -> Option<&Airport> {
        self.airports.get(id)
    }

    /// Code of an airport, or `"?"` for an index outside the graph.
    pub fn code(&self, id: AirportId) -> &str {
        self.airport(id).map(|a| a.code.as_str()).unwrap_or("?")
    }

    /// Lookup an airport index by its case-sensitive code.
    pub fn airport_id_by_code(&self, code: &str) -> Option<AirportId> {
        self.code_index.get(code).copied()
    }

    /// Return the outgoing edges for a given airport.
    pub fn neighbours(&self, id: AirportId) -> &[Edge] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over every directed edge as `(source, edge)`.
    pub fn edges(&self) -> impl Iterator<Item = (AirportId, &Edge)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(source, edges)| edges.iter().map(move |edge| (source, edge)))
    }

    /// Number of undirected links.
    pub fn link_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Whether at least one link joins `u` and `v`.
    pub fn has_link(&self, u: AirportId, v: AirportId) -> bool {
        self.neighbours(u).iter().any(|edge| edge.target == v)
    }

    /// Cheapest parallel edge from `u` to `v` under `metric`.
    ///
    /// Searches relax every parallel edge, so the minimum is the one a search
    /// would have used.
    pub fn best_edge(&self, u: AirportId, v: AirportId, metric: RouteMetric) -> Option<&Edge> {
        self.neighbours(u)
            .iter()
            .filter(|edge| edge.target == v)
            .min_by(|a, b| compare_weight(a.weight(metric), b.weight(metric)))
    }

    /// Apply a weather outcome to both directions of a segment.
    ///
    /// Availability becomes `!blocked` and the condition label becomes
    /// `reason`. This is the only way weather mutates the graph.
    ///
    /// # Errors
    ///
    /// [`Error::NoLink`] when no link joins `u` and `v`.
    pub fn set_condition(
        &mut self,
        u: AirportId,
        v: AirportId,
        blocked: bool,
        reason: impl Into<String>,
    ) -> Result<()> {
        self.check_link(u, v)?;
        let condition = SegmentCondition {
            adverse: blocked,
            reason: reason.into(),
        };
        debug!(
            "segment {}-{} set to {} ({})",
            self.code(u),
            self.code(v),
            if blocked { "blocked" } else { "open" },
            condition.reason
        );
        for (from, to) in [(u, v), (v, u)] {
            *self.overlay.entry(from, to) = SegmentState {
                available: !blocked,
                condition: condition.clone(),
            };
        }
        Ok(())
    }

    /// Toggle availability of both directions while keeping the condition label.
    pub fn set_available(&mut self, u: AirportId, v: AirportId, available: bool) -> Result<()> {
        self.check_link(u, v)?;
        self.overlay.entry(u, v).available = available;
        self.overlay.entry(v, u).available = available;
        Ok(())
    }

    /// Whether a link joins `u` and `v` and its `u→v` direction is open.
    pub fn is_available(&self, u: AirportId, v: AirportId) -> bool {
        self.has_link(u, v) && self.overlay.get(u, v).available
    }

    /// Condition label of the `u→v` direction.
    pub fn condition(&self, u: AirportId, v: AirportId) -> &SegmentCondition {
        &self.overlay.get(u, v).condition
    }

    /// Whether any segment of `path` carries an adverse condition.
    pub fn has_adverse_condition(&self, path: &[AirportId]) -> bool {
        path.windows(2)
            .any(|pair| self.condition(pair[0], pair[1]).adverse)
    }

    /// List the adverse segments along `path` with their reasons.
    pub fn segments_with_adverse_condition(&self, path: &[AirportId]) -> Vec<AdverseSegment> {
        path.windows(2)
            .filter_map(|pair| {
                let (from, to) = (pair[0], pair[1]);
                let condition = self.condition(from, to);
                condition.adverse.then(|| AdverseSegment {
                    from,
                    to,
                    label: format!("{}-{}", self.code(from), self.code(to)),
                    reason: condition.reason.clone(),
                })
            })
            .collect()
    }

    /// Shadow copy with every segment open. Condition labels are retained so
    /// callers can still inspect which segments are impaired.
    pub fn fully_open(&self) -> Graph {
        let mut shadow = self.clone();
        shadow.overlay.open_all();
        shadow
    }

    /// Current availability overlay.
    pub fn overlay(&self) -> &ConditionOverlay {
        &self.overlay
    }

    fn check_index(&self, index: AirportId) -> Result<()> {
        if self.contains(index) {
            Ok(())
        } else {
            Err(Error::InvalidAirportIndex {
                index,
                len: self.len(),
            })
        }
    }

    fn check_link(&self, u: AirportId, v: AirportId) -> Result<()> {
        self.check_index(u)?;
        self.check_index(v)?;
        if self.has_link(u, v) {
            Ok(())
        } else {
            Err(Error::NoLink { from: u, to: v })
        }
    }
}

pub(crate) fn compare_weight(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        let mut graph = Graph::new();
        for (code, x) in [("AAA", 0.0), ("BBB", 10.0), ("CCC", 20.0)] {
            graph
                .add_airport(code, code, MapPosition::new(x, 0.0), GeoPoint::default())
                .unwrap();
        }
        graph.add_link(0, 1, LinkWeights::new(10.0, 5.0, 30.0)).unwrap();
        graph.add_link(1, 2, LinkWeights::new(10.0, 5.0, 30.0)).unwrap();
        graph
    }

    #[test]
    fn links_are_inserted_in_both_directions() {
        let graph = triangle();
        assert_eq!(graph.link_count(), 2);
        assert!(graph.is_available(0, 1));
        assert!(graph.is_available(1, 0));
        assert!(!graph.is_available(0, 2));
        assert_eq!(graph.neighbours(1).len(), 2);
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let mut graph = triangle();
        let err = graph
            .add_airport("AAA", "again", MapPosition::default(), GeoPoint::default())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateAirport { .. }));
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn self_loops_and_negative_weights_are_rejected() {
        let mut graph = triangle();
        assert!(matches!(
            graph.add_link(1, 1, LinkWeights::default()),
            Err(Error::SelfLoop { index: 1 })
        ));
        assert!(matches!(
            graph.add_link(0, 2, LinkWeights::new(1.0, -2.0, 1.0)),
            Err(Error::InvalidWeight { metric: "cost", .. })
        ));
        assert!(matches!(
            graph.add_link(0, 9, LinkWeights::default()),
            Err(Error::InvalidAirportIndex { index: 9, len: 3 })
        ));
    }

    #[test]
    fn set_condition_updates_both_directions() {
        let mut graph = triangle();
        graph.set_condition(0, 1, true, "Thunderstorm").unwrap();
        assert!(!graph.is_available(0, 1));
        assert!(!graph.is_available(1, 0));
        assert_eq!(graph.condition(1, 0).reason, "Thunderstorm");
        assert_eq!(graph.condition(0, 1), graph.condition(1, 0));

        graph.set_condition(1, 0, false, CLEAR_CONDITION).unwrap();
        assert!(graph.is_available(0, 1));
        assert!(!graph.condition(0, 1).adverse);
    }

    #[test]
    fn conditions_require_a_link() {
        let mut graph = triangle();
        assert!(matches!(
            graph.set_condition(0, 2, true, "Hail"),
            Err(Error::NoLink { from: 0, to: 2 })
        ));
        assert!(matches!(
            graph.set_available(2, 0, false),
            Err(Error::NoLink { from: 2, to: 0 })
        ));
        assert!(matches!(
            graph.set_available(0, 7, false),
            Err(Error::InvalidAirportIndex { index: 7, len: 3 })
        ));
        assert_eq!(graph.overlay().closed_count(), 0);
        assert!(!graph.condition(0, 2).adverse);
    }

    #[test]
    fn fully_open_keeps_conditions_and_leaves_original_untouched() {
        let mut graph = triangle();
        graph.set_condition(1, 2, true, "Snow").unwrap();

        let shadow = graph.fully_open();
        assert!(shadow.is_available(1, 2));
        assert!(shadow.condition(1, 2).adverse);
        assert!(!graph.is_available(1, 2));
        assert_eq!(graph.overlay().closed_count(), 2);
        assert_eq!(shadow.overlay().closed_count(), 0);
    }

    #[test]
    fn adverse_segments_are_labelled_with_codes() {
        let mut graph = triangle();
        graph.set_condition(1, 2, true, "Rain").unwrap();
        let segments = graph.segments_with_adverse_condition(&[0, 1, 2]);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].label, "BBB-CCC");
        assert_eq!(segments[0].reason, "Rain");
        assert!(graph.has_adverse_condition(&[0, 1, 2]));
        assert!(!graph.has_adverse_condition(&[0, 1]));
    }

    #[test]
    fn best_edge_picks_cheapest_parallel_link() {
        let mut graph = triangle();
        graph.add_link(0, 1, LinkWeights::new(12.0, 1.0, 20.0)).unwrap();
        let by_distance = graph.best_edge(0, 1, RouteMetric::Distance).unwrap();
        assert_eq!(by_distance.weights.distance, 10.0);
        let by_cost = graph.best_edge(0, 1, RouteMetric::Cost).unwrap();
        assert_eq!(by_cost.weights.cost, 1.0);
    }
}
