use std::fmt::Write;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::{AirportId, Graph, RouteMetric};
use crate::routing::{RouteAlgorithm, RoutePlan};
use crate::totals::RouteTotals;
use crate::weather::SegmentWeather;

/// Presentation style for turning a [`RouteSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    PlainText,
    RichText,
}

/// Endpoint or intermediate stop within a planned route.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RouteStep {
    pub index: usize,
    pub id: AirportId,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RouteStep {
    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unknown>")
    }
}

/// Adverse segment that forced a detour.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AvoidedSegment {
    pub segment: String,
    pub reason: String,
}

/// Structured representation of a planned route that higher-level consumers can serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub algorithm: RouteAlgorithm,
    pub metric: RouteMetric,
    pub hops: usize,
    pub start: RouteStep,
    pub goal: RouteStep,
    pub steps: Vec<RouteStep>,
    pub totals: RouteTotals,
    pub rerouted: bool,
    /// Codes of the open-network path, present only when rerouted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub baseline: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub avoided: Vec<AvoidedSegment>,
    /// Number of relaxation attempts in the final search, when traced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explored: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub explored_edges: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub weather: Vec<SegmentWeather>,
}

impl RouteSummary {
    /// Convert a [`RoutePlan`] into a structured summary with resolved airport codes.
    pub fn from_plan(graph: &Graph, plan: &RoutePlan) -> Result<Self> {
        let steps = plan
            .steps
            .iter()
            .enumerate()
            .map(|(index, &id)| RouteStep {
                index,
                id,
                code: graph.code(id).to_string(),
                name: graph.airport(id).map(|airport| airport.name.clone()),
            })
            .collect::<Vec<_>>();

        let (Some(start), Some(goal)) = (steps.first().cloned(), steps.last().cloned()) else {
            return Err(Error::EmptyRoutePlan);
        };

        let baseline = if plan.rerouted {
            plan.baseline
                .iter()
                .map(|&id| graph.code(id).to_string())
                .collect()
        } else {
            Vec::new()
        };

        let trace = plan.trace.is_enabled().then_some(&plan.trace);

        Ok(Self {
            algorithm: plan.algorithm,
            metric: plan.metric,
            hops: plan.hop_count(),
            start,
            goal,
            steps,
            totals: plan.totals,
            rerouted: plan.rerouted,
            baseline,
            avoided: plan
                .avoided
                .iter()
                .map(|segment| AvoidedSegment {
                    segment: segment.label.clone(),
                    reason: segment.reason.clone(),
                })
                .collect(),
            explored: trace.map(|trace| trace.len()),
            explored_edges: trace
                .map(|trace| {
                    trace
                        .edges()
                        .iter()
                        .map(|&(from, to)| (graph.code(from).to_string(), graph.code(to).to_string()))
                        .collect()
                })
                .unwrap_or_default(),
            weather: Vec::new(),
        })
    }

    /// Attach the per-segment weather used to plan this route.
    pub fn with_weather(mut self, weather: Vec<SegmentWeather>) -> Self {
        self.weather = weather;
        self
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, mode: RouteRenderMode) -> String {
        match mode {
            RouteRenderMode::PlainText => self.render_plain(),
            RouteRenderMode::RichText => self.render_rich(),
        }
    }

    fn path_codes(&self) -> String {
        self.steps
            .iter()
            .map(|step| step.code.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "{} route: {} -> {} ({} hops, algorithm: {}, metric: {})",
            self.metric.superlative(),
            self.start.code,
            self.goal.code,
            self.hops,
            self.algorithm,
            self.metric
        );
        for step in &self.steps {
            let _ = writeln!(
                buffer,
                "{:>3}: {:<4} {}",
                step.index,
                step.code,
                step.display_name()
            );
        }
        let _ = writeln!(
            buffer,
            "Totals: distance {:.2}, cost {:.2}, duration {:.0} min",
            self.totals.distance, self.totals.cost, self.totals.duration
        );

        if self.rerouted {
            let _ = writeln!(buffer, "Rerouted due to adverse weather.");
            let _ = writeln!(buffer, "Baseline: {}", self.baseline.join(" -> "));
            for avoided in &self.avoided {
                let _ = writeln!(buffer, "Avoided: {} ({})", avoided.segment, avoided.reason);
            }
        }

        if !self.weather.is_empty() {
            let _ = writeln!(buffer, "Weather along baseline:");
            for row in &self.weather {
                let _ = writeln!(
                    buffer,
                    "  {:<8} {} dep {:<12} arr {:<12} {}",
                    row.label,
                    row.departure.format("%d/%m/%Y %H:%M"),
                    row.departure_weather.main,
                    row.arrival_weather.main,
                    if row.blocked { "BLOCKED" } else { "open" }
                );
            }
        }

        if let Some(explored) = self.explored {
            let _ = writeln!(buffer, "Explored edges: {explored}");
        }

        buffer
    }

    fn render_rich(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "**{} route** _{} → {}_ ({} hops, algorithm: `{}`, metric: `{}`)",
            self.metric.superlative(),
            self.start.code,
            self.goal.code,
            self.hops,
            self.algorithm,
            self.metric
        );
        for step in &self.steps {
            let _ = writeln!(
                buffer,
                "* {:>2}. **{}** {}",
                step.index,
                step.code,
                step.display_name()
            );
        }
        let _ = writeln!(
            buffer,
            "\n| distance | cost | duration |\n|---:|---:|---:|\n| {:.2} | {:.2} | {:.0} min |",
            self.totals.distance, self.totals.cost, self.totals.duration
        );

        if self.rerouted {
            let _ = writeln!(
                buffer,
                "\n> **Rerouted** around adverse weather. Baseline was `{}`.",
                self.baseline.join(" → ")
            );
            for avoided in &self.avoided {
                let _ = writeln!(buffer, "> * `{}`: {}", avoided.segment, avoided.reason);
            }
        }

        if !self.weather.is_empty() {
            let _ = writeln!(
                buffer,
                "\n| segment | departs | dep. weather | arr. weather | status |\n|---|---|---|---|---|"
            );
            for row in &self.weather {
                let _ = writeln!(
                    buffer,
                    "| {} | {} | {} | {} | {} |",
                    row.label,
                    row.departure.format("%d/%m/%Y %H:%M"),
                    row.departure_weather.main,
                    row.arrival_weather.main,
                    if row.blocked { "blocked" } else { "open" }
                );
            }
        }

        if let Some(explored) = self.explored {
            let _ = writeln!(buffer, "\n_{explored} edges explored; path {}_", self.path_codes());
        }

        buffer
    }
}
