use thiserror::Error;

use crate::graph::AirportId;

/// Convenient result alias for the flightpath library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a user-supplied token does not resolve to an airport.
    #[error("unknown airport: {token}{}", format_suggestions(.suggestions))]
    UnknownAirport {
        token: String,
        suggestions: Vec<String>,
    },

    /// Raised when an index does not address an airport in the graph.
    #[error("airport index {index} is out of range (graph has {len} airports)")]
    InvalidAirportIndex { index: AirportId, len: usize },

    /// Raised when inserting an airport whose code is already present.
    #[error("duplicate airport code: {code}")]
    DuplicateAirport { code: String },

    /// Raised when a link would connect an airport to itself.
    #[error("link endpoints must differ (got {index} twice)")]
    SelfLoop { index: AirportId },

    /// Raised when a link weight is negative or not a finite number.
    #[error("invalid {metric} weight {value} on link {from}-{to}")]
    InvalidWeight {
        from: AirportId,
        to: AirportId,
        metric: &'static str,
        value: f64,
    },

    /// Raised when no route could be found between two airports.
    #[error("no route found between {start} and {goal}")]
    RouteNotFound { start: String, goal: String },

    /// Raised by Bellman-Ford when the available edges contain a negative cycle.
    #[error("graph contains a negative cycle reachable from {start}")]
    NegativeCycle { start: AirportId },

    /// Raised when a path references a segment that is absent from the graph.
    #[error("path segment {from}->{to} does not exist in the graph")]
    MissingSegment { from: AirportId, to: AirportId },

    /// Raised when a condition is set on a pair of airports with no link.
    #[error("no link joins airports {from} and {to}")]
    NoLink { from: AirportId, to: AirportId },

    /// Raised when a computed route plan lacks any airports.
    #[error("route plan was empty")]
    EmptyRoutePlan,

    /// Raised when a booking date or time cannot be parsed.
    #[error("invalid schedule value '{value}': expected {expected}")]
    InvalidSchedule {
        value: String,
        expected: &'static str,
    },

    /// Raised when a flight cannot be offered or booked as requested.
    #[error("invalid booking: {message}")]
    InvalidBooking { message: String },

    /// Raised when the weather service did not return a usable forecast.
    #[error("weather unavailable: {message}")]
    WeatherUnavailable { message: String },

    /// Raised when no API key was configured for the weather service.
    #[error("weather API key not configured; set {env}")]
    WeatherConfigMissing { env: &'static str },

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for booking ledger I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
