//! Flightpath library entry points.
//!
//! This crate models a small airline network as a weighted multigraph with a
//! per-segment availability overlay, runs Dijkstra, A*, and Bellman-Ford
//! searches over it, and reroutes around segments closed by adverse weather.
//! Higher-level consumers (the CLI) should only depend on the functions
//! exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod booking;
pub mod catalog;
pub mod config;
pub mod error;
pub mod geo;
pub mod graph;
pub mod output;
pub mod path;
pub mod resolve;
pub mod routing;
pub mod totals;
pub mod weather;

pub use booking::{book, flight_options, seat_map, Booking, BookingLedger, FlightOption};
pub use catalog::{booking_to_simulation, build_booking_graph, build_simulation_graph, Catalog};
pub use config::WeatherConfig;
pub use error::{Error, Result};
pub use geo::{GeoPoint, MapPosition};
pub use graph::{Airport, AirportId, Graph, LinkWeights, RouteMetric};
pub use output::{RouteRenderMode, RouteSummary};
pub use path::{find_route, ExplorationTrace};
pub use resolve::{resolve_airport, resolve_index};
pub use routing::{
    forecast_baseline, plan_route, plan_route_with_weather, suggest_routes, RouteAlgorithm,
    RouteDecision, RoutePlan, RouteRequest, RouteSuggestion,
};
pub use totals::{aggregate_totals, RouteTotals};
pub use weather::{
    apply_route_weather, is_adverse, parse_date, parse_departure, OpenWeatherClient, SegmentWeather,
    StaticWeather, WeatherReport, WeatherSource,
};
