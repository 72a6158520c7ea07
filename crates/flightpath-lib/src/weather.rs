//! Forecast lookup and weather-driven segment conditions.
//!
//! Weather only ever reaches the graph through [`Graph::set_condition`]. The
//! [`WeatherSource`] trait keeps the HTTP client out of the routing code so
//! tests and offline runs can use [`StaticWeather`] instead.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::WeatherConfig;
use crate::error::{Error, Result};
use crate::graph::{Airport, AirportId, Graph, RouteMetric, CLEAR_CONDITION};

/// Categories that close a segment. Compared case-insensitively.
pub const ADVERSE_CATEGORIES: [&str; 10] = [
    "thunderstorm",
    "snow",
    "tornado",
    "squall",
    "ash",
    "sand",
    "dust",
    "heavy rain",
    "rain",
    "extreme",
];

/// Placeholder category shown when no forecast could be obtained.
pub const UNKNOWN_CATEGORY: &str = "--";

const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%H:%M";
const FORECAST_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether a weather category should close a segment.
pub fn is_adverse(category: &str) -> bool {
    let lowered = category.trim().to_lowercase();
    ADVERSE_CATEGORIES.contains(&lowered.as_str())
}

/// Parse a `DD/MM/YYYY` booking date.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).map_err(|_| Error::InvalidSchedule {
        value: date.to_string(),
        expected: "DD/MM/YYYY",
    })
}

/// Parse a `DD/MM/YYYY` booking date and `HH:MM` departure time.
pub fn parse_departure(date: &str, time: &str) -> Result<NaiveDateTime> {
    let day = parse_date(date)?;
    let clock = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT).map_err(|_| {
        Error::InvalidSchedule {
            value: time.to_string(),
            expected: "HH:MM",
        }
    })?;
    Ok(day.and_time(clock))
}

/// Forecast for one place and time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    /// Category such as `Clear`, `Rain`, or `Thunderstorm`.
    pub main: String,
    pub description: String,
    pub temperature_c: Option<f64>,
    pub humidity: Option<u8>,
    /// Metres per second.
    pub wind_speed: Option<f64>,
}

impl WeatherReport {
    /// Report with only a category and no measurements.
    pub fn category(main: impl Into<String>) -> Self {
        let main = main.into();
        Self {
            description: main.to_lowercase(),
            main,
            temperature_c: None,
            humidity: None,
            wind_speed: None,
        }
    }

    /// Stand-in used when the lookup failed. Never adverse.
    pub fn unavailable() -> Self {
        Self::category(UNKNOWN_CATEGORY)
    }

    pub fn is_adverse(&self) -> bool {
        is_adverse(&self.main)
    }
}

/// Anything that can forecast the weather at an airport.
pub trait WeatherSource {
    fn forecast(&self, airport: &Airport, at: NaiveDateTime) -> Result<WeatherReport>;
}

/// Fixed per-airport categories, for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticWeather {
    conditions: HashMap<String, String>,
    fallback: Option<String>,
}

impl StaticWeather {
    /// Source that reports `Clear` everywhere until told otherwise.
    pub fn clear() -> Self {
        Self::default()
    }

    /// Set the category reported for `code`.
    pub fn with(mut self, code: impl Into<String>, main: impl Into<String>) -> Self {
        self.conditions.insert(code.into(), main.into());
        self
    }

    /// Category reported for airports without an explicit entry.
    pub fn with_fallback(mut self, main: impl Into<String>) -> Self {
        self.fallback = Some(main.into());
        self
    }
}

impl WeatherSource for StaticWeather {
    fn forecast(&self, airport: &Airport, _at: NaiveDateTime) -> Result<WeatherReport> {
        let main = self
            .conditions
            .get(&airport.code)
            .or(self.fallback.as_ref())
            .map(String::as_str)
            .unwrap_or(CLEAR_CONDITION);
        Ok(WeatherReport::category(main))
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt_txt: String,
    #[serde(default)]
    weather: Vec<ForecastCondition>,
    main: ForecastMain,
    #[serde(default)]
    wind: Option<ForecastWind>,
}

#[derive(Debug, Deserialize)]
struct ForecastCondition {
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ForecastMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct ForecastWind {
    speed: f64,
}

impl ForecastEntry {
    fn into_report(self) -> Result<WeatherReport> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| Error::WeatherUnavailable {
                message: format!("forecast entry {} has no weather category", self.dt_txt),
            })?;
        Ok(WeatherReport {
            main: condition.main,
            description: condition.description,
            temperature_c: Some(self.main.temp),
            humidity: Some(self.main.humidity),
            wind_speed: self.wind.map(|wind| wind.speed),
        })
    }
}

/// Pick the entry of a `/data/2.5/forecast` payload closest to `at`.
///
/// Entries whose timestamp cannot be parsed are skipped. On equal distance the
/// earlier entry wins.
pub fn parse_forecast(body: &str, at: NaiveDateTime) -> Result<WeatherReport> {
    let response: ForecastResponse = serde_json::from_str(body)?;
    select_closest(response, at)
}

fn select_closest(response: ForecastResponse, at: NaiveDateTime) -> Result<WeatherReport> {
    let mut best: Option<(i64, ForecastEntry)> = None;
    for entry in response.list {
        let Ok(stamp) = NaiveDateTime::parse_from_str(&entry.dt_txt, FORECAST_TIMESTAMP_FORMAT)
        else {
            debug!("skipping forecast entry with timestamp {:?}", entry.dt_txt);
            continue;
        };
        let diff = (stamp - at).num_seconds().abs();
        if best.as_ref().map_or(true, |(best_diff, _)| diff < *best_diff) {
            best = Some((diff, entry));
        }
    }

    match best {
        Some((_, entry)) => entry.into_report(),
        None => Err(Error::WeatherUnavailable {
            message: "forecast contained no usable entries".to_string(),
        }),
    }
}

/// Blocking client for the OpenWeatherMap five-day forecast.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    config: WeatherConfig,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("flightpath-lib/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Http)?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &WeatherConfig {
        &self.config
    }
}

impl WeatherSource for OpenWeatherClient {
    fn forecast(&self, airport: &Airport, at: NaiveDateTime) -> Result<WeatherReport> {
        let url = format!("{}/data/2.5/forecast", self.config.base_url);
        let lat = airport.location.latitude.to_string();
        let lon = airport.location.longitude.to_string();
        debug!("requesting forecast for {} at {}", airport.code, at);

        let response = self
            .http
            .get(url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.config.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()?
            .error_for_status()?;
        let body: ForecastResponse = response.json()?;
        select_closest(body, at)
    }
}

/// Weather observed for one segment of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentWeather {
    pub from: AirportId,
    pub to: AirportId,
    pub label: String,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub departure_weather: WeatherReport,
    pub arrival_weather: WeatherReport,
    pub blocked: bool,
    pub reason: String,
}

/// Query weather along `path` and record the outcome on the graph.
///
/// Each segment departs when the previous one arrives, starting at
/// `departure`. A segment is blocked when either end reports an adverse
/// category; its reason lists those categories, otherwise it is `Clear`.
/// A failed lookup is logged and treated as clear weather.
///
/// # Errors
///
/// Returns [`Error::MissingSegment`] when two consecutive airports are not
/// linked.
pub fn apply_route_weather(
    graph: &mut Graph,
    path: &[AirportId],
    source: &dyn WeatherSource,
    departure: NaiveDateTime,
) -> Result<Vec<SegmentWeather>> {
    let mut rows = Vec::with_capacity(path.len().saturating_sub(1));
    let mut clock = departure;

    for pair in path.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let minutes = graph
            .best_edge(from, to, RouteMetric::Duration)
            .map(|edge| edge.weights.duration)
            .ok_or(Error::MissingSegment { from, to })?;
        let arrival = clock + Duration::seconds((minutes * 60.0).round() as i64);

        let departure_weather = lookup(graph, source, from, clock);
        let arrival_weather = lookup(graph, source, to, arrival);

        let adverse: Vec<&str> = [&departure_weather, &arrival_weather]
            .into_iter()
            .filter(|report| report.is_adverse())
            .map(|report| report.main.as_str())
            .collect();
        let blocked = !adverse.is_empty();
        let reason = if blocked {
            adverse.join(", ")
        } else {
            CLEAR_CONDITION.to_string()
        };
        graph.set_condition(from, to, blocked, reason.clone())?;

        rows.push(SegmentWeather {
            from,
            to,
            label: format!("{}-{}", graph.code(from), graph.code(to)),
            departure: clock,
            arrival,
            departure_weather,
            arrival_weather,
            blocked,
            reason,
        });
        clock = arrival;
    }

    Ok(rows)
}

fn lookup(graph: &Graph, source: &dyn WeatherSource, id: AirportId, at: NaiveDateTime) -> WeatherReport {
    let Some(airport) = graph.airport(id) else {
        return WeatherReport::unavailable();
    };
    match source.forecast(airport, at) {
        Ok(report) => report,
        Err(err) => {
            warn!("weather lookup for {} failed: {}", airport.code, err);
            WeatherReport::unavailable()
        }
    }
}
