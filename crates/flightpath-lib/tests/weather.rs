mod common;

use chrono::NaiveDateTime;
use common::diamond;
use flightpath_lib::weather::{parse_forecast, UNKNOWN_CATEGORY};
use flightpath_lib::{
    apply_route_weather, parse_departure, plan_route_with_weather, Airport, Error, RouteMetric,
    RouteRequest, StaticWeather, WeatherReport, WeatherSource,
};

const FORECAST: &str = r#"{
  "cod": "200",
  "list": [
    {
      "dt_txt": "2025-03-05 09:00:00",
      "main": { "temp": 4.5, "humidity": 80 },
      "weather": [{ "main": "Clouds", "description": "broken clouds" }],
      "wind": { "speed": 3.1 }
    },
    {
      "dt_txt": "2025-03-05 12:00:00",
      "main": { "temp": 7.25, "humidity": 65 },
      "weather": [{ "main": "Rain", "description": "light rain" }],
      "wind": { "speed": 5.4 }
    },
    {
      "dt_txt": "not a timestamp",
      "main": { "temp": 0.0, "humidity": 0 },
      "weather": [{ "main": "Snow", "description": "snow" }]
    }
  ]
}"#;

struct FailingWeather;

impl WeatherSource for FailingWeather {
    fn forecast(&self, _airport: &Airport, _at: NaiveDateTime) -> flightpath_lib::Result<WeatherReport> {
        Err(Error::WeatherUnavailable {
            message: "offline".to_string(),
        })
    }
}

#[test]
fn forecast_entry_closest_to_departure_is_used() {
    let at = parse_departure("05/03/2025", "11:00").unwrap();
    let report = parse_forecast(FORECAST, at).unwrap();
    assert_eq!(report.main, "Rain");
    assert_eq!(report.description, "light rain");
    assert_eq!(report.temperature_c, Some(7.25));
    assert_eq!(report.humidity, Some(65));
    assert_eq!(report.wind_speed, Some(5.4));
    assert!(report.is_adverse());

    let early = parse_departure("05/03/2025", "08:00").unwrap();
    assert_eq!(parse_forecast(FORECAST, early).unwrap().main, "Clouds");
}

#[test]
fn empty_forecast_is_unavailable() {
    let at = parse_departure("05/03/2025", "11:00").unwrap();
    let err = parse_forecast(r#"{"list": []}"#, at).unwrap_err();
    assert!(matches!(err, Error::WeatherUnavailable { .. }));
    assert!(matches!(parse_forecast("not json", at), Err(Error::Json(_))));
}

#[test]
fn segment_blocked_when_either_end_is_adverse() {
    let mut graph = diamond();
    let source = StaticWeather::clear()
        .with("AAA", "Thunderstorm")
        .with("BBB", "Snow");
    let departure = parse_departure("01/12/2025", "23:30").unwrap();

    let rows = apply_route_weather(&mut graph, &[0, 1, 2], &source, departure).unwrap();
    assert_eq!(rows.len(), 2);

    assert!(rows[0].blocked);
    assert_eq!(rows[0].reason, "Thunderstorm, Snow");
    assert_eq!(graph.condition(1, 0).reason, "Thunderstorm, Snow");
    assert!(!graph.is_available(0, 1));

    // Departure end adverse only.
    assert!(rows[1].blocked);
    assert_eq!(rows[1].reason, "Snow");

    // Each segment departs when the previous one lands (60 minute legs).
    assert_eq!(rows[0].arrival, rows[1].departure);
    assert_eq!(rows[1].departure.to_string(), "2025-12-02 00:30:00");
}

#[test]
fn clear_segments_are_reopened() {
    let mut graph = diamond();
    graph.set_condition(0, 1, true, "Dust").unwrap();
    let departure = parse_departure("01/12/2025", "08:00").unwrap();

    let rows = apply_route_weather(&mut graph, &[0, 1], &StaticWeather::clear(), departure).unwrap();
    assert!(!rows[0].blocked);
    assert_eq!(rows[0].reason, "Clear");
    assert!(graph.is_available(0, 1));
}

#[test]
fn failed_lookups_are_treated_as_clear() {
    let mut graph = diamond();
    let departure = parse_departure("01/12/2025", "08:00").unwrap();
    let rows = apply_route_weather(&mut graph, &[0, 1, 2], &FailingWeather, departure).unwrap();
    assert!(rows.iter().all(|row| !row.blocked));
    assert_eq!(rows[0].departure_weather.main, UNKNOWN_CATEGORY);
    assert_eq!(graph.overlay().closed_count(), 0);
}

#[test]
fn unlinked_path_is_a_missing_segment() {
    let mut graph = diamond();
    let departure = parse_departure("01/12/2025", "08:00").unwrap();
    let err = apply_route_weather(&mut graph, &[0, 2], &StaticWeather::clear(), departure).unwrap_err();
    assert!(matches!(err, Error::MissingSegment { from: 0, to: 2 }));
}

#[test]
fn weather_planning_reroutes_around_storms() {
    let mut graph = diamond();
    let source = StaticWeather::clear().with("BBB", "Extreme");
    let departure = parse_departure("15/06/2025", "10:15").unwrap();

    let (plan, weather) =
        plan_route_with_weather(&mut graph, &RouteRequest::new("AAA", "CCC"), &source, departure)
            .unwrap();
    assert_eq!(weather.len(), 2);
    assert!(plan.rerouted);
    assert_eq!(plan.steps, vec![0, 3, 2]);
    assert_eq!(plan.baseline, vec![0, 1, 2]);
}

#[test]
fn cheapest_route_forecasts_the_distance_baseline() {
    let mut graph = diamond();
    let source = StaticWeather::clear().with("BBB", "Tornado");
    let departure = parse_departure("15/06/2025", "10:15").unwrap();
    let request = RouteRequest::new("AAA", "CCC").with_metric(RouteMetric::Cost);

    let (plan, weather) = plan_route_with_weather(&mut graph, &request, &source, departure).unwrap();
    let segments: Vec<_> = weather.iter().map(|row| row.label.as_str()).collect();
    assert_eq!(segments, ["AAA-BBB", "BBB-CCC"]);
    assert!(plan.rerouted);
    assert_eq!(plan.baseline, vec![0, 1, 2]);
    assert_eq!(plan.steps, vec![0, 3, 2]);
}
