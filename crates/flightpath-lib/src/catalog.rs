//! Fixed airport catalogs.
//!
//! Two independently indexed airport universes exist: the booking catalog
//! (coordinates only, hand-written links with kilometre distances) and the
//! simulation catalog (map positions, links generated from proximity). A
//! static table maps booking codes onto simulation indices; it is maintained
//! by hand and must be updated whenever either catalog changes.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::geo::{GeoPoint, MapPosition};
use crate::graph::{AirportId, Graph, LinkWeights};

/// Links are only generated between simulation airports closer than this on the map.
pub const MAX_SIMULATION_LINK_SPAN: f64 = 800.0;

/// Cruise speed used to derive flight durations, in km/h.
pub const CRUISE_SPEED_KMH: f64 = 800.0;

/// Shortest duration assigned to any simulated segment, in minutes.
pub const MIN_SEGMENT_MINUTES: f64 = 10.0;

/// Booking fares are this many currency units per kilometre.
pub const FARE_PER_KM: f64 = 0.5;

/// Pairs never linked in the simulation catalog even when close enough.
const EXCLUDED_SIMULATION_PAIRS: [(&str, &str); 5] = [
    ("STL", "SEA"),
    ("TPA", "SEA"),
    ("MIA", "SEA"),
    ("BOS", "LAX"),
    ("CLE", "LAX"),
];

/// Which airport universe a token is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Catalog {
    /// Proximity-linked airports with map positions.
    #[default]
    Simulation,
    /// Airports with hand-written booking links.
    Booking,
}

impl Catalog {
    pub fn entries(self) -> &'static [CatalogAirport] {
        match self {
            Catalog::Simulation => &SIMULATION_AIRPORTS,
            Catalog::Booking => &BOOKING_AIRPORTS,
        }
    }

    /// Build the routing graph for this catalog.
    pub fn build_graph(self) -> Result<Graph> {
        match self {
            Catalog::Simulation => build_simulation_graph(),
            Catalog::Booking => build_booking_graph(),
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Catalog::Simulation => "simulation",
            Catalog::Booking => "booking",
        })
    }
}

/// Static catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CatalogAirport {
    pub code: &'static str,
    pub name: &'static str,
    /// Map position; booking airports have none.
    pub position: Option<MapPosition>,
    pub location: GeoPoint,
}

const fn sim(code: &'static str, name: &'static str, x: f64, y: f64, lat: f64, lon: f64) -> CatalogAirport {
    CatalogAirport {
        code,
        name,
        position: Some(MapPosition::new(x, y)),
        location: GeoPoint::new(lat, lon),
    }
}

const fn book(code: &'static str, name: &'static str, lat: f64, lon: f64) -> CatalogAirport {
    CatalogAirport {
        code,
        name,
        position: None,
        location: GeoPoint::new(lat, lon),
    }
}

/// Simulation-side airports, indexed by position in this array.
pub static SIMULATION_AIRPORTS: [CatalogAirport; 20] = [
    sim("SEA", "SEATTLE TACOMA INTERNATIONAL AIRPORT", 225.0, 269.0, 47.4502, -122.3088),
    sim("PDX", "PORTLAND INTERNATIONAL AIRPORT", 153.0, 369.0, 45.5898, -122.5951),
    sim("SFO", "SAN FRANCISCO INTERNATIONAL AIRPORT", 82.0, 586.0, 37.6213, -122.3790),
    sim("LAS", "HARRY REID INTERNATIONAL AIRPORT", 250.0, 624.0, 36.0840, -115.1537),
    sim("SLC", "SALT LAKE CITY INTERNATIONAL AIRPORT", 378.0, 558.0, 40.7899, -111.9791),
    sim("LAX", "LOS ANGELES INTERNATIONAL AIRPORT", 166.0, 721.0, 33.9416, -118.4085),
    sim("MSP", "MINNEAPOLIS SAINT PAUL INTERNATIONAL AIRPORT", 831.0, 405.0, 44.8848, -93.2223),
    sim("MCI", "KANSAS CITY INTERNATIONAL AIRPORT", 742.0, 642.0, 39.2976, -94.7139),
    sim("JFK", "JOHN F. KENNEDY INTERNATIONAL AIRPORT", 1324.0, 511.0, 40.6413, -73.7781),
    sim("BOS", "BOSTON LOGAN INTERNATIONAL AIRPORT", 1393.0, 448.0, 42.3656, -71.0096),
    sim("CLE", "CLEVELAND HOPKINS INTERNATIONAL AIRPORT", 1150.0, 550.0, 41.4117, -81.8498),
    sim("CLT", "CHARLOTTE DOUGLAS INTERNATIONAL AIRPORT", 1237.0, 727.0, 35.2140, -80.9431),
    sim("MIA", "MIAMI INTERNATIONAL AIRPORT", 1259.0, 1016.0, 25.7959, -80.2870),
    sim("IAH", "GEORGE BUSH INTERCONTINENTAL AIRPORT", 786.0, 962.0, 29.9902, -95.3368),
    sim("STL", "ST. LOUIS LAMBERT INTERNATIONAL AIRPORT", 905.0, 647.0, 38.7500, -90.3700),
    sim("TPA", "TAMPA INTERNATIONAL AIRPORT", 1160.0, 991.0, 27.9755, -82.5332),
    sim("DEN", "DENVER INTERNATIONAL AIRPORT", 549.0, 616.0, 39.8561, -104.6737),
    sim("PHX", "PHOENIX SKY HARBOR INTERNATIONAL AIRPORT", 342.0, 778.0, 33.4373, -112.0078),
    sim("DFW", "DALLAS/FORT WORTH INTERNATIONAL AIRPORT", 756.0, 853.0, 32.8998, -97.0403),
    sim("AUG", "AUGUSTA STATE AIRPORT", 1413.0, 331.0, 44.3206, -69.7973),
];

/// Booking-side airports, indexed by position in this array.
pub static BOOKING_AIRPORTS: [CatalogAirport; 20] = [
    book("SEA", "SEATTLE TACOMA INTERNATIONAL AIRPORT", 47.4502, -122.3088),
    book("PDX", "PORTLAND INTERNATIONAL AIRPORT", 45.5898, -122.5951),
    book("SFO", "SAN FRANCISCO INTERNATIONAL AIRPORT", 37.6213, -122.3790),
    book("LAS", "HARRY REID INTERNATIONAL AIRPORT", 36.0840, -115.1537),
    book("SLC", "SALT LAKE CITY INTERNATIONAL AIRPORT", 40.7899, -111.9791),
    book("LAX", "LOS ANGELES INTERNATIONAL AIRPORT", 33.9416, -118.4085),
    book("MSP", "MINNEAPOLIS SAINT PAUL INTERNATIONAL AIRPORT", 44.8848, -93.2223),
    book("MCI", "KANSAS CITY INTERNATIONAL AIRPORT", 39.2976, -94.7139),
    book("JFK", "JOHN F. KENNEDY INTERNATIONAL AIRPORT", 40.6413, -73.7781),
    book("BOS", "BOSTON LOGAN INTERNATIONAL AIRPORT", 42.3656, -71.0096),
    book("CLE", "CLEVELAND HOPKINS INTERNATIONAL AIRPORT", 41.4117, -81.8498),
    book("CLT", "CHARLOTTE DOUGLAS INTERNATIONAL AIRPORT", 35.2140, -80.9431),
    book("MIA", "MIAMI INTERNATIONAL AIRPORT", 25.7959, -80.2870),
    book("IAH", "GEORGE BUSH INTERCONTINENTAL AIRPORT", 29.9902, -95.3368),
    book("STL", "ST. LOUIS LAMBERT INTERNATIONAL AIRPORT", 38.7500, -90.3700),
    book("TPA", "TAMPA INTERNATIONAL AIRPORT", 27.9755, -82.5332),
    book("DEN", "DENVER INTERNATIONAL AIRPORT", 39.8561, -104.6737),
    book("PHX", "PHOENIX SKY HARBOR INTERNATIONAL AIRPORT", 33.4373, -112.0078),
    book("DFW", "DALLAS/FORT WORTH INTERNATIONAL AIRPORT", 32.8998, -97.0403),
    book("AUG", "AUGUSTA STATE AIRPORT", 44.3206, -69.7973),
];

/// Booking links as `(from, to, kilometres)` over booking indices.
pub static BOOKING_LINKS: [(AirportId, AirportId, f64); 31] = [
    (0, 1, 233.0),
    (1, 2, 550.0),
    (2, 5, 543.0),
    (5, 3, 386.0),
    (3, 4, 684.0),
    (4, 6, 991.0),
    (6, 7, 376.0),
    (7, 8, 1800.0),
    (8, 9, 300.0),
    (9, 10, 900.0),
    (10, 11, 600.0),
    (11, 12, 1000.0),
    (12, 13, 1200.0),
    (13, 14, 1100.0),
    (14, 15, 900.0),
    (0, 2, 1090.0),
    (2, 3, 670.0),
    (5, 8, 3970.0),
    (3, 8, 2240.0),
    (1, 4, 1200.0),
    (7, 14, 400.0),
    (1, 5, 1320.0),
    (4, 16, 820.0),
    (6, 16, 1100.0),
    (3, 17, 480.0),
    (5, 17, 590.0),
    (16, 18, 1050.0),
    (13, 18, 400.0),
    (9, 19, 260.0),
    (6, 14, 700.0),
    (10, 14, 660.0),
];

/// Simulation codes in simulation index order, used to translate bookings.
const BOOKING_TO_SIMULATION: [&str; 20] = [
    "SEA", "PDX", "SFO", "LAS", "SLC", "LAX", "MSP", "MCI", "JFK", "BOS", "CLE", "CLT", "MIA",
    "IAH", "STL", "TPA", "DEN", "PHX", "DFW", "AUG",
];

/// Translate a booking-side airport code into the matching simulation index.
pub fn booking_to_simulation(code: &str) -> Option<AirportId> {
    BOOKING_TO_SIMULATION
        .iter()
        .position(|candidate| *candidate == code)
}

/// Flight duration in minutes for a great-circle distance.
pub fn segment_minutes(km: f64) -> f64 {
    (km / CRUISE_SPEED_KMH * 60.0).max(MIN_SEGMENT_MINUTES)
}

/// Deterministic fare in `[100, 300)` for a simulation pair.
///
/// Fares only need to differ between pairs so cost-ranked routes diverge
/// from distance-ranked ones; the pair indices seed the spread.
fn simulation_fare(i: AirportId, j: AirportId) -> f64 {
    let spread = (i * 37 + j * 101 + i * j * 13) % 200;
    100.0 + spread as f64
}

fn is_excluded(a: &str, b: &str) -> bool {
    EXCLUDED_SIMULATION_PAIRS
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

fn add_airports(graph: &mut Graph, entries: &[CatalogAirport]) -> Result<()> {
    for entry in entries {
        graph.add_airport(
            entry.code,
            entry.name,
            entry.position.unwrap_or_default(),
            entry.location,
        )?;
    }
    Ok(())
}

/// Build the simulation graph: every pair within [`MAX_SIMULATION_LINK_SPAN`]
/// on the map is linked, apart from a handful of excluded pairs.
///
/// Link distance is the map distance, which keeps the A* heuristic
/// consistent; duration comes from the great-circle distance.
pub fn build_simulation_graph() -> Result<Graph> {
    let mut graph = Graph::new();
    add_airports(&mut graph, &SIMULATION_AIRPORTS)?;

    let n = SIMULATION_AIRPORTS.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let a = &SIMULATION_AIRPORTS[i];
            let b = &SIMULATION_AIRPORTS[j];
            let (Some(pa), Some(pb)) = (a.position, b.position) else {
                continue;
            };
            let span = pa.distance_to(&pb);
            if span > MAX_SIMULATION_LINK_SPAN || is_excluded(a.code, b.code) {
                continue;
            }
            let km = a.location.distance_km(&b.location);
            graph.add_link(
                i,
                j,
                LinkWeights::new(span, simulation_fare(i, j), segment_minutes(km)),
            )?;
        }
    }

    debug!(
        "built simulation graph with {} airports and {} links",
        graph.len(),
        graph.link_count()
    );
    Ok(graph)
}

/// Build the booking graph from the hand-written link table.
///
/// Booking airports have no map positions, so A* degrades to Dijkstra here.
pub fn build_booking_graph() -> Result<Graph> {
    let mut graph = Graph::new();
    add_airports(&mut graph, &BOOKING_AIRPORTS)?;

    for &(u, v, km) in BOOKING_LINKS.iter() {
        graph.add_link(
            u,
            v,
            LinkWeights::new(km, km * FARE_PER_KM, km / CRUISE_SPEED_KMH * 60.0),
        )?;
    }

    debug!(
        "built booking graph with {} airports and {} links",
        graph.len(),
        graph.link_count()
    );
    Ok(graph)
}
