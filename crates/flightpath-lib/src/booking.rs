//! Flight options, seat maps, and bookings between booking-catalog airports.
//!
//! Everything that varies from one flight to the next (departure clock, block
//! time padding, fare spread, offered seats, booking reference) is drawn from
//! a SHA-256 digest of the route and day, so the same query always offers the
//! same flights.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::catalog::{booking_to_simulation, segment_minutes, CatalogAirport, FARE_PER_KM, SIMULATION_AIRPORTS};
use crate::error::{Error, Result};
use crate::routing::RouteRequest;

/// Number of daily flights offered, starting on the requested day.
pub const DAILY_OPTIONS: usize = 5;

/// Seats drawn for each flight before duplicates are removed.
pub const SEATS_OFFERED: usize = 10;

/// Fare reduction per day of advance purchase.
pub const ADVANCE_DISCOUNT_PER_DAY: f64 = 0.07;

/// Lowest multiplier the advance discount can reach.
pub const MIN_DISCOUNT_FACTOR: f64 = 0.7;

const SEAT_ROWS: u32 = 30;
const SEAT_LETTERS: &[u8; 6] = b"ABCDEF";
const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%H:%M";

/// Deterministic stream of values seeded from a SHA-256 digest.
struct Draws {
    block: [u8; 32],
    offset: usize,
}

impl Draws {
    fn new(parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        Self {
            block: hasher.finalize().into(),
            offset: 0,
        }
    }

    fn next_u32(&mut self) -> u32 {
        if self.offset + 4 > self.block.len() {
            self.block = Sha256::digest(self.block).into();
            self.offset = 0;
        }
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.block[self.offset..self.offset + 4]);
        self.offset += 4;
        u32::from_le_bytes(bytes)
    }

    /// Uniform in `0..bound`.
    fn below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }
}

/// Fare multiplier for buying `day_offset` days ahead of the first offered day.
pub fn advance_discount(day_offset: usize) -> f64 {
    (1.0 - day_offset as f64 * ADVANCE_DISCOUNT_PER_DAY).max(MIN_DISCOUNT_FACTOR)
}

/// One bookable flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOption {
    /// 1-based position in the offered list.
    pub number: usize,
    pub from: String,
    pub from_name: String,
    pub to: String,
    pub to_name: String,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub duration_minutes: u32,
    /// Great-circle distance between the two airports.
    pub distance_km: f64,
    pub fare: f64,
}

impl FlightOption {
    /// Departure day as `DD/MM/YYYY`.
    pub fn departure_date(&self) -> String {
        self.departure.format(DATE_FORMAT).to_string()
    }

    /// Departure clock as `HH:MM`.
    pub fn departure_time(&self) -> String {
        self.departure.format(TIME_FORMAT).to_string()
    }

    /// Arrival clock as `HH:MM`; may fall on the following day.
    pub fn arrival_time(&self) -> String {
        self.arrival.format(TIME_FORMAT).to_string()
    }
}

/// Offer [`DAILY_OPTIONS`] flights from `from` to `to`, one per day starting
/// on `first_day`.
///
/// Block time is the cruise-speed estimate for the distance plus up to an
/// hour of padding. The fare is [`FARE_PER_KM`] per kilometre, spread by
/// ±20% and reduced by [`advance_discount`] for later days.
///
/// # Errors
///
/// [`Error::InvalidBooking`] when both ends are the same airport or the
/// dates run past the calendar.
pub fn flight_options(
    from: &CatalogAirport,
    to: &CatalogAirport,
    first_day: NaiveDate,
) -> Result<Vec<FlightOption>> {
    if from.code == to.code {
        return Err(Error::InvalidBooking {
            message: format!("departure and arrival are both {}", from.code),
        });
    }

    let distance_km = from.location.distance_km(&to.location);
    let cruise_minutes = segment_minutes(distance_km).round() as u32;

    let mut options = Vec::with_capacity(DAILY_OPTIONS);
    for day in 0..DAILY_OPTIONS {
        let date = first_day
            .checked_add_days(Days::new(day as u64))
            .ok_or_else(|| Error::InvalidBooking {
                message: format!("no calendar day {day} days after {first_day}"),
            })?;
        let mut draws = Draws::new(&[from.code, to.code, &date.to_string()]);

        let clock = draws.below(24 * 60);
        let departure = date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(clock));
        let duration_minutes = cruise_minutes + draws.below(60);
        let arrival = departure + Duration::minutes(i64::from(duration_minutes));

        let spread = 0.8 + 0.4 * draws.unit();
        let fare = distance_km * FARE_PER_KM * spread * advance_discount(day);

        options.push(FlightOption {
            number: day + 1,
            from: from.code.to_string(),
            from_name: from.name.to_string(),
            to: to.code.to_string(),
            to_name: to.name.to_string(),
            departure,
            arrival,
            duration_minutes,
            distance_km,
            fare: (fare * 100.0).round() / 100.0,
        });
    }

    debug!(
        "offered {} flights {}->{} from {}",
        options.len(),
        from.code,
        to.code,
        first_day
    );
    Ok(options)
}

/// Seats open on `option`, ordered by row then letter.
pub fn seat_map(option: &FlightOption) -> Vec<String> {
    let stamp = option.departure.to_string();
    let mut draws = Draws::new(&[&option.from, &option.to, &stamp, "seats"]);
    let seats: BTreeSet<(u32, u8)> = (0..SEATS_OFFERED)
        .map(|_| {
            let row = draws.below(SEAT_ROWS) + 1;
            let letter = SEAT_LETTERS[draws.below(SEAT_LETTERS.len() as u32) as usize];
            (row, letter)
        })
        .collect();
    seats
        .into_iter()
        .map(|(row, letter)| format!("{row}{}", char::from(letter)))
        .collect()
}

/// A confirmed seat on a flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Two letters followed by four digits.
    pub reference: String,
    pub passenger: String,
    pub seat: String,
    pub flight: FlightOption,
}

impl Booking {
    /// Route request for the booked pair on the simulation network, plus the
    /// departure time to forecast weather for.
    pub fn route_request(&self) -> Result<(RouteRequest, NaiveDateTime)> {
        let start = simulation_code(&self.flight.from)?;
        let goal = simulation_code(&self.flight.to)?;
        Ok((RouteRequest::new(start, goal), self.flight.departure))
    }
}

fn simulation_code(code: &str) -> Result<&'static str> {
    booking_to_simulation(code)
        .and_then(|id| SIMULATION_AIRPORTS.get(id))
        .map(|entry| entry.code)
        .ok_or_else(|| Error::InvalidBooking {
            message: format!("{code} has no simulation counterpart"),
        })
}

/// Book `passenger` onto `option`.
///
/// A seat that is not on the [`seat_map`] is replaced by one drawn from it,
/// as is a missing seat.
///
/// # Errors
///
/// [`Error::InvalidBooking`] for a blank passenger name.
pub fn book(option: &FlightOption, passenger: &str, seat: Option<&str>) -> Result<Booking> {
    let passenger = passenger.trim();
    if passenger.is_empty() {
        return Err(Error::InvalidBooking {
            message: "passenger name is empty".to_string(),
        });
    }

    let seats = seat_map(option);
    let stamp = option.departure.to_string();
    let mut draws = Draws::new(&[passenger, &option.from, &option.to, &stamp]);
    let fallback = seats[draws.below(seats.len() as u32) as usize].clone();

    let seat = match seat.map(str::trim) {
        Some(wanted) if seats.iter().any(|offered| offered == wanted) => wanted.to_string(),
        Some(wanted) => {
            warn!("seat {wanted} is not offered on this flight; assigning {fallback}");
            fallback
        }
        None => fallback,
    };

    let letters: String = (0..2)
        .map(|_| char::from(b'A' + draws.below(26) as u8))
        .collect();
    let reference = format!("{letters}{:04}", draws.below(10_000));

    info!(
        "booked {} on {}->{} {} seat {} ({})",
        passenger,
        option.from,
        option.to,
        option.departure,
        seat,
        reference
    );
    Ok(Booking {
        reference,
        passenger: passenger.to_string(),
        seat,
        flight: option.clone(),
    })
}

/// Bookings keyed by reference, persisted as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingLedger {
    bookings: BTreeMap<String, Booking>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a ledger from `path`; a missing file is an empty ledger.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(body) => Ok(serde_json::from_str(&body)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no booking ledger at {}", path.display());
                Ok(Self::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Write the ledger to `path`, replacing the previous file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(parent)?;
        serde_json::to_writer_pretty(&mut tmp, self)?;
        tmp.write_all(b"\n")?;
        tmp.persist(path).map_err(|err| err.error)?;
        debug!("saved {} bookings to {}", self.len(), path.display());
        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::InvalidBooking`] when the reference is already taken.
    pub fn insert(&mut self, booking: Booking) -> Result<()> {
        if self.bookings.contains_key(&booking.reference) {
            return Err(Error::InvalidBooking {
                message: format!("booking reference {} already exists", booking.reference),
            });
        }
        self.bookings.insert(booking.reference.clone(), booking);
        Ok(())
    }

    /// Find a booking by reference, ignoring case and surrounding blanks.
    pub fn find(&self, reference: &str) -> Option<&Booking> {
        self.bookings.get(&reference.trim().to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}
