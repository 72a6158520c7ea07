//! Output formatting for the CLI commands.
//!
//! Route summaries are rendered by the library; this module picks the mode,
//! writes JSON, and formats the airport listing, suggestion table, flight
//! options, and booking confirmations.

use std::fmt::Write as _;
use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use flightpath_lib::{Booking, Catalog, FlightOption, RouteRenderMode, RouteSummary};

use crate::terminal::ColorPalette;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text.
    #[default]
    Text,
    /// Markdown-flavoured text.
    Rich,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Library render mode for the textual formats.
    pub fn render_mode(self) -> Option<RouteRenderMode> {
        match self {
            OutputFormat::Text => Some(RouteRenderMode::PlainText),
            OutputFormat::Rich => Some(RouteRenderMode::RichText),
            OutputFormat::Json => None,
        }
    }
}

/// Write any serialisable value as pretty JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if JSON serialization or writing fails.
pub fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, value).map_err(io::Error::other)?;
    writer.write_all(b"\n")
}

/// Render a route summary in the requested format to stdout.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn render_route(summary: &RouteSummary, format: OutputFormat) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    match format.render_mode() {
        Some(mode) => stdout.write_all(summary.render(mode).as_bytes()),
        None => write_json(&mut stdout, summary),
    }
}

/// Catalog entry as listed by `flightpath airports`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AirportRow {
    pub index: usize,
    pub code: &'static str,
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl AirportRow {
    pub fn from_catalog(catalog: Catalog) -> Vec<AirportRow> {
        catalog
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| AirportRow {
                index,
                code: entry.code,
                name: entry.name,
                latitude: entry.location.latitude,
                longitude: entry.location.longitude,
            })
            .collect()
    }
}

/// Format the airport listing as text.
pub fn format_airports(catalog: Catalog, rows: &[AirportRow], palette: &ColorPalette) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{} airports ({catalog} catalog):", rows.len());
    for row in rows {
        let _ = writeln!(
            buffer,
            "{gray}{:>3}{reset}  {white}{:<4}{reset} {}",
            row.index,
            row.code,
            row.name,
            gray = palette.gray,
            white = palette.white_bold,
            reset = palette.reset,
        );
    }
    buffer
}

/// One row of the `suggest` output.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SuggestionRow {
    pub label: &'static str,
    /// `None` when the goal is unreachable by this metric.
    pub route: Option<RouteSummary>,
}

/// Format the suggestion set as an aligned table.
pub fn format_suggestions(rows: &[SuggestionRow], palette: &ColorPalette) -> String {
    let mut buffer = String::new();
    for row in rows {
        let tag = palette.tag_for(row.label);
        let _ = write!(buffer, "{tag} {:<8} {}", row.label, palette.reset);
        match &row.route {
            Some(route) => {
                let path = route
                    .steps
                    .iter()
                    .map(|step| step.code.as_str())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                let _ = writeln!(
                    buffer,
                    " {path}  {green}(distance {:.2}, cost {:.2}, duration {:.0} min){reset}",
                    route.totals.distance,
                    route.totals.cost,
                    route.totals.duration,
                    green = palette.green,
                    reset = palette.reset,
                );
                if route.rerouted {
                    let _ = writeln!(
                        buffer,
                        "{:>12}rerouted, baseline {}",
                        "",
                        route.baseline.join(" -> ")
                    );
                }
            }
            None => {
                let _ = writeln!(buffer, " {}no route{}", palette.red, palette.reset);
            }
        }
    }
    buffer
}

/// Flight options with their open seats, as printed by `flightpath flights`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FlightRow {
    #[serde(flatten)]
    pub option: FlightOption,
    pub seats: Vec<String>,
}

/// Format the offered flights as a numbered table.
pub fn format_flights(rows: &[FlightRow], palette: &ColorPalette) -> String {
    let mut buffer = String::new();
    if let Some(first) = rows.first() {
        let _ = writeln!(
            buffer,
            "Flights {white}{}{reset} -> {white}{}{reset} ({:.0} km):",
            first.option.from,
            first.option.to,
            first.option.distance_km,
            white = palette.white_bold,
            reset = palette.reset,
        );
    }
    let _ = writeln!(
        buffer,
        "{:<4} {:<10}  {:<5}  {:<5}  {:>8}  {:>9}",
        "No.", "Date", "Dep", "Arr", "Duration", "Fare"
    );
    for row in rows {
        let option = &row.option;
        let _ = writeln!(
            buffer,
            "{gray}{:<4}{reset} {:<10}  {:<5}  {:<5}  {:>4} min  {green}{:>9.2}{reset}",
            option.number,
            option.departure_date(),
            option.departure_time(),
            option.arrival_time(),
            option.duration_minutes,
            option.fare,
            gray = palette.gray,
            green = palette.green,
            reset = palette.reset,
        );
        let _ = writeln!(buffer, "{:>5}seats: {}", "", row.seats.join(" "));
    }
    buffer
}

/// Format a booking confirmation.
pub fn format_booking(booking: &Booking, palette: &ColorPalette) -> String {
    let flight = &booking.flight;
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "Booking reference: {white}{}{reset}",
        booking.reference,
        white = palette.white_bold,
        reset = palette.reset,
    );
    let _ = writeln!(buffer, "Passenger: {}", booking.passenger);
    let _ = writeln!(
        buffer,
        "Flight: {} ({}) -> {} ({})",
        flight.from, flight.from_name, flight.to, flight.to_name
    );
    let _ = writeln!(buffer, "Date: {}", flight.departure_date());
    let _ = writeln!(
        buffer,
        "Time: {} - {}",
        flight.departure_time(),
        flight.arrival_time()
    );
    let _ = writeln!(buffer, "Seat: {}", booking.seat);
    let _ = writeln!(
        buffer,
        "Price: {green}${:.2}{reset}",
        flight.fare,
        green = palette.green,
        reset = palette.reset,
    );
    buffer
}
