use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use flightpath_lib::resolve::suggest_codes;
use flightpath_lib::booking::DAILY_OPTIONS;
use flightpath_lib::catalog::CatalogAirport;
use flightpath_lib::{
    book, booking_to_simulation, flight_options, forecast_baseline, parse_date, parse_departure,
    plan_route, resolve_airport, resolve_index, seat_map, suggest_routes, BookingLedger, Catalog,
    Error as LibError, FlightOption, Graph, OpenWeatherClient, RouteAlgorithm, RouteMetric,
    RouteRequest, RouteSummary, SegmentWeather, StaticWeather, WeatherConfig, WeatherSource,
};

use flightpath_cli::output::{
    format_airports, format_booking, format_flights, format_suggestions, render_route,
    write_json, AirportRow, FlightRow, OutputFormat, SuggestionRow,
};
use flightpath_cli::terminal::ColorPalette;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Flight route planning with weather-aware rerouting"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the airports of a catalog with their indices.
    Airports {
        #[arg(long, value_enum, default_value_t = CatalogArg::Simulation)]
        catalog: CatalogArg,
    },
    /// Plan a route, rerouting around adverse or closed segments.
    Route(RouteArgs),
    /// Show the shortest, cheapest, and fastest routes side by side.
    Suggest(EndpointArgs),
    /// List the daily flights offered between two booking airports.
    Flights(FlightArgs),
    /// Book a seat on one of the offered flights.
    Book(BookArgs),
    /// Find a booking by its reference.
    Lookup {
        /// Booking reference, e.g. `AB1234`.
        #[arg(long)]
        reference: String,
        /// JSON file holding saved bookings.
        #[arg(long, value_name = "PATH")]
        ledger: PathBuf,
    },
}

#[derive(Args, Debug)]
struct FlightArgs {
    /// Departure airport code or index in the booking catalog.
    #[arg(long = "from")]
    from: String,
    /// Arrival airport code or index in the booking catalog.
    #[arg(long = "to")]
    to: String,
    /// First day offered; defaults to today.
    #[arg(long, value_name = "DD/MM/YYYY")]
    date: Option<String>,
}

#[derive(Args, Debug)]
struct BookArgs {
    #[command(flatten)]
    flights: FlightArgs,
    /// Flight number from the `flights` listing.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=DAILY_OPTIONS as i64))]
    option: u8,
    #[arg(long)]
    passenger: String,
    /// Seat from the listing; anything else is replaced by an open seat.
    #[arg(long)]
    seat: Option<String>,
    /// Append the booking to this JSON file.
    #[arg(long, value_name = "PATH")]
    ledger: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct EndpointArgs {
    /// Departure airport code or index.
    #[arg(long = "from")]
    from: String,
    /// Arrival airport code or index.
    #[arg(long = "to")]
    to: String,
    /// Catalog providing the routing graph.
    #[arg(long, value_enum, default_value_t = CatalogArg::Simulation)]
    catalog: CatalogArg,
    /// Resolve --from/--to against the booking catalog, then plan on the
    /// simulation network.
    #[arg(long, conflicts_with = "catalog")]
    booking: bool,
    #[arg(long, value_enum, default_value_t = AlgorithmArg::Dijkstra)]
    algorithm: AlgorithmArg,
}

#[derive(Args, Debug)]
struct RouteArgs {
    #[command(flatten)]
    endpoints: EndpointArgs,
    /// Weight to minimise.
    #[arg(long, value_enum, default_value_t = MetricArg::Distance)]
    metric: MetricArg,
    /// Close a segment in both directions, optionally with a reason.
    #[arg(long = "blocked", value_name = "A-B[:REASON]")]
    blocked: Vec<String>,
    /// Departure date for the weather forecast.
    #[arg(long, value_name = "DD/MM/YYYY", requires = "time")]
    date: Option<String>,
    /// Departure time for the weather forecast.
    #[arg(long, value_name = "HH:MM", requires = "date")]
    time: Option<String>,
    /// Query OpenWeatherMap (needs FLIGHTPATH_WEATHER_API_KEY).
    #[arg(long, requires = "date")]
    live_weather: bool,
    /// Fixed weather category for an airport instead of a live forecast.
    #[arg(
        long = "weather",
        value_name = "CODE=CATEGORY",
        requires = "date",
        conflicts_with = "live_weather"
    )]
    weather: Vec<String>,
    /// Record and report the edges explored by the final search.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CatalogArg {
    Simulation,
    Booking,
}

impl From<CatalogArg> for Catalog {
    fn from(value: CatalogArg) -> Self {
        match value {
            CatalogArg::Simulation => Catalog::Simulation,
            CatalogArg::Booking => Catalog::Booking,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AlgorithmArg {
    Dijkstra,
    #[value(name = "a-star")]
    AStar,
    #[value(name = "bellman-ford")]
    BellmanFord,
}

impl From<AlgorithmArg> for RouteAlgorithm {
    fn from(value: AlgorithmArg) -> Self {
        match value {
            AlgorithmArg::Dijkstra => RouteAlgorithm::Dijkstra,
            AlgorithmArg::AStar => RouteAlgorithm::AStar,
            AlgorithmArg::BellmanFord => RouteAlgorithm::BellmanFord,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MetricArg {
    Distance,
    Cost,
    Duration,
}

impl From<MetricArg> for RouteMetric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Distance => RouteMetric::Distance,
            MetricArg::Cost => RouteMetric::Cost,
            MetricArg::Duration => RouteMetric::Duration,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Airports { catalog } => handle_airports(catalog.into(), cli.format),
        Command::Route(args) => handle_route(&args, cli.format),
        Command::Suggest(args) => handle_suggest(&args, cli.format),
        Command::Flights(args) => handle_flights(&args, cli.format),
        Command::Book(args) => handle_book(&args, cli.format),
        Command::Lookup { reference, ledger } => handle_lookup(&reference, &ledger, cli.format),
    }
}

fn handle_airports(catalog: Catalog, format: OutputFormat) -> Result<()> {
    let rows = AirportRow::from_catalog(catalog);
    match format {
        OutputFormat::Json => write_json(io::stdout().lock(), &rows)?,
        OutputFormat::Text | OutputFormat::Rich => {
            print!(
                "{}",
                format_airports(catalog, &rows, &ColorPalette::detect())
            );
        }
    }
    Ok(())
}

fn handle_route(args: &RouteArgs, format: OutputFormat) -> Result<()> {
    let (mut graph, request) = prepare(&args.endpoints)?;
    let request = request
        .with_metric(args.metric.into())
        .with_trace(args.trace);
    let tips = route_tips(args);

    let weather = match (args.date.as_deref(), args.time.as_deref()) {
        (Some(date), Some(time)) => {
            let departure = parse_departure(date, time)?;
            let source = weather_source(args)?;
            forecast_baseline(&mut graph, &request, source.as_ref(), departure)
                .map_err(|err| handle_route_failure(err, &tips))?
        }
        _ => Vec::<SegmentWeather>::new(),
    };

    // Applied after the forecast so weather cannot reopen them.
    for raw in &args.blocked {
        apply_blocked(&mut graph, raw)?;
    }

    let plan = plan_route(&graph, &request).map_err(|err| handle_route_failure(err, &tips))?;
    let summary = RouteSummary::from_plan(&graph, &plan)
        .context("failed to summarise route")?
        .with_weather(weather);
    render_route(&summary, format)?;
    Ok(())
}

fn handle_suggest(args: &EndpointArgs, format: OutputFormat) -> Result<()> {
    let (graph, request) = prepare(args)?;
    let suggestions = suggest_routes(&graph, &request.start, &request.goal, request.algorithm)
        .map_err(|err| handle_route_failure(err, &[]))?;

    let rows = suggestions
        .iter()
        .map(|suggestion| -> Result<SuggestionRow> {
            let route = suggestion
                .plan
                .as_ref()
                .map(|plan| RouteSummary::from_plan(&graph, plan))
                .transpose()?;
            Ok(SuggestionRow {
                label: suggestion.label,
                route,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if rows.iter().all(|row| row.route.is_none()) {
        bail!(format_route_not_found_message(
            &request.start,
            &request.goal,
            &[]
        ));
    }

    match format {
        OutputFormat::Json => write_json(io::stdout().lock(), &rows)?,
        OutputFormat::Text | OutputFormat::Rich => {
            print!("{}", format_suggestions(&rows, &ColorPalette::detect()));
        }
    }
    Ok(())
}

fn handle_flights(args: &FlightArgs, format: OutputFormat) -> Result<()> {
    let rows = offered_flights(args)?
        .into_iter()
        .map(|option| FlightRow {
            seats: seat_map(&option),
            option,
        })
        .collect::<Vec<_>>();
    match format {
        OutputFormat::Json => write_json(io::stdout().lock(), &rows)?,
        OutputFormat::Text | OutputFormat::Rich => {
            print!("{}", format_flights(&rows, &ColorPalette::detect()));
        }
    }
    Ok(())
}

fn handle_book(args: &BookArgs, format: OutputFormat) -> Result<()> {
    let options = offered_flights(&args.flights)?;
    let option = options
        .get(usize::from(args.option) - 1)
        .with_context(|| format!("flight {} is not offered", args.option))?;
    let booking = book(option, &args.passenger, args.seat.as_deref())?;

    if let Some(path) = &args.ledger {
        let mut ledger = BookingLedger::load(path)
            .with_context(|| format!("failed to read ledger {}", path.display()))?;
        ledger.insert(booking.clone())?;
        ledger
            .save(path)
            .with_context(|| format!("failed to write ledger {}", path.display()))?;
    }

    match format {
        OutputFormat::Json => write_json(io::stdout().lock(), &booking)?,
        OutputFormat::Text | OutputFormat::Rich => {
            print!("{}", format_booking(&booking, &ColorPalette::detect()));
            let (request, _) = booking.route_request()?;
            println!(
                "Plan it with: flightpath route --from {} --to {} --date {} --time {}",
                request.start,
                request.goal,
                booking.flight.departure_date(),
                booking.flight.departure_time()
            );
        }
    }
    Ok(())
}

fn handle_lookup(reference: &str, path: &Path, format: OutputFormat) -> Result<()> {
    let ledger = BookingLedger::load(path)
        .with_context(|| format!("failed to read ledger {}", path.display()))?;
    let Some(booking) = ledger.find(reference) else {
        bail!("No booking found with reference '{}'.", reference.trim());
    };
    match format {
        OutputFormat::Json => write_json(io::stdout().lock(), booking)?,
        OutputFormat::Text | OutputFormat::Rich => {
            print!("{}", format_booking(booking, &ColorPalette::detect()));
        }
    }
    Ok(())
}

fn offered_flights(args: &FlightArgs) -> Result<Vec<FlightOption>> {
    let from = booking_airport(&args.from)?;
    let to = booking_airport(&args.to)?;
    let first_day = match args.date.as_deref() {
        Some(date) => parse_date(date)?,
        None => today(),
    };
    Ok(flight_options(from, to, first_day)?)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn booking_airport(token: &str) -> Result<&'static CatalogAirport> {
    let booking = Catalog::Booking.entries();
    resolve_index(token, booking)
        .and_then(|id| booking.get(id))
        .ok_or_else(|| {
            handle_route_failure(
                LibError::UnknownAirport {
                    token: token.to_string(),
                    suggestions: suggest_codes(booking, token),
                },
                &[],
            )
        })
}

/// Build the routing graph and a request with endpoint tokens it understands.
fn prepare(args: &EndpointArgs) -> Result<(Graph, RouteRequest)> {
    let catalog = if args.booking {
        Catalog::Simulation
    } else {
        Catalog::from(args.catalog)
    };
    let graph = catalog
        .build_graph()
        .with_context(|| format!("failed to build the {catalog} catalog"))?;

    let (start, goal) = if args.booking {
        (
            booking_token_to_simulation(&args.from)?,
            booking_token_to_simulation(&args.to)?,
        )
    } else {
        (args.from.clone(), args.to.clone())
    };

    let request = RouteRequest::new(start, goal).with_algorithm(args.algorithm.into());
    Ok((graph, request))
}

/// Translate a booking-side code or index into the matching simulation code.
fn booking_token_to_simulation(token: &str) -> Result<String> {
    let entry = booking_airport(token)?;

    let simulation = booking_to_simulation(entry.code)
        .and_then(|id| Catalog::Simulation.entries().get(id))
        .with_context(|| format!("booking airport {} has no simulation counterpart", entry.code))?;
    debug!("booking {} maps to simulation {}", token, simulation.code);
    Ok(simulation.code.to_string())
}

fn weather_source(args: &RouteArgs) -> Result<Box<dyn WeatherSource>> {
    if args.live_weather {
        let config = WeatherConfig::from_env().context("live weather requested")?;
        let client = OpenWeatherClient::new(config).context("failed to build weather client")?;
        return Ok(Box::new(client));
    }

    let mut source = StaticWeather::clear();
    for raw in &args.weather {
        let Some((code, category)) = raw.split_once('=') else {
            bail!("invalid --weather value '{raw}': expected CODE=CATEGORY");
        };
        source = source.with(code.trim(), category.trim());
    }
    Ok(Box::new(source))
}

/// Parse `A-B[:REASON]` and close that segment on `graph`.
fn apply_blocked(graph: &mut Graph, raw: &str) -> Result<()> {
    let (pair, reason) = match raw.split_once(':') {
        Some((pair, reason)) => (pair, Some(reason.trim())),
        None => (raw, None),
    };
    let Some((from, to)) = pair.split_once('-') else {
        bail!("invalid --blocked value '{raw}': expected A-B[:REASON]");
    };

    let u = resolve_airport(graph, from.trim()).map_err(|err| handle_route_failure(err, &[]))?;
    let v = resolve_airport(graph, to.trim()).map_err(|err| handle_route_failure(err, &[]))?;
    if !graph.has_link(u, v) {
        bail!("no link between {} and {}", graph.code(u), graph.code(v));
    }

    match reason.filter(|reason| !reason.is_empty()) {
        Some(reason) => graph.set_condition(u, v, true, reason)?,
        None => graph.set_available(u, v, false)?,
    }
    Ok(())
}

fn route_tips(args: &RouteArgs) -> Vec<&'static str> {
    let mut tips = Vec::new();
    if !args.blocked.is_empty() {
        tips.push("remove some --blocked segments");
    }
    if args.date.is_some() {
        tips.push("pick another --date/--time");
    }
    tips
}

fn handle_route_failure(err: LibError, tips: &[&str]) -> anyhow::Error {
    match err {
        LibError::UnknownAirport { token, suggestions } => {
            anyhow::anyhow!(format_unknown_airport_message(&token, &suggestions))
        }
        LibError::RouteNotFound { start, goal } => {
            anyhow::anyhow!(format_route_not_found_message(&start, &goal, tips))
        }
        other => anyhow::Error::new(other),
    }
}

fn format_unknown_airport_message(token: &str, suggestions: &[String]) -> String {
    let mut message = format!("Unknown airport '{}'.", token);
    match suggestions {
        [] => {}
        [only] => message.push_str(&format!(" Did you mean '{only}'?")),
        many => {
            let joined = many
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ");
            message.push_str(&format!(" Did you mean one of: {}?", joined));
        }
    }
    message
}

fn format_route_not_found_message(start: &str, goal: &str, tips: &[&str]) -> String {
    let mut message = format!("No route found between {} and {}.", start, goal);
    if tips.is_empty() {
        message.push_str(" Try a different --metric or --catalog.");
    } else {
        message.push_str(&format!(" Try to {}.", tips.join(", or ")));
    }
    message
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
