use std::process;

use clap::{ArgAction, Parser};
use serde::Serialize;

use farescan::error::FlightError;
use farescan::fetch::{FetchOptions, HttpTransport};
use farescan::model::{AirportCode, FlightRecord};
use farescan::query::{self, Endpoints};
use farescan::window::DateRange;
use farescan::{logging, table, Progress, Scraper, Silent};

#[derive(Parser)]
#[command(
    name = "farescan",
    about = "Enumerate low-cost airline fares over any date range",
    version,
    after_help = "\
Examples:
  farescan connections POZ
  farescan flights -f POZ -t ATH -s 2020-06-25 -e 2020-07-03
  farescan flights -f POZ -s 2020-06-25 -e 2020-06-28
  farescan flights -f POZ -s 2020-06-25 -e 2020-06-28 --json --pretty"
)]
struct Cli {
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase log verbosity (-v info, -vv debug, -vvv trace)"
    )]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    #[command(about = "List airports directly connected to an airport")]
    Connections(ConnectionsArgs),
    #[command(
        about = "List flights and fares over a date range",
        long_about = "List every flight and its adult, teen and child fares over a date range.\n\
            Without -t, all destinations reachable from the origin are searched.\n\
            Ranges longer than a week are split into week-sized requests automatically.",
        after_help = "\
Examples:
  Single route:     farescan flights -f POZ -t ATH -s 2020-06-25 -e 2020-07-03
  All destinations: farescan flights -f POZ -s 2020-06-25 -e 2020-06-28
  Parallel:         farescan flights -f POZ -s 2020-06-25 -e 2020-06-28 --concurrency 4
  JSON output:      farescan flights -f POZ -t ATH -s 2020-06-25 -e 2020-06-28 --json --pretty"
    )]
    Flights(FlightsArgs),
}

#[derive(clap::Args)]
struct UpstreamArgs {
    #[arg(
        long,
        default_value = "en-us",
        value_name = "MARKET",
        help = "Market used for the airport and route lookup"
    )]
    market: String,

    #[arg(
        long,
        default_value = "pl-pl",
        value_name = "LOCALE",
        help = "Locale segment for availability (selects fare currency)"
    )]
    locale: String,

    #[arg(long, value_name = "URL", help = "Override the upstream base URL")]
    base_url: Option<String>,

    #[arg(long, value_name = "URL", help = "HTTP or SOCKS5 proxy")]
    proxy: Option<String>,

    #[arg(long, default_value = "30", value_name = "SECS", help = "Request timeout")]
    timeout: u64,
}

impl UpstreamArgs {
    fn endpoints(&self) -> Endpoints {
        let mut endpoints = Endpoints {
            market: self.market.clone(),
            locale: self.locale.clone(),
            ..Endpoints::default()
        };
        if let Some(ref base_url) = self.base_url {
            endpoints.base_url = base_url.clone();
        }
        endpoints
    }

    fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            proxy: self.proxy.clone(),
            timeout: self.timeout,
        }
    }
}

#[derive(clap::Args)]
struct ConnectionsArgs {
    #[arg(value_name = "IATA", help = "Airport code (3 letters, e.g. POZ)")]
    airport: String,

    #[arg(long, help = "Output as JSON")]
    json: bool,

    #[arg(long, help = "Output as pretty-printed JSON")]
    pretty: bool,

    #[command(flatten)]
    upstream: UpstreamArgs,
}

#[derive(clap::Args)]
struct FlightsArgs {
    #[arg(short, long, value_name = "IATA", help = "Departure airport code")]
    from: String,

    #[arg(
        short,
        long,
        value_name = "IATA",
        help = "Arrival airport code (omit to search every connection)"
    )]
    to: Option<String>,

    #[arg(short, long, value_name = "YYYY-MM-DD", help = "First departure date")]
    start: String,

    #[arg(short, long, value_name = "YYYY-MM-DD", help = "Last departure date (inclusive)")]
    end: String,

    #[arg(
        long,
        default_value = "1",
        value_name = "N",
        help = "Destinations fetched at once when searching every connection"
    )]
    concurrency: usize,

    #[arg(
        long,
        value_name = "CODE",
        help = "Currency code used to label prices (defaults to the one reported upstream)"
    )]
    currency: Option<String>,

    #[arg(long, help = "One-line-per-flight output")]
    compact: bool,

    #[arg(long, help = "Output as JSON")]
    json: bool,

    #[arg(long, help = "Output as pretty-printed JSON")]
    pretty: bool,

    #[command(flatten)]
    upstream: UpstreamArgs,
}

struct StderrProgress;

impl Progress for StderrProgress {
    fn destination_done(&self, destination: &AirportCode, done: usize, total: usize) {
        eprintln!("Fetched {done} out of {total} possible airports ({destination})");
    }
}

fn error_code(err: &FlightError) -> i32 {
    match err.root() {
        FlightError::InvalidAirport(_)
        | FlightError::InvalidDate(_)
        | FlightError::Validation(_) => 2,
        FlightError::Timeout
        | FlightError::ConnectionFailed(_)
        | FlightError::DnsResolution(_)
        | FlightError::TlsError(_)
        | FlightError::ProxyError(_) => 3,
        FlightError::RateLimited | FlightError::Blocked(_) => 4,
        FlightError::HttpStatus(_) => 5,
        FlightError::Decode(_) | FlightError::Schema(_) | FlightError::Context { .. } => 6,
    }
}

fn error_reason(err: &FlightError) -> &'static str {
    match err.root() {
        FlightError::InvalidAirport(_) => "invalid_airport",
        FlightError::InvalidDate(_) => "invalid_date",
        FlightError::Validation(_) => "validation_error",
        FlightError::Timeout => "timeout",
        FlightError::ConnectionFailed(_) => "connection_failed",
        FlightError::DnsResolution(_) => "dns_error",
        FlightError::TlsError(_) => "tls_error",
        FlightError::ProxyError(_) => "proxy_error",
        FlightError::RateLimited => "rate_limited",
        FlightError::Blocked(_) => "blocked",
        FlightError::HttpStatus(_) => "http_error",
        FlightError::Decode(_) => "decode_error",
        FlightError::Schema(_) | FlightError::Context { .. } => "schema_error",
    }
}

fn die(err: &FlightError, json_mode: bool) -> ! {
    if json_mode {
        let json = serde_json::json!({
            "error": {
                "kind": err.kind(),
                "reason": error_reason(err),
                "message": err.to_string(),
            }
        });
        println!("{json}");
    } else {
        eprintln!("error: {err}");
    }
    process::exit(error_code(err));
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    println!("{}", output.expect("records serialize to JSON"));
}

fn print_flights(records: &[FlightRecord], args: &FlightsArgs) {
    let currency = args.currency.as_deref();
    if args.json || args.pretty {
        print_json(records, args.pretty);
    } else if records.is_empty() {
        println!("No flights found.");
    } else if args.compact {
        for record in records {
            println!("{}", table::format_compact(record, currency));
        }
    } else {
        println!("{}", table::render(records, currency));
    }
}

async fn run_connections(args: ConnectionsArgs) -> Result<(), FlightError> {
    let origin = query::parse_airport(&args.airport)?;
    let transport = HttpTransport::new(&args.upstream.fetch_options())?;
    let scraper = Scraper::new(transport, args.upstream.endpoints());

    let connections = scraper.discover_connections(&origin).await?;
    if args.json || args.pretty {
        print_json(&connections, args.pretty);
    } else if connections.is_empty() {
        println!("No connections found.");
    } else {
        println!("{}", table::render_connections(&connections));
    }
    Ok(())
}

async fn run_flights(args: FlightsArgs) -> Result<(), FlightError> {
    let origin = query::parse_airport(&args.from)?;
    let destination = args.to.as_deref().map(query::parse_airport).transpose()?;
    let range = DateRange::new(query::parse_date(&args.start)?, query::parse_date(&args.end)?)?;
    if args.concurrency == 0 {
        return Err(FlightError::Validation(
            "--concurrency must be at least 1".into(),
        ));
    }

    let transport = HttpTransport::new(&args.upstream.fetch_options())?;
    let scraper = Scraper::new(transport, args.upstream.endpoints());

    let records = match destination {
        Some(ref destination) => scraper.fetch_all_flights(&origin, destination, range).await?,
        None => {
            let progress: &dyn Progress = if args.json || args.pretty {
                &Silent
            } else {
                &StderrProgress
            };
            scraper
                .fetch_all_flights_from_airport(&origin, range, args.concurrency, progress)
                .await?
        }
    };

    print_flights(&records, &args);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Connections(args) => {
            let json_mode = args.json || args.pretty;
            if let Err(e) = run_connections(args).await {
                die(&e, json_mode);
            }
        }
        Commands::Flights(args) => {
            let json_mode = args.json || args.pretty;
            if let Err(e) = run_flights(args).await {
                die(&e, json_mode);
            }
        }
    }
}
