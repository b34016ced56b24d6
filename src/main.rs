mod atmosphere;
mod config;
mod geo;
mod kml;
mod telemetry;
mod visibility;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand};
use log::{debug, error, info, LevelFilter};
use thiserror::Error;

use crate::config::{ConfigError, SiteConfig};
use crate::geo::{look_angle, GeoPosition};
use crate::kml::KmlOptions;
use crate::telemetry::TelemetryError;
use crate::visibility::{find_visible, SearchCriteria};

#[derive(Parser)]
#[command(name = "sonde-scout")]
#[command(about = "Radiosonde telemetry analysis")]
struct Cli {
    /// Verbose output (set logging level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find flights visible from an observation site within a time window
    Search(SearchArgs),
    /// Convert telemetry log files into a KML document
    Export(ExportArgs),
    /// Convert a descent rate measured at altitude to its sea-level equivalent
    DescentRate(DescentRateArgs),
    /// Print the look angle from an observation site to a target position
    Look(LookArgs),
}

/// Observation site, either from a YAML site file or from bare coordinates.
/// Explicit flags override the site file.
#[derive(Args)]
struct SiteArgs {
    /// Site definition file (YAML)
    #[arg(long)]
    site: Option<PathBuf>,

    /// Latitude of the observation site, in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude of the observation site, in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Altitude AMSL of the observation site, in metres
    #[arg(long, allow_negative_numbers = true)]
    alt: Option<f64>,
}

impl SiteArgs {
    fn resolve(&self) -> Result<GeoPosition, CliError> {
        let mut observer = match &self.site {
            Some(path) => {
                let site = SiteConfig::from_file(path)?;
                if let Some(name) = &site.name {
                    debug!("Using site {}", name);
                }
                site.observer()?
            }
            None => match (self.lat, self.lon) {
                (Some(lat), Some(lon)) => GeoPosition::new(lat, lon, 0.0),
                _ => return Err(CliError::MissingObserver),
            },
        };

        if let Some(lat) = self.lat {
            observer.latitude_deg = lat;
        }
        if let Some(lon) = self.lon {
            observer.longitude_deg = lon;
        }
        if let Some(alt) = self.alt {
            observer.altitude_m = alt;
        }
        Ok(observer)
    }
}

#[derive(Args)]
struct SearchArgs {
    /// Folder to read sonde summary data from
    #[arg(long, default_value = "summary_data")]
    folder: PathBuf,

    /// Write matching serial numbers to this file
    #[arg(long, default_value = "serial_matches.txt")]
    output: PathBuf,

    #[command(flatten)]
    site: SiteArgs,

    /// Elevation threshold to filter sondes, in degrees
    #[arg(long, default_value_t = -5.0, allow_negative_numbers = true)]
    min_el: f64,

    /// Time to search from (RFC 3339, e.g. 2024-04-08T19:00:15Z)
    #[arg(long, value_parser = parse_datetime)]
    datetime: DateTime<Utc>,

    /// Time window around the observation time, e.g. "4h" or "90m"
    #[arg(long, default_value = "4h", value_parser = parse_window)]
    window: Duration,
}

#[derive(Args)]
struct ExportArgs {
    /// Folder to read telemetry log files from
    #[arg(long, default_value = "telemetry")]
    folder: PathBuf,

    /// Write the KML document to this file
    #[arg(long, default_value = "outputs.kml")]
    output: PathBuf,

    /// Clamp tracks to the ground instead of using absolute altitudes
    #[arg(long)]
    clamp: bool,

    /// Skip the extruded curtain under each track
    #[arg(long)]
    no_extrude: bool,

    /// Only emit landing placemarks, no tracks
    #[arg(long)]
    last_only: bool,
}

#[derive(Args)]
struct DescentRateArgs {
    /// Descent rate measured at altitude, in m/s
    #[arg(long, allow_negative_numbers = true)]
    rate: f64,

    /// Altitude of the measurement, in metres AMSL
    #[arg(long, allow_negative_numbers = true)]
    altitude: f64,
}

#[derive(Args)]
struct LookArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// Target latitude, in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    target_lat: f64,

    /// Target longitude, in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    target_lon: f64,

    /// Target altitude, in metres AMSL
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    target_alt: f64,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("observer position required: pass --site or --lat/--lon")]
    MissingObserver,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();

    let result = match cli.command {
        Commands::Search(args) => search(args),
        Commands::Export(args) => export(args),
        Commands::DescentRate(args) => descent_rate(&args),
        Commands::Look(args) => look(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn search(args: SearchArgs) -> Result<(), CliError> {
    let observer = args.site.resolve()?;
    info!(
        "Observer position: ({}, {}, {} m), time: {}",
        observer.latitude_deg, observer.longitude_deg, observer.altitude_m, args.datetime
    );

    let files = telemetry::json_files(&args.folder)?;
    info!("Working on {} files.", files.len());

    let mut records = Vec::new();
    for file in &files {
        debug!("Testing file {}.", file.display());
        match telemetry::read_summary(file) {
            Ok(summary) => records.extend(summary),
            Err(e) => debug!("Skipping {}: {}", file.display(), e),
        }
    }

    let criteria = SearchCriteria {
        observer,
        observer_time: args.datetime,
        min_elevation_deg: args.min_el,
        window: args.window,
    };
    let matches = find_visible(&records, &criteria);
    info!("Found {} matching flights.", matches.len());

    info!("Writing serial list to {}", args.output.display());
    let mut serials = String::new();
    for serial in matches.keys() {
        serials.push_str(serial);
        serials.push('\n');
    }
    fs::write(&args.output, serials)?;

    Ok(())
}

fn export(args: ExportArgs) -> Result<(), CliError> {
    let files = telemetry::json_files(&args.folder)?;
    info!("Working on {} files.", files.len());

    let mut flights = Vec::new();
    for file in &files {
        debug!("Converting {} to KML.", file.display());
        match telemetry::read_flights(file) {
            Ok(parsed) => flights.extend(parsed),
            Err(e) => {
                error!("Failed to convert {}: {}", file.display(), e);
                // Continue with other files
            }
        }
    }

    let options = KmlOptions {
        absolute: !args.clamp,
        extrude: !args.no_extrude,
        last_only: args.last_only,
    };
    let file = fs::File::create(&args.output)?;
    kml::write_document(io::BufWriter::new(file), &flights, &options)?;
    info!("Wrote {} flights to {}", flights.len(), args.output.display());

    Ok(())
}

fn descent_rate(args: &DescentRateArgs) -> Result<(), CliError> {
    let density = atmosphere::density(args.altitude);
    let corrected = atmosphere::sea_level_descent_rate(args.rate, args.altitude);

    println!("Air density at {:.0} m: {:.4} kg/m^3", args.altitude, density);
    println!("Sea level descent rate: {:.2} m/s", corrected);
    Ok(())
}

fn look(args: &LookArgs) -> Result<(), CliError> {
    let observer = args.site.resolve()?;
    let target = GeoPosition::new(args.target_lat, args.target_lon, args.target_alt);
    let look = look_angle(observer, target);

    println!("Bearing:       {:.2} deg", look.bearing_deg);
    println!("Elevation:     {:.2} deg", look.elevation_deg);
    println!("Great circle:  {:.1} m", look.great_circle_m);
    println!("Straight line: {:.1} m", look.straight_line_m);
    Ok(())
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

fn parse_window(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
}
