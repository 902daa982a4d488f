#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Headless event map.
//!
//! Loads one spreadsheet source once, applies the category and search
//! filters given on the command line, and prints what the map UI would
//! show: the list panel, the aggregated markers, the records under one
//! marker, or the category buttons.

mod render;

use clap::{Args, Parser, Subcommand};
use event_map_source::pipeline::{LoadResult, load};
use event_map_source::registry::{all_sources, find_source};
use event_map_view::panel::{bounds, records_near};
use event_map_view::state::AppState;

/// Overrides the values API key of every source.
const API_KEY_ENV: &str = "EVENT_MAP_SHEETS_API_KEY";

/// Source used when `--source` is not given.
const DEFAULT_SOURCE: &str = "reitaku_festival_2025";

#[derive(Parser)]
#[command(name = "event_map", about = "Spreadsheet-backed event map")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all configured spreadsheet sources
    Sources,
    /// Print the filtered, sorted list panel
    List(ViewArgs),
    /// Print one aggregated marker per coordinate, or the records under one
    Markers(MarkerArgs),
    /// Print the category filter buttons
    Categories {
        #[command(flatten)]
        source: SourceArgs,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the known category colors
    Palette,
}

#[derive(Args)]
struct SourceArgs {
    /// Source identifier (e.g., "`reitaku_festival_2025`")
    #[arg(long, default_value = DEFAULT_SOURCE)]
    source: String,
}

#[derive(Args)]
struct ViewArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Only show records of this category
    #[arg(long)]
    category: Option<String>,
    /// Case-insensitive text matched against title, location and explanation
    #[arg(long)]
    search: Option<String>,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct MarkerArgs {
    #[command(flatten)]
    view: ViewArgs,
    /// Show the records at this marker position ("LAT,LON")
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    at: Option<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    lat: f64,
    lon: f64,
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {s:?}"))?;
    let lat = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude {lat:?}: {e}"))?;
    let lon = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude {lon:?}: {e}"))?;
    Ok(Point { lat, lon })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Sources => {
            let sources = all_sources();
            println!("{:<28} NAME", "ID");
            println!("{}", "-".repeat(60));
            for source in &sources {
                println!("{:<28} {}", source.id(), source.name());
            }
        }
        Commands::Palette => render::print_palette(),
        Commands::List(args) => {
            let state = load_state(&args).await?;
            let derived = state.derive();
            if args.json {
                let records = serde_json::to_value(&derived.view)?;
                println!(
                    "{}",
                    render::json_envelope(state.signal(), vec![("records", records)])?
                );
            } else {
                render::print_banner(state.signal());
                render::print_list(&derived.view);
            }
        }
        Commands::Markers(args) => {
            let state = load_state(&args.view).await?;
            let derived = state.derive();

            if let Some(point) = args.at {
                let near = records_near(&derived.view, point.lat, point.lon);
                if args.view.json {
                    let records = serde_json::to_value(&near)?;
                    println!(
                        "{}",
                        render::json_envelope(state.signal(), vec![("records", records)])?
                    );
                } else {
                    render::print_banner(state.signal());
                    render::print_marker_records(&near);
                }
            } else if args.view.json {
                let markers = serde_json::to_value(&derived.markers)?;
                let bounds = serde_json::to_value(bounds(&derived.view))?;
                println!(
                    "{}",
                    render::json_envelope(
                        state.signal(),
                        vec![("markers", markers), ("bounds", bounds)]
                    )?
                );
            } else {
                render::print_banner(state.signal());
                render::print_markers(&derived.markers, bounds(&derived.view));
            }
        }
        Commands::Categories { source, json } => {
            let result = load_source(&source.source).await?;
            let state = AppState::new(result.records, result.signal);
            let buttons = state.category_buttons();
            if json {
                let categories = serde_json::to_value(&buttons)?;
                println!(
                    "{}",
                    render::json_envelope(state.signal(), vec![("categories", categories)])?
                );
            } else {
                render::print_banner(state.signal());
                render::print_categories(&buttons);
            }
        }
    }

    Ok(())
}

/// Loads the source and applies the command-line filters.
async fn load_state(args: &ViewArgs) -> Result<AppState, Box<dyn std::error::Error>> {
    let result = load_source(&args.source.source).await?;
    let mut state = AppState::new(result.records, result.signal);

    if let Some(category) = &args.category {
        state.toggle_category(category);
    }
    if let Some(search) = &args.search {
        state.set_search(search);
    }

    Ok(state)
}

/// Fetches and normalizes one configured source.
///
/// Fetch failures are not errors here; they come back as a
/// [`event_map_record_models::LoadSignal`] on the result.
async fn load_source(id: &str) -> Result<LoadResult, Box<dyn std::error::Error>> {
    let Some(mut source) = find_source(id) else {
        return Err(format!("Unknown source: {id}").into());
    };

    if let Some(key) = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()) {
        log::debug!("Using values API key from {API_KEY_ENV}");
        source = source.with_api_key(Some(key));
    }

    log::info!("Loading {} ({})", source.name(), source.id());
    let client = reqwest::Client::new();
    let fetcher = source.fetcher(&client);
    let result = load(&fetcher, &source.fields).await;

    log::info!(
        "{}: {} records from {} rows via {}",
        result.signal,
        result.records.len(),
        result.raw_count,
        result.method.unwrap_or("nothing")
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_marker_position() {
        assert_eq!(
            parse_point("35.8, -139.9").unwrap(),
            Point {
                lat: 35.8,
                lon: -139.9
            }
        );
    }

    #[test]
    fn rejects_malformed_marker_position() {
        assert!(parse_point("35.8").is_err());
        assert!(parse_point("north,139.9").is_err());
    }

    #[test]
    fn markers_accepts_negative_position() {
        let cli = Cli::try_parse_from(["event_map", "markers", "--at", "-35.8,139.9", "--json"])
            .unwrap();
        match cli.command {
            Commands::Markers(args) => {
                assert_eq!(
                    args.at,
                    Some(Point {
                        lat: -35.8,
                        lon: 139.9
                    })
                );
                assert!(args.view.json);
                assert_eq!(args.view.source.source, DEFAULT_SOURCE);
            }
            _ => panic!("expected markers"),
        }
    }
}
