use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::error;
use tracing_subscriber::EnvFilter;

use tacna_navigator::admin::RouteForm;
use tacna_navigator::config::NavigatorConfig;
use tacna_navigator::defaults::default_congestion;
use tacna_navigator::gemini::GeminiClient;
use tacna_navigator::haversine::HaversineEstimator;
use tacna_navigator::model::RouteCoordinate;
use tacna_navigator::navigator::{MapPathSource, Navigator};
use tacna_navigator::osrm::OsrmClient;
use tacna_navigator::response::PathSource;
use tacna_navigator::storage::FileStorage;
use tacna_navigator::traits::{DirectionsProvider, PathSuggester, RouteStorage};

#[derive(Debug, Parser)]
#[command(name = "tacna-navigator", version, about = "AI-assisted route suggestions for Tacna")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage admin routes.
    Routes {
        #[command(subcommand)]
        action: RoutesAction,
    },
    /// Suggest a route between two points.
    Suggest {
        /// Origin as "lat,lng".
        #[arg(long, allow_hyphen_values = true)]
        origin: RouteCoordinate,
        /// Destination as "lat,lng".
        #[arg(long, allow_hyphen_values = true)]
        destination: RouteCoordinate,
    },
}

#[derive(Debug, Subcommand)]
enum RoutesAction {
    List,
    /// Toggle a route between open and blocked, then save.
    Toggle { id: String },
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        /// "lat,lng; lat,lng; ..."
        #[arg(long, allow_hyphen_values = true)]
        coordinates: String,
    },
    Remove { id: String },
    /// Restore the default routes.
    Reset,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = NavigatorConfig::from_env();
    let storage = FileStorage::new(&config.storage_dir);
    let suggester = GeminiClient::new(config.gemini.clone())?;
    let directions = OsrmClient::new(config.osrm.clone())?;
    let mut navigator = Navigator::new(storage, suggester, directions, default_congestion())
        .with_estimator(HaversineEstimator::new(config.speed_kmh));
    navigator.load_routes();

    match cli.command {
        Command::Routes { action } => match action {
            RoutesAction::List => {}
            RoutesAction::Toggle { id } => {
                if !navigator.toggle_route(&id) {
                    return Err(format!("unknown route {:?}", id).into());
                }
                navigator.save_routes()?;
            }
            RoutesAction::Add {
                id,
                name,
                description,
                coordinates,
            } => {
                let form = RouteForm {
                    id,
                    name,
                    path_description: description,
                    coordinates,
                };
                navigator.add_route(form.validate()?)?;
            }
            RoutesAction::Remove { id } => {
                if navigator.remove_route(&id).is_none() {
                    return Err(format!("unknown route {:?}", id).into());
                }
            }
            RoutesAction::Reset => navigator.reset_routes(),
        },
        Command::Suggest {
            origin,
            destination,
        } => {
            navigator.set_origin(Some(origin));
            navigator.set_destination(Some(destination));
            let shown = navigator.generate_path()?;
            let output = json!({
                "description": shown.conceptual.description,
                "reasoning": shown.conceptual.reasoning,
                "fallback": shown.conceptual_source != PathSource::Suggested,
                "routed": shown.map_source == MapPathSource::Directions,
                "summary": shown.summary,
                "waypoints": shown.conceptual.coordinates,
                "path": shown.map_path,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            print_notices(&mut navigator);
            return Ok(());
        }
    }

    println!("{}", serde_json::to_string_pretty(navigator.routes())?);
    print_notices(&mut navigator);
    Ok(())
}

fn print_notices<S, A, D>(navigator: &mut Navigator<S, A, D>)
where
    S: RouteStorage,
    A: PathSuggester,
    D: DirectionsProvider,
{
    for notice in navigator.take_notices() {
        eprintln!("[{:?}] {}: {}", notice.level, notice.title, notice.message);
    }
}
