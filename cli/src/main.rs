mod terminal;

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use planner::{
    ApiError, CaptureError, ControllerConfig, GoogleDirections, HttpTripApi, PanelLayout, PlannerConfig, RouteError,
    RouteOutcome, SearchOutcome, SkipReason, Submission, TripController,
};
use tracing::Level;
use trips::Waypoint;

use crate::terminal::{TerminalRenderer, UnsupportedSpeech};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing directions key; pass --maps-key or set GOOGLE_MAPS_API_KEY")]
    MissingMapsKey,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("health check failed: HTTP {0}")]
    Unhealthy(u16),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Speech(#[from] CaptureError),
    #[error("{0}")]
    NotPlanned(String),
    #[error("place search failed: {0}")]
    Search(String),
}

#[derive(Parser, Debug)]
#[command(name = "trip", about = "Trip planner CLI: voice commands, routes and places along the way")]
struct Cli {
    /// Planner backend; defaults to TRIP_API_BASE_URL or http://localhost:8000.
    #[arg(long)]
    base_url: Option<String>,

    /// Directions web-service key.
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    maps_key: Option<String>,

    /// Log debug output to stderr.
    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the backend is up.
    Health,
    /// Parse a trip command; with no words, try to listen instead.
    Voice {
        words: Vec<String>,
        /// Plan the parsed trip right away.
        #[arg(long, default_value_t = false)]
        plan: bool,
        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Plan a route and search along it.
    Plan {
        #[arg(long)]
        origin: String,
        #[arg(long)]
        destination: String,
        /// What to look for along the way.
        #[arg(long)]
        query: Option<String>,
        /// Stopover as `lat,lng,name[,place_id]`; repeatable.
        #[arg(long = "waypoint", value_parser = parse_waypoint)]
        waypoints: Vec<Waypoint>,
        #[arg(long, default_value_t = false)]
        optimize: bool,
        #[command(flatten)]
        display: DisplayArgs,
    },
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct DisplayArgs {
    #[arg(long, default_value_t = false)]
    traffic: bool,
    #[arg(long, value_enum, default_value_t = Layout::Sidebar)]
    layout: Layout,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Sidebar,
    Overlay,
    Stacked,
}

impl From<Layout> for PanelLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Sidebar => Self::Sidebar,
            Layout::Overlay => Self::Overlay,
            Layout::Stacked => Self::Stacked,
        }
    }
}

fn parse_waypoint(raw: &str) -> Result<Waypoint, String> {
    let mut parts = raw.splitn(4, ',').map(str::trim);
    let (Some(lat), Some(lng), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected lat,lng,name[,place_id], got `{raw}`"));
    };
    let lat: f64 = lat.parse().map_err(|_| format!("invalid latitude `{lat}`"))?;
    let lng: f64 = lng.parse().map_err(|_| format!("invalid longitude `{lng}`"))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("coordinates out of range: {lat},{lng}"));
    }
    if name.is_empty() {
        return Err("waypoint name is empty".to_owned());
    }
    let place_id = parts.next().filter(|id| !id.is_empty()).map(str::to_owned);
    Ok(Waypoint { lat, lng, name: name.to_owned(), place_id })
}

struct CliContext {
    config: PlannerConfig,
}

impl CliContext {
    fn from_cli(cli: &Cli) -> Self {
        let mut config = PlannerConfig::from_env();
        if let Some(base_url) = &cli.base_url {
            config.api_base_url = base_url.trim_end_matches('/').to_owned();
        }
        if let Some(key) = cli.maps_key.as_deref().filter(|k| !k.trim().is_empty()) {
            config.maps_api_key = Some(key.to_owned());
        }
        Self { config }
    }

    /// Controller wired to the terminal. Directions are only needed when a
    /// route will be planned.
    fn controller(&self, display: DisplayArgs, optimize: bool, needs_route: bool) -> Result<TripController, CliError> {
        let key = match self.config.maps_api_key.as_deref() {
            Some(key) => key,
            None if needs_route => return Err(CliError::MissingMapsKey),
            None => "",
        };
        let api = HttpTripApi::new(&self.config.api_base_url, self.config.timeouts)?;
        let routes = GoogleDirections::new(key, self.config.timeouts)?;
        let config = ControllerConfig {
            layout: display.layout.into(),
            traffic_layer: display.traffic,
            optimize_waypoints: optimize,
            ..ControllerConfig::from_planner(&self.config)
        };
        Ok(TripController::new(
            config,
            Arc::new(api),
            Arc::new(routes),
            Arc::new(UnsupportedSpeech),
            Arc::new(TerminalRenderer::stdout()),
        ))
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();
    let ctx = CliContext::from_cli(&cli);

    match cli.command {
        Command::Health => run_health(&ctx).await,
        Command::Voice { words, plan, display } => run_voice(&ctx, &words.join(" "), plan, display).await,
        Command::Plan { origin, destination, query, waypoints, optimize, display } => {
            let controller = ctx.controller(display, optimize, true)?;
            controller.set_origin(&origin);
            controller.set_destination(&destination);
            controller.set_semantic_query(query.as_deref().unwrap_or_default());
            for waypoint in waypoints {
                controller.add_waypoint(waypoint);
            }
            run_trip(&controller).await
        }
    }
}

async fn run_health(ctx: &CliContext) -> Result<(), CliError> {
    let url = format!("{}/healthz", ctx.config.api_base_url);
    let status = reqwest::get(url).await?.status();
    if !status.is_success() {
        return Err(CliError::Unhealthy(status.as_u16()));
    }
    println!("ok");
    Ok(())
}

async fn run_voice(ctx: &CliContext, command: &str, plan: bool, display: DisplayArgs) -> Result<(), CliError> {
    let controller = ctx.controller(display, false, plan)?;
    let submission = if command.trim().is_empty() { controller.listen().await? } else { controller.submit_text(command).await };

    match &submission {
        Submission::Parsed { .. } => {
            let form = controller.form();
            println!("origin:      {}", form.origin);
            println!("destination: {}", form.destination);
            println!("looking for: {}", form.semantic_query);
            if let Some(notice) = controller.status().resolution {
                for line in notice.lines() {
                    println!("  {line}");
                }
            }
        }
        Submission::Unparsed { utterance, error } => {
            eprintln!("could not parse command ({error}); searching for \"{utterance}\"");
        }
        Submission::Skipped(SkipReason::Empty) => {
            println!("nothing to parse");
            return Ok(());
        }
        Submission::Skipped(SkipReason::InFlight) => return Ok(()),
    }

    if plan { run_trip(&controller).await } else { Ok(()) }
}

/// Plan the controller's current form and report what happened.
async fn run_trip(controller: &TripController) -> Result<(), CliError> {
    let (route, search) = controller.plan_trip().await;
    match route? {
        RouteOutcome::Planned(_) => {}
        RouteOutcome::NotAttempted => {
            let prompt = controller.status().prompt.unwrap_or_default();
            return Err(CliError::NotPlanned(prompt));
        }
    }
    match search {
        Some(SearchOutcome::Failed(message)) => Err(CliError::Search(message)),
        Some(SearchOutcome::RouteTimedOut) => {
            eprintln!("route was not ready in time; search dropped");
            Ok(())
        }
        Some(SearchOutcome::Shown(_) | SearchOutcome::Superseded | SearchOutcome::Skipped) | None => Ok(()),
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
