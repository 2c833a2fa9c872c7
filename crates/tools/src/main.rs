use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

use foundation::{ParcelKey, PlanarCoordinate};
use locator::{LocatorConfig, PageSnapshot, StaticPage};
use pipeline::{DEFAULT_BUFFER_M, ErrorKind, Orchestrator, PipelineError, SessionStore};
use services::{
    CapakeyClient, CoordinateResolver, DEFAULT_CAPAKEY_URL, DEFAULT_RISK_WFS_URL,
    RiskLocationClient,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Risk-location lookup for Flemish cadastral parcels"
)]
struct Args {
    /// Session record path (default: data/session.json, or PARCELRISK_SESSION)
    #[arg(long)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the parcel key from a page snapshot and resolve its center
    Extract {
        /// Page snapshot JSON describing the scrape-relevant elements
        #[arg(long)]
        page: PathBuf,
    },

    /// Resolve a parcel key to its grid center, without touching the session
    Resolve {
        #[arg(long)]
        key: String,
    },

    /// Query risk locations around the stored or given coordinate
    Query {
        /// Explicit center x (EPSG:31370 meters); defaults to the session
        #[arg(long, requires = "y")]
        x: Option<f64>,

        /// Explicit center y (EPSG:31370 meters); defaults to the session
        #[arg(long, requires = "x")]
        y: Option<f64>,

        /// Half-width of the search box in meters
        #[arg(long, default_value_t = DEFAULT_BUFFER_M)]
        buffer: f64,
    },

    /// Full pipeline: extract, resolve, persist, then query
    Run {
        #[arg(long)]
        page: PathBuf,

        #[arg(long, default_value_t = DEFAULT_BUFFER_M)]
        buffer: f64,
    },

    /// Print the stored session record
    Show,
}

struct AppConfig {
    capakey_url: String,
    risk_wfs_url: String,
    http_timeout: Duration,
    locator: LocatorConfig,
}

impl AppConfig {
    fn from_env() -> Self {
        let defaults = LocatorConfig::default();
        Self {
            capakey_url: env_var_str("CAPAKEY_URL", DEFAULT_CAPAKEY_URL),
            risk_wfs_url: env_var_str("RISK_WFS_URL", DEFAULT_RISK_WFS_URL),
            http_timeout: Duration::from_secs(env_var_u64("HTTP_TIMEOUT_SECS", 30)),
            locator: LocatorConfig {
                panel_timeout: env_duration_ms(
                    "LOCATOR_PANEL_TIMEOUT_MS",
                    defaults.panel_timeout,
                ),
                key_timeout: env_duration_ms("LOCATOR_KEY_TIMEOUT_MS", defaults.key_timeout),
                poll_interval: env_duration_ms("LOCATOR_POLL_MS", defaults.poll_interval),
                settle_delay: env_duration_ms("LOCATOR_SETTLE_MS", defaults.settle_delay),
                render_delay: env_duration_ms("LOCATOR_RENDER_MS", defaults.render_delay),
            },
        }
    }
}

fn env_var_str(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_var_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default: Duration) -> Duration {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(data) => {
            let envelope = json!({ "success": true, "data": data });
            println!("{}", to_pretty(&envelope));
        }
        Err(err) => {
            let envelope = json!({
                "success": false,
                "error": { "kind": err.kind, "message": err.message }
            });
            println!("{}", to_pretty(&envelope));
            std::process::exit(1);
        }
    }
}

fn to_pretty(v: &Value) -> String {
    serde_json::to_string_pretty(v).expect("serialize envelope")
}

async fn run(args: Args) -> Result<Value, PipelineError> {
    let config = AppConfig::from_env();

    let session_path = args
        .session
        .unwrap_or_else(|| PathBuf::from(env_var_str("PARCELRISK_SESSION", "data/session.json")));
    info!("session record at {session_path:?}");

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .expect("http client");

    let resolver = CapakeyClient::new(config.capakey_url.clone(), http.clone());
    let risk = RiskLocationClient::new(config.risk_wfs_url.clone(), http.clone());

    let orchestrator = Orchestrator::new(
        SessionStore::new(session_path),
        Box::new(resolver),
        Box::new(risk),
        config.locator,
    );

    match args.command {
        Command::Extract { page } => {
            let page = load_page(&page).await?;
            let extraction = orchestrator.extract_parcel(&page).await?;
            Ok(to_value(&extraction))
        }
        Command::Resolve { key } => {
            let key = ParcelKey::parse(&key).ok_or_else(|| {
                PipelineError::new(ErrorKind::Precondition, "parcel key must not be empty")
            })?;
            let resolver = CapakeyClient::new(config.capakey_url, http);
            let coordinate = resolver.resolve(&key).await?;
            Ok(json!({ "parcel_key": key, "coordinate": coordinate }))
        }
        Command::Query { x, y, buffer } => {
            let coordinate = match (x, y) {
                (Some(x), Some(y)) => Some(PlanarCoordinate::new(x, y)),
                _ => None,
            };
            let report = orchestrator.query_risk(coordinate, buffer).await?;
            Ok(to_value(&report))
        }
        Command::Run { page, buffer } => {
            let page = load_page(&page).await?;
            let full = orchestrator.run_full(&page, buffer).await?;
            Ok(to_value(&full))
        }
        Command::Show => {
            let state = orchestrator.session().await?;
            Ok(to_value(&state))
        }
    }
}

fn to_value<T: serde::Serialize>(data: &T) -> Value {
    serde_json::to_value(data).expect("serialize result")
}

async fn load_page(path: &PathBuf) -> Result<StaticPage, PipelineError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        PipelineError::new(
            ErrorKind::NotFound,
            format!("cannot read page snapshot {path:?}: {e}"),
        )
    })?;
    let snapshot: PageSnapshot = serde_json::from_str(&text).map_err(|e| {
        PipelineError::new(
            ErrorKind::NotFound,
            format!("page snapshot is not valid JSON: {e}"),
        )
    })?;
    Ok(StaticPage::new(snapshot))
}
