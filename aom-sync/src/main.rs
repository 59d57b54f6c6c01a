//! aom-sync: refreshes local state of AOM CMDB applications.
//!
//! - `read <id>` fetches one application and prints its state
//! - `refresh --state <file>` refreshes every application in a state file,
//!   dropping the ones that no longer exist

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tabled::{Table, Tabled};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aom_sync::{
    Application, ClientConfig, HttpClient, ReadOutcome, RemoteResource, ResourceReader,
    ResourceState, StateFile, StoredResource, refresh_all,
};

/// AOM application state sync
#[derive(Parser, Debug)]
#[command(name = "aom-sync", version, about)]
struct Args {
    /// Region of the AOM service (e.g., cn-north-4)
    #[arg(long)]
    region: String,

    /// Project ID the applications belong to
    #[arg(long)]
    project_id: String,

    /// IAM token sent as X-Auth-Token
    #[arg(long)]
    token: Option<String>,

    /// Service endpoint override (e.g., http://127.0.0.1:8080)
    #[arg(long)]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read one application
    Read {
        /// Application ID
        id: String,

        /// Print a table instead of JSON
        #[arg(long)]
        table: bool,

        /// Merge the result into this state file
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Refresh every application in a state file
    Refresh {
        /// State file to refresh in place
        #[arg(long)]
        state: PathBuf,

        /// Maximum reads in flight
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "FIELD")]
    field: &'static str,
    #[tabled(rename = "VALUE")]
    value: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aom_sync=info,reqwest=warn,hyper=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = ClientConfig::new(args.region, args.project_id)
        .with_timeout(Duration::from_secs(args.timeout));
    if let Some(token) = args.token {
        config = config.with_token(token);
    }
    if let Some(endpoint) = args.endpoint {
        config = config.with_endpoint(endpoint);
    }
    let client = HttpClient::new(config).context("Invalid client configuration")?;
    let reader = ResourceReader::new(client);

    match args.command {
        Commands::Read { id, table, state } => read(&reader, &id, table, state).await,
        Commands::Refresh { state, concurrency } => refresh(&reader, state, concurrency).await,
    }
}

async fn read(
    reader: &ResourceReader<HttpClient>,
    id: &str,
    table: bool,
    state_path: Option<PathBuf>,
) -> Result<()> {
    let (state, outcome) = match state_path {
        Some(path) => {
            let merged = StateFile::new(path)
                .merge_read::<Application, _>(reader, id)
                .await
                .context("Failed to update state")?;
            (merged.state, merged.outcome)
        }
        None => {
            let mut state = ResourceState::new(Application::schema(), id);
            let outcome = reader.refresh::<Application>(&mut state).await;
            (state, outcome)
        }
    };

    match outcome? {
        ReadOutcome::Present => print_state(&state, table),
        ReadOutcome::Absent => {
            warn!(id, "Application no longer exists");
            Ok(())
        }
    }
}

async fn refresh(
    reader: &ResourceReader<HttpClient>,
    path: PathBuf,
    concurrency: usize,
) -> Result<()> {
    let file = StateFile::new(path);
    let mut states = file
        .load(&Application::schema())
        .await
        .context("Failed to load state")?;
    info!(
        "Refreshing {} applications from {}",
        states.len(),
        file.path().display()
    );

    let report = refresh_all::<Application, _>(reader, &mut states, concurrency).await;
    file.save(&states).await.context("Failed to save state")?;

    for id in &report.removed {
        warn!(id = %id, "Application removed from state");
    }
    for e in &report.failed {
        error!(id = e.id(), "{}", e);
    }
    println!(
        "refreshed: {}, removed: {}, failed: {}",
        report.refreshed.len(),
        report.removed.len(),
        report.failed.len()
    );

    if !report.is_success() {
        bail!("{} application(s) failed to refresh", report.failed.len());
    }
    Ok(())
}

fn print_state(state: &ResourceState, table: bool) -> Result<()> {
    if table {
        let rows: Vec<FieldRow> = state
            .values()
            .map(|(field, value)| FieldRow {
                field,
                value: match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            })
            .collect();
        println!("{}", Table::new(rows));
        return Ok(());
    }

    if let Some(stored) = StoredResource::from_state(state) {
        println!("{}", serde_json::to_string_pretty(&stored)?);
    }
    Ok(())
}
