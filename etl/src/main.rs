use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use weather_etl::config::{self, redact};
use weather_etl::metrics;
use weather_etl::{
    extract, reshape, run_pipeline, Connections, EtlConfig, OpenMeteoClient, PgWeatherSink,
    RawWeatherResponse, WeatherRecord, WeatherSink,
};

#[derive(Debug, Parser)]
#[command(name = "weather-etl", version, about = "Current weather ETL into Postgres")]
struct Cli {
    #[command(flatten)]
    target: TargetArgs,

    /// Write Prometheus text metrics here after the command finishes.
    #[arg(long, global = true)]
    metrics_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct TargetArgs {
    #[arg(long, global = true, default_value_t = config::DEFAULT_LATITUDE, allow_negative_numbers = true)]
    latitude: f64,

    #[arg(long, global = true, default_value_t = config::DEFAULT_LONGITUDE, allow_negative_numbers = true)]
    longitude: f64,

    /// Named connection of the weather API.
    #[arg(long, global = true, env = "ETL_API_CONN_ID", default_value = config::DEFAULT_API_CONN_ID)]
    api_conn_id: String,

    /// Named connection of the destination database.
    #[arg(long, global = true, env = "ETL_POSTGRES_CONN_ID", default_value = config::DEFAULT_POSTGRES_CONN_ID)]
    postgres_conn_id: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch, reshape and persist in one go.
    Run,
    /// Fetch the raw API document and print it as JSON.
    Extract,
    /// Reshape a raw document (stdin or --input) into a record.
    Transform {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Persist a record (stdin or --input) and print the new row id.
    Load {
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

impl From<TargetArgs> for EtlConfig {
    fn from(args: TargetArgs) -> Self {
        Self {
            latitude: args.latitude,
            longitude: args.longitude,
            api_conn_id: args.api_conn_id,
            postgres_conn_id: args.postgres_conn_id,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries stage output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    metrics::init_metrics();

    let metrics_file = cli.metrics_file.clone();
    let outcome = execute(cli).await;

    if let Some(path) = metrics_file {
        if let Err(e) = metrics::write_metrics_file(&path) {
            error!("Failed to write metrics to {}: {}", path.display(), e);
        }
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("weather-etl failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = EtlConfig::from(cli.target);
    config.validate()?;
    let connections = Connections::default();

    match cli.command {
        Command::Run => {
            let source = source(&connections, &config)?;
            let sink = sink(&connections, &config)?;

            let outcome = run_pipeline(&config, &source, &sink).await;
            sink.close().await;

            let report = outcome?;
            info!("Run {} stored weather row {}", report.run_id, report.row_id);
        }
        Command::Extract => {
            let source = source(&connections, &config)?;
            let raw = extract(&config, &source).await?;
            write_json(&raw)?;
        }
        Command::Transform { input } => {
            let raw: RawWeatherResponse = read_json(input)?;
            let record = reshape(&raw, &config)?;
            write_json(&record)?;
        }
        Command::Load { input } => {
            let record: WeatherRecord = read_json(input)?;
            let sink = sink(&connections, &config)?;

            let outcome = sink.persist(&record).await;
            sink.close().await;

            let row_id = outcome?;
            info!("Stored weather row {}", row_id);
            println!("{}", row_id);
        }
    }

    Ok(())
}

fn source(connections: &Connections, config: &EtlConfig) -> anyhow::Result<OpenMeteoClient> {
    let base_url = connections.api_base_url(config)?;
    info!("Weather API: {} ({})", base_url, config.api_conn_id);
    Ok(OpenMeteoClient::new(base_url))
}

/// The pool connects when the first record is persisted, after fetch and reshape.
fn sink(connections: &Connections, config: &EtlConfig) -> anyhow::Result<PgWeatherSink> {
    let database_url = connections.database_url(config)?;
    info!(
        "Database: {} ({})",
        redact(&database_url),
        config.postgres_conn_id
    );
    Ok(PgWeatherSink::connect_lazy(&database_url)?)
}

fn read_json<T: serde::de::DeserializeOwned>(input: Option<PathBuf>) -> anyhow::Result<T> {
    let text = match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    serde_json::from_str(&text).context("Failed to parse JSON input")
}

fn write_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
