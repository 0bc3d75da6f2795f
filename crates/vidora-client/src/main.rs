//! Vidora command-line client.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vidora_cache::{SweepScheduler, register_cache_metrics};
use vidora_client::{ClientSettings, Params, RequestClient, RequestOptions};

/// Query the Vidora API through the response cache
#[derive(Parser, Debug)]
#[command(name = "vidora")]
#[command(about = "Query the Vidora API through the response cache")]
#[command(version)]
struct Cli {
    /// Settings file (TOML, YAML or JSON)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Overrides the configured base URL
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Bearer token for authenticated endpoints
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cached read
    Get {
        endpoint: String,
        /// Query parameter, repeatable
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// TTL for the cached response
        #[arg(long)]
        ttl_ms: Option<u64>,
        /// Skip the cache
        #[arg(long)]
        no_cache: bool,
        /// Issue the same read several times
        #[arg(long, default_value_t = 1)]
        repeat: u32,
    },
    /// Uncached POST
    Post {
        endpoint: String,
        /// JSON body
        #[arg(long)]
        data: Option<String>,
    },
    /// Uncached PUT
    Put {
        endpoint: String,
        /// JSON body
        #[arg(long)]
        data: Option<String>,
    },
    /// Uncached DELETE
    Delete { endpoint: String },
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

fn parse_body(data: Option<&str>) -> anyhow::Result<Value> {
    match data {
        Some(raw) => serde_json::from_str(raw).context("--data must be valid JSON"),
        None => Ok(Value::Object(Default::default())),
    }
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(client: &RequestClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Get {
            endpoint,
            params,
            ttl_ms,
            no_cache,
            repeat,
        } => {
            let params: Params = params.into_iter().collect();
            let mut options = RequestOptions::default();
            if no_cache {
                options = options.no_cache();
            }
            if let Some(ms) = ttl_ms {
                options = options.ttl(Duration::from_millis(ms));
            }

            for _ in 0..repeat.max(1) {
                let body = client.get(&endpoint, &params, &options).await?;
                print_json(&body)?;
            }
        },
        Command::Post { endpoint, data } => {
            let body = parse_body(data.as_deref())?;
            print_json(&client.post(&endpoint, &body, &RequestOptions::default()).await?)?;
        },
        Command::Put { endpoint, data } => {
            let body = parse_body(data.as_deref())?;
            print_json(&client.put(&endpoint, &body, &RequestOptions::default()).await?)?;
        },
        Command::Delete { endpoint } => {
            print_json(&client.delete(&endpoint, &RequestOptions::default()).await?)?;
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut settings = ClientSettings::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        settings = settings.with_base_url(base_url).validated()?;
    }
    if let Some(token) = cli.token {
        settings = settings.with_token(token);
    }

    tracing::info!("Vidora client v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Base URL: {}", settings.base_url());

    register_cache_metrics();
    let client = Arc::new(RequestClient::from_settings(&settings)?);
    let sweeper = SweepScheduler::new(client.cache().clone(), settings.sweep_config()).start();

    let result = run(&client, cli.command).await;

    sweeper.shutdown().await;

    let metrics = client.cache().metrics();
    tracing::info!(
        hits = metrics.hits(),
        misses = metrics.misses(),
        hit_rate = metrics.hit_rate(),
        "Cache summary"
    );

    result
}
