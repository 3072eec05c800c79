//! PocketFlow node - personal finance tracker API server.

use clap::Parser;
use pocketflow_core::{CoreStore, TokenSigner};
use pocketflow_node::api::{create_router, AppState};
use pocketflow_node::config::Config;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// PocketFlow - personal finance tracker API
#[derive(Parser, Debug)]
#[command(name = "pocketflow-node")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API listen address
    #[arg(long)]
    listen_addr: Option<SocketAddr>,

    /// Secret key for signing session tokens
    #[arg(long)]
    token_secret: Option<String>,

    /// Session token lifetime in seconds
    #[arg(long)]
    token_ttl_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(listen_addr) = args.listen_addr {
        config.listen_addr = listen_addr;
    }
    if let Some(token_secret) = args.token_secret {
        config.token_secret = token_secret;
    }
    if let Some(token_ttl_secs) = args.token_ttl_secs {
        config.token_ttl_secs = token_ttl_secs;
    }
    if let Some(log_level) = args.log_level {
        config.log_level = log_level;
    }
    if args.log_json {
        config.log_json = true;
    }

    if config.token_secret.is_empty() {
        anyhow::bail!("token secret must be configured (--token-secret or config file)");
    }

    init_logging(&config.log_level, config.log_json);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_addr = %config.listen_addr,
        token_ttl_secs = config.token_ttl_secs,
        "Starting PocketFlow node"
    );

    let state = AppState {
        store: CoreStore::new(),
        signer: Arc::new(TokenSigner::new(
            config.token_secret.as_bytes().to_vec(),
            config.token_ttl_secs,
        )),
    };

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "API server listening");

    axum::serve(listener, router).await?;
    Ok(())
}

/// Initialize the logging system.
fn init_logging(level: &str, json_format: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("pocketflow={level},tower_http=debug,axum::rejection=trace").into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    if json_format {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
