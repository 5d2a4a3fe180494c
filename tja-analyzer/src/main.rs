//! tja-analyzer - Traffic camera analysis service
//!
//! Polls every enabled traffic camera, asks a vision model to read the
//! snapshot, recovers a structured reading from whatever the model replied
//! and stores it with the camera's history.
//!
//! Default port: 5780

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tja_analyzer::db::{self, SqliteSourceRepository};
use tja_analyzer::scheduler::{PollingScheduler, SchedulerTimings, WorkerController};
use tja_analyzer::services::{
    AnalysisOrchestrator, DisabledVectorIndex, HttpImageFetcher, HttpVectorIndex, OllamaClient,
};
use tja_analyzer::types::{SourceAnalyzer, VectorIndex};
use tja_analyzer::{build_router, AppState};
use tja_common::config::TomlConfig;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const MODULE_NAME: &str = "tja-analyzer";

/// Command-line arguments for tja-analyzer
#[derive(Parser, Debug)]
#[command(name = "tja-analyzer")]
#[command(about = "Traffic camera analysis service")]
#[command(version)]
struct Args {
    /// Configuration file (overrides TJA_CONFIG and the default location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides configuration)
    #[arg(short, long)]
    port: Option<u16>,

    /// Leave the polling worker stopped until POST /worker/start
    #[arg(long)]
    no_autostart: bool,

    /// Camera image URL to register under the placeholder title (repeatable)
    #[arg(long = "register", value_name = "URL")]
    register: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        TomlConfig::load(args.config.as_deref(), MODULE_NAME).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "tja_analyzer={0},tja_common={0}",
                config.logging.level
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tja-analyzer (traffic camera analysis)");
    info!("Version: {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"));
    info!("Database: {}", config.database.path.display());

    let pool = db::init_database_pool(&config.database.path)
        .await
        .context("Failed to open database")?;
    let repository = Arc::new(SqliteSourceRepository::new(pool));

    for url in &args.register {
        let id = repository
            .register_source(url)
            .await
            .with_context(|| format!("Failed to register source {}", url))?;
        info!(source_id = id, url = %url, "Source registered");
    }

    let fetcher = Arc::new(HttpImageFetcher::new(config.images.timeout_secs)?);
    let model = Arc::new(OllamaClient::new(
        &config.ollama.base_url,
        &config.ollama.model,
        config.ollama.timeout_secs,
    )?);
    info!(url = %config.ollama.base_url, model = %model.model(), "Model client ready");

    let mut orchestrator = AnalysisOrchestrator::new(fetcher, model, &config.images.base_url);
    if config.scheduler.field_recovery {
        orchestrator = orchestrator.with_field_recovery();
    }
    let analyzer: Arc<dyn SourceAnalyzer> = Arc::new(orchestrator);

    let index: Arc<dyn VectorIndex> = match &config.vector_store.base_url {
        Some(url) => {
            info!(url = %url, "Vector store enabled");
            Arc::new(HttpVectorIndex::new(url, config.vector_store.timeout_secs)?)
        }
        None => {
            warn!("No vector store configured, similarity index updates disabled");
            Arc::new(DisabledVectorIndex)
        }
    };

    let scheduler = Arc::new(PollingScheduler::new(
        Arc::clone(&analyzer),
        repository,
        index,
        SchedulerTimings::from_config(&config.scheduler),
    ));
    let worker = Arc::new(WorkerController::new(scheduler));

    if config.scheduler.autostart && !args.no_autostart {
        worker.start().await;
    } else {
        info!("Worker autostart disabled");
    }

    let state = AppState::new(
        analyzer,
        Arc::clone(&worker),
        Duration::from_secs(config.scheduler.stale_after_secs),
    );
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    worker.stop().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
