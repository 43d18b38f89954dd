use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use satplan_core::{
    load_config, validate_config, Config, ElementRecordStore, HttpFetcher, IngestScheduler,
    IngestionEngine, LogFormat, NewSource, SatelliteCatalog, SourceStore, SqliteRecordStore,
    SqliteSatelliteCatalog, SqliteSourceStore,
};
use satplan_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Determine config path
    let config_path = std::env::var("SATPLAN_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration before logging so the format can be chosen
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path));
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            init_logging(LogFormat::Pretty);
            return Err(e);
        }
    };
    init_logging(config.logging.format);

    info!("Loaded configuration from {:?}", config_path);
    validate_config(&config).context("Configuration validation failed")?;
    info!("Database path: {:?}", config.database.path);

    // Stores share one database file, each on its own connection
    let sources: Arc<dyn SourceStore> = Arc::new(
        SqliteSourceStore::new(&config.database.path).context("Failed to create source store")?,
    );
    let catalog: Arc<dyn SatelliteCatalog> = Arc::new(
        SqliteSatelliteCatalog::new(&config.database.path)
            .context("Failed to create satellite catalog")?,
    );
    let records: Arc<dyn ElementRecordStore> = Arc::new(
        SqliteRecordStore::new(&config.database.path).context("Failed to create record store")?,
    );
    info!("Stores initialized");

    seed_sources(&config, sources.as_ref())?;

    let fetch_timeout = Duration::from_secs(config.ingest.fetch_timeout_secs);
    let fetcher = HttpFetcher::new(fetch_timeout).context("Failed to create HTTP fetcher")?;
    let engine = Arc::new(
        IngestionEngine::new(
            Arc::clone(&sources),
            Arc::clone(&catalog),
            Arc::clone(&records),
            Arc::new(fetcher),
        )
        .with_fetch_timeout(fetch_timeout),
    );

    let scheduler = IngestScheduler::new(Arc::clone(&engine))
        .run_on_startup(config.ingest.run_on_startup)
        .every(
            config
                .ingest
                .interval_minutes
                .map(|m| Duration::from_secs(m.saturating_mul(60))),
        );
    let ingest_task = if scheduler.is_active() {
        Some(scheduler.start())
    } else {
        info!("Background TLE ingestion disabled");
        None
    };

    let state = Arc::new(AppState::new(
        config.clone(),
        engine,
        sources,
        catalog,
        records,
    ));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    if let Some(task) = ingest_task {
        task.abort();
    }

    Ok(())
}

fn init_logging(format: LogFormat) {
    let fmt_layer = match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(fmt_layer)
        .init();
}

/// Register configured sources that are not in the store yet.
fn seed_sources(config: &Config, sources: &dyn SourceStore) -> Result<()> {
    for seed in &config.sources {
        if sources
            .find_by_url(&seed.url)
            .context("Failed to look up TLE source")?
            .is_some()
        {
            continue;
        }
        let added = sources
            .add(&NewSource {
                label: seed.label.clone(),
                url: seed.url.clone(),
                description: seed.description.clone(),
            })
            .context("Failed to seed TLE source")?;
        info!(label = %added.label, url = %added.url, "Seeded TLE source");
    }

    match sources.list_all() {
        Ok(list) if list.is_empty() => warn!("No TLE sources configured; ingestion will fail"),
        Ok(list) => info!(count = list.len(), "TLE sources available"),
        Err(e) => warn!(error = %e, "Failed to list TLE sources"),
    }
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
