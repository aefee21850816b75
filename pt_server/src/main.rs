//! Tournament server binary.
//!
//! Serves the registration and pool-assignment API over HTTP, backed by
//! PostgreSQL (or the in-memory repository with `--memory`).

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use ctrlc::set_handler;
use pico_args::Arguments;
use tracing::info;

use poomsae_tournament::TournamentManager;
use poomsae_tournament::db::{
    Database, MemoryRepository, PgTournamentRepository, TournamentRepository,
};
use pt_server::{api, config::ServerConfig, logging, metrics};

const HELP: &str = "\
Run the tournament registration and pool assignment server

USAGE:
  pt_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:7788]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --memory                 Run on in-memory storage (no database needed)

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  METRICS_BIND             Prometheus exporter bind address (unset = disabled)
  STORAGE                  Set to 'memory' to run without PostgreSQL
  RUST_LOG                 Log filter (e.g., debug)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url_override: Option<String> = pargs.opt_value_from_str("--db-url")?;
    let memory_override = pargs.contains("--memory");

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, database_url_override, memory_override)?;
    info!("Starting tournament server at {}", config.bind);

    let (repo, database): (Arc<dyn TournamentRepository>, Option<Arc<Database>>) =
        if config.use_memory {
            info!("Using in-memory storage");
            (Arc::new(MemoryRepository::new()), None)
        } else {
            info!("Connecting to database: {}", config.database.database_url);
            let database = Database::new(&config.database)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {e}"))?;
            info!("Database connected successfully");
            let repo = PgTournamentRepository::new(database.pool().clone());
            (Arc::new(repo), Some(Arc::new(database)))
        };

    let manager = Arc::new(TournamentManager::new(repo));

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(Error::msg)?;
        info!("Prometheus metrics exported at http://{addr}/metrics");
    }

    let state = api::AppState { manager, database };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {e}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {e}"))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
