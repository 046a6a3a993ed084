//! Foodgram API server and maintenance CLI entry point.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use foodgram_api::config::Config;
use foodgram_api::error::AppError;
use foodgram_api::state::AppState;
use foodgram_api::telemetry;
use foodgram_core::clock::SystemClock;
use foodgram_core::error::DomainError;
use foodgram_recipes::application::command_handlers::handle_import_ingredients;
use foodgram_recipes::domain::commands::ImportIngredients;
use foodgram_recipes::domain::import::IngredientFileFormat;
use foodgram_store::fs_image_store::FsImageStore;
use foodgram_store::pg_store::PgStore;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use uuid::Uuid;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Foodgram recipe backend.
#[derive(Parser)]
#[command(name = "foodgram-api", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Apply pending database migrations
    Migrate,
    /// Load ingredients from a CSV (`name,unit`) or JSON file
    ImportIngredients {
        /// Path to the ingredient file; `.json` selects the JSON layout
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let telemetry = telemetry::init(config.log_format, config.otel_endpoint.as_deref())?;

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Migrate => migrate(&config).await,
        Command::ImportIngredients { path } => import_ingredients(&config, &path).await,
    };
    if let Err(e) = &result {
        error!(error = %e, "command failed");
    }

    telemetry.shutdown();
    result
}

async fn connect(config: &Config) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

async fn migrate(config: &Config) -> Result<(), AppError> {
    let pool = connect(config).await?;
    MIGRATOR.run(&pool).await?;
    info!("migrations applied");
    Ok(())
}

async fn serve(config: &Config) -> Result<(), AppError> {
    info!("Starting Foodgram API server");

    let pool = connect(config).await?;
    MIGRATOR.run(&pool).await?;
    tokio::fs::create_dir_all(&config.media_root).await?;

    let state = AppState::new(
        Arc::new(PgStore::new(pool)),
        Arc::new(FsImageStore::new(config.media_root.clone(), &config.public_url)),
        Arc::new(SystemClock),
        config.favorited_cache_ttl,
        config.api_settings(),
    );
    let app = foodgram_api::app(state, &config.media_root);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for the shutdown signal");
    }
}

async fn import_ingredients(config: &Config, path: &Path) -> Result<(), AppError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        DomainError::Infrastructure(format!("failed to read {}: {e}", path.display()))
    })?;
    let pool = connect(config).await?;
    let store = PgStore::new(pool);

    let command = ImportIngredients {
        correlation_id: Uuid::new_v4(),
        format: IngredientFileFormat::from_path(path),
        content,
    };
    let inserted = handle_import_ingredients(&command, &store).await?;
    info!(inserted, path = %path.display(), "ingredients imported");
    Ok(())
}
