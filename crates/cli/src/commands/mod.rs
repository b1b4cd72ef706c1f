//! CLI command implementations.

pub mod import;
pub mod migrate;
pub mod users;

use foodgram_api::config::{ApiConfig, ConfigError};
use foodgram_api::db::{self, RepositoryError};
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// An input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// An input file is not the expected JSON.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    /// One record of an input file was rejected.
    #[error("Record {index} rejected: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// Load configuration and connect to the database.
async fn connect() -> Result<(ApiConfig, PgPool), CommandError> {
    let config = ApiConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;
    Ok((config, pool))
}
