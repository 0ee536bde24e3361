use libsql::{Builder, Connection};
use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::error::Result;

use super::schema;

/// Handle to the libsql database. Cheap to clone; every consumer opens its
/// own `Connection` per unit of work via [`Database::connect`].
#[derive(Clone)]
pub struct Database {
    db: Arc<libsql::Database>,
}

impl Database {
    /// Opens the database named by `config.url` (local file, `:memory:`,
    /// remote, or remote replica when `local_path` is set), applies the
    /// configured pragmas, and runs schema migration.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let db = if config.url.starts_with("libsql://") || config.url.starts_with("https://") {
            if let Some(ref local_path) = config.local_path {
                Builder::new_remote_replica(
                    local_path,
                    config.url.clone(),
                    config.auth_token.clone().unwrap_or_default(),
                )
                .build()
                .await?
            } else {
                Builder::new_remote(
                    config.url.clone(),
                    config.auth_token.clone().unwrap_or_default(),
                )
                .build()
                .await?
            }
        } else if config.url == ":memory:" {
            Builder::new_local(":memory:").build().await?
        } else {
            let path = config.url.strip_prefix("file:").unwrap_or(&config.url);
            Builder::new_local(path).build().await?
        };

        let database = Self { db: Arc::new(db) };
        database.apply_pragmas(config).await?;

        let conn = database.connect()?;
        schema::init_schema(&conn).await?;

        Ok(database)
    }

    pub fn connect(&self) -> Result<Connection> {
        Ok(self.db.connect()?)
    }

    // Pragma failures are logged, not fatal: remote backends reject some of
    // these and the service still works on their defaults.
    async fn apply_pragmas(&self, config: &DatabaseConfig) -> Result<()> {
        let conn = self.connect()?;

        let pragmas = [
            format!("PRAGMA busy_timeout = {}", config.busy_timeout_ms),
            format!(
                "PRAGMA journal_mode = {}",
                normalize_journal_mode(&config.journal_mode)
            ),
            format!(
                "PRAGMA synchronous = {}",
                normalize_synchronous(&config.synchronous)
            ),
        ];
        for pragma in pragmas {
            if let Err(error) = conn.execute_batch(&pragma).await {
                tracing::warn!(%pragma, error = %error, "Failed to apply SQLite pragma");
            }
        }

        Ok(())
    }
}

fn normalize_journal_mode(value: &str) -> &'static str {
    match value.trim().to_uppercase().as_str() {
        "DELETE" => "DELETE",
        "TRUNCATE" => "TRUNCATE",
        "PERSIST" => "PERSIST",
        "MEMORY" => "MEMORY",
        "WAL" => "WAL",
        "OFF" => "OFF",
        _ => "WAL",
    }
}

fn normalize_synchronous(value: &str) -> &'static str {
    match value.trim().to_uppercase().as_str() {
        "OFF" => "OFF",
        "NORMAL" => "NORMAL",
        "FULL" => "FULL",
        "EXTRA" => "EXTRA",
        _ => "NORMAL",
    }
}
