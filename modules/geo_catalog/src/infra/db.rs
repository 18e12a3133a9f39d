//! Database connection bootstrap.
//!
//! The pool is built once from [`DatabaseConfig`] and handed to the
//! repositories; nothing in this crate opens connections on its own.

use std::path::Path;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use serde::{Deserialize, Serialize};

use crate::infra::storage::migrations::Migrator;

/// Connection pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `postgres://...`, `mysql://...` or `sqlite://...` / `sqlite::memory:`.
    #[serde(default = "default_dsn")]
    pub dsn: String,
    #[serde(default = "default_max_conns")]
    pub max_conns: u32,
    #[serde(default = "default_min_conns")]
    pub min_conns: u32,
    #[serde(default = "default_acquire_timeout", with = "humantime_serde")]
    pub acquire_timeout: Duration,
    /// Forward every SQL statement to the `sqlx` logger.
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: default_dsn(),
            max_conns: default_max_conns(),
            min_conns: default_min_conns(),
            acquire_timeout: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

impl DatabaseConfig {
    /// In-memory `SQLite` database, used by `--mock` and tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            dsn: MEMORY_DSN.to_owned(),
            ..Self::default()
        }
    }
}

const MEMORY_DSN: &str = "sqlite::memory:";

fn default_dsn() -> String {
    MEMORY_DSN.to_owned()
}

fn default_max_conns() -> u32 {
    10
}

fn default_min_conns() -> u32 {
    1
}

fn default_acquire_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Each connection to `sqlite::memory:` opens a separate database, so the pool
/// must never hold more than one.
#[must_use]
pub fn is_memory_dsn(dsn: &str) -> bool {
    dsn.starts_with("sqlite::memory:") || dsn.contains("mode=memory")
}

/// On-disk file named by a `sqlite:` DSN, or `None` for in-memory and
/// non-`SQLite` databases.
#[must_use]
pub fn sqlite_file_path(dsn: &str) -> Option<&Path> {
    if is_memory_dsn(dsn) {
        return None;
    }
    let rest = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))?;
    let file = rest.split('?').next().unwrap_or_default();
    (!file.is_empty()).then(|| Path::new(file))
}

/// `SQLite` creates the database file (with `mode=rwc`) but not its directory.
async fn ensure_sqlite_dir(dsn: &str) -> Result<(), DbErr> {
    let Some(dir) = sqlite_file_path(dsn).and_then(Path::parent) else {
        return Ok(());
    };
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        DbErr::Custom(format!(
            "cannot create database directory {}: {e}",
            dir.display()
        ))
    })
}

/// Redact credentials from DSN for logging.
#[must_use]
pub fn redact_credentials_in_dsn(dsn: &str) -> String {
    if !dsn.contains('@') {
        return dsn.to_owned();
    }
    match url::Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => "***".to_owned(),
    }
}

/// Open the connection pool described by `cfg`.
///
/// # Errors
/// Returns the driver error when the DSN is invalid or the server is unreachable,
/// or [`DbErr::Custom`] when the directory of a `SQLite` file cannot be created.
pub async fn connect(cfg: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    ensure_sqlite_dir(&cfg.dsn).await?;

    let (max_conns, min_conns) = if is_memory_dsn(&cfg.dsn) {
        (1, 1)
    } else {
        (cfg.max_conns.max(1), cfg.min_conns.min(cfg.max_conns))
    };

    let mut opts = ConnectOptions::new(cfg.dsn.clone());
    opts.max_connections(max_conns)
        .min_connections(min_conns)
        .acquire_timeout(cfg.acquire_timeout)
        .sqlx_logging(cfg.sqlx_logging);

    tracing::debug!(
        dsn = %redact_credentials_in_dsn(&cfg.dsn),
        max_conns,
        min_conns,
        "Building database connection"
    );

    Database::connect(opts).await
}

/// Apply all pending schema migrations.
///
/// # Errors
/// Returns the first failing migration's error.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(conn, None).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
