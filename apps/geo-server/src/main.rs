mod config;
mod logging;
mod signals;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use geo_catalog::api::rest::{ApiState, build_router};
use geo_catalog::infra::db;
use geo_catalog::{GeoStorage, ImportTable, Storage, import_file};
use mimalloc::MiMalloc;
use sea_orm::DatabaseConnection;

use crate::config::{AppConfig, CliOverrides};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Geo Catalog Server - countries, cities and airports over HTTP
#[derive(Parser)]
#[command(name = "geo-server")]
#[command(about = "Geo Catalog Server - countries, cities and airports over HTTP")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory `SQLite` database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
    /// Load a JSON file into one table in a single transaction
    Import {
        /// Target table: country(ies), city/cities, airport(s) or buildings
        #[arg(short, long)]
        table: String,
        /// JSON array of records
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config
        && !Path::new(path).is_file()
    {
        bail!("config file does not exist: {}", path.display());
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(&CliOverrides {
        port: cli.port,
        verbose: cli.verbose,
        mock: cli.mock,
    });

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    logging::init_logging(&config.logging)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(&config).await,
        Commands::Check => check_config(&config),
        Commands::Import { table, file } => run_import(&config, &table, &file).await,
    }
}

async fn open_database(config: &AppConfig) -> Result<DatabaseConnection> {
    let conn = db::connect(&config.database).await.with_context(|| {
        format!(
            "failed to connect to {}",
            db::redact_credentials_in_dsn(&config.database.dsn)
        )
    })?;
    db::run_migrations(&conn)
        .await
        .context("failed to apply database migrations")?;
    Ok(conn)
}

async fn run_server(config: &AppConfig) -> Result<()> {
    config.validate()?;
    tracing::info!("Geo Catalog Server starting");

    let conn = open_database(config).await?;
    let storage: Arc<dyn Storage> = Arc::new(GeoStorage::with_sea_orm(conn, &config.catalog));
    let router = build_router(
        ApiState::new(storage, &config.catalog),
        config.server.http_limits(),
    );

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = signals::shutdown_signal().await {
                tracing::error!(error = %e, "Signal handling failed, shutting down");
            }
        })
        .await
        .context("HTTP server failed")?;

    tracing::info!("Geo Catalog Server stopped");
    Ok(())
}

fn check_config(config: &AppConfig) -> Result<()> {
    config.validate()?;
    tracing::info!(
        bind_addr = %config.server.bind_addr,
        dsn = %db::redact_credentials_in_dsn(&config.database.dsn),
        "Configuration is valid"
    );
    println!("Configuration is valid");
    Ok(())
}

async fn run_import(config: &AppConfig, table: &str, file: &Path) -> Result<()> {
    config.validate()?;
    let table = ImportTable::from_slug(table).ok_or_else(|| anyhow!("unknown table '{table}'"))?;

    let conn = open_database(config).await?;
    let storage = GeoStorage::with_sea_orm(conn, &config.catalog);
    let report = import_file(&storage, table, file)
        .await
        .with_context(|| format!("import of {} failed", file.display()))?;

    println!(
        "Imported {} record(s) from {} ({} with a missing parent cleared)",
        report.inserted,
        file.display(),
        report.detached.len()
    );
    Ok(())
}
