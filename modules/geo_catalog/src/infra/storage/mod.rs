//! Infrastructure storage layer - `SeaORM` persistence for the three entities.
//!
//! ## Architecture
//!
//! This module contains ALL `SeaORM`-specific code and database operations:
//! - `entity/` - `SeaORM` entity definitions (countries, cities, buildings)
//! - `mapper.rs` - Conversions between `SeaORM` models and domain types
//! - `pagination.rs` - Page query returning the total row count
//! - `import.rs` - File records and parent lookups used by bulk import
//! - `migrations/` - Database schema migrations
//! - `*_sea_repo.rs` - [`EntityRepository`](crate::domain::repos::EntityRepository) implementations

use std::sync::Arc;
use std::time::Duration;

use sea_orm::{DatabaseConnection, DbErr};

use crate::config::{GeoCatalogConfig, LimitCfg};
use crate::domain::error::DomainError;
use crate::domain::storage::GeoStorage;

pub mod airports_sea_repo;
pub mod cities_sea_repo;
pub mod countries_sea_repo;
pub mod entity;
pub(crate) mod import;
pub(crate) mod mapper;
pub mod migrations;
pub(crate) mod pagination;

pub use airports_sea_repo::OrmAirportsRepository;
pub use cities_sea_repo::OrmCitiesRepository;
pub use countries_sea_repo::OrmCountriesRepository;

pub(crate) fn db_err(e: DbErr) -> DomainError {
    DomainError::database(e.to_string())
}

/// Settings shared by every repository.
#[derive(Debug, Clone, Copy)]
pub struct RepoCfg {
    pub limit: LimitCfg,
    pub import_timeout: Duration,
}

impl From<&GeoCatalogConfig> for RepoCfg {
    fn from(cfg: &GeoCatalogConfig) -> Self {
        Self {
            limit: cfg.limit_cfg(),
            import_timeout: cfg.import_timeout,
        }
    }
}

impl GeoStorage {
    /// Wire the three `SeaORM` repositories onto one connection pool.
    #[must_use]
    pub fn with_sea_orm(conn: DatabaseConnection, cfg: &GeoCatalogConfig) -> Self {
        let repo_cfg = RepoCfg::from(cfg);
        Self::new(
            Arc::new(OrmCountriesRepository::new(conn.clone(), repo_cfg)),
            Arc::new(OrmCitiesRepository::new(conn.clone(), repo_cfg)),
            Arc::new(OrmAirportsRepository::new(conn, repo_cfg)),
        )
    }
}
