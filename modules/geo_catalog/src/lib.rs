//! Geo Catalog Module
//!
//! CRUD and bulk JSON import over three related geographic entities
//! (countries, cities, airports) backed by a relational database.
//!
//! ## Layout
//!
//! - `domain` - models, errors, repository ports and the [`Storage`] facade
//! - `infra` - database connection, `SeaORM` entities, migrations and repositories
//! - `api::rest` - axum handlers, DTOs, routes and problem mapping
//!
//! The composition root is [`GeoStorage::new`]: it receives an explicitly
//! constructed connection handle and wires one repository per entity.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
pub mod serde_ext;

pub use config::GeoCatalogConfig;
pub use domain::error::DomainError;
pub use domain::model::{
    Airport, City, Country, ImportReport, ImportTable, ListRequest, NewAirport, NewCity,
    NewCountry, Page,
};
pub use domain::storage::{GeoStorage, Storage, import_file};
