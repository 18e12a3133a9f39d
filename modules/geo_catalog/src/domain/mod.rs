//! Domain layer - models, errors, repository ports and the storage facade.
//!
//! The domain layer:
//! - **MUST NOT** import `api::*` or `SeaORM` types
//! - **Defines** the [`repos::EntityRepository`] port implemented by `infra::storage`
//! - **Exposes** [`storage::Storage`] as the single entry point for the REST layer

pub mod error;
pub mod model;
pub mod repos;
pub mod storage;
