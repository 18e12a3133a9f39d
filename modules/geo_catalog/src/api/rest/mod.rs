//! REST layer - axum handlers, DTOs, routing and RFC 9457 problem mapping.
//!
//! Handlers never touch the database directly: everything goes through the
//! [`Storage`](crate::domain::storage::Storage) facade carried in [`ApiState`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::GeoCatalogConfig;
use crate::domain::storage::Storage;

pub mod dto;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod validation;

pub use error::{ApiResult, Problem};
pub use routes::{HttpLimits, build_router};

/// Shared request state, cloned into every handler.
#[derive(Clone)]
pub struct ApiState {
    pub storage: Arc<dyn Storage>,
    pub uploads: UploadCfg,
}

impl ApiState {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, cfg: &GeoCatalogConfig) -> Self {
        Self {
            storage,
            uploads: UploadCfg {
                dir: cfg.upload_dir.clone(),
                keep: cfg.keep_uploads,
            },
        }
    }
}

/// Where uploaded import files are staged.
#[derive(Debug, Clone)]
pub struct UploadCfg {
    pub dir: PathBuf,
    pub keep: bool,
}
