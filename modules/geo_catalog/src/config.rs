use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the `geo_catalog` module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoCatalogConfig {
    /// Page size used when the caller asks for `limit <= 0`.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// Directory where uploaded import files are stored before they are loaded.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Keep uploaded files on disk after a successful import.
    #[serde(default)]
    pub keep_uploads: bool,
    /// Upper bound for reading and loading one import file. Uploads run inside
    /// the HTTP request timeout, so keep this below it.
    #[serde(default = "default_import_timeout", with = "humantime_serde")]
    pub import_timeout: Duration,
}

impl Default for GeoCatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            upload_dir: default_upload_dir(),
            keep_uploads: false,
            import_timeout: default_import_timeout(),
        }
    }
}

impl GeoCatalogConfig {
    #[must_use]
    pub fn limit_cfg(&self) -> LimitCfg {
        LimitCfg {
            default: self.default_page_size,
            max: self.max_page_size,
        }
    }
}

/// Page size bounds applied by every list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitCfg {
    pub default: u64,
    pub max: u64,
}

impl Default for LimitCfg {
    fn default() -> Self {
        Self {
            default: default_page_size(),
            max: default_max_page_size(),
        }
    }
}

fn default_page_size() -> u64 {
    10
}

fn default_max_page_size() -> u64 {
    1000
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_import_timeout() -> Duration {
    Duration::from_secs(20)
}
