//! Layered application configuration.
//!
//! Sources, lowest precedence first: built-in defaults, the YAML file given
//! with `--config`, `GEO__*` environment variables (`__` separates nesting,
//! e.g. `GEO__DATABASE__DSN`), then command-line overrides.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use anyhow::{Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use geo_catalog::GeoCatalogConfig;
use geo_catalog::api::rest::HttpLimits;
use geo_catalog::infra::db::DatabaseConfig;
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "GEO__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub catalog: GeoCatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            request_timeout: default_request_timeout(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn http_limits(&self) -> HttpLimits {
        HttpLimits {
            request_timeout: self.request_timeout,
            body_limit_bytes: self.body_limit_bytes,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 8087))
}

fn default_request_timeout() -> Duration {
    HttpLimits::default().request_timeout
}

fn default_body_limit() -> usize {
    HttpLimits::default().body_limit_bytes
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default directive for this service's targets, e.g. `info` or `debug`.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_level() -> String {
    "info".to_owned()
}

/// Command-line flags that take precedence over every other source.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub verbose: u8,
    pub mock: bool,
}

impl AppConfig {
    /// Merge defaults, the optional YAML file and `GEO__*` environment variables.
    ///
    /// # Errors
    /// Returns an error when a source cannot be parsed or holds unknown keys.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }

    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(port) = cli.port {
            self.server.bind_addr.set_port(port);
        }
        match cli.verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
        if cli.mock {
            self.database = DatabaseConfig::in_memory();
        }
    }

    /// Reject settings that parse but cannot work.
    ///
    /// # Errors
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<()> {
        if self.database.dsn.trim().is_empty() {
            bail!("database.dsn must not be empty");
        }
        let catalog = &self.catalog;
        if catalog.default_page_size == 0 {
            bail!("catalog.default_page_size must be positive");
        }
        if catalog.default_page_size > catalog.max_page_size {
            bail!(
                "catalog.default_page_size ({}) exceeds catalog.max_page_size ({})",
                catalog.default_page_size,
                catalog.max_page_size
            );
        }
        if self.server.body_limit_bytes == 0 {
            bail!("server.body_limit_bytes must be positive");
        }
        if catalog.import_timeout.is_zero() {
            bail!("catalog.import_timeout must be positive");
        }
        if catalog.import_timeout >= self.server.request_timeout {
            bail!(
                "catalog.import_timeout ({}) must be shorter than server.request_timeout ({})",
                humantime_serde::re::humantime::format_duration(catalog.import_timeout),
                humantime_serde::re::humantime::format_duration(self.server.request_timeout)
            );
        }
        Ok(())
    }

    /// # Errors
    /// Returns an error if the configuration cannot be serialized.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_saphyr::to_string(self)?)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_validate() {
        let cfg = AppConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.server.bind_addr.port(), 8087);
        assert_eq!(cfg.logging.format, LogFormat::Text);
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  bind_addr: \"0.0.0.0:9000\"\n  request_timeout: 5s\ncatalog:\n  default_page_size: 25\nlogging:\n  format: json\n"
        )
        .unwrap();

        let cfg = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.server.bind_addr.port(), 9000);
        assert_eq!(cfg.server.request_timeout, Duration::from_secs(5));
        assert_eq!(cfg.catalog.default_page_size, 25);
        assert_eq!(cfg.catalog.max_page_size, 1000);
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  listen: \"0.0.0.0:1\"\n").unwrap();
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn cli_overrides_win() {
        let mut cfg = AppConfig::default();
        cfg.apply_cli_overrides(&CliOverrides {
            port: Some(18_087),
            verbose: 2,
            mock: true,
        });
        assert_eq!(cfg.server.bind_addr.port(), 18_087);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.database.dsn, "sqlite::memory:");
    }

    #[test]
    fn page_size_bounds_are_checked() {
        let mut cfg = AppConfig::default();
        cfg.catalog.default_page_size = 5000;
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("max_page_size"), "{err}");
    }

    #[test]
    fn import_deadline_must_fit_in_request_timeout() {
        let mut cfg = AppConfig::default();
        assert!(cfg.catalog.import_timeout < cfg.server.request_timeout);

        cfg.catalog.import_timeout = Duration::from_secs(120);
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("request_timeout"), "{err}");

        cfg.server.request_timeout = Duration::from_secs(180);
        cfg.validate().unwrap();
    }

    #[test]
    fn yaml_output_parses_back() {
        let yaml = AppConfig::default().to_yaml().unwrap();
        let parsed: AppConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(parsed.server.bind_addr, default_bind_addr());
        assert_eq!(parsed.catalog.import_timeout, Duration::from_secs(20));
    }
}
