//! Plan Catalog Configuration Module
//!
//! Handles loading and validation of the service configuration from a YAML
//! file, environment variables and command-line arguments, in that order of
//! increasing precedence.

use anyhow::{Context, Result};
use clap::Parser;
use plan_advisor_shared::ScoreWeights;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::{DEFAULT_PAGE_SIZE, DEFAULT_PORT, MAX_PAGE_SIZE};

/// Main plan catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanCatalogConfig {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub scoring: ScoringConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,

    pub port: u16,

    /// Request timeout in seconds
    pub request_timeout: u64,
}

impl ServerConfig {
    /// Get the server socket address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context("Invalid server address")
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            request_timeout: 30,
        }
    }
}

/// Catalog seeding and search paging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON file replacing the built-in plan list
    pub seed_file: Option<PathBuf>,

    pub default_page_size: usize,

    /// Larger requested page sizes are clamped to this
    pub max_page_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed_file: None,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins; "*" allows any
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive, e.g. "info" or "plan_catalog=debug,tower_http=info"
    pub level: String,

    /// "pretty", "compact" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

/// Command-line arguments
#[derive(Debug, Clone, Parser)]
#[command(
    name = "plan-catalog-server",
    version,
    about = "Internet plan catalog and recommendation service"
)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/plan-catalog.yaml")]
    pub config: PathBuf,

    /// Environment (development, production)
    #[arg(short, long, default_value = "development")]
    pub environment: String,

    /// Server port (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log level (overrides config)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Plan seed file (overrides config)
    #[arg(long)]
    pub seed_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl PlanCatalogConfig {
    /// Load configuration from file, environment and arguments
    pub fn load(args: &Args) -> Result<Self> {
        let mut settings = config::Config::builder();

        if args.config.exists() {
            settings = settings.add_source(config::File::from(args.config.clone()).required(false));
        }

        let env_file = format!("config/plan-catalog-{}.yaml", args.environment);
        settings = settings.add_source(config::File::with_name(&env_file).required(false));

        // PLAN_CATALOG_SERVER__PORT=8080
        settings = settings.add_source(
            config::Environment::with_prefix("PLAN_CATALOG")
                .prefix_separator("_")
                .separator("__"),
        );

        let mut config: PlanCatalogConfig = settings
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.apply_args(args);

        config
            .validate()
            .context("Configuration validation failed")?;

        Ok(config)
    }

    fn apply_args(&mut self, args: &Args) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref log_level) = args.log_level {
            self.logging.level = log_level.clone();
        }

        if args.debug {
            self.logging.level = "debug".to_string();
        }

        if let Some(ref seed_file) = args.seed_file {
            self.catalog.seed_file = Some(seed_file.clone());
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.server.request_timeout == 0 {
            return Err(anyhow::anyhow!("Request timeout must be at least 1 second"));
        }

        if self.catalog.default_page_size == 0 || self.catalog.max_page_size == 0 {
            return Err(anyhow::anyhow!("Page sizes must be greater than 0"));
        }

        if self.catalog.default_page_size > self.catalog.max_page_size {
            return Err(anyhow::anyhow!(
                "Default page size {} exceeds max page size {}",
                self.catalog.default_page_size,
                self.catalog.max_page_size
            ));
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Valid formats: {:?}",
                self.logging.format,
                LOG_FORMATS
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn args(config: PathBuf) -> Args {
        Args {
            config,
            environment: "test".to_string(),
            port: None,
            log_level: None,
            seed_file: None,
            debug: false,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = PlanCatalogConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.catalog.default_page_size, 5);
        assert_eq!(config.scoring.weights, ScoreWeights::DEFAULT);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = PlanCatalogConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = PlanCatalogConfig::default();
        config.catalog.default_page_size = 0;
        assert!(config.validate().is_err());

        let mut config = PlanCatalogConfig::default();
        config.catalog.default_page_size = 50;
        config.catalog.max_page_size = 10;
        assert!(config.validate().is_err());

        let mut config = PlanCatalogConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_yaml_with_overrides() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "server:\n  port: 9100\ncatalog:\n  default_page_size: 10\nscoring:\n  weights:\n    operator_preference: 0\nlogging:\n  format: json"
        )
        .unwrap();

        let mut args = args(file.path().to_path_buf());
        args.debug = true;
        args.seed_file = Some(PathBuf::from("plans.json"));

        let config = PlanCatalogConfig::load(&args).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.catalog.default_page_size, 10);
        assert_eq!(config.catalog.seed_file, Some(PathBuf::from("plans.json")));
        assert_eq!(config.scoring.weights.operator_preference, 0);
        assert_eq!(config.scoring.weights.city_match, 30);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_port_argument_wins() {
        let mut args = args(PathBuf::from("/nonexistent/plan-catalog.yaml"));
        args.port = Some(4000);

        let config = PlanCatalogConfig::load(&args).unwrap();
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3001,
            request_timeout: 5,
        };
        assert_eq!(config.socket_addr().unwrap().port(), 3001);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }
}
