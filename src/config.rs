//! Configuration management for the `ambiental` service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AmbientalError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "AMBIENTAL_CONFIG";

/// Root configuration structure for the `ambiental` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientalConfig {
    pub server: ServerConfig,
    /// Upstream open-data endpoints and HTTP client settings
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    /// Which data source answers requests
    pub data: DataConfig,
    pub logging: LoggingConfig,
    pub telemetry: TelemetryConfig,
    /// Default request settings
    pub defaults: DefaultsConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
    /// Maximum request body size in KB
    pub body_limit_kb: usize,
    /// PEM certificate, enables TLS together with `tls_key`
    pub tls_cert: Option<PathBuf>,
    pub tls_key: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub madrid_air_url: String,
    pub madrid_recycling_url: String,
    pub overpass_url: String,
    pub nominatim_url: String,
    /// Sent with every upstream request, Nominatim rejects anonymous clients
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum number of retries for failed requests
    pub max_retries: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live in seconds
    pub ttl_seconds: u64,
    /// Maximum number of entries
    pub capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataStrategy {
    Live,
    Cached,
    Mock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackStrategy {
    Estimated,
    Mock,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub strategy: DataStrategy,
    /// Used when the primary source fails or returns nothing
    pub fallback: FallbackStrategy,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// OTLP/HTTP traces endpoint; tracing export is off when unset
    pub otlp_endpoint: Option<String>,
    pub service_name: Option<String>,
}

/// Default application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Recycling search radius in meters
    pub recycling_radius_m: f64,
    /// Largest radius a client may ask for
    pub max_radius_m: f64,
    /// Radius used to gather stations for recommendations
    pub recommendation_radius_m: f64,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_request_timeout() -> u64 {
    30
}

fn default_body_limit_kb() -> usize {
    64
}

fn default_madrid_air_url() -> String {
    "https://datos.madrid.es/egob/catalogo/212531-7916318-calidad-aire-tiempo-real.json".to_string()
}

fn default_madrid_recycling_url() -> String {
    "https://datos.madrid.es/egob/catalogo/200284-0-puntos-limpios.json".to_string()
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("ambiental/{}", crate::VERSION)
}

fn default_upstream_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_cache_capacity() -> usize {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_recycling_radius() -> f64 {
    2000.0
}

fn default_max_radius() -> f64 {
    10_000.0
}

fn default_recommendation_radius() -> f64 {
    5000.0
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            body_limit_kb: default_body_limit_kb(),
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            madrid_air_url: default_madrid_air_url(),
            madrid_recycling_url: default_madrid_recycling_url(),
            overpass_url: default_overpass_url(),
            nominatim_url: default_nominatim_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_upstream_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_cache_ttl(),
            capacity: default_cache_capacity(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            strategy: DataStrategy::Cached,
            fallback: FallbackStrategy::Estimated,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            recycling_radius_m: default_recycling_radius(),
            max_radius_m: default_max_radius(),
            recommendation_radius_m: default_recommendation_radius(),
        }
    }
}

impl AmbientalConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::load_from_path(path)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // AMBIENTAL__SERVER__PORT=8080 overrides server.port
        builder = builder.add_source(
            Environment::with_prefix("AMBIENTAL")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AmbientalConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ambiental").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.server.body_limit_kb == 0 {
            self.server.body_limit_kb = default_body_limit_kb();
        }
        if self.upstream.user_agent.is_empty() {
            self.upstream.user_agent = default_user_agent();
        }
        if self.upstream.timeout_seconds == 0 {
            self.upstream.timeout_seconds = default_upstream_timeout();
        }
        if self.cache.ttl_seconds == 0 {
            self.cache.ttl_seconds = default_cache_ttl();
        }
        if self.cache.capacity == 0 {
            self.cache.capacity = default_cache_capacity();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.recycling_radius_m <= 0.0 {
            self.defaults.recycling_radius_m = default_recycling_radius();
        }
        if self.defaults.max_radius_m <= 0.0 {
            self.defaults.max_radius_m = default_max_radius();
        }
        if self.defaults.recommendation_radius_m <= 0.0 {
            self.defaults.recommendation_radius_m = default_recommendation_radius();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.upstream.timeout_seconds > 120 {
            return Err(AmbientalError::config("Upstream timeout cannot exceed 120 seconds").into());
        }

        if self.upstream.max_retries > 10 {
            return Err(AmbientalError::config("Upstream max retries cannot exceed 10").into());
        }

        if self.cache.ttl_seconds > 86_400 {
            return Err(AmbientalError::config("Cache TTL cannot exceed 86400 seconds (1 day)").into());
        }

        if self.cache.capacity > 10_000 {
            return Err(AmbientalError::config("Cache capacity cannot exceed 10000 entries").into());
        }

        if self.defaults.recycling_radius_m > self.defaults.max_radius_m {
            return Err(AmbientalError::config(
                "Default recycling radius cannot exceed the maximum radius",
            )
            .into());
        }

        if self.defaults.max_radius_m > 50_000.0 {
            return Err(AmbientalError::config("Maximum radius cannot exceed 50000 m").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AmbientalError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AmbientalError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("madrid_air_url", &self.upstream.madrid_air_url),
            ("madrid_recycling_url", &self.upstream.madrid_recycling_url),
            ("overpass_url", &self.upstream.overpass_url),
            ("nominatim_url", &self.upstream.nominatim_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AmbientalError::config(format!(
                    "Upstream {name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.server.tls_cert.is_some() != self.server.tls_key.is_some() {
            return Err(AmbientalError::config(
                "TLS needs both server.tls_cert and server.tls_key",
            )
            .into());
        }

        Ok(())
    }
}
