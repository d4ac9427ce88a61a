//! Configuration schema types.
//!
//! Every section rejects unknown fields so that typos fail at startup.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Server configuration section.
///
/// # Example
///
/// ```
/// use webjars_config::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.http_addr, "0.0.0.0:8080");
/// assert!(config.context_path.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// HTTP server bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Deployment prefix stripped from request paths before routing.
    #[serde(default)]
    pub context_path: String,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            context_path: String::new(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

/// Where library archives are found.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AssetsConfig {
    /// Archives, exploded directories, or directories of archives, in
    /// precedence order.
    #[serde(default)]
    pub search_path: Vec<String>,

    /// Directory inside each archive that holds library assets.
    #[serde(default = "default_resource_root")]
    pub resource_root: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            search_path: Vec::new(),
            resource_root: default_resource_root(),
        }
    }
}

fn default_resource_root() -> String {
    "META-INF/resources/webjars".to_string()
}

/// Response shaping section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Compress responses for clients that accept gzip.
    #[serde(default = "default_true")]
    pub gzip: bool,

    /// Gzip level, 0 to 9.
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// `Content-Disposition` header value; empty or `None` omits the header.
    #[serde(default = "default_content_disposition")]
    pub content_disposition: Option<String>,

    /// When false, responses carry headers that forbid client caching.
    #[serde(default = "default_true")]
    pub allow_caching: bool,

    /// Charset forced onto every content type.
    #[serde(default)]
    pub content_charset: Option<String>,

    /// Extension → MIME type overrides.
    #[serde(default)]
    pub content_types: IndexMap<String, String>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            gzip: true,
            compression_level: default_compression_level(),
            content_disposition: default_content_disposition(),
            allow_caching: true,
            content_charset: None,
            content_types: IndexMap::new(),
        }
    }
}

fn default_compression_level() -> u32 {
    6
}

#[allow(clippy::unnecessary_wraps)]
fn default_content_disposition() -> Option<String> {
    Some("inline".to_string())
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or `EnvFilter` directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    /// Converts to the telemetry crate's logging settings.
    pub fn to_log_config(&self) -> webjars_telemetry::LogConfig {
        let base = match self.format {
            LogFormat::Json => webjars_telemetry::LogConfig::production(),
            LogFormat::Pretty => webjars_telemetry::LogConfig::development(),
        };
        webjars_telemetry::LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            ..base
        }
    }
}

/// Prometheus exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Serve Prometheus metrics.
    #[serde(default)]
    pub enabled: bool,

    /// Prometheus listener address.
    #[serde(default = "default_metrics_addr")]
    pub addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: default_metrics_addr(),
        }
    }
}

fn default_metrics_addr() -> String {
    "0.0.0.0:9090".to_string()
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfigSection {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl TelemetryConfigSection {
    /// Builds the settings passed to `webjars_telemetry::init_telemetry`.
    pub fn to_telemetry_config(&self) -> webjars_telemetry::TelemetryConfig {
        webjars_telemetry::TelemetryConfig::builder()
            .logging(self.logging.to_log_config())
            .metrics(webjars_telemetry::MetricsConfig {
                enabled: self.metrics.enabled,
                addr: self.metrics.addr.clone(),
            })
            .build()
    }
}

/// Route table used when the configuration names none.
pub fn default_routes() -> IndexMap<String, String> {
    IndexMap::from([("/webjars/**".to_string(), "*".to_string())])
}

fn default_true() -> bool {
    true
}
