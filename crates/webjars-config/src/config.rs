//! Root configuration type.

use std::net::SocketAddr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use webjars_router::RouteTable;

use crate::schema::default_routes;
use crate::{AssetsConfig, ConfigError, DeliveryConfig, LogFormat, ServerConfig, TelemetryConfigSection};

/// Complete webjars server configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use webjars_config::WebjarsConfig;
///
/// let config = WebjarsConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert_eq!(config.routes.get("/webjars/**").map(String::as_str), Some("*"));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WebjarsConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Archive search path.
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Route pattern → library scope, in match order.
    #[serde(default = "default_routes")]
    pub routes: IndexMap<String, String>,

    /// Response shaping.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Logging and metrics.
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl Default for WebjarsConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            assets: AssetsConfig::default(),
            routes: default_routes(),
            delivery: DeliveryConfig::default(),
            telemetry: TelemetryConfigSection::default(),
        }
    }
}

impl WebjarsConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> WebjarsConfigBuilder {
        WebjarsConfigBuilder::new()
    }

    /// Local development preset: pretty debug logs, no client caching.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.server.http_addr = "127.0.0.1:8080".to_string();
        config.delivery.allow_caching = false;
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config
    }

    /// Compiles the configured routes.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first malformed pattern
    /// or library scope.
    pub fn route_table(&self) -> Result<RouteTable, ConfigError> {
        RouteTable::from_pairs(&self.routes)
            .map_err(|e| ConfigError::invalid_value("routes", e.to_string()))
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a route pattern or scope is malformed, or no route is configured
    /// - the server or (enabled) metrics address is not a socket address
    /// - the context path is non-empty and lacks a leading `/`
    /// - the compression level is above 9
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.routes.is_empty() {
            return Err(ConfigError::validation_error(
                "at least one route must be configured",
            ));
        }
        self.route_table()?;

        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        let context_path = &self.server.context_path;
        if !context_path.is_empty() && !context_path.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "server.context_path",
                format!("must start with '/': {context_path}"),
            ));
        }

        if self.delivery.compression_level > 9 {
            return Err(ConfigError::invalid_value(
                "delivery.compression_level",
                format!("must be between 0 and 9, got {}", self.delivery.compression_level),
            ));
        }

        if self.telemetry.metrics.enabled
            && self.telemetry.metrics.addr.parse::<SocketAddr>().is_err()
        {
            return Err(ConfigError::invalid_value(
                "telemetry.metrics.addr",
                format!("invalid socket address: {}", self.telemetry.metrics.addr),
            ));
        }

        Ok(())
    }
}

/// Builder for [`WebjarsConfig`].
#[derive(Debug, Default)]
pub struct WebjarsConfigBuilder {
    config: WebjarsConfig,
}

impl WebjarsConfigBuilder {
    /// Starts from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the server section.
    #[must_use]
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Replaces the assets section.
    #[must_use]
    pub fn assets(mut self, assets: AssetsConfig) -> Self {
        self.config.assets = assets;
        self
    }

    /// Appends a search-path entry.
    #[must_use]
    pub fn search_path_entry(mut self, entry: impl Into<String>) -> Self {
        self.config.assets.search_path.push(entry.into());
        self
    }

    /// Replaces the route table with the given `(pattern, scope)` pairs.
    #[must_use]
    pub fn routes<I, P, S>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<String>,
        S: Into<String>,
    {
        self.config.routes = routes
            .into_iter()
            .map(|(pattern, scope)| (pattern.into(), scope.into()))
            .collect();
        self
    }

    /// Replaces the delivery section.
    #[must_use]
    pub fn delivery(mut self, delivery: DeliveryConfig) -> Self {
        self.config.delivery = delivery;
        self
    }

    /// Replaces the telemetry section.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfigSection) -> Self {
        self.config.telemetry = telemetry;
        self
    }

    /// Returns the configuration without validating it.
    #[must_use]
    pub fn build(self) -> WebjarsConfig {
        self.config
    }
}
