//! Telemetry configuration.

use crate::logging::LogConfig;
use crate::metrics::MetricsConfig;

/// Configuration for all telemetry subsystems.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Logging configuration.
    pub logging: LogConfig,

    /// Metrics configuration.
    pub metrics: MetricsConfig,
}

impl TelemetryConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> TelemetryConfigBuilder {
        TelemetryConfigBuilder::new()
    }
}

/// Builder for [`TelemetryConfig`].
#[derive(Debug, Default)]
pub struct TelemetryConfigBuilder {
    logging: Option<LogConfig>,
    metrics: Option<MetricsConfig>,
}

impl TelemetryConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the logging configuration.
    #[must_use]
    pub fn logging(mut self, config: LogConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// Sets the metrics configuration.
    #[must_use]
    pub fn metrics(mut self, config: MetricsConfig) -> Self {
        self.metrics = Some(config);
        self
    }

    /// Enables metrics on the given listener address.
    #[must_use]
    pub fn metrics_addr(mut self, addr: &str) -> Self {
        self.metrics = Some(MetricsConfig {
            enabled: true,
            addr: addr.to_string(),
        });
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> TelemetryConfig {
        TelemetryConfig {
            logging: self.logging.unwrap_or_default(),
            metrics: self.metrics.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert!(config.logging.enabled);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_builder_metrics_addr() {
        let config = TelemetryConfig::builder().metrics_addr("0.0.0.0:9999").build();

        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.addr, "0.0.0.0:9999");
    }

    #[test]
    fn test_builder_logging() {
        let config = TelemetryConfig::builder()
            .logging(LogConfig::development())
            .build();

        assert!(!config.logging.json_format);
        assert_eq!(config.logging.level, "debug");
    }
}
