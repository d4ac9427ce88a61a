//! Typed configuration for the webjars asset server.
//!
//! - TOML and JSON configuration files
//! - `WEBJARS__SECTION__KEY` environment overrides
//! - Strict parsing (unknown fields are errors)
//! - Validation of route patterns, addresses and delivery settings
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! context_path = ""
//!
//! [assets]
//! search_path = ["lib/", "vendor/jquery-3.6.0.jar"]
//! resource_root = "META-INF/resources/webjars"
//!
//! [routes]
//! "/webjars/jquery/**" = "jquery"
//! "/webjars/**" = "*"
//!
//! [delivery]
//! gzip = true
//! compression_level = 6
//! content_disposition = "inline"
//! allow_caching = true
//!
//! [delivery.content_types]
//! svg = "image/svg+xml"
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = false
//! addr = "0.0.0.0:9090"
//! ```
//!
//! Routes are tried in file order; the first matching pattern wins.

mod config;
mod error;
mod loader;
mod schema;

pub use config::{WebjarsConfig, WebjarsConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
