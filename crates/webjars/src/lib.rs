//! # webjars
//!
//! Serves the static files that libraries ship inside "webjar" archives
//! (`META-INF/resources/webjars/<library>/<version>/...`) under stable,
//! version-free URLs.
//!
//! - **Routing**: glob patterns (`*`, `?`, `**`) mapped to library scopes
//! - **Resolution**: request paths resolved to the newest matching version
//!   and cached for the life of the process
//! - **Delivery**: streamed entries with content types and optional gzip
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use webjars::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ServerError> {
//!     let config = ConfigLoader::new()
//!         .with_file("webjars.toml")?
//!         .with_env_prefix("WEBJARS")
//!         .load()?;
//!
//!     let service = WebjarsService::from_config(&config)?;
//!     Server::from_config(&config, service)?.run().await
//! }
//! ```
//!
//! ## Request flow
//!
//! ```text
//! path → strip context → RouteTable → ResolutionCache / AssetIndex
//!      → AssetSource::read_entry → (gzip) → response
//! ```

#![forbid(unsafe_code)]

pub use webjars_config as config;
pub use webjars_core as core;
pub use webjars_router as router;
pub use webjars_server as server;
pub use webjars_telemetry as telemetry;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use webjars_config::{ConfigError, ConfigLoader, WebjarsConfig};
    pub use webjars_core::{
        AssetError, AssetSource, ContentTypes, DeliveryOutcome, DeliveryPipeline, ResolutionCache,
        SearchPath, ServedAsset, DEFAULT_RESOURCE_ROOT,
    };
    pub use webjars_router::{LibraryScope, PatternError, RouteTable};
    pub use webjars_server::{ResponsePolicy, Server, ServerError, ShutdownSignal, WebjarsService};
    pub use webjars_telemetry::{init_telemetry, TelemetryConfig};
}
