//! HTTP delivery of webjar assets.
//!
//! [`WebjarsService`] adapts a [`webjars_core::DeliveryPipeline`] to
//! `http::Request`/`http::Response`, and [`Server`] hosts it on hyper as a
//! standalone process.
//!
//! # Example
//!
//! ```rust,ignore
//! use webjars_config::ConfigLoader;
//! use webjars_server::{Server, WebjarsService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), webjars_server::ServerError> {
//!     let config = ConfigLoader::new().with_env_prefix("WEBJARS").load()?;
//!     let service = WebjarsService::from_config(&config)?;
//!     Server::from_config(&config, service)?.run().await
//! }
//! ```

pub mod error;
pub mod policy;
pub mod server;
pub mod service;
pub mod shutdown;

pub use error::{ServerError, ServerResult};
pub use policy::ResponsePolicy;
pub use server::Server;
pub use service::{accepts_gzip, empty_response, HttpResponse, WebjarsService};
pub use shutdown::ShutdownSignal;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
