//! Resolution and delivery of assets bundled inside library archives.
//!
//! Libraries ship their static files under
//! `META-INF/resources/webjars/<library>/<version>/...` inside jar (or
//! tarball) archives. This crate indexes those archives once, maps request
//! paths to the versioned entry behind them, and streams the entry with the
//! right content type and optional gzip compression.
//!
//! # Components
//!
//! | Type | Role |
//! |------|------|
//! | [`SearchPath`] | Ordered [`AssetSource`]s; first source wins on duplicates |
//! | [`AssetIndex`] | File name → entries, with version-aware resolution |
//! | [`ResolutionCache`] | Concurrent logical path → resolved entry map |
//! | [`ContentTypes`] | Extension → MIME type |
//! | [`DeliveryPipeline`] | Orchestrates a request into a [`DeliveryOutcome`] |
//!
//! # Example
//!
//! ```rust,no_run
//! use webjars_core::{DeliveryOutcome, DeliveryPipeline, SearchPath, DEFAULT_RESOURCE_ROOT};
//! use webjars_router::RouteTable;
//!
//! let search_path = SearchPath::discover(["lib/"], DEFAULT_RESOURCE_ROOT)?;
//! let pipeline = DeliveryPipeline::builder(search_path)
//!     .routes(RouteTable::from_pairs([("/webjars/**", "*")]).unwrap())
//!     .build();
//!
//! if let DeliveryOutcome::Served(asset) = pipeline.serve("/webjars/jquery/jquery.min.js", false) {
//!     assert_eq!(asset.content_type, "application/javascript;charset=UTF-8");
//! }
//! # Ok::<(), webjars_core::AssetError>(())
//! ```

mod cache;
mod content_type;
mod dedup;
mod error;
mod index;
mod pipeline;
mod search_path;
mod source;

pub use cache::{CacheStats, ResolutionCache};
pub use content_type::{builtin_content_type, ContentTypes, DEFAULT_CONTENT_TYPE};
pub use dedup::DedupChain;
pub use error::{AssetError, StreamError};
pub use index::{compare_versions, AssetEntry, AssetIndex, DEFAULT_RESOURCE_ROOT};
pub use pipeline::{
    is_safe_logical_path, DeliveryOutcome, DeliveryPipeline, DeliveryPipelineBuilder, ServedAsset,
};
pub use search_path::SearchPath;
pub use source::{
    open_archive, ArchiveKind, AssetSource, DirectorySource, EntrySink, JarSource, TarGzSource,
};
