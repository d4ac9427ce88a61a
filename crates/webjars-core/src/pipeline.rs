//! Match → resolve → open → negotiate → stream.
//!
//! [`DeliveryPipeline`] is the single entry point a host calls per request.
//! Every failure is folded into a [`DeliveryOutcome`]; nothing is thrown
//! across the boundary.
//!
//! # Per-request states
//!
//! ```text
//! Unmatched
//! Matched ─┬─ cache hit ──────────┐
//!          ├─ miss → resolved ────┼─ streaming ─┬─ Served
//!          └─ miss → NotFound     │             └─ ResolutionError
//!                                 └─ open failed → NotFound
//! ```

use std::io::{self, Write};
use std::sync::Arc;

use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use http::StatusCode;
use tracing::{debug, error, trace, warn};
use webjars_router::{LibraryScope, RouteTable};
use webjars_telemetry::metrics::{record_delivered_bytes, record_delivery, DeliveryLabel};

use crate::cache::ResolutionCache;
use crate::content_type::ContentTypes;
use crate::error::{AssetError, StreamError};
use crate::index::{AssetEntry, AssetIndex, DEFAULT_RESOURCE_ROOT};
use crate::search_path::SearchPath;

/// A streamed asset and the metadata the host needs for its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedAsset<B = Bytes> {
    /// The response body, or the transport it was written to.
    pub body: B,
    /// MIME type for `Content-Type`.
    pub content_type: String,
    /// `Content-Length`, set only for uncompressed bodies.
    pub content_length: Option<u64>,
    /// `Content-Encoding`, set when the body is gzip-compressed.
    pub content_encoding: Option<&'static str>,
    /// Bytes read from the archive entry.
    pub bytes_read: u64,
    /// Fully-qualified archive-internal path.
    pub resolved_path: String,
}

/// Terminal state of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome<B = Bytes> {
    /// No pattern matched; the host continues its own chain.
    Unmatched,
    /// The asset was streamed.
    Served(ServedAsset<B>),
    /// A pattern matched but no asset could be opened.
    NotFound,
    /// Streaming failed after the asset was opened.
    ResolutionError,
}

impl<B> DeliveryOutcome<B> {
    /// HTTP status for the outcome; `None` when unmatched.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Unmatched => None,
            Self::Served(_) => Some(StatusCode::OK),
            Self::NotFound => Some(StatusCode::NOT_FOUND),
            Self::ResolutionError => Some(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Returns true for [`DeliveryOutcome::Unmatched`].
    pub fn is_unmatched(&self) -> bool {
        matches!(self, Self::Unmatched)
    }

    /// Converts the body type of a served asset.
    pub fn map_body<C>(self, f: impl FnOnce(B) -> C) -> DeliveryOutcome<C> {
        match self {
            Self::Unmatched => DeliveryOutcome::Unmatched,
            Self::NotFound => DeliveryOutcome::NotFound,
            Self::ResolutionError => DeliveryOutcome::ResolutionError,
            Self::Served(asset) => DeliveryOutcome::Served(ServedAsset {
                body: f(asset.body),
                content_type: asset.content_type,
                content_length: asset.content_length,
                content_encoding: asset.content_encoding,
                bytes_read: asset.bytes_read,
                resolved_path: asset.resolved_path,
            }),
        }
    }
}

/// Returns false for paths that must never reach the index: `.` or `..`
/// segments, backslashes and NUL bytes.
pub fn is_safe_logical_path(path: &str) -> bool {
    !path.contains(['\\', '\0']) && !path.split('/').any(|segment| segment == "." || segment == "..")
}

/// Collapses empty segments so `/a//b.js` and `/a/b.js` share one cache entry.
fn cache_key(logical: &str) -> String {
    let mut key = String::with_capacity(logical.len() + 1);
    for segment in logical.split('/').filter(|s| !s.is_empty()) {
        key.push('/');
        key.push_str(segment);
    }
    key
}

/// Builder for [`DeliveryPipeline`].
#[derive(Debug)]
pub struct DeliveryPipelineBuilder {
    search_path: SearchPath,
    routes: RouteTable,
    resource_root: String,
    context_path: String,
    cache: Option<Arc<ResolutionCache>>,
    content_types: ContentTypes,
    compression: Compression,
}

impl DeliveryPipelineBuilder {
    /// Sets the route table.
    #[must_use]
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Sets the directory inside archives that holds libraries.
    #[must_use]
    pub fn resource_root(mut self, root: impl Into<String>) -> Self {
        self.resource_root = root.into();
        self
    }

    /// Sets the deployment context prefix stripped from request paths.
    #[must_use]
    pub fn context_path(mut self, prefix: impl Into<String>) -> Self {
        self.context_path = prefix.into().trim_end_matches('/').to_string();
        self
    }

    /// Shares an existing resolution cache.
    #[must_use]
    pub fn cache(mut self, cache: Arc<ResolutionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the content type table.
    #[must_use]
    pub fn content_types(mut self, content_types: ContentTypes) -> Self {
        self.content_types = content_types;
        self
    }

    /// Sets the gzip level (0-9, clamped).
    #[must_use]
    pub fn compression_level(mut self, level: u32) -> Self {
        self.compression = Compression::new(level.min(9));
        self
    }

    /// Builds the asset index and returns the pipeline.
    pub fn build(self) -> DeliveryPipeline {
        let index = AssetIndex::build(&self.search_path, &self.resource_root);
        DeliveryPipeline {
            routes: self.routes,
            index,
            search_path: self.search_path,
            cache: self.cache.unwrap_or_default(),
            content_types: self.content_types,
            context_path: self.context_path,
            compression: self.compression,
        }
    }
}

/// Serves bundled assets for request paths.
///
/// Immutable after construction apart from the resolution cache, so one
/// instance is shared by every request worker.
///
/// # Example
///
/// ```rust,no_run
/// use webjars_core::{DeliveryOutcome, DeliveryPipeline, SearchPath};
/// use webjars_router::RouteTable;
///
/// let search_path = SearchPath::discover(["lib/"], "META-INF/resources/webjars")?;
/// let pipeline = DeliveryPipeline::builder(search_path)
///     .routes(RouteTable::from_pairs([("/webjars/**", "*")]).unwrap())
///     .build();
///
/// match pipeline.serve("/webjars/jquery/jquery.min.js", true) {
///     DeliveryOutcome::Served(asset) => println!("{} bytes", asset.bytes_read),
///     other => println!("{:?}", other.status_code()),
/// }
/// # Ok::<(), webjars_core::AssetError>(())
/// ```
#[derive(Debug)]
pub struct DeliveryPipeline {
    routes: RouteTable,
    index: AssetIndex,
    search_path: SearchPath,
    cache: Arc<ResolutionCache>,
    content_types: ContentTypes,
    context_path: String,
    compression: Compression,
}

impl DeliveryPipeline {
    /// Starts a builder over `search_path`.
    #[must_use]
    pub fn builder(search_path: SearchPath) -> DeliveryPipelineBuilder {
        DeliveryPipelineBuilder {
            search_path,
            routes: RouteTable::new(),
            resource_root: DEFAULT_RESOURCE_ROOT.to_string(),
            context_path: String::new(),
            cache: None,
            content_types: ContentTypes::new(),
            compression: Compression::default(),
        }
    }

    /// Serves `request_path` into an in-memory body.
    pub fn serve(&self, request_path: &str, accepts_gzip: bool) -> DeliveryOutcome {
        self.serve_to(request_path, accepts_gzip, Vec::new())
            .map_body(Bytes::from)
    }

    /// Serves `request_path` into `out`, returning the transport on success.
    ///
    /// When compressing, the gzip encoder is finished before `out` is handed
    /// back. On every other exit `out` is dropped.
    pub fn serve_to<W: Write>(
        &self,
        request_path: &str,
        accepts_gzip: bool,
        out: W,
    ) -> DeliveryOutcome<W> {
        let Some(logical) = self.strip_context(request_path) else {
            trace!(path = request_path, "outside context path");
            return DeliveryOutcome::Unmatched;
        };

        let Some(route) = self.routes.match_path(logical) else {
            trace!(path = logical, "no route matched");
            return DeliveryOutcome::Unmatched;
        };

        if !is_safe_logical_path(logical) {
            warn!(path = logical, pattern = route.pattern, "rejected unsafe path");
            record_delivery(DeliveryLabel::NotFound);
            return DeliveryOutcome::NotFound;
        }

        let entry = match self.resolve(logical, route.scope) {
            Ok(entry) => entry,
            Err(AssetError::Ambiguous { candidates, .. }) => {
                warn!(
                    path = logical,
                    pattern = route.pattern,
                    ?candidates,
                    "ambiguous asset; add a library-scoped route"
                );
                record_delivery(DeliveryLabel::NotFound);
                return DeliveryOutcome::NotFound;
            }
            Err(e) => {
                debug!(path = logical, pattern = route.pattern, error = %e, "asset not found");
                record_delivery(DeliveryLabel::NotFound);
                return DeliveryOutcome::NotFound;
            }
        };

        let Some(source) = self.search_path.source(entry.source) else {
            warn!(path = logical, resolved = %entry.path, "resolved asset has no source");
            record_delivery(DeliveryLabel::NotFound);
            return DeliveryOutcome::NotFound;
        };

        let content_type = self.content_types.for_path(&entry.path).to_string();
        let compression = self.compression;
        let mut transport = Some(out);

        let result = source.read_entry(&entry.path, &mut |input| {
            let writer = transport
                .take()
                .ok_or_else(|| io::Error::other("transport already consumed"))?;
            if accepts_gzip {
                let mut encoder = GzEncoder::new(writer, compression);
                let copied = io::copy(input, &mut encoder)?;
                let mut writer = encoder.finish()?;
                writer.flush()?;
                transport = Some(writer);
                Ok(copied)
            } else {
                let mut writer = writer;
                let copied = io::copy(input, &mut writer)?;
                writer.flush()?;
                transport = Some(writer);
                Ok(copied)
            }
        });

        match result {
            Ok(bytes_read) => {
                let Some(body) = transport else {
                    error!(path = logical, resolved = %entry.path, "transport lost after copy");
                    record_delivery(DeliveryLabel::Error);
                    return DeliveryOutcome::ResolutionError;
                };
                debug!(
                    path = logical,
                    resolved = %entry.path,
                    bytes = bytes_read,
                    gzip = accepts_gzip,
                    "asset served"
                );
                record_delivery(DeliveryLabel::Served);
                record_delivered_bytes(bytes_read);
                DeliveryOutcome::Served(ServedAsset {
                    body,
                    content_type,
                    content_length: (!accepts_gzip).then_some(bytes_read),
                    content_encoding: accepts_gzip.then_some("gzip"),
                    bytes_read,
                    resolved_path: entry.path.clone(),
                })
            }
            Err(StreamError::Open { source, .. }) => {
                warn!(
                    path = logical,
                    resolved = %entry.path,
                    error = %source,
                    "failed to open asset"
                );
                record_delivery(DeliveryLabel::NotFound);
                DeliveryOutcome::NotFound
            }
            Err(StreamError::Transfer { source, .. }) => {
                error!(
                    path = logical,
                    pattern = route.pattern,
                    resolved = %entry.path,
                    error = %source,
                    "failed to stream asset"
                );
                record_delivery(DeliveryLabel::Error);
                DeliveryOutcome::ResolutionError
            }
        }
    }

    fn strip_context<'a>(&self, request_path: &'a str) -> Option<&'a str> {
        let rest = request_path.strip_prefix(self.context_path.as_str())?;
        if self.context_path.is_empty() || rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }

    fn resolve(&self, logical: &str, scope: &LibraryScope) -> Result<Arc<AssetEntry>, AssetError> {
        let key = cache_key(logical);
        let (entry, hit) = self.cache.lookup(&key, || match scope {
            LibraryScope::Any => self.index.resolve(&key),
            LibraryScope::Library(library) => self.index.resolve_in(library, &key),
        })?;
        if hit {
            debug!(path = logical, resolved = %entry.path, "resolution cache hit");
        }
        Ok(entry)
    }

    /// The registered routes.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// The asset index.
    pub fn index(&self) -> &AssetIndex {
        &self.index
    }

    /// The resolution cache.
    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    /// The deployment context prefix.
    pub fn context_path(&self) -> &str {
        &self.context_path
    }
}
