//! Request handling on top of the delivery pipeline.

use std::sync::Arc;

use bytes::Bytes;
use http::{header, HeaderMap, Method, Request, Response, StatusCode};
use http_body_util::Full;
use tracing::{debug, error};
use webjars_config::WebjarsConfig;
use webjars_core::{ContentTypes, DeliveryOutcome, DeliveryPipeline, SearchPath};

use crate::error::ServerResult;
use crate::policy::ResponsePolicy;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<Full<Bytes>>;

/// Serves webjar assets for `GET` and `HEAD` requests.
///
/// [`handle`](Self::handle) returns `None` when the request is not for an
/// asset, leaving the host free to route it elsewhere.
///
/// Bodies are buffered: an asset is copied into memory before the status
/// line goes out, so a read that fails midway answers `500` instead of a
/// truncated `200`. Hosts that stream to their own transport call
/// [`DeliveryPipeline::serve_to`] directly.
#[derive(Debug, Clone)]
pub struct WebjarsService {
    pipeline: Arc<DeliveryPipeline>,
    policy: ResponsePolicy,
    gzip: bool,
}

impl WebjarsService {
    /// Wraps a pipeline with the default response policy and gzip enabled.
    pub fn new(pipeline: Arc<DeliveryPipeline>) -> Self {
        Self {
            pipeline,
            policy: ResponsePolicy::default(),
            gzip: true,
        }
    }

    /// Loads the configured search path and builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the routes are invalid or an archive cannot be
    /// loaded.
    pub fn from_config(config: &WebjarsConfig) -> ServerResult<Self> {
        let routes = config.route_table()?;
        let search_path =
            SearchPath::discover(&config.assets.search_path, &config.assets.resource_root)?;

        let content_types = config
            .delivery
            .content_types
            .iter()
            .fold(ContentTypes::new(), |types, (ext, mime)| {
                types.with_override(ext, mime.as_str())
            });

        let pipeline = DeliveryPipeline::builder(search_path)
            .routes(routes)
            .resource_root(config.assets.resource_root.as_str())
            .context_path(config.server.context_path.as_str())
            .content_types(content_types)
            .compression_level(config.delivery.compression_level)
            .build();

        Ok(Self::new(Arc::new(pipeline))
            .with_policy(ResponsePolicy::from_config(&config.delivery))
            .with_gzip(config.delivery.gzip))
    }

    /// Replaces the response policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ResponsePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enables or disables gzip responses.
    #[must_use]
    pub fn with_gzip(mut self, enabled: bool) -> Self {
        self.gzip = enabled;
        self
    }

    /// The underlying pipeline.
    pub fn pipeline(&self) -> &Arc<DeliveryPipeline> {
        &self.pipeline
    }

    /// The response policy.
    pub fn policy(&self) -> &ResponsePolicy {
        &self.policy
    }

    /// Answers `request`, or returns `None` when no route matches or the
    /// method is not `GET`/`HEAD`.
    ///
    /// Reads archive entries synchronously; async hosts should call it from
    /// a blocking-capable context.
    pub fn handle<B>(&self, request: &Request<B>) -> Option<HttpResponse> {
        let method = request.method();
        if method != Method::GET && method != Method::HEAD {
            return None;
        }

        let path = request.uri().path();
        let gzip = self.gzip && accepts_gzip(request.headers());

        let asset = match self.pipeline.serve(path, gzip) {
            DeliveryOutcome::Unmatched => return None,
            DeliveryOutcome::NotFound => return Some(empty_response(StatusCode::NOT_FOUND)),
            DeliveryOutcome::ResolutionError => {
                return Some(empty_response(StatusCode::INTERNAL_SERVER_ERROR))
            }
            DeliveryOutcome::Served(asset) => asset,
        };

        debug!(path, resolved = %asset.resolved_path, bytes = asset.bytes_read, "serving asset");

        let builder = self
            .policy
            .apply(Response::builder().status(StatusCode::OK), &asset);
        let body = if method == Method::HEAD {
            Bytes::new()
        } else {
            asset.body
        };

        Some(builder.body(Full::new(body)).unwrap_or_else(|e| {
            error!(path, error = %e, "invalid response header");
            empty_response(StatusCode::INTERNAL_SERVER_ERROR)
        }))
    }
}

/// Response with `status` and no body.
pub fn empty_response(status: StatusCode) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// Returns true if `Accept-Encoding` allows gzip.
///
/// An explicit `gzip` (or `x-gzip`) coding decides; otherwise `*` does.
/// A coding with `q=0` is refused.
pub fn accepts_gzip(headers: &HeaderMap) -> bool {
    let mut explicit = None;
    let mut wildcard = None;

    let codings = headers
        .get_all(header::ACCEPT_ENCODING)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','));

    for coding in codings {
        let mut params = coding.split(';');
        let name = params.next().unwrap_or_default().trim();
        let accepted = params
            .filter_map(|param| param.split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("q"))
            .map_or(true, |(_, q)| q.trim().parse::<f32>().is_ok_and(|q| q > 0.0));

        if name.eq_ignore_ascii_case("gzip") || name.eq_ignore_ascii_case("x-gzip") {
            explicit = Some(accepted);
        } else if name == "*" {
            wildcard = Some(accepted);
        }
    }

    explicit.or(wildcard).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn encoding(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_accepts_gzip() {
        assert!(accepts_gzip(&encoding("gzip")));
        assert!(accepts_gzip(&encoding("deflate, GZIP;q=0.5")));
        assert!(accepts_gzip(&encoding("br, *")));
        assert!(accepts_gzip(&encoding("x-gzip")));
    }

    #[test]
    fn test_rejects_gzip() {
        assert!(!accepts_gzip(&HeaderMap::new()));
        assert!(!accepts_gzip(&encoding("br, deflate")));
        assert!(!accepts_gzip(&encoding("gzip;q=0")));
        assert!(!accepts_gzip(&encoding("gzip; q=0.0, *")));
        assert!(!accepts_gzip(&encoding("*;q=0")));
        assert!(!accepts_gzip(&encoding("gzip;q=abc")));
    }

    #[test]
    fn test_multiple_header_values() {
        let mut headers = HeaderMap::new();
        headers.append(header::ACCEPT_ENCODING, HeaderValue::from_static("br"));
        headers.append(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        assert!(accepts_gzip(&headers));
    }

    #[test]
    fn test_empty_response() {
        let response = empty_response(StatusCode::NOT_FOUND);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().is_empty());
    }
}
