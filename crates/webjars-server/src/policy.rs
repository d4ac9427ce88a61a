//! Response header policy.
//!
//! Turns a served asset into response headers: content type (with an
//! optional forced charset), length or compression headers, disposition and
//! cache suppression.

use std::time::UNIX_EPOCH;

use http::{header, response::Builder};
use webjars_config::DeliveryConfig;
use webjars_core::ServedAsset;

/// Header policy applied to every served asset.
///
/// # Example
///
/// ```rust
/// use webjars_server::ResponsePolicy;
///
/// let policy = ResponsePolicy {
///     content_charset: Some("ISO-8859-1".to_string()),
///     ..ResponsePolicy::default()
/// };
/// assert_eq!(
///     policy.content_type("text/css;charset=UTF-8"),
///     "text/css;charset=ISO-8859-1"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePolicy {
    /// `Content-Disposition` value, if any.
    pub content_disposition: Option<String>,
    /// When false, responses forbid client caching.
    pub allow_caching: bool,
    /// Charset forced onto the content type.
    pub content_charset: Option<String>,
}

impl Default for ResponsePolicy {
    fn default() -> Self {
        Self {
            content_disposition: Some("inline".to_string()),
            allow_caching: true,
            content_charset: None,
        }
    }
}

impl ResponsePolicy {
    /// Builds the policy from the `[delivery]` section. An empty disposition
    /// disables the header.
    pub fn from_config(delivery: &DeliveryConfig) -> Self {
        Self {
            content_disposition: delivery
                .content_disposition
                .clone()
                .filter(|value| !value.is_empty()),
            allow_caching: delivery.allow_caching,
            content_charset: delivery
                .content_charset
                .clone()
                .filter(|value| !value.is_empty()),
        }
    }

    /// The content type to send, with any `charset` parameter replaced.
    pub fn content_type(&self, base: &str) -> String {
        let Some(charset) = &self.content_charset else {
            return base.to_string();
        };

        let mut parts = base.split(';');
        let mut content_type = parts.next().unwrap_or_default().trim().to_string();
        for param in parts {
            let is_charset = param
                .split_once('=')
                .is_some_and(|(name, _)| name.trim().eq_ignore_ascii_case("charset"));
            if !is_charset && !param.trim().is_empty() {
                content_type.push(';');
                content_type.push_str(param.trim());
            }
        }
        content_type.push_str(";charset=");
        content_type.push_str(charset);
        content_type
    }

    /// Adds the headers for `asset` to `builder`.
    pub fn apply<B>(&self, mut builder: Builder, asset: &ServedAsset<B>) -> Builder {
        builder = builder.header(header::CONTENT_TYPE, self.content_type(&asset.content_type));

        match asset.content_encoding {
            Some(encoding) => {
                builder = builder
                    .header(header::CONTENT_ENCODING, encoding)
                    .header(header::VARY, "Accept-Encoding");
            }
            None => {
                if let Some(length) = asset.content_length {
                    builder = builder.header(header::CONTENT_LENGTH, length);
                }
            }
        }

        if let Some(disposition) = &self.content_disposition {
            builder = builder.header(header::CONTENT_DISPOSITION, disposition.as_str());
        }

        if !self.allow_caching {
            builder = builder
                .header(header::PRAGMA, "no-cache")
                .header(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
                .header(header::EXPIRES, httpdate::fmt_http_date(UNIX_EPOCH));
        }

        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Response, StatusCode};

    fn asset(encoding: Option<&'static str>) -> ServedAsset<()> {
        ServedAsset {
            body: (),
            content_type: "application/javascript;charset=UTF-8".to_string(),
            content_length: encoding.is_none().then_some(42),
            content_encoding: encoding,
            bytes_read: 42,
            resolved_path: "META-INF/resources/webjars/jquery/3.6.0/jquery.min.js".to_string(),
        }
    }

    fn headers(policy: &ResponsePolicy, asset: &ServedAsset<()>) -> http::HeaderMap {
        let builder = policy.apply(Response::builder().status(StatusCode::OK), asset);
        builder.body(()).unwrap().headers().clone()
    }

    #[test]
    fn test_default_policy_headers() {
        let headers = headers(&ResponsePolicy::default(), &asset(None));
        assert_eq!(headers[header::CONTENT_TYPE], "application/javascript;charset=UTF-8");
        assert_eq!(headers[header::CONTENT_LENGTH], "42");
        assert_eq!(headers[header::CONTENT_DISPOSITION], "inline");
        assert!(headers.get(header::CACHE_CONTROL).is_none());
        assert!(headers.get(header::CONTENT_ENCODING).is_none());
    }

    #[test]
    fn test_compressed_headers() {
        let headers = headers(&ResponsePolicy::default(), &asset(Some("gzip")));
        assert_eq!(headers[header::CONTENT_ENCODING], "gzip");
        assert_eq!(headers[header::VARY], "Accept-Encoding");
        assert!(headers.get(header::CONTENT_LENGTH).is_none());
    }

    #[test]
    fn test_caching_disabled() {
        let policy = ResponsePolicy {
            allow_caching: false,
            content_disposition: None,
            ..ResponsePolicy::default()
        };
        let headers = headers(&policy, &asset(None));
        assert_eq!(headers[header::PRAGMA], "no-cache");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache, no-store, must-revalidate");
        assert_eq!(headers[header::EXPIRES], "Thu, 01 Jan 1970 00:00:00 GMT");
        assert!(headers.get(header::CONTENT_DISPOSITION).is_none());
    }

    #[test]
    fn test_charset_replacement() {
        let policy = ResponsePolicy {
            content_charset: Some("UTF-16".to_string()),
            ..ResponsePolicy::default()
        };
        assert_eq!(policy.content_type("text/css;charset=UTF-8"), "text/css;charset=UTF-16");
        assert_eq!(policy.content_type("image/png"), "image/png;charset=UTF-16");
        assert_eq!(
            policy.content_type("text/plain; format=flowed; Charset=latin1"),
            "text/plain;format=flowed;charset=UTF-16"
        );
    }

    #[test]
    fn test_from_config_treats_empty_as_unset() {
        let delivery = DeliveryConfig {
            content_disposition: Some(String::new()),
            content_charset: Some(String::new()),
            allow_caching: false,
            ..DeliveryConfig::default()
        };
        let policy = ResponsePolicy::from_config(&delivery);
        assert_eq!(policy.content_disposition, None);
        assert_eq!(policy.content_charset, None);
        assert!(!policy.allow_caching);

        let policy = ResponsePolicy::from_config(&DeliveryConfig::default());
        assert_eq!(policy, ResponsePolicy::default());
    }
}
