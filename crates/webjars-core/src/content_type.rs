//! Extension → MIME type table.

use std::collections::HashMap;

/// Returned for extensions with no mapping.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Built-in mappings. Extensions are matched lower-cased.
pub fn builtin_content_type(extension: &str) -> Option<&'static str> {
    match extension {
        "js" => Some("application/javascript;charset=UTF-8"),
        "css" => Some("text/css;charset=UTF-8"),
        "gif" => Some("image/gif"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// Content type resolver with optional per-extension overrides.
///
/// # Example
///
/// ```rust
/// use webjars_core::ContentTypes;
///
/// let types = ContentTypes::new().with_override("svg", "image/svg+xml");
/// assert_eq!(types.resolve("js"), "application/javascript;charset=UTF-8");
/// assert_eq!(types.resolve("svg"), "image/svg+xml");
/// assert_eq!(types.resolve("unknownext"), "application/octet-stream");
/// assert_eq!(types.for_path("lib/1.0/logo.PNG"), "image/png");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    /// The built-in table only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the mapping for `extension`.
    #[must_use]
    pub fn with_override(mut self, extension: impl AsRef<str>, mime: impl Into<String>) -> Self {
        self.overrides
            .insert(extension.as_ref().trim_start_matches('.').to_ascii_lowercase(), mime.into());
        self
    }

    /// MIME type for an already lower-cased extension.
    pub fn resolve(&self, extension: &str) -> &str {
        self.overrides
            .get(extension)
            .map(String::as_str)
            .or_else(|| builtin_content_type(extension))
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// MIME type for the extension of the last segment of `path`.
    pub fn for_path(&self, path: &str) -> &str {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => self.resolve(&ext.to_ascii_lowercase()),
            _ => DEFAULT_CONTENT_TYPE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let types = ContentTypes::new();
        assert_eq!(types.resolve("js"), "application/javascript;charset=UTF-8");
        assert_eq!(types.resolve("css"), "text/css;charset=UTF-8");
        assert_eq!(types.resolve("gif"), "image/gif");
        assert_eq!(types.resolve("jpg"), "image/jpeg");
        assert_eq!(types.resolve("jpeg"), "image/jpeg");
        assert_eq!(types.resolve("png"), "image/png");
        assert_eq!(types.resolve("unknownext"), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_for_path_is_case_insensitive() {
        let types = ContentTypes::new();
        assert_eq!(types.for_path("a/b/jquery.MIN.JS"), "application/javascript;charset=UTF-8");
        assert_eq!(types.for_path("a/b/photo.JPeG"), "image/jpeg");
    }

    #[test]
    fn test_for_path_without_extension() {
        let types = ContentTypes::new();
        assert_eq!(types.for_path("lib/1.0/LICENSE"), DEFAULT_CONTENT_TYPE);
        assert_eq!(types.for_path("lib/1.0/.hidden"), DEFAULT_CONTENT_TYPE);
        assert_eq!(types.for_path("lib.v2/1.0/README"), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_override_replaces_builtin() {
        let types = ContentTypes::new()
            .with_override(".JS", "text/javascript")
            .with_override("woff2", "font/woff2");
        assert_eq!(types.resolve("js"), "text/javascript");
        assert_eq!(types.for_path("fonts/x.woff2"), "font/woff2");
        assert_eq!(types.resolve("css"), "text/css;charset=UTF-8");
    }
}
