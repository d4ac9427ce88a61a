//! Compiled route patterns.
//!
//! A pattern is split on `/` into segments. Empty segments are dropped, so
//! `/webjars/**/` and `/webjars/**` compile to the same thing and a trailing
//! slash on a request path never changes the outcome.

use std::fmt;

use crate::error::PatternError;
use crate::matcher;

/// A single compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the path segment exactly.
    Literal(String),

    /// Contains `*` or `?` wildcards, matched within one path segment.
    Glob(String),

    /// `**`: zero or more whole path segments.
    AnySegments,
}

impl Segment {
    fn classify(raw: &str) -> Self {
        if raw == "**" {
            Self::AnySegments
        } else if raw.contains(['*', '?']) {
            Self::Glob(raw.to_string())
        } else {
            Self::Literal(raw.to_string())
        }
    }

    /// Returns true if this segment accepts a single path segment.
    ///
    /// `AnySegments` always accepts; the caller decides how many segments it spans.
    pub fn matches_segment(&self, segment: &str) -> bool {
        match self {
            Self::Literal(lit) => lit == segment,
            Self::Glob(glob) => matcher::glob_matches(glob, segment),
            Self::AnySegments => true,
        }
    }
}

/// A route pattern compiled into segments.
///
/// # Example
///
/// ```rust
/// use webjars_router::RoutePattern;
///
/// let pattern = RoutePattern::parse("/webjars/**").unwrap();
/// assert!(pattern.matches("/webjars/jquery/jquery.js"));
/// assert!(!pattern.matches("/static/app.js"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse and validate a pattern.
    ///
    /// The pattern must be non-empty, start with `/`, and any `**` must
    /// occupy a whole segment.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        if !pattern.starts_with('/') {
            return Err(PatternError::missing_leading_slash(pattern));
        }
        if let Some(bad) = split(pattern).find(|s| *s != "**" && s.contains("**")) {
            return Err(PatternError::mixed_recursive_wildcard(pattern, bad));
        }
        Ok(Self::compile(pattern))
    }

    /// Compile a pattern without validating it.
    ///
    /// A `**` embedded in a longer segment behaves like `*`.
    pub fn compile(pattern: &str) -> Self {
        Self {
            source: pattern.to_string(),
            segments: split(pattern).map(Segment::classify).collect(),
        }
    }

    /// The pattern text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true if the whole path matches the whole pattern.
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = split(path).collect();
        matcher::match_segments(&self.segments, &parts)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split a path into its non-empty segments.
pub(crate) fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
