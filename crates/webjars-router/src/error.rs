//! Pattern compilation errors.

use thiserror::Error;

/// Errors raised while compiling route patterns or library scopes.
///
/// These are startup errors: a pattern table that fails to compile should
/// stop the process before any request is served.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The pattern string was empty.
    #[error("route pattern must not be empty")]
    Empty,

    /// The pattern does not start with `/`.
    #[error("route pattern must start with '/': {pattern}")]
    MissingLeadingSlash {
        /// The offending pattern.
        pattern: String,
    },

    /// A `**` wildcard shares its segment with other characters.
    #[error("'**' must occupy a whole segment in {pattern} (found {segment:?})")]
    MixedRecursiveWildcard {
        /// The offending pattern.
        pattern: String,
        /// The segment containing the misplaced `**`.
        segment: String,
    },

    /// A library scope identifier is not a single path segment.
    #[error("invalid library scope {scope:?}: must be a single path segment")]
    InvalidScope {
        /// The offending scope identifier.
        scope: String,
    },
}

impl PatternError {
    /// Create a new missing-leading-slash error.
    pub fn missing_leading_slash(pattern: impl Into<String>) -> Self {
        Self::MissingLeadingSlash {
            pattern: pattern.into(),
        }
    }

    /// Create a new mixed recursive wildcard error.
    pub fn mixed_recursive_wildcard(pattern: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::MixedRecursiveWildcard {
            pattern: pattern.into(),
            segment: segment.into(),
        }
    }

    /// Create a new invalid scope error.
    pub fn invalid_scope(scope: impl Into<String>) -> Self {
        Self::InvalidScope {
            scope: scope.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_leading_slash_display() {
        let err = PatternError::missing_leading_slash("webjars/**");
        assert!(err.to_string().contains("webjars/**"));
    }

    #[test]
    fn test_mixed_wildcard_display() {
        let err = PatternError::mixed_recursive_wildcard("/a**b", "a**b");
        let msg = err.to_string();
        assert!(msg.contains("/a**b"));
        assert!(msg.contains("a**b"));
    }

    #[test]
    fn test_invalid_scope_display() {
        let err = PatternError::invalid_scope("jquery/ui");
        assert!(err.to_string().contains("jquery/ui"));
    }
}
