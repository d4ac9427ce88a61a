//! Glob-style route matching for webjars.
//!
//! This crate decides whether a request path belongs to the asset pipeline
//! and, if so, which library namespace it resolves in.
//!
//! # Pattern Syntax
//!
//! Patterns and paths are `/`-separated segment sequences:
//!
//! - **Literal** segments match the identical segment (`/webjars`)
//! - **`?`** matches exactly one character inside a segment (`/?.js`)
//! - **`*`** matches any run of characters inside a segment (`/*.css`)
//! - **`**`** matches zero or more whole segments (`/webjars/**`)
//!
//! Matching is anchored at both ends and empty segments are ignored, so a
//! trailing slash never changes the result.
//!
//! # Example
//!
//! ```rust
//! use webjars_router::{matches, LibraryScope, RouteTable};
//!
//! assert!(matches("/static/**", "/static"));
//! assert!(matches("/static/**", "/static/a/b"));
//! assert!(!matches("/static/*", "/static/a/b"));
//!
//! let table = RouteTable::from_pairs([("/webjars/**", "jquery")]).unwrap();
//! let m = table.match_path("/webjars/jquery/jquery.min.js").unwrap();
//! assert_eq!(m.scope, &LibraryScope::Library("jquery".into()));
//! ```

mod error;
mod matcher;
mod pattern;
mod router;

pub use error::PatternError;
pub use matcher::matches;
pub use pattern::{RoutePattern, Segment};
pub use router::{LibraryScope, Route, RouteMatch, RouteTable};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_documented_properties() {
        assert!(matches("/static/**", "/static"));
        assert!(matches("/static/**", "/static/a/b"));
        assert!(!matches("/static/*", "/static/a/b"));
        assert!(matches("/static/?.js", "/static/a.js"));
        assert!(!matches("/static/?.js", "/static/ab.js"));
    }

    fn segment() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-c]{1,3}",
            Just("*".to_string()),
            Just("**".to_string()),
            Just("?".to_string()),
            "[a-c]\\*[a-c]",
        ]
    }

    proptest! {
        #[test]
        fn prop_match_is_deterministic(
            pattern in prop::collection::vec(segment(), 0..5),
            path in prop::collection::vec("[a-c]{0,3}", 0..6),
        ) {
            let pattern = format!("/{}", pattern.join("/"));
            let path = format!("/{}", path.join("/"));
            let first = matches(&pattern, &path);
            for _ in 0..3 {
                prop_assert_eq!(matches(&pattern, &path), first);
            }
        }

        #[test]
        fn prop_recursive_prefix_matches_any_suffix(
            prefix in prop::collection::vec("[a-z]{1,4}", 1..3),
            suffix in prop::collection::vec("[a-z0-9.]{1,6}", 0..5),
        ) {
            let pattern = format!("/{}/**", prefix.join("/"));
            let path = format!("/{}/{}", prefix.join("/"), suffix.join("/"));
            prop_assert!(matches(&pattern, &path));
        }

        #[test]
        fn prop_literal_pattern_matches_itself(
            segments in prop::collection::vec("[a-z0-9.]{1,6}", 0..6),
        ) {
            let path = format!("/{}", segments.join("/"));
            prop_assert!(matches(&path, &path));
            let trailing = format!("{path}/");
            prop_assert!(matches(&path, &trailing));
        }
    }
}
