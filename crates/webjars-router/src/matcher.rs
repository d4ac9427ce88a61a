//! Anchored glob matching over path segments.
//!
//! `**` is resolved with a table over (pattern suffix, path suffix) pairs, so
//! matching is `O(pattern segments * path segments)` regardless of how many
//! recursive wildcards appear. Within a segment, `*` and `?` use a greedy
//! scan with single-star backtracking.

use crate::pattern::{RoutePattern, Segment};

/// Test whether `path` matches `pattern`.
///
/// Both ends are anchored: the whole path must be consumed by the whole
/// pattern. The pattern is compiled without validation; use
/// [`RoutePattern::parse`] to reject malformed patterns up front.
///
/// # Example
///
/// ```rust
/// use webjars_router::matches;
///
/// assert!(matches("/webjars/**", "/webjars/jquery/jquery.js"));
/// assert!(matches("/webjars/*.js", "/webjars/app.js"));
/// assert!(!matches("/webjars/*.js", "/webjars/lib/app.js"));
/// assert!(matches("/webjars/?.js", "/webjars/a.js"));
/// ```
pub fn matches(pattern: &str, path: &str) -> bool {
    RoutePattern::compile(pattern).matches(path)
}

pub(crate) fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    let len = path.len();

    // next[j]: pattern[i + 1..] matches path[j..]
    let mut next = vec![false; len + 1];
    next[len] = true;

    for segment in pattern.iter().rev() {
        let mut current = vec![false; len + 1];
        for j in (0..=len).rev() {
            current[j] = match segment {
                Segment::AnySegments => next[j] || (j < len && current[j + 1]),
                other => j < len && next[j + 1] && other.matches_segment(path[j]),
            };
        }
        next = current;
    }

    next[0]
}

/// Match a single segment against a pattern containing `*` and `?`.
pub(crate) fn glob_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut star: Option<usize> = None;
    let mut resume = 0;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            resume = t;
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if let Some(s) = star {
            p = s + 1;
            resume += 1;
            t = resume;
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}
