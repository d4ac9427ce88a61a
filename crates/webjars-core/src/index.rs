//! Name → path index over every bundled asset.
//!
//! Entries live under `<resource root>/<library>/<version>/<rest...>`. The
//! index is keyed by simple file name; a lookup narrows the handful of
//! same-named entries by comparing trailing path segments.
//!
//! # Resolution
//!
//! A candidate is eligible when every segment of the logical path `L` is
//! accounted for: `L` must be a segment suffix of the full entry path, taken
//! either with its version segment or without it. `jquery.min.js`,
//! `/webjars/jquery/jquery.min.js` and `/webjars/jquery/3.6.0/jquery.min.js`
//! all address `META-INF/resources/webjars/jquery/3.6.0/jquery.min.js`;
//! `/evil/jquery/jquery.min.js` addresses nothing. Eligible candidates that
//! differ only by version collapse to the highest version; anything left
//! beyond one is ambiguous.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::error::AssetError;
use crate::search_path::SearchPath;

/// Default resource root inside webjar archives.
pub const DEFAULT_RESOURCE_ROOT: &str = "META-INF/resources/webjars";

/// One indexed asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    /// Index of the source on the search path.
    pub source: usize,
    /// Fully-qualified archive-internal path.
    pub path: String,
    /// Library segment.
    pub library: String,
    /// Version segment, when the layout has one.
    pub version: Option<String>,
    /// Path inside the library/version directory.
    pub rest: String,
}

impl AssetEntry {
    /// Splits an archive path under `resource_root` into its parts.
    ///
    /// Returns `None` for paths outside the root or without a file below a
    /// library directory.
    pub fn parse(source: usize, path: &str, resource_root: &str) -> Option<Self> {
        let root = resource_root.trim_matches('/');
        let relative = if root.is_empty() {
            path
        } else {
            path.strip_prefix(root)?.strip_prefix('/')?
        };

        let segments: Vec<&str> = segments(relative).collect();
        let (library, tail) = segments.split_first()?;
        if tail.is_empty() {
            return None;
        }

        let (version, rest) = match tail.split_first() {
            Some((candidate, rest)) if !rest.is_empty() && looks_like_version(candidate) => {
                (Some((*candidate).to_string()), rest)
            }
            _ => (None, tail),
        };

        Some(Self {
            source,
            path: path.to_string(),
            library: (*library).to_string(),
            version,
            rest: rest.join("/"),
        })
    }

    /// The last path segment.
    pub fn file_name(&self) -> &str {
        self.rest.rsplit('/').next().unwrap_or(&self.rest)
    }

    /// Returns true if `wanted` is a segment suffix of `root/library[/version]/rest`.
    fn is_addressed_by(&self, root: &[String], wanted: &[&str]) -> bool {
        let rest: Vec<&str> = segments(&self.rest).collect();
        if rest.ends_with(wanted) {
            return true;
        }

        let mut versionless: Vec<&str> = root.iter().map(String::as_str).collect();
        versionless.push(&self.library);
        let mut versioned = versionless.clone();
        versioned.extend(self.version.as_deref());
        versionless.extend(&rest);
        versioned.extend(&rest);

        versionless.ends_with(wanted) || versioned.ends_with(wanted)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn looks_like_version(segment: &str) -> bool {
    let digits = segment
        .strip_prefix(['v', 'V'])
        .unwrap_or(segment);
    digits.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Compares two version strings, treating numeric chunks as numbers.
///
/// ```rust
/// use std::cmp::Ordering;
/// use webjars_core::compare_versions;
///
/// assert_eq!(compare_versions("1.10.0", "1.9.2"), Ordering::Greater);
/// assert_eq!(compare_versions("3.6.0", "3.6.0"), Ordering::Equal);
/// assert_eq!(compare_versions("3.6", "3.6.1"), Ordering::Less);
/// ```
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let split = |v: &str| {
        v.trim_start_matches(['v', 'V'])
            .split(['.', '-', '_', '+'])
            .map(str::to_owned)
            .collect::<Vec<_>>()
    };
    let (left, right) = (split(a), split(b));

    for (l, r) in left.iter().zip(&right) {
        let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => l.cmp(r),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    left.len().cmp(&right.len())
}

/// Read-only index of every asset on the search path.
#[derive(Debug, Clone, Default)]
pub struct AssetIndex {
    root: Vec<String>,
    entries: Vec<Arc<AssetEntry>>,
    by_name: HashMap<String, Vec<usize>>,
}

impl AssetIndex {
    /// Scans the search path once.
    pub fn build(search_path: &SearchPath, resource_root: &str) -> Self {
        let index = Self::from_paths(search_path.entries(), resource_root);
        info!(
            sources = search_path.len(),
            assets = index.len(),
            root = resource_root,
            "asset index built"
        );
        webjars_telemetry::metrics::set_indexed_assets(index.len());
        index
    }

    /// Indexes `(source, path)` pairs; paths outside `resource_root` are skipped.
    pub fn from_paths<I, S>(paths: I, resource_root: &str) -> Self
    where
        I: IntoIterator<Item = (usize, S)>,
        S: AsRef<str>,
    {
        let mut index = Self {
            root: segments(resource_root).map(str::to_owned).collect(),
            ..Self::default()
        };
        for (source, path) in paths {
            if let Some(entry) = AssetEntry::parse(source, path.as_ref(), resource_root) {
                let id = index.entries.len();
                index
                    .by_name
                    .entry(entry.file_name().to_string())
                    .or_default()
                    .push(id);
                index.entries.push(Arc::new(entry));
            }
        }
        index
    }

    /// Resolves a logical path across all libraries.
    pub fn resolve(&self, logical_path: &str) -> Result<Arc<AssetEntry>, AssetError> {
        self.lookup(None, logical_path)
    }

    /// Resolves a logical path inside one library.
    pub fn resolve_in(
        &self,
        library: &str,
        logical_path: &str,
    ) -> Result<Arc<AssetEntry>, AssetError> {
        self.lookup(Some(library), logical_path)
    }

    fn lookup(
        &self,
        library: Option<&str>,
        logical_path: &str,
    ) -> Result<Arc<AssetEntry>, AssetError> {
        let wanted: Vec<&str> = segments(logical_path).collect();
        let ids = wanted
            .last()
            .and_then(|name| self.by_name.get(*name))
            .ok_or_else(|| AssetError::not_found(logical_path))?;

        let eligible = ids
            .iter()
            .map(|&id| &self.entries[id])
            .filter(|entry| !library.is_some_and(|lib| lib != entry.library))
            .filter(|entry| entry.is_addressed_by(&self.root, &wanted));

        // Keep the highest version per (library, rest).
        let mut collapsed: Vec<&Arc<AssetEntry>> = Vec::new();
        for entry in eligible {
            let same = collapsed
                .iter_mut()
                .find(|kept| kept.library == entry.library && kept.rest == entry.rest);
            match same {
                Some(kept) => {
                    let newer = match (&entry.version, &kept.version) {
                        (Some(a), Some(b)) => compare_versions(a, b) == Ordering::Greater,
                        (Some(_), None) => true,
                        _ => false,
                    };
                    if newer {
                        *kept = entry;
                    }
                }
                None => collapsed.push(entry),
            }
        }

        match collapsed.as_slice() {
            [] => Err(AssetError::not_found(logical_path)),
            [only] => Ok(Arc::clone(only)),
            many => {
                let mut candidates: Vec<String> = many.iter().map(|e| e.path.clone()).collect();
                candidates.sort();
                Err(AssetError::Ambiguous {
                    path: logical_path.to_string(),
                    candidates,
                })
            }
        }
    }

    /// Iterates every indexed entry.
    pub fn iter(&self) -> impl Iterator<Item = &AssetEntry> {
        self.entries.iter().map(|entry| &**entry)
    }

    /// Number of indexed assets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = DEFAULT_RESOURCE_ROOT;

    fn index(paths: &[&str]) -> AssetIndex {
        AssetIndex::from_paths(paths.iter().map(|p| (0, format!("{ROOT}/{p}"))), ROOT)
    }

    #[test]
    fn test_parse_versioned_entry() {
        let entry = AssetEntry::parse(2, &format!("{ROOT}/jquery/3.6.0/dist/jquery.min.js"), ROOT)
            .unwrap();
        assert_eq!(entry.source, 2);
        assert_eq!(entry.library, "jquery");
        assert_eq!(entry.version.as_deref(), Some("3.6.0"));
        assert_eq!(entry.rest, "dist/jquery.min.js");
        assert_eq!(entry.file_name(), "jquery.min.js");
    }

    #[test]
    fn test_parse_unversioned_entry() {
        let entry = AssetEntry::parse(0, &format!("{ROOT}/fonts/css/fonts.css"), ROOT).unwrap();
        assert_eq!(entry.version, None);
        assert_eq!(entry.rest, "css/fonts.css");

        let entry = AssetEntry::parse(0, &format!("{ROOT}/lib/1.0"), ROOT).unwrap();
        assert_eq!(entry.version, None);
        assert_eq!(entry.rest, "1.0");
    }

    #[test]
    fn test_parse_outside_root() {
        assert!(AssetEntry::parse(0, "META-INF/MANIFEST.MF", ROOT).is_none());
        assert!(AssetEntry::parse(0, &format!("{ROOT}/jquery"), ROOT).is_none());
        assert!(AssetEntry::parse(0, &format!("{ROOT}x/jquery/1/a.js"), ROOT).is_none());
    }

    #[test]
    fn test_resolve_request_path_with_prefix() {
        let idx = index(&["jquery/3.6.0/jquery.min.js"]);
        let entry = idx.resolve("/webjars/jquery/jquery.min.js").unwrap();
        assert_eq!(entry.path, format!("{ROOT}/jquery/3.6.0/jquery.min.js"));
    }

    #[test]
    fn test_resolve_partial_name() {
        let idx = index(&["jquery/3.6.0/dist/jquery.min.js"]);
        assert!(idx.resolve("jquery.min.js").is_ok());
        assert!(idx.resolve("dist/jquery.min.js").is_ok());
        assert!(idx.resolve("/webjars/jquery/3.6.0/dist/jquery.min.js").is_ok());
    }

    #[test]
    fn test_resolve_not_found() {
        let idx = index(&["jquery/3.6.0/jquery.min.js"]);
        assert!(matches!(idx.resolve("/webjars/missing/none.js"), Err(AssetError::NotFound { .. })));
        assert!(matches!(idx.resolve("/"), Err(AssetError::NotFound { .. })));
        // same file name, incompatible directory
        assert!(matches!(
            idx.resolve("/webjars/jquery/other/jquery.min.js"),
            Err(AssetError::NotFound { .. })
        ));
    }

    #[test]
    fn test_unmatched_leading_segments_are_not_found() {
        let idx = index(&["jquery/3.6.0/jquery.min.js"]);
        for path in [
            "/evil/jquery/jquery.min.js",
            "/webjars/junk123/x/y/jquery/jquery.min.js",
            "/webjars/jquery/3.6.0/extra/jquery.min.js",
            "/other/webjars/jquery/jquery.min.js",
        ] {
            assert!(
                matches!(idx.resolve(path), Err(AssetError::NotFound { .. })),
                "{path}"
            );
        }
        assert!(idx.resolve("/META-INF/resources/webjars/jquery/3.6.0/jquery.min.js").is_ok());
    }

    #[test]
    fn test_empty_segments_are_ignored() {
        let idx = index(&["jquery/3.6.0/jquery.min.js"]);
        let entry = idx.resolve("/webjars//jquery///jquery.min.js").unwrap();
        assert_eq!(entry.path, format!("{ROOT}/jquery/3.6.0/jquery.min.js"));
    }

    #[test]
    fn test_digit_led_folder_counts_as_version() {
        let idx = index(&["icons/1x/a.png", "icons/2x/a.png"]);
        let entry = idx.iter().next().unwrap();
        assert_eq!(entry.version.as_deref(), Some("1x"));
        assert_eq!(entry.rest, "a.png");

        // both collapse into one (library, rest) pair; the higher folder wins
        let resolved = idx.resolve("a.png").unwrap();
        assert_eq!(resolved.path, format!("{ROOT}/icons/2x/a.png"));
        let pinned = idx.resolve("/webjars/icons/1x/a.png").unwrap();
        assert_eq!(pinned.path, format!("{ROOT}/icons/1x/a.png"));
    }

    #[test]
    fn test_most_specific_candidate_wins() {
        let idx = index(&["jquery/3.6.0/jquery.min.js", "legacy/1.0.0/jquery.min.js"]);
        let entry = idx.resolve("/webjars/jquery/jquery.min.js").unwrap();
        assert_eq!(entry.library, "jquery");
        let entry = idx.resolve("/webjars/legacy/1.0.0/jquery.min.js").unwrap();
        assert_eq!(entry.library, "legacy");
    }

    #[test]
    fn test_unscoped_ambiguity() {
        let idx = index(&["jquery/3.6.0/jquery.min.js", "legacy/1.0.0/jquery.min.js"]);
        match idx.resolve("jquery.min.js") {
            Err(AssetError::Ambiguous { candidates, .. }) => {
                assert_eq!(
                    candidates,
                    vec![
                        format!("{ROOT}/jquery/3.6.0/jquery.min.js"),
                        format!("{ROOT}/legacy/1.0.0/jquery.min.js"),
                    ]
                );
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn test_scoped_lookup_removes_ambiguity() {
        let idx = index(&["jquery/3.6.0/jquery.min.js", "legacy/1.0.0/jquery.min.js"]);
        let entry = idx.resolve_in("legacy", "jquery.min.js").unwrap();
        assert_eq!(entry.library, "legacy");
        assert!(matches!(
            idx.resolve_in("bootstrap", "jquery.min.js"),
            Err(AssetError::NotFound { .. })
        ));
    }

    #[test]
    fn test_highest_version_wins() {
        let idx = index(&[
            "jquery/3.6.0/jquery.min.js",
            "jquery/3.10.1/jquery.min.js",
            "jquery/3.7.0/jquery.min.js",
        ]);
        let entry = idx.resolve("/webjars/jquery/jquery.min.js").unwrap();
        assert_eq!(entry.version.as_deref(), Some("3.10.1"));

        let pinned = idx.resolve("/webjars/jquery/3.6.0/jquery.min.js").unwrap();
        assert_eq!(pinned.version.as_deref(), Some("3.6.0"));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let idx = index(&["a/1.0/x.js", "a/2.0/x.js", "b/1.0/y/x.js"]);
        let first = idx.resolve("/webjars/a/x.js").unwrap();
        for _ in 0..10 {
            assert_eq!(idx.resolve("/webjars/a/x.js").unwrap(), first);
        }
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("1.2.3", "1.2.3"), Ordering::Equal);
        assert_eq!(compare_versions("1.2.10", "1.2.9"), Ordering::Greater);
        assert_eq!(compare_versions("1.2", "1.2.1"), Ordering::Less);
        assert_eq!(compare_versions("v2.0.0", "1.9.9"), Ordering::Greater);
        assert_eq!(compare_versions("5.3.0-alpha1", "5.3.0-alpha2"), Ordering::Less);
    }

    #[test]
    fn test_len_and_iter() {
        let idx = index(&["a/1.0/x.js", "b/1.0/y.css"]);
        assert_eq!(idx.len(), 2);
        assert!(!idx.is_empty());
        let libraries: Vec<_> = idx.iter().map(|e| e.library.as_str()).collect();
        assert_eq!(libraries, vec!["a", "b"]);
    }
}
