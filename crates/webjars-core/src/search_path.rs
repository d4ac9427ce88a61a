//! Ordered set of asset sources.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::dedup::DedupChain;
use crate::error::AssetError;
use crate::source::{open_archive, ArchiveKind, AssetSource, DirectorySource};

/// The archives and directories assets are served from, in priority order.
///
/// # Example
///
/// ```rust,no_run
/// use webjars_core::SearchPath;
///
/// let search_path = SearchPath::discover(["lib/", "vendor/jquery-3.6.0.jar"], "META-INF/resources/webjars")?;
/// println!("{} sources", search_path.len());
/// # Ok::<(), webjars_core::AssetError>(())
/// ```
#[derive(Debug, Default)]
pub struct SearchPath {
    sources: Vec<Box<dyn AssetSource>>,
}

impl SearchPath {
    /// Creates an empty search path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a source.
    #[must_use]
    pub fn with_source(mut self, source: impl AssetSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Appends a boxed source.
    pub fn push(&mut self, source: Box<dyn AssetSource>) {
        self.sources.push(source);
    }

    /// Loads every entry of a configured search path.
    ///
    /// Each entry is an archive file, an exploded directory containing
    /// `resource_root`, or a directory whose archive children are added in
    /// file-name order.
    pub fn discover<I, P>(entries: I, resource_root: &str) -> Result<Self, AssetError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut search_path = Self::new();

        for entry in entries {
            let path = entry.as_ref();
            let metadata = fs::metadata(path).map_err(|e| AssetError::load(path, e))?;

            if !metadata.is_dir() {
                search_path.push(open_archive(path)?);
                continue;
            }

            if path.join(resource_root.trim_matches('/')).is_dir() {
                search_path.push(Box::new(DirectorySource::open(path, resource_root)?));
                continue;
            }

            let mut archives: Vec<PathBuf> = fs::read_dir(path)
                .map_err(|e| AssetError::load(path, e))?
                .filter_map(Result::ok)
                .map(|child| child.path())
                .filter(|child| child.is_file() && ArchiveKind::from_path(child).is_some())
                .collect();
            archives.sort();

            debug!(dir = %path.display(), archives = archives.len(), "scanned archive directory");
            for archive in archives {
                search_path.push(open_archive(&archive)?);
            }
        }

        info!(sources = search_path.len(), "search path loaded");
        Ok(search_path)
    }

    /// Every `(source index, entry path)` pair, first source winning on
    /// duplicate paths.
    pub fn entries(&self) -> impl Iterator<Item = (usize, String)> + '_ {
        let per_source = self
            .sources
            .iter()
            .enumerate()
            .map(|(index, source)| source.entry_paths().into_iter().map(move |path| (index, path)));

        DedupChain::new(per_source, |(_, path): &(usize, String)| path.clone())
    }

    /// The source at `index`.
    pub fn source(&self, index: usize) -> Option<&dyn AssetSource> {
        self.sources.get(index).map(|source| &**source)
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true if there are no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
