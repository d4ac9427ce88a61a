//! Asset sources: exploded directories, jar/zip archives and tarballs.
//!
//! A source lists the archive-internal paths it holds and streams a single
//! entry to a caller-supplied sink. Sources are loaded once and shared
//! read-only between request workers.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use flate2::read::GzDecoder;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::{AssetError, StreamError};

/// Receives an opened entry and copies it somewhere, returning bytes read.
pub type EntrySink<'a> = dyn FnMut(&mut dyn Read) -> io::Result<u64> + 'a;

/// A read-only collection of bundled resources.
pub trait AssetSource: Send + Sync + fmt::Debug {
    /// Human-readable identifier, usually the file name.
    fn name(&self) -> &str;

    /// Archive-internal paths of every file entry, `/`-separated.
    fn entry_paths(&self) -> Vec<String>;

    /// Opens `path` and hands the reader to `sink`.
    ///
    /// Failing to open the entry yields [`StreamError::Open`]; a failure
    /// returned by `sink` yields [`StreamError::Transfer`]. The reader is
    /// released before this returns on every path.
    fn read_entry(&self, path: &str, sink: &mut EntrySink<'_>) -> Result<u64, StreamError>;
}

/// Recognised archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// `.jar` or `.zip`.
    Jar,
    /// `.tar.gz` or `.tgz`.
    TarGz,
}

impl ArchiveKind {
    /// Detects the format from the file name.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".jar") || name.ends_with(".zip") {
            Some(Self::Jar)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else {
            None
        }
    }
}

/// Opens an archive file, choosing the reader by extension.
pub fn open_archive(path: &Path) -> Result<Box<dyn AssetSource>, AssetError> {
    match ArchiveKind::from_path(path) {
        Some(ArchiveKind::Jar) => Ok(Box::new(JarSource::open(path)?)),
        Some(ArchiveKind::TarGz) => Ok(Box::new(TarGzSource::open(path)?)),
        None => Err(AssetError::unsupported(
            path,
            "expected .jar, .zip, .tar.gz or .tgz",
        )),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

// ============================================================================
// Exploded directory
// ============================================================================

/// An unpacked archive on disk.
///
/// Entries are listed once at construction; reads go to the filesystem, so a
/// file removed afterwards fails to open.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    name: String,
    root: PathBuf,
    entries: Vec<String>,
}

impl DirectorySource {
    /// Lists every file under `root/resource_root`.
    pub fn open(root: impl Into<PathBuf>, resource_root: &str) -> Result<Self, AssetError> {
        let root = root.into();
        let resource_root = resource_root.trim_matches('/');
        let mut entries = Vec::new();

        let start = root.join(resource_root);
        if start.is_dir() {
            walk(&start, resource_root, &mut entries).map_err(|e| AssetError::load(&start, e))?;
        }
        entries.sort();

        debug!(root = %root.display(), entries = entries.len(), "directory source loaded");
        Ok(Self {
            name: display_name(&root),
            root,
            entries,
        })
    }

    /// The directory holding the resource root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn walk(dir: &Path, prefix: &str, out: &mut Vec<String>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        let relative = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk(&entry.path(), &relative, out)?;
        } else if file_type.is_file() {
            out.push(relative);
        }
    }
    Ok(())
}

impl AssetSource for DirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_paths(&self) -> Vec<String> {
        self.entries.clone()
    }

    fn read_entry(&self, path: &str, sink: &mut EntrySink<'_>) -> Result<u64, StreamError> {
        let mut file = File::open(self.root.join(path)).map_err(|e| StreamError::open(path, e))?;
        sink(&mut file).map_err(|e| StreamError::transfer(path, e))
    }
}

// ============================================================================
// Jar / zip
// ============================================================================

/// A jar or zip archive held in memory.
///
/// Each read works on its own clone of the archive handle, so concurrent
/// requests never contend on a shared cursor.
#[derive(Clone)]
pub struct JarSource {
    name: String,
    archive: zip::ZipArchive<Cursor<Bytes>>,
}

impl JarSource {
    /// Reads and indexes the archive at `path`.
    pub fn open(path: &Path) -> Result<Self, AssetError> {
        let data = fs::read(path).map_err(|e| AssetError::load(path, e))?;
        Self::from_bytes(display_name(path), Bytes::from(data))
            .map_err(|e| AssetError::load(path, e))
    }

    /// Indexes an in-memory archive.
    pub fn from_bytes(name: impl Into<String>, data: Bytes) -> io::Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data)).map_err(io::Error::other)?;
        let name = name.into();
        debug!(source = %name, entries = archive.len(), "jar source loaded");
        Ok(Self { name, archive })
    }
}

impl fmt::Debug for JarSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JarSource")
            .field("name", &self.name)
            .field("entries", &self.archive.len())
            .finish()
    }
}

impl AssetSource for JarSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_paths(&self) -> Vec<String> {
        self.archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(str::to_owned)
            .collect()
    }

    fn read_entry(&self, path: &str, sink: &mut EntrySink<'_>) -> Result<u64, StreamError> {
        let mut archive = self.archive.clone();
        let mut file = archive
            .by_name(path)
            .map_err(|e| StreamError::open(path, io::Error::other(e)))?;
        sink(&mut file).map_err(|e| StreamError::transfer(path, e))
    }
}

// ============================================================================
// Tarball
// ============================================================================

/// A gzip-compressed tarball, unpacked into memory at load time.
#[derive(Clone)]
pub struct TarGzSource {
    name: String,
    entries: IndexMap<String, Bytes>,
}

impl TarGzSource {
    /// Reads and unpacks the tarball at `path`.
    pub fn open(path: &Path) -> Result<Self, AssetError> {
        let data = fs::read(path).map_err(|e| AssetError::load(path, e))?;
        Self::from_bytes(display_name(path), &data).map_err(|e| AssetError::load(path, e))
    }

    /// Unpacks an in-memory tarball.
    pub fn from_bytes(name: impl Into<String>, data: &[u8]) -> io::Result<Self> {
        let mut archive = tar::Archive::new(GzDecoder::new(data));
        let mut entries = IndexMap::new();

        for entry in archive.entries()? {
            let mut entry = entry?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let path = entry.path()?.to_string_lossy().into_owned();
            let path = path.trim_start_matches("./").to_string();

            let mut content = Vec::new();
            entry.read_to_end(&mut content)?;
            entries.insert(path, Bytes::from(content));
        }

        let name = name.into();
        debug!(source = %name, entries = entries.len(), "tarball source loaded");
        Ok(Self { name, entries })
    }
}

impl fmt::Debug for TarGzSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TarGzSource")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl AssetSource for TarGzSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_paths(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn read_entry(&self, path: &str, sink: &mut EntrySink<'_>) -> Result<u64, StreamError> {
        let data = self
            .entries
            .get(path)
            .ok_or_else(|| StreamError::open(path, io::Error::from(io::ErrorKind::NotFound)))?;
        let mut reader: &[u8] = data;
        sink(&mut reader).map_err(|e| StreamError::transfer(path, e))
    }
}
