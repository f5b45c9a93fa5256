//! Local tree traversal
//!
//! Yields every regular file under the source root, in file-name order, with
//! its `/`-separated path relative to the root and its extension.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// A file discovered under the source root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Path as found on disk
    pub path: PathBuf,

    /// Path relative to the source root, `/`-separated
    pub relative: String,

    /// Extension including the leading dot, or empty
    pub extension: String,

    /// Size in bytes
    pub size_bytes: u64,
}

impl LocalFile {
    /// Destination key for this file under `prefix`
    pub fn remote_key(&self, prefix: &str) -> String {
        remote_key(prefix, &self.relative)
    }
}

/// Join a destination prefix and a relative path into an object key
///
/// An empty prefix yields the relative path unchanged; otherwise exactly one
/// `/` separates the two.
pub fn remote_key(prefix: &str, relative: &str) -> String {
    if prefix.is_empty() {
        relative.to_string()
    } else if prefix.ends_with('/') {
        format!("{prefix}{relative}")
    } else {
        format!("{prefix}/{relative}")
    }
}

/// Extension of a file name: the text from the last dot, unless the only
/// dot is the leading one of a dotfile
pub fn extension_of(file_name: &str) -> &str {
    let stem_start = file_name.len() - file_name.trim_start_matches('.').len();
    match file_name[stem_start..].rfind('.') {
        Some(pos) => &file_name[stem_start + pos..],
        None => "",
    }
}

/// Walk `root` and yield its files
///
/// Symlinks are followed. A missing or unreadable root surfaces as the first
/// item's error.
pub fn scan(root: &Path) -> impl Iterator<Item = Result<LocalFile>> + '_ {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => return Some(Err(Error::from(e))),
            };
            if !entry.file_type().is_file() {
                return None;
            }
            Some(local_file(root, entry))
        })
}

fn local_file(root: &Path, entry: walkdir::DirEntry) -> Result<LocalFile> {
    let size_bytes = entry.metadata()?.len();
    let path = entry.into_path();
    let relative = path
        .strip_prefix(root)
        .unwrap_or(&path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let extension = path
        .file_name()
        .map(|name| extension_of(&name.to_string_lossy()).to_string())
        .unwrap_or_default();

    Ok(LocalFile {
        path,
        relative,
        extension,
        size_bytes,
    })
}
