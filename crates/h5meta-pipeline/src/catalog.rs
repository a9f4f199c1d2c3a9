//! The manifest of container files to scan.
//!
//! A manifest is plain UTF-8 text holding whitespace-separated paths with no
//! header. Entry order is the order of the tokens in the file and is what the
//! partitioner assigns work by.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{CatalogError, CatalogResult};

/// Manifest file name used when none is given.
pub const DEFAULT_MANIFEST: &str = "path.log";

/// File extensions picked up by [`discover`] by default: the container
/// descriptions a shipped reader can open.
pub const DEFAULT_EXTENSIONS: &[&str] = &["json"];

/// One source path and its 0-based position in the manifest.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub position: usize,
    pub path: String,
}

/// Read the manifest at `path`.
pub fn load(path: &Path) -> CatalogResult<Vec<ManifestEntry>> {
    let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse(&text);
    debug!(manifest = %path.display(), entries = entries.len(), "loaded manifest");
    Ok(entries)
}

/// Split manifest text into entries.
pub fn parse(text: &str) -> Vec<ManifestEntry> {
    text.split_whitespace()
        .enumerate()
        .map(|(position, path)| ManifestEntry {
            position,
            path: path.to_string(),
        })
        .collect()
}

/// Find container files below `root`.
///
/// Returns absolute paths, sorted, of regular files whose extension matches
/// one of `extensions` (case-insensitive). Symlinks are not followed.
pub fn discover(root: &Path, extensions: &[&str]) -> CatalogResult<Vec<String>> {
    let root = fs::canonicalize(root).map_err(|source| CatalogError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in WalkDir::new(&root) {
        let entry = entry.map_err(|source| CatalogError::Walk {
            root: root.clone(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
        if matches {
            paths.push(entry.path().to_string_lossy().into_owned());
        }
    }
    paths.sort();
    debug!(root = %root.display(), found = paths.len(), "discovered containers");
    Ok(paths)
}

/// Write one path per line.
pub fn write_manifest(path: &Path, paths: &[String]) -> CatalogResult<()> {
    let io_error = |source: std::io::Error| CatalogError::Io {
        path: PathBuf::from(path),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let mut text = String::new();
    for p in paths {
        text.push_str(p);
        text.push('\n');
    }
    fs::write(path, text).map_err(io_error)
}
