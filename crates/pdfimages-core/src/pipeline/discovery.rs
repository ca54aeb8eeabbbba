//! File discovery for finding PDFs in directories.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Information about a discovered PDF.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// Discover PDF files at a path.
///
/// A file path is returned as a singleton regardless of its extension. A
/// directory is walked recursively (following symlinks) for files with a
/// case-insensitive `.pdf` extension, sorted by path.
pub fn discover(path: &Path) -> Vec<DiscoveredFile> {
    if path.is_file() {
        return std::fs::metadata(path)
            .map(|meta| {
                vec![DiscoveredFile {
                    path: path.to_path_buf(),
                    size: meta.len(),
                }]
            })
            .unwrap_or_default();
    }

    let mut files: Vec<DiscoveredFile> = WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_pdf(entry.path()))
        .filter_map(|entry| {
            entry.metadata().ok().map(|meta| DiscoveredFile {
                path: entry.path().to_path_buf(),
                size: meta.len(),
            })
        })
        .collect();

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

/// Whether `path` has a `.pdf` extension (any case).
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Total size of all discovered files.
pub fn total_size(files: &[DiscoveredFile]) -> u64 {
    files.iter().map(|f| f.size).sum()
}
