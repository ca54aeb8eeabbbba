//! Writing extracted images into the output tree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::naming::NamingPattern;
use crate::config::OutputFormat;
use crate::error::{PipelineError, PipelineResult};

/// Run-wide set of output paths already handed out.
///
/// Shared by every worker so two images never land on the same file.
#[derive(Debug, Default)]
pub struct PathRegistry {
    claimed: Mutex<HashSet<PathBuf>>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `path`, or the first free `stem_N.ext` variant of it.
    pub fn claim(&self, path: PathBuf) -> PathBuf {
        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        if claimed.insert(path.clone()) {
            return path;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
        let mut n = 1u32;
        loop {
            let name = match &ext {
                Some(ext) => format!("{}_{}.{}", stem, n, ext),
                None => format!("{}_{}", stem, n),
            };
            let candidate = path.with_file_name(name);
            if claimed.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Number of claimed paths.
    pub fn len(&self) -> usize {
        self.claimed.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolves output locations and writes image files.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    base: PathBuf,
    maintain_structure: bool,
    pattern: NamingPattern,
    format: OutputFormat,
    registry: Arc<PathRegistry>,
}

impl OutputWriter {
    /// Create a writer rooted at `base`.
    pub fn new(
        base: PathBuf,
        maintain_structure: bool,
        pattern: NamingPattern,
        format: OutputFormat,
        registry: Arc<PathRegistry>,
    ) -> Self {
        Self {
            base,
            maintain_structure,
            pattern,
            format,
            registry,
        }
    }

    /// Directory receiving the images of `pdf`.
    ///
    /// With `maintain_structure`, the PDF's path relative to `input_root`
    /// (minus `.pdf`) is appended to the base directory.
    pub fn target_dir(&self, pdf: &Path, input_root: &Path) -> PathBuf {
        if !self.maintain_structure {
            return self.base.clone();
        }
        self.base.join(relative_subpath(pdf, input_root))
    }

    /// Path an image would be written to, before collision suffixes.
    /// Nothing is claimed.
    pub fn candidate_path(&self, dir: &Path, page: u32, index: u32, pdf_name: &str) -> PathBuf {
        let stem = self.pattern.render(page, index, pdf_name);
        dir.join(format!("{}.{}", stem, self.format.extension()))
    }

    /// Claim a unique file path for one image.
    pub fn file_path(&self, dir: &Path, page: u32, index: u32, pdf_name: &str) -> PathBuf {
        self.registry.claim(self.candidate_path(dir, page, index, pdf_name))
    }

    /// Write `bytes` to `path`, creating parent directories.
    pub fn write(&self, path: &Path, bytes: &[u8]) -> PipelineResult<()> {
        let write_err = |e: std::io::Error| PipelineError::WriteError {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, bytes).map_err(write_err)?;
        tracing::debug!("Wrote {:?} ({} bytes)", path, bytes.len());
        Ok(())
    }
}

/// `pdf` relative to `root` without its extension; the file stem when
/// `pdf` is the root itself.
pub fn relative_subpath(pdf: &Path, root: &Path) -> PathBuf {
    match pdf.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.with_extension(""),
        _ => pdf
            .file_stem()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("document")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer(base: &Path, maintain: bool) -> OutputWriter {
        OutputWriter::new(
            base.to_path_buf(),
            maintain,
            NamingPattern::parse("page_{page:03d}_{index:03d}").unwrap(),
            OutputFormat::Png,
            Arc::new(PathRegistry::new()),
        )
    }

    #[test]
    fn test_mirrors_relative_path() {
        let w = writer(Path::new("/out"), true);
        let dir = w.target_dir(Path::new("/in/a/b/doc.pdf"), Path::new("/in"));
        assert_eq!(dir, PathBuf::from("/out/a/b/doc"));
    }

    #[test]
    fn test_flat_output() {
        let w = writer(Path::new("/out"), false);
        let dir = w.target_dir(Path::new("/in/a/doc.pdf"), Path::new("/in"));
        assert_eq!(dir, PathBuf::from("/out"));
    }

    #[test]
    fn test_single_file_input_uses_stem() {
        let w = writer(Path::new("/out"), true);
        let dir = w.target_dir(Path::new("/in/report.PDF"), Path::new("/in/report.PDF"));
        assert_eq!(dir, PathBuf::from("/out/report"));
    }

    #[test]
    fn test_file_name_from_pattern() {
        let w = writer(Path::new("/out"), true);
        let path = w.file_path(Path::new("/out/doc"), 2, 5, "doc");
        assert_eq!(path, PathBuf::from("/out/doc/page_002_005.png"));
    }

    #[test]
    fn test_candidate_path_claims_nothing() {
        let registry = Arc::new(PathRegistry::new());
        let w = OutputWriter::new(
            PathBuf::from("/out"),
            true,
            NamingPattern::parse("page_{page:03d}_{index:03d}").unwrap(),
            OutputFormat::Png,
            Arc::clone(&registry),
        );
        let dir = Path::new("/out/doc");
        let expected = PathBuf::from("/out/doc/page_001_000.png");

        assert_eq!(w.candidate_path(dir, 1, 0, "doc"), expected);
        assert_eq!(w.candidate_path(dir, 1, 0, "doc"), expected);
        assert!(registry.is_empty());
        assert_eq!(w.file_path(dir, 1, 0, "doc"), expected);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_collisions_get_suffixes() {
        let registry = PathRegistry::new();
        let p = PathBuf::from("/out/x.png");
        assert_eq!(registry.claim(p.clone()), p);
        assert_eq!(registry.claim(p.clone()), PathBuf::from("/out/x_1.png"));
        assert_eq!(registry.claim(p), PathBuf::from("/out/x_2.png"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let w = writer(dir.path(), true);
        let path = dir.path().join("nested/deeper/img.png");
        w.write(&path, b"data").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"data");
    }

    #[test]
    fn test_write_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let w = writer(dir.path(), true);
        let err = w.write(&blocker.join("img.png"), b"data").unwrap_err();
        assert!(matches!(err, PipelineError::WriteError { .. }));
    }
}
