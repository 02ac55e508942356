//! Persists sitemaps as `<root>/<name>.txt`, replacing any previous version atomically.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use data_model_smap::SitemapDocument;
use tempfile::NamedTempFile;
use thiserror::Error;

/// File extension of every written sitemap.
pub const SITEMAP_EXTENSION: &str = "txt";

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("invalid sitemap name '{0}'")]
    InvalidName(String),
    #[error("storage root missing or not writable ({}): {source}", path.display())]
    StorageRoot { path: PathBuf, source: io::Error },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Writes sitemap documents into a public storage directory.
#[derive(Debug, Clone)]
pub struct SitemapWriter {
    root: PathBuf,
}

impl SitemapWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic location of the sitemap called `name`.
    pub fn sitemap_path(&self, name: &str) -> Result<PathBuf, WriteError> {
        let name = validate_name(name)?;
        Ok(self.root.join(format!("{}.{}", name, SITEMAP_EXTENSION)))
    }

    /// Replaces `<root>/<name>.txt` with the rendered document.
    ///
    /// The content goes to a temporary file in the same directory first and is renamed over the
    /// target, so readers see either the old file or the complete new one.
    pub fn write(&self, name: &str, document: &SitemapDocument) -> Result<PathBuf, WriteError> {
        let target = self.sitemap_path(name)?;
        ensure_storage_root(&self.root)?;

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(document.render().as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| WriteError::Io(e.error))?;

        Ok(target)
    }
}

/// Creates the storage root if it is missing.
fn ensure_storage_root(dir: &Path) -> Result<(), WriteError> {
    let storage_error = |source: io::Error| WriteError::StorageRoot {
        path: dir.to_path_buf(),
        source,
    };

    if dir.exists() {
        let meta = fs::metadata(dir).map_err(storage_error)?;
        if !meta.is_dir() {
            return Err(storage_error(io::Error::other("path is not a directory")));
        }
        Ok(())
    } else {
        fs::create_dir_all(dir).map_err(storage_error)
    }
}

/// A sitemap name must stay a single plain file name inside the storage root.
fn validate_name(name: &str) -> Result<&str, WriteError> {
    let trimmed = name.trim();
    let invalid = trimmed.is_empty()
        || trimmed.starts_with('.')
        || trimmed.contains("..")
        || trimmed.chars().any(|c| matches!(c, '/' | '\\' | '\0'..='\u{1F}'));
    if invalid {
        Err(WriteError::InvalidName(name.to_string()))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use data_model_smap::SitemapUrl;

    use super::*;

    fn document(tokens: &[&str]) -> SitemapDocument {
        tokens.iter().map(|t| SitemapUrl::new(t, "pcdm")).collect()
    }

    #[test]
    fn test_sitemap_path() {
        let writer = SitemapWriter::new("/var/www/public");
        assert_eq!(
            writer.sitemap_path("biology").unwrap(),
            PathBuf::from("/var/www/public/biology.txt")
        );
        assert_eq!(
            writer.sitemap_path(" alldiscoverable ").unwrap(),
            PathBuf::from("/var/www/public/alldiscoverable.txt")
        );
    }

    #[test]
    fn test_rejects_unsafe_names() {
        let writer = SitemapWriter::new("/tmp");
        for name in ["", "   ", "../etc/passwd", "a/b", "a\\b", ".hidden", "tab\tname", "x..y"] {
            assert!(
                matches!(writer.sitemap_path(name), Err(WriteError::InvalidName(_))),
                "expected '{}' to be rejected",
                name
            );
        }
    }

    #[test]
    fn test_write_creates_root_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("public").join("sitemaps");
        let writer = SitemapWriter::new(&root);

        let path = writer.write("biology", &document(&["a", "b"])).unwrap();
        assert_eq!(path, root.join("biology.txt"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "/result/id/a?relpath=pcdm\n/result/id/b?relpath=pcdm"
        );
    }

    #[test]
    fn test_write_replaces_previous_version() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SitemapWriter::new(dir.path());

        writer.write("biology", &document(&["a", "b", "c"])).unwrap();
        let path = writer.write("biology", &document(&["z"])).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "/result/id/z?relpath=pcdm");
        // No temporary files are left behind.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_fails_when_root_is_a_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let writer = SitemapWriter::new(file.path());
        let result = writer.write("biology", &document(&["a"]));
        assert!(matches!(result, Err(WriteError::StorageRoot { .. })));
    }
}
