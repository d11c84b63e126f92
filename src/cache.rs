//! Single-slot cache for the last successfully processed document
//!
//! The browser original handed results to a follow-up page through
//! `localStorage["documentData"]`; here the slot is one JSON file on disk.
//! Each successful run overwrites it, there is no expiry, and a later
//! process reads it back with [`DocumentCache::load`].

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::types::CachedDocument;

/// File-backed single-slot document cache
#[derive(Clone, Debug)]
pub struct DocumentCache {
    path: PathBuf,
}

impl DocumentCache {
    /// Create a cache over the configured file path
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            path: config.path.clone(),
        }
    }

    /// Path of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the document, replacing any previous entry
    ///
    /// The write goes to a temporary file in the same directory first and is
    /// renamed into place, so a crash mid-write never leaves a torn entry.
    pub fn store(&self, document: &CachedDocument) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(document)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &json)?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            Error::Cache(format!(
                "failed to move {} into place: {e}",
                tmp_path.display()
            ))
        })?;

        tracing::debug!(path = %self.path.display(), id = %document.id, "cached document written");
        Ok(())
    }

    /// Read the cached entry, if one exists
    pub fn load(&self) -> Result<Option<CachedDocument>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let document = serde_json::from_slice(&bytes)
            .map_err(|e| Error::Cache(format!("corrupt cache entry: {e}")))?;
        Ok(Some(document))
    }

    /// Remove the cached entry if present
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentType;
    use tempfile::TempDir;

    fn cache_in(dir: &TempDir) -> DocumentCache {
        DocumentCache::new(&CacheConfig {
            path: dir.path().join("document_data.json"),
        })
    }

    fn sample(id: &str, markdown: &str) -> CachedDocument {
        CachedDocument {
            id: id.to_string(),
            markdown: markdown.to_string(),
            chunks: None,
            document_type: DocumentType::new("invoice"),
            preview_url: None,
        }
    }

    #[test]
    fn store_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let doc = sample("abc123", "# Title");

        cache.store(&doc).unwrap();
        let loaded = cache.load().unwrap();

        assert_eq!(loaded, Some(doc));
    }

    #[test]
    fn load_missing_entry_is_none() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        assert_eq!(cache.load().unwrap(), None);
    }

    #[test]
    fn store_overwrites_previous_entry() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        cache.store(&sample("first", "one")).unwrap();
        cache.store(&sample("second", "two")).unwrap();

        let loaded = cache.load().unwrap().unwrap();
        assert_eq!(loaded.id, "second");
        assert_eq!(loaded.markdown, "two");
    }

    #[test]
    fn store_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let cache = DocumentCache::new(&CacheConfig {
            path: dir.path().join("nested/state/document_data.json"),
        });

        cache.store(&sample("x", "y")).unwrap();
        assert!(cache.load().unwrap().is_some());
    }

    #[test]
    fn clear_removes_entry_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);

        cache.store(&sample("x", "y")).unwrap();
        cache.clear().unwrap();
        assert_eq!(cache.load().unwrap(), None);

        // Clearing an already-empty slot is fine
        cache.clear().unwrap();
    }

    #[test]
    fn corrupt_entry_reports_cache_error() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        std::fs::write(cache.path(), b"{ not json").unwrap();

        let err = cache.load().unwrap_err();
        assert!(matches!(err, Error::Cache(_)));
    }

    #[test]
    fn stored_json_uses_wire_field_names() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let doc = CachedDocument {
            preview_url: Some("https://cdn.example.com/p.png".to_string()),
            ..sample("abc123", "# Title")
        };

        cache.store(&doc).unwrap();

        let raw = std::fs::read_to_string(cache.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["id"], "abc123");
        assert_eq!(json["markdown"], "# Title");
        assert_eq!(json["document_type"], "invoice");
        assert_eq!(json["previewUrl"], "https://cdn.example.com/p.png");
    }

    #[test]
    fn no_temp_file_left_behind_after_store() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        cache.store(&sample("x", "y")).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["document_data.json".to_string()]);
    }
}
