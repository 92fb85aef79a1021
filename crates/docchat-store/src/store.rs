use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use docchat_core::error::{DocChatError, Result};
use docchat_core::types::DocumentRef;

/// Filesystem-backed store for staged documents.
///
/// One staged file per staging event; files are named by the staging id so
/// a re-upload never clobbers a file that an in-flight read still holds.
/// Format validation is not performed here — that is delegated to the
/// ingestion service.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    staging_dir: PathBuf,
}

impl DocumentStore {
    /// Create a store rooted at `staging_dir`, creating the directory if
    /// needed.
    pub fn new<P: Into<PathBuf>>(staging_dir: P) -> Result<Self> {
        let staging_dir = staging_dir.into();
        std::fs::create_dir_all(&staging_dir)?;
        info!("Document store ready at {}", staging_dir.display());
        Ok(Self { staging_dir })
    }

    /// Return the directory staged documents are written to.
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Persist document bytes and return a reference to the staged file.
    ///
    /// The bytes are written to an exclusively owned temp file in the staging
    /// directory, flushed and synced, then atomically renamed to the final
    /// path. On any failure the temp file is dropped and cleaned up; nothing
    /// appears at the final path.
    pub fn stage(&self, bytes: &[u8], filename: &str) -> Result<DocumentRef> {
        let id = Uuid::new_v4();
        let dest = self.staging_dir.join(staged_name(id, filename));

        let mut tmp = NamedTempFile::new_in(&self.staging_dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&dest)
            .map_err(|e| DocChatError::Storage(format!("persist staged document: {}", e)))?;

        debug!(
            id = %id,
            filename,
            size = bytes.len(),
            path = %dest.display(),
            "Document staged"
        );

        Ok(DocumentRef {
            id,
            filename: filename.to_string(),
            size: bytes.len() as u64,
            path: dest,
            staged_at: Utc::now(),
        })
    }

    /// Read the full bytes of a staged document (for preview or ingestion).
    pub fn read(&self, document: &DocumentRef) -> Result<Vec<u8>> {
        std::fs::read(&document.path).map_err(|e| {
            DocChatError::Storage(format!(
                "read staged document {}: {}",
                document.path.display(),
                e
            ))
        })
    }

    /// Delete a staged document's file.
    pub fn remove(&self, document: &DocumentRef) -> Result<()> {
        std::fs::remove_file(&document.path).map_err(|e| {
            DocChatError::Storage(format!(
                "remove staged document {}: {}",
                document.path.display(),
                e
            ))
        })?;
        debug!(id = %document.id, "Staged document removed");
        Ok(())
    }
}

/// Final on-disk name for a staged document.
///
/// Keyed by the staging id; the original extension is kept so external tools
/// can still recognize the file type.
fn staged_name(id: Uuid, filename: &str) -> String {
    match Path::new(filename).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}.{}", id, ext),
        _ => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, DocumentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("staging")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_new_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("a").join("b");
        let store = DocumentStore::new(&staging).unwrap();
        assert!(store.staging_dir().is_dir());
    }

    #[test]
    fn test_stage_writes_bytes() {
        let (_dir, store) = make_store();
        let doc = store.stage(b"pdf bytes here", "report.pdf").unwrap();

        assert_eq!(doc.filename, "report.pdf");
        assert_eq!(doc.size, 14);
        assert!(doc.path.exists());
        assert_eq!(std::fs::read(&doc.path).unwrap(), b"pdf bytes here");
    }

    #[test]
    fn test_stage_keeps_extension() {
        let (_dir, store) = make_store();
        let doc = store.stage(b"x", "notes.pdf").unwrap();
        assert_eq!(
            doc.path.extension().and_then(|e| e.to_str()),
            Some("pdf")
        );
    }

    #[test]
    fn test_stage_without_extension() {
        let (_dir, store) = make_store();
        let doc = store.stage(b"x", "README").unwrap();
        assert!(doc.path.exists());
        assert_eq!(doc.path.file_name().unwrap().to_str().unwrap(), doc.id.to_string());
    }

    #[test]
    fn test_stage_twice_yields_distinct_files() {
        let (_dir, store) = make_store();
        let first = store.stage(b"first", "doc.pdf").unwrap();
        let second = store.stage(b"second", "doc.pdf").unwrap();

        assert_ne!(first.id, second.id);
        assert_ne!(first.path, second.path);
        assert_eq!(store.read(&first).unwrap(), b"first");
        assert_eq!(store.read(&second).unwrap(), b"second");
    }

    #[test]
    fn test_read_roundtrip() {
        let (_dir, store) = make_store();
        let doc = store.stage(b"roundtrip content", "doc.pdf").unwrap();
        assert_eq!(store.read(&doc).unwrap(), b"roundtrip content");
    }

    #[test]
    fn test_read_missing_file_errors() {
        let (_dir, store) = make_store();
        let doc = store.stage(b"bytes", "doc.pdf").unwrap();
        std::fs::remove_file(&doc.path).unwrap();
        let result = store.read(&doc);
        assert!(matches!(result, Err(DocChatError::Storage(_))));
    }

    #[test]
    fn test_remove_deletes_file() {
        let (_dir, store) = make_store();
        let doc = store.stage(b"bytes", "doc.pdf").unwrap();
        store.remove(&doc).unwrap();
        assert!(!doc.path.exists());
    }

    #[test]
    fn test_remove_missing_file_errors() {
        let (_dir, store) = make_store();
        let doc = store.stage(b"bytes", "doc.pdf").unwrap();
        store.remove(&doc).unwrap();
        assert!(store.remove(&doc).is_err());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let (_dir, store) = make_store();
        store.stage(b"one", "a.pdf").unwrap();
        store.stage(b"two", "b.pdf").unwrap();

        let count = std::fs::read_dir(store.staging_dir()).unwrap().count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_stage_empty_bytes_still_writes() {
        // Input validation (rejecting empty uploads) belongs to the
        // orchestrator; the store itself stages whatever it is given.
        let (_dir, store) = make_store();
        let doc = store.stage(b"", "empty.pdf").unwrap();
        assert_eq!(doc.size, 0);
        assert!(doc.path.exists());
    }
}
