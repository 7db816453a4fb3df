//! Object storage for uploaded files (receipts, signatures, photos).
//!
//! Keys are path-like strings: `receipts/21CS042_1714732800000`,
//! `student-files/passport/u1-...-photo.jpg`. The default implementation
//! maps keys onto the local filesystem; an S3-style backend can be
//! swapped in by implementing [`BlobStore`].

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::BlobError;

/// Make an untrusted string safe to embed in a blob key: anything that
/// could read as a path separator or traversal is replaced.
///
/// Use this on user-supplied parts (filenames, email local parts) before
/// building a key; [`FsBlobStore`] rejects keys with bad components
/// outright.
pub fn sanitize_key_component(part: &str) -> String {
    let cleaned: String = part
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Metadata for a stored blob.
#[derive(Debug, Clone)]
pub struct BlobMeta {
    pub key: String,
    pub size: u64,
}

pub trait BlobStore: Send + Sync {
    /// Store a blob. Overwrites if the key already exists.
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError>;

    /// Retrieve a blob. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError>;

    /// Delete a blob. No-op if the key does not exist.
    fn delete(&self, key: &str) -> Result<(), BlobError>;

    /// Check whether a blob exists.
    fn exists(&self, key: &str) -> Result<bool, BlobError>;

    /// List blobs matching a key prefix, sorted by key.
    fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>, BlobError>;
}

/// BlobStore backed by a directory on the local filesystem.
///
/// Keys map to paths under `base_dir`; parent directories are created on
/// `put`. Keys are validated component-by-component, so `..`, absolute
/// paths, and empty segments are rejected before touching the filesystem.
pub struct FsBlobStore {
    base_dir: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `base_dir`, creating it if needed.
    pub fn open(base_dir: &Path) -> Result<Self, BlobError> {
        fs::create_dir_all(base_dir).map_err(|e| BlobError::Io(e.to_string()))?;
        debug!(base_dir = %base_dir.display(), "blob store opened");
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    /// Resolve a key to a filesystem path, rejecting traversal attempts.
    fn resolve(&self, key: &str) -> Result<PathBuf, BlobError> {
        if key.is_empty() || key.contains('\\') {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        let rel = Path::new(key);
        for component in rel.components() {
            match component {
                Component::Normal(_) => {}
                _ => return Err(BlobError::InvalidKey(key.to_string())),
            }
        }
        Ok(self.base_dir.join(rel))
    }

    fn walk(&self, dir: &Path, prefix: &str, out: &mut Vec<BlobMeta>) -> Result<(), BlobError> {
        if !dir.is_dir() {
            return Ok(());
        }
        let entries = fs::read_dir(dir).map_err(|e| BlobError::Io(e.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|e| BlobError::Io(e.to_string()))?;
            let path = entry.path();
            if path.is_dir() {
                self.walk(&path, prefix, out)?;
            } else if let Ok(rel) = path.strip_prefix(&self.base_dir) {
                let key = rel.to_string_lossy().into_owned();
                if key.starts_with(prefix) {
                    let meta = entry.metadata().map_err(|e| BlobError::Io(e.to_string()))?;
                    out.push(BlobMeta {
                        key,
                        size: meta.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BlobError::Io(e.to_string()))?;
        }
        fs::write(&path, data).map_err(|e| BlobError::Io(e.to_string()))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError> {
        let path = self.resolve(key)?;
        if !path.is_file() {
            return Ok(None);
        }
        fs::read(&path)
            .map(Some)
            .map_err(|e| BlobError::Io(e.to_string()))
    }

    fn delete(&self, key: &str) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        if path.is_file() {
            fs::remove_file(&path).map_err(|e| BlobError::Io(e.to_string()))?;
        }
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, BlobError> {
        Ok(self.resolve(key)?.is_file())
    }

    fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>, BlobError> {
        let mut out = Vec::new();
        self.walk(&self.base_dir, prefix, &mut out)?;
        out.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FsBlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn key_components_are_sanitized() {
        assert_eq!(sanitize_key_component("me photo.png"), "me_photo.png");
        assert_eq!(sanitize_key_component("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_key_component("a.student"), "a.student");
        assert_eq!(sanitize_key_component(""), "file");
        assert_eq!(sanitize_key_component("..."), "file");
    }

    #[test]
    fn put_get_delete() {
        let (_dir, store) = store();
        store.put("receipts/r1_123", b"pdf bytes").unwrap();
        assert!(store.exists("receipts/r1_123").unwrap());
        assert_eq!(store.get("receipts/r1_123").unwrap().unwrap(), b"pdf bytes");

        store.delete("receipts/r1_123").unwrap();
        assert!(!store.exists("receipts/r1_123").unwrap());
        assert_eq!(store.get("receipts/r1_123").unwrap(), None);
        // deleting again is a no-op
        store.delete("receipts/r1_123").unwrap();
    }

    #[test]
    fn list_by_prefix() {
        let (_dir, store) = store();
        store.put("receipts/a", b"1").unwrap();
        store.put("receipts/b", b"22").unwrap();
        store.put("signatures/c", b"3").unwrap();

        let metas = store.list("receipts/").unwrap();
        assert_eq!(metas.len(), 2);
        assert_eq!(metas[0].key, "receipts/a");
        assert_eq!(metas[1].key, "receipts/b");
        assert_eq!(metas[1].size, 2);
    }

    #[test]
    fn rejects_traversal_keys() {
        let (_dir, store) = store();
        assert!(store.put("", b"x").is_err());
        assert!(store.put("../escape", b"x").is_err());
        assert!(store.put("/absolute", b"x").is_err());
        assert!(store.put("a/../../b", b"x").is_err());
        assert!(store.get("..\\win").is_err());
    }
}
