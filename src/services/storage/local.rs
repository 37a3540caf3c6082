use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::storage::client::{
    ObjectStore, ObjectStoreError, ObjectStoreResult, StoredObject, validate_object_name,
};

/// Filesystem-backed object store.
///
/// Layout under `root/<bucket>/`:
/// - `objects/<name>`: raw bytes
/// - `meta/<name>.json`: content type, size, creation time
#[derive(Clone, Debug)]
pub struct LocalObjectStore {
    root: PathBuf,
    bucket: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMeta {
    content_type: Option<String>,
    size: u64,
    created_at: DateTime<Utc>,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
        }
    }

    fn bucket_dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    fn object_path(&self, name: &str) -> PathBuf {
        self.bucket_dir().join("objects").join(name)
    }

    fn meta_path(&self, name: &str) -> PathBuf {
        self.bucket_dir().join("meta").join(format!("{name}.json"))
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(
        &self,
        name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> ObjectStoreResult<()> {
        validate_object_name(name)?;

        let meta = ObjectMeta {
            content_type: content_type.map(str::to_owned),
            size: bytes.len() as u64,
            created_at: Utc::now(),
        };

        write_file(&self.object_path(name), bytes).await?;
        write_file(&self.meta_path(name), &serde_json::to_vec(&meta)?).await?;

        tracing::debug!(bucket = %self.bucket, object = %name, size = meta.size, "object stored");
        Ok(())
    }

    async fn get(&self, name: &str) -> ObjectStoreResult<StoredObject> {
        validate_object_name(name)?;

        let bytes = match tokio::fs::read(self.object_path(name)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ObjectStoreError::NotFound(name.to_string()));
            }
            // A directory at the object path is a miss, not a failure.
            Err(e) if e.kind() == std::io::ErrorKind::IsADirectory => {
                return Err(ObjectStoreError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let content_type = match tokio::fs::read(self.meta_path(name)).await {
            Ok(raw) => serde_json::from_slice::<ObjectMeta>(&raw)?.content_type,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(StoredObject {
            name: name.to_string(),
            content_type,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_keeps_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "bucket-a");

        store
            .put("uploads/1-report.pdf", Some("application/pdf"), b"%PDF")
            .await
            .unwrap();

        let object = store.get("uploads/1-report.pdf").await.unwrap();
        assert_eq!(object.bytes, b"%PDF");
        assert_eq!(object.content_type.as_deref(), Some("application/pdf"));
        assert!(dir.path().join("bucket-a/objects/uploads/1-report.pdf").exists());
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "bucket-a");

        let err = store.get("uploads/nope.txt").await.unwrap_err();
        assert!(matches!(err, ObjectStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn traversal_is_rejected_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "bucket-a");

        let err = store.put("../escape.txt", None, b"x").await.unwrap_err();
        assert!(matches!(err, ObjectStoreError::InvalidName(_)));
        assert!(!dir.path().join("escape.txt").exists());
    }
}
