//! Object store interface used by the file endpoints.
use async_trait::async_trait;
use thiserror::Error;

pub type ObjectStoreResult<T> = Result<T, ObjectStoreError>;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid object name: {0}")]
    InvalidName(String),
    #[error("object store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("object metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A single-bucket object store.
///
/// Object names are `/`-separated relative keys (e.g. `uploads/<id>-report.pdf`).
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    fn bucket(&self) -> &str;

    async fn put(
        &self,
        name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> ObjectStoreResult<()>;

    async fn get(&self, name: &str) -> ObjectStoreResult<StoredObject>;
}

/// Rejects names that could escape the bucket: absolute paths, `.`/`..`
/// segments, empty segments and backslashes.
pub fn validate_object_name(name: &str) -> ObjectStoreResult<()> {
    let invalid = name.is_empty()
        || name.starts_with('/')
        || name.contains('\\')
        || name.contains('\0')
        || name
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if invalid {
        return Err(ObjectStoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_relative_names() {
        assert!(validate_object_name("uploads/abc-report.pdf").is_ok());
        assert!(validate_object_name("a/b/c.txt").is_ok());
    }

    #[test]
    fn rejects_escaping_names() {
        for name in ["", "/etc/passwd", "../secret", "uploads/../../x", "a//b", "a\\b", "./a"] {
            assert!(
                matches!(validate_object_name(name), Err(ObjectStoreError::InvalidName(_))),
                "{name} should be rejected"
            );
        }
    }
}
