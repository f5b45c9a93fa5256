//! ObjectStore trait definition
//!
//! This trait defines the three bucket operations a deploy needs. It keeps the
//! sync engine decoupled from the S3 SDK and lets tests substitute a fake.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::metadata::Header;

/// An object already present in the bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObjectInfo {
    /// Object key
    pub key: String,

    /// ETag exactly as reported by the store (quoted)
    pub etag: Option<String>,

    /// Size in bytes
    pub size_bytes: i64,

    /// Last modified timestamp
    pub last_modified: Option<jiff::Timestamp>,
}

impl RemoteObjectInfo {
    /// Create a new RemoteObjectInfo with an ETag
    pub fn new(key: impl Into<String>, etag: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            etag: Some(etag.into()),
            size_bytes: 0,
            last_modified: None,
        }
    }
}

/// Result of a list operation
#[derive(Debug, Clone, Default)]
pub struct ListResult {
    /// Listed objects
    pub items: Vec<RemoteObjectInfo>,

    /// Whether the result is truncated (more items available)
    pub truncated: bool,

    /// Continuation token for pagination
    pub continuation_token: Option<String>,
}

/// Options for list operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Key prefix to list under
    pub prefix: String,

    /// Maximum number of keys to return per request
    pub max_keys: Option<i32>,

    /// Continuation token for pagination
    pub continuation_token: Option<String>,
}

/// A single object write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Destination key
    pub key: String,

    /// Local file whose bytes become the object body
    pub source: PathBuf,

    /// Size of the local file in bytes
    pub size_bytes: u64,

    /// Headers in application order
    pub headers: Vec<Header>,
}

impl UploadRequest {
    /// First header with the given name, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

/// Bucket-scoped storage operations
///
/// Implemented by the S3 adapter and mocked in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check that the target bucket exists
    async fn bucket_exists(&self) -> Result<bool>;

    /// List one page of objects under a prefix, recursively
    async fn list_objects(&self, options: ListOptions) -> Result<ListResult>;

    /// Create or overwrite an object from a local file
    async fn put_object(&self, request: &UploadRequest) -> Result<()>;
}
