// SPDX-License-Identifier: MPL-2.0
//! Object storage port definition.
//!
//! Uploaded images and thumbnails go to a binary object store (a cloud
//! bucket in the app). The editing core only needs upload and delete;
//! progress reporting stays in the adapter.

use crate::error::ErrorCategory;
use std::fmt;
use std::future::Future;

// =============================================================================
// StorageError
// =============================================================================

/// Errors reported by an [`ObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Transport failure (timeout, connection reset).
    Network(String),

    /// The service is temporarily unavailable.
    Unavailable,

    /// The caller is not allowed to write the path.
    PermissionDenied,

    /// The object does not exist.
    NotFound(String),

    /// The account storage quota is exhausted.
    QuotaExceeded,
}

impl StorageError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            StorageError::Network(_) | StorageError::Unavailable => ErrorCategory::System,
            StorageError::PermissionDenied => ErrorCategory::User,
            StorageError::NotFound(_) | StorageError::QuotaExceeded => ErrorCategory::Business,
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Network(msg) => write!(f, "Network error: {msg}"),
            StorageError::Unavailable => write!(f, "Storage service unavailable"),
            StorageError::PermissionDenied => write!(f, "Permission denied"),
            StorageError::NotFound(path) => write!(f, "Object not found: {path}"),
            StorageError::QuotaExceeded => write!(f, "Storage quota exceeded"),
        }
    }
}

impl std::error::Error for StorageError {}

// =============================================================================
// ObjectStore
// =============================================================================

/// Binary object storage.
pub trait ObjectStore: Send + Sync {
    /// Uploads `bytes` to `path` and returns the object's download URL.
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;

    /// Deletes the object at `path`.
    fn delete(&self, path: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}
