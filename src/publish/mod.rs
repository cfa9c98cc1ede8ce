// SPDX-License-Identifier: MPL-2.0
//! Publishing edited photos: storage paths, retry, upload with rollback
//! and the post metadata document.
//!
//! - [`paths`]: `posts/` and `thumbnails/` object paths
//! - [`retry`]: Exponential backoff for system errors
//! - [`upload`]: Encode, upload and roll back on failure
//! - [`post`]: Metadata and image list attached to a post

pub mod paths;
pub mod post;
pub mod retry;
pub mod upload;

pub use paths::{StoragePaths, JPEG_CONTENT_TYPE};
pub use post::{PostImage, PostMetadata};
pub use retry::RetryPolicy;
pub use upload::{upload_post_images, UploadOptions};
