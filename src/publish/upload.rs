// SPDX-License-Identifier: MPL-2.0
//! Upload of post images with rollback.
//!
//! Each image is compressed and thumbnailed on the blocking pool, then the
//! image and its thumbnail are uploaded through the [`ObjectStore`] with the
//! retry policy. If any step fails, every object uploaded so far is deleted
//! before the error is returned. Deletion errors during rollback are logged
//! and otherwise ignored.

use futures_util::TryFutureExt;
use image_rs::RgbaImage;

use super::paths::{StoragePaths, JPEG_CONTENT_TYPE};
use super::post::PostImage;
use super::retry::RetryPolicy;
use crate::application::port::ObjectStore;
use crate::config::Config;
use crate::diagnostics::DiagnosticsHandle;
use crate::error::{Error, Result, SessionError};
use crate::media::{compress_for_upload, make_thumbnail, CompressionPolicy, ThumbnailPolicy};

/// Encoding and retry rules for one upload.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UploadOptions {
    pub compression: CompressionPolicy,
    pub thumbnail: ThumbnailPolicy,
    pub retry: RetryPolicy,
}

impl UploadOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            compression: CompressionPolicy::from_config(&config.upload),
            thumbnail: ThumbnailPolicy::from_config(&config.upload),
            retry: RetryPolicy::from_config(&config.retry),
        }
    }
}

/// Uploads `images` for `user_id` and returns them in order.
///
/// # Errors
///
/// - [`SessionError::EmptySelection`] when `images` is empty
/// - encoding errors and storage errors (after retries); anything uploaded
///   before the failure has been deleted
pub async fn upload_post_images<S: ObjectStore>(
    store: &S,
    user_id: &str,
    images: Vec<RgbaImage>,
    options: &UploadOptions,
    diagnostics: Option<&DiagnosticsHandle>,
) -> Result<Vec<PostImage>> {
    if images.is_empty() {
        return Err(SessionError::EmptySelection.into());
    }

    let mut uploaded = Vec::with_capacity(images.len() * 2);
    let mut posted = Vec::with_capacity(images.len());

    for (order, image) in images.into_iter().enumerate() {
        match upload_one(store, user_id, image, order, options, diagnostics, &mut uploaded).await {
            Ok(post_image) => posted.push(post_image),
            Err(err) => {
                rollback(store, &uploaded, diagnostics).await;
                return Err(err);
            }
        }
    }

    Ok(posted)
}

async fn upload_one<S: ObjectStore>(
    store: &S,
    user_id: &str,
    image: RgbaImage,
    order: usize,
    options: &UploadOptions,
    diagnostics: Option<&DiagnosticsHandle>,
    uploaded: &mut Vec<String>,
) -> Result<PostImage> {
    let compression = options.compression;
    let thumbnail_policy = options.thumbnail;
    let (full, thumbnail) = tokio::task::spawn_blocking(move || -> Result<_> {
        Ok((
            compress_for_upload(&image, &compression)?,
            make_thumbnail(&image, &thumbnail_policy)?,
        ))
    })
    .await??;

    let paths = StoragePaths::new(user_id);

    let url = options
        .retry
        .run("upload_image", diagnostics, || {
            store
                .upload(paths.image(), &full.bytes, JPEG_CONTENT_TYPE)
                .map_err(Error::from)
        })
        .await?;
    uploaded.push(paths.image().to_string());

    let thumbnail_url = options
        .retry
        .run("upload_thumbnail", diagnostics, || {
            store
                .upload(paths.thumbnail(), &thumbnail.bytes, JPEG_CONTENT_TYPE)
                .map_err(Error::from)
        })
        .await?;
    uploaded.push(paths.thumbnail().to_string());

    Ok(PostImage {
        url,
        thumbnail: Some(thumbnail_url),
        width: full.width,
        height: full.height,
        order,
    })
}

async fn rollback<S: ObjectStore>(
    store: &S,
    uploaded: &[String],
    diagnostics: Option<&DiagnosticsHandle>,
) {
    for path in uploaded.iter().rev() {
        if let Err(err) = store.delete(path).await {
            if let Some(diagnostics) = diagnostics {
                diagnostics.log_warning(format!("rollback could not delete {path}: {err}"));
            }
        }
    }
}
