// SPDX-License-Identifier: MPL-2.0
//! Object paths for uploaded post images.

use uuid::Uuid;

/// Content type of every uploaded object.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

const POSTS_PREFIX: &str = "posts";
const THUMBNAILS_PREFIX: &str = "thumbnails";

/// Image and thumbnail paths of one uploaded image. Both share the same id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    id: Uuid,
    image: String,
    thumbnail: String,
}

impl StoragePaths {
    /// Paths under a fresh random id.
    #[must_use]
    pub fn new(user_id: &str) -> Self {
        Self::with_id(user_id, Uuid::new_v4())
    }

    #[must_use]
    pub fn with_id(user_id: &str, id: Uuid) -> Self {
        Self {
            id,
            image: format!("{POSTS_PREFIX}/{user_id}/{id}.jpg"),
            thumbnail: format!("{THUMBNAILS_PREFIX}/{user_id}/{id}.jpg"),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// `posts/{userId}/{uuid}.jpg`
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// `thumbnails/{userId}/{uuid}.jpg`
    #[must_use]
    pub fn thumbnail(&self) -> &str {
        &self.thumbnail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_bucket_layout() {
        let id = Uuid::nil();
        let paths = StoragePaths::with_id("user-1", id);
        assert_eq!(
            paths.image(),
            "posts/user-1/00000000-0000-0000-0000-000000000000.jpg"
        );
        assert_eq!(
            paths.thumbnail(),
            "thumbnails/user-1/00000000-0000-0000-0000-000000000000.jpg"
        );
    }

    #[test]
    fn image_and_thumbnail_share_one_id() {
        let paths = StoragePaths::new("u");
        let id = paths.id().to_string();
        assert!(paths.image().contains(&id));
        assert!(paths.thumbnail().contains(&id));
        assert_eq!(paths.id().get_version_num(), 4);
    }

    #[test]
    fn fresh_paths_never_collide() {
        assert_ne!(StoragePaths::new("u"), StoragePaths::new("u"));
    }
}
