// SPDX-License-Identifier: MPL-2.0
//! Working image cache for fast previews.
//!
//! # Design
//!
//! - **Single slot**: one downsampled, transformed copy of the selected source
//! - **Keyed**: by source index and transform signature; any difference is a miss
//! - **Eager**: a miss starts the rebuild on the blocking pool at once, even
//!   if the render that needs it is still waiting for its throttle window
//! - **Whole**: never patched, always rebuilt from the source
//! - **Shared rebuild**: a lookup during a rebuild awaits the same future
//!
//! Invalidation drops the slot. A rebuild already in flight runs to
//! completion for whoever holds its future, but its result never reaches the
//! cache.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::{BoxFuture, FutureExt, Shared, TryFutureExt};
use image_rs::RgbaImage;
use tokio::runtime::Handle;

use crate::diagnostics::{DiagnosticEventKind, DiagnosticsHandle};
use crate::domain::editing::{PreviewDimension, TransformSignature, TransformState};
use crate::error::ImageError;
use crate::media::{apply_transform, resize_to_fit};

/// Future resolving to a rebuilt working image.
pub type WorkingImageFuture = Shared<BoxFuture<'static, Result<Arc<RgbaImage>, ImageError>>>;

/// Identifies the working image of one source under one transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub image_index: usize,
    pub transform: TransformSignature,
}

impl CacheKey {
    #[must_use]
    pub fn new(image_index: usize, transform: &TransformState) -> Self {
        Self {
            image_index,
            transform: transform.signature(),
        }
    }
}

/// Observable cache state for a given key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing has been built yet.
    Idle,
    /// The slot holds the working image for the key.
    Valid,
    /// The slot is empty after an invalidation, holds another key, or the
    /// last rebuild failed.
    Stale,
    /// A rebuild for the key is in flight.
    Rebuilding,
}

/// Lookup and rebuild counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered by the slot (ready or already rebuilding).
    pub hits: u64,

    /// Lookups that started a rebuild.
    pub misses: u64,

    pub invalidations: u64,
}

/// Result of a cache lookup.
#[derive(Clone)]
pub enum WorkingImage {
    Ready(Arc<RgbaImage>),
    Pending(WorkingImageFuture),
}

impl WorkingImage {
    /// Waits for the working image if it is still being built.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::ProcessingFailed`] if the rebuild task failed.
    pub async fn resolve(self) -> Result<Arc<RgbaImage>, ImageError> {
        match self {
            WorkingImage::Ready(image) => Ok(image),
            WorkingImage::Pending(future) => future.await,
        }
    }
}

impl std::fmt::Debug for WorkingImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkingImage::Ready(image) => f
                .debug_tuple("Ready")
                .field(&image.dimensions())
                .finish(),
            WorkingImage::Pending(_) => f.write_str("Pending"),
        }
    }
}

enum Slot {
    Empty,
    Stale,
    Ready { key: CacheKey, image: Arc<RgbaImage> },
    Building { key: CacheKey, future: WorkingImageFuture },
}

/// Single-entry cache of the working image.
pub struct WorkingImageCache {
    max_dimension: PreviewDimension,
    runtime: Handle,
    slot: Slot,
    stats: CacheStats,
    diagnostics: Option<DiagnosticsHandle>,
}

impl WorkingImageCache {
    /// Creates an empty cache whose rebuilds run on `runtime`'s blocking
    /// pool.
    #[must_use]
    pub fn new(max_dimension: PreviewDimension, runtime: Handle) -> Self {
        Self {
            max_dimension,
            runtime,
            slot: Slot::Empty,
            stats: CacheStats::default(),
            diagnostics: None,
        }
    }

    /// Reports rebuilds to `handle`.
    #[must_use]
    pub fn with_diagnostics(mut self, handle: Option<DiagnosticsHandle>) -> Self {
        self.diagnostics = handle;
        self
    }

    #[must_use]
    pub fn max_dimension(&self) -> PreviewDimension {
        self.max_dimension
    }

    /// Returns the working image for `key`, starting a rebuild from `source`
    /// when the slot does not hold it.
    ///
    /// A rebuild starts on a blocking worker before this returns; the
    /// returned future only waits for it.
    pub fn lookup(
        &mut self,
        key: CacheKey,
        source: &Arc<RgbaImage>,
        transform: TransformState,
    ) -> WorkingImage {
        self.promote();

        match &self.slot {
            Slot::Ready { key: cached, image } if *cached == key => {
                self.stats.hits += 1;
                return WorkingImage::Ready(Arc::clone(image));
            }
            Slot::Building {
                key: cached,
                future,
            } if *cached == key => {
                self.stats.hits += 1;
                return WorkingImage::Pending(future.clone());
            }
            _ => {}
        }

        self.stats.misses += 1;
        let future = rebuild(
            &self.runtime,
            key,
            Arc::clone(source),
            transform,
            self.max_dimension.value(),
            self.diagnostics.clone(),
        );
        self.slot = Slot::Building {
            key,
            future: future.clone(),
        };
        WorkingImage::Pending(future)
    }

    /// Drops the cached image or in-flight rebuild.
    pub fn invalidate(&mut self) {
        if !matches!(self.slot, Slot::Empty) {
            self.stats.invalidations += 1;
        }
        self.slot = Slot::Stale;
    }

    /// Forgets everything, including the stale marker.
    pub fn clear(&mut self) {
        self.slot = Slot::Empty;
    }

    #[must_use]
    pub fn state(&self, key: CacheKey) -> CacheState {
        match &self.slot {
            Slot::Empty => CacheState::Idle,
            Slot::Stale => CacheState::Stale,
            Slot::Ready { key: cached, .. } if *cached == key => CacheState::Valid,
            Slot::Building {
                key: cached,
                future,
            } if *cached == key => match future.clone().now_or_never() {
                Some(Ok(_)) => CacheState::Valid,
                Some(Err(_)) => CacheState::Stale,
                None => CacheState::Rebuilding,
            },
            Slot::Ready { .. } | Slot::Building { .. } => CacheState::Stale,
        }
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Moves a finished rebuild into the ready slot.
    fn promote(&mut self) {
        let next = match &self.slot {
            Slot::Building { key, future } => match future.clone().now_or_never() {
                Some(Ok(image)) => Some(Slot::Ready { key: *key, image }),
                Some(Err(_)) => Some(Slot::Stale),
                None => None,
            },
            _ => None,
        };
        if let Some(slot) = next {
            self.slot = slot;
        }
    }
}

impl std::fmt::Debug for WorkingImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = match &self.slot {
            Slot::Empty => "empty",
            Slot::Stale => "stale",
            Slot::Ready { .. } => "ready",
            Slot::Building { .. } => "building",
        };
        f.debug_struct("WorkingImageCache")
            .field("max_dimension", &self.max_dimension.value())
            .field("slot", &slot)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Downsamples `source` to `max_dimension` and applies `transform`.
#[must_use]
pub fn build_working_image(
    source: &RgbaImage,
    transform: &TransformState,
    max_dimension: u32,
) -> RgbaImage {
    apply_transform(&resize_to_fit(source, max_dimension), transform)
}

fn rebuild(
    runtime: &Handle,
    key: CacheKey,
    source: Arc<RgbaImage>,
    transform: TransformState,
    max_dimension: u32,
    diagnostics: Option<DiagnosticsHandle>,
) -> WorkingImageFuture {
    let task = runtime.spawn_blocking(move || {
        let started = Instant::now();
        let image = build_working_image(&source, &transform, max_dimension);
        if let Some(handle) = &diagnostics {
            handle.log(DiagnosticEventKind::CacheRebuilt {
                image_index: key.image_index,
                duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                width: image.width(),
                height: image.height(),
            });
        }
        Arc::new(image)
    });

    task.map_err(|err| ImageError::ProcessingFailed(err.to_string()))
        .boxed()
        .shared()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{BufferCapacity, DiagnosticsCollector};
    use image_rs::Rgba;
    use std::time::Duration;

    fn source(width: u32, height: u32) -> Arc<RgbaImage> {
        Arc::new(RgbaImage::from_pixel(width, height, Rgba([90, 140, 200, 255])))
    }

    fn cache() -> WorkingImageCache {
        WorkingImageCache::new(PreviewDimension::new(64), Handle::current())
    }

    async fn wait_until_valid(cache: &WorkingImageCache, key: CacheKey) {
        for _ in 0..500 {
            if cache.state(key) == CacheState::Valid {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }

    #[tokio::test]
    async fn first_lookup_builds_downsampled_image() {
        let mut cache = cache();
        let key = CacheKey::new(0, &TransformState::default());
        assert_eq!(cache.state(key), CacheState::Idle);

        let pending = cache.lookup(key, &source(256, 128), TransformState::default());
        assert!(matches!(pending, WorkingImage::Pending(_)));
        // The blocking worker may already be done.
        assert!(matches!(
            cache.state(key),
            CacheState::Rebuilding | CacheState::Valid
        ));

        let image = pending.resolve().await.expect("rebuild");
        assert_eq!(image.dimensions(), (64, 32));
        assert_eq!(cache.state(key), CacheState::Valid);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn lookup_after_rebuild_is_a_hit() {
        let mut cache = cache();
        let key = CacheKey::new(0, &TransformState::default());
        let src = source(128, 128);

        let first = cache
            .lookup(key, &src, TransformState::default())
            .resolve()
            .await
            .expect("rebuild");
        let second = cache.lookup(key, &src, TransformState::default());

        match second {
            WorkingImage::Ready(image) => assert!(Arc::ptr_eq(&image, &first)),
            WorkingImage::Pending(_) => panic!("expected a ready image"),
        }
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn concurrent_lookups_share_one_rebuild() {
        let mut cache = cache();
        let key = CacheKey::new(0, &TransformState::default());
        let src = source(128, 128);

        let first = cache.lookup(key, &src, TransformState::default());
        let second = cache.lookup(key, &src, TransformState::default());

        let (a, b) = tokio::join!(first.resolve(), second.resolve());
        assert!(Arc::ptr_eq(&a.expect("rebuild"), &b.expect("rebuild")));
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn transform_change_is_a_miss() {
        let mut cache = cache();
        let src = source(100, 50);
        let identity = TransformState::default();
        let mut rotated = identity;
        rotated.rotate_right();

        let _ = cache
            .lookup(CacheKey::new(0, &identity), &src, identity)
            .resolve()
            .await;
        assert_eq!(cache.state(CacheKey::new(0, &rotated)), CacheState::Stale);

        let image = cache
            .lookup(CacheKey::new(0, &rotated), &src, rotated)
            .resolve()
            .await
            .expect("rebuild");
        assert_eq!(image.dimensions(), (32, 64));
        assert_eq!(cache.stats().misses, 2);
    }

    #[tokio::test]
    async fn invalidate_marks_slot_stale() {
        let mut cache = cache();
        let key = CacheKey::new(0, &TransformState::default());
        let _ = cache
            .lookup(key, &source(32, 32), TransformState::default())
            .resolve()
            .await;

        cache.invalidate();
        assert_eq!(cache.state(key), CacheState::Stale);
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[tokio::test]
    async fn invalidated_rebuild_never_reaches_the_slot() {
        let mut cache = cache();
        let key = CacheKey::new(0, &TransformState::default());
        let in_flight = cache.lookup(key, &source(32, 32), TransformState::default());

        cache.invalidate();
        let _ = in_flight.resolve().await;

        assert_eq!(cache.state(key), CacheState::Stale);
        let again = cache.lookup(key, &source(32, 32), TransformState::default());
        assert!(matches!(again, WorkingImage::Pending(_)));
    }

    #[tokio::test]
    async fn rebuild_is_logged() {
        let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
        let mut cache = cache().with_diagnostics(Some(collector.handle()));
        let key = CacheKey::new(2, &TransformState::default());

        let _ = cache
            .lookup(key, &source(128, 64), TransformState::default())
            .resolve()
            .await;

        collector.process_pending();
        assert!(collector.kinds().any(|kind| matches!(
            kind,
            DiagnosticEventKind::CacheRebuilt {
                image_index: 2,
                width: 64,
                height: 32,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn rebuild_runs_without_anyone_awaiting_it() {
        let mut cache = cache();
        let key = CacheKey::new(0, &TransformState::default());

        drop(cache.lookup(key, &source(128, 64), TransformState::default()));
        wait_until_valid(&cache, key).await;

        assert_eq!(cache.state(key), CacheState::Valid);
        match cache.lookup(key, &source(128, 64), TransformState::default()) {
            WorkingImage::Ready(image) => assert_eq!(image.dimensions(), (64, 32)),
            WorkingImage::Pending(_) => panic!("expected a ready image"),
        }
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn build_working_image_resizes_then_transforms() {
        let mut transform = TransformState::default();
        transform.rotate_left();
        let image = build_working_image(&source(400, 200), &transform, 100);
        assert_eq!(image.dimensions(), (50, 100));
    }
}
