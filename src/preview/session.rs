// SPDX-License-Identifier: MPL-2.0
//! Interactive editing session.
//!
//! A [`PreviewSession`] owns the selected sources, the transform, the edit
//! settings and the working image cache. Slider moves go through
//! [`PreviewSession::request_fast_preview`], which throttles renders of the
//! cached working image; [`PreviewSession::finalize_edit`] renders the
//! full-resolution source once the gesture ends and publishes it scaled to
//! the preview size. [`PreviewSession::export`] returns the full-size result. Finished renders are
//! published on a `watch` channel, newest request wins.
//!
//! Every method that spawns work uses the runtime captured at construction.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image_rs::RgbaImage;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::cache::{CacheKey, CacheState, WorkingImage, WorkingImageCache};
use super::throttle::{RenderThrottle, ThrottleDecision};
use super::token::{RenderClass, RequestToken, RequestTokens};
use crate::analysis::{ImageAnalysis, SkyAnalyzer};
use crate::config::Config;
use crate::diagnostics::{DiagnosticEventKind, DiagnosticsHandle, InvalidationReason};
use crate::domain::editing::{EditSettings, EditTool, FilterType, TransformState};
use crate::error::{AnalysisError, Result, SessionError};
use crate::media::{apply_transform, resize_to_fit, FilterChain, RenderContext, SourceImage};

/// A published render.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub image: Arc<RgbaImage>,
    pub class: RenderClass,
    pub token: RequestToken,
    /// Index of the source the frame was rendered from.
    pub image_index: usize,
}

/// Render and cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewStats {
    pub renders_started: u64,
    pub renders_published: u64,
    /// Renders that finished after a newer request, or failed.
    pub renders_discarded: u64,
    pub cache_rebuilds: u64,
}

/// Handle to a full-quality render started by [`PreviewSession::finalize_edit`].
#[derive(Debug)]
pub struct RenderHandle {
    token: RequestToken,
    handle: JoinHandle<Option<PreviewFrame>>,
}

impl RenderHandle {
    #[must_use]
    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// Waits for the render. Returns `None` if a newer request superseded it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the render task was cancelled.
    pub async fn published(self) -> std::result::Result<Option<PreviewFrame>, SessionError> {
        self.handle.await.map_err(|_| SessionError::Closed)
    }
}

// =============================================================================
// Renderer
// =============================================================================

#[derive(Debug, Default)]
struct RenderCounters {
    started: AtomicU64,
    published: AtomicU64,
    discarded: AtomicU64,
}

enum RenderInput {
    Working(WorkingImage),
    FullResolution {
        source: Arc<RgbaImage>,
        transform: TransformState,
    },
}

struct RenderJob {
    token: RequestToken,
    input: RenderInput,
    settings: EditSettings,
    image_index: usize,
}

/// State shared between the session and its render tasks.
struct Renderer {
    chain: FilterChain,
    tokens: RequestTokens,
    frames: watch::Sender<Option<PreviewFrame>>,
    /// Longest side of published full renders.
    full_frame_dimension: u32,
    counters: RenderCounters,
    diagnostics: Option<DiagnosticsHandle>,
}

impl Renderer {
    async fn run(self: Arc<Self>, job: RenderJob) -> Option<PreviewFrame> {
        if !self.tokens.is_current(job.token) {
            self.discard(job.token);
            return None;
        }
        self.counters.started.fetch_add(1, Ordering::Relaxed);
        let started_at = Instant::now();

        let chain = self.chain.clone();
        let settings = job.settings;
        let context = RenderContext::random().with_diagnostics(self.diagnostics.clone());

        let rendered = match job.input {
            RenderInput::Working(working) => match working.resolve().await {
                Ok(image) => {
                    tokio::task::spawn_blocking(move || chain.render(&image, &settings, &context))
                        .await
                }
                Err(err) => {
                    self.fail(job.token, &err.to_string());
                    return None;
                }
            },
            RenderInput::FullResolution { source, transform } => {
                let max_dimension = self.full_frame_dimension;
                tokio::task::spawn_blocking(move || {
                    let rendered =
                        chain.render(&apply_transform(&source, &transform), &settings, &context);
                    resize_to_fit(&rendered, max_dimension)
                })
                .await
            }
        };

        match rendered {
            Ok(image) => self.publish(job.token, job.image_index, Arc::new(image), started_at),
            Err(err) => {
                self.fail(job.token, &err.to_string());
                None
            }
        }
    }

    fn publish(
        &self,
        token: RequestToken,
        image_index: usize,
        image: Arc<RgbaImage>,
        started_at: Instant,
    ) -> Option<PreviewFrame> {
        let frame = PreviewFrame {
            image,
            class: token.class(),
            token,
            image_index,
        };
        let candidate = frame.clone();
        let published = self.frames.send_if_modified(|slot| {
            if self.tokens.is_current(token) {
                *slot = Some(candidate);
                true
            } else {
                false
            }
        });

        if published {
            self.counters.published.fetch_add(1, Ordering::Relaxed);
            self.log(DiagnosticEventKind::PreviewPublished {
                class: token.class(),
                token: token.generation(),
                duration_ms: u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX),
                width: frame.image.width(),
                height: frame.image.height(),
            });
            Some(frame)
        } else {
            self.discard(token);
            None
        }
    }

    /// Counts and reports a render whose token was superseded.
    fn discard(&self, token: RequestToken) {
        self.counters.discarded.fetch_add(1, Ordering::Relaxed);
        self.log(DiagnosticEventKind::PreviewDiscarded {
            class: token.class(),
            token: token.generation(),
            latest: self.tokens.latest(token.class()),
        });
    }

    fn fail(&self, token: RequestToken, message: &str) {
        self.counters.discarded.fetch_add(1, Ordering::Relaxed);
        if let Some(handle) = &self.diagnostics {
            handle.log_error(format!(
                "{:?} render {} failed: {message}",
                token.class(),
                token.generation()
            ));
        }
    }

    fn log(&self, kind: DiagnosticEventKind) {
        if let Some(handle) = &self.diagnostics {
            handle.log(kind);
        }
    }
}

// =============================================================================
// Session
// =============================================================================

enum AnalysisSlot {
    Idle,
    Running(JoinHandle<Option<ImageAnalysis>>),
    Done(Option<ImageAnalysis>),
}

/// Editing session for one selection of source photos.
pub struct PreviewSession {
    sources: Vec<SourceImage>,
    current: usize,
    transform: TransformState,
    settings: EditSettings,
    cache: WorkingImageCache,
    throttle: RenderThrottle,
    renderer: Arc<Renderer>,
    runtime: Handle,
    analyzer: SkyAnalyzer,
    analysis: AnalysisSlot,
    diagnostics: Option<DiagnosticsHandle>,
}

impl PreviewSession {
    /// Creates an empty session rendering through `chain`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoRuntime`] when called outside a Tokio
    /// runtime.
    pub fn new(
        config: &Config,
        chain: FilterChain,
        diagnostics: Option<DiagnosticsHandle>,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;
        let (frames, _) = watch::channel(None);

        Ok(Self {
            sources: Vec::new(),
            current: 0,
            transform: TransformState::default(),
            settings: EditSettings::new(),
            cache: WorkingImageCache::new(config.preview.fast_dimension(), runtime.clone())
                .with_diagnostics(diagnostics.clone()),
            throttle: RenderThrottle::new(config.preview.throttle()),
            renderer: Arc::new(Renderer {
                chain,
                tokens: RequestTokens::new(),
                frames,
                full_frame_dimension: config.preview.dimension().value(),
                counters: RenderCounters::default(),
                diagnostics: diagnostics.clone(),
            }),
            runtime,
            analyzer: SkyAnalyzer::new(config.analysis.clone()),
            analysis: AnalysisSlot::Idle,
            diagnostics,
        })
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Replaces the selection, resetting edits, transform and cache, and
    /// starts analyzing the first source.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptySelection`] if `sources` is empty.
    pub fn set_sources(&mut self, sources: Vec<SourceImage>) -> Result<()> {
        if sources.is_empty() {
            return Err(SessionError::EmptySelection.into());
        }

        self.sources = sources;
        self.current = 0;
        self.transform = TransformState::default();
        self.settings.reset();
        self.throttle.reset();
        self.renderer.tokens.retire(RenderClass::Fast);
        self.renderer.tokens.retire(RenderClass::Full);
        self.invalidate(InvalidationReason::NewSelection);
        self.start_analysis();
        self.request_render();
        Ok(())
    }

    /// Switches the previewed source.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::IndexOutOfRange`] for an unknown index.
    pub fn select_image(&mut self, index: usize) -> Result<()> {
        if index >= self.sources.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.sources.len(),
            }
            .into());
        }
        if index == self.current {
            return Ok(());
        }

        self.current = index;
        self.invalidate(InvalidationReason::SelectImage);
        self.request_render();
        Ok(())
    }

    #[must_use]
    pub fn sources(&self) -> &[SourceImage] {
        &self.sources
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    // -------------------------------------------------------------------------
    // Transform
    // -------------------------------------------------------------------------

    pub fn rotate_left(&mut self) {
        self.transform.rotate_left();
        self.transform_changed(InvalidationReason::Rotate);
    }

    pub fn rotate_right(&mut self) {
        self.transform.rotate_right();
        self.transform_changed(InvalidationReason::Rotate);
    }

    pub fn flip_horizontal(&mut self) {
        self.transform.toggle_flip_horizontal();
        self.transform_changed(InvalidationReason::Flip);
    }

    pub fn flip_vertical(&mut self) {
        self.transform.toggle_flip_vertical();
        self.transform_changed(InvalidationReason::Flip);
    }

    #[must_use]
    pub fn transform(&self) -> TransformState {
        self.transform
    }

    fn transform_changed(&mut self, reason: InvalidationReason) {
        self.invalidate(reason);
        self.request_render();
    }

    fn invalidate(&mut self, reason: InvalidationReason) {
        self.cache.invalidate();
        if let Some(handle) = &self.diagnostics {
            handle.log(DiagnosticEventKind::CacheInvalidated { reason });
        }
    }

    // -------------------------------------------------------------------------
    // Edits
    // -------------------------------------------------------------------------

    /// Stores `value` (clamped) for `tool` and requests a throttled preview.
    pub fn request_fast_preview(&mut self, tool: EditTool, value: f32) {
        self.settings.set_value(tool, Some(value));
        self.request_render();
    }

    /// Unsets `tool` and requests a throttled preview.
    pub fn clear_tool(&mut self, tool: EditTool) {
        self.settings.set_value(tool, None);
        self.request_render();
    }

    /// Selects or clears the filter and requests a throttled preview.
    pub fn set_filter(&mut self, filter: Option<FilterType>) {
        self.settings.set_filter(filter);
        self.request_render();
    }

    /// Replaces all settings, e.g. when reopening a draft.
    pub fn load_settings(&mut self, settings: EditSettings) {
        self.settings = settings;
        self.request_render();
    }

    /// Clears every tool value and the filter.
    pub fn reset_edits(&mut self) {
        self.settings.reset();
        self.request_render();
    }

    #[must_use]
    pub fn settings(&self) -> &EditSettings {
        &self.settings
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    fn current_source(&self) -> Option<&SourceImage> {
        self.sources.get(self.current)
    }

    /// Schedules a fast render of the working image with the current
    /// settings, subject to the throttle.
    fn request_render(&mut self) {
        let Some(source) = self.current_source().map(SourceImage::shared_pixels) else {
            return;
        };

        let key = CacheKey::new(self.current, &self.transform);
        let working = self.cache.lookup(key, &source, self.transform);
        // A fast request supersedes any full render of older settings.
        self.renderer.tokens.retire(RenderClass::Full);
        let job = RenderJob {
            token: self.renderer.tokens.mint(RenderClass::Fast),
            input: RenderInput::Working(working),
            settings: self.settings,
            image_index: self.current,
        };

        let renderer = Arc::clone(&self.renderer);
        let now = Instant::now();
        match self.throttle.decide(now) {
            ThrottleDecision::RenderNow => {
                self.throttle.mark_rendered(now);
                self.runtime.spawn(renderer.run(job));
            }
            ThrottleDecision::Schedule { fire_at } => {
                if let Some(handle) = &self.diagnostics {
                    handle.log(DiagnosticEventKind::RenderScheduled {
                        delay_ms: u64::try_from(fire_at.saturating_duration_since(now).as_millis())
                            .unwrap_or(u64::MAX),
                    });
                }
                let pending = self.runtime.spawn(async move {
                    tokio::time::sleep_until(fire_at).await;
                    renderer.run(job).await;
                });
                self.throttle.set_pending(pending, fire_at);
            }
        }
    }

    /// Ends the current gesture: clears the throttle, retires in-flight fast
    /// renders and renders the full-resolution source. The published frame
    /// fits the preview dimension.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptySelection`] if no source is selected.
    pub fn finalize_edit(&mut self) -> Result<RenderHandle> {
        let source = self
            .current_source()
            .map(SourceImage::shared_pixels)
            .ok_or(SessionError::EmptySelection)?;

        self.throttle.reset();
        self.renderer.tokens.retire(RenderClass::Fast);
        let token = self.renderer.tokens.mint(RenderClass::Full);
        let job = RenderJob {
            token,
            input: RenderInput::FullResolution {
                source,
                transform: self.transform,
            },
            settings: self.settings,
            image_index: self.current,
        };

        let handle = self.runtime.spawn(Arc::clone(&self.renderer).run(job));
        Ok(RenderHandle { token, handle })
    }

    /// Renders the full-resolution source without publishing it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptySelection`] if no source is selected, or
    /// an image error if the render task failed.
    pub async fn export(&self) -> Result<RgbaImage> {
        let source = self
            .current_source()
            .map(SourceImage::shared_pixels)
            .ok_or(SessionError::EmptySelection)?;
        let transform = self.transform;
        let settings = self.settings;
        let chain = self.renderer.chain.clone();
        let context = RenderContext::random().with_diagnostics(self.diagnostics.clone());

        let image = tokio::task::spawn_blocking(move || {
            chain.render(&apply_transform(&source, &transform), &settings, &context)
        })
        .await?;
        Ok(image)
    }

    /// Receiver of published frames. Holds the latest frame, if any.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<PreviewFrame>> {
        self.renderer.frames.subscribe()
    }

    #[must_use]
    pub fn latest_frame(&self) -> Option<PreviewFrame> {
        self.renderer.frames.borrow().clone()
    }

    /// Returns true while a throttled render is waiting for its window.
    #[must_use]
    pub fn has_pending_render(&self) -> bool {
        self.throttle.has_pending()
    }

    #[must_use]
    pub fn cache_state(&self) -> CacheState {
        if self.sources.is_empty() {
            return CacheState::Idle;
        }
        self.cache.state(CacheKey::new(self.current, &self.transform))
    }

    #[must_use]
    pub fn stats(&self) -> PreviewStats {
        let counters = &self.renderer.counters;
        PreviewStats {
            renders_started: counters.started.load(Ordering::Relaxed),
            renders_published: counters.published.load(Ordering::Relaxed),
            renders_discarded: counters.discarded.load(Ordering::Relaxed),
            cache_rebuilds: self.cache.stats().misses,
        }
    }

    // -------------------------------------------------------------------------
    // Analysis
    // -------------------------------------------------------------------------

    fn start_analysis(&mut self) {
        if let AnalysisSlot::Running(handle) = &self.analysis {
            handle.abort();
        }
        let Some(source) = self.sources.first().cloned() else {
            self.analysis = AnalysisSlot::Idle;
            return;
        };

        let analyzer = self.analyzer.clone();
        let diagnostics = self.diagnostics.clone();
        let handle = self.runtime.spawn(async move {
            let outcome = tokio::task::spawn_blocking(move || analyzer.analyze_source(&source))
                .await
                .unwrap_or_else(|err| Err(AnalysisError::TaskFailed(err.to_string())));
            settle_analysis(outcome, diagnostics.as_ref())
        });
        self.analysis = AnalysisSlot::Running(handle);
    }

    /// Analysis of the first source of the selection. Waits for it if it is
    /// still running; `None` if it failed or nothing is selected.
    pub async fn analysis(&mut self) -> Option<ImageAnalysis> {
        if let AnalysisSlot::Running(handle) = &mut self.analysis {
            let result = handle.await.ok().flatten();
            self.analysis = AnalysisSlot::Done(result);
        }
        match &self.analysis {
            AnalysisSlot::Done(result) => result.clone(),
            AnalysisSlot::Idle | AnalysisSlot::Running(_) => None,
        }
    }
}

/// Keeps a successful analysis; logs and drops a failed one.
fn settle_analysis(
    outcome: std::result::Result<ImageAnalysis, AnalysisError>,
    diagnostics: Option<&DiagnosticsHandle>,
) -> Option<ImageAnalysis> {
    match outcome {
        Ok(analysis) => Some(analysis),
        Err(err) => {
            if let Some(handle) = diagnostics {
                handle.log(DiagnosticEventKind::AnalysisSkipped {
                    reason: err.to_string(),
                });
            }
            None
        }
    }
}

impl Drop for PreviewSession {
    fn drop(&mut self) {
        if let AnalysisSlot::Running(handle) = &self.analysis {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for PreviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewSession")
            .field("sources", &self.sources.len())
            .field("current", &self.current)
            .field("transform", &self.transform)
            .field("cache", &self.cache)
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_rs::Rgba;

    fn session() -> PreviewSession {
        PreviewSession::new(&Config::default(), FilterChain::default(), None).expect("runtime")
    }

    fn source(width: u32, height: u32) -> SourceImage {
        SourceImage::from_rgba(RgbaImage::from_pixel(width, height, Rgba([100, 100, 100, 255])))
            .expect("source")
    }

    #[test]
    fn new_outside_runtime_fails() {
        let result = PreviewSession::new(&Config::default(), FilterChain::default(), None);
        assert!(matches!(
            result,
            Err(crate::error::Error::Session(SessionError::NoRuntime))
        ));
    }

    #[tokio::test]
    async fn empty_selection_is_rejected() {
        let mut session = session();
        assert!(session.set_sources(Vec::new()).is_err());
        assert_eq!(session.cache_state(), CacheState::Idle);
    }

    #[tokio::test]
    async fn select_image_checks_range() {
        let mut session = session();
        session
            .set_sources(vec![source(8, 8), source(8, 8)])
            .expect("sources");

        assert!(session.select_image(1).is_ok());
        assert_eq!(session.current_index(), 1);
        assert!(session.select_image(2).is_err());
    }

    #[tokio::test]
    async fn set_sources_resets_edits_and_transform() {
        let mut session = session();
        session.set_sources(vec![source(8, 8)]).expect("sources");
        session.request_fast_preview(EditTool::Contrast, 0.4);
        session.rotate_right();

        session.set_sources(vec![source(8, 8)]).expect("sources");
        assert!(!session.settings().has_changes());
        assert!(session.transform().is_identity());
    }

    #[tokio::test]
    async fn fast_preview_values_are_clamped() {
        let mut session = session();
        session.request_fast_preview(EditTool::Exposure, 3.0);
        assert_eq!(session.settings().value(EditTool::Exposure), Some(1.0));
    }

    #[tokio::test]
    async fn finalize_without_sources_fails() {
        let mut session = session();
        assert!(session.finalize_edit().is_err());
        assert!(session.export().await.is_err());
    }

    #[tokio::test]
    async fn render_superseded_before_it_starts_is_counted_as_discarded() {
        use crate::diagnostics::{BufferCapacity, DiagnosticsCollector};

        let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
        let mut session = PreviewSession::new(
            &Config::default(),
            FilterChain::default(),
            Some(collector.handle()),
        )
        .expect("runtime");

        // The fast render is queued but cannot run before finalize retires it.
        session.set_sources(vec![source(8, 8)]).expect("sources");
        let fast_token = session.renderer.tokens.latest(RenderClass::Fast);
        let full = session.finalize_edit().expect("finalize");
        assert!(full.published().await.expect("render task").is_some());

        let stats = session.stats();
        assert_eq!(stats.renders_started, 1);
        assert_eq!(stats.renders_published, 1);
        assert_eq!(stats.renders_discarded, 1);

        collector.process_pending();
        assert!(collector.kinds().any(|kind| matches!(
            kind,
            DiagnosticEventKind::PreviewDiscarded { class: RenderClass::Fast, token, .. }
                if *token == fast_token
        )));
    }

    #[test]
    fn failed_analysis_is_logged_and_dropped() {
        use crate::diagnostics::{BufferCapacity, DiagnosticsCollector};

        let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
        let handle = collector.handle();

        assert!(settle_analysis(Err(AnalysisError::EmptyImage), Some(&handle)).is_none());

        collector.process_pending();
        assert!(collector
            .kinds()
            .any(|kind| matches!(kind, DiagnosticEventKind::AnalysisSkipped { .. })));
    }

    #[tokio::test]
    async fn reset_edits_clears_settings() {
        let mut session = session();
        session.set_filter(Some(FilterType::Vivid));
        session.request_fast_preview(EditTool::Grain, 0.2);
        session.reset_edits();
        assert!(!session.settings().has_changes());
    }
}
