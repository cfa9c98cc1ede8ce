// SPDX-License-Identifier: MPL-2.0
//! End-to-end behavior of the interactive preview session: throttling,
//! stale result suppression, cache invalidation, export and analysis.

use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use image_rs::{Rgba, RgbaImage};
use soramoyou_edit::application::port::ImagePrimitives;
use soramoyou_edit::config::Config;
use soramoyou_edit::diagnostics::{BufferCapacity, DiagnosticEventKind, DiagnosticsCollector};
use soramoyou_edit::domain::editing::{EditSettings, EditTool, Operation};
use soramoyou_edit::domain::sky::SkyType;
use soramoyou_edit::media::metadata::parse_capture_time;
use soramoyou_edit::media::{
    CaptureMetadata, CpuPrimitives, FilterChain, RenderContext, SourceImage,
};
use soramoyou_edit::preview::{CacheState, PreviewFrame, PreviewSession, RenderClass};
use tokio::sync::{oneshot, watch};

fn config() -> Config {
    let mut config = Config::default();
    config.preview.fast_max_dimension = Some(64);
    config.preview.throttle_ms = Some(33);
    config
}

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 3 % 256) as u8, (y * 5 % 256) as u8, 160, 255])
    })
}

fn source(width: u32, height: u32) -> SourceImage {
    SourceImage::from_rgba(gradient(width, height)).expect("source")
}

async fn next_frame(
    frames: &mut watch::Receiver<Option<PreviewFrame>>,
    accept: impl Fn(&PreviewFrame) -> bool,
) -> PreviewFrame {
    let frame = frames
        .wait_for(|frame| frame.as_ref().is_some_and(&accept))
        .await
        .expect("session alive");
    frame.clone().expect("frame present")
}

#[tokio::test(start_paused = true)]
async fn rapid_requests_coalesce_into_one_render_with_latest_value() {
    let mut session =
        PreviewSession::new(&config(), FilterChain::default(), None).expect("session");
    let mut frames = session.subscribe();
    session.set_sources(vec![source(48, 32)]).expect("sources");

    let first = next_frame(&mut frames, |_| true).await;
    assert_eq!(first.class, RenderClass::Fast);

    for value in [0.1, 0.2, 0.3] {
        session.request_fast_preview(EditTool::Exposure, value);
    }
    assert!(session.has_pending_render());

    let latest = next_frame(&mut frames, |frame| frame.token != first.token).await;
    let expected = FilterChain::default().render(
        &gradient(48, 32),
        &EditSettings::new().with(EditTool::Exposure, 0.3),
        &RenderContext::new(0),
    );
    assert_eq!(*latest.image, expected);

    let stats = session.stats();
    assert_eq!(stats.renders_started, 2);
    assert_eq!(stats.renders_published, 2);
    assert_eq!(stats.renders_discarded, 0);
}

#[tokio::test(start_paused = true)]
async fn request_after_window_renders_without_delay() {
    let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
    let mut session =
        PreviewSession::new(&config(), FilterChain::default(), Some(collector.handle()))
            .expect("session");
    let mut frames = session.subscribe();
    session.set_sources(vec![source(40, 40)]).expect("sources");
    next_frame(&mut frames, |_| true).await;

    tokio::time::advance(Duration::from_millis(50)).await;
    session.request_fast_preview(EditTool::Contrast, 0.2);
    assert!(!session.has_pending_render());

    session.request_fast_preview(EditTool::Contrast, 0.4);
    assert!(session.has_pending_render());

    collector.process_pending();
    let scheduled = collector
        .kinds()
        .filter(|kind| matches!(kind, DiagnosticEventKind::RenderScheduled { .. }))
        .count();
    assert_eq!(scheduled, 1);
}

#[tokio::test(start_paused = true)]
async fn rotation_rebuilds_the_working_image() {
    let mut session =
        PreviewSession::new(&config(), FilterChain::default(), None).expect("session");
    let mut frames = session.subscribe();
    session.set_sources(vec![source(80, 40)]).expect("sources");

    let first = next_frame(&mut frames, |_| true).await;
    assert_eq!(first.image.dimensions(), (64, 32));

    tokio::time::advance(Duration::from_millis(50)).await;
    session.rotate_left();
    let rotated = next_frame(&mut frames, |frame| frame.token != first.token).await;
    assert_eq!(rotated.image.dimensions(), (32, 64));
    assert_eq!(session.stats().cache_rebuilds, 2);
}

#[tokio::test(start_paused = true)]
async fn select_image_keeps_settings_and_switches_source() {
    let mut session =
        PreviewSession::new(&config(), FilterChain::default(), None).expect("session");
    let mut frames = session.subscribe();
    session
        .set_sources(vec![source(80, 40), source(40, 80)])
        .expect("sources");
    session.request_fast_preview(EditTool::Warmth, 0.5);

    session.select_image(1).expect("select");
    let frame = next_frame(&mut frames, |frame| frame.image_index == 1).await;
    assert_eq!(frame.image.dimensions(), (32, 64));
    assert_eq!(session.settings().value(EditTool::Warmth), Some(0.5));
}

#[tokio::test]
async fn finalize_publishes_full_resolution_frame() {
    let mut session =
        PreviewSession::new(&config(), FilterChain::default(), None).expect("session");
    session.set_sources(vec![source(160, 90)]).expect("sources");
    session.request_fast_preview(EditTool::Exposure, 0.4);

    let handle = session.finalize_edit().expect("finalize");
    let frame = handle
        .published()
        .await
        .expect("render task")
        .expect("newest full render publishes");

    assert_eq!(frame.class, RenderClass::Full);
    assert_eq!(frame.image.dimensions(), (160, 90));
    assert!(!session.has_pending_render());
    assert_eq!(
        session.latest_frame().map(|frame| frame.token),
        Some(frame.token)
    );
}

/// Blocks the first operation on images wider than `gate_above` until
/// released, so a newer request can overtake it.
struct GatedPrimitives {
    inner: CpuPrimitives,
    gate_above: u32,
    entered: Mutex<Option<oneshot::Sender<()>>>,
    release: Mutex<Option<mpsc::Receiver<()>>>,
}

impl ImagePrimitives for GatedPrimitives {
    fn apply(&self, operation: &Operation, input: &RgbaImage, seed: u64) -> Option<RgbaImage> {
        if input.width() > self.gate_above {
            let release = self.release.lock().unwrap().take();
            if let Some(release) = release {
                if let Some(entered) = self.entered.lock().unwrap().take() {
                    let _ = entered.send(());
                }
                let _ = release.recv();
            }
        }
        self.inner.apply(operation, input, seed)
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

fn gated_chain(gate_above: u32) -> (FilterChain, oneshot::Receiver<()>, mpsc::Sender<()>) {
    let (entered_tx, entered_rx) = oneshot::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let chain = FilterChain::new(Arc::new(GatedPrimitives {
        inner: CpuPrimitives,
        gate_above,
        entered: Mutex::new(Some(entered_tx)),
        release: Mutex::new(Some(release_rx)),
    }));
    (chain, entered_rx, release_tx)
}

#[tokio::test]
async fn superseded_render_is_never_published() {
    let (chain, entered_rx, release_tx) = gated_chain(64);
    let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
    let mut session =
        PreviewSession::new(&config(), chain, Some(collector.handle())).expect("session");

    session.set_sources(vec![source(128, 96)]).expect("sources");
    session.load_settings(EditSettings::new().with(EditTool::Exposure, 0.5));

    let stale = session.finalize_edit().expect("finalize");
    entered_rx.await.expect("full render started");

    let fresh = session.finalize_edit().expect("finalize");
    release_tx.send(()).expect("release gate");

    assert!(stale.token().generation() < fresh.token().generation());
    let stale_token = stale.token();
    assert!(stale.published().await.expect("render task").is_none());

    let frame = fresh
        .published()
        .await
        .expect("render task")
        .expect("fresh render publishes");
    assert_eq!(frame.class, RenderClass::Full);
    assert_eq!(
        session.latest_frame().map(|frame| frame.token),
        Some(frame.token)
    );
    assert!(session.stats().renders_discarded >= 1);

    collector.process_pending();
    assert!(collector.kinds().any(|kind| matches!(
        kind,
        DiagnosticEventKind::PreviewDiscarded { class: RenderClass::Full, token, .. }
            if *token == stale_token.generation()
    )));
}

#[tokio::test]
async fn fast_request_retires_full_render_in_flight() {
    let (chain, entered, release) = gated_chain(64);
    let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
    let mut session =
        PreviewSession::new(&config(), chain, Some(collector.handle())).expect("session");
    let mut frames = session.subscribe();
    session.set_sources(vec![source(128, 96)]).expect("sources");
    let first = next_frame(&mut frames, |_| true).await;
    session.load_settings(EditSettings::new().with(EditTool::Exposure, 0.5));

    let full = session.finalize_edit().expect("finalize");
    let full_token = full.token();
    entered.await.expect("full render started");

    session.request_fast_preview(EditTool::Exposure, 0.3);
    let fast = next_frame(&mut frames, |frame| frame.token != first.token).await;
    assert_eq!(fast.class, RenderClass::Fast);

    release.send(()).expect("release gate");
    assert!(full.published().await.expect("render task").is_none());
    assert_eq!(
        session.latest_frame().map(|frame| frame.token),
        Some(fast.token)
    );

    collector.process_pending();
    assert!(collector.kinds().any(|kind| matches!(
        kind,
        DiagnosticEventKind::PreviewDiscarded { class: RenderClass::Full, token, .. }
            if *token == full_token.generation()
    )));
}

#[tokio::test]
async fn overtaken_fast_render_is_discarded() {
    let (chain, entered, release) = gated_chain(0);
    let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
    let mut session =
        PreviewSession::new(&config(), chain, Some(collector.handle())).expect("session");
    let mut frames = session.subscribe();
    session.set_sources(vec![source(128, 96)]).expect("sources");
    let first = next_frame(&mut frames, |_| true).await;

    // The throttled render holds the gate; the one after it passes.
    session.request_fast_preview(EditTool::Exposure, 0.2);
    entered.await.expect("fast render started");
    session.request_fast_preview(EditTool::Contrast, 0.4);

    let newest = next_frame(&mut frames, |frame| frame.token != first.token).await;
    assert_eq!(newest.class, RenderClass::Fast);
    release.send(()).expect("release gate");

    for _ in 0..500 {
        if session.stats().renders_discarded > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    assert_eq!(session.stats().renders_discarded, 1);
    assert_eq!(
        session.latest_frame().map(|frame| frame.token),
        Some(newest.token)
    );

    collector.process_pending();
    assert!(collector.kinds().any(|kind| matches!(
        kind,
        DiagnosticEventKind::PreviewDiscarded { class: RenderClass::Fast, token, .. }
            if *token < newest.token.generation()
    )));
}

#[tokio::test(start_paused = true)]
async fn throttled_render_finds_working_image_already_rebuilt() {
    let mut session =
        PreviewSession::new(&config(), FilterChain::default(), None).expect("session");
    let mut frames = session.subscribe();
    session.set_sources(vec![source(80, 40)]).expect("sources");
    let first = next_frame(&mut frames, |_| true).await;

    // Still inside the first render's window, so the render waits.
    session.rotate_left();
    assert!(session.has_pending_render());

    for _ in 0..500 {
        if session.cache_state() == CacheState::Valid {
            break;
        }
        tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_millis(1)))
            .await
            .expect("wait");
    }
    assert_eq!(session.cache_state(), CacheState::Valid);
    assert!(session.has_pending_render());
    assert_eq!(session.stats().renders_started, 1);

    let rotated = next_frame(&mut frames, |frame| frame.token != first.token).await;
    assert_eq!(rotated.image.dimensions(), (32, 64));
    assert_eq!(session.stats().cache_rebuilds, 2);
}

#[tokio::test]
async fn export_renders_transformed_full_resolution() {
    let mut session =
        PreviewSession::new(&config(), FilterChain::default(), None).expect("session");
    session.set_sources(vec![source(200, 100)]).expect("sources");
    session.rotate_right();
    session.request_fast_preview(EditTool::Saturation, -0.5);

    let exported = session.export().await.expect("export");
    assert_eq!(exported.dimensions(), (100, 200));
}

#[tokio::test]
async fn analysis_uses_original_first_source() {
    let capture = CaptureMetadata {
        captured_at: parse_capture_time("2025:08:20 18:30:00"),
        ..CaptureMetadata::default()
    };
    let orange = SourceImage::with_metadata(
        RgbaImage::from_pixel(96, 64, Rgba([120, 55, 15, 255])),
        capture,
    )
    .expect("source");

    let mut session =
        PreviewSession::new(&config(), FilterChain::default(), None).expect("session");
    session
        .set_sources(vec![orange, source(40, 40)])
        .expect("sources");
    // Edits never change the derived metadata.
    session.request_fast_preview(EditTool::Hsl, 1.0);

    let analysis = session.analysis().await.expect("analysis");
    assert_eq!(analysis.sky_type, SkyType::Sunset);
    assert_eq!(analysis.sky_colors, vec!["#783810".to_string()]);
}

#[tokio::test]
async fn tiny_source_is_still_analyzed() {
    let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
    let mut session =
        PreviewSession::new(&config(), FilterChain::default(), Some(collector.handle()))
            .expect("session");
    session.set_sources(vec![source(3, 3)]).expect("sources");

    let analysis = session.analysis().await.expect("analysis");
    assert_eq!(analysis.sky_type, SkyType::Clear);
    assert!(!analysis.sky_colors.is_empty());

    collector.process_pending();
    assert!(!collector
        .kinds()
        .any(|kind| matches!(kind, DiagnosticEventKind::AnalysisSkipped { .. })));
}

#[tokio::test]
async fn full_frame_fits_preview_size_while_export_keeps_full_size() {
    let mut config = config();
    config.preview.max_dimension = Some(100);
    let mut session = PreviewSession::new(&config, FilterChain::default(), None).expect("session");
    session.set_sources(vec![source(300, 150)]).expect("sources");

    let frame = session
        .finalize_edit()
        .expect("finalize")
        .published()
        .await
        .expect("render task")
        .expect("published");
    assert_eq!(frame.image.dimensions(), (100, 50));

    let exported = session.export().await.expect("export");
    assert_eq!(exported.dimensions(), (300, 150));
}
