// SPDX-License-Identifier: MPL-2.0
//! Throttle for fast preview renders.
//!
//! Renders are spaced at least one interval apart. A request inside the
//! window cancels any pending render and schedules a single replacement at
//! the end of the window, so bursts of slider events collapse into one
//! render carrying the latest settings.

use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

use crate::domain::editing::ThrottleInterval;

/// What the caller should do with a render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// Render immediately.
    RenderNow,
    /// Spawn the render to start at `fire_at`.
    Schedule { fire_at: Instant },
}

#[derive(Debug)]
struct PendingRender {
    handle: JoinHandle<()>,
    fire_at: Instant,
}

/// Throttle state: `ReadyToRender`, or `Scheduled` while a render is pending.
#[derive(Debug)]
pub struct RenderThrottle {
    interval: Duration,
    last_render: Option<Instant>,
    pending: Option<PendingRender>,
}

impl RenderThrottle {
    #[must_use]
    pub fn new(interval: ThrottleInterval) -> Self {
        Self {
            interval: interval.as_duration(),
            last_render: None,
            pending: None,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Decides how to serve a request made at `now`.
    ///
    /// A render still waiting for its window is aborted and the replacement
    /// keeps its start time. A render that already started is left to finish.
    pub fn decide(&mut self, now: Instant) -> ThrottleDecision {
        if let Some(pending) = self.pending.take() {
            if pending.fire_at > now && !pending.handle.is_finished() {
                pending.handle.abort();
                return ThrottleDecision::Schedule {
                    fire_at: pending.fire_at,
                };
            }
        }

        match self.last_render {
            Some(last) if now < last + self.interval => ThrottleDecision::Schedule {
                fire_at: last + self.interval,
            },
            _ => ThrottleDecision::RenderNow,
        }
    }

    /// Records an immediate render started at `at`.
    pub fn mark_rendered(&mut self, at: Instant) {
        self.last_render = Some(at);
    }

    /// Tracks a scheduled render. Its start time counts as the last render.
    pub fn set_pending(&mut self, handle: JoinHandle<()>, fire_at: Instant) {
        self.last_render = Some(fire_at);
        self.pending = Some(PendingRender { handle, fire_at });
    }

    /// Returns true while a scheduled render has not finished.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.handle.is_finished())
    }

    /// Aborts any pending render and forgets the last render time.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.last_render = None;
    }

    /// Aborts any pending render, keeping the last render time.
    pub fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}

impl Drop for RenderThrottle {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
