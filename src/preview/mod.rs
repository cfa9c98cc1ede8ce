// SPDX-License-Identifier: MPL-2.0
//! Preview pipeline: working image cache, render throttle, request tokens
//! and the editing session tying them together.
//!
//! # Architecture
//!
//! - [`PreviewSession`]: Single owner of sources, transform and settings
//! - [`WorkingImageCache`]: Downsampled, transformed source keyed by
//!   (image index, transform signature)
//! - [`RenderThrottle`]: Coalesces fast renders to one per interval
//! - [`RequestTokens`]: Per-class generation counters; only the newest
//!   request of a class may publish

pub mod cache;
pub mod session;
pub mod throttle;
pub mod token;

pub use cache::{CacheKey, CacheState, CacheStats, WorkingImage, WorkingImageCache};
pub use session::{PreviewFrame, PreviewSession, PreviewStats, RenderHandle};
pub use throttle::{RenderThrottle, ThrottleDecision};
pub use token::{RenderClass, RequestToken, RequestTokens};
