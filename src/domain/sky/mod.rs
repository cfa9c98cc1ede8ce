// SPDX-License-Identifier: MPL-2.0
//! Sky analysis domain types.
//!
//! - [`SkyType`]: Closed set of sky categories attached to a post
//! - [`TimeOfDay`]: Capture-time bucket used as a classification hint
//! - [`ColorCategory`]: Hue/value bucket of a sampled sky color

mod types;

pub use types::{ColorCategory, SkyType, TimeOfDay};
