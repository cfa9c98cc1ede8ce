// SPDX-License-Identifier: MPL-2.0
//! Image primitive port definition.
//!
//! The filter chain never touches pixels itself: every stage is a list of
//! [`Operation`]s handed to an [`ImagePrimitives`] implementation. A
//! primitive that cannot produce an output returns `None` and the chain
//! passes that stage's input through unchanged.

use crate::domain::editing::Operation;
use image_rs::RgbaImage;

/// Executes primitive operations on RGBA bitmaps.
pub trait ImagePrimitives: Send + Sync {
    /// Applies `operation` to `input`, returning a new image with the same
    /// dimensions, or `None` if the primitive produced no output.
    ///
    /// `seed` feeds stochastic operations (grain) and is ignored otherwise.
    fn apply(&self, operation: &Operation, input: &RgbaImage, seed: u64) -> Option<RgbaImage>;

    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;
}
