// SPDX-License-Identifier: MPL-2.0
//! Shared helpers for unit tests.
//!
//! Pixel math works in `f32`/`f64`, so tests compare with the `approx`
//! macros re-exported here instead of `assert_eq!`.

pub use approx::assert_abs_diff_eq;
