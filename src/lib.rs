// SPDX-License-Identifier: MPL-2.0
//! `soramoyou_edit` is the photo editing core of the Soramoyou sky photo app.
//!
//! It applies a fixed chain of adjustment tools and filter presets to a
//! decoded photo, keeps an interactive preview responsive with a cached
//! working image, throttled fast renders and token-based result
//! publication, derives sky metadata (dominant colors, color temperature,
//! sky type) from the original photo, and prepares edited photos for upload.

#![doc(html_root_url = "https://docs.rs/soramoyou_edit/0.1.0")]

pub mod analysis;
pub mod application;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod media;
pub mod preview;
pub mod publish;

#[cfg(test)]
pub mod test_utils;
