// SPDX-License-Identifier: MPL-2.0
//! Domain layer - pure editing and analysis types.
//!
//! This module contains value objects and business rules. Apart from `serde`
//! derives for persistence it has no dependency on the image stack, so it
//! can be tested in isolation.
//!
//! # Modules
//!
//! - [`diagnostics`]: Diagnostics types ([`BufferCapacity`](diagnostics::BufferCapacity))
//! - [`editing`]: Editing types ([`EditTool`](editing::EditTool),
//!   [`EditSettings`](editing::EditSettings), [`TransformState`](editing::TransformState))
//! - [`error`]: Domain error types ([`ImageError`](error::ImageError),
//!   [`AnalysisError`](error::AnalysisError), [`SessionError`](error::SessionError))
//! - [`sky`]: Sky analysis types ([`SkyType`](sky::SkyType), [`TimeOfDay`](sky::TimeOfDay))

pub mod diagnostics;
pub mod editing;
pub mod error;
pub mod sky;
