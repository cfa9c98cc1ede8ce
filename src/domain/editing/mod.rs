// SPDX-License-Identifier: MPL-2.0
//! Editing domain types.
//!
//! This module provides pure domain types for photo editing:
//! - [`EditTool`]: The 27 continuous edit parameters
//! - [`FilterType`]: The 10 stylistic filter presets
//! - [`EditSettings`]: Optional value per tool plus the applied filter
//! - [`TransformState`]: Quarter-turn rotation and flips
//! - [`Operation`]: Primitive image operations with native parameters
//! - [`ToolValue`], [`PreviewDimension`], [`ThrottleInterval`], [`JpegQuality`]:
//!   bounded value objects

pub mod filter;
pub mod newtypes;
pub mod operation;
pub mod settings;
pub mod tool;
pub mod transform;

pub use filter::FilterType;
pub use newtypes::{JpegQuality, PreviewDimension, ThrottleInterval, ToolValue};
pub use operation::{MirrorAxis, Operation};
pub use settings::EditSettings;
pub use tool::EditTool;
pub use transform::{TransformSignature, TransformState};
