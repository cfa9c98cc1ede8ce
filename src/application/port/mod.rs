// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! # Available Ports
//!
//! - [`primitives`]: Execution of primitive image operations
//! - [`storage`]: Binary object storage for uploaded images
//!
//! # Design Notes
//!
//! - Traits are `Send + Sync` so one instance can be shared with worker tasks
//! - Storage methods return futures that are `Send`, so callers can drive
//!   them from spawned tasks

pub mod primitives;
pub mod storage;

pub use primitives::ImagePrimitives;
pub use storage::{ObjectStore, StorageError};
