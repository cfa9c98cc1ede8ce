// SPDX-License-Identifier: MPL-2.0
//! Application layer - ports for injected collaborators.
//!
//! - [`port`]: Trait definitions the editing core consumes (image primitives,
//!   object storage)
//!
//! # Dependency Rule
//!
//! - Application layer depends on domain layer (uses domain types)
//! - Concrete adapters (the CPU primitives, a cloud storage client, test
//!   doubles) implement the ports and are passed in at construction time

pub mod port;
