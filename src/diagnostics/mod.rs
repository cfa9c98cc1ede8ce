// SPDX-License-Identifier: MPL-2.0
//! Diagnostics event log for the editing core.
//!
//! Components log through a cloneable [`DiagnosticsHandle`]; a
//! [`DiagnosticsCollector`] owned by the host drains the channel into a
//! memory-bounded [`CircularBuffer`] and can export the events as JSON.
//! There is no process-wide logger: every session, renderer and upload
//! receives the handle it should report to, or none.
//!
//! # Architecture
//!
//! - [`CircularBuffer`]: Generic ring buffer with configurable capacity
//! - [`DiagnosticEvent`]: Timestamped [`DiagnosticEventKind`]
//! - [`DiagnosticsHandle`]: Non-blocking sender, drops events when full

mod buffer;
mod collector;
mod events;

pub use buffer::{BufferCapacity, CircularBuffer};
pub use collector::{DiagnosticReport, DiagnosticsCollector, DiagnosticsHandle, SerializableEvent};
pub use events::{DiagnosticEvent, DiagnosticEventKind, InvalidationReason};
