// SPDX-License-Identifier: MPL-2.0
//! Diagnostics collector and its sending handle.

use std::time::Instant;

use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

use super::{BufferCapacity, CircularBuffer, DiagnosticEvent, DiagnosticEventKind};

/// Handle for sending diagnostic events to a collector.
///
/// Cheap to clone and safe to move into worker tasks. Sends never block:
/// when the channel is full the event is dropped.
#[derive(Clone, Debug)]
pub struct DiagnosticsHandle {
    event_tx: Sender<DiagnosticEvent>,
}

impl DiagnosticsHandle {
    /// Logs an event. Non-blocking, drops the event if the channel is full.
    pub fn log(&self, kind: DiagnosticEventKind) {
        let _ = self.event_tx.try_send(DiagnosticEvent::new(kind));
    }

    /// Logs a warning message.
    pub fn log_warning(&self, message: impl Into<String>) {
        self.log(DiagnosticEventKind::Warning {
            message: message.into(),
        });
    }

    /// Logs an error message.
    pub fn log_error(&self, message: impl Into<String>) {
        self.log(DiagnosticEventKind::Error {
            message: message.into(),
        });
    }

    /// Attempts to send an event, reporting whether it was accepted.
    ///
    /// # Errors
    ///
    /// Returns `TrySendError::Full` if the channel buffer is full, or
    /// `TrySendError::Disconnected` if the collector has been dropped.
    pub fn try_log(&self, kind: DiagnosticEventKind) -> Result<(), TrySendError<DiagnosticEvent>> {
        self.event_tx.try_send(DiagnosticEvent::new(kind))
    }
}

/// Channel capacity between handles and the collector.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Receives events from handles and keeps the most recent ones.
pub struct DiagnosticsCollector {
    buffer: CircularBuffer<DiagnosticEvent>,
    event_rx: Receiver<DiagnosticEvent>,
    event_tx: Sender<DiagnosticEvent>,
    /// Monotonic start, for relative event offsets.
    started_at: Instant,
    /// Wall-clock start, for report metadata.
    started_at_utc: DateTime<Utc>,
}

impl DiagnosticsCollector {
    #[must_use]
    pub fn new(capacity: BufferCapacity) -> Self {
        let (event_tx, event_rx) = bounded(DEFAULT_CHANNEL_CAPACITY);

        Self {
            buffer: CircularBuffer::new(capacity),
            event_rx,
            event_tx,
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
        }
    }

    /// Creates a handle for sending events to this collector.
    #[must_use]
    pub fn handle(&self) -> DiagnosticsHandle {
        DiagnosticsHandle {
            event_tx: self.event_tx.clone(),
        }
    }

    /// Drains pending events from the channel into the buffer.
    pub fn process_pending(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.buffer.push(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Iterates over stored events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticEvent> {
        self.buffer.iter()
    }

    /// Iterates over stored event kinds, oldest first.
    pub fn kinds(&self) -> impl Iterator<Item = &DiagnosticEventKind> {
        self.buffer.iter().map(|event| &event.kind)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Builds a report of the stored events.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Durations in ms fit in u64
    pub fn report(&self) -> DiagnosticReport {
        let events: Vec<SerializableEvent> = self
            .buffer
            .iter()
            .map(|event| SerializableEvent {
                offset_ms: event.timestamp.saturating_duration_since(self.started_at).as_millis()
                    as u64,
                kind: event.kind.clone(),
            })
            .collect();

        DiagnosticReport {
            started_at: self.started_at_utc,
            duration_ms: self.started_at.elapsed().as_millis() as u64,
            evicted: self.buffer.evicted(),
            event_count: events.len(),
            events,
        }
    }

    /// Exports the stored events as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.report())
    }
}

impl std::fmt::Debug for DiagnosticsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticsCollector")
            .field("events", &self.buffer.len())
            .field("capacity", &self.buffer.capacity())
            .field("started_at", &self.started_at_utc)
            .finish()
    }
}

/// An event with its offset from collection start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerializableEvent {
    pub offset_ms: u64,
    #[serde(flatten)]
    pub kind: DiagnosticEventKind,
}

/// Exported diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub evicted: u64,
    pub event_count: usize,
    pub events: Vec<SerializableEvent>,
}
