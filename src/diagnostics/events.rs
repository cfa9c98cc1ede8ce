// SPDX-License-Identifier: MPL-2.0
//! Diagnostic event types.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::domain::editing::EditTool;
use crate::preview::RenderClass;

/// Why the working image cache was invalidated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationReason {
    Rotate,
    Flip,
    SelectImage,
    NewSelection,
}

/// A diagnostic event with its capture time.
#[derive(Debug, Clone)]
pub struct DiagnosticEvent {
    /// When the event occurred (monotonic clock).
    pub timestamp: Instant,
    pub kind: DiagnosticEventKind,
}

impl DiagnosticEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(kind: DiagnosticEventKind) -> Self {
        Self {
            timestamp: Instant::now(),
            kind,
        }
    }
}

/// The type and payload of a diagnostic event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticEventKind {
    // ==========================================================================
    // Preview pipeline
    // ==========================================================================
    /// A render finished and was published.
    PreviewPublished {
        class: RenderClass,
        token: u64,
        duration_ms: u64,
        width: u32,
        height: u32,
    },

    /// A render finished after a newer request and was dropped.
    PreviewDiscarded {
        class: RenderClass,
        token: u64,
        latest: u64,
    },

    /// A fast render was deferred to the end of the throttle window.
    RenderScheduled { delay_ms: u64 },

    /// The working image was rebuilt from the full-resolution source.
    CacheRebuilt {
        image_index: usize,
        duration_ms: u64,
        width: u32,
        height: u32,
    },

    /// The working image became stale.
    CacheInvalidated { reason: InvalidationReason },

    /// A chain stage produced no output and passed its input through.
    StageDegraded {
        #[serde(skip_serializing_if = "Option::is_none")]
        tool: Option<EditTool>,
        operation: String,
    },

    // ==========================================================================
    // Analysis and upload
    // ==========================================================================
    /// Automatic metadata was skipped after a best-effort failure.
    AnalysisSkipped { reason: String },

    /// A storage operation attempt finished.
    RetryAttempt {
        operation: String,
        attempt: u32,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    // ==========================================================================
    // Generic
    // ==========================================================================
    Warning { message: String },

    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_event_is_timestamped_now() {
        let before = Instant::now();
        let event = DiagnosticEvent::new(DiagnosticEventKind::Warning {
            message: "slow".into(),
        });
        assert!(event.timestamp >= before);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let kind = DiagnosticEventKind::PreviewDiscarded {
            class: RenderClass::Fast,
            token: 3,
            latest: 4,
        };
        let json = serde_json::to_value(&kind).expect("serialize");
        assert_eq!(json["type"], "preview_discarded");
        assert_eq!(json["class"], "fast");
        assert_eq!(json["latest"], 4);
    }

    #[test]
    fn degraded_stage_omits_missing_tool() {
        let kind = DiagnosticEventKind::StageDegraded {
            tool: None,
            operation: "sepia".into(),
        };
        let json = serde_json::to_string(&kind).expect("serialize");
        assert!(!json.contains("tool"));

        let with_tool = DiagnosticEventKind::StageDegraded {
            tool: Some(EditTool::BlackPoint),
            operation: "black_point".into(),
        };
        let json = serde_json::to_value(&with_tool).expect("serialize");
        assert_eq!(json["tool"], "blackPoint");
    }

    #[test]
    fn invalidation_reason_round_trips() {
        let kind = DiagnosticEventKind::CacheInvalidated {
            reason: InvalidationReason::SelectImage,
        };
        let json = serde_json::to_string(&kind).expect("serialize");
        let back: DiagnosticEventKind = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, kind);
    }
}
