// SPDX-License-Identifier: MPL-2.0
//! Edit settings value object.
//!
//! [`EditSettings`] records which tools the user touched and at which value,
//! plus the applied filter. An unset tool is skipped by the renderer; it is
//! not the same as a tool set to zero.
//!
//! # Document form
//!
//! Settings persist as a flat key-value document: one numeric entry per set
//! tool keyed by [`EditTool::id`], plus `appliedFilter`. Unset tools are
//! omitted. Decoding ignores unknown keys and treats wrong-typed values as
//! unset.

use super::filter::FilterType;
use super::newtypes::ToolValue;
use super::tool::EditTool;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Document key holding the applied filter identifier.
pub const APPLIED_FILTER_KEY: &str = "appliedFilter";

/// Optional value per edit tool plus an optional filter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EditSettings {
    values: [Option<ToolValue>; EditTool::COUNT],
    applied_filter: Option<FilterType>,
}

impl EditSettings {
    /// Creates settings with every tool unset and no filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `tool`, or `None` if it is not applied.
    #[must_use]
    pub fn value(&self, tool: EditTool) -> Option<f32> {
        self.values[tool.index()].map(ToolValue::value)
    }

    /// Sets or clears `tool`. Values are clamped to [-1.0, 1.0].
    pub fn set_value(&mut self, tool: EditTool, value: Option<f32>) {
        self.values[tool.index()] = value.map(ToolValue::new);
    }

    /// Builder form of [`EditSettings::set_value`].
    #[must_use]
    pub fn with(mut self, tool: EditTool, value: f32) -> Self {
        self.set_value(tool, Some(value));
        self
    }

    /// Returns the applied filter.
    #[must_use]
    pub fn applied_filter(&self) -> Option<FilterType> {
        self.applied_filter
    }

    /// Sets or clears the applied filter.
    pub fn set_filter(&mut self, filter: Option<FilterType>) {
        self.applied_filter = filter;
    }

    /// Builder form of [`EditSettings::set_filter`].
    #[must_use]
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.applied_filter = Some(filter);
        self
    }

    /// Iterates over the set tools in table order.
    pub fn applied_tools(&self) -> impl Iterator<Item = (EditTool, f32)> + '_ {
        EditTool::ALL
            .iter()
            .filter_map(|tool| self.value(*tool).map(|value| (*tool, value)))
    }

    /// Returns true if any tool or a filter is set.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.applied_filter.is_some() || self.values.iter().any(Option::is_some)
    }

    /// Clears every tool and the filter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Encodes the settings into their persisted document form.
    #[must_use]
    pub fn to_document(&self) -> Map<String, Value> {
        let mut document = Map::new();
        for (tool, value) in self.applied_tools() {
            document.insert(tool.id().to_string(), Value::from(f64::from(value)));
        }
        if let Some(filter) = self.applied_filter {
            document.insert(
                APPLIED_FILTER_KEY.to_string(),
                Value::from(filter.id().to_string()),
            );
        }
        document
    }

    /// Decodes settings from a persisted document.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_document(document: &Map<String, Value>) -> Self {
        let mut settings = Self::default();
        for (key, value) in document {
            if key == APPLIED_FILTER_KEY {
                settings.applied_filter = value.as_str().and_then(FilterType::from_id);
            } else if let Some(tool) = EditTool::from_id(key) {
                // Values were written from f32, so narrowing restores them exactly.
                settings.set_value(tool, value.as_f64().map(|v| v as f32));
            }
        }
        settings
    }
}

impl Serialize for EditSettings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let document = self.to_document();
        let mut map = serializer.serialize_map(Some(document.len()))?;
        for (key, value) in &document {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EditSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let document = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_document(&document))
    }
}
