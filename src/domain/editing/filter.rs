// SPDX-License-Identifier: MPL-2.0
//! Stylistic filter presets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the ten stylistic looks applied before any tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterType {
    Natural,
    Clear,
    Drama,
    Soft,
    Warm,
    Cool,
    Vintage,
    Monochrome,
    Pastel,
    Vivid,
}

impl FilterType {
    /// All filters in catalog order.
    pub const ALL: [FilterType; 10] = [
        FilterType::Natural,
        FilterType::Clear,
        FilterType::Drama,
        FilterType::Soft,
        FilterType::Warm,
        FilterType::Cool,
        FilterType::Vintage,
        FilterType::Monochrome,
        FilterType::Pastel,
        FilterType::Vivid,
    ];

    /// Stable identifier used in persisted documents.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            FilterType::Natural => "natural",
            FilterType::Clear => "clear",
            FilterType::Drama => "drama",
            FilterType::Soft => "soft",
            FilterType::Warm => "warm",
            FilterType::Cool => "cool",
            FilterType::Vintage => "vintage",
            FilterType::Monochrome => "monochrome",
            FilterType::Pastel => "pastel",
            FilterType::Vivid => "vivid",
        }
    }

    /// Parses a persisted identifier.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|filter| filter.id() == id)
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
