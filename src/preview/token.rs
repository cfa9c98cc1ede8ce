// SPDX-License-Identifier: MPL-2.0
//! Request tokens for stale-result suppression.
//!
//! Every render request mints a token from a per-class generation counter.
//! A finished render may publish only while its token is still the latest
//! one minted for its class, so results are ordered by request, not by
//! completion.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Which pipeline a render belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderClass {
    /// Throttled render of the cached working image.
    Fast,
    /// Full-resolution render of the transformed source.
    Full,
}

/// Identifies one render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    class: RenderClass,
    generation: u64,
}

impl RequestToken {
    #[must_use]
    pub fn class(self) -> RenderClass {
        self.class
    }

    /// Generation number; starts at 1 and is never reused within a class.
    #[must_use]
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// Generation counters, one per [`RenderClass`].
#[derive(Debug, Default)]
pub struct RequestTokens {
    fast: AtomicU64,
    full: AtomicU64,
}

impl RequestTokens {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, class: RenderClass) -> &AtomicU64 {
        match class {
            RenderClass::Fast => &self.fast,
            RenderClass::Full => &self.full,
        }
    }

    /// Mints a new token, superseding every earlier token of `class`.
    pub fn mint(&self, class: RenderClass) -> RequestToken {
        let generation = self.counter(class).fetch_add(1, Ordering::AcqRel) + 1;
        RequestToken { class, generation }
    }

    /// Supersedes all outstanding tokens of `class` without issuing one.
    pub fn retire(&self, class: RenderClass) {
        self.counter(class).fetch_add(1, Ordering::AcqRel);
    }

    /// Latest generation minted or retired for `class` (0 if none).
    #[must_use]
    pub fn latest(&self, class: RenderClass) -> u64 {
        self.counter(class).load(Ordering::Acquire)
    }

    /// Returns true if no newer token of the same class exists.
    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest(token.class) == token.generation
    }
}
