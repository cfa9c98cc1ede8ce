// SPDX-License-Identifier: MPL-2.0
//! Geometric transform state of the edited image.

/// Rotation and flips applied to a source before any filtering.
///
/// Rotation is applied first, then the horizontal flip, then the vertical
/// flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransformState {
    quarter_turns: u8,
    flip_horizontal: bool,
    flip_vertical: bool,
}

/// Cache key component describing a [`TransformState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransformSignature {
    /// Clockwise rotation in degrees: 0, 90, 180 or 270.
    pub rotation_degrees: u16,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

impl TransformState {
    /// Rotates 90 degrees clockwise.
    pub fn rotate_right(&mut self) {
        self.quarter_turns = (self.quarter_turns + 1) % 4;
    }

    /// Rotates 90 degrees counter-clockwise.
    pub fn rotate_left(&mut self) {
        self.quarter_turns = (self.quarter_turns + 3) % 4;
    }

    /// Toggles the horizontal flip.
    pub fn toggle_flip_horizontal(&mut self) {
        self.flip_horizontal = !self.flip_horizontal;
    }

    /// Toggles the vertical flip.
    pub fn toggle_flip_vertical(&mut self) {
        self.flip_vertical = !self.flip_vertical;
    }

    /// Clockwise quarter turns (0..=3).
    #[must_use]
    pub fn quarter_turns(&self) -> u8 {
        self.quarter_turns
    }

    #[must_use]
    pub fn flip_horizontal(&self) -> bool {
        self.flip_horizontal
    }

    #[must_use]
    pub fn flip_vertical(&self) -> bool {
        self.flip_vertical
    }

    /// Returns true when the transform leaves the image untouched.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.quarter_turns == 0 && !self.flip_horizontal && !self.flip_vertical
    }

    /// Returns true when width and height are exchanged.
    #[must_use]
    pub fn swaps_dimensions(&self) -> bool {
        self.quarter_turns % 2 == 1
    }

    #[must_use]
    pub fn signature(&self) -> TransformSignature {
        TransformSignature {
            rotation_degrees: u16::from(self.quarter_turns) * 90,
            flip_horizontal: self.flip_horizontal,
            flip_vertical: self.flip_vertical,
        }
    }
}
