// SPDX-License-Identifier: MPL-2.0
//! Layout modes and device orientation.

/// Physical orientation reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    FaceUp,
    FaceDown,
    Unknown,
}

impl DeviceOrientation {
    /// Flat and unknown orientations carry no layout information.
    #[must_use]
    pub fn is_meaningful(self) -> bool {
        !matches!(self, Self::FaceUp | Self::FaceDown | Self::Unknown)
    }

    #[must_use]
    pub fn is_landscape(self) -> bool {
        matches!(self, Self::LandscapeLeft | Self::LandscapeRight)
    }

    #[must_use]
    pub fn is_portrait(self) -> bool {
        matches!(self, Self::Portrait | Self::PortraitUpsideDown)
    }
}

/// Orientation of the embedded (in-page) layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddedOrientation {
    #[default]
    Portrait,
    Landscape,
}

/// Where and how the player is laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Player embedded in the page.
    Embedded(EmbeddedOrientation),
    /// Player fills the screen, landscape.
    FullScreen,
    /// Floating mini-player.
    Mini,
}

impl LayoutMode {
    /// Initial layout of the screen.
    pub const INITIAL: Self = Self::Embedded(EmbeddedOrientation::Portrait);

    #[must_use]
    pub fn is_mini(self) -> bool {
        matches!(self, Self::Mini)
    }

    #[must_use]
    pub fn is_full_screen(self) -> bool {
        matches!(self, Self::FullScreen)
    }

    #[must_use]
    pub fn is_embedded(self) -> bool {
        matches!(self, Self::Embedded(_))
    }

    /// Short name used in logs and diagnostics.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Embedded(EmbeddedOrientation::Portrait) => "embedded-portrait",
            Self::Embedded(EmbeddedOrientation::Landscape) => "embedded-landscape",
            Self::FullScreen => "full-screen",
            Self::Mini => "mini",
        }
    }
}

impl Default for LayoutMode {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Visual rotation applied to the player content, in 90° increments.
///
/// Full-screen stays landscape while the device is held upright; the view
/// then turns the content a quarter turn instead of relayouting.
///
/// # Example
///
/// ```
/// use playscreen::domain::RotationAngle;
///
/// assert_eq!(RotationAngle::QUARTER.degrees(), 90);
/// assert!(RotationAngle::QUARTER.swaps_dimensions());
/// assert!(!RotationAngle::ZERO.is_rotated());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RotationAngle(u16);

impl RotationAngle {
    /// No rotation (0°).
    pub const ZERO: Self = Self(0);

    /// Quarter turn clockwise (90°).
    pub const QUARTER: Self = Self(90);

    /// Returns the angle in degrees.
    #[must_use]
    pub fn degrees(self) -> u16 {
        self.0
    }

    /// Returns true if the angle is not zero.
    #[must_use]
    pub fn is_rotated(self) -> bool {
        self.0 != 0
    }

    /// Returns true if width and height swap when rendering.
    #[must_use]
    pub fn swaps_dimensions(self) -> bool {
        self.0 == 90 || self.0 == 270
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_orientations_are_not_meaningful() {
        assert!(!DeviceOrientation::FaceUp.is_meaningful());
        assert!(!DeviceOrientation::FaceDown.is_meaningful());
        assert!(!DeviceOrientation::Unknown.is_meaningful());
        assert!(DeviceOrientation::LandscapeLeft.is_meaningful());
        assert!(DeviceOrientation::PortraitUpsideDown.is_meaningful());
    }

    #[test]
    fn initial_layout_is_embedded_portrait() {
        assert_eq!(
            LayoutMode::default(),
            LayoutMode::Embedded(EmbeddedOrientation::Portrait)
        );
        assert_eq!(LayoutMode::INITIAL.name(), "embedded-portrait");
    }
}
