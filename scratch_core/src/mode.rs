//! Rotation modes and their fixed color / note attributes.

use std::fmt;

/// A MIDI note number (0–127).
pub type Note = u8;

// ════════════════════════════════════════════════════════════════════════════
// Rgb
// ════════════════════════════════════════════════════════════════════════════

/// An opaque 24-bit color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);
    pub const BLUE:  Rgb = Rgb::new(0x00, 0x00, 0xFF);
    pub const RED:   Rgb = Rgb::new(0xFF, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Packed `0xAARRGGBB` with full alpha, the layout framebuffers expect.
    pub fn to_argb(self) -> u32 {
        0xFF00_0000 | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RotationMode
// ════════════════════════════════════════════════════════════════════════════

/// Debounced rotation intent.
///
/// | Mode | Color | Note |
/// |---|---|---|
/// | `Idle` | black | — |
/// | `Clockwise` | blue | 48 |
/// | `CounterClockwise` | red | 47 |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RotationMode {
    #[default]
    Idle,
    Clockwise,
    CounterClockwise,
}

impl RotationMode {
    pub const ALL: [RotationMode; 3] = [
        RotationMode::Idle,
        RotationMode::Clockwise,
        RotationMode::CounterClockwise,
    ];

    /// Full-screen feedback color for this mode.
    pub fn color(self) -> Rgb {
        match self {
            RotationMode::Idle             => Rgb::BLACK,
            RotationMode::Clockwise        => Rgb::BLUE,
            RotationMode::CounterClockwise => Rgb::RED,
        }
    }

    /// Note sounded while in this mode; `Idle` is silent.
    pub fn note(self) -> Option<Note> {
        match self {
            RotationMode::Idle             => None,
            RotationMode::Clockwise        => Some(48),
            RotationMode::CounterClockwise => Some(47),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RotationMode::Idle             => "idle",
            RotationMode::Clockwise        => "clockwise",
            RotationMode::CounterClockwise => "counter-clockwise",
        }
    }
}

impl fmt::Display for RotationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_idle() {
        assert_eq!(RotationMode::default(), RotationMode::Idle);
    }

    #[test]
    fn idle_has_no_note() {
        assert_eq!(RotationMode::Idle.note(), None);
        assert_eq!(RotationMode::Clockwise.note(), Some(48));
        assert_eq!(RotationMode::CounterClockwise.note(), Some(47));
    }

    #[test]
    fn active_modes_have_distinct_notes_and_colors() {
        let cw  = RotationMode::Clockwise;
        let ccw = RotationMode::CounterClockwise;
        assert_ne!(cw.note(), ccw.note());
        assert_ne!(cw.color(), ccw.color());
        assert_ne!(cw.color(), RotationMode::Idle.color());
    }

    #[test]
    fn argb_packing() {
        assert_eq!(Rgb::BLACK.to_argb(), 0xFF000000);
        assert_eq!(Rgb::BLUE.to_argb(),  0xFF0000FF);
        assert_eq!(Rgb::RED.to_argb(),   0xFFFF0000);
        assert_eq!(Rgb::new(0x12, 0x34, 0x56).to_argb(), 0xFF123456);
    }

    #[test]
    fn rgb_display_is_hex() {
        assert_eq!(Rgb::RED.to_string(), "#FF0000");
    }
}
