//! Software-rendered full-window feedback using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                                              │
//! │         whole window = mode color            │
//! │                                              │
//! │  MODE LABEL                                  │
//! ├──────────────────────────────────────────────┤
//! │  status bar                                  │
//! │  key legend                                  │
//! └──────────────────────────────────────────────┘
//! ```

use anyhow::{anyhow, Result};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::sync::mpsc::Sender;

use scratch_core::Rgb;
use crate::source::{SimInput, Spin};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:    usize = 640;
pub const WIN_H:    usize = 400;
const STATUS_H:     usize = 48;
const STATUS_Y:     usize = WIN_H - STATUS_H;
const STATUS_BG:    u32   = 0xFF0F3460;
const STATUS_FG:    u32   = 0xFFEEEEEE;
const LEGEND_FG:    u32   = 0xFF888888;
const LABEL_SCALE:  usize = 6;
const STATUS_SCALE: usize = 2;

/// What the window asks the driving loop to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiAction {
    None,
    Connect,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    /// Present only when the keyboard simulator is the sample source.
    sim_tx: Option<Sender<SimInput>>,
}

impl Visualizer {
    pub fn new(sim_tx: Option<Sender<SimInput>>) -> Result<Self> {
        let mut window = Window::new(
            "Gyro Scratch",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| anyhow!("cannot open window: {}", e))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![Rgb::BLACK.to_argb(); WIN_W * WIN_H],
            sim_tx,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard inputs; spin keys go to the simulator.
    pub fn poll_input(&mut self) -> UiAction {
        if !self.window.is_open() { return UiAction::Quit; }

        if let Some(tx) = &self.sim_tx {
            for (key, spin) in [(Key::Left, Spin::CounterClockwise), (Key::Right, Spin::Clockwise)] {
                if self.window.is_key_pressed(key, KeyRepeat::No) {
                    let _ = tx.send(SimInput::KeyDown(spin));
                }
                if self.window.is_key_released(key) {
                    let _ = tx.send(SimInput::KeyUp(spin));
                }
            }
        }

        if self.window.is_key_pressed(Key::Q, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
        {
            return UiAction::Quit;
        }
        if self.window.is_key_pressed(Key::C, KeyRepeat::No) {
            return UiAction::Connect;
        }
        UiAction::None
    }

    /// Render one frame.
    pub fn render(&mut self, color: Rgb, label: &str, status: &str) {
        self.buf.fill(color.to_argb());

        let label_fg = contrast(color);
        self.draw_label(label, 24, STATUS_Y - 5 * LABEL_SCALE - 24, LABEL_SCALE, label_fg);

        self.fill_rect(0, STATUS_Y, WIN_W, STATUS_H, STATUS_BG);
        self.draw_label(status, 10, STATUS_Y + 8, STATUS_SCALE, STATUS_FG);
        self.draw_label(
            "left/right=spin  c=connect  q=quit",
            10, WIN_H - 16, STATUS_SCALE, LEGEND_FG,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    /// 3×5 bitmap font, each pixel drawn as a `scale`×`scale` block.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let advance = 4 * scale; // 3 wide + 1 gap
        let mut cx = x;
        for ch in text.chars() {
            if cx + advance > WIN_W { break; }
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += advance;
        }
    }
}

/// White on dark colors, black on light ones.
fn contrast(bg: Rgb) -> u32 {
    let luma = 299 * bg.r as u32 + 587 * bg.g as u32 + 114 * bg.b as u32;
    if luma > 128_000 { 0xFF000000 } else { 0xFFFFFFFF }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_contrasts_with_mode_colors() {
        assert_eq!(contrast(Rgb::BLACK), 0xFFFFFFFF);
        assert_eq!(contrast(Rgb::BLUE),  0xFFFFFFFF);
        assert_eq!(contrast(Rgb::new(0xFF, 0xFF, 0xFF)), 0xFF000000);
    }

    #[test]
    fn letters_are_case_insensitive() {
        assert_eq!(char_glyph('q'), char_glyph('Q'));
        assert_ne!(char_glyph('q'), char_glyph('?'));
    }
}
