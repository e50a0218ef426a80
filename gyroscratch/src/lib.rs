//! # gyroscratch
//!
//! Gyroscope scratch controller: spin the platter one way or the other and
//! a MIDI instrument plays a note for each direction, while the window turns
//! the mode's color.
//!
//! ## Rotation → note mapping
//!
//! | Rotation | Rate (deg/s) | Note | Window |
//! |---|---|---|---|
//! | Counter-clockwise | > 10 | 47 | red |
//! | Clockwise | < -10 | 48 | blue |
//! | Still | within ±3, after the lock decays | — | black |
//!
//! Between 3 and 10 deg/s the previous mode holds.
//!
//! ## Sample sources
//!
//! * (default) — **Simulation mode**: arrow keys drive a virtual platter.
//! * `--replay <file>` — recorded `timestamp_ns,x,y,z` CSV (rad/s).
//!
//! ### Keyboard shortcuts
//!
//! | Key | Action |
//! |---|---|
//! | `←` / hold | Spin counter-clockwise |
//! | `→` / hold | Spin clockwise |
//! | `C` | Connect to the instrument |
//! | `Q` / `Escape` | Quit |

pub mod source;
pub mod sink;
pub mod visualizer;
pub mod app;
