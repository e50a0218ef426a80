//! # scratch_core
//!
//! Turn a noisy gyroscope rate stream into debounced rotation intents and
//! the minimal note-on / note-off traffic needed to follow them.
//!
//! * [`HysteresisClassifier`] — deg/s samples → [`RotationMode`]
//! * [`NoteReconciler`] — [`RotationMode`] → (color, [`NoteEvent`]s)
//!
//! The two halves never reference each other; the caller forwards the mode.
//! Neither does any I/O, so both are safe to drive from a sensor callback.
//!
//! ## Quick start
//!
//! ```rust
//! use scratch_core::{HysteresisClassifier, NoteReconciler, NoteEvent, RotationMode};
//!
//! let mut classifier = HysteresisClassifier::new();
//! let mut reconciler = NoteReconciler::new();
//!
//! let mode = classifier.process_sample(15.0, 0).unwrap();
//! assert_eq!(mode, RotationMode::CounterClockwise);
//!
//! let (color, events) = reconciler.reconcile(mode);
//! assert_eq!(color, RotationMode::CounterClockwise.color());
//! assert_eq!(events, vec![NoteEvent::NoteOn(47)]);
//! ```

pub mod mode;
pub mod classifier;
pub mod reconciler;
pub mod wire;
pub mod error;

pub use mode::{RotationMode, Rgb, Note};
pub use classifier::{HysteresisClassifier, degrees_per_second};
pub use reconciler::{NoteReconciler, NoteEvent};
pub use wire::{NOTE_ON, NOTE_OFF, DEFAULT_VELOCITY};
pub use error::SampleError;
