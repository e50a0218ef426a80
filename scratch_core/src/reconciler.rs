//! Note reconciler — [`RotationMode`] → minimal note-off / note-on delta.
//!
//! Keeps a single active note.  Each call compares the mode's note with the
//! one currently sounding and emits only what is needed to move from one to
//! the other, always releasing before striking.

use log::debug;

use crate::mode::{Note, Rgb, RotationMode};

/// A note transition for the external instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoteEvent {
    NoteOff(Note),
    NoteOn(Note),
}

impl NoteEvent {
    pub fn note(self) -> Note {
        match self {
            NoteEvent::NoteOff(n) | NoteEvent::NoteOn(n) => n,
        }
    }

    pub fn is_on(self) -> bool {
        matches!(self, NoteEvent::NoteOn(_))
    }
}

/// Monophonic note state that follows the current rotation mode.
#[derive(Clone, Debug, Default)]
pub struct NoteReconciler {
    active: Option<Note>,
}

impl NoteReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The note currently considered sounding.
    pub fn active_note(&self) -> Option<Note> {
        self.active
    }

    /// Bring the sounding note in line with `mode`.
    ///
    /// The color is reported on every call; events are empty when the
    /// mode's note is already the active one.
    pub fn reconcile(&mut self, mode: RotationMode) -> (Rgb, Vec<NoteEvent>) {
        let color  = mode.color();
        let target = mode.note();

        if target == self.active {
            return (color, Vec::new());
        }

        let mut events = Vec::with_capacity(2);
        if let Some(previous) = self.active {
            events.push(NoteEvent::NoteOff(previous));
        }
        self.active = target;
        if let Some(next) = target {
            events.push(NoteEvent::NoteOn(next));
        }

        debug!("{} → {:?}", mode, events);
        (color, events)
    }

    /// Silence whatever is sounding, e.g. before shutting down.
    pub fn release(&mut self) -> Option<NoteEvent> {
        self.active.take().map(NoteEvent::NoteOff)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
