//! MIDI channel-voice framing for [`NoteEvent`]s.
//!
//! Bytes are built directly; no MIDI library is needed for three-byte
//! messages.

use crate::reconciler::NoteEvent;

/// Note On status nibble.
pub const NOTE_ON:  u8 = 0x90;
/// Note Off status nibble.
pub const NOTE_OFF: u8 = 0x80;

/// Strike velocity used for both on and off messages.
pub const DEFAULT_VELOCITY: u8 = 127;

impl NoteEvent {
    /// `[status | channel, note, velocity]`.
    ///
    /// `channel` is masked to 0–15 and the data bytes to 7 bits.
    pub fn to_midi(self, channel: u8, velocity: u8) -> [u8; 3] {
        let status = match self {
            NoteEvent::NoteOn(_)  => NOTE_ON,
            NoteEvent::NoteOff(_) => NOTE_OFF,
        };
        [status | (channel & 0x0F), self.note() & 0x7F, velocity & 0x7F]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_framing() {
        assert_eq!(NoteEvent::NoteOn(47).to_midi(0, DEFAULT_VELOCITY), [0x90, 47, 127]);
    }

    #[test]
    fn note_off_keeps_velocity() {
        assert_eq!(NoteEvent::NoteOff(48).to_midi(0, DEFAULT_VELOCITY), [0x80, 48, 127]);
    }

    #[test]
    fn channel_is_or_ed_into_status() {
        assert_eq!(NoteEvent::NoteOn(48).to_midi(9, 100), [0x99, 48, 100]);
        assert_eq!(NoteEvent::NoteOff(48).to_midi(0x1F, 100)[0], 0x8F);
    }

    #[test]
    fn data_bytes_stay_seven_bit() {
        let bytes = NoteEvent::NoteOn(200).to_midi(0, 255);
        assert!(bytes[1] < 0x80 && bytes[2] < 0x80);
    }
}
