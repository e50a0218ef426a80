//! Note sink — delivers reconciled [`NoteEvent`]s to a MIDI output port.
//!
//! The sink may be absent.  Until the user connects (or when no port can be
//! opened) events are still computed upstream and simply dropped here.

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};

use scratch_core::{NoteEvent, DEFAULT_VELOCITY};

/// Client name registered with the MIDI backend.
const CLIENT_NAME: &str = "gyroscratch";

// ════════════════════════════════════════════════════════════════════════════
// NoteSink — abstraction over midir / test doubles
// ════════════════════════════════════════════════════════════════════════════

/// Something that accepts raw three-byte MIDI messages.
pub trait NoteSink: Send {
    fn send(&mut self, message: &[u8; 3]) -> Result<()>;
    fn name(&self) -> &str;
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirSink {
    conn: midir::MidiOutputConnection,
    name: String,
}

impl NoteSink for MidirSink {
    fn send(&mut self, message: &[u8; 3]) -> Result<()> {
        self.conn.send(message).map_err(|e| anyhow!("MIDI send failed: {}", e))
    }
    fn name(&self) -> &str { &self.name }
}

// ════════════════════════════════════════════════════════════════════════════
// Port selection
// ════════════════════════════════════════════════════════════════════════════

/// Pick the port whose name contains `hint` (case-insensitive), otherwise
/// the first port.  `None` when there are no ports.
pub fn pick_port(names: &[String], hint: &str) -> Option<usize> {
    if names.is_empty() {
        return None;
    }
    let hint = hint.to_lowercase();
    let preferred = if hint.is_empty() {
        None
    } else {
        names.iter().position(|n| n.to_lowercase().contains(&hint))
    };
    Some(preferred.unwrap_or(0))
}

/// Enumerate MIDI outputs and connect to the best match for `hint`.
fn open_midir_sink(hint: &str) -> Result<Box<dyn NoteSink>> {
    let midi_out = midir::MidiOutput::new(CLIENT_NAME)
        .map_err(|e| anyhow!("MIDI init error: {}", e))?;

    let ports = midi_out.ports();
    let names: Vec<String> = ports.iter()
        .map(|p| midi_out.port_name(p).unwrap_or_else(|_| "Unknown".to_string()))
        .collect();
    debug!("MIDI output ports: {:?}", names);

    let idx = pick_port(&names, hint)
        .ok_or_else(|| anyhow!("no MIDI output ports found"))?;
    if !names[idx].to_lowercase().contains(&hint.to_lowercase()) {
        warn!("no port matching \"{}\"; falling back to {}", hint, names[idx]);
    }

    let name = names[idx].clone();
    let conn = midi_out.connect(&ports[idx], "gyroscratch-out")
        .map_err(|e| anyhow!("{}", e))
        .with_context(|| format!("failed to connect to {}", name))?;
    Ok(Box::new(MidirSink { conn, name }))
}

// ════════════════════════════════════════════════════════════════════════════
// NoteOutput — optional sink plus framing settings
// ════════════════════════════════════════════════════════════════════════════

/// The connection slot the driving loop talks to.
pub struct NoteOutput {
    sink:     Option<Box<dyn NoteSink>>,
    channel:  u8,
    velocity: u8,
}

impl NoteOutput {
    /// A disconnected output.
    pub fn new(channel: u8, velocity: u8) -> Self {
        NoteOutput { sink: None, channel, velocity }
    }

    /// An output already attached to `sink`.
    pub fn with_sink(sink: Box<dyn NoteSink>, channel: u8, velocity: u8) -> Self {
        NoteOutput { sink: Some(sink), channel, velocity }
    }

    pub fn is_connected(&self) -> bool { self.sink.is_some() }

    pub fn port_name(&self) -> Option<&str> {
        self.sink.as_ref().map(|s| s.name())
    }

    /// Connect to a MIDI port.  A no-op when already connected.
    ///
    /// Returns the connected port name.
    pub fn connect(&mut self, hint: &str) -> Result<String> {
        if let Some(sink) = &self.sink {
            return Ok(sink.name().to_string());
        }
        info!("scanning MIDI outputs for \"{}\"", hint);
        let sink = open_midir_sink(hint)?;
        let name = sink.name().to_string();
        info!("connected to {}", name);
        self.sink = Some(sink);
        Ok(name)
    }

    /// Send `events` in order.  Dropped silently when disconnected.
    ///
    /// A failed send is logged and the rest of the batch is still attempted.
    pub fn deliver(&mut self, events: &[NoteEvent]) {
        let Some(sink) = self.sink.as_mut() else { return };
        for ev in events {
            let msg = ev.to_midi(self.channel, self.velocity);
            if let Err(e) = sink.send(&msg) {
                warn!("{:?} not delivered to {}: {:#}", ev, sink.name(), e);
            }
        }
    }
}

impl Default for NoteOutput {
    fn default() -> Self {
        NoteOutput::new(0, DEFAULT_VELOCITY)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Captures every message; shares the log with the test.
    pub(crate) struct RecordingSink {
        pub(crate) sent: Arc<Mutex<Vec<[u8; 3]>>>,
        pub(crate) fail: bool,
    }

    impl RecordingSink {
        pub(crate) fn new() -> (Self, Arc<Mutex<Vec<[u8; 3]>>>) {
            let sent = Arc::new(Mutex::new(Vec::new()));
            (RecordingSink { sent: Arc::clone(&sent), fail: false }, sent)
        }
    }

    impl NoteSink for RecordingSink {
        fn send(&mut self, message: &[u8; 3]) -> Result<()> {
            self.sent.lock().unwrap().push(*message);
            if self.fail { Err(anyhow!("port vanished")) } else { Ok(()) }
        }
        fn name(&self) -> &str { "recorder" }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pick_port_prefers_hint() {
        let ports = names(&["Midi Through", "GyroScratch BLE", "FluidSynth"]);
        assert_eq!(pick_port(&ports, "gyroscratch"), Some(1));
    }

    #[test]
    fn pick_port_falls_back_to_first() {
        let ports = names(&["Midi Through", "FluidSynth"]);
        assert_eq!(pick_port(&ports, "gyroscratch"), Some(0));
        assert_eq!(pick_port(&ports, ""), Some(0));
    }

    #[test]
    fn pick_port_none_without_ports() {
        assert_eq!(pick_port(&[], "gyroscratch"), None);
    }

    #[test]
    fn disconnected_output_drops_events() {
        let mut out = NoteOutput::default();
        assert!(!out.is_connected());
        out.deliver(&[NoteEvent::NoteOn(47)]);
        assert_eq!(out.port_name(), None);
    }

    #[test]
    fn connected_output_frames_in_order() {
        let (sink, sent) = RecordingSink::new();
        let mut out = NoteOutput::with_sink(Box::new(sink), 2, 127);
        out.deliver(&[NoteEvent::NoteOff(48), NoteEvent::NoteOn(47)]);
        assert_eq!(*sent.lock().unwrap(), vec![[0x82, 48, 127], [0x92, 47, 127]]);
    }

    #[test]
    fn connect_is_noop_once_connected() {
        let (sink, _) = RecordingSink::new();
        let mut out = NoteOutput::with_sink(Box::new(sink), 0, 127);
        assert_eq!(out.connect("anything").unwrap(), "recorder");
        assert_eq!(out.port_name(), Some("recorder"));
    }

    #[test]
    fn failed_send_does_not_abort_batch() {
        let (mut sink, sent) = RecordingSink::new();
        sink.fail = true;
        let mut out = NoteOutput::with_sink(Box::new(sink), 0, 127);
        out.deliver(&[NoteEvent::NoteOff(48), NoteEvent::NoteOn(47)]);
        assert_eq!(sent.lock().unwrap().len(), 2);
    }
}
