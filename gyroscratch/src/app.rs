//! Top-level driving loop.
//!
//! `AppState` owns the classifier, the reconciler and the note output.  Each
//! sample goes classifier → reconciler → output on the calling thread, so the
//! core never sees concurrent calls.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};

use scratch_core::{HysteresisClassifier, NoteEvent, NoteReconciler, Rgb, RotationMode, DEFAULT_VELOCITY};

use crate::sink::NoteOutput;
use crate::source::{
    load_recording, spawn_sample_source, GyroSample, ReplaySampleSource, SimSampleSource,
    SourceEvent,
};
use crate::visualizer::{UiAction, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Substring used to prefer a MIDI output port.
    pub port_hint: String,
    pub channel:   u8,
    pub velocity:  u8,
    /// Connect at startup instead of waiting for the user.
    pub connect:   bool,
    /// Replay a recording instead of the keyboard simulator.
    pub replay:    Option<PathBuf>,
    /// No window; requires `replay`.
    pub headless:  bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port_hint: "gyroscratch".to_string(),
            channel:   0,
            velocity:  DEFAULT_VELOCITY,
            connect:   false,
            replay:    None,
            headless:  false,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    classifier: HysteresisClassifier,
    reconciler: NoteReconciler,
    output:     NoteOutput,
    port_hint:  String,

    color:       Rgb,
    pub status:  String,
    accepted:    usize,
    rejected:    usize,
    notes_on:    usize,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Self {
        Self::with_output(cfg, NoteOutput::new(cfg.channel, cfg.velocity))
    }

    pub fn with_output(cfg: &AppConfig, output: NoteOutput) -> Self {
        AppState {
            classifier: HysteresisClassifier::new(),
            reconciler: NoteReconciler::new(),
            output,
            port_hint:  cfg.port_hint.clone(),
            color:      RotationMode::Idle.color(),
            status:     "Not connected - press C to connect".to_string(),
            accepted:   0,
            rejected:   0,
            notes_on:   0,
        }
    }

    // ── one sample through the pipeline ──────────────────────────────────

    /// Classify, reconcile and deliver one sample.  Returns the events sent
    /// (or that would have been sent without an instrument).
    pub fn handle_sample(&mut self, sample: GyroSample) -> Vec<NoteEvent> {
        let mode = match self.classifier.process_sample(sample.rate(), sample.timestamp_ns) {
            Ok(mode) => mode,
            Err(e) => {
                self.rejected += 1;
                warn!("skipping sample: {}", e);
                return Vec::new();
            }
        };
        self.accepted += 1;

        let (color, events) = self.reconciler.reconcile(mode);
        self.color = color;
        if !events.is_empty() {
            self.notes_on += events.iter().filter(|e| e.is_on()).count();
            debug!("t={} {} → {:?}", sample.timestamp_ns, mode, events);
            self.output.deliver(&events);
        }
        events
    }

    /// Connect to the instrument.  A no-op once connected.
    pub fn connect(&mut self) {
        if self.output.is_connected() {
            return;
        }
        self.status = "Scanning...".to_string();
        match self.output.connect(&self.port_hint) {
            Ok(name) => self.status = format!("Connected to {}", name),
            Err(e) => {
                warn!("connect failed: {:#}", e);
                self.status = "No instrument found - press C to retry".to_string();
            }
        }
    }

    /// Turn off whatever is still sounding.
    pub fn shutdown(&mut self) {
        if let Some(off) = self.reconciler.release() {
            info!("releasing note {}", off.note());
            self.output.deliver(&[off]);
        }
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn mode(&self)       -> RotationMode { self.classifier.mode() }
    pub fn color(&self)      -> Rgb          { self.color }
    pub fn confidence(&self) -> f64          { self.classifier.confidence() }
    pub fn accepted(&self)   -> usize        { self.accepted }
    pub fn rejected(&self)   -> usize        { self.rejected }
    pub fn notes_on(&self)   -> usize        { self.notes_on }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the windowed loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application with a window.
///
/// Samples come from the keyboard simulator, or from `cfg.replay` when set.
pub fn run(cfg: AppConfig) -> Result<()> {
    if cfg.headless {
        let summary = run_headless(&cfg)?;
        info!("{}", summary);
        return Ok(());
    }

    let (sim_tx, sample_rx): (_, Receiver<SourceEvent>) = match &cfg.replay {
        Some(path) => {
            let samples = load_recording(path)
                .with_context(|| format!("loading {}", path.display()))?;
            (None, spawn_sample_source(ReplaySampleSource { samples }))
        }
        None => {
            let (tx, rx) = mpsc::channel();
            (Some(tx), spawn_sample_source(SimSampleSource { rx }))
        }
    };

    let mut vis = Visualizer::new(sim_tx)?;
    let mut app = AppState::new(&cfg);
    if cfg.connect {
        app.connect();
    }

    while vis.is_open() {
        match vis.poll_input() {
            UiAction::Quit    => break,
            UiAction::Connect => app.connect(),
            UiAction::None    => {}
        }

        loop {
            match sample_rx.try_recv() {
                Ok(SourceEvent::Sample(s)) => { app.handle_sample(s); }
                Ok(SourceEvent::Finished)  => app.status = "Replay finished".to_string(),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        vis.render(app.color(), app.mode().name(), &app.status);
    }

    app.shutdown();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// run_headless() — replay straight through, no window
// ════════════════════════════════════════════════════════════════════════════

/// Counters reported after a headless replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub accepted: usize,
    pub rejected: usize,
    pub notes_on: usize,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} samples accepted, {} rejected, {} notes struck",
            self.accepted, self.rejected, self.notes_on
        )
    }
}

/// Feed a recording through the pipeline as fast as possible.
pub fn run_headless(cfg: &AppConfig) -> Result<Summary> {
    let Some(path) = &cfg.replay else {
        bail!("headless mode needs a recording (--replay <file>)");
    };
    let samples = load_recording(path)
        .with_context(|| format!("loading {}", path.display()))?;

    let mut app = AppState::new(cfg);
    if cfg.connect {
        app.connect();
    }
    Ok(replay_all(&mut app, &samples))
}

fn replay_all(app: &mut AppState, samples: &[GyroSample]) -> Summary {
    let mut mode = app.mode();
    for &sample in samples {
        app.handle_sample(sample);
        if app.mode() != mode {
            mode = app.mode();
            info!("t={}ns  {}  color {}", sample.timestamp_ns, mode, app.color());
        }
    }
    app.shutdown();
    Summary {
        accepted: app.accepted(),
        rejected: app.rejected(),
        notes_on: app.notes_on(),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
