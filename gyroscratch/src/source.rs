//! Gyroscope sample sources — keyboard-driven turntable simulation and
//! recorded-file replay.
//!
//! The public interface is [`SourceEvent`] delivered over a `mpsc` channel.
//! The driving loop doesn't need to know whether samples came from a
//! recording or the simulator.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};
use thiserror::Error;

use scratch_core::degrees_per_second;

// ════════════════════════════════════════════════════════════════════════════
// GyroSample
// ════════════════════════════════════════════════════════════════════════════

/// One raw gyroscope reading, rad/s on each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GyroSample {
    pub timestamp_ns: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl GyroSample {
    /// A sample that only carries rotation about the z-axis.
    pub fn z_only(timestamp_ns: i64, z: f64) -> Self {
        GyroSample { timestamp_ns, x: 0.0, y: 0.0, z }
    }

    /// Platter rate in deg/s (z-axis).
    pub fn rate(&self) -> f64 {
        degrees_per_second(self.z)
    }
}

/// What a source can deliver.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    Sample(GyroSample),
    /// The source has nothing more to deliver.
    Finished,
}

// ════════════════════════════════════════════════════════════════════════════
// SampleSource trait — unified interface for replay and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`SourceEvent`]s over a channel.
pub trait SampleSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>);
}

/// Spawn a sample source on its own thread and return the receiving end.
pub fn spawn_sample_source<S: SampleSource>(source: S) -> Receiver<SourceEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// Turntable — simulated platter physics
// ════════════════════════════════════════════════════════════════════════════

/// Platter rate while a spin key is held (rad/s, ≈ 86°/s).
pub const SPIN_RATE: f64 = 1.5;
/// Time constant while driven.
const SPIN_UP_TAU: f64 = 0.12;
/// Time constant while coasting.
const COAST_TAU: f64 = 0.35;
/// Sensor delivery period, roughly a game-loop sensor rate.
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(20);

/// Direction the simulated hand is pushing the platter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Spin {
    Clockwise,
    CounterClockwise,
}

/// A platter that eases toward the driven rate and coasts to rest.
#[derive(Clone, Debug, Default)]
pub struct Turntable {
    rate:  f64,
    drive: Option<Spin>,
}

impl Turntable {
    pub fn rate(&self) -> f64 { self.rate }

    pub fn drive(&mut self, spin: Option<Spin>) {
        self.drive = spin;
    }

    /// Advance by `dt` seconds and return the new z-axis rate (rad/s).
    ///
    /// Positive z is counter-clockwise, matching the sensor axis.
    pub fn step(&mut self, dt: f64) -> f64 {
        let (target, tau) = match self.drive {
            Some(Spin::CounterClockwise) => ( SPIN_RATE, SPIN_UP_TAU),
            Some(Spin::Clockwise)        => (-SPIN_RATE, SPIN_UP_TAU),
            None                         => (0.0,        COAST_TAU),
        };
        let alpha = 1.0 - (-dt.max(0.0) / tau).exp();
        self.rate += (target - self.rate) * alpha;
        self.rate
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimSampleSource — keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    KeyDown(Spin),
    KeyUp(Spin),
}

/// Samples a [`Turntable`] every [`SAMPLE_PERIOD`], steered by [`SimInput`]s
/// from the visualizer window.
pub struct SimSampleSource {
    pub rx: Receiver<SimInput>,
}

impl SampleSource for SimSampleSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        let epoch = Instant::now();
        let mut table = Turntable::default();
        let mut held: Option<Spin> = None;
        let mut last = epoch;

        loop {
            loop {
                match self.rx.try_recv() {
                    Ok(SimInput::KeyDown(spin)) => held = Some(spin),
                    Ok(SimInput::KeyUp(spin)) if held == Some(spin) => held = None,
                    Ok(SimInput::KeyUp(_)) => {}
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        let _ = tx.send(SourceEvent::Finished);
                        return;
                    }
                }
            }
            table.drive(held);

            let now = Instant::now();
            let z = table.step(now.duration_since(last).as_secs_f64());
            last = now;

            let ts = now.duration_since(epoch).as_nanos() as i64;
            if tx.send(SourceEvent::Sample(GyroSample::z_only(ts, z))).is_err() {
                return;
            }
            thread::sleep(SAMPLE_PERIOD);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Replay — recorded CSV `timestamp_ns,x,y,z`
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("cannot read recording: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected `timestamp_ns,x,y,z`, got {fields} field(s)")]
    FieldCount { line: usize, fields: usize },

    #[error("line {line}: invalid {field} `{value}`")]
    Number { line: usize, field: &'static str, value: String },
}

/// Parse one recording line.  Blank lines and `#` comments yield `None`.
///
/// Values are taken as written; NaN and out-of-order timestamps are left for
/// the classifier to reject.
pub fn parse_line(line: &str, lineno: usize) -> Result<Option<GyroSample>, ReplayError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 4 {
        return Err(ReplayError::FieldCount { line: lineno, fields: fields.len() });
    }

    let timestamp_ns = fields[0].parse::<i64>().map_err(|_| ReplayError::Number {
        line: lineno, field: "timestamp", value: fields[0].to_string(),
    })?;
    let axis = |i: usize, field: &'static str| {
        fields[i].parse::<f64>().map_err(|_| ReplayError::Number {
            line: lineno, field, value: fields[i].to_string(),
        })
    };

    Ok(Some(GyroSample {
        timestamp_ns,
        x: axis(1, "x")?,
        y: axis(2, "y")?,
        z: axis(3, "z")?,
    }))
}

/// Parse a whole recording.
pub fn parse_recording<R: BufRead>(reader: R) -> Result<Vec<GyroSample>, ReplayError> {
    let mut samples = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        if let Some(s) = parse_line(&line?, i + 1)? {
            samples.push(s);
        }
    }
    Ok(samples)
}

pub fn load_recording(path: &Path) -> Result<Vec<GyroSample>, ReplayError> {
    let samples = parse_recording(BufReader::new(File::open(path)?))?;
    info!("loaded {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

/// Replays recorded samples, sleeping for the recorded gaps.
pub struct ReplaySampleSource {
    pub samples: Vec<GyroSample>,
}

impl SampleSource for ReplaySampleSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        let mut previous: Option<i64> = None;
        for sample in self.samples {
            if let Some(p) = previous {
                let gap = sample.timestamp_ns.saturating_sub(p).max(0) as u64;
                thread::sleep(Duration::from_nanos(gap));
            }
            previous = Some(sample.timestamp_ns);
            if tx.send(SourceEvent::Sample(sample)).is_err() {
                return;
            }
        }
        debug!("replay finished");
        let _ = tx.send(SourceEvent::Finished);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
