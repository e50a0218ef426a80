//! Hysteresis classifier — angular velocity → [`RotationMode`].
//!
//! A fast spin in either direction switches mode immediately.  Falling back
//! to `Idle` needs both a near-still sample *and* low confidence, and
//! confidence only drains with time since the last mode change.  This stops
//! the mode from flapping while the platter slows through the dead zone.
//!
//! # Algorithm
//!
//! For each accepted sample `(v, t)`:
//!
//! 1. `confidence *= exp(-(t - t_prev) · 1e-9)` (skipped on the first sample)
//! 2. `v > 10` → CounterClockwise, `v < -10` → Clockwise,
//!    `|v| < 3 && confidence < 0.9` → Idle, otherwise keep the current mode
//! 3. a mode change resets confidence to `1.0`
//!
//! All comparisons are strict.  The sign mapping (positive rate →
//! counter-clockwise) follows the sensor's axis orientation.

use log::{debug, trace};

use crate::error::SampleError;
use crate::mode::RotationMode;

// ════════════════════════════════════════════════════════════════════════════
// Thresholds
// ════════════════════════════════════════════════════════════════════════════

/// Rate above which the platter is definitely spinning (deg/s).
pub const ACTIVE_THRESHOLD: f64 = 10.0;

/// Rate below which the platter may be considered still (deg/s).
pub const IDLE_THRESHOLD: f64 = 3.0;

/// Confidence must have decayed below this before returning to `Idle`.
pub const IDLE_LOCK_CONFIDENCE: f64 = 0.9;

/// Confidence after a mode change.
pub const FULL_CONFIDENCE: f64 = 1.0;

/// Nanoseconds → seconds; gives the decay a one-second time constant.
const DECAY_PER_NS: f64 = 1e-9;

/// Convert a raw gyroscope reading in rad/s to deg/s.
pub fn degrees_per_second(radians_per_second: f64) -> f64 {
    radians_per_second * 180.0 / std::f64::consts::PI
}

// ════════════════════════════════════════════════════════════════════════════
// HysteresisClassifier
// ════════════════════════════════════════════════════════════════════════════

/// Debounces a single gyroscope axis into a [`RotationMode`].
///
/// Samples must arrive from one logical stream in non-decreasing timestamp
/// order.  The classifier is not internally synchronised.
#[derive(Clone, Debug)]
pub struct HysteresisClassifier {
    mode:           RotationMode,
    confidence:     f64,
    last_timestamp: Option<i64>,
}

impl Default for HysteresisClassifier {
    fn default() -> Self {
        HysteresisClassifier {
            mode:           RotationMode::Idle,
            confidence:     FULL_CONFIDENCE,
            last_timestamp: None,
        }
    }
}

impl HysteresisClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self)           -> RotationMode { self.mode }
    pub fn confidence(&self)     -> f64          { self.confidence }
    pub fn last_timestamp(&self) -> Option<i64>  { self.last_timestamp }

    /// Feed one sample and return the mode after it.
    ///
    /// `angular_velocity` is in deg/s, `timestamp_ns` in nanoseconds on a
    /// monotonic clock.  Non-finite velocities and timestamps earlier than the
    /// previous accepted one are rejected and leave the state untouched.
    pub fn process_sample(
        &mut self,
        angular_velocity: f64,
        timestamp_ns:     i64,
    ) -> Result<RotationMode, SampleError> {
        if !angular_velocity.is_finite() {
            return Err(SampleError::NonFiniteVelocity(angular_velocity));
        }
        if let Some(previous) = self.last_timestamp {
            if timestamp_ns < previous {
                return Err(SampleError::TimestampRegressed { previous, current: timestamp_ns });
            }
            let elapsed_ns = timestamp_ns.saturating_sub(previous);
            self.confidence *= (-(elapsed_ns as f64) * DECAY_PER_NS).exp();
        }

        let target = self.target_mode(angular_velocity);
        if target != self.mode {
            self.transition(target);
        }

        self.last_timestamp = Some(timestamp_ns);
        trace!(
            "sample v={:.2}°/s t={} → {} (confidence {:.3})",
            angular_velocity, timestamp_ns, self.mode, self.confidence
        );
        Ok(self.mode)
    }

    fn target_mode(&self, v: f64) -> RotationMode {
        if v > ACTIVE_THRESHOLD {
            RotationMode::CounterClockwise
        } else if v < -ACTIVE_THRESHOLD {
            RotationMode::Clockwise
        } else if v.abs() < IDLE_THRESHOLD && self.confidence < IDLE_LOCK_CONFIDENCE {
            RotationMode::Idle
        } else {
            self.mode
        }
    }

    /// Mode and confidence change together or not at all.
    fn transition(&mut self, to: RotationMode) {
        debug!("rotation {} → {}", self.mode, to);
        self.mode = to;
        self.confidence = FULL_CONFIDENCE;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const MS: i64 = 1_000_000;

    fn feed(c: &mut HysteresisClassifier, samples: &[(f64, i64)]) -> Vec<RotationMode> {
        samples.iter()
            .map(|&(v, t)| c.process_sample(v, t).unwrap())
            .collect()
    }

    #[test]
    fn starts_idle_with_full_confidence() {
        let c = HysteresisClassifier::new();
        assert_eq!(c.mode(), RotationMode::Idle);
        assert_eq!(c.confidence(), 1.0);
        assert_eq!(c.last_timestamp(), None);
    }

    #[test]
    fn radians_to_degrees() {
        assert!((degrees_per_second(std::f64::consts::PI) - 180.0).abs() < 1e-9);
        assert!((degrees_per_second(-1.0) + 57.295_779_513).abs() < 1e-6);
    }

    #[test]
    fn positive_rate_is_counter_clockwise() {
        let mut c = HysteresisClassifier::new();
        assert_eq!(c.process_sample(10.5, 0).unwrap(), RotationMode::CounterClockwise);
    }

    #[test]
    fn negative_rate_is_clockwise() {
        let mut c = HysteresisClassifier::new();
        assert_eq!(c.process_sample(-10.5, 0).unwrap(), RotationMode::Clockwise);
    }

    #[test]
    fn active_threshold_is_strict() {
        let mut c = HysteresisClassifier::new();
        assert_eq!(c.process_sample(10.0, 0).unwrap(), RotationMode::Idle);
        assert_eq!(c.process_sample(-10.0, MS).unwrap(), RotationMode::Idle);
    }

    #[test]
    fn dead_zone_keeps_mode() {
        let mut c = HysteresisClassifier::new();
        c.process_sample(20.0, 0).unwrap();
        // 5 s later confidence is ~0.007, but 5°/s is inside the dead zone.
        assert_eq!(c.process_sample(5.0, 5_000 * MS).unwrap(), RotationMode::CounterClockwise);
        // |v| == 3 is not below the idle threshold.
        assert_eq!(c.process_sample(-3.0, 5_001 * MS).unwrap(), RotationMode::CounterClockwise);
    }

    #[test]
    fn scenario_locked_above_confidence() {
        let mut c = HysteresisClassifier::new();
        let modes = feed(&mut c, &[(15.0, 0), (15.0, 10 * MS), (0.0, 20 * MS)]);
        assert_eq!(modes, vec![RotationMode::CounterClockwise; 3]);
    }

    #[test]
    fn scenario_long_gap_returns_to_idle() {
        let mut c = HysteresisClassifier::new();
        let modes = feed(&mut c, &[(15.0, 0), (0.0, 1_100 * MS)]);
        assert_eq!(modes, vec![RotationMode::CounterClockwise, RotationMode::Idle]);
    }

    #[test]
    fn scenario_direct_reversal() {
        let mut c = HysteresisClassifier::new();
        let modes = feed(&mut c, &[(-15.0, 0), (15.0, 10 * MS)]);
        assert_eq!(modes, vec![RotationMode::Clockwise, RotationMode::CounterClockwise]);
    }

    #[test]
    fn lock_out_boundary() {
        // exp(-0.1) ≈ 0.905, still locked.
        let mut c = HysteresisClassifier::new();
        c.process_sample(15.0, 0).unwrap();
        assert_eq!(c.process_sample(0.0, 100 * MS).unwrap(), RotationMode::CounterClockwise);

        // exp(-0.11) ≈ 0.896, released.
        let mut c = HysteresisClassifier::new();
        c.process_sample(15.0, 0).unwrap();
        assert_eq!(c.process_sample(0.0, 110 * MS).unwrap(), RotationMode::Idle);
    }

    #[test]
    fn confidence_resets_on_mode_change() {
        let mut c = HysteresisClassifier::new();
        c.process_sample(15.0, 0).unwrap();
        c.process_sample(15.0, 500 * MS).unwrap();
        assert!(c.confidence() < 1.0);
        c.process_sample(-15.0, 600 * MS).unwrap();
        assert_eq!(c.mode(), RotationMode::Clockwise);
        assert_eq!(c.confidence(), 1.0);
        c.process_sample(0.0, 2_000 * MS).unwrap();
        assert_eq!(c.mode(), RotationMode::Idle);
        assert_eq!(c.confidence(), 1.0);
    }

    #[test]
    fn confidence_decays_monotonically() {
        let mut c = HysteresisClassifier::new();
        c.process_sample(15.0, 0).unwrap();
        let mut prev = c.confidence();
        for i in 1..50 {
            c.process_sample(6.0, i * 7 * MS).unwrap();
            assert!(c.confidence() < prev, "sample {} did not decay", i);
            prev = c.confidence();
        }
        let expected = (-(49.0 * 7.0) * 1e-3_f64).exp();
        assert!((c.confidence() - expected).abs() < 1e-9);
    }

    #[test]
    fn equal_timestamps_do_not_decay() {
        let mut c = HysteresisClassifier::new();
        c.process_sample(15.0, 42).unwrap();
        c.process_sample(15.0, 42).unwrap();
        assert_eq!(c.confidence(), 1.0);
    }

    #[test]
    fn first_sample_skips_decay() {
        let mut c = HysteresisClassifier::new();
        c.process_sample(5.0, 9_000_000_000).unwrap();
        assert_eq!(c.confidence(), 1.0);
        assert_eq!(c.last_timestamp(), Some(9_000_000_000));
    }

    #[test]
    fn nan_is_rejected_without_side_effects() {
        let mut c = HysteresisClassifier::new();
        c.process_sample(15.0, 0).unwrap();
        c.process_sample(15.0, 10 * MS).unwrap();
        let (mode, conf, ts) = (c.mode(), c.confidence(), c.last_timestamp());

        let err = c.process_sample(f64::NAN, 20 * MS).unwrap_err();
        assert!(matches!(err, SampleError::NonFiniteVelocity(_)));
        assert_eq!(c.mode(), mode);
        assert_eq!(c.confidence(), conf);
        assert_eq!(c.last_timestamp(), ts);

        assert_eq!(c.process_sample(15.0, 30 * MS).unwrap(), RotationMode::CounterClockwise);
    }

    #[test]
    fn infinity_is_rejected() {
        let mut c = HysteresisClassifier::new();
        assert!(c.process_sample(f64::INFINITY, 0).is_err());
        assert!(c.process_sample(f64::NEG_INFINITY, 0).is_err());
        assert_eq!(c.mode(), RotationMode::Idle);
        assert_eq!(c.last_timestamp(), None);
    }

    #[test]
    fn regressing_timestamp_is_rejected() {
        let mut c = HysteresisClassifier::new();
        c.process_sample(15.0, 100 * MS).unwrap();
        let err = c.process_sample(-15.0, 50 * MS).unwrap_err();
        assert_eq!(err, SampleError::TimestampRegressed { previous: 100 * MS, current: 50 * MS });
        assert_eq!(c.mode(), RotationMode::CounterClockwise);
        assert_eq!(c.last_timestamp(), Some(100 * MS));
    }

    #[test]
    fn output_is_always_a_known_mode() {
        let mut c = HysteresisClassifier::new();
        let mut v = 0.0_f64;
        for i in 0..500i64 {
            // Deterministic wobble across every band.
            v = (v * 1.7 + 13.0) % 41.0 - 20.0;
            let mode = c.process_sample(v, i * 3 * MS).unwrap();
            assert!(RotationMode::ALL.contains(&mode));
        }
    }
}
