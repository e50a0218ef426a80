//! Sample rejection reasons.

use thiserror::Error;

/// Why a sample was refused by the classifier.
///
/// A rejected sample leaves the classifier exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SampleError {
    #[error("angular velocity is not finite ({0})")]
    NonFiniteVelocity(f64),

    #[error("timestamp went backwards: {current} ns after {previous} ns")]
    TimestampRegressed { previous: i64, current: i64 },
}
