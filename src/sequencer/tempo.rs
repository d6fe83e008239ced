// Tempo - BPM value and step interval derivation
// The loop runs in sixteenth notes of a 4/4 bar

use super::SequencerError;
use std::fmt;
use std::time::{Duration, Instant};

/// Steps per beat (sixteenth-note subdivision of a quarter note)
pub const STEPS_PER_BEAT: f64 = 4.0;

/// Tempo in BPM (Beats Per Minute)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo {
    bpm: f64,
    step_interval: Duration,
}

impl Tempo {
    /// Default tempo of a new session
    pub const DEFAULT_BPM: f64 = 100.0;

    /// Creates a new tempo
    ///
    /// BPM must be finite and strictly positive, and its step interval must be
    /// non-zero and small enough to schedule from now.
    pub fn new(bpm: f64) -> Result<Self, SequencerError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(SequencerError::InvalidTempo(bpm));
        }

        let step_interval = Duration::try_from_secs_f64(60.0 / bpm / STEPS_PER_BEAT)
            .ok()
            .filter(|interval| !interval.is_zero())
            .filter(|interval| Instant::now().checked_add(*interval).is_some())
            .ok_or(SequencerError::InvalidTempo(bpm))?;

        Ok(Self { bpm, step_interval })
    }

    /// Get BPM value
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Interval between two steps in milliseconds: 60000 / bpm / 4
    pub fn step_interval_ms(&self) -> f64 {
        60_000.0 / self.bpm / STEPS_PER_BEAT
    }

    /// Interval between two steps
    pub fn step_interval(&self) -> Duration {
        self.step_interval
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self {
            bpm: Self::DEFAULT_BPM,
            step_interval: Duration::from_secs_f64(60.0 / Self::DEFAULT_BPM / STEPS_PER_BEAT),
        }
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} BPM", self.bpm)
    }
}
