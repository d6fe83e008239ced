// Sequencer module
// Pattern table, pattern composition, transport timing and sample triggering

pub mod composer;
pub mod pattern;
pub mod session;
pub mod tempo;
pub mod transport;
pub mod trigger;

pub use composer::{PatternComposer, SharedPatterns};
pub use pattern::{PatternName, PatternTable, STEPS, StepPattern, Track};
pub use session::{NullObserver, Sequencer, SequencerObserver};
pub use tempo::Tempo;
pub use transport::{StepHandler, Transport};
pub use trigger::{PlaybackTrigger, SamplePlayer};

use thiserror::Error;

/// Validation failures surfaced by the sequencer core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SequencerError {
    #[error("Unknown track or pattern identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid tempo: {0} BPM (must be a positive number)")]
    InvalidTempo(f64),

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
