// Sequencer events - Core → UI notifications

use crate::sequencer::{StepPattern, Track};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    /// The transport just played this step
    Step(usize),
    /// A track's effective pattern was recomputed
    PatternChanged(Track, StepPattern),
    /// Every sub-pattern was disabled; toggle indicators must reset
    Cleared,
}
