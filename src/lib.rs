// stepbeat - Library exports for the binary and integration tests

pub mod audio;
pub mod config;
pub mod headless;
pub mod messaging;
pub mod sampler;
pub mod sequencer;
pub mod ui;

// Re-export commonly used types for convenience
pub use audio::{AudioEngine, AudioError, SharedGain};
pub use config::{Config, ConfigError};
pub use messaging::{ChannelObserver, SequencerEvent, create_event_channel};
pub use sampler::{DrumKit, SampleError, SampleVoice};
pub use sequencer::{
    PatternName, PatternTable, Sequencer, SequencerError, SequencerObserver, StepPattern, Tempo,
    Track,
};
