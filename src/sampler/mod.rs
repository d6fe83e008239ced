// Sampler module - Sample decoding, retriggerable voices and the drum kit

pub mod kit;
pub mod loader;
pub mod voice;

pub use kit::DrumKit;
pub use loader::{Sample, load_sample};
pub use voice::{SampleVoice, VoiceCursor};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV decode error: {0}")]
    Wav(#[from] hound::Error),

    #[error("FLAC decode error: {0}")]
    Flac(#[from] claxon::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("No audio track in {0}")]
    NoAudioTrack(String),

    #[error("Sample contains no audio: {0}")]
    Empty(String),
}
