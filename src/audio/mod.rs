// Audio module - CPAL output stream, mixing and shared parameters

pub mod engine;
pub mod format_conversion;
pub mod mixer;
pub mod parameters;

pub use engine::AudioEngine;
pub use mixer::Mixer;
pub use parameters::SharedGain;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Device configuration error: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("Unsupported device sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}
