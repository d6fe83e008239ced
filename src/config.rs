// Configuration - JSON session settings
// Track and pattern names are plain strings here and validated when the session is built

use crate::sequencer::{PatternName, PatternTable, SequencerError, StepPattern, Tempo, Track};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] SequencerError),
}

/// Session settings; every field is optional in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial tempo
    pub bpm: f64,
    /// Directory that relative sample paths are resolved against
    pub sample_dir: PathBuf,
    /// Sample file per track name; tracks not listed use `<track>.mp3`
    pub samples: BTreeMap<String, PathBuf>,
    /// Output gain in [0.0, 1.0]
    pub master_volume: f32,
    /// Pattern table overrides: track name → pattern name → 16-step string
    pub patterns: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bpm: Tempo::DEFAULT_BPM,
            sample_dir: PathBuf::from("audio"),
            samples: BTreeMap::new(),
            master_volume: 0.8,
            patterns: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load and validate a configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json_str = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json_str)?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse and validate a configuration document
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field that names a track, a pattern or a tempo
    pub fn validate(&self) -> Result<(), SequencerError> {
        self.tempo()?;
        self.pattern_table()?;
        self.sample_paths()?;
        Ok(())
    }

    pub fn tempo(&self) -> Result<Tempo, SequencerError> {
        Tempo::new(self.bpm)
    }

    /// Default table with the configured overrides applied
    pub fn pattern_table(&self) -> Result<PatternTable, SequencerError> {
        let mut overrides = Vec::new();
        for (track_name, entries) in &self.patterns {
            let track: Track = track_name.parse()?;
            for (pattern_name, text) in entries {
                let name: PatternName = pattern_name.parse()?;
                overrides.push((track, name, StepPattern::parse(text)?));
            }
        }
        Ok(PatternTable::with_overrides(overrides))
    }

    /// Resolved sample file of every track
    pub fn sample_paths(&self) -> Result<Vec<(Track, PathBuf)>, SequencerError> {
        for track_name in self.samples.keys() {
            track_name.parse::<Track>()?;
        }

        Ok(Track::ALL
            .into_iter()
            .map(|track| {
                let file = self
                    .samples
                    .get(track.name())
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(format!("{}.mp3", track.name())));
                (track, self.sample_dir.join(file))
            })
            .collect())
    }
}
