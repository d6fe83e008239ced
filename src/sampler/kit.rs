// Drum kit - One optional sample voice per track
// A sample that cannot be loaded leaves its track muted

use super::loader::load_sample;
use super::voice::SampleVoice;
use crate::sequencer::{Sequencer, Track};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Default)]
pub struct DrumKit {
    voices: [Option<Arc<SampleVoice>>; 4],
}

impl DrumKit {
    /// Kit with every track muted
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the sample of each listed track
    ///
    /// Failures are logged and the track stays muted.
    pub fn load<I>(paths: I, gain: f32) -> Self
    where
        I: IntoIterator<Item = (Track, PathBuf)>,
    {
        let mut kit = Self::empty();

        for (track, path) in paths {
            match load_sample(&path) {
                Ok(sample) => {
                    log::info!(
                        "{}: {} ({:.0} ms)",
                        track,
                        path.display(),
                        sample.duration_seconds() * 1000.0
                    );
                    kit.set_voice(track, Arc::new(SampleVoice::new(Arc::new(sample), gain)));
                }
                Err(e) => {
                    log::warn!("{}: cannot load {}: {} (track muted)", track, path.display(), e);
                }
            }
        }

        kit
    }

    pub fn set_voice(&mut self, track: Track, voice: Arc<SampleVoice>) {
        self.voices[track.index()] = Some(voice);
    }

    pub fn voice(&self, track: Track) -> Option<&Arc<SampleVoice>> {
        self.voices[track.index()].as_ref()
    }

    /// Loaded voices with their tracks
    pub fn voices(&self) -> impl Iterator<Item = (Track, &Arc<SampleVoice>)> + '_ {
        Track::ALL
            .into_iter()
            .filter_map(move |track| self.voice(track).map(|voice| (track, voice)))
    }

    /// Tracks without a sample
    pub fn muted_tracks(&self) -> Vec<Track> {
        Track::ALL
            .into_iter()
            .filter(|track| self.voice(*track).is_none())
            .collect()
    }

    /// Bind every loaded voice to its sequencer track
    pub fn bind_to(&self, sequencer: &Sequencer) {
        for (track, voice) in self.voices() {
            sequencer.bind_sample(track, voice.clone());
        }
    }
}
