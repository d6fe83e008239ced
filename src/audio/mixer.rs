// Mixer - Sums every kit voice into a mono buffer for the output stream

use super::parameters::SharedGain;
use crate::sampler::{SampleVoice, VoiceCursor};
use std::sync::Arc;

pub struct Mixer {
    cursors: Vec<VoiceCursor>,
    master: SharedGain,
}

impl Mixer {
    pub fn new<'a, I>(voices: I, output_sample_rate: u32, master: SharedGain) -> Self
    where
        I: IntoIterator<Item = &'a Arc<SampleVoice>>,
    {
        let cursors = voices
            .into_iter()
            .map(|voice| VoiceCursor::new(Arc::clone(voice), output_sample_rate))
            .collect();
        Self { cursors, master }
    }

    /// Render one mono buffer, overwriting `output`
    pub fn process(&mut self, output: &mut [f32]) {
        output.fill(0.0);
        for cursor in &mut self.cursors {
            cursor.render_add(output);
        }

        let master = self.master.get();
        for sample in output.iter_mut() {
            *sample = (*sample * master).clamp(-1.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::Sample;
    use crate::sequencer::SamplePlayer;

    fn voice(value: f32) -> Arc<SampleVoice> {
        let sample = Sample {
            name: "v".to_string(),
            data: vec![value; 16],
            sample_rate: 44_100,
            source_channels: 1,
        };
        Arc::new(SampleVoice::new(Arc::new(sample), 1.0))
    }

    #[test]
    fn test_silence_without_triggers() {
        let voices = [voice(0.5)];
        let mut mixer = Mixer::new(voices.iter(), 44_100, SharedGain::new(1.0));
        let mut out = [1.0; 8];
        mixer.process(&mut out);
        assert_eq!(out, [0.0; 8]);
    }

    #[test]
    fn test_voices_are_summed_and_scaled() {
        let voices = [voice(0.25), voice(0.5)];
        let master = SharedGain::new(0.5);
        let mut mixer = Mixer::new(voices.iter(), 44_100, master.clone());
        for v in &voices {
            v.play();
        }

        let mut out = [0.0; 4];
        mixer.process(&mut out);
        assert_eq!(out, [0.375; 4]);
    }

    #[test]
    fn test_output_is_clipped() {
        let voices = [voice(0.9), voice(0.9)];
        let mut mixer = Mixer::new(voices.iter(), 44_100, SharedGain::new(1.0));
        for v in &voices {
            v.play();
        }

        let mut out = [0.0; 2];
        mixer.process(&mut out);
        assert_eq!(out, [1.0; 2]);
    }
}
