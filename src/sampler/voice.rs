// Sample voice - A retriggerable sample shared between the sequencer and the audio callback
// Control side posts requests through atomics; the callback owns the playhead

use super::loader::Sample;
use crate::sequencer::SamplePlayer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub struct SampleVoice {
    sample: Arc<Sample>,
    gain: f32,
    /// Frame the next play request starts from
    cue: AtomicUsize,
    /// Set by `play`, consumed by the audio callback
    pending: AtomicBool,
}

impl SampleVoice {
    pub fn new(sample: Arc<Sample>, gain: f32) -> Self {
        Self {
            sample,
            gain,
            cue: AtomicUsize::new(0),
            pending: AtomicBool::new(false),
        }
    }

    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Take a pending play request, returning its start frame
    fn take_request(&self) -> Option<usize> {
        if self.pending.swap(false, Ordering::AcqRel) {
            Some(self.cue.load(Ordering::Acquire))
        } else {
            None
        }
    }
}

impl SamplePlayer for SampleVoice {
    fn set_position(&self, frame: usize) {
        self.cue.store(frame, Ordering::Release);
    }

    fn play(&self) {
        self.pending.store(true, Ordering::Release);
    }
}

/// Playhead of one voice, owned by the audio callback
pub struct VoiceCursor {
    voice: Arc<SampleVoice>,
    position: f64,
    /// Source frames advanced per output frame
    rate_ratio: f64,
    active: bool,
}

impl VoiceCursor {
    pub fn new(voice: Arc<SampleVoice>, output_sample_rate: u32) -> Self {
        let rate_ratio = voice.sample().sample_rate as f64 / output_sample_rate.max(1) as f64;
        Self {
            voice,
            position: 0.0,
            rate_ratio,
            active: false,
        }
    }

    /// Add this voice into `output`
    ///
    /// A play request restarts the playhead, cutting off what was sounding.
    pub fn render_add(&mut self, output: &mut [f32]) {
        if let Some(frame) = self.voice.take_request() {
            self.position = frame as f64;
            self.active = true;
        }

        if self.active {
            let data = &self.voice.sample().data;
            let gain = self.voice.gain();

            for out in output.iter_mut() {
                let index = self.position as usize;
                if index >= data.len() {
                    self.active = false;
                    break;
                }

                // Linear interpolation between neighbouring frames
                let frac = self.position.fract() as f32;
                let a = data[index];
                let b = data.get(index + 1).copied().unwrap_or(0.0);
                *out += (a + (b - a) * frac) * gain;

                self.position += self.rate_ratio;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice_with(data: Vec<f32>, sample_rate: u32) -> Arc<SampleVoice> {
        let sample = Sample {
            name: "test".to_string(),
            data,
            sample_rate,
            source_channels: 1,
        };
        Arc::new(SampleVoice::new(Arc::new(sample), 1.0))
    }

    #[test]
    fn test_silent_until_played() {
        let voice = voice_with(vec![1.0; 8], 48_000);
        let mut cursor = VoiceCursor::new(voice.clone(), 48_000);
        let mut out = [0.0; 4];
        cursor.render_add(&mut out);
        assert_eq!(out, [0.0; 4]);
    }

    #[test]
    fn test_play_renders_and_finishes() {
        let voice = voice_with(vec![0.5; 4], 48_000);
        let mut cursor = VoiceCursor::new(voice.clone(), 48_000);
        voice.set_position(0);
        voice.play();

        let mut out = [0.0; 3];
        cursor.render_add(&mut out);
        assert_eq!(out, [0.5; 3]);

        let mut out = [0.0; 3];
        cursor.render_add(&mut out);
        assert_eq!(out[0], 0.5);
        assert_eq!(out[1], 0.0);

        // Finished voices stay silent until the next request
        let mut out = [0.0; 2];
        cursor.render_add(&mut out);
        assert_eq!(out, [0.0; 2]);
    }

    #[test]
    fn test_retrigger_restarts_from_cue() {
        let voice = voice_with((0..8).map(|i| i as f32).collect(), 48_000);
        let mut cursor = VoiceCursor::new(voice.clone(), 48_000);
        voice.play();

        let mut out = [0.0; 3];
        cursor.render_add(&mut out);
        assert_eq!(out, [0.0, 1.0, 2.0]);

        voice.set_position(0);
        voice.play();
        let mut out = [0.0; 2];
        cursor.render_add(&mut out);
        assert_eq!(out, [0.0, 1.0]);
    }

    #[test]
    fn test_output_rate_conversion() {
        let voice = voice_with(vec![0.0, 1.0, 0.0, 1.0], 24_000);
        let mut cursor = VoiceCursor::new(voice.clone(), 48_000);
        voice.play();

        let mut out = [0.0; 3];
        cursor.render_add(&mut out);
        // Half-speed playhead interpolates between frames
        assert_eq!(out, [0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_render_adds_to_existing_signal() {
        let voice = voice_with(vec![0.25; 4], 48_000);
        let mut cursor = VoiceCursor::new(voice.clone(), 48_000);
        voice.play();

        let mut out = [0.5; 2];
        cursor.render_add(&mut out);
        assert_eq!(out, [0.75; 2]);
    }
}
