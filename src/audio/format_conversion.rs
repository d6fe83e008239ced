// Format conversion for CPAL output streams
//
// The mixer renders mono f32; devices may want f32, i16 or u16 frames with any
// number of channels. Conversion goes through CPAL's `FromSample<f32>`.

use cpal::{FromSample, Sample};

/// Write one mono sample to every channel of an interleaved frame
#[inline]
pub fn write_mono_to_interleaved_frame<T>(internal_sample: f32, output_frame: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    for channel_sample in output_frame.iter_mut() {
        *channel_sample = Sample::from_sample::<f32>(internal_sample);
    }
}

/// Spread a mono buffer over an interleaved device buffer
///
/// Frames past the end of `mono` are filled with silence.
pub fn write_mono_buffer<T>(mono: &[f32], output: &mut [T], channels: usize)
where
    T: Sample + FromSample<f32>,
{
    let channels = channels.max(1);
    for (i, frame) in output.chunks_mut(channels).enumerate() {
        let value = mono.get(i).copied().unwrap_or(0.0);
        write_mono_to_interleaved_frame(value, frame);
    }
}
