// Audio engine - CPAL output stream playing the drum kit
//
// The stream callback owns a `Mixer`; the sequencer only flips atomics on the
// shared voices, so nothing in the callback blocks on the control side.
//
// Device formats f32, i16 and u16 are supported; processing is always mono f32
// and converted per frame in `format_conversion`.

use super::AudioError;
use super::format_conversion::write_mono_buffer;
use super::mixer::Mixer;
use super::parameters::SharedGain;
use crate::sampler::DrumKit;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};

pub struct AudioEngine {
    _stream: Stream,
    device_name: String,
    sample_rate: u32,
    channels: u16,
}

impl AudioEngine {
    /// Open the default output device and start rendering `kit`
    pub fn start(kit: &DrumKit, master: SharedGain) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        let config: StreamConfig = supported_config.into();
        let sample_rate = config.sample_rate.0;
        let channels = config.channels;

        log::info!(
            "Audio device: {} ({} Hz, {} ch, {:?})",
            device_name,
            sample_rate,
            channels,
            sample_format
        );

        let mixer = Mixer::new(kit.voices().map(|(_, voice)| voice), sample_rate, master);

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, mixer)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, mixer)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, mixer)?,
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        };
        stream.play()?;

        Ok(Self {
            _stream: stream,
            device_name,
            sample_rate,
            channels,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut mixer: Mixer,
) -> Result<Stream, AudioError>
where
    T: SizedSample + Sample + FromSample<f32>,
{
    let channels = config.channels as usize;
    // Grown to the largest callback size seen, then reused
    let mut mono: Vec<f32> = Vec::with_capacity(4096);

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let frames = data.len() / channels.max(1);
            mono.resize(frames, 0.0);
            mixer.process(&mut mono);
            write_mono_buffer(&mono, data, channels);
        },
        |err| log::error!("Audio stream error: {}", err),
        None,
    )?;

    Ok(stream)
}
