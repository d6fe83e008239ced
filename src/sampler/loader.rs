// Sample loader - Decodes WAV, FLAC and MP3 files into mono f32 buffers

use super::SampleError;
use claxon::FlacReader;
use hound::{SampleFormat, WavReader};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decoded audio, downmixed to mono
#[derive(Debug, Clone)]
pub struct Sample {
    pub name: String,
    pub data: Vec<f32>,
    pub sample_rate: u32,
    /// Channel count of the source file before downmixing
    pub source_channels: u16,
}

impl Sample {
    /// Length in frames
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.data.len() as f64 / self.sample_rate.max(1) as f64
    }
}

/// Load a sample file, choosing the decoder from the extension
pub fn load_sample(path: &Path) -> Result<Sample, SampleError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    let sample = match extension.as_str() {
        "wav" => load_wav(path)?,
        "flac" => load_flac(path)?,
        "mp3" => load_compressed(path, &extension)?,
        _ => return Err(SampleError::UnsupportedFormat(extension)),
    };

    if sample.is_empty() {
        return Err(SampleError::Empty(path.display().to_string()));
    }

    log::debug!(
        "Loaded {} ({} frames, {} Hz, {} ch)",
        sample.name,
        sample.len(),
        sample.sample_rate,
        sample.source_channels
    );
    Ok(sample)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Average interleaved channels into one
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn load_wav(path: &Path) -> Result<Sample, SampleError> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(Sample {
        name: file_name(path),
        data: downmix(&interleaved, spec.channels as usize),
        sample_rate: spec.sample_rate,
        source_channels: spec.channels,
    })
}

fn load_flac(path: &Path) -> Result<Sample, SampleError> {
    let mut reader = FlacReader::open(path)?;
    let info = reader.streaminfo();
    let scale = (1_i64 << (info.bits_per_sample - 1)) as f32;

    let interleaved: Vec<f32> = reader
        .samples()
        .map(|s| s.map(|v| v as f32 / scale))
        .collect::<Result<_, _>>()?;

    Ok(Sample {
        name: file_name(path),
        data: downmix(&interleaved, info.channels as usize),
        sample_rate: info.sample_rate,
        source_channels: info.channels as u16,
    })
}

fn load_compressed(path: &Path, extension: &str) -> Result<Sample, SampleError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(extension);

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| SampleError::NoAudioTrack(path.display().to_string()))?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs().make(&params, &DecoderOptions::default())?;
    let mut sample_rate = params.sample_rate.unwrap_or(44_100);
    let mut channels = params.channels.map(|c| c.count()).unwrap_or(1);
    let mut interleaved = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count();

                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                interleaved.extend_from_slice(buffer.samples());
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                log::warn!("{}: skipping corrupt packet ({})", file_name(path), msg);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Sample {
        name: file_name(path),
        data: downmix(&interleaved, channels),
        sample_rate,
        source_channels: channels as u16,
    })
}
