//! Audio normalization for recognition.
//!
//! Any supported container (wav, mp3, flac, ogg/vorbis, ...) is decoded to
//! 16 kHz mono `f32`. These are blocking calls; run them through
//! `spawn_blocking`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use hound::{SampleFormat, WavReader};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use super::base::{RecognitionError, RecognitionResult};

/// Sample rate the recognition model expects
pub const SAMPLE_RATE: u32 = 16_000;

/// Frame size for energy gating (100ms at 16kHz)
pub const ENERGY_FRAME: usize = 1_600;

/// Decode an audio file to 16 kHz mono samples.
///
/// An empty file decodes to no samples rather than an error.
pub fn decode_file(path: &Path) -> RecognitionResult<Vec<f32>> {
    let mut magic = [0u8; 4];
    let read = File::open(path)?.read(&mut magic)?;
    if read == 0 {
        return Ok(Vec::new());
    }

    if read == 4 && &magic == b"RIFF" {
        match load_wav(path) {
            Ok(samples) => return Ok(samples),
            Err(e) => debug!("hound could not read {:?} ({}), trying symphonia", path, e),
        }
    }

    load_with_symphonia(path)
}

fn load_wav(path: &Path) -> RecognitionResult<Vec<f32>> {
    let mut reader = WavReader::open(path)
        .map_err(|e| RecognitionError::InvalidAudio(format!("Failed to open WAV: {e}")))?;
    let spec = reader.spec();
    debug!(
        "Decoding WAV: {} Hz, {} channels, {} bits",
        spec.sample_rate, spec.channels, spec.bits_per_sample
    );

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| RecognitionError::InvalidAudio(format!("Failed to read samples: {e}")))?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|sample| sample as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| {
                    RecognitionError::InvalidAudio(format!("Failed to read samples: {e}"))
                })?
        }
    };

    let mono = downmix(samples, spec.channels as usize);
    Ok(resample(&mono, spec.sample_rate, SAMPLE_RATE))
}

fn load_with_symphonia(path: &Path) -> RecognitionResult<Vec<f32>> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| RecognitionError::InvalidAudio(format!("Unrecognized audio format: {e}")))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| RecognitionError::InvalidAudio("No audio tracks found".to_string()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let mut sample_rate = codec_params.sample_rate;
    let mut channels = codec_params.channels.map(|c| c.count()).unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| RecognitionError::InvalidAudio(format!("Unsupported codec: {e}")))?;

    let mut samples = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(RecognitionError::InvalidAudio(format!(
                    "Failed to read packet: {e}"
                )));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => {
                return Err(RecognitionError::InvalidAudio(format!("Failed to decode: {e}")));
            }
        };

        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        if channels == 0 {
            channels = spec.channels.count();
        }

        let needs_new_buf = sample_buf
            .as_ref()
            .is_none_or(|buf| buf.capacity() < decoded.capacity() * spec.channels.count());
        if needs_new_buf {
            sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
        }

        if let Some(buf) = sample_buf.as_mut() {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    let sample_rate = sample_rate.ok_or_else(|| {
        RecognitionError::InvalidAudio("Could not determine sample rate".to_string())
    })?;
    debug!(
        "Decoded {} samples via symphonia: {} Hz, {} channels",
        samples.len(),
        sample_rate,
        channels
    );

    let mono = downmix(samples, channels.max(1));
    Ok(resample(&mono, sample_rate, SAMPLE_RATE))
}

/// Average interleaved channels into one
fn downmix(samples: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples;
    }
    samples
        .chunks(channels)
        .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
        .collect()
}

/// Linear-interpolation resampling
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let new_len = ((samples.len() as f64) / ratio).floor().max(1.0) as usize;
    let last = samples.len() - 1;

    (0..new_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = (pos as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = (pos - idx as f64) as f32;
            samples[idx] + (samples[next] - samples[idx]) * frac
        })
        .collect()
}

/// RMS energy of a block of samples
pub fn compute_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|&s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// True when no frame of `samples` reaches `threshold` RMS energy
pub fn is_silent(samples: &[f32], threshold: f32) -> bool {
    samples
        .chunks(ENERGY_FRAME)
        .all(|frame| compute_energy(frame) < threshold)
}
