//! Symphonia/hound implementation of the `AudioConverter` port.

use hound::{SampleFormat, WavSpec, WavWriter};
use palaver_application::ports::audio_converter::{AudioConverter, AudioError};
use palaver_domain::AudioEncoding;
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Sample rate of the WAV handed to transcribers.
pub const CANONICAL_SAMPLE_RATE: u32 = 16_000;

/// Decodes WAV or MP3 and produces 16 kHz mono 16-bit WAV.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaWavConverter;

impl SymphoniaWavConverter {
    pub fn new() -> Self {
        Self
    }
}

impl AudioConverter for SymphoniaWavConverter {
    fn to_wav(&self, audio: &[u8], encoding: AudioEncoding) -> Result<Vec<u8>, AudioError> {
        let (samples, sample_rate) = decode_mono(audio, encoding)?;
        if samples.is_empty() {
            return Err(AudioError::Empty);
        }
        let samples = resample(&samples, sample_rate, CANONICAL_SAMPLE_RATE);
        debug!(
            encoding = %encoding,
            source_rate = sample_rate,
            samples = samples.len(),
            "Normalized audio to canonical WAV"
        );
        encode_wav(&samples, CANONICAL_SAMPLE_RATE)
    }
}

/// Decode every packet of the first audio track, downmixed to mono.
fn decode_mono(audio: &[u8], encoding: AudioEncoding) -> Result<(Vec<f32>, u32), AudioError> {
    let source = MediaSourceStream::new(Box::new(Cursor::new(audio.to_vec())), Default::default());
    let mut hint = Hint::new();
    hint.with_extension(encoding.as_str());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Undecodable(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Undecodable("no audio track found".to_string()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Undecodable(e.to_string()))?;

    let mut sample_rate = codec_params.sample_rate.unwrap_or(CANONICAL_SAMPLE_RATE);
    let mut mono = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioError::Undecodable(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(msg)) => {
                warn!("Skipping corrupt audio packet: {}", msg);
                continue;
            }
            Err(e) => return Err(AudioError::Undecodable(e.to_string())),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        let channels = spec.channels.count().max(1);
        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);

        mono.extend(
            buffer
                .samples()
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32),
        );
    }

    Ok((mono, sample_rate))
}

/// Linear resampling; adequate for speech.
fn resample(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || input.is_empty() || from_rate == 0 {
        return input.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (input.len() as f64 / ratio).ceil() as usize;
    let last = input.len() - 1;

    (0..output_len)
        .map(|i| {
            let src = i as f64 * ratio;
            let idx0 = (src.floor() as usize).min(last);
            let idx1 = (idx0 + 1).min(last);
            let frac = (src - idx0 as f64) as f32;
            input[idx0] * (1.0 - frac) + input[idx1] * frac
        })
        .collect()
}

fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, AudioError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            WavWriter::new(&mut cursor, spec).map_err(|e| AudioError::Encode(e.to_string()))?;
        for sample in samples {
            let pcm = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(pcm)
                .map_err(|e| AudioError::Encode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| AudioError::Encode(e.to_string()))?;
    }
    Ok(cursor.into_inner())
}
