//! Speech recognition over a speech-api v2 style HTTP endpoint.
//!
//! Audio must already be WAV (the dispatcher normalizes uploads first). The
//! samples are posted as raw 16-bit little-endian PCM and the response is a
//! sequence of JSON objects, one per line.

use super::{convert_request_error, convert_status};
use async_trait::async_trait;
use palaver_application::ports::speech_transcriber::SpeechTranscriber;
use palaver_domain::{AudioEncoding, BackendError};
use serde::Deserialize;
use std::io::Cursor;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TRANSCRIPTION_URL: &str = "http://www.google.com/speech-api/v2/recognize";

pub struct HttpSpeechTranscriber {
    client: reqwest::Client,
    url: String,
    language: String,
    key: Option<String>,
}

impl HttpSpeechTranscriber {
    pub fn new(url: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            language: language.into(),
            key: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl SpeechTranscriber for HttpSpeechTranscriber {
    async fn transcribe(
        &self,
        audio: &[u8],
        encoding: AudioEncoding,
        timeout: Duration,
    ) -> Result<String, BackendError> {
        if encoding != AudioEncoding::Wav {
            return Err(BackendError::InvalidInput(format!(
                "expected wav audio, got {}",
                encoding.as_str()
            )));
        }
        let (pcm, sample_rate) = wav_to_pcm(audio)?;

        let mut query = vec![
            ("client", "chromium".to_string()),
            ("lang", self.language.clone()),
        ];
        if let Some(ref key) = self.key {
            query.push(("key", key.clone()));
        }

        debug!(bytes = pcm.len(), sample_rate, "Posting audio for recognition");
        let response = self
            .client
            .post(&self.url)
            .query(&query)
            .header("Content-Type", format!("audio/l16; rate={}", sample_rate))
            .body(pcm)
            .timeout(timeout)
            .send()
            .await
            .map_err(convert_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(convert_status(status));
        }
        let body = response.text().await.map_err(convert_request_error)?;

        parse_transcript(&body)
            .ok_or_else(|| BackendError::Unintelligible("could not understand audio".to_string()))
    }
}

/// Read a WAV file into raw 16-bit little-endian mono PCM.
fn wav_to_pcm(audio: &[u8]) -> Result<(Vec<u8>, u32), BackendError> {
    let mut reader = hound::WavReader::new(Cursor::new(audio))
        .map_err(|e| BackendError::InvalidInput(format!("unreadable wav audio: {}", e)))?;
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(BackendError::InvalidInput(format!(
            "expected 16-bit PCM wav, got {} bits",
            spec.bits_per_sample
        )));
    }

    let channels = usize::from(spec.channels.max(1));
    let samples = reader
        .samples::<i16>()
        .collect::<Result<Vec<i16>, _>>()
        .map_err(|e| BackendError::InvalidInput(format!("corrupt wav samples: {}", e)))?;

    let mut pcm = Vec::with_capacity(samples.len() / channels * 2);
    for frame in samples.chunks(channels) {
        let mixed = frame.iter().map(|s| i32::from(*s)).sum::<i32>() / frame.len() as i32;
        pcm.extend_from_slice(&(mixed as i16).to_le_bytes());
    }
    Ok((pcm, spec.sample_rate))
}

#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    #[serde(default)]
    result: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternative: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

/// First non-empty transcript in a line-delimited recognition response.
fn parse_transcript(body: &str) -> Option<String> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<RecognitionResponse>(line).ok())
        .flat_map(|response| response.result)
        .flat_map(|result| result.alternative)
        .map(|alt| alt.transcript.trim().to_string())
        .find(|t| !t.is_empty())
}
