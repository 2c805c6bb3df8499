//! Speech synthesis over a translate-tts style HTTP endpoint.
//!
//! The endpoint accepts at most [`MAX_CHUNK_CHARS`] characters per request,
//! so longer text is split at whitespace and the returned MP3 segments are
//! concatenated. MP3 frames are self-delimiting, so the joined bytes play
//! as one stream.

use super::{convert_request_error, convert_status};
use async_trait::async_trait;
use palaver_application::ports::speech_synthesizer::SpeechSynthesizer;
use palaver_domain::BackendError;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_SYNTHESIS_URL: &str = "https://translate.google.com/translate_tts";

const MAX_CHUNK_CHARS: usize = 100;

pub struct HttpSpeechSynthesizer {
    client: reqwest::Client,
    url: String,
}

impl HttpSpeechSynthesizer {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        index: usize,
        total: usize,
        timeout: Duration,
    ) -> Result<Vec<u8>, BackendError> {
        let total_param = total.to_string();
        let index_param = index.to_string();
        let len_param = chunk.chars().count().to_string();
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", language),
                ("client", "tw-ob"),
                ("total", total_param.as_str()),
                ("idx", index_param.as_str()),
                ("textlen", len_param.as_str()),
            ])
            .timeout(timeout)
            .send()
            .await
            .map_err(convert_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(convert_status(status));
        }
        let body = response.bytes().await.map_err(convert_request_error)?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSpeechSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, BackendError> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(BackendError::InvalidInput("no text to speak".to_string()));
        }

        let deadline = Instant::now() + timeout;
        let mut audio = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(BackendError::Timeout);
            }
            debug!(index, total = chunks.len(), chars = chunk.len(), "Requesting speech chunk");
            let bytes = self
                .fetch_chunk(chunk, language, index, chunks.len(), remaining)
                .await?;
            audio.extend_from_slice(&bytes);
        }
        Ok(audio)
    }
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Splits fall on whitespace; a single word longer than `max_chars` is cut
/// at the character limit. Returns no chunks for blank text.
pub(crate) fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
