//! Request dispatcher use case.
//!
//! [`RequestDispatcher`] takes one [`GenerationRequest`] for a session,
//! validates it, calls the matching backend and writes the outcome back into
//! the session. It always returns a well-formed [`GenerationResult`] and
//! always leaves the session idle.
//!
//! # Session state machine
//!
//! ```text
//! idle ──handle()──▶ busy ──(success | failure)──▶ idle
//!                      │
//!                      └── second handle() ──▶ SessionBusy
//! ```
//!
//! The session lock is only held for short bookkeeping sections, never
//! across a backend call. The busy flag is what serializes requests; it is
//! reset by a drop guard so no return path can leave it set.

use crate::config::PalaverConfig;
use crate::ports::artifact_store::ArtifactStore;
use crate::ports::audio_converter::{AudioConverter, PassthroughWavConverter};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::image_generator::ImageGenerator;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::speech_synthesizer::SpeechSynthesizer;
use crate::ports::speech_transcriber::SpeechTranscriber;
use crate::ports::text_generator::TextGenerator;
use crate::use_cases::conversation_memory::ConversationMemory;
use chrono::Utc;
use palaver_domain::{
    ArtifactHandle, ArtifactKey, ArtifactKind, AudioEncoding, BackendError, GenerationFailure,
    GenerationRequest, GenerationResult, RequestKind, Session, SessionId, Turn,
};
use serde_json::json;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A session shared between the caller and in-flight requests.
pub type SharedSession = Arc<Mutex<Session>>;

/// Lock a session, recovering the data if a previous holder panicked.
pub fn lock_session(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The backend adapters a dispatcher calls.
///
/// Adapters are stateless and shared across every session.
#[derive(Clone)]
pub struct Backends {
    pub text: Arc<dyn TextGenerator>,
    pub image: Arc<dyn ImageGenerator>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub transcriber: Arc<dyn SpeechTranscriber>,
    pub store: Arc<dyn ArtifactStore>,
    pub converter: Arc<dyn AudioConverter>,
}

impl Backends {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        image: Arc<dyn ImageGenerator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        transcriber: Arc<dyn SpeechTranscriber>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            text,
            image,
            synthesizer,
            transcriber,
            store,
            converter: Arc::new(PassthroughWavConverter),
        }
    }

    pub fn with_converter(mut self, converter: Arc<dyn AudioConverter>) -> Self {
        self.converter = converter;
        self
    }
}

/// Resets the session to idle when dropped.
struct BusyGuard<'a> {
    session: &'a Mutex<Session>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        lock_session(self.session).finish_request();
    }
}

/// Routes requests to backends and keeps session state consistent.
pub struct RequestDispatcher {
    backends: Backends,
    memory: ConversationMemory,
    config: PalaverConfig,
    logger: Arc<dyn ConversationLogger>,
}

impl RequestDispatcher {
    pub fn new(backends: Backends, config: PalaverConfig) -> Self {
        let memory = ConversationMemory::new(backends.text.clone(), *config.memory())
            .with_summary_config(config.text().clone())
            .with_timeout(config.dispatch().backend_timeout);
        Self {
            backends,
            memory,
            config,
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.memory = self.memory.with_logger(logger.clone());
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &PalaverConfig {
        &self.config
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Handle one request for `session`.
    pub async fn handle(&self, session: &SharedSession, request: GenerationRequest) -> GenerationResult {
        self.handle_with_progress(session, request, &NoProgress).await
    }

    /// Handle one request, reporting backend activity to `progress`.
    pub async fn handle_with_progress(
        &self,
        session: &SharedSession,
        request: GenerationRequest,
        progress: &dyn ProgressNotifier,
    ) -> GenerationResult {
        let kind = request.kind();
        let started = Instant::now();
        let description = request.describe();

        if let Err(failure) = request.validate(self.config.dispatch().max_input_chars) {
            debug!(kind = %kind, "Rejected invalid request: {}", failure);
            return GenerationResult::failed(kind, failure);
        }

        let session_id = {
            let mut guard = lock_session(session);
            if let Err(failure) = guard.begin_request() {
                warn!(session = %guard.id(), kind = %kind, "Request rejected, session busy");
                return GenerationResult::failed(kind, failure);
            }
            guard.id()
        };
        let _busy = BusyGuard { session };

        info!(session = %session_id, kind = %kind, "Request started");
        self.logger.log(ConversationEvent::new(
            "request_started",
            json!({ "session_id": session_id.to_string(), "kind": kind.as_str() }),
        ));

        let result = match request {
            GenerationRequest::Text { input } => {
                GenerationResult::Text(self.handle_text(session, input, progress).await)
            }
            GenerationRequest::Image { prompt } => GenerationResult::Image(
                self.handle_image(session, prompt, description, progress)
                    .await,
            ),
            GenerationRequest::SpeechSynthesis { text } => GenerationResult::SpeechSynthesis(
                self.handle_speech_synthesis(session, text, description, progress)
                    .await,
            ),
            GenerationRequest::SpeechTranscription { audio, encoding } => {
                GenerationResult::SpeechTranscription(
                    self.handle_transcription(session, audio, encoding, description, progress)
                        .await,
                )
            }
        };

        self.finish(session_id, &result, started, progress);
        result
    }

    // ==================== Text ====================

    async fn handle_text(
        &self,
        session: &SharedSession,
        input: String,
        progress: &dyn ProgressNotifier,
    ) -> Result<String, GenerationFailure> {
        let memory = lock_session(session).memory().clone();
        let context = self.memory.context_for_prompt(&memory);
        let user_turn = Turn::user(input.as_str());

        progress.on_backend_call(RequestKind::Text);
        debug!(context_tokens = memory.size_estimate(), "Calling text generator");
        let reply = self
            .call(self.backends.text.complete(
                &context,
                &input,
                self.config.text(),
                self.timeout(),
            ))
            .await
            .and_then(|reply| {
                let reply = reply.trim().to_string();
                if reply.is_empty() {
                    Err(BackendError::EmptyOutput)
                } else {
                    Ok(reply)
                }
            });

        let reply = match reply {
            Ok(reply) => reply,
            Err(err) => {
                lock_session(session).append_turn(user_turn);
                return Err(GenerationFailure::GenerationFailed(err));
            }
        };

        let assistant_turn = Turn::assistant(reply.as_str());
        let after_user = self.memory.update(memory, user_turn.clone()).await;
        let after_reply = self
            .memory
            .update(after_user.state, assistant_turn.clone())
            .await;

        let mut guard = lock_session(session);
        guard.append_turn(user_turn);
        guard.append_turn(assistant_turn);
        guard.replace_memory(after_reply.state);
        Ok(reply)
    }

    // ==================== Image ====================

    /// Generate images and store each one.
    ///
    /// Stores are append-only: if a later `put` fails, images already stored
    /// stay in the store unreferenced, and the result is `StorageFailed`.
    async fn handle_image(
        &self,
        session: &SharedSession,
        prompt: String,
        description: String,
        progress: &dyn ProgressNotifier,
    ) -> Result<Vec<ArtifactHandle>, GenerationFailure> {
        progress.on_backend_call(RequestKind::Image);
        debug!("Calling image generator");
        let images = self
            .call(
                self.backends
                    .image
                    .generate(&prompt, self.config.image(), self.timeout()),
            )
            .await
            .map_err(GenerationFailure::GenerationFailed)?;

        let images: Vec<Vec<u8>> = images.into_iter().filter(|img| !img.is_empty()).collect();
        if images.is_empty() {
            return Err(GenerationFailure::NoOutputProduced);
        }

        let mut handles = Vec::with_capacity(images.len());
        for payload in &images {
            handles.push(self.persist(ArtifactKind::Image, payload).await?);
        }

        let summary = match handles.len() {
            1 => "Generated 1 image".to_string(),
            n => format!("Generated {} images", n),
        };
        let mut guard = lock_session(session);
        guard.append_turn(Turn::user(description));
        guard.append_turn(Turn::assistant(summary).with_artifacts(handles.clone()));
        Ok(handles)
    }

    // ==================== Speech synthesis ====================

    async fn handle_speech_synthesis(
        &self,
        session: &SharedSession,
        text: String,
        description: String,
        progress: &dyn ProgressNotifier,
    ) -> Result<ArtifactHandle, GenerationFailure> {
        progress.on_backend_call(RequestKind::SpeechSynthesis);
        debug!(language = %self.config.speech().language, "Calling speech synthesizer");
        let audio = self
            .call(self.backends.synthesizer.synthesize(
                &text,
                &self.config.speech().language,
                self.timeout(),
            ))
            .await
            .and_then(|audio| {
                if audio.is_empty() {
                    Err(BackendError::EmptyOutput)
                } else {
                    Ok(audio)
                }
            })
            .map_err(GenerationFailure::GenerationFailed)?;

        let handle = self.persist(ArtifactKind::Audio, &audio).await?;

        let mut guard = lock_session(session);
        guard.append_turn(Turn::user(description));
        guard.append_turn(
            Turn::assistant("Synthesized speech").with_artifacts(vec![handle.clone()]),
        );
        Ok(handle)
    }

    // ==================== Speech transcription ====================

    async fn handle_transcription(
        &self,
        session: &SharedSession,
        audio: Vec<u8>,
        encoding: AudioEncoding,
        description: String,
        progress: &dyn ProgressNotifier,
    ) -> Result<String, GenerationFailure> {
        let wav = self.normalize_audio(audio, encoding).await?;

        progress.on_backend_call(RequestKind::SpeechTranscription);
        debug!(bytes = wav.len(), "Calling speech transcriber");
        let transcript = self
            .call(
                self.backends
                    .transcriber
                    .transcribe(&wav, AudioEncoding::Wav, self.timeout()),
            )
            .await
            .map_err(classify_transcription_error)?;

        let transcript = transcript.trim().to_string();
        if transcript.is_empty() {
            return Err(GenerationFailure::AudioUnintelligible(
                "no speech recognized".to_string(),
            ));
        }

        let mut guard = lock_session(session);
        guard.append_turn(Turn::user(description));
        guard.append_turn(Turn::assistant(transcript.as_str()));
        Ok(transcript)
    }

    /// Convert uploads to WAV on a blocking thread.
    async fn normalize_audio(
        &self,
        audio: Vec<u8>,
        encoding: AudioEncoding,
    ) -> Result<Vec<u8>, GenerationFailure> {
        let converter = self.backends.converter.clone();
        let converted = tokio::task::spawn_blocking(move || converter.to_wav(&audio, encoding))
            .await
            .map_err(|e| GenerationFailure::InvalidInput(format!("audio conversion aborted: {}", e)))?;
        converted.map_err(|e| GenerationFailure::InvalidInput(e.to_string()))
    }

    // ==================== Helpers ====================

    fn timeout(&self) -> Duration {
        self.config.dispatch().backend_timeout
    }

    /// Await a backend call under the dispatch deadline.
    async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<T, BackendError> {
        match tokio::time::timeout(self.timeout(), fut).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout),
        }
    }

    /// Store a payload under a fresh collision-safe key.
    async fn persist(
        &self,
        kind: ArtifactKind,
        payload: &[u8],
    ) -> Result<ArtifactHandle, GenerationFailure> {
        let key = ArtifactKey::generate(kind, Utc::now());
        let put = self.backends.store.put(&key, payload, key.content_type());
        match tokio::time::timeout(self.timeout(), put).await {
            Ok(Ok(handle)) => {
                debug!(key = %key, location = %handle.location, "Stored artifact");
                Ok(handle)
            }
            Ok(Err(e)) => Err(GenerationFailure::StorageFailed(e.to_string())),
            Err(_) => Err(GenerationFailure::StorageFailed(format!(
                "storing {} timed out",
                key
            ))),
        }
    }

    fn finish(
        &self,
        session_id: SessionId,
        result: &GenerationResult,
        started: Instant,
        progress: &dyn ProgressNotifier,
    ) {
        let kind = result.kind();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        progress.on_request_finished(kind, result.is_success());

        match result.failure() {
            None => info!(session = %session_id, kind = %kind, elapsed_ms, "Request finished"),
            Some(failure) => warn!(
                session = %session_id,
                kind = %kind,
                elapsed_ms,
                "Request failed: {}",
                failure
            ),
        }

        self.logger.log(ConversationEvent::new(
            "request_finished",
            json!({
                "session_id": session_id.to_string(),
                "kind": kind.as_str(),
                "success": result.is_success(),
                "failure": result.failure().map(|f| f.code()),
                "retryable": result.failure().map(|f| f.is_retryable()),
                "elapsed_ms": elapsed_ms,
            }),
        ));
    }
}

/// Content failures become `AudioUnintelligible`, everything else is a
/// service problem.
fn classify_transcription_error(err: BackendError) -> GenerationFailure {
    match err {
        BackendError::Unintelligible(reason) => GenerationFailure::AudioUnintelligible(reason),
        BackendError::EmptyOutput => {
            GenerationFailure::AudioUnintelligible("no speech recognized".to_string())
        }
        other => GenerationFailure::TranscriptionServiceError(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatchParams;
    use crate::ports::artifact_store::StoreError;
    use async_trait::async_trait;
    use palaver_domain::{
        ImageGenerationConfig, MemoryBudget, SessionStatus, TextGenerationConfig,
    };
    use tokio::sync::Notify;

    // ==================== Test Mocks ====================

    struct StubText {
        reply: Result<String, BackendError>,
        summary: Result<String, BackendError>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl StubText {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                summary: Ok("They talked.".to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(err: BackendError) -> Self {
            Self {
                reply: Err(err.clone()),
                summary: Err(err),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_summary(mut self, summary: Result<String, BackendError>) -> Self {
            self.summary = summary;
            self
        }
    }

    #[async_trait]
    impl TextGenerator for StubText {
        async fn complete(
            &self,
            context: &str,
            input: &str,
            _config: &TextGenerationConfig,
            _timeout: Duration,
        ) -> Result<String, BackendError> {
            self.calls
                .lock()
                .unwrap()
                .push((context.to_string(), input.to_string()));
            self.reply.clone()
        }

        async fn summarize(
            &self,
            _current_summary: &str,
            _new_lines: &str,
            _config: &TextGenerationConfig,
            _timeout: Duration,
        ) -> Result<String, BackendError> {
            self.summary.clone()
        }
    }

    /// Text generator that blocks until released.
    struct GatedText {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl TextGenerator for GatedText {
        async fn complete(
            &self,
            _context: &str,
            _input: &str,
            _config: &TextGenerationConfig,
            _timeout: Duration,
        ) -> Result<String, BackendError> {
            self.gate.notified().await;
            Ok("done".to_string())
        }

        async fn summarize(
            &self,
            _current_summary: &str,
            _new_lines: &str,
            _config: &TextGenerationConfig,
            _timeout: Duration,
        ) -> Result<String, BackendError> {
            Ok("summary".to_string())
        }
    }

    struct SlowText;

    #[async_trait]
    impl TextGenerator for SlowText {
        async fn complete(
            &self,
            _context: &str,
            _input: &str,
            _config: &TextGenerationConfig,
            _timeout: Duration,
        ) -> Result<String, BackendError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }

        async fn summarize(
            &self,
            _current_summary: &str,
            _new_lines: &str,
            _config: &TextGenerationConfig,
            _timeout: Duration,
        ) -> Result<String, BackendError> {
            Ok("summary".to_string())
        }
    }

    struct StubImage {
        images: Result<Vec<Vec<u8>>, BackendError>,
    }

    #[async_trait]
    impl ImageGenerator for StubImage {
        async fn generate(
            &self,
            _prompt: &str,
            _config: &ImageGenerationConfig,
            _timeout: Duration,
        ) -> Result<Vec<Vec<u8>>, BackendError> {
            self.images.clone()
        }
    }

    struct StubSynth {
        audio: Result<Vec<u8>, BackendError>,
        languages: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SpeechSynthesizer for StubSynth {
        async fn synthesize(
            &self,
            _text: &str,
            language: &str,
            _timeout: Duration,
        ) -> Result<Vec<u8>, BackendError> {
            self.languages.lock().unwrap().push(language.to_string());
            self.audio.clone()
        }
    }

    struct StubTranscriber {
        transcript: Result<String, BackendError>,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl SpeechTranscriber for StubTranscriber {
        async fn transcribe(
            &self,
            _audio: &[u8],
            _encoding: AudioEncoding,
            _timeout: Duration,
        ) -> Result<String, BackendError> {
            *self.calls.lock().unwrap() += 1;
            self.transcript.clone()
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        puts: Mutex<Vec<(String, String, usize)>>,
        fail: bool,
        /// Fail every put once this many have succeeded.
        fail_after: Option<usize>,
    }

    #[async_trait]
    impl ArtifactStore for RecordingStore {
        async fn put(
            &self,
            key: &ArtifactKey,
            payload: &[u8],
            content_type: &str,
        ) -> Result<ArtifactHandle, StoreError> {
            let mut puts = self.puts.lock().unwrap();
            if self.fail || self.fail_after.is_some_and(|n| puts.len() >= n) {
                return Err(StoreError::Unavailable("bucket missing".into()));
            }
            puts.push((
                key.as_str().to_string(),
                content_type.to_string(),
                payload.len(),
            ));
            Ok(ArtifactHandle {
                kind: key.kind(),
                key: key.as_str().to_string(),
                location: format!("mem://{}", key),
                content_type: content_type.to_string(),
                size_bytes: payload.len(),
            })
        }
    }

    // ==================== Helpers ====================

    struct Fixture {
        text: Arc<dyn TextGenerator>,
        image: Arc<StubImage>,
        synth: Arc<StubSynth>,
        transcriber: Arc<StubTranscriber>,
        store: Arc<RecordingStore>,
        config: PalaverConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                text: Arc::new(StubText::replying("Hi there")),
                image: Arc::new(StubImage {
                    images: Ok(vec![vec![1, 2, 3]]),
                }),
                synth: Arc::new(StubSynth {
                    audio: Ok(vec![9; 16]),
                    languages: Mutex::new(Vec::new()),
                }),
                transcriber: Arc::new(StubTranscriber {
                    transcript: Ok("hello world".to_string()),
                    calls: Mutex::new(0),
                }),
                store: Arc::new(RecordingStore::default()),
                config: PalaverConfig::default(),
            }
        }

        fn dispatcher(&self) -> RequestDispatcher {
            let backends = Backends::new(
                self.text.clone(),
                self.image.clone(),
                self.synth.clone(),
                self.transcriber.clone(),
                self.store.clone(),
            );
            RequestDispatcher::new(backends, self.config.clone())
        }
    }

    fn new_session() -> SharedSession {
        Arc::new(Mutex::new(Session::new()))
    }

    fn wav() -> GenerationRequest {
        GenerationRequest::transcription(vec![0; 64], AudioEncoding::Wav)
    }

    // ==================== Text ====================

    #[tokio::test]
    async fn test_text_success_appends_both_turns() {
        let fixture = Fixture::new();
        let dispatcher = fixture.dispatcher();
        let session = new_session();

        let result = dispatcher
            .handle(&session, GenerationRequest::text("Hello"))
            .await;

        assert_eq!(result, GenerationResult::Text(Ok("Hi there".to_string())));
        let guard = lock_session(&session);
        let turns: Vec<_> = guard
            .turns()
            .iter()
            .map(|t| (t.role().as_str(), t.content()))
            .collect();
        assert_eq!(turns, vec![("user", "Hello"), ("assistant", "Hi there")]);
        let memory: Vec<_> = guard.memory().recent_turns().map(|t| t.content()).collect();
        assert_eq!(memory, vec!["Hello", "Hi there"]);
        assert_eq!(guard.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_text_uses_memory_as_context() {
        let text = Arc::new(StubText::replying("Hi there"));
        let mut fixture = Fixture::new();
        fixture.text = text.clone();
        let dispatcher = fixture.dispatcher();
        let session = new_session();

        dispatcher.handle(&session, GenerationRequest::text("Hello")).await;
        dispatcher
            .handle(&session, GenerationRequest::text("How are you?"))
            .await;

        let calls = text.calls.lock().unwrap();
        assert_eq!(calls[0], (String::new(), "Hello".to_string()));
        assert_eq!(
            calls[1],
            (
                "Human: Hello\nAI: Hi there".to_string(),
                "How are you?".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_text_failure_keeps_user_turn_only() {
        let mut fixture = Fixture::new();
        fixture.text = Arc::new(StubText::failing(BackendError::ServiceUnavailable(
            "throttled".into(),
        )));
        let dispatcher = fixture.dispatcher();
        let session = new_session();

        let result = dispatcher
            .handle(&session, GenerationRequest::text("Hello"))
            .await;

        assert_eq!(
            result.failure(),
            Some(&GenerationFailure::GenerationFailed(
                BackendError::ServiceUnavailable("throttled".into())
            ))
        );
        assert!(result.failure().unwrap().is_retryable());
        let guard = lock_session(&session);
        assert_eq!(guard.turns().len(), 1);
        assert_eq!(guard.turns()[0].content(), "Hello");
        assert!(guard.memory().is_empty());
        assert!(!guard.is_busy());
    }

    #[tokio::test]
    async fn test_blank_reply_is_empty_output() {
        let mut fixture = Fixture::new();
        fixture.text = Arc::new(StubText::replying("  \n"));
        let dispatcher = fixture.dispatcher();
        let session = new_session();

        let result = dispatcher.handle(&session, GenerationRequest::text("Hi")).await;

        assert_eq!(
            result.failure(),
            Some(&GenerationFailure::GenerationFailed(BackendError::EmptyOutput))
        );
    }

    #[tokio::test]
    async fn test_ten_requests_keep_memory_bounded() {
        let mut fixture = Fixture::new();
        // "Human: question 0" and "AI: Hi there, friend" are 5 tokens each.
        fixture.text = Arc::new(StubText::replying("Hi there, friend"));
        fixture.config = PalaverConfig::default().with_memory(MemoryBudget::new(19, 4, 2));
        let dispatcher = fixture.dispatcher();
        let session = new_session();

        for i in 0..10 {
            let result = dispatcher
                .handle(&session, GenerationRequest::text(format!("question {}", i)))
                .await;
            assert!(result.is_success());
            assert!(lock_session(&session).memory().size_estimate() <= 19);
        }

        let guard = lock_session(&session);
        assert_eq!(guard.turns().len(), 20);
        assert!(guard.memory().turn_count() <= 3);
        assert_eq!(guard.memory().running_summary(), "They talked.");
    }

    #[tokio::test]
    async fn test_summarization_failure_is_not_fatal() {
        let mut fixture = Fixture::new();
        fixture.text = Arc::new(
            StubText::replying("Hi there, friend")
                .with_summary(Err(BackendError::ServiceUnavailable("down".into()))),
        );
        fixture.config = PalaverConfig::default().with_memory(MemoryBudget::new(19, 4, 2));
        let dispatcher = fixture.dispatcher();
        let session = new_session();

        for i in 0..5 {
            let result = dispatcher
                .handle(&session, GenerationRequest::text(format!("question {}", i)))
                .await;
            assert!(result.is_success());
        }

        let guard = lock_session(&session);
        assert!(guard.memory().size_estimate() <= 19);
        assert_eq!(guard.memory().newest().unwrap().content(), "Hi there, friend");
    }

    #[tokio::test]
    async fn test_backend_timeout() {
        let mut fixture = Fixture::new();
        fixture.text = Arc::new(SlowText);
        fixture.config = PalaverConfig::default().with_dispatch(
            DispatchParams::default().with_backend_timeout(Duration::from_millis(20)),
        );
        let dispatcher = fixture.dispatcher();
        let session = new_session();

        let result = dispatcher.handle(&session, GenerationRequest::text("Hi")).await;

        assert_eq!(
            result.failure(),
            Some(&GenerationFailure::GenerationFailed(BackendError::Timeout))
        );
        assert!(!lock_session(&session).is_busy());
    }

    // ==================== Validation and concurrency ====================

    #[tokio::test]
    async fn test_invalid_input_rejected_before_backend() {
        let text = Arc::new(StubText::replying("unused"));
        let mut fixture = Fixture::new();
        fixture.text = text.clone();
        let dispatcher = fixture.dispatcher();
        let session = new_session();

        let result = dispatcher.handle(&session, GenerationRequest::text("   ")).await;

        assert!(matches!(
            result.failure(),
            Some(GenerationFailure::InvalidInput(_))
        ));
        assert!(text.calls.lock().unwrap().is_empty());
        assert!(lock_session(&session).turns().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_request_gets_session_busy() {
        let gate = Arc::new(Notify::new());
        let mut fixture = Fixture::new();
        fixture.text = Arc::new(GatedText { gate: gate.clone() });
        let dispatcher = Arc::new(fixture.dispatcher());
        let session = new_session();

        let first = {
            let dispatcher = dispatcher.clone();
            let session = session.clone();
            tokio::spawn(async move {
                dispatcher
                    .handle(&session, GenerationRequest::text("first"))
                    .await
            })
        };

        while !lock_session(&session).is_busy() {
            tokio::task::yield_now().await;
        }

        let second = dispatcher
            .handle(&session, GenerationRequest::text("second"))
            .await;
        assert_eq!(second.failure(), Some(&GenerationFailure::SessionBusy));
        assert!(lock_session(&session).turns().is_empty());

        gate.notify_one();
        let first = first.await.unwrap();
        assert_eq!(first, GenerationResult::Text(Ok("done".to_string())));

        let guard = lock_session(&session);
        let contents: Vec<_> = guard.turns().iter().map(|t| t.content()).collect();
        assert_eq!(contents, vec!["first", "done"]);
        assert!(!guard.is_busy());
    }

    #[tokio::test]
    async fn test_session_idle_after_every_outcome() {
        let ok = Fixture::new();
        let mut failing = Fixture::new();
        failing.text = Arc::new(StubText::failing(BackendError::Timeout));
        failing.image = Arc::new(StubImage {
            images: Err(BackendError::ServiceUnavailable("down".into())),
        });
        failing.synth = Arc::new(StubSynth {
            audio: Err(BackendError::InvalidInput("bad language".into())),
            languages: Mutex::new(Vec::new()),
        });
        failing.transcriber = Arc::new(StubTranscriber {
            transcript: Err(BackendError::Unintelligible("noise".into())),
            calls: Mutex::new(0),
        });

        for fixture in [ok, failing] {
            let dispatcher = fixture.dispatcher();
            for request in [
                GenerationRequest::text("Hello"),
                GenerationRequest::image("a red cube"),
                GenerationRequest::speech("Hello"),
                wav(),
                GenerationRequest::text(""),
            ] {
                let session = new_session();
                let kind = request.kind();
                let result = dispatcher.handle(&session, request).await;
                assert_eq!(result.kind(), kind);
                assert_eq!(lock_session(&session).status(), SessionStatus::Idle);
            }
        }
    }

    // ==================== Image ====================

    #[tokio::test]
    async fn test_zero_images_is_no_output_without_put() {
        let mut fixture = Fixture::new();
        fixture.image = Arc::new(StubImage { images: Ok(vec![]) });
        let dispatcher = fixture.dispatcher();
        let session = new_session();

        let result = dispatcher
            .handle(&session, GenerationRequest::image("a red cube"))
            .await;

        assert_eq!(
            result,
            GenerationResult::Image(Err(GenerationFailure::NoOutputProduced))
        );
        assert!(fixture.store.puts.lock().unwrap().is_empty());
        assert!(lock_session(&session).turns().is_empty());
    }

    #[tokio::test]
    async fn test_empty_payloads_are_skipped() {
        let mut fixture = Fixture::new();
        fixture.image = Arc::new(StubImage {
            images: Ok(vec![vec![], vec![]]),
        });
        let dispatcher = fixture.dispatcher();

        let result = dispatcher
            .handle(&new_session(), GenerationRequest::image("a red cube"))
            .await;

        assert_eq!(result.failure(), Some(&GenerationFailure::NoOutputProduced));
        assert!(fixture.store.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_images_stored_under_unique_keys() {
        let mut fixture = Fixture::new();
        fixture.image = Arc::new(StubImage {
            images: Ok(vec![vec![1; 10], vec![], vec![2; 20]]),
        });
        let dispatcher = fixture.dispatcher();
        let session = new_session();

        let result = dispatcher
            .handle(&session, GenerationRequest::image("a red cube"))
            .await;

        let handles = result.artifacts();
        assert_eq!(handles.len(), 2);
        assert_ne!(handles[0].key, handles[1].key);
        assert!(handles.iter().all(|h| h.content_type == "image/png"));

        let puts = fixture.store.puts.lock().unwrap();
        assert_eq!(puts.len(), 2);
        assert_eq!(puts[0].2, 10);
        assert_eq!(puts[1].2, 20);

        let guard = lock_session(&session);
        assert_eq!(guard.turns().len(), 2);
        assert_eq!(guard.turns()[0].content(), "[image] a red cube");
        assert_eq!(guard.turns()[1].artifacts().len(), 2);
        assert!(guard.memory().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_storage_failed() {
        let mut fixture = Fixture::new();
        fixture.store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });
        let dispatcher = fixture.dispatcher();

        let result = dispatcher
            .handle(&new_session(), GenerationRequest::image("a red cube"))
            .await;

        assert!(matches!(
            result.failure(),
            Some(GenerationFailure::StorageFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_partial_store_failure_keeps_earlier_images() {
        let mut fixture = Fixture::new();
        fixture.image = Arc::new(StubImage {
            images: Ok(vec![vec![1], vec![2], vec![3]]),
        });
        fixture.store = Arc::new(RecordingStore {
            fail_after: Some(1),
            ..Default::default()
        });
        let dispatcher = fixture.dispatcher();
        let session = new_session();

        let result = dispatcher
            .handle(&session, GenerationRequest::image("three cubes"))
            .await;

        assert!(matches!(
            result.failure(),
            Some(GenerationFailure::StorageFailed(_))
        ));
        assert_eq!(fixture.store.puts.lock().unwrap().len(), 1);
        let guard = lock_session(&session);
        assert!(guard.turns().is_empty());
        assert!(!guard.is_busy());
    }

    // ==================== Speech ====================

    #[tokio::test]
    async fn test_speech_synthesis_returns_audio_handle() {
        let fixture = Fixture::new();
        let dispatcher = fixture.dispatcher();
        let session = new_session();

        let result = dispatcher
            .handle(&session, GenerationRequest::speech("Good morning"))
            .await;

        let handle = match result {
            GenerationResult::SpeechSynthesis(Ok(handle)) => handle,
            other => panic!("unexpected result: {:?}", other),
        };
        assert_eq!(handle.content_type, "audio/mpeg");
        assert!(handle.key.starts_with("speech_"));
        assert_eq!(handle.size_bytes, 16);
        assert_eq!(*fixture.synth.languages.lock().unwrap(), vec!["en".to_string()]);
        assert_eq!(lock_session(&session).turns().len(), 2);
    }

    #[tokio::test]
    async fn test_speech_synthesis_failure() {
        let mut fixture = Fixture::new();
        fixture.synth = Arc::new(StubSynth {
            audio: Err(BackendError::ServiceUnavailable("tts down".into())),
            languages: Mutex::new(Vec::new()),
        });
        let dispatcher = fixture.dispatcher();

        let result = dispatcher
            .handle(&new_session(), GenerationRequest::speech("Hello"))
            .await;

        assert_eq!(
            result.failure(),
            Some(&GenerationFailure::GenerationFailed(
                BackendError::ServiceUnavailable("tts down".into())
            ))
        );
        assert!(fixture.store.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transcription_success() {
        let fixture = Fixture::new();
        let dispatcher = fixture.dispatcher();
        let session = new_session();

        let result = dispatcher.handle(&session, wav()).await;

        assert_eq!(result.text(), Some("hello world"));
        let guard = lock_session(&session);
        assert_eq!(guard.turns().len(), 2);
        assert_eq!(guard.turns()[1].content(), "hello world");
    }

    #[tokio::test]
    async fn test_unintelligible_audio_leaves_log_unchanged() {
        let mut fixture = Fixture::new();
        fixture.transcriber = Arc::new(StubTranscriber {
            transcript: Err(BackendError::Unintelligible("could not understand".into())),
            calls: Mutex::new(0),
        });
        let dispatcher = fixture.dispatcher();
        let session = new_session();

        let result = dispatcher.handle(&session, wav()).await;

        assert_eq!(
            result,
            GenerationResult::SpeechTranscription(Err(GenerationFailure::AudioUnintelligible(
                "could not understand".to_string()
            )))
        );
        assert!(!result.failure().unwrap().is_retryable());
        assert!(lock_session(&session).turns().is_empty());
    }

    #[tokio::test]
    async fn test_transcription_service_error() {
        let mut fixture = Fixture::new();
        fixture.transcriber = Arc::new(StubTranscriber {
            transcript: Err(BackendError::ServiceUnavailable("HTTP 503".into())),
            calls: Mutex::new(0),
        });
        let dispatcher = fixture.dispatcher();

        let result = dispatcher.handle(&new_session(), wav()).await;

        assert!(matches!(
            result.failure(),
            Some(GenerationFailure::TranscriptionServiceError(_))
        ));
        assert!(result.failure().unwrap().is_retryable());
    }

    #[tokio::test]
    async fn test_blank_transcript_is_unintelligible() {
        let mut fixture = Fixture::new();
        fixture.transcriber = Arc::new(StubTranscriber {
            transcript: Ok(" ".to_string()),
            calls: Mutex::new(0),
        });
        let dispatcher = fixture.dispatcher();

        let result = dispatcher.handle(&new_session(), wav()).await;

        assert!(matches!(
            result.failure(),
            Some(GenerationFailure::AudioUnintelligible(_))
        ));
    }

    #[tokio::test]
    async fn test_unconvertible_audio_is_invalid_input() {
        let fixture = Fixture::new();
        let dispatcher = fixture.dispatcher();

        let result = dispatcher
            .handle(
                &new_session(),
                GenerationRequest::transcription(vec![1, 2, 3], AudioEncoding::Mp3),
            )
            .await;

        assert!(matches!(
            result.failure(),
            Some(GenerationFailure::InvalidInput(_))
        ));
        assert_eq!(*fixture.transcriber.calls.lock().unwrap(), 0);
    }

    // ==================== Transcript events ====================

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<(&'static str, serde_json::Value)>>,
    }

    impl RecordingLogger {
        fn event_types(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().iter().map(|(t, _)| *t).collect()
        }
    }

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events
                .lock()
                .unwrap()
                .push((event.event_type, event.payload));
        }
    }

    #[tokio::test]
    async fn test_request_events_are_logged() {
        let logger = Arc::new(RecordingLogger::default());
        let fixture = Fixture::new();
        let dispatcher = fixture.dispatcher().with_logger(logger.clone());

        let result = dispatcher
            .handle(&new_session(), GenerationRequest::text("Hello"))
            .await;

        assert!(result.is_success());
        assert_eq!(
            logger.event_types(),
            vec!["request_started", "request_finished"]
        );
        let events = logger.events.lock().unwrap();
        assert_eq!(events[0].1["kind"], "text");
        assert_eq!(events[1].1["success"], true);
    }

    #[tokio::test]
    async fn test_failed_request_event_carries_failure_code() {
        let logger = Arc::new(RecordingLogger::default());
        let mut fixture = Fixture::new();
        fixture.image = Arc::new(StubImage { images: Ok(vec![]) });
        let dispatcher = fixture.dispatcher().with_logger(logger.clone());

        dispatcher
            .handle(&new_session(), GenerationRequest::image("a red cube"))
            .await;

        let events = logger.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].0, "request_finished");
        assert_eq!(events[1].1["success"], false);
        assert_eq!(
            events[1].1["failure"],
            GenerationFailure::NoOutputProduced.code()
        );
    }

    #[tokio::test]
    async fn test_compaction_events_reach_dispatcher_logger() {
        let logger = Arc::new(RecordingLogger::default());
        let mut fixture = Fixture::new();
        fixture.text = Arc::new(StubText::replying("Hi there, friend"));
        fixture.config = PalaverConfig::default().with_memory(MemoryBudget::new(19, 4, 2));
        let dispatcher = fixture.dispatcher().with_logger(logger.clone());
        let session = new_session();

        for i in 0..3 {
            dispatcher
                .handle(&session, GenerationRequest::text(format!("question {}", i)))
                .await;
        }

        assert!(logger.event_types().contains(&"memory_compacted"));
    }
}
