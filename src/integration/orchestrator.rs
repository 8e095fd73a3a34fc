//! Orchestrator for the assistant turn pipeline
//!
//! Connects the components: input -> intent or LLM -> action -> dialog store -> speech.
//! One pipeline runs at a time; a second input while busy is rejected, not queued.

use crate::actions::{ActionEffects, ActionRouter, LogEffects};
use crate::integration::config::AssistantConfig;
use crate::intent::{IntentExtractor, WakeWordDetector};
use crate::llm::{parse_action_response, LlmClient, LlmRequest, ProviderState, SYSTEM_PROMPT};
use crate::messages::{DialogStore, TurnMetadata};
use crate::speech::{ConsoleSpeech, SpeechEvent, SpeechOutput, VoiceState};
use crate::utils::Broadcast;
use crate::{JarvisError, Result};
use crossbeam_channel::Receiver;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// System turn recorded when the assistant comes online
pub const GREETING: &str = "JARVIS online. How may I assist you today?";

/// Spoken when the user says only the wake phrase
pub const WAKE_PROMPT: &str = "Yes? How may I assist you?";

/// Assistant turn recorded when the pipeline faults
pub const APOLOGY: &str = "I apologize, but I encountered an error processing your request.";

/// What became of one input
#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    /// The pipeline ran and produced this assistant reply
    Responded { text: String },

    /// Only a wake phrase was heard; the assistant prompted for more
    WakePrompt,

    /// Nothing to do (blank input or no wake phrase)
    Ignored,
}

impl InputOutcome {
    /// Reply text, when the pipeline ran
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Responded { text } => Some(text),
            _ => None,
        }
    }
}

/// Main orchestrator that coordinates all components
pub struct Orchestrator {
    store: Arc<DialogStore>,
    router: Arc<ActionRouter>,
    llm: Arc<LlmClient>,
    speech: Arc<dyn SpeechOutput>,
    extractor: IntentExtractor,
    wake: WakeWordDetector,
    context_turns: usize,

    /// Set while a pipeline is in flight
    processing: AtomicBool,

    voice_state: Broadcast<VoiceState>,
    audio_level: Broadcast<f32>,
}

/// Clears the processing flag when the pipeline finishes, however it finishes
struct ProcessingGuard<'a> {
    orchestrator: &'a Orchestrator,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator.processing.store(false, Ordering::SeqCst);
        self.orchestrator
            .voice_state
            .update(|state| state.processing = false);
    }
}

impl Orchestrator {
    pub fn new(
        store: Arc<DialogStore>,
        router: Arc<ActionRouter>,
        llm: Arc<LlmClient>,
        speech: Arc<dyn SpeechOutput>,
        config: &AssistantConfig,
    ) -> Self {
        Self {
            store,
            router,
            llm,
            speech,
            extractor: IntentExtractor::new(),
            wake: WakeWordDetector::new(config.wake_words.iter().cloned()),
            context_turns: config.context_turns,
            processing: AtomicBool::new(false),
            voice_state: Broadcast::default(),
            audio_level: Broadcast::new(0.0),
        }
    }

    /// Probe the LLM endpoint and record the greeting
    pub async fn start(&self) -> ProviderState {
        let state = self.llm.probe().await;
        info!(
            "Assistant online (provider: {}, connected: {})",
            state.active_provider, state.connected
        );
        self.store.add_system(GREETING);
        state
    }

    /// Handle typed input
    pub async fn process_text(&self, input: &str) -> Result<InputOutcome> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(InputOutcome::Ignored);
        }

        let _guard = self.begin()?;
        Ok(self.run_guarded(input).await)
    }

    /// Handle a final voice transcript, gated by the wake phrases
    pub async fn process_voice(&self, transcript: &str) -> Result<InputOutcome> {
        if !self.wake.is_wake_word(transcript) {
            debug!("No wake word in transcript, ignoring");
            return Ok(InputOutcome::Ignored);
        }

        let residual = self.wake.strip_wake_words(transcript);
        let _guard = self.begin()?;

        if residual.is_empty() {
            self.speak(WAKE_PROMPT).await;
            return Ok(InputOutcome::WakePrompt);
        }

        Ok(self.run_guarded(&residual).await)
    }

    /// Apply an event from the speech capture side
    pub async fn handle_speech_event(&self, event: SpeechEvent) -> Option<InputOutcome> {
        match event {
            SpeechEvent::Interim(transcript) => {
                self.voice_state
                    .update(|state| state.current_transcript = transcript);
                None
            }
            SpeechEvent::Final {
                transcript,
                confidence,
            } => {
                let confidence = if confidence.is_finite() {
                    confidence.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                self.voice_state.update(|state| {
                    state.current_transcript = transcript.clone();
                    state.confidence = confidence;
                });
                match self.process_voice(&transcript).await {
                    Ok(outcome) => Some(outcome),
                    Err(JarvisError::Busy) => {
                        debug!("Dropping transcript while busy: {}", transcript);
                        None
                    }
                    Err(e) => {
                        warn!("Voice input failed: {}", e);
                        None
                    }
                }
            }
            SpeechEvent::Error(message) => {
                warn!("Speech recognition error: {}", message);
                self.store.add_system(format!("Voice error: {}", message));
                None
            }
            SpeechEvent::AudioLevel(level) => {
                let level = if level.is_finite() { level.clamp(0.0, 1.0) } else { 0.0 };
                self.audio_level.publish(level);
                None
            }
            SpeechEvent::Listening(listening) => {
                self.voice_state.update(|state| state.listening = listening);
                None
            }
        }
    }

    pub fn clear_history(&self) {
        info!("Clearing conversation history");
        self.store.clear();
    }

    /// Cancel any speech in progress
    pub fn stop_speaking(&self) {
        self.speech.cancel();
        self.voice_state.update(|state| state.speaking = false);
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    pub fn voice_state(&self) -> VoiceState {
        self.voice_state.get()
    }

    pub fn subscribe_voice_state(&self) -> Receiver<VoiceState> {
        self.voice_state.subscribe()
    }

    pub fn subscribe_audio_level(&self) -> Receiver<f32> {
        self.audio_level.subscribe()
    }

    pub fn store(&self) -> &Arc<DialogStore> {
        &self.store
    }

    pub fn router(&self) -> &Arc<ActionRouter> {
        &self.router
    }

    pub fn llm(&self) -> &Arc<LlmClient> {
        &self.llm
    }

    fn begin(&self) -> Result<ProcessingGuard<'_>> {
        self.processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| JarvisError::Busy)?;
        self.voice_state.update(|state| state.processing = true);
        Ok(ProcessingGuard { orchestrator: self })
    }

    /// Run the pipeline, turning errors and panics into the apology turn
    async fn run_guarded(&self, input: &str) -> InputOutcome {
        let text = match AssertUnwindSafe(self.run_pipeline(input))
            .catch_unwind()
            .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                error!("Pipeline failed: {}", e);
                self.apologize().await
            }
            Err(_) => {
                error!("Pipeline panicked while handling: {}", input);
                self.apologize().await
            }
        };

        InputOutcome::Responded { text }
    }

    async fn run_pipeline(&self, input: &str) -> Result<String> {
        self.store.add_user(input);

        let (reply, metadata) = match self.extractor.extract(input) {
            Some(intent) => {
                debug!("Matched intent {}", intent.name);
                let result = self.router.execute(&intent.name, &intent.parameters).await;
                let reply = if result.success {
                    result.message.clone()
                } else {
                    format!("I'm sorry, {}", result.message)
                };
                (
                    reply,
                    TurnMetadata::Action {
                        action: intent.name,
                        result,
                    },
                )
            }
            None => {
                let request = LlmRequest::new(input)
                    .with_history(self.store.recent(self.context_turns))
                    .with_system_prompt(self.store.system_prompt());
                let response = self.llm.query(&request).await?;
                let parsed = parse_action_response(&response.text);

                match parsed.suggested_action {
                    Some(action) => {
                        debug!("Model suggested action {}", action);
                        let parameters = parsed.suggested_parameters.unwrap_or_default();
                        let result = self.router.execute(&action, &parameters).await;
                        let mut reply = parsed.text;
                        if !result.success {
                            reply.push_str(&format!(" However, {}", result.message));
                        }
                        (
                            reply,
                            TurnMetadata::ModelAction {
                                response,
                                action,
                                result,
                            },
                        )
                    }
                    None => (parsed.text, TurnMetadata::Model { response }),
                }
            }
        };

        self.store.add_assistant(reply.as_str(), Some(metadata));
        self.speak(&reply).await;
        Ok(reply)
    }

    async fn apologize(&self) -> String {
        self.store.add_assistant(APOLOGY, None);
        self.speak(APOLOGY).await;
        APOLOGY.to_string()
    }

    /// Speak a reply; failures are recorded, never propagated
    async fn speak(&self, text: &str) {
        self.voice_state.update(|state| state.speaking = true);
        if let Err(e) = self.speech.speak(text).await {
            warn!("Speech output failed: {}", e);
            let detail = match e {
                JarvisError::Speech(message) => message,
                other => other.to_string(),
            };
            self.store.add_system(format!("Speech error: {}", detail));
        }
        self.voice_state.update(|state| state.speaking = false);
    }
}

/// Builder for creating an orchestrator with defaults for anything not supplied
pub struct OrchestratorBuilder {
    config: AssistantConfig,
    speech: Option<Arc<dyn SpeechOutput>>,
    effects: Option<Arc<dyn ActionEffects>>,
    router: Option<Arc<ActionRouter>>,
    llm: Option<Arc<LlmClient>>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            config: AssistantConfig::default(),
            speech: None,
            effects: None,
            router: None,
            llm: None,
        }
    }

    pub fn with_config(mut self, config: AssistantConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_speech(mut self, speech: Arc<dyn SpeechOutput>) -> Self {
        self.speech = Some(speech);
        self
    }

    /// Side effects used by the built-in actions
    pub fn with_effects(mut self, effects: Arc<dyn ActionEffects>) -> Self {
        self.effects = Some(effects);
        self
    }

    pub fn with_router(mut self, router: Arc<ActionRouter>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn with_llm_client(mut self, llm: Arc<LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn build(self) -> Result<Orchestrator> {
        self.config.validate()?;

        let prompt = self
            .config
            .system_prompt
            .clone()
            .unwrap_or_else(|| SYSTEM_PROMPT.to_string());
        let store = Arc::new(DialogStore::with_capacity(prompt, self.config.history_cap));

        let router = match self.router {
            Some(router) => router,
            None => {
                let effects = self.effects.unwrap_or_else(|| Arc::new(LogEffects));
                Arc::new(ActionRouter::with_builtins(effects))
            }
        };

        let llm = match self.llm {
            Some(llm) => llm,
            None => Arc::new(LlmClient::new(self.config.llm.clone())?),
        };

        let speech = self.speech.unwrap_or_else(|| {
            Arc::new(ConsoleSpeech::new(self.config.llm.assistant_name.clone()))
        });

        Ok(Orchestrator::new(store, router, llm, speech, &self.config))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionDescriptor, ActionResult, Parameters};
    use crate::messages::Role;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        spoken: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SpeechOutput for Recorder {
        async fn speak(&self, text: &str) -> Result<()> {
            self.spoken.lock().push(text.to_string());
            Ok(())
        }

        fn cancel(&self) {}
    }

    struct Mute;

    #[async_trait]
    impl SpeechOutput for Mute {
        async fn speak(&self, _text: &str) -> Result<()> {
            Err(JarvisError::Speech("no audio device".to_string()))
        }

        fn cancel(&self) {}
    }

    fn orchestrator(speech: Arc<dyn SpeechOutput>) -> Orchestrator {
        OrchestratorBuilder::new()
            .with_speech(speech)
            .with_llm_client(Arc::new(LlmClient::offline()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_start_records_greeting() {
        let orch = orchestrator(Arc::new(Recorder::default()));
        orch.start().await;

        let turns = orch.store().all();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::System);
        assert_eq!(turns[0].content, GREETING);
    }

    #[tokio::test]
    async fn test_intent_path_records_action_metadata() {
        let speech = Arc::new(Recorder::default());
        let orch = orchestrator(speech.clone());

        let outcome = orch.process_text("calculate 2 + 3").await.unwrap();
        assert_eq!(outcome.text(), Some("2 + 3 = 5"));

        let turns = orch.store().all();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].metadata.as_ref().and_then(|m| m.action()), Some("calculate"));
        assert_eq!(speech.spoken.lock().as_slice(), ["2 + 3 = 5"]);
    }

    #[tokio::test]
    async fn test_failed_action_is_apologized_for() {
        let orch = orchestrator(Arc::new(Recorder::default()));
        let outcome = orch.process_text("calculate 2 + abc").await.unwrap();
        assert_eq!(outcome.text(), Some("I'm sorry, Invalid expression"));
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let orch = orchestrator(Arc::new(Recorder::default()));
        assert_eq!(orch.process_text("   ").await.unwrap(), InputOutcome::Ignored);
        assert!(orch.store().is_empty());
    }

    #[tokio::test]
    async fn test_voice_requires_wake_word() {
        let speech = Arc::new(Recorder::default());
        let orch = orchestrator(speech.clone());

        assert_eq!(
            orch.process_voice("open github").await.unwrap(),
            InputOutcome::Ignored
        );
        assert_eq!(
            orch.process_voice("Hey Jarvis").await.unwrap(),
            InputOutcome::WakePrompt
        );
        assert!(orch.store().is_empty());
        assert_eq!(speech.spoken.lock().as_slice(), [WAKE_PROMPT]);
    }

    #[tokio::test]
    async fn test_speech_failure_becomes_system_turn() {
        let orch = orchestrator(Arc::new(Mute));
        let outcome = orch.process_text("hello").await.unwrap();
        assert!(outcome.text().is_some());

        let last = orch.store().all().pop().unwrap();
        assert_eq!(last.role, Role::System);
        assert_eq!(last.content, "Speech error: no audio device");
    }

    #[tokio::test]
    async fn test_panicking_handler_yields_apology() {
        let router = Arc::new(ActionRouter::new());
        router.register(ActionDescriptor::new(
            "calculate",
            "Always panics",
            &["expression"],
            |_: &Parameters| -> ActionResult { panic!("handler exploded") },
        ));
        let orch = OrchestratorBuilder::new()
            .with_speech(Arc::new(Recorder::default()))
            .with_llm_client(Arc::new(LlmClient::offline()))
            .with_router(router)
            .build()
            .unwrap();

        let outcome = orch.process_text("calculate 1 + 1").await.unwrap();
        assert_eq!(outcome.text(), Some(APOLOGY));
        assert!(!orch.is_processing());
        assert!(!orch.voice_state().processing);
    }

    #[tokio::test]
    async fn test_speech_events_update_state() {
        let orch = orchestrator(Arc::new(Recorder::default()));
        let levels = orch.subscribe_audio_level();

        orch.handle_speech_event(SpeechEvent::Listening(true)).await;
        orch.handle_speech_event(SpeechEvent::Interim("hey jar".to_string()))
            .await;
        orch.handle_speech_event(SpeechEvent::AudioLevel(1.7)).await;

        let state = orch.voice_state();
        assert!(state.listening);
        assert_eq!(state.current_transcript, "hey jar");
        assert_eq!(levels.try_iter().last(), Some(1.0));

        orch.handle_speech_event(SpeechEvent::Error("network".to_string()))
            .await;
        assert_eq!(orch.store().all()[0].content, "Voice error: network");
    }

    #[tokio::test]
    async fn test_final_transcript_records_confidence() {
        let speech = Arc::new(Recorder::default());
        let orch = orchestrator(speech.clone());

        let outcome = orch
            .handle_speech_event(SpeechEvent::Final {
                transcript: "Jarvis".to_string(),
                confidence: 0.92,
            })
            .await;
        assert_eq!(outcome, Some(InputOutcome::WakePrompt));

        let state = orch.voice_state();
        assert_eq!(state.current_transcript, "Jarvis");
        assert_eq!(state.confidence, 0.92);

        orch.handle_speech_event(SpeechEvent::Final {
            transcript: "something unrelated".to_string(),
            confidence: 3.0,
        })
        .await;
        assert_eq!(orch.voice_state().confidence, 1.0);
    }
}
