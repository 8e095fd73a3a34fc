//! Speech I/O boundary
//!
//! Capture and synthesis live outside this crate. The orchestrator consumes
//! [`SpeechEvent`]s from the capture side and drives a [`SpeechOutput`] for
//! spoken replies.

pub mod console;

pub use console::ConsoleSpeech;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Text-to-speech side of the speech provider
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Speak `text`, resolving when playback completes
    async fn speak(&self, text: &str) -> Result<()>;

    /// Stop any speech in progress; safe to call when idle
    fn cancel(&self);
}

/// Events emitted by the speech capture side
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    /// Partial transcript while the user is still talking
    Interim(String),

    /// Final transcript for one utterance, with the recognizer's confidence in 0..1
    Final { transcript: String, confidence: f32 },

    /// Recognition error reported by the provider
    Error(String),

    /// Input level for visualization, nominally 0..1
    AudioLevel(f32),

    /// Capture started or stopped
    Listening(bool),
}

/// Observable state of the voice pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceState {
    pub listening: bool,
    pub processing: bool,
    pub speaking: bool,
    pub current_transcript: String,
    /// Confidence of the last final transcript
    pub confidence: f32,
}
