//! Speech output that writes replies to stdout

use super::SpeechOutput;
use crate::Result;
use async_trait::async_trait;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

pub struct ConsoleSpeech {
    /// Label printed before each reply
    speaker: String,
    speaking: AtomicBool,
}

impl ConsoleSpeech {
    pub fn new(speaker: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            speaking: AtomicBool::new(false),
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }
}

impl Default for ConsoleSpeech {
    fn default() -> Self {
        Self::new("JARVIS")
    }
}

#[async_trait]
impl SpeechOutput for ConsoleSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        self.speaking.store(true, Ordering::SeqCst);
        let written = {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}: {}", self.speaker, text).and_then(|_| stdout.flush())
        };
        self.speaking.store(false, Ordering::SeqCst);
        written.map_err(|e| crate::JarvisError::Speech(e.to_string()))
    }

    fn cancel(&self) {
        if self.speaking.swap(false, Ordering::SeqCst) {
            debug!("Speech cancelled");
        }
    }
}
