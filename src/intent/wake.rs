//! Wake phrase detection for voice input

/// Phrases that address the assistant
pub const DEFAULT_WAKE_WORDS: &[&str] = &["hey jarvis", "jarvis", "hey j.a.r.v.i.s"];

#[derive(Debug, Clone)]
pub struct WakeWordDetector {
    /// Lowercased phrases, longest first so stripping removes whole phrases
    phrases: Vec<String>,
}

impl WakeWordDetector {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut phrases: Vec<String> = phrases
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        phrases.sort();
        phrases.dedup();
        phrases.sort_by(|a, b| b.len().cmp(&a.len()));

        Self { phrases }
    }

    /// True if the utterance contains any wake phrase
    pub fn is_wake_word(&self, utterance: &str) -> bool {
        let lower = utterance.to_lowercase();
        self.phrases.iter().any(|phrase| lower.contains(phrase.as_str()))
    }

    /// Remove every wake phrase, then trim whitespace and leading punctuation
    pub fn strip_wake_words(&self, utterance: &str) -> String {
        let mut residual = utterance.to_string();
        for phrase in &self.phrases {
            residual = remove_ignore_case(&residual, phrase);
        }
        residual
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .trim_start_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
            .to_string()
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl Default for WakeWordDetector {
    fn default() -> Self {
        Self::new(DEFAULT_WAKE_WORDS)
    }
}

fn remove_ignore_case(haystack: &str, needle: &str) -> String {
    let lower = haystack.to_lowercase();
    // Lowercasing can change byte lengths outside ASCII; only splice when offsets line up
    if lower.len() != haystack.len() {
        return lower.replace(needle, " ");
    }

    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for (start, matched) in lower.match_indices(needle) {
        out.push_str(&haystack[last..start]);
        out.push(' ');
        last = start + matched.len();
    }
    out.push_str(&haystack[last..]);
    out
}
