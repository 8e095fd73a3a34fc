use crate::actions::Parameters;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Confidence reported for every pattern match
pub const MATCH_CONFIDENCE: f32 = 0.8;

/// A structured interpretation of an utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Action the intent maps to
    pub name: String,

    /// Match confidence in 0..1
    pub confidence: f32,

    /// Parameters captured from the utterance
    pub parameters: Parameters,
}

impl Intent {
    /// Get a string parameter by name
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Value::as_str)
    }
}

type CaptureFn = fn(&Captures<'_>) -> Parameters;

struct IntentRule {
    pattern: Regex,
    intent: &'static str,
    extract: CaptureFn,
}

/// Ordered pattern rules over lowercased utterances
pub struct IntentExtractor {
    rules: Vec<IntentRule>,
}

impl IntentExtractor {
    pub fn new() -> Self {
        let rules = vec![
            rule(r"open (\S+)", "open_url", |caps| {
                params(&[("url", group(caps, 1))])
            }),
            rule(r"search for (.+)", "web_search", |caps| {
                params(&[("query", group(caps, 1))])
            }),
            rule(
                r"set (?:a )?timer for (\d+) ?(minutes?|min|seconds?|sec|hours?|hr)",
                "set_timer",
                |caps| params(&[("duration", group(caps, 1)), ("unit", group(caps, 2))]),
            ),
            rule(r"what(?:'s| is) the weather", "get_weather", |_| {
                Parameters::new()
            }),
            rule(r"calculate (.+)", "calculate", |caps| {
                params(&[("expression", group(caps, 1))])
            }),
            rule(
                r"(turn on|turn off|dim|brighten) (?:the )?(.+)",
                "smart_home_control",
                |caps| params(&[("action", group(caps, 1)), ("device", group(caps, 2))]),
            ),
        ];

        Self { rules }
    }

    /// Match an utterance against the rules, first match wins
    pub fn extract(&self, utterance: &str) -> Option<Intent> {
        let normalized = utterance.to_lowercase();

        self.rules.iter().find_map(|rule| {
            rule.pattern.captures(&normalized).map(|caps| Intent {
                name: rule.intent.to_string(),
                confidence: MATCH_CONFIDENCE,
                parameters: (rule.extract)(&caps),
            })
        })
    }

    /// Names of the intents this extractor can produce, in rule order
    pub fn intent_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.intent).collect()
    }
}

impl Default for IntentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn rule(pattern: &str, intent: &'static str, extract: CaptureFn) -> IntentRule {
    IntentRule {
        // Patterns are fixed literals covered by tests
        pattern: Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid intent pattern {}: {}", pattern, e)),
        intent,
        extract,
    }
}

fn group(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

fn params(pairs: &[(&str, String)]) -> Parameters {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), Value::String(value.clone())))
        .collect()
}
