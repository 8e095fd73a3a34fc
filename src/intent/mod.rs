//! Rule-based intent extraction
//!
//! Utterances are matched against a fixed, ordered list of patterns. The first
//! rule that matches wins, so earlier rules shadow later ones on overlapping
//! text. Anything that matches no rule is left for the language model.

pub mod extractor;
pub mod wake;

pub use extractor::{Intent, IntentExtractor, MATCH_CONFIDENCE};
pub use wake::{WakeWordDetector, DEFAULT_WAKE_WORDS};
