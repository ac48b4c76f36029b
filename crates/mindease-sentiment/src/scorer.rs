//! Lexicon-based sentiment scoring.
//!
//! `score` is a deterministic, total function: any input maps to an integer,
//! unknown or empty text maps to zero, and there are no failure modes.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::lexicon::LEXICON;

fn table() -> &'static HashMap<&'static str, i32> {
    static TABLE: OnceLock<HashMap<&'static str, i32>> = OnceLock::new();
    TABLE.get_or_init(|| LEXICON.iter().copied().collect())
}

/// The result of scoring an utterance: the summed valence and the lexicon
/// words that contributed to it, in encounter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub score: i32,
    pub words: Vec<&'static str>,
}

/// Scores utterances against the fixed lexicon.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentScorer;

impl SentimentScorer {
    pub fn new() -> Self {
        Self
    }

    /// Sum the valences of all recognized tokens in `text`.
    pub fn score(&self, text: &str) -> i32 {
        self.analyze(text).score
    }

    /// Score `text` and report which lexicon words matched.
    pub fn analyze(&self, text: &str) -> Analysis {
        let table = table();
        let mut score = 0;
        let mut words = Vec::new();

        for token in tokenize(text) {
            if let Some((word, weight)) = table.get_key_value(token.as_str()) {
                score += weight;
                words.push(*word);
            }
        }

        Analysis { score, words }
    }
}

/// Split into lowercase word tokens. Apostrophes are kept inside words
/// ("don't" stays one token); everything else is a separator.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Tests
// =============================================================================
