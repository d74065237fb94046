//! Name similarity over camel-hump bigrams.
//!
//! A name is split into words at case boundaries, each word contributes its
//! adjacent-character bigrams, and two names are compared with the Dice
//! coefficient of their bigram multisets.

use super::{SimilarityEvaluator, Strategy, dice};
use crate::error::EvaluatorError;
use crate::model::ElementRef;

/// Split a name into camel-case words.
///
/// A lower→upper flip starts a new word. An upper→lower flip after a run of
/// several capitals moves the last capital to the next word, so `"ABCdef"`
/// yields `["AB", "Cdef"]`.
pub fn humps(name: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = name.char_indices().collect();
    let mut words = Vec::new();
    let mut start = 0;
    for pair in chars.windows(2) {
        let (prev_pos, prev) = pair[0];
        let (pos, c) = pair[1];
        if prev.is_lowercase() && c.is_uppercase() {
            words.push(&name[start..pos]);
            start = pos;
        } else if prev.is_uppercase() && c.is_lowercase() && prev_pos > start {
            words.push(&name[start..prev_pos]);
            start = prev_pos;
        }
    }
    if start < name.len() {
        words.push(&name[start..]);
    }
    words
}

/// Case-folded bigrams of every hump of `name`.
///
/// A word shorter than two characters contributes itself as one unit.
pub fn bigrams(name: &str) -> Vec<String> {
    let mut out = Vec::new();
    for word in humps(name) {
        let chars: Vec<char> = word.chars().flat_map(char::to_lowercase).collect();
        if chars.len() < 2 {
            out.push(chars.into_iter().collect());
            continue;
        }
        out.extend(chars.windows(2).map(|w| w.iter().collect::<String>()));
    }
    out
}

/// Dice similarity of two names' bigram multisets.
pub fn name_similarity(from: &str, to: &str) -> f32 {
    dice(&bigrams(from), &bigrams(to))
}

/// Scores elements by the lexical similarity of their names.
#[derive(Clone, Debug)]
pub struct LexicalEvaluator {
    weight: f32,
}

impl LexicalEvaluator {
    pub fn new(weight: f32) -> Self {
        Self { weight }
    }
}

impl Default for LexicalEvaluator {
    fn default() -> Self {
        Self::new(0.8)
    }
}

impl SimilarityEvaluator for LexicalEvaluator {
    fn strategy(&self) -> Strategy {
        Strategy::Lexical
    }

    fn initial_weight(&self) -> f32 {
        self.weight
    }

    fn evaluate(&self, from: ElementRef<'_>, to: ElementRef<'_>) -> Result<f32, EvaluatorError> {
        Ok(name_similarity(
            from.name().unwrap_or_default(),
            to.name().unwrap_or_default(),
        ))
    }
}
