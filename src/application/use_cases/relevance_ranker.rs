//! Lexical relevance ranking for few-shot example selection.
//!
//! Scores stored examples against an incoming question with Jaccard
//! similarity over lower-cased word sets. Intentionally a lightweight
//! heuristic: no embeddings, no synonym awareness.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::domain::example::QueryExample;

pub const DEFAULT_LIMIT: usize = 3;

/// Select up to `limit` examples most relevant to `question`, ordered by
/// descending score. Ties keep corpus order; zero-score examples are
/// dropped even when `limit` has room.
pub fn rank<'a>(
    question: &str,
    examples: &'a [QueryExample],
    limit: usize,
) -> Vec<&'a QueryExample> {
    let question_words = word_set(question);

    let mut scored: Vec<(f32, &QueryExample)> = examples
        .iter()
        .map(|example| (jaccard(&question_words, &word_set(&example.question)), example))
        .collect();

    // Stable sort keeps corpus order for equal scores.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .filter(|(score, _)| *score > 0.0)
        .take(limit)
        .map(|(_, example)| example)
        .collect()
}

fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f32 / union as f32
}
