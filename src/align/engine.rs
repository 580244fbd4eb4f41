//! Speech-to-script alignment
//!
//! Pure matching: given the sentence list, the current reading position, and
//! a final transcript, find the sentence the speaker is on. No match is a
//! normal outcome, not an error.

use std::collections::HashSet;

use super::script::Sentence;

/// Minimum token-overlap score for a sentence to count as spoken
const MATCH_THRESHOLD: f64 = 0.5;

/// Find the sentence matching `transcript`, or `None`.
///
/// Checked in order, first hit wins:
/// 1. the current sentence (score >= 0.5),
/// 2. the next sentence (score >= 0.5),
/// 3. a full scan for the best score strictly above 0.5; ties keep the
///    lowest index, since only a strictly greater score displaces the best.
pub fn align(sentences: &[Sentence], current_index: usize, transcript: &str) -> Option<usize> {
    let lowered = transcript.to_lowercase();
    let spoken: HashSet<&str> = lowered.split_whitespace().collect();
    if spoken.is_empty() {
        return None;
    }

    if let Some(sentence) = sentences.get(current_index) {
        if match_score(&sentence.text, &spoken) >= MATCH_THRESHOLD {
            return Some(current_index);
        }
    }

    if let Some(sentence) = sentences.get(current_index + 1) {
        if match_score(&sentence.text, &spoken) >= MATCH_THRESHOLD {
            return Some(current_index + 1);
        }
    }

    let mut best = None;
    let mut best_score = MATCH_THRESHOLD;
    for sentence in sentences {
        let score = match_score(&sentence.text, &spoken);
        if score > best_score {
            best_score = score;
            best = Some(sentence.index);
        }
    }

    best
}

/// Fraction of the sentence's tokens that appear in the spoken token set.
///
/// Tokens are whitespace-delimited and lowercased; punctuation stays
/// attached, so a trailing "there." only matches a spoken "there." exactly.
/// That asymmetry is deliberate slack: a sentence already half-covered by
/// the spoken words clears the threshold.
fn match_score(sentence: &str, spoken: &HashSet<&str>) -> f64 {
    let lowered = sentence.to_lowercase();
    let mut total = 0usize;
    let mut matched = 0usize;

    for token in lowered.split_whitespace() {
        total += 1;
        if spoken.contains(token) {
            matched += 1;
        }
    }

    if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64
    }
}
