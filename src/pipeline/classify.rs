//! Gibberish heuristic: flags unintelligible input before any model call.
//!
//! Tuned for Spanish orthography (accented vowels count as vowels) and
//! intentionally permissive for short text. The word tables live in
//! [`TriageTables`] so deployments can adjust them.

use crate::config::TriageTables;

/// Longest normalized input that is always accepted without further checks.
const SHORT_INPUT_LIMIT: usize = 20;

/// A single unbroken token longer than this is treated as noise.
const UNBROKEN_TOKEN_LIMIT: usize = 30;

/// Words at least this long with no vowel count toward the noise ratio.
const NO_VOWEL_WORD_LEN: usize = 8;

/// Share of no-vowel words above which the input is rejected.
const NO_VOWEL_RATIO: f64 = 0.7;

/// Heuristically decide whether `text` is noise. Pure and deterministic.
pub fn is_gibberish(tables: &TriageTables, text: &str) -> bool {
    let clean = normalize(text);

    if clean.chars().count() <= SHORT_INPUT_LIMIT {
        return false;
    }

    if tables.greeting_whitelist.iter().any(|g| *g == clean) {
        return false;
    }

    if clean.chars().count() > UNBROKEN_TOKEN_LIMIT && !clean.contains(' ') {
        return true;
    }

    let words: Vec<&str> = clean.split(' ').collect();
    let long_no_vowel = words
        .iter()
        .filter(|w| {
            w.chars().count() >= NO_VOWEL_WORD_LEN
                && !w.chars().any(|c| tables.vowels.contains(&c))
        })
        .count();

    words.len() > 2 && long_no_vowel as f64 / words.len() as f64 > NO_VOWEL_RATIO
}

/// Trim, lowercase, and collapse internal whitespace runs to single spaces.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
