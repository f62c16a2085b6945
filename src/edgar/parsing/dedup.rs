use std::collections::HashSet;

use super::text::{normalize_for_comparison, split_sentences};

/// Minimum phrase length (chars) for consecutive-duplicate collapsing.
const MIN_PHRASE_CHARS: usize = 10;
/// Sentences at or under this length (chars, normalized) are too generic
/// to track across blocks.
const MIN_SENTENCE_CHARS: usize = 20;
/// Largest n-gram checked for consecutive repetition.
const MAX_PHRASE_WORDS: usize = 8;

/// Removes duplicated text within and across blocks of one document.
///
/// Accessibility markup in EDGAR filings routinely renders the same
/// heading or sentence twice (visible + screen-reader copies). Two passes
/// handle this: consecutive duplicate phrases are collapsed inside a
/// block, then sentences already seen anywhere earlier in the document
/// are dropped. State is scoped to one document; call [`reset`] between
/// filings.
///
/// [`reset`]: Deduplicator::reset
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen_sentences: HashSet<String>,
    removed: usize,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all per-document state.
    pub fn reset(&mut self) {
        self.seen_sentences.clear();
        self.removed = 0;
    }

    /// Total phrases + sentences removed since the last reset.
    pub fn removed(&self) -> usize {
        self.removed
    }

    /// Remove duplicate phrases within `text` and sentences already seen
    /// in earlier blocks of the same document.
    pub fn deduplicate(&mut self, text: &str) -> String {
        let text = self.collapse_repeated_phrases(text);

        let mut unique = Vec::new();
        for sentence in split_sentences(&text) {
            let normalized = normalize_for_comparison(sentence);
            if normalized.chars().count() > MIN_SENTENCE_CHARS {
                if self.seen_sentences.contains(&normalized) {
                    self.removed += 1;
                    continue;
                }
                self.seen_sentences.insert(normalized);
            }
            unique.push(sentence);
        }
        unique.join(" ")
    }

    /// Collapse immediately repeated n-grams ("UNITED STATES UNITED
    /// STATES" -> "UNITED STATES"). Largest phrases first, so a repeated
    /// title collapses as a whole before its sub-phrases are considered.
    fn collapse_repeated_phrases(&mut self, text: &str) -> String {
        let mut words: Vec<&str> = text.split_whitespace().collect();
        if words.len() < 4 {
            return text.to_string();
        }

        for n in (2..=MAX_PHRASE_WORDS).rev() {
            let mut result = Vec::with_capacity(words.len());
            let mut i = 0;
            while i < words.len() {
                if i + 2 * n <= words.len() {
                    let first = words[i..i + n].join(" ");
                    let second = words[i + n..i + 2 * n].join(" ");
                    if first.to_lowercase() == second.to_lowercase()
                        && first.chars().count() > MIN_PHRASE_CHARS
                    {
                        result.extend_from_slice(&words[i..i + n]);
                        i += 2 * n;
                        self.removed += 1;
                        continue;
                    }
                }
                result.push(words[i]);
                i += 1;
            }
            words = result;
        }

        words.join(" ")
    }
}
