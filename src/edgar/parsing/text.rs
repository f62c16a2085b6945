use unicode_normalization::UnicodeNormalization;

/// Collapse runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// NFKC-normalize extracted text. Filings lean heavily on non-breaking
/// spaces and full-width punctuation that would otherwise survive the
/// whitespace collapse.
pub fn normalize_unicode(text: &str) -> String {
    text.nfkc().collect::<String>()
}

/// Lowercased, whitespace-collapsed form used for duplicate comparison.
pub fn normalize_for_comparison(text: &str) -> String {
    collapse_whitespace(&text.to_lowercase())
}

/// Split text into sentences at `.`, `!` or `?` followed by whitespace.
///
/// The whitespace run stays attached to nothing; callers re-join with a
/// single space. Hand-rolled because the `regex` crate has no lookbehind.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev_was_terminal = false;

    for (idx, ch) in text.char_indices() {
        if prev_was_terminal && ch.is_whitespace() {
            sentences.push(text[start..idx].trim_end());
            start = idx + ch.len_utf8();
            // Swallow the rest of the whitespace run.
            prev_was_terminal = false;
            continue;
        }
        if !prev_was_terminal && ch.is_whitespace() && start == idx {
            start = idx + ch.len_utf8();
            continue;
        }
        prev_was_terminal = matches!(ch, '.' | '!' | '?');
    }

    if start < text.len() {
        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail);
        }
    }
    sentences
}

/// Number of whitespace-separated tokens. All chunk size accounting in
/// this crate is in words, never characters.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Truncate to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
