//! Reading-time estimation

use serde::Serialize;

/// Average silent reading speed used when none is configured
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Estimated reading time of a text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: u32,
    /// Label for templates, e.g. "3 min read"
    pub text: String,
}

/// Estimate how long `text` takes to read at `words_per_minute`.
///
/// Minutes are rounded up and never drop below one, so every document
/// gets a label of the same form.
pub fn reading_time(text: &str, words_per_minute: u32) -> ReadingTime {
    let words = count_words(text);
    let wpm = words_per_minute.max(1) as usize;
    let minutes = words.div_ceil(wpm).max(1);
    let minutes = u32::try_from(minutes).unwrap_or(u32::MAX);

    ReadingTime {
        words,
        minutes,
        text: format!("{} min read", minutes),
    }
}

/// Count words: runs of letters and digits (joined by apostrophes or
/// hyphens) count once, every CJK character counts on its own.
pub fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if is_cjk(c) {
            count += 1;
            in_word = false;
        } else if c.is_alphanumeric() {
            if !in_word {
                in_word = true;
                count += 1;
            }
        } else if in_word && matches!(c, '\'' | '\u{2019}' | '-') {
            // Only a joiner when a letter follows ("don't", "built-in")
            in_word = chars
                .peek()
                .is_some_and(|next| next.is_alphanumeric() && !is_cjk(*next));
        } else {
            in_word = false;
        }
    }

    count
}

fn is_cjk(c: char) -> bool {
    matches!(
        c,
        '\u{3040}'..='\u{30FF}' // Hiragana, Katakana
            | '\u{3400}'..='\u{4DBF}' // CJK Extension A
            | '\u{4E00}'..='\u{9FFF}' // CJK Unified Ideographs
            | '\u{AC00}'..='\u{D7AF}' // Hangul syllables
    )
}
