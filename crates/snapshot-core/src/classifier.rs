//! Word and emoji extraction from message text. Pure functions, no state.

/// Common English words that never count towards a user's vocabulary.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "to", "a", "of", "in", "i", "is", "that", "it", "on", "you",
    "this", "for", "with", "but", "are", "not", "have", "be", "at", "or", "as",
    "was", "so", "if", "we", "they", "he", "she", "an", "my", "me", "do", "no",
    "just", "from", "by", "your", "all", "can", "will", "what", "about", "up",
    "out", "get", "like", "when", "would", "there", "one", "some",
];

/// Code point ranges counted as emoji: emoticons, misc symbols & pictographs,
/// transport & map symbols, misc symbols.
const EMOJI_RANGES: [(u32, u32); 4] = [
    (0x1F600, 0x1F64F),
    (0x1F300, 0x1F5FF),
    (0x1F680, 0x1F6FF),
    (0x2600, 0x26FF),
];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Lowercase, drop everything that isn't `a-z` or a word separator, split on
/// separators and remove stop words.
///
/// Digits, punctuation and non-Latin scripts are discarded outright, so
/// "don't" becomes "dont" and "café" becomes "caf". Order and duplicates are
/// preserved.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|&c| c.is_ascii_lowercase() || is_separator(c))
        .collect();

    cleaned
        .split(is_separator)
        .filter(|w| !w.is_empty() && !is_stop_word(w))
        .map(str::to_string)
        .collect()
}

/// Unicode whitespace plus the ASCII information separators (FS, GS, RS, US),
/// which chat clients also treat as word breaks.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

pub fn is_emoji(c: char) -> bool {
    let cp = u32::from(c);
    EMOJI_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// Every emoji code point in order of appearance, duplicates kept.
pub fn extract_emoji(text: &str) -> Vec<String> {
    text.chars().filter(|&c| is_emoji(c)).map(String::from).collect()
}
