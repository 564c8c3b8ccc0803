//! ASCII tokenizer with stop word removal.
//!
//! Lowercases the input, treats every character outside `[a-z0-9]` as a
//! separator, drops single-character tokens and English function words.
//! Non-ASCII letters are separators too, so "café" yields "caf".

use std::collections::HashSet;
use std::sync::OnceLock;

const STOP_WORD_LIST: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "shall", "can", "need",
    "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "through", "during",
    "before", "after", "above", "below", "between", "out", "off", "over", "under", "again",
    "further", "then", "once", "here", "there", "when", "where", "why", "how", "all", "both",
    "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only", "own",
    "same", "so", "than", "too", "very", "and", "but", "or", "if", "while", "about", "it", "its",
    "this", "that", "these", "those", "i", "me", "my", "we", "our", "you", "your", "he", "him",
    "his", "she", "her", "they", "them", "their", "what", "which", "who", "whom",
];

fn stop_words() -> &'static HashSet<&'static str> {
    static STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    STOP_WORDS.get_or_init(|| STOP_WORD_LIST.iter().copied().collect())
}

pub fn is_stop_word(token: &str) -> bool {
    stop_words().contains(token)
}

/// Tokenized text: owns the normalized buffer and hands out `&str` slices via
/// byte spans, so a chunk costs one allocation however many tokens it has.
#[derive(Debug, Clone, Default)]
pub struct Tokens {
    buffer: String,
    spans: Vec<(usize, usize)>,
}

impl Tokens {
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans.iter().map(|&(s, e)| &self.buffer[s..e])
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_owned).collect()
    }
}

/// Tokenize text into lowercase alphanumeric index terms, in order.
pub fn tokenize(text: &str) -> Tokens {
    // Everything outside [a-z0-9] becomes a space after lowercasing, so the
    // buffer is pure ASCII and byte offsets are char offsets.
    let buffer: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { ' ' })
        .collect();

    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    for (i, b) in buffer.bytes().enumerate() {
        if b == b' ' {
            if let Some(s) = start.take() {
                push_token(&buffer, s, i, &mut spans);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        push_token(&buffer, s, buffer.len(), &mut spans);
    }

    Tokens { buffer, spans }
}

fn push_token(buffer: &str, start: usize, end: usize, spans: &mut Vec<(usize, usize)>) {
    let token = &buffer[start..end];
    if token.len() > 1 && !is_stop_word(token) {
        spans.push((start, end));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        tokenize(text).to_vec()
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t ").is_empty());
    }

    #[test]
    fn stop_words_only_yields_nothing() {
        assert!(tokenize("The and of it THEY whom").is_empty());
    }

    #[test]
    fn lowercases_and_splits_on_punctuation() {
        assert_eq!(words("Hello, World! API-key=42"), vec!["hello", "world", "api", "key", "42"]);
    }

    #[test]
    fn drops_single_characters() {
        assert_eq!(words("a b c x1 y"), vec!["x1"]);
    }

    #[test]
    fn keeps_order_and_duplicates() {
        assert_eq!(words("cat sat cat"), vec!["cat", "sat", "cat"]);
    }

    #[test]
    fn non_ascii_letters_act_as_separators() {
        assert_eq!(words("café naïve"), vec!["caf", "na", "ve"]);
    }

    #[test]
    fn stop_word_list_size() {
        assert_eq!(STOP_WORD_LIST.len(), 107);
        assert_eq!(stop_words().len(), STOP_WORD_LIST.len());
    }
}
