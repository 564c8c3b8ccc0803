//! Per-chunk keyword extraction: the most frequent index terms.

use std::collections::HashMap;

use crate::tokenize::tokenize;

pub const MAX_KEYWORDS: usize = 50;

/// Returns up to [`MAX_KEYWORDS`] distinct tokens of `text`, most frequent
/// first. Equal counts keep first-occurrence order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    extract_top_keywords(text, MAX_KEYWORDS)
}

pub fn extract_top_keywords(text: &str, max: usize) -> Vec<String> {
    let tokens = tokenize(text);
    // token -> (count, first occurrence)
    let mut freq: HashMap<&str, (usize, usize)> = HashMap::new();
    for (i, token) in tokens.iter().enumerate() {
        freq.entry(token).or_insert((0, i)).0 += 1;
    }

    let mut ranked: Vec<(&str, (usize, usize))> = freq.into_iter().collect();
    ranked.sort_unstable_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.into_iter().take(max).map(|(t, _)| t.to_string()).collect()
}
