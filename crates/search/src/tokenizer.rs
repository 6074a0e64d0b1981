use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("token regex"));

/// Fixed English stopword set dropped from every query.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
        "it", "its", "of", "on", "that", "the", "to", "was", "will", "with",
    ]
    .into_iter()
    .collect()
});

/// Normalizes a free-text query into search tokens: lowercase, word-character
/// runs only, stopwords and single-character tokens dropped, deduplicated in
/// first-seen order. Eager, so the result can be iterated any number of times.
///
/// Length is measured in characters, not bytes; a lone Cyrillic letter is
/// still a one-character token and gets dropped.
pub fn tokenize(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut tokens = Vec::new();
    for found in TOKEN_RE.find_iter(&lowered) {
        let token = found.as_str();
        if STOPWORDS.contains(token) || token.chars().count() <= 1 {
            continue;
        }
        if seen.insert(token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}
