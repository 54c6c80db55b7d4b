//! Term frequencies for word clouds and recurring themes.

use brandlens_core::TermFrequency;
use brandlens_metrics::top_by_frequency;

/// Italian and English function words excluded from term counts.
const STOPWORDS: &[&str] = &[
    // Italian
    "di", "a", "da", "in", "con", "su", "per", "tra", "fra", "il", "lo", "la", "i", "gli", "le",
    "un", "uno", "una", "del", "dello", "della", "dei", "degli", "delle", "al", "allo", "alla",
    "ai", "agli", "alle", "dal", "dallo", "dalla", "dai", "dagli", "dalle", "nel", "nello",
    "nella", "nei", "negli", "nelle", "sul", "sullo", "sulla", "sui", "sugli", "sulle", "e", "è",
    "che", "non", "mi", "ti", "si", "ci", "vi", "anche", "come", "ma", "o", "se", "sono", "hanno",
    "ha", "questo", "questa", "questi", "queste", "quello", "quella", "molto", "più", "mai", "poi",
    "però", "quindi", "dove",
    // English
    "the", "and", "this", "that", "with", "from", "have", "your", "just", "they", "them", "what",
    "when", "where", "will", "would", "there", "their", "about", "been", "were", "which", "more",
    "some", "than", "then", "very", "also", "into", "only", "over", "such", "here", "does",
];

/// Lowercase, turn punctuation into spaces, and delete digits.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !c.is_numeric())
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}

fn is_term(word: &str) -> bool {
    word.chars().count() > 3
        && !STOPWORDS.contains(&word)
        && !word.starts_with("http")
        && !word.starts_with("www")
}

/// The `max` most frequent terms across `texts`.
///
/// Words must be longer than three characters, not stopwords, and not url
/// fragments. Frequency descending; ties keep first-seen order.
#[must_use]
pub fn top_terms<S: AsRef<str>>(texts: &[S], max: usize) -> Vec<TermFrequency> {
    let normalized: Vec<String> = texts.iter().map(|t| normalize(t.as_ref())).collect();
    let words = normalized
        .iter()
        .flat_map(|text| text.split_whitespace())
        .filter(|w| is_term(w));

    top_by_frequency(words, max)
        .into_iter()
        .map(|(term, frequency)| TermFrequency { term, frequency })
        .collect()
}
