//! Lexicon scorer for short social-media comments.
//!
//! Covers English and Italian, since most analyzed brands post in one or
//! both, plus a handful of emoji that carry most of the signal in short
//! replies.

/// Word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("great", 0.4),
    ("good", 0.3),
    ("excellent", 0.5),
    ("amazing", 0.5),
    ("awesome", 0.5),
    ("beautiful", 0.4),
    ("love", 0.5),
    ("loved", 0.5),
    ("lovely", 0.4),
    ("best", 0.5),
    ("perfect", 0.5),
    ("recommend", 0.4),
    ("quality", 0.3),
    ("fantastic", 0.5),
    ("cool", 0.3),
    ("nice", 0.3),
    ("thanks", 0.3),
    ("congrats", 0.4),
    ("bravo", 0.4),
    ("brava", 0.4),
    ("bravi", 0.4),
    ("bello", 0.4),
    ("bella", 0.4),
    ("bellissimo", 0.5),
    ("bellissima", 0.5),
    ("stupendo", 0.5),
    ("fantastico", 0.5),
    ("ottimo", 0.4),
    ("top", 0.3),
    ("grazie", 0.3),
    ("complimenti", 0.5),
    ("adoro", 0.5),
    // Negative signals
    ("bad", -0.4),
    ("terrible", -0.6),
    ("awful", -0.6),
    ("worst", -0.6),
    ("hate", -0.6),
    ("boring", -0.4),
    ("ugly", -0.4),
    ("disappointed", -0.5),
    ("disappointing", -0.5),
    ("scam", -0.7),
    ("fake", -0.5),
    ("broken", -0.4),
    ("problem", -0.3),
    ("refund", -0.4),
    ("never", -0.2),
    ("brutto", -0.4),
    ("brutta", -0.4),
    ("pessimo", -0.6),
    ("schifo", -0.6),
    ("delusione", -0.5),
    ("deluso", -0.5),
    ("truffa", -0.7),
    ("noioso", -0.4),
    ("vergogna", -0.6),
];

/// Emoji weights, matched per character anywhere in the text.
pub(crate) const EMOJI: &[(char, f32)] = &[
    ('❤', 0.4),
    ('😍', 0.5),
    ('🔥', 0.3),
    ('👏', 0.3),
    ('😂', 0.2),
    ('🥰', 0.5),
    ('👍', 0.3),
    ('😡', -0.5),
    ('👎', -0.5),
    ('🤮', -0.6),
    ('😒', -0.3),
];

/// Polarity bucket for a scored comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Neutral,
    Negative,
}

/// Score a text string using the lexicon.
///
/// Splits text into lowercase words, sums matching weights, adds emoji
/// weights, and clamps the result to `[-1.0, 1.0]`. Returns `0.0` for empty
/// or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if let Some(&(_, weight)) = LEXICON.iter().find(|(lex_word, _)| *lex_word == w) {
            score += weight;
        }
    }
    for c in text.chars() {
        if let Some(&(_, weight)) = EMOJI.iter().find(|(e, _)| *e == c) {
            score += weight;
        }
    }
    score.clamp(-1.0, 1.0)
}

/// `> 0` is positive, `< 0` negative, otherwise neutral.
#[must_use]
pub fn polarity(text: &str) -> Polarity {
    let score = lexicon_score(text);
    if score > 0.0 {
        Polarity::Positive
    } else if score < 0.0 {
        Polarity::Negative
    } else {
        Polarity::Neutral
    }
}

/// Lexicon words in `text` with the given sign, lowercased, in order.
pub(crate) fn matched_words(text: &str, positive: bool) -> Vec<&'static str> {
    text.split_whitespace()
        .filter_map(|word| {
            let w = word
                .trim_matches(|c: char| !c.is_alphabetic())
                .to_lowercase();
            LEXICON
                .iter()
                .find(|(lex_word, weight)| *lex_word == w && (*weight > 0.0) == positive)
                .map(|(lex_word, _)| *lex_word)
        })
        .collect()
}
