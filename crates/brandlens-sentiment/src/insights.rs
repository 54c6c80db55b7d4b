//! Rule-based insights derived from sentiment counts and terms.

use std::collections::HashMap;

use brandlens_core::{Insights, SentimentBreakdown, TermFrequency};

use crate::scorer::matched_words;

const MIN_COMMENTS_FOR_CONFIDENCE: usize = 20;
const THEMES: usize = 5;
const PRAISE_WORDS: usize = 3;

fn most_common(words: impl IntoIterator<Item = &'static str>, n: usize) -> Vec<&'static str> {
    let mut counts: Vec<(&'static str, usize)> = Vec::new();
    let mut index: HashMap<&'static str, usize> = HashMap::new();
    for w in words {
        if let Some(&slot) = index.get(w) {
            counts[slot].1 += 1;
        } else {
            index.insert(w, counts.len());
            counts.push((w, 1));
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(n).map(|(w, _)| w).collect()
}

/// Build insights for one source's comments.
///
/// Same inputs always produce the same insights.
#[must_use]
pub fn derive_insights<S: AsRef<str>>(
    texts: &[S],
    sentiment: &SentimentBreakdown,
    terms: &[TermFrequency],
) -> Insights {
    let mut insights = Insights::default();
    let total = sentiment.positive + sentiment.neutral + sentiment.negative;
    if total == 0 {
        return insights;
    }

    insights.recurring_themes = terms.iter().take(THEMES).map(|t| t.term.clone()).collect();

    let praise = most_common(
        texts.iter().flat_map(|t| matched_words(t.as_ref(), true)),
        PRAISE_WORDS,
    );
    let complaints = most_common(
        texts.iter().flat_map(|t| matched_words(t.as_ref(), false)),
        PRAISE_WORDS,
    );

    if sentiment.positive_pct >= 60.0 {
        insights.strengths.push(format!(
            "Audience response is largely positive ({:.1}% of comments)",
            sentiment.positive_pct
        ));
    } else if sentiment.positive > sentiment.negative {
        insights.strengths.push(format!(
            "Positive comments outnumber negative ones ({} vs {})",
            sentiment.positive, sentiment.negative
        ));
    }
    if !praise.is_empty() {
        insights
            .strengths
            .push(format!("Frequent praise: {}", praise.join(", ")));
    }

    if sentiment.negative_pct >= 20.0 {
        insights.weaknesses.push(format!(
            "A notable share of comments is negative ({:.1}%)",
            sentiment.negative_pct
        ));
    }
    if !complaints.is_empty() {
        insights
            .weaknesses
            .push(format!("Recurring complaints mention: {}", complaints.join(", ")));
    }
    if total < MIN_COMMENTS_FOR_CONFIDENCE {
        insights.weaknesses.push(format!(
            "Low comment volume ({total}); conclusions are tentative"
        ));
    }

    if sentiment.negative_pct >= 20.0 {
        insights
            .suggestions
            .push("Reply publicly to critical comments and follow up on the issues raised".to_string());
    }
    if sentiment.neutral_pct >= 50.0 {
        insights.suggestions.push(
            "Most comments are neutral; add questions or calls to action to draw stronger reactions"
                .to_string(),
        );
    }
    if total < MIN_COMMENTS_FOR_CONFIDENCE {
        insights
            .suggestions
            .push("Encourage conversation to grow comment volume".to_string());
    }
    if let Some(theme) = insights.recurring_themes.first() {
        insights
            .suggestions
            .push(format!("Build more content around \"{theme}\", the most discussed topic"));
    }

    insights
}
