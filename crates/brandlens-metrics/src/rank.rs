//! Stable top-N selection.

use std::collections::HashMap;

/// Count occurrences and return the `n` most frequent values.
///
/// Frequency descending; equal counts keep the order in which each value was
/// first seen.
#[must_use]
pub fn top_by_frequency<I, S>(values: I, n: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for value in values {
        let value = value.as_ref();
        if let Some(&slot) = index.get(value) {
            counts[slot].1 += 1;
        } else {
            index.insert(value.to_string(), counts.len());
            counts.push((value.to_string(), 1));
        }
    }

    // `sort_by` is stable, so ties stay in first-seen order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_output() {
        let out = top_by_frequency(Vec::<String>::new(), 5);
        assert!(out.is_empty());
    }

    #[test]
    fn orders_by_frequency_descending() {
        let out = top_by_frequency(["a", "b", "b", "c", "c", "c"], 10);
        assert_eq!(
            out,
            vec![
                ("c".to_string(), 3),
                ("b".to_string(), 2),
                ("a".to_string(), 1)
            ]
        );
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let out = top_by_frequency(["z", "y", "x", "y", "z", "x"], 10);
        let tags: Vec<&str> = out.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tags, vec!["z", "y", "x"]);
    }

    #[test]
    fn truncates_to_n() {
        let out = top_by_frequency(["a", "b", "c", "d"], 2);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].0, "a");
        assert_eq!(out[1].0, "b");
    }

    #[test]
    fn repeated_runs_are_identical() {
        let input = ["q", "w", "e", "w", "q", "r", "t", "e"];
        assert_eq!(top_by_frequency(input, 3), top_by_frequency(input, 3));
    }
}
