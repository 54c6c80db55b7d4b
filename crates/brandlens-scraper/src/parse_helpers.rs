//! Lenient field extraction shared by the provider adapters.
//!
//! Apify actors are loose about types: counters arrive as integers, floats,
//! `-1` for "hidden", or formatted strings; ids arrive as strings or numbers;
//! timestamps arrive as RFC 3339, bare dates, or human text ("2 days ago").
//! These helpers normalize that noise so the only hard parse failures are a
//! missing id or url.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ScraperError;

/// Deserializes a counter, mapping anything unusable (null, negative,
/// non-numeric text) to zero.
pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map_or(0, count_from_value))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count_from_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().replace(',', "").parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

/// Deserializes an identifier given as a string or a number.
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date. Anything else
/// (relative text, garbage) yields `None`.
pub(crate) fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Hashtags written inline in free text: whitespace-separated words that
/// start with `#`, returned without the `#`.
pub(crate) fn hashtags_from_text(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|word| word.strip_prefix('#'))
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Requires a non-empty field, naming it in the parse error otherwise.
pub(crate) fn required(
    value: Option<String>,
    field: &str,
    context: &str,
) -> Result<String, ScraperError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ScraperError::Parse {
            context: context.to_owned(),
            reason: format!("missing {field}"),
        })
}

/// Parses at most `max` raw dataset items with `parse`, dropping failures.
///
/// A failed item is logged and skipped; it never fails the batch.
pub(crate) fn parse_each<T, F>(items: Vec<Value>, max: usize, kind: &str, mut parse: F) -> Vec<T>
where
    F: FnMut(Value) -> Result<T, ScraperError>,
{
    let mut parsed = Vec::with_capacity(items.len().min(max));
    for (index, item) in items.into_iter().take(max).enumerate() {
        match parse(item) {
            Ok(value) => parsed.push(value),
            Err(e) => {
                tracing::warn!(kind, index, error = %e, "dropping malformed dataset item");
            }
        }
    }
    parsed
}

/// `serde_json::from_value` with the error mapped to [`ScraperError::Parse`].
pub(crate) fn from_value<T>(value: Value, context: &str) -> Result<T, ScraperError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(value).map_err(|e| ScraperError::Parse {
        context: context.to_owned(),
        reason: e.to_string(),
    })
}
