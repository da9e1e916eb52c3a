//! Pattern-based field extraction from raw source text.
//!
//! Multi-instance sources report one column per attribute (one pattern per
//! attribute, same instance count). Extraction preserves textual order so
//! callers can zip columns by index, substituting `Unknown` where a column
//! is shorter.

use regex::Regex;

use crate::error::{CollectError, Result};
use crate::field::FieldValue;

/// Expected number of matches for a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly one match expected; absence is a `ParseMismatch`.
    One,
    /// Zero or one match.
    Optional,
    /// Zero or many matches, in textual order.
    Many,
}

/// Extract captures for `pattern` from `raw`. Capture group 1 is used when
/// the pattern declares one, otherwise the whole match; values are trimmed
/// (CRLF-heavy Windows tool output included).
pub fn captures(raw: &str, pattern: &str, cardinality: Cardinality) -> Result<Vec<String>> {
    let re = Regex::new(pattern)
        .map_err(|err| CollectError::ParseMismatch(format!("invalid pattern {pattern:?}: {err}")))?;

    let mut found = Vec::new();
    for caps in re.captures_iter(raw) {
        let text = caps
            .get(1)
            .or_else(|| caps.get(0))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        found.push(text);
        if cardinality != Cardinality::Many {
            break;
        }
    }

    if found.is_empty() && cardinality == Cardinality::One {
        return Err(CollectError::ParseMismatch(pattern.to_string()));
    }

    Ok(found)
}

/// First match for `pattern`, if any. Never errors.
pub fn first(raw: &str, pattern: &str) -> Option<String> {
    captures(raw, pattern, Cardinality::Optional)
        .ok()
        .and_then(|values| values.into_iter().next())
}

/// All matches for `pattern`, in textual order. Never errors.
pub fn all(raw: &str, pattern: &str) -> Vec<String> {
    captures(raw, pattern, Cardinality::Many).unwrap_or_default()
}

/// Positional alignment: the i-th value of a column, `Unknown` when the
/// column is shorter or the slot is empty.
pub fn nth(column: &[String], index: usize) -> FieldValue {
    nth_norm(column, index, |value| FieldValue::Text(value.to_string()))
}

/// Like [`nth`] but runs the value through a normalizer.
pub fn nth_norm(
    column: &[String],
    index: usize,
    normalize: impl Fn(&str) -> FieldValue,
) -> FieldValue {
    match column.get(index) {
        Some(value) if !value.is_empty() => normalize(value),
        _ => FieldValue::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WMI_STYLE: &str = "\
Caption=Drive A\r\n\
Size=100\r\n\
Caption=Drive B\r\n\
Size=200\r\n\
Caption=Drive C\r\n\
Size=300\r\n";

    #[test]
    fn test_exactly_one_mismatch_is_error() {
        let err = captures("no fields here", r"Speed=(.+)", Cardinality::One).unwrap_err();
        assert!(matches!(err, CollectError::ParseMismatch(_)));
    }

    #[test]
    fn test_optional_absence_is_empty() {
        let values = captures("no fields here", r"Speed=(.+)", Cardinality::Optional).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_crlf_values_are_trimmed() {
        let values = captures(WMI_STYLE, r"Caption=(.+)", Cardinality::One).unwrap();
        assert_eq!(values, vec!["Drive A".to_string()]);
    }

    #[test]
    fn test_positional_alignment() {
        let names = all(WMI_STYLE, r"Caption=(.+)");
        let sizes = all(WMI_STYLE, r"Size=(.+)");
        assert_eq!(names.len(), 3);
        assert_eq!(sizes.len(), 3);

        let zipped: Vec<(FieldValue, FieldValue)> = (0..names.len())
            .map(|i| (nth(&names, i), nth(&sizes, i)))
            .collect();
        assert_eq!(
            zipped[1],
            (
                FieldValue::Text("Drive B".into()),
                FieldValue::Text("200".into())
            )
        );
        assert_eq!(
            zipped[2],
            (
                FieldValue::Text("Drive C".into()),
                FieldValue::Text("300".into())
            )
        );
    }

    #[test]
    fn test_shorter_column_reads_unknown() {
        let names = all(WMI_STYLE, r"Caption=(.+)");
        let serials = all(WMI_STYLE, r"SerialNumber=(.+)");
        assert_eq!(nth(&names, 2), FieldValue::Text("Drive C".into()));
        assert_eq!(nth(&serials, 2), FieldValue::Unknown);
    }

    #[test]
    fn test_invalid_pattern_is_mismatch_not_panic() {
        let err = captures("text", r"broken(", Cardinality::Many).unwrap_err();
        assert!(matches!(err, CollectError::ParseMismatch(_)));
    }

    #[test]
    fn test_whole_match_without_group() {
        assert_eq!(first("abc 123 def", r"\d+"), Some("123".to_string()));
    }
}
