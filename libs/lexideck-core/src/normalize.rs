//! Lenient coercion of loosely-typed store data into canonical shapes.
//!
//! Nothing here fails. Malformed input degrades to a single-element or
//! empty list.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Field that holds a deck's answer languages.
pub const ANS_LANGS_FIELD: &str = "ans_langs";

/// Coerce an `ans_langs` value of unknown shape into a list of codes.
///
/// - array: string elements, in order
/// - string holding a JSON array: the decoded elements
/// - any other string: `[s]`
/// - anything else: `[]`
pub fn normalize_ans_langs(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => string_elements(items),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => string_elements(&items),
            _ => vec![s.clone()],
        },
        _ => Vec::new(),
    }
}

fn string_elements(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// Return `record` with its `ans_langs` field replaced by the normalized list.
///
/// An `ans_langs` that is already an array is left exactly as stored. Other
/// fields are untouched. A non-object input is returned as-is.
pub fn normalize_deck(mut record: Value) -> Value {
    if let Value::Object(map) = &mut record {
        if matches!(map.get(ANS_LANGS_FIELD), Some(Value::Array(_))) {
            return record;
        }
        let langs = map
            .get(ANS_LANGS_FIELD)
            .map(normalize_ans_langs)
            .unwrap_or_default();
        map.insert(
            ANS_LANGS_FIELD.to_string(),
            Value::Array(langs.into_iter().map(Value::String).collect()),
        );
    }
    record
}

/// Serde adapter: decode any JSON value as a normalized string list.
pub fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_ans_langs(&value))
}

/// Like [`lenient_string_list`], but `null` stays `None`.
pub fn lenient_optional_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(normalize_ans_langs(&value)))
}

/// Canonical form of a tag name: trimmed, lowercased, and each run of
/// whitespace replaced by one underscore.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn array_passes_through() {
        assert_eq!(normalize_ans_langs(&json!(["fa", "en"])), vec!["fa", "en"]);
        assert_eq!(normalize_ans_langs(&json!([])), Vec::<String>::new());
    }

    #[test]
    fn json_encoded_array_is_decoded() {
        assert_eq!(normalize_ans_langs(&json!("[\"fa\",\"en\"]")), vec!["fa", "en"]);
    }

    #[test]
    fn bare_string_becomes_single_element() {
        assert_eq!(normalize_ans_langs(&json!("fa")), vec!["fa"]);
        assert_eq!(normalize_ans_langs(&json!("[broken")), vec!["[broken"]);
    }

    #[test]
    fn json_string_that_is_not_an_array_is_kept_whole() {
        assert_eq!(normalize_ans_langs(&json!("{\"a\":1}")), vec!["{\"a\":1}"]);
        assert_eq!(normalize_ans_langs(&json!("42")), vec!["42"]);
    }

    #[test]
    fn other_shapes_become_empty() {
        assert!(normalize_ans_langs(&Value::Null).is_empty());
        assert!(normalize_ans_langs(&json!(7)).is_empty());
        assert!(normalize_ans_langs(&json!({"fa": true})).is_empty());
    }

    #[test]
    fn non_string_array_elements_are_dropped() {
        assert_eq!(normalize_ans_langs(&json!(["fa", 1, null, "en"])), vec!["fa", "en"]);
    }

    #[test]
    fn normalize_deck_only_touches_ans_langs() {
        let record = json!({"id": "x", "name": "Deck", "ans_langs": "fa"});
        assert_eq!(
            normalize_deck(record),
            json!({"id": "x", "name": "Deck", "ans_langs": ["fa"]})
        );
    }

    #[test]
    fn normalize_deck_keeps_arrays_verbatim() {
        let record = json!({"id": "x", "ans_langs": ["fa", 1, null]});
        assert_eq!(normalize_deck(record.clone()), record);

        let normalized = normalize_deck(json!({"ans_langs": "[\"en\"]"}));
        assert_eq!(normalize_deck(normalized.clone()), normalized);
    }

    #[test]
    fn normalize_deck_fills_missing_field() {
        assert_eq!(normalize_deck(json!({"id": "x"})), json!({"id": "x", "ans_langs": []}));
    }

    #[test]
    fn normalize_name_collapses_whitespace() {
        assert_eq!(normalize_name("  Hello   World  "), "hello_world");
        assert_eq!(normalize_name("Phrasal\tVerbs\nB2"), "phrasal_verbs_b2");
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn normalize_name_is_idempotent() {
        for name in ["  Hello   World  ", "ÄÖÜ Tag", "already_normal"] {
            let once = normalize_name(name);
            assert_eq!(normalize_name(&once), once);
        }
    }
}
