//! Parsing of AI batch job output (one JSON object per line).
//!
//! Each line is parsed on its own. A malformed line becomes a
//! [`ParsedResultError`] and never aborts the rest of the file.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::CollocationsPattern;

static BATCH_FILE_LANG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"batch_words_([a-z]{2})").expect("valid batch filename pattern"));

/// Location of the model's text output within a batch response line.
const CONTENT_TEXT_POINTER: &str = "/response/body/output/1/content/0/text";
const TOTAL_TOKENS_POINTER: &str = "/response/body/usage/total_tokens";

/// A successfully parsed batch line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedResult {
    pub word: String,
    pub tokens: u64,
    pub output: String,
    pub collocations: CollocationsPattern,
}

/// A batch line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResultError {
    /// Starts with `Line N:`.
    pub error: String,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParsedLine {
    Parsed(ParsedResult),
    Failed(ParsedResultError),
}

impl ParsedLine {
    fn failed(line_number: usize, stage: &str, detail: impl std::fmt::Display, raw: &str) -> Self {
        Self::Failed(ParsedResultError {
            error: format!("Line {}: {} - {}", line_number, stage, detail),
            raw: raw.to_string(),
        })
    }
}

/// Parse one line of batch output. `line_number` is 1-based.
pub fn parse_batch_line(line: &str, line_number: usize) -> ParsedLine {
    let raw: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => return ParsedLine::failed(line_number, "Invalid JSON syntax", e, line),
    };

    let output = match raw.pointer(CONTENT_TEXT_POINTER).and_then(Value::as_str) {
        Some(text) => text,
        None => {
            return ParsedLine::failed(
                line_number,
                "Invalid content JSON",
                "missing response.body.output[1].content[0].text",
                line,
            )
        }
    };

    let collocations: CollocationsPattern = match serde_json::from_str(output) {
        Ok(c) => c,
        Err(e) => return ParsedLine::failed(line_number, "Invalid content JSON", e, line),
    };

    let word = match raw.get("custom_id").and_then(Value::as_str) {
        Some(w) => w,
        None => {
            return ParsedLine::failed(
                line_number,
                "Unexpected object shape",
                "custom_id is not a string",
                line,
            )
        }
    };

    let tokens = match raw.pointer(TOTAL_TOKENS_POINTER).and_then(Value::as_u64) {
        Some(t) => t,
        None => {
            return ParsedLine::failed(
                line_number,
                "Unexpected object shape",
                "usage.total_tokens is not a non-negative integer",
                line,
            )
        }
    };

    ParsedLine::Parsed(ParsedResult {
        word: word.to_string(),
        tokens,
        output: output.to_string(),
        collocations,
    })
}

/// Parse a whole batch file. Blank lines are skipped and the remaining
/// lines are numbered from 1.
pub fn parse_batch_file(content: &str) -> Vec<ParsedLine> {
    content
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, line)| parse_batch_line(line, index + 1))
        .collect()
}

/// Two-letter language code encoded in a `batch_words_xx` filename.
pub fn detect_language_from_filename(filename: &str) -> Option<String> {
    BATCH_FILE_LANG
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn is_valid_parsed_result(result: &ParsedLine) -> bool {
    matches!(result, ParsedLine::Parsed(_))
}

pub fn filter_valid_results(results: &[ParsedLine]) -> Vec<ParsedResult> {
    results
        .iter()
        .filter_map(|r| match r {
            ParsedLine::Parsed(p) => Some(p.clone()),
            ParsedLine::Failed(_) => None,
        })
        .collect()
}

pub fn filter_error_results(results: &[ParsedLine]) -> Vec<ParsedResultError> {
    results
        .iter()
        .filter_map(|r| match r {
            ParsedLine::Failed(e) => Some(e.clone()),
            ParsedLine::Parsed(_) => None,
        })
        .collect()
}

/// Split owned results into (valid, errors), keeping order within each.
pub fn partition_results(results: Vec<ParsedLine>) -> (Vec<ParsedResult>, Vec<ParsedResultError>) {
    let mut valid = Vec::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            ParsedLine::Parsed(p) => valid.push(p),
            ParsedLine::Failed(e) => errors.push(e),
        }
    }
    (valid, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn batch_line(word: &str, tokens: Value, text: &str) -> String {
        json!({
            "custom_id": word,
            "response": {
                "status_code": 200,
                "body": {
                    "usage": { "input_tokens": 100, "output_tokens": 50, "total_tokens": tokens },
                    "output": [
                        { "type": "reasoning", "text": "Output text" },
                        { "type": "message", "content": [ { "type": "output_text", "text": text } ] }
                    ]
                }
            }
        })
        .to_string()
    }

    fn content() -> String {
        json!({
            "V + Noun": [
                { "collocation": "run fast", "difficulty": "easy" },
                { "collocation": "run away", "difficulty": "medium" }
            ],
            "Adj + Noun": [ { "collocation": "fast runner", "difficulty": "medium" } ]
        })
        .to_string()
    }

    #[test]
    fn parses_valid_line() {
        let text = content();
        let line = batch_line("test_word", json!(150), &text);
        let ParsedLine::Parsed(result) = parse_batch_line(&line, 1) else {
            panic!("expected a parsed result");
        };
        assert_eq!(result.word, "test_word");
        assert_eq!(result.tokens, 150);
        assert_eq!(result.output, text);
        assert_eq!(result.collocations["V + Noun"].len(), 2);
        assert_eq!(result.collocations["Adj + Noun"][0].collocation, "fast runner");
    }

    #[test]
    fn keeps_unicode_words() {
        let text = json!({"動詞 + 名詞": [{"collocation": "走る", "difficulty": "easy"}]}).to_string();
        let line = batch_line("日本語_word", json!(10), &text);
        let ParsedLine::Parsed(result) = parse_batch_line(&line, 1) else {
            panic!("expected a parsed result");
        };
        assert_eq!(result.word, "日本語_word");
        assert_eq!(result.collocations["動詞 + 名詞"][0].collocation, "走る");
    }

    #[test]
    fn invalid_json_reports_line_number() {
        let line = r#"{"custom_id": "test_word", invalid json here"#;
        let ParsedLine::Failed(err) = parse_batch_line(line, 7) else {
            panic!("expected an error");
        };
        assert!(err.error.starts_with("Line 7: Invalid JSON syntax - "));
        assert_eq!(err.raw, line);
    }

    #[test]
    fn missing_content_is_content_error() {
        let line = json!({
            "custom_id": "test_word",
            "response": { "body": { "usage": { "total_tokens": 150 } } }
        })
        .to_string();
        let ParsedLine::Failed(err) = parse_batch_line(&line, 2) else {
            panic!("expected an error");
        };
        assert!(err.error.starts_with("Line 2: Invalid content JSON - "));
    }

    #[test]
    fn malformed_content_is_content_error() {
        let line = batch_line("w", json!(150), "{ invalid json }");
        let ParsedLine::Failed(err) = parse_batch_line(&line, 3) else {
            panic!("expected an error");
        };
        assert!(err.error.starts_with("Line 3: Invalid content JSON - "));
    }

    #[test]
    fn empty_collocations_object_is_valid() {
        let line = batch_line("test_word_empty", json!(50), "{}");
        let ParsedLine::Parsed(result) = parse_batch_line(&line, 1) else {
            panic!("expected a parsed result");
        };
        assert!(result.collocations.is_empty());
    }

    #[test]
    fn bad_token_count_is_shape_error() {
        let line = batch_line("w", json!("many"), "{}");
        let ParsedLine::Failed(err) = parse_batch_line(&line, 4) else {
            panic!("expected an error");
        };
        assert!(err.error.starts_with("Line 4: Unexpected object shape - "));
    }

    #[test]
    fn missing_custom_id_is_shape_error() {
        let mut value: Value = serde_json::from_str(&batch_line("w", json!(1), "{}")).unwrap();
        value.as_object_mut().unwrap().remove("custom_id");
        let ParsedLine::Failed(err) = parse_batch_line(&value.to_string(), 1) else {
            panic!("expected an error");
        };
        assert!(err.error.contains("Unexpected object shape"));
    }

    #[test]
    fn file_skips_blank_lines_and_keeps_order() {
        let text = content();
        let file = format!(
            "{}\n\n{}\n   \nnot json\n{}\n",
            batch_line("a", json!(1), &text),
            batch_line("b", json!(2), &text),
            batch_line("c", json!(3), &text),
        );
        let results = parse_batch_file(&file);
        assert_eq!(results.len(), 4);

        let valid = filter_valid_results(&results);
        let words: Vec<_> = valid.iter().map(|r| r.word.as_str()).collect();
        assert_eq!(words, vec!["a", "b", "c"]);

        let errors = filter_error_results(&results);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].error.starts_with("Line 3: "));
        assert!(!is_valid_parsed_result(&results[2]));
    }

    #[test]
    fn partition_matches_filters() {
        let results = parse_batch_file(&format!("x\n{}", batch_line("a", json!(1), "{}")));
        let (valid, errors) = partition_results(results.clone());
        assert_eq!(valid, filter_valid_results(&results));
        assert_eq!(errors, filter_error_results(&results));
    }

    #[test]
    fn detects_language_code() {
        assert_eq!(detect_language_from_filename("batch_words_fa.jsonl").as_deref(), Some("fa"));
        assert_eq!(detect_language_from_filename("output/batch_words_eng.jsonl").as_deref(), Some("en"));
        assert_eq!(detect_language_from_filename("batch_words_EN.jsonl"), None);
        assert_eq!(detect_language_from_filename("results.jsonl"), None);
    }

    #[test]
    fn results_serialize_without_variant_tag() {
        let err = ParsedLine::Failed(ParsedResultError {
            error: "Line 1: Invalid JSON syntax - x".to_string(),
            raw: "{".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"error": "Line 1: Invalid JSON syntax - x", "raw": "{"})
        );
    }
}
