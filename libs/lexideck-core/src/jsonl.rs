//! Request file builder for the collocation batch job.
//!
//! Each line is one Responses API request asking the model for the
//! collocations of a single word.

use serde_json::{json, Value};

/// Batch request settings.
pub struct BatchConfig;

impl BatchConfig {
    pub const MODEL: &'static str = "gpt-5";
    pub const API_URL: &'static str = "/v1/responses";
    pub const FORMAT_TYPE: &'static str = "json_schema";
    pub const FORMAT_NAME: &'static str = "collocation_patterns";
    pub const FORMAT_STRICT: bool = false;
    pub const REASONING_EFFORT: &'static str = "minimal";
    pub const VERBOSITY: &'static str = "high";
    pub const STORE: bool = false;
    pub const INCLUDE: [&'static str; 2] =
        ["reasoning.encrypted_content", "web_search_call.action.sources"];
}

/// Difficulty labels the model may assign to a collocation.
pub const COLLOCATION_DIFFICULTY_LEVELS: [&str; 6] = [
    "beginner",
    "elementary",
    "intermediate",
    "upper-intermediate",
    "advanced",
    "fluent",
];

pub const COLLOCATION_PATTERN_KEYS: &str =
    "^(Verb Phrase|Noun Phrase|Adverbial Phrase|Adjective Phrase)$";

/// JSON schema the model output must follow.
pub fn collocation_schema() -> Value {
    json!({
        "type": "object",
        "patternProperties": {
            COLLOCATION_PATTERN_KEYS: {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "collocation": { "type": "string", "maxLength": 50 },
                        "difficulty": { "type": "string", "enum": COLLOCATION_DIFFICULTY_LEVELS }
                    },
                    "required": ["collocation", "difficulty"],
                    "additionalProperties": false
                }
            }
        },
        "additionalProperties": false,
        "properties": {},
        "required": []
    })
}

/// Prompt asking for the collocations of `word` in `language_name`.
pub fn collocation_prompt(word: &str, language_name: &str) -> String {
    format!(
        r#"# Role
You are a linguistic expert specializing in collocations and natural language usage for language learning students.

# Goal
List as many simple and common collocations as you can for the word ({word}) in {language_name}. Exclude rare/archaic items.

# Strict Form
Use the given word exactly as written. No inflections, no prefixes/suffixes, no nominalizations/verbalisations, no derivatives.

# Guidelines
- Coverage: for each pattern, return as many beginner, elementary and common collocations as possible, maximum 12 collocations; prioritize beginner and elementary ones.
- Cover all the 4 patterns. Return empty if no collocation was possible for a pattern.
- Each collocation should be unique in the message. Remove duplicates across patterns.
- Always return some response. Don't return empty output.

# Phrase Pattern inventory (keys)
1. Noun Phrase: Det/Num + Adj + N; N + Adj; N + N; Poss + N; N + PP/Case; etc.
2. Verb Phrase: S + V + O; V + Adv; V + Obj + PP; Aux + V; (Serial V if typologically normal); etc.
3. Adjective Phrase: Adv + Adj; Adj + PP; simple comparative/superlative; etc.
4. Adverbial Phrase: Adv + Adv; Adv + PP; common time/place adverbials; etc.

# Difficulty Levels
Label each collocation with one of: {levels}.

## Example for the word (run)
{{
  "Verb Phrase": [
    {{"collocation": "run a business", "difficulty": "upper-intermediate"}}, ...
  ],
  "Adverbial Phrase": [
    {{"collocation": "run quickly", "difficulty": "elementary"}}, ...
  ], ...
}}"#,
        levels = COLLOCATION_DIFFICULTY_LEVELS.join(", "),
    )
}

/// One batch request line for `word`.
pub fn build_batch_request(word: &str, language_name: &str) -> Value {
    json!({
        "custom_id": word,
        "method": "POST",
        "url": BatchConfig::API_URL,
        "body": {
            "model": BatchConfig::MODEL,
            "input": [{
                "role": "user",
                "content": [{ "type": "input_text", "text": collocation_prompt(word, language_name) }]
            }],
            "text": {
                "format": {
                    "type": BatchConfig::FORMAT_TYPE,
                    "name": BatchConfig::FORMAT_NAME,
                    "strict": BatchConfig::FORMAT_STRICT,
                    "schema": collocation_schema()
                },
                "verbosity": BatchConfig::VERBOSITY
            },
            "reasoning": { "effort": BatchConfig::REASONING_EFFORT, "summary": null },
            "tools": [],
            "store": BatchConfig::STORE,
            "include": BatchConfig::INCLUDE
        }
    })
}

/// Split a newline-separated word list, dropping blank entries.
pub fn split_word_list(list: &str) -> Vec<String> {
    list.split('\n')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// JSONL request file for `words`, one request per line.
pub fn generate_jsonl_content<S: AsRef<str>>(words: &[S], language_name: &str) -> String {
    words
        .iter()
        .map(|word| build_batch_request(word.as_ref(), language_name).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Number of non-blank lines.
pub fn get_jsonl_line_count(content: &str) -> usize {
    content.split('\n').filter(|line| !line.trim().is_empty()).count()
}

/// Conventional request file name; the language code survives the round trip
/// through the batch job.
pub fn batch_file_name(lang: &str) -> String {
    format!("batch_words_{}.jsonl", lang)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::detect_language_from_filename;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_count_ignores_blank_lines() {
        assert_eq!(get_jsonl_line_count("a\nb\n\n  \nc"), 3);
        assert_eq!(get_jsonl_line_count(""), 0);
        assert_eq!(get_jsonl_line_count("\n\n"), 0);
    }

    #[test]
    fn request_carries_word_and_settings() {
        let request = build_batch_request("run", "English");
        assert_eq!(request["custom_id"], "run");
        assert_eq!(request["method"], "POST");
        assert_eq!(request["url"], "/v1/responses");
        assert_eq!(request["body"]["model"], "gpt-5");
        assert_eq!(request["body"]["store"], false);
        assert_eq!(request["body"]["text"]["format"]["name"], "collocation_patterns");
        assert_eq!(request["body"]["reasoning"]["effort"], "minimal");
        assert!(request["body"]["reasoning"]["summary"].is_null());

        let text = request["body"]["input"][0]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("for the word (run) in English"));
    }

    #[test]
    fn schema_limits_difficulty_values() {
        let schema = collocation_schema();
        let item = &schema["patternProperties"][COLLOCATION_PATTERN_KEYS]["items"];
        assert_eq!(item["properties"]["collocation"]["maxLength"], 50);
        assert_eq!(item["properties"]["difficulty"]["enum"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn generated_file_has_one_line_per_word() {
        let words = split_word_list("run\n\n  walk \n");
        assert_eq!(words, vec!["run", "walk"]);

        let content = generate_jsonl_content(&words, "English");
        assert_eq!(get_jsonl_line_count(&content), 2);
        let first: Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(first["custom_id"], "run");
    }

    #[test]
    fn file_name_round_trips_language() {
        let name = batch_file_name("ja");
        assert_eq!(name, "batch_words_ja.jsonl");
        assert_eq!(detect_language_from_filename(&name).as_deref(), Some("ja"));
    }
}
