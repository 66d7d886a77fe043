//! Test fixtures and factory functions for creating test data.

use serde_json::json;
use uuid::Uuid;

/// Create a user register request body.
pub fn register_request(username: Option<&str>) -> serde_json::Value {
    match username {
        Some(n) => json!({ "username": n }),
        None => json!({}),
    }
}

/// Create a deck request body with a single answer language.
pub fn create_deck_request(name: &str, que_lang: &str, ans_lang: &str) -> serde_json::Value {
    json!({
        "name": name,
        "que_lang": que_lang,
        "ans_langs": [ans_lang],
        "diff_level": "intermediate"
    })
}

/// Create a tag request body.
pub fn create_tag_request(name: &str) -> serde_json::Value {
    json!({ "name": name })
}

/// Collocations in the shape stored on words.
pub fn sample_collocations(word: &str) -> serde_json::Value {
    json!({
        "V + Noun": [
            { "collocation": format!("{} fast", word), "difficulty": "beginner" },
            { "collocation": format!("{} away", word), "difficulty": "intermediate" }
        ],
        "Adj + Noun": [
            { "collocation": format!("quick {}", word), "difficulty": "advanced" }
        ]
    })
}

/// Create a word request body.
pub fn create_word_request(lemma: &str, lang: &str) -> serde_json::Value {
    json!({
        "lemma": lemma,
        "lang": lang,
        "collocations": sample_collocations(lemma)
    })
}

/// Create an add-word-to-deck request body.
pub fn add_word_request(word_id: &str) -> serde_json::Value {
    json!({ "word_id": word_id })
}

/// Create a submit-result request body.
pub fn submit_result_request(card_id: &str, difficulty: &str) -> serde_json::Value {
    json!({ "cardId": card_id, "difficulty": difficulty })
}

/// One line of batch job output, as returned by the batch API.
pub fn batch_output_line(word: &str, total_tokens: u64) -> String {
    json!({
        "custom_id": word,
        "response": {
            "status_code": 200,
            "body": {
                "usage": { "input_tokens": 120, "output_tokens": 80, "total_tokens": total_tokens },
                "output": [
                    { "type": "reasoning", "summary": [] },
                    { "type": "message", "content": [
                        { "type": "output_text", "text": sample_collocations(word).to_string() }
                    ]}
                ]
            }
        }
    })
    .to_string()
}

/// Batch output file with one valid line per word.
pub fn batch_output_file(words: &[String]) -> String {
    words
        .iter()
        .map(|word| batch_output_line(word, 200))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate a unique name to avoid collisions between test runs.
pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
}
