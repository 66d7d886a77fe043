//! Client for the external AI API (OpenAI Responses API): answer grading
//! and question generation.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use lexideck_core::render_prompt;

use crate::config::AiConfig;
use crate::error::ApiError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const RESPONSES_PATH: &str = "/v1/responses";

/// AI client errors.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("AI backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("AI response contained no text output")]
    EmptyOutput,
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

/// Values substituted into a review prompt template.
#[derive(Debug, Clone, Default)]
pub struct ReviewPromptInput<'a> {
    pub question_language: &'a str,
    pub answer_languages: &'a str,
    pub word_lemma: &'a str,
    pub difficulty: &'a str,
    pub question: &'a str,
    pub user_answer: &'a str,
    pub expected_answer: &'a str,
}

/// Fill a review template with the answer under review.
pub fn build_review_prompt(template: &str, input: &ReviewPromptInput<'_>) -> String {
    render_prompt(
        template,
        &[
            ("question_language", input.question_language),
            ("answer_languages", input.answer_languages),
            ("word_lemma", input.word_lemma),
            ("difficulty", input.difficulty),
            ("question", input.question),
            ("user_answer", input.user_answer),
            ("expected_answer", input.expected_answer),
        ],
    )
}

/// Request body for a free-text reply (grading, translation).
pub fn build_text_request(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "input": [{
            "role": "user",
            "content": [{ "type": "input_text", "text": prompt }]
        }],
        "text": { "format": { "type": "text" }, "verbosity": "medium" },
        "reasoning": { "effort": "low", "summary": null },
        "tools": [],
        "store": false,
        "include": ["reasoning.encrypted_content"]
    })
}

/// Request body for a reply constrained to the JSON `schema`.
pub fn build_structured_request(model: &str, prompt: &str, name: &str, schema: Value) -> Value {
    json!({
        "model": model,
        "input": [{
            "role": "user",
            "content": [{ "type": "input_text", "text": prompt }]
        }],
        "text": {
            "format": { "type": "json_schema", "name": name, "strict": false, "schema": schema },
            "verbosity": "high"
        },
        "reasoning": { "effort": "minimal", "summary": null },
        "store": false
    })
}

fn string_list_schema(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "string" }, "description": description })
}

/// Schema for a full question card.
pub fn question_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "question": { "type": "string", "description": "The question for the user to answer" },
            "answer": { "type": "string", "description": "The expected answer to the question" },
            "hints": string_list_schema("Helpful hints for answering the question")
        },
        "required": ["question", "answer", "hints"],
        "additionalProperties": false
    })
}

/// Schema for a single answer sentence.
pub fn answer_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "answer": { "type": "string", "description": "A natural sentence that uses the target word" }
        },
        "required": ["answer"],
        "additionalProperties": false
    })
}

/// Schema for vocabulary hints.
pub fn hints_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "hints": string_list_schema("Hints for the words in the sentence other than the target word")
        },
        "required": ["hints"],
        "additionalProperties": false
    })
}

/// Concatenate every `output_text` part of a Responses API reply.
pub fn extract_output_text(response: &Value) -> Option<String> {
    if let Some(text) = response.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let text: String = response
        .get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Decode a structured reply.
pub fn decode_structured<T: DeserializeOwned>(text: &str) -> Result<T, AiError> {
    serde_json::from_str(text.trim()).map_err(|e| AiError::Parse(e.to_string()))
}

/// Thin wrapper over the Responses API.
pub struct AiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AiClient {
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.review_model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a grading prompt and return the model's text reply.
    pub async fn review_answer(&self, prompt: &str) -> Result<String, AiError> {
        self.respond(&build_text_request(&self.model, prompt)).await
    }

    /// Send a translation prompt and return the translated text.
    pub async fn translate(&self, prompt: &str) -> Result<String, AiError> {
        self.respond(&build_text_request(&self.model, prompt)).await
    }

    /// Send a prompt whose reply must match `schema` and decode it.
    pub async fn generate<T: DeserializeOwned>(
        &self,
        prompt: &str,
        name: &str,
        schema: Value,
    ) -> Result<T, AiError> {
        let request = build_structured_request(&self.model, prompt, name, schema);
        let text = self.respond(&request).await?;
        decode_structured(&text)
    }

    async fn respond(&self, request: &Value) -> Result<String, AiError> {
        let url = format!("{}{}", self.base_url, RESPONSES_PATH);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(AiError::Backend { status, message });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;

        extract_output_text(&body).ok_or(AiError::EmptyOutput)
    }
}
