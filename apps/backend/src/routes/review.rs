//! Review endpoints: difficulty options, scheduling, AI question generation
//! and answer grading

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use lexideck_core::languages::language_name;
use lexideck_core::prompts::{DEFAULT_QUESTION_PROMPT, DEFAULT_REVIEW_PROMPT};
use lexideck_core::{PromptContext, DIFFICULTY_OPTIONS};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::routes::parse_uuid;
use crate::services::ai::{
    answer_schema, build_review_prompt, hints_schema, question_schema, AiClient, ReviewPromptInput,
};
use crate::AppState;

/// Answer language used when a deck lists none
const FALLBACK_ANSWER_LANGUAGE: &str = "English";

const PLAIN_TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

fn require_ai(state: &AppState) -> Result<&Arc<AiClient>> {
    state
        .ai
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("AI review is not configured".to_string()))
}

/// English names of `codes`, joined with `separator`. Unknown codes pass through.
fn language_names(codes: &[String], separator: &str) -> Result<String> {
    if codes.is_empty() {
        return Err(ApiError::BadRequest(
            "No answer languages provided".to_string(),
        ));
    }
    Ok(codes
        .iter()
        .map(|code| language_name(code))
        .collect::<Vec<_>>()
        .join(separator))
}

async fn load_deck(state: &AppState, user_id: Uuid, deck_id: &str) -> Result<Deck> {
    Ok(state
        .db
        .get_deck(user_id, deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Deck {}", deck_id)))?
        .to_api_deck())
}

async fn load_word(state: &AppState, word_id: &str) -> Result<Word> {
    let id = parse_uuid(word_id, "word")?;
    Ok(state
        .db
        .get_word(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Word not found".to_string()))?
        .to_api_word())
}

/// GET /api/review/difficulty-options
pub async fn difficulty_options() -> Json<DifficultyOptionsResponse> {
    Json(DifficultyOptionsResponse {
        options: &DIFFICULTY_OPTIONS,
    })
}

/// POST /api/review/submit-result
/// Schedules the next review of a card from the learner's verdict
pub async fn submit_result(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<SubmitResultRequest>,
) -> Result<Json<SubmitResultResponse>> {
    let difficulty = payload.difficulty()?;
    let card_id = parse_uuid(&payload.card_id, "card")?;

    let card = state
        .db
        .get_deck_word_for_user(card_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

    let current = card.to_api_deck_word().card_state();
    let result = state.algorithm.schedule(&current, difficulty, Utc::now());

    let updated = state
        .db
        .update_deck_word_schedule(card.id, &result.new_state)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

    tracing::info!(
        "Card {} reviewed as {}: state {} -> {}, next review in {} days",
        card.id,
        difficulty,
        card.state,
        updated.state,
        result.scheduled_days
    );

    Ok(Json(SubmitResultResponse {
        success: true,
        card_id: updated.id,
        new_state: updated.state,
        new_stability: updated.stability,
        new_difficulty: updated.difficulty,
        next_due_date: updated.due,
        scheduled_days: result.scheduled_days,
        message: format!(
            "Card updated successfully. Next review in {} days.",
            result.scheduled_days
        ),
    }))
}

/// POST /api/review/submit-answer
/// Grades a free-text answer with the AI service
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>> {
    if payload.question.trim().is_empty()
        || payload.user_answer.trim().is_empty()
        || payload.word_lemma.trim().is_empty()
    {
        return Err(ApiError::BadRequest(
            "Missing required fields: question, userAnswer, and wordLemma".to_string(),
        ));
    }

    let ai = require_ai(&state)?;

    let (template, question_language, answer_languages) = match payload.deck_id.as_deref() {
        Some(deck_id) => {
            let deck = load_deck(&state, auth.user_id, deck_id).await?;
            let answer_languages = deck
                .ans_langs
                .iter()
                .take(2)
                .map(|code| language_name(code))
                .collect::<Vec<_>>()
                .join(" and ");
            (
                deck.ai_prompts.review,
                language_name(&deck.que_lang),
                answer_languages,
            )
        }
        None => (
            DEFAULT_REVIEW_PROMPT.to_string(),
            "language".to_string(),
            String::new(),
        ),
    };
    let answer_languages = if answer_languages.is_empty() {
        FALLBACK_ANSWER_LANGUAGE.to_string()
    } else {
        answer_languages
    };

    let prompt = build_review_prompt(
        &template,
        &ReviewPromptInput {
            question_language: &question_language,
            answer_languages: &answer_languages,
            word_lemma: payload.word_lemma.trim(),
            difficulty: payload.difficulty.as_deref().unwrap_or_default(),
            question: payload.question.trim(),
            user_answer: payload.user_answer.trim(),
            expected_answer: payload.expected_answer.as_deref().unwrap_or_default(),
        },
    );

    let review = ai.review_answer(&prompt).await.map_err(|e| {
        tracing::warn!("AI review failed for '{}': {}", payload.word_lemma, e);
        ApiError::from(e)
    })?;

    Ok(Json(SubmitAnswerResponse { review }))
}

/// POST /api/review/generate-question
/// Question, answer and hints for a word in one call
pub async fn generate_question(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<GenerateQuestionRequest>,
) -> Result<Json<QuestionResponse>> {
    let word = payload.word.trim();
    if word.is_empty() || payload.question_language.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Missing required fields: word and questionLanguage".to_string(),
        ));
    }
    let answer_languages = language_names(&payload.answer_languages, ", ")?;

    let template = match payload.deck_id.as_deref() {
        Some(deck_id) => load_deck(&state, auth.user_id, deck_id).await?.ai_prompts.question,
        None => DEFAULT_QUESTION_PROMPT.to_string(),
    };

    let ai = require_ai(&state)?;
    let question_language = language_name(payload.question_language.trim());
    let prompt = PromptContext {
        question_language: &question_language,
        answer_languages: &answer_languages,
        word,
        collocation: payload.collocation.as_deref().unwrap_or_default(),
        difficulty: payload.difficulty.as_deref().unwrap_or_default(),
        answer_sentence: "",
    }
    .render(&template);

    let question: QuestionResponse = ai
        .generate(&prompt, "question_response", question_schema())
        .await
        .map_err(|e| {
            tracing::warn!("Question generation failed for '{}': {}", word, e);
            ApiError::from(e)
        })?;

    Ok(Json(question))
}

/// POST /api/review/generate-answer
/// Answer sentence for a deck word, from the deck's answer template
pub async fn generate_answer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<GenerateAnswerRequest>,
) -> Result<Json<AnswerResponse>> {
    if payload.deck_id.trim().is_empty() || payload.word_id.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Missing required fields: deckId and wordId".to_string(),
        ));
    }

    let deck = load_deck(&state, auth.user_id, payload.deck_id.trim()).await?;
    let word = load_word(&state, payload.word_id.trim()).await?;

    let ai = require_ai(&state)?;
    let question_language = language_name(&deck.que_lang);
    let prompt = PromptContext {
        question_language: &question_language,
        word: &word.lemma,
        collocation: payload.collocation.as_deref().unwrap_or_default(),
        difficulty: deck.diff_level.as_str(),
        ..Default::default()
    }
    .render(&deck.ai_prompts.answer_generation);

    let answer: AnswerResponse = ai
        .generate(&prompt, "answer_response", answer_schema())
        .await
        .map_err(|e| {
            tracing::warn!("Answer generation failed for '{}': {}", word.lemma, e);
            ApiError::from(e)
        })?;

    Ok(Json(answer))
}

/// POST /api/review/generate-hints
/// Vocabulary hints for every word of the answer sentence except the target
pub async fn generate_hints(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<GenerateHintsRequest>,
) -> Result<Json<HintsResponse>> {
    if payload.deck_id.trim().is_empty()
        || payload.word_id.trim().is_empty()
        || payload.answer_sentence.trim().is_empty()
    {
        return Err(ApiError::BadRequest(
            "Missing required fields: deckId, wordId, and answerSentence".to_string(),
        ));
    }

    let deck = load_deck(&state, auth.user_id, payload.deck_id.trim()).await?;
    let word = load_word(&state, payload.word_id.trim()).await?;
    let answer_languages = language_names(&deck.ans_langs, " and ")?;

    let ai = require_ai(&state)?;
    let question_language = language_name(&deck.que_lang);
    let prompt = PromptContext {
        question_language: &question_language,
        answer_languages: &answer_languages,
        word: &word.lemma,
        answer_sentence: payload.answer_sentence.trim(),
        ..Default::default()
    }
    .render(&deck.ai_prompts.hints_generation);

    let hints: HintsResponse = ai
        .generate(&prompt, "hints_response", hints_schema())
        .await
        .map_err(|e| {
            tracing::warn!("Hint generation failed for '{}': {}", word.lemma, e);
            ApiError::from(e)
        })?;

    Ok(Json(hints))
}

/// POST /api/review/generate-question-translation
/// Translates the answer sentence into the deck's answer languages; plain text
pub async fn generate_question_translation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<GenerateTranslationRequest>,
) -> Result<Response> {
    if payload.deck_id.trim().is_empty() || payload.answer_sentence.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Missing required fields: deckId and answerSentence".to_string(),
        ));
    }

    let deck = load_deck(&state, auth.user_id, payload.deck_id.trim()).await?;
    let answer_languages = language_names(&deck.ans_langs, " and ")?;

    let ai = require_ai(&state)?;
    let question_language = language_name(&deck.que_lang);
    let prompt = PromptContext {
        question_language: &question_language,
        answer_languages: &answer_languages,
        answer_sentence: payload.answer_sentence.trim(),
        ..Default::default()
    }
    .render(&deck.ai_prompts.question_translation);

    let translation = ai.translate(&prompt).await.map_err(|e| {
        tracing::warn!("Translation failed for deck {}: {}", deck.id, e);
        ApiError::from(e)
    })?;

    Ok(([(header::CONTENT_TYPE, PLAIN_TEXT_CONTENT_TYPE)], translation).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_names() {
        let codes = vec!["en".to_string(), "fa".to_string(), "xx".to_string()];
        assert_eq!(language_names(&codes, " and ").unwrap(), "English and Persian and xx");
        assert_eq!(language_names(&codes[..2], ", ").unwrap(), "English, Persian");

        let err = language_names(&[], ", ").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(err.to_string(), "Bad request: No answer languages provided");
    }
}
