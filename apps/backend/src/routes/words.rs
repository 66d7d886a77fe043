//! Word endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use lexideck_core::languages::LANGUAGES;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::parse_uuid;
use crate::AppState;

/// GET /api/words
pub async fn list(
    State(state): State<AppState>,
    Query(options): Query<ListWordsOptions>,
) -> Result<Json<WordListResponse>> {
    let words = state.db.list_words(&options).await?;
    Ok(Json(WordListResponse {
        words: words.iter().map(DbWord::to_api_word).collect(),
    }))
}

/// POST /api/words
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateWordInput>,
) -> Result<Json<Word>> {
    if input.lemma.trim().is_empty() || input.lang.trim().is_empty() {
        return Err(ApiError::BadRequest("lemma and lang are required".to_string()));
    }
    let word = state.db.create_word(&input).await?;
    Ok(Json(word.to_api_word()))
}

/// GET /api/words/search?q=...&lang=...&limit=...
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<WordSearchQuery>,
) -> Result<Json<WordListResponse>> {
    let words = state
        .db
        .search_words(query.q.trim(), query.lang.as_deref(), query.limit)
        .await?;
    Ok(Json(WordListResponse {
        words: words.iter().map(DbWord::to_api_word).collect(),
    }))
}

/// GET /api/words/languages
pub async fn languages(State(state): State<AppState>) -> Result<Json<LanguageListResponse>> {
    let languages = state.db.get_available_languages().await?;
    Ok(Json(LanguageListResponse { languages }))
}

/// GET /api/languages
pub async fn supported_languages() -> Json<SupportedLanguagesResponse> {
    Json(SupportedLanguagesResponse {
        languages: &LANGUAGES,
    })
}

/// GET /api/words/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Word>> {
    let id = parse_uuid(&id, "word")?;
    let word = state
        .db
        .get_word(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Word {}", id)))?;
    Ok(Json(word.to_api_word()))
}

/// PUT /api/words/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateWordInput>,
) -> Result<Json<Word>> {
    let id = parse_uuid(&id, "word")?;
    let word = state
        .db
        .update_word(id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Word {}", id)))?;
    Ok(Json(word.to_api_word()))
}

/// DELETE /api/words/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = parse_uuid(&id, "word")?;
    let deleted = state.db.delete_word(id).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Word {}", id)));
    }
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
