//! Deck endpoints

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;

use lexideck_core::types::AddWordToDeckInput;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::routes::parse_uuid;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

/// Fetch a deck the caller owns, or 404
async fn owned_deck(state: &AppState, auth: &AuthenticatedUser, id: &str) -> Result<DbDeck> {
    state
        .db
        .get_deck(auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Deck {}", id)))
}

/// GET /api/decks
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(options): Query<ListDecksOptions>,
) -> Result<Json<DeckListResponse>> {
    let decks = state.db.list_decks(auth.user_id, &options).await?;
    let total = state.db.count_decks(auth.user_id).await?;
    Ok(Json(DeckListResponse {
        decks: decks.iter().map(DbDeck::to_api_deck).collect(),
        total,
    }))
}

/// POST /api/decks
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(input): Json<CreateDeckInput>,
) -> Result<Json<Deck>> {
    let deck = state.db.create_deck(auth.user_id, &input).await?;
    tracing::info!("Created deck {} for user {}", deck.id, auth.user_id);
    Ok(Json(deck.to_api_deck()))
}

/// GET /api/decks/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<Deck>> {
    let deck = owned_deck(&state, &auth, &id).await?;
    Ok(Json(deck.to_api_deck()))
}

/// PUT /api/decks/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(input): Json<UpdateDeckInput>,
) -> Result<Json<Deck>> {
    let deck = state
        .db
        .update_deck(auth.user_id, &id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Deck {}", id)))?;
    Ok(Json(deck.to_api_deck()))
}

/// DELETE /api/decks/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let deleted = state.db.delete_deck(auth.user_id, &id).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Deck {}", id)));
    }
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

/// POST /api/decks/bulk-delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<Json<serde_json::Value>> {
    let deleted = state.db.delete_decks(auth.user_id, &request.ids).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

/// GET /api/decks/:id/words
pub async fn list_words(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Query(options): Query<ListDeckWordsOptions>,
) -> Result<Json<DeckWordListResponse>> {
    owned_deck(&state, &auth, &id).await?;
    let deck_words = state.db.list_deck_words(&id, &options).await?;
    let total = state.db.count_deck_words(&id).await?;
    Ok(Json(DeckWordListResponse {
        deck_words: deck_words.iter().map(DbDeckWord::to_api_deck_word).collect(),
        total,
    }))
}

/// POST /api/decks/:id/words
pub async fn add_word(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(input): Json<AddWordToDeckInput>,
) -> Result<Json<DeckWord>> {
    owned_deck(&state, &auth, &id).await?;
    let word_id = parse_uuid(&input.word_id, "word")?;
    state
        .db
        .get_word(word_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Word {}", word_id)))?;

    let deck_word = state.db.add_word_to_deck(&id, word_id, &input).await?;
    Ok(Json(deck_word.to_api_deck_word()))
}

/// DELETE /api/decks/:id/words/:word_id
pub async fn remove_word(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path((id, word_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>> {
    owned_deck(&state, &auth, &id).await?;
    let word_id = parse_uuid(&word_id, "word")?;
    let deleted = state.db.remove_word_from_deck(&id, word_id).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

/// GET /api/decks/:id/due
pub async fn due(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Query(query): Query<DueCardsQuery>,
) -> Result<Json<DueCardsResponse>> {
    owned_deck(&state, &auth, &id).await?;

    let now = Utc::now();
    let cards = state.db.get_due_cards(&id, now, query.limit).await?;
    let total_due = state.db.count_due_cards(&id, now).await?;

    Ok(Json(DueCardsResponse {
        next_review: cards.first().map(|c| c.due),
        cards: cards.iter().map(DbDeckWord::to_api_deck_word).collect(),
        total_due: total_due as usize,
    }))
}
