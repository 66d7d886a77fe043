//! Tag endpoints

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::routes::parse_uuid;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BulkDeleteTagsRequest {
    pub ids: Vec<String>,
}

/// GET /api/tags
pub async fn list(
    State(state): State<AppState>,
    Query(options): Query<ListTagsOptions>,
) -> Result<Json<TagListResponse>> {
    let tags = state.db.list_tags(&options).await?;
    Ok(Json(TagListResponse {
        tags: tags.iter().map(DbTag::to_api_tag).collect(),
    }))
}

/// POST /api/tags
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(input): Json<CreateTagInput>,
) -> Result<Json<Tag>> {
    let tag = state.db.create_tag(&input, Some(auth.user_id)).await?;
    tracing::info!("Created tag '{}' ({})", tag.normalized_name, tag.id);
    Ok(Json(tag.to_api_tag()))
}

/// GET /api/tags/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Tag>> {
    let id = parse_uuid(&id, "tag")?;
    let tag = state
        .db
        .get_tag(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Tag {}", id)))?;
    Ok(Json(tag.to_api_tag()))
}

/// GET /api/tags/by-name/:name
pub async fn get_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Tag>> {
    let tag = state
        .db
        .get_tag_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Tag '{}'", name)))?;
    Ok(Json(tag.to_api_tag()))
}

/// PUT /api/tags/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTagInput>,
) -> Result<Json<Tag>> {
    let id = parse_uuid(&id, "tag")?;
    let tag = state
        .db
        .update_tag(id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Tag {}", id)))?;
    Ok(Json(tag.to_api_tag()))
}

/// DELETE /api/tags/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = parse_uuid(&id, "tag")?;
    let deleted = state.db.delete_tag(id).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Tag {}", id)));
    }
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

/// POST /api/tags/bulk-delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteTagsRequest>,
) -> Result<Json<serde_json::Value>> {
    let ids = request
        .ids
        .iter()
        .map(|id| parse_uuid(id, "tag"))
        .collect::<Result<Vec<_>>>()?;
    let deleted = state.db.delete_tags(&ids).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
