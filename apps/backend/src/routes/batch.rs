//! Batch collocation jobs: building request files and ingesting their output

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use lexideck_core::jsonl::{batch_file_name, generate_jsonl_content, split_word_list};
use lexideck_core::languages::{require_language, Language};
use lexideck_core::{detect_language_from_filename, parse_batch_file, partition_results};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

const JSONL_CONTENT_TYPE: &str = "application/jsonl";

/// Language for an uploaded file: explicit `lang` wins over the filename
fn resolve_language(request: &BatchFileRequest) -> Option<String> {
    request
        .lang
        .as_deref()
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
        .or_else(|| {
            request
                .filename
                .as_deref()
                .and_then(detect_language_from_filename)
        })
}

/// Supported language for a request file; the code ends up in the file name
fn request_language(lang: &str) -> Result<&'static Language> {
    let lang = lang.trim();
    if lang.is_empty() {
        return Err(ApiError::BadRequest("lang is required".to_string()));
    }
    Ok(require_language(lang)?)
}

/// POST /api/batch/parse
/// Parses a batch output file without touching the word store
pub async fn parse(Json(request): Json<BatchFileRequest>) -> Result<Json<BatchParseResponse>> {
    let detected_language = resolve_language(&request);
    let results = parse_batch_file(&request.content);
    let total = results.len();
    let (valid, errors) = partition_results(results);

    tracing::info!(
        "Parsed batch file {:?}: {} lines, {} valid, {} errors",
        request.filename,
        total,
        valid.len(),
        errors.len()
    );

    Ok(Json(BatchParseResponse {
        detected_language,
        total,
        valid,
        errors,
    }))
}

/// POST /api/batch/import
/// Parses a batch output file and upserts every valid word
pub async fn import(
    State(state): State<AppState>,
    Json(request): Json<BatchFileRequest>,
) -> Result<Json<BatchImportResponse>> {
    let lang = resolve_language(&request).ok_or_else(|| {
        ApiError::BadRequest(
            "Language could not be detected; pass lang or a batch_words_xx filename".to_string(),
        )
    })?;

    let (valid, errors) = partition_results(parse_batch_file(&request.content));
    let inputs: Vec<CreateWordInput> = valid
        .into_iter()
        .map(|result| CreateWordInput {
            lemma: result.word,
            lang: lang.clone(),
            collocations: result.collocations,
        })
        .collect();

    let words = state.db.bulk_upsert_words(&inputs).await?;

    tracing::info!(
        "Imported {} words for {} ({} lines rejected)",
        words.len(),
        lang,
        errors.len()
    );

    Ok(Json(BatchImportResponse {
        lang,
        imported: words.len(),
        words: words.iter().map(DbWord::to_api_word).collect(),
        errors,
    }))
}

/// POST /api/batch/requests
/// Returns a JSONL request file for the given word list
pub async fn requests(Json(request): Json<BatchRequestsRequest>) -> Result<Response> {
    let language = request_language(&request.lang)?;

    let words = split_word_list(&request.words);
    if words.is_empty() {
        return Err(ApiError::BadRequest("Word list is empty".to_string()));
    }

    let content = generate_jsonl_content(&words, language.name);
    let disposition = format!(
        "attachment; filename=\"{}\"",
        batch_file_name(language.code)
    );

    Ok((
        [
            (header::CONTENT_TYPE, JSONL_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response())
}
