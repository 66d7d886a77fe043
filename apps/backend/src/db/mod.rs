//! PostgreSQL database operations

use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use uuid::Uuid;

use lexideck_core::collocations::merge_collocations;
use lexideck_core::normalize::normalize_name;
use lexideck_core::types::{AddWordToDeckInput, CardState, CardStatus, DeckWordOrder};
use lexideck_core::{handle_single_query_error, CoreError, DataAccessError, QueryError};

use crate::error::{ApiError, Result};
use crate::models::*;

/// Characters used in deck ids
const DECK_ID_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
const DECK_ID_LEN: usize = 11;

const DEFAULT_WORD_LIST_LIMIT: i64 = 50;
const DEFAULT_WORD_SEARCH_LIMIT: i64 = 20;

/// SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Generate an 11-character URL-safe deck id
pub fn generate_deck_id() -> String {
    let mut rng = rand::rng();
    (0..DECK_ID_LEN)
        .map(|_| DECK_ID_ALPHABET[rng.random_range(0..DECK_ID_ALPHABET.len())] as char)
        .collect()
}

/// Collocations to write for an upserted word, merged into the existing row.
///
/// `None` when the existing row's collocations cannot be decoded.
pub fn upsert_collocations(
    existing: Option<&DbWord>,
    input: &CreateWordInput,
) -> Option<CollocationsPattern> {
    let Some(word) = existing else {
        return Some(input.collocations.clone());
    };
    match word.collocations() {
        Ok(stored) => Some(merge_collocations(&stored, &input.collocations)),
        Err(err) => {
            tracing::warn!(
                "Skipping merge into word {} ({}/{}): malformed collocations: {}",
                word.id,
                word.lemma,
                word.lang,
                err
            );
            None
        }
    }
}

/// Describe a sqlx failure in store terms
pub fn to_query_error(err: &sqlx::Error) -> QueryError {
    match err {
        sqlx::Error::RowNotFound => QueryError::not_found(),
        sqlx::Error::Database(db_err) => QueryError::new(db_err.code().as_deref(), db_err.message()),
        other => QueryError::new(None, other.to_string()),
    }
}

/// Resolve a point lookup: no row is `None`, anything else fails with `context`.
fn single_row<T>(result: std::result::Result<T, sqlx::Error>, context: &str) -> Result<Option<T>> {
    match result {
        Ok(row) => Ok(Some(row)),
        Err(err) => Ok(handle_single_query_error(&to_query_error(&err), context)?),
    }
}

/// Attach `context` to a failed query
fn failed(context: &'static str) -> impl FnOnce(sqlx::Error) -> ApiError {
    move |err| DataAccessError::new(context, to_query_error(&err).message).into()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    to_query_error(err).code.as_deref() == Some(UNIQUE_VIOLATION)
}

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Build a pool that connects on first use
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === User Repository ===

    /// Create a new user with generated token
    pub async fn create_user(&self, username: Option<&str>) -> Result<User> {
        let token = Uuid::new_v4().to_string();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (token, username)
            VALUES ($1, $2)
            RETURNING id, token, username, mother_tongues, target_languages, prompts,
                      is_admin, created_at, updated_at, last_seen_at
            "#,
        )
        .bind(&token)
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(failed("Failed to create user"))?;

        Ok(user)
    }

    /// Get user by token
    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            r#"
            SELECT id, token, username, mother_tongues, target_languages, prompts,
                   is_admin, created_at, updated_at, last_seen_at
            FROM users
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await;

        single_row(result, "Failed to get user")
    }

    /// Update profile fields; `None` fields keep their value
    pub async fn update_user_profile(
        &self,
        user_id: Uuid,
        input: &UpdateProfileInput,
    ) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                mother_tongues = COALESCE($3, mother_tongues),
                target_languages = COALESCE($4, target_languages),
                prompts = COALESCE($5, prompts),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, token, username, mother_tongues, target_languages, prompts,
                      is_admin, created_at, updated_at, last_seen_at
            "#,
        )
        .bind(user_id)
        .bind(input.username.as_deref())
        .bind(input.mother_tongues.as_ref().map(Json))
        .bind(input.target_languages.as_ref().map(Json))
        .bind(input.prompts.as_ref().map(Json))
        .fetch_one(&self.pool)
        .await;

        single_row(result, "Failed to update user profile")
    }

    /// Update user last_seen_at timestamp
    pub async fn update_last_seen(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_seen_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(failed("Failed to update user"))?;

        Ok(())
    }

    // === Deck Repository ===

    /// Create a deck owned by `user_id`
    pub async fn create_deck(&self, user_id: Uuid, input: &CreateDeckInput) -> Result<DbDeck> {
        input.validate()?;

        let ai_prompts = input.ai_prompts.clone().unwrap_or_default();
        let deck = sqlx::query_as::<_, DbDeck>(
            r#"
            INSERT INTO decks (id, user_id, name, que_lang, ans_langs, diff_level, ai_prompts)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, name, que_lang, ans_langs, diff_level, ai_prompts,
                      created_at, updated_at
            "#,
        )
        .bind(generate_deck_id())
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.que_lang)
        .bind(Json(&input.ans_langs))
        .bind(input.diff_level.as_str())
        .bind(Json(&ai_prompts))
        .fetch_one(&self.pool)
        .await
        .map_err(failed("Failed to create deck"))?;

        Ok(deck)
    }

    /// Get a deck by id, scoped to its owner
    pub async fn get_deck(&self, user_id: Uuid, id: &str) -> Result<Option<DbDeck>> {
        let result = sqlx::query_as::<_, DbDeck>(
            r#"
            SELECT id, user_id, name, que_lang, ans_langs, diff_level, ai_prompts,
                   created_at, updated_at
            FROM decks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;

        single_row(result, "Failed to get deck")
    }

    /// List a user's decks, newest first
    pub async fn list_decks(&self, user_id: Uuid, options: &ListDecksOptions) -> Result<Vec<DbDeck>> {
        let decks = sqlx::query_as::<_, DbDeck>(
            r#"
            SELECT id, user_id, name, que_lang, ans_langs, diff_level, ai_prompts,
                   created_at, updated_at
            FROM decks
            WHERE user_id = $1
              AND ($2::text IS NULL OR que_lang = $2)
              AND ($3::text IS NULL OR diff_level = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(user_id)
        .bind(options.que_lang.as_deref())
        .bind(options.diff_level.map(|level| level.as_str()))
        .bind(options.limit)
        .bind(options.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await
        .map_err(failed("Failed to list decks"))?;

        Ok(decks)
    }

    /// Count a user's decks
    pub async fn count_decks(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM decks WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(failed("Failed to count decks"))?;

        Ok(count)
    }

    /// Update a deck. Absent fields are left unchanged.
    pub async fn update_deck(
        &self,
        user_id: Uuid,
        id: &str,
        input: &UpdateDeckInput,
    ) -> Result<Option<DbDeck>> {
        input.validate()?;

        let result = sqlx::query_as::<_, DbDeck>(
            r#"
            UPDATE decks
            SET name = COALESCE($3, name),
                que_lang = COALESCE($4, que_lang),
                ans_langs = COALESCE($5, ans_langs),
                diff_level = COALESCE($6, diff_level),
                ai_prompts = COALESCE($7, ai_prompts),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, que_lang, ans_langs, diff_level, ai_prompts,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(input.name.as_deref())
        .bind(input.que_lang.as_deref())
        .bind(input.ans_langs.as_ref().map(Json))
        .bind(input.diff_level.map(|level| level.as_str()))
        .bind(input.ai_prompts.as_ref().map(Json))
        .fetch_one(&self.pool)
        .await;

        single_row(result, "Failed to update deck")
    }

    /// Delete a deck. Returns false if it did not exist.
    pub async fn delete_deck(&self, user_id: Uuid, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM decks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(failed("Failed to delete deck"))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete several decks at once
    pub async fn delete_decks(&self, user_id: Uuid, ids: &[String]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM decks WHERE id = ANY($1) AND user_id = $2")
            .bind(ids)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(failed("Failed to delete decks"))?;

        Ok(result.rows_affected())
    }

    // === Tag Repository ===

    /// Create a tag; its normalized name must be unique
    pub async fn create_tag(&self, input: &CreateTagInput, created_by: Option<Uuid>) -> Result<DbTag> {
        let name = input.name.trim();
        let normalized = normalize_name(name);
        if normalized.is_empty() {
            return Err(CoreError::EmptyTagName.into());
        }

        let tag = sqlx::query_as::<_, DbTag>(
            r#"
            INSERT INTO tags (name, normalized_name, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, normalized_name, created_by, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(&normalized)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ApiError::BadRequest(format!("Tag '{}' already exists", name))
            } else {
                failed("Failed to create tag")(err)
            }
        })?;

        Ok(tag)
    }

    pub async fn get_tag(&self, id: Uuid) -> Result<Option<DbTag>> {
        let result = sqlx::query_as::<_, DbTag>(
            r#"
            SELECT id, name, normalized_name, created_by, created_at, updated_at
            FROM tags
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;

        single_row(result, "Failed to get tag")
    }

    /// Look a tag up by any spelling that normalizes to the same name
    pub async fn get_tag_by_name(&self, name: &str) -> Result<Option<DbTag>> {
        let result = sqlx::query_as::<_, DbTag>(
            r#"
            SELECT id, name, normalized_name, created_by, created_at, updated_at
            FROM tags
            WHERE normalized_name = $1
            "#,
        )
        .bind(normalize_name(name))
        .fetch_one(&self.pool)
        .await;

        single_row(result, "Failed to get tag by name")
    }

    /// List tags, newest first. `q` matches the display or normalized name.
    pub async fn list_tags(&self, options: &ListTagsOptions) -> Result<Vec<DbTag>> {
        let pattern = options
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q));

        let tags = sqlx::query_as::<_, DbTag>(
            r#"
            SELECT id, name, normalized_name, created_by, created_at, updated_at
            FROM tags
            WHERE $1::text IS NULL OR name ILIKE $1 OR normalized_name ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern)
        .bind(options.limit)
        .bind(options.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await
        .map_err(failed("Failed to list tags"))?;

        Ok(tags)
    }

    /// Rename a tag, recomputing its normalized name
    pub async fn update_tag(&self, id: Uuid, input: &UpdateTagInput) -> Result<Option<DbTag>> {
        let name = input.name.as_deref().map(str::trim);
        let normalized = name.map(normalize_name);
        if normalized.as_deref() == Some("") {
            return Err(CoreError::EmptyTagName.into());
        }

        let result = sqlx::query_as::<_, DbTag>(
            r#"
            UPDATE tags
            SET name = COALESCE($2, name),
                normalized_name = COALESCE($3, normalized_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, normalized_name, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(normalized)
        .fetch_one(&self.pool)
        .await;

        match result {
            Err(err) if is_unique_violation(&err) => Err(ApiError::BadRequest(
                "A tag with that name already exists".to_string(),
            )),
            other => single_row(other, "Failed to update tag"),
        }
    }

    pub async fn delete_tag(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(failed("Failed to delete tag"))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_tags(&self, ids: &[Uuid]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(failed("Failed to delete tags"))?;

        Ok(result.rows_affected())
    }

    // === Word Repository ===

    pub async fn create_word(&self, input: &CreateWordInput) -> Result<DbWord> {
        let word = sqlx::query_as::<_, DbWord>(
            r#"
            INSERT INTO words (lemma, lang, collocations)
            VALUES ($1, $2, $3)
            RETURNING id, lemma, lang, collocations, created_at, updated_at
            "#,
        )
        .bind(&input.lemma)
        .bind(&input.lang)
        .bind(Json(&input.collocations))
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ApiError::BadRequest(format!(
                    "Word '{}' already exists for language '{}'",
                    input.lemma, input.lang
                ))
            } else {
                failed("Failed to create word")(err)
            }
        })?;

        Ok(word)
    }

    pub async fn get_word(&self, id: Uuid) -> Result<Option<DbWord>> {
        let result = sqlx::query_as::<_, DbWord>(
            r#"
            SELECT id, lemma, lang, collocations, created_at, updated_at
            FROM words
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;

        single_row(result, "Failed to get word")
    }

    /// List words, optionally for one language
    pub async fn list_words(&self, options: &ListWordsOptions) -> Result<Vec<DbWord>> {
        let words = sqlx::query_as::<_, DbWord>(
            r#"
            SELECT id, lemma, lang, collocations, created_at, updated_at
            FROM words
            WHERE $1::text IS NULL OR lang = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(options.lang.as_deref())
        .bind(options.limit.unwrap_or(DEFAULT_WORD_LIST_LIMIT))
        .bind(options.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await
        .map_err(failed("Failed to list words"))?;

        Ok(words)
    }

    /// Case-insensitive substring search on lemma
    pub async fn search_words(
        &self,
        pattern: &str,
        lang: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<DbWord>> {
        let words = sqlx::query_as::<_, DbWord>(
            r#"
            SELECT id, lemma, lang, collocations, created_at, updated_at
            FROM words
            WHERE lemma ILIKE $1 AND ($2::text IS NULL OR lang = $2)
            ORDER BY lemma
            LIMIT $3
            "#,
        )
        .bind(format!("%{}%", pattern))
        .bind(lang)
        .bind(limit.unwrap_or(DEFAULT_WORD_SEARCH_LIMIT))
        .fetch_all(&self.pool)
        .await
        .map_err(failed("Failed to search words"))?;

        Ok(words)
    }

    /// Distinct languages that have at least one word
    pub async fn get_available_languages(&self) -> Result<Vec<String>> {
        let langs: Vec<String> = sqlx::query_scalar("SELECT DISTINCT lang FROM words ORDER BY lang")
            .fetch_all(&self.pool)
            .await
            .map_err(failed("Failed to fetch available languages"))?;

        Ok(langs)
    }

    /// Replace a word's collocations
    pub async fn update_word(&self, id: Uuid, input: &UpdateWordInput) -> Result<Option<DbWord>> {
        let result = sqlx::query_as::<_, DbWord>(
            r#"
            UPDATE words
            SET collocations = COALESCE($2, collocations),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, lemma, lang, collocations, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.collocations.as_ref().map(Json))
        .fetch_one(&self.pool)
        .await;

        single_row(result, "Failed to update word")
    }

    pub async fn delete_word(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM words WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(failed("Failed to delete word"))?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert words, merging collocations into any existing (lemma, lang) row
    pub async fn bulk_upsert_words(&self, inputs: &[CreateWordInput]) -> Result<Vec<DbWord>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(failed("Failed to upsert words"))?;
        let mut words = Vec::with_capacity(inputs.len());

        for input in inputs {
            let existing = sqlx::query_as::<_, DbWord>(
                r#"
                SELECT id, lemma, lang, collocations, created_at, updated_at
                FROM words
                WHERE lemma = $1 AND lang = $2
                FOR UPDATE
                "#,
            )
            .bind(&input.lemma)
            .bind(&input.lang)
            .fetch_optional(&mut *tx)
            .await
            .map_err(failed("Failed to upsert words"))?;

            let collocations = match upsert_collocations(existing.as_ref(), input) {
                Some(collocations) => collocations,
                None => {
                    // Leave the stored row alone rather than overwrite what we cannot read
                    if let Some(word) = existing {
                        words.push(word);
                    }
                    continue;
                }
            };

            let word = sqlx::query_as::<_, DbWord>(
                r#"
                INSERT INTO words (lemma, lang, collocations)
                VALUES ($1, $2, $3)
                ON CONFLICT (lemma, lang) DO UPDATE SET
                    collocations = EXCLUDED.collocations,
                    updated_at = NOW()
                RETURNING id, lemma, lang, collocations, created_at, updated_at
                "#,
            )
            .bind(&input.lemma)
            .bind(&input.lang)
            .bind(Json(&collocations))
            .fetch_one(&mut *tx)
            .await
            .map_err(failed("Failed to upsert words"))?;

            words.push(word);
        }

        tx.commit().await.map_err(failed("Failed to upsert words"))?;
        Ok(words)
    }

    // === Deck Word Repository ===

    /// Add a word to a deck as a new card
    pub async fn add_word_to_deck(
        &self,
        deck_id: &str,
        word_id: Uuid,
        input: &AddWordToDeckInput,
    ) -> Result<DbDeckWord> {
        let deck_word = sqlx::query_as::<_, DbDeckWord>(
            r#"
            INSERT INTO deck_words (deck_id, word_id, state, stability, difficulty)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, deck_id, word_id, state, stability, difficulty, due,
                      last_review, step, created_at, updated_at
            "#,
        )
        .bind(deck_id)
        .bind(word_id)
        .bind(input.state.unwrap_or(CardStatus::New.to_value()))
        .bind(input.stability.unwrap_or(0.0))
        .bind(input.difficulty.unwrap_or(0.0))
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ApiError::BadRequest("Word is already in this deck".to_string())
            } else {
                failed("Failed to add word to deck")(err)
            }
        })?;

        Ok(deck_word)
    }

    /// Get a deck word, only if its deck belongs to `user_id`
    pub async fn get_deck_word_for_user(&self, id: Uuid, user_id: Uuid) -> Result<Option<DbDeckWord>> {
        let result = sqlx::query_as::<_, DbDeckWord>(
            r#"
            SELECT dw.id, dw.deck_id, dw.word_id, dw.state, dw.stability, dw.difficulty,
                   dw.due, dw.last_review, dw.step, dw.created_at, dw.updated_at
            FROM deck_words dw
            JOIN decks d ON d.id = dw.deck_id
            WHERE dw.id = $1 AND d.user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;

        single_row(result, "Failed to get deck word")
    }

    pub async fn list_deck_words(
        &self,
        deck_id: &str,
        options: &ListDeckWordsOptions,
    ) -> Result<Vec<DbDeckWord>> {
        let order_by = options.order_by.unwrap_or(DeckWordOrder::Due).column();
        let direction = if options.ascending.unwrap_or(true) { "ASC" } else { "DESC" };

        let sql = format!(
            r#"
            SELECT id, deck_id, word_id, state, stability, difficulty, due,
                   last_review, step, created_at, updated_at
            FROM deck_words
            WHERE deck_id = $1 AND ($2::int IS NULL OR state = $2)
            ORDER BY {} {}
            LIMIT $3 OFFSET $4
            "#,
            order_by, direction
        );

        let deck_words = sqlx::query_as::<_, DbDeckWord>(&sql)
            .bind(deck_id)
            .bind(options.state)
            .bind(options.limit)
            .bind(options.offset.unwrap_or(0))
            .fetch_all(&self.pool)
            .await
            .map_err(failed("Failed to list deck words"))?;

        Ok(deck_words)
    }

    /// Cards in a deck due at or before `now`, earliest first
    pub async fn get_due_cards(
        &self,
        deck_id: &str,
        now: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<Vec<DbDeckWord>> {
        let cards = sqlx::query_as::<_, DbDeckWord>(
            r#"
            SELECT id, deck_id, word_id, state, stability, difficulty, due,
                   last_review, step, created_at, updated_at
            FROM deck_words
            WHERE deck_id = $1 AND due <= $2
            ORDER BY due ASC
            LIMIT $3
            "#,
        )
        .bind(deck_id)
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(failed("Failed to fetch due cards"))?;

        Ok(cards)
    }

    /// Number of cards in a deck due at or before `now`
    pub async fn count_due_cards(&self, deck_id: &str, now: DateTime<Utc>) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM deck_words WHERE deck_id = $1 AND due <= $2")
                .bind(deck_id)
                .bind(now)
                .fetch_one(&self.pool)
                .await
                .map_err(failed("Failed to count due cards"))?;

        Ok(count)
    }

    /// Store the scheduling outcome of a review
    pub async fn update_deck_word_schedule(&self, id: Uuid, state: &CardState) -> Result<Option<DbDeckWord>> {
        let result = sqlx::query_as::<_, DbDeckWord>(
            r#"
            UPDATE deck_words
            SET state = $2, stability = $3, difficulty = $4, due = $5,
                last_review = $6, step = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING id, deck_id, word_id, state, stability, difficulty, due,
                      last_review, step, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(state.status.to_value())
        .bind(state.stability)
        .bind(state.difficulty)
        .bind(state.due)
        .bind(state.last_review)
        .bind(state.step)
        .fetch_one(&self.pool)
        .await;

        single_row(result, "Failed to update deck word")
    }

    pub async fn remove_word_from_deck(&self, deck_id: &str, word_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM deck_words WHERE deck_id = $1 AND word_id = $2")
            .bind(deck_id)
            .bind(word_id)
            .execute(&self.pool)
            .await
            .map_err(failed("Failed to remove word from deck"))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_deck_words(&self, deck_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM deck_words WHERE deck_id = $1")
            .bind(deck_id)
            .fetch_one(&self.pool)
            .await
            .map_err(failed("Failed to count deck words"))?;

        Ok(count)
    }
}
