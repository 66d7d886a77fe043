//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up test environment with database
//! - Helper functions for creating test data
//! - Authentication helpers
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL env var).
//! The AI client is never configured, so answer grading answers 503.

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use uuid::Uuid;

use lexideck_backend::db::Database;
use lexideck_backend::models::User;
use lexideck_backend::{router, AppState};
use lexideck_core::algorithm::DEFAULT_ALGORITHM;

/// Test context containing database connection and test router.
///
/// Requires DATABASE_URL environment variable to be set.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let db = Arc::new(db);

        let state = AppState::new(db.clone(), None, DEFAULT_ALGORITHM)
            .expect("Failed to build application state");

        Self {
            db,
            app: router(state),
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Create a test user and return its ID and token.
    pub async fn create_test_user(&self, username: Option<&str>) -> (Uuid, String) {
        let user = self
            .db
            .create_user(username)
            .await
            .expect("Failed to create test user");
        (user.id, user.token)
    }

    /// Get user by token.
    pub async fn get_user_by_token(&self, token: &str) -> Option<User> {
        self.db.get_user_by_token(token).await.ok().flatten()
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Clean up test data for a user.
    ///
    /// Decks and their cards go with the user; tags only lose their creator,
    /// so they are removed first.
    pub async fn cleanup_user(&self, user_id: Uuid) {
        let _ = sqlx::query("DELETE FROM tags WHERE created_by = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }

    /// Remove words created by a test. Words are shared, so tests use
    /// unique lemmas and delete them by id.
    pub async fn cleanup_words(&self, ids: &[Uuid]) {
        let _ = sqlx::query("DELETE FROM words WHERE id = ANY($1)")
            .bind(ids)
            .execute(self.db.pool())
            .await;
    }

    /// Remove words by lemma and language.
    pub async fn cleanup_lemmas(&self, lemmas: &[String], lang: &str) {
        let _ = sqlx::query("DELETE FROM words WHERE lemma = ANY($1) AND lang = $2")
            .bind(lemmas)
            .bind(lang)
            .execute(self.db.pool())
            .await;
    }
}
