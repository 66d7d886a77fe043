pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anyhow::Context;
use lexideck_core::{get_algorithm, SpacedRepetitionAlgorithm};

use crate::config::Config;
use crate::db::Database;
use crate::services::ai::AiClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    /// `None` when no AI credentials are configured
    pub ai: Option<Arc<AiClient>>,
    pub algorithm: Arc<dyn SpacedRepetitionAlgorithm>,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        ai: Option<Arc<AiClient>>,
        algorithm: &str,
    ) -> anyhow::Result<Self> {
        let algorithm = get_algorithm(algorithm)
            .with_context(|| format!("unknown scheduling algorithm: {}", algorithm))?;

        Ok(Self {
            db,
            ai,
            algorithm: Arc::from(algorithm),
        })
    }
}

/// Full application router. Everything except `/health` and registration
/// requires a bearer token.
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        // User routes
        .route(
            "/api/users/me",
            get(routes::users::me).put(routes::users::update_me),
        )
        // Deck routes
        .route("/api/decks", get(routes::decks::list).post(routes::decks::create))
        .route("/api/decks/bulk-delete", post(routes::decks::bulk_delete))
        .route(
            "/api/decks/:id",
            get(routes::decks::get)
                .put(routes::decks::update)
                .delete(routes::decks::delete),
        )
        .route(
            "/api/decks/:id/words",
            get(routes::decks::list_words).post(routes::decks::add_word),
        )
        .route(
            "/api/decks/:id/words/:word_id",
            axum::routing::delete(routes::decks::remove_word),
        )
        .route("/api/decks/:id/due", get(routes::decks::due))
        // Tag routes
        .route("/api/tags", get(routes::tags::list).post(routes::tags::create))
        .route("/api/tags/bulk-delete", post(routes::tags::bulk_delete))
        .route("/api/tags/by-name/:name", get(routes::tags::get_by_name))
        .route(
            "/api/tags/:id",
            get(routes::tags::get)
                .put(routes::tags::update)
                .delete(routes::tags::delete),
        )
        // Word routes
        .route("/api/languages", get(routes::words::supported_languages))
        .route("/api/words", get(routes::words::list).post(routes::words::create))
        .route("/api/words/search", get(routes::words::search))
        .route("/api/words/languages", get(routes::words::languages))
        .route(
            "/api/words/:id",
            get(routes::words::get)
                .put(routes::words::update)
                .delete(routes::words::delete),
        )
        // Review routes
        .route(
            "/api/review/difficulty-options",
            get(routes::review::difficulty_options),
        )
        .route("/api/review/submit-result", post(routes::review::submit_result))
        .route("/api/review/submit-answer", post(routes::review::submit_answer))
        .route(
            "/api/review/generate-question",
            post(routes::review::generate_question),
        )
        .route("/api/review/generate-answer", post(routes::review::generate_answer))
        .route("/api/review/generate-hints", post(routes::review::generate_hints))
        .route(
            "/api/review/generate-question-translation",
            post(routes::review::generate_question_translation),
        )
        // Batch routes
        .route("/api/batch/parse", post(routes::batch::parse))
        .route("/api/batch/import", post(routes::batch::import))
        .route("/api/batch/requests", post(routes::batch::requests))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/users/register", post(routes::users::register))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let ai = match &config.ai {
        Some(ai_config) => {
            let client = AiClient::new(ai_config)?;
            tracing::info!("AI review enabled with model {}", client.model());
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set, AI review and question generation are disabled");
            None
        }
    };

    let state = AppState::new(Arc::new(db), ai, &config.algorithm)?;
    tracing::info!("Scheduling reviews with {}", state.algorithm.name());

    let app = router(state);

    let addr = config.addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header::AUTHORIZATION, Request, StatusCode};
    use lexideck_core::algorithm::DEFAULT_ALGORITHM;
    use tower::ServiceExt;

    fn state(algorithm: &str) -> anyhow::Result<AppState> {
        // Lazy pool: requests rejected before any query never connect.
        let db = Database::connect_lazy("postgres://localhost/lexideck_unused").unwrap();
        AppState::new(Arc::new(db), None, algorithm)
    }

    fn app() -> Router {
        router(state(DEFAULT_ALGORITHM).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let response = app()
            .oneshot(Request::get("/api/decks").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_route_rejects_non_bearer() {
        let response = app()
            .oneshot(
                Request::get("/api/words")
                    .header(AUTHORIZATION, "Basic abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_generation_routes_require_token() {
        for path in [
            "/api/review/generate-question",
            "/api/review/generate-answer",
            "/api/review/generate-hints",
            "/api/review/generate-question-translation",
        ] {
            let response = app()
                .oneshot(Request::post(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", path);
        }
    }

    #[tokio::test]
    async fn test_algorithm_selection() {
        assert_eq!(state("fsrs").unwrap().algorithm.name(), DEFAULT_ALGORITHM);
        let err = state("sm2").err().unwrap();
        assert_eq!(err.to_string(), "unknown scheduling algorithm: sm2");
    }
}
