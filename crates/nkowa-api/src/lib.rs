//! nkowa-api - HTTP API for the Nkọwa suggestions service.
//!
//! The binary in `main.rs` wires configuration and logging; everything needed
//! to build the router lives here so integration tests can serve it directly.

pub mod config;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    map_response_body::MapResponseBodyLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use nkowa_core::{ExampleRepository, ExampleSuggestionRepository, WordSuggestionRepository};
use nkowa_db::{Database, MemoryStore};

use crate::config::ServerConfig;
use crate::handlers::{example_suggestions, examples, health, word_suggestions};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub word_suggestions: Arc<dyn WordSuggestionRepository>,
    pub example_suggestions: Arc<dyn ExampleSuggestionRepository>,
    pub examples: Arc<dyn ExampleRepository>,
}

impl AppState {
    /// State backed by PostgreSQL repositories.
    pub fn from_database(db: Database) -> Self {
        Self {
            word_suggestions: Arc::new(db.word_suggestions),
            example_suggestions: Arc::new(db.example_suggestions),
            examples: Arc::new(db.examples),
        }
    }

    /// State backed by a single in-memory store.
    pub fn in_memory(store: MemoryStore) -> Self {
        Self {
            word_suggestions: Arc::new(store.clone()),
            example_suggestions: Arc::new(store.clone()),
            examples: Arc::new(store),
        }
    }
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    Database(nkowa_core::Error),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl From<nkowa_core::Error> for ApiError {
    fn from(err: nkowa_core::Error) -> Self {
        use nkowa_core::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::WordSuggestionNotFound(_) | Error::ExampleSuggestionNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Database(_) => ApiError::Database(err),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                tracing::error!(subsystem = "api", error = %err, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!(subsystem = "api", error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// OPENAPI
// =============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nkọwa Suggestions API",
        description = "Crowdsourced word and example suggestions for the Igbo dictionary"
    ),
    paths(
        health::health_check,
        word_suggestions::create_word_suggestion,
        word_suggestions::update_word_suggestion,
        word_suggestions::list_word_suggestions,
        word_suggestions::get_word_suggestion,
        word_suggestions::delete_word_suggestion,
        word_suggestions::approve_word_suggestion,
        word_suggestions::deny_word_suggestion,
        example_suggestions::create_example_suggestion,
        example_suggestions::update_example_suggestion,
        example_suggestions::list_example_suggestions,
        example_suggestions::get_example_suggestion,
        example_suggestions::delete_example_suggestion,
        example_suggestions::approve_example_suggestion,
        example_suggestions::deny_example_suggestion,
        examples::merge_example,
        examples::get_example,
    ),
    components(schemas(
        nkowa_core::WordSuggestion,
        nkowa_core::ExampleSuggestion,
        nkowa_core::Example,
        nkowa_core::Dialect,
        nkowa_core::WordClass,
        nkowa_core::WordSuggestionInput,
        nkowa_core::ExampleSuggestionInput,
        nkowa_core::DialectInput,
        nkowa_core::ExampleMergeInput,
    )),
    tags(
        (name = "Word Suggestions", description = "Proposed dictionary entries"),
        (name = "Example Suggestions", description = "Proposed usage examples"),
        (name = "Examples", description = "Accepted usage examples"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

// =============================================================================
// CORS
// =============================================================================

const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3030";

/// Parse a comma-separated origin whitelist, skipping invalid entries.
///
/// Falls back to the local editor origin when unset or empty.
pub fn parse_allowed_origins(raw: Option<&str>) -> Vec<HeaderValue> {
    let origins_str = raw.unwrap_or(DEFAULT_ALLOWED_ORIGIN);
    if origins_str.trim().is_empty() {
        return vec![HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN)];
    }

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

/// Response header carrying the list window, e.g. `wordSuggestions 0-9/42`.
pub const CONTENT_RANGE: &str = "content-range";
/// Response header carrying the total number of list matches.
pub const X_TOTAL_COUNT: &str = "x-total-count";

// =============================================================================
// ROUTER
// =============================================================================

/// Build the full application router.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(parse_allowed_origins(
            config.allowed_origins.as_deref(),
        )))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(nkowa_core::defaults::USER_UID_HEADER),
            HeaderName::from_static(nkowa_core::defaults::USER_EMAIL_HEADER),
        ])
        .expose_headers([
            HeaderName::from_static(CONTENT_RANGE),
            HeaderName::from_static(X_TOTAL_COUNT),
        ])
        .max_age(Duration::from_secs(3600));

    let api = Router::new()
        .route(
            "/wordSuggestions",
            get(word_suggestions::list_word_suggestions)
                .post(word_suggestions::create_word_suggestion),
        )
        .route(
            "/wordSuggestions/:id",
            get(word_suggestions::get_word_suggestion)
                .put(word_suggestions::update_word_suggestion)
                .delete(word_suggestions::delete_word_suggestion),
        )
        .route(
            "/wordSuggestions/:id/approve",
            put(word_suggestions::approve_word_suggestion),
        )
        .route(
            "/wordSuggestions/:id/deny",
            put(word_suggestions::deny_word_suggestion),
        )
        .route(
            "/exampleSuggestions",
            get(example_suggestions::list_example_suggestions)
                .post(example_suggestions::create_example_suggestion),
        )
        .route(
            "/exampleSuggestions/:id",
            get(example_suggestions::get_example_suggestion)
                .put(example_suggestions::update_example_suggestion)
                .delete(example_suggestions::delete_example_suggestion),
        )
        .route(
            "/exampleSuggestions/:id/approve",
            put(example_suggestions::approve_example_suggestion),
        )
        .route(
            "/exampleSuggestions/:id/deny",
            put(example_suggestions::deny_example_suggestion),
        )
        .route("/examples", post(examples::merge_example))
        .route("/examples/:id", get(examples::get_example));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(MapResponseBodyLayer::new(axum::body::Body::new))
                .layer(RequestBodyLimitLayer::new(config.max_body_bytes)),
        )
        .with_state(state)
}
