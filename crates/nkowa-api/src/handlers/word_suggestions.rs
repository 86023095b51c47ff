//! Word suggestion HTTP handlers.
//!
//! Bodies are validated into typed requests before reaching storage, so
//! malformed ids and fields are rejected with 400 without a repository call.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::HeaderMap,
    Json,
};
use serde_json::json;
use tracing::info;

use nkowa_core::{
    parse_id, ListQueryParams, ListWordSuggestionsRequest, ReviewDecision, WordSuggestion,
    WordSuggestionInput,
};

use crate::handlers::list_headers;
use crate::middleware::{OptionalUser, RequireUser};
use crate::{ApiError, AppState};

const LABEL: &str = "word suggestion";

/// Create a word suggestion with optional nested example suggestions.
#[utoipa::path(post, path = "/api/v1/wordSuggestions", tag = "Word Suggestions",
    request_body = WordSuggestionInput,
    responses(
        (status = 200, description = "Created", body = WordSuggestion),
        (status = 400, description = "Missing user or invalid body")))]
pub async fn create_word_suggestion(
    State(state): State<AppState>,
    RequireUser(author): RequireUser,
    payload: Result<Json<WordSuggestionInput>, JsonRejection>,
) -> Result<Json<WordSuggestion>, ApiError> {
    let Json(input) = payload?;
    let req = input.validate_create(&author)?;
    let created = state.word_suggestions.insert(req).await?;

    info!(
        subsystem = "api",
        component = "word_suggestions",
        op = "create",
        word_suggestion_id = %created.id,
        user_id = %author.uid,
        "Word suggestion created"
    );
    Ok(Json(created))
}

/// Replace a word suggestion and synchronize its nested examples by id.
#[utoipa::path(put, path = "/api/v1/wordSuggestions/{id}", tag = "Word Suggestions",
    params(("id" = String, Path, description = "Word suggestion id")),
    request_body = WordSuggestionInput,
    responses(
        (status = 200, description = "Updated", body = WordSuggestion),
        (status = 400, description = "Invalid id or body"),
        (status = 404, description = "Not found")))]
pub async fn update_word_suggestion(
    State(state): State<AppState>,
    RequireUser(author): RequireUser,
    Path(id): Path<String>,
    payload: Result<Json<WordSuggestionInput>, JsonRejection>,
) -> Result<Json<WordSuggestion>, ApiError> {
    let id = parse_id(&id, LABEL)?;
    let Json(input) = payload?;
    let req = input.validate_update(id)?;
    let updated = state.word_suggestions.update(id, req).await?;

    info!(
        subsystem = "api",
        component = "word_suggestions",
        op = "update",
        word_suggestion_id = %id,
        user_id = %author.uid,
        "Word suggestion updated"
    );
    Ok(Json(updated))
}

/// List word suggestions.
///
/// Supports `keyword`, `filter`, `dialects`, `examples`, `range`, `page`, and
/// `sort`. The window and total are reported in `Content-Range` and
/// `X-Total-Count`.
#[utoipa::path(get, path = "/api/v1/wordSuggestions", tag = "Word Suggestions",
    params(
        ("keyword" = Option<String>, Query, description = "Substring of word or variation"),
        ("filter" = Option<String>, Query, description = "JSON object of field filters"),
        ("dialects" = Option<bool>, Query, description = "Include dialects"),
        ("examples" = Option<bool>, Query, description = "Include nested examples"),
        ("range" = Option<String>, Query, description = "JSON [start, end], inclusive"),
        ("page" = Option<i64>, Query, description = "Zero-based page of 10"),
        ("sort" = Option<String>, Query, description = "JSON [field, asc|desc]")),
    responses(
        (status = 200, description = "Matching word suggestions", body = [WordSuggestion]),
        (status = 400, description = "Malformed query")))]
pub async fn list_word_suggestions(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    query: Result<Query<ListQueryParams>, QueryRejection>,
) -> Result<(HeaderMap, Json<Vec<WordSuggestion>>), ApiError> {
    let Query(params) = query?;
    let req = ListWordSuggestionsRequest::try_from(params)?;
    let window = req.window;
    let page = state.word_suggestions.list(req).await?;

    tracing::debug!(
        subsystem = "api",
        component = "word_suggestions",
        op = "list",
        user_id = user.as_ref().map(|u| u.uid.as_str()).unwrap_or("-"),
        result_count = page.items.len(),
        total_count = page.total,
        "Listed word suggestions"
    );
    let headers = list_headers("wordSuggestions", &window, page.items.len(), page.total);
    Ok((headers, Json(page.items)))
}

/// Get a word suggestion with dialects and nested examples.
#[utoipa::path(get, path = "/api/v1/wordSuggestions/{id}", tag = "Word Suggestions",
    params(("id" = String, Path, description = "Word suggestion id")),
    responses(
        (status = 200, description = "Word suggestion", body = WordSuggestion),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Not found")))]
pub async fn get_word_suggestion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WordSuggestion>, ApiError> {
    let id = parse_id(&id, LABEL)?;
    Ok(Json(state.word_suggestions.fetch(id).await?))
}

/// Delete a word suggestion and its nested examples.
#[utoipa::path(delete, path = "/api/v1/wordSuggestions/{id}", tag = "Word Suggestions",
    params(("id" = String, Path, description = "Word suggestion id")),
    responses(
        (status = 200, description = "Deleted; body is { id }"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Not found")))]
pub async fn delete_word_suggestion(
    State(state): State<AppState>,
    RequireUser(author): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id, LABEL)?;
    state.word_suggestions.delete(id).await?;

    info!(
        subsystem = "api",
        component = "word_suggestions",
        op = "delete",
        word_suggestion_id = %id,
        user_id = %author.uid,
        "Word suggestion deleted"
    );
    Ok(Json(json!({ "id": id })))
}

async fn review(
    state: AppState,
    author: nkowa_core::Author,
    id: String,
    decision: ReviewDecision,
) -> Result<Json<WordSuggestion>, ApiError> {
    let id = parse_id(&id, LABEL)?;
    let reviewed = state
        .word_suggestions
        .review(id, &author.uid, decision)
        .await?;

    info!(
        subsystem = "api",
        component = "word_suggestions",
        op = decision.as_str(),
        word_suggestion_id = %id,
        user_id = %author.uid,
        approvals = reviewed.approvals.len(),
        denials = reviewed.denials.len(),
        "Word suggestion reviewed"
    );
    Ok(Json(reviewed))
}

/// Approve a word suggestion as the calling editor.
#[utoipa::path(put, path = "/api/v1/wordSuggestions/{id}/approve", tag = "Word Suggestions",
    params(("id" = String, Path, description = "Word suggestion id")),
    responses(
        (status = 200, description = "Approved", body = WordSuggestion),
        (status = 404, description = "Not found")))]
pub async fn approve_word_suggestion(
    State(state): State<AppState>,
    RequireUser(author): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<WordSuggestion>, ApiError> {
    review(state, author, id, ReviewDecision::Approve).await
}

/// Deny a word suggestion as the calling editor.
#[utoipa::path(put, path = "/api/v1/wordSuggestions/{id}/deny", tag = "Word Suggestions",
    params(("id" = String, Path, description = "Word suggestion id")),
    responses(
        (status = 200, description = "Denied", body = WordSuggestion),
        (status = 404, description = "Not found")))]
pub async fn deny_word_suggestion(
    State(state): State<AppState>,
    RequireUser(author): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<WordSuggestion>, ApiError> {
    review(state, author, id, ReviewDecision::Deny).await
}
