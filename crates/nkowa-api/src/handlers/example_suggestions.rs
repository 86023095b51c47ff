//! Example suggestion HTTP handlers.

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
    parse_id, Author, ExampleSuggestion, ExampleSuggestionInput, ListExampleSuggestionsRequest,
    ListQueryParams, ReviewDecision,
};

use crate::handlers::list_headers;
use crate::middleware::RequireUser;
use crate::{ApiError, AppState};

const LABEL: &str = "example suggestion";

/// Create a standalone example suggestion.
#[utoipa::path(post, path = "/api/v1/exampleSuggestions", tag = "Example Suggestions",
    request_body = ExampleSuggestionInput,
    responses(
        (status = 200, description = "Created", body = ExampleSuggestion),
        (status = 400, description = "Missing user or invalid body")))]
pub async fn create_example_suggestion(
    State(state): State<AppState>,
    RequireUser(author): RequireUser,
    payload: Result<Json<ExampleSuggestionInput>, JsonRejection>,
) -> Result<Json<ExampleSuggestion>, ApiError> {
    let Json(input) = payload?;
    let req = input.validate_create(&author)?;
    let created = state.example_suggestions.insert(req).await?;

    info!(
        subsystem = "api",
        component = "example_suggestions",
        op = "create",
        example_suggestion_id = %created.id,
        user_id = %author.uid,
        "Example suggestion created"
    );
    Ok(Json(created))
}

/// Replace an example suggestion's content.
#[utoipa::path(put, path = "/api/v1/exampleSuggestions/{id}", tag = "Example Suggestions",
    params(("id" = String, Path, description = "Example suggestion id")),
    request_body = ExampleSuggestionInput,
    responses(
        (status = 200, description = "Updated", body = ExampleSuggestion),
        (status = 400, description = "Invalid id or body"),
        (status = 404, description = "Not found")))]
pub async fn update_example_suggestion(
    State(state): State<AppState>,
    RequireUser(author): RequireUser,
    Path(id): Path<String>,
    payload: Result<Json<ExampleSuggestionInput>, JsonRejection>,
) -> Result<Json<ExampleSuggestion>, ApiError> {
    let id = parse_id(&id, LABEL)?;
    let Json(input) = payload?;
    let fields = input.validate_update(id)?;
    let updated = state.example_suggestions.update(id, fields).await?;

    info!(
        subsystem = "api",
        component = "example_suggestions",
        op = "update",
        example_suggestion_id = %id,
        user_id = %author.uid,
        "Example suggestion updated"
    );
    Ok(Json(updated))
}

/// List standalone example suggestions.
#[utoipa::path(get, path = "/api/v1/exampleSuggestions", tag = "Example Suggestions",
    params(
        ("keyword" = Option<String>, Query, description = "Substring of igbo or english"),
        ("filter" = Option<String>, Query, description = "JSON object of field filters"),
        ("range" = Option<String>, Query, description = "JSON [start, end], inclusive"),
        ("page" = Option<i64>, Query, description = "Zero-based page of 10"),
        ("sort" = Option<String>, Query, description = "JSON [field, asc|desc]")),
    responses(
        (status = 200, description = "Matching example suggestions", body = [ExampleSuggestion]),
        (status = 400, description = "Malformed query")))]
pub async fn list_example_suggestions(
    State(state): State<AppState>,
    query: Result<Query<ListQueryParams>, QueryRejection>,
) -> Result<(HeaderMap, Json<Vec<ExampleSuggestion>>), ApiError> {
    let Query(params) = query?;
    let req = ListExampleSuggestionsRequest::try_from(params)?;
    let window = req.window;
    let page = state.example_suggestions.list(req).await?;
    let headers = list_headers("exampleSuggestions", &window, page.items.len(), page.total);
    Ok((headers, Json(page.items)))
}

/// Get an example suggestion, standalone or nested.
#[utoipa::path(get, path = "/api/v1/exampleSuggestions/{id}", tag = "Example Suggestions",
    params(("id" = String, Path, description = "Example suggestion id")),
    responses(
        (status = 200, description = "Example suggestion", body = ExampleSuggestion),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Not found")))]
pub async fn get_example_suggestion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExampleSuggestion>, ApiError> {
    let id = parse_id(&id, LABEL)?;
    Ok(Json(state.example_suggestions.fetch(id).await?))
}

/// Delete an example suggestion.
#[utoipa::path(delete, path = "/api/v1/exampleSuggestions/{id}", tag = "Example Suggestions",
    params(("id" = String, Path, description = "Example suggestion id")),
    responses(
        (status = 200, description = "Deleted; body is { id }"),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Not found")))]
pub async fn delete_example_suggestion(
    State(state): State<AppState>,
    RequireUser(author): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id, LABEL)?;
    state.example_suggestions.delete(id).await?;

    info!(
        subsystem = "api",
        component = "example_suggestions",
        op = "delete",
        example_suggestion_id = %id,
        user_id = %author.uid,
        "Example suggestion deleted"
    );
    Ok(Json(json!({ "id": id })))
}

async fn review(
    state: AppState,
    author: Author,
    id: String,
    decision: ReviewDecision,
) -> Result<Json<ExampleSuggestion>, ApiError> {
    let id = parse_id(&id, LABEL)?;
    let reviewed = state
        .example_suggestions
        .review(id, &author.uid, decision)
        .await?;

    info!(
        subsystem = "api",
        component = "example_suggestions",
        op = decision.as_str(),
        example_suggestion_id = %id,
        user_id = %author.uid,
        "Example suggestion reviewed"
    );
    Ok(Json(reviewed))
}

#[utoipa::path(put, path = "/api/v1/exampleSuggestions/{id}/approve", tag = "Example Suggestions",
    params(("id" = String, Path, description = "Example suggestion id")),
    responses(
        (status = 200, description = "Approved", body = ExampleSuggestion),
        (status = 404, description = "Not found")))]
pub async fn approve_example_suggestion(
    State(state): State<AppState>,
    RequireUser(author): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<ExampleSuggestion>, ApiError> {
    review(state, author, id, ReviewDecision::Approve).await
}

#[utoipa::path(put, path = "/api/v1/exampleSuggestions/{id}/deny", tag = "Example Suggestions",
    params(("id" = String, Path, description = "Example suggestion id")),
    responses(
        (status = 200, description = "Denied", body = ExampleSuggestion),
        (status = 404, description = "Not found")))]
pub async fn deny_example_suggestion(
    State(state): State<AppState>,
    RequireUser(author): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<ExampleSuggestion>, ApiError> {
    review(state, author, id, ReviewDecision::Deny).await
}
