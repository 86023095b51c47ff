//! Accepted example HTTP handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use tracing::info;

use nkowa_core::{parse_id, Example, ExampleMergeInput};

use crate::middleware::RequireUser;
use crate::{ApiError, AppState};

/// Merge an example suggestion into the accepted examples.
///
/// Creates a new example, or overwrites the one the suggestion edits, and
/// stamps the suggestion with `merged` and `mergedBy`.
#[utoipa::path(post, path = "/api/v1/examples", tag = "Examples",
    request_body = ExampleMergeInput,
    responses(
        (status = 200, description = "Merged example", body = Example),
        (status = 400, description = "Missing user, invalid id, or already merged"),
        (status = 404, description = "Suggestion or original example not found")))]
pub async fn merge_example(
    State(state): State<AppState>,
    RequireUser(author): RequireUser,
    payload: Result<Json<ExampleMergeInput>, JsonRejection>,
) -> Result<Json<Example>, ApiError> {
    let Json(input) = payload?;
    let suggestion_id = input.validate()?;
    let example = state
        .example_suggestions
        .merge(suggestion_id, &author.uid)
        .await?;

    info!(
        subsystem = "api",
        component = "examples",
        op = "merge",
        example_suggestion_id = %suggestion_id,
        example_id = %example.id,
        user_id = %author.uid,
        "Example suggestion merged"
    );
    Ok(Json(example))
}

#[utoipa::path(get, path = "/api/v1/examples/{id}", tag = "Examples",
    params(("id" = String, Path, description = "Example id")),
    responses(
        (status = 200, description = "Example", body = Example),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Not found")))]
pub async fn get_example(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Example>, ApiError> {
    let id = parse_id(&id, "example")?;
    Ok(Json(state.examples.fetch(id).await?))
}
