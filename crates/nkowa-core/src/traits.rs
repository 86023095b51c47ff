//! Core traits for storage abstractions.
//!
//! These traits define the interfaces that concrete stores must satisfy,
//! enabling the PostgreSQL backend and the in-memory store to be swapped.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::query::{ListExampleSuggestionsRequest, ListWordSuggestionsRequest};

// =============================================================================
// WORD SUGGESTION REPOSITORY
// =============================================================================

/// Validated word suggestion content shared by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct WordSuggestionFields {
    pub original_word_id: Option<Uuid>,
    pub word: String,
    pub word_class: WordClass,
    pub definitions: Vec<String>,
    pub variations: Vec<String>,
    /// `None` keeps the stored dialects on update and means none on create.
    pub dialects: Option<Vec<Dialect>>,
    pub pronunciation: Option<String>,
    pub is_standard_igbo: bool,
    pub user_comments: Option<String>,
}

/// Request for creating a new word suggestion.
#[derive(Debug, Clone)]
pub struct CreateWordSuggestionRequest {
    pub fields: WordSuggestionFields,
    pub author_id: String,
    pub author_email: Option<String>,
    /// Nested example suggestions to create alongside the word suggestion.
    pub examples: Vec<ExampleSuggestionFields>,
}

/// Request for replacing a word suggestion's content.
#[derive(Debug, Clone)]
pub struct UpdateWordSuggestionRequest {
    pub fields: WordSuggestionFields,
    /// Desired nested example suggestions. `None` leaves them untouched;
    /// `Some` is synchronized by id (see [`crate::sync::plan_example_sync`]).
    pub examples: Option<Vec<ExampleSuggestionDraft>>,
}

/// A page of list results plus the total number of matches.
#[derive(Debug, Clone)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Repository for word suggestion CRUD and review.
#[async_trait]
pub trait WordSuggestionRepository: Send + Sync {
    /// Insert a word suggestion and its nested examples.
    async fn insert(&self, req: CreateWordSuggestionRequest) -> Result<WordSuggestion>;

    /// Fetch a word suggestion with dialects and nested examples.
    async fn fetch(&self, id: Uuid) -> Result<WordSuggestion>;

    /// List word suggestions with filtering, sorting, and a result window.
    async fn list(&self, req: ListWordSuggestionsRequest) -> Result<ListResponse<WordSuggestion>>;

    /// Replace content and synchronize nested examples.
    async fn update(&self, id: Uuid, req: UpdateWordSuggestionRequest) -> Result<WordSuggestion>;

    /// Delete a word suggestion and its nested examples.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Record an editor's approve/deny decision.
    async fn review(
        &self,
        id: Uuid,
        reviewer_uid: &str,
        decision: ReviewDecision,
    ) -> Result<WordSuggestion>;

    /// Check if a word suggestion exists.
    async fn exists(&self, id: Uuid) -> Result<bool>;
}

// =============================================================================
// EXAMPLE SUGGESTION REPOSITORY
// =============================================================================

/// Validated example suggestion content.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleSuggestionFields {
    pub original_example_id: Option<Uuid>,
    pub igbo: String,
    pub english: String,
    pub associated_words: Vec<Uuid>,
    pub user_comments: Option<String>,
}

/// A nested example suggestion as submitted inside a word suggestion update.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleSuggestionDraft {
    /// Id of an existing nested example, or `None` for a new one.
    pub id: Option<Uuid>,
    pub fields: ExampleSuggestionFields,
}

/// Request for creating a standalone example suggestion.
#[derive(Debug, Clone)]
pub struct CreateExampleSuggestionRequest {
    pub fields: ExampleSuggestionFields,
    pub author_id: String,
}

/// Repository for example suggestion CRUD, review, and merge.
#[async_trait]
pub trait ExampleSuggestionRepository: Send + Sync {
    /// Insert a standalone example suggestion.
    async fn insert(&self, req: CreateExampleSuggestionRequest) -> Result<ExampleSuggestion>;

    /// Fetch an example suggestion (standalone or nested).
    async fn fetch(&self, id: Uuid) -> Result<ExampleSuggestion>;

    /// List example suggestions.
    async fn list(
        &self,
        req: ListExampleSuggestionsRequest,
    ) -> Result<ListResponse<ExampleSuggestion>>;

    /// Replace an example suggestion's content.
    async fn update(&self, id: Uuid, fields: ExampleSuggestionFields) -> Result<ExampleSuggestion>;

    /// Delete an example suggestion.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Record an editor's approve/deny decision.
    async fn review(
        &self,
        id: Uuid,
        reviewer_uid: &str,
        decision: ReviewDecision,
    ) -> Result<ExampleSuggestion>;

    /// Promote a suggestion into an accepted example.
    ///
    /// Creates a new example, or overwrites the one named by
    /// `original_example_id`, then stamps the suggestion as merged.
    async fn merge(&self, id: Uuid, merged_by: &str) -> Result<Example>;
}

// =============================================================================
// EXAMPLE REPOSITORY
// =============================================================================

/// Read access to accepted examples.
#[async_trait]
pub trait ExampleRepository: Send + Sync {
    /// Fetch an accepted example.
    async fn fetch(&self, id: Uuid) -> Result<Example>;
}
