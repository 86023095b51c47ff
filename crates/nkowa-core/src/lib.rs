//! # nkowa-core
//!
//! Core types, traits, and request validation for the Nkọwa suggestions
//! service.
//!
//! This crate provides the domain models, the repository traits that storage
//! backends implement, and the parsing/validation layer that turns raw
//! request bodies and query strings into typed requests.

pub mod defaults;
pub mod error;
pub mod ids;
pub mod logging;
pub mod models;
pub mod query;
pub mod sync;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use ids::{new_v7, parse_id, parse_ids, parse_optional_id};
pub use models::*;
pub use query::{
    ExampleSuggestionFilter, ExampleSuggestionSortField, ListExampleSuggestionsRequest,
    ListQueryParams, ListWordSuggestionsRequest, SortDirection, SortSpec, Window,
    WordSuggestionFilter, WordSuggestionSortField,
};
pub use sync::{plan_example_sync, ExampleSyncPlan};
pub use traits::*;
pub use validation::{
    DialectInput, ExampleMergeInput, ExampleSuggestionInput, WordSuggestionInput,
};
