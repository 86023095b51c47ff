//! Request body validation.
//!
//! Bodies deserialize into permissive `*Input` types: ids are plain strings,
//! most fields are optional, and unknown keys (`approvals`, `createdAt`, ...)
//! are ignored so clients can send back a document they fetched. Validation
//! then produces the typed requests consumed by the repositories, or an
//! [`Error::InvalidInput`] naming the offending field.

use std::collections::HashSet;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ids::{parse_id, parse_ids, parse_optional_id};
use crate::models::{Author, Dialect, WordClass};
use crate::traits::{
    CreateExampleSuggestionRequest, CreateWordSuggestionRequest, ExampleSuggestionDraft,
    ExampleSuggestionFields, UpdateWordSuggestionRequest, WordSuggestionFields,
};

fn required_text(field: &str, value: Option<String>) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::InvalidInput(format!("\"{}\" is required", field)))
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Reject a body `id` that disagrees with the id in the path.
fn check_body_id(body_id: Option<&str>, path_id: Uuid, label: &str) -> Result<()> {
    if let Some(id) = parse_optional_id(body_id, label)? {
        if id != path_id {
            return Err(Error::InvalidInput(format!(
                "Body id {} does not match path id {}",
                id, path_id
            )));
        }
    }
    Ok(())
}

// =============================================================================
// DIALECTS
// =============================================================================

/// A dialect entry as submitted.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DialectInput {
    pub dialect: Option<String>,
    pub word: Option<String>,
    pub pronunciation: Option<String>,
    #[serde(default)]
    pub variations: Vec<String>,
}

impl DialectInput {
    fn validate(self, index: usize) -> Result<Dialect> {
        let dialect = required_text(&format!("dialects[{}].dialect", index), self.dialect)?;
        let word = required_text(&format!("dialects[{}].word", index), self.word)?;
        Ok(Dialect {
            dialect,
            word,
            pronunciation: optional_text(self.pronunciation),
            variations: clean_list(self.variations),
        })
    }
}

// =============================================================================
// EXAMPLE SUGGESTIONS
// =============================================================================

/// An example suggestion body, standalone or nested.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExampleSuggestionInput {
    pub id: Option<String>,
    pub original_example_id: Option<String>,
    pub igbo: Option<String>,
    pub english: Option<String>,
    #[serde(default)]
    pub associated_words: Vec<String>,
    pub user_comments: Option<String>,
}

impl ExampleSuggestionInput {
    fn validate_fields(self) -> Result<(Option<String>, ExampleSuggestionFields)> {
        let original_example_id =
            parse_optional_id(self.original_example_id.as_deref(), "original example")?;
        let associated_words = parse_ids(&self.associated_words, "associated word")?;
        let fields = ExampleSuggestionFields {
            original_example_id,
            igbo: required_text("igbo", self.igbo)?,
            english: self.english.map(|e| e.trim().to_string()).unwrap_or_default(),
            associated_words,
            user_comments: optional_text(self.user_comments),
        };
        Ok((self.id, fields))
    }

    /// Validate a standalone example suggestion for creation.
    pub fn validate_create(self, author: &Author) -> Result<CreateExampleSuggestionRequest> {
        let (_, fields) = self.validate_fields()?;
        Ok(CreateExampleSuggestionRequest {
            fields,
            author_id: author.uid.clone(),
        })
    }

    /// Validate a replacement for the example suggestion at `path_id`.
    pub fn validate_update(self, path_id: Uuid) -> Result<ExampleSuggestionFields> {
        let (body_id, fields) = self.validate_fields()?;
        check_body_id(body_id.as_deref(), path_id, "example suggestion")?;
        Ok(fields)
    }

    /// Validate an example nested in a word suggestion update.
    pub fn validate_nested(self) -> Result<ExampleSuggestionDraft> {
        let (body_id, fields) = self.validate_fields()?;
        let id = parse_optional_id(body_id.as_deref(), "example suggestion")?;
        Ok(ExampleSuggestionDraft { id, fields })
    }
}

/// Reject two nested examples with identical Igbo and English text.
fn ensure_unique_examples<'a>(
    examples: impl IntoIterator<Item = &'a ExampleSuggestionFields>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for example in examples {
        if !seen.insert((example.igbo.as_str(), example.english.as_str())) {
            return Err(Error::InvalidInput(format!(
                "Duplicate example suggestion '{}'",
                example.igbo
            )));
        }
    }
    Ok(())
}

// =============================================================================
// WORD SUGGESTIONS
// =============================================================================

/// A word suggestion body.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WordSuggestionInput {
    pub id: Option<String>,
    pub original_word_id: Option<String>,
    pub word: Option<String>,
    pub word_class: Option<String>,
    #[serde(default)]
    pub definitions: Vec<String>,
    #[serde(default)]
    pub variations: Vec<String>,
    pub dialects: Option<Vec<DialectInput>>,
    pub pronunciation: Option<String>,
    #[serde(default)]
    pub is_standard_igbo: bool,
    pub user_comments: Option<String>,
    pub examples: Option<Vec<ExampleSuggestionInput>>,
}

impl WordSuggestionInput {
    fn validate_fields(
        self,
    ) -> Result<(
        Option<String>,
        WordSuggestionFields,
        Option<Vec<ExampleSuggestionInput>>,
    )> {
        let original_word_id =
            parse_optional_id(self.original_word_id.as_deref(), "original word")?;
        let word = required_text("word", self.word)?;
        let word_class = required_text("wordClass", self.word_class)?
            .parse::<WordClass>()
            .map_err(Error::InvalidInput)?;
        let definitions = clean_list(self.definitions);
        if definitions.is_empty() {
            return Err(Error::InvalidInput(
                "\"definitions\" must contain at least one definition".to_string(),
            ));
        }
        let dialects = self
            .dialects
            .map(|list| {
                list.into_iter()
                    .enumerate()
                    .map(|(i, d)| d.validate(i))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        let fields = WordSuggestionFields {
            original_word_id,
            word,
            word_class,
            definitions,
            variations: clean_list(self.variations),
            dialects,
            pronunciation: optional_text(self.pronunciation),
            is_standard_igbo: self.is_standard_igbo,
            user_comments: optional_text(self.user_comments),
        };
        Ok((self.id, fields, self.examples))
    }

    /// Validate a new word suggestion. Nested example ids are ignored.
    pub fn validate_create(self, author: &Author) -> Result<CreateWordSuggestionRequest> {
        let (_, fields, examples) = self.validate_fields()?;
        let examples = examples
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.validate_fields().map(|(_, fields)| fields))
            .collect::<Result<Vec<_>>>()?;
        ensure_unique_examples(&examples)?;

        Ok(CreateWordSuggestionRequest {
            fields,
            author_id: author.uid.clone(),
            author_email: author.email.clone(),
            examples,
        })
    }

    /// Validate a replacement for the word suggestion at `path_id`.
    pub fn validate_update(self, path_id: Uuid) -> Result<UpdateWordSuggestionRequest> {
        let (body_id, fields, examples) = self.validate_fields()?;
        check_body_id(body_id.as_deref(), path_id, "word suggestion")?;

        let examples = examples
            .map(|list| {
                list.into_iter()
                    .map(ExampleSuggestionInput::validate_nested)
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;
        if let Some(drafts) = &examples {
            ensure_unique_examples(drafts.iter().map(|d| &d.fields))?;
        }

        Ok(UpdateWordSuggestionRequest { fields, examples })
    }
}

/// Body of `POST /examples`: the example suggestion to merge.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct ExampleMergeInput {
    pub id: Option<String>,
}

impl ExampleMergeInput {
    pub fn validate(self) -> Result<Uuid> {
        match self.id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Uuid::parse_str(raw).map_err(|_| {
                Error::InvalidInput("Invalid original example id provided".to_string())
            }),
            _ => Err(Error::InvalidInput(
                "\"id\" of the example suggestion to merge is required".to_string(),
            )),
        }
    }
}
