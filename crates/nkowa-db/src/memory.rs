//! In-memory store for development and tests.
//!
//! Implements every repository trait over a single `tokio::sync::RwLock`,
//! with the same filtering, ordering, and not-found behavior as the
//! PostgreSQL repositories.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use nkowa_core::{
    apply_review, new_v7, plan_example_sync, CreateExampleSuggestionRequest,
    CreateWordSuggestionRequest, Error, Example, ExampleRepository, ExampleSuggestion,
    ExampleSuggestionFields, ExampleSuggestionRepository, ExampleSuggestionSortField,
    ListExampleSuggestionsRequest, ListResponse, ListWordSuggestionsRequest, Result,
    ReviewDecision, SortDirection, SortSpec, UpdateWordSuggestionRequest, Window, WordSuggestion,
    WordSuggestionRepository, WordSuggestionSortField,
};

#[derive(Debug, Default)]
struct State {
    /// Word suggestions without their nested examples.
    words: HashMap<Uuid, WordSuggestion>,
    example_suggestions: HashMap<Uuid, ExampleSuggestion>,
    examples: HashMap<Uuid, Example>,
    last_tick: Option<DateTime<Utc>>,
}

impl State {
    /// Current time, strictly after every timestamp handed out before.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_tick {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_tick = Some(next);
        next
    }

    fn nested_ids(&self, word_suggestion_id: Uuid) -> Vec<Uuid> {
        self.nested(word_suggestion_id)
            .into_iter()
            .map(|example| example.id)
            .collect()
    }

    fn nested(&self, word_suggestion_id: Uuid) -> Vec<ExampleSuggestion> {
        let mut nested: Vec<ExampleSuggestion> = self
            .example_suggestions
            .values()
            .filter(|example| example.word_suggestion_id == Some(word_suggestion_id))
            .cloned()
            .collect();
        nested.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        nested
    }

    fn assemble(&self, id: Uuid) -> Result<WordSuggestion> {
        let mut word = self
            .words
            .get(&id)
            .cloned()
            .ok_or(Error::WordSuggestionNotFound(id))?;
        word.examples = Some(self.nested(id));
        Ok(word)
    }

    fn insert_example_suggestion(
        &mut self,
        word_suggestion_id: Option<Uuid>,
        author_id: &str,
        fields: ExampleSuggestionFields,
    ) -> Uuid {
        let now = self.tick();
        let id = new_v7();
        self.example_suggestions.insert(
            id,
            ExampleSuggestion {
                id,
                original_example_id: fields.original_example_id,
                igbo: fields.igbo,
                english: fields.english,
                associated_words: fields.associated_words,
                example_for_suggestion: word_suggestion_id.is_some(),
                word_suggestion_id,
                author_id: author_id.to_string(),
                user_comments: fields.user_comments,
                approvals: Vec::new(),
                denials: Vec::new(),
                merged: None,
                merged_by: None,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    fn update_example_suggestion(&mut self, id: Uuid, fields: ExampleSuggestionFields) -> Result<()> {
        let now = self.tick();
        let example = self
            .example_suggestions
            .get_mut(&id)
            .ok_or(Error::ExampleSuggestionNotFound(id))?;
        example.original_example_id = fields.original_example_id;
        example.igbo = fields.igbo;
        example.english = fields.english;
        example.associated_words = fields.associated_words;
        example.user_comments = fields.user_comments;
        example.updated_at = now;
        Ok(())
    }
}

/// Repository backend that keeps everything in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn apply_window<T>(items: Vec<T>, window: &Window) -> Vec<T> {
    items
        .into_iter()
        .skip(window.skip.max(0) as usize)
        .take(window.limit.max(0) as usize)
        .collect()
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn compare_words(
    a: &WordSuggestion,
    b: &WordSuggestion,
    sort: Option<&SortSpec<WordSuggestionSortField>>,
) -> Ordering {
    let Some(spec) = sort else {
        return b
            .approvals
            .len()
            .cmp(&a.approvals.len())
            .then(b.created_at.cmp(&a.created_at))
            .then(b.id.cmp(&a.id));
    };
    let primary = match spec.field {
        WordSuggestionSortField::Word => a.word.cmp(&b.word),
        WordSuggestionSortField::WordClass => a.word_class.code().cmp(b.word_class.code()),
        WordSuggestionSortField::Definitions => a.definitions.cmp(&b.definitions),
        WordSuggestionSortField::Approvals => a.approvals.len().cmp(&b.approvals.len()),
        WordSuggestionSortField::Denials => a.denials.len().cmp(&b.denials.len()),
        WordSuggestionSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        WordSuggestionSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    directed(primary, spec.direction).then(a.id.cmp(&b.id))
}

fn compare_examples(
    a: &ExampleSuggestion,
    b: &ExampleSuggestion,
    sort: Option<&SortSpec<ExampleSuggestionSortField>>,
) -> Ordering {
    let Some(spec) = sort else {
        return b
            .approvals
            .len()
            .cmp(&a.approvals.len())
            .then(b.created_at.cmp(&a.created_at))
            .then(b.id.cmp(&a.id));
    };
    let primary = match spec.field {
        ExampleSuggestionSortField::Igbo => a.igbo.cmp(&b.igbo),
        ExampleSuggestionSortField::English => a.english.cmp(&b.english),
        ExampleSuggestionSortField::Approvals => a.approvals.len().cmp(&b.approvals.len()),
        ExampleSuggestionSortField::Denials => a.denials.len().cmp(&b.denials.len()),
        ExampleSuggestionSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        ExampleSuggestionSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    directed(primary, spec.direction).then(a.id.cmp(&b.id))
}

fn word_matches(word: &WordSuggestion, req: &ListWordSuggestionsRequest) -> bool {
    if let Some(keyword) = req.keyword.as_deref() {
        let hit = contains_ci(&word.word, keyword)
            || word.variations.iter().any(|v| contains_ci(v, keyword));
        if !hit {
            return false;
        }
    }
    let filter = &req.filter;
    filter.word.as_deref().map_or(true, |w| contains_ci(&word.word, w))
        && filter.word_class.map_or(true, |c| word.word_class == c)
        && filter.author_id.as_deref().map_or(true, |a| word.author_id == a)
        && filter
            .is_standard_igbo
            .map_or(true, |s| word.is_standard_igbo == s)
}

fn example_matches(example: &ExampleSuggestion, req: &ListExampleSuggestionsRequest) -> bool {
    if example.word_suggestion_id.is_some() {
        return false;
    }
    if let Some(keyword) = req.keyword.as_deref() {
        if !contains_ci(&example.igbo, keyword) && !contains_ci(&example.english, keyword) {
            return false;
        }
    }
    let filter = &req.filter;
    filter.igbo.as_deref().map_or(true, |i| contains_ci(&example.igbo, i))
        && filter
            .english
            .as_deref()
            .map_or(true, |e| contains_ci(&example.english, e))
        && filter
            .author_id
            .as_deref()
            .map_or(true, |a| example.author_id == a)
}

// =============================================================================
// WORD SUGGESTIONS
// =============================================================================

#[async_trait]
impl WordSuggestionRepository for MemoryStore {
    async fn insert(&self, req: CreateWordSuggestionRequest) -> Result<WordSuggestion> {
        let mut state = self.state.write().await;
        let now = state.tick();
        let id = new_v7();
        let fields = req.fields;
        state.words.insert(
            id,
            WordSuggestion {
                id,
                original_word_id: fields.original_word_id,
                word: fields.word,
                word_class: fields.word_class,
                definitions: fields.definitions,
                variations: fields.variations,
                dialects: Some(fields.dialects.unwrap_or_default()),
                pronunciation: fields.pronunciation,
                is_standard_igbo: fields.is_standard_igbo,
                author_id: req.author_id.clone(),
                author_email: req.author_email,
                user_comments: fields.user_comments,
                approvals: Vec::new(),
                denials: Vec::new(),
                examples: None,
                created_at: now,
                updated_at: now,
            },
        );
        for example in req.examples {
            state.insert_example_suggestion(Some(id), &req.author_id, example);
        }
        debug!(
            subsystem = "db",
            component = "memory",
            op = "insert",
            word_suggestion_id = %id,
            "Created word suggestion"
        );
        state.assemble(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<WordSuggestion> {
        self.state.read().await.assemble(id)
    }

    async fn list(&self, req: ListWordSuggestionsRequest) -> Result<ListResponse<WordSuggestion>> {
        let state = self.state.read().await;
        let mut matched: Vec<&WordSuggestion> = state
            .words
            .values()
            .filter(|word| word_matches(word, &req))
            .collect();
        matched.sort_by(|a, b| compare_words(a, b, req.sort.as_ref()));
        let total = matched.len() as i64;

        let items = apply_window(matched, &req.window)
            .into_iter()
            .map(|word| {
                let mut word = word.clone();
                if req.include_examples {
                    word.examples = Some(state.nested(word.id));
                }
                if !req.include_dialects {
                    word.dialects = None;
                }
                word
            })
            .collect();
        Ok(ListResponse { items, total })
    }

    async fn update(&self, id: Uuid, req: UpdateWordSuggestionRequest) -> Result<WordSuggestion> {
        let mut state = self.state.write().await;
        let author_id = state
            .words
            .get(&id)
            .map(|word| word.author_id.clone())
            .ok_or(Error::WordSuggestionNotFound(id))?;

        if let Some(drafts) = req.examples {
            let plan = plan_example_sync(&state.nested_ids(id), drafts)?;
            for example_id in &plan.delete {
                state.example_suggestions.remove(example_id);
            }
            for (example_id, fields) in plan.update {
                state.update_example_suggestion(example_id, fields)?;
            }
            for fields in plan.create {
                state.insert_example_suggestion(Some(id), &author_id, fields);
            }
        }

        let now = state.tick();
        let fields = req.fields;
        let word = state
            .words
            .get_mut(&id)
            .ok_or(Error::WordSuggestionNotFound(id))?;
        word.original_word_id = fields.original_word_id;
        word.word = fields.word;
        word.word_class = fields.word_class;
        word.definitions = fields.definitions;
        word.variations = fields.variations;
        if let Some(dialects) = fields.dialects {
            word.dialects = Some(dialects);
        }
        word.pronunciation = fields.pronunciation;
        word.is_standard_igbo = fields.is_standard_igbo;
        word.user_comments = fields.user_comments;
        word.updated_at = now;

        state.assemble(id)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        if state.words.remove(&id).is_none() {
            return Err(Error::WordSuggestionNotFound(id));
        }
        state
            .example_suggestions
            .retain(|_, example| example.word_suggestion_id != Some(id));
        Ok(())
    }

    async fn review(
        &self,
        id: Uuid,
        reviewer_uid: &str,
        decision: ReviewDecision,
    ) -> Result<WordSuggestion> {
        let mut state = self.state.write().await;
        let now = state.tick();
        let word = state
            .words
            .get_mut(&id)
            .ok_or(Error::WordSuggestionNotFound(id))?;
        apply_review(&mut word.approvals, &mut word.denials, reviewer_uid, decision);
        word.updated_at = now;
        state.assemble(id)
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.state.read().await.words.contains_key(&id))
    }
}

// =============================================================================
// EXAMPLE SUGGESTIONS
// =============================================================================

#[async_trait]
impl ExampleSuggestionRepository for MemoryStore {
    async fn insert(&self, req: CreateExampleSuggestionRequest) -> Result<ExampleSuggestion> {
        let mut state = self.state.write().await;
        let id = state.insert_example_suggestion(None, &req.author_id, req.fields);
        state
            .example_suggestions
            .get(&id)
            .cloned()
            .ok_or(Error::ExampleSuggestionNotFound(id))
    }

    async fn fetch(&self, id: Uuid) -> Result<ExampleSuggestion> {
        self.state
            .read()
            .await
            .example_suggestions
            .get(&id)
            .cloned()
            .ok_or(Error::ExampleSuggestionNotFound(id))
    }

    async fn list(
        &self,
        req: ListExampleSuggestionsRequest,
    ) -> Result<ListResponse<ExampleSuggestion>> {
        let state = self.state.read().await;
        let mut matched: Vec<&ExampleSuggestion> = state
            .example_suggestions
            .values()
            .filter(|example| example_matches(example, &req))
            .collect();
        matched.sort_by(|a, b| compare_examples(a, b, req.sort.as_ref()));
        let total = matched.len() as i64;
        let items = apply_window(matched, &req.window)
            .into_iter()
            .cloned()
            .collect();
        Ok(ListResponse { items, total })
    }

    async fn update(&self, id: Uuid, fields: ExampleSuggestionFields) -> Result<ExampleSuggestion> {
        let mut state = self.state.write().await;
        state.update_example_suggestion(id, fields)?;
        state
            .example_suggestions
            .get(&id)
            .cloned()
            .ok_or(Error::ExampleSuggestionNotFound(id))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .example_suggestions
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::ExampleSuggestionNotFound(id))
    }

    async fn review(
        &self,
        id: Uuid,
        reviewer_uid: &str,
        decision: ReviewDecision,
    ) -> Result<ExampleSuggestion> {
        let mut state = self.state.write().await;
        let now = state.tick();
        let example = state
            .example_suggestions
            .get_mut(&id)
            .ok_or(Error::ExampleSuggestionNotFound(id))?;
        apply_review(&mut example.approvals, &mut example.denials, reviewer_uid, decision);
        example.updated_at = now;
        Ok(example.clone())
    }

    async fn merge(&self, id: Uuid, merged_by: &str) -> Result<Example> {
        let mut state = self.state.write().await;
        let suggestion = state
            .example_suggestions
            .get(&id)
            .cloned()
            .ok_or(Error::ExampleSuggestionNotFound(id))?;
        if suggestion.merged.is_some() {
            return Err(Error::InvalidInput(format!(
                "Example suggestion {} has already been merged",
                id
            )));
        }

        let now = state.tick();
        let example_id = match suggestion.original_example_id {
            Some(example_id) => {
                let example = state
                    .examples
                    .get_mut(&example_id)
                    .ok_or_else(|| Error::NotFound(format!("Example {} not found", example_id)))?;
                example.igbo = suggestion.igbo.clone();
                example.english = suggestion.english.clone();
                example.associated_words = suggestion.associated_words.clone();
                example.updated_at = now;
                example_id
            }
            None => {
                let example_id = new_v7();
                state.examples.insert(
                    example_id,
                    Example {
                        id: example_id,
                        igbo: suggestion.igbo.clone(),
                        english: suggestion.english.clone(),
                        associated_words: suggestion.associated_words.clone(),
                        created_at: now,
                        updated_at: now,
                    },
                );
                example_id
            }
        };

        if let Some(stored) = state.example_suggestions.get_mut(&id) {
            stored.merged = Some(example_id);
            stored.merged_by = Some(merged_by.to_string());
            stored.updated_at = now;
        }
        state
            .examples
            .get(&example_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Example {} not found", example_id)))
    }
}

// =============================================================================
// EXAMPLES
// =============================================================================

#[async_trait]
impl ExampleRepository for MemoryStore {
    async fn fetch(&self, id: Uuid) -> Result<Example> {
        self.state
            .read()
            .await
            .examples
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Example {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_is_strictly_increasing() {
        let mut state = State::default();
        let mut previous = state.tick();
        for _ in 0..100 {
            let next = state.tick();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_apply_window_skips_and_limits() {
        let items: Vec<i32> = (0..30).collect();
        let window = Window { skip: 5, limit: 3 };
        assert_eq!(apply_window(items, &window), vec![5, 6, 7]);
    }

    #[test]
    fn test_contains_ci() {
        assert!(contains_ci("Ndewo", "DEW"));
        assert!(!contains_ci("Ndewo", "x"));
    }
}
