//! Core data models for the suggestions service.
//!
//! These types are shared across all crates and are serialized to clients
//! with camelCase keys.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// WORD CLASS
// =============================================================================

/// Part-of-speech code attached to every word suggestion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    utoipa::ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WordClass {
    Adj,
    Adv,
    Av,
    Aux,
    Cjn,
    Esuf,
    Intj,
    Isuf,
    Mv,
    Nm,
    Nnc,
    Nnp,
    Prep,
    Prn,
    Pv,
}

impl WordClass {
    /// Every word class, in code order.
    pub const ALL: [WordClass; 15] = [
        WordClass::Adj,
        WordClass::Adv,
        WordClass::Av,
        WordClass::Aux,
        WordClass::Cjn,
        WordClass::Esuf,
        WordClass::Intj,
        WordClass::Isuf,
        WordClass::Mv,
        WordClass::Nm,
        WordClass::Nnc,
        WordClass::Nnp,
        WordClass::Prep,
        WordClass::Prn,
        WordClass::Pv,
    ];

    /// Wire/storage code, e.g. `NNC`.
    pub fn code(&self) -> &'static str {
        match self {
            WordClass::Adj => "ADJ",
            WordClass::Adv => "ADV",
            WordClass::Av => "AV",
            WordClass::Aux => "AUX",
            WordClass::Cjn => "CJN",
            WordClass::Esuf => "ESUF",
            WordClass::Intj => "INTJ",
            WordClass::Isuf => "ISUF",
            WordClass::Mv => "MV",
            WordClass::Nm => "NM",
            WordClass::Nnc => "NNC",
            WordClass::Nnp => "NNP",
            WordClass::Prep => "PREP",
            WordClass::Prn => "PRN",
            WordClass::Pv => "PV",
        }
    }

    /// Human-readable label shown to editors.
    pub fn label(&self) -> &'static str {
        match self {
            WordClass::Adj => "Adjective",
            WordClass::Adv => "Adverb",
            WordClass::Av => "Active verb",
            WordClass::Aux => "Auxiliary verb",
            WordClass::Cjn => "Conjunction",
            WordClass::Esuf => "Extensional suffix",
            WordClass::Intj => "Interjection",
            WordClass::Isuf => "Inflectional suffix",
            WordClass::Mv => "Medial verb",
            WordClass::Nm => "Numeral",
            WordClass::Nnc => "Common noun",
            WordClass::Nnp => "Proper noun",
            WordClass::Prep => "Preposition",
            WordClass::Prn => "Pronoun",
            WordClass::Pv => "Passive verb",
        }
    }
}

impl fmt::Display for WordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for WordClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        WordClass::ALL
            .iter()
            .copied()
            .find(|class| class.code() == upper)
            .ok_or_else(|| format!("Invalid word class '{}'", s))
    }
}

// =============================================================================
// WORD SUGGESTIONS
// =============================================================================

/// A dialectal variant of a suggested word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dialect {
    /// Dialect name, e.g. "Onitsha".
    pub dialect: String,
    /// Spelling of the word in this dialect.
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default)]
    pub variations: Vec<String>,
}

/// A proposed dictionary entry awaiting review.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WordSuggestion {
    pub id: Uuid,
    /// Dictionary word this suggestion edits, if any.
    pub original_word_id: Option<Uuid>,
    pub word: String,
    pub word_class: WordClass,
    pub definitions: Vec<String>,
    pub variations: Vec<String>,
    /// Absent from list entries unless `dialects=true` was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialects: Option<Vec<Dialect>>,
    pub pronunciation: Option<String>,
    pub is_standard_igbo: bool,
    pub author_id: String,
    pub author_email: Option<String>,
    pub user_comments: Option<String>,
    /// Uids of editors who approved.
    pub approvals: Vec<String>,
    /// Uids of editors who denied.
    pub denials: Vec<String>,
    /// Nested example suggestions, oldest first. Absent from list entries
    /// unless `examples=true` was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<ExampleSuggestion>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WordSuggestion {
    /// Nested example suggestions, empty when they were not loaded.
    pub fn nested_examples(&self) -> &[ExampleSuggestion] {
        self.examples.as_deref().unwrap_or_default()
    }

    /// Dialect entries, empty when they were not loaded.
    pub fn dialect_entries(&self) -> &[Dialect] {
        self.dialects.as_deref().unwrap_or_default()
    }
}

// =============================================================================
// EXAMPLE SUGGESTIONS
// =============================================================================

/// A proposed usage example, either standalone or nested in a word suggestion.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExampleSuggestion {
    pub id: Uuid,
    /// Accepted example this suggestion edits, if any.
    pub original_example_id: Option<Uuid>,
    pub igbo: String,
    pub english: String,
    pub associated_words: Vec<Uuid>,
    /// True when the suggestion lives inside a word suggestion.
    pub example_for_suggestion: bool,
    pub word_suggestion_id: Option<Uuid>,
    pub author_id: String,
    pub user_comments: Option<String>,
    pub approvals: Vec<String>,
    pub denials: Vec<String>,
    /// Example produced when this suggestion was merged.
    pub merged: Option<Uuid>,
    pub merged_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An accepted usage example.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    pub id: Uuid,
    pub igbo: String,
    pub english: String,
    pub associated_words: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// AUTHORS & REVIEWS
// =============================================================================

/// Identity of the user issuing a request, as forwarded by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub uid: String,
    pub email: Option<String>,
}

/// An editor's decision on a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Deny,
}

impl ReviewDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewDecision::Approve => "approve",
            ReviewDecision::Deny => "deny",
        }
    }
}

/// Record `uid`'s decision in a pair of approval/denial lists.
///
/// A user appears in at most one list; repeating a decision leaves the lists
/// unchanged.
pub fn apply_review(
    approvals: &mut Vec<String>,
    denials: &mut Vec<String>,
    uid: &str,
    decision: ReviewDecision,
) {
    let (add_to, remove_from) = match decision {
        ReviewDecision::Approve => (approvals, denials),
        ReviewDecision::Deny => (denials, approvals),
    };
    remove_from.retain(|existing| existing != uid);
    if !add_to.iter().any(|existing| existing == uid) {
        add_to.push(uid.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_class_round_trips_through_code() {
        for class in WordClass::ALL {
            assert_eq!(class.code().parse::<WordClass>().unwrap(), class);
        }
    }

    #[test]
    fn test_word_class_parse_is_case_insensitive() {
        assert_eq!("nnc".parse::<WordClass>().unwrap(), WordClass::Nnc);
        assert_eq!(" Adj ".parse::<WordClass>().unwrap(), WordClass::Adj);
    }

    #[test]
    fn test_word_class_rejects_unknown() {
        let err = "invalid".parse::<WordClass>().unwrap_err();
        assert!(err.contains("invalid"));
    }

    #[test]
    fn test_word_class_serializes_as_code() {
        assert_eq!(serde_json::to_string(&WordClass::Nnp).unwrap(), "\"NNP\"");
        assert_eq!(serde_json::to_string(&WordClass::Esuf).unwrap(), "\"ESUF\"");
    }

    #[test]
    fn test_apply_review_moves_uid_between_lists() {
        let mut approvals = vec![];
        let mut denials = vec!["editor".to_string()];

        apply_review(&mut approvals, &mut denials, "editor", ReviewDecision::Approve);
        assert_eq!(approvals, vec!["editor".to_string()]);
        assert!(denials.is_empty());

        apply_review(&mut approvals, &mut denials, "editor", ReviewDecision::Deny);
        assert!(approvals.is_empty());
        assert_eq!(denials, vec!["editor".to_string()]);
    }

    #[test]
    fn test_apply_review_is_idempotent() {
        let mut approvals = vec![];
        let mut denials = vec![];
        apply_review(&mut approvals, &mut denials, "a", ReviewDecision::Approve);
        apply_review(&mut approvals, &mut denials, "a", ReviewDecision::Approve);
        assert_eq!(approvals.len(), 1);
    }

    fn word_suggestion() -> WordSuggestion {
        let now = Utc::now();
        WordSuggestion {
            id: Uuid::nil(),
            original_word_id: None,
            word: "ji".into(),
            word_class: WordClass::Nnc,
            definitions: vec!["yam".into()],
            variations: vec![],
            dialects: None,
            pronunciation: None,
            is_standard_igbo: false,
            author_id: "editor".into(),
            author_email: None,
            user_comments: None,
            approvals: vec![],
            denials: vec![],
            examples: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_unloaded_nested_lists_are_omitted() {
        let value = serde_json::to_value(word_suggestion()).unwrap();
        assert!(value.get("examples").is_none());
        assert!(value.get("dialects").is_none());

        let mut loaded = word_suggestion();
        loaded.examples = Some(vec![]);
        loaded.dialects = Some(vec![]);
        let value = serde_json::to_value(&loaded).unwrap();
        assert_eq!(value["examples"], serde_json::json!([]));
        assert_eq!(value["dialects"], serde_json::json!([]));
        assert!(loaded.nested_examples().is_empty());
    }
}
