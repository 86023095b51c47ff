//! Nested example synchronization.
//!
//! A word suggestion update carries the full desired list of its nested
//! example suggestions. The stored list is reconciled against it by id:
//! entries without an id are created, entries with a known id are updated,
//! and stored entries missing from the desired list are deleted.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::traits::{ExampleSuggestionDraft, ExampleSuggestionFields};

/// Writes needed to bring stored nested examples in line with a desired list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExampleSyncPlan {
    pub create: Vec<ExampleSuggestionFields>,
    pub update: Vec<(Uuid, ExampleSuggestionFields)>,
    pub delete: Vec<Uuid>,
}

impl ExampleSyncPlan {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}

/// Diff `existing` nested example ids against the `incoming` drafts.
///
/// Fails when a draft names an id that is not nested under this word
/// suggestion, or when the same id appears twice.
pub fn plan_example_sync(
    existing: &[Uuid],
    incoming: Vec<ExampleSuggestionDraft>,
) -> Result<ExampleSyncPlan> {
    let known: HashSet<Uuid> = existing.iter().copied().collect();
    let mut kept = HashSet::new();
    let mut plan = ExampleSyncPlan::default();

    for draft in incoming {
        match draft.id {
            None => plan.create.push(draft.fields),
            Some(id) => {
                if !known.contains(&id) {
                    return Err(Error::InvalidInput(format!(
                        "Example suggestion {} does not belong to this word suggestion",
                        id
                    )));
                }
                if !kept.insert(id) {
                    return Err(Error::InvalidInput(format!(
                        "Example suggestion {} appears more than once",
                        id
                    )));
                }
                plan.update.push((id, draft.fields));
            }
        }
    }

    plan.delete = existing
        .iter()
        .copied()
        .filter(|id| !kept.contains(id))
        .collect();

    tracing::debug!(
        subsystem = "core",
        component = "example_sync",
        sync_created = plan.create.len(),
        sync_updated = plan.update.len(),
        sync_deleted = plan.delete.len(),
        "Planned nested example sync"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::new_v7;

    fn fields(igbo: &str) -> ExampleSuggestionFields {
        ExampleSuggestionFields {
            original_example_id: None,
            igbo: igbo.to_string(),
            english: String::new(),
            associated_words: vec![],
            user_comments: None,
        }
    }

    fn draft(id: Option<Uuid>, igbo: &str) -> ExampleSuggestionDraft {
        ExampleSuggestionDraft {
            id,
            fields: fields(igbo),
        }
    }

    #[test]
    fn test_new_drafts_are_created() {
        let plan = plan_example_sync(&[], vec![draft(None, "a"), draft(None, "b")]).unwrap();
        assert_eq!(plan.create.len(), 2);
        assert!(plan.update.is_empty());
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn test_known_ids_are_updated_and_missing_are_deleted() {
        let keep = new_v7();
        let drop = new_v7();
        let plan =
            plan_example_sync(&[keep, drop], vec![draft(Some(keep), "edited"), draft(None, "new")])
                .unwrap();
        assert_eq!(plan.update, vec![(keep, fields("edited"))]);
        assert_eq!(plan.create, vec![fields("new")]);
        assert_eq!(plan.delete, vec![drop]);
    }

    #[test]
    fn test_empty_incoming_deletes_everything() {
        let a = new_v7();
        let b = new_v7();
        let plan = plan_example_sync(&[a, b], vec![]).unwrap();
        assert_eq!(plan.delete, vec![a, b]);
    }

    #[test]
    fn test_foreign_id_is_rejected() {
        let err = plan_example_sync(&[new_v7()], vec![draft(Some(new_v7()), "x")]).unwrap_err();
        assert!(err.to_string().contains("does not belong"));
    }

    #[test]
    fn test_repeated_id_is_rejected() {
        let id = new_v7();
        let err = plan_example_sync(&[id], vec![draft(Some(id), "x"), draft(Some(id), "y")])
            .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_unchanged_list_has_only_updates() {
        let id = new_v7();
        let plan = plan_example_sync(&[id], vec![draft(Some(id), "same")]).unwrap();
        assert!(!plan.is_empty());
        assert!(plan.create.is_empty() && plan.delete.is_empty());
        assert!(ExampleSyncPlan::default().is_empty());
    }
}
