//! One-time migration affordance for legacy retro items written before
//! sprints existed. The create path always requires a sprint id, so no new
//! orphans arise; once a board has been migrated these operations settle at
//! zero.
//!
//! Both operations scan the whole item collection and the reassignment
//! commits a single batch, so they are bounded by the store's
//! write-transaction limits. Fine at board scale, not beyond it.

use crate::error::{Result, RetroError};
use crate::store::{self, Collection, DocStore, Document};

fn is_orphan(doc: &Document) -> bool {
    match doc.get("sprintId") {
        None | Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Count retro items lacking a sprint association.
pub fn count_orphaned(store: &DocStore) -> Result<usize> {
    let all = store.list_all(Collection::RetroItems)?;
    Ok(all.iter().filter(|(_, doc)| is_orphan(doc)).count())
}

/// Assign every orphaned item to `sprint_id`, refreshing each item's update
/// timestamp, in one atomic batch. Returns the number of items updated;
/// commits nothing when there are no orphans, so a second run after a
/// successful first one updates zero items.
pub fn assign_orphaned(store: &DocStore, sprint_id: &str) -> Result<usize> {
    if sprint_id.is_empty() {
        return Err(RetroError::SprintIdRequired("assign orphaned items"));
    }

    let mut batch = store.batch();
    for (id, doc) in store.list_all(Collection::RetroItems)? {
        if !is_orphan(&doc) {
            continue;
        }
        let mut patch = Document::new();
        patch.insert("sprintId".to_string(), sprint_id.into());
        patch.insert("updatedAt".to_string(), store::server_timestamp());
        batch.update(Collection::RetroItems, &id, patch);
    }

    let updated = batch.len();
    if updated > 0 {
        tracing::info!(sprint_id, updated, "assigning orphaned items");
        batch.commit()?;
    }
    Ok(updated)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::RetroItem;
    use crate::sprint::Sprint;
    use crate::types::SentimentColor;
    use crate::validate::ItemDraft;

    /// Write a legacy item document directly, bypassing the create path
    /// (which refuses to produce orphans).
    fn insert_legacy_item(store: &DocStore, who: &str) -> String {
        let mut doc = Document::new();
        doc.insert("whoAmI".to_string(), who.into());
        doc.insert("whatToSay".to_string(), "Legacy note".into());
        doc.insert("actionItems".to_string(), "".into());
        doc.insert("color".to_string(), "yellow".into());
        doc.insert("createdAt".to_string(), store::server_timestamp());
        store.insert(Collection::RetroItems, doc).unwrap()
    }

    fn draft() -> ItemDraft {
        ItemDraft {
            who_am_i: "Dev".to_string(),
            what_to_say: "Went well".to_string(),
            action_items: String::new(),
            color: SentimentColor::Green,
        }
    }

    #[test]
    fn count_on_empty_store_is_zero() {
        let store = DocStore::open_in_memory().unwrap();
        assert_eq!(count_orphaned(&store).unwrap(), 0);
    }

    #[test]
    fn count_ignores_items_with_a_sprint() {
        let store = DocStore::open_in_memory().unwrap();
        let sprint = Sprint::create(&store, "Sprint 1").unwrap();
        RetroItem::create(&store, &draft(), &sprint.id).unwrap();
        insert_legacy_item(&store, "Old Dev");
        insert_legacy_item(&store, "Old QA");

        assert_eq!(count_orphaned(&store).unwrap(), 2);
    }

    #[test]
    fn empty_string_sprint_id_counts_as_orphan() {
        let store = DocStore::open_in_memory().unwrap();
        let mut doc = Document::new();
        doc.insert("sprintId".to_string(), "".into());
        doc.insert("whoAmI".to_string(), "Old".into());
        doc.insert("whatToSay".to_string(), "note".into());
        doc.insert("color".to_string(), "green".into());
        doc.insert("createdAt".to_string(), store::server_timestamp());
        store.insert(Collection::RetroItems, doc).unwrap();

        assert_eq!(count_orphaned(&store).unwrap(), 1);
    }

    #[test]
    fn assign_moves_orphans_and_refreshes_timestamps() {
        let store = DocStore::open_in_memory().unwrap();
        let sprint = Sprint::create(&store, "Sprint 1").unwrap();
        let legacy = insert_legacy_item(&store, "Old Dev");

        let updated = assign_orphaned(&store, &sprint.id).unwrap();
        assert_eq!(updated, 1);
        assert_eq!(count_orphaned(&store).unwrap(), 0);

        let items = RetroItem::list(&store, Some(&sprint.id)).unwrap();
        let migrated = items.iter().find(|i| i.id == legacy).unwrap();
        assert_eq!(migrated.sprint_id.as_deref(), Some(sprint.id.as_str()));
        assert!(migrated.updated_at >= migrated.created_at);
    }

    #[test]
    fn assign_is_idempotent_once_drained() {
        let store = DocStore::open_in_memory().unwrap();
        let sprint = Sprint::create(&store, "Sprint 1").unwrap();
        insert_legacy_item(&store, "Old Dev");
        insert_legacy_item(&store, "Old QA");

        assert_eq!(assign_orphaned(&store, &sprint.id).unwrap(), 2);
        assert_eq!(assign_orphaned(&store, &sprint.id).unwrap(), 0);
    }

    #[test]
    fn assign_rejects_empty_sprint_id() {
        let store = DocStore::open_in_memory().unwrap();
        let err = assign_orphaned(&store, "").unwrap_err();
        assert!(matches!(err, RetroError::SprintIdRequired(_)));
    }

    #[test]
    fn assign_leaves_owned_items_alone() {
        let store = DocStore::open_in_memory().unwrap();
        let a = Sprint::create(&store, "A").unwrap();
        let b = Sprint::create(&store, "B").unwrap();
        let owned = RetroItem::create(&store, &draft(), &a.id).unwrap();
        insert_legacy_item(&store, "Old Dev");

        assign_orphaned(&store, &b.id).unwrap();

        let still_owned = RetroItem::list(&store, Some(&a.id)).unwrap();
        assert_eq!(still_owned.len(), 1);
        assert_eq!(still_owned[0].id, owned.id);
        assert_eq!(RetroItem::list(&store, Some(&b.id)).unwrap().len(), 1);
    }
}
