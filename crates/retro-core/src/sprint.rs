use crate::error::{Result, RetroError};
use crate::store::{self, Collection, DocStore, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sprint
// ---------------------------------------------------------------------------

/// A named time-box owning a set of retro items. Never mutated after
/// creation; deletion cascades to the owned items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Stored shape, without the id (which is the document key).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SprintDoc {
    name: String,
    created_at: DateTime<Utc>,
}

impl Sprint {
    fn from_doc(id: String, doc: Document) -> Result<Self> {
        let doc: SprintDoc = serde_json::from_value(serde_json::Value::Object(doc))?;
        Ok(Sprint {
            id,
            name: doc.name,
            created_at: doc.created_at,
        })
    }

    // ---------------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------------

    /// Insert a sprint with a store-assigned creation time and read the
    /// document back so the returned entity carries the resolved timestamp.
    pub fn create(store: &DocStore, name: &str) -> Result<Sprint> {
        let mut doc = Document::new();
        doc.insert("name".to_string(), name.into());
        doc.insert("createdAt".to_string(), store::server_timestamp());

        let id = store.insert(Collection::Sprints, doc)?;
        let resolved = store
            .get(Collection::Sprints, &id)?
            .ok_or_else(|| RetroError::Store(format!("inserted sprint missing: {id}")))?;
        Self::from_doc(id, resolved)
    }

    /// All sprints, newest first.
    pub fn list(store: &DocStore) -> Result<Vec<Sprint>> {
        let mut sprints = store
            .list_all(Collection::Sprints)?
            .into_iter()
            .map(|(id, doc)| Self::from_doc(id, doc))
            .collect::<Result<Vec<_>>>()?;
        sprints.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sprints)
    }

    /// Delete the sprint and every retro item referencing it in one atomic
    /// batch. Deleting an already-absent sprint id is not an error, but an
    /// empty id is rejected before any store access.
    pub fn delete_cascade(store: &DocStore, sprint_id: &str) -> Result<()> {
        if sprint_id.is_empty() {
            return Err(RetroError::SprintIdRequired("delete a sprint"));
        }

        let mut batch = store.batch();
        batch.delete(Collection::Sprints, sprint_id);
        for (item_id, _) in store.list_where(Collection::RetroItems, "sprintId", sprint_id)? {
            batch.delete(Collection::RetroItems, &item_id);
        }
        tracing::debug!(sprint_id, ops = batch.len(), "cascade delete");
        batch.commit()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
