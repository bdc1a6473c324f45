use crate::error::{Result, RetroError};
use crate::store::{self, Collection, DocStore, Document};
use crate::types::SentimentColor;
use crate::validate::{ItemDraft, ItemPatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RetroItem
// ---------------------------------------------------------------------------

/// A single feedback note on the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetroItem {
    pub id: String,
    /// Absent only on legacy rows written before sprints existed.
    pub sprint_id: Option<String>,
    pub who_am_i: String,
    pub what_to_say: String,
    pub action_items: String,
    pub color: SentimentColor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored shape. Legacy rows may lack `sprintId` and `updatedAt`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetroItemDoc {
    #[serde(default)]
    sprint_id: Option<String>,
    who_am_i: String,
    what_to_say: String,
    #[serde(default)]
    action_items: String,
    color: SentimentColor,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl RetroItem {
    fn from_doc(id: String, doc: Document) -> Result<Self> {
        let doc: RetroItemDoc = serde_json::from_value(serde_json::Value::Object(doc))?;
        Ok(RetroItem {
            id,
            sprint_id: doc.sprint_id,
            who_am_i: doc.who_am_i,
            what_to_say: doc.what_to_say,
            action_items: doc.action_items,
            color: doc.color,
            created_at: doc.created_at,
            // Rows older than the update-tracking schema fall back to their
            // creation time.
            updated_at: doc.updated_at.unwrap_or(doc.created_at),
        })
    }

    /// True when the action-items field carries something beyond whitespace.
    pub fn has_action_items(&self) -> bool {
        !self.action_items.trim().is_empty()
    }

    // ---------------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------------

    /// Insert a note under `sprint_id`. Creation and update time are stamped
    /// identically by the store; the returned entity carries the resolved
    /// values read back from the store.
    pub fn create(store: &DocStore, draft: &ItemDraft, sprint_id: &str) -> Result<RetroItem> {
        if sprint_id.is_empty() {
            return Err(RetroError::SprintIdRequired("add a retro item"));
        }

        let mut doc = Document::new();
        doc.insert("sprintId".to_string(), sprint_id.into());
        doc.insert("whoAmI".to_string(), draft.who_am_i.as_str().into());
        doc.insert("whatToSay".to_string(), draft.what_to_say.as_str().into());
        doc.insert(
            "actionItems".to_string(),
            draft.action_items.as_str().into(),
        );
        doc.insert("color".to_string(), serde_json::to_value(draft.color)?);
        doc.insert("createdAt".to_string(), store::server_timestamp());
        doc.insert("updatedAt".to_string(), store::server_timestamp());

        let id = store.insert(Collection::RetroItems, doc)?;
        let resolved = store
            .get(Collection::RetroItems, &id)?
            .ok_or_else(|| RetroError::Store(format!("inserted item missing: {id}")))?;
        Self::from_doc(id, resolved)
    }

    /// Items belonging to `sprint_id`, newest first. `None` yields an empty
    /// list; there is no implicit "all items" fallback.
    pub fn list(store: &DocStore, sprint_id: Option<&str>) -> Result<Vec<RetroItem>> {
        let Some(sprint_id) = sprint_id else {
            return Ok(Vec::new());
        };
        let mut items = store
            .list_where(Collection::RetroItems, "sprintId", sprint_id)?
            .into_iter()
            .map(|(id, doc)| Self::from_doc(id, doc))
            .collect::<Result<Vec<_>>>()?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    /// Patch the supplied fields of one item and refresh its update
    /// timestamp. The sprint association is never changed here.
    pub fn update(store: &DocStore, id: &str, patch: &ItemPatch) -> Result<()> {
        if store.get(Collection::RetroItems, id)?.is_none() {
            return Err(RetroError::ItemNotFound(id.to_string()));
        }

        let mut doc = Document::new();
        if let Some(who) = &patch.who_am_i {
            doc.insert("whoAmI".to_string(), who.as_str().into());
        }
        if let Some(say) = &patch.what_to_say {
            doc.insert("whatToSay".to_string(), say.as_str().into());
        }
        if let Some(action) = &patch.action_items {
            doc.insert("actionItems".to_string(), action.as_str().into());
        }
        if let Some(color) = patch.color {
            doc.insert("color".to_string(), serde_json::to_value(color)?);
        }
        doc.insert("updatedAt".to_string(), store::server_timestamp());

        store.update(Collection::RetroItems, id, doc)
    }

    /// Remove a single note. Removing an absent id is not an error.
    pub fn delete(store: &DocStore, id: &str) -> Result<()> {
        store.delete(Collection::RetroItems, id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
