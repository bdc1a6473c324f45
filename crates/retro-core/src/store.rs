//! Document store backed by redb.
//!
//! Two collections (`sprints`, `retroItems`), each a redb table keyed by a
//! generated uuid string with JSON-encoded documents as values. A
//! [`WriteBatch`] groups deletes and updates into one redb write
//! transaction, which commits all-or-nothing; cascade deletion and orphan
//! reassignment lean on that.
//!
//! Timestamps are store-assigned: writers put [`server_timestamp`] sentinels
//! into the document and the store's clock resolves every sentinel in a
//! commit to the same instant. Readers get the resolved value; callers that
//! need the authoritative timestamp read the document back after writing.

use crate::error::{Result, RetroError};
use chrono::{SecondsFormat, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// A stored document: the top-level JSON object, without its key.
pub type Document = serde_json::Map<String, serde_json::Value>;

const SPRINTS: TableDefinition<&str, &[u8]> = TableDefinition::new("sprints");
const RETRO_ITEMS: TableDefinition<&str, &[u8]> = TableDefinition::new("retroItems");

/// Marker value resolved to the store clock at commit time.
const SERVER_TIMESTAMP: &str = "__serverTimestamp__";

/// Sentinel for a store-assigned timestamp field.
pub fn server_timestamp() -> serde_json::Value {
    serde_json::Value::String(SERVER_TIMESTAMP.to_string())
}

fn db_err<E: fmt::Display>(e: E) -> RetroError {
    RetroError::Store(e.to_string())
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Sprints,
    RetroItems,
}

impl Collection {
    fn table(self) -> TableDefinition<'static, &'static str, &'static [u8]> {
        match self {
            Collection::Sprints => SPRINTS,
            Collection::RetroItems => RETRO_ITEMS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Sprints => "sprints",
            Collection::RetroItems => "retroItems",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DocStore
// ---------------------------------------------------------------------------

/// Handle to the document database. Passed explicitly into every service
/// operation; open on a file for the server, in memory for tests.
pub struct DocStore {
    db: Database,
}

impl DocStore {
    /// Open or create the database file at `path`, ensuring both collection
    /// tables exist before any reads.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).map_err(db_err)?;
        let store = Self { db };
        store.ensure_tables()?;
        Ok(store)
    }

    /// A fully in-memory store with the same semantics, for tests.
    pub fn open_in_memory() -> Result<Self> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(db_err)?;
        let store = Self { db };
        store.ensure_tables()?;
        Ok(store)
    }

    fn ensure_tables(&self) -> Result<()> {
        let wt = self.db.begin_write().map_err(db_err)?;
        wt.open_table(SPRINTS).map_err(db_err)?;
        wt.open_table(RETRO_ITEMS).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        Ok(())
    }

    fn now_string() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn resolve_sentinels(doc: &mut Document, now: &str) {
        for value in doc.values_mut() {
            if value.as_str() == Some(SERVER_TIMESTAMP) {
                *value = serde_json::Value::String(now.to_string());
            }
        }
    }

    /// Insert a new document under a generated id and return that id.
    pub fn insert(&self, collection: Collection, mut doc: Document) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = Self::now_string();
        Self::resolve_sentinels(&mut doc, &now);
        let value = serde_json::to_vec(&serde_json::Value::Object(doc))?;

        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = wt.open_table(collection.table()).map_err(db_err)?;
            table
                .insert(id.as_str(), value.as_slice())
                .map_err(db_err)?;
        }
        wt.commit().map_err(db_err)?;
        Ok(id)
    }

    /// Fetch a single document, `None` if absent.
    pub fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(collection.table()).map_err(db_err)?;
        match table.get(id).map_err(db_err)? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All documents in a collection, in unspecified order.
    pub fn list_all(&self, collection: Collection) -> Result<Vec<(String, Document)>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(collection.table()).map_err(db_err)?;

        let mut result = Vec::new();
        for entry in table.iter().map_err(db_err)? {
            let (k, v) = entry.map_err(db_err)?;
            result.push((k.value().to_string(), decode(v.value())?));
        }
        Ok(result)
    }

    /// Documents whose top-level `field` equals the string `value`.
    pub fn list_where(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<(String, Document)>> {
        let all = self.list_all(collection)?;
        Ok(all
            .into_iter()
            .filter(|(_, doc)| doc.get(field).and_then(|v| v.as_str()) == Some(value))
            .collect())
    }

    /// Merge `patch` into an existing document. Errors if the document does
    /// not exist; sentinels in the patch resolve to the commit instant.
    pub fn update(&self, collection: Collection, id: &str, mut patch: Document) -> Result<()> {
        let now = Self::now_string();
        Self::resolve_sentinels(&mut patch, &now);

        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = wt.open_table(collection.table()).map_err(db_err)?;
            let mut doc = match table.get(id).map_err(db_err)? {
                Some(guard) => decode(guard.value())?,
                None => {
                    return Err(RetroError::Store(format!(
                        "document not found: {collection}/{id}"
                    )))
                }
            };
            for (k, v) in patch {
                doc.insert(k, v);
            }
            let value = serde_json::to_vec(&serde_json::Value::Object(doc))?;
            table
                .insert(id, value.as_slice())
                .map_err(db_err)?;
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }

    /// Remove a single document. Removing an absent id is not an error.
    pub fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = wt.open_table(collection.table()).map_err(db_err)?;
            table.remove(id).map_err(db_err)?;
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }

    /// Start an empty write batch against this store.
    pub fn batch(&self) -> WriteBatch<'_> {
        WriteBatch {
            store: self,
            ops: Vec::new(),
        }
    }
}

fn decode(bytes: &[u8]) -> Result<Document> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(RetroError::Store(format!(
            "expected a JSON object document, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// WriteBatch
// ---------------------------------------------------------------------------

enum BatchOp {
    Delete {
        collection: Collection,
        id: String,
    },
    Update {
        collection: Collection,
        id: String,
        patch: Document,
    },
}

/// A bounded list of deletes and updates committed in one redb write
/// transaction. Either every operation applies or none does: any failure
/// (including an update against a missing document) aborts the transaction.
pub struct WriteBatch<'a> {
    store: &'a DocStore,
    ops: Vec<BatchOp>,
}

impl WriteBatch<'_> {
    pub fn delete(&mut self, collection: Collection, id: &str) {
        self.ops.push(BatchOp::Delete {
            collection,
            id: id.to_string(),
        });
    }

    pub fn update(&mut self, collection: Collection, id: &str, patch: Document) {
        self.ops.push(BatchOp::Update {
            collection,
            id: id.to_string(),
            patch,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Commit every queued operation atomically. An empty batch is a no-op
    /// that performs zero writes.
    pub fn commit(self) -> Result<()> {
        if self.ops.is_empty() {
            return Ok(());
        }
        let now = DocStore::now_string();

        let wt = self.store.db.begin_write().map_err(db_err)?;
        for op in self.ops {
            match op {
                BatchOp::Delete { collection, id } => {
                    let mut table = wt.open_table(collection.table()).map_err(db_err)?;
                    table.remove(id.as_str()).map_err(db_err)?;
                }
                BatchOp::Update {
                    collection,
                    id,
                    mut patch,
                } => {
                    DocStore::resolve_sentinels(&mut patch, &now);
                    let mut table = wt.open_table(collection.table()).map_err(db_err)?;
                    let mut doc = match table.get(id.as_str()).map_err(db_err)? {
                        Some(guard) => decode(guard.value())?,
                        // Dropping `wt` without commit aborts the whole batch.
                        None => {
                            return Err(RetroError::Store(format!(
                                "document not found: {collection}/{id}"
                            )))
                        }
                    };
                    for (k, v) in patch {
                        doc.insert(k, v);
                    }
                    let value = serde_json::to_vec(&serde_json::Value::Object(doc))?;
                    table
                        .insert(id.as_str(), value.as_slice())
                        .map_err(db_err)?;
                }
            }
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn doc(pairs: &[(&str, serde_json::Value)]) -> Document {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn insert_resolves_server_timestamp() {
        let store = DocStore::open_in_memory().unwrap();
        let id = store
            .insert(
                Collection::Sprints,
                doc(&[
                    ("name", "Sprint 1".into()),
                    ("createdAt", server_timestamp()),
                ]),
            )
            .unwrap();

        let fetched = store.get(Collection::Sprints, &id).unwrap().unwrap();
        let created = fetched.get("createdAt").unwrap().as_str().unwrap();
        assert_ne!(created, SERVER_TIMESTAMP);
        created
            .parse::<DateTime<Utc>>()
            .expect("resolved timestamp must be RFC 3339");
    }

    #[test]
    fn sentinels_in_one_commit_resolve_identically() {
        let store = DocStore::open_in_memory().unwrap();
        let id = store
            .insert(
                Collection::RetroItems,
                doc(&[
                    ("createdAt", server_timestamp()),
                    ("updatedAt", server_timestamp()),
                ]),
            )
            .unwrap();
        let fetched = store.get(Collection::RetroItems, &id).unwrap().unwrap();
        assert_eq!(fetched.get("createdAt"), fetched.get("updatedAt"));
    }

    #[test]
    fn get_missing_returns_none() {
        let store = DocStore::open_in_memory().unwrap();
        assert!(store.get(Collection::Sprints, "nope").unwrap().is_none());
    }

    #[test]
    fn update_merges_and_preserves_other_fields() {
        let store = DocStore::open_in_memory().unwrap();
        let id = store
            .insert(
                Collection::RetroItems,
                doc(&[("whoAmI", "Dev".into()), ("whatToSay", "old".into())]),
            )
            .unwrap();

        store
            .update(
                Collection::RetroItems,
                &id,
                doc(&[("whatToSay", "new".into())]),
            )
            .unwrap();

        let fetched = store.get(Collection::RetroItems, &id).unwrap().unwrap();
        assert_eq!(fetched["whatToSay"], "new");
        assert_eq!(fetched["whoAmI"], "Dev");
    }

    #[test]
    fn update_missing_errors() {
        let store = DocStore::open_in_memory().unwrap();
        let err = store
            .update(Collection::RetroItems, "ghost", doc(&[("a", "b".into())]))
            .unwrap_err();
        assert!(matches!(err, RetroError::Store(_)));
    }

    #[test]
    fn delete_missing_is_silent() {
        let store = DocStore::open_in_memory().unwrap();
        store.delete(Collection::RetroItems, "ghost").unwrap();
    }

    #[test]
    fn list_where_filters_by_field() {
        let store = DocStore::open_in_memory().unwrap();
        store
            .insert(Collection::RetroItems, doc(&[("sprintId", "s1".into())]))
            .unwrap();
        store
            .insert(Collection::RetroItems, doc(&[("sprintId", "s2".into())]))
            .unwrap();
        store.insert(Collection::RetroItems, doc(&[])).unwrap();

        let matching = store
            .list_where(Collection::RetroItems, "sprintId", "s1")
            .unwrap();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].1["sprintId"], "s1");
    }

    #[test]
    fn batch_commits_all_or_nothing() {
        let store = DocStore::open_in_memory().unwrap();
        let keep = store
            .insert(Collection::RetroItems, doc(&[("whoAmI", "Dev".into())]))
            .unwrap();

        // A batch whose update targets a missing doc must leave the delete
        // unapplied too.
        let mut batch = store.batch();
        batch.delete(Collection::RetroItems, &keep);
        batch.update(Collection::RetroItems, "ghost", doc(&[("a", "b".into())]));
        assert!(batch.commit().is_err());

        assert!(
            store.get(Collection::RetroItems, &keep).unwrap().is_some(),
            "failed batch must not apply its deletes"
        );
    }

    #[test]
    fn empty_batch_is_noop() {
        let store = DocStore::open_in_memory().unwrap();
        let batch = store.batch();
        assert!(batch.is_empty());
        batch.commit().unwrap();
    }

    #[test]
    fn file_backed_store_persists_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("retro.redb");

        let id = {
            let store = DocStore::open(&path).unwrap();
            store
                .insert(Collection::Sprints, doc(&[("name", "Sprint 1".into())]))
                .unwrap()
        };

        let store = DocStore::open(&path).unwrap();
        let fetched = store.get(Collection::Sprints, &id).unwrap().unwrap();
        assert_eq!(fetched["name"], "Sprint 1");
    }
}
