//! # Persistence
//!
//! Loading and saving documents through a [`DocumentStore`].
//!
//! Outgoing payloads never carry internal ids and never carry empty
//! values; the store matches elements to what it already holds and
//! assigns ids to new ones. [`MemoryStore`] and [`FileStore`] do that by
//! position.

use crate::StoreError;
use async_trait::async_trait;
use folio_model::{DetailRecord, DetailTree, FieldValue, Slot, SubRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

pub type StoreResult<T> = Result<T, StoreError>;

/// A document as held by a store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: String,

    /// Theme slug selecting the blueprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// Legacy top-level attributes (`invitationTitle`, `eventDate`, ...).
    #[serde(default)]
    pub attributes: BTreeMap<String, FieldValue>,

    #[serde(default, alias = "typeSpecificDetails")]
    pub details: DetailTree,
}

/// Remote document storage.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    async fn fetch(&self, id: &str) -> StoreResult<StoredDocument>;

    /// Replace the details of a document with `payload` (see [`to_payload`])
    /// and return the stored result.
    async fn update(&self, id: &str, payload: Value) -> StoreResult<StoredDocument>;
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn fetch(&self, id: &str) -> StoreResult<StoredDocument> {
        (**self).fetch(id).await
    }

    async fn update(&self, id: &str, payload: Value) -> StoreResult<StoredDocument> {
        (**self).update(id, payload).await
    }
}

/// Serialize a tree for an update request.
///
/// Ids are stripped at every level; null and empty-string values are
/// omitted.
pub fn to_payload(tree: &DetailTree) -> Value {
    Value::Array(tree.iter().map(record_payload).collect())
}

fn record_payload(record: &DetailRecord) -> Value {
    let mut object = Map::new();
    if let Some(component) = &record.component {
        object.insert("__component".into(), Value::String(component.clone()));
    }
    for (key, slot) in &record.slots {
        match slot {
            Slot::Value(value) if value.is_blank() => {}
            Slot::Value(value) => {
                object.insert(key.clone(), value_payload(value));
            }
            Slot::Group(group) => {
                object.insert(key.clone(), sub_payload(group));
            }
            Slot::List(items) => {
                object.insert(key.clone(), Value::Array(items.iter().map(sub_payload).collect()));
            }
        }
    }
    Value::Object(object)
}

fn sub_payload(sub: &SubRecord) -> Value {
    Value::Object(
        sub.values
            .iter()
            .filter(|(_, v)| !v.is_blank())
            .map(|(k, v)| (k.clone(), value_payload(v)))
            .collect(),
    )
}

fn value_payload(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Number(n) => Value::Number(n.clone()),
        FieldValue::Text(s) => Value::String(s.clone()),
    }
}

/// Give every record and sub-record of `tree` an id, reusing the id of the
/// element at the same position in `previous`.
pub fn assign_identities(tree: &mut DetailTree, previous: &DetailTree, next_id: &mut dyn FnMut() -> u64) {
    for (index, record) in tree.records_mut().iter_mut().enumerate() {
        let prior = previous.get(index);
        record.id = record.id.or_else(|| prior.and_then(|p| p.id)).or_else(|| Some(next_id()));

        for (key, slot) in record.slots.iter_mut() {
            match slot {
                Slot::Group(group) => {
                    let prior_id = prior.and_then(|p| p.group(key)).and_then(|g| g.id);
                    group.id = group.id.or(prior_id).or_else(|| Some(next_id()));
                }
                Slot::List(items) => {
                    let prior_items = prior.and_then(|p| p.list(key)).unwrap_or(&[]);
                    for (i, item) in items.iter_mut().enumerate() {
                        let prior_id = prior_items.get(i).and_then(|p| p.id);
                        item.id = item.id.or(prior_id).or_else(|| Some(next_id()));
                    }
                }
                Slot::Value(_) => {}
            }
        }
    }
}

fn max_id(tree: &DetailTree) -> u64 {
    let mut max = 0;
    for record in tree.iter() {
        max = max.max(record.id.unwrap_or(0));
        for slot in record.slots.values() {
            match slot {
                Slot::Group(group) => max = max.max(group.id.unwrap_or(0)),
                Slot::List(items) => {
                    for item in items {
                        max = max.max(item.id.unwrap_or(0));
                    }
                }
                Slot::Value(_) => {}
            }
        }
    }
    max
}

/// In-memory store, used by tests and demos.
#[derive(Debug)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, StoredDocument>>,
    failure: Mutex<Option<(u16, String)>>,
    next_id: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            next_id: AtomicU64::new(1000),
        }
    }

    pub fn insert(&self, document: StoredDocument) {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(document.id.clone(), document);
    }

    pub fn document(&self, id: &str) -> Option<StoredDocument> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Make every following update fail with `status`.
    pub fn fail_updates_with(&self, status: u16, message: impl Into<String>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some((status, message.into()));
    }

    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch(&self, id: &str) -> StoreResult<StoredDocument> {
        self.document(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, payload: Value) -> StoreResult<StoredDocument> {
        if let Some((status, message)) = self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(StoreError::Status { status, message });
        }

        let mut details: DetailTree = serde_json::from_value(payload)?;
        let mut documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        let document = documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let next_id = &self.next_id;
        assign_identities(&mut details, &document.details, &mut || {
            next_id.fetch_add(1, Ordering::Relaxed)
        });
        document.details = details;
        Ok(document.clone())
    }
}

/// One JSON file per document: `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn path(&self, id: &str) -> StoreResult<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(StoreError::Status {
                status: 400,
                message: format!("invalid document id '{}'", id),
            });
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }

    /// Write a new document, assigning ids to its content.
    pub async fn create(&self, mut document: StoredDocument) -> StoreResult<StoredDocument> {
        let path = self.path(&document.id)?;
        if tokio::fs::try_exists(&path).await? {
            return Err(StoreError::Status {
                status: 409,
                message: format!("document '{}' already exists", document.id),
            });
        }

        let mut next = 1;
        assign_identities(&mut document.details, &DetailTree::default(), &mut || {
            let id = next;
            next += 1;
            id
        });
        self.write(&document).await?;
        tracing::info!("Created document '{}' at {:?}", document.id, path);
        Ok(document)
    }

    /// Ids of all stored documents, sorted.
    pub async fn list(&self) -> StoreResult<Vec<String>> {
        let mut ids = Vec::new();
        if !tokio::fs::try_exists(&self.dir).await? {
            return Ok(ids);
        }
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn write(&self, document: &StoredDocument) -> StoreResult<()> {
        let path = self.path(&document.id)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_string_pretty(document)?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch(&self, id: &str) -> StoreResult<StoredDocument> {
        let path = self.path(id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let mut document: StoredDocument = serde_json::from_str(&content)?;
        if document.id.is_empty() {
            document.id = id.to_string();
        }
        Ok(document)
    }

    async fn update(&self, id: &str, payload: Value) -> StoreResult<StoredDocument> {
        let mut document = self.fetch(id).await?;
        let mut details: DetailTree = serde_json::from_value(payload)?;

        let mut next = max_id(&document.details) + 1;
        assign_identities(&mut details, &document.details, &mut || {
            let id = next;
            next += 1;
            id
        });
        document.details = details;
        self.write(&document).await?;
        tracing::debug!("Updated document '{}'", id);
        Ok(document)
    }
}
