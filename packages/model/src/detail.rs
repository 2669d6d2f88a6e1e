//! # Detail Trees
//!
//! Backend-shaped structured content. One [`DetailRecord`] holds scalar
//! fields, single sub-objects and arrays of sub-records:
//!
//! ```json
//! [{
//!   "id": 7,
//!   "__component": "invitation-details.wedding-details",
//!   "additionalNote": "See you there",
//!   "coverSection": { "id": 3, "title": "A & B" },
//!   "coupleDetails": [{ "id": 11, "gender": "male", "name": "A" }]
//! }]
//! ```
//!
//! Existing records and sub-records carry the backend `id`; records created
//! locally have none until the store assigns one.

use crate::{FieldValue, ModelResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Deref;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetailTree(Vec<DetailRecord>);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(rename = "__component", default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    #[serde(flatten)]
    pub slots: BTreeMap<String, Slot>,
}

/// Value stored under one key of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slot {
    List(Vec<SubRecord>),
    Group(SubRecord),
    Value(FieldValue),
}

/// A nested sub-object or array element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(flatten)]
    pub values: BTreeMap<String, FieldValue>,
}

impl DetailTree {
    pub fn new(records: Vec<DetailRecord>) -> Self {
        Self(records)
    }

    pub fn single(record: DetailRecord) -> Self {
        Self(vec![record])
    }

    pub fn from_json(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The authoritative record.
    pub fn primary(&self) -> Option<&DetailRecord> {
        self.0.first()
    }

    pub fn primary_mut(&mut self) -> Option<&mut DetailRecord> {
        self.0.first_mut()
    }

    /// The authoritative record, created empty if the tree has none.
    pub fn primary_or_insert(&mut self) -> &mut DetailRecord {
        if self.0.is_empty() {
            self.0.push(DetailRecord::default());
        }
        &mut self.0[0]
    }

    pub fn records_mut(&mut self) -> &mut Vec<DetailRecord> {
        &mut self.0
    }

    pub fn into_records(self) -> Vec<DetailRecord> {
        self.0
    }
}

impl Deref for DetailTree {
    type Target = [DetailRecord];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<DetailRecord>> for DetailTree {
    fn from(records: Vec<DetailRecord>) -> Self {
        Self(records)
    }
}

impl DetailRecord {
    pub fn new(component: Option<String>) -> Self {
        Self {
            id: None,
            component,
            slots: BTreeMap::new(),
        }
    }

    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        match self.slots.get(key)? {
            Slot::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn group(&self, key: &str) -> Option<&SubRecord> {
        match self.slots.get(key)? {
            Slot::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn list(&self, key: &str) -> Option<&[SubRecord]> {
        match self.slots.get(key)? {
            Slot::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn list_mut(&mut self, key: &str) -> Option<&mut Vec<SubRecord>> {
        match self.slots.get_mut(key)? {
            Slot::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: FieldValue) {
        self.slots.insert(key.into(), Slot::Value(value));
    }

    /// Sub-object under `key`, created when missing or null.
    ///
    /// Returns `None` when the key holds a different kind of slot.
    pub fn ensure_group(&mut self, key: &str) -> Option<&mut SubRecord> {
        if self.is_vacant(key) {
            self.slots.insert(key.to_string(), Slot::Group(SubRecord::default()));
        }
        match self.slots.get_mut(key)? {
            Slot::Group(g) => Some(g),
            _ => None,
        }
    }

    fn is_vacant(&self, key: &str) -> bool {
        matches!(self.slots.get(key), None | Some(Slot::Value(FieldValue::Null)))
    }
}

impl SubRecord {
    pub fn with_id(id: u64) -> Self {
        Self {
            id: Some(id),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: FieldValue) {
        self.values.insert(key.into(), value);
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(key, value.into());
        self
    }
}
