use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat, string-only projection of a detail tree.
///
/// Keyed by scope (a section id, or `sectionId.index` for elements of
/// positional array sections) and then by flat field key. Empty strings are
/// never stored; a missing key means "no value".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatForm(BTreeMap<String, BTreeMap<String, String>>);

impl FlatForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, scope: &str, key: &str) -> Option<&str> {
        self.0.get(scope)?.get(key).map(String::as_str)
    }

    /// Set a value; an empty value removes the key.
    pub fn set(&mut self, scope: impl Into<String>, key: impl Into<String>, value: impl Into<String>) {
        let scope: String = scope.into();
        let key: String = key.into();
        let value: String = value.into();
        if value.is_empty() {
            self.remove(&scope, &key);
            return;
        }
        self.0.entry(scope).or_default().insert(key, value);
    }

    pub fn remove(&mut self, scope: &str, key: &str) {
        if let Some(fields) = self.0.get_mut(scope) {
            fields.remove(key);
            if fields.is_empty() {
                self.0.remove(scope);
            }
        }
    }

    pub fn scope(&self, scope: &str) -> Option<&BTreeMap<String, String>> {
        self.0.get(scope)
    }

    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Element indices present for a positional array section, ascending.
    pub fn element_indices(&self, section_id: &str) -> Vec<usize> {
        let prefix = format!("{}.", section_id);
        self.0
            .keys()
            .filter_map(|scope| scope.strip_prefix(&prefix)?.parse().ok())
            .collect::<std::collections::BTreeSet<usize>>()
            .into_iter()
            .collect()
    }
}
