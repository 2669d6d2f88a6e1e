//! # Blueprints
//!
//! A blueprint declares the editable sections of one theme. It is loaded
//! once per theme and never mutated afterwards.
//!
//! ## Array roles
//!
//! Stored array content is not guaranteed to be ordered by role: the bride
//! may come before the groom. Array sections therefore name their logical
//! elements with [`ArrayRole`]s, each selected by a [`Matcher`] predicate.
//! When several elements satisfy a predicate the first one wins.

use crate::{FieldKind, FieldValue, ModelError, ModelResult, SubRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    /// Component discriminator written on new records
    /// (e.g. `invitation-details.wedding-details`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,

    #[serde(alias = "title", alias = "name")]
    pub display_name: String,

    pub fields: Vec<Field>,

    #[serde(default)]
    pub is_array: bool,

    /// Fields live directly on the record instead of a sub-object.
    #[serde(default, skip_serializing_if = "is_false")]
    pub flatten: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<ArrayRole>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_label: Option<ItemLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(alias = "id")]
    pub key: String,

    pub label: String,

    #[serde(default, alias = "type")]
    pub kind: FieldKind,

    #[serde(default)]
    pub required: bool,

    /// Top-level document attribute used to prefill this field when empty.
    #[serde(default, alias = "inferredFrom", skip_serializing_if = "Option::is_none")]
    pub legacy_inference_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// One logical element of an array section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayRole {
    /// Flat-form key prefix: `groom` gives `groomName`, `groomFullName`, ...
    pub prefix: String,

    pub label: String,

    pub matcher: Matcher,

    /// Values used when the form leaves a field empty.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, String>,
}

/// Predicate selecting an array element for a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Matcher {
    /// Exact match on a discriminator field.
    Equals { field: String, value: String },

    /// Case-insensitive substring match on any of `needles`.
    Contains { field: String, needles: Vec<String> },
}

/// Heading shown for each element of an array section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "camelCase")]
pub enum ItemLabel {
    /// Label of the first role whose matcher accepts the element.
    Role,
    /// Value of a field, or `fallback` when blank.
    Field { key: String, fallback: String },
    /// `"{prefix} {n}"`, one-based.
    Indexed { prefix: String },
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Blueprint {
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            component: None,
            sections,
        }
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn from_json(json: &str) -> ModelResult<Self> {
        let blueprint: Blueprint = serde_json::from_str(json)?;
        blueprint.validate()?;
        Ok(blueprint)
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn field(&self, section_id: &str, key: &str) -> Option<(&Section, &Field)> {
        let section = self.section(section_id)?;
        let field = section.field(key)?;
        Some((section, field))
    }

    /// Check structural constraints the mapper relies on.
    pub fn validate(&self) -> ModelResult<()> {
        let mut section_ids = HashSet::new();
        for section in &self.sections {
            if section.id.is_empty() || section.id.contains('.') {
                return Err(ModelError::Blueprint(format!(
                    "invalid section id '{}'",
                    section.id
                )));
            }
            if !section_ids.insert(section.id.as_str()) {
                return Err(ModelError::Blueprint(format!(
                    "duplicate section '{}'",
                    section.id
                )));
            }
            section.validate()?;
        }
        Ok(())
    }
}

impl Section {
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn has_roles(&self) -> bool {
        !self.roles.is_empty()
    }

    /// Flat-form key of `field` for `role`.
    pub fn flat_key(role: &ArrayRole, field: &Field) -> String {
        let mut chars = field.key.chars();
        match chars.next() {
            Some(first) => format!("{}{}{}", role.prefix, first.to_uppercase(), chars.as_str()),
            None => role.prefix.clone(),
        }
    }

    /// Reverse of [`Section::flat_key`].
    pub fn role_field(&self, flat_key: &str) -> Option<(&ArrayRole, &Field)> {
        self.roles.iter().find_map(|role| {
            self.fields
                .iter()
                .find(|field| Section::flat_key(role, field) == flat_key)
                .map(|field| (role, field))
        })
    }

    /// Element index of each role, in role order.
    ///
    /// A role takes the first element its matcher accepts that no earlier
    /// role has taken, so two roles never share an element.
    pub fn role_indices(&self, elements: &[SubRecord]) -> Vec<Option<usize>> {
        let mut claimed = vec![false; elements.len()];
        self.roles
            .iter()
            .map(|role| {
                let index = (0..elements.len())
                    .find(|&i| !claimed[i] && role.matcher.matches(&elements[i]))?;
                claimed[index] = true;
                Some(index)
            })
            .collect()
    }

    /// Element index of `role`, as assigned by [`Section::role_indices`].
    pub fn role_index(&self, role: &ArrayRole, elements: &[SubRecord]) -> Option<usize> {
        let position = self.roles.iter().position(|r| r.prefix == role.prefix)?;
        self.role_indices(elements).get(position).copied().flatten()
    }

    pub fn item_label(&self, element: &SubRecord, index: usize) -> String {
        match &self.item_label {
            Some(ItemLabel::Role) => self
                .roles
                .iter()
                .find(|role| role.matcher.matches(element))
                .map(|role| role.label.clone())
                .unwrap_or_else(|| format!("Item {}", index + 1)),
            Some(ItemLabel::Field { key, fallback }) => match element.values.get(key) {
                Some(value) if !value.is_blank() => value.to_string(),
                _ => fallback.clone(),
            },
            Some(ItemLabel::Indexed { prefix }) => format!("{} {}", prefix, index + 1),
            None => format!("Item {}", index + 1),
        }
    }

    fn validate(&self) -> ModelResult<()> {
        let err = |msg: String| Err(ModelError::Blueprint(format!("section '{}': {}", self.id, msg)));

        if self.is_array && self.flatten {
            return err("array sections cannot be flattened".into());
        }
        if !self.is_array && !self.roles.is_empty() {
            return err("roles require an array section".into());
        }

        let mut keys = HashSet::new();
        for field in &self.fields {
            if field.key.is_empty() || field.key.contains('.') {
                return err(format!("invalid field key '{}'", field.key));
            }
            if !keys.insert(field.key.as_str()) {
                return err(format!("duplicate field '{}'", field.key));
            }
        }

        let mut flat_keys = HashSet::new();
        for role in &self.roles {
            for field in &self.fields {
                if !flat_keys.insert(Section::flat_key(role, field)) {
                    return err(format!("role '{}' produces a duplicate flat key", role.prefix));
                }
            }
        }
        Ok(())
    }
}

impl Field {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            required: false,
            legacy_inference_key: None,
            placeholder: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn inferred_from(mut self, attribute: impl Into<String>) -> Self {
        self.legacy_inference_key = Some(attribute.into());
        self
    }
}

impl Matcher {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Matcher::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, needles: &[&str]) -> Self {
        Matcher::Contains {
            field: field.into(),
            needles: needles.iter().map(|n| n.to_lowercase()).collect(),
        }
    }

    pub fn matches(&self, element: &SubRecord) -> bool {
        match self {
            Matcher::Equals { field, value } => {
                matches!(element.values.get(field), Some(FieldValue::Text(v)) if v == value)
            }
            Matcher::Contains { field, needles } => match element.values.get(field) {
                Some(FieldValue::Text(v)) => {
                    let haystack = v.to_lowercase();
                    needles.iter().any(|n| haystack.contains(&n.to_lowercase()))
                }
                _ => false,
            },
        }
    }

    /// Field and value that reconstruction must write so the element keeps
    /// matching. Only exact matchers have one.
    pub fn discriminator(&self) -> Option<(&str, &str)> {
        match self {
            Matcher::Equals { field, value } => Some((field.as_str(), value.as_str())),
            Matcher::Contains { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(pairs: &[(&str, &str)]) -> SubRecord {
        let mut record = SubRecord::default();
        for (k, v) in pairs {
            record.values.insert(k.to_string(), FieldValue::text(*v));
        }
        record
    }

    #[test]
    fn test_flat_key_round_trip() {
        let role = ArrayRole {
            prefix: "groom".into(),
            label: "Groom".into(),
            matcher: Matcher::equals("gender", "male"),
            defaults: BTreeMap::new(),
        };
        let field = Field::new("fullName", "Full Name", FieldKind::Text);
        assert_eq!(Section::flat_key(&role, &field), "groomFullName");

        let section = Section {
            id: "coupleDetails".into(),
            display_name: "Couple".into(),
            fields: vec![field],
            is_array: true,
            flatten: false,
            roles: vec![role],
            item_label: None,
        };
        let (role, field) = section.role_field("groomFullName").unwrap();
        assert_eq!(role.prefix, "groom");
        assert_eq!(field.key, "fullName");
        assert!(section.role_field("brideFullName").is_none());
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let matcher = Matcher::contains("eventName", &["Resepsi", "reception"]);
        assert!(matcher.matches(&element(&[("eventName", "Wedding RECEPTION")])));
        assert!(matcher.matches(&element(&[("eventName", "resepsi pernikahan")])));
        assert!(!matcher.matches(&element(&[("eventName", "Akad Nikah")])));
        assert!(!matcher.matches(&SubRecord::default()));
    }

    fn role(prefix: &str, matcher: Matcher) -> ArrayRole {
        ArrayRole {
            prefix: prefix.into(),
            label: prefix.into(),
            matcher,
            defaults: BTreeMap::new(),
        }
    }

    fn role_section(roles: Vec<ArrayRole>) -> Section {
        Section {
            id: "items".into(),
            display_name: "Items".into(),
            fields: vec![],
            is_array: true,
            flatten: false,
            roles,
            item_label: None,
        }
    }

    #[test]
    fn test_first_match_wins() {
        let section = role_section(vec![role("groom", Matcher::equals("gender", "male"))]);
        let elements = vec![
            element(&[("gender", "female")]),
            element(&[("gender", "male"), ("name", "A")]),
            element(&[("gender", "male"), ("name", "B")]),
        ];
        assert_eq!(section.role_index(&section.roles[0], &elements), Some(1));
    }

    #[test]
    fn test_roles_never_share_an_element() {
        let section = role_section(vec![
            role("akad", Matcher::contains("eventName", &["akad"])),
            role("resepsi", Matcher::contains("eventName", &["resepsi"])),
        ]);

        let both = vec![
            element(&[("eventName", "Akad & Resepsi")]),
            element(&[("eventName", "Resepsi")]),
        ];
        assert_eq!(section.role_indices(&both), vec![Some(0), Some(1)]);

        let only_shared = vec![element(&[("eventName", "Akad & Resepsi")])];
        assert_eq!(section.role_indices(&only_shared), vec![Some(0), None]);
        assert_eq!(section.role_index(&section.roles[1], &only_shared), None);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let section = Section {
            id: "cover".into(),
            display_name: "Cover".into(),
            fields: vec![
                Field::new("title", "Title", FieldKind::Text),
                Field::new("title", "Title again", FieldKind::Text),
            ],
            is_array: false,
            flatten: false,
            roles: vec![],
            item_label: None,
        };
        assert!(Blueprint::new(vec![section]).validate().is_err());
    }

    #[test]
    fn test_deserialize_original_shape() {
        let json = r#"{
            "sections": [{
                "id": "cover",
                "name": "Cover Section",
                "fields": [
                    { "id": "title", "label": "Title", "type": "text", "inferredFrom": "invitationTitle" },
                    { "id": "quote", "label": "Quote", "type": "textarea" }
                ]
            }]
        }"#;
        let blueprint = Blueprint::from_json(json).unwrap();
        let (section, field) = blueprint.field("cover", "title").unwrap();
        assert_eq!(section.display_name, "Cover Section");
        assert_eq!(field.legacy_inference_key.as_deref(), Some("invitationTitle"));
        assert_eq!(blueprint.field("cover", "quote").unwrap().1.kind, FieldKind::Multiline);
    }

    #[test]
    fn test_item_label_variants() {
        let mut section = Section {
            id: "eventDetails".into(),
            display_name: "Events".into(),
            fields: vec![],
            is_array: true,
            flatten: false,
            roles: vec![],
            item_label: Some(ItemLabel::Field {
                key: "eventName".into(),
                fallback: "Event".into(),
            }),
        };
        assert_eq!(section.item_label(&element(&[("eventName", "Akad")]), 0), "Akad");
        assert_eq!(section.item_label(&SubRecord::default(), 0), "Event");

        section.item_label = None;
        assert_eq!(section.item_label(&SubRecord::default(), 2), "Item 3");
    }
}
