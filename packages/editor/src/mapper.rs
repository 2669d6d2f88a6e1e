//! # Bidirectional Mapper
//!
//! Converts between the typed [`DetailTree`] and the string-only
//! [`FlatForm`].
//!
//! ```text
//!            extract
//! DetailTree ───────→ FlatForm
//!     ↑                  │
//!     └──────────────────┘
//!  reconstruct(form, previous)
//! ```
//!
//! Section layouts:
//!
//! | section            | tree slot                    | form scope / key              |
//! |--------------------|------------------------------|-------------------------------|
//! | scalar             | `record[id]` sub-object      | `id` / `field`                |
//! | flattened          | `record[field]`              | `id` / `field`                |
//! | array with roles   | `record[id]` list            | `id` / `prefix + Field`       |
//! | positional array   | `record[id]` list            | `id.index` / `field`          |
//!
//! Reconstruction takes the previous tree so that backend ids, content the
//! blueprint does not describe, and array elements no role selects are
//! carried over unchanged.

use folio_model::{
    Blueprint, DetailRecord, DetailTree, Field, FieldAddress, FieldValue, FlatForm, Section, Slot,
    SubRecord,
};
use std::collections::BTreeMap;

/// Project a tree into a flat form. Null values become absent keys.
pub fn extract(blueprint: &Blueprint, tree: &DetailTree) -> FlatForm {
    let mut form = FlatForm::new();
    let Some(record) = tree.primary() else {
        return form;
    };

    for section in &blueprint.sections {
        if section.flatten {
            for field in &section.fields {
                put(&mut form, &section.id, &field.key, field, record.value(&field.key));
            }
        } else if !section.is_array {
            let group = record.group(&section.id);
            for field in &section.fields {
                put(&mut form, &section.id, &field.key, field, group.and_then(|g| g.get(&field.key)));
            }
        } else if section.has_roles() {
            let elements = record.list(&section.id).unwrap_or(&[]);
            for (role, index) in section.roles.iter().zip(section.role_indices(elements)) {
                let Some(index) = index else {
                    tracing::debug!("No '{}' element in section '{}'", role.prefix, section.id);
                    continue;
                };
                for field in &section.fields {
                    let key = Section::flat_key(role, field);
                    put(&mut form, &section.id, &key, field, elements[index].get(&field.key));
                }
            }
        } else {
            let elements = record.list(&section.id).unwrap_or(&[]);
            for (index, element) in elements.iter().enumerate() {
                let scope = format!("{}.{}", section.id, index);
                for field in &section.fields {
                    put(&mut form, &scope, &field.key, field, element.get(&field.key));
                }
            }
        }
    }

    form
}

fn put(form: &mut FlatForm, scope: &str, key: &str, field: &Field, value: Option<&FieldValue>) {
    if let Some(text) = value.and_then(|v| field.kind.display(v)) {
        form.set(scope, key, text);
    }
}

/// Fields of scalar sections that are empty in the tree but can be
/// prefilled from a legacy top-level attribute.
pub fn infer_legacy(
    blueprint: &Blueprint,
    tree: &DetailTree,
    attributes: &BTreeMap<String, FieldValue>,
) -> Vec<(FieldAddress, String)> {
    let mut inferred = Vec::new();

    for section in blueprint.sections.iter().filter(|s| !s.is_array) {
        for field in &section.fields {
            let Some(attribute) = &field.legacy_inference_key else {
                continue;
            };
            let address = FieldAddress::scalar(&section.id, &field.key);
            let current = crate::resolve(blueprint, &address, tree);
            if current.map(|v| !v.is_blank()).unwrap_or(false) {
                continue;
            }
            if let Some(text) = attributes.get(attribute).and_then(|v| field.kind.display(v)) {
                if !text.is_empty() {
                    tracing::debug!("Inferred {} from attribute '{}'", address, attribute);
                    inferred.push((address, text));
                }
            }
        }
    }

    inferred
}

/// [`extract`], then prefill empty fields from legacy attributes.
pub fn extract_with_inference(
    blueprint: &Blueprint,
    tree: &DetailTree,
    attributes: &BTreeMap<String, FieldValue>,
) -> FlatForm {
    let mut form = extract(blueprint, tree);
    for (address, text) in infer_legacy(blueprint, tree, attributes) {
        form.set(address.scope(), address.field_key, text);
    }
    form
}

/// Build a tree from a flat form.
///
/// Every blueprint field is written (null when the form has no value).
/// Everything else comes from `previous` when given: record and sub-record
/// ids, slots outside the blueprint, extra values on sub-records, and array
/// elements that no role selects.
pub fn reconstruct(blueprint: &Blueprint, form: &FlatForm, previous: Option<&DetailTree>) -> DetailTree {
    let previous = previous.and_then(|tree| tree.primary());
    let mut record = previous
        .cloned()
        .unwrap_or_else(|| DetailRecord::new(blueprint.component.clone()));
    if record.component.is_none() {
        record.component = blueprint.component.clone();
    }

    for section in &blueprint.sections {
        if section.flatten {
            for field in &section.fields {
                record.set_value(field.key.clone(), parse(form, &section.id, &field.key, field));
            }
        } else if !section.is_array {
            let mut group = previous
                .and_then(|r| r.group(&section.id))
                .cloned()
                .unwrap_or_default();
            for field in &section.fields {
                group.set(field.key.clone(), parse(form, &section.id, &field.key, field));
            }
            record.slots.insert(section.id.clone(), Slot::Group(group));
        } else {
            let prior = previous.and_then(|r| r.list(&section.id)).unwrap_or(&[]);
            let elements = if section.has_roles() {
                rebuild_roles(section, form, prior)
            } else {
                rebuild_positional(section, form, prior)
            };
            record.slots.insert(section.id.clone(), Slot::List(elements));
        }
    }

    DetailTree::single(record)
}

fn parse(form: &FlatForm, scope: &str, key: &str, field: &Field) -> FieldValue {
    field.kind.parse(form.get(scope, key).unwrap_or(""))
}

fn rebuild_roles(section: &Section, form: &FlatForm, prior: &[SubRecord]) -> Vec<SubRecord> {
    // Existing elements stay at their index so positional identity survives a save
    let mut elements = prior.to_vec();

    for (role, index) in section.roles.iter().zip(section.role_indices(prior)) {
        let mut element = SubRecord::default();
        for field in &section.fields {
            let key = Section::flat_key(role, field);
            let input = form
                .get(&section.id, &key)
                .or_else(|| role.defaults.get(&field.key).map(String::as_str))
                .unwrap_or("");
            element.set(field.key.clone(), field.kind.parse(input));
        }
        if let Some((field, value)) = role.matcher.discriminator() {
            element.set(field, FieldValue::text(value));
        }

        match index {
            Some(index) => elements[index].values.extend(element.values),
            None => elements.push(element),
        }
    }

    elements
}

fn rebuild_positional(section: &Section, form: &FlatForm, prior: &[SubRecord]) -> Vec<SubRecord> {
    let from_form = form
        .element_indices(&section.id)
        .last()
        .map(|last| last + 1)
        .unwrap_or(0);
    let count = from_form.max(prior.len());

    (0..count)
        .map(|index| {
            let scope = format!("{}.{}", section.id, index);
            let mut element = prior.get(index).cloned().unwrap_or_default();
            for field in &section.fields {
                element.set(field.key.clone(), parse(form, &scope, &field.key, field));
            }
            element
        })
        .collect()
}
