//! # Editable Renderer
//!
//! Produces the two views of a document:
//!
//! - the **preview** ([`render`]): read-only content, or in edit mode the
//!   same content with every field wrapped as an activation target
//! - the **panel** ([`render_panel`]): editing controls, mounted only for
//!   expanded sections of an open panel
//!
//! Preview targets and panel controls share one addressing scheme, so a
//! target's [`ControlKey`] is exactly the key of the control it focuses.
//! Array elements are rendered in storage order and addressed by index.

use crate::Expansion;
use folio_model::{
    Blueprint, ControlKey, ControlKind, DetailRecord, DetailTree, Field, FieldAddress, FieldKind,
    FieldValue, Section,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderMode {
    ReadOnly,
    Edit,
}

/// Emitted by the preview in edit mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewEvent {
    TargetActivated(FieldAddress),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub mode: RenderMode,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    pub id: String,
    pub title: String,
    /// One item for scalar sections, one per element for arrays.
    pub items: Vec<ItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub fields: Vec<LeafView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafView {
    pub label: String,
    pub kind: FieldKind,
    pub text: String,
    /// Present in edit mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<FieldAddress>,
}

pub fn render(blueprint: &Blueprint, tree: &DetailTree, mode: RenderMode) -> View {
    let record = tree.primary();
    let mut sections = Vec::new();

    for section in &blueprint.sections {
        let items: Vec<ItemView> = if section.is_array {
            record
                .and_then(|r| r.list(&section.id))
                .unwrap_or(&[])
                .iter()
                .enumerate()
                .map(|(index, element)| ItemView {
                    label: Some(section.item_label(element, index)),
                    fields: section
                        .fields
                        .iter()
                        .filter_map(|field| {
                            let address = FieldAddress::element(&section.id, &field.key, index);
                            leaf(field, element.get(&field.key), address, mode)
                        })
                        .collect(),
                })
                .collect()
        } else {
            let fields = section
                .fields
                .iter()
                .filter_map(|field| {
                    let address = FieldAddress::scalar(&section.id, &field.key);
                    leaf(field, scalar_value(record, section, field), address, mode)
                })
                .collect();
            vec![ItemView {
                label: None,
                fields,
            }]
        };

        let visible = items.iter().any(|item| !item.fields.is_empty());
        if mode == RenderMode::Edit || visible {
            sections.push(SectionView {
                id: section.id.clone(),
                title: section.display_name.clone(),
                items,
            });
        }
    }

    View { mode, sections }
}

fn scalar_value<'a>(record: Option<&'a DetailRecord>, section: &Section, field: &Field) -> Option<&'a FieldValue> {
    let record = record?;
    if section.flatten {
        record.value(&field.key)
    } else {
        record.group(&section.id)?.get(&field.key)
    }
}

fn leaf(field: &Field, value: Option<&FieldValue>, address: FieldAddress, mode: RenderMode) -> Option<LeafView> {
    let text = value.map(|v| field.kind.preview(v)).unwrap_or_default();
    if mode == RenderMode::ReadOnly && text.is_empty() {
        return None;
    }
    Some(LeafView {
        label: field.label.clone(),
        kind: field.kind,
        text,
        target: (mode == RenderMode::Edit).then_some(address),
    })
}

impl View {
    pub fn leaves(&self) -> impl Iterator<Item = &LeafView> {
        self.sections
            .iter()
            .flat_map(|s| s.items.iter())
            .flat_map(|i| i.fields.iter())
    }

    pub fn targets(&self) -> impl Iterator<Item = &FieldAddress> {
        self.leaves().filter_map(|leaf| leaf.target.as_ref())
    }

    /// Activate the target whose control key renders as `target_id`.
    ///
    /// Returns `false` when no such target exists (read-only mode, or a
    /// stale id).
    pub fn activate(&self, target_id: &str, mut dispatch: impl FnMut(PreviewEvent)) -> bool {
        let found = self
            .targets()
            .find(|address| address.control_key().to_string() == target_id);
        match found {
            Some(address) => {
                dispatch(PreviewEvent::TargetActivated(address.clone()));
                true
            }
            None => {
                tracing::debug!("No preview target '{}'", target_id);
                false
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub open: bool,
    pub sections: Vec<PanelSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSection {
    pub id: String,
    pub title: String,
    pub expanded: bool,
    pub groups: Vec<ControlGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub controls: Vec<ControlView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlView {
    pub key: ControlKey,
    pub address: FieldAddress,
    pub label: String,
    pub control: ControlKind,
    pub value: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// Render the editing panel. Collapsed sections list no controls.
pub fn render_panel(blueprint: &Blueprint, tree: &DetailTree, expansion: &Expansion) -> PanelView {
    let record = tree.primary();
    let open = expansion.is_panel_open();

    let sections = blueprint
        .sections
        .iter()
        .map(|section| {
            let expanded = open && expansion.is_expanded(&section.id);
            let groups = if !expanded {
                Vec::new()
            } else if section.is_array {
                record
                    .and_then(|r| r.list(&section.id))
                    .unwrap_or(&[])
                    .iter()
                    .enumerate()
                    .map(|(index, element)| ControlGroup {
                        label: Some(section.item_label(element, index)),
                        controls: section
                            .fields
                            .iter()
                            .map(|field| {
                                control(field, element.get(&field.key), FieldAddress::element(&section.id, &field.key, index))
                            })
                            .collect(),
                    })
                    .collect()
            } else {
                vec![ControlGroup {
                    label: None,
                    controls: section
                        .fields
                        .iter()
                        .map(|field| {
                            control(field, scalar_value(record, section, field), FieldAddress::scalar(&section.id, &field.key))
                        })
                        .collect(),
                }]
            };

            PanelSection {
                id: section.id.clone(),
                title: section.display_name.clone(),
                expanded,
                groups,
            }
        })
        .collect();

    PanelView { open, sections }
}

fn control(field: &Field, value: Option<&FieldValue>, address: FieldAddress) -> ControlView {
    ControlView {
        key: address.control_key(),
        address,
        label: field.label.clone(),
        control: field.kind.control(),
        value: value.and_then(|v| field.kind.display(v)).unwrap_or_default(),
        required: field.required,
        placeholder: field.placeholder.clone(),
    }
}

impl PanelView {
    pub fn controls(&self) -> impl Iterator<Item = &ControlView> {
        self.sections
            .iter()
            .flat_map(|s| s.groups.iter())
            .flat_map(|g| g.controls.iter())
    }

    /// Keys of every control currently mounted.
    pub fn mounted_keys(&self) -> Vec<ControlKey> {
        self.controls().map(|c| c.key.clone()).collect()
    }

    pub fn control(&self, key: &ControlKey) -> Option<&ControlView> {
        self.controls().find(|c| &c.key == key)
    }
}
