//! # Theme Catalog
//!
//! Supplies the blueprint for each theme. Built-in themes are always
//! available; additional themes are read from `*.json` files.

use crate::{ArrayRole, Blueprint, Field, FieldKind, ItemLabel, Matcher, ModelError, ModelResult, Section};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const WEDDING_COMPONENT: &str = "invitation-details.wedding-details";
pub const EVENT_COMPONENT: &str = "invitation-details.event-details";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeEntry {
    pub slug: String,
    #[serde(alias = "themeName")]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(alias = "structureBlueprint", alias = "structure_blueprint")]
    pub blueprint: Blueprint,
}

#[derive(Debug, Clone, Default)]
pub struct ThemeCatalog {
    themes: BTreeMap<String, ThemeEntry>,
}

impl ThemeCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        let wedding = wedding_blueprint();
        catalog.insert(ThemeEntry {
            slug: "wedding-classic".into(),
            name: "Wedding Classic".into(),
            category: "wedding".into(),
            blueprint: wedding.clone(),
        });
        catalog.insert(ThemeEntry {
            slug: "wedding-ornamental".into(),
            name: "Wedding Ornamental".into(),
            category: "wedding".into(),
            blueprint: wedding,
        });
        catalog.insert(ThemeEntry {
            slug: "event-basic".into(),
            name: "Event Basic".into(),
            category: "event".into(),
            blueprint: event_blueprint(),
        });
        catalog
    }

    /// Built-in themes plus every `*.json` theme file in `dir`.
    ///
    /// A file theme replaces a built-in theme with the same slug.
    pub fn load_dir(dir: &Path) -> ModelResult<Self> {
        let mut catalog = Self::builtin();
        if !dir.exists() {
            tracing::debug!("Theme directory {:?} does not exist, using built-ins", dir);
            return Ok(catalog);
        }

        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map(|e| e == "json").unwrap_or(false))
            .collect();
        paths.sort();

        for path in paths {
            let content = std::fs::read_to_string(&path)?;
            let entry: ThemeEntry = serde_json::from_str(&content)?;
            entry.blueprint.validate()?;
            tracing::info!("Loaded theme '{}' from {:?}", entry.slug, path);
            catalog.insert(entry);
        }

        Ok(catalog)
    }

    pub fn insert(&mut self, entry: ThemeEntry) {
        self.themes.insert(entry.slug.clone(), entry);
    }

    pub fn get(&self, slug: &str) -> ModelResult<&ThemeEntry> {
        self.themes
            .get(slug)
            .ok_or_else(|| ModelError::UnknownTheme(slug.to_string()))
    }

    pub fn blueprint(&self, slug: &str) -> ModelResult<&Blueprint> {
        self.get(slug).map(|entry| &entry.blueprint)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ThemeEntry> {
        self.themes.values()
    }
}

fn text(key: &str, label: &str) -> Field {
    Field::new(key, label, FieldKind::Text)
}

fn role(prefix: &str, label: &str, matcher: Matcher, defaults: &[(&str, &str)]) -> ArrayRole {
    ArrayRole {
        prefix: prefix.into(),
        label: label.into(),
        matcher,
        defaults: defaults
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

fn cover_section() -> Section {
    Section {
        id: "coverSection".into(),
        display_name: "Cover Section".into(),
        fields: vec![
            text("title", "Title").required().inferred_from("invitationTitle"),
            text("subtitle", "Subtitle"),
            text("header", "Header"),
            text("subheader", "Subheader"),
        ],
        is_array: false,
        flatten: false,
        roles: vec![],
        item_label: None,
    }
}

fn opening_section() -> Section {
    Section {
        id: "openingSection".into(),
        display_name: "Opening Section".into(),
        fields: vec![
            Field::new("quotes", "Quotes", FieldKind::Multiline),
            Field::new("decorationUrl", "Decoration URL", FieldKind::Url),
            Field::new("imageUrl", "Image URL", FieldKind::Url),
        ],
        is_array: false,
        flatten: false,
        roles: vec![],
        item_label: None,
    }
}

fn event_fields() -> Vec<Field> {
    vec![
        text("eventName", "Event Name").required(),
        Field::new("datetimeStart", "Start Date & Time", FieldKind::DateTime).required(),
        Field::new("datetimeEnd", "End Date & Time", FieldKind::DateTime),
        text("eventLocation", "Location").required(),
    ]
}

fn additional_section() -> Section {
    Section {
        id: "additional".into(),
        display_name: "Additional Information".into(),
        fields: vec![Field::new("additionalNote", "Additional Notes", FieldKind::Multiline)],
        is_array: false,
        flatten: true,
        roles: vec![],
        item_label: None,
    }
}

/// Wedding blueprint: couple and events are addressed by role.
pub fn wedding_blueprint() -> Blueprint {
    Blueprint::new(vec![
        cover_section(),
        opening_section(),
        Section {
            id: "coupleDetails".into(),
            display_name: "Couple Details".into(),
            fields: vec![
                text("name", "Name").required(),
                text("fullName", "Full Name"),
                Field::new("imageUrl", "Photo URL", FieldKind::Url),
                Field::new("birthOrder", "Birth Order", FieldKind::Number),
                text("additionalInfo", "Additional Info"),
            ],
            is_array: true,
            flatten: false,
            roles: vec![
                role("groom", "Groom", Matcher::equals("gender", "male"), &[]),
                role("bride", "Bride", Matcher::equals("gender", "female"), &[]),
            ],
            item_label: Some(ItemLabel::Role),
        },
        Section {
            id: "eventDetails".into(),
            display_name: "Event Details".into(),
            fields: event_fields(),
            is_array: true,
            flatten: false,
            roles: vec![
                role("akad", "Akad", Matcher::contains("eventName", &["akad"]), &[("eventName", "akad")]),
                role(
                    "resepsi",
                    "Resepsi",
                    Matcher::contains("eventName", &["resepsi", "reception"]),
                    &[("eventName", "resepsi")],
                ),
            ],
            item_label: Some(ItemLabel::Field {
                key: "eventName".into(),
                fallback: "Event".into(),
            }),
        },
        additional_section(),
    ])
    .with_component(WEDDING_COMPONENT)
}

/// Generic event blueprint: events are addressed by position.
pub fn event_blueprint() -> Blueprint {
    Blueprint::new(vec![
        cover_section(),
        opening_section(),
        Section {
            id: "eventDetails".into(),
            display_name: "Event Details".into(),
            fields: event_fields(),
            is_array: true,
            flatten: false,
            roles: vec![],
            item_label: Some(ItemLabel::Field {
                key: "eventName".into(),
                fallback: "Event".into(),
            }),
        },
        additional_section(),
    ])
    .with_component(EVENT_COMPONENT)
}
