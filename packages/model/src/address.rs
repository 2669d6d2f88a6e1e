//! # Field Addresses
//!
//! The addressing contract shared by the preview and the editing panel.
//!
//! A [`FieldAddress`] names one field; `array_index` is present exactly when
//! the section is array-valued. Addresses are cheap values and may outlive
//! the content they point at: an index past the end of the array is valid to
//! build and simply resolves to nothing.
//!
//! Textual form mirrors the editor's field paths:
//!
//! ```text
//! cover.title              scalar section
//! eventDetails.1.eventLocation   element 1 of an array section
//! ```
//!
//! The rendered control for an address is identified by a [`ControlKey`]:
//! `scope + "-" + fieldKey`, where the scope folds the index into the
//! section id (`eventDetails.1-eventLocation`).

use crate::{Blueprint, ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAddress {
    pub section_id: String,
    pub field_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_index: Option<usize>,
}

/// DOM-style identifier of a rendered editing control.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ControlKey {
    pub scope: String,
    pub field: String,
}

impl FieldAddress {
    pub fn scalar(section_id: impl Into<String>, field_key: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            field_key: field_key.into(),
            array_index: None,
        }
    }

    pub fn element(
        section_id: impl Into<String>,
        field_key: impl Into<String>,
        index: usize,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            field_key: field_key.into(),
            array_index: Some(index),
        }
    }

    /// Section scope with the index folded in: `eventDetails.1`.
    pub fn scope(&self) -> String {
        match self.array_index {
            Some(index) => format!("{}.{}", self.section_id, index),
            None => self.section_id.clone(),
        }
    }

    pub fn control_key(&self) -> ControlKey {
        ControlKey::new(self.scope(), self.field_key.clone())
    }

    /// Check the address against a blueprint.
    ///
    /// Scalar sections must not carry an index. Array sections need an index,
    /// except for role-prefixed keys (`brideName`) which take the read-only
    /// predicate path. Bounds are not checked here.
    pub fn check(&self, blueprint: &Blueprint) -> ModelResult<()> {
        let invalid = || ModelError::InvalidAddress(self.to_string());
        let section = blueprint.section(&self.section_id).ok_or_else(invalid)?;

        match (section.is_array, self.array_index) {
            (false, Some(_)) => Err(invalid()),
            (false, None) | (true, Some(_)) => section.field(&self.field_key).map(|_| ()).ok_or_else(invalid),
            (true, None) => section.role_field(&self.field_key).map(|_| ()).ok_or_else(invalid),
        }
    }
}

impl fmt::Display for FieldAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.array_index {
            Some(index) => write!(f, "{}.{}.{}", self.section_id, index, self.field_key),
            None => write!(f, "{}.{}", self.section_id, self.field_key),
        }
    }
}

impl FromStr for FieldAddress {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidAddress(s.to_string());
        let parts: Vec<&str> = s.split('.').collect();

        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid());
        }

        match parts.as_slice() {
            [section, field] => Ok(FieldAddress::scalar(*section, *field)),
            [section, index, field] => {
                let index = index.parse().map_err(|_| invalid())?;
                Ok(FieldAddress::element(*section, *field, index))
            }
            _ => Err(invalid()),
        }
    }
}

impl ControlKey {
    pub fn new(scope: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.scope, self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_key_convention() {
        let scalar = FieldAddress::scalar("cover", "title");
        assert_eq!(scalar.control_key().to_string(), "cover-title");

        let element = FieldAddress::element("eventDetails", "eventLocation", 1);
        assert_eq!(element.scope(), "eventDetails.1");
        assert_eq!(element.control_key().to_string(), "eventDetails.1-eventLocation");
    }

    #[test]
    fn test_parse_and_display() {
        let address: FieldAddress = "eventDetails.1.eventLocation".parse().unwrap();
        assert_eq!(address, FieldAddress::element("eventDetails", "eventLocation", 1));
        assert_eq!(address.to_string(), "eventDetails.1.eventLocation");

        let address: FieldAddress = "cover.title".parse().unwrap();
        assert_eq!(address.array_index, None);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("cover".parse::<FieldAddress>().is_err());
        assert!("cover..title".parse::<FieldAddress>().is_err());
        assert!("events.x.name".parse::<FieldAddress>().is_err());
        assert!("a.1.b.c".parse::<FieldAddress>().is_err());
    }

    #[test]
    fn test_serde_camel_case() {
        let json = serde_json::to_string(&FieldAddress::element("eventDetails", "eventName", 0)).unwrap();
        assert_eq!(json, r#"{"sectionId":"eventDetails","fieldKey":"eventName","arrayIndex":0}"#);

        let scalar: FieldAddress =
            serde_json::from_str(r#"{"sectionId":"cover","fieldKey":"title"}"#).unwrap();
        assert_eq!(scalar, FieldAddress::scalar("cover", "title"));
    }
}
