//! # Field Kinds
//!
//! Every blueprint field has one [`FieldKind`]. Each kind owns three
//! strategies:
//!
//! - **parse**: form input string → stored [`FieldValue`]
//! - **display**: stored value → form input string
//! - **control**: which editing control the panel renders
//!
//! Adding a kind means adding a variant here; every `match` below then
//! fails to compile until the new strategy is written.

use crate::FieldValue;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Input format used by `datetime-local` controls.
const FORM_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    #[default]
    Text,
    Multiline,
    Url,
    Number,
    DateTime,
}

/// Editing control rendered for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "control", rename_all = "camelCase")]
pub enum ControlKind {
    Input { input_type: &'static str },
    TextArea { rows: u8 },
}

impl FieldKind {
    pub fn tag(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Multiline => "multiline",
            FieldKind::Url => "url",
            FieldKind::Number => "number",
            FieldKind::DateTime => "datetime",
        }
    }

    /// Accepts current tags and the aliases used by older blueprints.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "text" => Some(FieldKind::Text),
            "multiline" | "textarea" => Some(FieldKind::Multiline),
            "url" => Some(FieldKind::Url),
            "number" => Some(FieldKind::Number),
            "datetime" | "datetime-local" => Some(FieldKind::DateTime),
            _ => None,
        }
    }

    /// Parse a form input into a stored value.
    ///
    /// Empty input is always `Null`. Invalid numbers and datetimes are
    /// `Null` as well; they never produce NaN or a half-parsed string.
    pub fn parse(self, input: &str) -> FieldValue {
        if input.trim().is_empty() {
            return FieldValue::Null;
        }

        match self {
            FieldKind::Text | FieldKind::Multiline | FieldKind::Url => {
                FieldValue::Text(input.to_string())
            }
            FieldKind::Number => parse_number(input.trim()),
            FieldKind::DateTime => match parse_datetime(input.trim()) {
                Some(dt) => FieldValue::Text(canonical_timestamp(&dt)),
                None => {
                    tracing::debug!("Discarding unparseable datetime input: {:?}", input);
                    FieldValue::Null
                }
            },
        }
    }

    /// Render a stored value as a form input string. `None` for null.
    pub fn display(self, value: &FieldValue) -> Option<String> {
        match (self, value) {
            (_, FieldValue::Null) => None,
            (FieldKind::DateTime, FieldValue::Text(raw)) => Some(
                parse_datetime(raw)
                    .map(|dt| form_datetime(&dt))
                    .unwrap_or_else(|| raw.clone()),
            ),
            (_, other) => Some(other.to_string()),
        }
    }

    /// Human-readable text for read-only previews.
    pub fn preview(self, value: &FieldValue) -> String {
        match (self, value) {
            (FieldKind::DateTime, FieldValue::Text(raw)) => parse_datetime(raw)
                .map(|dt| dt.format("%A, %B %-d, %Y %H:%M").to_string())
                .unwrap_or_else(|| raw.clone()),
            (_, other) => other.to_string(),
        }
    }

    pub fn control(self) -> ControlKind {
        match self {
            FieldKind::Text => ControlKind::Input { input_type: "text" },
            FieldKind::Multiline => ControlKind::TextArea { rows: 4 },
            FieldKind::Url => ControlKind::Input { input_type: "url" },
            FieldKind::Number => ControlKind::Input { input_type: "number" },
            FieldKind::DateTime => ControlKind::Input {
                input_type: "datetime-local",
            },
        }
    }
}

impl From<String> for FieldKind {
    fn from(tag: String) -> Self {
        FieldKind::from_tag(&tag).unwrap_or_else(|| {
            tracing::warn!("Unknown field kind '{}', rendering as text", tag);
            FieldKind::Text
        })
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.tag().to_string()
    }
}

fn parse_number(input: &str) -> FieldValue {
    if let Ok(n) = input.parse::<i64>() {
        return FieldValue::integer(n);
    }
    match input.parse::<f64>() {
        Ok(f) => FieldValue::float(f),
        Err(_) => FieldValue::Null,
    }
}

/// Parse the datetime shapes found in stored content and form inputs.
///
/// Inputs without an offset are read as UTC. Instants outside four-digit
/// years are rejected, since RFC 3339 cannot carry them back.
pub(crate) fn parse_datetime(input: &str) -> Option<DateTime<Utc>> {
    parse_any_datetime(input).filter(|dt| (0..=9999).contains(&dt.year()))
}

fn parse_any_datetime(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Minutes precision unless the value carries seconds, so that display
/// followed by parse never loses information.
fn form_datetime(dt: &DateTime<Utc>) -> String {
    let millis = dt.timestamp_subsec_millis();
    if millis != 0 {
        format!("{}.{:03}", dt.format("%Y-%m-%dT%H:%M:%S"), millis)
    } else if dt.second() != 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format(FORM_DATETIME_FORMAT).to_string()
    }
}

/// `2025-12-31T04:00:00.000Z`
pub(crate) fn canonical_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kind_degrades_to_text() {
        let kind: FieldKind = serde_json::from_str(r#""color-picker""#).unwrap();
        assert_eq!(kind, FieldKind::Text);
    }

    #[test]
    fn test_legacy_aliases() {
        let kinds: Vec<FieldKind> =
            serde_json::from_str(r#"["textarea", "datetime-local", "url"]"#).unwrap();
        assert_eq!(
            kinds,
            vec![FieldKind::Multiline, FieldKind::DateTime, FieldKind::Url]
        );
        assert_eq!(serde_json::to_string(&FieldKind::Multiline).unwrap(), r#""multiline""#);
    }

    #[test]
    fn test_number_parse_never_nan() {
        assert_eq!(FieldKind::Number.parse(""), FieldValue::Null);
        assert_eq!(FieldKind::Number.parse("abc"), FieldValue::Null);
        assert_eq!(FieldKind::Number.parse("NaN"), FieldValue::Null);
        assert_eq!(FieldKind::Number.parse("inf"), FieldValue::Null);
        assert_eq!(FieldKind::Number.parse(" 2 "), FieldValue::integer(2));
        assert_eq!(FieldKind::Number.parse("2.5"), FieldValue::float(2.5));
    }

    #[test]
    fn test_datetime_normalizes() {
        assert_eq!(
            FieldKind::DateTime.parse("2025-12-31T04:00"),
            FieldValue::text("2025-12-31T04:00:00.000Z")
        );
        assert_eq!(
            FieldKind::DateTime.parse("2025-12-31T11:00:00+07:00"),
            FieldValue::text("2025-12-31T04:00:00.000Z")
        );
        assert_eq!(FieldKind::DateTime.parse(""), FieldValue::Null);
        assert_eq!(FieldKind::DateTime.parse("tomorrow"), FieldValue::Null);
    }

    #[test]
    fn test_datetime_rejects_years_past_four_digits() {
        assert_eq!(FieldKind::DateTime.parse("+10000-01-01T00:00"), FieldValue::Null);
        assert_eq!(FieldKind::DateTime.parse("9999-12-31T23:00:00-05:00"), FieldValue::Null);

        let last = FieldKind::DateTime.parse("9999-12-31T23:59");
        assert_eq!(last, FieldValue::text("9999-12-31T23:59:00.000Z"));
        assert_eq!(FieldKind::DateTime.display(&last), Some("9999-12-31T23:59".to_string()));
    }

    #[test]
    fn test_datetime_display_uses_form_format() {
        let stored = FieldValue::text("2025-12-31T04:00:00.000Z");
        assert_eq!(
            FieldKind::DateTime.display(&stored),
            Some("2025-12-31T04:00".to_string())
        );
        assert_eq!(FieldKind::DateTime.display(&FieldValue::Null), None);
    }

    #[test]
    fn test_text_keeps_input_verbatim() {
        assert_eq!(FieldKind::Text.parse("A & B"), FieldValue::text("A & B"));
        assert_eq!(FieldKind::Url.parse("   "), FieldValue::Null);
    }

    #[test]
    fn test_controls() {
        assert_eq!(FieldKind::Multiline.control(), ControlKind::TextArea { rows: 4 });
        assert_eq!(
            FieldKind::DateTime.control(),
            ControlKind::Input { input_type: "datetime-local" }
        );
    }
}
