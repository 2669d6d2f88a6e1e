//! Starter content for newly created documents.
//!
//! Events are dated 31 December of the year after `today`.

use crate::{mapper, StoredDocument};
use chrono::{Datelike, NaiveDate};
use folio_model::{
    DetailRecord, DetailTree, FieldValue, FlatForm, Slot, SubRecord, ThemeEntry, EVENT_COMPONENT,
    WEDDING_COMPONENT,
};
use std::collections::BTreeMap;

fn default_date(today: NaiveDate) -> String {
    format!("{}-12-31", today.year() + 1)
}

fn at(date: &str, time: &str) -> FieldValue {
    FieldValue::text(format!("{}T{}:00.000Z", date, time))
}

fn group(pairs: &[(&str, &str)]) -> Slot {
    let mut sub = SubRecord::default();
    for (key, value) in pairs {
        sub.set(*key, FieldValue::text(*value));
    }
    Slot::Group(sub)
}

fn event(name: &str, date: &str, start: &str, end: &str, location: &str) -> SubRecord {
    SubRecord::default()
        .with("eventName", name)
        .with("datetimeStart", at(date, start))
        .with("datetimeEnd", at(date, end))
        .with("eventLocation", location)
}

pub fn wedding_details(today: NaiveDate) -> DetailTree {
    let date = default_date(today);
    let mut record = DetailRecord::new(Some(WEDDING_COMPONENT.to_string()));

    record.set_value(
        "additionalNote",
        FieldValue::text("Please join us for this joyous celebration of love."),
    );
    record.slots.insert(
        "coverSection".into(),
        group(&[
            ("title", "Bride & Groom"),
            ("subtitle", "Together Forever"),
            ("header", "The Wedding of"),
            ("subheader", "request the honor of your presence"),
        ]),
    );
    record.slots.insert(
        "openingSection".into(),
        group(&[(
            "quotes",
            "We are excited to share this special moment with our beloved family and friends.",
        )]),
    );
    record.slots.insert(
        "eventDetails".into(),
        Slot::List(vec![
            event("Akad Nikah", &date, "04:00", "06:00", "Main Wedding Venue"),
            event("Wedding Reception", &date, "07:00", "10:00", "Reception Hall"),
        ]),
    );
    record.slots.insert(
        "coupleDetails".into(),
        Slot::List(vec![
            SubRecord::default()
                .with("gender", "male")
                .with("name", "Groom Name")
                .with("fullName", "Groom Full Name")
                .with("birthOrder", 1i64),
            SubRecord::default()
                .with("gender", "female")
                .with("name", "Bride Name")
                .with("fullName", "Bride Full Name")
                .with("birthOrder", 1i64),
        ]),
    );

    DetailTree::single(record)
}

pub fn event_details(today: NaiveDate) -> DetailTree {
    let date = default_date(today);
    let mut record = DetailRecord::new(Some(EVENT_COMPONENT.to_string()));

    record.set_value(
        "additionalNote",
        FieldValue::text("We cordially invite you to join us for this special event."),
    );
    record.slots.insert(
        "coverSection".into(),
        group(&[
            ("title", "Special Event"),
            ("subtitle", "Join Us"),
            ("header", "You're Invited to"),
            ("subheader", "celebrate with us"),
        ]),
    );
    record.slots.insert(
        "openingSection".into(),
        group(&[("quotes", "Join us as we celebrate this special occasion together.")]),
    );
    record.slots.insert(
        "eventDetails".into(),
        Slot::List(vec![event("Main Event", &date, "06:00", "10:00", "Event Venue")]),
    );

    DetailTree::single(record)
}

/// A new document for `theme`. Themes with an unknown component start
/// from an empty form.
pub fn new_document(id: impl Into<String>, theme: &ThemeEntry, today: NaiveDate) -> StoredDocument {
    let details = match theme.blueprint.component.as_deref() {
        Some(WEDDING_COMPONENT) => wedding_details(today),
        Some(EVENT_COMPONENT) => event_details(today),
        _ => mapper::reconstruct(&theme.blueprint, &FlatForm::new(), None),
    };

    let title = details
        .primary()
        .and_then(|r| r.group("coverSection"))
        .and_then(|g| g.get("title"))
        .cloned()
        .unwrap_or_else(|| FieldValue::text(theme.name.clone()));

    let mut attributes = BTreeMap::new();
    attributes.insert("invitationTitle".to_string(), title);
    attributes.insert("eventDate".to_string(), FieldValue::text(default_date(today)));

    StoredDocument {
        id: id.into(),
        theme: Some(theme.slug.clone()),
        attributes,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract;
    use folio_model::{wedding_blueprint, ThemeCatalog};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn test_wedding_defaults_satisfy_roles() {
        let form = extract(&wedding_blueprint(), &wedding_details(today()));
        assert_eq!(form.get("coupleDetails", "groomName"), Some("Groom Name"));
        assert_eq!(form.get("coupleDetails", "brideName"), Some("Bride Name"));
        assert_eq!(form.get("eventDetails", "akadEventLocation"), Some("Main Wedding Venue"));
        assert_eq!(form.get("eventDetails", "resepsiDatetimeStart"), Some("2027-12-31T07:00"));
    }

    #[test]
    fn test_new_document_per_theme() {
        let catalog = ThemeCatalog::builtin();
        let doc = new_document("inv-1", catalog.get("event-basic").unwrap(), today());

        assert_eq!(doc.theme.as_deref(), Some("event-basic"));
        assert_eq!(doc.attributes["invitationTitle"], FieldValue::text("Special Event"));
        assert_eq!(doc.attributes["eventDate"], FieldValue::text("2027-12-31"));
        assert_eq!(doc.details.primary().unwrap().component.as_deref(), Some(EVENT_COMPONENT));
    }
}
