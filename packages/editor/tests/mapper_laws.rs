//! Property tests for the mapper and address resolution

use folio_editor::{extract, reconstruct, resolve, write};
use folio_model::{
    event_blueprint, wedding_blueprint, Blueprint, DetailTree, FieldAddress, FieldKind, FlatForm,
    Matcher, Section,
};
use proptest::prelude::*;

fn input_for(kind: FieldKind) -> BoxedStrategy<String> {
    match kind {
        FieldKind::Number => prop_oneof![
            "[0-9]{1,3}",
            Just("2.5".to_string()),
            Just("abc".to_string()),
            Just(String::new()),
        ]
        .boxed(),
        FieldKind::DateTime => prop_oneof![
            Just("2025-12-31T04:00".to_string()),
            Just("2026-01-02T09:30:15".to_string()),
            Just("2026-06-01T10:00:00+07:00".to_string()),
            Just("soon".to_string()),
            Just(String::new()),
        ]
        .boxed(),
        _ => "[a-zA-Z &]{0,12}".boxed(),
    }
}

/// Contains-matched role fields must keep matching their role. They may also
/// carry another role's needle, so two roles can accept the same element.
fn role_input(section: &Section, matcher: &Matcher, field: &str, kind: FieldKind) -> BoxedStrategy<String> {
    match matcher {
        Matcher::Contains { field: key, needles } if key == field => {
            let needle = needles[0].clone();
            let mut shared: Vec<String> = section
                .roles
                .iter()
                .filter_map(|role| match &role.matcher {
                    Matcher::Contains { field: other, needles } if other == field => Some(needles.clone()),
                    _ => None,
                })
                .flatten()
                .collect();
            shared.push(String::new());
            (
                "[a-z ]{0,4}",
                prop::sample::select(shared),
                any::<bool>(),
            )
                .prop_map(move |(infix, other, capitalize)| {
                    let head = if capitalize { needle.to_uppercase() } else { needle.clone() };
                    format!("{}{} {}", head, infix, other).trim_end().to_string()
                })
                .boxed()
        }
        _ => input_for(kind),
    }
}

/// Random flat forms shaped by `blueprint`, with up to three elements per
/// positional array section.
fn form_for(blueprint: &Blueprint) -> impl Strategy<Value = FlatForm> {
    let mut entries: Vec<(String, String, BoxedStrategy<String>)> = Vec::new();

    for section in &blueprint.sections {
        if !section.is_array {
            for field in &section.fields {
                entries.push((section.id.clone(), field.key.clone(), input_for(field.kind)));
            }
        } else if section.has_roles() {
            for role in &section.roles {
                for field in &section.fields {
                    entries.push((
                        section.id.clone(),
                        Section::flat_key(role, field),
                        role_input(section, &role.matcher, &field.key, field.kind),
                    ));
                }
            }
        } else {
            for index in 0..3 {
                for field in &section.fields {
                    entries.push((
                        format!("{}.{}", section.id, index),
                        field.key.clone(),
                        input_for(field.kind),
                    ));
                }
            }
        }
    }

    let (keys, strategies): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .map(|(scope, key, strategy)| ((scope, key), proptest::option::of(strategy)))
        .unzip();

    strategies.prop_map(move |values| {
        let mut form = FlatForm::new();
        for ((scope, key), value) in keys.iter().zip(values) {
            if let Some(value) = value {
                form.set(scope.clone(), key.clone(), value);
            }
        }
        form
    })
}

fn all_addresses(blueprint: &Blueprint, max_index: usize) -> Vec<FieldAddress> {
    let mut addresses = Vec::new();
    for section in &blueprint.sections {
        for field in &section.fields {
            if section.is_array {
                for index in 0..max_index {
                    addresses.push(FieldAddress::element(&section.id, &field.key, index));
                }
            } else {
                addresses.push(FieldAddress::scalar(&section.id, &field.key));
            }
        }
    }
    addresses
}

fn assert_round_trip(blueprint: &Blueprint, tree: &DetailTree) -> Result<(), TestCaseError> {
    let again = reconstruct(blueprint, &extract(blueprint, tree), Some(tree));
    prop_assert_eq!(&again, tree);
    Ok(())
}

proptest! {
    #[test]
    fn prop_round_trip_wedding(form in form_for(&wedding_blueprint())) {
        let blueprint = wedding_blueprint();
        let tree = reconstruct(&blueprint, &form, None);
        assert_round_trip(&blueprint, &tree)?;
    }

    #[test]
    fn prop_round_trip_event(form in form_for(&event_blueprint())) {
        let blueprint = event_blueprint();
        let tree = reconstruct(&blueprint, &form, None);
        assert_round_trip(&blueprint, &tree)?;
    }

    #[test]
    fn prop_round_trip_preserves_identities(form in form_for(&wedding_blueprint())) {
        let blueprint = wedding_blueprint();
        let mut stored = reconstruct(&blueprint, &form, None);
        let mut next = 0;
        folio_editor::assign_identities(&mut stored, &DetailTree::default(), &mut || {
            next += 1;
            next
        });

        let tree = reconstruct(&blueprint, &extract(&blueprint, &stored), Some(&stored));
        prop_assert_eq!(&tree, &stored);
        assert_round_trip(&blueprint, &tree)?;
    }

    #[test]
    fn prop_write_is_idempotent(
        form in form_for(&event_blueprint()),
        pick in any::<prop::sample::Index>(),
        input in "[a-zA-Z0-9 :-]{0,16}",
    ) {
        let blueprint = event_blueprint();
        let addresses = all_addresses(&blueprint, 4);
        let address = pick.get(&addresses);
        let mut once = reconstruct(&blueprint, &form, None);

        let first = write(&blueprint, address, &mut once, &input);
        let mut twice = once.clone();
        let second = write(&blueprint, address, &mut twice, &input);

        prop_assert_eq!(first.is_ok(), second.is_ok());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_resolve_is_bounds_safe(
        tree in prop_oneof![
            form_for(&event_blueprint()).prop_map(|form| reconstruct(&event_blueprint(), &form, None)),
            Just(DetailTree::default()),
            Just(DetailTree::from_json(r#"[{ "id": 1 }]"#).unwrap()),
            Just(DetailTree::from_json(r#"[{ "id": 1, "eventDetails": null }]"#).unwrap()),
            Just(DetailTree::from_json(r#"[{ "id": 1, "eventDetails": [] }]"#).unwrap()),
        ],
        index in 0usize..64,
    ) {
        let blueprint = event_blueprint();
        let len = tree.primary().and_then(|r| r.list("eventDetails")).map(|l| l.len()).unwrap_or(0);

        let address = FieldAddress::element("eventDetails", "eventLocation", index);
        let value = resolve(&blueprint, &address, &tree);
        prop_assert_eq!(value.is_some(), index < len);

        let mut written = tree.clone();
        let result = write(&blueprint, &address, &mut written, "Hall");
        prop_assert_eq!(result.is_ok(), index < len);
        if index >= len {
            prop_assert_eq!(written, tree);
        }
    }
}
