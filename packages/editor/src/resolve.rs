//! # Address Resolution
//!
//! Reads and writes one field of a [`DetailTree`] through a
//! [`FieldAddress`].
//!
//! Reads are total: a stale or unknown address resolves to `None`. Writes
//! are bounds-checked and never create array elements; intermediate
//! sub-objects are created on demand.
//!
//! Array sections with roles also accept index-less role keys
//! (`coupleDetails.brideName`). Those resolve through the role predicate and
//! are read-only; [`canonicalize`] turns them into an indexed address that
//! can be written.

use crate::AddressError;
use folio_model::{Blueprint, DetailRecord, DetailTree, FieldAddress, FieldValue, Slot};

/// Current value at `address`, or `None` when nothing is there.
pub fn resolve<'a>(
    blueprint: &Blueprint,
    address: &FieldAddress,
    tree: &'a DetailTree,
) -> Option<&'a FieldValue> {
    let section = blueprint.section(&address.section_id)?;
    let record = tree.primary()?;

    if !section.is_array {
        if address.array_index.is_some() {
            tracing::debug!("Ignoring index on scalar section address {}", address);
            return None;
        }
        section.field(&address.field_key)?;
        return if section.flatten {
            record.value(&address.field_key)
        } else {
            record.group(&section.id)?.get(&address.field_key)
        };
    }

    let elements = record.list(&section.id)?;
    match address.array_index {
        Some(index) => {
            section.field(&address.field_key)?;
            elements.get(index)?.get(&address.field_key)
        }
        None => {
            let (role, field) = section.role_field(&address.field_key)?;
            let index = section.role_index(role, elements)?;
            elements[index].get(&field.key)
        }
    }
}

/// Rewrite a role key address into the indexed address of the element it
/// currently resolves to. Indexed and scalar addresses pass through.
pub fn canonicalize(
    blueprint: &Blueprint,
    address: &FieldAddress,
    tree: &DetailTree,
) -> Option<FieldAddress> {
    let section = blueprint.section(&address.section_id)?;
    if !section.is_array || address.array_index.is_some() {
        return Some(address.clone());
    }

    let (role, field) = section.role_field(&address.field_key)?;
    let elements = tree.primary()?.list(&section.id)?;
    let index = section.role_index(role, elements)?;
    Some(FieldAddress::element(&section.id, &field.key, index))
}

/// Parse `input` with the field's kind and store it at `address`.
///
/// Idempotent: applying the same write twice leaves the same tree.
pub fn write(
    blueprint: &Blueprint,
    address: &FieldAddress,
    tree: &mut DetailTree,
    input: &str,
) -> Result<(), AddressError> {
    let unknown = || AddressError::UnknownField(address.to_string());
    let section = blueprint.section(&address.section_id).ok_or_else(unknown)?;

    if section.is_array && address.array_index.is_none() {
        // Role keys are readable but have no stable element to write to
        return Err(AddressError::MissingIndex(section.id.clone()));
    }
    if !section.is_array && address.array_index.is_some() {
        return Err(AddressError::UnexpectedIndex(section.id.clone()));
    }

    let field = section.field(&address.field_key).ok_or_else(unknown)?;
    let value = field.kind.parse(input);

    if let Some(index) = address.array_index {
        // Elements are never created here, so check the slot before touching the tree
        let elements = match tree.primary_mut().and_then(|r| r.slots.get_mut(&section.id)) {
            Some(Slot::List(elements)) => Some(elements),
            None | Some(Slot::Value(FieldValue::Null)) => None,
            Some(_) => return Err(AddressError::ShapeMismatch(section.id.clone())),
        };
        let len = elements.as_ref().map_or(0, |e| e.len());
        let element = elements
            .and_then(|e| e.get_mut(index))
            .ok_or_else(|| AddressError::IndexOutOfBounds {
                section: section.id.clone(),
                index,
                len,
            })?;
        element.set(field.key.clone(), value);
        tracing::trace!("Wrote {}", address);
        return Ok(());
    }

    if tree.is_empty() {
        tree.records_mut()
            .push(DetailRecord::new(blueprint.component.clone()));
    }
    let record = tree.primary_or_insert();

    if section.flatten {
        if matches!(record.slots.get(&field.key), Some(Slot::Group(_) | Slot::List(_))) {
            return Err(AddressError::ShapeMismatch(field.key.clone()));
        }
        record.set_value(field.key.clone(), value);
    } else {
        let group = record
            .ensure_group(&section.id)
            .ok_or_else(|| AddressError::ShapeMismatch(section.id.clone()))?;
        group.set(field.key.clone(), value);
    }

    tracing::trace!("Wrote {}", address);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{wedding_blueprint, SubRecord, WEDDING_COMPONENT};

    fn couple_tree() -> DetailTree {
        DetailTree::from_json(
            r#"[{
                "id": 1,
                "coverSection": { "id": 2, "title": "A & B" },
                "coupleDetails": [
                    { "id": 10, "gender": "female", "name": "Bea" },
                    { "id": 11, "gender": "male", "name": "Adi" }
                ]
            }]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_by_index_and_role() {
        let blueprint = wedding_blueprint();
        let tree = couple_tree();

        let indexed = FieldAddress::element("coupleDetails", "name", 0);
        assert_eq!(resolve(&blueprint, &indexed, &tree), Some(&FieldValue::text("Bea")));

        let groom = FieldAddress::scalar("coupleDetails", "groomName");
        assert_eq!(resolve(&blueprint, &groom, &tree), Some(&FieldValue::text("Adi")));

        let canonical = canonicalize(&blueprint, &groom, &tree).unwrap();
        assert_eq!(canonical, FieldAddress::element("coupleDetails", "name", 1));
    }

    #[test]
    fn test_resolve_is_total() {
        let blueprint = wedding_blueprint();
        let tree = couple_tree();

        assert_eq!(resolve(&blueprint, &FieldAddress::element("coupleDetails", "name", 5), &tree), None);
        assert_eq!(resolve(&blueprint, &FieldAddress::scalar("nope", "title"), &tree), None);
        assert_eq!(resolve(&blueprint, &FieldAddress::element("coverSection", "title", 0), &tree), None);
        assert_eq!(resolve(&blueprint, &FieldAddress::scalar("coverSection", "title"), &DetailTree::default()), None);
    }

    #[test]
    fn test_write_out_of_bounds_leaves_tree_untouched() {
        let blueprint = wedding_blueprint();
        let mut tree = couple_tree();
        let before = tree.clone();

        let err = write(
            &blueprint,
            &FieldAddress::element("coupleDetails", "name", 2),
            &mut tree,
            "Cici",
        )
        .unwrap_err();

        assert_eq!(
            err,
            AddressError::IndexOutOfBounds {
                section: "coupleDetails".into(),
                index: 2,
                len: 2
            }
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn test_write_out_of_bounds_creates_nothing() {
        let blueprint = wedding_blueprint();
        let address = FieldAddress::element("eventDetails", "eventName", 0);

        let mut empty = DetailTree::default();
        let err = write(&blueprint, &address, &mut empty, "x").unwrap_err();
        assert_eq!(
            err,
            AddressError::IndexOutOfBounds {
                section: "eventDetails".into(),
                index: 0,
                len: 0
            }
        );
        assert!(empty.is_empty());

        let mut null_slot = DetailTree::from_json(r#"[{ "eventDetails": null }]"#).unwrap();
        let before = null_slot.clone();
        assert!(write(&blueprint, &address, &mut null_slot, "x").is_err());
        assert_eq!(null_slot, before);

        let mut missing_slot = DetailTree::from_json(r#"[{ "id": 1 }]"#).unwrap();
        let before = missing_slot.clone();
        assert!(write(&blueprint, &address, &mut missing_slot, "x").is_err());
        assert_eq!(missing_slot, before);
    }

    #[test]
    fn test_write_into_non_list_slot_is_shape_mismatch() {
        let blueprint = wedding_blueprint();
        let mut tree = DetailTree::from_json(r#"[{ "eventDetails": "legacy" }]"#).unwrap();
        let before = tree.clone();

        let err = write(&blueprint, &FieldAddress::element("eventDetails", "eventName", 0), &mut tree, "x");
        assert_eq!(err, Err(AddressError::ShapeMismatch("eventDetails".into())));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_write_role_key_is_rejected() {
        let blueprint = wedding_blueprint();
        let mut tree = couple_tree();
        let err = write(&blueprint, &FieldAddress::scalar("coupleDetails", "brideName"), &mut tree, "X");
        assert_eq!(err, Err(AddressError::MissingIndex("coupleDetails".into())));
    }

    #[test]
    fn test_write_creates_intermediate_group() {
        let blueprint = wedding_blueprint();
        let mut tree = DetailTree::default();

        write(&blueprint, &FieldAddress::scalar("openingSection", "quotes"), &mut tree, "Hello").unwrap();

        let record = tree.primary().unwrap();
        assert_eq!(record.component.as_deref(), Some(WEDDING_COMPONENT));
        assert_eq!(
            record.group("openingSection").unwrap().get("quotes"),
            Some(&FieldValue::text("Hello"))
        );
    }

    #[test]
    fn test_write_flattened_section_and_idempotence() {
        let blueprint = wedding_blueprint();
        let mut tree = couple_tree();
        let address = FieldAddress::scalar("additional", "additionalNote");

        write(&blueprint, &address, &mut tree, "Dress code: batik").unwrap();
        let once = tree.clone();
        write(&blueprint, &address, &mut tree, "Dress code: batik").unwrap();

        assert_eq!(tree, once);
        assert_eq!(
            tree.primary().unwrap().value("additionalNote"),
            Some(&FieldValue::text("Dress code: batik"))
        );
    }

    #[test]
    fn test_write_parses_with_field_kind() {
        let blueprint = wedding_blueprint();
        let mut tree = couple_tree();
        let address = FieldAddress::element("coupleDetails", "birthOrder", 1);

        write(&blueprint, &address, &mut tree, "3").unwrap();
        assert_eq!(resolve(&blueprint, &address, &tree), Some(&FieldValue::integer(3)));

        write(&blueprint, &address, &mut tree, "third").unwrap();
        assert_eq!(resolve(&blueprint, &address, &tree), Some(&FieldValue::Null));
    }

    #[test]
    fn test_write_refuses_shape_mismatch() {
        let blueprint = wedding_blueprint();
        let mut tree = DetailTree::single(DetailRecord::default());
        tree.primary_mut()
            .unwrap()
            .set_value("coverSection", FieldValue::text("legacy"));

        let err = write(&blueprint, &FieldAddress::scalar("coverSection", "title"), &mut tree, "x");
        assert_eq!(err, Err(AddressError::ShapeMismatch("coverSection".into())));

        tree.primary_mut()
            .unwrap()
            .slots
            .insert("additionalNote".into(), Slot::Group(SubRecord::default()));
        let err = write(&blueprint, &FieldAddress::scalar("additional", "additionalNote"), &mut tree, "x");
        assert_eq!(err, Err(AddressError::ShapeMismatch("additionalNote".into())));
    }
}
