//! Address validation against the built-in blueprints

use folio_model::{wedding_blueprint, event_blueprint, FieldAddress};

#[test]
fn test_scalar_address_rejects_index() {
    let blueprint = wedding_blueprint();
    assert!(FieldAddress::scalar("coverSection", "title").check(&blueprint).is_ok());
    assert!(FieldAddress::element("coverSection", "title", 0).check(&blueprint).is_err());
}

#[test]
fn test_array_address_requires_index_or_role_key() {
    let blueprint = wedding_blueprint();
    assert!(FieldAddress::element("eventDetails", "eventLocation", 1).check(&blueprint).is_ok());

    // Plain field keys need an index on array sections
    assert!(FieldAddress::scalar("eventDetails", "eventLocation").check(&blueprint).is_err());

    // Role-prefixed keys take the predicate path
    assert!(FieldAddress::scalar("coupleDetails", "brideName").check(&blueprint).is_ok());
    assert!(FieldAddress::scalar("eventDetails", "resepsiEventLocation").check(&blueprint).is_ok());
}

#[test]
fn test_out_of_range_index_is_still_a_valid_address() {
    let blueprint = wedding_blueprint();
    assert!(FieldAddress::element("coupleDetails", "name", 99).check(&blueprint).is_ok());
}

#[test]
fn test_unknown_section_or_field() {
    let blueprint = event_blueprint();
    assert!(FieldAddress::scalar("coupleDetails", "brideName").check(&blueprint).is_err());
    assert!(FieldAddress::scalar("coverSection", "nope").check(&blueprint).is_err());
}

#[test]
fn test_flattened_section_addresses_like_a_scalar_section() {
    let blueprint = wedding_blueprint();
    let address: FieldAddress = "additional.additionalNote".parse().unwrap();
    assert!(address.check(&blueprint).is_ok());
    assert_eq!(address.control_key().to_string(), "additional-additionalNote");
}
