//! Generic type resolution against the fixture catalog.

use fixture_core::{Resolver, TypeCatalog, TypeDescriptor};
use std::sync::Arc;

fn resolver() -> Resolver {
    let catalog = TypeCatalog::from_file("tests/fixtures/catalog.yaml")
        .expect("Failed to load test catalog");
    Resolver::new(Arc::new(catalog))
}

fn field_type(resolver: &Resolver, type_name: &str, field: &str) -> String {
    let desc = resolver.resolve_str(type_name).unwrap();
    resolver
        .fields_of(&desc)
        .iter()
        .find(|f| f.name == field)
        .map(|f| f.field_type.to_string())
        .unwrap_or_else(|| panic!("{type_name} has no field {field}"))
}

#[test]
fn test_field_declared_two_levels_up() {
    let resolver = resolver();
    assert_eq!(field_type(&resolver, "Sub", "id"), "list<string>");

    // Read through the intermediate type directly
    assert_eq!(
        field_type(&resolver, "Intermediate<Long>", "id"),
        "i64"
    );
}

#[test]
fn test_swapped_parameters() {
    let resolver = resolver();
    assert_eq!(field_type(&resolver, "LongResourceFirstType", "id"), "i64");
    assert_eq!(field_type(&resolver, "LongResourceFirstType", "name"), "string");
}

#[test]
fn test_interface_arguments_follow_the_chain() {
    let resolver = resolver();
    let customer = TypeDescriptor::named("Customer");

    let identifiable = resolver.as_supertype(&customer, "Identifiable").unwrap();
    assert_eq!(identifiable.to_string(), "Identifiable<uuid>");
    assert_eq!(field_type(&resolver, "Customer", "id"), "uuid");
    assert_eq!(field_type(&resolver, "Order", "id"), "i64");

    // Inherited fields come first
    let names: Vec<String> = resolver
        .fields_of(&customer)
        .iter()
        .map(|f| f.name.clone())
        .collect();
    assert_eq!(&names[..2], ["id", "created_at"]);
}

#[test]
fn test_request_arguments() {
    let resolver = resolver();
    assert_eq!(field_type(&resolver, "Page<Customer>", "items"), "list<Customer>");
    assert_eq!(
        field_type(&resolver, "Page<Map<String, Order>>", "items"),
        "list<map<string, Order>>"
    );

    // Raw use leaves the variable unknown
    assert_eq!(field_type(&resolver, "Page", "items"), "list<?>");
}

#[test]
fn test_subtype_queries() {
    let resolver = resolver();
    let order = TypeDescriptor::named("Order");
    assert!(resolver.is_subtype(&order, "Entity"));
    assert!(resolver.is_subtype(&order, "Identifiable"));
    assert!(resolver.is_subtype(&order, "Object"));
    assert!(!resolver.is_subtype(&order, "Customer"));

    let shapes = resolver.concrete_subtypes(&TypeDescriptor::named("Shape"));
    let names: Vec<String> = shapes.iter().map(ToString::to_string).collect();
    assert_eq!(names, ["Circle", "Square"]);
}

#[test]
fn test_describe_type() {
    let resolver = resolver();
    let desc = resolver.resolve_str("Sub").unwrap();
    let description = fixture_gen::describe_type(&resolver, &desc);

    assert_eq!(
        description,
        "Sub\n  extends Intermediate<list<string>>\n  extends Parent<list<string>>\n  id: list<string> (Parent)\n"
    );
}

#[test]
fn test_shared_resolver_between_threads() {
    let resolver = Arc::new(resolver());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            std::thread::spawn(move || field_type(&resolver, "Sub", "id"))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), "list<string>");
    }
}
