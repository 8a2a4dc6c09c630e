mod common;

use common::{Country, Person};
use introspect::*;

#[test]
pub fn test_struct_field() {
    let person = Person::default();

    let name = struct_field(&person, "name").unwrap();
    assert_eq!(name.name(), Some("name"));
    assert!(name.public);
    assert_eq!(struct_field_kind(&person, "age").unwrap(), Kind::I64);
    assert_eq!(struct_field_type(&person, "country").unwrap(), Country::INFO);
    assert_eq!(struct_field_type_name(&person, "phone").unwrap(), "alloc::string::String");

    let err = struct_field(&person, "address").unwrap_err();
    assert_eq!(err.to_string(), "no such field: address");

    let err = struct_field(&5u8, "name").unwrap_err();
    assert_eq!(err.to_string(), "obj must be struct");
}

#[test]
pub fn test_struct_field_of_nil() {
    // only the type matters
    let nil: Option<Box<Person>> = None;
    assert_eq!(struct_field_kind(&nil, "age").unwrap(), Kind::I64);
    assert!(has_field(&nil, "ptr_person").unwrap());
}

#[test]
pub fn test_has_field() {
    let person = Person::default();
    assert!(has_field(&person, "name").unwrap());
    assert!(has_field(&person, "id").unwrap());
    assert!(!has_field(&person, "address").unwrap());
    assert!(has_field(&"str".to_owned(), "len").is_err());
}

#[test]
pub fn test_struct_field_tag() {
    let person = Person::default();
    assert_eq!(struct_field_tag(&person, "name", "json").unwrap(), Some("name"));
    assert_eq!(struct_field_tag(&person, "age", "json").unwrap(), Some("age"));
    assert_eq!(struct_field_tag(&person, "age", "db").unwrap(), None);
    assert!(struct_field_tag(&person, "address", "json").is_err());
}

#[test]
pub fn test_struct_fields() {
    let names: Vec<_> = struct_fields(&Person::default())
        .unwrap()
        .iter()
        .filter_map(Field::name)
        .collect();
    assert_eq!(names, ["name", "age", "ptr_person", "phone", "country"]);
}

#[test]
pub fn test_select_struct_fields() {
    let person = Person::default();

    let tagged = select_struct_fields(&person, |_, field| field.tag("json").is_some()).unwrap();
    let names: Vec<_> = tagged.iter().filter_map(|field| field.name()).collect();
    assert_eq!(names, ["name", "age"]);

    let private = select_struct_fields(&person, |_, field| !field.public).unwrap();
    assert_eq!(private.len(), 1);
    assert_eq!(private[0].name(), Some("phone"));

    let odd = select_struct_fields(&person, |index, _| index % 2 == 1).unwrap();
    assert_eq!(odd.len(), 2);
}

#[test]
pub fn test_range_struct_fields() {
    let mut visited = Vec::new();
    range_struct_fields(&Person::default(), |index, field| {
        visited.push((index, field.name().unwrap_or_default()));
        index < 1
    })
    .unwrap();
    assert_eq!(visited, [(0, "name"), (1, "age")]);
}

#[test]
pub fn test_flattened_struct_fields() {
    let flattened = flattened_struct_fields(&Person::default()).unwrap();
    assert_eq!(flattened.len(), 1);
    assert_eq!(flattened[0].ty(), Country::INFO);

    assert!(flattened_struct_fields(&Country::default()).unwrap().is_empty());
}

#[test]
pub fn test_embed_struct_field() {
    let person = Person::default();

    // nil pointers on the way are fine, there is no value involved
    assert_eq!(embed_struct_field_kind(&person, "ptr_city.ptr_town.int").unwrap(), Kind::I64);
    assert_eq!(
        embed_struct_field(&person, "city.ptr_town").unwrap().name(),
        Some("ptr_town")
    );
    assert_eq!(embed_struct_field_type(&person, "ptr_person.country").unwrap(), Country::INFO);
    assert_eq!(embed_struct_field_type_name(&person, "city.town.bool").unwrap(), "bool");

    let err = embed_struct_field(&person, "age.value").unwrap_err();
    assert_eq!(err.to_string(), "field: age is not struct");

    let err = embed_struct_field(&person, "city.nowhere").unwrap_err();
    assert_eq!(err.to_string(), "no such field: nowhere");

    let err = embed_struct_field(&person, "").unwrap_err();
    assert_eq!(err.to_string(), "field path must not be empty");
}
