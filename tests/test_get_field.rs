mod common;

use common::{person, Person, Point, Town};
use introspect::*;

#[test]
pub fn test_field() {
    let person = person();

    assert_eq!(field_value::<String>(&person, "name").unwrap(), "John");
    assert_eq!(field_value::<i64>(&person, "age").unwrap(), &30);
    // private fields are readable
    assert_eq!(field_value::<String>(&person, "phone").unwrap(), "555-0100");

    let err = field(&person, "address").unwrap_err();
    assert_eq!(err.to_string(), "no such field: address");

    let err = field(&"test".to_owned(), "name").unwrap_err();
    assert_eq!(err.to_string(), "obj must be struct");
}

#[test]
pub fn test_field_behind_pointers() {
    let boxed = Some(Box::new(person()));
    assert_eq!(field_value::<i64>(&boxed, "age").unwrap(), &30);

    let nil: Option<Box<Person>> = None;
    let err = field(&nil, "name").unwrap_err();
    assert_eq!(err.to_string(), "obj must not be nil");
}

#[test]
pub fn test_promoted_fields() {
    let person = person();

    // `name` is declared on Person itself and shadows Country::name
    assert_eq!(field_value::<String>(&person, "name").unwrap(), "John");
    // `id` comes from the flattened country
    assert_eq!(field_value::<i64>(&person, "id").unwrap(), &1);
    assert_eq!(field_kind(&person, "city").unwrap(), Kind::Struct);
}

#[derive(TypeInfo, Default)]
struct Inner {
    pub x: i64,
}

#[derive(TypeInfo, Default)]
struct Other {
    pub x: i64,
    pub y: i64,
}

#[derive(TypeInfo, Default)]
struct SameTwice {
    #[introspect(flatten)]
    pub a: Inner,
    #[introspect(flatten)]
    pub b: Inner,
}

#[derive(TypeInfo, Default)]
struct SharedName {
    #[introspect(flatten)]
    pub inner: Inner,
    #[introspect(flatten)]
    pub other: Option<Box<Other>>,
}

#[derive(TypeInfo, Default)]
struct Shadowing {
    pub x: i64,
    #[introspect(flatten)]
    pub both: SharedName,
}

#[test]
pub fn test_promoted_name_ambiguity() {
    let same = SameTwice::default();
    assert!(matches!(field(&same, "x"), Err(Error::NoSuchField(_))));
    assert!(!has_field(&same, "x").unwrap());

    let shared = SharedName {
        other: Some(Box::new(Other { x: 1, y: 2 })),
        ..Default::default()
    };
    assert!(matches!(field(&shared, "x"), Err(Error::NoSuchField(_))));
    assert!(!has_field(&shared, "x").unwrap());
    // unique names are still promoted
    assert_eq!(field_value::<i64>(&shared, "y").unwrap(), &2);

    // a shallower match hides the ambiguous deeper ones
    let shadowing = Shadowing {
        x: 5,
        ..Default::default()
    };
    assert_eq!(field_value::<i64>(&shadowing, "x").unwrap(), &5);
    assert!(matches!(field(&shadowing, "y"), Err(Error::NilField(_))));

    let mut same = SameTwice::default();
    let err = set_field(&mut same, "x", 1).unwrap_err();
    assert_eq!(err.to_string(), "no such field: x");
}

#[test]
pub fn test_field_type_mismatch() {
    let err = field_value::<i32>(&person(), "age").unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { actual: "i64", .. }));
    assert_eq!(err.to_string(), "field: age has type i64");
}

#[test]
pub fn test_field_kind_and_type() {
    let person = person();

    assert_eq!(field_kind(&person, "name").unwrap(), Kind::String);
    assert_eq!(field_kind(&person, "ptr_person").unwrap(), Kind::Option);
    assert_eq!(field_type(&person, "age").unwrap(), <i64 as TypeInfo>::INFO);
    assert_eq!(field_type_name(&person, "age").unwrap(), "i64");
    assert_eq!(field_type(&person, "country").unwrap().ident, "Country");
}

#[test]
pub fn test_embed_field() {
    let person = person();

    assert_eq!(embed_field_value::<i64>(&person, "country.city.id").unwrap(), &2);
    assert_eq!(embed_field_value::<i64>(&person, "city.ptr_town.int").unwrap(), &3);
    assert_eq!(embed_field_value::<String>(&person, "city.town.str").unwrap(), "town");
    assert_eq!(
        embed_field_value::<Vec<String>>(&person, "city.ptr_town.strs").unwrap(),
        &["a".to_owned(), "b".to_owned()]
    );
    assert_eq!(embed_field_kind(&person, "city.ptr_town").unwrap(), Kind::Option);
    assert_eq!(embed_field_type(&person, "city.town").unwrap(), Town::INFO);
    assert_eq!(embed_field_type_name(&person, "city.town.bool").unwrap(), "bool");
}

#[test]
pub fn test_embed_field_errors() {
    let person = person();

    let err = embed_field(&person, "").unwrap_err();
    assert_eq!(err.to_string(), "field path must not be empty");

    let err = embed_field(&person, "city..id").unwrap_err();
    assert_eq!(err.to_string(), "field path:city..id is invalid");

    let err = embed_field(&person, "ptr_city.id").unwrap_err();
    assert_eq!(err.to_string(), "field: ptr_city is nil");

    let err = embed_field(&person, "age.value").unwrap_err();
    assert_eq!(err.to_string(), "field: age is not struct");

    let err = embed_field(&person, "city.nowhere").unwrap_err();
    assert_eq!(err.to_string(), "no such field: nowhere");
}

#[test]
pub fn test_embed_field_tuple_segments() {
    #[derive(TypeInfo)]
    struct Ends(pub Point, pub Point);

    #[derive(TypeInfo)]
    struct Line {
        pub ends: Ends,
    }

    let line = Line {
        ends: Ends(Point(0, 1), Point(2, 3)),
    };
    assert_eq!(embed_field_value::<i32>(&line, "ends.1.0").unwrap(), &2);
    assert_eq!(embed_field_value::<i32>(&line, "ends.0.1").unwrap(), &1);
}
