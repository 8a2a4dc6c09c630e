mod common;

use std::any::Any;

use common::{Greeter, Person, Point, Shape, Town};
use introspect::*;

#[derive(introspect::TypeInfo)]
pub struct Test {
    a: i32,
    b: u32,
}

#[test]
pub fn test_name() {
    assert_eq!(Test::INFO.ident, "Test");
    assert_eq!(Test::INFO.kind, Kind::Struct);
    assert!(Test::INFO.module.ends_with("test_derive"));
}

#[test]
pub fn test_fields_in_order() {
    let names: Vec<_> = Test::INFO
        .fields()
        .unwrap()
        .iter()
        .map(|field| field.name().unwrap())
        .collect();
    assert_eq!(names, ["a", "b"]);

    let a = &Test::INFO.fields().unwrap()[0];
    assert!(!a.public);
    assert_eq!(a.ty(), <i32 as TypeInfo>::INFO);
}

#[test]
pub fn test_tags_and_flatten() {
    let fields = Person::INFO.fields().unwrap();
    let name = &fields[0];
    assert_eq!(name.tag("json"), Some("name"));
    assert_eq!(name.tag("db"), Some("person_name"));
    assert_eq!(name.tag("xml"), None);

    let country = fields.iter().find(|field| field.name() == Some("country")).unwrap();
    assert!(country.flatten);
    assert!(country.tags.is_empty());
}

#[test]
pub fn test_declared_traits() {
    assert!(Person::INFO.implements(std::any::TypeId::of::<dyn Greeter>()));
    assert!(!Town::INFO.implements(std::any::TypeId::of::<dyn Greeter>()));
}

#[test]
pub fn test_self_referential_pointer() {
    let ptr_person = Person::INFO
        .fields()
        .unwrap()
        .iter()
        .find(|field| field.name() == Some("ptr_person"))
        .unwrap();
    assert_eq!(ptr_person.kind(), Kind::Option);
    assert_eq!(ptr_person.ty().penetrate(), Person::INFO);
}

#[test]
pub fn test_tuple_struct() {
    let point = Point(1, 2);
    let second = point.field(FieldId::Index(1)).unwrap();
    assert_eq!(second.downcast_ref::<i32>(), Some(&2));
    assert!(matches!(Point::INFO.data, Data::Struct(Fields::Indexed(_))));
}

#[test]
pub fn test_enum_variants() {
    let shape = Shape::Circle { radius: 2.5 };
    assert_eq!(shape.variant(), Some("Circle"));
    assert_eq!(
        shape.field("radius".into()).unwrap().downcast_ref::<f64>(),
        Some(&2.5)
    );
    assert_eq!(Shape::Dot.field(FieldId::Index(0)).unwrap_err(), FieldAccessError::Unit);

    let Data::Enum(variants) = &Shape::INFO.data else {
        panic!("enum expected");
    };
    let idents: Vec<_> = variants.variants.iter().map(|variant| variant.ident).collect();
    assert_eq!(idents, ["Dot", "Circle", "Segment"]);
}

#[test]
pub fn test_zeroed() {
    assert_eq!(Shape::zeroed(), Shape::Dot);
    assert_eq!(Town::zeroed(), Town::default());
    assert_eq!(Point::zeroed(), Point(0, 0));
}

#[test]
pub fn test_runtime_construct() {
    let args: Vec<Box<dyn Any>> = vec![Box::new(3i32), Box::new(4i32)];
    let point = Point::zeroed().construct_struct(args).unwrap();
    assert_eq!(point.downcast_ref::<Point>(), Some(&Point(3, 4)));

    let args: Vec<Box<dyn Any>> = vec![Box::new(3i64)];
    assert_eq!(
        Point::zeroed().construct_struct(args).unwrap_err(),
        RuntimeConstructError::UnexpectedType {
            index: 0,
            expected: "i32"
        }
    );

    let args: Vec<Box<dyn Any>> = vec![Box::new(1.5f64)];
    let shape = Shape::Dot.construct_enum("Circle", args).unwrap();
    assert_eq!(shape.downcast_ref::<Shape>(), Some(&Shape::Circle { radius: 1.5 }));

    assert_eq!(
        Shape::Dot.construct_enum("Square", vec![]).unwrap_err(),
        RuntimeConstructError::InvalidVariant
    );
    assert_eq!(
        Shape::Dot.construct_struct(vec![]).unwrap_err(),
        RuntimeConstructError::NotStruct
    );
}
