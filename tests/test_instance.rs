mod common;

use std::collections::HashMap;

use common::{Country, Greeter, Person, Shape, Town};
use introspect::*;
use proptest::prelude::*;

#[test]
pub fn test_new_instance() {
    let person = common::person();
    let zero = new_instance(&person);
    assert_eq!(zero.downcast_ref::<Person>(), Some(&Person::default()));

    let boxed = Box::new(common::country());
    let zero = new_instance(&boxed);
    assert_eq!(zero.downcast_ref::<Box<Country>>(), Some(&Box::new(Country::default())));

    let some = Some(5u8);
    let zero = new_instance(&some);
    assert_eq!(zero.downcast_ref::<Option<u8>>(), Some(&None));

    let zero = new_instance(&Shape::Circle { radius: 1.0 });
    assert_eq!(zero.downcast_ref::<Shape>(), Some(&Shape::Dot));

    let zero = type_of(&vec![1u8]).new_instance();
    assert_eq!(zero.downcast_ref::<Vec<u8>>(), Some(&Vec::new()));
}

#[test]
pub fn test_zeroed() {
    assert_eq!(zeroed::<Town>(), Town::default());
    assert_eq!(zeroed::<[u16; 3]>(), [0; 3]);
    assert_eq!(zeroed::<HashMap<String, i32>>(), HashMap::new());
    assert_eq!(zeroed::<char>(), '\0');
}

#[test]
pub fn test_implements() {
    let person = common::person();
    assert!(implements::<dyn Greeter>(&person));
    assert!(implements::<dyn Greeter>(&Some(Box::new(person.clone()))));
    assert!(!implements::<dyn Greeter>(&Town::default()));
    assert!(implements::<dyn std::fmt::Debug>(&1.5f32));
    assert_eq!(person.greet(), "hello, John");
}

#[test]
pub fn test_type_of() {
    let value: Option<Box<Town>> = None;
    assert_eq!(type_of(&value).kind, Kind::Option);
    assert_eq!(elem_type_of(&value), Town::INFO);
    assert_eq!(type_of(&value).elem(), Some(<Box<Town> as TypeInfo>::INFO));
    assert!(is_nil(&value));
    assert!(matches!(value_of(&value), Err(Error::NilObject)));

    let mut value = Some(Box::new(Town::default()));
    assert!(!is_nil(&value));
    value_of_mut(&mut value)
        .unwrap()
        .field_mut("int".into())
        .unwrap()
        .assign(Box::new(3i64))
        .unwrap();
    assert_eq!(value.map(|town| town.int), Some(3));
}

#[test]
pub fn test_module_path() {
    assert!(module_path_of(&Town::default()).ends_with("common"));
    assert!(module_path_of(&Some(Town::default())).ends_with("common"));
    assert_eq!(module_path_of(&5i32), "");
}

proptest! {
    #[test]
    fn test_integer_assign_fits(value in any::<i64>()) {
        let mut target = 0i16;
        let result = target.assign(Box::new(value));
        match i16::try_from(value) {
            Ok(expected) => {
                prop_assert!(result.is_ok());
                prop_assert_eq!(target, expected);
            }
            Err(_) => {
                let is_out_of_range = matches!(result, Err(AssignError::OutOfRange { .. }));
                prop_assert!(is_out_of_range);
                prop_assert_eq!(target, 0);
            }
        }
    }

    #[test]
    fn test_unsigned_assign_fits(value in any::<u64>()) {
        let mut person = Person::default();
        let result = set_field(&mut person, "age", value);
        prop_assert_eq!(result.is_ok(), value <= i64::MAX as u64);
        if result.is_ok() {
            prop_assert_eq!(person.age as u64, value);
        }
    }

    #[test]
    fn test_float_assign_from_int(value in any::<i32>()) {
        let mut target = 0f64;
        prop_assert!(target.assign(Box::new(value)).is_ok());
        prop_assert_eq!(target, value as f64);
    }
}
