//! Helpers about the reflected value itself: its type, pointers, zero value

use std::any::{Any, TypeId};

use crate::path::{deref, deref_mut};
use crate::{Error, Type, TypeInfo, TypeInfoDynamic};

/// Type descriptor of `obj`
pub fn type_of(obj: &dyn TypeInfoDynamic) -> &'static Type {
    obj.get_dynamic()
}

/// Type descriptor of `obj` with every pointer layer stripped
///
/// `Option<Box<Option<i32>>>` gives descriptor of `i32`
pub fn elem_type_of(obj: &dyn TypeInfoDynamic) -> &'static Type {
    obj.get_dynamic().penetrate()
}

/// Dereferences every pointer layer of `obj`
///
/// Fails with [`Error::NilObject`] if one of layers is `None`
pub fn value_of(obj: &dyn TypeInfoDynamic) -> Result<&dyn TypeInfoDynamic, Error> {
    deref(obj).ok_or(Error::NilObject)
}

/// Mutable [`value_of`]
pub fn value_of_mut(obj: &mut dyn TypeInfoDynamic) -> Result<&mut dyn TypeInfoDynamic, Error> {
    deref_mut(obj, false).ok_or(Error::NilObject)
}

/// Whether some pointer layer of `obj` is `None`
pub fn is_nil(obj: &dyn TypeInfoDynamic) -> bool {
    deref(obj).is_none()
}

/// Module path the type of `obj` was defined in, empty for std types
pub fn module_path_of(obj: &dyn TypeInfoDynamic) -> &'static str {
    elem_type_of(obj).module
}

/// Checks whether type of `obj` declared `I` (a `dyn Trait`) with `#[introspect(implements(..))]`
///
/// Pointer layers are stripped first. Primitives declare `Debug` and `Display`
///
/// ```
/// use introspect_core::implements;
///
/// assert!(implements::<dyn std::fmt::Display>(&5u8));
/// assert!(!implements::<dyn std::fmt::Display>(&vec![5u8]));
/// ```
pub fn implements<I: ?Sized + Any>(obj: &dyn TypeInfoDynamic) -> bool {
    elem_type_of(obj).implements(TypeId::of::<I>())
}

/// Zero value of the same type as `obj`
///
/// Pointer layers are kept: zero value of `Box<T>` is `Box` of zeroed `T`,
/// zero value of `Option<T>` is `None`
pub fn new_instance(obj: &dyn TypeInfoDynamic) -> Box<dyn TypeInfoDynamic> {
    obj.zeroed_dyn()
}

/// Zero value of `T`, see [`TypeInfo::zeroed`]
pub fn zeroed<T: TypeInfo>() -> T {
    T::zeroed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kind;

    #[test]
    fn penetrates_pointers() {
        let value: Option<Box<Option<i32>>> = Some(Box::new(Some(7)));
        assert_eq!(elem_type_of(&value).kind, Kind::I32);
        assert_eq!(type_of(&value).kind, Kind::Option);
        assert_eq!(value_of(&value).unwrap().downcast_ref::<i32>(), Some(&7));
    }

    #[test]
    fn nil_layers() {
        let value: Option<Box<Option<i32>>> = Some(Box::new(None));
        assert!(is_nil(&value));
        assert!(matches!(value_of(&value), Err(Error::NilObject)));
        assert!(!is_nil(&3u8));
    }

    #[test]
    fn zero_values() {
        let instance = new_instance(&String::from("1"));
        assert_eq!(instance.downcast_ref::<String>(), Some(&String::new()));

        let instance = new_instance(&Box::new(5u64));
        assert_eq!(instance.downcast_ref::<Box<u64>>(), Some(&Box::new(0)));

        let instance = new_instance(&Some(1.5f32));
        assert_eq!(instance.downcast_ref::<Option<f32>>(), Some(&None));

        assert_eq!(zeroed::<[u8; 2]>(), [0, 0]);
        assert_eq!(module_path_of(&1u8), "");
    }
}
