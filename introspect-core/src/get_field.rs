//! Reading fields of a struct value by name or by dotted path

use std::any::Any;

use crate::path::{deref, follow, lookup, resolve, segments};
use crate::{Error, FieldId, Kind, Type, TypeInfoDynamic};

fn struct_value(obj: &dyn TypeInfoDynamic) -> Result<&dyn TypeInfoDynamic, Error> {
    let value = deref(obj).ok_or(Error::NilObject)?;
    if !value.get_dynamic().is_struct() {
        return Err(Error::NotStruct);
    }
    Ok(value)
}

/// Borrows field `name` of struct `obj`
///
/// `obj` may be behind any number of `Option`/`Box` layers. Fields of flattened
/// fields are found as if they were declared on `obj` itself
pub fn field<'a>(obj: &'a dyn TypeInfoDynamic, name: &str) -> Result<&'a dyn TypeInfoDynamic, Error> {
    let value = struct_value(obj)?;
    let (route, _) = lookup(value.get_dynamic(), name).ok_or_else(|| Error::NoSuchField(name.to_owned()))?;
    follow(value, &route, name)
}

/// Borrows field `name` as `T`
///
/// Fails with [`Error::TypeMismatch`] if the field is of other type
pub fn field_value<'a, T: Any>(obj: &'a dyn TypeInfoDynamic, name: &str) -> Result<&'a T, Error> {
    downcast(field(obj, name)?, name)
}

pub fn field_kind(obj: &dyn TypeInfoDynamic, name: &str) -> Result<Kind, Error> {
    Ok(field(obj, name)?.get_dynamic().kind)
}

pub fn field_type(obj: &dyn TypeInfoDynamic, name: &str) -> Result<&'static Type, Error> {
    Ok(field(obj, name)?.get_dynamic())
}

/// Full type name of field `name`, e.g. `alloc::string::String`
pub fn field_type_name(obj: &dyn TypeInfoDynamic, name: &str) -> Result<&'static str, Error> {
    Ok(field_type(obj, name)?.name())
}

/// Borrows field at dotted `path`, e.g. `city.town.int`
///
/// Every segment but the last must name a struct field, possibly behind
/// `Option`/`Box`. Numeric segments address tuple fields.
///
/// ```
/// # use introspect_core::*;
/// let err = embed_field(&1u8, "a.b").unwrap_err();
/// assert_eq!(err.to_string(), "obj must be struct");
/// ```
pub fn embed_field<'a>(obj: &'a dyn TypeInfoDynamic, path: &str) -> Result<&'a dyn TypeInfoDynamic, Error> {
    let mut target = struct_value(obj)?;
    let segments = segments(path)?;

    let mut previous: Option<&str> = None;
    for segment in segments {
        if let Some(previous) = previous {
            target = deref(target).ok_or_else(|| Error::NilField(previous.to_owned()))?;
            if !target.get_dynamic().is_struct() {
                return Err(Error::FieldNotStruct(previous.to_owned()));
            }
        }

        let (route, _) = resolve(target.get_dynamic(), FieldId::parse(segment))
            .ok_or_else(|| Error::NoSuchField(segment.to_owned()))?;
        target = follow(target, &route, segment)?;
        previous = Some(segment);
    }

    Ok(target)
}

pub fn embed_field_value<'a, T: Any>(obj: &'a dyn TypeInfoDynamic, path: &str) -> Result<&'a T, Error> {
    downcast(embed_field(obj, path)?, path)
}

pub fn embed_field_kind(obj: &dyn TypeInfoDynamic, path: &str) -> Result<Kind, Error> {
    Ok(embed_field(obj, path)?.get_dynamic().kind)
}

pub fn embed_field_type(obj: &dyn TypeInfoDynamic, path: &str) -> Result<&'static Type, Error> {
    Ok(embed_field(obj, path)?.get_dynamic())
}

pub fn embed_field_type_name(obj: &dyn TypeInfoDynamic, path: &str) -> Result<&'static str, Error> {
    Ok(embed_field_type(obj, path)?.name())
}

fn downcast<'a, T: Any>(value: &'a dyn TypeInfoDynamic, field: &str) -> Result<&'a T, Error> {
    value.downcast_ref::<T>().ok_or_else(|| Error::TypeMismatch {
        field: field.to_owned(),
        actual: value.get_dynamic().name(),
    })
}
