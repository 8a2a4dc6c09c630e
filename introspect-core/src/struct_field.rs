//! Field descriptors of struct types
//!
//! Only the type of `obj` matters here, so a `None` behind an `Option` is as
//! good as a value.

use crate::path::{lookup, resolve, segments};
use crate::{Error, Field, FieldId, Kind, Type, TypeInfoDynamic};

fn struct_type(obj: &dyn TypeInfoDynamic) -> Result<&'static Type, Error> {
    let ty = obj.get_dynamic().penetrate();
    if !ty.is_struct() {
        return Err(Error::NotStruct);
    }
    Ok(ty)
}

/// Descriptor of field `name`, including fields promoted from flattened fields
pub fn struct_field(obj: &dyn TypeInfoDynamic, name: &str) -> Result<&'static Field, Error> {
    let ty = struct_type(obj)?;
    lookup(ty, name)
        .map(|(_, field)| field)
        .ok_or_else(|| Error::NoSuchField(name.to_owned()))
}

pub fn struct_field_kind(obj: &dyn TypeInfoDynamic, name: &str) -> Result<Kind, Error> {
    Ok(struct_field(obj, name)?.kind())
}

pub fn struct_field_type(obj: &dyn TypeInfoDynamic, name: &str) -> Result<&'static Type, Error> {
    Ok(struct_field(obj, name)?.ty())
}

pub fn struct_field_type_name(obj: &dyn TypeInfoDynamic, name: &str) -> Result<&'static str, Error> {
    Ok(struct_field(obj, name)?.ty().name())
}

/// Whether struct `obj` has field `name`
///
/// Fails only if `obj` is not a struct
pub fn has_field(obj: &dyn TypeInfoDynamic, name: &str) -> Result<bool, Error> {
    match struct_field(obj, name) {
        Ok(_) => Ok(true),
        Err(Error::NoSuchField(_)) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Value of tag `key` on field `name`, `None` if field has no such tag
pub fn struct_field_tag(obj: &dyn TypeInfoDynamic, name: &str, key: &str) -> Result<Option<&'static str>, Error> {
    Ok(struct_field(obj, name)?.tag(key))
}

/// Every field declared on the struct, in definition order
///
/// Fields of flattened fields are not expanded
pub fn struct_fields(obj: &dyn TypeInfoDynamic) -> Result<&'static [Field], Error> {
    let ty = struct_type(obj)?;
    Ok(ty.fields().unwrap_or(&[]))
}

/// Fields for which `predicate` returns `true`, called with field index and field
pub fn select_struct_fields<F>(obj: &dyn TypeInfoDynamic, mut predicate: F) -> Result<Vec<&'static Field>, Error>
where
    F: FnMut(usize, &Field) -> bool,
{
    Ok(struct_fields(obj)?
        .iter()
        .enumerate()
        .filter(|(index, field)| predicate(*index, *field))
        .map(|(_, field)| field)
        .collect())
}

/// Calls `visit` for every field until it returns `false`
pub fn range_struct_fields<F>(obj: &dyn TypeInfoDynamic, mut visit: F) -> Result<(), Error>
where
    F: FnMut(usize, &Field) -> bool,
{
    for (index, field) in struct_fields(obj)?.iter().enumerate() {
        if !visit(index, field) {
            break;
        }
    }
    Ok(())
}

/// Fields marked with `#[introspect(flatten)]`
pub fn flattened_struct_fields(obj: &dyn TypeInfoDynamic) -> Result<Vec<&'static Field>, Error> {
    select_struct_fields(obj, |_, field| field.flatten)
}

/// Descriptor of field at dotted `path`
///
/// Unlike [`crate::embed_field`], `None` on the way doesn't matter
pub fn embed_struct_field(obj: &dyn TypeInfoDynamic, path: &str) -> Result<&'static Field, Error> {
    let mut target = struct_type(obj)?;
    let segments = segments(path)?;

    let mut found: Option<(&str, &'static Field)> = None;
    for segment in segments {
        if let Some((previous, field)) = found {
            target = field.ty().penetrate();
            if !target.is_struct() {
                return Err(Error::FieldNotStruct(previous.to_owned()));
            }
        }

        let (_, field) =
            resolve(target, FieldId::parse(segment)).ok_or_else(|| Error::NoSuchField(segment.to_owned()))?;
        found = Some((segment, field));
    }

    // segments() never yields an empty list
    found.map(|(_, field)| field).ok_or(Error::EmptyPath)
}

pub fn embed_struct_field_kind(obj: &dyn TypeInfoDynamic, path: &str) -> Result<Kind, Error> {
    Ok(embed_struct_field(obj, path)?.kind())
}

pub fn embed_struct_field_type(obj: &dyn TypeInfoDynamic, path: &str) -> Result<&'static Type, Error> {
    Ok(embed_struct_field(obj, path)?.ty())
}

pub fn embed_struct_field_type_name(obj: &dyn TypeInfoDynamic, path: &str) -> Result<&'static str, Error> {
    Ok(embed_struct_field(obj, path)?.ty().name())
}
