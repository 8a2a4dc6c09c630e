//! Writing fields of a struct value by name or by dotted path

use std::any::Any;

use crate::path::{deref_mut, follow_mut, lookup, resolve, segments};
use crate::{Error, FieldId, TypeInfoDynamic};

fn struct_value_mut(obj: &mut dyn TypeInfoDynamic) -> Result<&mut dyn TypeInfoDynamic, Error> {
    let value = deref_mut(obj, false).ok_or(Error::NilObject)?;
    if !value.get_dynamic().is_struct() {
        return Err(Error::NotStruct);
    }
    Ok(value)
}

fn assigned(field: &str, result: Result<(), crate::AssignError>) -> Result<(), Error> {
    result.map_err(|source| Error::Assign {
        field: field.to_owned(),
        source,
    })
}

fn set_by_name(obj: &mut dyn TypeInfoDynamic, name: &str, value: Box<dyn Any>, public_only: bool) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::EmptyFieldName);
    }

    let target = struct_value_mut(obj)?;
    let (route, field) = lookup(target.get_dynamic(), name).ok_or_else(|| Error::NoSuchField(name.to_owned()))?;
    if public_only && !field.public {
        return Err(Error::Unsettable(name.to_owned()));
    }

    tracing::trace!(field = name, ty = field.ty().name(), "setting field");
    let slot = follow_mut(target, &route, name, false)?;
    assigned(name, slot.assign(value))
}

/// Sets `pub` field `name` of struct `obj` to `value`
///
/// `value` is converted the way [`TypeInfoDynamic::assign`] of the field does:
/// an `i64` field accepts any integer that fits, an `Option<T>` field accepts a `T`.
/// Private fields fail with [`Error::Unsettable`], see [`set_private_field`]
pub fn set_field<V: Any>(obj: &mut dyn TypeInfoDynamic, name: &str, value: V) -> Result<(), Error> {
    set_by_name(obj, name, Box::new(value), true)
}

/// Same as [`set_field`], but private fields can be set too
pub fn set_private_field<V: Any>(obj: &mut dyn TypeInfoDynamic, name: &str, value: V) -> Result<(), Error> {
    set_by_name(obj, name, Box::new(value), false)
}

/// Sets field at dotted `path`, e.g. `ptr_city.ptr_town.int`
///
/// Every field on the path must be `pub`. `None` found on the way is replaced
/// with `Some` of zero value before descending, so the path always exists afterwards
pub fn set_embed_field<V: Any>(obj: &mut dyn TypeInfoDynamic, path: &str, value: V) -> Result<(), Error> {
    let mut target = struct_value_mut(obj)?;
    let segments = segments(path)?;

    let last = segments.len() - 1;
    for (position, segment) in segments.iter().enumerate() {
        let (route, field) = resolve(target.get_dynamic(), FieldId::parse(segment))
            .ok_or_else(|| Error::NoSuchField((*segment).to_owned()))?;
        if !field.public {
            return Err(Error::Unsettable((*segment).to_owned()));
        }

        target = follow_mut(target, &route, segment, true)?;
        if position == last {
            break;
        }

        target = deref_mut(target, true).ok_or_else(|| Error::NilField((*segment).to_owned()))?;
        if !target.get_dynamic().is_struct() {
            return Err(Error::FieldNotStruct((*segment).to_owned()));
        }
    }

    tracing::trace!(path, ty = target.get_dynamic().name(), "setting embedded field");
    assigned(path, target.assign(Box::new(value)))
}
