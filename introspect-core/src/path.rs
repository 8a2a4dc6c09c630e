//! Field lookup and dotted path walking shared by getters and setters

use std::any::TypeId;
use std::collections::HashMap;

use crate::{Error, Field, FieldId, PointeeMut, Pointee, Type, TypeInfoDynamic};

/// Finds field by name, following the promotion rule of flattened fields
///
/// Direct fields win. Otherwise flattened fields are searched breadth-first,
/// the first depth with a match decides. Several matches at one depth make the
/// name ambiguous and nothing is found. A type flattened more than once at one
/// depth counts as several matches.
pub(crate) fn lookup(ty: &'static Type, name: &str) -> Option<(Vec<usize>, &'static Field)> {
    let root = ty.penetrate();
    let mut level = vec![(Vec::new(), root)];
    let mut counts = HashMap::from([(root.id(), 1usize)]);
    let mut visited: Vec<TypeId> = Vec::new();

    while !level.is_empty() {
        let mut found = None;
        let mut next = Vec::new();
        let mut next_counts: HashMap<TypeId, usize> = HashMap::new();

        for (route, ty) in level {
            if visited.contains(&ty.id()) {
                continue;
            }
            visited.push(ty.id());

            let Some(fields) = ty.fields() else {
                continue;
            };
            let duplicated = counts.get(&ty.id()).copied().unwrap_or(0) > 1;

            for (index, field) in fields.iter().enumerate() {
                if field.name() == Some(name) {
                    if duplicated || found.is_some() {
                        return None;
                    }
                    let mut field_route = route.clone();
                    field_route.push(index);
                    found = Some((field_route, field));
                    continue;
                }

                if found.is_some() || !field.flatten {
                    continue;
                }

                let inner = field.ty().penetrate();
                if !inner.is_struct() {
                    continue;
                }

                let count = next_counts.entry(inner.id()).or_insert(0);
                if *count > 0 {
                    *count = 2;
                    continue;
                }
                *count = if duplicated { 2 } else { 1 };

                let mut field_route = route.clone();
                field_route.push(index);
                next.push((field_route, inner));
            }
        }

        if found.is_some() {
            return found;
        }
        level = next;
        counts = next_counts;
    }

    None
}

/// Like [`lookup`], but numeric ids address fields by position without promotion
pub(crate) fn resolve(ty: &'static Type, id: FieldId<'_>) -> Option<(Vec<usize>, &'static Field)> {
    match id {
        FieldId::Named(name) => lookup(ty, name),
        FieldId::Index(index) => ty.fields()?.get(index).map(|field| (vec![index], field)),
    }
}

/// Splits dotted path, rejecting empty paths and empty segments
pub(crate) fn segments(path: &str) -> Result<Vec<&str>, Error> {
    if path.is_empty() {
        return Err(Error::EmptyPath);
    }

    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(Error::InvalidPath(path.to_owned()));
    }
    Ok(segments)
}

/// Dereferences every pointer layer, `None` on nil
pub(crate) fn deref(mut value: &dyn TypeInfoDynamic) -> Option<&dyn TypeInfoDynamic> {
    loop {
        match value.pointee() {
            Pointee::NotPointer => return Some(value),
            Pointee::Nil => return None,
            Pointee::Value(inner) => value = inner,
        }
    }
}

/// Mutable [`deref`], optionally allocating nil pointers on the way
pub(crate) fn deref_mut(mut value: &mut dyn TypeInfoDynamic, allocate: bool) -> Option<&mut dyn TypeInfoDynamic> {
    loop {
        if !value.get_dynamic().kind.is_pointer() {
            return Some(value);
        }

        match value.pointee_mut(allocate) {
            PointeeMut::Value(inner) => value = inner,
            PointeeMut::Nil | PointeeMut::NotPointer => return None,
        }
    }
}

/// Follows field indices produced by [`lookup`] from a struct value
///
/// Intermediate flattened fields are dereferenced, `name` is reported when one of them is nil
pub(crate) fn follow<'a>(
    mut value: &'a dyn TypeInfoDynamic,
    route: &[usize],
    name: &str,
) -> Result<&'a dyn TypeInfoDynamic, Error> {
    for (step, index) in route.iter().enumerate() {
        if step > 0 {
            value = deref(value).ok_or_else(|| Error::NilField(name.to_owned()))?;
        }
        value = value
            .field(FieldId::Index(*index))
            .map_err(|err| Error::from_access(err, name))?;
    }
    Ok(value)
}

/// Mutable [`follow`]
pub(crate) fn follow_mut<'a>(
    mut value: &'a mut dyn TypeInfoDynamic,
    route: &[usize],
    name: &str,
    allocate: bool,
) -> Result<&'a mut dyn TypeInfoDynamic, Error> {
    for (step, index) in route.iter().enumerate() {
        if step > 0 {
            value = deref_mut(value, allocate).ok_or_else(|| Error::NilField(name.to_owned()))?;
        }
        value = value
            .field_mut(FieldId::Index(*index))
            .map_err(|err| Error::from_access(err, name))?;
    }
    Ok(value)
}
