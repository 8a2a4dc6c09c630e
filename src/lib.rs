/*!
Crate for run-time reflection over plain Rust values

Information is generated entirely in compile-time using derive macro [`TypeInfo`]
and attribute macro [`methods`]. On top of it this crate offers helpers to read and
write struct fields by name or by dotted path, inspect field descriptors and tags,
call functions and methods with type-erased arguments and build zero values.

Most helpers operate with trait objects: [`TypeInfo`] describes a type that can be named,
[`TypeInfoDynamic`] is the same info for an erased value.

`Option<T>` and `Box<T>` play the role of pointers: helpers look through them,
`None` is a nil value.

# Examples
```
use introspect::{embed_field_value, set_embed_field, TypeInfo};

#[derive(TypeInfo, Debug, Default)]
struct Town {
    pub int: i64,
}

#[derive(TypeInfo, Debug, Default)]
struct City {
    pub ptr_town: Option<Box<Town>>,
}

# fn main() -> Result<(), introspect::Error> {
let mut city = City::default();
set_embed_field(&mut city, "ptr_town.int", 10u8)?;
assert_eq!(embed_field_value::<i64>(&city, "ptr_town.int")?, &10);
# Ok(())
# }
```
*/

pub use ::introspect_core::*;

/// Derive-able implementation of [`TypeInfo`] and [`TypeInfoDynamic`]
///
/// Accepts both enum's and struct's, without generic parameters
///
/// *Note*: That if any field type is compound (non-primitive), then you
/// must derive [`TypeInfo`] for those types too
///
/// Attributes:
/// - `#[introspect(implements(Trait, ..))]` on the type records traits for [`implements`]
/// - `#[introspect(flatten)]` on a field promotes its fields to the outer struct
/// - `#[introspect(tag(key = "value", ..))]` on a field attaches tags
pub use introspect_macros::TypeInfo;

/// Makes methods of an inherent impl block callable by name, see [`Methods`]
///
/// Public methods taking `&self` or `&mut self` with owned parameters and return
/// value are registered, parameter types must implement [`TypeInfo`]. `#[introspect(skip)]` leaves a method out,
/// `#[introspect(variadic)]` turns the trailing `Vec<T>` parameter into a variadic one.
/// Methods returning `Result` fail the call with their error
pub use introspect_macros::methods;
