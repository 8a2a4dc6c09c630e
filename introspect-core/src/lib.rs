#![deny(missing_docs)]
#![allow(missing_docs)]

//! Core descriptors, traits and helper functions of `introspect`
//!
//! Everything here is re-exported from the `introspect` facade crate, which is
//! what generated code refers to.

use std::any::{Any, TypeId};

mod convert;
mod error;
mod func;
mod get_field;
mod path;
mod primitives;
mod set_field;
mod struct_field;
mod value;

pub use error::*;
pub use func::*;
pub use get_field::*;
pub use set_field::*;
pub use struct_field::*;
pub use value::*;

#[doc(hidden)]
pub use convert::{assign_exact, assign_number, assign_string, FromNumber};

/// Coarse classification of a reflected type
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Kind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    String,
    /// The `()` type
    Unit,
    /// Named, tuple or unit struct
    Struct,
    Enum,
    /// Nullable pointer, `None` is nil
    Option,
    /// Owning pointer, never nil
    Box,
    Vec,
    Array,
    Map,
}

impl Kind {
    /// `Option` and `Box` are dereferenced by path walking
    pub fn is_pointer(self) -> bool {
        matches!(self, Kind::Option | Kind::Box)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Char => "char",
            Kind::I8 => "i8",
            Kind::I16 => "i16",
            Kind::I32 => "i32",
            Kind::I64 => "i64",
            Kind::I128 => "i128",
            Kind::Isize => "isize",
            Kind::U8 => "u8",
            Kind::U16 => "u16",
            Kind::U32 => "u32",
            Kind::U64 => "u64",
            Kind::U128 => "u128",
            Kind::Usize => "usize",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::String => "string",
            Kind::Unit => "unit",
            Kind::Struct => "struct",
            Kind::Enum => "enum",
            Kind::Option => "option",
            Kind::Box => "box",
            Kind::Vec => "vec",
            Kind::Array => "array",
            Kind::Map => "map",
        };
        f.write_str(name)
    }
}

/// Lazily resolved type descriptor
///
/// Descriptors refer to each other through function pointers, so a struct can
/// hold an `Option<Box<Self>>` without a cycle in constant evaluation
pub type TypeRef = fn() -> &'static Type;

/// Returns [`TypeInfo::INFO`] of `T`, usable as [`TypeRef`]
pub fn type_info<T: TypeInfo>() -> &'static Type {
    T::INFO
}

/// Information about type fields (if there is any)
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Fields {
    /// Type is structure-like and has fields with names
    Named(&'static [Field]),

    /// Type is tuple-like and has fields that can be referred by their index (just like you would be accessing plain tuple)
    Indexed(&'static [Field]),

    /// Type is unit and doesn't have any fields
    Unit,
}

impl Fields {
    pub fn as_slice(&self) -> &'static [Field] {
        match self {
            Fields::Named(fields) | Fields::Indexed(fields) => *fields,
            Fields::Unit => &[],
        }
    }

    /// Finds field by its id
    ///
    /// [`FieldId::Index`] addresses the n-th field in both named and tuple-like types
    pub fn find(&self, id: &FieldId<'_>) -> Option<(usize, &'static Field)> {
        let fields = self.as_slice();
        match id {
            FieldId::Index(index) => fields.get(*index).map(|field| (*index, field)),
            FieldId::Named(name) => fields
                .iter()
                .enumerate()
                .find(|(_, field)| field.name() == Some(*name)),
        }
    }
}

/// Information about data contained within type
///
/// [`Data::Primitive`] is special case for fundamental rust types.
#[derive(Clone, Debug)]
pub enum Data {
    /// Fundamental type, which doesn't have any fields. You **can't** define types with this kind of data
    Primitive,
    /// Struct-like, can be tuple struct or default struct
    Struct(Fields),

    /// Variants of this enum
    Enum(Variants),

    /// The `()` type
    Unit,

    /// `Option<T>` or `Box<T>`, see [`Type::kind`] to tell them apart
    Pointer(TypeRef),

    /// Growable sequence of elements
    Sequence(TypeRef),

    /// Fixed size array
    Array { elem: TypeRef, len: usize },

    /// Key-value map
    Map { key: TypeRef, value: TypeRef },
}

/// Discriminant of particular field
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FieldId<'a> {
    /// Index of field, position in definition order
    Index(usize),
    /// Name of target field
    Named(&'a str),
}

impl<'a> From<&'a str> for FieldId<'a> {
    fn from(s: &'a str) -> Self {
        FieldId::Named(s)
    }
}

impl From<usize> for FieldId<'_> {
    fn from(i: usize) -> Self {
        FieldId::Index(i)
    }
}

impl<'a> FieldId<'a> {
    /// Interprets one segment of a dotted path
    ///
    /// Numeric segments address tuple fields
    pub fn parse(segment: &'a str) -> Self {
        match segment.parse::<usize>() {
            Ok(index) => FieldId::Index(index),
            Err(_) => FieldId::Named(segment),
        }
    }
}

impl std::fmt::Display for FieldId<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldId::Index(index) => write!(f, "{index}"),
            FieldId::Named(name) => f.write_str(name),
        }
    }
}

/// Key-value metadata attached to a field with `#[introspect(tag(key = "value"))]`
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Tag {
    pub key: &'static str,
    pub value: &'static str,
}

/// Field of type
///
/// Single structure for fields of tuple-like types and fields of structures
#[derive(Clone)]
pub struct Field {
    /// Identifier of field inside related type
    ///
    /// Acts as path in filesystem
    pub id: FieldId<'static>,
    /// Associated info of field's type
    pub ty: TypeRef,
    /// Field is declared `pub`
    pub public: bool,
    /// Fields of this field are promoted into the parent, see [`Type::lookup`]
    pub flatten: bool,
    pub tags: &'static [Tag],
}

impl Field {
    pub fn ty(&self) -> &'static Type {
        (self.ty)()
    }

    pub fn kind(&self) -> Kind {
        self.ty().kind
    }

    /// `None` for fields of tuple-like types
    pub fn name(&self) -> Option<&'static str> {
        match self.id {
            FieldId::Named(name) => Some(name),
            FieldId::Index(_) => None,
        }
    }

    /// Value of tag with `key`, if field carries one
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value)
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.public == other.public
            && self.flatten == other.flatten
            && self.tags == other.tags
            && self.ty() == other.ty()
    }
}

impl Eq for Field {}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("id", &self.id)
            .field("ty", &self.ty().name())
            .field("public", &self.public)
            .field("flatten", &self.flatten)
            .field("tags", &self.tags)
            .finish()
    }
}

/// Variant of enum type
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Variant {
    pub ident: &'static str,
    pub fields: Fields,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Variants {
    pub variants: &'static [Variant],
}

/// Trait that a type declared with `#[introspect(implements(..))]`
#[derive(Clone, Copy)]
pub struct TraitInfo {
    pub name: &'static str,
    /// [`TypeId`] of `dyn Trait`
    pub type_id: fn() -> TypeId,
}

impl std::fmt::Debug for TraitInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Information about type
///
/// if [`TypeInfo`] is implemented, comes as associated constant
///
/// Two descriptors are equal when they describe the same [`TypeId`]
#[derive(Clone)]
pub struct Type {
    /// Type name, exactly as in code (case and underscores are preserved)
    pub ident: &'static str,
    /// Module the type was defined in, empty for std types
    pub module: &'static str,
    pub kind: Kind,
    /// Type of data that this type contains
    pub data: Data,
    pub traits: &'static [TraitInfo],
    pub type_id: fn() -> TypeId,
    /// Full name, as [`std::any::type_name`] reports it
    pub type_name: fn() -> &'static str,
    /// Constructs zero value of this type
    pub zeroed: fn() -> Box<dyn TypeInfoDynamic>,
}

impl Type {
    pub fn id(&self) -> TypeId {
        (self.type_id)()
    }

    pub fn name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Zero value of this type, see [`TypeInfo::zeroed`]
    pub fn new_instance(&self) -> Box<dyn TypeInfoDynamic> {
        (self.zeroed)()
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.data, Data::Struct(_))
    }

    /// Fields of a struct, `None` if type is not a struct
    pub fn fields(&self) -> Option<&'static [Field]> {
        match &self.data {
            Data::Struct(fields) => Some(fields.as_slice()),
            _ => None,
        }
    }

    /// Pointed-to type of `Option`/`Box`, element type of sequences and arrays,
    /// value type of maps
    pub fn elem(&self) -> Option<&'static Type> {
        match &self.data {
            Data::Pointer(elem) | Data::Sequence(elem) | Data::Array { elem, .. } => Some(elem()),
            Data::Map { value, .. } => Some(value()),
            _ => None,
        }
    }

    /// Strips every pointer layer: `Option<Box<T>>` becomes `T`
    pub fn penetrate(&'static self) -> &'static Type {
        let mut ty = self;
        while let Data::Pointer(elem) = &ty.data {
            ty = elem();
        }
        ty
    }

    /// Finds field by name, including fields promoted from flattened fields
    ///
    /// Returns indices to follow from this type down to the field
    pub fn lookup(&'static self, name: &str) -> Option<(Vec<usize>, &'static Field)> {
        path::lookup(self, name)
    }

    /// Whether type declared `dyn Trait` (given as its [`TypeId`]) as implemented
    pub fn implements(&self, trait_id: TypeId) -> bool {
        self.traits.iter().any(|info| (info.type_id)() == trait_id)
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Type {}

impl std::fmt::Debug for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Type")
            .field("ident", &self.ident)
            .field("module", &self.module)
            .field("kind", &self.kind)
            .field("data", &self.data)
            .field("traits", &self.traits)
            .finish()
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of dereferencing pointer-like value with [`TypeInfoDynamic::pointee`]
pub enum Pointee<'a> {
    /// Value is not `Option`/`Box`
    NotPointer,
    /// `None`
    Nil,
    Value(&'a dyn TypeInfoDynamic),
}

/// Mutable counterpart of [`Pointee`]
pub enum PointeeMut<'a> {
    NotPointer,
    Nil,
    Value(&'a mut dyn TypeInfoDynamic),
}

/// Object-safe version of [`TypeInfo`]
///
/// Additionally provides ability to construct type (if it's not a enum without variants),
/// ability to borrow (both immutably and mutably) fields and to assign new value
pub trait TypeInfoDynamic: Any {
    /// Get [`Type`] information for this type
    ///
    /// Because it accepts reference to self, it can be called on [`dyn`] trait-objects
    fn get_dynamic(&self) -> &'static Type;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Constructs this type if it is a struct
    ///
    /// Attempts to downcast passed arguments to type of fields.
    /// Multiple fields can be of same type, just make sure that order is preserved or you might get unexpected results
    ///
    /// If called on enum type, [`RuntimeConstructError::NotStruct`] will be returned
    ///
    /// **Note**: Arguments must be passed in same order as definition order of fields inside struct
    fn construct_struct(&self, args: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, RuntimeConstructError>;

    /// Constructs `Self` if it is enum
    ///
    /// Attempts to downcast passed arguments as type of fields of requested variant, if there are any.
    /// List of required arguments is target variant-dependent, as well as their order
    ///
    /// If variant is unit, no arguments will be required aside from `variant`
    fn construct_enum(
        &self,
        variant: &str,
        args: Vec<Box<dyn Any>>,
    ) -> Result<Box<dyn Any>, RuntimeConstructError>;

    /// Borrow immutably field inside this type
    ///
    /// Type must not be a unit and `id` must be valid in terms of this type (present).
    /// For enums, fields of the active variant are addressed
    fn field(&self, id: FieldId<'_>) -> Result<&dyn TypeInfoDynamic, FieldAccessError>;

    /// Borrow mutably field inside this type
    ///
    /// Same as [`TypeInfoDynamic::field`], except that returned reference is mutable
    fn field_mut(&mut self, id: FieldId<'_>) -> Result<&mut dyn TypeInfoDynamic, FieldAccessError>;

    /// Dereferences `Option`/`Box`
    fn pointee(&self) -> Pointee<'_>;

    /// Dereferences `Option`/`Box` mutably
    ///
    /// With `allocate`, `None` is first replaced with `Some` of the zero value
    fn pointee_mut(&mut self, allocate: bool) -> PointeeMut<'_>;

    /// Replaces this value with `value`, converting it when types are compatible
    fn assign(&mut self, value: Box<dyn Any>) -> Result<(), AssignError>;

    /// Name of the active variant, `None` for non-enums
    fn variant(&self) -> Option<&'static str> {
        None
    }

    /// Zero value of the same type, boxed
    fn zeroed_dyn(&self) -> Box<dyn TypeInfoDynamic> {
        self.get_dynamic().new_instance()
    }
}

impl<'a> dyn TypeInfoDynamic + 'a {
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Attempts to downcast to immutable reference of particular type
    ///
    /// If `T` doesn't match actual type, [`Option::None`] will be returned
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Attempts to downcast to mutable reference of particular type
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl<'a> std::fmt::Debug for dyn TypeInfoDynamic + 'a {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dyn TypeInfoDynamic<{}>", self.get_dynamic().name())
    }
}

/// Static-type version of [`TypeInfoDynamic`]
pub trait TypeInfo: TypeInfoDynamic + Sized {
    const INFO: &'static Type;

    /// Zero value: numbers are `0`, strings and collections are empty,
    /// `Option` is `None`, structs have every field zeroed and enums take
    /// their first variant
    fn zeroed() -> Self;
}

/// Boxed zero value of `T`, usable as [`Type::zeroed`]
pub fn zeroed_dyn<T: TypeInfo>() -> Box<dyn TypeInfoDynamic> {
    Box::new(T::zeroed())
}

mod __object_safety_check {
    use super::TypeInfoDynamic;

    #[allow(dead_code)]
    fn __check_is_object_safe() -> Box<dyn TypeInfoDynamic> {
        Box::new(100u32)
    }
}
