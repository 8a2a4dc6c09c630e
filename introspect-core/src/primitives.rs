//! [`TypeInfo`] for fundamental rust types and std containers

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Debug, Display};
use std::hash::Hash;

use paste::paste;

use crate::convert::{assign_char, assign_exact, assign_number, assign_string};
use crate::{
    type_info, zeroed_dyn, AssignError, Data, FieldAccessError, FieldId, Kind, Pointee, PointeeMut,
    RuntimeConstructError, TraitInfo, Type, TypeInfo, TypeInfoDynamic,
};

const PRIMITIVE_TRAITS: &[TraitInfo] = &[
    TraitInfo {
        name: "Debug",
        type_id: TypeId::of::<dyn Debug>,
    },
    TraitInfo {
        name: "Display",
        type_id: TypeId::of::<dyn Display>,
    },
];

macro_rules! any_methods {
    () => {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }
    };
}

// everything that is not a struct: no fields, no reflective constructors
macro_rules! opaque_methods {
    ($ctor_err:ident) => {
        fn construct_struct(&self, _args: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, RuntimeConstructError> {
            Err(RuntimeConstructError::$ctor_err)
        }

        fn construct_enum(
            &self,
            _variant: &str,
            _args: Vec<Box<dyn Any>>,
        ) -> Result<Box<dyn Any>, RuntimeConstructError> {
            Err(RuntimeConstructError::$ctor_err)
        }

        fn field(&self, _id: FieldId<'_>) -> Result<&dyn TypeInfoDynamic, FieldAccessError> {
            Err(FieldAccessError::Unit)
        }

        fn field_mut(&mut self, _id: FieldId<'_>) -> Result<&mut dyn TypeInfoDynamic, FieldAccessError> {
            Err(FieldAccessError::Unit)
        }
    };
}

macro_rules! not_pointer {
    () => {
        fn pointee(&self) -> Pointee<'_> {
            Pointee::NotPointer
        }

        fn pointee_mut(&mut self, _allocate: bool) -> PointeeMut<'_> {
            PointeeMut::NotPointer
        }
    };
}

macro_rules! impl_primitive {
    ($name:ident, $kind:ident, $zero:expr, $assign:ident) => {
        paste! {
            const [<$name:upper _INFO>]: Type = Type {
                ident: std::stringify!($name),
                module: "",
                kind: Kind::$kind,
                data: Data::Primitive,
                traits: PRIMITIVE_TRAITS,
                type_id: TypeId::of::<$name>,
                type_name: std::any::type_name::<$name>,
                zeroed: zeroed_dyn::<$name>,
            };

            #[automatically_derived]
            impl TypeInfoDynamic for $name {
                fn get_dynamic(&self) -> &'static Type {
                    &[<$name:upper _INFO>]
                }

                any_methods!();
                opaque_methods!(Primitive);
                not_pointer!();

                fn assign(&mut self, value: Box<dyn Any>) -> Result<(), AssignError> {
                    $assign(self, value)
                }
            }

            #[automatically_derived]
            impl TypeInfo for $name {
                const INFO: &'static Type = &[<$name:upper _INFO>];

                fn zeroed() -> Self {
                    $zero
                }
            }
        }
    };
}

impl_primitive!(bool, Bool, false, assign_exact);
impl_primitive!(char, Char, '\0', assign_char);

impl_primitive!(u8, U8, 0, assign_number);
impl_primitive!(u16, U16, 0, assign_number);
impl_primitive!(u32, U32, 0, assign_number);
impl_primitive!(u64, U64, 0, assign_number);
impl_primitive!(u128, U128, 0, assign_number);

impl_primitive!(i8, I8, 0, assign_number);
impl_primitive!(i16, I16, 0, assign_number);
impl_primitive!(i32, I32, 0, assign_number);
impl_primitive!(i64, I64, 0, assign_number);
impl_primitive!(i128, I128, 0, assign_number);

impl_primitive!(usize, Usize, 0, assign_number);
impl_primitive!(isize, Isize, 0, assign_number);

impl_primitive!(f32, F32, 0.0, assign_number);
impl_primitive!(f64, F64, 0.0, assign_number);

impl_primitive!(String, String, String::new(), assign_string);

const UNIT_INFO: Type = Type {
    ident: "()",
    module: "",
    kind: Kind::Unit,
    data: Data::Unit,
    traits: &[TraitInfo {
        name: "Debug",
        type_id: TypeId::of::<dyn Debug>,
    }],
    type_id: TypeId::of::<()>,
    type_name: std::any::type_name::<()>,
    zeroed: zeroed_dyn::<()>,
};

#[automatically_derived]
impl TypeInfoDynamic for () {
    fn get_dynamic(&self) -> &'static Type {
        &UNIT_INFO
    }

    any_methods!();
    opaque_methods!(Primitive);
    not_pointer!();

    fn assign(&mut self, value: Box<dyn Any>) -> Result<(), AssignError> {
        assign_exact(self, value)
    }
}

#[automatically_derived]
impl TypeInfo for () {
    const INFO: &'static Type = &UNIT_INFO;

    fn zeroed() -> Self {}
}

impl<T: TypeInfo> TypeInfoDynamic for Option<T> {
    fn get_dynamic(&self) -> &'static Type {
        <Self as TypeInfo>::INFO
    }

    any_methods!();
    opaque_methods!(NotStruct);

    fn pointee(&self) -> Pointee<'_> {
        match self {
            Some(value) => Pointee::Value(value),
            None => Pointee::Nil,
        }
    }

    fn pointee_mut(&mut self, allocate: bool) -> PointeeMut<'_> {
        if allocate && self.is_none() {
            tracing::trace!(ty = std::any::type_name::<T>(), "allocating zero value for nil pointer");
            *self = Some(T::zeroed());
        }

        match self {
            Some(value) => PointeeMut::Value(value),
            None => PointeeMut::Nil,
        }
    }

    /// Accepts `Option<T>` or anything `T` accepts
    fn assign(&mut self, value: Box<dyn Any>) -> Result<(), AssignError> {
        let value = match value.downcast::<Self>() {
            Ok(value) => {
                *self = *value;
                return Ok(());
            }
            Err(value) => value,
        };

        match self {
            Some(inner) => inner.assign(value),
            None => {
                let mut inner = T::zeroed();
                inner.assign(value)?;
                *self = Some(inner);
                Ok(())
            }
        }
    }
}

impl<T: TypeInfo> TypeInfo for Option<T> {
    const INFO: &'static Type = &Type {
        ident: "Option",
        module: "",
        kind: Kind::Option,
        data: Data::Pointer(type_info::<T>),
        traits: &[],
        type_id: TypeId::of::<Self>,
        type_name: std::any::type_name::<Self>,
        zeroed: zeroed_dyn::<Self>,
    };

    fn zeroed() -> Self {
        None
    }
}

impl<T: TypeInfo> TypeInfoDynamic for Box<T> {
    fn get_dynamic(&self) -> &'static Type {
        <Self as TypeInfo>::INFO
    }

    any_methods!();
    opaque_methods!(NotStruct);

    fn pointee(&self) -> Pointee<'_> {
        Pointee::Value(&**self)
    }

    fn pointee_mut(&mut self, _allocate: bool) -> PointeeMut<'_> {
        PointeeMut::Value(&mut **self)
    }

    fn assign(&mut self, value: Box<dyn Any>) -> Result<(), AssignError> {
        match value.downcast::<Self>() {
            Ok(value) => {
                *self = *value;
                Ok(())
            }
            Err(value) => (**self).assign(value),
        }
    }
}

impl<T: TypeInfo> TypeInfo for Box<T> {
    const INFO: &'static Type = &Type {
        ident: "Box",
        module: "",
        kind: Kind::Box,
        data: Data::Pointer(type_info::<T>),
        traits: &[],
        type_id: TypeId::of::<Self>,
        type_name: std::any::type_name::<Self>,
        zeroed: zeroed_dyn::<Self>,
    };

    fn zeroed() -> Self {
        Box::new(T::zeroed())
    }
}

impl<T: TypeInfo> TypeInfoDynamic for Vec<T> {
    fn get_dynamic(&self) -> &'static Type {
        <Self as TypeInfo>::INFO
    }

    any_methods!();
    opaque_methods!(NotStruct);
    not_pointer!();

    fn assign(&mut self, value: Box<dyn Any>) -> Result<(), AssignError> {
        assign_exact(self, value)
    }
}

impl<T: TypeInfo> TypeInfo for Vec<T> {
    const INFO: &'static Type = &Type {
        ident: "Vec",
        module: "",
        kind: Kind::Vec,
        data: Data::Sequence(type_info::<T>),
        traits: &[],
        type_id: TypeId::of::<Self>,
        type_name: std::any::type_name::<Self>,
        zeroed: zeroed_dyn::<Self>,
    };

    fn zeroed() -> Self {
        Vec::new()
    }
}

impl<T: TypeInfo, const N: usize> TypeInfoDynamic for [T; N] {
    fn get_dynamic(&self) -> &'static Type {
        <Self as TypeInfo>::INFO
    }

    any_methods!();
    opaque_methods!(NotStruct);
    not_pointer!();

    fn assign(&mut self, value: Box<dyn Any>) -> Result<(), AssignError> {
        assign_exact(self, value)
    }
}

impl<T: TypeInfo, const N: usize> TypeInfo for [T; N] {
    const INFO: &'static Type = &Type {
        ident: "Array",
        module: "",
        kind: Kind::Array,
        data: Data::Array {
            elem: type_info::<T>,
            len: N,
        },
        traits: &[],
        type_id: TypeId::of::<Self>,
        type_name: std::any::type_name::<Self>,
        zeroed: zeroed_dyn::<Self>,
    };

    fn zeroed() -> Self {
        std::array::from_fn(|_| T::zeroed())
    }
}

impl<K: TypeInfo + Eq + Hash, V: TypeInfo> TypeInfoDynamic for HashMap<K, V> {
    fn get_dynamic(&self) -> &'static Type {
        <Self as TypeInfo>::INFO
    }

    any_methods!();
    opaque_methods!(NotStruct);
    not_pointer!();

    fn assign(&mut self, value: Box<dyn Any>) -> Result<(), AssignError> {
        assign_exact(self, value)
    }
}

impl<K: TypeInfo + Eq + Hash, V: TypeInfo> TypeInfo for HashMap<K, V> {
    const INFO: &'static Type = &Type {
        ident: "HashMap",
        module: "",
        kind: Kind::Map,
        data: Data::Map {
            key: type_info::<K>,
            value: type_info::<V>,
        },
        traits: &[],
        type_id: TypeId::of::<Self>,
        type_name: std::any::type_name::<Self>,
        zeroed: zeroed_dyn::<Self>,
    };

    fn zeroed() -> Self {
        HashMap::new()
    }
}

impl<K: TypeInfo + Ord, V: TypeInfo> TypeInfoDynamic for BTreeMap<K, V> {
    fn get_dynamic(&self) -> &'static Type {
        <Self as TypeInfo>::INFO
    }

    any_methods!();
    opaque_methods!(NotStruct);
    not_pointer!();

    fn assign(&mut self, value: Box<dyn Any>) -> Result<(), AssignError> {
        assign_exact(self, value)
    }
}

impl<K: TypeInfo + Ord, V: TypeInfo> TypeInfo for BTreeMap<K, V> {
    const INFO: &'static Type = &Type {
        ident: "BTreeMap",
        module: "",
        kind: Kind::Map,
        data: Data::Map {
            key: type_info::<K>,
            value: type_info::<V>,
        },
        traits: &[],
        type_id: TypeId::of::<Self>,
        type_name: std::any::type_name::<Self>,
        zeroed: zeroed_dyn::<Self>,
    };

    fn zeroed() -> Self {
        BTreeMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_info() {
        assert_eq!(u32::INFO.ident, "u32");
        assert_eq!(u32::INFO.kind, Kind::U32);
        assert_eq!(String::INFO.kind, Kind::String);
        assert!(i64::INFO.implements(TypeId::of::<dyn Display>()));
    }

    #[test]
    fn pointer_descriptors_penetrate() {
        let ty = <Option<Box<i32>> as TypeInfo>::INFO;
        assert_eq!(ty.kind, Kind::Option);
        assert_eq!(ty.elem().map(|elem| elem.kind), Some(Kind::Box));
        assert_eq!(ty.penetrate(), i32::INFO);
    }

    #[test]
    fn option_allocates_on_demand() {
        let mut value: Option<u8> = None;
        assert!(matches!(value.pointee_mut(false), PointeeMut::Nil));
        assert!(matches!(value.pointee_mut(true), PointeeMut::Value(_)));
        assert_eq!(value, Some(0));
    }

    #[test]
    fn option_assign_wraps_and_converts() {
        let mut value: Option<i64> = None;
        value.assign(Box::new(5u8)).unwrap();
        assert_eq!(value, Some(5));
        value.assign(Box::new(None::<i64>)).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn array_zeroed() {
        assert_eq!(<[String; 2]>::zeroed(), [String::new(), String::new()]);
        assert_eq!(<[u8; 3] as TypeInfo>::INFO.kind, Kind::Array);
    }
}
