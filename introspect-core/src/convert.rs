//! Conversions performed by [`crate::TypeInfoDynamic::assign`]
//!
//! Integers convert only when the value fits, floats accept every number.

use std::any::Any;

use crate::AssignError;

/// Any primitive number, widened
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Signed(i128),
    Unsigned(u128),
    Float(f64),
}

macro_rules! probe_number {
    ($value:expr, $variant:ident as $wide:ty; $($source:ty),*) => {
        $(
            if let Some(v) = $value.downcast_ref::<$source>() {
                return Some(Number::$variant(*v as $wide));
            }
        )*
    };
}

impl Number {
    /// Reads number out of erased value if it is one of primitive numeric types
    pub fn of(value: &dyn Any) -> Option<Number> {
        probe_number!(value, Signed as i128; i8, i16, i32, i64, i128, isize);
        probe_number!(value, Unsigned as u128; u8, u16, u32, u64, u128, usize);
        probe_number!(value, Float as f64; f32, f64);
        None
    }
}

/// Primitive number that can be built out of [`Number`]
pub trait FromNumber: Sized {
    /// `Err` carries `true` when number is of valid kind but out of range
    fn from_number(number: Number) -> Result<Self, bool>;
}

macro_rules! impl_from_number_int {
    ($($target:ty),*) => {
        $(
            impl FromNumber for $target {
                fn from_number(number: Number) -> Result<Self, bool> {
                    match number {
                        Number::Signed(v) => <$target>::try_from(v).map_err(|_| true),
                        Number::Unsigned(v) => <$target>::try_from(v).map_err(|_| true),
                        Number::Float(_) => Err(false),
                    }
                }
            }
        )*
    };
}

macro_rules! impl_from_number_float {
    ($($target:ty),*) => {
        $(
            impl FromNumber for $target {
                fn from_number(number: Number) -> Result<Self, bool> {
                    Ok(match number {
                        Number::Signed(v) => v as $target,
                        Number::Unsigned(v) => v as $target,
                        Number::Float(v) => v as $target,
                    })
                }
            }
        )*
    };
}

impl_from_number_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_from_number_float!(f32, f64);

/// Accepts only value of exactly the same type
pub fn assign_exact<T: Any>(target: &mut T, value: Box<dyn Any>) -> Result<(), AssignError> {
    let value = value.downcast::<T>().map_err(|_| AssignError::Mismatch {
        expected: std::any::type_name::<T>(),
    })?;
    *target = *value;
    Ok(())
}

pub fn assign_number<T: Any + FromNumber>(target: &mut T, value: Box<dyn Any>) -> Result<(), AssignError> {
    let value = match value.downcast::<T>() {
        Ok(value) => {
            *target = *value;
            return Ok(());
        }
        Err(value) => value,
    };

    let expected = std::any::type_name::<T>();
    let number = Number::of(&*value).ok_or(AssignError::Mismatch { expected })?;
    *target = T::from_number(number).map_err(|out_of_range| match out_of_range {
        true => AssignError::OutOfRange { expected },
        false => AssignError::Mismatch { expected },
    })?;
    Ok(())
}

pub fn assign_string(target: &mut String, value: Box<dyn Any>) -> Result<(), AssignError> {
    let value = match value.downcast::<String>() {
        Ok(value) => {
            *target = *value;
            return Ok(());
        }
        Err(value) => value,
    };

    if let Some(s) = value.downcast_ref::<&'static str>() {
        *target = (*s).to_owned();
    } else if let Some(c) = value.downcast_ref::<char>() {
        *target = c.to_string();
    } else if let Some(s) = value.downcast_ref::<Box<str>>() {
        *target = s.to_string();
    } else {
        return Err(AssignError::Mismatch { expected: "alloc::string::String" });
    }
    Ok(())
}

pub fn assign_char(target: &mut char, value: Box<dyn Any>) -> Result<(), AssignError> {
    if let Some(c) = value.downcast_ref::<char>() {
        *target = *c;
    } else if let Some(b) = value.downcast_ref::<u8>() {
        *target = char::from(*b);
    } else {
        return Err(AssignError::Mismatch { expected: "char" });
    }
    Ok(())
}
