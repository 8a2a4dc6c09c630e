//! Calling functions and methods with type-erased arguments

use std::any::{Any, TypeId};

use paste::paste;

use crate::{BoxError, CallError, Error, TypeInfo};

/// Values returned by a dynamic call
///
/// Functions returning `()` produce no values, other functions produce exactly one
pub type CallResult = Result<Vec<Box<dyn Any>>, CallError>;

/// Nil argument of a dynamic call, the parameter receives its zero value
///
/// ```
/// use introspect_core::{Function, Nil};
///
/// let or_zero = Function::new(|value: Option<i64>| value.unwrap_or(0));
/// let ret = or_zero.call(vec![Box::new(Nil)]).unwrap();
/// assert_eq!(ret[0].downcast_ref::<i64>(), Some(&0));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Nil;

/// Cursor over type-erased arguments of a call
///
/// Arguments are consumed in order and downcast to the parameter type,
/// [`Nil`] becomes the zero value of the parameter. In slice mode the trailing variadic argument is expected as a `Vec` already
pub struct Args {
    values: std::vec::IntoIter<Box<dyn Any>>,
    position: usize,
    total: usize,
    spread: bool,
}

impl Args {
    /// Arguments of a regular call, trailing ones are collected into the variadic parameter
    pub fn new(values: Vec<Box<dyn Any>>) -> Self {
        Self {
            total: values.len(),
            values: values.into_iter(),
            position: 0,
            spread: true,
        }
    }

    /// Arguments of a slice call, last one is the variadic parameter as `Vec`
    pub fn slice(values: Vec<Box<dyn Any>>) -> Self {
        Self {
            spread: false,
            ..Self::new(values)
        }
    }

    /// Number of arguments not consumed yet
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    /// Verifies argument count against a signature with `fixed` parameters
    /// plus a variadic one if `variadic` is set
    pub fn check(&self, fixed: usize, variadic: bool) -> Result<(), CallError> {
        let got = self.total;
        match (variadic, self.spread) {
            (false, true) if got != fixed => Err(CallError::ArgCount { expected: fixed, got }),
            (true, true) if got < fixed => Err(CallError::ArgCountAtLeast { expected: fixed, got }),
            (false, false) => Err(CallError::NotVariadic),
            (true, false) if got != fixed + 1 => Err(CallError::SliceArgCount {
                expected: fixed + 1,
                got,
            }),
            _ => Ok(()),
        }
    }

    /// Takes next argument as `T`, zero value of `T` for [`Nil`]
    pub fn next<T: TypeInfo>(&mut self) -> Result<T, CallError> {
        let index = self.position;
        let value = self.values.next().ok_or(CallError::ArgCount {
            expected: index + 1,
            got: self.total,
        })?;
        self.position += 1;

        if (*value).is::<Nil>() {
            tracing::trace!(index, ty = std::any::type_name::<T>(), "zero value for nil argument");
            return Ok(T::zeroed());
        }

        value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| CallError::UnexpectedType {
                index,
                expected: std::any::type_name::<T>(),
            })
    }

    /// Takes the variadic parameter: every remaining argument as `T` in regular
    /// mode, a single `Vec<T>` in slice mode
    pub fn variadic<T: TypeInfo>(&mut self) -> Result<Vec<T>, CallError> {
        if !self.spread {
            return self.next::<Vec<T>>();
        }

        let mut rest = Vec::with_capacity(self.len());
        while !self.is_empty() {
            rest.push(self.next::<T>()?);
        }
        Ok(rest)
    }
}

#[doc(hidden)]
pub fn into_returns<R: Any>(value: R) -> Vec<Box<dyn Any>> {
    if TypeId::of::<R>() == TypeId::of::<()>() {
        return Vec::new();
    }
    vec![Box::new(value)]
}

#[doc(hidden)]
pub fn into_fallible_returns<R: Any, E: Into<BoxError>>(result: Result<R, E>) -> CallResult {
    result
        .map(into_returns)
        .map_err(|err| CallError::Returned(err.into()))
}

type Invoke = Box<dyn Fn(&mut Args) -> CallResult>;

/// Type-erased function
///
/// ```
/// use introspect_core::Function;
///
/// let add = Function::new(|a: i32, b: i32| a + b);
/// let ret = add.call(vec![Box::new(1i32), Box::new(2i32)]).unwrap();
/// assert_eq!(ret[0].downcast_ref::<i32>(), Some(&3));
///
/// let err = add.call(vec![Box::new(1i32)]).unwrap_err();
/// assert_eq!(err.to_string(), "fn params num is 2, but got 1");
/// ```
pub struct Function {
    params: Vec<&'static str>,
    variadic: Option<&'static str>,
    returns: &'static str,
    invoke: Invoke,
}

impl Function {
    /// Wraps closure or fn taking up to six owned arguments of reflected types
    pub fn new<M, F: IntoFunction<M>>(f: F) -> Self {
        f.into_function()
    }

    /// Wraps closure returning `Result`, `Err` fails the call with [`CallError::Returned`]
    pub fn fallible<M, F: IntoFallibleFunction<M>>(f: F) -> Self {
        f.into_function()
    }

    /// Wraps closure whose last parameter is `Vec<V>`, collecting trailing arguments into it
    pub fn variadic<M, F: IntoVariadicFunction<M>>(f: F) -> Self {
        f.into_function()
    }

    /// Type names of fixed parameters
    pub fn params(&self) -> &[&'static str] {
        &self.params
    }

    /// Element type name of the variadic parameter
    pub fn variadic_param(&self) -> Option<&'static str> {
        self.variadic
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic.is_some()
    }

    /// Number of parameters, variadic one counts as one
    pub fn num_in(&self) -> usize {
        self.params.len() + usize::from(self.is_variadic())
    }

    pub fn returns(&self) -> &'static str {
        self.returns
    }

    /// Calls the function, trailing arguments of variadic function are packed into its `Vec`
    pub fn call(&self, args: Vec<Box<dyn Any>>) -> CallResult {
        self.invoke_with(Args::new(args))
    }

    /// Calls variadic function passing its `Vec` parameter as the last argument
    pub fn call_slice(&self, args: Vec<Box<dyn Any>>) -> CallResult {
        self.invoke_with(Args::slice(args))
    }

    fn invoke_with(&self, mut args: Args) -> CallResult {
        args.check(self.params.len(), self.is_variadic())?;
        tracing::trace!(params = ?self.params, variadic = ?self.variadic, "calling function");
        (self.invoke)(&mut args)
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("params", &self.params)
            .field("variadic", &self.variadic)
            .field("returns", &self.returns)
            .finish()
    }
}

/// Closure or fn that can become [`Function`] with [`Function::new`]
///
/// `Marker` only tells implementations of different arity apart
pub trait IntoFunction<Marker> {
    fn into_function(self) -> Function;
}

/// See [`Function::fallible`]
pub trait IntoFallibleFunction<Marker> {
    fn into_function(self) -> Function;
}

/// See [`Function::variadic`]
pub trait IntoVariadicFunction<Marker> {
    fn into_function(self) -> Function;
}

macro_rules! impl_into_function {
    ($($arg:ident),*) => {
        paste! {
            impl<F, R, $($arg,)*> IntoFunction<fn($($arg,)*) -> R> for F
            where
                F: Fn($($arg),*) -> R + 'static,
                R: Any,
                $($arg: TypeInfo,)*
            {
                #[allow(unused_variables)]
                fn into_function(self) -> Function {
                    Function {
                        params: vec![$(std::any::type_name::<$arg>()),*],
                        variadic: None,
                        returns: std::any::type_name::<R>(),
                        invoke: Box::new(move |args: &mut Args| {
                            $(let [<$arg:lower>] = args.next::<$arg>()?;)*
                            Ok(into_returns((self)($([<$arg:lower>]),*)))
                        }),
                    }
                }
            }

            impl<F, R, E, $($arg,)*> IntoFallibleFunction<fn($($arg,)*) -> Result<R, E>> for F
            where
                F: Fn($($arg),*) -> Result<R, E> + 'static,
                R: Any,
                E: Into<BoxError>,
                $($arg: TypeInfo,)*
            {
                #[allow(unused_variables)]
                fn into_function(self) -> Function {
                    Function {
                        params: vec![$(std::any::type_name::<$arg>()),*],
                        variadic: None,
                        returns: std::any::type_name::<R>(),
                        invoke: Box::new(move |args: &mut Args| {
                            $(let [<$arg:lower>] = args.next::<$arg>()?;)*
                            into_fallible_returns((self)($([<$arg:lower>]),*))
                        }),
                    }
                }
            }

            impl<F, R, V, $($arg,)*> IntoVariadicFunction<fn($($arg,)* Vec<V>) -> R> for F
            where
                F: Fn($($arg,)* Vec<V>) -> R + 'static,
                R: Any,
                V: TypeInfo,
                $($arg: TypeInfo,)*
            {
                fn into_function(self) -> Function {
                    Function {
                        params: vec![$(std::any::type_name::<$arg>()),*],
                        variadic: Some(std::any::type_name::<V>()),
                        returns: std::any::type_name::<R>(),
                        invoke: Box::new(move |args: &mut Args| {
                            $(let [<$arg:lower>] = args.next::<$arg>()?;)*
                            let rest = args.variadic::<V>()?;
                            Ok(into_returns((self)($([<$arg:lower>],)* rest)))
                        }),
                    }
                }
            }
        }
    };
}

impl_into_function!();
impl_into_function!(A0);
impl_into_function!(A0, A1);
impl_into_function!(A0, A1, A2);
impl_into_function!(A0, A1, A2, A3);
impl_into_function!(A0, A1, A2, A3, A4);
impl_into_function!(A0, A1, A2, A3, A4, A5);

/// How a registered method borrows its receiver
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Receiver {
    /// `&self`, callable through shared and mutable references
    Ref,
    /// `&mut self`, callable through mutable references only
    Mut,
}

/// Method registered with `#[introspect::methods]`
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MethodInfo {
    pub name: &'static str,
    pub receiver: Receiver,
    /// Parameter types as written, variadic one included
    pub params: &'static [&'static str],
    pub variadic: bool,
    /// Returns `Result`, `Err` fails the call
    pub fallible: bool,
}

/// Methods callable by name, implemented by `#[introspect::methods]` on an impl block
pub trait Methods {
    fn method_infos(&self) -> &'static [MethodInfo];

    /// Calls `&self` method `name`, `None` if there is no such method
    #[doc(hidden)]
    fn dispatch(&self, name: &str, args: &mut Args) -> Option<CallResult>;

    /// Calls `&self` or `&mut self` method `name`, `None` if there is no such method
    #[doc(hidden)]
    fn dispatch_mut(&mut self, name: &str, args: &mut Args) -> Option<CallResult>;
}

fn method_result(name: &str, result: Option<CallResult>) -> Result<Vec<Box<dyn Any>>, Error> {
    tracing::trace!(method = name, found = result.is_some(), "called method");
    Ok(result.ok_or_else(|| Error::MethodNotFound(name.to_owned()))??)
}

/// Calls `&self` method `name` of `obj`
///
/// `&mut self` methods are not visible through a shared reference, use [`call_method_mut`]
pub fn call_method(obj: &dyn Methods, name: &str, args: Vec<Box<dyn Any>>) -> Result<Vec<Box<dyn Any>>, Error> {
    method_result(name, obj.dispatch(name, &mut Args::new(args)))
}

/// Calls `&self` or `&mut self` method `name` of `obj`
pub fn call_method_mut(
    obj: &mut dyn Methods,
    name: &str,
    args: Vec<Box<dyn Any>>,
) -> Result<Vec<Box<dyn Any>>, Error> {
    method_result(name, obj.dispatch_mut(name, &mut Args::new(args)))
}

/// [`call_method`] with the variadic parameter passed as `Vec`
pub fn call_method_slice(
    obj: &dyn Methods,
    name: &str,
    args: Vec<Box<dyn Any>>,
) -> Result<Vec<Box<dyn Any>>, Error> {
    method_result(name, obj.dispatch(name, &mut Args::slice(args)))
}

/// [`call_method_mut`] with the variadic parameter passed as `Vec`
pub fn call_method_slice_mut(
    obj: &mut dyn Methods,
    name: &str,
    args: Vec<Box<dyn Any>>,
) -> Result<Vec<Box<dyn Any>>, Error> {
    method_result(name, obj.dispatch_mut(name, &mut Args::slice(args)))
}

/// Registered methods of `obj`
pub fn method_infos(obj: &dyn Methods) -> &'static [MethodInfo] {
    obj.method_infos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed<T: Any>(value: T) -> Box<dyn Any> {
        Box::new(value)
    }

    #[test]
    fn arity_checks() {
        let add = Function::new(|a: i64, b: i64| a + b);
        assert_eq!(add.num_in(), 2);
        assert!(matches!(
            add.call(vec![boxed(1i64), boxed(2i64), boxed(3i64)]),
            Err(CallError::ArgCount { expected: 2, got: 3 })
        ));
        assert!(matches!(add.call_slice(vec![]), Err(CallError::NotVariadic)));
    }

    #[test]
    fn unit_return_is_empty() {
        let noop = Function::new(|| ());
        assert!(noop.call(vec![]).unwrap().is_empty());
    }

    #[test]
    fn wrong_argument_type() {
        let neg = Function::new(|a: i32| -a);
        let err = neg.call(vec![boxed("1")]).unwrap_err();
        assert!(matches!(err, CallError::UnexpectedType { index: 0, expected: "i32" }));
    }

    #[test]
    fn fallible_error_is_returned() {
        let fail = Function::fallible(|_a: i32| -> Result<i32, String> { Err("add error".to_owned()) });
        let err = fail.call(vec![boxed(1i32)]).unwrap_err();
        assert_eq!(err.to_string(), "add error");
        assert!(err.returned().is_some());
    }

    #[test]
    fn variadic_spread_and_slice() {
        let sum = Function::variadic(|first: i32, rest: Vec<i32>| first + rest.iter().sum::<i32>());
        assert!(sum.is_variadic());

        let ret = sum.call(vec![boxed(1i32), boxed(2i32), boxed(3i32)]).unwrap();
        assert_eq!(ret[0].downcast_ref::<i32>(), Some(&6));

        let ret = sum.call(vec![boxed(1i32)]).unwrap();
        assert_eq!(ret[0].downcast_ref::<i32>(), Some(&1));

        let ret = sum.call_slice(vec![boxed(1i32), boxed(vec![2i32, 3])]).unwrap();
        assert_eq!(ret[0].downcast_ref::<i32>(), Some(&6));

        assert!(matches!(
            sum.call(vec![]),
            Err(CallError::ArgCountAtLeast { expected: 1, got: 0 })
        ));
        assert!(matches!(
            sum.call_slice(vec![boxed(1i32)]),
            Err(CallError::SliceArgCount { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn nil_becomes_zero_value() {
        let describe = Function::new(|name: String, age: Option<u8>| format!("{name}:{age:?}"));
        let ret = describe.call(vec![boxed(Nil), boxed(Nil)]).unwrap();
        assert_eq!(ret[0].downcast_ref::<String>().map(String::as_str), Some(":None"));
    }
}
