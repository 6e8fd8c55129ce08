use std::marker::PhantomData;

use crate::{Arguments, FromValue, IntoValue, Value};

/// A member function that can be registered as a method of `C`.
///
/// Implemented for functions and closures of the shapes `fn(&C) -> R`,
/// `fn(&mut C) -> R`, `fn(&C, A) -> R` and `fn(&mut C, A) -> R`. A single
/// parameter is taken from the first argument, defaulting when it is missing
/// or of the wrong type. The `Marker` only tells the shapes apart, closures
/// with ambiguous shapes need annotated parameter types.
pub trait Member<C, Marker>: Send + Sync + 'static {
    /// Call the function on `obj`.
    fn invoke(&self, obj: &mut C, args: &Arguments) -> Value;
}

/// Marks a `fn(&C) -> R` member.
pub struct Ref<R>(PhantomData<R>);

/// Marks a `fn(&mut C) -> R` member.
pub struct Mut<R>(PhantomData<R>);

/// Marks a `fn(&C, A) -> R` member.
pub struct RefArg<A, R>(PhantomData<(A, R)>);

/// Marks a `fn(&mut C, A) -> R` member.
pub struct MutArg<A, R>(PhantomData<(A, R)>);

impl<C, F, R> Member<C, Ref<R>> for F
where
    F: Fn(&C) -> R + Send + Sync + 'static,
    R: IntoValue,
{
    fn invoke(&self, obj: &mut C, _: &Arguments) -> Value {
        self(&*obj).into_value()
    }
}

impl<C, F, R> Member<C, Mut<R>> for F
where
    F: Fn(&mut C) -> R + Send + Sync + 'static,
    R: IntoValue,
{
    fn invoke(&self, obj: &mut C, _: &Arguments) -> Value {
        self(obj).into_value()
    }
}

impl<C, F, A, R> Member<C, RefArg<A, R>> for F
where
    F: Fn(&C, A) -> R + Send + Sync + 'static,
    A: FromValue,
    R: IntoValue,
{
    fn invoke(&self, obj: &mut C, args: &Arguments) -> Value {
        self(&*obj, first(args)).into_value()
    }
}

impl<C, F, A, R> Member<C, MutArg<A, R>> for F
where
    F: Fn(&mut C, A) -> R + Send + Sync + 'static,
    A: FromValue,
    R: IntoValue,
{
    fn invoke(&self, obj: &mut C, args: &Arguments) -> Value {
        self(obj, first(args)).into_value()
    }
}

/// The first argument, converted.
fn first<A: FromValue>(args: &Arguments) -> A {
    match args.get(0) {
        Some(value) => A::from_value(value),
        None => A::from_value(&Value::default()),
    }
}
