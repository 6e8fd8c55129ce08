use std::fmt::{self, Formatter};
use std::rc::Rc;
use std::sync::Arc;

use ecow::EcoString;

use crate::{Mirror, Value};

bitflags::bitflags! {
    /// Traits of the type held by a [`Value`].
    #[derive(Default, Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct Traits: u8 {
        /// Only set for empty values.
        const VOID        = 1 << 0;
        /// A pointer-like handle to another value (`Rc`, `Arc`, `&'static`).
        const POINTER     = 1 << 1;
        /// Integers, floats, booleans and characters.
        const ARITHMETIC  = 1 << 2;
        /// A structured type or a pointer to one.
        const CLASS       = 1 << 3;
        /// A pointer through which the target is dispatched dynamically.
        const POLYMORPHIC = 1 << 4;
        /// A class implementing [`Mirror`] or a pointer to one.
        const REFLECTIVE  = 1 << 5;
        /// Values of the type can be compared for equality.
        const COMPARABLE  = 1 << 6;
        /// Values of the type have a text representation.
        const STREAMABLE  = 1 << 7;
    }
}

/// A type that can be stored in a [`Value`].
///
/// The capabilities of the type are fixed at compile time: equality and text
/// rendering each have a supported strategy and a no-op default. Prefer the
/// [`storable!`](crate::storable) declaration over a manual implementation,
/// it keeps [`TRAITS`](Self::TRAITS) and the strategies in sync.
pub trait Storable: Clone + Default + 'static {
    /// The traits reported by values of this type.
    const TRAITS: Traits;

    /// Compare two values of this type.
    ///
    /// Types without equality are never equal, not even to themselves.
    fn eq_value(&self, _other: &Self) -> bool {
        false
    }

    /// Render the value as text. Renders nothing by default.
    fn fmt_value(&self, _f: &mut Formatter) -> fmt::Result {
        Ok(())
    }

    /// View the value as a reflective object.
    fn mirror(&self) -> Option<&dyn Mirror> {
        None
    }

    /// View the value as a mutable reflective object.
    fn mirror_mut(&mut self) -> Option<&mut dyn Mirror> {
        None
    }
}

/// Declares types as [`Storable`] and selects their capabilities.
///
/// The available capabilities are `arithmetic`, `class` and `pointer`, which
/// only set the matching [`Traits`] flag, as well as `eq` (compares with
/// [`PartialEq`]) and `display` (renders with
/// [`Display`](std::fmt::Display)).
///
/// ```
/// # use mirror::{Storable, Traits, storable};
/// #[derive(Debug, Default, Clone, PartialEq)]
/// struct Meters(f64);
///
/// storable! { Meters: class | eq; }
///
/// assert_eq!(Meters::TRAITS, Traits::CLASS | Traits::COMPARABLE);
/// ```
#[macro_export]
macro_rules! storable {
    (@flag arithmetic) => { $crate::Traits::ARITHMETIC };
    (@flag class) => { $crate::Traits::CLASS };
    (@flag pointer) => { $crate::Traits::POINTER };
    (@flag eq) => { $crate::Traits::COMPARABLE };
    (@flag display) => { $crate::Traits::STREAMABLE };

    (@strategy eq) => {
        fn eq_value(&self, other: &Self) -> bool {
            self == other
        }
    };
    (@strategy display) => {
        fn fmt_value(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
            ::std::fmt::Display::fmt(self, f)
        }
    };
    (@strategy $other:ident) => {};

    ($($ty:ty: $($cap:ident)|+;)*) => {
        $(
            impl $crate::Storable for $ty {
                const TRAITS: $crate::Traits = $crate::Traits::empty()
                    $(.union($crate::storable!(@flag $cap)))+;

                $($crate::storable!(@strategy $cap);)+
            }
        )*
    };
}

storable! {
    bool: arithmetic | eq | display;
    char: arithmetic | eq | display;
    i8: arithmetic | eq | display;
    i16: arithmetic | eq | display;
    i32: arithmetic | eq | display;
    i64: arithmetic | eq | display;
    i128: arithmetic | eq | display;
    isize: arithmetic | eq | display;
    u8: arithmetic | eq | display;
    u16: arithmetic | eq | display;
    u32: arithmetic | eq | display;
    u64: arithmetic | eq | display;
    u128: arithmetic | eq | display;
    usize: arithmetic | eq | display;
    f32: arithmetic | eq | display;
    f64: arithmetic | eq | display;
    String: class | eq | display;
    EcoString: class | eq | display;
    &'static str: pointer | eq | display;
}

/// The traits of a pointer to a value of type `T`.
const fn pointer_traits<T: Storable>() -> Traits {
    let mut traits = Traits::POINTER.union(T::TRAITS.intersection(Traits::CLASS));
    if T::TRAITS.contains(Traits::REFLECTIVE) {
        traits = traits.union(Traits::POLYMORPHIC).union(Traits::REFLECTIVE);
    }
    traits.union(Traits::COMPARABLE).union(Traits::STREAMABLE)
}

impl<T: Storable> Storable for Rc<T> {
    const TRAITS: Traits = pointer_traits::<T>();

    fn eq_value(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }

    fn fmt_value(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:p}", Rc::as_ptr(self))
    }

    fn mirror(&self) -> Option<&dyn Mirror> {
        (**self).mirror()
    }

    fn mirror_mut(&mut self) -> Option<&mut dyn Mirror> {
        Rc::get_mut(self)?.mirror_mut()
    }
}

impl<T: Storable> Storable for Arc<T> {
    const TRAITS: Traits = pointer_traits::<T>();

    fn eq_value(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }

    fn fmt_value(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:p}", Arc::as_ptr(self))
    }

    fn mirror(&self) -> Option<&dyn Mirror> {
        (**self).mirror()
    }

    fn mirror_mut(&mut self) -> Option<&mut dyn Mirror> {
        Arc::get_mut(self)?.mirror_mut()
    }
}

/// Conversion into a [`Value`].
///
/// Used for whatever getters and methods return.
pub trait IntoValue {
    /// Wrap `self` in a value.
    fn into_value(self) -> Value;
}

impl<T: Storable> IntoValue for T {
    fn into_value(self) -> Value {
        Value::new(self)
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

/// Nothing to return becomes the empty value.
impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::default()
    }
}

/// Conversion out of a [`Value`].
///
/// Used for whatever setters and methods accept. The conversion never fails:
/// mismatching values turn into the default of the target type.
pub trait FromValue: Sized {
    /// Extract `Self` from the value.
    fn from_value(value: &Value) -> Self;
}

impl<T: Storable> FromValue for T {
    fn from_value(value: &Value) -> Self {
        value.cast()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Self {
        value.clone()
    }
}
