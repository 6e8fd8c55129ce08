use std::fmt::{self, Debug, Formatter};
use std::ops::Index;

use ecow::EcoVec;

use crate::{IntoValue, Storable, Value};

/// The ordered arguments of a method call.
#[derive(Default, Clone, PartialEq)]
pub struct Arguments {
    items: EcoVec<Value>,
}

impl Arguments {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument.
    pub fn push(&mut self, value: impl IntoValue) {
        self.items.push(value.into_value());
    }

    /// The number of arguments.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The argument at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// A copy of the argument at `index` as a `T`.
    ///
    /// Missing and mismatching arguments yield the default of `T`.
    pub fn arg<T: Storable>(&self, index: usize) -> T {
        self.get(index).map(Value::cast).unwrap_or_default()
    }

    /// Iterate over the arguments.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }
}

impl Debug for Arguments {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl Index<usize> for Arguments {
    type Output = Value;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Arguments {
    type Item = Value;
    type IntoIter = ecow::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<Value> for Arguments {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}

/// Conversion into [`Arguments`].
///
/// Lets calls pass their arguments inline: `obj.call("add", (1, 2))`.
pub trait IntoArgs {
    /// Pack `self` into arguments.
    fn into_args(self) -> Arguments;
}

impl IntoArgs for Arguments {
    fn into_args(self) -> Arguments {
        self
    }
}

/// A single argument.
impl<T: Storable> IntoArgs for T {
    fn into_args(self) -> Arguments {
        let mut args = Arguments::new();
        args.push(self);
        args
    }
}

impl IntoArgs for Vec<Value> {
    fn into_args(self) -> Arguments {
        self.into_iter().collect()
    }
}

impl<T: IntoValue, const N: usize> IntoArgs for [T; N] {
    fn into_args(self) -> Arguments {
        self.into_iter().map(IntoValue::into_value).collect()
    }
}

macro_rules! tuple_args {
    ($($name:ident),*) => {
        impl<$($name: IntoValue),*> IntoArgs for ($($name,)*) {
            #[allow(non_snake_case, clippy::unused_unit)]
            fn into_args(self) -> Arguments {
                let ($($name,)*) = self;
                let mut args = Arguments::new();
                $(args.push($name);)*
                args
            }
        }
    };
}

tuple_args!();
tuple_args!(A);
tuple_args!(A, B);
tuple_args!(A, B, C);
tuple_args!(A, B, C, D);
tuple_args!(A, B, C, D, E);
tuple_args!(A, B, C, D, E, F);
