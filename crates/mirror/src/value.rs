use std::any::{Any, TypeId};
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use mirror_utils::debug;

use crate::diag::{StrResult, bail};
use crate::{Mirror, Storable, Traits};

/// A type-erased value.
///
/// Either empty or holding exactly one value of some [`Storable`] type.
/// Cloning deep-copies the held value. Moving out with [`take`](Self::take)
/// leaves the source empty.
#[derive(Default)]
pub struct Value(Option<Box<dyn Bounds>>);

impl Value {
    /// Store a value.
    pub fn new<T: Storable>(value: T) -> Self {
        Self(Some(Box::new(value)))
    }

    /// Whether no value is held.
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Drop the held value.
    pub fn clear(&mut self) {
        self.0 = None;
    }

    /// Move the held value out, leaving this value empty.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Exchange the held values without copying them.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.0, &mut other.0);
    }

    /// The type id of the held value, the id of `()` if empty.
    pub fn type_id(&self) -> TypeId {
        match &self.0 {
            Some(bounds) => bounds.dyn_type_id(),
            None => TypeId::of::<()>(),
        }
    }

    /// The name of the held value's type, `none` if empty.
    pub fn type_name(&self) -> &'static str {
        match &self.0 {
            Some(bounds) => bounds.dyn_type_name(),
            None => "none",
        }
    }

    /// The traits of the held value's type.
    pub fn traits(&self) -> Traits {
        match &self.0 {
            Some(bounds) => bounds.dyn_traits(),
            None => Traits::VOID,
        }
    }

    /// Whether the held value is of type `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.pointer().is_some_and(|any| any.is::<T>())
    }

    /// Try to downcast to a reference to a specific type.
    pub fn downcast<T: 'static>(&self) -> Option<&T> {
        self.pointer()?.downcast_ref()
    }

    /// Try to downcast to a mutable reference to a specific type.
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.pointer_mut()?.downcast_mut()
    }

    /// Extract a copy of the held value.
    ///
    /// Only an exact type match succeeds: there is no numeric widening. On a
    /// mismatch, or if empty, this yields the default of `T`.
    pub fn cast<T: Storable>(&self) -> T {
        self.downcast::<T>().cloned().unwrap_or_default()
    }

    /// Extract a copy of the held value, failing on a type mismatch.
    pub fn try_cast<T: Storable>(&self) -> StrResult<T> {
        match self.downcast::<T>() {
            Some(value) => Ok(value.clone()),
            None => {
                let (from, to) = (self.type_name(), std::any::type_name::<T>());
                bail!("bad value cast from {from} to {to}")
            }
        }
    }

    /// Convert through the text representation of the held value.
    ///
    /// Yields the default of `T` if empty, if the held type has no text
    /// representation or if the text does not parse as `T`.
    pub fn lexical_cast<T: FromStr + Default>(&self) -> T {
        if !self.traits().contains(Traits::STREAMABLE) {
            return T::default();
        }

        let text = self.to_string();
        text.parse()
            .or_else(|_| text.trim().parse())
            .unwrap_or_default()
    }

    /// The held value as a type-erased reference.
    pub fn pointer(&self) -> Option<&dyn Any> {
        Some(self.0.as_deref()?.as_any())
    }

    /// The held value as a type-erased mutable reference.
    pub fn pointer_mut(&mut self) -> Option<&mut dyn Any> {
        Some(self.0.as_deref_mut()?.as_any_mut())
    }

    /// The held value as a reflective object, if its type is reflective.
    pub fn as_mirror(&self) -> Option<&dyn Mirror> {
        self.0.as_deref()?.dyn_mirror()
    }

    /// The held value as a mutable reflective object.
    ///
    /// Shared pointers only hand out their target while they are unique.
    pub fn as_mirror_mut(&mut self) -> Option<&mut dyn Mirror> {
        self.0.as_deref_mut()?.dyn_mirror_mut()
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        Self(self.0.as_ref().map(|bounds| bounds.dyn_clone()))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.0 {
            Some(bounds) => bounds.dyn_fmt(f),
            None => Ok(()),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.0 {
            Some(bounds) => f
                .debug_tuple("Value")
                .field(&debug(|f| {
                    f.write_str(bounds.dyn_type_name())?;
                    if !bounds.dyn_traits().contains(Traits::STREAMABLE) {
                        return Ok(());
                    }
                    f.write_str(": ")?;
                    bounds.dyn_fmt(f)
                }))
                .finish(),
            None => f.pad("Value(none)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(_)) => a.dyn_eq(other),
            _ => false,
        }
    }
}

impl<T: Storable> PartialEq<T> for Value {
    fn eq(&self, other: &T) -> bool {
        self.downcast::<T>().is_some_and(|value| value.eq_value(other))
    }
}

/// The object-safe face of a storable type.
trait Bounds: 'static {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn dyn_clone(&self) -> Box<dyn Bounds>;
    fn dyn_eq(&self, other: &Value) -> bool;
    fn dyn_fmt(&self, f: &mut Formatter) -> fmt::Result;
    fn dyn_traits(&self) -> Traits;
    fn dyn_type_id(&self) -> TypeId;
    fn dyn_type_name(&self) -> &'static str;
    fn dyn_mirror(&self) -> Option<&dyn Mirror>;
    fn dyn_mirror_mut(&mut self) -> Option<&mut dyn Mirror>;
}

impl<T: Storable> Bounds for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn dyn_clone(&self) -> Box<dyn Bounds> {
        Box::new(self.clone())
    }

    fn dyn_eq(&self, other: &Value) -> bool {
        let Some(other) = other.downcast::<Self>() else { return false };
        Storable::eq_value(self, other)
    }

    fn dyn_fmt(&self, f: &mut Formatter) -> fmt::Result {
        Storable::fmt_value(self, f)
    }

    fn dyn_traits(&self) -> Traits {
        T::TRAITS
    }

    fn dyn_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn dyn_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn dyn_mirror(&self) -> Option<&dyn Mirror> {
        Storable::mirror(self)
    }

    fn dyn_mirror_mut(&mut self) -> Option<&mut dyn Mirror> {
        Storable::mirror_mut(self)
    }
}
