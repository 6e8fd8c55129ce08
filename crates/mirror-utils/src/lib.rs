//! Utilities for Mirror.

use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;

/// Turn a closure into a struct implementing [`Debug`].
pub fn debug<F>(f: F) -> impl Debug
where
    F: Fn(&mut Formatter) -> std::fmt::Result,
{
    struct Wrapper<F>(F);

    impl<F> Debug for Wrapper<F>
    where
        F: Fn(&mut Formatter) -> std::fmt::Result,
    {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            self.0(f)
        }
    }

    Wrapper(f)
}

/// A container around a static reference that is cheap to clone and hash.
///
/// Two handles are equal if they point to the same address. The target may
/// be unsized, which makes it usable for `&'static dyn Trait` handles. Only
/// the data address takes part in comparisons, vtables are ignored.
pub struct Static<T: ?Sized + 'static>(pub &'static T);

impl<T: ?Sized> Static<T> {
    /// The address of the target, without any metadata.
    fn addr(self) -> usize {
        (self.0 as *const T).cast::<()>() as usize
    }
}

impl<T: ?Sized> Deref for Static<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl<T: ?Sized> Copy for Static<T> {}

impl<T: ?Sized> Clone for Static<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Eq for Static<T> {}

impl<T: ?Sized> PartialEq for Static<T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(self.0, other.0)
    }
}

impl<T: ?Sized> Hash for Static<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.addr());
    }
}

impl<T: Debug + ?Sized> Debug for Static<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: Debug {
        fn name(&self) -> &'static str;
    }

    #[derive(Debug)]
    struct Thing(&'static str);

    impl Named for Thing {
        fn name(&self) -> &'static str {
            self.0
        }
    }

    static A: Thing = Thing("a");
    static B: Thing = Thing("b");

    #[test]
    fn test_static_compares_by_address() {
        let a: Static<dyn Named> = Static(&A);
        let also_a: Static<dyn Named> = Static(&A);
        let b: Static<dyn Named> = Static(&B);
        assert_eq!(a, also_a);
        assert_ne!(a, b);
        assert_eq!(a.name(), "a");
        assert_eq!(b.name(), "b");
    }

    #[test]
    fn test_debug_closure() {
        let value = debug(|f| f.write_str("custom"));
        assert_eq!(format!("{value:?}"), "custom");
    }
}
