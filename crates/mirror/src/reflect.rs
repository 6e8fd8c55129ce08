use std::any::Any;
use std::fmt::{self, Formatter};

use ecow::{EcoString, eco_format};

use crate::registry::{resolve, resolve_mut};
use crate::{
    Arguments, Class, ClassId, FromValue, IntoArgs, IntoValue, Magic, Properties,
    Registry, Value,
};

/// An object with named properties and methods.
///
/// Members declared in a class's [`Registry`] take precedence. Names the
/// registry does not know fall through to the `*_extra` hooks, which a class
/// can override to add members at runtime. By default, the hooks delegate to
/// the base part of the object and end in nothing.
///
/// Implement this trait with [`mirror!`](crate::mirror), which also provides
/// the plumbing methods.
pub trait Mirror: 'static {
    /// The dispatch table of the object's most derived class.
    fn magic(&self) -> &'static dyn Magic;

    /// The object as [`Any`].
    fn as_any(&self) -> &dyn Any;

    /// The object as mutable [`Any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The object as a trait object.
    fn as_mirror(&self) -> &dyn Mirror;

    /// The object as a mutable trait object.
    fn as_mirror_mut(&mut self) -> &mut dyn Mirror;

    /// The part of the object belonging to the base class, if it has one.
    fn base(&self) -> Option<&dyn Mirror> {
        None
    }

    /// The mutable part of the object belonging to the base class.
    fn base_mut(&mut self) -> Option<&mut dyn Mirror> {
        None
    }

    /// The object's most derived class.
    fn class(&self) -> Class {
        Class::of(self.magic())
    }

    /// The id of the object's most derived class.
    fn class_id(&self) -> ClassId {
        self.magic().id()
    }

    /// The name of the object's most derived class.
    fn class_name(&self) -> &'static str {
        self.magic().name()
    }

    /// Whether the object's class or one of its ancestors has the given id.
    fn has_class_id(&self, id: ClassId) -> bool {
        self.magic().has_class_id(id)
    }

    /// Read a property, empty if there is none of that name.
    fn get_any(&self, name: &str) -> Value {
        let magic = self.magic();
        if magic.can_get(name) {
            magic.get(self.as_mirror(), name)
        } else {
            self.get_extra(name)
        }
    }

    /// Read a property as text.
    fn get_string(&self, name: &str) -> EcoString {
        eco_format!("{}", self.get_any(name))
    }

    /// Write a property. Writes to unknown properties are dropped.
    fn set_any(&mut self, name: &str, value: Value) {
        let magic = self.magic();
        if magic.can_set(name) {
            magic.set(self.as_mirror_mut(), name, &value);
        } else {
            self.set_extra(name, value);
        }
    }

    /// Whether the property can be read.
    fn can_get(&self, name: &str) -> bool {
        self.magic().can_get(name) || self.can_get_extra(name)
    }

    /// Whether the property can be written.
    fn can_set(&self, name: &str) -> bool {
        self.magic().can_set(name) || self.can_set_extra(name)
    }

    /// Whether the method can be called.
    fn can_call(&self, name: &str) -> bool {
        self.magic().can_call(name) || self.can_call_extra(name)
    }

    /// Call a method, empty if there is none of that name.
    fn call_any(&mut self, name: &str, args: &Arguments) -> Value {
        let magic = self.magic();
        if magic.can_call(name) {
            magic.call(self.as_mirror_mut(), name, args)
        } else {
            self.call_extra(name, args)
        }
    }

    /// Read all properties, prefixing their names with `prefix`.
    ///
    /// Registry properties replace extra properties of the same name.
    fn properties(&self, prefix: &str) -> Properties {
        let mut out = Properties::new();
        self.collect_properties(&mut out, prefix);
        out
    }

    /// Read all properties into `out`, prefixing their names with `prefix`.
    fn collect_properties(&self, out: &mut Properties, prefix: &str) {
        self.get_all_extra(out, prefix);
        self.magic().get_all(self.as_mirror(), out, prefix);
    }

    /// Read a property unknown to the registry.
    fn get_extra(&self, name: &str) -> Value {
        match self.base() {
            Some(base) => base.get_extra(name),
            None => Value::default(),
        }
    }

    /// Whether a property unknown to the registry can be read.
    fn can_get_extra(&self, name: &str) -> bool {
        self.base().is_some_and(|base| base.can_get_extra(name))
    }

    /// Write a property unknown to the registry.
    fn set_extra(&mut self, name: &str, value: Value) {
        match self.base_mut() {
            Some(base) => base.set_extra(name, value),
            None => log::debug!("dropped write to unknown property {name:?}"),
        }
    }

    /// Whether a property unknown to the registry can be written.
    fn can_set_extra(&self, name: &str) -> bool {
        self.base().is_some_and(|base| base.can_set_extra(name))
    }

    /// Read all properties unknown to the registry into `out`.
    fn get_all_extra(&self, out: &mut Properties, prefix: &str) {
        if let Some(base) = self.base() {
            base.get_all_extra(out, prefix);
        }
    }

    /// Call a method unknown to the registry.
    fn call_extra(&mut self, name: &str, args: &Arguments) -> Value {
        match self.base_mut() {
            Some(base) => base.call_extra(name, args),
            None => {
                log::debug!("called unknown method {name:?}");
                Value::default()
            }
        }
    }

    /// Whether a method unknown to the registry can be called.
    fn can_call_extra(&self, name: &str) -> bool {
        self.base().is_some_and(|base| base.can_call_extra(name))
    }
}

/// Generic conveniences for every [`Mirror`], including `dyn Mirror`.
pub trait MirrorExt: Mirror {
    /// Read a property as a `T`, the default `T` if absent or mismatching.
    fn get<T: FromValue>(&self, name: &str) -> T {
        T::from_value(&self.get_any(name))
    }

    /// Write a property. Writes to unknown properties are dropped.
    fn set(&mut self, name: &str, value: impl IntoValue) {
        self.set_any(name, value.into_value());
    }

    /// Call a method with inline arguments.
    ///
    /// ```
    /// # use mirror::{Mirror, MirrorExt};
    /// fn area(shape: &mut dyn Mirror) -> f64 {
    ///     shape.call("scaled_area", (2.0, "cm")).cast()
    /// }
    /// ```
    fn call(&mut self, name: &str, args: impl IntoArgs) -> Value {
        self.call_any(name, &args.into_args())
    }

    /// View the object as a `T` if it is one or derives from one.
    fn cast<T: Reflected>(&self) -> Option<&T> {
        if !self.has_class_id(T::static_class_id()) {
            return None;
        }
        resolve(self.as_mirror())
    }

    /// View the object as a mutable `T` if it is one or derives from one.
    fn cast_mut<T: Reflected>(&mut self) -> Option<&mut T> {
        if !self.has_class_id(T::static_class_id()) {
            return None;
        }
        resolve_mut(self.as_mirror_mut())
    }
}

impl<M: Mirror + ?Sized> MirrorExt for M {}

/// The static side of a reflective class.
pub trait Reflected: Mirror + Sized {
    /// The class's registry, created on first use.
    fn registry() -> &'static Registry<Self>;

    /// The class.
    fn static_class() -> Class {
        Class::of(Self::registry())
    }

    /// The id of the class.
    fn static_class_id() -> ClassId {
        Self::registry().id()
    }
}

/// Render an object as `Name{key:value,...}` over its sorted properties.
pub fn fmt_object(obj: &dyn Mirror, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}{{", obj.class_name())?;
    for (name, value) in obj.properties("") {
        write!(f, "{name}:{value},")?;
    }
    f.write_str("}")
}

/// Declares a struct as a reflective class.
///
/// The struct must implement `Clone` and `Default`. A base class is embedded
/// as a field and named in parentheses. Members are registered in a closure
/// receiving the class's [`Registry`], which runs once on first use. Overrides
/// of the [`Mirror`] extension hooks go into `extra`.
///
/// ```
/// # use mirror::{Mirror, MirrorExt, Reflected, mirror};
/// #[derive(Debug, Default, Clone)]
/// struct Shape {
///     sides: u32,
/// }
///
/// #[derive(Debug, Default, Clone)]
/// struct Square {
///     shape: Shape,
///     width: f64,
/// }
///
/// mirror!(Shape, registry = |r| {
///     r.register_attribute("sides", |s| &s.sides, |s| &mut s.sides);
/// });
///
/// mirror!(Square(shape: Shape), registry = |r| {
///     r.register_getter("area", |s: &Square| s.width * s.width);
/// });
///
/// let square = Square { shape: Shape { sides: 4 }, width: 3.0 };
/// assert_eq!(square.get::<u32>("sides"), 4);
/// assert_eq!(square.get::<f64>("area"), 9.0);
/// assert!(Square::static_class_id() > Shape::static_class_id());
/// ```
#[macro_export]
macro_rules! mirror {
    (@base) => { $crate::Class::root() };
    (@base $base:ty) => { <$base as $crate::Reflected>::static_class() };

    (
        $ty:ident $(($field:ident: $base:ty))?
        $(, registry = $init:expr)?
        $(, extra = { $($extra:tt)* })?
        $(,)?
    ) => {
        impl $crate::Reflected for $ty {
            fn registry() -> &'static $crate::Registry<Self> {
                static REGISTRY: ::std::sync::LazyLock<$crate::Registry<$ty>> =
                    ::std::sync::LazyLock::new(|| {
                        let registry = $crate::Registry::new(
                            stringify!($ty),
                            $crate::mirror!(@base $($base)?),
                        );
                        $(
                            let init: fn(&$crate::Registry<$ty>) = $init;
                            init(&registry);
                        )?
                        registry
                    });
                &REGISTRY
            }
        }

        impl $crate::Mirror for $ty {
            fn magic(&self) -> &'static dyn $crate::Magic {
                <Self as $crate::Reflected>::registry()
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn as_mirror(&self) -> &dyn $crate::Mirror {
                self
            }

            fn as_mirror_mut(&mut self) -> &mut dyn $crate::Mirror {
                self
            }

            $(
                fn base(&self) -> ::std::option::Option<&dyn $crate::Mirror> {
                    ::std::option::Option::Some(&self.$field)
                }

                fn base_mut(&mut self) -> ::std::option::Option<&mut dyn $crate::Mirror> {
                    ::std::option::Option::Some(&mut self.$field)
                }
            )?

            $($($extra)*)?
        }

        impl $crate::Storable for $ty {
            const TRAITS: $crate::Traits =
                $crate::Traits::CLASS.union($crate::Traits::REFLECTIVE);

            fn fmt_value(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                $crate::fmt_object(self, f)
            }

            fn mirror(&self) -> ::std::option::Option<&dyn $crate::Mirror> {
                ::std::option::Option::Some(self)
            }

            fn mirror_mut(&mut self) -> ::std::option::Option<&mut dyn $crate::Mirror> {
                ::std::option::Option::Some(self)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Storable, Traits};

    #[derive(Debug, Default, Clone)]
    struct Lamp {
        watts: u32,
        on: bool,
    }

    impl Lamp {
        fn toggle(&mut self) -> bool {
            self.on = !self.on;
            self.on
        }
    }

    mirror!(Lamp, registry = |r| {
        r.register_attribute("watts", |l| &l.watts, |l| &mut l.watts)
            .register_getter("on", |l: &Lamp| l.on)
            .register_member("toggle", Lamp::toggle);
    });

    #[derive(Debug, Default, Clone)]
    struct Bare;

    mirror!(Bare);

    #[test]
    fn test_mirror_dispatch() {
        let mut lamp = Lamp { watts: 60, on: false };
        assert_eq!(lamp.class_name(), "Lamp");
        assert_eq!(lamp.get::<u32>("watts"), 60);
        assert_eq!(lamp.get_string("on").as_str(), "false");
        assert_eq!(lamp.call("toggle", ()), true);
        assert!(lamp.on);
        lamp.set("watts", 75_u32);
        assert_eq!(lamp.watts, 75);
    }

    #[test]
    fn test_mirror_soft_failures() {
        let mut lamp = Lamp::default();
        assert!(lamp.get_any("missing").is_empty());
        assert!(lamp.call("missing", (1, 2)).is_empty());
        lamp.set("on", true);
        lamp.set("missing", 5);
        assert!(!lamp.on);
        assert!(lamp.can_get("on"));
        assert!(!lamp.can_set("on"));
        assert!(lamp.can_call("toggle"));
        assert!(!lamp.can_call("watts"));
    }

    #[test]
    fn test_mirror_without_members() {
        let bare = Bare;
        assert!(bare.properties("").is_empty());
        assert_eq!(bare.class().base(), Some(Class::root()));
        assert_eq!(Value::new(Bare).to_string(), "Bare{}");
    }

    #[test]
    fn test_mirror_properties_prefixed() {
        let lamp = Lamp { watts: 40, on: true };
        let props = lamp.properties("lamp.");
        let names: Vec<_> = props.keys().map(EcoString::as_str).collect();
        assert_eq!(names, ["lamp.on", "lamp.watts"]);
        assert_eq!(props["lamp.watts"], 40_u32);
    }

    #[test]
    fn test_mirror_as_value() {
        let value = Value::new(Lamp { watts: 5, on: false });
        assert_eq!(Lamp::TRAITS, Traits::CLASS | Traits::REFLECTIVE);
        assert_eq!(value.to_string(), "Lamp{on:false,watts:5,}");
        assert_ne!(value, value.clone());
        let lamp = value.as_mirror().unwrap();
        assert_eq!(lamp.class_id(), Lamp::static_class_id());
        assert!(lamp.cast::<Lamp>().is_some());
        assert!(lamp.cast::<Bare>().is_none());
    }
}
