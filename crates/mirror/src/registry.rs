use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use ecow::{EcoString, eco_format};
use indexmap::IndexMap;
use mirror_utils::debug;
use parking_lot::RwLock;

use crate::{
    Arguments, Class, ClassId, FromValue, IntoValue, Magic, Member, Mirror, Properties,
    Storable, Value,
};

type Getter<C> = Arc<dyn Fn(&C) -> Value + Send + Sync>;
type Setter<C> = Arc<dyn Fn(&mut C, &Value) + Send + Sync>;
type Callable<C> = Arc<dyn Fn(&mut C, &Arguments) -> Value + Send + Sync>;

/// The table of named members of the class `C`.
///
/// There is one registry per class, created on first use by
/// [`Reflected::registry`](crate::Reflected::registry). Lookups that miss
/// continue at the registry of the base class.
///
/// Members can be registered at any time, re-registering a name replaces the
/// previous entry. Names are arbitrary strings.
pub struct Registry<C: 'static> {
    name: &'static str,
    id: ClassId,
    base: Class,
    tables: RwLock<Tables<C>>,
}

/// The members declared directly on one class.
struct Tables<C> {
    getters: IndexMap<EcoString, Getter<C>>,
    setters: IndexMap<EcoString, Setter<C>>,
    methods: IndexMap<EcoString, Callable<C>>,
}

impl<C: Mirror> Registry<C> {
    /// Create an empty registry deriving from `base`.
    ///
    /// Takes a fresh class id, so the base must have been created before.
    /// Used by [`mirror!`](crate::mirror), which keeps the one registry of a
    /// class in a static. Calling it elsewhere yields an unrelated class.
    #[doc(hidden)]
    pub fn new(name: &'static str, base: Class) -> Self {
        let id = ClassId::next();
        log::debug!("created registry for {name} (id {id}, base {base})");
        Self {
            name,
            id,
            base,
            tables: RwLock::new(Tables {
                getters: IndexMap::new(),
                setters: IndexMap::new(),
                methods: IndexMap::new(),
            }),
        }
    }

    /// The id of the class.
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// The name of the class.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The base class.
    pub fn base(&self) -> Class {
        self.base
    }

    /// Register a property getter.
    pub fn register_getter<F, R>(&self, name: impl Into<EcoString>, getter: F) -> &Self
    where
        F: Fn(&C) -> R + Send + Sync + 'static,
        R: IntoValue,
    {
        let name = name.into();
        log::trace!("registered getter {}.{name}", self.name);
        self.tables
            .write()
            .getters
            .insert(name, Arc::new(move |obj: &C| getter(obj).into_value()));
        self
    }

    /// Register a property setter.
    ///
    /// Values that are not a `T` arrive as the default `T`.
    pub fn register_setter<F, T>(&self, name: impl Into<EcoString>, setter: F) -> &Self
    where
        F: Fn(&mut C, T) + Send + Sync + 'static,
        T: FromValue,
    {
        let name = name.into();
        log::trace!("registered setter {}.{name}", self.name);
        self.tables
            .write()
            .setters
            .insert(name, Arc::new(move |obj: &mut C, value: &Value| {
                setter(obj, T::from_value(value))
            }));
        self
    }

    /// Register a getter and a setter under the same name.
    pub fn register_property<G, R, S, T>(
        &self,
        name: impl Into<EcoString>,
        getter: G,
        setter: S,
    ) -> &Self
    where
        G: Fn(&C) -> R + Send + Sync + 'static,
        R: IntoValue,
        S: Fn(&mut C, T) + Send + Sync + 'static,
        T: FromValue,
    {
        let name = name.into();
        self.register_getter(name.clone(), getter).register_setter(name, setter)
    }

    /// Register a property reading and writing a field in place.
    pub fn register_attribute<T, G, M>(
        &self,
        name: impl Into<EcoString>,
        field: G,
        field_mut: M,
    ) -> &Self
    where
        T: Storable,
        G: Fn(&C) -> &T + Send + Sync + 'static,
        M: Fn(&mut C) -> &mut T + Send + Sync + 'static,
    {
        self.register_property(
            name,
            move |obj: &C| field(obj).clone(),
            move |obj: &mut C, value: T| *field_mut(obj) = value,
        )
    }

    /// Register a method receiving the raw call arguments.
    pub fn register_method<F, R>(&self, name: impl Into<EcoString>, method: F) -> &Self
    where
        F: Fn(&mut C, &Arguments) -> R + Send + Sync + 'static,
        R: IntoValue,
    {
        let name = name.into();
        log::trace!("registered method {}.{name}", self.name);
        self.tables
            .write()
            .methods
            .insert(name, Arc::new(move |obj: &mut C, args: &Arguments| {
                method(obj, args).into_value()
            }));
        self
    }

    /// Register a plain member function as a method.
    ///
    /// See [`Member`] for the supported shapes.
    pub fn register_member<M>(
        &self,
        name: impl Into<EcoString>,
        member: impl Member<C, M>,
    ) -> &Self {
        self.register_method(name, move |obj: &mut C, args: &Arguments| {
            member.invoke(obj, args)
        })
    }
}

impl<C: Mirror> Magic for Registry<C> {
    fn id(&self) -> ClassId {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn base(&self) -> Option<&'static dyn Magic> {
        Some(self.base.magic())
    }

    fn can_get(&self, name: &str) -> bool {
        self.tables.read().getters.contains_key(name) || self.base.magic().can_get(name)
    }

    fn get(&self, obj: &dyn Mirror, name: &str) -> Value {
        let getter = self.tables.read().getters.get(name).cloned();
        match (getter, resolve::<C>(obj)) {
            (Some(getter), Some(part)) => getter(part),
            _ => self.base.magic().get(obj, name),
        }
    }

    fn get_all(&self, obj: &dyn Mirror, out: &mut Properties, prefix: &str) {
        self.base.magic().get_all(obj, out, prefix);
        let Some(part) = resolve::<C>(obj) else { return };
        let getters: Vec<_> = self
            .tables
            .read()
            .getters
            .iter()
            .map(|(name, getter)| (name.clone(), getter.clone()))
            .collect();
        for (name, getter) in getters {
            out.insert(eco_format!("{prefix}{name}"), getter(part));
        }
    }

    fn can_set(&self, name: &str) -> bool {
        self.tables.read().setters.contains_key(name) || self.base.magic().can_set(name)
    }

    fn set(&self, obj: &mut dyn Mirror, name: &str, value: &Value) {
        let setter = self.tables.read().setters.get(name).cloned();
        match setter {
            Some(setter) => {
                if let Some(part) = resolve_mut::<C>(obj) {
                    setter(part, value);
                }
            }
            None => self.base.magic().set(obj, name, value),
        }
    }

    fn can_call(&self, name: &str) -> bool {
        self.tables.read().methods.contains_key(name) || self.base.magic().can_call(name)
    }

    fn call(&self, obj: &mut dyn Mirror, name: &str, args: &Arguments) -> Value {
        let method = self.tables.read().methods.get(name).cloned();
        match method {
            Some(method) => match resolve_mut::<C>(obj) {
                Some(part) => method(part, args),
                None => Value::default(),
            },
            None => self.base.magic().call(obj, name, args),
        }
    }
}

impl<C: Mirror> Debug for Registry<C> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let tables = self.tables.read();
        f.debug_struct("Registry")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("base", &self.base)
            .field("getters", &debug(|f| f.debug_list().entries(tables.getters.keys()).finish()))
            .field("setters", &debug(|f| f.debug_list().entries(tables.setters.keys()).finish()))
            .field("methods", &debug(|f| f.debug_list().entries(tables.methods.keys()).finish()))
            .finish()
    }
}

/// Find the part of `obj` that is a `C`, walking down through its bases.
pub(crate) fn resolve<C: Mirror>(mut obj: &dyn Mirror) -> Option<&C> {
    loop {
        if let Some(part) = obj.as_any().downcast_ref::<C>() {
            return Some(part);
        }
        obj = obj.base()?;
    }
}

/// Find the part of `obj` that is a `C`, mutably.
pub(crate) fn resolve_mut<C: Mirror>(mut obj: &mut dyn Mirror) -> Option<&mut C> {
    loop {
        if obj.as_any().is::<C>() {
            return obj.as_any_mut().downcast_mut::<C>();
        }
        obj = obj.base_mut()?;
    }
}
