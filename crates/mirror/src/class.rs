use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::atomic::{AtomicU32, Ordering};

use ecow::EcoString;
use mirror_utils::Static;

use crate::{Arguments, Mirror, Value};

/// Named property values, sorted by name.
pub type Properties = BTreeMap<EcoString, Value>;

/// Identifies a class within the reflective hierarchy.
///
/// Ids are handed out in the order in which the classes' registries are first
/// used. Because a registry creates its base first, a derived class always has
/// a larger id than its base. The values are otherwise unspecified.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ClassId(u32);

impl ClassId {
    /// The id of the root of every hierarchy.
    pub const ROOT: Self = Self(0);

    /// Take the next unused id.
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw number.
    pub fn into_raw(self) -> u32 {
        self.0
    }
}

impl Debug for ClassId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

impl Display for ClassId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Dynamic dispatch through one class's table of named members.
///
/// Every lookup that misses locally continues at the base class. Objects are
/// always passed in whole, each table picks out the part it belongs to.
pub trait Magic: Send + Sync + 'static {
    /// The id of the class.
    fn id(&self) -> ClassId;

    /// The name of the class.
    fn name(&self) -> &'static str;

    /// The table of the base class, `None` only for the root.
    fn base(&self) -> Option<&'static dyn Magic>;

    /// Whether `id` belongs to this class or one of its ancestors.
    fn has_class_id(&self, id: ClassId) -> bool {
        id == self.id() || self.base().is_some_and(|base| base.has_class_id(id))
    }

    /// Whether a getter for `name` exists in the hierarchy.
    fn can_get(&self, name: &str) -> bool;

    /// Read a property, empty if there is no getter for it.
    fn get(&self, obj: &dyn Mirror, name: &str) -> Value;

    /// Read every property into `out`, prefixing the names with `prefix`.
    ///
    /// Base classes are read first so that derived classes overwrite their
    /// ancestors' entries of the same name.
    fn get_all(&self, obj: &dyn Mirror, out: &mut Properties, prefix: &str);

    /// Whether a setter for `name` exists in the hierarchy.
    fn can_set(&self, name: &str) -> bool;

    /// Write a property, does nothing if there is no setter for it.
    fn set(&self, obj: &mut dyn Mirror, name: &str, value: &Value);

    /// Whether a method called `name` exists in the hierarchy.
    fn can_call(&self, name: &str) -> bool;

    /// Call a method, empty if there is no such method.
    fn call(&self, obj: &mut dyn Mirror, name: &str, args: &Arguments) -> Value;
}

/// The table at the root of every hierarchy. It knows no members.
struct Root;

static ROOT: Root = Root;

impl Magic for Root {
    fn id(&self) -> ClassId {
        ClassId::ROOT
    }

    fn name(&self) -> &'static str {
        "Mirror"
    }

    fn base(&self) -> Option<&'static dyn Magic> {
        None
    }

    fn can_get(&self, _: &str) -> bool {
        false
    }

    fn get(&self, _: &dyn Mirror, _: &str) -> Value {
        Value::default()
    }

    fn get_all(&self, _: &dyn Mirror, _: &mut Properties, _: &str) {}

    fn can_set(&self, _: &str) -> bool {
        false
    }

    fn set(&self, _: &mut dyn Mirror, _: &str, _: &Value) {}

    fn can_call(&self, _: &str) -> bool {
        false
    }

    fn call(&self, _: &mut dyn Mirror, _: &str, _: &Arguments) -> Value {
        Value::default()
    }
}

/// A handle to a reflective class.
///
/// Cheap to copy. Two handles are equal if they refer to the same class.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Class(Static<dyn Magic>);

impl Class {
    /// The root of every hierarchy.
    pub fn root() -> Self {
        Self(Static(&ROOT))
    }

    /// The class dispatching through `magic`.
    pub fn of(magic: &'static dyn Magic) -> Self {
        Self(Static(magic))
    }

    /// The class's id.
    pub fn id(self) -> ClassId {
        self.0.id()
    }

    /// The class's name.
    pub fn name(self) -> &'static str {
        self.0.name()
    }

    /// The base class, `None` for the root.
    pub fn base(self) -> Option<Class> {
        self.0.base().map(Self::of)
    }

    /// The class itself, followed by its ancestors up to the root.
    pub fn ancestors(self) -> impl Iterator<Item = Class> {
        std::iter::successors(Some(self), |class| class.base())
    }

    /// Whether this class is `other` or derives from it.
    pub fn is_subclass_of(self, other: Class) -> bool {
        self.0.has_class_id(other.id())
    }

    /// The class's dispatch table.
    pub fn magic(self) -> &'static dyn Magic {
        self.0.0
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Class({})", self.name())
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(self.name())
    }
}
