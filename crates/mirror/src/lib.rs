//! Runtime reflection for Rust structs.
//!
//! Classes declared with [`mirror!`] expose named properties and methods that
//! can be read, written and called by name at runtime. Each class has a
//! [`Registry`] of members that is created on first use and chained to the
//! registry of its base class. Values cross the reflection boundary as
//! [`Value`]s, type-erased containers for any [`Storable`] type.
//!
//! Unknown names are not errors: reads yield an empty value and writes are
//! dropped. Probe with [`Mirror::can_get`], [`Mirror::can_set`] and
//! [`Mirror::can_call`] where it matters.
//!
//! ```
//! use mirror::{DynamicMirror, Mirror, MirrorExt, mirror};
//!
//! #[derive(Debug, Default, Clone)]
//! struct Account {
//!     base: DynamicMirror,
//!     balance: i64,
//! }
//!
//! impl Account {
//!     fn deposit(&mut self, amount: i64) -> i64 {
//!         self.balance += amount;
//!         self.balance
//!     }
//! }
//!
//! mirror!(Account(base: DynamicMirror), registry = |r| {
//!     r.register_attribute("balance", |a| &a.balance, |a| &mut a.balance)
//!         .register_member("deposit", Account::deposit);
//! });
//!
//! let mut account = Account::default();
//! assert_eq!(account.call("deposit", 50_i64), 50_i64);
//! account.set("owner", "Ada");
//! assert_eq!(account.get_string("owner").as_str(), "Ada");
//! assert_eq!(account.class_name(), "Account");
//! ```

pub mod diag;

mod args;
mod class;
mod dynamic;
mod method;
mod reflect;
mod registry;
mod storable;
mod value;

pub use self::args::{Arguments, IntoArgs};
pub use self::class::{Class, ClassId, Magic, Properties};
pub use self::dynamic::DynamicMirror;
pub use self::method::{Member, Mut, MutArg, Ref, RefArg};
pub use self::reflect::{Mirror, MirrorExt, Reflected, fmt_object};
pub use self::registry::Registry;
pub use self::storable::{FromValue, IntoValue, Storable, Traits};
pub use self::value::Value;
