use std::rc::Rc;

use mirror::{
    Arguments, Class, ClassId, Mirror, MirrorExt, Reflected, Storable, Traits, Value,
    mirror,
};

#[derive(Debug, Clone)]
struct TestClass {
    foo: i32,
}

impl Default for TestClass {
    fn default() -> Self {
        Self { foo: 5 }
    }
}

impl TestClass {
    fn foo3(&self) -> i32 {
        self.foo + 3
    }

    fn set_foo(&mut self, x: i32) {
        self.foo = x;
    }

    fn get_foo(&self) -> i32 {
        self.foo
    }

    fn foo_plus(&mut self, i: i32) -> i32 {
        self.foo + i
    }

    fn void_method(&mut self) {
        self.foo = 10;
    }

    fn get_foo_any(&self) -> Value {
        Value::new(self.foo)
    }

    fn double_foo(&self) -> i32 {
        self.foo * 2
    }

    fn cat(&mut self, args: &Arguments) -> String {
        args.iter().map(Value::to_string).collect()
    }
}

mirror!(TestClass, registry = |r| {
    r.register_getter("f@@1", |tc| tc.foo + 1)
        .register_getter("foo2", |tc| tc.foo + 2)
        .register_getter("foo3", TestClass::foo3)
        .register_setter("f@@1", |tc, i: i32| tc.foo = i)
        .register_setter("foo2", |tc, i: i32| tc.foo = i)
        .register_setter("foo3", TestClass::set_foo)
        .register_property("foo", TestClass::get_foo, TestClass::set_foo)
        .register_property("f@@", TestClass::get_foo, TestClass::set_foo)
        .register_method("meth@d1", |tc, _| tc.foo + 1)
        .register_method("method2", |tc, _| tc.foo + 2)
        .register_member("get_foo", TestClass::get_foo)
        .register_member("void_method", TestClass::void_method)
        .register_member("foo_plus", TestClass::foo_plus)
        .register_member("set_foo", TestClass::set_foo)
        .register_member("get_foo_any", TestClass::get_foo_any)
        .register_member("double_foo", TestClass::double_foo)
        .register_method("cat", TestClass::cat);
});

#[derive(Debug, Clone)]
struct TestDerived {
    base: TestClass,
    bar: i32,
}

impl Default for TestDerived {
    fn default() -> Self {
        Self { base: TestClass::default(), bar: 7 }
    }
}

mirror!(TestDerived(base: TestClass), registry = |r| {
    r.register_attribute("bar", |d| &d.bar, |d| &mut d.bar);
});

#[derive(Debug, Default, Clone)]
struct Shadow {
    base: TestClass,
}

mirror!(Shadow(base: TestClass), registry = |r| {
    r.register_getter("foo", |_| -1);
});

#[derive(Debug, Default, Clone)]
struct Late;

mirror!(Late);

#[derive(Debug, Default, Clone)]
struct Racer;

mirror!(Racer);

#[derive(Debug, Default, Clone)]
struct Kid {
    base: Racer,
}

mirror!(Kid(base: Racer));

#[test]
fn test_class_ids() {
    assert!(TestDerived::static_class_id() > TestClass::static_class_id());
    assert!(TestClass::static_class_id() > ClassId::ROOT);

    let base = TestClass::default();
    let derived = TestDerived::default();
    assert_eq!(base.class_id(), TestClass::static_class_id());
    assert_ne!(derived.class_id(), base.class_id());
    assert!(derived.has_class_id(base.class_id()));
    assert!(derived.has_class_id(ClassId::ROOT));
    assert!(!base.has_class_id(derived.class_id()));
}

#[test]
fn test_class_handles() {
    let names: Vec<_> = TestDerived::static_class().ancestors().map(Class::name).collect();
    assert_eq!(names, ["TestDerived", "TestClass", "Mirror"]);
    assert!(TestDerived::static_class().is_subclass_of(TestClass::static_class()));
    assert!(!TestClass::static_class().is_subclass_of(TestDerived::static_class()));
    assert_eq!(TestDerived::default().class(), TestDerived::static_class());
    assert_eq!(TestClass::registry().base(), Class::root());
}

#[test]
fn test_cast() {
    let mut derived = TestDerived::default();
    let base = derived.cast::<TestClass>().unwrap();
    assert!(std::ptr::eq(base, &derived.base));
    assert!(derived.cast::<TestDerived>().is_some());
    assert!(derived.cast::<Late>().is_none());
    assert!(TestClass::default().cast::<TestDerived>().is_none());

    derived.cast_mut::<TestClass>().unwrap().foo = 11;
    assert_eq!(derived.base.foo, 11);

    let missing: Option<&dyn Mirror> = None;
    assert!(missing.and_then(|obj| obj.cast::<TestClass>()).is_none());
}

#[test]
fn test_getters() {
    let base = TestClass::default();
    assert!(base.get_any("unexisting").is_empty());
    assert_eq!(base.get_string("foo").as_str(), base.foo.to_string());
    assert_eq!(base.get::<i32>("foo"), base.foo);
    assert_eq!(base.get::<i32>("f@@"), base.foo);
    assert_eq!(base.get::<i32>("f@@1"), base.foo + 1);
    assert_eq!(base.get::<i32>("foo2"), base.foo + 2);
    assert_eq!(base.get::<i32>("foo3"), base.foo + 3);
    assert_eq!(base.get::<i32>("bar"), 0);
    assert_eq!(base.get::<i64>("foo"), 0);

    let derived = TestDerived::default();
    assert_eq!(derived.get::<i32>("foo"), derived.base.foo);
    assert_eq!(derived.get::<i32>("f@@1"), derived.base.foo + 1);
    assert_eq!(derived.get::<i32>("foo2"), derived.base.foo + 2);
    assert_eq!(derived.get::<i32>("foo3"), derived.base.foo + 3);
    assert_eq!(derived.get::<i32>("bar"), derived.bar);
}

#[test]
fn test_setters() {
    let mut base = TestClass::default();
    base.set("foo", 0);
    assert_eq!(base.foo, 0);
    base.set("f@@1", 100);
    assert_eq!(base.foo, 100);
    base.set("foo2", 200);
    assert_eq!(base.foo, 200);
    base.set("foo3", 300);
    assert_eq!(base.foo, 300);
    base.set("f@@", 123);
    assert_eq!(base.foo, 123);

    let mut derived = TestDerived::default();
    derived.set("bar", 1234);
    assert_eq!(derived.bar, 1234);
    derived.set("foo", 42);
    assert_eq!(derived.base.foo, 42);

    base.set("unexisting", 5);
    assert!(base.get_any("unexisting").is_empty());
}

#[test]
fn test_setter_with_wrong_type_writes_default() {
    let mut base = TestClass::default();
    base.set("foo", "seven");
    assert_eq!(base.foo, 0);
}

#[test]
fn test_methods() {
    let mut base = TestClass::default();
    assert_eq!(base.call("meth@d1", ()).cast::<i32>(), base.get_foo() + 1);
    assert_eq!(base.call("method2", ()).cast::<i32>(), base.get_foo() + 2);
    assert_eq!(base.call("get_foo", ()).cast::<i32>(), base.get_foo());
    assert_eq!(base.call("get_foo_any", ()).cast::<i32>(), base.get_foo());
    assert_eq!(base.call("double_foo", ()), 10);
    assert!(base.call("void_method", ()).is_empty());
    assert_eq!(base.foo, 10);
    assert_eq!(base.call("foo_plus", [5]).cast::<i32>(), base.get_foo() + 5);
    base.call("set_foo", 6);
    assert_eq!(base.foo, 6);
    assert_eq!(base.call("cat", ("hello", 123)).to_string(), "hello123");
    assert!(base.call("unexisting", ()).is_empty());
}

#[test]
fn test_methods_through_derived() {
    let mut derived = TestDerived::default();
    derived.call("void_method", ());
    assert_eq!(derived.base.foo, 10);
    assert_eq!(derived.call("double_foo", ()), 20);
    assert!(derived.can_call("cat"));
    assert!(!derived.can_call("bar"));
}

#[test]
fn test_probes() {
    let derived = TestDerived::default();
    assert!(derived.can_get("foo"));
    assert!(derived.can_get("bar"));
    assert!(derived.can_set("foo3"));
    assert!(!derived.can_get("unexisting"));
    assert!(!derived.can_set("unexisting"));
    assert!(!TestClass::default().can_get("bar"));
}

#[test]
fn test_properties() {
    let derived = TestDerived::default();
    let props = derived.properties("");
    let names: Vec<_> = props.keys().map(|name| name.as_str()).collect();
    assert_eq!(names, ["bar", "f@@", "f@@1", "foo", "foo2", "foo3"]);
    assert_eq!(props["bar"], 7);
    assert_eq!(props["foo3"], 8);

    let prefixed = derived.properties("obj.");
    assert_eq!(prefixed["obj.foo"], 5);
    assert!(!prefixed.contains_key("foo"));
}

#[test]
fn test_derived_getter_shadows_base() {
    let mut shadow = Shadow::default();
    assert_eq!(shadow.get::<i32>("foo"), -1);
    assert_eq!(shadow.properties("")["foo"], -1);
    assert_eq!(shadow.get::<i32>("foo2"), 7);

    // The setter is still inherited.
    shadow.set("foo", 1);
    assert_eq!(shadow.base.foo, 1);
    assert_eq!(shadow.get::<i32>("foo"), -1);
}

#[test]
fn test_runtime_registration() {
    let late = Late;
    assert!(!late.can_get("answer"));
    Late::registry().register_getter("answer", |_| 41);
    assert_eq!(late.get::<i32>("answer"), 41);
    Late::registry().register_getter("answer", |_| 42);
    assert_eq!(late.get::<i32>("answer"), 42);
}

#[test]
fn test_values_holding_objects() {
    let base = TestClass::default();
    assert_eq!(TestClass::TRAITS, Traits::CLASS | Traits::REFLECTIVE);
    assert_eq!(Value::new(base.clone()).traits(), Traits::CLASS | Traits::REFLECTIVE);
    assert_eq!(
        Value::new(Rc::new(base.clone())).traits(),
        Traits::POINTER
            | Traits::CLASS
            | Traits::POLYMORPHIC
            | Traits::REFLECTIVE
            | Traits::COMPARABLE
            | Traits::STREAMABLE,
    );

    let value = Value::new(TestDerived::default());
    assert_ne!(value, value.clone());
    let obj = value.as_mirror().unwrap();
    assert!(obj.cast::<TestDerived>().is_some());
    assert_eq!(obj.get::<i32>("bar"), 7);

    let shared = Value::new(Rc::new(TestClass::default()));
    assert_eq!(shared.as_mirror().unwrap().get::<i32>("foo"), 5);
}

#[test]
fn test_mutating_object_in_value() {
    let mut value = Value::new(TestClass::default());
    value.as_mirror_mut().unwrap().set("foo", 9);
    assert_eq!(value.downcast::<TestClass>().unwrap().foo, 9);

    let rc = Rc::new(TestClass::default());
    let mut shared = Value::new(rc.clone());
    assert!(shared.as_mirror_mut().is_none());
    drop(rc);
    assert!(shared.as_mirror_mut().is_some());
}

#[test]
fn test_misc() {
    assert_eq!(TestClass::default().class_name(), "TestClass");
    assert_eq!(
        Value::new(TestClass::default()).to_string(),
        "TestClass{f@@:5,f@@1:6,foo:5,foo2:7,foo3:8,}",
    );
}

#[test]
fn test_concurrent_first_use() {
    let ids: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| (Kid::static_class_id(), Racer::static_class_id())))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let (kid, racer) = ids[0];
    assert!(ids.iter().all(|&pair| pair == (kid, racer)));
    assert!(kid > racer);
    assert!(Kid::default().has_class_id(racer));
}
