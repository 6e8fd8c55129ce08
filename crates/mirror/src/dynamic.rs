use ecow::eco_format;

use crate::{Properties, Value, mirror};

/// A root class with properties added at runtime.
///
/// Names unknown to the registry are read from and written to a per-instance
/// table. Writes always succeed, creating the entry if needed. Classes embed a
/// `DynamicMirror` as their base to gain the table.
#[derive(Debug, Default, Clone)]
pub struct DynamicMirror {
    extras: Properties,
}

impl DynamicMirror {
    /// Create an object without extra properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// The extra properties.
    pub fn extras(&self) -> &Properties {
        &self.extras
    }

    /// Remove an extra property, returning its value or empty.
    pub fn remove_extra(&mut self, name: &str) -> Value {
        self.extras.remove(name).unwrap_or_default()
    }

    /// Remove all extra properties.
    pub fn clear_extras(&mut self) {
        self.extras.clear();
    }
}

mirror!(DynamicMirror, extra = {
    fn get_extra(&self, name: &str) -> Value {
        self.extras.get(name).cloned().unwrap_or_default()
    }

    fn can_get_extra(&self, name: &str) -> bool {
        self.extras.contains_key(name)
    }

    fn set_extra(&mut self, name: &str, value: Value) {
        self.extras.insert(name.into(), value);
    }

    fn can_set_extra(&self, name: &str) -> bool {
        self.extras.contains_key(name)
    }

    fn get_all_extra(&self, out: &mut Properties, prefix: &str) {
        for (name, value) in &self.extras {
            out.insert(eco_format!("{prefix}{name}"), value.clone());
        }
    }
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mirror, MirrorExt};

    #[test]
    fn test_dynamic_set_and_get() {
        let mut obj = DynamicMirror::new();
        assert!(obj.get_any("new_prop").is_empty());
        assert!(!obj.can_get("new_prop"));
        obj.set("new_prop", "hello");
        assert_eq!(obj.get_any("new_prop").to_string(), "hello");
        assert!(obj.can_get("new_prop"));
        obj.set("new_prop", 3);
        assert_eq!(obj.get::<i32>("new_prop"), 3);
    }

    #[test]
    fn test_dynamic_remove_and_clear() {
        let mut obj = DynamicMirror::new();
        obj.set("a", 1);
        obj.set("b", 2);
        assert_eq!(obj.remove_extra("a"), 1);
        assert!(obj.remove_extra("a").is_empty());
        assert_eq!(obj.extras().len(), 1);
        obj.clear_extras();
        assert!(obj.properties("").is_empty());
    }

    #[test]
    fn test_dynamic_render() {
        let mut obj = DynamicMirror::new();
        obj.set("x", 1.5);
        obj.set("label", "point");
        assert_eq!(Value::new(obj).to_string(), "DynamicMirror{label:point,x:1.5,}");
    }

    #[test]
    fn test_dynamic_unknown_method() {
        let mut obj = DynamicMirror::new();
        assert!(obj.call("missing", ()).is_empty());
        assert!(!obj.can_call("missing"));
    }
}
