//! Typed settings.
//!
//! A [`Setting<T>`] owns one value of `T` under an immutable key. It is
//! registered with a [`Registry`] as the last step of construction and
//! deregistered as the first step of drop, so the registry never sees a
//! half-built or half-dropped setting.

mod guard;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::{Map, Value};

use crate::coerce::{ArrayFailureMode, CoercionError, Kind, Object, SettingValue};
use crate::registry::{Registration, Registry, SettingId};

pub use guard::{SettingMut, SettingRef};

pub type BoolSetting = Setting<bool>;
pub type IntSetting = Setting<i64>;
pub type UintSetting = Setting<u64>;
pub type FloatSetting = Setting<f64>;
pub type StringSetting = Setting<String>;
pub type ArraySetting<T> = Setting<Vec<T>>;
pub type ObjectSetting<T> = Setting<Object<T>>;
pub type MapSetting = Setting<Map<String, Value>>;

/// The registry's view of a setting, independent of its value type.
pub(crate) trait ErasedSetting: Send + Sync {
    fn key(&self) -> &str;
    fn kind(&self) -> Kind;
    fn is_assignable(&self) -> bool;
    fn assign_node(&self, node: &Value, mode: ArrayFailureMode) -> Result<(), CoercionError>;
    fn render(&self) -> String;
    fn dump(&self) -> String;
}

pub(crate) struct Shared<T> {
    key: String,
    value: RwLock<T>,
    assignable: AtomicBool,
}

impl<T: SettingValue> ErasedSetting for Shared<T> {
    fn key(&self) -> &str {
        &self.key
    }

    fn kind(&self) -> Kind {
        T::kind()
    }

    fn is_assignable(&self) -> bool {
        self.assignable.load(Ordering::Relaxed)
    }

    fn assign_node(&self, node: &Value, mode: ArrayFailureMode) -> Result<(), CoercionError> {
        let mut value = self.value.write().unwrap_or_else(PoisonError::into_inner);
        value.assign_node(node, mode)
    }

    fn render(&self) -> String {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .render()
    }

    fn dump(&self) -> String {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .dump_line(&self.key)
    }
}

/// A named, typed configuration value.
///
/// Guards returned by [`read`](Self::read) and [`read_mut`](Self::read_mut)
/// must be released before the setting is loaded or dumped.
///
/// ## Example
///
/// ```
/// use dragon_settings::{Registry, Setting};
/// use serde_json::json;
///
/// let registry = Registry::new();
/// let names = Setting::new(&registry, "Names", vec![String::from("a")]);
///
/// names.assign_node(&json!(["x", "y"]))?;
/// assert_eq!(*names.read(), vec!["x", "y"]);
/// assert_eq!(names.dump(), "Names:\n\tx\n\ty");
///
/// // A mismatched node leaves the value alone.
/// assert!(names.assign_node(&json!(3)).is_err());
/// assert_eq!(names.read().len(), 2);
/// # Ok::<(), dragon_settings::CoercionError>(())
/// ```
pub struct Setting<T: SettingValue> {
    // Dropped first: deregistration precedes destruction of the value.
    registration: Registration,
    shared: Arc<Shared<T>>,
}

impl<T: SettingValue> Setting<T> {
    /// Creates a setting and registers it with `registry`.
    pub fn new(registry: &Registry, key: impl Into<String>, value: T) -> Self {
        let shared = Arc::new(Shared {
            key: key.into(),
            value: RwLock::new(value),
            assignable: AtomicBool::new(false),
        });
        let weak = Arc::downgrade(&shared);
        let registration = registry.register(weak);
        tracing::trace!(key = %shared.key, kind = %T::kind(), "Registered setting");
        Self {
            registration,
            shared,
        }
    }

    /// Creates a setting holding `T::default()`.
    pub fn with_default(registry: &Registry, key: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self::new(registry, key, T::default())
    }

    /// Opts the setting in to (or out of) runtime assignment through
    /// [`Registry::assign`]. Settings are not assignable by default.
    #[must_use]
    pub fn assignable(self, yes: bool) -> Self {
        self.set_assignable(yes);
        self
    }

    /// Changes whether [`Registry::assign`] may write this setting.
    pub fn set_assignable(&self, yes: bool) {
        self.shared.assignable.store(yes, Ordering::Relaxed);
    }

    pub fn is_assignable(&self) -> bool {
        self.shared.is_assignable()
    }

    /// The setting's key.
    pub fn key(&self) -> &str {
        &self.shared.key
    }

    /// Identity of this setting's registration.
    pub fn id(&self) -> SettingId {
        self.registration.id()
    }

    /// The destination kind.
    pub fn kind(&self) -> Kind {
        T::kind()
    }

    /// Replaces the value.
    pub fn set(&self, value: T) {
        *self.read_mut() = value;
    }

    /// Coerces `node` into the value, keeping the old value on error.
    pub fn assign_node(&self, node: &Value) -> Result<(), CoercionError> {
        self.shared.assign_node(node, ArrayFailureMode::KeepPrevious)
    }

    /// Like [`assign_node`](Self::assign_node), with an explicit policy for
    /// arrays that fail partway.
    pub fn assign_node_with(&self, node: &Value, mode: ArrayFailureMode) -> Result<(), CoercionError> {
        self.shared.assign_node(node, mode)
    }

    /// Shared access to the value.
    pub fn read(&self) -> SettingRef<'_, T> {
        SettingRef::new(self.shared.value.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Exclusive access to the value.
    pub fn read_mut(&self) -> SettingMut<'_, T> {
        SettingMut::new(self.shared.value.write().unwrap_or_else(PoisonError::into_inner))
    }

    /// A copy of the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        T::clone(&self.read())
    }

    /// The value as text.
    pub fn render(&self) -> String {
        self.shared.render()
    }

    /// The `Key: value` dump line.
    pub fn dump(&self) -> String {
        self.shared.dump()
    }
}

impl<T: SettingValue + fmt::Debug> fmt::Debug for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setting")
            .field("key", &self.key())
            .field("value", &*self.read())
            .finish()
    }
}

impl<T: SettingValue> fmt::Display for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Hotkey {
        key: u32,
        modifiers: Vec<String>,
    }

    #[test]
    fn test_direct_assignment_round_trips() {
        let registry = Registry::new();

        let b = BoolSetting::new(&registry, "b", false);
        b.set(true);
        assert!(*b.read());

        let i = IntSetting::new(&registry, "i", 0);
        i.set(i64::MIN);
        assert_eq!(i.get(), i64::MIN);

        let u = UintSetting::new(&registry, "u", 0);
        u.set(u64::MAX);
        assert_eq!(u.get(), u64::MAX);

        let f = FloatSetting::new(&registry, "f", 0.0);
        f.set(-0.125);
        assert_eq!(f.get(), -0.125);

        let s = StringSetting::new(&registry, "s", String::new());
        s.set("hello".into());
        assert_eq!(*s.read(), "hello");

        let a = ArraySetting::<u32>::with_default(&registry, "a");
        a.set(vec![3, 1, 2]);
        assert_eq!(a.get(), vec![3, 1, 2]);
    }

    #[test]
    fn test_read_mut_edits_in_place() {
        let registry = Registry::new();
        let names = ArraySetting::<String>::with_default(&registry, "Names");
        names.read_mut().push("a".into());
        names.read_mut().push("b".into());
        assert_eq!(names.render(), "a\nb");
    }

    #[test]
    fn test_assign_node_coerces() {
        let registry = Registry::new();
        let enabled = BoolSetting::new(&registry, "Enabled", false);
        let ratio = FloatSetting::new(&registry, "Ratio", 0.0);

        enabled.assign_node(&json!(1)).unwrap();
        ratio.assign_node(&json!(3)).unwrap();

        assert!(enabled.get());
        assert_eq!(ratio.get(), 3.0);
    }

    #[test]
    fn test_assign_node_mismatch_keeps_value() {
        let registry = Registry::new();
        let count = IntSetting::new(&registry, "Count", 5);

        let err = count.assign_node(&json!("abc")).unwrap_err();

        assert!(err.is_type_mismatch());
        assert_eq!(count.get(), 5);
    }

    #[test]
    fn test_array_policy_per_call() {
        let registry = Registry::new();
        let ports = ArraySetting::<u16>::new(&registry, "Ports", vec![80]);

        ports
            .assign_node_with(&json!([1, 2, "x"]), ArrayFailureMode::KeepConverted)
            .unwrap_err();
        assert_eq!(ports.get(), vec![1, 2]);

        ports.assign_node(&json!([7, "x"])).unwrap_err();
        assert_eq!(ports.get(), vec![1, 2]);
    }

    #[test]
    fn test_object_setting_binds_and_renders() {
        let registry = Registry::new();
        let hotkey = ObjectSetting::<Hotkey>::with_default(&registry, "Hotkey");

        hotkey
            .assign_node(&json!({"key": 42, "modifiers": ["ctrl"]}))
            .unwrap();

        assert_eq!(hotkey.read().key, 42);
        assert_eq!(hotkey.read().modifiers, vec!["ctrl"]);
        assert_eq!(
            hotkey.dump(),
            r#"Hotkey: {"key":42,"modifiers":["ctrl"]}"#
        );
    }

    #[test]
    fn test_map_setting_accepts_any_object() {
        let registry = Registry::new();
        let extra = MapSetting::with_default(&registry, "Extra");
        extra.assign_node(&json!({"a": null})).unwrap();
        assert!(extra.read().contains_key("a"));
        assert_eq!(extra.kind(), Kind::Object);
    }

    #[test]
    fn test_dump_lines() {
        let registry = Registry::new();
        assert_eq!(BoolSetting::new(&registry, "Enabled", true).dump(), "Enabled: True");
        assert_eq!(IntSetting::new(&registry, "Count", -5).dump(), "Count: -5");
        assert_eq!(
            StringSetting::new(&registry, "Name", "dragon".into()).dump(),
            "Name: dragon"
        );
        assert_eq!(
            ArraySetting::<String>::new(&registry, "Names", vec!["a".into(), "b".into()]).dump(),
            "Names:\n\ta\n\tb"
        );
    }

    #[test]
    fn test_display_and_debug() {
        let registry = Registry::new();
        let count = IntSetting::new(&registry, "Count", 3);
        assert_eq!(count.to_string(), "3");
        assert_eq!(format!("{count:?}"), r#"Setting { key: "Count", value: 3 }"#);
    }

    #[test]
    fn test_assignable_builder() {
        let registry = Registry::new();
        let plain = IntSetting::new(&registry, "Plain", 1);
        let open = IntSetting::new(&registry, "Open", 1).assignable(true);

        assert!(!plain.is_assignable());
        assert!(open.is_assignable());

        // Direct assignment ignores the flag.
        plain.assign_node(&json!(2)).unwrap();
        assert_eq!(plain.get(), 2);
    }

    #[test]
    fn test_dropping_setting_deregisters() {
        let registry = Registry::new();
        let count = IntSetting::new(&registry, "Count", 3);
        let id = count.id();
        assert_eq!(registry.all()[0].id(), id);

        drop(count);
        assert!(registry.is_empty());
    }
}
