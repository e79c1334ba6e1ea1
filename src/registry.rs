//! The live collection of settings.
//!
//! A [`Registry`] never owns its settings. It keeps weak handles in
//! registration order; a [`Setting`](crate::Setting) adds itself when it is
//! constructed and removes itself when it is dropped.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use serde_json::Value;

use crate::coerce::{ArrayFailureMode, CoercionError, Kind};
use crate::setting::ErasedSetting;
use crate::Error;

/// Identity of one registration, unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SettingId(u64);

impl SettingId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        SettingId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

struct Entry {
    id: SettingId,
    setting: Weak<dyn ErasedSetting>,
}

/// Ordered, non-owning collection of live settings.
///
/// `Registry` is a shared handle: clones refer to the same collection. Use
/// [`Registry::new`] for an isolated registry (one per test, for instance) or
/// [`Registry::global`] for the process-wide one.
///
/// ## Example
///
/// ```
/// use dragon_settings::{Registry, Setting};
///
/// let registry = Registry::new();
/// let enabled = Setting::new(&registry, "Enabled", false);
/// let count = Setting::new(&registry, "Count", 5i64);
///
/// assert_eq!(registry.keys(), vec!["Enabled", "Count"]);
/// drop(enabled);
/// assert_eq!(registry.keys(), vec!["Count"]);
/// # drop(count);
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn register(&self, setting: Weak<dyn ErasedSetting>) -> Registration {
        let id = SettingId::next();
        self.lock().push(Entry { id, setting });
        Registration {
            registry: self.clone(),
            id,
        }
    }

    /// Removes the first entry with identity `id`.
    pub(crate) fn deregister(&self, id: SettingId) {
        let mut entries = self.lock();
        if let Some(pos) = entries.iter().position(|entry| entry.id == id) {
            entries.remove(pos);
        }
    }

    /// Snapshot of the live settings in registration order.
    pub fn all(&self) -> Vec<SettingHandle> {
        self.lock()
            .iter()
            .filter_map(|entry| {
                entry.setting.upgrade().map(|setting| SettingHandle {
                    id: entry.id,
                    setting,
                })
            })
            .collect()
    }

    /// Number of live settings.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no setting is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Keys of the live settings in registration order.
    pub fn keys(&self) -> Vec<String> {
        self.all()
            .iter()
            .map(|handle| handle.key().to_string())
            .collect()
    }

    /// The first setting registered under `key`.
    pub fn find(&self, key: &str) -> Option<SettingHandle> {
        self.all().into_iter().find(|handle| handle.key() == key)
    }

    /// Writes `node` into every assignable setting registered under `key`.
    ///
    /// Only settings opted in with [`Setting::assignable`](crate::Setting::assignable)
    /// take part. Every match is attempted; the first coercion error is
    /// returned after all of them have been tried. Returns the number of
    /// settings updated.
    pub fn assign(&self, key: &str, node: &Value) -> Result<usize, Error> {
        let (matches, locked): (Vec<_>, Vec<_>) = self
            .all()
            .into_iter()
            .filter(|handle| handle.key() == key)
            .partition(SettingHandle::is_assignable);
        if matches.is_empty() {
            return Err(if locked.is_empty() {
                Error::UnknownKey(key.to_string())
            } else {
                Error::NotAssignable(key.to_string())
            });
        }

        let mut updated = 0;
        let mut first_error = None;
        for handle in &matches {
            match handle.assign_node(node, ArrayFailureMode::default()) {
                Ok(()) => updated += 1,
                Err(e) => {
                    tracing::warn!(key, error = %e, "Rejected runtime assignment");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(Error::Coercion {
                key: key.to_string(),
                source: e,
            }),
            None => Ok(updated),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Keeps a setting registered; deregisters it on drop.
pub(crate) struct Registration {
    registry: Registry,
    id: SettingId,
}

impl Registration {
    pub(crate) fn id(&self) -> SettingId {
        self.id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.deregister(self.id);
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Registration").field(&self.id).finish()
    }
}

/// A type-erased reference to a live setting, as yielded by [`Registry::all`].
#[derive(Clone)]
pub struct SettingHandle {
    id: SettingId,
    setting: Arc<dyn ErasedSetting>,
}

impl SettingHandle {
    pub fn id(&self) -> SettingId {
        self.id
    }

    pub fn key(&self) -> &str {
        self.setting.key()
    }

    pub fn kind(&self) -> Kind {
        self.setting.kind()
    }

    /// Whether [`Registry::assign`] may write this setting.
    pub fn is_assignable(&self) -> bool {
        self.setting.is_assignable()
    }

    /// Coerces `node` into the setting. On error the value is unchanged
    /// (see [`ArrayFailureMode`] for arrays).
    pub fn assign_node(&self, node: &Value, mode: ArrayFailureMode) -> Result<(), CoercionError> {
        self.setting.assign_node(node, mode)
    }

    pub fn render(&self) -> String {
        self.setting.render()
    }

    pub fn dump(&self) -> String {
        self.setting.dump()
    }
}

impl fmt::Debug for SettingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingHandle")
            .field("id", &self.id)
            .field("key", &self.key())
            .field("kind", &self.kind())
            .finish()
    }
}
