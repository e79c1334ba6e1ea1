//! Typed settings bound to entries of a JSON (or TOML) document.
//!
//! Declare each setting once with its key and default, load a document, and
//! every setting whose key is present is coerced into place. Problems with
//! individual keys are collected in a [`LoadReport`] instead of failing the
//! whole load.
//!
//! ```
//! use dragon_settings::{Loader, Registry, Setting};
//!
//! let registry = Registry::new();
//! let enabled = Setting::new(&registry, "Enabled", false);
//! let count = Setting::new(&registry, "Count", 5i64);
//!
//! let report = Loader::new(&registry).load(r#"{ "Enabled": 1, "Count": "abc" }"#)?;
//!
//! assert!(enabled.get());
//! assert_eq!(count.get(), 5);
//! assert_eq!(report.warnings(), 1);
//! assert_eq!(registry.dump_all(), "Enabled: True\nCount: 5");
//! # Ok::<(), dragon_settings::LoadError>(())
//! ```

pub mod coerce;
mod dump;
mod error;
pub mod load;
mod registry;
mod setting;

pub use coerce::{ArrayFailureMode, CoercionError, Kind, NodeType, Object, SettingValue};
pub use error::Error;
pub use load::{
    load_settings, Diagnostic, DocumentFormat, DocumentSource, FileSource, LoadError, LoadOptions,
    LoadReport, Loader, TextSource,
};
pub use registry::{Registry, SettingHandle, SettingId};
pub use setting::{
    ArraySetting, BoolSetting, FloatSetting, IntSetting, MapSetting, ObjectSetting, Setting,
    SettingMut, SettingRef, StringSetting, UintSetting,
};
