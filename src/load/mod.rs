//! Loading settings documents into a registry.

mod env;
mod error;
mod report;
mod source;

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::coerce::{ArrayFailureMode, NodeType};
use crate::registry::{Registry, SettingHandle};

pub use env::EnvSource;
pub use error::{DocumentError, LoadError};
pub use report::{Diagnostic, LoadReport};
pub use source::{DocumentFormat, DocumentSource, FileSource, TextSource};

/// Behaviour of a load pass.
///
/// Deserializable so it can live in an application's own configuration:
///
/// ```
/// use dragon_settings::{ArrayFailureMode, LoadOptions};
///
/// let options: LoadOptions = serde_json::from_str(
///     r#"{ "suppress_missing_key_warnings": true, "array_failure_mode": "keep_converted" }"#,
/// )?;
/// assert!(options.suppress_missing_key_warnings);
/// assert!(!options.dump_parsed_document);
/// assert_eq!(options.array_failure_mode, ArrayFailureMode::KeepConverted);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Leave absent keys out of the report.
    pub suppress_missing_key_warnings: bool,
    /// Record the pretty-printed document in the report before scanning.
    pub dump_parsed_document: bool,
    pub array_failure_mode: ArrayFailureMode,
    /// Environment variables that override document entries.
    pub env: Option<EnvSource>,
}

/// Builder for a load pass over a [`Registry`].
///
/// Every registered setting is looked up by key in the document's top-level
/// object. Missing keys and values that fail to coerce are recorded in the
/// returned [`LoadReport`] and leave the setting unchanged; only a document
/// that cannot be opened or parsed fails the pass.
///
/// ## Example
///
/// ```no_run
/// use dragon_settings::{Loader, Registry, Setting};
///
/// let registry = Registry::new();
/// let enabled = Setting::new(&registry, "Enabled", false);
/// let names = Setting::new(&registry, "Names", Vec::<String>::new());
///
/// let report = Loader::new(&registry)
///     .suppress_missing_key_warnings(true)
///     .with_env("MYAPP", "_")
///     .load_path("settings.json")?;
///
/// if !report.is_clean() {
///     eprintln!("{report}");
/// }
/// println!("enabled={} names={:?}", enabled, *names.read());
/// # Ok::<(), dragon_settings::LoadError>(())
/// ```
#[derive(Debug)]
#[must_use = "loaders do nothing until .load() is called"]
pub struct Loader<'r> {
    registry: &'r Registry,
    options: LoadOptions,
}

impl<'r> Loader<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            options: LoadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn suppress_missing_key_warnings(mut self, suppress: bool) -> Self {
        self.options.suppress_missing_key_warnings = suppress;
        self
    }

    pub fn dump_parsed_document(mut self, dump: bool) -> Self {
        self.options.dump_parsed_document = dump;
        self
    }

    pub fn array_failure_mode(mut self, mode: ArrayFailureMode) -> Self {
        self.options.array_failure_mode = mode;
        self
    }

    /// Lets environment variables override document entries.
    ///
    /// See [`EnvSource`] for the naming scheme.
    pub fn with_env(mut self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.options.env = Some(EnvSource::new(prefix, separator));
        self
    }

    /// Loads the document at `path`, with the format taken from its extension.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadReport, LoadError> {
        self.load(FileSource::new(path))
    }

    /// Runs one load pass.
    pub fn load<S: DocumentSource>(&self, source: S) -> Result<LoadReport, LoadError> {
        let origin = source.origin();
        tracing::debug!(%origin, settings = self.registry.len(), "Loading settings");

        let bytes = source.open().map_err(|e| {
            tracing::error!(%origin, error = %e, "Failed to open settings document");
            LoadError::Open {
                origin: origin.clone(),
                source: e,
            }
        })?;

        let document = source.format().parse(&bytes).map_err(|e| {
            tracing::error!(%origin, error = %e, "Failed to parse settings document");
            LoadError::Parse {
                origin: origin.clone(),
                source: e,
            }
        })?;

        let mut report = LoadReport::default();
        if self.options.dump_parsed_document {
            if let Some(pretty) = pretty_print(&document) {
                tracing::debug!("Parsed settings document:\n{pretty}");
                report.push(Diagnostic::ParsedDocument(pretty));
            }
        }

        // A non-object root contributes no keys; environment overrides still apply.
        let mut root = match document {
            Value::Object(root) => root,
            other => {
                record(
                    &mut report,
                    Diagnostic::RootNotObject {
                        found: NodeType::of(&other),
                    },
                );
                Map::new()
            }
        };

        let handles = self.registry.all();
        if let Some(env) = &self.options.env {
            env.apply(&mut root, handles.iter().map(SettingHandle::key));
        }

        for handle in &handles {
            let key = handle.key();
            match root.get(key) {
                Some(node) => self.assign(&mut report, handle, node),
                None if self.options.suppress_missing_key_warnings => {
                    tracing::trace!(key, "Setting not in document");
                }
                None => record(&mut report, Diagnostic::MissingKey { key: key.to_string() }),
            }
        }

        tracing::debug!(%origin, warnings = report.warnings(), "Loaded settings");
        Ok(report)
    }

    fn assign(&self, report: &mut LoadReport, handle: &SettingHandle, node: &Value) {
        let key = handle.key();
        let found = NodeType::of(node);
        if !found.is_supported() {
            record(
                report,
                Diagnostic::InvalidType {
                    key: key.to_string(),
                    found,
                },
            );
            return;
        }

        match handle.assign_node(node, self.options.array_failure_mode) {
            Ok(()) => tracing::trace!(key, value = %handle.render(), "Assigned setting"),
            Err(e) if e.is_type_mismatch() => record(
                report,
                Diagnostic::TypeMismatch {
                    key: key.to_string(),
                    expected: handle.kind(),
                    found,
                },
            ),
            Err(e) => record(
                report,
                Diagnostic::Coercion {
                    key: key.to_string(),
                    source: e,
                },
            ),
        }
    }
}

fn record(report: &mut LoadReport, diagnostic: Diagnostic) {
    tracing::warn!("{diagnostic}");
    report.push(diagnostic);
}

/// Four-space indented JSON.
fn pretty_print(document: &Value) -> Option<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    document.serialize(&mut serializer).ok()?;
    String::from_utf8(buf).ok()
}

/// Loads the document at `path` and flattens the outcome into report text and
/// a success flag.
///
/// The flag is false only when the document could not be opened or parsed;
/// the text then carries the error.
pub fn load_settings(
    registry: &Registry,
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> (String, bool) {
    match Loader::new(registry)
        .with_options(options.clone())
        .load_path(path)
    {
        Ok(report) => (report.text(), true),
        Err(e) => (e.to_string(), false),
    }
}
