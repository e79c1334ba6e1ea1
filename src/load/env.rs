use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// Environment overrides for top-level settings keys.
///
/// For a setting keyed `Count`, prefix `APP` and separator `_`, the variable
/// `APP_COUNT` replaces the document's `Count` entry when set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvSource {
    prefix: String,
    #[serde(default = "default_separator")]
    separator: String,
}

fn default_separator() -> String {
    "_".to_string()
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
        }
    }

    /// The variable name consulted for `key`.
    pub fn var_name(&self, key: &str) -> String {
        let key: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("{}{}{}", self.prefix, self.separator, key)
    }

    /// Writes the overrides for `keys` into `document`. Returns how many were
    /// applied.
    pub(crate) fn apply<'k>(
        &self,
        document: &mut Map<String, Value>,
        keys: impl IntoIterator<Item = &'k str>,
    ) -> usize {
        let mut applied = 0;
        for key in keys {
            let var = self.var_name(key);
            if let Ok(raw) = std::env::var(&var) {
                tracing::debug!(key, var = %var, "Applying environment override");
                document.insert(key.to_string(), coerce_value(&raw));
                applied += 1;
            }
        }
        applied
    }
}

fn coerce_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    // Only if it looks like an integer: optional minus, then digits
    if looks_like_integer(s) {
        if let Ok(u) = s.parse::<u64>() {
            return Value::from(u);
        }
        if let Ok(i) = s.parse::<i64>() {
            return Value::from(i);
        }
    }

    if s.contains('.') {
        if let Some(n) = s.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }

    Value::String(s.to_string())
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
