//! Human-readable dumps of a registry.

use crate::Registry;

const DUMP_BEGIN: &str = "=== SETTINGS DUMP BEGIN ===";
const DUMP_END: &str = "=== SETTINGS DUMP END ===";

impl Registry {
    /// Every setting's dump line, in registration order, one per line.
    pub fn dump_all(&self) -> String {
        self.all()
            .iter()
            .map(|handle| handle.dump())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// [`dump_all`](Self::dump_all) between begin/end banner lines.
    pub fn dump_framed(&self) -> String {
        let body = self.dump_all();
        if body.is_empty() {
            format!("{DUMP_BEGIN}\n{DUMP_END}")
        } else {
            format!("{DUMP_BEGIN}\n{body}\n{DUMP_END}")
        }
    }

    /// Emits the framed dump at debug level, one event per line.
    pub fn log_dump(&self) {
        for line in self.dump_framed().lines() {
            tracing::debug!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArraySetting, BoolSetting, FloatSetting, IntSetting, Registry, StringSetting};

    #[test]
    fn test_dump_all_in_registration_order() {
        let registry = Registry::new();
        let _enabled = BoolSetting::new(&registry, "Enabled", true);
        let _count = IntSetting::new(&registry, "Count", 5);
        let _ratio = FloatSetting::new(&registry, "Ratio", 0.5);
        let _names = ArraySetting::<String>::new(&registry, "Names", vec!["a".into(), "b".into()]);
        let _name = StringSetting::new(&registry, "Name", "dragon".into());

        assert_eq!(
            registry.dump_all(),
            "Enabled: True\nCount: 5\nRatio: 0.5\nNames:\n\ta\n\tb\nName: dragon"
        );
    }

    #[test]
    fn test_dump_reflects_current_values() {
        let registry = Registry::new();
        let count = IntSetting::new(&registry, "Count", 5);
        count.set(6);
        assert_eq!(registry.dump_all(), "Count: 6");
    }

    #[test]
    fn test_dump_empty_registry() {
        let registry = Registry::new();
        assert_eq!(registry.dump_all(), "");
        assert_eq!(
            registry.dump_framed(),
            "=== SETTINGS DUMP BEGIN ===\n=== SETTINGS DUMP END ==="
        );
    }

    #[test]
    fn test_dump_framed_wraps_body() {
        let registry = Registry::new();
        let _enabled = BoolSetting::new(&registry, "Enabled", false);
        assert_eq!(
            registry.dump_framed(),
            "=== SETTINGS DUMP BEGIN ===\nEnabled: False\n=== SETTINGS DUMP END ==="
        );
        registry.log_dump();
    }
}
