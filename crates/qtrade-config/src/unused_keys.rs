//! Flags config leaves no code path reads in the active mode — a typo or a
//! stale key that `#[derive(Deserialize)]` would otherwise drop on the floor
//! silently, since unknown fields are ignored rather than rejected.

use serde_json::Value;

use crate::consumption::{consumed_pointers, ConfigMode};
use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnusedKeyReport {
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Walks every leaf pointer in `config_json` and flags the ones not covered
/// by `mode`'s consumed-pointer registry. A pointer is covered if it exactly
/// matches a consumed pointer, or sits beneath one (consuming an object also
/// consumes its descendants, e.g. `/pipeline/cross_timeframes/0`).
///
/// Under [`UnusedKeyPolicy::Warn`] the report is always `Ok`; under
/// [`UnusedKeyPolicy::Fail`] a non-empty report becomes a
/// `ConfigError::UnusedKeys`.
pub fn report_unused_keys(
    mode: ConfigMode,
    config_json: &Value,
    policy: UnusedKeyPolicy,
) -> Result<UnusedKeyReport, ConfigError> {
    let consumed = consumed_pointers(mode);
    let mut unused = Vec::new();
    collect_unused(config_json, String::new(), consumed, &mut unused);
    unused.sort();

    let report = UnusedKeyReport {
        unused_leaf_pointers: unused,
    };

    match policy {
        UnusedKeyPolicy::Warn => {
            if !report.is_clean() {
                tracing::warn!(
                    unused = ?report.unused_leaf_pointers,
                    "config carries keys no code path reads in this mode"
                );
            }
            Ok(report)
        }
        UnusedKeyPolicy::Fail => {
            if report.is_clean() {
                Ok(report)
            } else {
                Err(ConfigError::UnusedKeys {
                    pointers: report.unused_leaf_pointers,
                })
            }
        }
    }
}

fn is_covered(pointer: &str, consumed: &[&str]) -> bool {
    consumed
        .iter()
        .any(|c| pointer == *c || pointer.starts_with(&format!("{c}/")))
}

fn collect_unused(v: &Value, pointer: String, consumed: &[&str], out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            if map.is_empty() && !pointer.is_empty() && !is_covered(&pointer, consumed) {
                out.push(pointer);
                return;
            }
            for (k, val) in map {
                collect_unused(val, format!("{pointer}/{k}"), consumed, out);
            }
        }
        _ => {
            if !is_covered(&pointer, consumed) {
                out.push(pointer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_layered_yaml_from_strings;

    #[test]
    fn warn_mode_reports_unused_keys_without_error() {
        let yaml = r#"
risk:
  max_position_pct: 0.25
unused_section:
  foo: 123
  bar: 456
"#;
        let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
        let report =
            report_unused_keys(ConfigMode::Paper, &loaded.config_json, UnusedKeyPolicy::Warn)
                .unwrap();
        assert!(!report.is_clean());
        assert!(report
            .unused_leaf_pointers
            .contains(&"/unused_section/foo".to_string()));
        assert!(report
            .unused_leaf_pointers
            .contains(&"/unused_section/bar".to_string()));
    }

    #[test]
    fn fail_mode_errors_on_unused_keys() {
        let yaml = r#"
unused_section:
  foo: 1
"#;
        let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
        let err = report_unused_keys(ConfigMode::Live, &loaded.config_json, UnusedKeyPolicy::Fail)
            .unwrap_err();
        assert!(err.to_string().contains("CONFIG_UNUSED_KEYS"));
    }

    #[test]
    fn only_consumed_keys_are_clean() {
        let yaml = r#"
risk:
  max_position_pct: 0.25
  max_concurrent_positions: 10
"#;
        let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
        let report =
            report_unused_keys(ConfigMode::Paper, &loaded.config_json, UnusedKeyPolicy::Warn)
                .unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn exact_leaf_consumption_does_not_consume_sibling_keys() {
        // /risk/max_position_pct is consumed; /risk/max_position_pct_extra is not.
        let yaml = r#"
risk:
  max_position_pct: 0.25
  max_position_pct_extra: 999
"#;
        let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
        let report =
            report_unused_keys(ConfigMode::Paper, &loaded.config_json, UnusedKeyPolicy::Warn)
                .unwrap();
        assert!(report
            .unused_leaf_pointers
            .contains(&"/risk/max_position_pct_extra".to_string()));
    }

    #[test]
    fn deterministic_unused_pointer_ordering() {
        let yaml = r#"
unused:
  b: 2
  a: 1
"#;
        let loaded = load_layered_yaml_from_strings(&[yaml]).unwrap();
        let report =
            report_unused_keys(ConfigMode::Paper, &loaded.config_json, UnusedKeyPolicy::Warn)
                .unwrap();
        assert_eq!(
            report.unused_leaf_pointers,
            vec!["/unused/a".to_string(), "/unused/b".to_string()]
        );
    }
}
