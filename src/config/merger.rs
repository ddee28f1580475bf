//! Layering of YAML configuration documents.
//!
//! # Merge Rules
//!
//! - Mappings are merged recursively
//! - Sequences are replaced entirely, so a local `categories:` list
//!   replaces the project one rather than appending to it
//! - A null value in the overlay deletes the key from the base
//! - Scalars in the overlay replace the base
//! - An empty document (null at the top level) changes nothing

use serde_yaml::Value;

/// Deep merge `overlay` onto `base`, returning a new value.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    // Null in overlay = delete from result
                    result.remove(key);
                } else if let Some(base_value) = base_map.get(key) {
                    // Both sides have the key; mappings recurse, anything else is replaced
                    result.insert(key.clone(), deep_merge(base_value, overlay_value));
                } else {
                    result.insert(key.clone(), overlay_value.clone());
                }
            }

            Value::Mapping(result)
        }
        // Sequences and scalars: overlay wins
        (_, overlay) => overlay.clone(),
    }
}

/// Merge documents in order; later documents take precedence.
pub fn merge_configs(configs: &[Value]) -> Value {
    configs
        .iter()
        // An empty file parses as null
        .filter(|config| !config.is_null())
        .fold(Value::Mapping(Default::default()), |acc, config| {
            deep_merge(&acc, config)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn settings_merge_key_by_key() {
        let base = yaml(
            r#"
settings:
  interpreter: python3
  stop_timeout_ms: 500
"#,
        );
        let overlay = yaml(
            r#"
settings:
  interpreter: /opt/venv/bin/python
"#,
        );

        let result = deep_merge(&base, &overlay);

        assert_eq!(result["settings"]["interpreter"], "/opt/venv/bin/python");
        assert_eq!(result["settings"]["stop_timeout_ms"], 500);
    }

    #[test]
    fn categories_are_replaced_not_appended() {
        let base = yaml(
            r#"
categories:
  - name: A
  - name: B
"#,
        );
        let overlay = yaml(
            r#"
categories:
  - name: C
"#,
        );

        let result = deep_merge(&base, &overlay);
        let categories = result["categories"].as_sequence().unwrap();

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0]["name"], "C");
    }

    #[test]
    fn null_removes_inherited_alias() {
        let base = yaml(
            r#"
aliases:
  cv2: opencv-python
  yaml: PyYAML
"#,
        );
        let overlay = yaml(
            r#"
aliases:
  cv2: null
"#,
        );

        let result = deep_merge(&base, &overlay);

        assert!(result["aliases"].get("cv2").is_none());
        assert_eq!(result["aliases"]["yaml"], "PyYAML");
    }

    #[test]
    fn scalar_overlay_replaces_mapping_base() {
        let base = yaml("settings:\n  interpreter: python3");
        let overlay = yaml("settings: off");

        let result = deep_merge(&base, &overlay);
        assert_eq!(result["settings"], "off");
    }

    #[test]
    fn merge_configs_applies_in_order() {
        let configs = vec![yaml("a: 1\nb: 2"), yaml("b: 3\nc: 4"), yaml("c: 5")];

        let result = merge_configs(&configs);

        assert_eq!(result["a"], 1);
        assert_eq!(result["b"], 3);
        assert_eq!(result["c"], 5);
    }

    #[test]
    fn empty_document_changes_nothing() {
        let configs = vec![yaml("settings:\n  interpreter: python3"), yaml("")];

        let result = merge_configs(&configs);
        assert_eq!(result["settings"]["interpreter"], "python3");
    }

    #[test]
    fn merge_of_nothing_is_empty_mapping() {
        let result = merge_configs(&[]);
        assert!(result.as_mapping().unwrap().is_empty());
    }
}
