//! Device-field boundary properties
//!
//! Stripping removes exactly the device-only keys; re-applying what was
//! stripped restores the original body. Together these are what keeps
//! per-device state from ever crossing the sync boundary.

use proptest::prelude::*;

use choresync::shared::document::DEVICE_ONLY_FIELDS;
use choresync::shared::Document;

fn body_strategy() -> impl Strategy<Value = serde_json::Map<String, serde_json::Value>> {
    let shared = proptest::collection::btree_map("[a-z]{1,8}", any::<i32>(), 0..6);
    let selected = proptest::option::of("[A-Z][a-z]{1,6}");
    let theme = proptest::option::of(prop_oneof!["dark", "light", "system"]);

    (shared, selected, theme).prop_map(|(entries, selected, theme)| {
        let mut fields = serde_json::Map::new();
        for (key, value) in entries {
            fields.insert(key, serde_json::json!(value));
        }
        if let Some(user) = selected {
            fields.insert("selectedUser".into(), serde_json::json!(user));
        }
        if let Some(theme) = theme {
            fields.insert("theme".into(), serde_json::json!(theme));
        }
        fields
    })
}

proptest! {
    #[test]
    fn strip_removes_exactly_the_device_keys(body in body_strategy()) {
        let mut document = Document::with_fields(body.clone());
        let removed = document.strip_device_fields();

        for key in DEVICE_ONLY_FIELDS {
            prop_assert!(!document.fields.contains_key(key));
            prop_assert_eq!(removed.get(key), body.get(key));
        }

        // Nothing else was touched
        for (key, value) in &body {
            if !DEVICE_ONLY_FIELDS.contains(&key.as_str()) {
                prop_assert_eq!(document.fields.get(key), Some(value));
            }
        }
    }

    #[test]
    fn strip_then_apply_is_identity(body in body_strategy()) {
        let original = Document::with_fields(body);
        let mut document = original.clone();

        let removed = document.strip_device_fields();
        document.apply_device_fields(removed);

        prop_assert_eq!(document, original);
    }
}
