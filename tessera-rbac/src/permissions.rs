//! Permission matrix evaluation
//!
//! Pure functions over a role's [`PermissionMatrix`]; no I/O. The matrix is
//! resolved once per request (see [`crate::roles::RoleService`]) and these
//! helpers answer action and field questions against it.

use serde_json::Value;

use tessera_api_types::{PermissionAction, PermissionMatrix, WritePermission};

/// Check whether the matrix permits an action on an entity
///
/// Denies when the entity has no entry (and no `"*"` fallback), when the
/// action flag is off, or when `field` is explicitly marked `false` in the
/// entity's field map. Fields not mentioned in the map are allowed.
///
/// A `write` value of `"own"` reports `true` here; callers enforce the
/// ownership comparison themselves using [`write_rule`].
pub fn check_permission(
    matrix: &PermissionMatrix,
    entity: &str,
    action: PermissionAction,
    field: Option<&str>,
) -> bool {
    let Some(entry) = matrix.entry(entity) else {
        return false;
    };

    if !entry.action_allowed(action) {
        return false;
    }

    if let (Some(field), Some(fields)) = (field, entry.fields.as_ref()) {
        if fields.get(field) == Some(&false) {
            return false;
        }
    }

    true
}

/// Raw tri-state write rule for an entity, for ownership branching
pub fn write_rule(matrix: &PermissionMatrix, entity: &str) -> WritePermission {
    matrix
        .entry(entity)
        .map(|entry| entry.write)
        .unwrap_or(WritePermission::Denied)
}

/// Strip fields the matrix explicitly hides from a record payload
///
/// Removes exactly the keys mapped to `false` in the entity's field map;
/// every other key passes through unchanged. Non-object payloads and
/// entities without a field map are returned as-is.
pub fn filter_fields(matrix: &PermissionMatrix, entity: &str, record: &Value) -> Value {
    let Some(fields) = matrix.entry(entity).and_then(|entry| entry.fields.as_ref()) else {
        return record.clone();
    };
    let Value::Object(map) = record else {
        return record.clone();
    };

    let filtered = map
        .iter()
        .filter(|(key, _)| fields.get(key.as_str()) != Some(&false))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Value::Object(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client_matrix() -> PermissionMatrix {
        serde_json::from_value(json!({
            "client": {
                "read": true,
                "write": "own",
                "delete": false,
                "fields": {"ssn": false}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_absent_entity_denies() {
        let matrix = client_matrix();
        assert!(!check_permission(&matrix, "invoice", PermissionAction::Read, None));
    }

    #[test]
    fn test_action_flags() {
        let matrix = client_matrix();
        assert!(check_permission(&matrix, "client", PermissionAction::Read, None));
        // "own" still reports permitted; the caller branches on ownership
        assert!(check_permission(&matrix, "client", PermissionAction::Write, None));
        assert!(!check_permission(&matrix, "client", PermissionAction::Delete, None));
    }

    #[test]
    fn test_field_visibility() {
        let matrix = client_matrix();
        assert!(!check_permission(&matrix, "client", PermissionAction::Read, Some("ssn")));
        // Unlisted fields default to allowed
        assert!(check_permission(&matrix, "client", PermissionAction::Read, Some("name")));
    }

    #[test]
    fn test_write_rule_reports_raw_value() {
        let matrix = client_matrix();
        assert_eq!(write_rule(&matrix, "client"), WritePermission::Own);
        assert_eq!(write_rule(&matrix, "invoice"), WritePermission::Denied);
    }

    #[test]
    fn test_filter_fields_strips_only_explicit_false() {
        let matrix = client_matrix();
        let record = json!({"name": "A", "ssn": "123"});
        assert_eq!(filter_fields(&matrix, "client", &record), json!({"name": "A"}));
    }

    #[test]
    fn test_filter_fields_passes_unspecified_keys() {
        let matrix = client_matrix();
        let record = json!({"name": "A", "email": "a@b.c", "notes": null});
        assert_eq!(filter_fields(&matrix, "client", &record), record);
    }

    #[test]
    fn test_filter_fields_without_field_map_is_identity() {
        let matrix: PermissionMatrix =
            serde_json::from_value(json!({"client": {"read": true, "write": true, "delete": true}}))
                .unwrap();
        let record = json!({"name": "A", "ssn": "123"});
        assert_eq!(filter_fields(&matrix, "client", &record), record);
    }
}
