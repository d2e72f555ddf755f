use serde_json::Value;

use crate::errors::LoadError;

/// Apply format migrations from `from_version` to `to_version`.
///
/// Migrations run on the raw JSON, one version step at a time. Version 1 is
/// the only version so far, so any step is an error.
pub fn migrate(doc: Value, from_version: u32, to_version: u32) -> Result<Value, LoadError> {
    // Add steps here as the format evolves: 1 => migrate_v1_to_v2(doc)?
    if from_version != to_version {
        return Err(LoadError::MigrationFailed {
            from: from_version,
            to: to_version,
            reason: format!("no migration path from v{} to v{}", from_version, to_version),
        });
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_same_version_is_identity() {
        let doc = json!({"component": {"kind": "bin"}});
        assert_eq!(migrate(doc.clone(), 1, 1).unwrap(), doc);
    }

    #[test]
    fn test_missing_step_fails() {
        let err = migrate(json!({}), 0, 1).unwrap_err();
        assert!(matches!(err, LoadError::MigrationFailed { from: 0, to: 1, .. }));
    }
}
