use serde_json::Value;
use tracing::debug;

use crate::errors::LoadError;
use crate::save::{PartDocument, PartFile, FORMAT_ID, FORMAT_VERSION};

/// Deserialize a part document from a JSON string.
///
/// Checks the format identifier and version before decoding the component,
/// so a document from a newer release is reported as such rather than as a
/// parse error.
pub fn load_document(json: &str) -> Result<PartDocument, LoadError> {
    let raw: Value = serde_json::from_str(json).map_err(|e| LoadError::ParseError(e.to_string()))?;

    let format = raw
        .get("format")
        .and_then(Value::as_str)
        .ok_or_else(|| LoadError::ParseError("missing field `format`".to_string()))?;
    if format != FORMAT_ID {
        return Err(LoadError::UnknownFormat(format.to_string()));
    }

    let version = raw
        .get("version")
        .and_then(Value::as_u64)
        .ok_or_else(|| LoadError::ParseError("missing field `version`".to_string()))?;
    let version = u32::try_from(version).unwrap_or(u32::MAX);
    if version > FORMAT_VERSION {
        return Err(LoadError::FutureVersion {
            file_version: version,
            supported_version: FORMAT_VERSION,
        });
    }

    let raw = if version < FORMAT_VERSION {
        debug!(from = version, to = FORMAT_VERSION, "migrating document");
        crate::migrate::migrate(raw, version, FORMAT_VERSION)?
    } else {
        raw
    };

    let file: PartFile =
        serde_json::from_value(raw).map_err(|e| LoadError::ParseError(e.to_string()))?;
    Ok(PartDocument {
        metadata: file.metadata,
        component: file.component,
    })
}
