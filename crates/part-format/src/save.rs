use part_engine::ComponentSpec;
use serde::{Deserialize, Serialize};

use crate::errors::ExportError;
use crate::metadata::DocumentMetadata;

/// Format identifier written to every document.
pub const FORMAT_ID: &str = "grid-part";

/// Current document format version.
pub const FORMAT_VERSION: u32 = 1;

/// A named part spec with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PartDocument {
    pub metadata: DocumentMetadata,
    pub component: ComponentSpec,
}

impl PartDocument {
    pub fn new(name: impl Into<String>, component: impl Into<ComponentSpec>) -> Self {
        Self {
            metadata: DocumentMetadata::new(name),
            component: component.into(),
        }
    }
}

/// The on-disk structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PartFile {
    /// Format identifier.
    pub format: String,
    /// Format version number.
    pub version: u32,
    pub metadata: DocumentMetadata,
    /// The component spec, tagged by kind.
    pub component: ComponentSpec,
}

/// Serialize a document to pretty-printed JSON.
pub fn save_document(doc: &PartDocument) -> Result<String, ExportError> {
    let file = PartFile {
        format: FORMAT_ID.to_string(),
        version: FORMAT_VERSION,
        metadata: doc.metadata.clone(),
        component: doc.component.clone(),
    };
    serde_json::to_string_pretty(&file).map_err(|e| ExportError::Serialize(e.to_string()))
}
