use part_engine::EngineError;

/// Errors during part document loading.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("failed to parse document: {0}")]
    ParseError(String),

    #[error("unknown document format: {0}")]
    UnknownFormat(String),

    #[error("document version {file_version} is newer than supported version {supported_version}")]
    FutureVersion {
        file_version: u32,
        supported_version: u32,
    },

    #[error("migration failed from version {from} to {to}: {reason}")]
    MigrationFailed { from: u32, to: u32, reason: String },
}

/// Errors while writing a part out as a document, STEP or STL.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("render failed: {0}")]
    RenderFailed(#[from] EngineError),

    #[error("STEP export failed: {0}")]
    StepExportFailed(String),

    #[error("tessellation failed: {0}")]
    TessellationFailed(String),

    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("serialization failed: {0}")]
    Serialize(String),
}
