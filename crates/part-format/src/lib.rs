pub mod errors;
pub mod export;
pub mod load;
pub mod metadata;
pub mod migrate;
pub mod save;
pub mod stl;

pub use errors::{ExportError, LoadError};
pub use export::{export_part, export_step, ExportFormat, ExportedFile, STL_TOLERANCE};
pub use load::load_document;
pub use metadata::DocumentMetadata;
pub use save::{save_document, PartDocument, FORMAT_ID, FORMAT_VERSION};
pub use stl::{export_ascii_stl, export_binary_stl};
