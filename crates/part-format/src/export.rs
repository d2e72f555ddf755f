use part_engine::{ComponentSpec, Renderer};
use solid_kernel::KernelBundle;
use tracing::{info, instrument};

use crate::errors::ExportError;
use crate::stl::{export_ascii_stl, export_binary_stl};

/// Chordal tolerance used when tessellating for STL.
pub const STL_TOLERANCE: f64 = 0.05;

/// Output formats for [`export_part`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Step,
    Stl,
    StlAscii,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Step => "step",
            ExportFormat::Stl | ExportFormat::StlAscii => "stl",
        }
    }
}

/// Bytes of an exported part and the file name they belong under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Render `spec` and export it as STEP AP203 text.
pub fn export_step(
    kernel: &mut dyn KernelBundle,
    renderer: &mut Renderer,
    spec: &ComponentSpec,
) -> Result<String, ExportError> {
    let rendered = renderer.render(kernel.as_kernel(), spec)?;
    kernel
        .export_step(&rendered.solid, &rendered.filename)
        .map_err(|e| ExportError::StepExportFailed(e.to_string()))
}

/// Render `spec` and export it in `format`, named after the part.
#[instrument(skip(kernel, renderer, spec), fields(kind = spec.kind()))]
pub fn export_part(
    kernel: &mut dyn KernelBundle,
    renderer: &mut Renderer,
    spec: &ComponentSpec,
    format: ExportFormat,
) -> Result<ExportedFile, ExportError> {
    let rendered = renderer.render(kernel.as_kernel(), spec)?;
    let data = match format {
        ExportFormat::Step => kernel
            .export_step(&rendered.solid, &rendered.filename)
            .map_err(|e| ExportError::StepExportFailed(e.to_string()))?
            .into_bytes(),
        ExportFormat::Stl | ExportFormat::StlAscii => {
            let mesh = kernel
                .tessellate(&rendered.solid, STL_TOLERANCE)
                .map_err(|e| ExportError::TessellationFailed(e.to_string()))?;
            if format == ExportFormat::Stl {
                export_binary_stl(&mesh, &rendered.filename)?
            } else {
                export_ascii_stl(&mesh, &rendered.filename)?.into_bytes()
            }
        }
    };
    let filename = format!("{}.{}", rendered.filename, format.extension());
    info!(%filename, bytes = data.len(), "exported");
    Ok(ExportedFile { filename, data })
}
