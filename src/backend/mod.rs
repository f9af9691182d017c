//! Turning a label into mesh files.
//!
//! A backend receives the parameter set and a render mode and writes one
//! STL file. Both backends share the composer's coordinate system, so the
//! two color files of an export line up without registration.

pub mod native;
pub mod scad;

pub use native::NativeBackend;
pub use scad::OpenScadBackend;

use crate::errors::LabelError;
use crate::params::{LabelSpec, RenderMode};
use std::path::{Path, PathBuf};

/// A file written by a backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub mode: RenderMode,
    pub bytes: u64,
}

impl RenderedFile {
    pub(crate) fn stat(path: &Path, mode: RenderMode) -> Result<Self, LabelError> {
        let bytes = std::fs::metadata(path).map_err(crate::io::IoError::from)?.len();
        Ok(RenderedFile {
            path: path.to_path_buf(),
            mode,
            bytes,
        })
    }
}

/// Materializes the layers `mode` selects into an STL file.
pub trait RenderBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn render(
        &self,
        spec: &LabelSpec,
        mode: RenderMode,
        output: &Path,
    ) -> Result<RenderedFile, LabelError>;
}
