//! The two-file export of a label.

use crate::backend::{RenderBackend, RenderedFile};
use crate::errors::LabelError;
use crate::params::{LabelSpec, RenderMode};
use std::path::{Path, PathBuf};
use tracing::info;

/// Output paths of a full export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportPlan {
    pub color1: PathBuf,
    pub color2: PathBuf,
}

impl ExportPlan {
    /// Both paths get an `.stl` extension if they lack one.
    pub fn new(color1: impl Into<PathBuf>, color2: impl Into<PathBuf>) -> Self {
        ExportPlan {
            color1: ensure_stl_extension(color1.into()),
            color2: ensure_stl_extension(color2.into()),
        }
    }

    /// Default file names for `text`, inside `dir`.
    pub fn for_text(text: &str, dir: impl AsRef<Path>) -> Self {
        let (color1, color2) = default_file_names(text);
        Self::new(dir.as_ref().join(color1), dir.as_ref().join(color2))
    }
}

/// Files written by [`export_label`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportReport {
    pub color1: RenderedFile,
    pub color2: RenderedFile,
}

/// Lowercased `text` with everything but letters and digits replaced by `_`.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// `label_<text>_color1.stl` and `label_<text>_color2.stl`.
pub fn default_file_names(text: &str) -> (String, String) {
    let safe = sanitize_text(text);
    (format!("label_{safe}_color1.stl"), format!("label_{safe}_color2.stl"))
}

pub fn ensure_stl_extension(path: PathBuf) -> PathBuf {
    let has_stl = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("stl"));
    if has_stl {
        path
    } else {
        let mut name = path.into_os_string();
        name.push(".stl");
        PathBuf::from(name)
    }
}

/// Write both color groups of `spec` with `backend`.
///
/// The parameters are validated before either file is touched. The two renders
/// are independent and, with the `parallel` feature, run concurrently.
pub fn export_label(
    backend: &dyn RenderBackend,
    spec: &LabelSpec,
    plan: &ExportPlan,
) -> Result<ExportReport, LabelError> {
    spec.validate()?;

    let render = |mode: RenderMode, path: &Path| backend.render(spec, mode, path);
    #[cfg(feature = "parallel")]
    let (color1, color2) = rayon::join(
        || render(RenderMode::Color1, &plan.color1),
        || render(RenderMode::Color2, &plan.color2),
    );
    #[cfg(not(feature = "parallel"))]
    let (color1, color2) = (
        render(RenderMode::Color1, &plan.color1),
        render(RenderMode::Color2, &plan.color2),
    );

    let report = ExportReport {
        color1: color1?,
        color2: color2?,
    };
    for file in [&report.color1, &report.color2] {
        info!(
            backend = backend.name(),
            mode = %file.mode,
            path = %file.path.display(),
            kib = file.bytes.div_ceil(1024),
            "exported"
        );
    }
    Ok(report)
}
