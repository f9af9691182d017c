//! Error types

use crate::float_types::Real;
use crate::io::IoError;
use std::path::PathBuf;
use std::time::Duration;

/// A parameter set that cannot describe a printable label.
///
/// Raised by [`LabelSpec::validate`](crate::params::LabelSpec::validate)
/// before any geometry is built; values are never silently corrected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A length or thickness that has to be strictly positive is not
    #[error("'{field}' must be greater than zero, got {value}")]
    NonPositive { field: &'static str, value: Real },

    /// A value outside its documented range
    #[error("'{field}' = {value} is out of range: {reason}")]
    OutOfRange {
        field: &'static str,
        value: Real,
        reason: String,
    },

    /// Only two and four magnet layouts exist
    #[error("magnet_count must be 2 or 4, got {0}")]
    InvalidMagnetCount(u32),

    #[error("unknown render mode '{0}' (expected all, color1 or color2)")]
    InvalidRenderMode(String),

    #[error("unknown icon type '{0}' (expected text, svg or none)")]
    InvalidIconType(String),

    /// A magnet cavity would break through the plate edge
    #[error(
        "magnet cavity (diameter {cavity_diameter}) does not fit: \
         magnet_inset {magnet_inset} leaves {clearance} mm to the plate edge"
    )]
    MagnetOutsidePlate {
        magnet_inset: Real,
        cavity_diameter: Real,
        clearance: Real,
    },

    /// Two magnet cavities intersect
    #[error(
        "magnet cavities overlap: centers are {spacing} mm apart, \
         cavity diameter is {cavity_diameter} mm"
    )]
    MagnetsOverlap { spacing: Real, cavity_diameter: Real },

    #[error("icon_type 'svg' requires icon_svg to name a file")]
    MissingIconSource,

    #[error("icon_type 'text' requires a non-empty icon_text")]
    EmptyIconText,
}

/// Geometry that cannot be materialized.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("extrusion thickness must be greater than zero, got {0}")]
    NonPositiveThickness(Real),

    /// A cut prism reaches outside the body it is subtracted from
    #[error("cut {index} is not contained in the body profile")]
    CutNotContained { index: usize },

    /// Two cut prisms overlap in both plan and height
    #[error("cuts {first} and {second} overlap")]
    CutsOverlap { first: usize, second: usize },

    #[error("profile is empty")]
    EmptyProfile,
}

/// Failures of the external geometry kernel (OpenSCAD).
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("OpenSCAD executable not found")]
    NotFound,

    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("expected output {0} was not produced")]
    MissingOutput(PathBuf),

    #[error("rendered output contains no geometry")]
    EmptyOutput,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Every error a label generation run can end with.
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("geometry error in {layer}: {source}")]
    Geometry {
        layer: &'static str,
        #[source]
        source: GeometryError,
    },

    #[error(transparent)]
    Io(#[from] IoError),

    #[error("render backend failed: {0}")]
    Backend(#[from] BackendError),

    /// The icon outline could not be loaded; the label is not emitted
    /// without it.
    #[error("icon source {path} could not be loaded: {source}")]
    IconLoad {
        path: PathBuf,
        #[source]
        source: IoError,
    },
}

impl LabelError {
    pub(crate) const fn geometry(layer: &'static str, source: GeometryError) -> Self {
        LabelError::Geometry { layer, source }
    }
}
