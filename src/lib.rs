//! Parametric **two-color magnetic labels** for multi-material 3D printing.
//!
//! A label is a rounded plate with embedded magnet cavities, a raised frame,
//! a contrasting inlay and raised text (plus an optional icon). Everything
//! is derived from one flat [`LabelSpec`]:
//!
//! ```text
//! LabelSpec ──validate──> compose_layers ──select_renderables(mode)──> backend
//!     ^                                                                │
//!     └── AutoSizer (text extent → label width / height)               └──> STL
//! ```
//!
//! The layers of a label fall into two color groups, so a full export is
//! two STL files sharing one origin: `color1` (base plate, frame, text,
//! icon) and `color2` (inlay).
//!
//! # Features
//! #### Default
//! - **svg-io**: SVG icons (`<path>`, `<polygon>`, `<polyline>`, `<rect>`, `<circle>`)
//! - **truetype-text**: glyph outlines from TrueType / OpenType fonts via `ttf-parser`
//! - **hashmap**: use hashbrown for `is_manifold`
//!
//! #### Optional
//! - **parallel**: render the two color groups concurrently with rayon

#![forbid(unsafe_code)]
#![warn(clippy::approx_constant, clippy::all)]

pub mod aabb;
pub mod backend;
pub mod errors;
pub mod export;
pub mod float_types;
pub mod fonts;
pub mod io;
pub mod layers;
pub mod magnets;
pub mod mesh;
pub mod openscad;
pub mod params;
pub mod selection;
pub mod sizing;
pub mod sketch;
pub mod triangulated;

pub use backend::{NativeBackend, OpenScadBackend, RenderBackend};
pub use errors::{BackendError, ConfigError, GeometryError, LabelError};
pub use export::{ExportPlan, export_label};
pub use layers::{ColorGroup, Layer, LayerKind, compose_layers};
pub use magnets::{MagnetCavity, magnet_cavities};
pub use mesh::Mesh;
pub use params::{IconType, LabelSpec, RenderMode};
pub use selection::{PreviewPalette, Renderable, select_renderables};
pub use sizing::{AutoSizer, Precision, SizingResult};
pub use sketch::Sketch;
