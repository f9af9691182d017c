//! The layer stack of a label.
//!
//! ```text
//!   z
//!   ^   +----+  text / icon  +----+
//!   |   |fr. |     inlay     | fr.|   <- frame: color1, inlay: color2
//!   |   +----+---------------+----+   <- base_thickness
//!   |   |     base plate          |
//!   |   |  (o)               (o)  |   <- magnet cavities, open below
//!   +---+-------------------------+---> x
//! ```

use crate::errors::{ConfigError, LabelError};
use crate::float_types::Real;
use crate::io::IoError;
use crate::magnets::magnet_cavities;
use crate::mesh::Prism;
use crate::params::{IconType, LabelSpec};
use crate::sketch::Sketch;
use geo::{Coord, Rect};
use nalgebra::Vector2;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Side length of the square an SVG icon without a `viewBox` is drawn in.
pub const ICON_NATIVE_SIZE: Real = 100.0;

/// The two print materials.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorGroup {
    /// Base plate, frame, text and icon.
    Color1,
    /// The inlay.
    Color2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    BasePlate,
    Frame,
    Inlay,
    Text,
    Icon,
}

impl LayerKind {
    pub const fn name(self) -> &'static str {
        match self {
            LayerKind::BasePlate => "base_plate",
            LayerKind::Frame => "frame",
            LayerKind::Inlay => "inlay",
            LayerKind::Text => "text",
            LayerKind::Icon => "icon",
        }
    }

    pub const fn color_group(self) -> ColorGroup {
        match self {
            LayerKind::Inlay => ColorGroup::Color2,
            LayerKind::BasePlate | LayerKind::Frame | LayerKind::Text | LayerKind::Icon => {
                ColorGroup::Color1
            },
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A line of text, centered on the bounding box of its glyphs and then
/// shifted by `offset`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Font name in `Family:style=Style` notation.
    pub font: String,
    /// Capital height in millimeters.
    pub size: Real,
    pub offset: Vector2<Real>,
}

/// What a layer looks like in plan; the layer supplies the height.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerShape {
    /// `profile` swept over the layer's thickness, minus `cuts`
    /// (absolute z).
    Prism { profile: Sketch, cuts: Vec<Prism> },
    /// Glyph outlines, resolved against a font when materialized.
    Text(TextRun),
    /// An imported outline, already scaled and positioned.
    Outline(Sketch),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    /// Height of the layer's bottom face.
    pub z_offset: Real,
    pub thickness: Real,
    pub shape: LayerShape,
}

impl Layer {
    pub const fn color_group(&self) -> ColorGroup {
        self.kind.color_group()
    }

    pub fn z_top(&self) -> Real {
        self.z_offset + self.thickness
    }
}

/// Build every layer of the label, bottom to top.
///
/// The parameter set is validated first, so configuration errors surface
/// before any geometry is made. The result depends on nothing but `spec`
/// (and, for SVG icons, the file it names).
pub fn compose_layers(spec: &LabelSpec) -> Result<Vec<Layer>, LabelError> {
    spec.validate()?;

    let segments = spec.curve_segments;
    let eps = spec.boolean_epsilon;
    let base_thickness = spec.base_thickness();

    let outer = Sketch::rounded_rectangle(
        spec.label_width,
        spec.label_height,
        spec.corner_radius,
        segments,
    );
    let inner = Sketch::rounded_rectangle(
        spec.inner_width(),
        spec.inner_height(),
        spec.inner_radius(),
        segments,
    );

    let cavities = magnet_cavities(spec)?;
    let mut layers = vec![
        Layer {
            kind: LayerKind::BasePlate,
            z_offset: 0.0,
            thickness: base_thickness,
            shape: LayerShape::Prism {
                profile: outer.clone(),
                cuts: cavities.iter().map(|c| c.to_prism(segments)).collect(),
            },
        },
        Layer {
            kind: LayerKind::Frame,
            z_offset: base_thickness,
            thickness: spec.frame_thickness(),
            shape: LayerShape::Prism {
                profile: outer,
                cuts: vec![Prism::new(
                    inner.clone(),
                    base_thickness - eps,
                    spec.total_thickness() + eps,
                )],
            },
        },
        Layer {
            kind: LayerKind::Inlay,
            z_offset: base_thickness,
            thickness: spec.inlay_thickness,
            shape: LayerShape::Prism {
                profile: inner,
                cuts: Vec::new(),
            },
        },
    ];

    let relief_z = base_thickness + spec.inlay_thickness;
    if !spec.label_text.trim().is_empty() {
        layers.push(Layer {
            kind: LayerKind::Text,
            z_offset: relief_z,
            thickness: spec.text_thickness,
            shape: LayerShape::Text(TextRun {
                text: spec.label_text.clone(),
                font: spec.font_name.clone(),
                size: spec.font_size,
                offset: Vector2::new(spec.text_offset_x, spec.text_offset_y),
            }),
        });
    }

    let icon_offset = Vector2::new(spec.icon_position_x, spec.icon_position_y);
    let icon_shape = match (spec.use_icon, spec.icon_type) {
        (true, IconType::Text) => Some(LayerShape::Text(TextRun {
            text: spec.icon_text.clone(),
            font: spec.icon_font.clone(),
            size: spec.icon_size,
            offset: icon_offset,
        })),
        (true, IconType::Svg) => {
            let path = spec.icon_svg.as_deref().ok_or(ConfigError::MissingIconSource)?;
            Some(LayerShape::Outline(load_icon(path, spec.icon_size, icon_offset, segments)?))
        },
        _ => None,
    };
    if let Some(shape) = icon_shape {
        layers.push(Layer {
            kind: LayerKind::Icon,
            z_offset: relief_z,
            thickness: spec.text_thickness,
            shape,
        });
    }

    for layer in &layers {
        debug!(
            layer = layer.kind.name(),
            z = layer.z_offset,
            thickness = layer.thickness,
            "composed layer"
        );
    }
    Ok(layers)
}

/// Read an SVG icon and fit its frame, the `viewBox` or else a
/// 100×100 square, into `size` millimeters centered on `offset`, with y
/// pointing up. The longer side of the frame spans `size`.
fn load_icon(
    path: &Path,
    size: Real,
    offset: Vector2<Real>,
    segments: usize,
) -> Result<Sketch, LabelError> {
    let (native, view_box) = read_svg(path, segments).map_err(|source| LabelError::IconLoad {
        path: path.to_path_buf(),
        source,
    })?;
    let frame = view_box.unwrap_or_else(|| {
        Rect::new(
            Coord { x: 0.0, y: 0.0 },
            Coord {
                x: ICON_NATIVE_SIZE,
                y: ICON_NATIVE_SIZE,
            },
        )
    });
    let s = size / frame.width().max(frame.height());
    let center = frame.center();
    Ok(native.map_points(|c| Coord {
        x: (c.x - center.x) * s + offset.x,
        y: (center.y - c.y) * s + offset.y,
    }))
}

#[cfg(feature = "svg-io")]
fn read_svg(path: &Path, segments: usize) -> Result<(Sketch, Option<Rect<Real>>), IoError> {
    let drawing = crate::sketch::svg::read_svg(path, segments)?;
    Ok((drawing.sketch, drawing.view_box))
}

#[cfg(not(feature = "svg-io"))]
fn read_svg(_path: &Path, _segments: usize) -> Result<(Sketch, Option<Rect<Real>>), IoError> {
    Err(IoError::Unimplemented(
        "SVG icons need the `svg-io` feature".to_string(),
    ))
}
