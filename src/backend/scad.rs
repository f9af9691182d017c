//! Rendering through OpenSCAD.
//!
//! The composed layers are written out as OpenSCAD source (`polygon` +
//! `linear_extrude` for profiles, `text()` for glyph runs) and handed to
//! `openscad -o`. In `all` mode each layer is wrapped in `color()`.

use crate::backend::{RenderBackend, RenderedFile};
use crate::errors::LabelError;
use crate::float_types::Real;
use crate::layers::{Layer, LayerShape, compose_layers};
use crate::mesh::Prism;
use crate::openscad::{OpenScad, string_literal};
use crate::params::{LabelSpec, RenderMode};
use crate::selection::{PreviewPalette, Renderable, select_renderables};
use crate::sketch::Sketch;
use geo::LineString;
use std::fmt::Write;
use std::path::Path;
use tracing::info;

pub struct OpenScadBackend {
    openscad: OpenScad,
}

impl OpenScadBackend {
    pub fn new(openscad: OpenScad) -> Self {
        OpenScadBackend { openscad }
    }

    pub fn openscad(&self) -> &OpenScad {
        &self.openscad
    }
}

impl RenderBackend for OpenScadBackend {
    fn name(&self) -> &'static str {
        "openscad"
    }

    fn render(
        &self,
        spec: &LabelSpec,
        mode: RenderMode,
        output: &Path,
    ) -> Result<RenderedFile, LabelError> {
        let source = scad_source(spec, mode)?;
        self.openscad.render(&source, output)?;
        let file = RenderedFile::stat(output, mode)?;
        info!(mode = %mode, path = %output.display(), bytes = file.bytes, "wrote STL");
        Ok(file)
    }
}

/// OpenSCAD program for the layers `mode` selects.
pub fn scad_source(spec: &LabelSpec, mode: RenderMode) -> Result<String, LabelError> {
    let layers = compose_layers(spec)?;
    let palette = PreviewPalette::from_spec(spec);
    let selected = select_renderables(&layers, mode, &palette);

    let mut out = String::new();
    // writing into a String cannot fail
    let _ = writeln!(out, "// magnetic label, render_mode = {mode}");
    let _ = writeln!(out, "$fn = {};", spec.curve_segments);
    for renderable in &selected {
        emit_renderable(&mut out, renderable);
    }
    Ok(out)
}

fn emit_renderable(out: &mut String, renderable: &Renderable<'_>) {
    let layer = renderable.layer;
    let _ = writeln!(out, "\n// {}", layer.kind);
    match renderable.color {
        Some(color) => {
            let _ = writeln!(out, "color({}) {{", string_literal(color));
            emit_layer(out, layer, 1);
            out.push_str("}\n");
        },
        None => emit_layer(out, layer, 0),
    }
}

fn emit_layer(out: &mut String, layer: &Layer, depth: usize) {
    let pad = "    ".repeat(depth);
    match &layer.shape {
        LayerShape::Prism { profile, cuts } if cuts.is_empty() => {
            emit_prism(out, &Prism::new(profile.clone(), layer.z_offset, layer.z_top()), depth);
        },
        LayerShape::Prism { profile, cuts } => {
            let _ = writeln!(out, "{pad}difference() {{");
            emit_prism(out, &Prism::new(profile.clone(), layer.z_offset, layer.z_top()), depth + 1);
            for cut in cuts {
                emit_prism(out, cut, depth + 1);
            }
            let _ = writeln!(out, "{pad}}}");
        },
        LayerShape::Text(run) => {
            let _ = writeln!(
                out,
                "{pad}translate([{}, {}, {}]) linear_extrude(height = {}) \
                 text({}, size = {}, font = {}, halign = \"center\", valign = \"center\");",
                num(run.offset.x),
                num(run.offset.y),
                num(layer.z_offset),
                num(layer.thickness),
                string_literal(&run.text),
                num(run.size),
                string_literal(&run.font),
            );
        },
        LayerShape::Outline(outline) => {
            emit_prism(out, &Prism::new(outline.clone(), layer.z_offset, layer.z_top()), depth);
        },
    }
}

fn emit_prism(out: &mut String, prism: &Prism, depth: usize) {
    let pad = "    ".repeat(depth);
    let _ = writeln!(
        out,
        "{pad}translate([0, 0, {}]) linear_extrude(height = {}) {};",
        num(prism.z_min),
        num(prism.height()),
        polygon(&prism.sketch),
    );
}

/// `polygon(points, paths)` with every ring of `sketch`; holes become
/// extra paths, which OpenSCAD subtracts by even-odd nesting.
fn polygon(sketch: &Sketch) -> String {
    let mut points = Vec::new();
    let mut paths = Vec::new();
    for poly in &sketch.geometry.0 {
        for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
            let start = points.len();
            points.extend(open_ring(ring).iter().map(|c| format!("[{}, {}]", num(c.x), num(c.y))));
            let indices: Vec<String> = (start..points.len()).map(|i| i.to_string()).collect();
            paths.push(format!("[{}]", indices.join(", ")));
        }
    }
    format!("polygon(points = [{}], paths = [{}])", points.join(", "), paths.join(", "))
}

fn open_ring(ring: &LineString<Real>) -> &[geo::Coord<Real>] {
    let coords = ring.0.as_slice();
    match coords {
        [first, .., last] if ring.is_closed() && first == last => &coords[..coords.len() - 1],
        _ => coords,
    }
}

/// Shortest decimal form, at most six fractional digits.
fn num(value: Real) -> String {
    let s = format!("{value:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}
