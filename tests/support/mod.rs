//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use magnetic_label::{
    LabelSpec, Mesh,
    float_types::Real,
    layers::{Layer, LayerKind},
};
use std::path::PathBuf;

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// `[min_x, min_y, min_z, max_x, max_y, max_z]` of a mesh.
pub fn bounding_box(mesh: &Mesh) -> [Real; 6] {
    let bb = mesh.bounding_box().expect("mesh is not empty");
    [bb.mins.x, bb.mins.y, bb.mins.z, bb.maxs.x, bb.maxs.y, bb.maxs.z]
}

/// Default parameters without label text, so nothing needs a font.
pub fn textless_spec() -> LabelSpec {
    LabelSpec {
        label_text: String::new(),
        ..LabelSpec::default()
    }
}

pub fn layer(layers: &[Layer], kind: LayerKind) -> &Layer {
    layers
        .iter()
        .find(|l| l.kind == kind)
        .unwrap_or_else(|| panic!("no {kind} layer"))
}

pub fn kinds(layers: &[Layer]) -> Vec<LayerKind> {
    layers.iter().map(|l| l.kind).collect()
}

/// Some installed TrueType font, or `None` when the machine has none.
pub fn system_font() -> Option<PathBuf> {
    ["Liberation Sans:style=Bold", "DejaVu Sans:style=Bold", "Arial:style=Bold", "Helvetica"]
        .iter()
        .find_map(|name| magnetic_label::fonts::find_font(name))
}

/// Write `content` into a fresh temporary file named `name`.
pub fn temp_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write temp file");
    path
}
