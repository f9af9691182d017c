//! In-process rendering to binary STL.

use crate::backend::{RenderBackend, RenderedFile};
use crate::errors::LabelError;
use crate::fonts::FontLibrary;
use crate::layers::{Layer, LayerShape, TextRun, compose_layers};
use crate::mesh::{Mesh, Prism};
use crate::params::{LabelSpec, RenderMode};
use crate::selection::{PreviewPalette, select_renderables};
use crate::sketch::Sketch;
use std::path::Path;
use tracing::{debug, info};

/// Builds every mesh itself; needs no external programs.
#[derive(Clone, Debug, Default)]
pub struct NativeBackend {
    fonts: FontLibrary,
}

impl NativeBackend {
    pub fn new(fonts: FontLibrary) -> Self {
        NativeBackend { fonts }
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    /// One mesh per selected layer, in stacking order.
    pub fn layer_meshes(
        &self,
        spec: &LabelSpec,
        mode: RenderMode,
    ) -> Result<Vec<(Layer, Mesh)>, LabelError> {
        let layers = compose_layers(spec)?;
        let palette = PreviewPalette::from_spec(spec);
        select_renderables(&layers, mode, &palette)
            .into_iter()
            .map(|r| -> Result<(Layer, Mesh), LabelError> {
                let mesh = self.materialize(r.layer, spec.curve_segments)?;
                Ok((r.layer.clone(), mesh))
            })
            .collect()
    }

    /// All layers selected by `mode` in a single mesh.
    ///
    /// The layers are not merged: the result holds one closed shell per
    /// layer, and stacked layers touch on coplanar faces (the frame sits on
    /// the base plate, text on the inlay). Slicers read such a file as one
    /// body.
    pub fn mesh(&self, spec: &LabelSpec, mode: RenderMode) -> Result<Mesh, LabelError> {
        let mut combined = Mesh::new();
        for (_, mesh) in self.layer_meshes(spec, mode)? {
            combined.append(mesh);
        }
        Ok(combined)
    }

    /// Closed mesh of one layer in label coordinates.
    pub fn materialize(&self, layer: &Layer, segments: usize) -> Result<Mesh, LabelError> {
        let name = layer.kind.name();
        let mesh = match &layer.shape {
            LayerShape::Prism { profile, cuts } => {
                let body = Prism::new(profile.clone(), layer.z_offset, layer.z_top());
                Mesh::prism_with_cuts(&body, cuts).map_err(|e| LabelError::geometry(name, e))?
            },
            LayerShape::Text(run) => match self.glyphs(run, segments)? {
                Some(outline) => extrude_at(&outline, layer)?,
                None => Mesh::new(),
            },
            LayerShape::Outline(outline) => extrude_at(outline, layer)?,
        };

        check_closed(&mesh, name);
        debug!(layer = name, triangles = mesh.triangle_count(), "materialized layer");
        Ok(mesh)
    }

    /// Glyph outlines of `run`, centered on their bounding box and shifted
    /// by the run's offset. `None` when the text has no visible glyphs.
    #[cfg(feature = "truetype-text")]
    fn glyphs(&self, run: &TextRun, segments: usize) -> Result<Option<Sketch>, LabelError> {
        let font = self.fonts.load(&run.font)?;
        let glyphs = Sketch::text(&run.text, &font, run.size, segments)?;
        if glyphs.is_empty() {
            return Ok(None);
        }
        Ok(Some(glyphs.center().translate(run.offset.x, run.offset.y)))
    }

    #[cfg(not(feature = "truetype-text"))]
    fn glyphs(&self, _run: &TextRun, _segments: usize) -> Result<Option<Sketch>, LabelError> {
        Err(crate::io::IoError::Unimplemented(
            "text layers need the `truetype-text` feature".to_string(),
        )
        .into())
    }
}

#[cfg(feature = "hashmap")]
fn check_closed(mesh: &Mesh, layer: &str) {
    if !mesh.is_empty() && !mesh.is_manifold() {
        tracing::warn!(layer, "mesh has open or shared edges");
    }
}

#[cfg(not(feature = "hashmap"))]
fn check_closed(_mesh: &Mesh, _layer: &str) {}

fn extrude_at(outline: &Sketch, layer: &Layer) -> Result<Mesh, LabelError> {
    let body = Prism::new(outline.clone(), layer.z_offset, layer.z_top());
    Mesh::prism_with_cuts(&body, &[]).map_err(|e| LabelError::geometry(layer.kind.name(), e))
}

impl RenderBackend for NativeBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn render(
        &self,
        spec: &LabelSpec,
        mode: RenderMode,
        output: &Path,
    ) -> Result<RenderedFile, LabelError> {
        let mesh = self.mesh(spec, mode)?;
        let name = format!("label_{mode}");
        let bytes = mesh.to_stl_binary(&name).map_err(crate::io::IoError::from)?;
        std::fs::write(output, bytes).map_err(crate::io::IoError::from)?;
        let file = RenderedFile::stat(output, mode)?;
        info!(
            mode = %mode,
            path = %output.display(),
            triangles = mesh.triangle_count(),
            "wrote STL"
        );
        Ok(file)
    }
}
