//! Which layers a render mode materializes.

use crate::layers::{ColorGroup, Layer};
use crate::params::{LabelSpec, RenderMode};

/// Display colors for the `all` preview; they never change geometry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewPalette {
    pub color1: String,
    pub color2: String,
}

impl PreviewPalette {
    pub fn new(color1: impl Into<String>, color2: impl Into<String>) -> Self {
        PreviewPalette {
            color1: color1.into(),
            color2: color2.into(),
        }
    }

    pub fn from_spec(spec: &LabelSpec) -> Self {
        Self::new(spec.preview_color1.clone(), spec.preview_color2.clone())
    }

    pub fn color_of(&self, group: ColorGroup) -> &str {
        match group {
            ColorGroup::Color1 => &self.color1,
            ColorGroup::Color2 => &self.color2,
        }
    }
}

/// A layer chosen for output, with its preview color in `all` mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Renderable<'a> {
    pub layer: &'a Layer,
    pub color: Option<&'a str>,
}

/// The layers `mode` emits, in stacking order.
///
/// `all` returns every layer tagged with its group's preview color; the
/// export modes return one color group, untagged.
pub fn select_renderables<'a>(
    layers: &'a [Layer],
    mode: RenderMode,
    palette: &'a PreviewPalette,
) -> Vec<Renderable<'a>> {
    let wanted = match mode {
        RenderMode::All => None,
        RenderMode::Color1 => Some(ColorGroup::Color1),
        RenderMode::Color2 => Some(ColorGroup::Color2),
    };
    layers
        .iter()
        .filter_map(|layer| match wanted {
            None => Some(Renderable {
                layer,
                color: Some(palette.color_of(layer.color_group())),
            }),
            Some(group) if layer.color_group() == group => Some(Renderable { layer, color: None }),
            Some(_) => None,
        })
        .collect()
}
