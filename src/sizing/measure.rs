//! Text extent measurers, from exact to rough.

use crate::errors::{BackendError, LabelError};
use crate::float_types::Real;
use crate::fonts::FontLibrary;
use crate::io::stl::stl_extent;
use crate::openscad::{OpenScad, string_literal};
use crate::sizing::Precision;

/// Width per character relative to the font size, for a bold sans serif.
pub const CHAR_WIDTH_FACTOR: Real = 0.87;

/// Width and height of a rendered line of text, in millimeters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextExtent {
    pub width: Real,
    pub height: Real,
}

/// One tier of the measurement chain.
pub trait TextMeasurer: Send + Sync {
    /// Short name reported on the sizing result.
    fn name(&self) -> &'static str;

    fn precision(&self) -> Precision;

    /// Extent of `text` set in `font` at `size` millimeters.
    fn measure(&self, text: &str, font: &str, size: Real) -> Result<TextExtent, LabelError>;
}

/// Renders the text with OpenSCAD and takes the bounding box of the mesh.
#[derive(Clone, Debug)]
pub struct OpenScadMeasurer {
    openscad: OpenScad,
}

impl OpenScadMeasurer {
    pub fn new(openscad: OpenScad) -> Self {
        OpenScadMeasurer { openscad }
    }

    fn source(text: &str, font: &str, size: Real) -> String {
        format!(
            "linear_extrude(1)\n    \
             text({}, size={size}, font={}, halign=\"left\", valign=\"baseline\");\n",
            string_literal(text),
            string_literal(font),
        )
    }
}

impl TextMeasurer for OpenScadMeasurer {
    fn name(&self) -> &'static str {
        "openscad"
    }

    fn precision(&self) -> Precision {
        Precision::Exact
    }

    fn measure(&self, text: &str, font: &str, size: Real) -> Result<TextExtent, LabelError> {
        let workdir = tempfile::Builder::new()
            .prefix("magnetic-label-measure")
            .tempdir()
            .map_err(BackendError::from)?;
        let stl = workdir.path().join("text.stl");
        self.openscad.render(&Self::source(text, font, size), &stl)?;

        let mut file = std::fs::File::open(&stl).map_err(BackendError::from)?;
        let extent = stl_extent(&mut file).map_err(BackendError::from)?;
        let [min_x, min_y, _, max_x, max_y, _] = extent.ok_or(BackendError::EmptyOutput)?;
        Ok(TextExtent {
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

/// Lays the text out with the same glyph outlines the native renderer uses.
#[derive(Clone, Debug, Default)]
pub struct FontMetricsMeasurer {
    fonts: FontLibrary,
    segments: usize,
}

impl FontMetricsMeasurer {
    pub fn new(fonts: FontLibrary, segments: usize) -> Self {
        FontMetricsMeasurer { fonts, segments }
    }
}

impl TextMeasurer for FontMetricsMeasurer {
    fn name(&self) -> &'static str {
        "font-metrics"
    }

    fn precision(&self) -> Precision {
        Precision::Approximate
    }

    #[cfg(feature = "truetype-text")]
    fn measure(&self, text: &str, font: &str, size: Real) -> Result<TextExtent, LabelError> {
        use crate::io::IoError;
        use crate::sketch::Sketch;

        let font = self.fonts.load(font)?;
        let glyphs = Sketch::text(text, &font, size, self.segments.max(8))?;
        let rect = glyphs
            .bounding_rect()
            .ok_or_else(|| IoError::MalformedInput(format!("'{text}' has no glyph outlines")))?;
        Ok(TextExtent {
            width: rect.width(),
            height: rect.height(),
        })
    }

    #[cfg(not(feature = "truetype-text"))]
    fn measure(&self, _text: &str, _font: &str, _size: Real) -> Result<TextExtent, LabelError> {
        let _ = (&self.fonts, self.segments);
        Err(crate::io::IoError::Unimplemented(
            "font metrics need the `truetype-text` feature".to_string(),
        )
        .into())
    }
}

/// `chars × 0.87 × size` wide and `size` high; never fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct CharCountEstimate;

impl CharCountEstimate {
    pub fn estimate(text: &str, size: Real) -> TextExtent {
        TextExtent {
            width: text.chars().count() as Real * CHAR_WIDTH_FACTOR * size,
            height: size,
        }
    }
}

impl TextMeasurer for CharCountEstimate {
    fn name(&self) -> &'static str {
        "char-count"
    }

    fn precision(&self) -> Precision {
        Precision::Rough
    }

    fn measure(&self, text: &str, _font: &str, size: Real) -> Result<TextExtent, LabelError> {
        Ok(Self::estimate(text, size))
    }
}
