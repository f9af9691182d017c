//! Label dimensions from the extent of the label text.
//!
//! The text is measured once, by the first measurer in the chain that
//! succeeds; a [`CharCountEstimate`] closes every chain, so sizing always
//! produces positive dimensions. The result is a proposal: it changes a
//! [`LabelSpec`] only through [`SizingResult::apply_to`].

pub mod measure;

pub use measure::{
    CharCountEstimate, FontMetricsMeasurer, OpenScadMeasurer, TextExtent, TextMeasurer,
};

use crate::float_types::Real;
use crate::fonts::FontLibrary;
use crate::openscad::OpenScad;
use crate::params::{LabelSpec, MagnetLayout};
use std::fmt;
use tracing::{debug, warn};

/// How the text extent behind a sizing result was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Precision {
    /// Rendered by the geometry kernel.
    Exact,
    /// Laid out from local font metrics.
    Approximate,
    /// Estimated from the character count.
    Rough,
    /// No text to measure; the declared default dimensions.
    Default,
}

impl Precision {
    pub const fn as_str(self) -> &'static str {
        match self {
            Precision::Exact => "exact",
            Precision::Approximate => "approximate",
            Precision::Rough => "rough",
            Precision::Default => "default",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layout constants of the sizing rule, in millimeters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizingOptions {
    /// Space between the frame opening and the content, on every side.
    pub padding: Real,
    pub min_width: Real,
    pub min_height: Real,
    /// Dimensions used when there is no text to measure.
    pub default_width: Real,
    pub default_height: Real,
}

impl Default for SizingOptions {
    fn default() -> Self {
        let defaults = LabelSpec::default();
        SizingOptions {
            padding: 4.0,
            min_width: 30.0,
            min_height: 15.0,
            default_width: defaults.label_width,
            default_height: defaults.label_height,
        }
    }
}

/// A proposed label size and the measurement it rests on.
#[derive(Clone, Debug, PartialEq)]
pub struct SizingResult {
    pub text_width: Real,
    pub text_height: Real,
    pub font_size: Real,
    pub label_width: Real,
    pub label_height: Real,
    pub precision: Precision,
    /// Name of the measurer that produced the extent.
    pub measurer: String,
}

impl SizingResult {
    /// Whether the extent came from anything but the geometry kernel.
    pub fn is_degraded(&self) -> bool {
        self.precision != Precision::Exact
    }

    /// A copy of `spec` with the proposed width and height.
    pub fn apply_to(&self, spec: &LabelSpec) -> LabelSpec {
        LabelSpec {
            label_width: self.label_width,
            label_height: self.label_height,
            font_size: self.font_size,
            ..spec.clone()
        }
    }
}

/// Measures label text through a chain of [`TextMeasurer`]s and derives
/// the smallest comfortable label.
pub struct AutoSizer {
    measurers: Vec<Box<dyn TextMeasurer>>,
    options: SizingOptions,
}

impl Default for AutoSizer {
    fn default() -> Self {
        Self::new(SizingOptions::default())
    }
}

impl fmt::Debug for AutoSizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoSizer")
            .field("measurers", &self.measurers.iter().map(|m| m.name()).collect::<Vec<_>>())
            .field("options", &self.options)
            .finish()
    }
}

impl AutoSizer {
    /// A sizer with an empty chain; only the character count estimate runs.
    pub fn new(options: SizingOptions) -> Self {
        AutoSizer {
            measurers: Vec::new(),
            options,
        }
    }

    /// OpenSCAD when available, then font metrics, then the estimate.
    pub fn standard(openscad: Option<OpenScad>, fonts: FontLibrary, segments: usize) -> Self {
        let sizer = Self::default();
        let sizer = match openscad {
            Some(openscad) => sizer.with_measurer(OpenScadMeasurer::new(openscad)),
            None => sizer,
        };
        sizer.with_measurer(FontMetricsMeasurer::new(fonts, segments))
    }

    /// Append `measurer` to the chain.
    pub fn with_measurer(mut self, measurer: impl TextMeasurer + 'static) -> Self {
        self.measurers.push(Box::new(measurer));
        self
    }

    pub fn options(&self) -> &SizingOptions {
        &self.options
    }

    /// Measure `spec.label_text` and propose a label size for it.
    pub fn size(&self, spec: &LabelSpec) -> SizingResult {
        let text = spec.label_text.as_str();
        if text.trim().is_empty() {
            warn!("no label text to measure, keeping the default dimensions");
            return SizingResult {
                text_width: 0.0,
                text_height: 0.0,
                font_size: spec.font_size,
                label_width: self.options.default_width,
                label_height: self.options.default_height,
                precision: Precision::Default,
                measurer: "none".to_string(),
            };
        }

        let (extent, precision, measurer) = self.measure(text, &spec.font_name, spec.font_size);
        if precision != Precision::Exact {
            warn!(
                measurer,
                precision = precision.as_str(),
                "text extent is not exact, label size is an estimate"
            );
        }

        let (label_width, label_height) = self.dimensions(spec, extent);
        debug!(
            text_width = extent.width,
            text_height = extent.height,
            label_width,
            label_height,
            "sized label"
        );
        SizingResult {
            text_width: extent.width,
            text_height: extent.height,
            font_size: spec.font_size,
            label_width,
            label_height,
            precision,
            measurer: measurer.to_string(),
        }
    }

    fn measure(&self, text: &str, font: &str, size: Real) -> (TextExtent, Precision, &'static str) {
        for measurer in &self.measurers {
            match measurer.measure(text, font, size) {
                Ok(extent) if extent.width > 0.0 && extent.height > 0.0 => {
                    return (extent, measurer.precision(), measurer.name());
                },
                Ok(extent) => {
                    debug!(
                        measurer = measurer.name(),
                        ?extent,
                        "measurement is empty, trying next"
                    );
                },
                Err(e) => {
                    debug!(
                        measurer = measurer.name(),
                        error = %e,
                        "measurement failed, trying next"
                    );
                },
            }
        }
        let fallback = CharCountEstimate;
        (CharCountEstimate::estimate(text, size), fallback.precision(), fallback.name())
    }

    /// Label width and height around `extent`.
    ///
    /// Content sizes are rounded to whole millimeters. Magnet spacing must
    /// exceed the cavity diameter, so that bound is raised to the next whole
    /// millimeter strictly above it; the other bounds are rounded up.
    pub fn dimensions(&self, spec: &LabelSpec, extent: TextExtent) -> (Real, Real) {
        let o = &self.options;
        let icon = spec.has_icon();

        let mut content_width = extent.width + 2.0 * o.padding;
        if icon {
            content_width += spec.icon_size + o.padding;
        }
        let glyph_height = if icon {
            spec.font_size.max(spec.icon_size)
        } else {
            spec.font_size
        };
        let content_height = glyph_height + 2.0 * o.padding;

        let cavity = spec.cavity_diameter();
        let magnet_span = strictly_above(2.0 * spec.magnet_inset + cavity);
        let width = (content_width + 2.0 * spec.border_width)
            .round()
            .max(magnet_span)
            .max(o.min_width.ceil());
        let height = (content_height + 2.0 * spec.border_width)
            .round()
            .max(o.min_height.ceil());
        let height = match spec.magnet_layout() {
            Ok(MagnetLayout::Four) => height.max(magnet_span),
            // centered on the middle line, the cavity needs the full height
            _ => height.max(cavity.ceil()),
        };
        (width, height)
    }
}

/// Smallest whole number greater than `bound`.
fn strictly_above(bound: Real) -> Real {
    bound.floor() + 1.0
}
