//! The label parameter set.
//!
//! Every field has a default, so a TOML file only needs the values that
//! differ. Thicknesses of the base and the whole label are derived, never
//! stored.

use crate::errors::ConfigError;
use crate::float_types::{DEFAULT_BOOLEAN_EPSILON, EPSILON, FRAC_PI_4, Real};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which part of the label to materialize.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Both color groups, tagged with their preview colors.
    #[default]
    All,
    /// Base plate, frame, text and icon.
    Color1,
    /// The inlay.
    Color2,
}

impl RenderMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            RenderMode::All => "all",
            RenderMode::Color1 => "color1",
            RenderMode::Color2 => "color2",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(RenderMode::All),
            "color1" => Ok(RenderMode::Color1),
            "color2" => Ok(RenderMode::Color2),
            _ => Err(ConfigError::InvalidRenderMode(s.to_string())),
        }
    }
}

/// Where the icon outline comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconType {
    /// A glyph (e.g. from a symbol font) rendered like the label text.
    Text,
    /// An SVG drawing authored in a 100×100 unit square.
    Svg,
    #[default]
    None,
}

impl FromStr for IconType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(IconType::Text),
            "svg" => Ok(IconType::Svg),
            "none" => Ok(IconType::None),
            _ => Err(ConfigError::InvalidIconType(s.to_string())),
        }
    }
}

/// Magnet placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MagnetLayout {
    /// One magnet near each short edge, on the horizontal center line.
    Two,
    /// One magnet near each corner.
    Four,
}

/// All geometry parameters of one label, in millimeters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSpec {
    // Dimensions
    pub label_width: Real,
    pub label_height: Real,
    pub corner_radius: Real,
    pub border_width: Real,

    // Magnets
    pub magnet_diameter: Real,
    pub magnet_height: Real,
    /// Added to the diameter, so the radial clearance is half of it.
    pub magnet_tolerance: Real,
    pub magnet_count: u32,
    /// Distance from the plate edge to the magnet center.
    pub magnet_inset: Real,

    // Layers
    pub min_base_under_magnet: Real,
    pub inlay_thickness: Real,
    pub text_thickness: Real,

    // Text
    pub label_text: String,
    pub font_name: String,
    pub font_size: Real,
    pub text_offset_x: Real,
    pub text_offset_y: Real,

    // Icon
    pub use_icon: bool,
    pub icon_type: IconType,
    pub icon_text: String,
    pub icon_font: String,
    pub icon_svg: Option<PathBuf>,
    pub icon_size: Real,
    pub icon_position_x: Real,
    pub icon_position_y: Real,

    // Presentation
    pub render_mode: RenderMode,
    pub preview_color1: String,
    pub preview_color2: String,

    /// Segments of a full circle; affects smoothness only.
    pub curve_segments: usize,
    /// How far boolean cuts reach past the faces they open.
    pub boolean_epsilon: Real,
}

impl Default for LabelSpec {
    fn default() -> Self {
        LabelSpec {
            label_width: 60.0,
            label_height: 25.0,
            corner_radius: 8.0,
            border_width: 2.0,

            magnet_diameter: 6.0,
            magnet_height: 3.0,
            magnet_tolerance: 0.2,
            magnet_count: 2,
            magnet_inset: 10.0,

            min_base_under_magnet: 0.6,
            inlay_thickness: 0.6,
            text_thickness: 0.8,

            label_text: "ASA".to_string(),
            font_name: "Arial:style=Bold".to_string(),
            font_size: 12.0,
            text_offset_x: 0.0,
            text_offset_y: 0.0,

            use_icon: false,
            icon_type: IconType::None,
            icon_text: String::new(),
            icon_font: "Arial:style=Bold".to_string(),
            icon_svg: None,
            icon_size: 10.0,
            icon_position_x: -20.0,
            icon_position_y: 0.0,

            render_mode: RenderMode::All,
            preview_color1: "Black".to_string(),
            preview_color2: "White".to_string(),

            curve_segments: 64,
            boolean_epsilon: DEFAULT_BOOLEAN_EPSILON,
        }
    }
}

impl LabelSpec {
    /// Parse a TOML document; absent fields keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&source).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Thickness of the plate holding the magnets.
    pub fn base_thickness(&self) -> Real {
        self.magnet_height + self.min_base_under_magnet
    }

    /// Height of the finished label.
    pub fn total_thickness(&self) -> Real {
        self.base_thickness() + self.inlay_thickness + self.text_thickness
    }

    /// Height of the frame above the base plate.
    pub fn frame_thickness(&self) -> Real {
        self.inlay_thickness + self.text_thickness
    }

    pub fn inner_width(&self) -> Real {
        self.label_width - 2.0 * self.border_width
    }

    pub fn inner_height(&self) -> Real {
        self.label_height - 2.0 * self.border_width
    }

    /// Corner radius of the frame opening and the inlay.
    pub fn inner_radius(&self) -> Real {
        (self.corner_radius - self.border_width).max(0.0)
    }

    /// Corner radius of the plate as drawn, at most half the shorter side.
    pub fn outer_radius(&self) -> Real {
        self.corner_radius
            .min(0.5 * self.label_width)
            .min(0.5 * self.label_height)
            .max(0.0)
    }

    pub fn cavity_diameter(&self) -> Real {
        self.magnet_diameter + self.magnet_tolerance
    }

    pub fn magnet_layout(&self) -> Result<MagnetLayout, ConfigError> {
        match self.magnet_count {
            2 => Ok(MagnetLayout::Two),
            4 => Ok(MagnetLayout::Four),
            n => Err(ConfigError::InvalidMagnetCount(n)),
        }
    }

    /// Whether an icon layer is part of the label.
    pub fn has_icon(&self) -> bool {
        self.use_icon && self.icon_type != IconType::None
    }

    /// Reject every parameter combination that cannot be printed.
    ///
    /// Nothing is corrected here; the only value adjusted anywhere is the
    /// corner radius, which the profile builder caps at half the shorter
    /// side.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("label_width", self.label_width),
            ("label_height", self.label_height),
            ("border_width", self.border_width),
            ("magnet_diameter", self.magnet_diameter),
            ("magnet_height", self.magnet_height),
            ("min_base_under_magnet", self.min_base_under_magnet),
            ("inlay_thickness", self.inlay_thickness),
            ("text_thickness", self.text_thickness),
            ("font_size", self.font_size),
            ("boolean_epsilon", self.boolean_epsilon),
        ];
        for (field, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        let non_negative = [
            ("corner_radius", self.corner_radius),
            ("magnet_tolerance", self.magnet_tolerance),
            ("magnet_inset", self.magnet_inset),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    reason: "must be zero or greater".to_string(),
                });
            }
        }

        if self.inner_width() <= 0.0 || self.inner_height() <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "border_width",
                value: self.border_width,
                reason: format!(
                    "leaves no opening in a {} x {} label",
                    self.label_width, self.label_height
                ),
            });
        }

        if self.curve_segments < 3 {
            return Err(ConfigError::OutOfRange {
                field: "curve_segments",
                value: self.curve_segments as Real,
                reason: "a circle needs at least 3 segments".to_string(),
            });
        }

        self.validate_magnets()?;

        if self.has_icon() && !(self.icon_size > 0.0) {
            return Err(ConfigError::NonPositive {
                field: "icon_size",
                value: self.icon_size,
            });
        }
        if self.has_icon() {
            match self.icon_type {
                IconType::Svg if self.icon_svg.is_none() => {
                    return Err(ConfigError::MissingIconSource);
                },
                IconType::Text if self.icon_text.is_empty() => {
                    return Err(ConfigError::EmptyIconText);
                },
                _ => {},
            }
        }
        Ok(())
    }

    fn validate_magnets(&self) -> Result<(), ConfigError> {
        let layout = self.magnet_layout()?;
        let diameter = self.cavity_diameter();
        let radius = 0.5 * diameter;

        // the nearest plate edge sits magnet_inset from each cavity center,
        // or half the height for magnets on the center line
        let nearest_edge = match layout {
            MagnetLayout::Two => self.magnet_inset.min(0.5 * self.label_height),
            MagnetLayout::Four => self.magnet_inset,
        };
        let clearance = nearest_edge - radius;
        if clearance < 0.0 {
            return Err(ConfigError::MagnetOutsidePlate {
                magnet_inset: self.magnet_inset,
                cavity_diameter: diameter,
                clearance,
            });
        }

        let corner = self.corner_clearance(layout, radius).filter(|c| *c < 0.0);
        if let Some(clearance) = corner {
            return Err(ConfigError::MagnetOutsidePlate {
                magnet_inset: self.magnet_inset,
                cavity_diameter: diameter,
                clearance,
            });
        }

        let x_spacing = self.label_width - 2.0 * self.magnet_inset;
        let spacing = match layout {
            MagnetLayout::Two => x_spacing,
            MagnetLayout::Four => x_spacing.min(self.label_height - 2.0 * self.magnet_inset),
        };
        if spacing <= diameter {
            return Err(ConfigError::MagnetsOverlap {
                spacing,
                cavity_diameter: diameter,
            });
        }
        Ok(())
    }

    /// Clearance between a cavity and the rounded corner of the plate, when
    /// the cavity center lies in the corner region beyond the arc center.
    ///
    /// Measured against the flattened arc, whose edges cut inside the true
    /// arc by up to `r·(1 − cos(step/2))`.
    fn corner_clearance(&self, layout: MagnetLayout, cavity_radius: Real) -> Option<Real> {
        let r = self.outer_radius();
        if r <= EPSILON {
            return None;
        }
        let arc_x = 0.5 * self.label_width - r;
        let arc_y = 0.5 * self.label_height - r;
        let x = 0.5 * self.label_width - self.magnet_inset;
        let y = match layout {
            MagnetLayout::Two => 0.0,
            MagnetLayout::Four => 0.5 * self.label_height - self.magnet_inset,
        };
        if x < arc_x || y < arc_y {
            return None;
        }
        let corner_segments = (self.curve_segments / 4).max(1) as Real;
        let flattened = r * (FRAC_PI_4 / corner_segments).cos();
        Some(flattened - (x - arc_x).hypot(y - arc_y) - cavity_radius)
    }
}
