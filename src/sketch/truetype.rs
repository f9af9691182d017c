//! Glyph outlines from TrueType / OpenType fonts.
//!
//! Text is laid out on a single baseline from left to right using the
//! horizontal advances of the font. There is no kerning and no shaping.

use crate::float_types::Real;
use crate::io::IoError;
use crate::sketch::Sketch;
use geo::{Coord, LineString};
use std::path::Path;
use ttf_parser::{Face, GlyphId, OutlineBuilder};

/// A font file held in memory.
#[derive(Clone, Debug)]
pub struct FontData {
    data: Vec<u8>,
    index: u32,
}

impl FontData {
    /// Wrap raw font bytes; the face at `index` is parsed once to reject
    /// anything that is not a font.
    pub fn from_bytes(data: Vec<u8>, index: u32) -> Result<Self, IoError> {
        Face::parse(&data, index)?;
        Ok(FontData { data, index })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, IoError> {
        Self::from_bytes(std::fs::read(path)?, 0)
    }

    pub fn face(&self) -> Result<Face<'_>, IoError> {
        Ok(Face::parse(&self.data, self.index)?)
    }
}

/// Millimeters per font unit for a text of `size`.
///
/// `size` is the height of a capital letter above the baseline: the cap
/// height from the OS/2 table, else the top of `H`, else 70% of the em.
pub fn units_to_mm(face: &Face<'_>, size: Real) -> Real {
    let cap_height = face
        .capital_height()
        .filter(|h| *h > 0)
        .map(Real::from)
        .or_else(|| {
            face.glyph_index('H')
                .and_then(|id| face.glyph_bounding_box(id))
                .map(|rect| Real::from(rect.y_max))
                .filter(|h| *h > 0.0)
        })
        .unwrap_or_else(|| Real::from(face.units_per_em()) * 0.7);
    size / cap_height
}

impl Sketch {
    /// Outline of `text` set in `font` with capital height `size`.
    ///
    /// The baseline starts at the origin. `segments` is the circle
    /// resolution used elsewhere in the label; curve flattening follows it.
    pub fn text(
        text: &str,
        font: &FontData,
        size: Real,
        segments: usize,
    ) -> Result<Sketch, IoError> {
        let face = font.face()?;
        let scale = units_to_mm(&face, size);
        let mut builder = ContourBuilder::new(scale, (segments / 8).max(2));

        let mut pen_x: Real = 0.0;
        for ch in text.chars().filter(|c| !c.is_control()) {
            let glyph = face.glyph_index(ch).unwrap_or(GlyphId(0));
            builder.origin_x = pen_x;
            face.outline_glyph(glyph, &mut builder);
            pen_x += face.glyph_hor_advance(glyph).map_or(0.0, Real::from) * scale;
        }

        Ok(Sketch::from_contours(builder.finish()))
    }
}

/// Collects flattened glyph contours in millimeters.
pub(crate) struct ContourBuilder {
    scale: Real,
    origin_x: Real,
    curve_steps: usize,
    contours: Vec<LineString<Real>>,
    current: Vec<Coord<Real>>,
}

impl ContourBuilder {
    pub(crate) const fn new(scale: Real, curve_steps: usize) -> Self {
        ContourBuilder {
            scale,
            origin_x: 0.0,
            curve_steps,
            contours: Vec::new(),
            current: Vec::new(),
        }
    }

    fn point(&self, x: f32, y: f32) -> Coord<Real> {
        Coord {
            x: self.origin_x + Real::from(x) * self.scale,
            y: Real::from(y) * self.scale,
        }
    }

    fn last(&self) -> Coord<Real> {
        self.current.last().copied().unwrap_or(Coord { x: 0.0, y: 0.0 })
    }

    fn flush(&mut self) {
        let contour = std::mem::take(&mut self.current);
        if contour.len() >= 3 {
            self.contours.push(LineString::new(contour));
        }
    }

    pub(crate) fn finish(mut self) -> Vec<LineString<Real>> {
        self.flush();
        self.contours
    }
}

impl OutlineBuilder for ContourBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        let p = self.point(x, y);
        self.current.push(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.current.push(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (p0, c, p) = (self.last(), self.point(x1, y1), self.point(x, y));
        for i in 1..=self.curve_steps {
            let t = i as Real / self.curve_steps as Real;
            let u = 1.0 - t;
            self.current.push(Coord {
                x: u * u * p0.x + 2.0 * u * t * c.x + t * t * p.x,
                y: u * u * p0.y + 2.0 * u * t * c.y + t * t * p.y,
            });
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (p0, c1, c2, p) = (
            self.last(),
            self.point(x1, y1),
            self.point(x2, y2),
            self.point(x, y),
        );
        for i in 1..=self.curve_steps {
            let t = i as Real / self.curve_steps as Real;
            let u = 1.0 - t;
            let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
            self.current.push(Coord {
                x: a * p0.x + b * c1.x + c * c2.x + d * p.x,
                y: a * p0.y + b * c1.y + c * c2.y + d * p.y,
            });
        }
    }

    fn close(&mut self) {
        self.flush();
    }
}
