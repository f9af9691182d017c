//! 2D Shapes as `Sketch`s
//!
//! Every shape here is centered on the origin, which is also the center of
//! the label.

use crate::float_types::{EPSILON, FRAC_PI_2, PI, Real, TAU};
use crate::sketch::Sketch;
use geo::{Coord, LineString, Polygon as GeoPolygon};

impl Sketch {
    /// Axis-aligned rectangle of `width` × `height`.
    pub fn rectangle(width: Real, height: Real) -> Self {
        let (hw, hh) = (0.5 * width, 0.5 * height);
        let ring = LineString::from(vec![(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh), (-hw, -hh)]);
        Sketch::from_polygons(vec![GeoPolygon::new(ring, vec![])])
    }

    /// Circle approximated by a regular polygon with `segments` vertices.
    ///
    /// Fewer than three segments gives an empty sketch.
    pub fn circle(radius: Real, segments: usize) -> Self {
        if segments < 3 {
            return Sketch::new();
        }
        let mut coords: Vec<(Real, Real)> = (0..segments)
            .map(|i| {
                let theta = TAU * (i as Real) / (segments as Real);
                (radius * theta.cos(), radius * theta.sin())
            })
            .collect();
        // close it
        coords.push(coords[0]);
        Sketch::from_polygons(vec![GeoPolygon::new(LineString::from(coords), vec![])])
    }

    /// Rectangle of `width` × `height` with quarter-circle corners.
    ///
    /// The radius is clamped to half the shorter side, so a radius that is
    /// too large yields a stadium (or a circle for a square) rather than a
    /// self-intersecting outline. A radius at or below [`EPSILON`] gives a
    /// sharp rectangle. `segments` is the resolution of a full circle; each
    /// corner gets a quarter of it.
    pub fn rounded_rectangle(
        width: Real,
        height: Real,
        corner_radius: Real,
        segments: usize,
    ) -> Self {
        let r = corner_radius.min(width * 0.5).min(height * 0.5);
        if r <= EPSILON {
            return Sketch::rectangle(width, height);
        }
        let corner_segments = (segments / 4).max(1);
        let step = FRAC_PI_2 / corner_segments as Real;
        let (hw, hh) = (0.5 * width - r, 0.5 * height - r);

        let corner = |cx: Real, cy: Real, start_angle: Real| {
            (0..=corner_segments).map(move |i| {
                let angle = start_angle + (i as Real) * step;
                Coord {
                    x: cx + r * angle.cos(),
                    y: cy + r * angle.sin(),
                }
            })
        };

        let mut coords: Vec<Coord<Real>> = Vec::with_capacity(4 * (corner_segments + 1) + 1);
        let arcs = corner(-hw, -hh, PI) // Bottom-left
            .chain(corner(hw, -hh, 1.5 * PI)) // Bottom-right
            .chain(corner(hw, hh, 0.0)) // Top-right
            .chain(corner(-hw, hh, 0.5 * PI)); // Top-left
        for c in arcs {
            // a clamped radius makes neighbouring arcs meet in the same point
            if coords.last().is_some_and(|last| coincident(*last, c)) {
                continue;
            }
            coords.push(c);
        }
        if coords.len() > 1 && coincident(coords[0], coords[coords.len() - 1]) {
            coords.pop();
        }
        coords.push(coords[0]); // close

        Sketch::from_polygons(vec![GeoPolygon::new(LineString::from(coords), vec![])])
    }
}

fn coincident(a: Coord<Real>, b: Coord<Real>) -> bool {
    (a.x - b.x).abs() < 1e-7 && (a.y - b.y).abs() < 1e-7
}
