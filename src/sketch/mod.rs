//! 2D regions in the XY plane, the profiles every label layer is swept from.

use crate::float_types::{EPSILON, Real};
use geo::orient::{Direction, Orient};
use geo::{
    Area, BoundingRect, Contains, Coord, Intersects, LineString, MapCoords, MultiPolygon,
    Polygon as GeoPolygon, Rect, TriangulateEarcut,
};

pub mod shapes;

#[cfg(feature = "svg-io")]
pub mod svg;

#[cfg(feature = "truetype-text")]
pub mod truetype;

/// A set of planar polygons (with holes), in millimeters.
#[derive(Clone, Debug, PartialEq)]
pub struct Sketch {
    pub geometry: MultiPolygon<Real>,
}

impl Default for Sketch {
    fn default() -> Self {
        Sketch {
            geometry: MultiPolygon::new(Vec::new()),
        }
    }
}

impl Sketch {
    /// Returns a new empty Sketch
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_polygons(polygons: Vec<GeoPolygon<Real>>) -> Self {
        Sketch {
            geometry: MultiPolygon::new(polygons),
        }
    }

    /// Build a region from unordered closed contours, such as glyph or SVG
    /// outlines, by nesting depth: a contour inside an even number of other
    /// contours is a shell, one inside an odd number is a hole of the
    /// smallest contour enclosing it.
    ///
    /// Contour direction is ignored, so fonts and drawings with either
    /// winding convention come out the same.
    pub fn from_contours(contours: Vec<LineString<Real>>) -> Self {
        let mut rings: Vec<(Real, GeoPolygon<Real>)> = contours
            .into_iter()
            .filter_map(|mut ring| {
                ring.0.dedup();
                ring.close();
                if ring.0.len() < 4 {
                    return None;
                }
                let shell = GeoPolygon::new(ring, vec![]);
                let area = shell.unsigned_area();
                (area > EPSILON).then_some((area, shell))
            })
            .collect();
        // largest first, so every enclosing contour precedes what it encloses
        rings.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut depth = vec![0usize; rings.len()];
        let mut parent = vec![None; rings.len()];
        for i in 0..rings.len() {
            let sample = rings[i].1.exterior().0[0];
            // the smallest enclosing contour is the last one containing the sample
            if let Some(j) = (0..i).rev().find(|&j| rings[j].1.contains(&sample)) {
                depth[i] = depth[j] + 1;
                parent[i] = Some(j);
            }
        }

        let mut shells: Vec<Option<(LineString<Real>, Vec<LineString<Real>>)>> =
            vec![None; rings.len()];
        for (i, (_, ring)) in rings.iter().enumerate() {
            if depth[i] % 2 == 0 {
                shells[i] = Some((ring.exterior().clone(), Vec::new()));
            }
        }
        for (i, (_, ring)) in rings.iter().enumerate() {
            if depth[i] % 2 == 0 {
                continue;
            }
            if let Some(j) = parent[i] {
                if let Some((_, holes)) = shells[j].as_mut() {
                    holes.push(ring.exterior().clone());
                }
            }
        }

        Sketch::from_polygons(
            shells
                .into_iter()
                .flatten()
                .map(|(exterior, holes)| GeoPolygon::new(exterior, holes))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.0.is_empty()
    }

    /// Apply `f` to every coordinate.
    pub fn map_points<F>(&self, f: F) -> Self
    where
        F: Fn(Coord<Real>) -> Coord<Real> + Copy,
    {
        Sketch {
            geometry: self.geometry.map_coords(f),
        }
    }

    /// Returns a new Sketch translated by `dx`, `dy`.
    pub fn translate(&self, dx: Real, dy: Real) -> Self {
        self.map_points(|c| Coord {
            x: c.x + dx,
            y: c.y + dy,
        })
    }

    pub fn bounding_rect(&self) -> Option<Rect<Real>> {
        self.geometry.bounding_rect()
    }

    /// Returns a new Sketch translated so that its bounding-box center is at the origin.
    pub fn center(&self) -> Self {
        match self.bounding_rect() {
            Some(rect) => {
                let c = rect.center();
                self.translate(-c.x, -c.y)
            },
            None => self.clone(),
        }
    }

    /// Enclosed area, holes excluded.
    pub fn area(&self) -> Real {
        self.geometry.unsigned_area()
    }

    /// Exterior rings counter-clockwise, holes clockwise.
    pub fn oriented(&self) -> Self {
        Sketch {
            geometry: self.geometry.orient(Direction::Default),
        }
    }

    /// `true` when every polygon of `other` lies inside one polygon of `self`.
    pub fn contains(&self, other: &Sketch) -> bool {
        other
            .geometry
            .0
            .iter()
            .all(|inner| self.geometry.0.iter().any(|outer| outer.contains(inner)))
    }

    pub fn intersects(&self, other: &Sketch) -> bool {
        self.geometry.intersects(&other.geometry)
    }

    /// Triangulate every polygon (holes respected) with ear clipping.
    ///
    /// Triangle winding is whatever the triangulator produced; callers that
    /// care orient each triangle themselves.
    pub fn triangulate(&self) -> Vec<[Coord<Real>; 3]> {
        let mut result = Vec::new();
        for polygon in &self.geometry.0 {
            let triangulation = polygon.earcut_triangles_raw();
            let vertices = triangulation.vertices;
            let at = |i: usize| Coord {
                x: vertices[2 * i],
                y: vertices[2 * i + 1],
            };
            for tri in triangulation.triangle_indices.chunks_exact(3) {
                result.push([at(tri[0]), at(tri[1]), at(tri[2])]);
            }
        }
        result
    }
}
