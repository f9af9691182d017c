//! Sweeping sketches into closed solids.
//!
//! Every solid of a label is a vertical prism with vertical prisms cut out
//! of it. Such a solid is materialized exactly by splitting it at every z
//! where a cut starts or ends: within each slab the cross-section is
//! constant, so walls are quads, and between slabs only the footprints of
//! the cuts that start or end there become horizontal faces.

use crate::errors::GeometryError;
use crate::float_types::{EPSILON, Real};
use crate::mesh::Mesh;
use crate::sketch::Sketch;
use geo::{Coord, LineString, Polygon as GeoPolygon};
use nalgebra::Point3;

/// `sketch` swept along +z from `z_min` to `z_max`.
#[derive(Clone, Debug, PartialEq)]
pub struct Prism {
    pub sketch: Sketch,
    pub z_min: Real,
    pub z_max: Real,
}

impl Prism {
    pub const fn new(sketch: Sketch, z_min: Real, z_max: Real) -> Self {
        Prism {
            sketch,
            z_min,
            z_max,
        }
    }

    pub fn height(&self) -> Real {
        self.z_max - self.z_min
    }

    fn overlaps_z(&self, z_min: Real, z_max: Real) -> bool {
        self.z_min < z_max - EPSILON && self.z_max > z_min + EPSILON
    }
}

/// A cut clipped to the body's height.
struct ClippedCut<'a> {
    sketch: &'a Sketch,
    z_min: Real,
    z_max: Real,
}

impl ClippedCut<'_> {
    fn spans(&self, z_a: Real, z_b: Real) -> bool {
        self.z_min <= z_a + EPSILON && self.z_max >= z_b - EPSILON
    }
}

impl Mesh {
    /// Linear extrusion of `sketch` from z = 0 to z = `height`.
    pub fn extrude(sketch: &Sketch, height: Real) -> Result<Mesh, GeometryError> {
        Mesh::prism_with_cuts(&Prism::new(sketch.clone(), 0.0, height), &[])
    }

    /// Closed mesh of `body` with every prism of `cuts` removed.
    ///
    /// Cuts may extend above or below the body; only the part inside the
    /// body's height removes material, so a cut reaching past a face opens
    /// that face. Each cut must lie inside the body profile and cuts that
    /// share a height range must not touch each other.
    pub fn prism_with_cuts(body: &Prism, cuts: &[Prism]) -> Result<Mesh, GeometryError> {
        if body.height() <= 0.0 {
            return Err(GeometryError::NonPositiveThickness(body.height()));
        }
        if body.sketch.is_empty() {
            return Err(GeometryError::EmptyProfile);
        }

        let mut clipped: Vec<(usize, ClippedCut<'_>)> = Vec::new();
        for (index, cut) in cuts.iter().enumerate() {
            if cut.sketch.is_empty() || !cut.overlaps_z(body.z_min, body.z_max) {
                continue;
            }
            if !body.sketch.contains(&cut.sketch) {
                return Err(GeometryError::CutNotContained { index });
            }
            let this = ClippedCut {
                sketch: &cut.sketch,
                z_min: cut.z_min.max(body.z_min),
                z_max: cut.z_max.min(body.z_max),
            };
            for (other_index, other) in &clipped {
                let shares_height =
                    this.z_min < other.z_max - EPSILON && this.z_max > other.z_min + EPSILON;
                if shares_height && this.sketch.intersects(other.sketch) {
                    return Err(GeometryError::CutsOverlap {
                        first: *other_index,
                        second: index,
                    });
                }
            }
            clipped.push((index, this));
        }

        let mut levels = vec![body.z_min, body.z_max];
        for (_, cut) in &clipped {
            levels.push(cut.z_min);
            levels.push(cut.z_max);
        }
        levels.sort_by(|a, b| a.total_cmp(b));
        levels.dedup_by(|a, b| (*a - *b).abs() < EPSILON);

        let active_in = |z_a: Real, z_b: Real| {
            clipped
                .iter()
                .filter(|(_, cut)| cut.spans(z_a, z_b))
                .map(|(_, cut)| cut.sketch)
                .collect::<Vec<&Sketch>>()
        };

        let mut mesh = Mesh::new();
        let slabs: Vec<(Real, Real)> = levels.windows(2).map(|w| (w[0], w[1])).collect();
        let mut below: Option<Vec<&Sketch>> = None;

        for (slab_index, &(z_a, z_b)) in slabs.iter().enumerate() {
            let active = active_in(z_a, z_b);
            let section = cross_section(&body.sketch, &active);
            push_walls(&mut mesh, &section, z_a, z_b);

            match &below {
                None => push_cap(&mut mesh, &section, z_a, false),
                Some(previous) => {
                    // a hole that ends here gets a ceiling, one that starts gets a floor
                    for cut in previous.iter().filter(|c| !contains_ptr(&active, c)) {
                        push_cap(&mut mesh, &footprint(cut), z_a, false);
                    }
                    for cut in active.iter().filter(|c| !contains_ptr(previous, c)) {
                        push_cap(&mut mesh, &footprint(cut), z_a, true);
                    }
                },
            }
            if slab_index + 1 == slabs.len() {
                push_cap(&mut mesh, &section, z_b, true);
            }
            below = Some(active);
        }

        Ok(mesh)
    }
}

fn contains_ptr(set: &[&Sketch], sketch: &Sketch) -> bool {
    set.iter().any(|s| std::ptr::eq(*s, sketch))
}

/// `body` with the exterior of every cut added as a hole of the body
/// polygon holding it.
fn cross_section(body: &Sketch, cuts: &[&Sketch]) -> Sketch {
    let polygons = body
        .geometry
        .0
        .iter()
        .map(|outer| {
            let mut holes: Vec<LineString<Real>> = outer.interiors().to_vec();
            for cut in cuts {
                for inner in &cut.geometry.0 {
                    if geo::Contains::contains(outer, inner) {
                        holes.push(inner.exterior().clone());
                    }
                }
            }
            GeoPolygon::new(outer.exterior().clone(), holes)
        })
        .collect();
    Sketch::from_polygons(polygons).oriented()
}

/// The area a cut removes; holes inside a cut are not material.
fn footprint(cut: &Sketch) -> Sketch {
    Sketch::from_polygons(
        cut.geometry
            .0
            .iter()
            .map(|p| GeoPolygon::new(p.exterior().clone(), vec![]))
            .collect(),
    )
    .oriented()
}

/// Vertical quads along every ring of an oriented section.
fn push_walls(mesh: &mut Mesh, section: &Sketch, z_a: Real, z_b: Real) {
    for polygon in &section.geometry.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            for line in ring.lines() {
                let (a, b) = (line.start, line.end);
                if (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON {
                    continue;
                }
                let a0 = Point3::new(a.x, a.y, z_a);
                let b0 = Point3::new(b.x, b.y, z_a);
                let b1 = Point3::new(b.x, b.y, z_b);
                let a1 = Point3::new(a.x, a.y, z_b);
                mesh.push_triangle(a0, b0, b1);
                mesh.push_triangle(a0, b1, a1);
            }
        }
    }
}

/// Horizontal face of `section` at `z`, facing +z when `up`.
fn push_cap(mesh: &mut Mesh, section: &Sketch, z: Real, up: bool) {
    for [a, b, c] in section.triangulate() {
        let ccw = signed_area(a, b, c) > 0.0;
        let (b, c) = if ccw == up { (b, c) } else { (c, b) };
        mesh.push_triangle(
            Point3::new(a.x, a.y, z),
            Point3::new(b.x, b.y, z),
            Point3::new(c.x, c.y, z),
        );
    }
}

fn signed_area(a: Coord<Real>, b: Coord<Real>, c: Coord<Real>) -> Real {
    0.5 * ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y))
}
