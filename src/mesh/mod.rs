//! Triangle meshes of the printable solids.

use crate::aabb::Aabb;
use crate::float_types::Real;
use crate::triangulated::Triangulated3D;
use nalgebra::{Point3, Vector3};
use std::sync::OnceLock;

pub mod extrude;
#[cfg(feature = "hashmap")]
pub mod manifold;
pub mod vertex;

pub use extrude::Prism;
use vertex::Vertex;

/// A triangle soup with facet normals.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub triangles: Vec<[Vertex; 3]>,

    /// Lazily calculated AABB that spans `triangles`.
    bounding_box: OnceLock<Option<Aabb>>,
}

impl Mesh {
    /// Returns a new empty Mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the triangle `a, b, c`; its normal follows the right-hand rule.
    pub fn push_triangle(&mut self, a: Point3<Real>, b: Point3<Real>, c: Point3<Real>) {
        let normal = (b - a)
            .cross(&(c - a))
            .try_normalize(Real::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        self.triangles.push([
            Vertex::new(a, normal),
            Vertex::new(b, normal),
            Vertex::new(c, normal),
        ]);
        self.invalidate_bounding_box();
    }

    /// Move every triangle of `other` into `self`.
    pub fn append(&mut self, mut other: Mesh) {
        self.triangles.append(&mut other.triangles);
        self.invalidate_bounding_box();
    }

    /// Returns a new Mesh translated by x, y, and z.
    pub fn translate(&self, x: Real, y: Real, z: Real) -> Mesh {
        let offset = Vector3::new(x, y, z);
        Mesh {
            triangles: self
                .triangles
                .iter()
                .map(|tri| tri.map(|v| Vertex::new(v.pos + offset, v.normal)))
                .collect(),
            bounding_box: OnceLock::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<Aabb> {
        *self
            .bounding_box
            .get_or_init(|| Aabb::from_points(self.triangles.iter().flatten().map(|v| &v.pos)))
    }

    pub fn invalidate_bounding_box(&mut self) {
        self.bounding_box = OnceLock::new();
    }

    /// Enclosed volume by the divergence theorem.
    ///
    /// Only meaningful for a closed, outward-oriented mesh.
    pub fn volume(&self) -> Real {
        self.triangles
            .iter()
            .map(|[a, b, c]| a.pos.coords.dot(&b.pos.coords.cross(&c.pos.coords)))
            .sum::<Real>()
            / 6.0
    }
}

impl Triangulated3D for Mesh {
    fn visit_triangles<F>(&self, mut f: F)
    where
        F: FnMut([Vertex; 3]),
    {
        for tri in &self.triangles {
            f(*tri);
        }
    }
}
