//! Struct and functions for working with `Vertex`s from which mesh triangles are composed.

use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

/// A vertex of a triangle, holding position and normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub pos: Point3<Real>,
    pub normal: Vector3<Real>,
}

impl Vertex {
    /// Create a new [`Vertex`].
    ///
    /// * `pos`    – the position in model space
    /// * `normal` – the facet normal; it is **copied verbatim**
    pub const fn new(pos: Point3<Real>, normal: Vector3<Real>) -> Self {
        Vertex { pos, normal }
    }
}
