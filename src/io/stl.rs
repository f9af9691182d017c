use crate::float_types::Real;
use crate::triangulated::Triangulated3D;
use std::io::{Cursor, Read, Seek};

/// Export to ASCII STL
/// Convert a triangulated shape to an **ASCII STL** string with the given `name`.
///
/// ```rust
/// # use magnetic_label::{mesh::Mesh, sketch::Sketch};
/// let slab = Mesh::extrude(&Sketch::rectangle(10.0, 5.0), 2.0).unwrap();
/// let text = slab.to_stl_ascii("slab");
/// assert!(text.starts_with("solid slab"));
/// ```
pub fn to_stl_ascii<T: Triangulated3D>(shape: &T, name: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("solid {name}\n"));

    shape.visit_triangles(|tri| {
        let n = tri[0].normal;
        out.push_str(&format!(
            "  facet normal {:.6} {:.6} {:.6}\n",
            n.x, n.y, n.z
        ));
        out.push_str("    outer loop\n");
        for v in &tri {
            let p = v.pos;
            out.push_str(&format!(
                "      vertex {:.6} {:.6} {:.6}\n",
                p.x, p.y, p.z
            ));
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    });

    out.push_str(&format!("endsolid {name}\n"));
    out
}

/// Export to BINARY STL (returns `Vec<u8>`)
///
/// The binary format has no room for a solid name, so `_name` is only kept
/// for symmetry with [`to_stl_ascii`].
pub fn to_stl_binary<T: Triangulated3D>(shape: &T, _name: &str) -> std::io::Result<Vec<u8>> {
    use stl_io::{Normal, Triangle, Vertex, write_stl};

    let mut triangles = Vec::<Triangle>::new();

    shape.visit_triangles(|tri| {
        let n = tri[0].normal;
        triangles.push(Triangle {
            normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
            vertices: tri.map(|v| {
                let p = v.pos;
                Vertex::new([p.x as f32, p.y as f32, p.z as f32])
            }),
        });
    });

    let mut cursor = Cursor::new(Vec::new());
    write_stl(&mut cursor, triangles.iter())?;
    Ok(cursor.into_inner())
}

/// Axis-aligned extent of every vertex in an STL stream (ASCII or binary),
/// as `[min_x, min_y, min_z, max_x, max_y, max_z]`.
///
/// Returns `None` when the stream holds no vertices.
pub fn stl_extent<R: Read + Seek>(reader: &mut R) -> std::io::Result<Option<[Real; 6]>> {
    let mesh = stl_io::read_stl(reader)?;
    if mesh.vertices.is_empty() {
        return Ok(None);
    }

    let mut extent = [
        Real::MAX,
        Real::MAX,
        Real::MAX,
        Real::MIN,
        Real::MIN,
        Real::MIN,
    ];
    for v in &mesh.vertices {
        for axis in 0..3 {
            let value = v[axis] as Real;
            extent[axis] = extent[axis].min(value);
            extent[axis + 3] = extent[axis + 3].max(value);
        }
    }
    Ok(Some(extent))
}

impl crate::mesh::Mesh {
    pub fn to_stl_ascii(&self, name: &str) -> String {
        self::to_stl_ascii(self, name)
    }
    pub fn to_stl_binary(&self, name: &str) -> std::io::Result<Vec<u8>> {
        self::to_stl_binary(self, name)
    }
}
