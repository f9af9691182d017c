mod support;

use geo::LineString;
use magnetic_label::backend::NativeBackend;
use magnetic_label::errors::GeometryError;
use magnetic_label::layers::{LayerKind, compose_layers};
use magnetic_label::mesh::{Mesh, Prism};
use magnetic_label::params::{LabelSpec, RenderMode};
use magnetic_label::sketch::Sketch;
use support::{approx_eq, bounding_box, layer, textless_spec};

fn square_ring(size: f64) -> LineString<f64> {
    let h = size / 2.0;
    LineString::from(vec![(-h, -h), (h, -h), (h, h), (-h, h), (-h, -h)])
}

#[test]
fn extruded_rectangle_is_a_box() {
    let mesh = Mesh::extrude(&Sketch::rectangle(10.0, 4.0), 2.0).unwrap();
    assert!(approx_eq(mesh.volume(), 80.0, 1e-9));
    let bb = bounding_box(&mesh);
    assert_eq!(bb, [-5.0, -2.0, 0.0, 5.0, 2.0, 2.0]);
    // four walls of two triangles, two caps of two triangles
    assert_eq!(mesh.triangle_count(), 12);
}

#[cfg(feature = "hashmap")]
#[test]
fn extrusions_are_closed() {
    for sketch in [
        Sketch::rectangle(10.0, 4.0),
        Sketch::circle(3.0, 32),
        Sketch::rounded_rectangle(60.0, 25.0, 6.0, 32),
    ] {
        let mesh = Mesh::extrude(&sketch, 1.5).unwrap();
        assert!(mesh.is_manifold());
        assert!(mesh.volume() > 0.0, "outward normals give positive volume");
    }
}

#[test]
fn blind_cut_removes_its_volume() {
    let body = Prism::new(Sketch::rectangle(20.0, 20.0), 0.0, 4.0);
    let cut = Prism::new(Sketch::rectangle(4.0, 4.0), -0.1, 3.0);
    let mesh = Mesh::prism_with_cuts(&body, &[cut]).unwrap();
    assert!(approx_eq(mesh.volume(), 20.0 * 20.0 * 4.0 - 4.0 * 4.0 * 3.0, 1e-9));
    #[cfg(feature = "hashmap")]
    assert!(mesh.is_manifold());
}

#[test]
fn through_cut_opens_both_faces() {
    let body = Prism::new(Sketch::rectangle(20.0, 10.0), 1.0, 2.0);
    let cut = Prism::new(Sketch::rectangle(16.0, 6.0), 0.5, 2.5);
    let mesh = Mesh::prism_with_cuts(&body, &[cut]).unwrap();
    assert!(approx_eq(mesh.volume(), (200.0 - 96.0) * 1.0, 1e-9));
    let bb = bounding_box(&mesh);
    assert_eq!((bb[2], bb[5]), (1.0, 2.0));
    #[cfg(feature = "hashmap")]
    assert!(mesh.is_manifold());
}

#[test]
fn cuts_outside_the_height_are_ignored() {
    let body = Prism::new(Sketch::rectangle(10.0, 10.0), 0.0, 1.0);
    let above = Prism::new(Sketch::rectangle(2.0, 2.0), 2.0, 3.0);
    let mesh = Mesh::prism_with_cuts(&body, &[above]).unwrap();
    assert!(approx_eq(mesh.volume(), 100.0, 1e-9));
}

#[test]
fn prism_errors() {
    let body = Prism::new(Sketch::rectangle(10.0, 10.0), 0.0, 1.0);

    let flat = Prism::new(Sketch::rectangle(10.0, 10.0), 1.0, 1.0);
    assert_eq!(
        Mesh::prism_with_cuts(&flat, &[]).unwrap_err(),
        GeometryError::NonPositiveThickness(0.0)
    );

    let empty = Prism::new(Sketch::new(), 0.0, 1.0);
    assert_eq!(Mesh::prism_with_cuts(&empty, &[]).unwrap_err(), GeometryError::EmptyProfile);

    let sticking_out = Prism::new(Sketch::rectangle(4.0, 4.0).translate(5.0, 0.0), 0.0, 1.0);
    assert_eq!(
        Mesh::prism_with_cuts(&body, &[sticking_out]).unwrap_err(),
        GeometryError::CutNotContained { index: 0 }
    );

    let a = Prism::new(Sketch::rectangle(4.0, 4.0), 0.0, 0.5);
    let b = Prism::new(Sketch::rectangle(4.0, 4.0).translate(1.0, 0.0), 0.2, 0.8);
    assert_eq!(
        Mesh::prism_with_cuts(&body, &[a.clone(), b]).unwrap_err(),
        GeometryError::CutsOverlap { first: 0, second: 1 }
    );

    // same footprint, stacked heights: no overlap
    let c = Prism::new(Sketch::rectangle(4.0, 4.0), 0.6, 0.9);
    assert!(Mesh::prism_with_cuts(&body, &[a, c]).is_ok());
}

#[test]
fn base_plate_volume_accounts_for_cavities() {
    for magnet_count in [2, 4] {
        let spec = LabelSpec {
            magnet_count,
            label_height: 30.0,
            label_text: String::new(),
            ..LabelSpec::default()
        };
        let layers = compose_layers(&spec).unwrap();
        let base = layer(&layers, LayerKind::BasePlate);
        let mesh = NativeBackend::default().materialize(base, spec.curve_segments).unwrap();

        let plate = Sketch::rounded_rectangle(
            spec.label_width,
            spec.label_height,
            spec.corner_radius,
            spec.curve_segments,
        );
        let cavity = Sketch::circle(spec.cavity_diameter() / 2.0, spec.curve_segments);
        let expected = plate.area() * spec.base_thickness()
            - magnet_count as f64 * cavity.area() * spec.magnet_height;
        assert!(approx_eq(mesh.volume(), expected, 1e-6), "{magnet_count} magnets");

        let bb = bounding_box(&mesh);
        assert!(approx_eq(bb[2], 0.0, 1e-12));
        assert!(approx_eq(bb[5], spec.base_thickness(), 1e-12));
        #[cfg(feature = "hashmap")]
        assert!(mesh.is_manifold());
    }
}

#[test]
fn frame_and_inlay_fill_one_slab() {
    let spec = textless_spec();
    let layers = compose_layers(&spec).unwrap();
    let backend = NativeBackend::default();
    let frame = backend
        .materialize(layer(&layers, LayerKind::Frame), spec.curve_segments)
        .unwrap();
    let inlay = backend
        .materialize(layer(&layers, LayerKind::Inlay), spec.curve_segments)
        .unwrap();

    let outer = Sketch::rounded_rectangle(
        spec.label_width,
        spec.label_height,
        spec.corner_radius,
        spec.curve_segments,
    );
    let inner = Sketch::rounded_rectangle(
        spec.inner_width(),
        spec.inner_height(),
        spec.inner_radius(),
        spec.curve_segments,
    );
    assert!(approx_eq(
        frame.volume(),
        (outer.area() - inner.area()) * spec.frame_thickness(),
        1e-6
    ));
    assert!(approx_eq(inlay.volume(), inner.area() * spec.inlay_thickness, 1e-6));

    let bb = bounding_box(&frame);
    assert!(approx_eq(bb[2], spec.base_thickness(), 1e-12));
    assert!(approx_eq(bb[5], spec.total_thickness(), 1e-12));
}

#[test]
fn nested_contours_become_holes() {
    let sketch = Sketch::from_contours(vec![square_ring(4.0), square_ring(10.0)]);
    assert_eq!(sketch.geometry.0.len(), 1);
    assert_eq!(sketch.geometry.0[0].interiors().len(), 1);
    assert!(approx_eq(sketch.area(), 100.0 - 16.0, 1e-9));

    // an island inside the hole is a shell of its own
    let sketch = Sketch::from_contours(vec![square_ring(10.0), square_ring(6.0), square_ring(2.0)]);
    assert_eq!(sketch.geometry.0.len(), 2);
    assert!(approx_eq(sketch.area(), 100.0 - 36.0 + 4.0, 1e-9));
}

#[test]
fn from_contours_drops_degenerate_rings() {
    let line = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
    let sketch = Sketch::from_contours(vec![line]);
    assert!(sketch.is_empty());
}

#[test]
fn rounded_rectangle_area() {
    let sharp = Sketch::rounded_rectangle(60.0, 25.0, 0.0, 64);
    assert!(approx_eq(sharp.area(), 1500.0, 1e-9));

    let r: f64 = 6.0;
    let rounded = Sketch::rounded_rectangle(60.0, 25.0, r, 256);
    let exact = 1500.0 - (4.0 - std::f64::consts::PI) * r * r;
    assert!(approx_eq(rounded.area(), exact, 0.05));
    let rect = rounded.bounding_rect().unwrap();
    assert!(approx_eq(rect.width(), 60.0, 1e-9));
    assert!(approx_eq(rect.height(), 25.0, 1e-9));
}

#[test]
fn validated_magnet_layouts_always_materialize() {
    let backend = NativeBackend::default();
    for magnet_count in [2, 4] {
        for inset in [3.5, 4.0, 5.0, 6.0, 8.0] {
            for corner_radius in [0.0, 4.0, 8.0, 12.0] {
                let spec = LabelSpec {
                    magnet_count,
                    magnet_inset: inset,
                    corner_radius,
                    label_height: 30.0,
                    label_text: String::new(),
                    ..LabelSpec::default()
                };
                if spec.validate().is_err() {
                    continue;
                }
                let layers = compose_layers(&spec).unwrap();
                let base = layer(&layers, LayerKind::BasePlate);
                let mesh = backend.materialize(base, spec.curve_segments);
                assert!(
                    mesh.is_ok(),
                    "{magnet_count} magnets, inset {inset}, radius {corner_radius}: {mesh:?}"
                );
            }
        }
    }
}

#[test]
fn combined_mesh_keeps_one_shell_per_layer() {
    let spec = textless_spec();
    let backend = NativeBackend::default();
    let layers = backend.layer_meshes(&spec, RenderMode::Color1).unwrap();
    assert_eq!(layers.len(), 2);

    let combined = backend.mesh(&spec, RenderMode::Color1).unwrap();
    let triangles: usize = layers.iter().map(|(_, m)| m.triangle_count()).sum();
    let volume: f64 = layers.iter().map(|(_, m)| m.volume()).sum();
    assert_eq!(combined.triangle_count(), triangles);
    assert!(approx_eq(combined.volume(), volume, 1e-6));

    // the frame rests on the base plate
    let base_top = bounding_box(&layers[0].1)[5];
    let frame_bottom = bounding_box(&layers[1].1)[2];
    assert!(approx_eq(base_top, frame_bottom, 1e-12));
    #[cfg(feature = "hashmap")]
    for (layer, mesh) in &layers {
        assert!(mesh.is_manifold(), "{} is closed", layer.kind);
    }
}
