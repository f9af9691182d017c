#![cfg(feature = "svg-io")]

mod support;

use magnetic_label::errors::LabelError;
use magnetic_label::io::IoError;
use magnetic_label::layers::{LayerKind, LayerShape, compose_layers};
use magnetic_label::params::{IconType, LabelSpec};
use magnetic_label::sketch::Sketch;
use magnetic_label::sketch::svg::{parse_points, parse_transform, parse_view_box, read_svg};
use nalgebra::Vector3;
use support::{approx_eq, layer, temp_file, textless_spec};

fn svg(body: &str) -> String {
    svg_with_root(r#"viewBox="0 0 100 100" width="100" height="100""#, body)
}

fn svg_with_root(root_attributes: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" {root_attributes}>
{body}
</svg>
"#
    )
}

fn transformed(transform: &str, x: f64, y: f64) -> (f64, f64) {
    let p = parse_transform(transform).unwrap() * Vector3::new(x, y, 1.0);
    (p.x, p.y)
}

fn svg_icon(path: std::path::PathBuf, icon_size: f64) -> LabelSpec {
    LabelSpec {
        use_icon: true,
        icon_type: IconType::Svg,
        icon_svg: Some(path),
        icon_size,
        ..textless_spec()
    }
}

#[test]
fn points_lists() {
    assert_eq!(
        parse_points("0,0 10,0 10,10").unwrap(),
        vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]
    );
    assert_eq!(
        parse_points("  1 2, 3.5 -4e1\n5,6 ").unwrap(),
        vec![(1.0, 2.0), (3.5, -40.0), (5.0, 6.0)]
    );
    assert_eq!(parse_points("").unwrap(), vec![]);
    assert!(matches!(parse_points("1,2,3"), Err(IoError::MalformedInput(_))));
    assert!(parse_points("1,x").is_err());
}

#[test]
fn rect_and_polygon() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_file(
        &dir,
        "shapes.svg",
        &svg(r#"<rect x="10" y="10" width="30" height="20"/>
<polygon points="60,10 90,10 90,40"/>"#),
    );
    let sketch = Sketch::from_svg_file(&path, 64).unwrap();
    assert_eq!(sketch.geometry.0.len(), 2);
    assert!(approx_eq(sketch.area(), 600.0 + 450.0, 1e-9));
}

#[test]
fn circle_element() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_file(&dir, "dot.svg", &svg(r#"<circle cx="50" cy="50" r="40"/>"#));
    let sketch = Sketch::from_svg_file(&path, 128).unwrap();
    let rect = sketch.bounding_rect().unwrap();
    assert!(approx_eq(rect.center().x, 50.0, 1e-6));
    assert!(approx_eq(sketch.area(), std::f64::consts::PI * 1600.0, 10.0));
}

#[test]
fn path_with_arcs_and_curves() {
    let dir = tempfile::tempdir().unwrap();
    // a full circle from two half arcs, and a relative cubic blob
    let path = temp_file(
        &dir,
        "path.svg",
        &svg(r#"<path d="M 10 50 A 40 40 0 0 1 90 50 A 40 40 0 0 1 10 50 Z"/>"#),
    );
    let circle = Sketch::from_svg_file(&path, 128).unwrap();
    let rect = circle.bounding_rect().unwrap();
    assert!(approx_eq(rect.min().x, 10.0, 1e-6));
    assert!(approx_eq(rect.max().x, 90.0, 1e-6));
    assert!(approx_eq(rect.height(), 80.0, 0.1));
    assert!(approx_eq(circle.area(), std::f64::consts::PI * 1600.0, 10.0));

    let path = temp_file(
        &dir,
        "blob.svg",
        &svg(r#"<path d="M10,10 h80 v40 c0,20 -80,20 -80,0 z"/>"#),
    );
    let blob = Sketch::from_svg_file(&path, 64).unwrap();
    let rect = blob.bounding_rect().unwrap();
    assert!(approx_eq(rect.width(), 80.0, 1e-9));
    // the cubic bulges 15 units below its endpoints
    assert!(approx_eq(rect.max().y, 65.0, 0.1));
    assert!(blob.area() > 80.0 * 40.0);
}

#[test]
fn nested_rings_become_a_hole() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_file(
        &dir,
        "ring.svg",
        &svg(r#"<path d="M0,0 H100 V100 H0 Z M25,25 H75 V75 H25 Z"/>"#),
    );
    let sketch = Sketch::from_svg_file(&path, 64).unwrap();
    assert_eq!(sketch.geometry.0.len(), 1);
    assert_eq!(sketch.geometry.0[0].interiors().len(), 1);
    assert!(approx_eq(sketch.area(), 10000.0 - 2500.0, 1e-9));
}

#[test]
fn drawing_without_shapes_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_file(&dir, "empty.svg", &svg(r#"<text x="0" y="10">hi</text>"#));
    assert!(matches!(
        Sketch::from_svg_file(&path, 64),
        Err(IoError::MalformedInput(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Sketch::from_svg_file(dir.path().join("nope.svg"), 64);
    assert!(matches!(result, Err(IoError::StdIo(_))));
}

#[test]
fn svg_icon_fills_its_square() {
    let dir = tempfile::tempdir().unwrap();
    // a triangle pointing up in SVG coordinates (y down)
    let path = temp_file(
        &dir,
        "icon.svg",
        &svg(r#"<polygon points="0,100 100,100 50,0"/>"#),
    );
    let spec = LabelSpec {
        use_icon: true,
        icon_type: IconType::Svg,
        icon_svg: Some(path),
        icon_size: 10.0,
        icon_position_x: -20.0,
        icon_position_y: 1.0,
        ..textless_spec()
    };
    let layers = compose_layers(&spec).unwrap();
    let icon = layer(&layers, LayerKind::Icon);
    assert!(approx_eq(icon.z_offset, spec.base_thickness() + spec.inlay_thickness, 1e-12));

    let LayerShape::Outline(outline) = &icon.shape else {
        panic!("svg icons are outlines");
    };
    let rect = outline.bounding_rect().unwrap();
    assert!(approx_eq(rect.min().x, -25.0, 1e-9));
    assert!(approx_eq(rect.max().x, -15.0, 1e-9));
    assert!(approx_eq(rect.min().y, -4.0, 1e-9));
    assert!(approx_eq(rect.max().y, 6.0, 1e-9));
    assert!(approx_eq(outline.area(), 50.0, 1e-9));

    // the apex is on top once y points up
    let apex = outline.geometry.0[0]
        .exterior()
        .coords()
        .max_by(|a, b| a.y.total_cmp(&b.y))
        .unwrap();
    assert!(approx_eq(apex.x, -20.0, 1e-9));
}

#[test]
fn unreadable_icon_fails_the_label() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.svg");
    let spec = LabelSpec {
        use_icon: true,
        icon_type: IconType::Svg,
        icon_svg: Some(missing.clone()),
        ..textless_spec()
    };
    match compose_layers(&spec) {
        Err(LabelError::IconLoad { path, .. }) => assert_eq!(path, missing),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn transform_lists() {
    assert_eq!(transformed("", 3.0, 4.0), (3.0, 4.0));
    assert_eq!(transformed("translate(10)", 1.0, 1.0), (11.0, 1.0));
    // the rightmost entry applies first
    assert_eq!(transformed("translate(10, 5) scale(2)", 1.0, 1.0), (12.0, 7.0));
    assert_eq!(transformed("scale(2),translate(10 5)", 1.0, 1.0), (22.0, 12.0));
    assert_eq!(transformed("matrix(1 0 0 1 40 50)", 0.0, 0.0), (40.0, 50.0));
    assert_eq!(transformed("scale(2 3)", 1.0, 1.0), (2.0, 3.0));

    let (x, y) = transformed("rotate(90)", 1.0, 0.0);
    assert!(approx_eq(x, 0.0, 1e-12) && approx_eq(y, 1.0, 1e-12));
    let (x, y) = transformed("rotate(180 5 5)", 0.0, 0.0);
    assert!(approx_eq(x, 10.0, 1e-12) && approx_eq(y, 10.0, 1e-12));
    let (x, y) = transformed("skewX(45)", 0.0, 2.0);
    assert!(approx_eq(x, 2.0, 1e-12) && approx_eq(y, 2.0, 1e-12));

    for bad in ["translate(1, 2, 3)", "perspective(1)", "scale(2", "rotate(x)"] {
        assert!(
            matches!(parse_transform(bad), Err(IoError::MalformedInput(_))),
            "{bad}"
        );
    }
}

#[test]
fn group_transforms_nest_and_end_with_the_group() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_file(
        &dir,
        "groups.svg",
        &svg(r#"<g transform="translate(10, 20)">
  <rect width="10" height="10"/>
  <g transform="scale(2)">
    <rect x="10" width="5" height="5"/>
  </g>
</g>
<rect x="80" y="80" width="10" height="10"/>"#),
    );
    let sketch = Sketch::from_svg_file(&path, 64).unwrap();
    assert_eq!(sketch.geometry.0.len(), 3);
    assert!(approx_eq(sketch.area(), 300.0, 1e-9));

    let mut extents: Vec<[f64; 4]> = sketch
        .geometry
        .0
        .iter()
        .map(|polygon| {
            let rect = Sketch::from_polygons(vec![polygon.clone()]).bounding_rect().unwrap();
            [rect.min().x, rect.min().y, rect.max().x, rect.max().y]
        })
        .collect();
    extents.sort_by(|a, b| a[0].total_cmp(&b[0]));
    assert_eq!(
        extents,
        vec![
            [10.0, 20.0, 20.0, 30.0],
            [30.0, 20.0, 40.0, 30.0],
            [80.0, 80.0, 90.0, 90.0],
        ]
    );
}

#[test]
fn element_transform_applies_to_its_own_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_file(
        &dir,
        "moved.svg",
        &svg(r#"<circle r="10" transform="translate(50 50) scale(2, 1)"/>"#),
    );
    let sketch = Sketch::from_svg_file(&path, 128).unwrap();
    let rect = sketch.bounding_rect().unwrap();
    assert!(approx_eq(rect.min().x, 30.0, 1e-9));
    assert!(approx_eq(rect.max().x, 70.0, 1e-9));
    assert!(approx_eq(rect.height(), 20.0, 0.01));
    assert!(approx_eq(sketch.area(), std::f64::consts::PI * 200.0, 2.0));
}

#[test]
fn view_boxes() {
    let rect = parse_view_box("0 0 24 24").unwrap();
    assert_eq!((rect.min().x, rect.max().x, rect.max().y), (0.0, 24.0, 24.0));
    let rect = parse_view_box(" -5,-5 10,20 ").unwrap();
    assert_eq!((rect.min().y, rect.width(), rect.height()), (-5.0, 10.0, 20.0));

    for bad in ["0 0 24", "0 0 0 10", "0 0 10 -1", "a b c d"] {
        assert!(
            matches!(parse_view_box(bad), Err(IoError::MalformedInput(_))),
            "{bad}"
        );
    }
}

#[test]
fn drawing_reports_its_view_box() {
    let dir = tempfile::tempdir().unwrap();
    let framed = temp_file(
        &dir,
        "framed.svg",
        &svg_with_root(r#"viewBox="0 0 24 24""#, r#"<rect width="24" height="24"/>"#),
    );
    let drawing = read_svg(&framed, 64).unwrap();
    assert_eq!(drawing.view_box.map(|r| r.width()), Some(24.0));

    let bare = temp_file(
        &dir,
        "bare.svg",
        &svg_with_root(r#"width="24" height="24""#, r#"<rect width="24" height="24"/>"#),
    );
    assert_eq!(read_svg(&bare, 64).unwrap().view_box, None);

    let broken = temp_file(
        &dir,
        "broken.svg",
        &svg_with_root(r#"viewBox="0 0 0 24""#, r#"<rect width="24" height="24"/>"#),
    );
    assert!(matches!(read_svg(&broken, 64), Err(IoError::MalformedInput(_))));

    let nested = temp_file(
        &dir,
        "nested.svg",
        &svg(r#"<svg viewBox="0 0 10 10"><rect width="10" height="10"/></svg>"#),
    );
    assert!(matches!(read_svg(&nested, 64), Err(IoError::MalformedInput(_))));
}

#[test]
fn icon_is_fitted_to_its_view_box() {
    let dir = tempfile::tempdir().unwrap();
    // a 24 unit icon set glyph, apex up once y points up
    let path = temp_file(
        &dir,
        "small.svg",
        &svg_with_root(r#"viewBox="0 0 24 24""#, r#"<polygon points="0,24 24,24 12,0"/>"#),
    );
    let spec = LabelSpec {
        icon_position_x: 10.0,
        ..svg_icon(path, 12.0)
    };
    let layers = compose_layers(&spec).unwrap();
    let LayerShape::Outline(outline) = &layer(&layers, LayerKind::Icon).shape else {
        panic!("svg icons are outlines");
    };
    let rect = outline.bounding_rect().unwrap();
    assert!(approx_eq(rect.min().x, 4.0, 1e-9));
    assert!(approx_eq(rect.max().x, 16.0, 1e-9));
    assert!(approx_eq(rect.min().y, -6.0, 1e-9));
    assert!(approx_eq(rect.max().y, 6.0, 1e-9));
    assert!(approx_eq(outline.area(), 72.0, 1e-9));

    // the longer side spans the icon size
    let path = temp_file(
        &dir,
        "wide.svg",
        &svg_with_root(r#"viewBox="0 0 200 100""#, r#"<rect width="200" height="100"/>"#),
    );
    let layers = compose_layers(&svg_icon(path, 10.0)).unwrap();
    let LayerShape::Outline(outline) = &layer(&layers, LayerKind::Icon).shape else {
        panic!("svg icons are outlines");
    };
    let rect = outline.bounding_rect().unwrap();
    assert!(approx_eq(rect.width(), 10.0, 1e-9));
    assert!(approx_eq(rect.height(), 5.0, 1e-9));
}

#[test]
fn unsupported_transform_fails_the_icon() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_file(
        &dir,
        "perspective.svg",
        &svg(r#"<g transform="perspective(3)"><rect width="10" height="10"/></g>"#),
    );
    match compose_layers(&svg_icon(path.clone(), 10.0)) {
        Err(LabelError::IconLoad {
            path: failed,
            source: IoError::MalformedInput(_),
        }) => assert_eq!(failed, path),
        other => panic!("unexpected {other:?}"),
    }
}
