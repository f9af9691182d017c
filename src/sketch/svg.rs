//! Outlines from SVG drawings.
//!
//! Filled shapes are read from `<path>`, `<polygon>`, `<polyline>`, `<rect>`
//! and `<circle>` elements. Coordinates are in the user units of the root
//! `<svg>` element with y pointing down. `transform` attributes are applied,
//! nested through groups; strokes and styles are ignored.

use crate::float_types::{EPSILON, Real, TAU};
use crate::io::IoError;
use crate::sketch::Sketch;
use geo::{Coord, LineString, MapCoords, Rect};
use nalgebra::{Matrix3, Vector2, Vector3};
use nom::{
    IResult,
    branch::alt,
    character::complete::{alpha1, char, multispace0, multispace1},
    combinator::{all_consuming, opt, value},
    multi::{many0, separated_list0},
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated, tuple},
};
use std::collections::HashMap;
use std::path::Path;
use svg::node::Value;
use svg::node::element::path::{Command, Data, Position};
use svg::node::element::tag::Type;
use svg::parser::Event;

type Attributes = HashMap<String, Value>;

/// The filled outlines of an SVG file and the `viewBox` of its root element.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgDrawing {
    pub sketch: Sketch,
    pub view_box: Option<Rect<Real>>,
}

/// Read every filled shape of the SVG file at `path`.
///
/// A drawing without any supported shape is an error, so an icon is
/// never silently replaced by nothing. So is a transform or `viewBox` that
/// cannot be honored.
pub fn read_svg(path: impl AsRef<Path>, segments: usize) -> Result<SvgDrawing, IoError> {
    let mut content = String::new();
    let parser = svg::open(path.as_ref(), &mut content)?;
    let mut contours = Vec::new();
    let mut view_box = None;
    let mut seen_root = false;
    // one entry per open element; the bottom is the identity
    let mut stack = vec![Matrix3::identity()];

    for event in parser {
        match event {
            Event::Error(error) => return Err(error.into()),
            Event::Tag(tag, tag_type, attributes) => {
                if tag_type == Type::End {
                    if stack.len() > 1 {
                        stack.pop();
                    }
                    continue;
                }
                if tag == "svg" {
                    if seen_root {
                        return Err(IoError::MalformedInput(
                            "nested <svg> elements are not supported".to_string(),
                        ));
                    }
                    seen_root = true;
                    view_box = attributes
                        .get("viewBox")
                        .map(|raw| parse_view_box(raw))
                        .transpose()?;
                }

                let parent = stack.last().copied().unwrap_or_else(Matrix3::identity);
                let own = match attributes.get("transform") {
                    Some(raw) => parent * parse_transform(raw)?,
                    None => parent,
                };
                contours.extend(
                    element_contours(tag, &attributes, segments)?
                        .into_iter()
                        .map(|contour| apply(&own, contour)),
                );
                if tag_type == Type::Start {
                    stack.push(own);
                }
            },
            _ => {},
        }
    }

    let sketch = Sketch::from_contours(contours);
    if sketch.is_empty() {
        return Err(IoError::MalformedInput(format!(
            "{} contains no filled shapes",
            path.as_ref().display()
        )));
    }
    Ok(SvgDrawing { sketch, view_box })
}

impl Sketch {
    /// The outlines of [`read_svg`], without the drawing's frame.
    pub fn from_svg_file(path: impl AsRef<Path>, segments: usize) -> Result<Sketch, IoError> {
        read_svg(path, segments).map(|drawing| drawing.sketch)
    }
}

fn apply(matrix: &Matrix3<Real>, contour: LineString<Real>) -> LineString<Real> {
    contour.map_coords(|c| {
        let p = matrix * Vector3::new(c.x, c.y, 1.0);
        Coord { x: p.x, y: p.y }
    })
}

fn element_contours(
    tag: &str,
    attributes: &Attributes,
    segments: usize,
) -> Result<Vec<LineString<Real>>, IoError> {
    match tag {
        "path" => match attributes.get("d") {
            Some(d) => path_contours(&Data::parse(d)?, segments),
            None => Ok(Vec::new()),
        },
        "polygon" | "polyline" => match attributes.get("points") {
            Some(points) => {
                let coords = parse_points(points)?;
                Ok(vec![LineString::from(coords)])
            },
            None => Ok(Vec::new()),
        },
        "rect" => {
            let x = number(attributes, "x")?.unwrap_or(0.0);
            let y = number(attributes, "y")?.unwrap_or(0.0);
            let width = number(attributes, "width")?;
            let height = number(attributes, "height")?;
            let (Some(w), Some(h)) = (width, height) else {
                return Ok(Vec::new());
            };
            Ok(vec![LineString::from(vec![
                (x, y),
                (x + w, y),
                (x + w, y + h),
                (x, y + h),
            ])])
        },
        "circle" => {
            let cx = number(attributes, "cx")?.unwrap_or(0.0);
            let cy = number(attributes, "cy")?.unwrap_or(0.0);
            let Some(r) = number(attributes, "r")? else {
                return Ok(Vec::new());
            };
            let n = segments.max(3);
            Ok(vec![LineString::from(
                (0..n)
                    .map(|i| {
                        let t = TAU * i as Real / n as Real;
                        (cx + r * t.cos(), cy + r * t.sin())
                    })
                    .collect::<Vec<_>>(),
            )])
        },
        _ => Ok(Vec::new()),
    }
}

fn number(attributes: &Attributes, name: &str) -> Result<Option<Real>, IoError> {
    match attributes.get(name) {
        // unit suffixes such as "px" are user units here
        Some(raw) => Ok(Some(raw.trim().trim_end_matches("px").parse::<Real>()?)),
        None => Ok(None),
    }
}

/// Separator between numbers of a points list: a comma and/or whitespace.
fn separator(input: &str) -> IResult<&str, ()> {
    alt((
        value((), tuple((multispace0, char(','), multispace0))),
        value((), multispace1),
    ))(input)
}

fn points_list(input: &str) -> IResult<&str, Vec<(Real, Real)>> {
    delimited(
        multispace0,
        separated_list0(separator, pair(double, preceded(separator, double))),
        multispace0,
    )(input)
}

/// Parse the `points` attribute of `<polygon>` / `<polyline>`.
pub fn parse_points(input: &str) -> Result<Vec<(Real, Real)>, IoError> {
    all_consuming(points_list)(input)
        .map(|(_, points)| points)
        .map_err(|e| IoError::MalformedInput(format!("points list: {e}")))
}

fn number_list(input: &str) -> IResult<&str, Vec<Real>> {
    delimited(multispace0, separated_list0(separator, double), multispace0)(input)
}

/// `name(args)`, as in `translate(10, 5)`.
fn transform_item(input: &str) -> IResult<&str, (&str, Vec<Real>)> {
    pair(
        alpha1,
        delimited(
            tuple((multispace0, char('('))),
            number_list,
            char(')'),
        ),
    )(input)
}

fn transform_list(input: &str) -> IResult<&str, Vec<(&str, Vec<Real>)>> {
    preceded(multispace0, many0(terminated(transform_item, opt(separator))))(input)
}

/// Parse a `transform` attribute into one affine matrix in homogeneous
/// coordinates. The leftmost entry is applied last.
pub fn parse_transform(input: &str) -> Result<Matrix3<Real>, IoError> {
    let (_, items) = all_consuming(transform_list)(input)
        .map_err(|e| IoError::MalformedInput(format!("transform list: {e}")))?;
    items.iter().try_fold(Matrix3::identity(), |acc, (name, args)| {
        transform_matrix(name, args).map(|m| acc * m)
    })
}

fn transform_matrix(name: &str, args: &[Real]) -> Result<Matrix3<Real>, IoError> {
    let translation = |x: Real, y: Real| Matrix3::new_translation(&Vector2::new(x, y));
    Ok(match (name, args) {
        ("matrix", &[a, b, c, d, e, f]) => Matrix3::new(a, c, e, b, d, f, 0.0, 0.0, 1.0),
        ("translate", &[x]) => translation(x, 0.0),
        ("translate", &[x, y]) => translation(x, y),
        ("scale", &[s]) => Matrix3::new_scaling(s),
        ("scale", &[sx, sy]) => Matrix3::new_nonuniform_scaling(&Vector2::new(sx, sy)),
        ("rotate", &[angle]) => Matrix3::new_rotation(angle.to_radians()),
        ("rotate", &[angle, cx, cy]) => {
            translation(cx, cy) * Matrix3::new_rotation(angle.to_radians()) * translation(-cx, -cy)
        },
        ("skewX", &[angle]) => {
            Matrix3::new(1.0, angle.to_radians().tan(), 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0)
        },
        ("skewY", &[angle]) => {
            Matrix3::new(1.0, 0.0, 0.0, angle.to_radians().tan(), 1.0, 0.0, 0.0, 0.0, 1.0)
        },
        _ => {
            return Err(IoError::MalformedInput(format!(
                "unsupported transform {name} with {} arguments",
                args.len()
            )));
        },
    })
}

/// Parse a `viewBox` attribute: `min-x min-y width height`, with a
/// positive width and height.
pub fn parse_view_box(input: &str) -> Result<Rect<Real>, IoError> {
    let (_, numbers) = all_consuming(number_list)(input)
        .map_err(|e| IoError::MalformedInput(format!("viewBox: {e}")))?;
    match numbers[..] {
        [x, y, w, h] if w > 0.0 && h > 0.0 => Ok(Rect::new(
            Coord { x, y },
            Coord { x: x + w, y: y + h },
        )),
        _ => Err(IoError::MalformedInput(format!(
            "viewBox needs a position and a positive size, got {input:?}"
        ))),
    }
}

/// Flatten path data into closed contours.
///
/// Every subpath becomes a contour, closed or not, because an icon is a
/// filled area.
fn path_contours(data: &Data, segments: usize) -> Result<Vec<LineString<Real>>, IoError> {
    let curve_steps = (segments / 8).max(2);
    let mut contours = Vec::new();
    let mut current: Vec<Coord<Real>> = Vec::new();
    let mut pen = Coord { x: 0.0, y: 0.0 };
    let mut start = pen;
    // reflected control point for S / T commands
    let mut last_cubic: Option<Coord<Real>> = None;
    let mut last_quad: Option<Coord<Real>> = None;

    let flush = |current: &mut Vec<Coord<Real>>, contours: &mut Vec<LineString<Real>>| {
        let contour = std::mem::take(current);
        if contour.len() >= 3 {
            contours.push(LineString::new(contour));
        }
    };

    for command in data.iter() {
        let mut cubic_control = None;
        let mut quad_control = None;
        match command {
            Command::Move(position, params) => {
                flush(&mut current, &mut contours);
                for (i, p) in pairs(params)?.into_iter().enumerate() {
                    pen = resolve(*position, pen, p);
                    if i == 0 {
                        start = pen;
                    }
                    current.push(pen);
                }
            },
            Command::Line(position, params) => {
                for p in pairs(params)? {
                    pen = resolve(*position, pen, p);
                    current.push(pen);
                }
            },
            Command::HorizontalLine(position, params) => {
                for &x in params.iter() {
                    let x = Real::from(x);
                    pen.x = if *position == Position::Relative { pen.x + x } else { x };
                    current.push(pen);
                }
            },
            Command::VerticalLine(position, params) => {
                for &y in params.iter() {
                    let y = Real::from(y);
                    pen.y = if *position == Position::Relative { pen.y + y } else { y };
                    current.push(pen);
                }
            },
            Command::QuadraticCurve(position, params) => {
                for chunk in groups::<4>(params)? {
                    let c = resolve(*position, pen, (chunk[0], chunk[1]));
                    let end = resolve(*position, pen, (chunk[2], chunk[3]));
                    quad(&mut current, pen, c, end, curve_steps);
                    pen = end;
                    quad_control = Some(c);
                }
            },
            Command::SmoothQuadraticCurve(position, params) => {
                for p in pairs(params)? {
                    let c = reflect(last_quad.or(quad_control), pen);
                    let end = resolve(*position, pen, p);
                    quad(&mut current, pen, c, end, curve_steps);
                    pen = end;
                    quad_control = Some(c);
                    last_quad = quad_control;
                }
            },
            Command::CubicCurve(position, params) => {
                for chunk in groups::<6>(params)? {
                    let c1 = resolve(*position, pen, (chunk[0], chunk[1]));
                    let c2 = resolve(*position, pen, (chunk[2], chunk[3]));
                    let end = resolve(*position, pen, (chunk[4], chunk[5]));
                    cubic(&mut current, pen, c1, c2, end, curve_steps);
                    pen = end;
                    cubic_control = Some(c2);
                }
            },
            Command::SmoothCubicCurve(position, params) => {
                for chunk in groups::<4>(params)? {
                    let c1 = reflect(last_cubic.or(cubic_control), pen);
                    let c2 = resolve(*position, pen, (chunk[0], chunk[1]));
                    let end = resolve(*position, pen, (chunk[2], chunk[3]));
                    cubic(&mut current, pen, c1, c2, end, curve_steps);
                    pen = end;
                    cubic_control = Some(c2);
                    last_cubic = cubic_control;
                }
            },
            Command::EllipticalArc(position, params) => {
                for chunk in groups::<7>(params)? {
                    let end = resolve(*position, pen, (chunk[5], chunk[6]));
                    let arc = ArcParams {
                        rx: chunk[0].abs(),
                        ry: chunk[1].abs(),
                        rotation: chunk[2].to_radians(),
                        large_arc: chunk[3] != 0.0,
                        sweep: chunk[4] != 0.0,
                    };
                    elliptical_arc(&mut current, pen, end, arc, segments);
                    pen = end;
                }
            },
            Command::Close => {
                flush(&mut current, &mut contours);
                pen = start;
            },
        }
        last_cubic = cubic_control;
        last_quad = quad_control;
    }
    flush(&mut current, &mut contours);
    Ok(contours)
}

fn resolve(position: Position, pen: Coord<Real>, (x, y): (Real, Real)) -> Coord<Real> {
    match position {
        Position::Absolute => Coord { x, y },
        Position::Relative => Coord {
            x: pen.x + x,
            y: pen.y + y,
        },
    }
}

fn reflect(control: Option<Coord<Real>>, pen: Coord<Real>) -> Coord<Real> {
    match control {
        Some(c) => Coord {
            x: 2.0 * pen.x - c.x,
            y: 2.0 * pen.y - c.y,
        },
        None => pen,
    }
}

fn pairs(params: &[f32]) -> Result<Vec<(Real, Real)>, IoError> {
    Ok(groups::<2>(params)?.into_iter().map(|g| (g[0], g[1])).collect())
}

fn groups<const N: usize>(params: &[f32]) -> Result<Vec<[Real; N]>, IoError> {
    if params.len() % N != 0 {
        return Err(IoError::MalformedInput(format!(
            "path command expects a multiple of {N} numbers, got {}",
            params.len()
        )));
    }
    Ok(params
        .chunks_exact(N)
        .map(|chunk| std::array::from_fn(|i| Real::from(chunk[i])))
        .collect())
}

fn quad(
    out: &mut Vec<Coord<Real>>,
    p0: Coord<Real>,
    c: Coord<Real>,
    p: Coord<Real>,
    steps: usize,
) {
    for i in 1..=steps {
        let t = i as Real / steps as Real;
        let u = 1.0 - t;
        out.push(Coord {
            x: u * u * p0.x + 2.0 * u * t * c.x + t * t * p.x,
            y: u * u * p0.y + 2.0 * u * t * c.y + t * t * p.y,
        });
    }
}

fn cubic(
    out: &mut Vec<Coord<Real>>,
    p0: Coord<Real>,
    c1: Coord<Real>,
    c2: Coord<Real>,
    p: Coord<Real>,
    steps: usize,
) {
    for i in 1..=steps {
        let t = i as Real / steps as Real;
        let u = 1.0 - t;
        let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        out.push(Coord {
            x: a * p0.x + b * c1.x + c * c2.x + d * p.x,
            y: a * p0.y + b * c1.y + c * c2.y + d * p.y,
        });
    }
}

#[derive(Clone, Copy, Debug)]
struct ArcParams {
    rx: Real,
    ry: Real,
    rotation: Real,
    large_arc: bool,
    sweep: bool,
}

/// Endpoint-parameterized elliptical arc (SVG 1.1, appendix F.6), flattened.
fn elliptical_arc(
    out: &mut Vec<Coord<Real>>,
    p0: Coord<Real>,
    p: Coord<Real>,
    arc: ArcParams,
    segments: usize,
) {
    let ArcParams {
        mut rx,
        mut ry,
        rotation,
        large_arc,
        sweep,
    } = arc;
    if rx < EPSILON || ry < EPSILON {
        out.push(p);
        return;
    }
    let (sin_phi, cos_phi) = rotation.sin_cos();
    let dx = 0.5 * (p0.x - p.x);
    let dy = 0.5 * (p0.y - p.y);
    let x1 = cos_phi * dx + sin_phi * dy;
    let y1 = -sin_phi * dx + cos_phi * dy;

    // scale radii up when the endpoints are too far apart
    let lambda = (x1 * x1) / (rx * rx) + (y1 * y1) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let num = rx * rx * ry * ry - rx * rx * y1 * y1 - ry * ry * x1 * x1;
    let den = rx * rx * y1 * y1 + ry * ry * x1 * x1;
    let mut coef = if den > 0.0 { (num / den).max(0.0).sqrt() } else { 0.0 };
    if large_arc == sweep {
        coef = -coef;
    }
    let cx1 = coef * rx * y1 / ry;
    let cy1 = -coef * ry * x1 / rx;
    let cx = cos_phi * cx1 - sin_phi * cy1 + 0.5 * (p0.x + p.x);
    let cy = sin_phi * cx1 + cos_phi * cy1 + 0.5 * (p0.y + p.y);

    let angle = |ux: Real, uy: Real| uy.atan2(ux);
    let theta1 = angle((x1 - cx1) / rx, (y1 - cy1) / ry);
    let mut delta = angle((-x1 - cx1) / rx, (-y1 - cy1) / ry) - theta1;
    if sweep && delta < 0.0 {
        delta += TAU;
    } else if !sweep && delta > 0.0 {
        delta -= TAU;
    }

    let steps = ((delta.abs() / TAU) * segments as Real).ceil().max(1.0) as usize;
    for i in 1..=steps {
        if i == steps {
            out.push(p);
            break;
        }
        let t = theta1 + delta * (i as Real / steps as Real);
        let (sin_t, cos_t) = t.sin_cos();
        out.push(Coord {
            x: cos_phi * rx * cos_t - sin_phi * ry * sin_t + cx,
            y: sin_phi * rx * cos_t + cos_phi * ry * sin_t + cy,
        });
    }
}
