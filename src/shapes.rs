//! Extraction of shapes from an SVG document.
//!
//! Each supported element is turned into a path definition plus its
//! remaining (non geometry) attributes. Rectangles, polygons and polylines
//! are expanded into equivalent path syntax.

use std::str;
use std::str::FromStr;

use log::{debug, trace, warn};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use svgtypes::{Length, LengthUnit, PointsParser};

use crate::error::Error;

/// The element a shape was read from.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ShapeKind {
    Path,
    Rect,
    Polygon,
    Polyline,
}

impl ShapeKind {
    fn from_tag(name: &[u8]) -> Option<Self> {
        match name {
            b"path" => Some(ShapeKind::Path),
            b"rect" => Some(ShapeKind::Rect),
            b"polygon" => Some(ShapeKind::Polygon),
            b"polyline" => Some(ShapeKind::Polyline),
            _ => None,
        }
    }

    /// Attributes that describe the geometry and end up in the definition.
    fn geometry_attributes(self) -> &'static [&'static str] {
        match self {
            ShapeKind::Path => &["d"],
            ShapeKind::Rect => &["x", "y", "width", "height", "rx", "ry"],
            ShapeKind::Polygon | ShapeKind::Polyline => &["points"],
        }
    }
}

/// A shape as found in the document.
#[derive(Debug, PartialEq, Clone)]
pub struct Shape {
    pub kind: ShapeKind,
    /// Path definition, in path syntax for every kind.
    pub definition: String,
    /// Raw styling attributes in document order.
    pub attributes: Vec<(String, String)>,
}

/// Path definition of the rectangle `(x, y, width, height)`.
pub fn rect_definition(x: f64, y: f64, width: f64, height: f64) -> String {
    format!(
        "M {},{} H {} V {} H {} V {} Z",
        x,
        y,
        x + width,
        y + height,
        x,
        y
    )
}

/// Path definition of a polygon or polyline point list. A trailing odd
/// coordinate is ignored. Returns `None` if there is no point at all.
pub fn points_definition(points: &str, closed: bool) -> Option<String> {
    let mut pairs = PointsParser::from(points);
    let (x, y) = pairs.next()?;
    let mut definition = format!("M {},{}", x, y);
    let rest: Vec<String> = pairs.map(|(x, y)| format!("{},{}", x, y)).collect();
    if !rest.is_empty() {
        definition.push_str(" L ");
        definition.push_str(&rest.join(" "));
    }
    if closed {
        definition.push_str(" Z");
    }
    Some(definition)
}

fn find<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn length(attributes: &[(String, String)], name: &str) -> Option<f64> {
    let value = find(attributes, name)?;
    match Length::from_str(value) {
        Ok(length) => {
            if length.unit != LengthUnit::None && length.unit != LengthUnit::Px {
                debug!("length: Ignoring unit of {}={:?}", name, value);
            }
            Some(length.number)
        }
        Err(e) => {
            warn!("Invalid length {}={:?}: {}", name, value, e);
            None
        }
    }
}

fn read_attributes(element: &BytesStart) -> Vec<(String, String)> {
    element
        .attributes()
        .filter_map(Result::ok)
        .filter_map(|attr: Attribute| {
            let key = str::from_utf8(attr.key).ok()?.to_string();
            let value = attr
                .unescaped_value()
                .ok()
                .and_then(|v| str::from_utf8(&v).map(str::to_string).ok())?;
            Some((key, value))
        })
        .collect()
}

impl Shape {
    /// Build a shape from the attributes of an element. Elements without
    /// usable geometry yield `None`.
    pub fn from_attributes(kind: ShapeKind, attributes: Vec<(String, String)>) -> Option<Self> {
        let definition = match kind {
            ShapeKind::Path => find(&attributes, "d").map(str::to_string),
            ShapeKind::Rect => {
                let x = length(&attributes, "x").unwrap_or(0.0);
                let y = length(&attributes, "y").unwrap_or(0.0);
                match (length(&attributes, "width"), length(&attributes, "height")) {
                    (Some(width), Some(height)) if width > 0.0 && height > 0.0 => {
                        Some(rect_definition(x, y, width, height))
                    }
                    _ => None,
                }
            }
            ShapeKind::Polygon => {
                find(&attributes, "points").and_then(|p| points_definition(p, true))
            }
            ShapeKind::Polyline => {
                find(&attributes, "points").and_then(|p| points_definition(p, false))
            }
        };
        let definition = match definition {
            Some(definition) => definition,
            None => {
                warn!("Skipping {:?} without usable geometry", kind);
                return None;
            }
        };

        let geometry = kind.geometry_attributes();
        let attributes = attributes
            .into_iter()
            .filter(|(k, _)| !geometry.contains(&k.as_str()))
            .collect();
        Some(Self {
            kind,
            definition,
            attributes,
        })
    }
}

/// Parse an SVG string, return the shapes in document order.
pub fn extract(svg: &str) -> Result<Vec<Shape>, Error> {
    trace!("extract");

    let mut reader = quick_xml::Reader::from_str(svg);
    reader.trim_text(true);

    let mut shapes = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if let Some(kind) = ShapeKind::from_tag(e.name()) {
                    trace!("extract: Found {:?}", kind);
                    if let Some(shape) = Shape::from_attributes(kind, read_attributes(e)) {
                        shapes.push(shape);
                    }
                }
            }
            Ok(Event::Eof) => {
                trace!("extract: EOF");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                return Err(Error::SvgParse(format!(
                    "Error when parsing XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }

        // If we don't keep a borrow elsewhere, we can clear the buffer to keep memory usage low
        buf.clear();
    }
    trace!("extract: Return {} shapes", shapes.len());
    Ok(shapes)
}
