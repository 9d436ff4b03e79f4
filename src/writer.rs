//! Serialization of paths back into an SVG document.
//!
//! Every path becomes one `<path>` element with absolute `M`, `L`, `Q`, `C`
//! and `Z` commands only. Numbers go through a single shared [`Formatter`].

use std::collections::HashSet;
use std::io::Cursor;

use lazy_static::lazy_static;
use log::{trace, warn};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::attributes::{AttributeSet, AttributeValue};
use crate::error::Error;
use crate::path::{Bounds, Path, Point, Segment};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const COORDINATE_DIGITS: usize = 3;
const OPACITY_DIGITS: usize = 2;

lazy_static! {
    /// Formatter used by [`serialize`].
    pub static ref FORMATTER: Formatter = Formatter::new(COORDINATE_DIGITS, OPACITY_DIGITS);
}

/// Number formatting settings, immutable once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Formatter {
    coordinate_digits: usize,
    opacity_digits: usize,
}

/// Exponents outside this range are written in exponent notation.
const PLAIN_EXPONENTS: std::ops::Range<i32> = -7..21;

/// Format `value` rounded to `digits` significant digits, without trailing
/// zeros. Infinities are written as the largest finite value of the same
/// sign, NaN as `0`.
fn format_significant(value: f64, digits: usize) -> String {
    if value.is_nan() {
        warn!("format_significant: Writing NaN as 0");
        return "0".to_string();
    }
    let value = if value.is_infinite() {
        f64::MAX.copysign(value)
    } else {
        value
    };
    if value == 0.0 {
        return "0".to_string();
    }

    let scientific = format!("{:.*e}", digits.max(1) - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exponent) => (mantissa, exponent),
            Err(_) => return scientific,
        },
        None => return scientific,
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(mantissa) => ("-", mantissa),
        None => ("", mantissa),
    };
    let significant: String = mantissa.chars().filter(|c| *c != '.').collect();
    let significant = significant.trim_end_matches('0');
    let significant = if significant.is_empty() { "0" } else { significant };

    if !PLAIN_EXPONENTS.contains(&exponent) {
        let (first, rest) = significant.split_at(1);
        return if rest.is_empty() {
            format!("{}{}e{}", sign, first, exponent)
        } else {
            format!("{}{}.{}e{}", sign, first, rest, exponent)
        };
    }
    if exponent < 0 {
        let zeros = "0".repeat(exponent.unsigned_abs() as usize - 1);
        return format!("{}0.{}{}", sign, zeros, significant);
    }
    let integer_len = exponent.unsigned_abs() as usize + 1;
    if significant.len() <= integer_len {
        let zeros = "0".repeat(integer_len - significant.len());
        format!("{}{}{}", sign, significant, zeros)
    } else {
        let (integer, fraction) = significant.split_at(integer_len);
        format!("{}{}.{}", sign, integer, fraction)
    }
}

impl Formatter {
    pub fn new(coordinate_digits: usize, opacity_digits: usize) -> Self {
        Self {
            coordinate_digits,
            opacity_digits,
        }
    }

    pub fn coordinate(&self, value: f64) -> String {
        format_significant(value, self.coordinate_digits)
    }

    pub fn opacity(&self, value: f64) -> String {
        format_significant(value, self.opacity_digits)
    }

    fn push_command(&self, data: &mut String, command: char, points: &[Point]) {
        data.push(command);
        let coordinates: Vec<String> = points
            .iter()
            .flat_map(|p| vec![self.coordinate(p.x), self.coordinate(p.y)])
            .collect();
        data.push_str(&coordinates.join(","));
    }

    /// The compact, absolute path definition of `path`.
    pub fn path_data(&self, path: &Path) -> String {
        let mut data = String::new();
        for segment in path {
            match *segment {
                Segment::MoveTo(p) => self.push_command(&mut data, 'M', &[p]),
                Segment::LineTo(p) => self.push_command(&mut data, 'L', &[p]),
                Segment::QuadCurveTo(ctrl, end) => {
                    self.push_command(&mut data, 'Q', &[ctrl, end]);
                }
                Segment::CubicCurveTo(ctrl1, ctrl2, end) => {
                    self.push_command(&mut data, 'C', &[ctrl1, ctrl2, end]);
                }
                Segment::ClosePath => data.push('Z'),
            }
        }
        data
    }

    /// Attribute name/value pairs for one `<path>` element.
    ///
    /// Colors are written as hex triplets, plus a `<name>-opacity` attribute
    /// if they are not opaque. That generated opacity replaces an explicit
    /// one of the same name.
    pub fn attribute_pairs(&self, attributes: &AttributeSet) -> Vec<(String, String)> {
        let generated: HashSet<String> = attributes
            .iter()
            .filter(|(_, value)| value.as_color().map_or(false, |c| !c.is_opaque()))
            .map(|(name, _)| format!("{}-opacity", name))
            .collect();

        let mut pairs = Vec::new();
        for (name, value) in attributes.iter() {
            if name == "d" {
                warn!("attribute_pairs: Ignoring 'd' attribute");
                continue;
            }
            match value {
                AttributeValue::Text(_) if generated.contains(name) => {}
                AttributeValue::Text(text) => pairs.push((name.to_string(), text.clone())),
                AttributeValue::Color(color) => {
                    pairs.push((name.to_string(), color.to_hex()));
                    if !color.is_opaque() {
                        pairs.push((format!("{}-opacity", name), self.opacity(color.a)));
                    }
                }
            }
        }
        pairs
    }
}

/// Union of the origin and the bounding boxes of all `paths`.
pub fn document_bounds(paths: &[Path]) -> Bounds {
    let mut corners = vec![lyon_geom::point(0.0, 0.0)];
    for bbox in paths.iter().filter_map(Path::bounding_box) {
        corners.push(bbox.min);
        corners.push(bbox.max);
    }
    Bounds::from_points(corners)
}

/// Serialize `paths` with the shared [`FORMATTER`].
///
/// `attributes[i]` belongs to `paths[i]`; missing entries mean no attributes.
pub fn serialize(paths: &[Path], attributes: &[Option<AttributeSet>]) -> Result<String, Error> {
    serialize_with(&FORMATTER, paths, attributes)
}

/// Serialize `paths` with a custom formatter.
pub fn serialize_with(
    formatter: &Formatter,
    paths: &[Path],
    attributes: &[Option<AttributeSet>],
) -> Result<String, Error> {
    trace!("serialize: {} paths", paths.len());

    let bounds = document_bounds(paths);
    let width = format!("{:.0}", bounds.width().round());
    let height = format!("{:.0}", bounds.height().round());

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new(
        b"1.0",
        Some(&b"UTF-8"[..]),
        Some(&b"no"[..]),
    )))?;

    let mut svg = BytesStart::borrowed_name(b"svg");
    svg.push_attribute(("xmlns", SVG_NAMESPACE));
    svg.push_attribute(("version", "1.1"));
    svg.push_attribute(("width", width.as_str()));
    svg.push_attribute(("height", height.as_str()));
    writer.write_event(Event::Start(svg))?;

    for (index, path) in paths.iter().enumerate() {
        let data = formatter.path_data(path);
        let pairs = attributes
            .get(index)
            .and_then(Option::as_ref)
            .map(|set| formatter.attribute_pairs(set))
            .unwrap_or_default();

        let mut element = BytesStart::borrowed_name(b"path");
        element.push_attribute(("d", data.as_str()));
        for (name, value) in &pairs {
            element.push_attribute((name.as_str(), value.as_str()));
        }
        writer.write_event(Event::Empty(element))?;
    }

    writer.write_event(Event::End(BytesEnd::borrowed(b"svg")))?;
    let svg = String::from_utf8(writer.into_inner().into_inner())?;
    trace!("serialize: Wrote {} bytes", svg.len());
    Ok(svg)
}
