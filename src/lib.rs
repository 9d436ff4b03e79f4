//! Convert SVG path definitions into a list of typed path segments and back.
//!
//! The core is the path definition parser ([`parse_path`]), which turns the
//! compact `d` attribute syntax into absolute `MoveTo`, `LineTo`,
//! `QuadCurveTo`, `CubicCurveTo` and `ClosePath` segments, and the writer
//! ([`writer::serialize`]), which emits paths as compact absolute path data
//! inside an SVG document.
//!
//! Around that core there is a simple shape extractor for `<path>`,
//! `<rect>`, `<polygon>` and `<polyline>` elements, a decoder for `fill` /
//! `stroke` colors and opacities, and a flattener that approximates paths by
//! polylines.
//!
//! Parsing never fails as a whole because of a bad path command or a bad
//! attribute. Such problems are returned as [`Diagnostic`]s next to
//! everything that could be built. Elliptical arcs are recognized but not
//! supported.
//!
//! You can optionally get serde 1 support by enabling the `serde` feature.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::single_match)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod attributes;
pub mod color;
mod error;
mod flatten;
pub mod parser;
mod path;
pub mod shapes;
pub mod writer;

use log::{debug, trace};

pub use crate::attributes::{AttributeSet, AttributeValue};
pub use crate::color::Color;
pub use crate::error::{CommandFault, Diagnostic, Error};
pub use crate::flatten::{Polyline, FLATTENING_TOLERANCE};
pub use crate::parser::{parse as parse_path, ParsedPath};
pub use crate::path::{Bounds, Path, Point, Segment};
pub use crate::shapes::ShapeKind;

/// A shape with its parsed path and decoded attributes.
#[derive(Debug, PartialEq, Clone)]
pub struct ParsedShape {
    pub kind: ShapeKind,
    pub path: Path,
    /// `None` if the shape has no styling attributes.
    pub attributes: Option<AttributeSet>,
    /// Problems in the path definition and the attributes of this shape.
    pub diagnostics: Vec<Diagnostic>,
}

/// The shapes of an SVG document, in document order.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Document {
    pub shapes: Vec<ParsedShape>,
}

impl Document {
    /// All diagnostics of all shapes.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.shapes.iter().flat_map(|shape| shape.diagnostics.iter())
    }

    /// Write the document back as SVG with absolute path data only.
    pub fn to_svg(&self) -> Result<String, Error> {
        let paths: Vec<Path> = self.shapes.iter().map(|s| s.path.clone()).collect();
        let attributes: Vec<Option<AttributeSet>> =
            self.shapes.iter().map(|s| s.attributes.clone()).collect();
        writer::serialize(&paths, &attributes)
    }

    /// Flatten all shapes into polylines.
    pub fn polylines(&self, tolerance: f64) -> Vec<Polyline> {
        self.shapes
            .iter()
            .flat_map(|shape| shape.path.flatten(tolerance))
            .collect()
    }
}

/// Parse and decode one extracted shape.
pub fn parse_shape(shape: &shapes::Shape) -> ParsedShape {
    let ParsedPath { path, mut diagnostics } = parser::parse(&shape.definition);
    let decoded = attributes::decode(shape.attributes.iter().map(|(k, v)| (k, v)));
    diagnostics.extend(decoded.diagnostics);
    ParsedShape {
        kind: shape.kind,
        path,
        attributes: decoded.attributes,
        diagnostics,
    }
}

/// Parse an SVG string into a [`Document`].
///
/// Only malformed XML is an error. Problems within single shapes are
/// reported as diagnostics of that shape.
pub fn parse(svg: &str) -> Result<Document, Error> {
    trace!("parse");

    // Parse the XML string into a list of shapes
    let shapes = shapes::extract(svg)?;
    trace!("parse: Found {} shapes", shapes.len());

    let document = Document {
        shapes: shapes.iter().map(parse_shape).collect(),
    };
    debug!(
        "parse: {} shapes with {} diagnostics",
        document.shapes.len(),
        document.diagnostics().count()
    );
    Ok(document)
}

#[cfg(test)]
#[allow(clippy::unreadable_literal)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let _ = env_logger::try_init();
        let input = r##"
            <?xml version="1.0" encoding="UTF-8" standalone="no"?>
            <svg xmlns="http://www.w3.org/2000/svg" version="1.1">
                <path d="M 10,10 20,15 10,20 Z" fill="#ff0000" fill-opacity="0.5" />
                <rect x="5" y="5" width="10" height="10" style="fill:none;stroke:#000"/>
            </svg>
        "##;
        let document = parse(input).unwrap();
        assert_eq!(document.shapes.len(), 2);
        assert_eq!(document.diagnostics().count(), 0);

        let path = &document.shapes[0];
        assert_eq!(path.kind, ShapeKind::Path);
        assert_eq!(path.path.len(), 4);
        let attributes = path.attributes.as_ref().unwrap();
        assert_eq!(
            attributes.get("fill"),
            Some(&AttributeValue::Color(Color::rgba(1.0, 0.0, 0.0, 0.5)))
        );
        assert!(!attributes.contains("fill-opacity"));

        let rect = &document.shapes[1];
        assert_eq!(rect.kind, ShapeKind::Rect);
        assert_eq!(
            rect.path.segments(),
            &[
                Segment::MoveTo((5., 5.).into()),
                Segment::LineTo((15., 5.).into()),
                Segment::LineTo((15., 15.).into()),
                Segment::LineTo((5., 15.).into()),
                Segment::LineTo((5., 5.).into()),
                Segment::ClosePath,
            ][..]
        );
        let attributes = rect.attributes.as_ref().unwrap();
        assert_eq!(attributes.get("fill").unwrap().as_color(), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_shape_diagnostics() {
        let input = r#"
            <svg xmlns="http://www.w3.org/2000/svg">
                <path d="M 0,0 A 5 5 0 0 1 10 10 L 1,1" style="fill"/>
                <path d="M 0,0 L 5,5"/>
            </svg>
        "#;
        let document = parse(input).unwrap();
        assert_eq!(document.shapes.len(), 2);
        assert_eq!(document.shapes[0].diagnostics.len(), 2);
        assert!(matches!(
            document.shapes[0].diagnostics[0],
            Diagnostic::Unsupported { command: 'A', .. }
        ));
        assert!(matches!(
            document.shapes[0].diagnostics[1],
            Diagnostic::AttributeDecode { .. }
        ));
        assert_eq!(document.shapes[0].attributes, None);
        assert_eq!(document.shapes[0].path.current_point(), Point::new(1., 1.));
        assert!(document.shapes[1].diagnostics.is_empty());
    }

    #[test]
    fn test_parse_malformed_document() {
        let result = parse("<svg><path d=\"M 0,0\"></svg>");
        assert!(matches!(result, Err(Error::SvgParse(_))));
    }

    #[test]
    fn test_document_roundtrip() {
        let _ = env_logger::try_init();
        let input = r##"
            <svg xmlns="http://www.w3.org/2000/svg">
                <path d="m 10 20 c 0 0 1 -3 2 -5 s -10 -8 -2 5 z" stroke="#00f" stroke-width="1.5"/>
                <polygon points="0,0 100,0 50,80" fill="#abc"/>
            </svg>
        "##;
        let document = parse(input).unwrap();
        let svg = document.to_svg().unwrap();
        assert!(
            svg.contains("d=\"M10,20C10,20,11,17,12,15C13,13,2,7,10,20Z\" stroke=\"#0000ff\" stroke-width=\"1.5\""),
            "{}",
            svg
        );
        assert!(svg.contains("d=\"M0,0L100,0L50,80Z\" fill=\"#aabbcc\""), "{}", svg);
        assert!(svg.contains("width=\"100\" height=\"80\""), "{}", svg);

        let reparsed = parse(&svg).unwrap();
        assert_eq!(reparsed.diagnostics().count(), 0);
        let paths: Vec<_> = reparsed.shapes.iter().map(|s| &s.path).collect();
        let expected: Vec<_> = document.shapes.iter().map(|s| &s.path).collect();
        assert_eq!(paths, expected);
        assert_eq!(reparsed.shapes[1].attributes, document.shapes[1].attributes);
    }

    #[test]
    fn test_polylines() {
        let input = r#"
            <svg xmlns="http://www.w3.org/2000/svg">
                <path d="M 113,35 H 40 L -39,49 H 40"/>
                <rect width="1" height="1"/>
            </svg>
        "#;
        let polylines = parse(input).unwrap().polylines(FLATTENING_TOLERANCE);
        assert_eq!(polylines.len(), 2);
        assert_eq!(polylines[0].len(), 4);
        assert_eq!(
            polylines[1],
            vec![
                Point::new(0., 0.),
                Point::new(1., 0.),
                Point::new(1., 1.),
                Point::new(0., 1.),
                Point::new(0., 0.),
                Point::new(0., 0.),
            ]
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() {
        let path: Path = vec![
            Segment::MoveTo(Point::new(10.0, 20.0)),
            Segment::QuadCurveTo(Point::new(1.0, 2.0), Point::new(3.0, 4.0)),
            Segment::ClosePath,
        ]
        .into();
        let json = serde_json::to_string(&path).unwrap();
        let path2: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(path, path2);

        let color = Color::rgba(0.1, 0.2, 0.3, 0.4);
        let color2: Color = serde_json::from_str(&serde_json::to_string(&color).unwrap()).unwrap();
        assert_eq!(color, color2);
    }
}
