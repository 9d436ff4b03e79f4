//! Approximation of paths by polylines (aka polygonal chains).
//!
//! This can be used e.g. for simple drawing robots that just support drawing
//! straight lines and liftoff / drop pen commands.
//!
//! Flattening of Bézier curves is done using the
//! [Lyon](https://github.com/nical/lyon) library.

use std::mem;

use log::trace;
use lyon_geom::{CubicBezierSegment, QuadraticBezierSegment};

use crate::path::{Path, Point, Segment};

/// Default maximum distance between a curve and its approximation.
pub const FLATTENING_TOLERANCE: f64 = 0.15;

/// A polyline is a vector of `Point` instances.
pub type Polyline = Vec<Point>;

#[derive(Debug, PartialEq)]
struct CurrentLine {
    /// The polyline containing the points for the current line.
    line: Polyline,
}

/// Simple data structure that acts as a Polyline buffer.
impl CurrentLine {
    fn new() -> Self {
        Self {
            line: Polyline::new(),
        }
    }

    fn add(&mut self, point: Point) {
        self.line.push(point);
    }

    /// A polyline is only valid if it has more than 1 `Point`.
    fn is_valid(&self) -> bool {
        self.line.len() > 1
    }

    /// Return the last point. An empty line starts at the origin.
    fn start_point(&mut self) -> Point {
        match self.line.last() {
            Some(&last) => last,
            None => {
                self.add(Point::ORIGIN);
                Point::ORIGIN
            }
        }
    }

    /// Replace the internal polyline with a new instance and return the
    /// previously stored polyline.
    fn finish(&mut self) -> Polyline {
        mem::take(&mut self.line)
    }
}

impl Path {
    /// Flatten this path into polylines.
    ///
    /// Every `MoveTo` starts a new polyline, `ClosePath` connects back to the
    /// start of the subpath. Polylines with less than two points are dropped.
    pub fn flatten(&self, tolerance: f64) -> Vec<Polyline> {
        trace!("flatten");
        let mut lines = Vec::new();
        let mut line = CurrentLine::new();
        let mut subpath_start = Point::ORIGIN;

        for segment in self {
            match *segment {
                Segment::MoveTo(p) => {
                    if line.is_valid() {
                        lines.push(line.finish());
                    } else {
                        line.finish();
                    }
                    line.add(p);
                    subpath_start = p;
                }
                Segment::LineTo(p) => {
                    line.start_point();
                    line.add(p);
                }
                Segment::QuadCurveTo(ctrl, to) => {
                    let curve = QuadraticBezierSegment {
                        from: line.start_point().to_lyon(),
                        ctrl: ctrl.to_lyon(),
                        to: to.to_lyon(),
                    };
                    for point in curve.flattened(tolerance) {
                        line.add(point.into());
                    }
                }
                Segment::CubicCurveTo(ctrl1, ctrl2, to) => {
                    let curve = CubicBezierSegment {
                        from: line.start_point().to_lyon(),
                        ctrl1: ctrl1.to_lyon(),
                        ctrl2: ctrl2.to_lyon(),
                        to: to.to_lyon(),
                    };
                    for point in curve.flattened(tolerance) {
                        line.add(point.into());
                    }
                }
                Segment::ClosePath => {
                    if line.is_valid() {
                        line.add(subpath_start);
                        lines.push(line.finish());
                    } else {
                        line.finish();
                    }
                    // The next segment starts where the closed subpath began
                    line.add(subpath_start);
                }
            }
        }

        if line.is_valid() {
            lines.push(line.finish());
        }
        trace!("flatten: {} polylines", lines.len());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn polylines(text: &str) -> Vec<Polyline> {
        parse(text).path.flatten(FLATTENING_TOLERANCE)
    }

    #[test]
    fn test_current_line() {
        let mut line = CurrentLine::new();
        assert_eq!(line.is_valid(), false);
        line.add((1.0, 2.0).into());
        assert_eq!(line.is_valid(), false);
        line.add((2.0, 3.0).into());
        assert_eq!(line.is_valid(), true);
        assert_eq!(line.start_point(), (2.0, 3.0).into());
        let finished = line.finish();
        assert_eq!(finished, vec![(1.0, 2.0).into(), (2.0, 3.0).into()]);
        assert_eq!(line.is_valid(), false);
        assert_eq!(line.start_point(), Point::ORIGIN);
        assert_eq!(line.finish(), vec![Point::ORIGIN]);
    }

    #[test]
    fn test_simple_absolute_nonclosed() {
        let result = polylines("M 113,35 H 40 L -39,49 H 40");
        assert_eq!(result.len(), 1);
        assert_eq!(
            result[0],
            vec![
                (113., 35.).into(),
                (40., 35.).into(),
                (-39., 49.).into(),
                (40., 49.).into(),
            ]
        );
    }

    #[test]
    fn test_closed_and_relative_move() {
        let result = polylines("M 10,10 20,15 10,20 Z m 0,40 H 0");
        assert_eq!(result.len(), 2);
        assert_eq!(
            result[0],
            vec![
                (10., 10.).into(),
                (20., 15.).into(),
                (10., 20.).into(),
                (10., 10.).into(),
            ]
        );
        assert_eq!(result[1], vec![(10., 50.).into(), (0., 50.).into()]);
    }

    #[test]
    fn test_multiple_moves() {
        let result = polylines("M 10,100 40,70 h 10 m -20,40 10,-20 M 1,1 M 2,2 3,3");
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].len(), 3);
        assert_eq!(result[1], vec![(30., 110.).into(), (40., 90.).into()]);
        assert_eq!(result[2], vec![(2., 2.).into(), (3., 3.).into()]);
    }

    #[test]
    fn test_line_after_close_continues_from_subpath_start() {
        let result = polylines("M0,0 L10,0 10,10 Z L5,5");
        assert_eq!(result.len(), 2);
        assert_eq!(result[1], vec![(0., 0.).into(), (5., 5.).into()]);
    }

    #[test]
    fn test_curves_keep_endpoints() {
        let result = polylines("M10 80 C 40 10, 65 10, 95 80 S 150 150, 180 80 Q 200 0 220 80");
        assert_eq!(result.len(), 1);
        let line = &result[0];
        assert!(line.len() > 10);
        assert_eq!(line[0], (10., 80.).into());
        assert!(line.contains(&(95., 80.).into()));
        assert!(line.contains(&(180., 80.).into()));
        assert_eq!(*line.last().unwrap(), (220., 80.).into());
    }

    #[test]
    fn test_smooth_curve_variants_flatten_equally() {
        let result: Vec<_> = [
            "M 10 20 C 10 20 11 17 12 15 S 2 7 10 20 z",
            "M 10 20 C 10 20 11 17 12 15 s -10 -8 -2 5 z",
            "M 10 20 c 0 0 1 -3 2 -5 S 2 7 10 20 z",
            "M 10 20 c 0 0 1 -3 2 -5 s -10 -8 -2 5 z",
        ]
        .iter()
        .map(|text| polylines(text))
        .collect();
        assert_eq!(result[0].len(), 1);
        assert_eq!(result[0], result[1]);
        assert_eq!(result[0], result[2]);
        assert_eq!(result[0], result[3]);
    }

    #[test]
    fn test_curve_without_move_starts_at_origin() {
        let result = polylines("Q 5,5 10,0");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0][0], Point::ORIGIN);
        assert_eq!(*result[0].last().unwrap(), (10., 0.).into());
    }
}
