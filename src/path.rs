use std::convert;
use std::ops::{Add, Sub};

use lyon_geom::euclid::default::Box2D;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box of one or more paths.
pub type Bounds = Box2D<f64>;

/// A `Point` consists of an x and y coordinate.
#[derive(Debug, PartialEq, Copy, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Mirror `other` through this point.
    pub fn reflect(self, other: Point) -> Point {
        self + (self - other)
    }

    pub(crate) fn to_lyon(self) -> lyon_geom::Point<f64> {
        lyon_geom::point(self.x, self.y)
    }
}

impl convert::From<(f64, f64)> for Point {
    fn from(val: (f64, f64)) -> Self {
        Self { x: val.0, y: val.1 }
    }
}

impl convert::From<lyon_geom::Point<f64>> for Point {
    fn from(val: lyon_geom::Point<f64>) -> Self {
        Self { x: val.x, y: val.y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// One path-construction instruction. All coordinates are absolute.
#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    QuadCurveTo(Point, Point),
    CubicCurveTo(Point, Point, Point),
    ClosePath,
}

impl Segment {
    /// Where the pen is after this segment, `None` for `ClosePath`.
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            Segment::MoveTo(p) | Segment::LineTo(p) => Some(p),
            Segment::QuadCurveTo(_, end) | Segment::CubicCurveTo(_, _, end) => Some(end),
            Segment::ClosePath => None,
        }
    }

    /// End point and control points.
    fn points(&self) -> Vec<Point> {
        match *self {
            Segment::MoveTo(p) | Segment::LineTo(p) => vec![p],
            Segment::QuadCurveTo(ctrl, end) => vec![ctrl, end],
            Segment::CubicCurveTo(ctrl1, ctrl2, end) => vec![ctrl1, ctrl2, end],
            Segment::ClosePath => vec![],
        }
    }
}

/// An ordered list of segments.
///
/// The current point is not stored, it is derived from the segments: the end
/// of the last segment, or the start of the closed subpath right after a
/// `ClosePath`. An empty path sits at the origin.
#[derive(Debug, PartialEq, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub(crate) fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// The current pen position.
    pub fn current_point(&self) -> Point {
        match self.segments.last() {
            Some(Segment::ClosePath) => self.subpath_start(),
            Some(segment) => segment.end_point().unwrap_or(Point::ORIGIN),
            None => Point::ORIGIN,
        }
    }

    /// The point of the most recent `MoveTo`, or the origin if there is none.
    pub fn subpath_start(&self) -> Point {
        self.segments
            .iter()
            .rev()
            .find_map(|segment| match *segment {
                Segment::MoveTo(p) => Some(p),
                _ => None,
            })
            .unwrap_or(Point::ORIGIN)
    }

    /// Bounding box of all end points and control points, `None` for a path
    /// without coordinates.
    pub fn bounding_box(&self) -> Option<Bounds> {
        let points: Vec<_> = self
            .segments
            .iter()
            .flat_map(Segment::points)
            .map(Point::to_lyon)
            .collect();
        if points.is_empty() {
            None
        } else {
            Some(Box2D::from_points(points))
        }
    }
}

impl convert::From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl std::iter::FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect() {
        let current = Point::new(10.0, 10.0);
        assert_eq!(current.reflect(Point::new(8.0, 5.0)), Point::new(12.0, 15.0));
        assert_eq!(current.reflect(current), current);
    }

    #[test]
    fn test_current_point() {
        let mut path = Path::new();
        assert_eq!(path.current_point(), Point::ORIGIN);
        path.push(Segment::MoveTo((1.0, 2.0).into()));
        assert_eq!(path.current_point(), (1.0, 2.0).into());
        path.push(Segment::LineTo((5.0, 2.0).into()));
        path.push(Segment::CubicCurveTo(
            (6.0, 2.0).into(),
            (7.0, 3.0).into(),
            (7.0, 4.0).into(),
        ));
        assert_eq!(path.current_point(), (7.0, 4.0).into());
        path.push(Segment::ClosePath);
        assert_eq!(path.current_point(), (1.0, 2.0).into());
    }

    #[test]
    fn test_close_without_move() {
        let path: Path = vec![Segment::LineTo((3.0, 3.0).into()), Segment::ClosePath].into();
        assert_eq!(path.subpath_start(), Point::ORIGIN);
        assert_eq!(path.current_point(), Point::ORIGIN);
    }

    #[test]
    fn test_bounding_box_includes_control_points() {
        let path: Path = vec![
            Segment::MoveTo((10.0, 10.0).into()),
            Segment::CubicCurveTo((0.0, 40.0).into(), (50.0, -5.0).into(), (20.0, 20.0).into()),
            Segment::ClosePath,
        ]
        .into();
        let bbox = path.bounding_box().unwrap();
        assert_eq!(bbox.min, lyon_geom::point(0.0, -5.0));
        assert_eq!(bbox.max, lyon_geom::point(50.0, 40.0));
    }

    #[test]
    fn test_bounding_box_empty() {
        assert_eq!(Path::new().bounding_box(), None);
        let path: Path = vec![Segment::ClosePath].into();
        assert_eq!(path.bounding_box(), None);
    }
}
