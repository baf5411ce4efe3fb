//! Planar geometry primitives shared by the document model and the stitch planner.
//!
//! Coordinates are drawing units. [`Transform`] is a 2D affine map backed by
//! a homogeneous `nalgebra` matrix and speaks the SVG `transform` attribute
//! grammar.

use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::TransformError;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// 2D affine transform.
///
/// `a * b` applies `b` first, then `a`, matching how nested SVG transforms
/// compose from the outermost group inwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Matrix3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Builds the transform SVG writes as `matrix(a, b, c, d, e, f)`.
    pub fn from_coefficients(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self {
            matrix: Matrix3::new(a, c, e, b, d, f, 0.0, 0.0, 1.0),
        }
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self::from_coefficients(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::from_coefficients(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `degrees` about the origin.
    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::from_coefficients(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Rotation by `degrees` about `(cx, cy)`.
    pub fn rotate_about(degrees: f64, cx: f64, cy: f64) -> Self {
        Self::translate(cx, cy) * Self::rotate(degrees) * Self::translate(-cx, -cy)
    }

    pub fn skew_x(degrees: f64) -> Self {
        Self::from_coefficients(1.0, 0.0, degrees.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y(degrees: f64) -> Self {
        Self::from_coefficients(1.0, degrees.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    /// The `(a, b, c, d, e, f)` coefficients.
    pub fn coefficients(&self) -> [f64; 6] {
        let m = &self.matrix;
        [
            m[(0, 0)],
            m[(1, 0)],
            m[(0, 1)],
            m[(1, 1)],
            m[(0, 2)],
            m[(1, 2)],
        ]
    }

    pub fn is_identity(&self) -> bool {
        self.matrix
            .iter()
            .zip(Matrix3::<f64>::identity().iter())
            .all(|(a, b)| (a - b).abs() < 1e-12)
    }

    /// Returns the transform applying `self` and then `next`.
    pub fn then(&self, next: &Transform) -> Transform {
        *next * *self
    }

    pub fn inverse(&self) -> Result<Transform, TransformError> {
        let [a, b, c, d, _, _] = self.coefficients();
        let determinant = a * d - b * c;
        if determinant.abs() < f64::EPSILON {
            return Err(TransformError::Singular { determinant });
        }
        self.matrix
            .try_inverse()
            .map(|matrix| Transform { matrix })
            .ok_or(TransformError::Singular { determinant })
    }

    pub fn apply(&self, p: Point) -> Point {
        let v = self.matrix * Vector3::new(p.x, p.y, 1.0);
        Point::new(v.x, v.y)
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        Transform {
            matrix: self.matrix * rhs.matrix,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.coefficients();
        write!(f, "matrix({},{},{},{},{},{})", a, b, c, d, e, g)
    }
}

impl FromStr for Transform {
    type Err = TransformError;

    /// Parses an SVG transform list such as `translate(10,5) rotate(45)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TransformError::InvalidSyntax {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let mut result = Transform::identity();
        let mut rest = s.trim();
        while !rest.is_empty() {
            let open = rest.find('(').ok_or_else(|| invalid("expected '('"))?;
            let close = rest.find(')').ok_or_else(|| invalid("expected ')'"))?;
            if close < open {
                return Err(invalid("unbalanced parentheses"));
            }
            let name = rest[..open].trim();
            let args: Vec<f64> = rest[open + 1..close]
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .map(|t| t.parse::<f64>())
                .collect::<Result<_, _>>()
                .map_err(|_| invalid("non-numeric argument"))?;

            let step = match (name, args.as_slice()) {
                ("matrix", [a, b, c, d, e, f]) => Transform::from_coefficients(*a, *b, *c, *d, *e, *f),
                ("translate", [tx]) => Transform::translate(*tx, 0.0),
                ("translate", [tx, ty]) => Transform::translate(*tx, *ty),
                ("scale", [s]) => Transform::scale(*s, *s),
                ("scale", [sx, sy]) => Transform::scale(*sx, *sy),
                ("rotate", [deg]) => Transform::rotate(*deg),
                ("rotate", [deg, cx, cy]) => Transform::rotate_about(*deg, *cx, *cy),
                ("skewX", [deg]) => Transform::skew_x(*deg),
                ("skewY", [deg]) => Transform::skew_y(*deg),
                _ => return Err(invalid(&format!("unsupported function '{}'", name))),
            };
            result = result * step;
            rest = rest[close + 1..].trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(p: Point, x: f64, y: f64) {
        assert!(
            (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9,
            "expected ({}, {}), got ({}, {})",
            x,
            y,
            p.x,
            p.y
        );
    }

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert_eq!(p1.distance_to(&p2), 5.0);
    }

    #[test]
    fn test_composition_order() {
        // translate applied after scale
        let t = Transform::translate(10.0, 0.0) * Transform::scale(2.0, 2.0);
        assert_close(t.apply(Point::new(1.0, 1.0)), 12.0, 2.0);

        let same = Transform::scale(2.0, 2.0).then(&Transform::translate(10.0, 0.0));
        assert_eq!(t, same);
    }

    #[test]
    fn test_inverse() {
        let t: Transform = "translate(5,7) rotate(30) scale(2)".parse().unwrap();
        let inv = t.inverse().unwrap();
        let p = Point::new(3.5, -2.0);
        let back = inv.apply(t.apply(p));
        assert_close(back, p.x, p.y);
    }

    #[test]
    fn test_singular_inverse() {
        let t = Transform::scale(0.0, 1.0);
        assert!(matches!(t.inverse(), Err(TransformError::Singular { .. })));
    }

    #[test]
    fn test_parse_transform_list() {
        let t: Transform = "translate(10) scale(2, 3)".parse().unwrap();
        assert_close(t.apply(Point::new(1.0, 1.0)), 12.0, 3.0);

        let t: Transform = "rotate(90, 10, 10)".parse().unwrap();
        assert_close(t.apply(Point::new(20.0, 10.0)), 10.0, 20.0);

        let t: Transform = "matrix(1 0 0 1 4 5)".parse().unwrap();
        assert_close(t.apply(Point::new(0.0, 0.0)), 4.0, 5.0);

        assert!("".parse::<Transform>().unwrap().is_identity());
        assert!("wobble(3)".parse::<Transform>().is_err());
        assert!("translate(a)".parse::<Transform>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let t: Transform = "translate(3,4) scale(2)".parse().unwrap();
        let again: Transform = t.to_string().parse().unwrap();
        assert_close(again.apply(Point::new(1.0, 1.0)), 5.0, 6.0);
    }
}
