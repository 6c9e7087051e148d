//! Quarter-turn rotation rules and the rotation state
//!
//! Rotations are clockwise about the Z axis in steps of 90°. A single step
//! maps `(x, y, z)` to `(y, -x, z)`. Every step is a swap plus sign flips, so
//! composing steps is exact in floating point: four steps give back the
//! input bit for bit, and `n` steps equal the closed-form `n·90°` rule.

use drillkit_core::{
    Dimensions, Point2, Point3, RotationAngle, ValidationError, ValidationResult, Vector3,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed-form rotation of an XY pair by `angle`, clockwise.
pub fn rotate_xy(x: f64, y: f64, angle: RotationAngle) -> (f64, f64) {
    match angle {
        RotationAngle::Deg0 => (x, y),
        RotationAngle::Deg90 => (y, -x),
        RotationAngle::Deg180 => (-x, -y),
        RotationAngle::Deg270 => (-y, x),
    }
}

/// Anything with an XY component that can be turned about Z.
///
/// Implementors supply access to the XY pair; everything else rides along
/// unchanged.
pub trait QuarterTurn: Sized {
    fn xy(&self) -> (f64, f64);
    fn with_xy(&self, x: f64, y: f64) -> Self;

    /// One clockwise quarter turn.
    fn rotated_cw(&self) -> Self {
        self.rotated_by(RotationAngle::Deg90)
    }

    fn rotated_by(&self, angle: RotationAngle) -> Self {
        let (x, y) = self.xy();
        let (x, y) = rotate_xy(x, y, angle);
        self.with_xy(x, y)
    }
}

impl QuarterTurn for Point2 {
    fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    fn with_xy(&self, x: f64, y: f64) -> Self {
        Point2::new(x, y)
    }
}

impl QuarterTurn for Point3 {
    fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    fn with_xy(&self, x: f64, y: f64) -> Self {
        Point3::new(x, y, self.z)
    }
}

impl QuarterTurn for Vector3 {
    fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    fn with_xy(&self, x: f64, y: f64) -> Self {
        Vector3::new(x, y, self.z)
    }
}

/// Sign pattern of a point in the XY plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    /// x > 0, y > 0
    Q1,
    /// x < 0, y > 0
    Q2,
    /// x < 0, y < 0
    Q3,
    /// x > 0, y < 0
    Q4,
}

impl Quadrant {
    /// `None` when either coordinate is zero (or NaN).
    pub fn of(x: f64, y: f64) -> Option<Self> {
        match (x > 0.0, x < 0.0, y > 0.0, y < 0.0) {
            (true, _, true, _) => Some(Self::Q1),
            (_, true, true, _) => Some(Self::Q2),
            (_, true, _, true) => Some(Self::Q3),
            (true, _, _, true) => Some(Self::Q4),
            _ => None,
        }
    }

    /// Quadrant of point C, or the validation error for an axis point.
    pub fn of_point_c(point_c: Point2) -> ValidationResult<Self> {
        Self::of(point_c.x, point_c.y).ok_or(ValidationError::UnclassifiableQuadrant {
            x: point_c.x,
            y: point_c.y,
        })
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
        };
        f.write_str(name)
    }
}

/// Where the fixed origin sits on the rotated workpiece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    BottomLeft,
    TopLeft,
    TopRight,
    BottomRight,
}

impl From<Quadrant> for Orientation {
    fn from(quadrant: Quadrant) -> Self {
        match quadrant {
            Quadrant::Q1 => Self::BottomLeft,
            Quadrant::Q4 => Self::TopLeft,
            Quadrant::Q3 => Self::TopRight,
            Quadrant::Q2 => Self::BottomRight,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BottomLeft => "bottom-left",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomRight => "bottom-right",
        };
        f.write_str(name)
    }
}

/// Cumulative rotation plus the tracked opposite corner
///
/// A value type: [`RotationState::advance`] returns the next state and leaves
/// `self` untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationState {
    pub angle: RotationAngle,
    pub point_c: Point2,
}

impl RotationState {
    /// Unrotated state for a workpiece whose opposite corner is `point_c`.
    pub fn new(point_c: Point2) -> Self {
        Self {
            angle: RotationAngle::Deg0,
            point_c,
        }
    }

    pub fn from_dimensions(dimensions: Dimensions) -> Self {
        Self::new(Point2::new(dimensions.width, dimensions.height))
    }

    /// One 90° clockwise step.
    pub fn advance(&self) -> Self {
        Self {
            angle: self.angle.next(),
            point_c: self.point_c.rotated_cw(),
        }
    }

    pub fn rotation_count(&self) -> u8 {
        self.angle.quarter_turns()
    }

    pub fn quadrant(&self) -> ValidationResult<Quadrant> {
        Quadrant::of_point_c(self.point_c)
    }

    /// Orientation derived from point C's sign pattern.
    pub fn orientation(&self) -> ValidationResult<Orientation> {
        self.quadrant().map(Orientation::from)
    }

    /// Current `(width, height)` as read off point C.
    pub fn dimensions_from_point_c(&self) -> (f64, f64) {
        (self.point_c.x.abs(), self.point_c.y.abs())
    }

    /// Turn `item` from the unrotated frame to this state's angle.
    pub fn apply<T: QuarterTurn>(&self, item: &T) -> T {
        item.rotated_by(self.angle)
    }
}
