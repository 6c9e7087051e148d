//! Edge classification of drilling directions
//!
//! A drilling operation's direction vector decides which face of the
//! workpiece it enters from. Tool selection downstream batches operations by
//! this label, so the classification must track every rotation exactly.

use crate::geometry::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum absolute component a direction needs to count as axis aligned.
pub const DEFAULT_EDGE_TOLERANCE: f64 = 0.9;

/// Semantic edge label for a drilling direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Edge {
    Left,
    Right,
    Front,
    Back,
    /// Drilled straight down into the face.
    Vertical,
    Unknown,
}

impl Edge {
    /// Horizontal drilling enters through one of the four side faces.
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::Front | Self::Back)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Front => "FRONT",
            Self::Back => "BACK",
            Self::Vertical => "VERTICAL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps direction vectors to [`Edge`] labels.
///
/// Components are tested in a fixed order, Z then X then Y, against the
/// tolerance. A vector close to a diagonal therefore resolves by that
/// priority and not by its largest component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeClassifier {
    tolerance: f64,
}

impl Default for EdgeClassifier {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_EDGE_TOLERANCE,
        }
    }
}

impl EdgeClassifier {
    pub fn new(tolerance: f64) -> Self {
        debug_assert!(
            tolerance.is_finite() && tolerance > 0.0 && tolerance < 1.0,
            "tolerance must lie in (0, 1), got {tolerance}"
        );
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Classify a direction vector.
    pub fn classify(&self, direction: &Vector3) -> Edge {
        let t = self.tolerance;
        if direction.z.abs() > t {
            Edge::Vertical
        } else if direction.x.abs() > t {
            if direction.x > 0.0 {
                Edge::Right
            } else {
                Edge::Left
            }
        } else if direction.y.abs() > t {
            if direction.y > 0.0 {
                Edge::Front
            } else {
                Edge::Back
            }
        } else {
            Edge::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_directions() {
        let c = EdgeClassifier::default();
        assert_eq!(c.classify(&Vector3::new(0.0, 0.0, 1.0)), Edge::Vertical);
        assert_eq!(c.classify(&Vector3::new(0.0, 0.0, -1.0)), Edge::Vertical);
        assert_eq!(c.classify(&Vector3::new(1.0, 0.0, 0.0)), Edge::Right);
        assert_eq!(c.classify(&Vector3::new(-1.0, 0.0, 0.0)), Edge::Left);
        assert_eq!(c.classify(&Vector3::new(0.0, 1.0, 0.0)), Edge::Front);
        assert_eq!(c.classify(&Vector3::new(0.0, -1.0, 0.0)), Edge::Back);
    }

    #[test]
    fn test_priority_is_z_then_x_then_y() {
        let c = EdgeClassifier::default();
        // Both components pass the tolerance; Z wins even though X is larger.
        assert_eq!(c.classify(&Vector3::new(0.99, 0.0, 0.95)), Edge::Vertical);
        // X wins over a larger Y.
        assert_eq!(c.classify(&Vector3::new(-0.91, 0.99, 0.0)), Edge::Left);
    }

    #[test]
    fn test_tolerance_boundary_is_exclusive() {
        let c = EdgeClassifier::default();
        assert_eq!(c.classify(&Vector3::new(0.9, 0.0, 0.0)), Edge::Unknown);
        assert_eq!(c.classify(&Vector3::new(0.901, 0.0, 0.0)), Edge::Right);
        assert_eq!(
            c.classify(&Vector3::new(0.7071, 0.7071, 0.0)),
            Edge::Unknown
        );
    }

    #[test]
    fn test_custom_tolerance() {
        let c = EdgeClassifier::new(0.7);
        assert_eq!(c.classify(&Vector3::new(0.0, -0.75, 0.2)), Edge::Back);
    }

    #[test]
    fn test_edge_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Edge::Front).unwrap(), "\"FRONT\"");
        assert!(Edge::Back.is_horizontal());
        assert!(!Edge::Vertical.is_horizontal());
        assert!(!Edge::Unknown.is_horizontal());
    }
}
