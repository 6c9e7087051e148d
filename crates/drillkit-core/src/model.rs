//! Workpiece and drill point data model
//!
//! The extraction payload ([`ExtractionJob`]) is what the DXF reader hands
//! over. Its fields are optional so that a missing value surfaces as a
//! [`ValidationError`] naming the point and field, instead of a serde error.
//!
//! [`Workpiece`] and [`DrillPoint`] are the validated records each stage
//! transforms. Stages never modify a record in place; they return new ones.

use crate::edge::{Edge, EdgeClassifier};
use crate::error::{ValidationError, ValidationResult};
use crate::geometry::{Dimensions, Offset2, Point2, Point3, RotationAngle, Vector3};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// Workpiece as produced by the DXF extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedWorkpiece {
    pub width: f64,
    pub height: f64,
    pub thickness: f64,
    /// Origin, width edge, opposite corner (point C), height edge.
    #[serde(default)]
    pub corner_points: Vec<Point3>,
}

/// Drill point as produced by the DXF extractor
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractedDrillPoint {
    pub position: Option<Point3>,
    pub diameter: Option<f64>,
    pub depth: Option<f64>,
    pub extrusion_vector: Option<Vector3>,
    #[serde(default)]
    pub layer: String,
}

/// Input payload: one workpiece and its drilling operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionJob {
    pub workpiece: ExtractedWorkpiece,
    #[serde(default)]
    pub drill_points: Vec<ExtractedDrillPoint>,
}

impl ExtractionJob {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// A rectangular workpiece and its orientation on the machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workpiece {
    #[serde(rename = "width")]
    pub original_width: f64,
    #[serde(rename = "height")]
    pub original_height: f64,
    #[serde(rename = "thickness")]
    pub original_thickness: f64,
    /// Design-space corners, in extraction order.
    pub corner_points: [Point3; 4],

    pub current_width: f64,
    pub current_height: f64,
    pub current_thickness: f64,
    /// Quarter turns applied so far, 0..=3.
    pub rotation_count: u8,
    /// The corner opposite the fixed origin, after rotation.
    pub point_c: Point2,
    /// Corners after rotation, before the machine offset.
    pub rotated_corner_points: [Point3; 4],

    #[serde(default)]
    pub machine_corner_points: Option<[Point3; 4]>,
    #[serde(default)]
    pub machine_offset: Option<Offset2>,
}

impl Workpiece {
    /// Build an unrotated workpiece.
    ///
    /// Corners are laid out origin, width edge, point C, height edge.
    pub fn new(dimensions: Dimensions, corner_points: [Point3; 4]) -> ValidationResult<Self> {
        if !dimensions.is_valid() {
            return Err(ValidationError::InvalidDimensions {
                width: dimensions.width,
                height: dimensions.height,
                thickness: dimensions.thickness,
            });
        }

        Ok(Self {
            original_width: dimensions.width,
            original_height: dimensions.height,
            original_thickness: dimensions.thickness,
            corner_points,
            current_width: dimensions.width,
            current_height: dimensions.height,
            current_thickness: dimensions.thickness,
            rotation_count: 0,
            point_c: Point2::new(dimensions.width, dimensions.height),
            rotated_corner_points: corner_points,
            machine_corner_points: None,
            machine_offset: None,
        })
    }

    /// Axis-aligned workpiece with its origin at (0, 0, 0).
    pub fn rectangle(dimensions: Dimensions) -> ValidationResult<Self> {
        Self::new(dimensions, rectangle_corners(dimensions))
    }

    /// Validate an extractor workpiece.
    ///
    /// An empty corner list falls back to the axis-aligned rectangle; any
    /// other count than four is rejected.
    pub fn from_extracted(extracted: &ExtractedWorkpiece) -> ValidationResult<Self> {
        let dimensions = Dimensions::new(extracted.width, extracted.height, extracted.thickness);
        let corners = match extracted.corner_points.as_slice() {
            [] => {
                debug!(
                    "No corner points extracted, using {}x{}mm rectangle at the origin",
                    dimensions.width, dimensions.height
                );
                rectangle_corners(dimensions)
            }
            [a, b, c, d] => [*a, *b, *c, *d],
            other => {
                return Err(ValidationError::CornerCount { count: other.len() });
            }
        };
        Self::new(dimensions, corners)
    }

    pub fn original_dimensions(&self) -> Dimensions {
        Dimensions::new(
            self.original_width,
            self.original_height,
            self.original_thickness,
        )
    }

    pub fn current_dimensions(&self) -> Dimensions {
        Dimensions::new(
            self.current_width,
            self.current_height,
            self.current_thickness,
        )
    }

    pub fn rotation_angle(&self) -> RotationAngle {
        RotationAngle::from_quarter_turns(u32::from(self.rotation_count))
    }
}

fn rectangle_corners(d: Dimensions) -> [Point3; 4] {
    [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(d.width, 0.0, 0.0),
        Point3::new(d.width, d.height, 0.0),
        Point3::new(0.0, d.height, 0.0),
    ]
}

/// Batch key for interchangeable drilling operations.
///
/// Equality, hashing and ordering work on the float bit patterns, with
/// `-0.0` folded into `0.0` so a rotated `(0, -0, 1)` still matches
/// `(0, 0, 1)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(
    from = "(f64, (f64, f64, f64))",
    into = "(f64, (f64, f64, f64))"
)]
pub struct GroupKey {
    pub diameter: f64,
    pub direction: Vector3,
}

impl GroupKey {
    pub fn new(diameter: f64, direction: Vector3) -> Self {
        Self {
            diameter,
            direction,
        }
    }

    fn canonical(&self) -> [f64; 4] {
        let fold = |v: f64| if v == 0.0 { 0.0 } else { v };
        [
            fold(self.diameter),
            fold(self.direction.x),
            fold(self.direction.y),
            fold(self.direction.z),
        ]
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.canonical(), other.canonical());
        a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits())
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for v in self.canonical() {
            v.to_bits().hash(state);
        }
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self.canonical(), other.canonical());
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(f64, (f64, f64, f64))> for GroupKey {
    fn from((diameter, direction): (f64, (f64, f64, f64))) -> Self {
        Self::new(diameter, direction.into())
    }
}

impl From<GroupKey> for (f64, (f64, f64, f64)) {
    fn from(key: GroupKey) -> Self {
        (key.diameter, key.direction.into())
    }
}

/// A single drilling operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillPoint {
    /// Index in the extraction batch.
    pub id: usize,
    /// Design-space position. Never changes after extraction.
    pub position: Point3,
    pub diameter: f64,
    pub depth: f64,
    /// Direction as extracted.
    #[serde(rename = "extrusion_vector")]
    pub original_direction: Vector3,
    #[serde(default)]
    pub layer: String,

    /// Design-space position turned to `rotation`.
    pub rotated_position: Point3,
    /// Current direction; changes only together with `edge`.
    pub direction: Vector3,
    pub edge: Edge,
    /// Edge before the first rotation touched this point.
    #[serde(default)]
    pub original_edge: Option<Edge>,
    /// Angle applied by the rotator, `None` until first rotated.
    #[serde(default)]
    pub rotation: Option<RotationAngle>,
    #[serde(default)]
    pub machine_position: Option<Point3>,
    #[serde(default)]
    pub group_key: Option<GroupKey>,
}

impl DrillPoint {
    pub fn new(
        id: usize,
        position: Point3,
        diameter: f64,
        depth: f64,
        direction: Vector3,
        classifier: &EdgeClassifier,
    ) -> Self {
        Self {
            id,
            position,
            diameter,
            depth,
            original_direction: direction,
            layer: String::new(),
            rotated_position: position,
            direction,
            edge: classifier.classify(&direction),
            original_edge: None,
            rotation: None,
            machine_position: None,
            group_key: None,
        }
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    /// Validate one extractor record.
    pub fn from_extracted(
        id: usize,
        extracted: &ExtractedDrillPoint,
        classifier: &EdgeClassifier,
    ) -> ValidationResult<Self> {
        let missing = |field| ValidationError::MissingField { point: id, field };

        let position = extracted.position.ok_or_else(|| missing("position"))?;
        let diameter = extracted.diameter.ok_or_else(|| missing("diameter"))?;
        let depth = extracted.depth.ok_or_else(|| missing("depth"))?;
        let direction = extracted
            .extrusion_vector
            .ok_or_else(|| missing("extrusion_vector"))?;

        if !diameter.is_finite() || diameter <= 0.0 {
            return Err(ValidationError::InvalidValue {
                point: id,
                field: "diameter",
                value: diameter,
            });
        }
        if !depth.is_finite() {
            return Err(ValidationError::InvalidValue {
                point: id,
                field: "depth",
                value: depth,
            });
        }

        Ok(Self::new(id, position, diameter, depth, direction, classifier)
            .with_layer(extracted.layer.clone()))
    }

    /// Angle this point currently sits at.
    pub fn current_rotation(&self) -> RotationAngle {
        self.rotation.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn extracted(position: Option<Point3>, vector: Option<Vector3>) -> ExtractedDrillPoint {
        ExtractedDrillPoint {
            position,
            diameter: Some(8.0),
            depth: Some(12.0),
            extrusion_vector: vector,
            layer: "EDGE.DRILL_D8.0_P12.0".to_string(),
        }
    }

    #[test]
    fn test_workpiece_rejects_non_positive_dimensions() {
        let err = Workpiece::rectangle(Dimensions::new(600.0, 400.0, 0.0)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_workpiece_initial_point_c() {
        let wp = Workpiece::rectangle(Dimensions::new(600.0, 400.0, 18.0)).unwrap();
        assert_eq!(wp.point_c, Point2::new(600.0, 400.0));
        assert_eq!(wp.rotation_count, 0);
        assert_eq!(wp.corner_points[2], Point3::new(600.0, 400.0, 0.0));
    }

    #[test]
    fn test_workpiece_without_corners_is_a_rectangle() {
        let ex = ExtractedWorkpiece {
            width: 600.0,
            height: 400.0,
            thickness: 18.0,
            corner_points: Vec::new(),
        };
        let wp = Workpiece::from_extracted(&ex).unwrap();
        assert_eq!(
            wp,
            Workpiece::rectangle(Dimensions::new(600.0, 400.0, 18.0)).unwrap()
        );
        assert_eq!(wp.corner_points[1], Point3::new(600.0, 0.0, 0.0));
    }

    #[test]
    fn test_workpiece_corner_count() {
        let ex = ExtractedWorkpiece {
            width: 600.0,
            height: 400.0,
            thickness: 18.0,
            corner_points: vec![Point3::new(0.0, 0.0, 0.0); 3],
        };
        assert_eq!(
            Workpiece::from_extracted(&ex).unwrap_err(),
            ValidationError::CornerCount { count: 3 }
        );
    }

    #[test]
    fn test_drill_point_missing_fields() {
        let c = EdgeClassifier::default();
        let err = DrillPoint::from_extracted(4, &extracted(None, Some(Vector3::X)), &c)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                point: 4,
                field: "position"
            }
        );

        let err = DrillPoint::from_extracted(
            5,
            &extracted(Some(Point3::new(0.0, 0.0, 0.0)), None),
            &c,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                point: 5,
                field: "extrusion_vector"
            }
        );
    }

    #[test]
    fn test_drill_point_classified_on_extraction() {
        let c = EdgeClassifier::default();
        let p = DrillPoint::from_extracted(
            0,
            &extracted(Some(Point3::new(0.0, 200.0, 9.0)), Some(Vector3::X)),
            &c,
        )
        .unwrap();
        assert_eq!(p.edge, Edge::Right);
        assert_eq!(p.original_edge, None);
        assert_eq!(p.rotated_position, p.position);
        assert_eq!(p.layer, "EDGE.DRILL_D8.0_P12.0");
    }

    #[test]
    fn test_group_key_folds_negative_zero() {
        let a = GroupKey::new(8.0, Vector3::new(0.0, 0.0, 1.0));
        let b = GroupKey::new(8.0, Vector3::new(0.0, -0.0, 1.0));
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_group_key_ordering() {
        let small = GroupKey::new(6.0, Vector3::X);
        let large = GroupKey::new(8.0, Vector3::X);
        assert!(small < large);
        assert_eq!(
            GroupKey::new(8.0, Vector3::new(-1.0, 0.0, 0.0)).cmp(&large),
            Ordering::Less
        );
    }

    #[test]
    fn test_extraction_job_from_json() {
        let json = r#"{
            "workpiece": {
                "width": 600.0, "height": 400.0, "thickness": 18.0,
                "corner_points": [[0,0,0],[600,0,0],[600,400,0],[0,400,0]]
            },
            "drill_points": [
                {"position": [0, 200, 9], "diameter": 8.0, "depth": 12.0,
                 "extrusion_vector": [1, 0, 0], "layer": "EDGE.DRILL"}
            ]
        }"#;
        let job = ExtractionJob::from_json(json).unwrap();
        assert_eq!(job.drill_points.len(), 1);
        assert_eq!(job.workpiece.corner_points.len(), 4);
        assert_eq!(job.drill_points[0].extrusion_vector, Some(Vector3::X));
    }
}
