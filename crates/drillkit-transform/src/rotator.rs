//! Workpiece and drill point rotation
//!
//! [`CoordinateRotator`] owns the workpiece dimensions and the
//! [`RotationState`]. Every transition returns a new rotator. Drill points
//! and corners are turned to the rotator's cumulative angle; a point records
//! the angle it already sits at, so rotating a batch twice at the same angle
//! changes nothing and rotating back to 0° restores it exactly.

use crate::rotation::{Orientation, QuarterTurn, RotationState};
use drillkit_core::{
    Dimensions, DrillPoint, EdgeClassifier, Point2, Point3, ProcessingError, RotationAngle,
    ValidationError, ValidationResult, Workpiece,
};
use serde::Serialize;
use tracing::{debug, info, warn};

pub use drillkit_settings::DEFAULT_HEIGHT_THRESHOLD_MM;

const MAX_MANUAL_ROTATIONS: u8 = 3;

/// Which position of a drill point a rotation acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionField {
    /// `rotated_position`, derived from the design-space position.
    #[default]
    Design,
    /// `machine_position` as well as `rotated_position`; points without a
    /// machine position are reported as failures.
    Machine,
}

impl PositionField {
    fn name(&self) -> &'static str {
        match self {
            Self::Design => "rotated_position",
            Self::Machine => "machine_position",
        }
    }
}

/// Read-only view of a rotator after a transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RotationSnapshot {
    pub rotation_count: u8,
    pub angle: RotationAngle,
    pub current_width: f64,
    pub current_height: f64,
    pub point_c: Point2,
    /// `None` only if point C has landed on an axis.
    pub orientation: Option<Orientation>,
}

/// Counts from one [`CoordinateRotator::rotate_points`] call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RotationStats {
    pub angle: RotationAngle,
    pub total: usize,
    /// Points turned by a non-zero delta.
    pub rotated: usize,
    /// Points already at the target angle.
    pub unchanged: usize,
    /// Points whose edge label changed.
    pub edge_updates: usize,
    pub errors: usize,
    pub failures: Vec<ProcessingError>,
}

/// Rotated batch plus its statistics
#[derive(Debug, Clone, PartialEq)]
pub struct PointRotation {
    /// Same length and order as the input; failed points are passed through.
    pub points: Vec<DrillPoint>,
    pub stats: RotationStats,
}

/// Rotation state machine for one workpiece
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateRotator {
    original: Dimensions,
    current: Dimensions,
    state: RotationState,
    classifier: EdgeClassifier,
}

impl CoordinateRotator {
    /// Rotator for an unrotated workpiece of the given size.
    pub fn new(dimensions: Dimensions) -> ValidationResult<Self> {
        if !dimensions.is_valid() {
            return Err(ValidationError::InvalidDimensions {
                width: dimensions.width,
                height: dimensions.height,
                thickness: dimensions.thickness,
            });
        }

        Ok(Self {
            original: dimensions,
            current: dimensions,
            state: RotationState::from_dimensions(dimensions),
            classifier: EdgeClassifier::default(),
        })
    }

    /// Start over with new dimensions: rotation count 0, point C at
    /// `(width, height)`. The edge classifier is kept.
    pub fn set_dimensions(&self, width: f64, height: f64, thickness: f64) -> ValidationResult<Self> {
        let rotator = Self::new(Dimensions::new(width, height, thickness))?;
        debug!(
            "Rotator dimensions set to {}x{}x{}mm",
            width, height, thickness
        );
        Ok(rotator.with_classifier(self.classifier))
    }

    /// Resume from the rotation already recorded on `workpiece`.
    pub fn for_workpiece(workpiece: &Workpiece) -> ValidationResult<Self> {
        let rotator = Self::new(workpiece.original_dimensions())?;
        let current = workpiece.current_dimensions();
        if !current.is_valid() {
            return Err(ValidationError::InvalidDimensions {
                width: current.width,
                height: current.height,
                thickness: current.thickness,
            });
        }

        Ok(Self {
            current,
            state: RotationState {
                angle: workpiece.rotation_angle(),
                point_c: workpiece.point_c,
            },
            ..rotator
        })
    }

    pub fn with_classifier(mut self, classifier: EdgeClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// One 90° clockwise turn: width and height swap, point C follows.
    pub fn rotate_once(&self) -> Self {
        let next = Self {
            current: self.current.swapped(),
            state: self.state.advance(),
            ..*self
        };

        match next.state.orientation() {
            Ok(orientation) => info!(
                "Rotated workpiece to {}: {}x{}mm, origin {}",
                next.state.angle, next.current.width, next.current.height, orientation
            ),
            Err(e) => warn!("Rotated workpiece to {}: {}", next.state.angle, e),
        }
        next
    }

    /// Whether the current height exceeds `threshold_mm`.
    pub fn check_auto_rotation_needed(&self, threshold_mm: f64) -> bool {
        self.current.height > threshold_mm
    }

    /// Rotate once if the workpiece is taller than `threshold_mm`.
    ///
    /// Never rotates more than once, even if the result is still too tall.
    pub fn apply_auto_rotation_if_needed(&self, threshold_mm: f64) -> (Self, bool) {
        if self.check_auto_rotation_needed(threshold_mm) {
            info!(
                "Height {}mm exceeds {}mm, applying auto-rotation",
                self.current.height, threshold_mm
            );
            (self.rotate_once(), true)
        } else {
            debug!(
                "Height {}mm within {}mm, no auto-rotation",
                self.current.height, threshold_mm
            );
            (*self, false)
        }
    }

    /// Reset, then apply `count` quarter turns (clamped to 3).
    pub fn with_rotations(&self, count: u8) -> Self {
        let count = count.min(MAX_MANUAL_ROTATIONS);
        (0..count).fold(self.reset_to_original(), |rotator, _| rotator.rotate_once())
    }

    /// Back to the original dimensions and orientation.
    pub fn reset_to_original(&self) -> Self {
        Self {
            current: self.original,
            state: RotationState::from_dimensions(self.original),
            ..*self
        }
    }

    pub fn snapshot(&self) -> RotationSnapshot {
        RotationSnapshot {
            rotation_count: self.rotation_count(),
            angle: self.state.angle,
            current_width: self.current.width,
            current_height: self.current.height,
            point_c: self.state.point_c,
            orientation: self.state.orientation().ok(),
        }
    }

    /// Turn design positions and directions to the current angle.
    ///
    /// Points are always brought to this rotator's angle. A rotator at 0°
    /// therefore turns previously rotated points back to their unrotated
    /// positions, directions and edges; it only leaves points at 0° alone.
    pub fn rotate_points(&self, points: &[DrillPoint]) -> PointRotation {
        self.rotate_points_field(points, PositionField::Design)
    }

    /// Turn the chosen position field and the direction of each point.
    ///
    /// Each point moves by the difference between the rotator's angle and the
    /// angle it already carries. `rotated_position` always moves with the
    /// recorded angle, so the machine field turns it too. Failed points are
    /// counted, logged and passed through unchanged.
    pub fn rotate_points_field(&self, points: &[DrillPoint], field: PositionField) -> PointRotation {
        let mut stats = RotationStats {
            angle: self.state.angle,
            total: points.len(),
            rotated: 0,
            unchanged: 0,
            edge_updates: 0,
            errors: 0,
            failures: Vec::new(),
        };

        let rotated = points
            .iter()
            .map(|point| match self.rotate_point(point, field) {
                Ok(Some((rotated, edge_changed))) => {
                    stats.rotated += 1;
                    if edge_changed {
                        stats.edge_updates += 1;
                    }
                    rotated
                }
                Ok(None) => {
                    stats.unchanged += 1;
                    point.clone()
                }
                Err(e) => {
                    warn!("{}", e);
                    stats.errors += 1;
                    stats.failures.push(e);
                    point.clone()
                }
            })
            .collect();

        if !points.is_empty() {
            info!(
                "Rotated {}/{} points to {} ({} edge updates, {} errors)",
                stats.rotated, stats.total, stats.angle, stats.edge_updates, stats.errors
            );
        }

        PointRotation {
            points: rotated,
            stats,
        }
    }

    /// `Ok(None)` when the point already sits at the target angle.
    fn rotate_point(
        &self,
        point: &DrillPoint,
        field: PositionField,
    ) -> Result<Option<(DrillPoint, bool)>, ProcessingError> {
        let delta = self.state.angle.since(point.current_rotation());
        if delta == RotationAngle::Deg0 {
            return Ok(None);
        }

        let fail = |reason: String| ProcessingError::new(point.id, "rotate_points", reason);

        if !point.direction.is_finite() {
            return Err(fail(format!("non-finite direction {}", point.direction)));
        }

        if !point.rotated_position.is_finite() {
            return Err(fail(format!(
                "non-finite {} {}",
                PositionField::Design.name(),
                point.rotated_position
            )));
        }

        let mut rotated = point.clone();
        rotated.rotated_position = point.rotated_position.rotated_by(delta);
        if field == PositionField::Machine {
            let position = point
                .machine_position
                .ok_or_else(|| fail(format!("missing {}", field.name())))?;
            if !position.is_finite() {
                return Err(fail(format!("non-finite {} {}", field.name(), position)));
            }
            rotated.machine_position = Some(position.rotated_by(delta));
        }

        rotated.direction = point.direction.rotated_by(delta);
        rotated.edge = self.classifier.classify(&rotated.direction);
        rotated.original_edge = point.original_edge.or(Some(point.edge));
        rotated.rotation = Some(self.state.angle);

        let edge_changed = rotated.edge != point.edge;
        if edge_changed {
            debug!(
                "Drill point {}: edge {} -> {}",
                point.id, point.edge, rotated.edge
            );
        }

        Ok(Some((rotated, edge_changed)))
    }

    /// Design-space corners turned to the current angle.
    pub fn rotate_corners(&self, corners: &[Point3; 4]) -> [Point3; 4] {
        corners.map(|corner| self.state.apply(&corner))
    }

    /// Copy this rotator's state onto `workpiece`.
    ///
    /// Machine-space fields are cleared; they are stale after a rotation.
    pub fn apply_to_workpiece(&self, workpiece: &Workpiece) -> Workpiece {
        Workpiece {
            current_width: self.current.width,
            current_height: self.current.height,
            current_thickness: self.current.thickness,
            rotation_count: self.rotation_count(),
            point_c: self.state.point_c,
            rotated_corner_points: self.rotate_corners(&workpiece.corner_points),
            machine_corner_points: None,
            machine_offset: None,
            ..workpiece.clone()
        }
    }

    pub fn original_dimensions(&self) -> Dimensions {
        self.original
    }

    pub fn current_dimensions(&self) -> Dimensions {
        self.current
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    pub fn angle(&self) -> RotationAngle {
        self.state.angle
    }

    pub fn rotation_count(&self) -> u8 {
        self.state.rotation_count()
    }

    pub fn point_c(&self) -> Point2 {
        self.state.point_c
    }

    pub fn orientation(&self) -> ValidationResult<Orientation> {
        self.state.orientation()
    }

    pub fn classifier(&self) -> EdgeClassifier {
        self.classifier
    }
}
