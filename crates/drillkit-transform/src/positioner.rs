//! Machine positioning
//!
//! Moves rotated geometry so the workpiece's top-left corner lands on the
//! machine origin. The translation depends only on which quadrant the
//! rotated point C sits in:
//!
//! | Quadrant | Offset |
//! |---|---|
//! | Q1 (+,+) | (0, -y_c) |
//! | Q2 (-,+) | (-x_c, -y_c) |
//! | Q3 (-,-) | (-x_c, 0) |
//! | Q4 (+,-) | (0, 0) |

use crate::rotation::Quadrant;
use drillkit_core::{
    DrillPoint, Offset2, Point2, Point3, ProcessingError, ValidationResult, Workpiece,
};
use drillkit_settings::DEFAULT_COORDINATE_PRECISION;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Counts from one positioning pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositioningStats {
    pub total: usize,
    pub positioned: usize,
    pub errors: usize,
    pub failures: Vec<ProcessingError>,
}

/// Result of [`MachinePositioner::position_for_top_left_origin`]
#[derive(Debug, Clone, PartialEq)]
pub struct Positioning {
    pub workpiece: Workpiece,
    /// Same length and order as the input; failed points are passed through.
    pub points: Vec<DrillPoint>,
    pub offset: Offset2,
    pub quadrant: Quadrant,
    pub stats: PositioningStats,
}

/// Translates rotated positions into machine space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachinePositioner {
    precision: Option<u32>,
}

impl Default for MachinePositioner {
    fn default() -> Self {
        Self {
            precision: Some(DEFAULT_COORDINATE_PRECISION),
        }
    }
}

impl MachinePositioner {
    /// `precision` is the number of decimals kept in X and Y; `None` keeps
    /// full precision.
    pub fn new(precision: Option<u32>) -> Self {
        Self { precision }
    }

    pub fn precision(&self) -> Option<u32> {
        self.precision
    }

    /// Offset for a rotated point C. Axis points are rejected.
    pub fn determine_offset(point_c: Point2) -> ValidationResult<(Quadrant, Offset2)> {
        let quadrant = Quadrant::of_point_c(point_c)?;
        let offset = match quadrant {
            Quadrant::Q1 => Offset2::new(0.0, -point_c.y),
            Quadrant::Q2 => Offset2::new(-point_c.x, -point_c.y),
            Quadrant::Q3 => Offset2::new(-point_c.x, 0.0),
            Quadrant::Q4 => Offset2::ZERO,
        };
        Ok((quadrant, offset))
    }

    fn place(&self, position: Point3, offset: Offset2) -> Point3 {
        let moved = position.translated(offset);
        match self.precision {
            Some(decimals) => moved.rounded_xy(decimals),
            None => moved,
        }
    }

    /// Compute machine positions for `points` and machine corners for
    /// `workpiece`.
    ///
    /// Fails before touching anything if point C is on an axis. Points that
    /// were rotated to a different angle than the workpiece, or whose
    /// rotated position is not finite, are reported and passed through.
    pub fn position_for_top_left_origin(
        &self,
        workpiece: &Workpiece,
        points: &[DrillPoint],
    ) -> ValidationResult<Positioning> {
        let (quadrant, offset) = Self::determine_offset(workpiece.point_c)?;
        info!(
            "Point C {} in {}, machine offset {}",
            workpiece.point_c, quadrant, offset
        );

        let machine_corners = workpiece
            .rotated_corner_points
            .map(|corner| self.place(corner, offset));
        let positioned_workpiece = Workpiece {
            machine_corner_points: Some(machine_corners),
            machine_offset: Some(offset),
            ..workpiece.clone()
        };

        let expected = workpiece.rotation_angle();
        let mut stats = PositioningStats {
            total: points.len(),
            positioned: 0,
            errors: 0,
            failures: Vec::new(),
        };

        let positioned = points
            .iter()
            .map(|point| {
                let outcome = if point.current_rotation() != expected {
                    Err(format!(
                        "rotated to {} but workpiece is at {}",
                        point.current_rotation(),
                        expected
                    ))
                } else if !point.rotated_position.is_finite() {
                    Err(format!("non-finite position {}", point.rotated_position))
                } else {
                    Ok(self.place(point.rotated_position, offset))
                };

                match outcome {
                    Ok(machine_position) => {
                        stats.positioned += 1;
                        debug!(
                            "Drill point {}: {} -> {}",
                            point.id, point.rotated_position, machine_position
                        );
                        DrillPoint {
                            machine_position: Some(machine_position),
                            ..point.clone()
                        }
                    }
                    Err(reason) => {
                        let err = ProcessingError::new(point.id, "position_for_top_left_origin", reason);
                        warn!("{}", err);
                        stats.errors += 1;
                        stats.failures.push(err);
                        point.clone()
                    }
                }
            })
            .collect();

        info!(
            "Positioned {}/{} points for top-left origin",
            stats.positioned, stats.total
        );

        Ok(Positioning {
            workpiece: positioned_workpiece,
            points: positioned,
            offset,
            quadrant,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drillkit_core::{Dimensions, EdgeClassifier, RotationAngle, ValidationError, Vector3};

    fn point(id: usize, position: Point3) -> DrillPoint {
        DrillPoint::new(id, position, 5.0, 10.0, Vector3::Z, &EdgeClassifier::default())
    }

    #[test]
    fn test_offset_table() {
        let cases = [
            ((600.0, 400.0), Quadrant::Q1, (0.0, -400.0)),
            ((-400.0, 600.0), Quadrant::Q2, (400.0, -600.0)),
            ((-600.0, -400.0), Quadrant::Q3, (600.0, 0.0)),
            ((400.0, -600.0), Quadrant::Q4, (0.0, 0.0)),
        ];
        for ((x, y), quadrant, (dx, dy)) in cases {
            let (q, offset) = MachinePositioner::determine_offset(Point2::new(x, y)).unwrap();
            assert_eq!(q, quadrant);
            assert_eq!(offset, Offset2::new(dx, dy));
        }
    }

    #[test]
    fn test_axis_point_c_rejected_before_positioning() {
        let mut wp = Workpiece::rectangle(Dimensions::new(600.0, 400.0, 18.0)).unwrap();
        wp.point_c = Point2::new(600.0, 0.0);
        let err = MachinePositioner::default()
            .position_for_top_left_origin(&wp, &[point(0, Point3::new(1.0, 1.0, 0.0))])
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnclassifiableQuadrant { .. }));
    }

    #[test]
    fn test_top_left_origin_unrotated() {
        let wp = Workpiece::rectangle(Dimensions::new(600.0, 400.0, 18.0)).unwrap();
        let result = MachinePositioner::default()
            .position_for_top_left_origin(&wp, &[point(0, Point3::new(120.5, 485.3, 0.0))])
            .unwrap();

        assert_eq!(result.offset, Offset2::new(0.0, -400.0));
        assert_eq!(
            result.points[0].machine_position,
            Some(Point3::new(120.5, 85.3, 0.0))
        );
        assert_eq!(result.points[0].position, Point3::new(120.5, 485.3, 0.0));
        assert_eq!(
            result.workpiece.machine_corner_points.unwrap()[0],
            Point3::new(0.0, -400.0, 0.0)
        );
        assert_eq!(result.workpiece.machine_offset, Some(Offset2::new(0.0, -400.0)));
    }

    #[test]
    fn test_full_precision() {
        let wp = Workpiece::rectangle(Dimensions::new(600.0, 400.0, 18.0)).unwrap();
        let result = MachinePositioner::new(None)
            .position_for_top_left_origin(&wp, &[point(0, Point3::new(10.04, 100.0, 0.0))])
            .unwrap();
        assert_eq!(
            result.points[0].machine_position,
            Some(Point3::new(10.04, -300.0, 0.0))
        );
    }

    #[test]
    fn test_angle_mismatch_is_reported() {
        let wp = Workpiece::rectangle(Dimensions::new(600.0, 400.0, 18.0)).unwrap();
        let mut stale = point(3, Point3::new(1.0, 1.0, 0.0));
        stale.rotation = Some(RotationAngle::Deg90);
        let result = MachinePositioner::default()
            .position_for_top_left_origin(&wp, &[stale.clone(), point(4, Point3::new(2.0, 2.0, 0.0))])
            .unwrap();

        assert_eq!(result.stats.errors, 1);
        assert_eq!(result.stats.positioned, 1);
        assert_eq!(result.stats.failures[0].point, 3);
        assert_eq!(result.points[0], stale);
    }
}
