//! End-to-end transformation of one extraction job
//!
//! validate → rotate (manual or automatic) → optional horizontal filter →
//! position for the top-left machine origin → group into tool batches.
//!
//! Each stage runs over the whole batch before the next one starts. A point
//! that fails a stage is recorded in the report and left out of the output.
//! If that leaves nothing, the run fails with the first recorded failure.

use crate::error::{TransformError, TransformResult};
use crate::filter::{DrillPointFilter, FilterStats};
use crate::grouper::{DrillGroups, DrillPointGrouper};
use crate::positioner::{MachinePositioner, PositioningStats};
use crate::rotation::Quadrant;
use crate::rotator::{CoordinateRotator, RotationSnapshot, RotationStats};
use drillkit_core::{
    DrillPoint, EdgeClassifier, ExtractionJob, Offset2, ProcessingError, ValidationResult,
    Workpiece,
};
use drillkit_settings::TransformSettings;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// How the final rotation was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    None,
    Manual,
    Auto,
}

/// Per-stage statistics of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub message: String,
    pub rotation_mode: RotationMode,
    pub rotation: RotationSnapshot,
    pub rotation_stats: RotationStats,
    pub filter: Option<FilterStats>,
    pub quadrant: Quadrant,
    pub offset: Offset2,
    pub positioning: PositioningStats,
    pub group_count: usize,
    /// Every point left out of the output, with the stage that rejected it.
    pub failures: Vec<ProcessingError>,
}

/// Payload handed to G-code generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub workpiece: Workpiece,
    pub drill_points: Vec<DrillPoint>,
    pub grouped_points: DrillGroups,
    #[serde(skip)]
    pub report: PipelineReport,
}

/// Runs every stage with one set of settings
#[derive(Debug, Clone, PartialEq)]
pub struct TransformPipeline {
    settings: TransformSettings,
    classifier: EdgeClassifier,
}

impl Default for TransformPipeline {
    fn default() -> Self {
        let settings = TransformSettings::default();
        Self {
            classifier: settings.edge_classifier(),
            settings,
        }
    }
}

impl TransformPipeline {
    pub fn new(settings: TransformSettings) -> TransformResult<Self> {
        settings.validate()?;
        Ok(Self {
            classifier: settings.edge_classifier(),
            settings,
        })
    }

    pub fn settings(&self) -> &TransformSettings {
        &self.settings
    }

    /// Validate the job; no stage runs if this fails.
    pub fn validate(&self, job: &ExtractionJob) -> ValidationResult<(Workpiece, Vec<DrillPoint>)> {
        let workpiece = Workpiece::from_extracted(&job.workpiece)?;
        let points = job
            .drill_points
            .iter()
            .enumerate()
            .map(|(id, extracted)| DrillPoint::from_extracted(id, extracted, &self.classifier))
            .collect::<ValidationResult<Vec<_>>>()?;
        Ok((workpiece, points))
    }

    fn rotator_for(&self, workpiece: &Workpiece) -> TransformResult<(CoordinateRotator, RotationMode)> {
        let rotator = CoordinateRotator::new(workpiece.original_dimensions())
            .map_err(|e| TransformError::validation("set_dimensions", e))?
            .with_classifier(self.classifier);

        if self.settings.manual_rotations > 0 {
            info!(
                "Applying {} manual rotation(s)",
                self.settings.manual_rotations
            );
            return Ok((
                rotator.with_rotations(self.settings.manual_rotations),
                RotationMode::Manual,
            ));
        }

        if self.settings.auto_rotation_enabled {
            let (rotator, applied) =
                rotator.apply_auto_rotation_if_needed(self.settings.height_threshold_mm);
            if applied {
                return Ok((rotator, RotationMode::Auto));
            }
            return Ok((rotator, RotationMode::None));
        }

        debug!("Rotation disabled");
        Ok((rotator, RotationMode::None))
    }

    /// Transform `job` into the G-code generation payload.
    pub fn run(&self, job: &ExtractionJob) -> TransformResult<PipelineOutput> {
        let (workpiece, points) = self
            .validate(job)
            .map_err(|e| TransformError::validation("validate_job", e))?;
        info!(
            "Transforming {}x{}x{}mm workpiece with {} drill points",
            workpiece.original_width,
            workpiece.original_height,
            workpiece.original_thickness,
            points.len()
        );

        let mut failures = Vec::new();

        let (rotator, rotation_mode) = self.rotator_for(&workpiece)?;
        let workpiece = rotator.apply_to_workpiece(&workpiece);
        let rotation = rotator.rotate_points(&points);
        let points = without_failed(rotation.points, &rotation.stats.failures);
        failures.extend(rotation.stats.failures.iter().cloned());

        let (points, filter) = if self.settings.horizontal_only {
            let (kept, stats) = DrillPointFilter::new().filter_horizontal(&points);
            (kept, Some(stats))
        } else {
            (points, None)
        };

        let positioning = MachinePositioner::new(self.settings.coordinate_precision)
            .position_for_top_left_origin(&workpiece, &points)
            .map_err(|e| TransformError::validation("position_for_top_left_origin", e))?;
        let points = without_failed(positioning.points, &positioning.stats.failures);
        failures.extend(positioning.stats.failures.iter().cloned());

        let grouping = DrillPointGrouper::new().group(&points);
        let drill_points = without_failed(grouping.points, &grouping.failures);
        failures.extend(grouping.failures);

        if drill_points.is_empty() && !failures.is_empty() {
            warn!(
                "All {} remaining drill points failed processing",
                failures.len()
            );
            return Err(failures.swap_remove(0).into());
        }

        let message = format!(
            "Processed {} of {} drill points into {} tool groups (rotation {}, offset {})",
            drill_points.len(),
            job.drill_points.len(),
            grouping.groups.len(),
            rotator.angle(),
            positioning.offset
        );
        info!("{}", message);

        let report = PipelineReport {
            message,
            rotation_mode,
            rotation: rotator.snapshot(),
            rotation_stats: rotation.stats,
            filter,
            quadrant: positioning.quadrant,
            offset: positioning.offset,
            positioning: positioning.stats,
            group_count: grouping.groups.len(),
            failures,
        };

        Ok(PipelineOutput {
            workpiece: positioning.workpiece,
            drill_points,
            grouped_points: grouping.groups,
            report,
        })
    }
}

fn without_failed(points: Vec<DrillPoint>, failures: &[ProcessingError]) -> Vec<DrillPoint> {
    if failures.is_empty() {
        return points;
    }
    let failed: HashSet<usize> = failures.iter().map(|f| f.point).collect();
    points
        .into_iter()
        .filter(|point| !failed.contains(&point.id))
        .collect()
}
