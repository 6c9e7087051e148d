//! # DrillKit
//!
//! Coordinate transformation and orientation tracking for DXF drilling jobs.
//! Sits between DXF extraction and G-code generation: it takes the extracted
//! workpiece and drill points, rotates them to fit the machine, moves them to
//! a top-left machine origin and batches them by tool.
//!
//! ## Architecture
//!
//! DrillKit is organized as a workspace with multiple crates:
//!
//! 1. **drillkit-core** - Geometry, data model, edge classification, errors
//! 2. **drillkit-transform** - Rotation, positioning, filtering, grouping, pipeline
//! 3. **drillkit-settings** - Transformation settings and persistence
//! 4. **drillkit** - Command-line binary that integrates all crates

use anyhow::Context;
use std::path::Path;

pub use drillkit_core::{
    Dimensions, DrillPoint, Edge, EdgeClassifier, ExtractedDrillPoint, ExtractedWorkpiece,
    ExtractionJob, GroupKey, Offset2, Point2, Point3, ProcessingError, RotationAngle,
    ValidationError, Vector3, Workpiece,
};

pub use drillkit_transform::{
    CoordinateRotator, DrillGroup, DrillGroups, DrillPointFilter, DrillPointGrouper, ErrorKind,
    MachinePositioner, Orientation, PipelineOutput, PipelineReport, Quadrant, RotationState,
    TransformError, TransformPipeline, TransformResult,
};

pub use drillkit_settings::{SettingsError, TransformSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr with pretty formatting (stdout carries the payload)
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Settings from `path`, or from the user config directory when `None`.
///
/// A missing file in the config directory falls back to defaults; an
/// explicitly named file must exist.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<TransformSettings> {
    match path {
        Some(path) => TransformSettings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => match TransformSettings::default_path() {
            Ok(default) => TransformSettings::load_or_default(&default)
                .with_context(|| format!("Failed to load settings from {}", default.display())),
            Err(e) => {
                tracing::debug!("{}, using default settings", e);
                Ok(TransformSettings::default())
            }
        },
    }
}

/// Read an extraction payload and run the pipeline on it.
pub fn transform_file(job: &Path, settings: TransformSettings) -> anyhow::Result<PipelineOutput> {
    let content = std::fs::read_to_string(job)
        .with_context(|| format!("Failed to read job file: {}", job.display()))?;
    let job_data = ExtractionJob::from_json(&content)
        .with_context(|| format!("Invalid extraction payload: {}", job.display()))?;

    let pipeline = TransformPipeline::new(settings)?;
    let output = pipeline
        .run(&job_data)
        .with_context(|| format!("Failed to transform {}", job.display()))?;
    Ok(output)
}
