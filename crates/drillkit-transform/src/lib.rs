//! # DrillKit Transform
//!
//! Moves drill points and workpiece geometry from design (DXF) space into
//! machine space, between DXF extraction and G-code generation.
//!
//! ## Stages
//!
//! - **Rotation**: quarter-turn state machine tracking the corner opposite
//!   the origin, applied to points, directions and corners
//! - **Filter**: optional horizontal-only selection
//! - **Positioning**: quadrant-based offset to a top-left machine origin
//! - **Grouping**: tool batches keyed by diameter and direction
//! - **Pipeline**: all of the above driven by `TransformSettings`

pub mod error;
pub mod filter;
pub mod grouper;
pub mod pipeline;
pub mod positioner;
pub mod rotation;
pub mod rotator;

pub use error::{ErrorKind, TransformError, TransformResult};
pub use filter::{DrillPointFilter, FilterStats};
pub use grouper::{DrillGroup, DrillGroups, DrillPointGrouper, Grouping};
pub use pipeline::{PipelineOutput, PipelineReport, RotationMode, TransformPipeline};
pub use positioner::{MachinePositioner, Positioning, PositioningStats};
pub use rotation::{rotate_xy, Orientation, Quadrant, QuarterTurn, RotationState};
pub use rotator::{
    CoordinateRotator, PointRotation, PositionField, RotationSnapshot, RotationStats,
    DEFAULT_HEIGHT_THRESHOLD_MM,
};
