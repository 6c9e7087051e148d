//! # DrillKit Core
//!
//! Core types shared by every DrillKit stage:
//! - Geometry primitives (points, direction vectors, offsets, rotation angles)
//! - The workpiece and drill point data model, including the extraction
//!   payload received from the DXF reader
//! - Edge classification of drilling directions
//! - Validation and per-point processing errors

pub mod edge;
pub mod error;
pub mod geometry;
pub mod model;

pub use edge::{Edge, EdgeClassifier, DEFAULT_EDGE_TOLERANCE};
pub use error::{ProcessingError, ValidationError, ValidationResult};
pub use geometry::{round_to, Dimensions, Offset2, Point2, Point3, RotationAngle, Vector3};
pub use model::{
    DrillPoint, ExtractedDrillPoint, ExtractedWorkpiece, ExtractionJob, GroupKey, Workpiece,
};
