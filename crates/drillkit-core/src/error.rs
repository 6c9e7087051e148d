//! Error types for DrillKit core data.
//!
//! Two families are distinguished:
//! - [`ValidationError`]: fatal problems with the job itself (bad dimensions,
//!   missing point fields, an unclassifiable corner). Raised before any stage
//!   produces output.
//! - [`ProcessingError`]: a single drill point could not be handled by a stage.
//!   The stage records it, skips the point and carries on with the batch.

use serde::Serialize;
use thiserror::Error;

/// Fatal validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Workpiece dimensions must all be positive and finite.
    #[error(
        "Invalid workpiece dimensions {width}x{height}x{thickness}mm (all must be positive)"
    )]
    InvalidDimensions {
        /// Width in mm.
        width: f64,
        /// Height in mm.
        height: f64,
        /// Thickness in mm.
        thickness: f64,
    },

    /// A rectangular workpiece is described by exactly four corners.
    #[error("Workpiece has {count} corner points, expected 4")]
    CornerCount {
        /// Number of corners supplied.
        count: usize,
    },

    /// A drill point is missing a field the pipeline cannot do without.
    #[error("Drill point {point} missing required field '{field}'")]
    MissingField {
        /// Index of the point in the extraction batch.
        point: usize,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A drill point field holds a value outside its valid range.
    #[error("Drill point {point} has invalid {field}: {value}")]
    InvalidValue {
        /// Index of the point in the extraction batch.
        point: usize,
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Point C lies on an axis, so neither orientation nor offset is defined.
    #[error("Point C ({x}, {y}) lies on an axis; quadrant is undefined")]
    UnclassifiableQuadrant {
        /// X coordinate of point C.
        x: f64,
        /// Y coordinate of point C.
        y: f64,
    },
}

/// A per-point failure inside a stage.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{operation}: drill point {point}: {reason}")]
pub struct ProcessingError {
    /// Index of the point in the extraction batch.
    pub point: usize,
    /// The stage operation that rejected the point.
    pub operation: &'static str,
    /// Human readable reason.
    pub reason: String,
}

impl ProcessingError {
    pub fn new(point: usize, operation: &'static str, reason: impl Into<String>) -> Self {
        Self {
            point,
            operation,
            reason: reason.into(),
        }
    }
}

/// Result type alias for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;
