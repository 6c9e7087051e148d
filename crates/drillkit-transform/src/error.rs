//! Error types for the transform crate.
//!
//! Every public pipeline operation returns [`TransformError`], which names the
//! operation that failed and, where one is involved, the drill point.

use drillkit_core::{ProcessingError, ValidationError};
use drillkit_settings::SettingsError;
use thiserror::Error;

/// Broad category of a [`TransformError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Processing,
    Settings,
}

/// Errors that can occur while transforming a job.
#[derive(Error, Debug)]
pub enum TransformError {
    /// The job failed validation; nothing was transformed.
    #[error("{operation}: {source}")]
    Validation {
        /// Operation that rejected the job.
        operation: &'static str,
        /// Underlying validation failure.
        #[source]
        source: ValidationError,
    },

    /// Every drill point of the job failed a stage; carries the first failure.
    #[error("{operation} (drill point {point}): {reason}")]
    Processing {
        /// Operation that rejected the point.
        operation: &'static str,
        /// Drill point involved.
        point: usize,
        /// Human readable reason.
        reason: String,
    },

    /// Settings were rejected.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl TransformError {
    pub fn validation(operation: &'static str, source: ValidationError) -> Self {
        Self::Validation { operation, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Processing { .. } => ErrorKind::Processing,
            Self::Settings(_) => ErrorKind::Settings,
        }
    }

    /// The operation that failed, when known.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Validation { operation, .. } | Self::Processing { operation, .. } => {
                Some(*operation)
            }
            Self::Settings(_) => None,
        }
    }
}

impl From<ProcessingError> for TransformError {
    fn from(err: ProcessingError) -> Self {
        Self::Processing {
            operation: err.operation,
            point: err.point,
            reason: err.reason,
        }
    }
}

/// Result type alias for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_error_display() {
        let err = TransformError::validation(
            "set_dimensions",
            ValidationError::InvalidDimensions {
                width: 0.0,
                height: 400.0,
                thickness: 18.0,
            },
        );
        assert_eq!(
            err.to_string(),
            "set_dimensions: Invalid workpiece dimensions 0x400x18mm (all must be positive)"
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.operation(), Some("set_dimensions"));
    }

    #[test]
    fn test_processing_error_conversion() {
        let err: TransformError =
            ProcessingError::new(3, "group", "non-finite diameter").into();
        assert_eq!(err.kind(), ErrorKind::Processing);
        assert_eq!(err.operation(), Some("group"));
        assert_eq!(err.to_string(), "group (drill point 3): non-finite diameter");
        assert!(matches!(err, TransformError::Processing { point: 3, .. }));
    }

    #[test]
    fn test_settings_error_conversion() {
        let err: TransformError = SettingsError::UnsupportedFormat("ini".into()).into();
        assert_eq!(err.kind(), ErrorKind::Settings);
        assert_eq!(err.operation(), None);
    }
}
