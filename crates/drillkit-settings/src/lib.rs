//! DrillKit Settings Crate
//!
//! Handles transformation settings and their persistence.

pub mod config;
pub mod error;

pub use config::{TransformSettings, DEFAULT_COORDINATE_PRECISION, DEFAULT_HEIGHT_THRESHOLD_MM};
pub use error::{SettingsError, SettingsResult};
