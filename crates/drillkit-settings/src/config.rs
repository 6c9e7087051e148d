//! Transformation settings
//!
//! Controls the optional parts of the pipeline: automatic or manual
//! rotation, the edge classification tolerance, coordinate rounding and the
//! horizontal-only filter. Settings are stored as JSON or TOML; the file
//! extension picks the format.

use crate::error::{SettingsError, SettingsResult};
use drillkit_core::{EdgeClassifier, DEFAULT_EDGE_TOLERANCE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Height above which a workpiece is turned a quarter so it fits the bed.
pub const DEFAULT_HEIGHT_THRESHOLD_MM: f64 = 800.0;

/// Machine coordinates are rounded to 0.1 mm by default.
pub const DEFAULT_COORDINATE_PRECISION: u32 = 1;

const MAX_COORDINATE_PRECISION: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Settings for one transformation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    /// Turn the workpiece once when its height exceeds the threshold
    pub auto_rotation_enabled: bool,
    /// Auto-rotation threshold in mm
    pub height_threshold_mm: f64,
    /// Fixed number of quarter turns (0-3). Non-zero overrides auto-rotation.
    pub manual_rotations: u8,
    /// Minimum absolute component for a direction to count as axis aligned
    pub edge_tolerance: f64,
    /// Decimal places kept in machine coordinates; `None` disables rounding
    pub coordinate_precision: Option<u32>,
    /// Drop vertical and unclassified operations before positioning
    pub horizontal_only: bool,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            auto_rotation_enabled: true,
            height_threshold_mm: DEFAULT_HEIGHT_THRESHOLD_MM,
            manual_rotations: 0,
            edge_tolerance: DEFAULT_EDGE_TOLERANCE,
            coordinate_precision: Some(DEFAULT_COORDINATE_PRECISION),
            horizontal_only: false,
        }
    }
}

impl TransformSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location: `<config dir>/drillkit/settings.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("drillkit").join("settings.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Load settings from a `.json` or `.toml` file and validate them.
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)?;

        let settings: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        settings.validate()?;
        tracing::debug!("Loaded transform settings from {}", path.display());
        Ok(settings)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!(
                "No settings at {}, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Save settings to a `.json` or `.toml` file.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = Format::of(path)?;

        let content = match format {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate settings
    pub fn validate(&self) -> SettingsResult<()> {
        if !self.height_threshold_mm.is_finite() || self.height_threshold_mm <= 0.0 {
            return Err(SettingsError::invalid(
                "height_threshold_mm",
                format!("must be > 0, got {}", self.height_threshold_mm),
            ));
        }

        if self.manual_rotations > 3 {
            return Err(SettingsError::invalid(
                "manual_rotations",
                format!("must be 0-3, got {}", self.manual_rotations),
            ));
        }

        if !(self.edge_tolerance > 0.0 && self.edge_tolerance < 1.0) {
            return Err(SettingsError::invalid(
                "edge_tolerance",
                format!("must lie in (0, 1), got {}", self.edge_tolerance),
            ));
        }

        if let Some(precision) = self.coordinate_precision {
            if precision > MAX_COORDINATE_PRECISION {
                return Err(SettingsError::invalid(
                    "coordinate_precision",
                    format!("at most {MAX_COORDINATE_PRECISION} decimals, got {precision}"),
                ));
            }
        }

        Ok(())
    }

    pub fn edge_classifier(&self) -> EdgeClassifier {
        EdgeClassifier::new(self.edge_tolerance)
    }
}
