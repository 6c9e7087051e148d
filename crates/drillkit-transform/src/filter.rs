//! Horizontal-only filtering
//!
//! Machines without a vertical spindle only drill into the side faces. This
//! stage drops everything else before positioning.

use drillkit_core::{DrillPoint, Edge};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub original: usize,
    pub horizontal: usize,
    pub vertical: usize,
    pub unknown: usize,
}

impl FilterStats {
    pub fn removed(&self) -> usize {
        self.vertical + self.unknown
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DrillPointFilter;

impl DrillPointFilter {
    pub fn new() -> Self {
        Self
    }

    /// Keep points whose current edge is LEFT, RIGHT, FRONT or BACK.
    pub fn filter_horizontal(&self, points: &[DrillPoint]) -> (Vec<DrillPoint>, FilterStats) {
        let mut stats = FilterStats {
            original: points.len(),
            ..Default::default()
        };

        let kept = points
            .iter()
            .filter(|point| match point.edge {
                Edge::Vertical => {
                    stats.vertical += 1;
                    false
                }
                Edge::Unknown => {
                    stats.unknown += 1;
                    false
                }
                _ => {
                    stats.horizontal += 1;
                    true
                }
            })
            .cloned()
            .collect();

        if stats.removed() > 0 {
            info!(
                "Horizontal filter kept {}/{} points ({} vertical, {} unknown removed)",
                stats.horizontal, stats.original, stats.vertical, stats.unknown
            );
        }
        (kept, stats)
    }
}
