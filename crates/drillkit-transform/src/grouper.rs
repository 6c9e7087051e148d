//! Tool batches
//!
//! Drilling operations that share a diameter and a direction can be drilled
//! with one tool in one pass. The grouper partitions a batch by
//! [`GroupKey`], keeping groups in first-seen order and points in input order
//! within each group.

use drillkit_core::{DrillPoint, GroupKey, ProcessingError};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Points sharing one key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrillGroup {
    pub key: GroupKey,
    pub points: Vec<DrillPoint>,
}

/// Insertion-ordered map from [`GroupKey`] to its points
///
/// Serializes as a list of `{key, points}` entries.
#[derive(Debug, Clone, Default)]
pub struct DrillGroups {
    groups: Vec<DrillGroup>,
    index: HashMap<GroupKey, usize>,
}

impl DrillGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: GroupKey, point: DrillPoint) {
        match self.index.get(&key) {
            Some(&slot) => self.groups[slot].points.push(point),
            None => {
                self.index.insert(key, self.groups.len());
                self.groups.push(DrillGroup {
                    key,
                    points: vec![point],
                });
            }
        }
    }

    pub fn get(&self, key: &GroupKey) -> Option<&[DrillPoint]> {
        self.index
            .get(key)
            .map(|&slot| self.groups[slot].points.as_slice())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &DrillGroup> {
        self.groups.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.groups.iter().map(|group| &group.key)
    }

    /// Keys by diameter, then direction.
    pub fn sorted_keys(&self) -> Vec<GroupKey> {
        let mut keys: Vec<GroupKey> = self.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn total_points(&self) -> usize {
        self.groups.iter().map(|group| group.points.len()).sum()
    }

    pub fn into_groups(self) -> Vec<DrillGroup> {
        self.groups
    }
}

impl PartialEq for DrillGroups {
    fn eq(&self, other: &Self) -> bool {
        self.groups == other.groups
    }
}

impl Serialize for DrillGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.groups)
    }
}

impl<'a> IntoIterator for &'a DrillGroups {
    type Item = &'a DrillGroup;
    type IntoIter = std::slice::Iter<'a, DrillGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Result of [`DrillPointGrouper::group`]
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping {
    /// Input points with `group_key` assigned, in input order.
    pub points: Vec<DrillPoint>,
    pub groups: DrillGroups,
    /// Points left out of every group.
    pub failures: Vec<ProcessingError>,
}

/// Partitions drill points into tool batches
#[derive(Debug, Clone, Copy, Default)]
pub struct DrillPointGrouper;

impl DrillPointGrouper {
    pub fn new() -> Self {
        Self
    }

    /// Key for a point's current diameter and direction.
    pub fn key_for(point: &DrillPoint) -> Result<GroupKey, ProcessingError> {
        if !point.diameter.is_finite() || !point.direction.is_finite() {
            return Err(ProcessingError::new(
                point.id,
                "group",
                format!(
                    "non-finite key (diameter {}, direction {})",
                    point.diameter, point.direction
                ),
            ));
        }
        Ok(GroupKey::new(point.diameter, point.direction))
    }

    /// Assign group keys and build the groups.
    ///
    /// Every point with a finite key ends up in exactly one group. Points
    /// without one are reported and keep `group_key = None`.
    pub fn group(&self, points: &[DrillPoint]) -> Grouping {
        let mut groups = DrillGroups::new();
        let mut failures = Vec::new();

        let keyed = points
            .iter()
            .map(|point| match Self::key_for(point) {
                Ok(key) => {
                    let keyed = DrillPoint {
                        group_key: Some(key),
                        ..point.clone()
                    };
                    groups.insert(key, keyed.clone());
                    keyed
                }
                Err(e) => {
                    warn!("{}", e);
                    failures.push(e);
                    point.clone()
                }
            })
            .collect();

        for group in &groups {
            debug!(
                "Group Ø{} {}: {} points",
                group.key.diameter,
                group.key.direction,
                group.points.len()
            );
        }
        info!(
            "Grouped {} points into {} tool batches",
            groups.total_points(),
            groups.len()
        );

        Grouping {
            points: keyed,
            groups,
            failures,
        }
    }
}
