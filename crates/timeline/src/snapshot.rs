//! Immutable timeline snapshots.

use chrono::{DateTime, Utc};
use milestone_core::ScheduleEntry;

/// Row lookup past the end of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("row {index} out of bounds for {count} rows")]
pub struct IndexError {
    /// Requested row
    pub index: usize,
    /// Rows available
    pub count: usize,
}

/// The scheduled rows produced by one refresh. Replaced wholesale on the
/// next successful refresh.
#[derive(Debug, Clone)]
pub struct TimelineSnapshot {
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    entries: Vec<ScheduleEntry>,
}

impl TimelineSnapshot {
    /// Wrap scheduler output.
    pub fn new(entries: Vec<ScheduleEntry>) -> Self {
        Self {
            taken_at: Utc::now(),
            entries,
        }
    }

    /// Snapshot with no rows.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Number of rows.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Row at `index`.
    pub fn entry_at(&self, index: usize) -> Result<&ScheduleEntry, IndexError> {
        self.entries.get(index).ok_or(IndexError {
            index,
            count: self.entries.len(),
        })
    }

    /// Rows in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleEntry> {
        self.entries.iter()
    }
}

impl Default for TimelineSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milestone_core::Project;
    use std::sync::Arc;

    fn entry(id: &str, score: f64) -> ScheduleEntry {
        ScheduleEntry {
            project: Arc::new(Project::new(id, Utc::now(), vec![])),
            urgency_score: score,
        }
    }

    #[test]
    fn test_entry_at_in_bounds() {
        let snapshot = TimelineSnapshot::new(vec![entry("a", 2.0), entry("b", 1.0)]);
        assert_eq!(snapshot.count(), 2);
        assert_eq!(snapshot.entry_at(1).unwrap().project_id().as_str(), "b");
    }

    #[test]
    fn test_entry_at_out_of_bounds() {
        let snapshot = TimelineSnapshot::new(vec![entry("a", 2.0)]);
        assert_eq!(snapshot.entry_at(1).unwrap_err(), IndexError { index: 1, count: 1 });
        assert!(TimelineSnapshot::empty().entry_at(0).is_err());
    }
}
