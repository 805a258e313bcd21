//! Scheduling output - derived, never persisted.

use std::sync::Arc;

use crate::id::ProjectId;
use crate::milestone::Milestone;
use crate::project::Project;

/// One ranked row of the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    /// The ranked project
    pub project: Arc<Project>,

    /// Higher is more urgent
    pub urgency_score: f64,
}

impl ScheduleEntry {
    /// Id of the ranked project.
    pub fn project_id(&self) -> &ProjectId {
        &self.project.id
    }
}

/// A milestone placed on the flattened agenda.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaItem {
    /// Owning project
    pub project_id: ProjectId,

    /// The milestone itself
    pub milestone: Milestone,
}
