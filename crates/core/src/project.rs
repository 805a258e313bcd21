//! Project model - a due-dated collection of milestones owned by one user.

use std::collections::BTreeMap;

use crate::id::ProjectId;
use crate::milestone::{Difficulty, Milestone};
use crate::Time;

/// Projects keyed by document key. Ordered so iteration is deterministic.
pub type ProjectMap = BTreeMap<ProjectId, Project>;

/// A project as fetched for one user.
///
/// Milestone order carries no meaning; presentation order comes from the
/// scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Store-assigned document key
    pub id: ProjectId,

    /// Project deadline
    pub due_date: Time,

    /// Milestones listed by the project document
    pub milestones: Vec<Milestone>,
}

impl Project {
    /// Create a project.
    pub fn new(id: impl Into<ProjectId>, due_date: Time, milestones: Vec<Milestone>) -> Self {
        Self {
            id: id.into(),
            due_date,
            milestones,
        }
    }

    /// Hardest milestone rating, if there are any milestones.
    pub fn max_difficulty(&self) -> Option<Difficulty> {
        self.milestones.iter().map(Milestone::difficulty).max()
    }

    /// Whether the project has no milestones.
    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }
}
