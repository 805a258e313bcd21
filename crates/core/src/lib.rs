//! Milestone core data models.
//!
//! This crate defines the projects, milestones and schedule entries that
//! flow from the document store through the scheduler to the timeline.

#![warn(missing_docs)]

// Identities
mod id;
mod session;

// Projects and milestones
mod milestone;
mod project;

// Scheduling output
mod schedule;

// Re-exports
pub use id::{ProjectId, UserId};
pub use session::Session;

pub use milestone::{Difficulty, DifficultyError, Milestone, MilestoneError};
pub use project::{Project, ProjectMap};
pub use schedule::{AgendaItem, ScheduleEntry};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
