//! Urgency scheduling - orders projects and milestones for display.
//!
//! Score for a project due `d` days from now (overdue counts as `0`):
//!
//! ```text
//! score = deadline * horizon / (horizon + d) + difficulty * max_difficulty / 5
//! ```
//!
//! The deadline term decays as the due date moves away, so close deadlines
//! dominate; the difficulty term is flat, which lets a hard project overtake
//! an easy one that is only slightly closer. Projects without milestones go
//! after every project that has some.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use milestone_core::{AgendaItem, Project, ProjectMap, ScheduleEntry, Time};
use serde::{Deserialize, Serialize};
use tracing::debug;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Weights of the urgency score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyWeights {
    /// Score of a project due right now, before difficulty
    pub deadline: f64,
    /// Score added by a maximum-difficulty milestone
    pub difficulty: f64,
    /// Days until the deadline term halves
    pub horizon_days: f64,
}

impl Default for UrgencyWeights {
    fn default() -> Self {
        Self {
            deadline: 10.0,
            difficulty: 2.0,
            horizon_days: 1.0,
        }
    }
}

impl UrgencyWeights {
    /// Create the default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deadline weight.
    pub fn with_deadline(mut self, weight: f64) -> Self {
        self.deadline = weight;
        self
    }

    /// Set the difficulty weight.
    pub fn with_difficulty(mut self, weight: f64) -> Self {
        self.difficulty = weight;
        self
    }

    /// Set the half-life of the deadline term, in days. Must be positive.
    pub fn with_horizon_days(mut self, days: f64) -> Self {
        self.horizon_days = days;
        self
    }

    /// Urgency of a project as seen at `now`.
    pub fn score(&self, project: &Project, now: Time) -> f64 {
        let days = ((project.due_date - now).num_milliseconds() as f64 / MILLIS_PER_DAY).max(0.0);
        let horizon = self.horizon_days.max(f64::MIN_POSITIVE);
        let deadline = self.deadline * horizon / (horizon + days);
        let difficulty = project
            .max_difficulty()
            .map_or(0.0, |d| self.difficulty * d.normalized());
        deadline + difficulty
    }
}

/// Orders projects by urgency.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    weights: UrgencyWeights,
}

impl Scheduler {
    /// Create a scheduler with default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the urgency weights.
    pub fn with_weights(mut self, weights: UrgencyWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Current weights.
    pub fn weights(&self) -> &UrgencyWeights {
        &self.weights
    }

    /// Rank projects as of the current time.
    pub fn schedule(&self, projects: &ProjectMap) -> Vec<ScheduleEntry> {
        self.schedule_at(projects, Utc::now())
    }

    /// Rank projects as of `now`, most urgent first.
    ///
    /// The order is total: ties on score fall back to the earlier due date,
    /// then the project id.
    pub fn schedule_at(&self, projects: &ProjectMap, now: Time) -> Vec<ScheduleEntry> {
        let mut entries: Vec<ScheduleEntry> = projects
            .values()
            .map(|project| ScheduleEntry {
                urgency_score: self.weights.score(project, now),
                project: Arc::new(project.clone()),
            })
            .collect();

        entries.sort_by(compare_entries);
        debug!("Scheduled {} projects", entries.len());
        entries
    }

    /// Every milestone across all projects, soonest first.
    pub fn agenda(&self, projects: &ProjectMap) -> Vec<AgendaItem> {
        self.agenda_at(projects, Utc::now())
    }

    /// Every milestone across all projects, soonest first. Milestones
    /// already past `now` are kept at the front.
    pub fn agenda_at(&self, projects: &ProjectMap, now: Time) -> Vec<AgendaItem> {
        let mut items: Vec<AgendaItem> = projects
            .values()
            .flat_map(|project| {
                project.milestones.iter().map(|m| AgendaItem {
                    project_id: project.id.clone(),
                    milestone: m.clone(),
                })
            })
            .collect();

        // Sort by due date, then difficulty (descending), then owner and name
        items.sort_by(|a, b| {
            a.milestone
                .due_date()
                .cmp(&b.milestone.due_date())
                .then_with(|| b.milestone.difficulty().cmp(&a.milestone.difficulty()))
                .then_with(|| a.project_id.cmp(&b.project_id))
                .then_with(|| a.milestone.name().cmp(b.milestone.name()))
        });

        let overdue = items.iter().filter(|i| i.milestone.due_date() < now).count();
        debug!("Agenda has {} milestones, {} overdue", items.len(), overdue);
        items
    }
}

fn compare_entries(a: &ScheduleEntry, b: &ScheduleEntry) -> Ordering {
    a.project
        .is_empty()
        .cmp(&b.project.is_empty())
        .then_with(|| b.urgency_score.total_cmp(&a.urgency_score))
        .then_with(|| a.project.due_date.cmp(&b.project.due_date))
        .then_with(|| a.project.id.cmp(&b.project.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use milestone_core::{Difficulty, Milestone};

    fn now() -> Time {
        Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap()
    }

    fn project(id: &str, due_in_days: i64, difficulties: &[i64]) -> Project {
        let due = now() + Duration::days(due_in_days);
        let milestones = difficulties
            .iter()
            .enumerate()
            .map(|(i, d)| {
                Milestone::new(format!("{}-{}", id, i), due, Difficulty::new(*d).unwrap()).unwrap()
            })
            .collect();
        Project::new(id, due, milestones)
    }

    fn map(projects: Vec<Project>) -> ProjectMap {
        projects.into_iter().map(|p| (p.id.clone(), p)).collect()
    }

    fn order(entries: &[ScheduleEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.project_id().as_str()).collect()
    }

    #[test]
    fn test_empty_input_yields_empty_schedule() {
        assert!(Scheduler::new().schedule_at(&ProjectMap::new(), now()).is_empty());
    }

    #[test]
    fn test_close_deadline_beats_distant_hard_project() {
        // P1: 10 * 1/2 + 2 * 2/5 = 5.8; P2: 10 * 1/11 + 2 * 5/5 ≈ 2.909
        let projects = map(vec![project("P1", 1, &[2]), project("P2", 10, &[5])]);
        let entries = Scheduler::new().schedule_at(&projects, now());

        assert_eq!(order(&entries), vec!["P1", "P2"]);
        assert!((entries[0].urgency_score - 5.8).abs() < 1e-9);
        assert!((entries[1].urgency_score - (10.0 / 11.0 + 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_difficulty_promotes_slightly_later_project() {
        // hard: 10/4 + 2 = 4.5; easy: 10/3 + 0.4 ≈ 3.73
        let projects = map(vec![project("easy", 2, &[1]), project("hard", 3, &[5, 2])]);
        let entries = Scheduler::new().schedule_at(&projects, now());
        assert_eq!(order(&entries), vec!["hard", "easy"]);
    }

    #[test]
    fn test_overdue_counts_as_due_now() {
        let weights = UrgencyWeights::default();
        let overdue = project("late", -3, &[1]);
        let due_now = project("now", 0, &[1]);
        assert_eq!(weights.score(&overdue, now()), weights.score(&due_now, now()));
    }

    #[test]
    fn test_empty_projects_sort_last() {
        let projects = map(vec![
            project("bare", 0, &[]),
            project("far", 60, &[1]),
            project("bare-later", 5, &[]),
        ]);
        let entries = Scheduler::new().schedule_at(&projects, now());
        assert_eq!(order(&entries), vec!["far", "bare", "bare-later"]);
    }

    #[test]
    fn test_ties_break_on_due_date_then_id() {
        // Same score: zero deadline weight, same difficulty.
        let weights = UrgencyWeights::new().with_deadline(0.0);
        let projects = map(vec![
            project("b", 4, &[3]),
            project("a", 4, &[3]),
            project("c", 2, &[3]),
        ]);
        let entries = Scheduler::new().with_weights(weights).schedule_at(&projects, now());
        assert_eq!(order(&entries), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_schedule_is_deterministic() {
        let forward = map(vec![project("x", 3, &[2]), project("y", 3, &[2]), project("z", 1, &[])]);
        let mut reversed = ProjectMap::new();
        for (id, p) in forward.iter().rev() {
            reversed.insert(id.clone(), p.clone());
        }

        let scheduler = Scheduler::new();
        let first = scheduler.schedule_at(&forward, now());
        for _ in 0..5 {
            assert_eq!(scheduler.schedule_at(&forward, now()), first);
        }
        assert_eq!(scheduler.schedule_at(&reversed, now()), first);
    }

    #[test]
    fn test_agenda_orders_milestones() {
        let due = |days| now() + Duration::days(days);
        let d = |n| Difficulty::new(n).unwrap();
        let a = Project::new("a", due(10), vec![
            Milestone::new("write", due(5), d(2)).unwrap(),
            Milestone::new("research", due(1), d(3)).unwrap(),
        ]);
        let b = Project::new("b", due(4), vec![
            Milestone::new("prototype", due(5), d(4)).unwrap(),
            Milestone::new("spec", due(-1), d(1)).unwrap(),
        ]);

        let agenda = Scheduler::new().agenda_at(&map(vec![a, b]), now());
        let names: Vec<_> = agenda.iter().map(|i| i.milestone.name()).collect();
        assert_eq!(names, vec!["spec", "research", "prototype", "write"]);
        assert_eq!(agenda[0].project_id.as_str(), "b");
    }
}
