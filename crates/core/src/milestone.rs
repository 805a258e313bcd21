//! Milestone model - a due-dated, difficulty-rated sub-task of a project.

use serde::{Deserialize, Serialize};
use crate::Time;

/// Difficulty rating of a milestone, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    /// Easiest rating.
    pub const MIN: u8 = 1;
    /// Hardest rating.
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values outside the range.
    pub fn new(value: i64) -> Result<Self, DifficultyError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(DifficultyError(value))
        }
    }

    /// The numeric rating.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Rating scaled into `(0, 1]`.
    pub fn normalized(self) -> f64 {
        f64::from(self.0) / f64::from(Self::MAX)
    }
}

impl TryFrom<i64> for Difficulty {
    type Error = DifficultyError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> Self {
        d.0
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

/// Rating outside `Difficulty::MIN..=Difficulty::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("difficulty {0} is outside 1..=5")]
pub struct DifficultyError(pub i64);

/// Errors building a milestone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MilestoneError {
    /// Name was empty or whitespace
    #[error("milestone name is empty")]
    EmptyName,
}

/// A named sub-task of a project. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MilestoneRecord")]
pub struct Milestone {
    name: String,
    due_date: Time,
    difficulty: Difficulty,
}

impl Milestone {
    /// Create a milestone.
    pub fn new(
        name: impl Into<String>,
        due_date: Time,
        difficulty: Difficulty,
    ) -> Result<Self, MilestoneError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(MilestoneError::EmptyName);
        }
        Ok(Self {
            name,
            due_date,
            difficulty,
        })
    }

    /// Milestone name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// When the milestone is due
    pub fn due_date(&self) -> Time {
        self.due_date
    }

    /// Difficulty rating
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

/// Unchecked wire form of a milestone.
#[derive(Deserialize)]
struct MilestoneRecord {
    name: String,
    due_date: Time,
    difficulty: Difficulty,
}

impl TryFrom<MilestoneRecord> for Milestone {
    type Error = MilestoneError;

    fn try_from(record: MilestoneRecord) -> Result<Self, Self::Error> {
        Milestone::new(record.name, record.due_date, record.difficulty)
    }
}
