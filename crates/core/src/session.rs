//! Explicit session context passed into store reads.

use crate::id::UserId;

/// The authenticated context a fetch runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The signed-in user
    pub user_id: UserId,
}

impl Session {
    /// Create a session for a user.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(user_id),
        }
    }

    /// Name of the store collection holding this user's projects.
    pub fn collection(&self) -> &str {
        self.user_id.as_str()
    }
}
