//! Refresh state machine.

use std::fmt;

/// Where the timeline is in its refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimelineState {
    /// Nothing loaded yet
    #[default]
    Idle,
    /// A refresh is in flight
    Loading,
    /// Last refresh succeeded
    Ready,
    /// Last refresh failed; any earlier snapshot is still shown
    Failed,
}

impl TimelineState {
    /// Check if moving to `next` is a legal transition.
    pub fn can_transition_to(self, next: TimelineState) -> bool {
        use TimelineState::*;
        matches!(
            (self, next),
            (Idle | Ready | Failed, Loading) | (Loading, Ready | Failed)
        )
    }

    /// Whether a refresh is running.
    pub fn is_loading(self) -> bool {
        self == TimelineState::Loading
    }
}

impl fmt::Display for TimelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineState::Idle => write!(f, "idle"),
            TimelineState::Loading => write!(f, "loading"),
            TimelineState::Ready => write!(f, "ready"),
            TimelineState::Failed => write!(f, "failed"),
        }
    }
}
