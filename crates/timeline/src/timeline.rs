//! The timeline screen model.
//!
//! Runs the `Idle -> Loading -> {Ready, Failed}` cycle. A refresh requested
//! while another is in flight is ignored, so only one fetch ever writes the
//! snapshot at a time.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use milestone_core::{ScheduleEntry, Session};
use milestone_scheduling::{FetchError, ParseError, Repository, Scheduler};
use milestone_storage::DocumentStore;
use tracing::{debug, info, warn};

use crate::delegate::TimelineDelegate;
use crate::snapshot::{IndexError, TimelineSnapshot};
use crate::state::TimelineState;

/// Result of a refresh request.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// A new snapshot replaced the old one
    Ready(Arc<TimelineSnapshot>),
    /// The fetch failed; the previous snapshot is still current
    Failed(FetchError),
    /// Another refresh was already in flight
    Ignored,
}

#[derive(Default)]
struct Inner {
    state: TimelineState,
    snapshot: Arc<TimelineSnapshot>,
    last_error: Option<FetchError>,
    rejected: Vec<ParseError>,
}

impl Inner {
    fn transition(&mut self, next: TimelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!("Timeline {} -> {}", self.state, next);
        self.state = next;
    }
}

/// Scheduled projects for one user, refreshed on demand.
pub struct Timeline<S: DocumentStore + ?Sized> {
    repository: Repository<S>,
    scheduler: Scheduler,
    inner: Mutex<Inner>,
    delegate: Option<Weak<dyn TimelineDelegate>>,
}

impl<S: DocumentStore + ?Sized> Timeline<S> {
    /// Create an idle timeline.
    pub fn new(repository: Repository<S>) -> Self {
        Self {
            repository,
            scheduler: Scheduler::default(),
            inner: Mutex::new(Inner::default()),
            delegate: None,
        }
    }

    /// Set the scheduler.
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Set the delegate. Only a weak reference is kept.
    pub fn with_delegate<D: TimelineDelegate + 'static>(mut self, delegate: &Arc<D>) -> Self {
        let delegate: Arc<dyn TimelineDelegate> = delegate.clone();
        self.delegate = Some(Arc::downgrade(&delegate));
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch, schedule and publish a new snapshot.
    pub async fn refresh(&self, session: &Session) -> RefreshOutcome {
        let mut in_flight = {
            let mut inner = self.lock();
            if inner.state.is_loading() {
                debug!("Refresh already in flight, ignoring");
                return RefreshOutcome::Ignored;
            }
            let previous = inner.state;
            inner.transition(TimelineState::Loading);
            InFlight {
                inner: &self.inner,
                previous,
                settled: false,
            }
        };

        let result = self.repository.fetch_projects(session).await;

        let mut inner = self.lock();
        in_flight.settled = true;
        match result {
            Ok(outcome) => {
                let entries = self.scheduler.schedule(&outcome.projects);
                let snapshot = Arc::new(TimelineSnapshot::new(entries));
                info!(
                    "Timeline ready with {} rows ({} documents rejected)",
                    snapshot.count(),
                    outcome.rejected.len()
                );
                inner.snapshot = snapshot.clone();
                inner.rejected = outcome.rejected;
                inner.last_error = None;
                inner.transition(TimelineState::Ready);
                RefreshOutcome::Ready(snapshot)
            }
            Err(e) => {
                warn!("Timeline refresh failed: {}", e);
                inner.last_error = Some(e.clone());
                inner.transition(TimelineState::Failed);
                RefreshOutcome::Failed(e)
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> TimelineState {
        self.lock().state
    }

    /// The snapshot currently on screen.
    pub fn snapshot(&self) -> Arc<TimelineSnapshot> {
        self.lock().snapshot.clone()
    }

    /// Number of rows on screen.
    pub fn count(&self) -> usize {
        self.lock().snapshot.count()
    }

    /// Row at `index` of the current snapshot.
    pub fn entry_at(&self, index: usize) -> Result<ScheduleEntry, IndexError> {
        self.lock().snapshot.entry_at(index).cloned()
    }

    /// Error of the last refresh, if it failed.
    pub fn last_error(&self) -> Option<FetchError> {
        self.lock().last_error.clone()
    }

    /// Documents the last successful refresh could not decode.
    pub fn rejected(&self) -> Vec<ParseError> {
        self.lock().rejected.clone()
    }

    /// Forward a side menu tap. Returns false when no delegate is alive.
    pub fn tap_side_menu(&self) -> bool {
        self.with_live_delegate(|d| d.did_tap_side_menu())
    }

    /// Forward a new project tap. Returns false when no delegate is alive.
    pub fn tap_new_project(&self) -> bool {
        self.with_live_delegate(|d| d.did_tap_new_project())
    }

    fn with_live_delegate(&self, f: impl FnOnce(&dyn TimelineDelegate)) -> bool {
        match self.delegate.as_ref().and_then(Weak::upgrade) {
            Some(delegate) => {
                f(delegate.as_ref());
                true
            }
            None => false,
        }
    }
}

/// Puts the state back if a refresh future is dropped before it settles.
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
    previous: TimelineState,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.state.is_loading() {
            warn!("Refresh cancelled, returning to {}", self.previous);
            inner.state = self.previous;
        }
    }
}
