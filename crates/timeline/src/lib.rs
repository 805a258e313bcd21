//! Timeline presentation (Layer 3)
//!
//! Read-only, row-indexed view of the scheduled projects and the refresh
//! state machine behind it.

#![warn(missing_docs)]

pub mod snapshot;
pub mod state;
pub mod delegate;
pub mod timeline;

pub use snapshot::{IndexError, TimelineSnapshot};
pub use state::TimelineState;
pub use delegate::TimelineDelegate;
pub use timeline::{RefreshOutcome, Timeline};
