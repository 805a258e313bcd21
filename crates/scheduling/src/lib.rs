//! Scheduling layer - document decoding, project fetching and urgency ordering.

#![warn(missing_docs)]

pub mod error;
pub mod aggregator;
pub mod repository;
pub mod scheduler;

pub use error::{FetchError, ParseError, ParseErrorKind};
pub use aggregator::{Aggregation, Aggregator};
pub use repository::{FetchOutcome, Repository, RepositoryConfig};
pub use scheduler::{Scheduler, UrgencyWeights};
