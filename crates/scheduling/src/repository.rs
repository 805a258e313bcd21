//! Milestone repository - fetches a user's projects from the document store.

use std::sync::Arc;
use std::time::Duration;

use milestone_core::{ProjectMap, Session};
use milestone_storage::{Document, DocumentStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregator::Aggregator;
use crate::error::{FetchError, ParseError};

/// Repository configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Per-attempt deadline for the store read
    #[serde(with = "millis")]
    pub timeout: Duration,
    /// Extra attempts after a network failure or timeout
    pub max_retries: u32,
    /// Base delay between attempts, multiplied by the attempt number
    #[serde(with = "millis")]
    pub retry_backoff: Duration,
    /// Fail the whole fetch on the first malformed document
    pub strict: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 0,
            retry_backoff: Duration::from_millis(250),
            strict: false,
        }
    }
}

impl RepositoryConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry budget.
    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    /// Set strict decoding.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Projects from one fetch, plus the documents that failed to decode.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Decoded projects
    pub projects: ProjectMap,
    /// Rejected documents
    pub rejected: Vec<ParseError>,
}

/// Reads project documents for a session and decodes them.
pub struct Repository<S: DocumentStore + ?Sized> {
    store: Arc<S>,
    aggregator: Aggregator,
    config: RepositoryConfig,
}

impl<S: DocumentStore + ?Sized> Repository<S> {
    /// Create a repository over a store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            aggregator: Aggregator::new(),
            config: RepositoryConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: RepositoryConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Fetch and decode every project in the session user's collection.
    pub async fn fetch_projects(&self, session: &Session) -> Result<FetchOutcome, FetchError> {
        info!("Fetching projects for {}", session.user_id);

        let documents = self.fetch_documents(session).await?;
        let aggregation = self.aggregator.aggregate(&documents);

        if self.config.strict {
            let projects = aggregation.into_strict()?;
            return Ok(FetchOutcome {
                projects,
                rejected: Vec::new(),
            });
        }

        info!(
            "Fetched {} projects ({} rejected)",
            aggregation.projects.len(),
            aggregation.rejected.len()
        );
        Ok(FetchOutcome {
            projects: aggregation.projects,
            rejected: aggregation.rejected,
        })
    }

    async fn fetch_documents(&self, session: &Session) -> Result<Vec<Document>, FetchError> {
        let mut attempt = 0;
        loop {
            let read = self.store.list_documents(session.collection());
            let result = match tokio::time::timeout(self.config.timeout, read).await {
                Ok(result) => result.map_err(FetchError::from),
                Err(_) => Err(FetchError::Timeout(self.config.timeout)),
            };

            match result {
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!("Fetch attempt {} failed: {}; retrying", attempt, e);
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                }
                Err(e) => {
                    warn!("Fetch failed: {}", e);
                    return Err(e);
                }
                Ok(docs) => {
                    debug!("Read {} documents after {} retries", docs.len(), attempt);
                    return Ok(docs);
                }
            }
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(d.as_millis())
            .map_err(|_| S::Error::custom(format!("{:?} does not fit in u64 milliseconds", d)))?;
        s.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
