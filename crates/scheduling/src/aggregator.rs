//! Project aggregation - decodes raw store documents into typed projects.
//!
//! Each document is decoded on its own: a bad document is rejected with a
//! [`ParseError`] and the remaining documents are still processed.

use chrono::{DateTime, TimeZone, Utc};
use milestone_core::{Difficulty, Milestone, Project, ProjectId, ProjectMap, Time};
use milestone_storage::Document;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ParseError, ParseErrorKind};

/// Document field holding the project deadline.
pub const PROJECT_DUE_DATE: &str = "projectDueDate";
/// Document field holding the milestone records.
pub const MILESTONES: &str = "milestones";
/// Milestone record field holding the name.
pub const MILESTONE_NAME: &str = "milestoneName";
/// Milestone record field holding the deadline.
pub const MILESTONE_DUE_DATE: &str = "milestoneDueDate";
/// Milestone record field holding the difficulty.
pub const MILESTONE_DIFFICULTY: &str = "milestoneDifficultyRating";
/// Field reported when the document body itself could not be read.
pub const WHOLE_DOCUMENT: &str = "<document>";

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Successfully decoded projects
    pub projects: ProjectMap,

    /// One error per rejected document, in input order
    pub rejected: Vec<ParseError>,
}

impl Aggregation {
    /// Fail on the first rejected document instead of skipping it.
    pub fn into_strict(self) -> Result<ProjectMap, ParseError> {
        match self.rejected.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.projects),
        }
    }
}

/// Turns raw documents into projects.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator;

impl Aggregator {
    /// Create an aggregator.
    pub fn new() -> Self {
        Self
    }

    /// Aggregate documents, defaulting missing project due dates to now.
    pub fn aggregate(&self, documents: &[Document]) -> Aggregation {
        self.aggregate_at(documents, Utc::now())
    }

    /// Aggregate documents, defaulting missing project due dates to `now`.
    pub fn aggregate_at(&self, documents: &[Document], now: Time) -> Aggregation {
        let mut aggregation = Aggregation::default();

        for doc in documents {
            match self.aggregate_document(doc, now) {
                Ok(project) => {
                    if aggregation.projects.contains_key(&project.id) {
                        warn!("Duplicate project document {}, keeping the last", project.id);
                    }
                    aggregation.projects.insert(project.id.clone(), project);
                }
                Err(err) => {
                    warn!("Rejected document: {}", err);
                    aggregation.rejected.push(err);
                }
            }
        }

        aggregation
    }

    /// Decode a single project document.
    pub fn aggregate_document(&self, doc: &Document, now: Time) -> Result<Project, ParseError> {
        if let Some(reason) = &doc.unreadable {
            return Err(ParseError::new(
                &doc.id,
                WHOLE_DOCUMENT,
                ParseErrorKind::Invalid(reason.clone()),
            ));
        }

        let due_date = match doc.get(PROJECT_DUE_DATE) {
            None | Some(Value::Null) => {
                debug!("Document {} has no {}, defaulting to now", doc.id, PROJECT_DUE_DATE);
                now
            }
            Some(value) => {
                parse_time(value).map_err(|kind| ParseError::new(&doc.id, PROJECT_DUE_DATE, kind))?
            }
        };

        let records = doc
            .get(MILESTONES)
            .ok_or_else(|| ParseError::new(&doc.id, MILESTONES, ParseErrorKind::Missing))?
            .as_array()
            .ok_or_else(|| {
                ParseError::new(&doc.id, MILESTONES, ParseErrorKind::WrongType { expected: "array" })
            })?;

        let milestones = records
            .iter()
            .enumerate()
            .map(|(index, record)| parse_milestone(&doc.id, index, record))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Project::new(ProjectId::new(doc.id.clone()), due_date, milestones))
    }
}

fn parse_milestone(document: &str, index: usize, record: &Value) -> Result<Milestone, ParseError> {
    let path = |field: &str| format!("{}[{}].{}", MILESTONES, index, field);
    let err = |field: &str, kind| ParseError::new(document, path(field), kind);

    let record = record.as_object().ok_or_else(|| {
        ParseError::new(
            document,
            format!("{}[{}]", MILESTONES, index),
            ParseErrorKind::WrongType { expected: "object" },
        )
    })?;

    let name = required(record, MILESTONE_NAME)
        .and_then(|v| v.as_str().ok_or(ParseErrorKind::WrongType { expected: "string" }))
        .map_err(|kind| err(MILESTONE_NAME, kind))?;

    let due_date = required(record, MILESTONE_DUE_DATE)
        .and_then(parse_time)
        .map_err(|kind| err(MILESTONE_DUE_DATE, kind))?;

    let difficulty = required(record, MILESTONE_DIFFICULTY)
        .and_then(|v| v.as_i64().ok_or(ParseErrorKind::WrongType { expected: "integer" }))
        .and_then(|n| Difficulty::new(n).map_err(|e| ParseErrorKind::OutOfRange(e.to_string())))
        .map_err(|kind| err(MILESTONE_DIFFICULTY, kind))?;

    Milestone::new(name, due_date, difficulty)
        .map_err(|e| err(MILESTONE_NAME, ParseErrorKind::Invalid(e.to_string())))
}

fn required<'a>(record: &'a Map<String, Value>, field: &str) -> Result<&'a Value, ParseErrorKind> {
    match record.get(field) {
        None | Some(Value::Null) => Err(ParseErrorKind::Missing),
        Some(value) => Ok(value),
    }
}

/// Coerce a stored date-like value into a timestamp.
///
/// Accepts an RFC 3339 string, integer epoch seconds, or a
/// `{ "seconds", "nanoseconds" }` timestamp object.
pub fn parse_time(value: &Value) -> Result<Time, ParseErrorKind> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| ParseErrorKind::Invalid(format!("{:?} is not RFC 3339: {}", s, e))),
        Value::Number(n) => {
            let secs = n
                .as_i64()
                .ok_or(ParseErrorKind::WrongType { expected: "integer seconds" })?;
            from_epoch(secs, 0)
        }
        Value::Object(obj) => {
            let secs = obj
                .get("seconds")
                .and_then(Value::as_i64)
                .ok_or(ParseErrorKind::WrongType { expected: "timestamp object" })?;
            let nanos = match obj.get("nanoseconds") {
                None => 0,
                Some(v) => v
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or(ParseErrorKind::WrongType { expected: "timestamp object" })?,
            };
            from_epoch(secs, nanos)
        }
        _ => Err(ParseErrorKind::WrongType { expected: "date" }),
    }
}

fn from_epoch(secs: i64, nanos: u32) -> Result<Time, ParseErrorKind> {
    Utc.timestamp_opt(secs, nanos)
        .single()
        .ok_or_else(|| ParseErrorKind::OutOfRange(format!("{}s {}ns is not a valid instant", secs, nanos)))
}
