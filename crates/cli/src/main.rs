//! Milestone CLI - terminal timeline of a user's projects.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use milestone_core::{Difficulty, Session};
use milestone_scheduling::aggregator::{
    MILESTONES, MILESTONE_DIFFICULTY, MILESTONE_DUE_DATE, MILESTONE_NAME, PROJECT_DUE_DATE,
};
use milestone_scheduling::{Aggregator, Repository, Scheduler};
use milestone_storage::{Document, DocumentStore, JsonStore};
use milestone_timeline::{RefreshOutcome, Timeline};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "milestone")]
#[command(about = "Projects and milestones ordered by urgency", long_about = None)]
struct Cli {
    /// Store directory
    #[arg(long, default_value = ".milestone")]
    store: PathBuf,
    /// User whose projects to read
    #[arg(long)]
    user: String,
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show projects, most urgent first
    Timeline,
    /// Show every milestone, soonest first
    Agenda,
    /// Add a project
    Add {
        /// Project due date (RFC 3339)
        #[arg(long)]
        due: String,
        /// Document key (defaults to a new ULID)
        #[arg(long)]
        id: Option<String>,
        /// Milestone as NAME@DUE@DIFFICULTY, repeatable
        #[arg(long = "milestone")]
        milestones: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let store = Arc::new(JsonStore::new(&cli.store).await?);
    let session = Session::new(cli.user.clone());
    let repository = Repository::new(store.clone()).with_config(config.repository.clone());
    let scheduler = Scheduler::new().with_weights(config.urgency);

    match cli.command {
        Commands::Timeline => {
            let timeline = Timeline::new(repository).with_scheduler(scheduler);
            let snapshot = match timeline.refresh(&session).await {
                RefreshOutcome::Ready(snapshot) => snapshot,
                RefreshOutcome::Failed(e) => return Err(e.into()),
                RefreshOutcome::Ignored => bail!("refresh already in progress"),
            };

            println!("Timeline for {} ({})", session.user_id, snapshot.count());
            for (row, entry) in snapshot.iter().enumerate() {
                let project = &entry.project;
                println!(
                    "  {:>2}. {} | due {} | urgency {:.2} | {} milestones | max {}",
                    row + 1,
                    project.id,
                    project.due_date.format("%Y-%m-%d %H:%M"),
                    entry.urgency_score,
                    project.milestones.len(),
                    project.max_difficulty().map_or("-".to_string(), |d| d.to_string()),
                );
            }
            for rejected in timeline.rejected() {
                println!("  ! skipped {}", rejected);
            }
        }
        Commands::Agenda => {
            let outcome = repository.fetch_projects(&session).await?;
            let agenda = scheduler.agenda(&outcome.projects);

            println!("Agenda for {} ({})", session.user_id, agenda.len());
            for item in agenda {
                println!(
                    "  {} | {} | {} | {}",
                    item.milestone.due_date().format("%Y-%m-%d %H:%M"),
                    item.project_id,
                    item.milestone.difficulty(),
                    item.milestone.name(),
                );
            }
            for rejected in outcome.rejected {
                println!("  ! skipped {}", rejected);
            }
        }
        Commands::Add { due, id, milestones } => {
            let id = id.unwrap_or_else(|| ulid::Ulid::new().to_string());
            let due = parse_date(&due)?;
            let milestones = milestones
                .iter()
                .map(|arg| parse_milestone_arg(arg))
                .collect::<Result<Vec<_>>>()?;

            let doc = Document::new(id)
                .with_field(PROJECT_DUE_DATE, due.to_rfc3339())
                .with_field(MILESTONES, Value::Array(milestones));
            Aggregator::new().aggregate_document(&doc, Utc::now())?;

            store.put_document(session.collection(), &doc).await?;
            info!("Stored project {} for {}", doc.id, session.user_id);
            println!("Added project: {}", doc.id);
        }
    }

    Ok(())
}

fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("invalid date {:?}, expected RFC 3339", s))
}

/// Parse `NAME@DUE@DIFFICULTY` into a milestone record. The name may contain `@`.
fn parse_milestone_arg(arg: &str) -> Result<Value> {
    let mut parts = arg.rsplitn(3, '@');
    let (Some(difficulty), Some(due), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(anyhow!("milestone {:?} must look like NAME@DUE@DIFFICULTY", arg));
    };

    let difficulty: i64 = difficulty
        .parse()
        .with_context(|| format!("difficulty {:?} is not a number", difficulty))?;
    let difficulty = Difficulty::new(difficulty)?;

    Ok(json!({
        MILESTONE_NAME: name,
        MILESTONE_DUE_DATE: parse_date(due)?.to_rfc3339(),
        MILESTONE_DIFFICULTY: difficulty.get(),
    }))
}
