use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use git_doc_analyzer::changelog::{reference_timestamp, write_recent_changes};
use git_doc_analyzer::changes::analyze;
use git_doc_analyzer::config::Settings;
use git_doc_analyzer::git::{ingest_or_empty, IngestOptions};
use git_doc_analyzer::report::generate_report;
use git_doc_analyzer::server::{router, AppState};

#[derive(Debug, Parser)]
#[command(name = "git-doc-analyzer", version, about = "Classify projects and git history for documentation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Detect project type and frameworks, print the report as JSON
    Detect {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Classify commits since the last documentation update
    Analyze {
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Start date (YYYY-MM-DD); defaults to the last RECENT_CHANGES.md render
        #[arg(long)]
        since: Option<String>,
        /// End date (YYYY-MM-DD), inclusive
        #[arg(long)]
        until: Option<String>,
        /// Comma-separated author names or emails
        #[arg(long)]
        author: Option<String>,
        /// Docs directory, relative to the project
        #[arg(long)]
        docs_dir: Option<PathBuf>,
        /// Write docs/RECENT_CHANGES.md instead of printing JSON
        #[arg(long)]
        write: bool,
    },
    /// Serve both engines over HTTP
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
}

fn parse_day(value: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date {:?}, expected YYYY-MM-DD", value))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    time.map(|t| t.and_utc())
        .with_context(|| format!("Invalid date {:?}", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Detect { path } => {
            let report = generate_report(&path)
                .with_context(|| format!("Failed to scan {}", path.display()))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Analyze {
            path,
            since,
            until,
            author,
            docs_dir,
            write,
        } => {
            let docs_dir = path.join(docs_dir.unwrap_or_else(|| settings.docs_dir.clone()));
            let now = Utc::now();
            let since = match since {
                Some(day) => parse_day(&day, false)?,
                None => reference_timestamp(&docs_dir, now, settings.since_days),
            };
            let until = until.map(|day| parse_day(&day, true)).transpose()?;
            tracing::info!("Analyzing git history since {}", since.to_rfc3339());

            let options = IngestOptions {
                since: Some(since),
                until,
                author_filter: author,
            };
            let commits = ingest_or_empty(&path, &options);
            let analysis = analyze(&commits);

            if write {
                let written = write_recent_changes(&docs_dir, &analysis, now)
                    .with_context(|| format!("Failed to write into {}", docs_dir.display()))?;
                tracing::info!(
                    "{} commits, {} features, {} fixes, {} breaking changes -> {}",
                    analysis.total_commits,
                    analysis.new_features.len(),
                    analysis.bug_fixes.len(),
                    analysis.breaking_changes.len(),
                    written.display()
                );
            } else {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            }
        }
        Command::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| settings.bind_address.clone());
            let app = router(AppState { settings });
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on {}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
