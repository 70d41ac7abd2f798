use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use git2::{DiffOptions, ErrorCode, Repository};

use crate::error::IngestError;
use crate::models::CommitRecord;

/// Which part of the history to read.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    /// Comma-separated list matched against author name or email.
    pub author_filter: Option<String>,
}

impl IngestOptions {
    pub fn since(since: DateTime<Utc>) -> Self {
        Self {
            since: Some(since),
            ..Self::default()
        }
    }

    fn author_filters(&self) -> Vec<&str> {
        self.author_filter
            .as_deref()
            .map(|filter| {
                filter
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Reads commits reachable from HEAD, newest first.
pub fn read_commits(repo_path: &Path, options: &IngestOptions) -> Result<Vec<CommitRecord>, IngestError> {
    let repo = Repository::open(repo_path).map_err(|e| match e.code() {
        ErrorCode::NotFound => IngestError::NotARepository(repo_path.to_path_buf()),
        _ => IngestError::Git(e),
    })?;

    let mut revwalk = repo.revwalk()?;
    if let Err(e) = revwalk.push_head() {
        return Err(match e.code() {
            ErrorCode::UnbornBranch | ErrorCode::NotFound => IngestError::UnbornHead,
            _ => IngestError::Git(e),
        });
    }
    revwalk.set_sorting(git2::Sort::TIME)?;

    let since_ts = options.since.map(|d| d.timestamp());
    let until_ts = options.until.map(|d| d.timestamp());
    let filters = options.author_filters();

    let mut commits = Vec::new();

    for oid in revwalk.flatten() {
        let commit = repo.find_commit(oid)?;
        let author = commit.author();
        // Author date; the walk is ordered by committer date, so rebased
        // history can interleave and the window is checked per commit.
        let time = author.when().seconds();

        if until_ts.is_some_and(|until| time > until)
            || since_ts.is_some_and(|since| time < since)
        {
            continue;
        }

        let author_email = author.email().unwrap_or("").to_string();
        let author_name = author.name().unwrap_or("").to_string();

        if !filters.is_empty()
            && !filters
                .iter()
                .any(|f| author_email.contains(f) || author_name.contains(f))
        {
            continue;
        }

        let message = commit.message().unwrap_or("");
        let (subject, body) = split_message(message);
        let files = changed_paths(&repo, &commit)?;

        let Some(date) = Utc.timestamp_opt(time, 0).single() else {
            tracing::warn!("Commit {} has an out-of-range timestamp, skipping", oid);
            continue;
        };

        commits.push(CommitRecord {
            hash: oid.to_string(),
            author_name,
            author_email,
            date,
            subject,
            body,
            files,
        });
    }

    tracing::info!("Read {} commits from {}", commits.len(), repo_path.display());

    Ok(commits)
}

/// Like [`read_commits`], but any failure yields an empty history.
pub fn ingest_or_empty(repo_path: &Path, options: &IngestOptions) -> Vec<CommitRecord> {
    match read_commits(repo_path, options) {
        Ok(commits) => commits,
        Err(e) => {
            tracing::warn!("Could not read git history at {}: {}", repo_path.display(), e);
            Vec::new()
        }
    }
}

fn split_message(message: &str) -> (String, String) {
    let mut parts = message.splitn(2, '\n');
    let subject = parts.next().unwrap_or("").trim().to_string();
    let body = parts.next().unwrap_or("").trim().to_string();
    (subject, body)
}

/// Paths touched by `commit` relative to its first parent.
fn changed_paths(repo: &Repository, commit: &git2::Commit) -> Result<Vec<String>, git2::Error> {
    let tree = commit.tree()?;
    let parent_tree = commit.parent(0).ok().and_then(|p| p.tree().ok());

    let mut opts = DiffOptions::new();
    opts.include_untracked(false);

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

    let mut paths: Vec<String> = Vec::new();

    diff.foreach(
        &mut |delta, _progress| {
            if let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) {
                paths.push(path.to_string_lossy().to_string());
            }
            true
        },
        None,
        None,
        None,
    )?;

    Ok(paths)
}
