use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, TimeZone, Utc};
use git2::{Repository, Signature, Time};
use git_doc_analyzer::changelog::render_recent_changes;
use git_doc_analyzer::git::{ingest_or_empty, read_commits, IngestOptions};
use git_doc_analyzer::{analyze, ChangeCategory, CommitRecord, ImpactLevel};
use pretty_assertions::assert_eq;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

fn record(hash: &str, author: &str, subject: &str, files: &[&str], minutes: i64) -> CommitRecord {
    CommitRecord {
        hash: hash.into(),
        author_name: author.into(),
        author_email: format!("{}@example.com", author.to_lowercase()),
        date: base_time() + Duration::minutes(minutes),
        subject: subject.into(),
        body: String::new(),
        files: files.iter().map(|f| f.to_string()).collect(),
    }
}

/// Commits `files` (path, content) authored and committed at `at`.
fn commit(repo: &Repository, author: &str, message: &str, files: &[(&str, &str)], at: DateTime<Utc>) {
    commit_at(repo, author, message, files, at, at);
}

fn commit_at(
    repo: &Repository,
    author: &str,
    message: &str,
    files: &[(&str, &str)],
    authored: DateTime<Utc>,
    committed: DateTime<Utc>,
) {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let mut index = repo.index().unwrap();
    for (rel, content) in files {
        let path = workdir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        index.add_path(Path::new(rel)).unwrap();
    }
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let email = format!("{}@example.com", author.to_lowercase());
    let author_sig = Signature::new(author, &email, &Time::new(authored.timestamp(), 0)).unwrap();
    let committer_sig = Signature::new(author, &email, &Time::new(committed.timestamp(), 0)).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &author_sig, &committer_sig, message, &tree, &parents)
        .unwrap();
}

#[test]
fn buckets_keep_everything_recent_view_is_capped() {
    let mut commits: Vec<CommitRecord> = (0..25)
        .map(|i| record(&format!("f{i}"), "Ana", &format!("feat: widget {i}"), &["src/w.rs"], i))
        .collect();
    commits.push(record("x1", "Bo", "fix: crash on start", &["src/main.rs"], 100));

    let analysis = analyze(&commits);

    assert_eq!(analysis.total_commits, 26);
    assert_eq!(analysis.new_features.len(), 25);
    assert_eq!(analysis.bug_fixes.len(), 1);
    assert_eq!(analysis.recent_changes.len(), 20);
    assert_eq!(analysis.recent_changes[0].hash, "x1");
    assert_eq!(analysis.recent_changes[1].hash, "f24");
    assert_eq!(analysis.recent_changes[19].hash, "f6");
    assert_eq!(analysis.contributors, vec!["Ana", "Bo"]);
    assert_eq!(analysis.files_changed, vec!["src/w.rs", "src/main.rs"]);
    assert_eq!(analysis.stats.by_category[&ChangeCategory::Feature], 25);
    assert_eq!(analysis.stats.by_category[&ChangeCategory::Fix], 1);
}

#[test]
fn buckets_route_each_category() {
    let commits = vec![
        record("a", "Ana", "BREAKING: drop v1 api", &[], 0),
        record("b", "Ana", "chore(deps): bump serde", &[], 1),
        record("c", "Ana", "perf: cache lookups", &[], 2),
        record("d", "Ana", "docs: usage section", &[], 3),
        record("e", "Ana", "refactor router", &[], 4),
        record("f", "Ana", "ci: cache cargo", &[], 5),
        record("g", "Ana", "wip", &[], 6),
    ];
    let analysis = analyze(&commits);

    assert_eq!(analysis.breaking_changes.len(), 1);
    assert_eq!(analysis.dependency_updates.len(), 1);
    assert_eq!(analysis.performance_improvements.len(), 1);
    assert_eq!(analysis.documentation_updates.len(), 1);
    assert!(analysis.new_features.is_empty());
    assert!(analysis.bug_fixes.is_empty());
    assert_eq!(analysis.recent_changes.len(), 7);
    assert_eq!(analysis.breaking_changes[0].impact, ImpactLevel::High);
    assert_eq!(analysis.stats.by_category[&ChangeCategory::Refactor], 1);
    assert_eq!(analysis.stats.by_category[&ChangeCategory::Ci], 1);
    assert_eq!(analysis.stats.by_category[&ChangeCategory::Other], 1);
}

#[test]
fn empty_history_serializes_every_field() {
    let json = serde_json::to_value(analyze(&[])).unwrap();
    for field in [
        "contributors",
        "filesChanged",
        "recentChanges",
        "newFeatures",
        "bugFixes",
        "breakingChanges",
        "dependencyUpdates",
        "performanceImprovements",
        "documentationUpdates",
    ] {
        assert_eq!(json[field], serde_json::json!([]), "{field}");
    }
    assert_eq!(json["totalCommits"], 0);
}

#[test]
fn reads_real_history_since_reference() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let t0 = base_time();

    commit(&repo, "Old", "initial import", &[("README.md", "hi")], t0);
    commit(
        &repo,
        "Ana",
        "feat: add new caching layer\n\nKeeps hot entries in memory.",
        &[("src/cache.rs", "a"), ("src/lib.rs", "b")],
        t0 + Duration::days(10),
    );
    commit(
        &repo,
        "Bo",
        "fix: resolve null pointer in parser",
        &[("src/parser.rs", "c")],
        t0 + Duration::days(11),
    );

    let options = IngestOptions::since(t0 + Duration::days(5));
    let commits = read_commits(dir.path(), &options).unwrap();
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].subject, "fix: resolve null pointer in parser");
    assert_eq!(commits[0].files, vec!["src/parser.rs"]);
    assert_eq!(commits[1].author_name, "Ana");
    assert_eq!(commits[1].body, "Keeps hot entries in memory.");
    assert_eq!(commits[1].files, vec!["src/cache.rs", "src/lib.rs"]);

    let analysis = analyze(&commits);
    assert_eq!(analysis.bug_fixes[0].impact, ImpactLevel::Low);
    assert_eq!(analysis.new_features[0].impact, ImpactLevel::Low);
    assert_eq!(analysis.contributors, vec!["Bo", "Ana"]);

    let doc = render_recent_changes(&analysis, t0 + Duration::days(12));
    assert!(doc.contains("**fix: resolve null pointer in parser**"));
    assert!(doc.contains("- **Bug fixes:** 1"));
}

#[test]
fn author_filter_and_until_narrow_history() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let t0 = base_time();

    commit(&repo, "Ana", "one", &[("a.txt", "1")], t0);
    commit(&repo, "Bo", "two", &[("b.txt", "2")], t0 + Duration::days(1));
    commit(&repo, "Ana", "three", &[("c.txt", "3")], t0 + Duration::days(2));

    let options = IngestOptions {
        since: None,
        until: Some(t0 + Duration::days(1)),
        author_filter: Some("ana@".into()),
    };
    let commits = read_commits(dir.path(), &options).unwrap();
    let subjects: Vec<&str> = commits.iter().map(|c| c.subject.as_str()).collect();
    assert_eq!(subjects, vec!["one"]);
}

#[test]
fn window_and_date_follow_author_time() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let t0 = base_time();

    // Rebased today, authored weeks ago: outside the window.
    commit_at(&repo, "Ana", "old work", &[("a.txt", "1")], t0, t0 + Duration::days(30));
    // Committed long ago, authored recently: inside the window.
    commit_at(
        &repo,
        "Bo",
        "fresh work",
        &[("b.txt", "2")],
        t0 + Duration::days(20),
        t0 + Duration::days(1),
    );
    commit_at(
        &repo,
        "Cy",
        "latest",
        &[("c.txt", "3")],
        t0 + Duration::days(25),
        t0 + Duration::days(31),
    );

    let commits = read_commits(dir.path(), &IngestOptions::since(t0 + Duration::days(10))).unwrap();
    let subjects: Vec<&str> = commits.iter().map(|c| c.subject.as_str()).collect();
    assert_eq!(subjects, vec!["latest", "fresh work"]);
    assert_eq!(commits[1].date, t0 + Duration::days(20));
}

#[test]
fn not_a_repository_degrades_to_empty_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let commits = ingest_or_empty(dir.path(), &IngestOptions::since(base_time()));
    assert!(commits.is_empty());
    assert_eq!(analyze(&commits).total_commits, 0);
}
