//! Commit categorization, impact scoring and changelog aggregation.

use std::collections::HashSet;

use crate::models::{Analysis, ChangeCategory, ChangeInfo, CommitRecord, ImpactLevel};

/// Size of the "recent changes" view.
pub const RECENT_LIMIT: usize = 20;

/// One way a lower-cased subject can satisfy a rule.
#[derive(Debug, Clone, Copy)]
pub enum Keyword {
    StartsWith(&'static str),
    Contains(&'static str),
    /// Every token must appear somewhere in the message.
    ContainsAll(&'static [&'static str]),
}

impl Keyword {
    fn matches(&self, message: &str) -> bool {
        match self {
            Keyword::StartsWith(prefix) => message.starts_with(prefix),
            Keyword::Contains(token) => message.contains(token),
            Keyword::ContainsAll(tokens) => tokens.iter().all(|t| message.contains(t)),
        }
    }
}

fn any_keyword(keywords: &[Keyword], message: &str) -> bool {
    keywords.iter().any(|k| k.matches(message))
}

#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub keywords: &'static [Keyword],
    pub category: ChangeCategory,
}

use Keyword::{Contains, ContainsAll, StartsWith};

/// Evaluated top to bottom, first match wins.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        keywords: &[Contains("breaking"), Contains("breaking change")],
        category: ChangeCategory::Breaking,
    },
    CategoryRule {
        keywords: &[StartsWith("feat"), Contains("feature"), Contains("add")],
        category: ChangeCategory::Feature,
    },
    CategoryRule {
        keywords: &[StartsWith("fix"), Contains("bug"), Contains("resolve")],
        category: ChangeCategory::Fix,
    },
    CategoryRule {
        keywords: &[
            Contains("deps"),
            Contains("dependency"),
            ContainsAll(&["update", "package"]),
            ContainsAll(&["update", "npm"]),
        ],
        category: ChangeCategory::Deps,
    },
    CategoryRule {
        keywords: &[Contains("perf"), Contains("performance"), Contains("optimize")],
        category: ChangeCategory::Perf,
    },
    CategoryRule {
        keywords: &[Contains("docs"), Contains("documentation"), Contains("readme")],
        category: ChangeCategory::Docs,
    },
    CategoryRule {
        keywords: &[Contains("refactor"), Contains("cleanup"), Contains("restructure")],
        category: ChangeCategory::Refactor,
    },
    CategoryRule {
        keywords: &[Contains("test"), Contains("spec")],
        category: ChangeCategory::Test,
    },
    CategoryRule {
        keywords: &[Contains("ci"), Contains("build"), Contains("deploy")],
        category: ChangeCategory::Ci,
    },
];

#[derive(Debug, Clone, Copy)]
pub struct ImpactRule {
    pub keywords: &'static [Keyword],
    /// Fires when the commit touches strictly more files than this.
    pub files_over: Option<usize>,
    pub impact: ImpactLevel,
}

/// Evaluated top to bottom, first match wins; anything else is low.
pub const IMPACT_RULES: &[ImpactRule] = &[
    ImpactRule {
        keywords: &[Contains("breaking"), Contains("major")],
        files_over: None,
        impact: ImpactLevel::High,
    },
    ImpactRule {
        keywords: &[Contains("refactor"), Contains("architecture")],
        files_over: Some(10),
        impact: ImpactLevel::High,
    },
    ImpactRule {
        keywords: &[Contains("feature"), Contains("enhancement")],
        files_over: Some(5),
        impact: ImpactLevel::Medium,
    },
];

pub fn categorize(commit: &CommitRecord) -> ChangeCategory {
    let message = commit.subject.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|rule| any_keyword(rule.keywords, &message))
        .map(|rule| rule.category)
        .unwrap_or(ChangeCategory::Other)
}

pub fn assess_impact(commit: &CommitRecord) -> ImpactLevel {
    let message = commit.subject.to_lowercase();
    let file_count = commit.files.len();
    IMPACT_RULES
        .iter()
        .find(|rule| {
            rule.files_over.is_some_and(|limit| file_count > limit)
                || any_keyword(rule.keywords, &message)
        })
        .map(|rule| rule.impact)
        .unwrap_or(ImpactLevel::Low)
}

pub fn change_info(commit: &CommitRecord) -> ChangeInfo {
    ChangeInfo {
        hash: commit.hash.clone(),
        author: commit.author_name.clone(),
        date: commit.date,
        title: commit.subject.clone(),
        description: commit.body.clone(),
        category: categorize(commit),
        impact: assess_impact(commit),
        files: commit.files.iter().filter(|f| !f.is_empty()).cloned().collect(),
    }
}

/// Aggregates `commits` into an [`Analysis`]. Input order is kept for the
/// category lists; the recent view is re-sorted by date.
pub fn analyze(commits: &[CommitRecord]) -> Analysis {
    let mut analysis = Analysis {
        total_commits: commits.len(),
        ..Analysis::default()
    };
    let mut seen_authors = HashSet::new();
    let mut seen_files = HashSet::new();
    let mut all = Vec::with_capacity(commits.len());

    for commit in commits {
        if seen_authors.insert(commit.author_name.as_str()) {
            analysis.contributors.push(commit.author_name.clone());
        }

        let info = change_info(commit);
        *analysis.stats.by_category.entry(info.category).or_default() += 1;
        *analysis.stats.by_impact.entry(info.impact).or_default() += 1;

        for file in &info.files {
            if seen_files.insert(file.clone()) {
                analysis.files_changed.push(file.clone());
            }
        }

        let bucket = match info.category {
            ChangeCategory::Feature => Some(&mut analysis.new_features),
            ChangeCategory::Fix => Some(&mut analysis.bug_fixes),
            ChangeCategory::Breaking => Some(&mut analysis.breaking_changes),
            ChangeCategory::Deps => Some(&mut analysis.dependency_updates),
            ChangeCategory::Perf => Some(&mut analysis.performance_improvements),
            ChangeCategory::Docs => Some(&mut analysis.documentation_updates),
            ChangeCategory::Refactor
            | ChangeCategory::Test
            | ChangeCategory::Ci
            | ChangeCategory::Other => None,
        };
        if let Some(bucket) = bucket {
            bucket.push(info.clone());
        }

        all.push(info);
    }

    // Stable, so equal timestamps keep input order.
    all.sort_by(|a, b| b.date.cmp(&a.date));
    all.truncate(RECENT_LIMIT);
    analysis.recent_changes = all;

    tracing::debug!(
        "Analyzed {} commits from {} contributors",
        analysis.total_commits,
        analysis.contributors.len()
    );

    analysis
}
