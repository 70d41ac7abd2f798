use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw commit as handed over by the ingestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    pub hash: String,
    pub author_name: String,
    pub author_email: String,
    pub date: DateTime<Utc>,
    pub subject: String,
    pub body: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCategory {
    Breaking,
    Feature,
    Fix,
    Deps,
    Perf,
    Docs,
    Refactor,
    Test,
    Ci,
    Other,
}

impl ChangeCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breaking => "breaking",
            Self::Feature => "feature",
            Self::Fix => "fix",
            Self::Deps => "deps",
            Self::Perf => "perf",
            Self::Docs => "docs",
            Self::Refactor => "refactor",
            Self::Test => "test",
            Self::Ci => "ci",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

impl ImpactLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified commit, as it appears in the analysis lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeInfo {
    pub hash: String,
    pub author: String,
    pub date: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub category: ChangeCategory,
    pub impact: ImpactLevel,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStats {
    pub by_category: BTreeMap<ChangeCategory, usize>,
    pub by_impact: BTreeMap<ImpactLevel, usize>,
}

/// Aggregated view over a commit range. Every list is always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub total_commits: usize,
    pub contributors: Vec<String>,
    pub files_changed: Vec<String>,
    pub recent_changes: Vec<ChangeInfo>,
    pub new_features: Vec<ChangeInfo>,
    pub bug_fixes: Vec<ChangeInfo>,
    pub breaking_changes: Vec<ChangeInfo>,
    pub dependency_updates: Vec<ChangeInfo>,
    pub performance_improvements: Vec<ChangeInfo>,
    pub documentation_updates: Vec<ChangeInfo>,
    pub stats: ChangeStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    Monorepo,
    MobileApp,
    FrontendWebapp,
    BackendApi,
    Library,
    Service,
    Unknown,
}

impl ProjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monorepo => "monorepo",
            Self::MobileApp => "mobile-app",
            Self::FrontendWebapp => "frontend-webapp",
            Self::BackendApi => "backend-api",
            Self::Library => "library",
            Self::Service => "service",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Framework and tooling tags. Declaration order is the detection table order,
/// which is also the order tags are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameworkTag {
    // Frontend
    React,
    Vue,
    Angular,
    Svelte,
    Nextjs,
    Nuxt,
    // Backend
    Express,
    Fastify,
    Koa,
    Nestjs,
    Django,
    Flask,
    Rails,
    Spring,
    Gin,
    // Mobile
    ReactNative,
    Flutter,
    Ionic,
    // Testing
    Jest,
    Mocha,
    Pytest,
    // Build tools
    Webpack,
    Vite,
    Rollup,
    // Databases
    Mongodb,
    Postgres,
    Mysql,
    Redis,
    Graphql,
    Docker,
}

impl FrameworkTag {
    pub fn is_mobile(self) -> bool {
        matches!(self, Self::ReactNative | Self::Flutter | Self::Ionic)
    }

    pub fn is_frontend(self) -> bool {
        matches!(
            self,
            Self::React | Self::Vue | Self::Angular | Self::Svelte | Self::Nextjs | Self::Nuxt
        )
    }

    pub fn is_backend(self) -> bool {
        matches!(
            self,
            Self::Express
                | Self::Fastify
                | Self::Koa
                | Self::Nestjs
                | Self::Django
                | Self::Flask
                | Self::Rails
                | Self::Spring
                | Self::Gin
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonorepoIndicators {
    pub has_monorepo_file: bool,
    pub has_workspaces: bool,
    pub has_multiple_package_jsons: bool,
}

impl MonorepoIndicators {
    pub fn is_monorepo(&self) -> bool {
        self.has_monorepo_file || self.has_workspaces || self.has_multiple_package_jsons
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_types: Option<Vec<SubProjectResult>>,
    pub frameworks: Vec<FrameworkTag>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicators: Option<MonorepoIndicators>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubProjectResult {
    pub path: String,
    #[serde(flatten)]
    pub classification: Classification,
}
