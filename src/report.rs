use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::classifier::{classify, recommended_templates};
use crate::error::ScanError;
use crate::models::{Classification, FrameworkTag};
use crate::scanner::{scan, Manifest, SignalSet};

/// Package metadata a documentation generator pre-fills prompts with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub repository_url: Option<String>,
    pub start_command: Option<String>,
    pub test_command: Option<String>,
    pub build_command: Option<String>,
    pub lint_command: Option<String>,
}

impl PackageSummary {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let script = |name: &str| {
            manifest
                .get("scripts")
                .and_then(|scripts| scripts.get(name))
                .is_some()
        };
        let repository_url = match manifest.get("repository") {
            Some(Value::String(url)) => Some(url.clone()),
            Some(repo) => repo.get("url").and_then(Value::as_str).map(str::to_string),
            None => None,
        };
        let start_command = if script("start") {
            Some("npm start")
        } else if script("dev") {
            Some("npm run dev")
        } else {
            None
        };

        Self {
            name: manifest.str_field("name").map(str::to_string),
            version: manifest.str_field("version").map(str::to_string),
            description: manifest.str_field("description").map(str::to_string),
            repository_url,
            start_command: start_command.map(str::to_string),
            test_command: script("test").then(|| "npm test".to_string()),
            build_command: script("build").then(|| "npm run build".to_string()),
            lint_command: script("lint").then(|| "npm run lint".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    pub id: Uuid,
    pub project_path: String,
    pub detection: Classification,
    pub templates: Vec<String>,
    pub frameworks: Vec<FrameworkTag>,
    pub package_json: Option<PackageSummary>,
    pub timestamp: DateTime<Utc>,
}

impl ProjectReport {
    pub fn from_signals(project_path: &Path, signals: &SignalSet, timestamp: DateTime<Utc>) -> Self {
        let detection = classify(signals);
        Self {
            id: Uuid::new_v4(),
            project_path: project_path.display().to_string(),
            templates: recommended_templates(&detection),
            frameworks: detection.frameworks.clone(),
            package_json: signals.manifest().map(PackageSummary::from_manifest),
            detection,
            timestamp,
        }
    }
}

/// Scans `project_path` and builds its report.
pub fn generate_report(project_path: &Path) -> Result<ProjectReport, ScanError> {
    let signals = scan(project_path)?;
    let report = ProjectReport::from_signals(project_path, &signals, Utc::now());
    tracing::info!(
        "Detected {} ({}) at {}",
        report.detection.project_type,
        report.detection.confidence,
        report.project_path
    );
    Ok(report)
}
