//! Project type classification.
//!
//! The type rules are an ordered decision list: the first rule whose condition
//! holds decides the type and its confidence. Monorepo detection only runs at
//! the root; sub-projects are classified with the same list but can never be
//! monorepos themselves, which bounds recursion to a single level.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use globset::GlobMatcher;

use crate::frameworks::detect_frameworks;
use crate::models::{Classification, FrameworkTag, MonorepoIndicators, ProjectType, SubProjectResult};
use crate::scanner::{compile_globs, file_name, parent_dir, ManifestEntry, SignalSet, MANIFEST_FILE};

/// Marker files that identify a project even without a known framework.
const ECOSYSTEM_MARKERS: &[&str] = &[
    "**/requirements.txt",
    "**/go.mod",
    "**/Cargo.toml",
    "**/composer.json",
    "**/Gemfile",
];

static ECOSYSTEM_GLOBS: LazyLock<Vec<(&'static str, GlobMatcher)>> =
    LazyLock::new(|| compile_globs(ECOSYSTEM_MARKERS.iter().copied()));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Monorepo,
    AnyMobileFramework,
    AnyFrontendFramework,
    AnyBackendFramework,
    EntryPoint,
    ProjectMarker,
    Always,
}

#[derive(Debug, Clone, Copy)]
pub struct TypeRule {
    pub condition: Condition,
    pub project_type: ProjectType,
    pub confidence: f64,
}

pub const TYPE_RULES: &[TypeRule] = &[
    TypeRule {
        condition: Condition::Monorepo,
        project_type: ProjectType::Monorepo,
        confidence: 0.9,
    },
    TypeRule {
        condition: Condition::AnyMobileFramework,
        project_type: ProjectType::MobileApp,
        confidence: 0.95,
    },
    TypeRule {
        condition: Condition::AnyFrontendFramework,
        project_type: ProjectType::FrontendWebapp,
        confidence: 0.9,
    },
    TypeRule {
        condition: Condition::AnyBackendFramework,
        project_type: ProjectType::BackendApi,
        confidence: 0.9,
    },
    TypeRule {
        condition: Condition::EntryPoint,
        project_type: ProjectType::Library,
        confidence: 0.8,
    },
    TypeRule {
        condition: Condition::ProjectMarker,
        project_type: ProjectType::Service,
        confidence: 0.6,
    },
    TypeRule {
        condition: Condition::Always,
        project_type: ProjectType::Unknown,
        confidence: 0.1,
    },
];

/// Root versus sub-project evaluation. Only the root looks for monorepos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Root,
    SubProject,
}

struct RuleContext<'a> {
    signals: &'a SignalSet,
    frameworks: &'a BTreeSet<FrameworkTag>,
    indicators: Option<MonorepoIndicators>,
}

impl RuleContext<'_> {
    fn holds(&self, condition: Condition) -> bool {
        match condition {
            Condition::Monorepo => self.indicators.is_some_and(|i| i.is_monorepo()),
            Condition::AnyMobileFramework => self.frameworks.iter().any(|t| t.is_mobile()),
            Condition::AnyFrontendFramework => self.frameworks.iter().any(|t| t.is_frontend()),
            Condition::AnyBackendFramework => self.frameworks.iter().any(|t| t.is_backend()),
            Condition::EntryPoint => self
                .signals
                .manifest()
                .is_some_and(|manifest| manifest.has_entry_point()),
            Condition::ProjectMarker => {
                self.signals.manifest().is_some()
                    || ECOSYSTEM_GLOBS
                        .iter()
                        .any(|(_, glob)| self.signals.has_path_matching(glob))
            }
            Condition::Always => true,
        }
    }
}

pub fn monorepo_indicators(signals: &SignalSet) -> MonorepoIndicators {
    MonorepoIndicators {
        has_monorepo_file: signals.markers().next().is_some(),
        has_workspaces: signals
            .manifest()
            .is_some_and(|manifest| manifest.declares_workspaces()),
        has_multiple_package_jsons: signals.manifest_count() > 1,
    }
}

/// Detects frameworks and classifies `signals` as a project root.
pub fn classify(signals: &SignalSet) -> Classification {
    let frameworks = detect_frameworks(signals);
    classify_with(signals, &frameworks)
}

/// Classifies a project root from an already computed framework set.
pub fn classify_with(signals: &SignalSet, frameworks: &BTreeSet<FrameworkTag>) -> Classification {
    classify_scoped(signals, frameworks, Scope::Root)
}

fn classify_scoped(
    signals: &SignalSet,
    frameworks: &BTreeSet<FrameworkTag>,
    scope: Scope,
) -> Classification {
    let indicators = match scope {
        Scope::Root => Some(monorepo_indicators(signals)),
        Scope::SubProject => None,
    };
    let ctx = RuleContext {
        signals,
        frameworks,
        indicators,
    };

    // The last rule is unconditional, so a match always exists.
    let rule = TYPE_RULES
        .iter()
        .find(|rule| ctx.holds(rule.condition))
        .unwrap_or(&TYPE_RULES[TYPE_RULES.len() - 1]);

    let mut classification = Classification {
        project_type: rule.project_type,
        sub_types: None,
        frameworks: frameworks.iter().copied().collect(),
        confidence: rule.confidence,
        indicators,
        skipped: Vec::new(),
    };

    if rule.project_type == ProjectType::Monorepo {
        let (sub_types, skipped) = classify_sub_projects(signals);
        classification.sub_types = Some(sub_types);
        classification.skipped = skipped;
    }

    tracing::debug!(
        "Classified {:?} scope as {} ({})",
        scope,
        classification.project_type,
        classification.confidence
    );

    classification
}

fn classify_sub_projects(signals: &SignalSet) -> (Vec<SubProjectResult>, Vec<String>) {
    let mut results = Vec::new();
    let mut skipped = Vec::new();

    for (path, entry) in signals.manifests() {
        if path == MANIFEST_FILE || file_name(path) != MANIFEST_FILE {
            continue;
        }
        if let ManifestEntry::Malformed(reason) = entry {
            tracing::warn!("Note: skipping invalid package.json at {}: {}", path, reason);
            skipped.push(path.clone());
            continue;
        }

        let dir = parent_dir(path);
        let scoped = signals.scoped(dir);
        let frameworks = detect_frameworks(&scoped);
        results.push(SubProjectResult {
            path: dir.to_string(),
            classification: classify_scoped(&scoped, &frameworks, Scope::SubProject),
        });
    }

    (results, skipped)
}

/// Template set a documentation generator should install for `classification`.
pub fn recommended_templates(classification: &Classification) -> Vec<String> {
    let mut templates = vec!["shared".to_string()];

    match (&classification.project_type, &classification.sub_types) {
        (ProjectType::Monorepo, sub_types) => {
            templates.push(ProjectType::Monorepo.to_string());
            for sub in sub_types.iter().flatten() {
                let name = sub.classification.project_type.to_string();
                if !templates.contains(&name) {
                    templates.push(name);
                }
            }
        }
        (project_type, _) => templates.push(project_type.to_string()),
    }

    templates
}
