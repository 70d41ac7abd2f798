//! File signal scanning.
//!
//! Walks a project tree once and captures everything the classifiers look at:
//! the relative paths that match the fixed pattern set, every `package.json`
//! found (parsed or marked malformed), and the monorepo tool markers sitting at
//! the root. Classification never touches the filesystem again after this.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use serde_json::{Map, Value};
use walkdir::WalkDir;

use crate::error::ScanError;

pub const MANIFEST_FILE: &str = "package.json";

/// Directories pruned at any depth.
pub const IGNORED_DIRS: &[&str] = &["node_modules", "vendor", "target", "build", ".git"];

pub const MONOREPO_MARKERS: &[&str] = &[
    "lerna.json",
    "nx.json",
    "rush.json",
    "pnpm-workspace.yaml",
    "yarn.lock",
];

const SCAN_PATTERNS: &[&str] = &[
    "**/*.{js,ts,jsx,tsx,py,java,swift,kt,go,rs,php,rb,cs}",
    "**/package.json",
    "**/requirements.txt",
    "**/Cargo.toml",
    "**/go.mod",
    "**/pom.xml",
    "**/build.gradle",
    "**/Podfile",
    "**/pubspec.yaml",
    "**/composer.json",
    "**/Gemfile",
    "**/pytest.ini",
    "**/Dockerfile",
    "**/docker-compose.yml",
    "**/docker-compose.yaml",
];

/// Compiles a glob the way every matcher in this crate expects: `*` stays
/// within one path segment, `**/` spans zero or more directories.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher())
}

/// Compiles each pattern once, dropping (and logging) any that fail.
pub fn compile_globs<I>(patterns: I) -> Vec<(&'static str, GlobMatcher)>
where
    I: IntoIterator<Item = &'static str>,
{
    patterns
        .into_iter()
        .filter_map(|pattern| match compile_glob(pattern) {
            Ok(matcher) => Some((pattern, matcher)),
            Err(e) => {
                tracing::error!("Invalid glob {}: {}", pattern, e);
                None
            }
        })
        .collect()
}

fn scan_patterns() -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in SCAN_PATTERNS {
        builder.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
    }
    builder.build()
}

/// A parsed `package.json`. Only JSON objects qualify.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest(Map<String, Value>);

impl Manifest {
    pub fn parse(text: &str) -> Result<Self, String> {
        let value: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
        Self::from_value(value).ok_or_else(|| "manifest is not a JSON object".to_string())
    }

    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Membership across `dependencies`, `devDependencies` and `peerDependencies`.
    pub fn has_dependency(&self, names: &[&str]) -> bool {
        ["dependencies", "devDependencies", "peerDependencies"]
            .iter()
            .filter_map(|group| self.get(group).and_then(Value::as_object))
            .any(|deps| names.iter().any(|name| deps.contains_key(*name)))
    }

    pub fn has_entry_point(&self) -> bool {
        ["main", "module", "exports"]
            .iter()
            .any(|key| self.get(key).is_some_and(is_truthy))
    }

    pub fn declares_workspaces(&self) -> bool {
        self.get("workspaces").is_some_and(is_truthy)
            || self.get("private").and_then(Value::as_bool) == Some(true)
    }
}

/// JavaScript truthiness over JSON values.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ManifestEntry {
    Parsed(Manifest),
    Malformed(String),
}

/// Everything observed about one project root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSet {
    paths: BTreeSet<String>,
    manifests: BTreeMap<String, ManifestEntry>,
    markers: BTreeSet<String>,
}

impl SignalSet {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Registers a manifest at `path` (relative, `/`-separated). The path is
    /// added to the scanned paths as well.
    pub fn with_manifest(mut self, path: impl Into<String>, entry: ManifestEntry) -> Self {
        let path = path.into();
        self.paths.insert(path.clone());
        self.manifests.insert(path, entry);
        self
    }

    pub fn with_marker(mut self, name: impl Into<String>) -> Self {
        self.markers.insert(name.into());
        self
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.manifests.is_empty() && self.markers.is_empty()
    }

    /// The root manifest, if it exists and parsed.
    pub fn manifest(&self) -> Option<&Manifest> {
        match self.manifests.get(MANIFEST_FILE) {
            Some(ManifestEntry::Parsed(manifest)) => Some(manifest),
            _ => None,
        }
    }

    pub fn manifests(&self) -> &BTreeMap<String, ManifestEntry> {
        &self.manifests
    }

    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(String::as_str)
    }

    pub fn has_path_matching(&self, matcher: &GlobMatcher) -> bool {
        self.paths.iter().any(|path| matcher.is_match(path))
    }

    pub fn has_path_containing(&self, token: &str) -> bool {
        self.paths.iter().any(|path| path.contains(token))
    }

    /// Number of scanned paths whose file name is `package.json`.
    pub fn manifest_count(&self) -> usize {
        self.paths
            .iter()
            .filter(|path| file_name(path) == MANIFEST_FILE)
            .count()
    }

    /// The signal set of the sub-tree rooted at `dir`, re-rooted so that
    /// `dir/package.json` becomes `package.json`. Root markers are not carried.
    pub fn scoped(&self, dir: &str) -> SignalSet {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        let paths = self
            .paths
            .iter()
            .filter_map(|path| path.strip_prefix(&prefix))
            .map(str::to_string)
            .collect();
        let manifests = self
            .manifests
            .iter()
            .filter_map(|(path, entry)| {
                path.strip_prefix(&prefix)
                    .map(|rel| (rel.to_string(), entry.clone()))
            })
            .collect();

        SignalSet {
            paths,
            manifests,
            markers: BTreeSet::new(),
        }
    }
}

pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Directory part of a relative path; empty for root-level files.
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Hidden entries never become signals, like `dot: false` globbing; the
/// dependency and build directories are pruned as well.
fn is_excluded(entry: &walkdir::DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.')
        || (entry.file_type().is_dir() && IGNORED_DIRS.iter().any(|dir| name == *dir))
}

/// Scans `root` into a [`SignalSet`].
pub fn scan(root: &Path) -> Result<SignalSet, ScanError> {
    let meta = fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ScanError::NotFound(root.to_path_buf()),
        _ => ScanError::Io {
            path: root.to_path_buf(),
            source: e,
        },
    })?;
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let patterns = scan_patterns()?;
    let mut signals = SignalSet::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if patterns.is_match(&relative) {
            signals.paths.insert(relative);
        }
    }

    let manifest_paths: Vec<String> = signals
        .paths
        .iter()
        .filter(|path| file_name(path) == MANIFEST_FILE)
        .cloned()
        .collect();

    for path in manifest_paths {
        let entry = match fs::read_to_string(root.join(&path)) {
            Ok(text) => match Manifest::parse(&text) {
                Ok(manifest) => ManifestEntry::Parsed(manifest),
                Err(e) => ManifestEntry::Malformed(e),
            },
            Err(e) => ManifestEntry::Malformed(e.to_string()),
        };
        if path == MANIFEST_FILE {
            if let ManifestEntry::Malformed(reason) = &entry {
                tracing::info!(
                    "Note: could not read package.json at {} ({}), treating as absent",
                    root.display(),
                    reason
                );
            }
        }
        signals.manifests.insert(path, entry);
    }

    for marker in MONOREPO_MARKERS {
        if root.join(marker).is_file() {
            signals.markers.insert((*marker).to_string());
        }
    }

    tracing::debug!(
        "Scanned {}: {} paths, {} manifests, {} markers",
        root.display(),
        signals.paths.len(),
        signals.manifests.len(),
        signals.markers.len()
    );

    Ok(signals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(value: Value) -> Manifest {
        Manifest::from_value(value).unwrap()
    }

    #[test]
    fn dependency_lookup_spans_all_groups() {
        let m = manifest(json!({
            "dependencies": { "react": "18.0.0" },
            "devDependencies": { "jest": "29.0.0" },
            "peerDependencies": { "vue": "" }
        }));
        assert!(m.has_dependency(&["react"]));
        assert!(m.has_dependency(&["jest"]));
        assert!(m.has_dependency(&["vue"]));
        assert!(!m.has_dependency(&["svelte", "next"]));
    }

    #[test]
    fn entry_point_uses_truthiness() {
        assert!(manifest(json!({ "main": "index.js" })).has_entry_point());
        assert!(manifest(json!({ "exports": { ".": "./x.js" } })).has_entry_point());
        assert!(!manifest(json!({ "main": "" })).has_entry_point());
        assert!(!manifest(json!({ "module": null })).has_entry_point());
        assert!(!manifest(json!({ "name": "x" })).has_entry_point());
    }

    #[test]
    fn workspaces_or_private_true() {
        assert!(manifest(json!({ "workspaces": ["packages/*"] })).declares_workspaces());
        assert!(manifest(json!({ "private": true })).declares_workspaces());
        assert!(!manifest(json!({ "private": "true" })).declares_workspaces());
        assert!(!manifest(json!({ "private": false })).declares_workspaces());
    }

    #[test]
    fn non_object_manifest_is_malformed() {
        assert!(Manifest::parse("[1, 2]").is_err());
        assert!(Manifest::parse("{ nope").is_err());
        assert!(Manifest::parse("{}").is_ok());
    }

    #[test]
    fn scoped_reroots_paths_and_manifests() {
        let signals = SignalSet::new(["src/index.ts", "packages/a/src/app.tsx", "packages/ab/x.js"])
            .with_manifest(MANIFEST_FILE, ManifestEntry::Parsed(Manifest::default()))
            .with_manifest(
                "packages/a/package.json",
                ManifestEntry::Parsed(manifest(json!({ "name": "a" }))),
            )
            .with_marker("lerna.json");

        let scoped = signals.scoped("packages/a");
        let paths: Vec<&str> = scoped.paths().collect();
        assert_eq!(paths, vec!["package.json", "src/app.tsx"]);
        assert_eq!(scoped.manifest().and_then(|m| m.str_field("name")), Some("a"));
        assert_eq!(scoped.markers().count(), 0);
    }

    #[test]
    fn path_helpers() {
        assert_eq!(file_name("a/b/package.json"), "package.json");
        assert_eq!(file_name("package.json"), "package.json");
        assert_eq!(parent_dir("a/b/package.json"), "a/b");
        assert_eq!(parent_dir("package.json"), "");
    }

    #[test]
    fn glob_star_stays_in_segment() {
        let glob = compile_glob("**/settings.py").unwrap();
        assert!(glob.is_match("settings.py"));
        assert!(glob.is_match("app/conf/settings.py"));
        assert!(!glob.is_match("app/my_settings.py"));
    }
}
