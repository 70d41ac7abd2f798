//! Project and change classification for documentation generators.
//!
//! Two independent engines live here. The project side scans a source tree
//! ([`scanner`]), matches framework signals ([`frameworks`]) and assigns a
//! project type ([`classifier`]). The change side reads git history ([`git`])
//! and sorts commits into changelog categories with an impact level
//! ([`changes`]).

pub mod changelog;
pub mod changes;
pub mod classifier;
pub mod config;
pub mod error;
pub mod frameworks;
pub mod git;
pub mod models;
pub mod report;
pub mod scanner;
pub mod server;

pub use changes::{analyze, assess_impact, categorize};
pub use classifier::{classify, classify_with, recommended_templates};
pub use frameworks::detect_frameworks;
pub use models::{
    Analysis, ChangeCategory, ChangeInfo, Classification, CommitRecord, FrameworkTag, ImpactLevel,
    MonorepoIndicators, ProjectType, SubProjectResult,
};
pub use scanner::{scan, SignalSet};
