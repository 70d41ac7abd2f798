//! Framework signal matching.
//!
//! Each tag owns one predicate. Predicates only read the [`SignalSet`], so the
//! table can be evaluated in any order with the same result.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use globset::GlobMatcher;

use crate::models::FrameworkTag;
use crate::scanner::{compile_globs, SignalSet};

/// Every `File` glob in [`FRAMEWORK_RULES`], compiled on first use.
static FILE_GLOBS: LazyLock<HashMap<&'static str, GlobMatcher>> = LazyLock::new(|| {
    let mut patterns = Vec::new();
    for rule in FRAMEWORK_RULES {
        rule.predicate.collect_globs(&mut patterns);
    }
    compile_globs(patterns).into_iter().collect()
});

#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// The root manifest declares any of these dependency names.
    Dependency(&'static [&'static str]),
    /// Some scanned path matches the glob.
    File(&'static str),
    /// Some scanned path contains the token.
    PathContains(&'static str),
    All(&'static [Predicate]),
    Any(&'static [Predicate]),
}

impl Predicate {
    pub fn eval(&self, signals: &SignalSet) -> bool {
        match self {
            Predicate::Dependency(names) => signals
                .manifest()
                .is_some_and(|manifest| manifest.has_dependency(names)),
            Predicate::File(pattern) => FILE_GLOBS
                .get(pattern)
                .is_some_and(|matcher| signals.has_path_matching(matcher)),
            Predicate::PathContains(token) => signals.has_path_containing(token),
            Predicate::All(parts) => parts.iter().all(|p| p.eval(signals)),
            Predicate::Any(parts) => parts.iter().any(|p| p.eval(signals)),
        }
    }

    fn collect_globs(&self, out: &mut Vec<&'static str>) {
        match self {
            Predicate::File(pattern) => {
                if !out.contains(pattern) {
                    out.push(pattern);
                }
            }
            Predicate::All(parts) | Predicate::Any(parts) => {
                for part in *parts {
                    part.collect_globs(out);
                }
            }
            Predicate::Dependency(_) | Predicate::PathContains(_) => {}
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FrameworkRule {
    pub tag: FrameworkTag,
    pub predicate: Predicate,
}

const fn dep(tag: FrameworkTag, names: &'static [&'static str]) -> FrameworkRule {
    FrameworkRule {
        tag,
        predicate: Predicate::Dependency(names),
    }
}

pub const FRAMEWORK_RULES: &[FrameworkRule] = &[
    // Frontend
    dep(FrameworkTag::React, &["react", "@types/react"]),
    dep(FrameworkTag::Vue, &["vue", "@vue/cli"]),
    dep(FrameworkTag::Angular, &["@angular/core", "@angular/cli"]),
    dep(FrameworkTag::Svelte, &["svelte", "@sveltejs/kit"]),
    dep(FrameworkTag::Nextjs, &["next"]),
    dep(FrameworkTag::Nuxt, &["nuxt", "@nuxt/core"]),
    // Backend
    dep(FrameworkTag::Express, &["express"]),
    dep(FrameworkTag::Fastify, &["fastify"]),
    dep(FrameworkTag::Koa, &["koa"]),
    dep(FrameworkTag::Nestjs, &["@nestjs/core"]),
    FrameworkRule {
        tag: FrameworkTag::Django,
        predicate: Predicate::Any(&[
            Predicate::File("**/settings.py"),
            Predicate::File("**/manage.py"),
        ]),
    },
    FrameworkRule {
        tag: FrameworkTag::Flask,
        predicate: Predicate::Any(&[
            Predicate::Dependency(&["flask"]),
            Predicate::File("**/app.py"),
        ]),
    },
    FrameworkRule {
        tag: FrameworkTag::Rails,
        predicate: Predicate::All(&[
            Predicate::File("**/Gemfile"),
            Predicate::Dependency(&["rails"]),
        ]),
    },
    FrameworkRule {
        tag: FrameworkTag::Spring,
        predicate: Predicate::Any(&[
            Predicate::File("**/pom.xml"),
            Predicate::File("**/build.gradle"),
        ]),
    },
    FrameworkRule {
        tag: FrameworkTag::Gin,
        predicate: Predicate::All(&[
            Predicate::File("**/go.mod"),
            Predicate::PathContains("gin-gonic"),
        ]),
    },
    // Mobile
    dep(
        FrameworkTag::ReactNative,
        &["react-native", "@react-native-community/cli"],
    ),
    FrameworkRule {
        tag: FrameworkTag::Flutter,
        predicate: Predicate::File("**/pubspec.yaml"),
    },
    dep(
        FrameworkTag::Ionic,
        &["@ionic/angular", "@ionic/react", "@ionic/vue"],
    ),
    // Testing
    dep(FrameworkTag::Jest, &["jest"]),
    dep(FrameworkTag::Mocha, &["mocha"]),
    FrameworkRule {
        tag: FrameworkTag::Pytest,
        predicate: Predicate::Any(&[
            Predicate::File("**/pytest.ini"),
            Predicate::File("**/conftest.py"),
        ]),
    },
    // Build tools
    dep(FrameworkTag::Webpack, &["webpack"]),
    dep(FrameworkTag::Vite, &["vite"]),
    dep(FrameworkTag::Rollup, &["rollup"]),
    // Databases
    dep(FrameworkTag::Mongodb, &["mongodb", "mongoose"]),
    dep(FrameworkTag::Postgres, &["pg", "postgresql"]),
    dep(FrameworkTag::Mysql, &["mysql", "mysql2"]),
    dep(FrameworkTag::Redis, &["redis"]),
    dep(
        FrameworkTag::Graphql,
        &["graphql", "apollo-server", "@apollo/server"],
    ),
    FrameworkRule {
        tag: FrameworkTag::Docker,
        predicate: Predicate::Any(&[
            Predicate::File("**/Dockerfile"),
            Predicate::File("**/docker-compose.yml"),
        ]),
    },
];

/// Evaluates every framework rule against `signals`.
pub fn detect_frameworks(signals: &SignalSet) -> BTreeSet<FrameworkTag> {
    FRAMEWORK_RULES
        .iter()
        .filter(|rule| rule.predicate.eval(signals))
        .map(|rule| rule.tag)
        .collect()
}
