/// pubspec.yaml generation

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::GeneratorConfig;
use crate::error::CodegenError;
use crate::ir::Schema;
use crate::namespace::{package_name, resolve_include, to_library_name};

pub const PUBSPEC_FILE: &str = "pubspec.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pubspec {
    pub name: String,
    pub version: String,
    pub description: String,
    pub environment: Environment,
    pub dependencies: BTreeMap<String, Dependency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Environment {
    pub sdk: String,
}

/// Either `{git: {url}}` or `{path}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<GitDependency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitDependency {
    pub url: String,
}

impl Dependency {
    pub fn git(url: impl Into<String>) -> Self {
        Self {
            git: Some(GitDependency { url: url.into() }),
            path: None,
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self {
            git: None,
            path: Some(path.into()),
        }
    }
}

/// Build the manifest for a schema's generated package.
///
/// Includes are keyed by library name, so two includes resolving to the same
/// namespace produce a single entry. When two *different* namespaces map to
/// the same library name (`a.b` and `a_b`), the first one wins.
pub fn build(schema: &Schema, config: &GeneratorConfig) -> Pubspec {
    let mut dependencies = BTreeMap::new();
    for dep in &config.runtime_dependencies {
        dependencies.insert(dep.name.clone(), Dependency::git(&dep.git_url));
    }

    let mut origins: BTreeMap<String, String> = BTreeMap::new();
    for include in schema.referenced_includes() {
        let namespace = resolve_include(schema, &include);
        let library = to_library_name(namespace);
        if let Some(previous) = origins.get(&library) {
            if previous != namespace {
                warn!(
                    "pubspec: namespaces {:?} and {:?} both map to dependency {:?}, keeping the first",
                    previous, namespace, library
                );
            }
            continue;
        }
        if dependencies.contains_key(&library) {
            warn!("pubspec: include {:?} shadows runtime dependency {:?}, skipping", include, library);
            continue;
        }
        // Keys keep the namespace's case while imports use the lower-cased
        // package name, so `shared.Types` gives `shared_Types` here. Frugal's
        // Dart backend has always written it this way.
        origins.insert(library.clone(), namespace.to_string());
        dependencies.insert(library.clone(), Dependency::path(format!("../{}", library)));
    }

    Pubspec {
        name: package_name(schema),
        version: config.compiler_version.clone(),
        description: config.description.clone(),
        environment: Environment {
            sdk: config.sdk_constraint(),
        },
        dependencies,
    }
}

impl Pubspec {
    pub fn to_yaml(&self) -> Result<String, CodegenError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write `pubspec.yaml` into `dir`, replacing any existing file.
    pub fn write(&self, dir: &Path) -> Result<(), CodegenError> {
        let path = dir.join(PUBSPEC_FILE);
        let yaml = self.to_yaml()?;
        std::fs::write(&path, yaml).map_err(|source| CodegenError::ManifestWrite { path: path.clone(), source })?;
        debug!("wrote {:?} ({} dependencies)", path, self.dependencies.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LANG;
    use crate::ir::{Include, Operation, Scope};

    fn include(name: &str, dart_ns: &str) -> Include {
        Include {
            name: name.into(),
            namespaces: BTreeMap::from([(LANG.to_string(), dart_ns.to_string())]),
        }
    }

    fn schema(includes: Vec<Include>, ops: Vec<Operation>) -> Schema {
        Schema {
            name: "Events".into(),
            includes,
            scopes: vec![Scope {
                name: "Events".into(),
                operations: ops,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn runtime_dependencies_always_present() {
        let pubspec = build(&schema(vec![], vec![]), &GeneratorConfig::default());
        assert_eq!(pubspec.name, "events");
        assert_eq!(pubspec.environment.sdk, "^1.12.0");
        assert_eq!(
            pubspec.dependencies.get("frugal"),
            Some(&Dependency::git("git@github.com:Workiva/frugal-dart.git"))
        );
        assert!(pubspec.dependencies.contains_key("thrift"));
        assert_eq!(pubspec.dependencies.len(), 2);
    }

    #[test]
    fn includes_with_same_namespace_collapse() {
        let s = schema(
            vec![include("first", "a.b"), include("second", "a.b")],
            vec![Operation::new("One", "first.X"), Operation::new("Two", "second.Y")],
        );
        let pubspec = build(&s, &GeneratorConfig::default());
        let paths: Vec<_> = pubspec.dependencies.values().filter_map(|d| d.path.as_deref()).collect();
        assert_eq!(paths, vec!["../a_b"]);
    }

    #[test]
    fn colliding_library_names_keep_first() {
        let s = schema(
            vec![include("dotted", "a.b"), include("flat", "a_b")],
            vec![Operation::new("One", "dotted.X"), Operation::new("Two", "flat.Y")],
        );
        let pubspec = build(&s, &GeneratorConfig::default());
        assert_eq!(pubspec.dependencies.get("a_b"), Some(&Dependency::path("../a_b")));
        assert_eq!(pubspec.dependencies.len(), 3);
    }

    #[test]
    fn unreferenced_includes_are_ignored() {
        let s = schema(vec![include("unused", "x.y")], vec![Operation::new("One", "Local")]);
        let pubspec = build(&s, &GeneratorConfig::default());
        assert!(!pubspec.dependencies.contains_key("x_y"));
    }

    #[test]
    fn yaml_layout() {
        let s = schema(vec![include("base", "shared.types")], vec![Operation::new("One", "base.X")]);
        let yaml = build(&s, &GeneratorConfig::default()).to_yaml().unwrap();
        assert!(yaml.contains("name: events\n"));
        assert!(yaml.contains("environment:\n  sdk: ^1.12.0\n"));
        assert!(yaml.contains("  shared_types:\n    path: ../shared_types\n"));
        assert!(yaml.contains("  frugal:\n    git:\n      url: git@github.com:Workiva/frugal-dart.git\n"));
        assert!(!yaml.contains("null"));
    }

    #[test]
    fn write_creates_pubspec() {
        let dir = tempfile::tempdir().unwrap();
        let pubspec = build(&schema(vec![], vec![]), &GeneratorConfig::default());
        pubspec.write(dir.path()).unwrap();
        let written = std::fs::read_to_string(dir.path().join(PUBSPEC_FILE)).unwrap();
        assert_eq!(written, pubspec.to_yaml().unwrap());
    }

    #[test]
    fn write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let pubspec = build(&schema(vec![], vec![]), &GeneratorConfig::default());
        let err = pubspec.write(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, CodegenError::ManifestWrite { .. }));
    }
}
