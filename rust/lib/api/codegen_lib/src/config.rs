use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CodegenError;

/// Target-language tag used to look up namespace declarations.
pub const LANG: &str = "dart";

/// A runtime library every generated package depends on, fetched from git.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeDependency {
    pub name: String,
    pub git_url: String,
}

/// Generator settings. Passed explicitly to every component; there is no
/// process-wide state.
///
/// Can be loaded from a TOML file, every field is optional:
///
/// ```toml
/// min_runtime_version = "1.12.0"
/// topic_delimiter = "."
///
/// [[runtime_dependencies]]
/// name = "frugal"
/// git_url = "git@github.com:Workiva/frugal-dart.git"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Embedded in the generated warning comment and used as the package
    /// version in the manifest.
    pub compiler_version: String,

    /// Minimum Dart SDK version; rendered as `^<version>`.
    pub min_runtime_version: String,

    /// Separator between topic segments.
    pub topic_delimiter: String,

    /// Prefix of every generated scope file name.
    pub file_prefix: String,

    /// Manifest description.
    pub description: String,

    /// Fixed git dependencies of the generated package.
    pub runtime_dependencies: Vec<RuntimeDependency>,

    /// Output directory used when the caller doesn't pick one.
    pub output_dir: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            compiler_version: env!("CARGO_PKG_VERSION").to_string(),
            min_runtime_version: "1.12.0".to_string(),
            topic_delimiter: ".".to_string(),
            file_prefix: "f_".to_string(),
            description: "Autogenerated by the scopegen compiler".to_string(),
            runtime_dependencies: vec![
                RuntimeDependency {
                    name: "thrift".to_string(),
                    git_url: "git@github.com:Workiva/thrift-dart.git".to_string(),
                },
                RuntimeDependency {
                    name: "frugal".to_string(),
                    git_url: "git@github.com:Workiva/frugal-dart.git".to_string(),
                },
            ],
            output_dir: PathBuf::from("gen-dart"),
        }
    }
}

impl GeneratorConfig {
    /// Load config from a TOML file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, CodegenError> {
        let content = std::fs::read_to_string(path).map_err(|source| CodegenError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| CodegenError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// SDK constraint written to the manifest.
    pub fn sdk_constraint(&self) -> String {
        format!("^{}", self.min_runtime_version)
    }
}
