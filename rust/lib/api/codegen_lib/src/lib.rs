/// Scopegen Dart backend - pub/sub scope code generation
///
/// Turns a parsed schema (IR) into a Dart package: `pubspec.yaml`, one
/// publisher/subscriber file per scope, and export lines in the package's
/// facade library.

pub mod config;
pub mod dart;
pub mod error;
pub mod facade;
pub mod ir;
pub mod manifest;
pub mod namespace;
pub mod scope;
pub mod topic;
pub mod writer;

use std::fmt;

pub use config::GeneratorConfig;
pub use dart::DartGenerator;
pub use error::CodegenError;
pub use ir::*;
pub use writer::write_output;

/// Codegen trait - implement this for each target language
pub trait Codegen {
    fn generate(&self, schema: &Schema) -> anyhow::Result<GeneratedCode>;
    fn language(&self) -> &str;
}

pub struct GeneratedCode {
    pub files: Vec<GeneratedFile>,
}

pub struct GeneratedFile {
    /// Relative to the package output directory.
    pub path: String,
    pub content: String,
}

/// Kinds of output file a driver may ask a backend for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    CombinedScope,
    Publish,
    Subscribe,
    CombinedService,
    ServiceArgsResults,
    Types,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileType::CombinedScope => "combined_scope",
            FileType::Publish => "publish",
            FileType::Subscribe => "subscribe",
            FileType::CombinedService => "combined_service",
            FileType::ServiceArgsResults => "service_args_results",
            FileType::Types => "types",
        };
        f.write_str(name)
    }
}
