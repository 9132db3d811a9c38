/// Dart generator: ties the manifest, scope emitter and file layout together.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::GeneratorConfig;
use crate::error::CodegenError;
use crate::ir::*;
use crate::manifest::{self, PUBSPEC_FILE};
use crate::scope::ScopeEmitter;
use crate::topic::placeholder_count;
use crate::FileType;

pub struct DartGenerator {
    config: GeneratorConfig,
}

impl DartGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// This backend never asks for Thrift IDL output.
    pub fn generate_thrift(&self) -> bool {
        false
    }

    /// Path of a generated file, relative to the package directory. Only
    /// combined scope files are supported.
    pub fn file_path(&self, name: &str, file_type: FileType) -> Result<PathBuf, CodegenError> {
        if file_type != FileType::CombinedScope {
            return Err(CodegenError::UnsupportedFileType(file_type));
        }
        Ok(Path::new("lib")
            .join("src")
            .join(format!("{}{}.dart", self.config.file_prefix, name.to_lowercase())))
    }

    /// RPC services produce no Dart output.
    pub fn generate_service(&self, _schema: &Schema, _service: &Service) -> String {
        String::new()
    }

    pub fn generate_scope(&self, schema: &Schema, scope: &Scope) -> String {
        ScopeEmitter::new(schema, &self.config).emit_file(scope)
    }
}

impl Default for DartGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl crate::Codegen for DartGenerator {
    fn generate(&self, schema: &Schema) -> Result<crate::GeneratedCode> {
        let mut files = Vec::new();

        let pubspec = manifest::build(schema, &self.config);
        files.push(crate::GeneratedFile {
            path: PUBSPEC_FILE.to_string(),
            content: pubspec.to_yaml()?,
        });

        for scope in &schema.scopes {
            let path = self.file_path(&scope.name, FileType::CombinedScope)?;
            let placeholders = placeholder_count(&scope.prefix.string);
            if placeholders != scope.prefix.variables.len() {
                warn!(
                    "scope {}: prefix {:?} has {} placeholders but {} variables",
                    scope.name,
                    scope.prefix.string,
                    placeholders,
                    scope.prefix.variables.len()
                );
            }
            debug!("generating scope {} -> {:?}", scope.name, path);
            files.push(crate::GeneratedFile {
                path: path.to_string_lossy().into_owned(),
                content: self.generate_scope(schema, scope),
            });
        }

        Ok(crate::GeneratedCode { files })
    }

    fn language(&self) -> &str {
        crate::config::LANG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Codegen;

    #[test]
    fn only_combined_scope_files_are_supported() {
        let generator = DartGenerator::default();
        assert_eq!(
            generator.file_path("Events", FileType::CombinedScope).unwrap(),
            PathBuf::from("lib/src/f_events.dart")
        );
        for file_type in [
            FileType::Publish,
            FileType::Subscribe,
            FileType::CombinedService,
            FileType::ServiceArgsResults,
            FileType::Types,
        ] {
            let err = generator.file_path("Events", file_type).unwrap_err();
            assert!(matches!(err, CodegenError::UnsupportedFileType(t) if t == file_type));
        }
    }

    #[test]
    fn generates_pubspec_and_one_file_per_scope() {
        let schema = Schema {
            name: "Events".into(),
            scopes: vec![
                Scope {
                    name: "Users".into(),
                    operations: vec![Operation::new("Created", "UserEvent")],
                    ..Default::default()
                },
                Scope {
                    name: "Orders".into(),
                    operations: vec![Operation::new("Placed", "Order")],
                    ..Default::default()
                },
            ],
            services: vec![Service {
                name: "Ping".into(),
                methods: vec![Operation::new("ping", "Ping")],
                ..Default::default()
            }],
            ..Default::default()
        };

        let generator = DartGenerator::default();
        assert_eq!(generator.language(), "dart");
        assert!(!generator.generate_thrift());
        assert!(generator.generate_service(&schema, &schema.services[0]).is_empty());

        let code = generator.generate(&schema).unwrap();
        let paths: Vec<_> = code.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["pubspec.yaml", "lib/src/f_users.dart", "lib/src/f_orders.dart"]);
        assert!(code.files[1].content.contains("class UsersPublisher"));
        assert!(!code.files[1].content.contains("Ping"));
    }
}
