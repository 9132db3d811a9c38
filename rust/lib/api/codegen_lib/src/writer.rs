use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::CodegenError;
use crate::facade::{append_exports, facade_path};
use crate::ir::Schema;
use crate::manifest::{self, PUBSPEC_FILE};
use crate::namespace::output_dir;
use crate::{Codegen, DartGenerator};

/// Summary of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    /// Package directory everything was written under.
    pub package_dir: PathBuf,
    /// Files written, relative to `package_dir`.
    pub files: Vec<String>,
    /// Export lines newly appended to the facade.
    pub exports_added: usize,
}

/// Generate the Dart package for `schema` and write it under `base`.
///
/// The package directory is derived from the schema's namespace. Generated
/// files replace existing ones; the facade library only gains the export
/// lines it is missing.
pub fn write_output(generator: &DartGenerator, schema: &Schema, base: &Path) -> anyhow::Result<WriteReport> {
    let package_dir = output_dir(base, schema);
    let code = generator.generate(schema)?;

    let mut files = Vec::with_capacity(code.files.len());
    for file in &code.files {
        let path = package_dir.join(&file.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CodegenError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        if file.path == PUBSPEC_FILE {
            manifest::build(schema, generator.config()).write(&package_dir)?;
        } else {
            std::fs::write(&path, &file.content).map_err(|source| CodegenError::Io {
                path: path.clone(),
                source,
            })?;
            debug!("wrote {:?}", path);
        }
        files.push(file.path.clone());
    }

    let facade = facade_path(&package_dir, schema);
    if let Some(parent) = facade.parent() {
        std::fs::create_dir_all(parent).map_err(|source| CodegenError::Facade {
            path: facade.clone(),
            source,
        })?;
    }
    let exports_added = append_exports(&facade, schema, generator.config())?;

    info!(
        "generated {} files for {} in {}",
        files.len(),
        schema.name,
        package_dir.display()
    );
    Ok(WriteReport {
        package_dir,
        files,
        exports_added,
    })
}
