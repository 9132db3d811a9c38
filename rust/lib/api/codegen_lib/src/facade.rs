/// Facade exports: the package's top-level library re-exports every scope's
/// publisher and subscriber.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::GeneratorConfig;
use crate::error::CodegenError;
use crate::ir::Schema;
use crate::namespace::package_name;
use crate::topic::capitalize;

/// Path of the facade library inside a package directory:
/// `<dir>/lib/<package>.dart`.
pub fn facade_path(dir: &Path, schema: &Schema) -> PathBuf {
    dir.join("lib").join(format!("{}.dart", package_name(schema)))
}

/// One export line per scope, in declaration order.
pub fn export_lines(schema: &Schema, config: &GeneratorConfig) -> Vec<String> {
    schema
        .scopes
        .iter()
        .map(|scope| {
            let name = capitalize(&scope.name);
            format!(
                "export 'src/{}{}.dart' show {}Publisher, {}Subscriber;",
                config.file_prefix,
                scope.name.to_lowercase(),
                name,
                name
            )
        })
        .collect()
}

/// Append the schema's export lines to the facade file.
///
/// Lines already present are not written again, so running generation twice
/// leaves the file unchanged. Existing content is never rewritten: new lines
/// go after the current end of file. The file is created if missing.
/// Returns the number of lines appended.
pub fn append_exports(path: &Path, schema: &Schema, config: &GeneratorConfig) -> Result<usize, CodegenError> {
    let io_err = |source| CodegenError::Facade {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(io_err)?;

    let mut existing = String::new();
    file.read_to_string(&mut existing).map_err(io_err)?;
    let present: HashSet<&str> = existing.lines().map(str::trim).collect();

    let missing: Vec<String> = export_lines(schema, config)
        .into_iter()
        .filter(|line| !present.contains(line.as_str()))
        .collect();
    if missing.is_empty() {
        debug!("facade {:?} already exports all {} scopes", path, schema.scopes.len());
        return Ok(0);
    }

    let mut exports = String::from("\n");
    for line in &missing {
        exports.push_str(line);
        exports.push('\n');
    }

    file.seek(SeekFrom::End(0)).map_err(io_err)?;
    file.write_all(exports.as_bytes()).map_err(io_err)?;
    debug!("appended {} exports to {:?}", missing.len(), path);
    Ok(missing.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Scope;

    fn two_scopes() -> Schema {
        Schema {
            name: "Events".into(),
            scopes: vec![
                Scope {
                    name: "Users".into(),
                    ..Default::default()
                },
                Scope {
                    name: "orders".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn export_line_format() {
        let lines = export_lines(&two_scopes(), &GeneratorConfig::default());
        assert_eq!(
            lines,
            vec![
                "export 'src/f_users.dart' show UsersPublisher, UsersSubscriber;",
                "export 'src/f_orders.dart' show OrdersPublisher, OrdersSubscriber;",
            ]
        );
    }

    #[test]
    fn appends_after_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.dart");
        let original = "library events;\n\nexport 'src/user.dart';\n";
        std::fs::write(&path, original).unwrap();

        let added = append_exports(&path, &two_scopes(), &GeneratorConfig::default()).unwrap();
        assert_eq!(added, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(original));
        let tail = &content[original.len()..];
        assert_eq!(tail.lines().filter(|l| l.starts_with("export")).count(), 2);
        assert!(tail.contains("show UsersPublisher, UsersSubscriber;"));
        assert!(tail.contains("show OrdersPublisher, OrdersSubscriber;"));
    }

    #[test]
    fn repeated_runs_do_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.dart");
        std::fs::write(&path, "library events;\n").unwrap();
        let config = GeneratorConfig::default();

        append_exports(&path, &two_scopes(), &config).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        assert_eq!(append_exports(&path, &two_scopes(), &config).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn only_missing_lines_are_added() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.dart");
        std::fs::write(
            &path,
            "export 'src/f_users.dart' show UsersPublisher, UsersSubscriber;\n",
        )
        .unwrap();

        let added = append_exports(&path, &two_scopes(), &GeneratorConfig::default()).unwrap();
        assert_eq!(added, 1);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("UsersPublisher").count(), 1);
        assert_eq!(content.matches("OrdersPublisher").count(), 1);
    }

    #[test]
    fn missing_directory_is_a_facade_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("events.dart");
        let err = append_exports(&path, &two_scopes(), &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, CodegenError::Facade { .. }));
    }

    #[test]
    fn facade_path_uses_package_name() {
        let schema = two_scopes();
        assert_eq!(
            facade_path(Path::new("out"), &schema),
            PathBuf::from("out/lib/events.dart")
        );
    }
}
