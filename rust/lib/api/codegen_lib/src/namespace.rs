//! Namespace and cross-file type resolution.
//!
//! Every identifier the Dart backend derives from a schema goes through here:
//! library names, package names, import aliases and qualified parameter types.

use std::path::{Path, PathBuf};

use crate::config::LANG;
use crate::ir::{Operation, Schema};

/// Declared Dart namespace of `schema`, or the schema name when none was
/// declared.
pub fn resolve_namespace(schema: &Schema) -> &str {
    schema
        .namespaces
        .get(LANG)
        .map(String::as_str)
        .unwrap_or(&schema.name)
}

/// Dart namespace of an include referenced by `schema`. Falls back to the
/// include's own name when the included schema declares no Dart namespace
/// (or the include is not declared at all).
pub fn resolve_include<'a>(schema: &'a Schema, include_name: &'a str) -> &'a str {
    schema
        .include(include_name)
        .and_then(|inc| inc.namespaces.get(LANG))
        .map(String::as_str)
        .unwrap_or(include_name)
}

/// Turn a dotted identifier into a library/module-safe token.
pub fn to_library_name(name: &str) -> String {
    name.replace('.', "_")
}

/// Manifest package name: the lower-cased library name of the schema's
/// namespace.
pub fn package_name(schema: &Schema) -> String {
    to_library_name(resolve_namespace(schema)).to_lowercase()
}

/// Last dotted component of the declared namespace, or the schema name.
/// Used as the root of `library` declarations.
pub fn library_component(schema: &Schema) -> &str {
    match schema.namespaces.get(LANG) {
        Some(ns) => ns.rsplit('.').next().unwrap_or(ns),
        None => &schema.name,
    }
}

/// Package output directory for a schema under `base`.
pub fn output_dir(base: &Path, schema: &Schema) -> PathBuf {
    match schema.namespaces.get(LANG) {
        Some(ns) => base.join(to_library_name(ns)),
        None => base.join(&schema.name),
    }
}

/// Import alias for a resolved namespace: `t_<lower(library name)>`.
pub fn import_alias(namespace: &str) -> String {
    format!("t_{}", to_library_name(namespace).to_lowercase())
}

/// Fully-qualified Dart type of an operation's parameter.
///
/// - With an include: the include's namespace alias, `t_base_types.Thing`.
/// - Without one: the parameter lives in a sibling file named after the
///   lower-cased type, so the alias is derived from the type itself:
///   `t_thing.Thing`. The enclosing schema's namespace is never used.
pub fn qualified_param_name(schema: &Schema, op: &Operation) -> String {
    match op.include.as_deref().filter(|i| !i.is_empty()) {
        Some(include) => {
            let namespace = resolve_include(schema, include);
            format!("{}.{}", import_alias(namespace), op.param)
        }
        None => format!("{}.{}", import_alias(&op.param), op.param),
    }
}
