/// Intermediate Representation (IR) - a parsed schema as handed over by the
/// IDL parser. Nothing in this crate mutates it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One parsed IDL file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    /// Target-language tag -> declared dotted namespace.
    #[serde(default)]
    pub namespaces: BTreeMap<String, String>,
    #[serde(default)]
    pub includes: Vec<Include>,
    #[serde(default)]
    pub scopes: Vec<Scope>,
    #[serde(default)]
    pub services: Vec<Service>,
}

/// A reference to another schema. Carries the included schema's own
/// namespace declarations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Include {
    pub name: String,
    #[serde(default)]
    pub namespaces: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scope {
    pub name: String,
    #[serde(default)]
    pub comment: Vec<String>,
    #[serde(default)]
    pub prefix: Prefix,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

/// Topic prefix of a scope: a literal template where every `{...}` is a
/// positional placeholder, plus the declared variables in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefix {
    pub string: String,
    #[serde(default)]
    pub variables: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    /// Parameter type name without any include qualifier.
    pub param: String,
    /// Include the parameter type comes from. `None` means the current schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    #[serde(default)]
    pub comment: Vec<String>,
}

/// RPC service. Carried for completeness; the Dart backend emits nothing
/// for it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub comment: Vec<String>,
    #[serde(default)]
    pub methods: Vec<Operation>,
}

impl Schema {
    /// Look up an include declared by this schema.
    pub fn include(&self, name: &str) -> Option<&Include> {
        self.includes.iter().find(|inc| inc.name == name)
    }

    /// Distinct include names referenced by any scope operation or service
    /// method, in first-reference order.
    pub fn referenced_includes(&self) -> Vec<String> {
        let ops = self
            .scopes
            .iter()
            .flat_map(|s| s.operations.iter())
            .chain(self.services.iter().flat_map(|s| s.methods.iter()));
        collect_includes(ops)
    }
}

impl Scope {
    /// Distinct include names referenced by this scope's operations.
    pub fn referenced_includes(&self) -> Vec<String> {
        collect_includes(self.operations.iter())
    }
}

impl Prefix {
    pub fn new(string: impl Into<String>, variables: &[&str]) -> Self {
        Self {
            string: string.into(),
            variables: variables.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl Operation {
    /// Build an operation from a possibly include-qualified parameter
    /// reference such as `base.Thing`.
    pub fn new(name: impl Into<String>, param: &str) -> Self {
        let (include, param) = match param.split_once('.') {
            Some((include, param)) => (Some(include.to_string()), param.to_string()),
            None => (None, param.to_string()),
        };
        Self {
            name: name.into(),
            param,
            include,
            comment: Vec::new(),
        }
    }

    /// Include name, or an empty string for same-schema parameters.
    pub fn include_name(&self) -> &str {
        self.include.as_deref().unwrap_or_default()
    }
}

fn collect_includes<'a>(ops: impl Iterator<Item = &'a Operation>) -> Vec<String> {
    let mut seen = Vec::new();
    for op in ops {
        if let Some(include) = op.include.as_deref().filter(|i| !i.is_empty()) {
            if !seen.iter().any(|s: &String| s == include) {
                seen.push(include.to_string());
            }
        }
    }
    seen
}
