/// Topic template compilation.
///
/// A scope prefix like `user.{id}` with variables `[id]` compiles to the Dart
/// interpolation `user.${id}.` (literal, delimiter appended). The final topic
/// is `<compiled prefix><Scope><delimiter><operation>`.

use crate::ir::{Prefix, Scope};

/// Compile a scope prefix into a Dart string-interpolation template.
///
/// Placeholder `i` in the literal binds to `variables[i]`, whatever names
/// the placeholder braces contain. Placeholders past the end of the variable
/// list are left as written.
pub fn compile_prefix(prefix: &Prefix, delimiter: &str) -> String {
    if prefix.string.is_empty() {
        return String::new();
    }

    let mut template = String::new();
    let mut vars = prefix.variables.iter();
    let mut rest = prefix.string.as_str();

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|c| open + c) else {
            break;
        };
        template.push_str(&escape_literal(&rest[..open]));
        match vars.next() {
            Some(var) => template.push_str(&format!("${{{}}}", var)),
            None => template.push_str(&escape_literal(&rest[open..=close])),
        }
        rest = &rest[close + 1..];
    }
    template.push_str(&escape_literal(rest));
    template.push_str(&escape_literal(delimiter));
    template
}

/// Number of `{...}` placeholders in a prefix literal.
pub fn placeholder_count(literal: &str) -> usize {
    let mut count = 0;
    let mut rest = literal;
    while let Some(open) = rest.find('{') {
        match rest[open..].find('}') {
            Some(close) => {
                count += 1;
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    count
}

/// Dart expression (a double-quoted string body) for the topic of one
/// operation, referring to the generated `prefix`, `delimiter` and `op`
/// locals.
pub fn topic_expression(scope: &Scope) -> String {
    format!("${{prefix}}{}${{delimiter}}${{op}}", capitalize(&scope.name))
}

/// Plain topic string for a fully-bound prefix, as the generated code
/// computes it at runtime.
pub fn topic_string(compiled_prefix: &str, scope: &str, op: &str, delimiter: &str) -> String {
    format!("{}{}{}{}", compiled_prefix, capitalize(scope), delimiter, op)
}

/// Upper-case the first character, leave the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Escape `s` for a single-quoted Dart string.
pub fn escape_single_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '\'' | '$') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' | '"' | '$' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_quoted_escaping() {
        assert_eq!(escape_single_quoted("."), ".");
        assert_eq!(escape_single_quoted("'$\\"), "\\'\\$\\\\");
    }

    #[test]
    fn empty_prefix_compiles_to_nothing() {
        assert_eq!(compile_prefix(&Prefix::default(), "."), "");
    }

    #[test]
    fn prefix_without_variables_gets_one_delimiter() {
        for literal in ["foo", "foo.bar", "a-b"] {
            let compiled = compile_prefix(&Prefix::new(literal, &[]), ".");
            assert_eq!(compiled, format!("{literal}."));
        }
    }

    #[test]
    fn variables_bind_by_position_not_name() {
        let prefix = Prefix::new("{b}.{a}", &["x", "y"]);
        assert_eq!(compile_prefix(&prefix, "."), "${x}.${y}.");

        let prefix = Prefix::new("user.{id}", &["id"]);
        assert_eq!(compile_prefix(&prefix, "."), "user.${id}.");
    }

    #[test]
    fn extra_placeholders_are_kept() {
        let prefix = Prefix::new("{a}.{b}", &["a"]);
        assert_eq!(compile_prefix(&prefix, "."), "${a}.{b}.");
        assert_eq!(placeholder_count("{a}.{b}"), 2);
        assert_eq!(placeholder_count("plain"), 0);
        assert_eq!(placeholder_count("{open"), 0);
    }

    #[test]
    fn literal_is_escaped_for_dart() {
        let prefix = Prefix::new("pay$\"x\"", &[]);
        assert_eq!(compile_prefix(&prefix, "."), "pay\\$\\\"x\\\".");
    }

    #[test]
    fn topic_for_events_scope() {
        let scope = Scope {
            name: "events".into(),
            prefix: Prefix::new("user.{id}", &["id"]),
            ..Default::default()
        };
        assert_eq!(topic_expression(&scope), "${prefix}Events${delimiter}${op}");

        // Runtime value once `id` is bound to 42.
        assert_eq!(topic_string("user.42.", "events", "Created", "."), "user.42.Events.Created");
        assert_eq!(topic_string("", "Events", "Created", "."), "Events.Created");
    }

    #[test]
    fn capitalize_only_touches_first_char() {
        assert_eq!(capitalize("userEvents"), "UserEvents");
        assert_eq!(capitalize("Events"), "Events");
        assert_eq!(capitalize(""), "");
    }
}
