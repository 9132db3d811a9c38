/// Dart scope file generator: publisher and subscriber classes for one
/// pub/sub scope.

use std::collections::BTreeSet;

use crate::config::GeneratorConfig;
use crate::ir::{Schema, Scope};
use crate::namespace::{import_alias, library_component, qualified_param_name, resolve_include, to_library_name};
use crate::topic::{capitalize, compile_prefix, escape_single_quoted, topic_expression};

const TAB: &str = "  ";
const TABTAB: &str = "    ";
const TABTABTAB: &str = "      ";

/// Emits the source of one scope file.
pub struct ScopeEmitter<'a> {
    schema: &'a Schema,
    config: &'a GeneratorConfig,
}

impl<'a> ScopeEmitter<'a> {
    pub fn new(schema: &'a Schema, config: &'a GeneratorConfig) -> Self {
        Self { schema, config }
    }

    /// Complete scope file: warning comment, library, imports, constants,
    /// publisher and subscriber.
    pub fn emit_file(&self, scope: &Scope) -> String {
        let mut output = String::new();
        output.push_str(&self.doc_string_comment());
        output.push_str("\n\n");
        output.push_str(&self.library(scope));
        output.push_str("\n\n");
        output.push_str(&self.imports(scope));
        output.push('\n');
        output.push_str(&self.constants());
        output.push_str("\n\n");
        output.push_str(&self.emit_publisher(scope));
        output.push('\n');
        output.push_str(&self.emit_subscriber(scope));
        output
    }

    pub fn doc_string_comment(&self) -> String {
        format!(
            "// Autogenerated by Scopegen Compiler ({})\n\
             // DO NOT EDIT UNLESS YOU ARE SURE THAT YOU KNOW WHAT YOU ARE DOING",
            self.config.compiler_version
        )
    }

    pub fn library(&self, scope: &Scope) -> String {
        format!(
            "library {}.src.{}{};",
            library_component(self.schema),
            self.config.file_prefix,
            scope.name.to_lowercase()
        )
    }

    /// Runtime imports, one per distinct include namespace, then one per
    /// distinct same-schema parameter type.
    pub fn imports(&self, scope: &Scope) -> String {
        let mut imports = String::from("import 'dart:async';\n\n");
        imports.push_str("import 'package:thrift/thrift.dart' as thrift;\n");
        imports.push_str("import 'package:frugal/frugal.dart' as frugal;\n\n");

        let mut namespaces = BTreeSet::new();
        for include in scope.referenced_includes() {
            let namespace = to_library_name(resolve_include(self.schema, &include)).to_lowercase();
            if namespaces.insert(namespace.clone()) {
                imports.push_str(&format!(
                    "import 'package:{}/{}.dart' as {};\n",
                    namespace,
                    namespace,
                    import_alias(&namespace)
                ));
            }
        }

        let params: BTreeSet<String> = scope
            .operations
            .iter()
            .filter(|op| op.include_name().is_empty())
            .map(|op| op.param.to_lowercase())
            .collect();
        for param in params {
            imports.push_str(&format!("import '{}.dart' as t_{};\n", param, param));
        }

        imports
    }

    pub fn constants(&self) -> String {
        format!(
            "const String delimiter = '{}';",
            escape_single_quoted(&self.config.topic_delimiter)
        )
    }

    pub fn emit_publisher(&self, scope: &Scope) -> String {
        let name = capitalize(&scope.name);
        let mut out = inline_comment(&scope.comment, "/");
        out.push_str(&format!("class {}Publisher {{\n", name));
        out.push_str(&format!("{TAB}frugal.Transport transport;\n"));
        out.push_str(&format!("{TAB}thrift.TProtocol protocol;\n"));
        out.push_str(&format!("{TAB}int seqId;\n\n"));

        out.push_str(&format!("{TAB}{}Publisher(frugal.Provider provider) {{\n", name));
        out.push_str(&format!("{TABTAB}var tp = provider.newTransportProtocol();\n"));
        out.push_str(&format!("{TABTAB}transport = tp.transport;\n"));
        out.push_str(&format!("{TABTAB}protocol = tp.protocol;\n"));
        out.push_str(&format!("{TABTAB}seqId = 0;\n"));
        out.push_str(&format!("{TAB}}}\n\n"));

        let args = prefix_args(scope);
        let prefix = compile_prefix(&scope.prefix, &self.config.topic_delimiter);
        let topic = topic_expression(scope);

        for (i, op) in scope.operations.iter().enumerate() {
            if i > 0 {
                out.push_str("\n\n");
            }
            out.push_str(&inline_comment(&op.comment, &format!("{TAB}/")));
            out.push_str(&format!(
                "{TAB}Future publish{}({}{} req) {{\n",
                op.name,
                args,
                qualified_param_name(self.schema, op)
            ));
            out.push_str(&format!("{TABTAB}var op = \"{}\";\n", op.name));
            out.push_str(&format!("{TABTAB}var prefix = \"{}\";\n", prefix));
            out.push_str(&format!("{TABTAB}var topic = \"{}\";\n", topic));
            out.push_str(&format!("{TABTAB}transport.preparePublish(topic);\n"));
            out.push_str(&format!("{TABTAB}var oprot = protocol;\n"));
            out.push_str(&format!("{TABTAB}seqId++;\n"));
            out.push_str(&format!("{TABTAB}var msg = new thrift.TMessage(op, thrift.TMessageType.CALL, seqId);\n"));
            out.push_str(&format!("{TABTAB}oprot.writeMessageBegin(msg);\n"));
            out.push_str(&format!("{TABTAB}req.write(oprot);\n"));
            out.push_str(&format!("{TABTAB}oprot.writeMessageEnd();\n"));
            out.push_str(&format!("{TABTAB}return oprot.transport.flush();\n"));
            out.push_str(&format!("{TAB}}}\n"));
        }

        out.push_str("}\n");
        out
    }

    pub fn emit_subscriber(&self, scope: &Scope) -> String {
        let name = capitalize(&scope.name);
        let mut out = inline_comment(&scope.comment, "/");
        out.push_str(&format!("class {}Subscriber {{\n", name));
        out.push_str(&format!("{TAB}final frugal.Provider provider;\n\n"));
        out.push_str(&format!("{TAB}{}Subscriber(this.provider) {{}}\n\n", name));

        let args = prefix_args(scope);
        let prefix = compile_prefix(&scope.prefix, &self.config.topic_delimiter);
        let topic = topic_expression(scope);

        for (i, op) in scope.operations.iter().enumerate() {
            if i > 0 {
                out.push_str("\n\n");
            }
            let qualified = qualified_param_name(self.schema, op);
            out.push_str(&inline_comment(&op.comment, &format!("{TAB}/")));
            out.push_str(&format!(
                "{TAB}Future<frugal.Subscription> subscribe{}({}dynamic on{}({} req)) async {{\n",
                op.name, args, op.param, qualified
            ));
            out.push_str(&format!("{TABTAB}var op = \"{}\";\n", op.name));
            out.push_str(&format!("{TABTAB}var prefix = \"{}\";\n", prefix));
            out.push_str(&format!("{TABTAB}var topic = \"{}\";\n", topic));
            out.push_str(&format!("{TABTAB}var tp = provider.newTransportProtocol();\n"));
            out.push_str(&format!("{TABTAB}await tp.transport.subscribe(topic);\n"));
            out.push_str(&format!("{TABTAB}var sub = new frugal.Subscription(topic, tp.transport);\n"));
            out.push_str(&format!("{TABTAB}tp.transport.signalRead.listen((_) {{\n"));
            out.push_str(&format!("{TABTABTAB}try {{\n"));
            out.push_str(&format!("{TABTABTAB}{TAB}on{}(_recv{}(op, tp.protocol));\n", op.param, op.name));
            out.push_str(&format!("{TABTABTAB}}} catch (e) {{\n"));
            out.push_str(&format!("{TABTABTAB}{TAB}sub.signal(e);\n"));
            out.push_str(&format!("{TABTABTAB}}}\n"));
            out.push_str(&format!("{TABTAB}}});\n"));
            out.push_str(&format!("{TABTAB}tp.transport.error.listen((Error e) {{\n"));
            out.push_str(&format!("{TABTABTAB}sub.signal(e);\n"));
            out.push_str(&format!("{TABTAB}}});\n"));
            out.push_str(&format!("{TABTAB}return sub;\n"));
            out.push_str(&format!("{TAB}}}\n\n"));

            out.push_str(&format!(
                "{TAB}{} _recv{}(String op, thrift.TProtocol iprot) {{\n",
                qualified, op.name
            ));
            out.push_str(&format!("{TABTAB}var tMsg = iprot.readMessageBegin();\n"));
            out.push_str(&format!("{TABTAB}if (tMsg.name != op) {{\n"));
            out.push_str(&format!("{TABTABTAB}thrift.TProtocolUtil.skip(iprot, thrift.TType.STRUCT);\n"));
            out.push_str(&format!("{TABTABTAB}iprot.readMessageEnd();\n"));
            out.push_str(&format!("{TABTABTAB}throw new thrift.TApplicationError(\n"));
            out.push_str(&format!("{TABTABTAB}thrift.TApplicationErrorType.UNKNOWN_METHOD, tMsg.name);\n"));
            out.push_str(&format!("{TABTAB}}}\n"));
            out.push_str(&format!("{TABTAB}var req = new {}();\n", qualified));
            out.push_str(&format!("{TABTAB}req.read(iprot);\n"));
            out.push_str(&format!("{TABTAB}iprot.readMessageEnd();\n"));
            out.push_str(&format!("{TABTAB}return req;\n"));
            out.push_str(&format!("{TAB}}}\n"));
        }

        out.push_str("}\n");
        out
    }
}

/// `String a, String b, ` for every prefix variable, in declaration order.
fn prefix_args(scope: &Scope) -> String {
    scope
        .prefix
        .variables
        .iter()
        .map(|v| format!("String {}, ", v))
        .collect()
}

/// Render comment lines as `<indent>// line`; with an indent ending in `/`
/// this yields Dart doc comments.
fn inline_comment(lines: &[String], indent: &str) -> String {
    lines
        .iter()
        .map(|line| format!("{}// {}\n", indent, line))
        .collect()
}
