use std::path::Path;

use serde_json::Value;
use serde_json::json;

use crate::ExpressionToken;
use crate::LoaderOptions;
use crate::NamespaceTable;
use crate::TemplateCompiler;
use crate::Token;

pub(crate) const TEMPLATE_PATH: &str = "/project/templates/page.twig";
pub(crate) const TWIG_ENTRY: &str = "node_modules/twig/twig.js";

pub(crate) fn string(value: &str) -> Value {
	json!({ "type": "Twig.expression.type.string", "value": value })
}

pub(crate) fn variable(name: &str) -> Value {
	json!({ "type": "Twig.expression.type.variable", "value": name, "match": [name] })
}

pub(crate) fn key(name: &str) -> Value {
	json!({ "type": "Twig.expression.type.key.period", "key": name })
}

pub(crate) fn concat() -> Value {
	json!({
		"type": "Twig.expression.type.operator.binary",
		"value": "~",
		"operator": "~",
		"associativity": "leftToRight",
		"precidence": 6
	})
}

pub(crate) fn slice(start: Option<i64>, end: Option<i64>) -> Value {
	json!({ "type": "Twig.expression.type.slice", "params": [start, end] })
}

pub(crate) fn filter(name: &str) -> Value {
	json!({ "type": "Twig.expression.type.filter", "value": name })
}

pub(crate) fn logic(kind: &str, fields: Value) -> Value {
	let mut token = json!({ "type": format!("Twig.logic.type.{kind}") });
	if let (Some(token), Value::Object(fields)) = (token.as_object_mut(), fields) {
		token.extend(fields);
	}

	json!({ "type": "logic", "token": token })
}

pub(crate) fn include(stack: Vec<Value>) -> Value {
	logic("include", json!({ "stack": stack, "withStack": null, "only": false }))
}

pub(crate) fn extends(stack: Vec<Value>) -> Value {
	logic("extends", json!({ "stack": stack }))
}

pub(crate) fn for_loop(value_var: &str, expression: Vec<Value>, output: Vec<Value>) -> Value {
	logic(
		"for",
		json!({
			"keyVar": null,
			"valueVar": value_var,
			"expression": expression,
			"output": output
		}),
	)
}

pub(crate) fn raw(value: &str) -> Value {
	json!({ "type": "raw", "value": value })
}

pub(crate) fn tokens(values: Vec<Value>) -> Vec<Token> {
	serde_json::from_value(Value::Array(values)).unwrap_or_else(|e| panic!("tokens: {e}"))
}

pub(crate) fn expressions(values: Vec<Value>) -> Vec<ExpressionToken> {
	serde_json::from_value(Value::Array(values)).unwrap_or_else(|e| panic!("expressions: {e}"))
}

pub(crate) fn ast(values: Vec<Value>) -> String {
	Value::Array(values).to_string()
}

/// Identifies a dependency by its absolute path so assertions stay readable.
pub(crate) fn path_hasher(path: &Path) -> String {
	format!("id:{}", path.display())
}

pub(crate) fn theme_namespaces() -> NamespaceTable {
	[("theme", "/themes/x/")].into_iter().collect()
}

pub(crate) fn compiler_with(namespaces: NamespaceTable, template: &Path) -> TemplateCompiler {
	let mut options = LoaderOptions::default();
	options.twig_options.namespaces = namespaces;

	let mut compiler = TemplateCompiler::new(options).with_hasher(path_hasher);
	compiler.register("page", template);
	compiler
}

pub(crate) fn compiler() -> TemplateCompiler {
	compiler_with(NamespaceTable::new(), Path::new(TEMPLATE_PATH))
}

/// The dependency paths declared by an emitted module, in order.
pub(crate) fn declared_requires(module: &str) -> Vec<String> {
	module
		.lines()
		.filter_map(|line| line.strip_prefix("require(\""))
		.filter_map(|line| line.strip_suffix("\");"))
		.map(ToString::to_string)
		.collect()
}
