use serde_json::Map;
use serde_json::Value;

use crate::DependencyList;
use crate::TwigpackResult;

/// Render the bundler module for a compiled template.
///
/// The module `require`s each distinct dependency in the order it was
/// discovered, instantiates the renderer found at `twig_entry` with
/// `options`, and exports a function that renders with a given context.
/// `twig_entry` is embedded verbatim.
pub fn emit_module(
	twig_entry: &str,
	options: &Map<String, Value>,
	dependencies: &DependencyList,
) -> TwigpackResult<String> {
	let mut output = Vec::new();

	for dependency in dependencies.unique() {
		output.push(format!("require({});\n", serde_json::to_string(dependency)?));
	}

	output.push(format!("var twig = require(\"{twig_entry}\").twig,"));
	output.push(format!(
		"    template = twig({});\n",
		serde_json::to_string(options)?
	));
	output.push("module.exports = function(context) { return template.render(context); }".to_string());

	Ok(output.join("\n"))
}
