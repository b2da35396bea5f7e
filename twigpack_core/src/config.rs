use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::NamespaceTable;
use crate::Token;
use crate::TwigpackError;
use crate::TwigpackResult;

/// Options supplied by the host bundler.
///
/// ```json
/// {
///   "twigOptions": {
///     "namespaces": { "theme": "src/theme/" },
///     "autoescape": true
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderOptions {
	/// Options forwarded to the Twig renderer. Only `namespaces` is read by
	/// the compiler itself.
	#[serde(default)]
	pub twig_options: TwigOptions,
}

impl LoaderOptions {
	pub fn from_json_str(content: &str) -> TwigpackResult<Self> {
		serde_json::from_str(content).map_err(|e| TwigpackError::ConfigParse(e.to_string()))
	}

	/// Load options from a `.json`, `.yaml`/`.yml` or `.toml` file.
	pub fn load(path: &Path) -> TwigpackResult<Self> {
		let content = std::fs::read_to_string(path)?;
		let format = path
			.extension()
			.and_then(|e| e.to_str())
			.unwrap_or("")
			.to_ascii_lowercase();

		match format.as_str() {
			"json" => Self::from_json_str(&content),
			"yaml" | "yml" => {
				serde_yaml_ng::from_str(&content).map_err(|e| TwigpackError::ConfigParse(e.to_string()))
			}
			"toml" => toml::from_str(&content).map_err(|e| TwigpackError::ConfigParse(e.to_string())),
			other => Err(TwigpackError::UnsupportedConfigFormat(other.to_string())),
		}
	}
}

/// Renderer options. Fields other than `namespaces` pass through to the
/// emitted renderer instantiation untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwigOptions {
	#[serde(default, skip_serializing_if = "NamespaceTable::is_empty")]
	pub namespaces: NamespaceTable,
	#[serde(flatten)]
	pub passthrough: Map<String, Value>,
}

impl TwigOptions {
	/// The options object the emitted module hands to the renderer: these
	/// options, overridden by the template `id`, the processed AST as
	/// `data`, and the flags the bundled renderer relies on.
	pub fn instantiation_options(&self, id: &str, tokens: &[Token]) -> TwigpackResult<Map<String, Value>> {
		let Value::Object(mut options) = serde_json::to_value(self)? else {
			return Ok(Map::new());
		};

		options.insert("id".to_string(), Value::String(id.to_string()));
		options.insert("data".to_string(), serde_json::to_value(tokens)?);
		options.insert("allowInlineIncludes".to_string(), Value::Bool(true));
		options.insert("rethrow".to_string(), Value::Bool(true));

		Ok(options)
	}
}
