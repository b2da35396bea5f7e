use std::path::Path;
use std::path::PathBuf;

use serde_json::Map;
use serde_json::Value;

const TEMPLATE_EXTENSION: &str = ".twig";
const DATA_EXTENSION: &str = ".yml";

/// Location of the data file that sits next to `template`: the first
/// `.twig` in the path becomes `.yml`. Returns `None` for paths without a
/// `.twig` segment.
pub fn auxiliary_data_path(template: &Path) -> Option<PathBuf> {
	let text = template.to_string_lossy();
	if !text.contains(TEMPLATE_EXTENSION) {
		return None;
	}

	Some(PathBuf::from(text.replacen(
		TEMPLATE_EXTENSION,
		DATA_EXTENSION,
		1,
	)))
}

/// Load the data document used to resolve dynamic include paths in
/// `template`.
///
/// This never fails. A missing, unreadable or unparsable data file, and a
/// file whose document is `null`, all yield an empty object.
pub fn load_auxiliary_document(template: &Path) -> Value {
	let Some(data_path) = auxiliary_data_path(template) else {
		return empty_document();
	};

	if !data_path.is_file() {
		tracing::debug!(path = %data_path.display(), "no auxiliary data file");
		return empty_document();
	}

	let content = match std::fs::read_to_string(&data_path) {
		Ok(content) => content,
		Err(error) => {
			tracing::warn!(path = %data_path.display(), %error, "failed to read auxiliary data");
			return empty_document();
		}
	};

	match serde_yaml_ng::from_str::<Value>(&content) {
		Ok(Value::Null) => empty_document(),
		Ok(document) => document,
		Err(error) => {
			tracing::warn!(path = %data_path.display(), %error, "failed to parse auxiliary data");
			empty_document()
		}
	}
}

fn empty_document() -> Value {
	Value::Object(Map::new())
}
