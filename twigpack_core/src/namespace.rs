use std::path::Path;
use std::path::PathBuf;

use derive_more::Deref;
use derive_more::DerefMut;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use crate::TwigpackResult;
use crate::discover::discover_templates;

/// Alias name to real path prefix, in declaration order.
///
/// ```json
/// { "theme": "src/theme/", "components": "src/components/" }
/// ```
///
/// Both `theme::page.twig` and `@theme/page.twig` resolve through the
/// `theme` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceTable(IndexMap<String, String>);

impl NamespaceTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Substitute the first alias whose `alias::` or `@alias` form prefixes
	/// `path`. Paths without an alias are returned unchanged.
	pub fn resolve(&self, path: &str) -> String {
		for (alias, prefix) in &self.0 {
			let colon = format!("{alias}::");
			let at_sign = format!("@{alias}");

			let rest = path
				.strip_prefix(colon.as_str())
				.or_else(|| path.strip_prefix(at_sign.as_str()));
			if let Some(rest) = rest {
				return join_prefix(prefix, rest);
			}
		}

		path.to_string()
	}

	/// List every template file below the configured namespace roots.
	pub fn discover_templates(&self) -> TwigpackResult<Vec<PathBuf>> {
		let mut templates = Vec::new();

		for root in self.0.values() {
			for template in discover_templates(Path::new(root))? {
				if !templates.contains(&template) {
					templates.push(template);
				}
			}
		}

		Ok(templates)
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NamespaceTable {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self(
			iter.into_iter()
				.map(|(alias, prefix)| (alias.into(), prefix.into()))
				.collect(),
		)
	}
}

/// `@theme/page.twig` carries its own separator, so avoid doubling it when
/// the configured prefix already ends in one.
fn join_prefix(prefix: &str, rest: &str) -> String {
	if prefix.ends_with('/') && rest.starts_with('/') {
		format!("{prefix}{}", rest.trim_start_matches('/'))
	} else {
		format!("{prefix}{rest}")
	}
}
