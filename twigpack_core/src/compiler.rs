use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use crate::ContentHasher;
use crate::DependencyList;
use crate::DependencyWalker;
use crate::LoaderOptions;
use crate::Sha512Hasher;
use crate::Token;
use crate::TwigpackError;
use crate::TwigpackResult;
use crate::data::load_auxiliary_document;
use crate::emit::emit_module;

/// Template id to the template's absolute path on disk, as registered by
/// the host bundler when it hands a template to the parser.
#[derive(Debug, Clone, Default)]
pub struct ResourceMap(HashMap<String, PathBuf>);

impl ResourceMap {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, id: impl Into<String>, path: impl Into<PathBuf>) {
		self.0.insert(id.into(), path.into());
	}

	pub fn get(&self, id: &str) -> Option<&Path> {
		self.0.get(id).map(PathBuf::as_path)
	}
}

/// The processed AST of one template together with the dependencies found
/// in it.
#[derive(Debug, Clone)]
pub struct Analysis {
	/// The AST with dynamic include stacks collapsed and dependency paths
	/// replaced by content identifiers.
	pub tokens: Vec<Token>,
	pub dependencies: DependencyList,
}

/// Compiles parsed templates into bundler modules.
pub struct TemplateCompiler {
	options: LoaderOptions,
	resources: ResourceMap,
	hasher: Box<dyn ContentHasher>,
}

impl TemplateCompiler {
	/// A compiler with an empty [`ResourceMap`] that identifies dependencies
	/// with [`Sha512Hasher`].
	pub fn new(options: LoaderOptions) -> Self {
		Self {
			options,
			resources: ResourceMap::new(),
			hasher: Box::new(Sha512Hasher),
		}
	}

	#[must_use]
	pub fn with_hasher(mut self, hasher: impl ContentHasher + 'static) -> Self {
		self.hasher = Box::new(hasher);
		self
	}

	#[must_use]
	pub fn with_resources(mut self, resources: ResourceMap) -> Self {
		self.resources = resources;
		self
	}

	pub fn register(&mut self, id: impl Into<String>, path: impl Into<PathBuf>) {
		self.resources.register(id, path);
	}

	pub fn options(&self) -> &LoaderOptions {
		&self.options
	}

	/// Walk the serialized AST of template `id` without emitting a module.
	pub fn analyze(&self, id: &str, tokens: &str) -> TwigpackResult<Analysis> {
		let resource_path = self
			.resources
			.get(id)
			.ok_or_else(|| TwigpackError::UnknownTemplate(id.to_string()))?;
		let mut tokens: Vec<Token> =
			serde_json::from_str(tokens).map_err(|e| TwigpackError::MalformedAst(e.to_string()))?;

		let document = load_auxiliary_document(resource_path);
		let template_dir = resource_path.parent().unwrap_or_else(|| Path::new(""));
		let walker = DependencyWalker::new(
			&document,
			&self.options.twig_options.namespaces,
			&*self.hasher,
			template_dir,
		);
		let dependencies = walker.walk(&mut tokens)?;

		tracing::debug!(id, count = dependencies.len(), "analyzed template");

		Ok(Analysis {
			tokens,
			dependencies,
		})
	}

	/// Compile the serialized AST of template `id` into module source that
	/// loads the renderer from `twig_entry`.
	pub fn compile(&self, id: &str, tokens: &str, twig_entry: &str) -> TwigpackResult<String> {
		let analysis = self.analyze(id, tokens)?;
		let options = self
			.options
			.twig_options
			.instantiation_options(id, &analysis.tokens)?;

		emit_module(twig_entry, &options, &analysis.dependencies)
	}
}
