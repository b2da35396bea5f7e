use std::collections::HashSet;
use std::path::Path;

use derive_more::Deref;
use derive_more::DerefMut;
use serde_json::Value;

use crate::ContentHasher;
use crate::DataCursor;
use crate::Expression;
use crate::ExpressionToken;
use crate::LogicToken;
use crate::LogicType;
use crate::NamespaceTable;
use crate::SELF_REFERENCE;
use crate::Token;
use crate::TwigpackError;
use crate::TwigpackResult;
use crate::content_id::resolve_path;
use crate::evaluate;

/// Dependency paths in discovery order, after namespace substitution.
/// Duplicates are kept until [`DependencyList::unique`] is called.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct DependencyList(Vec<String>);

impl DependencyList {
	pub fn new() -> Self {
		Self::default()
	}

	/// The distinct paths, each at the position it was first discovered.
	pub fn unique(&self) -> Vec<&str> {
		let mut seen = HashSet::new();
		self.0
			.iter()
			.map(String::as_str)
			.filter(|path| seen.insert(*path))
			.collect()
	}
}

impl<S: Into<String>> FromIterator<S> for DependencyList {
	fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
		Self(iter.into_iter().map(Into::into).collect())
	}
}

/// Walks a template AST, records every file it depends on and rewrites each
/// dependency path to its content identifier.
pub struct DependencyWalker<'a> {
	document: &'a Value,
	namespaces: &'a NamespaceTable,
	hasher: &'a dyn ContentHasher,
	template_dir: &'a Path,
	dependencies: DependencyList,
}

impl<'a> DependencyWalker<'a> {
	/// `template_dir` is the directory of the template being compiled;
	/// relative dependency paths resolve against it.
	pub fn new(
		document: &'a Value,
		namespaces: &'a NamespaceTable,
		hasher: &'a dyn ContentHasher,
		template_dir: &'a Path,
	) -> Self {
		Self {
			document,
			namespaces,
			hasher,
			template_dir,
			dependencies: DependencyList::new(),
		}
	}

	/// Visit `tokens` in document order and return the dependencies found.
	/// Dynamic include stacks are collapsed into a single string literal and
	/// every recorded path is replaced by its content identifier in place.
	pub fn walk(mut self, tokens: &mut [Token]) -> TwigpackResult<DependencyList> {
		let cursor = DataCursor::new(self.document.clone());
		self.walk_tokens(tokens, &cursor)?;

		Ok(self.dependencies)
	}

	fn walk_tokens(&mut self, tokens: &mut [Token], cursor: &DataCursor) -> TwigpackResult<()> {
		for token in tokens {
			self.visit(token, cursor)?;
		}

		Ok(())
	}

	fn visit(&mut self, token: &mut Token, cursor: &DataCursor) -> TwigpackResult<()> {
		let Some(logic) = token.logic_mut() else {
			return Ok(());
		};

		tracing::trace!(kind = %logic.r#type, "visiting logic token");

		match logic.r#type {
			LogicType::For => {
				let expressions = logic.expression_stack()?;
				let data = evaluate::point(&expressions, self.document, cursor)?;
				let mut body = cursor.descend(data);

				if let Some(name) = logic.value_var() {
					if let Some(first) = body.first_element().cloned() {
						body = body.bind(name, first);
					}
				}

				self.walk_tokens(logic.children_mut(), &body)
			}
			LogicType::Block
			| LogicType::If
			| LogicType::ElseIf
			| LogicType::Else
			| LogicType::Spaceless
			| LogicType::SetCapture
			| LogicType::Macro => self.walk_tokens(logic.children_mut(), cursor),
			LogicType::Extends | LogicType::Include => self.resolve_include(logic, cursor),
			LogicType::Embed => {
				self.walk_tokens(logic.children_mut(), cursor)?;
				self.resolve_static(logic.stack.as_deref_mut().unwrap_or_default())
			}
			LogicType::Import | LogicType::From => {
				if logic.expression_str() == Some(SELF_REFERENCE) {
					return Ok(());
				}

				self.resolve_static(logic.stack.as_deref_mut().unwrap_or_default())
			}
			LogicType::Other(_) => Ok(()),
		}
	}

	fn resolve_include(&mut self, logic: &mut LogicToken, cursor: &DataCursor) -> TwigpackResult<()> {
		let Some(stack) = logic.stack.as_mut() else {
			return Err(TwigpackError::malformed(&logic.r#type, "stack"));
		};

		if stack.iter().all(ExpressionToken::is_string) {
			return self.resolve_static(stack);
		}

		let path = evaluate::fold(stack, cursor)?;
		tracing::debug!(%path, "resolved dynamic include");
		*stack = vec![ExpressionToken::string(path)];

		self.resolve_static(stack)
	}

	/// Record each literal in `stack` as a dependency. Non-literal entries
	/// are left untouched.
	fn resolve_static(&mut self, stack: &mut [ExpressionToken]) -> TwigpackResult<()> {
		for token in stack {
			let Expression::Literal(path) = token.classify()? else {
				tracing::debug!(kind = %token.r#type, "skipping non-literal dependency path");
				continue;
			};

			let dependency = self.namespaces.resolve(path);
			let id = self
				.hasher
				.content_id(&resolve_path(self.template_dir, &dependency));
			tracing::debug!(%dependency, %id, "recorded dependency");

			self.dependencies.push(dependency);
			token.set_value(id);
		}

		Ok(())
	}
}
