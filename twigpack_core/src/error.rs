use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TwigpackError {
	#[error(transparent)]
	#[diagnostic(code(twigpack::io_error))]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	#[diagnostic(code(twigpack::json))]
	Json(#[from] serde_json::Error),

	#[error("failed to parse loader options: {0}")]
	#[diagnostic(
		code(twigpack::config_parse),
		help("loader options must contain an optional `twigOptions` table with a `namespaces` map")
	)]
	ConfigParse(String),

	#[error("unsupported loader options format: `{0}`")]
	#[diagnostic(
		code(twigpack::unsupported_format),
		help("supported formats: json, yaml, yml, toml")
	)]
	UnsupportedConfigFormat(String),

	#[error("failed to deserialize template AST: {0}")]
	#[diagnostic(
		code(twigpack::malformed_ast),
		help("the AST must be a JSON array of tokens, each with a `type` field")
	)]
	MalformedAst(String),

	#[error("`{kind}` token is missing required field `{field}`")]
	#[diagnostic(code(twigpack::malformed_token))]
	MalformedToken { kind: String, field: String },

	#[error("dynamic path `{expression}` could not be resolved: {reason}")]
	#[diagnostic(
		code(twigpack::unresolvable_dynamic_path),
		help("check that the sibling `.yml` data file defines every variable used in the path")
	)]
	UnresolvableDynamicPath { expression: String, reason: String },

	#[error("no template registered for id `{0}`")]
	#[diagnostic(
		code(twigpack::unknown_template),
		help("register the template path with `TemplateCompiler::register` before compiling")
	)]
	UnknownTemplate(String),

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(twigpack::symlink_cycle),
		help("remove the circular symlink from the namespace directory")
	)]
	SymlinkCycle { path: String },
}

impl TwigpackError {
	pub(crate) fn malformed(kind: impl ToString, field: &str) -> Self {
		Self::MalformedToken {
			kind: kind.to_string(),
			field: field.to_string(),
		}
	}
}

pub type TwigpackResult<T> = Result<T, TwigpackError>;
