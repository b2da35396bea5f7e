//! Typed view over the JSON token tree produced by the Twig parser.
//!
//! Only the fields that influence dependency discovery are modelled
//! explicitly. Every other field is kept in a flattened map so a processed
//! AST serializes back to the same shape the renderer expects.

use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::TwigpackError;
use crate::TwigpackResult;

const LOGIC_PREFIX: &str = "Twig.logic.type.";
const EXPRESSION_PREFIX: &str = "Twig.expression.type.";

/// The string concatenation operator.
pub const CONCAT_OPERATOR: &str = "~";
/// Associativity marker carried by binary operator tokens.
pub const LEFT_TO_RIGHT: &str = "leftToRight";
/// Namespace expression used by `import`/`from` to refer to the current
/// template.
pub const SELF_REFERENCE: &str = "_self";

/// A node of the parsed template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
	pub r#type: TokenType,
	/// Present on logic nodes only.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token: Option<LogicToken>,
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

impl Token {
	/// Returns the logic payload when this is a logic node.
	pub fn logic_mut(&mut self) -> Option<&mut LogicToken> {
		match self.r#type {
			TokenType::Logic => self.token.as_mut(),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TokenType {
	Logic,
	Raw,
	Output,
	Other(String),
}

impl TokenType {
	pub fn name(&self) -> &str {
		match self {
			Self::Logic => "logic",
			Self::Raw => "raw",
			Self::Output => "output",
			Self::Other(name) => name,
		}
	}
}

impl From<String> for TokenType {
	fn from(value: String) -> Self {
		match value.as_str() {
			"logic" => Self::Logic,
			"raw" => Self::Raw,
			"output" => Self::Output,
			_ => Self::Other(value),
		}
	}
}

impl From<TokenType> for String {
	fn from(value: TokenType) -> Self {
		match value {
			TokenType::Other(name) => name,
			known => known.name().to_string(),
		}
	}
}

/// The control construct carried by a logic node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicToken {
	pub r#type: LogicType,
	/// Child tokens of block-like constructs.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub output: Option<Vec<Token>>,
	/// Expression stack of the construct's path (or condition).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stack: Option<Vec<ExpressionToken>>,
	/// An expression stack for `for`, the raw namespace expression for
	/// `import` and `from`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expression: Option<Value>,
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

impl LogicToken {
	/// The loop's value binding, e.g. `item` in `{% for item in items %}`.
	pub fn value_var(&self) -> Option<&str> {
		self.fields.get("valueVar").and_then(Value::as_str)
	}

	/// The raw expression string of `import` and `from` constructs.
	pub fn expression_str(&self) -> Option<&str> {
		self.expression.as_ref().and_then(Value::as_str)
	}

	/// Decode the expression stack of a `for` construct. A missing
	/// expression is an empty stack.
	pub fn expression_stack(&self) -> TwigpackResult<Vec<ExpressionToken>> {
		match &self.expression {
			None | Some(Value::Null) => Ok(Vec::new()),
			Some(value @ Value::Array(_)) => {
				serde_json::from_value(value.clone())
					.map_err(|e| TwigpackError::MalformedAst(e.to_string()))
			}
			Some(_) => Err(TwigpackError::malformed(&self.r#type, "expression")),
		}
	}

	pub fn children_mut(&mut self) -> &mut [Token] {
		self.output.as_deref_mut().unwrap_or_default()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogicType {
	For,
	Block,
	If,
	ElseIf,
	Else,
	Spaceless,
	SetCapture,
	Macro,
	Extends,
	Include,
	Embed,
	Import,
	From,
	Other(String),
}

impl LogicType {
	pub fn name(&self) -> &str {
		match self {
			Self::For => "Twig.logic.type.for",
			Self::Block => "Twig.logic.type.block",
			Self::If => "Twig.logic.type.if",
			Self::ElseIf => "Twig.logic.type.elseif",
			Self::Else => "Twig.logic.type.else",
			Self::Spaceless => "Twig.logic.type.spaceless",
			Self::SetCapture => "Twig.logic.type.setcapture",
			Self::Macro => "Twig.logic.type.macro",
			Self::Extends => "Twig.logic.type.extends",
			Self::Include => "Twig.logic.type.include",
			Self::Embed => "Twig.logic.type.embed",
			Self::Import => "Twig.logic.type.import",
			Self::From => "Twig.logic.type.from",
			Self::Other(name) => name,
		}
	}
}

impl From<String> for LogicType {
	fn from(value: String) -> Self {
		let known = match value.strip_prefix(LOGIC_PREFIX) {
			Some("for") => Some(Self::For),
			Some("block") => Some(Self::Block),
			Some("if") => Some(Self::If),
			Some("elseif") => Some(Self::ElseIf),
			Some("else") => Some(Self::Else),
			Some("spaceless") => Some(Self::Spaceless),
			Some("setcapture") => Some(Self::SetCapture),
			Some("macro") => Some(Self::Macro),
			Some("extends") => Some(Self::Extends),
			Some("include") => Some(Self::Include),
			Some("embed") => Some(Self::Embed),
			Some("import") => Some(Self::Import),
			Some("from") => Some(Self::From),
			_ => None,
		};

		known.unwrap_or(Self::Other(value))
	}
}

impl From<LogicType> for String {
	fn from(value: LogicType) -> Self {
		match value {
			LogicType::Other(name) => name,
			known => known.name().to_string(),
		}
	}
}

impl Display for LogicType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}

/// A value-producing node inside an expression stack. Stacks are in
/// postfix order, so `"a/" ~ b.c` arrives as `["a/", b, .c, ~]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionToken {
	pub r#type: ExpressionType,
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

impl ExpressionToken {
	/// A synthetic string literal token.
	pub fn string(value: impl Into<String>) -> Self {
		let mut fields = Map::new();
		fields.insert("value".to_string(), Value::String(value.into()));

		Self {
			r#type: ExpressionType::StringLiteral,
			fields,
		}
	}

	pub fn is_string(&self) -> bool {
		self.r#type == ExpressionType::StringLiteral
	}

	pub fn value(&self) -> Option<&Value> {
		self.fields.get("value")
	}

	pub fn set_value(&mut self, value: impl Into<Value>) {
		self.fields.insert("value".to_string(), value.into());
	}

	fn str_field(&self, field: &str) -> TwigpackResult<&str> {
		self.fields
			.get(field)
			.and_then(Value::as_str)
			.ok_or_else(|| TwigpackError::malformed(&self.r#type, field))
	}

	/// Map this token onto the reduced vocabulary understood by the path
	/// evaluator.
	pub fn classify(&self) -> TwigpackResult<Expression<'_>> {
		let expression = match &self.r#type {
			ExpressionType::StringLiteral => Expression::Literal(self.str_field("value")?),
			ExpressionType::Variable => Expression::VariableRef(self.str_field("value")?),
			ExpressionType::KeyPeriod => Expression::KeyAccess(self.str_field("key")?),
			ExpressionType::Slice => {
				let params = self
					.fields
					.get("params")
					.and_then(Value::as_array)
					.ok_or_else(|| TwigpackError::malformed(&self.r#type, "params"))?;
				Expression::Slice {
					start: params.first().and_then(slice_bound),
					end: params.get(1).and_then(slice_bound),
				}
			}
			ExpressionType::BinaryOperator => {
				let operator = self.fields.get("operator").and_then(Value::as_str);
				let associativity = self.fields.get("associativity").and_then(Value::as_str);
				if operator == Some(CONCAT_OPERATOR) && associativity == Some(LEFT_TO_RIGHT) {
					Expression::Concat
				} else {
					Expression::Unsupported(&self.r#type)
				}
			}
			ExpressionType::Other(_) => Expression::Unsupported(&self.r#type),
		};

		Ok(expression)
	}
}

fn slice_bound(value: &Value) -> Option<i64> {
	match value {
		Value::Number(number) => {
			number.as_i64().or_else(|| {
				number
					.as_f64()
					.filter(|bound| bound.is_finite())
					.map(|bound| bound.trunc() as i64)
			})
		}
		Value::String(text) => text.trim().parse().ok(),
		_ => None,
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExpressionType {
	StringLiteral,
	Variable,
	KeyPeriod,
	Slice,
	BinaryOperator,
	Other(String),
}

impl ExpressionType {
	pub fn name(&self) -> &str {
		match self {
			Self::StringLiteral => "Twig.expression.type.string",
			Self::Variable => "Twig.expression.type.variable",
			Self::KeyPeriod => "Twig.expression.type.key.period",
			Self::Slice => "Twig.expression.type.slice",
			Self::BinaryOperator => "Twig.expression.type.operator.binary",
			Self::Other(name) => name,
		}
	}
}

impl From<String> for ExpressionType {
	fn from(value: String) -> Self {
		let known = match value.strip_prefix(EXPRESSION_PREFIX) {
			Some("string") => Some(Self::StringLiteral),
			Some("variable") => Some(Self::Variable),
			Some("key.period") => Some(Self::KeyPeriod),
			Some("slice") => Some(Self::Slice),
			Some("operator.binary") => Some(Self::BinaryOperator),
			_ => None,
		};

		known.unwrap_or(Self::Other(value))
	}
}

impl From<ExpressionType> for String {
	fn from(value: ExpressionType) -> Self {
		match value {
			ExpressionType::Other(name) => name,
			known => known.name().to_string(),
		}
	}
}

impl Display for ExpressionType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}

/// The closed set of expression forms a dependency path may be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expression<'a> {
	/// `"cards/"`
	Literal(&'a str),
	/// `card`
	VariableRef(&'a str),
	/// `.type`
	KeyAccess(&'a str),
	/// `[start:end]`
	Slice {
		start: Option<i64>,
		end: Option<i64>,
	},
	/// `~`
	Concat,
	/// Any other expression. Contributes nothing to a path.
	Unsupported(&'a ExpressionType),
}
