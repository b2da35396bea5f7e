//! Partial evaluation of template path expressions against the auxiliary
//! data document.
//!
//! Two modes share the same primitives:
//!
//! - [`point`] follows variable, key and slice accesses to re-seed the
//!   [`DataCursor`] for a loop body.
//! - [`fold`] reduces a string concatenation chain to a single literal path
//!   for a dynamic include.

use serde_json::Map;
use serde_json::Value;

use crate::Expression;
use crate::ExpressionToken;
use crate::TwigpackError;
use crate::TwigpackResult;

/// The slice of auxiliary data visible to a construct, plus the loop
/// bindings in scope.
///
/// A cursor is never mutated once handed to a child construct. Each `for`
/// derives a new cursor for its own body, so siblings and parents keep
/// seeing the cursor they started with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataCursor {
	value: Value,
	bindings: Map<String, Value>,
}

impl DataCursor {
	pub fn new(value: Value) -> Self {
		Self {
			value,
			bindings: Map::new(),
		}
	}

	pub fn value(&self) -> &Value {
		&self.value
	}

	pub fn binding(&self, name: &str) -> Option<&Value> {
		self.bindings.get(name)
	}

	/// Look `name` up in the loop bindings first, then in the cursor value.
	pub fn lookup(&self, name: &str) -> Option<&Value> {
		self.bindings
			.get(name)
			.or_else(|| property(&self.value, name))
	}

	/// The element a loop binds on its first iteration, if the cursor holds
	/// an indexable collection.
	pub fn first_element(&self) -> Option<&Value> {
		property(&self.value, "0")
	}

	/// Derive a cursor for a loop body: `value` becomes the new data, while
	/// the enclosing bindings stay visible.
	pub fn descend(&self, value: Value) -> Self {
		Self {
			value,
			bindings: self.bindings.clone(),
		}
	}

	pub fn bind(mut self, name: impl Into<String>, value: Value) -> Self {
		self.bindings.insert(name.into(), value);
		self
	}
}

/// Evaluate a loop source expression to the data it iterates.
///
/// Starts from `document`. A variable re-points to the document entry of
/// that name (falling back to an enclosing loop binding), a key access
/// descends into the current value, and a slice narrows it. Anything that
/// does not apply leaves the current value untouched.
pub fn point(
	expressions: &[ExpressionToken],
	document: &Value,
	scope: &DataCursor,
) -> TwigpackResult<Value> {
	let mut current = document.clone();

	for token in expressions {
		match token.classify()? {
			Expression::VariableRef(name) => {
				if let Some(found) = property(document, name).or_else(|| scope.binding(name)) {
					current = found.clone();
				}
			}
			Expression::KeyAccess(key) => {
				if let Some(found) = property(&current, key).cloned() {
					current = found;
				}
			}
			Expression::Slice { start, end } => {
				if let Some(sliced) = slice(&current, start, end) {
					current = sliced;
				}
			}
			_ => {}
		}
	}

	Ok(current)
}

/// Reduce a concatenation chain to the path it denotes.
///
/// Literals and scalar key reads fill a `left`, then `right` operand; each
/// `~` appends the pending operands to the result. A variable selects the
/// value that subsequent key accesses read from, and non-scalar key reads
/// descend into it. Operands still pending after the last token are
/// appended as well.
pub fn fold(expressions: &[ExpressionToken], cursor: &DataCursor) -> TwigpackResult<String> {
	let mut accumulator = Accumulator::default();
	let mut variable_name = None;

	for token in expressions {
		match token.classify()? {
			Expression::Literal(text) => accumulator.fill(Value::String(text.to_string())),
			Expression::VariableRef(name) => {
				variable_name = Some(name);
				accumulator.variable = cursor.lookup(name).cloned();
			}
			Expression::KeyAccess(key) => {
				let variable = match &accumulator.variable {
					Some(variable @ (Value::Object(_) | Value::Array(_))) => variable,
					Some(other) => {
						let name = variable_name.unwrap_or_default();
						let reason = format!("`{name}` is {}, not an object", kind_of(other));
						return Err(unresolvable(expressions, reason));
					}
					None => {
						let reason = match variable_name {
							Some(name) => format!("`{name}` is not defined"),
							None => format!("`.{key}` is not applied to a variable"),
						};
						return Err(unresolvable(expressions, reason));
					}
				};

				match property(variable, key).cloned() {
					Some(value) if is_scalar(&value) => accumulator.fill(value),
					Some(value) => accumulator.variable = Some(value),
					None => tracing::debug!(key, "key not found while folding dynamic path"),
				}
			}
			Expression::Concat => accumulator.flush(),
			Expression::Slice { .. } | Expression::Unsupported(_) => {}
		}
	}

	accumulator.flush();

	if accumulator.parsed.is_empty() {
		return Err(unresolvable(expressions, "the path folded to an empty string"));
	}

	Ok(accumulator.parsed)
}

#[derive(Debug, Default)]
struct Accumulator {
	left: Option<Value>,
	right: Option<Value>,
	variable: Option<Value>,
	parsed: String,
}

impl Accumulator {
	fn fill(&mut self, value: Value) {
		if self.left.as_ref().is_some_and(is_truthy) {
			self.right = Some(value);
		} else {
			self.left = Some(value);
		}
	}

	fn flush(&mut self) {
		if let Some(left) = self.left.take().filter(is_truthy) {
			self.parsed.push_str(&scalar_text(&left));

			if let Some(right) = self.right.take().filter(is_truthy) {
				self.parsed.push_str(&scalar_text(&right));
			}
		}

		self.right = None;
		self.variable = None;
	}
}

/// Read `key` from an object, or a numeric index from an array.
fn property<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
	match value {
		Value::Object(map) => map.get(key),
		Value::Array(items) => key.parse::<usize>().ok().and_then(|index| items.get(index)),
		_ => None,
	}
}

fn kind_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

fn is_scalar(value: &Value) -> bool {
	matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(flag) => *flag,
		Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
		Value::String(text) => !text.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}

fn scalar_text(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}

/// Sub-range of an array or string with negative indices counting from the
/// end and bounds clamped to the length.
fn slice(value: &Value, start: Option<i64>, end: Option<i64>) -> Option<Value> {
	match value {
		Value::Array(items) => {
			let (start, end) = slice_bounds(items.len(), start, end);
			Some(Value::Array(items[start..end].to_vec()))
		}
		Value::String(text) => {
			let chars: Vec<char> = text.chars().collect();
			let (start, end) = slice_bounds(chars.len(), start, end);
			Some(Value::String(chars[start..end].iter().collect()))
		}
		_ => None,
	}
}

fn slice_bounds(len: usize, start: Option<i64>, end: Option<i64>) -> (usize, usize) {
	let len = i64::try_from(len).unwrap_or(i64::MAX);
	let clamp = |index: i64| {
		let index = if index < 0 { len + index } else { index };
		usize::try_from(index.clamp(0, len)).unwrap_or(0)
	};

	let start = clamp(start.unwrap_or(0));
	let end = clamp(end.unwrap_or(len));

	(start, end.max(start))
}

fn unresolvable(expressions: &[ExpressionToken], reason: impl Into<String>) -> TwigpackError {
	TwigpackError::UnresolvableDynamicPath {
		expression: describe(expressions),
		reason: reason.into(),
	}
}

/// Render an expression stack in its postfix order for error messages.
fn describe(expressions: &[ExpressionToken]) -> String {
	expressions
		.iter()
		.map(|token| {
			match token.classify() {
				Ok(Expression::Literal(text)) => format!("{text:?}"),
				Ok(Expression::VariableRef(name)) => name.to_string(),
				Ok(Expression::KeyAccess(key)) => format!(".{key}"),
				Ok(Expression::Slice { .. }) => "[:]".to_string(),
				Ok(Expression::Concat) => "~".to_string(),
				Ok(Expression::Unsupported(kind)) => kind.to_string(),
				Err(_) => token.r#type.to_string(),
			}
		})
		.collect::<Vec<_>>()
		.join(" ")
}
