//! Values carried by form inputs

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// The current value of a form input.
///
/// Text inputs hold [`FieldValue::Text`], checkbox-likes hold
/// [`FieldValue::Bool`] when unchecked, and grouped inputs that share a name
/// are collected into [`FieldValue::List`] when a payload is assembled.
///
/// # Examples
///
/// ```
/// use formwire_core::FieldValue;
///
/// assert!(FieldValue::from("").is_empty());
/// assert!(FieldValue::from(false).is_empty());
/// assert!(!FieldValue::from("x").is_empty());
/// assert_eq!(FieldValue::from("héllo").char_len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
	#[default]
	Null,
	Bool(bool),
	Number(serde_json::Number),
	Text(String),
	List(Vec<FieldValue>),
}

impl FieldValue {
	/// Creates an empty text value.
	pub fn empty() -> Self {
		Self::Text(String::new())
	}

	/// Returns `true` when the value counts as "not filled in".
	///
	/// Null, the empty string, `false` and the empty list are empty.
	/// Numbers are never empty, including zero.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Null => true,
			Self::Bool(b) => !b,
			Self::Number(_) => false,
			Self::Text(s) => s.is_empty(),
			Self::List(items) => items.is_empty(),
		}
	}

	/// Text representation used for comparisons and wire encoding.
	///
	/// Booleans render as `1`/`0`, matching how checkbox values are submitted.
	pub fn as_text(&self) -> Cow<'_, str> {
		match self {
			Self::Null => Cow::Borrowed(""),
			Self::Bool(true) => Cow::Borrowed("1"),
			Self::Bool(false) => Cow::Borrowed("0"),
			Self::Number(n) => Cow::Owned(n.to_string()),
			Self::Text(s) => Cow::Borrowed(s.as_str()),
			Self::List(items) => Cow::Owned(
				items
					.iter()
					.map(|item| item.as_text().into_owned())
					.collect::<Vec<_>>()
					.join(","),
			),
		}
	}

	/// Length used by the `min`/`max` rules: item count for lists,
	/// character count otherwise.
	pub fn char_len(&self) -> usize {
		match self {
			Self::List(items) => items.len(),
			Self::Null => 0,
			other => other.as_text().chars().count(),
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Text(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	/// Converts into a JSON value.
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			Self::Null => serde_json::Value::Null,
			Self::Bool(b) => serde_json::Value::Bool(*b),
			Self::Number(n) => serde_json::Value::Number(n.clone()),
			Self::Text(s) => serde_json::Value::String(s.clone()),
			Self::List(items) => {
				serde_json::Value::Array(items.iter().map(FieldValue::to_json).collect())
			}
		}
	}

	/// Converts from a JSON value. Objects are kept as their JSON text.
	pub fn from_json(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(b) => Self::Bool(b),
			serde_json::Value::Number(n) => Self::Number(n),
			serde_json::Value::String(s) => Self::Text(s),
			serde_json::Value::Array(items) => {
				Self::List(items.into_iter().map(FieldValue::from_json).collect())
			}
			object @ serde_json::Value::Object(_) => Self::Text(object.to_string()),
		}
	}

	/// Appends `other` to this value, turning it into a list first if needed.
	///
	/// Used to collect inputs that share a name into an ordered list.
	pub fn push(&mut self, other: FieldValue) {
		match self {
			Self::List(items) => items.push(other),
			_ => {
				let first = std::mem::take(self);
				*self = Self::List(vec![first, other]);
			}
		}
	}
}

impl fmt::Display for FieldValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.as_text())
	}
}

impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for FieldValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<bool> for FieldValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for FieldValue {
	fn from(value: i64) -> Self {
		Self::Number(value.into())
	}
}

impl From<u64> for FieldValue {
	fn from(value: u64) -> Self {
		Self::Number(value.into())
	}
}

impl From<i32> for FieldValue {
	fn from(value: i32) -> Self {
		Self::Number(value.into())
	}
}

impl From<f64> for FieldValue {
	fn from(value: f64) -> Self {
		serde_json::Number::from_f64(value)
			.map(Self::Number)
			.unwrap_or(Self::Null)
	}
}

impl From<Vec<FieldValue>> for FieldValue {
	fn from(value: Vec<FieldValue>) -> Self {
		Self::List(value)
	}
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(Self::Null)
	}
}

impl From<serde_json::Value> for FieldValue {
	fn from(value: serde_json::Value) -> Self {
		Self::from_json(value)
	}
}
