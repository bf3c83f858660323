//! Message catalog for storing translations

use crate::CatalogError;
use serde_json::Value;
use std::collections::HashMap;

/// Translations for one locale, keyed by dotted paths.
///
/// Nested JSON bundles are flattened on load: `{"alert": {"default":
/// {"post": {"title": "Saved"}}}}` becomes the key `alert.default.post.title`.
///
/// # Example
/// ```
/// use formwire_i18n::MessageCatalog;
///
/// let catalog = MessageCatalog::from_json(
///     "en",
///     r#"{"confirm": {"default": {"delete": {"accept": "Yes"}}}}"#,
/// )
/// .unwrap();
///
/// assert_eq!(catalog.get("confirm.default.delete.accept"), Some("Yes"));
/// assert_eq!(catalog.get("confirm.default.delete"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
	locale: String,
	messages: HashMap<String, String>,
}

impl MessageCatalog {
	pub fn new(locale: &str) -> Self {
		Self {
			locale: locale.to_string(),
			messages: HashMap::new(),
		}
	}

	/// Parses a nested JSON bundle.
	pub fn from_json(locale: &str, json: &str) -> Result<Self, CatalogError> {
		let value: Value = serde_json::from_str(json).map_err(|source| CatalogError::InvalidJson {
			locale: locale.to_string(),
			source,
		})?;
		Self::from_value(locale, &value)
	}

	/// Flattens an already parsed bundle. The root must be an object.
	pub fn from_value(locale: &str, value: &Value) -> Result<Self, CatalogError> {
		let Value::Object(_) = value else {
			return Err(CatalogError::NotAnObject(locale.to_string()));
		};
		let mut catalog = Self::new(locale);
		flatten("", value, &mut catalog.messages);
		Ok(catalog)
	}

	pub fn locale(&self) -> &str {
		&self.locale
	}

	pub fn add(&mut self, key: impl Into<String>, translation: impl Into<String>) {
		self.messages.insert(key.into(), translation.into());
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.messages.get(key).map(String::as_str)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.messages.contains_key(key)
	}

	/// Copies every entry of `other` over this catalog.
	pub fn merge(&mut self, other: MessageCatalog) {
		self.messages.extend(other.messages);
	}

	pub fn len(&self) -> usize {
		self.messages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.messages.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.messages.keys().map(String::as_str)
	}
}

fn flatten(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
	let join = |key: &str| {
		if prefix.is_empty() {
			key.to_string()
		} else {
			format!("{prefix}.{key}")
		}
	};
	match value {
		Value::Object(map) => {
			for (key, child) in map {
				flatten(&join(key), child, out);
			}
		}
		Value::String(s) => {
			out.insert(prefix.to_string(), s.clone());
		}
		Value::Number(n) => {
			out.insert(prefix.to_string(), n.to_string());
		}
		Value::Bool(b) => {
			out.insert(prefix.to_string(), b.to_string());
		}
		// Arrays and nulls carry no message.
		Value::Array(_) | Value::Null => {}
	}
}
