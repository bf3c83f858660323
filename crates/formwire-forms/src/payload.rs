//! Submission payloads

use formwire_core::FieldValue;
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;

/// Name to value map sent with a submission, in insertion order.
///
/// Values pushed under an existing name turn it into a list, which is how
/// grouped checkboxes and multi-selects submit several values.
///
/// ```
/// use formwire_forms::Payload;
///
/// let mut payload = Payload::new();
/// payload.push("tags", "red");
/// payload.push("tags", "blue");
/// payload.push("name", "Widget");
///
/// assert_eq!(
///     payload.to_pairs(),
///     vec![
///         ("tags[]".to_string(), "red".to_string()),
///         ("tags[]".to_string(), "blue".to_string()),
///         ("name".to_string(), "Widget".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payload(IndexMap<String, FieldValue>);

impl Payload {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `name`, replacing any earlier value.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
		self.0.insert(name.into(), value.into());
	}

	/// Adds a value under `name`, turning repeated names into lists.
	pub fn push(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
		match self.0.entry(name.into()) {
			Entry::Occupied(mut slot) => slot.get_mut().push(value.into()),
			Entry::Vacant(slot) => {
				slot.insert(value.into());
			}
		}
	}

	/// Prepends `name` (used for the anti-forgery field).
	pub fn prepend(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
		self.0.shift_insert(0, name.into(), value.into());
	}

	pub fn get(&self, name: &str) -> Option<&FieldValue> {
		self.0.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Flattens to form-encoding pairs. Lists repeat their name with a `[]`
	/// suffix; booleans become `1`/`0`; null becomes an empty string.
	pub fn to_pairs(&self) -> Vec<(String, String)> {
		let mut pairs = Vec::with_capacity(self.0.len());
		for (name, value) in &self.0 {
			match value {
				FieldValue::List(items) => {
					let key = format!("{name}[]");
					pairs.extend(items.iter().map(|item| (key.clone(), item.as_text().into_owned())));
				}
				other => pairs.push((name.clone(), other.as_text().into_owned())),
			}
		}
		pairs
	}

	/// The payload as a JSON object.
	pub fn to_json(&self) -> serde_json::Value {
		serde_json::Value::Object(
			self.0
				.iter()
				.map(|(k, v)| (k.clone(), v.to_json()))
				.collect(),
		)
	}
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Payload {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut payload = Self::new();
		for (k, v) in iter {
			payload.insert(k, v);
		}
		payload
	}
}
