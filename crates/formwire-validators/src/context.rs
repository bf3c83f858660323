//! Access to sibling field values during evaluation

use chrono::NaiveDateTime;
use formwire_core::FieldValue;
use std::collections::HashMap;

/// Read access to the other fields of the owning form.
///
/// Returning `None` means the field is not part of the form. Rules that
/// reference an absent field never fail.
pub trait FieldLookup {
	fn field_value(&self, name: &str) -> Option<FieldValue>;

	/// Local wall-clock time used for `now`, `today` and friends.
	fn local_now(&self) -> NaiveDateTime {
		chrono::Local::now().naive_local()
	}
}

/// A lookup with no other fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFields;

impl FieldLookup for NoFields {
	fn field_value(&self, _name: &str) -> Option<FieldValue> {
		None
	}
}

impl FieldLookup for HashMap<String, FieldValue> {
	fn field_value(&self, name: &str) -> Option<FieldValue> {
		self.get(name).cloned()
	}
}

/// A map-backed lookup with a pinned clock.
///
/// ```
/// use formwire_validators::{FieldLookup, MapContext};
///
/// let ctx = MapContext::new().with_value("password", "secret");
/// assert_eq!(ctx.field_value("password").unwrap().as_str(), Some("secret"));
/// assert!(ctx.field_value("missing").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapContext {
	values: HashMap<String, FieldValue>,
	now: Option<NaiveDateTime>,
}

impl MapContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_value(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
		self.values.insert(name.into(), value.into());
		self
	}

	pub fn with_now(mut self, now: NaiveDateTime) -> Self {
		self.now = Some(now);
		self
	}

	pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
		self.values.insert(name.into(), value.into());
	}
}

impl FieldLookup for MapContext {
	fn field_value(&self, name: &str) -> Option<FieldValue> {
		self.values.get(name).cloned()
	}

	fn local_now(&self) -> NaiveDateTime {
		self.now
			.unwrap_or_else(|| chrono::Local::now().naive_local())
	}
}
