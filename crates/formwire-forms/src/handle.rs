//! Handles to registered fields

use crate::error::SubmitError;
use crate::field::{FieldError, FieldId, FieldKind, FieldState};
use crate::form::{FormController, SubmitOutcome};
use formwire_core::FieldValue;
use indexmap::IndexMap;

/// A field registered with a [`FormController`].
///
/// Dropping the handle deregisters the field. Once the field is gone,
/// whether dropped or destroyed with its form, mutators do nothing and
/// getters return empty values.
#[derive(Debug)]
pub struct FieldHandle {
	form: FormController,
	id: FieldId,
}

impl FieldHandle {
	pub(crate) fn new(form: FormController, id: FieldId) -> Self {
		Self { form, id }
	}

	pub fn id(&self) -> FieldId {
		self.id
	}

	pub fn form(&self) -> &FormController {
		&self.form
	}

	pub fn is_registered(&self) -> bool {
		self.form.with_field(self.id, |_| ()).is_some()
	}

	pub fn name(&self) -> String {
		self.form
			.with_field(self.id, |f| f.name().to_string())
			.unwrap_or_default()
	}

	pub fn value(&self) -> FieldValue {
		self.form
			.with_field(self.id, |f| f.value().clone())
			.unwrap_or_default()
	}

	pub fn kind(&self) -> Option<FieldKind> {
		self.form.with_field(self.id, |f| f.kind().clone())
	}

	/// Sets the value as if the user had typed it.
	pub fn set_value(&self, value: impl Into<FieldValue>) {
		self.form.set_value(self.id, value.into());
	}

	/// Checks or unchecks a checkbox. Text fields ignore this.
	pub fn set_checked(&self, checked: bool) {
		match self.form.with_field(self.id, |f| f.checkbox_value(checked)) {
			Some(Some(value)) => self.form.set_value(self.id, value),
			Some(None) => tracing::debug!(field = %self.name(), "set_checked on a text field, ignored"),
			None => {}
		}
	}

	pub fn toggle(&self) {
		self.set_checked(!self.is_checked());
	}

	pub fn is_checked(&self) -> bool {
		self.form.with_field(self.id, |f| f.is_checked()).unwrap_or(false)
	}

	/// Marks the field as having focus. An active field is validated even
	/// when emptied.
	pub fn activate(&self) {
		self.form.set_active(self.id, true);
	}

	pub fn deactivate(&self) {
		self.form.set_active(self.id, false);
	}

	pub fn is_active(&self) -> bool {
		self.form.with_field(self.id, |f| f.is_active()).unwrap_or(false)
	}

	/// Restores the initial value. Visible errors disappear; a failing
	/// presence rule keeps blocking submission.
	pub fn reset(&self) {
		self.form.restore(self.id, true);
	}

	/// Empties the value, with the same effect on errors as [`reset`](Self::reset).
	pub fn clear(&self) {
		self.form.restore(self.id, false);
	}

	/// Clears the field, lets pending validation finish and submits the form.
	pub async fn clear_and_submit(&self) -> Result<SubmitOutcome, SubmitError> {
		self.clear();
		self.form.settle().await;
		self.form.submit().await
	}

	/// Messages to display, in rule order.
	pub fn errors(&self) -> Vec<String> {
		self.form
			.with_field(self.id, |f| f.visible_errors())
			.unwrap_or_default()
	}

	pub fn first_error(&self) -> Option<String> {
		self.errors().into_iter().next()
	}

	/// Every validity entry, hidden ones included, keyed by rule.
	pub fn validity(&self) -> IndexMap<String, FieldError> {
		self.form
			.with_field(self.id, |f| f.validity().clone())
			.unwrap_or_default()
	}

	pub fn is_valid(&self) -> bool {
		self.form.with_field(self.id, |f| f.is_valid()).unwrap_or(true)
	}

	pub fn state(&self) -> Option<FieldState> {
		self.form.with_field(self.id, |f| f.state())
	}

	pub fn is_dirty(&self) -> bool {
		self.form.with_field(self.id, |f| f.is_dirty()).unwrap_or(false)
	}

	pub fn is_required(&self) -> bool {
		self.form.with_field(self.id, |f| f.is_required()).unwrap_or(false)
	}

	/// The localized label, `" *"`-suffixed when the field is required.
	pub fn label(&self) -> String {
		self.form.label(self.id).unwrap_or_default()
	}
}

impl Drop for FieldHandle {
	fn drop(&mut self) {
		self.form.deregister(self.id);
	}
}
