//! Field Controller
//!
//! A [`Field`] describes an input; once registered with a form it is driven
//! by a [`FieldController`] owned by that form and reached through a
//! [`FieldHandle`](crate::FieldHandle).
//!
//! ```text
//! Pristine --set_value--> Editing --verdicts--> Validated{valid}
//!     ^                      ^                        |
//!     |                      +-------set_value--------+
//!     +---- reset / clear ----> Reset / Cleared
//! ```

use formwire_core::FieldValue;
use formwire_validators::{FieldLookup, Rule, RuleParseError, evaluate};
use indexmap::IndexMap;

/// Validity key of errors attached from a server response.
pub const SERVER_ERROR_KEY: &str = "server";

/// Registration identity of a field within its form. Names may repeat,
/// ids never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub(crate) u64);

/// What kind of input a field is.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
	Text,
	/// Holds `checked_value` when checked and `false` otherwise.
	Checkbox { checked_value: FieldValue },
}

/// Where a field is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
	Pristine,
	Editing,
	Validated { valid: bool },
	Cleared,
	Reset,
}

/// One entry of a field's validity map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
	pub message: String,
	/// Hidden entries block submission without being displayed. Presence
	/// rules on an untouched or cleared field produce them.
	pub visible: bool,
}

/// Declaration of an input.
///
/// ```
/// use formwire_forms::Field;
///
/// let email = Field::new("email").parse_rules("required|email").unwrap();
/// assert!(email.is_required());
///
/// let terms = Field::checkbox("terms").parse_rules("accepted").unwrap();
/// assert!(!terms.is_required());
/// ```
#[derive(Debug, Clone)]
pub struct Field {
	name: String,
	value: FieldValue,
	rules: Vec<Rule>,
	kind: FieldKind,
	lang_key: Option<String>,
}

impl Field {
	/// A text input with an empty initial value.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: FieldValue::empty(),
			rules: Vec::new(),
			kind: FieldKind::Text,
			lang_key: None,
		}
	}

	/// An unchecked checkbox submitting `1` when checked.
	pub fn checkbox(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: FieldValue::Bool(false),
			rules: Vec::new(),
			kind: FieldKind::Checkbox {
				checked_value: FieldValue::from(1),
			},
			lang_key: None,
		}
	}

	/// The initial value, restored by `reset`.
	pub fn with_value(mut self, value: impl Into<FieldValue>) -> Self {
		self.value = normalize(&self.kind, value.into());
		self
	}

	/// Sets the value a checkbox submits when checked. Has no effect on
	/// text fields.
	pub fn with_checked_value(mut self, value: impl Into<FieldValue>) -> Self {
		if let FieldKind::Checkbox { checked_value } = &mut self.kind {
			let was_checked = self.value == *checked_value;
			*checked_value = value.into();
			if was_checked {
				self.value = checked_value.clone();
			}
		}
		self
	}

	/// Starts a checkbox checked.
	pub fn checked(mut self, checked: bool) -> Self {
		if let FieldKind::Checkbox { checked_value } = &self.kind {
			self.value = if checked {
				checked_value.clone()
			} else {
				FieldValue::Bool(false)
			};
		}
		self
	}

	pub fn rule(mut self, rule: impl Into<Rule>) -> Self {
		self.rules.push(rule.into());
		self
	}

	pub fn rules<I: IntoIterator<Item = Rule>>(mut self, rules: I) -> Self {
		self.rules.extend(rules);
		self
	}

	/// Appends the rules of a `required|min:3|email` string.
	pub fn parse_rules(mut self, rules: &str) -> Result<Self, RuleParseError> {
		self.rules.extend(Rule::parse_list(rules)?);
		Ok(self)
	}

	/// Key used for localized labels and messages.
	pub fn lang_key(mut self, key: impl Into<String>) -> Self {
		self.lang_key = Some(key.into());
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn is_required(&self) -> bool {
		self.rules.iter().any(|r| r.kind.is_presence())
	}
}

/// Booleans entered into text fields are stored as `1`/`0`.
fn normalize(kind: &FieldKind, value: FieldValue) -> FieldValue {
	match (kind, value) {
		(FieldKind::Text, FieldValue::Bool(b)) => FieldValue::from(i64::from(b)),
		(_, value) => value,
	}
}

/// State of one registered field.
#[derive(Debug)]
pub(crate) struct FieldController {
	id: FieldId,
	name: String,
	kind: FieldKind,
	lang_key: Option<String>,
	rules: Vec<Rule>,
	/// Validity key per rule: the rule key, suffixed with its position when
	/// a field carries the same rule twice.
	slots: Vec<String>,
	initial: FieldValue,
	value: FieldValue,
	required: bool,
	validity: IndexMap<String, FieldError>,
	dirty: bool,
	active: bool,
	state: FieldState,
	/// Bumped on every value change; verdicts computed for an older
	/// generation are discarded.
	generation: u64,
}

impl FieldController {
	pub(crate) fn new(id: FieldId, field: Field) -> Self {
		let mut slots: Vec<String> = Vec::with_capacity(field.rules.len());
		for (idx, rule) in field.rules.iter().enumerate() {
			let key = rule.key();
			if slots.iter().any(|s| s == key) {
				slots.push(format!("{key}.{idx}"));
			} else {
				slots.push(key.to_string());
			}
		}
		let required = field.is_required();
		Self {
			id,
			name: field.name,
			kind: field.kind,
			lang_key: field.lang_key,
			rules: field.rules,
			slots,
			initial: field.value.clone(),
			value: field.value,
			required,
			validity: IndexMap::new(),
			dirty: false,
			active: false,
			state: FieldState::Pristine,
			generation: 0,
		}
	}

	pub(crate) fn id(&self) -> FieldId {
		self.id
	}

	pub(crate) fn name(&self) -> &str {
		&self.name
	}

	pub(crate) fn kind(&self) -> &FieldKind {
		&self.kind
	}

	pub(crate) fn lang_key(&self) -> Option<&str> {
		self.lang_key.as_deref()
	}

	pub(crate) fn rules(&self) -> &[Rule] {
		&self.rules
	}

	pub(crate) fn value(&self) -> &FieldValue {
		&self.value
	}

	pub(crate) fn generation(&self) -> u64 {
		self.generation
	}

	pub(crate) fn is_required(&self) -> bool {
		self.required
	}

	pub(crate) fn is_dirty(&self) -> bool {
		self.dirty
	}

	pub(crate) fn is_active(&self) -> bool {
		self.active
	}

	pub(crate) fn state(&self) -> FieldState {
		self.state
	}

	pub(crate) fn is_valid(&self) -> bool {
		self.validity.is_empty()
	}

	/// Messages to display, in rule order.
	pub(crate) fn visible_errors(&self) -> Vec<String> {
		self.validity
			.values()
			.filter(|e| e.visible)
			.map(|e| e.message.clone())
			.collect()
	}

	pub(crate) fn validity(&self) -> &IndexMap<String, FieldError> {
		&self.validity
	}

	pub(crate) fn set_active(&mut self, active: bool) {
		self.active = active;
	}

	pub(crate) fn is_checked(&self) -> bool {
		match &self.kind {
			FieldKind::Checkbox { checked_value } => self.value == *checked_value,
			FieldKind::Text => !self.value.is_empty(),
		}
	}

	/// The value `set_checked(checked)` stores.
	pub(crate) fn checkbox_value(&self, checked: bool) -> Option<FieldValue> {
		match &self.kind {
			FieldKind::Checkbox { checked_value } if checked => Some(checked_value.clone()),
			FieldKind::Checkbox { .. } => Some(FieldValue::Bool(false)),
			FieldKind::Text => None,
		}
	}

	/// Stores a user-supplied value. Returns `false` when nothing changed.
	///
	/// A server-attached error does not survive the edit.
	pub(crate) fn set_value(&mut self, value: FieldValue) -> bool {
		let value = normalize(&self.kind, value);
		if value == self.value {
			return false;
		}
		self.value = value;
		self.dirty = self.value != self.initial;
		self.generation += 1;
		self.validity.shift_remove(SERVER_ERROR_KEY);
		self.state = FieldState::Editing;
		true
	}

	/// Records the outcome of rule `slot`: `None` when it passed, the
	/// display message when it failed.
	pub(crate) fn apply(&mut self, slot: usize, failure: Option<String>) {
		let Some(key) = self.slots.get(slot) else {
			return;
		};
		match failure {
			None => {
				self.validity.shift_remove(key);
			}
			Some(message) => {
				self.validity.insert(
					key.clone(),
					FieldError {
						message,
						visible: true,
					},
				);
			}
		}
		self.state = FieldState::Validated {
			valid: self.is_valid(),
		};
	}

	pub(crate) fn attach_server_error(&mut self, message: String) {
		self.validity.insert(
			SERVER_ERROR_KEY.to_string(),
			FieldError {
				message,
				visible: true,
			},
		);
		self.state = FieldState::Validated { valid: false };
	}

	/// Drops every error and re-checks presence rules silently.
	pub(crate) fn quiet(&mut self, ctx: &dyn FieldLookup) {
		self.validity.clear();
		self.hold_presence(ctx);
	}

	/// Restores the initial value without running rules.
	pub(crate) fn reset(&mut self, ctx: &dyn FieldLookup) -> bool {
		let changed = self.value != self.initial;
		self.value = self.initial.clone();
		self.dirty = false;
		self.generation += 1;
		self.quiet(ctx);
		self.state = FieldState::Reset;
		changed
	}

	/// Empties the value without running rules.
	pub(crate) fn clear(&mut self, ctx: &dyn FieldLookup) -> bool {
		let empty = match self.kind {
			FieldKind::Text => FieldValue::empty(),
			FieldKind::Checkbox { .. } => FieldValue::Bool(false),
		};
		let changed = self.value != empty;
		self.value = empty;
		self.dirty = self.value != self.initial;
		self.generation += 1;
		self.quiet(ctx);
		self.state = FieldState::Cleared;
		changed
	}

	/// Adds hidden entries for presence rules the current value fails, so a
	/// required field that has not been touched still blocks submission.
	pub(crate) fn hold_presence(&mut self, ctx: &dyn FieldLookup) {
		for (slot, rule) in self.rules.iter().enumerate() {
			if !rule.kind.is_presence() {
				continue;
			}
			let verdict = evaluate(rule, &self.name, &self.value, ctx).ready();
			if let Some(failure) = verdict.as_ref().and_then(|v| v.failure()) {
				self.validity.insert(
					self.slots[slot].clone(),
					FieldError {
						message: failure.message.clone(),
						visible: false,
					},
				);
			}
		}
	}

	/// Brings the hidden presence entries in line with `ctx` after another
	/// field changed. Visible errors are left as they are. Returns whether
	/// an entry was added or dropped.
	pub(crate) fn recheck_presence(&mut self, ctx: &dyn FieldLookup) -> bool {
		let mut changed = false;
		for (slot, rule) in self.rules.iter().enumerate() {
			if !rule.kind.is_presence() {
				continue;
			}
			let key = &self.slots[slot];
			if self.validity.get(key).is_some_and(|e| e.visible) {
				continue;
			}
			let verdict = evaluate(rule, &self.name, &self.value, ctx).ready();
			match verdict.as_ref().and_then(|v| v.failure()) {
				Some(failure) => {
					if !self.validity.contains_key(key) {
						self.validity.insert(
							key.clone(),
							FieldError {
								message: failure.message.clone(),
								visible: false,
							},
						);
						changed = true;
					}
				}
				None => changed |= self.validity.shift_remove(key).is_some(),
			}
		}
		changed
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use formwire_validators::{MapContext, NoFields};
	use rstest::rstest;

	fn controller(field: Field) -> FieldController {
		FieldController::new(FieldId(1), field)
	}

	#[rstest]
	fn test_duplicate_rules_get_distinct_slots() {
		let c = controller(Field::new("code").rule(Rule::min(2)).rule(Rule::min(4)));

		assert_eq!(c.slots, vec!["min".to_string(), "min.1".to_string()]);
	}

	#[rstest]
	#[case(Field::new("a"), false)]
	#[case(Field::new("a").rule(Rule::email()), false)]
	#[case(Field::new("a").rule(Rule::required_with(["b"])), true)]
	#[case(Field::new("a").rule(Rule::required_if("kind", "company")), true)]
	fn test_required_is_derived_from_rules(#[case] field: Field, #[case] expected: bool) {
		assert_eq!(controller(field).is_required(), expected);
	}

	#[rstest]
	fn test_text_fields_store_booleans_as_numbers() {
		let mut c = controller(Field::new("flag"));

		c.set_value(FieldValue::Bool(true));

		assert_eq!(c.value(), &FieldValue::from(1));
		assert_eq!(Field::new("x").with_value(false).value, FieldValue::from(0));
	}

	#[rstest]
	fn test_set_value_drops_server_error_and_tracks_dirty() {
		let mut c = controller(Field::new("name").with_value("Ann"));
		c.attach_server_error("Taken".to_string());

		assert!(c.set_value("Bob".into()));
		assert!(c.is_dirty());
		assert!(c.is_valid());
		assert_eq!(c.state(), FieldState::Editing);

		assert!(!c.set_value("Bob".into()));
		assert!(c.set_value("Ann".into()));
		assert!(!c.is_dirty());
	}

	#[rstest]
	fn test_apply_keeps_rule_order() {
		let mut c = controller(Field::new("email").rule(Rule::required()).rule(Rule::email()));

		c.apply(1, Some("bad email".to_string()));
		c.apply(0, Some("required".to_string()));
		assert_eq!(c.visible_errors(), vec!["bad email", "required"]);
		assert_eq!(c.state(), FieldState::Validated { valid: false });

		c.apply(1, None);
		c.apply(0, None);
		assert!(c.is_valid());
		assert_eq!(c.state(), FieldState::Validated { valid: true });
	}

	#[rstest]
	fn test_required_empty_field_holds_hidden_entry() {
		let mut c = controller(Field::new("name").rule(Rule::required()).rule(Rule::min(3)));

		c.hold_presence(&NoFields);

		assert!(!c.is_valid());
		assert!(c.visible_errors().is_empty());
		assert_eq!(c.validity().len(), 1);
	}

	#[rstest]
	fn test_required_if_hold_depends_on_context() {
		let field = Field::new("vat_id").rule(Rule::required_if("kind", "company"));
		let mut person = controller(field.clone());
		let mut company = controller(field);

		person.hold_presence(&MapContext::new().with_value("kind", "person"));
		company.hold_presence(&MapContext::new().with_value("kind", "company"));

		assert!(person.is_valid());
		assert!(!company.is_valid());
	}

	#[rstest]
	fn test_recheck_presence_follows_dependency_but_keeps_visible_errors() {
		// Arrange
		let mut vat = controller(Field::new("vat_id").rule(Rule::required_if("kind", "company")));
		let company = MapContext::new().with_value("kind", "company");
		let person = MapContext::new().with_value("kind", "person");

		// Act / Assert
		assert!(vat.recheck_presence(&company));
		assert!(!vat.is_valid());
		assert!(vat.visible_errors().is_empty());
		assert!(!vat.recheck_presence(&company));

		assert!(vat.recheck_presence(&person));
		assert!(vat.is_valid());

		vat.apply(0, Some("shown".to_string()));
		assert!(!vat.recheck_presence(&person));
		assert_eq!(vat.visible_errors(), vec!["shown"]);
	}

	#[rstest]
	fn test_reset_is_idempotent() {
		let mut c = controller(Field::new("name").with_value("Ann").rule(Rule::min(5)));
		c.set_value("Al".into());
		c.apply(0, Some("too short".to_string()));

		c.reset(&NoFields);
		let once = (c.value().clone(), c.validity().clone(), c.state(), c.is_dirty());
		let changed_again = c.reset(&NoFields);
		let twice = (c.value().clone(), c.validity().clone(), c.state(), c.is_dirty());

		assert_eq!(once, twice);
		assert!(!changed_again);
		assert_eq!(c.value(), &FieldValue::from("Ann"));
		assert_eq!(c.state(), FieldState::Reset);
	}

	#[rstest]
	fn test_clear_suppresses_visible_errors_but_keeps_blocking() {
		let mut c = controller(Field::new("name").with_value("Ann").rule(Rule::required()));
		c.apply(0, Some("visible".to_string()));

		c.clear(&NoFields);

		assert_eq!(c.value(), &FieldValue::empty());
		assert!(c.visible_errors().is_empty());
		assert!(!c.is_valid());
		assert_eq!(c.state(), FieldState::Cleared);
		assert!(c.is_dirty());
	}

	#[rstest]
	fn test_checkbox_values() {
		let mut c = controller(Field::checkbox("newsletter").with_checked_value("yes"));

		assert!(!c.is_checked());
		let checked = c.checkbox_value(true).unwrap();
		c.set_value(checked);
		assert!(c.is_checked());
		assert_eq!(c.value(), &FieldValue::from("yes"));

		c.clear(&NoFields);
		assert_eq!(c.value(), &FieldValue::Bool(false));
		assert_eq!(controller(Field::new("t")).checkbox_value(true), None);
	}

	#[rstest]
	fn test_checked_initial_value_survives_checked_value_change() {
		let field = Field::checkbox("terms").checked(true).with_checked_value("on");

		assert_eq!(field.value, FieldValue::from("on"));
	}
}
