//! Rule definitions
//!
//! A [`Rule`] pairs a [`RuleKind`] with an optional message override and an
//! optional debounce override. Rules are built either through the
//! constructors on [`Rule`] or by parsing a pipe-separated rule string (see
//! [`crate::parser`]).

use crate::engine::VerdictCallback;
use formwire_core::FieldValue;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

type CustomFn = dyn Fn(&str, &FieldValue, VerdictCallback) + Send + Sync;

/// A caller-supplied predicate.
///
/// The predicate receives the field name, the current value and a
/// [`VerdictCallback`]. The verdict is whatever the callback is resolved
/// with; dropping the callback without resolving it leaves the rule's
/// previous verdict in place.
#[derive(Clone)]
pub struct CustomRule {
	predicate: Arc<CustomFn>,
}

impl CustomRule {
	pub fn new<F>(predicate: F) -> Self
	where
		F: Fn(&str, &FieldValue, VerdictCallback) + Send + Sync + 'static,
	{
		Self {
			predicate: Arc::new(predicate),
		}
	}

	pub(crate) fn call(&self, name: &str, value: &FieldValue, callback: VerdictCallback) {
		(self.predicate)(name, value, callback)
	}
}

impl fmt::Debug for CustomRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("CustomRule(..)")
	}
}

impl PartialEq for CustomRule {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.predicate, &other.predicate)
	}
}

/// The kind of a rule together with its argument.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
	Required,
	/// Required while `field` currently equals one of `values`.
	RequiredIf { field: String, values: Vec<String> },
	/// Required while any of the named fields is non-empty.
	RequiredWith(Vec<String>),
	/// Minimum length in characters (or items for lists).
	Min(usize),
	/// Maximum length in characters (or items for lists).
	Max(usize),
	/// Must equal the named field. `None` means the field named like this
	/// one without its `_confirmation` suffix.
	Confirmed(Option<String>),
	Email,
	Url,
	Phone,
	Accepted,
	Date,
	/// Strictly after a field value, a relative token or a literal date.
	After(String),
	/// Strictly before a field value, a relative token or a literal date.
	Before(String),
	/// Equal to a field value, a relative token or a literal date.
	Same(String),
	Custom(CustomRule),
}

impl RuleKind {
	/// The rule's name as used in rule strings and message keys.
	pub fn key(&self) -> &'static str {
		match self {
			Self::Required => "required",
			Self::RequiredIf { .. } => "required_if",
			Self::RequiredWith(_) => "required_with",
			Self::Min(_) => "min",
			Self::Max(_) => "max",
			Self::Confirmed(_) => "confirmed",
			Self::Email => "email",
			Self::Url => "url",
			Self::Phone => "phone",
			Self::Accepted => "accepted",
			Self::Date => "date",
			Self::After(_) => "after",
			Self::Before(_) => "before",
			Self::Same(_) => "same",
			Self::Custom(_) => "custom",
		}
	}

	/// Whether the rule makes its field required.
	pub fn is_presence(&self) -> bool {
		matches!(
			self,
			Self::Required | Self::RequiredIf { .. } | Self::RequiredWith(_)
		)
	}

	/// Whether an empty value can fail this rule.
	pub fn checks_empty(&self) -> bool {
		self.is_presence() || matches!(self, Self::Accepted)
	}

	/// Names of other fields whose values this rule reads.
	pub fn references(&self) -> Vec<&str> {
		match self {
			Self::RequiredIf { field, .. } => vec![field.as_str()],
			Self::RequiredWith(fields) => fields.iter().map(String::as_str).collect(),
			Self::Confirmed(Some(field)) => vec![field.as_str()],
			Self::After(r) | Self::Before(r) | Self::Same(r) => vec![r.as_str()],
			_ => Vec::new(),
		}
	}
}

/// A validation directive attached to a field.
///
/// # Examples
///
/// ```
/// use formwire_validators::{Rule, RuleKind};
/// use std::time::Duration;
///
/// let rule = Rule::min(3)
///     .with_message("Too short")
///     .with_debounce(Duration::from_millis(250));
/// assert_eq!(rule.kind, RuleKind::Min(3));
/// assert_eq!(rule.key(), "min");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
	pub kind: RuleKind,
	pub message: Option<String>,
	pub debounce: Option<Duration>,
}

impl Rule {
	pub fn new(kind: RuleKind) -> Self {
		Self {
			kind,
			message: None,
			debounce: None,
		}
	}

	pub fn required() -> Self {
		Self::new(RuleKind::Required)
	}

	pub fn required_if(field: impl Into<String>, value: impl Into<String>) -> Self {
		Self::new(RuleKind::RequiredIf {
			field: field.into(),
			values: vec![value.into()],
		})
	}

	pub fn required_with<I, S>(fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::new(RuleKind::RequiredWith(
			fields.into_iter().map(Into::into).collect(),
		))
	}

	pub fn min(n: usize) -> Self {
		Self::new(RuleKind::Min(n))
	}

	pub fn max(n: usize) -> Self {
		Self::new(RuleKind::Max(n))
	}

	pub fn confirmed(field: impl Into<String>) -> Self {
		Self::new(RuleKind::Confirmed(Some(field.into())))
	}

	pub fn email() -> Self {
		Self::new(RuleKind::Email)
	}

	pub fn url() -> Self {
		Self::new(RuleKind::Url)
	}

	pub fn phone() -> Self {
		Self::new(RuleKind::Phone)
	}

	pub fn accepted() -> Self {
		Self::new(RuleKind::Accepted)
	}

	pub fn date() -> Self {
		Self::new(RuleKind::Date)
	}

	pub fn after(reference: impl Into<String>) -> Self {
		Self::new(RuleKind::After(reference.into()))
	}

	pub fn before(reference: impl Into<String>) -> Self {
		Self::new(RuleKind::Before(reference.into()))
	}

	pub fn same(reference: impl Into<String>) -> Self {
		Self::new(RuleKind::Same(reference.into()))
	}

	pub fn custom<F>(predicate: F) -> Self
	where
		F: Fn(&str, &FieldValue, VerdictCallback) + Send + Sync + 'static,
	{
		Self::new(RuleKind::Custom(CustomRule::new(predicate)))
	}

	/// Overrides the failure message.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	/// Overrides the global validation delay for this rule.
	pub fn with_debounce(mut self, delay: Duration) -> Self {
		self.debounce = Some(delay);
		self
	}

	pub fn key(&self) -> &'static str {
		self.kind.key()
	}
}

impl From<RuleKind> for Rule {
	fn from(kind: RuleKind) -> Self {
		Self::new(kind)
	}
}
