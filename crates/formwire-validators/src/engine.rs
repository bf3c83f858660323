//! Rule evaluation
//!
//! [`evaluate`] is pure apart from the [`FieldLookup`] it reads sibling
//! values from. Built-in rules settle immediately; custom rules settle when
//! their callback is resolved, which may happen later.

use crate::context::FieldLookup;
use crate::dates::{Reference, parse_date, resolve_date, resolve_reference};
use crate::patterns;
use crate::rule::{Rule, RuleKind};
use formwire_core::FieldValue;
use formwire_core::text::{humanize, interpolate};
use futures::channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Why a value failed a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
	/// The failing rule's name (`"min"`).
	pub rule: &'static str,
	/// Message key below `validation.` (`"min.string"`).
	pub key: String,
	/// The field whose label replaces `{attribute}`.
	pub attribute: String,
	/// Placeholder values, `attribute` included.
	pub params: Vec<(String, String)>,
	/// The rendered English message, or the override.
	pub message: String,
	/// Whether `message` came from the rule or a custom callback and must
	/// not be replaced by a localized one.
	pub overridden: bool,
}

impl Failure {
	fn new(rule: &'static str, key: &str, attribute: &str, extra: Vec<(&str, String)>) -> Self {
		let mut params = vec![("attribute".to_string(), humanize(attribute))];
		params.extend(extra.into_iter().map(|(k, v)| (k.to_string(), v)));
		let message = interpolate(default_template(key), &params);
		Self {
			rule,
			key: key.to_string(),
			attribute: attribute.to_string(),
			params,
			message,
			overridden: false,
		}
	}

	fn with_override(mut self, message: Option<&str>) -> Self {
		if let Some(m) = message {
			self.message = interpolate(m, &self.params);
			self.overridden = true;
		}
		self
	}

	/// Renders `template` with this failure's parameters.
	pub fn render(&self, template: &str) -> String {
		interpolate(template, &self.params)
	}
}

/// English fallback messages, keyed like the `validation` catalog.
pub fn default_template(key: &str) -> &'static str {
	match key {
		"required" => "The {attribute} field is required.",
		"required_if" => "The {attribute} field is required when {other} is {value}.",
		"required_with" => "The {attribute} field is required when {values} is present.",
		"min.string" => "The {attribute} must be at least {min} characters.",
		"max.string" => "The {attribute} may not be greater than {max} characters.",
		"confirmed" => "The {attribute} confirmation does not match.",
		"email" => "The {attribute} must be a valid email address.",
		"url" => "The {attribute} format is invalid.",
		"phone" => "The {attribute} must be a valid phone number.",
		"accepted" => "The {attribute} must be accepted.",
		"date" => "The {attribute} is not a valid date.",
		"after" => "The {attribute} must be a date after {date}.",
		"before" => "The {attribute} must be a date before {date}.",
		"same" => "The {attribute} and {other} must match.",
		_ => "The {attribute} is invalid.",
	}
}

/// The outcome of one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
	Valid,
	Invalid(Failure),
}

impl Verdict {
	pub fn is_valid(&self) -> bool {
		matches!(self, Self::Valid)
	}

	pub fn failure(&self) -> Option<&Failure> {
		match self {
			Self::Valid => None,
			Self::Invalid(f) => Some(f),
		}
	}

	pub fn message(&self) -> Option<&str> {
		self.failure().map(|f| f.message.as_str())
	}
}

/// Hands a custom rule's verdict back to the engine.
#[derive(Debug)]
pub struct VerdictCallback {
	sender: oneshot::Sender<Verdict>,
	failure: Failure,
}

impl VerdictCallback {
	/// Settles the rule. An invalid verdict without a message uses the
	/// rule's override or the generic message.
	pub fn resolve(self, valid: bool, message: Option<String>) {
		let verdict = if valid {
			Verdict::Valid
		} else {
			let mut failure = self.failure;
			if let Some(m) = message {
				failure.message = m;
				failure.overridden = true;
			}
			Verdict::Invalid(failure)
		};
		// The receiver is gone when the field moved on to a newer value.
		let _ = self.sender.send(verdict);
	}

	pub fn pass(self) {
		self.resolve(true, None)
	}

	pub fn fail(self, message: impl Into<String>) {
		self.resolve(false, Some(message.into()))
	}
}

/// State of a custom rule's verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingState {
	Ready(Verdict),
	Waiting,
	/// The callback was dropped without being resolved.
	Abandoned,
}

/// A verdict a custom rule has not delivered yet.
///
/// Awaiting it yields `None` if the callback is dropped unresolved.
#[derive(Debug)]
pub struct PendingVerdict {
	receiver: oneshot::Receiver<Verdict>,
}

impl PendingVerdict {
	pub fn try_take(&mut self) -> PendingState {
		match self.receiver.try_recv() {
			Ok(Some(verdict)) => PendingState::Ready(verdict),
			Ok(None) => PendingState::Waiting,
			Err(oneshot::Canceled) => PendingState::Abandoned,
		}
	}
}

impl Future for PendingVerdict {
	type Output = Option<Verdict>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.receiver).poll(cx).map(Result::ok)
	}
}

/// Result of [`evaluate`].
#[derive(Debug)]
pub enum Evaluation {
	Ready(Verdict),
	Pending(PendingVerdict),
	/// A custom rule dropped its callback; keep the previous verdict.
	NoVerdict,
}

impl Evaluation {
	/// The verdict if it is already known.
	pub fn ready(self) -> Option<Verdict> {
		match self {
			Self::Ready(v) => Some(v),
			_ => None,
		}
	}
}

/// Evaluates `rule` for the field `name` holding `value`.
///
/// Empty values pass every rule except `required`, `required_if`,
/// `required_with` and `accepted`. Rules that reference a field the form
/// does not have always pass.
///
/// # Examples
///
/// ```
/// use formwire_validators::{MapContext, Rule, evaluate};
///
/// let ctx = MapContext::new();
/// let verdict = evaluate(&Rule::email(), "email", &"a@b".into(), &ctx)
///     .ready()
///     .unwrap();
/// assert_eq!(verdict.message(), Some("The email must be a valid email address."));
/// ```
pub fn evaluate(
	rule: &Rule,
	name: &str,
	value: &FieldValue,
	ctx: &dyn FieldLookup,
) -> Evaluation {
	if let RuleKind::Custom(custom) = &rule.kind {
		let (sender, receiver) = oneshot::channel();
		let failure = Failure::new("custom", "custom", name, Vec::new())
			.with_override(rule.message.as_deref());
		custom.call(name, value, VerdictCallback { sender, failure });
		let mut pending = PendingVerdict { receiver };
		return match pending.try_take() {
			PendingState::Ready(v) => Evaluation::Ready(v),
			PendingState::Waiting => Evaluation::Pending(pending),
			PendingState::Abandoned => Evaluation::NoVerdict,
		};
	}

	let verdict = match check(&rule.kind, name, value, ctx) {
		None => Verdict::Valid,
		Some(failure) => Verdict::Invalid(failure.with_override(rule.message.as_deref())),
	};
	Evaluation::Ready(verdict)
}

fn text_matches(value: &FieldValue, expected: &str) -> bool {
	if value.as_text() == expected {
		return true;
	}
	match value {
		FieldValue::Bool(b) => expected.eq_ignore_ascii_case(if *b { "true" } else { "false" }),
		_ => false,
	}
}

/// Value of the field a rule refers to. A missing field makes the rule pass.
fn referenced(ctx: &dyn FieldLookup, rule: &str, field: &str) -> Option<FieldValue> {
	let value = ctx.field_value(field);
	if value.is_none() {
		tracing::debug!(rule, field, "referenced field not in form, rule passes");
	}
	value
}

fn check(kind: &RuleKind, name: &str, value: &FieldValue, ctx: &dyn FieldLookup) -> Option<Failure> {
	let empty = value.is_empty();
	if empty && !kind.checks_empty() {
		return None;
	}

	match kind {
		RuleKind::Required => empty.then(|| Failure::new("required", "required", name, Vec::new())),
		RuleKind::RequiredIf { field, values } => {
			if !empty {
				return None;
			}
			let other = referenced(ctx, "required_if", field)?;
			values.iter().any(|v| text_matches(&other, v)).then(|| {
				Failure::new(
					"required_if",
					"required_if",
					name,
					vec![("other", humanize(field)), ("value", values.join(", "))],
				)
			})
		}
		RuleKind::RequiredWith(fields) => {
			if !empty {
				return None;
			}
			let present = fields
				.iter()
				.any(|f| ctx.field_value(f).is_some_and(|v| !v.is_empty()));
			present.then(|| {
				let names: Vec<String> = fields.iter().map(|f| humanize(f)).collect();
				Failure::new(
					"required_with",
					"required_with",
					name,
					vec![("values", names.join(" / "))],
				)
			})
		}
		RuleKind::Min(n) => (value.char_len() < *n)
			.then(|| Failure::new("min", "min.string", name, vec![("min", n.to_string())])),
		RuleKind::Max(n) => (value.char_len() > *n)
			.then(|| Failure::new("max", "max.string", name, vec![("max", n.to_string())])),
		RuleKind::Confirmed(target) => {
			let target = match target {
				Some(t) => t.as_str(),
				None => name.strip_suffix("_confirmation")?,
			};
			let other = referenced(ctx, "confirmed", target)?;
			(value.as_text() != other.as_text())
				.then(|| Failure::new("confirmed", "confirmed", target, Vec::new()))
		}
		RuleKind::Email => (!patterns::is_email(&value.as_text()))
			.then(|| Failure::new("email", "email", name, Vec::new())),
		RuleKind::Url => {
			(!patterns::is_url(&value.as_text())).then(|| Failure::new("url", "url", name, Vec::new()))
		}
		RuleKind::Phone => (!patterns::is_phone(&value.as_text()))
			.then(|| Failure::new("phone", "phone", name, Vec::new())),
		RuleKind::Accepted => {
			let accepted = match value {
				FieldValue::Bool(b) => *b,
				FieldValue::Number(n) => n.as_u64() == Some(1),
				FieldValue::Text(s) => matches!(s.as_str(), "on" | "true" | "1"),
				_ => false,
			};
			(!accepted).then(|| Failure::new("accepted", "accepted", name, Vec::new()))
		}
		RuleKind::Date => parse_date(&value.as_text())
			.is_none()
			.then(|| Failure::new("date", "date", name, Vec::new())),
		RuleKind::After(reference) => {
			let bound = resolve_date(reference, ctx)?;
			let ok = parse_date(&value.as_text()).is_some_and(|d| d > bound);
			(!ok).then(|| Failure::new("after", "after", name, vec![("date", reference.clone())]))
		}
		RuleKind::Before(reference) => {
			let bound = resolve_date(reference, ctx)?;
			let ok = parse_date(&value.as_text()).is_some_and(|d| d < bound);
			(!ok).then(|| Failure::new("before", "before", name, vec![("date", reference.clone())]))
		}
		RuleKind::Same(reference) => {
			let ok = match resolve_reference(reference, ctx)? {
				Reference::Field(text) => value.as_text() == text,
				Reference::Fixed(dt) => parse_date(&value.as_text()) == Some(dt),
			};
			(!ok).then(|| Failure::new("same", "same", name, vec![("other", humanize(reference))]))
		}
		RuleKind::Custom(_) => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::{MapContext, NoFields};
	use chrono::NaiveDate;
	use rstest::{fixture, rstest};

	fn run(rule: &Rule, name: &str, value: impl Into<FieldValue>, ctx: &dyn FieldLookup) -> Verdict {
		evaluate(rule, name, &value.into(), ctx)
			.ready()
			.expect("built-in rules settle immediately")
	}

	#[fixture]
	fn ctx() -> MapContext {
		let now = NaiveDate::from_ymd_opt(2024, 6, 15)
			.unwrap()
			.and_hms_opt(12, 0, 0)
			.unwrap();
		MapContext::new().with_now(now)
	}

	#[rstest]
	#[case(FieldValue::Null, false)]
	#[case("".into(), false)]
	#[case(false.into(), false)]
	#[case(FieldValue::List(vec![]), false)]
	#[case("x".into(), true)]
	#[case(0.into(), true)]
	#[case(true.into(), true)]
	fn test_required_is_null_guarded(#[case] value: FieldValue, #[case] valid: bool) {
		assert_eq!(run(&Rule::required(), "agree", value, &NoFields).is_valid(), valid);
	}

	#[rstest]
	fn test_required_if(ctx: MapContext) {
		let rule = Rule::required_if("kind", "company");
		let company = ctx.clone().with_value("kind", "company");
		let person = ctx.clone().with_value("kind", "person");

		assert!(!run(&rule, "vat", "", &company).is_valid());
		assert!(run(&rule, "vat", "DE123", &company).is_valid());
		assert!(run(&rule, "vat", "", &person).is_valid());
		// kind is not part of the form
		assert!(run(&rule, "vat", "", &ctx).is_valid());
	}

	#[rstest]
	fn test_required_if_message(ctx: MapContext) {
		let ctx = ctx.with_value("kind", "company");

		let verdict = run(&Rule::required_if("kind", "company"), "vat_id", "", &ctx);

		assert_eq!(
			verdict.message(),
			Some("The vat id field is required when kind is company.")
		);
	}

	#[rstest]
	fn test_required_with(ctx: MapContext) {
		let rule = Rule::required_with(["street", "city"]);
		let filled = ctx.clone().with_value("street", "").with_value("city", "Berlin");
		let blank = ctx.clone().with_value("street", "").with_value("city", "");

		assert!(!run(&rule, "zip", "", &filled).is_valid());
		assert!(run(&rule, "zip", "", &blank).is_valid());
		assert!(run(&rule, "zip", "", &ctx).is_valid());
	}

	#[rstest]
	#[case(Rule::min(3), "ab", false)]
	#[case(Rule::min(3), "abc", true)]
	#[case(Rule::max(3), "abcd", false)]
	#[case(Rule::max(3), "äöü", true)]
	fn test_length_rules(#[case] rule: Rule, #[case] value: &str, #[case] valid: bool) {
		assert_eq!(run(&rule, "name", value, &NoFields).is_valid(), valid);
	}

	#[rstest]
	fn test_min_uses_string_message_key() {
		let verdict = run(&Rule::min(3), "name", "ab", &NoFields);

		let failure = verdict.failure().unwrap();
		assert_eq!(failure.key, "min.string");
		assert_eq!(failure.message, "The name must be at least 3 characters.");
	}

	#[rstest]
	fn test_confirmed_defaults_to_stripped_name(ctx: MapContext) {
		let ctx = ctx.with_value("password", "secret");
		let rule = Rule::new(RuleKind::Confirmed(None));

		assert!(!run(&rule, "password_confirmation", "secre", &ctx).is_valid());
		assert!(run(&rule, "password_confirmation", "secret", &ctx).is_valid());
		// no suffix to strip, nothing to compare against
		assert!(run(&rule, "repeat", "x", &ctx).is_valid());
	}

	#[rstest]
	#[case("a@b.com", true)]
	#[case("first.last@sub.example.org", true)]
	#[case("\"quoted name\"@example.com", true)]
	#[case("a@b", false)]
	#[case("a b@c.de", false)]
	#[case("plain", false)]
	fn test_email(#[case] value: &str, #[case] valid: bool) {
		assert_eq!(run(&Rule::email(), "email", value, &NoFields).is_valid(), valid);
	}

	#[rstest]
	#[case("https://example.com", true)]
	#[case("http://user:pw@example.com:8080/path?q=1#top", true)]
	#[case("ftp://files.example.org/a.txt", true)]
	#[case("http://8.8.8.8", true)]
	#[case("http://192.168.0.1", false)]
	#[case("http://10.0.0.5/admin", false)]
	#[case("http://127.0.0.1", false)]
	#[case("http://172.20.1.1", false)]
	#[case("http://localhost", false)]
	#[case("example.com", false)]
	#[case("mailto:a@b.com", false)]
	fn test_url(#[case] value: &str, #[case] valid: bool) {
		assert_eq!(run(&Rule::url(), "site", value, &NoFields).is_valid(), valid);
	}

	#[rstest]
	#[case("+49 170 1234-567", true)]
	#[case("0301234567", true)]
	#[case("call me", false)]
	#[case("+-", false)]
	fn test_phone(#[case] value: &str, #[case] valid: bool) {
		assert_eq!(run(&Rule::phone(), "phone", value, &NoFields).is_valid(), valid);
	}

	#[rstest]
	#[case(true.into(), true)]
	#[case("on".into(), true)]
	#[case("true".into(), true)]
	#[case("1".into(), true)]
	#[case(1.into(), true)]
	#[case("yes please".into(), false)]
	#[case(false.into(), false)]
	#[case(FieldValue::Null, false)]
	fn test_accepted(#[case] value: FieldValue, #[case] valid: bool) {
		assert_eq!(run(&Rule::accepted(), "terms", value, &NoFields).is_valid(), valid);
	}

	#[rstest]
	fn test_date() {
		assert!(run(&Rule::date(), "born", "1990-04-01", &NoFields).is_valid());
		assert!(!run(&Rule::date(), "born", "1990-13-01", &NoFields).is_valid());
	}

	#[rstest]
	fn test_after_tokens(ctx: MapContext) {
		let rule = Rule::after("today");

		assert!(run(&rule, "start", "2024-06-16", &ctx).is_valid());
		assert!(!run(&rule, "start", "2024-06-15", &ctx).is_valid());
		assert!(!run(&rule, "start", "not a date", &ctx).is_valid());
	}

	#[rstest]
	fn test_before_field_reference(ctx: MapContext) {
		let ctx = ctx.with_value("end", "2024-07-01");
		let rule = Rule::before("end");

		assert!(run(&rule, "start", "2024-06-30", &ctx).is_valid());
		assert!(!run(&rule, "start", "2024-07-02", &ctx).is_valid());
	}

	#[rstest]
	fn test_date_comparison_skipped_when_reference_unresolvable(ctx: MapContext) {
		let empty_end = ctx.clone().with_value("end", "");

		assert!(run(&Rule::before("end"), "start", "2024-07-02", &ctx).is_valid());
		assert!(run(&Rule::before("end"), "start", "2024-07-02", &empty_end).is_valid());
		assert!(run(&Rule::after("eventually"), "start", "2024-07-02", &ctx).is_valid());
	}

	#[rstest]
	fn test_same(ctx: MapContext) {
		let ctx = ctx.with_value("email", "a@b.com");

		assert!(run(&Rule::same("email"), "email2", "a@b.com", &ctx).is_valid());
		let verdict = run(&Rule::same("email"), "email2", "x@b.com", &ctx);
		assert_eq!(verdict.message(), Some("The email2 and email must match."));
		assert!(run(&Rule::same("today"), "day", "2024-06-15", &ctx).is_valid());
	}

	#[rstest]
	fn test_message_override_is_interpolated() {
		let rule = Rule::min(5).with_message("{attribute}: {min}+ please");

		let failure = run(&rule, "nick", "abc", &NoFields).failure().cloned().unwrap();

		assert!(failure.overridden);
		assert_eq!(failure.message, "nick: 5+ please");
	}

	#[rstest]
	fn test_custom_rule_synchronous_verdict() {
		let rule = Rule::custom(|_, value, cb| {
			if value.as_text() == "taken" {
				cb.fail("Already taken.");
			} else {
				cb.pass();
			}
		});

		assert!(run(&rule, "user", "free", &NoFields).is_valid());
		assert_eq!(
			run(&rule, "user", "taken", &NoFields).message(),
			Some("Already taken.")
		);
	}

	#[rstest]
	fn test_custom_rule_without_message_falls_back() {
		let rule = Rule::custom(|_, _, cb| cb.resolve(false, None));

		let verdict = run(&rule, "user", "x", &NoFields);

		assert_eq!(verdict.message(), Some("The user is invalid."));
	}

	#[rstest]
	fn test_custom_rule_return_value_is_ignored_until_callback_fires() {
		// Arrange
		let parked = std::sync::Arc::new(parking_lot::Mutex::new(None));
		let slot = parked.clone();
		let rule = Rule::custom(move |_, _, cb| {
			*slot.lock() = Some(cb);
		});

		// Act
		let evaluation = evaluate(&rule, "user", &"x".into(), &NoFields);
		let Evaluation::Pending(mut pending) = evaluation else {
			panic!("expected a pending verdict");
		};
		assert_eq!(pending.try_take(), PendingState::Waiting);
		parked.lock().take().unwrap().fail("nope");

		// Assert
		match pending.try_take() {
			PendingState::Ready(v) => assert_eq!(v.message(), Some("nope")),
			other => panic!("unexpected state: {other:?}"),
		}
	}

	#[rstest]
	fn test_custom_rule_dropping_callback_yields_no_verdict() {
		let rule = Rule::custom(|_, _, cb| drop(cb));

		let evaluation = evaluate(&rule, "user", &"x".into(), &NoFields);

		assert!(matches!(evaluation, Evaluation::NoVerdict));
	}

	#[rstest]
	#[case(Rule::required_if("kind", "company"), "vat_id", "")]
	#[case(Rule::confirmed("password"), "password_confirmation", "secret")]
	#[case(Rule::same("password"), "repeat", "secret")]
	#[case(Rule::after("starts_at"), "ends_at", "2024-01-01")]
	fn test_rules_referring_to_absent_fields_pass(#[case] rule: Rule, #[case] name: &str, #[case] value: &str) {
		assert!(run(&rule, name, value, &NoFields).is_valid());
	}
}
