//! Date parsing and reference resolution for `date`, `after`, `before` and
//! `same`.

use crate::context::FieldLookup;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
	"%Y-%m-%d %H:%M:%S",
	"%Y-%m-%d %H:%M",
	"%Y-%m-%dT%H:%M:%S",
	"%Y-%m-%dT%H:%M",
	"%d.%m.%Y %H:%M:%S",
	"%d.%m.%Y %H:%M",
	"%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y", "%Y/%m/%d"];

/// Parses a date or date-time string. Dates without a time are midnight.
///
/// # Examples
///
/// ```
/// use formwire_validators::dates::parse_date;
///
/// assert!(parse_date("2024-02-29").is_some());
/// assert!(parse_date("24.12.2024 18:30").is_some());
/// assert!(parse_date("2023-02-29").is_none());
/// assert!(parse_date("soon").is_none());
/// ```
pub fn parse_date(input: &str) -> Option<NaiveDateTime> {
	let input = input.trim();
	if input.is_empty() {
		return None;
	}
	if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
		return Some(dt.naive_local());
	}
	for format in DATETIME_FORMATS {
		if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
			return Some(dt);
		}
	}
	DATE_FORMATS
		.iter()
		.find_map(|format| NaiveDate::parse_from_str(input, format).ok())
		.map(|d| d.and_time(NaiveTime::MIN))
}

/// Resolves one of the relative tokens `now`, `today`, `yesterday` and
/// `tomorrow` against `now`.
pub fn resolve_token(token: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
	let midnight = now.date().and_time(NaiveTime::MIN);
	match token.trim().to_ascii_lowercase().as_str() {
		"now" => Some(now),
		"today" => Some(midnight),
		"yesterday" => Some(midnight - Duration::days(1)),
		"tomorrow" => Some(midnight + Duration::days(1)),
		_ => None,
	}
}

/// What a date rule's reference points at.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
	/// Another field of the form, with its current value.
	Field(String),
	/// A relative token or a literal date.
	Fixed(NaiveDateTime),
}

/// Resolves a rule reference in this order: a field of the form, a
/// relative token, a literal date. `None` when nothing matches.
pub fn resolve_reference(reference: &str, ctx: &dyn FieldLookup) -> Option<Reference> {
	if let Some(value) = ctx.field_value(reference) {
		return Some(Reference::Field(value.as_text().into_owned()));
	}
	let resolved = resolve_token(reference, ctx.local_now())
		.or_else(|| parse_date(reference))
		.map(Reference::Fixed);
	if resolved.is_none() {
		tracing::debug!(reference, "date reference is neither a field nor a date, rule passes");
	}
	resolved
}

/// Resolves a reference to a point in time. A field reference whose value
/// is empty or unparseable resolves to `None`.
pub fn resolve_date(reference: &str, ctx: &dyn FieldLookup) -> Option<NaiveDateTime> {
	match resolve_reference(reference, ctx)? {
		Reference::Field(text) => parse_date(&text),
		Reference::Fixed(dt) => Some(dt),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::MapContext;
	use rstest::{fixture, rstest};

	#[fixture]
	fn now() -> NaiveDateTime {
		NaiveDate::from_ymd_opt(2024, 6, 15)
			.unwrap()
			.and_hms_opt(14, 30, 0)
			.unwrap()
	}

	#[rstest]
	#[case("2024-06-15", (2024, 6, 15, 0, 0))]
	#[case("2024-06-15 09:05", (2024, 6, 15, 9, 5))]
	#[case("2024-06-15T09:05:00", (2024, 6, 15, 9, 5))]
	#[case("15.06.2024", (2024, 6, 15, 0, 0))]
	#[case("06/15/2024", (2024, 6, 15, 0, 0))]
	fn test_parse_date_formats(#[case] input: &str, #[case] expected: (i32, u32, u32, u32, u32)) {
		let (y, m, d, h, min) = expected;
		let want = NaiveDate::from_ymd_opt(y, m, d)
			.unwrap()
			.and_hms_opt(h, min, 0)
			.unwrap();
		assert_eq!(parse_date(input), Some(want));
	}

	#[rstest]
	fn test_tokens(now: NaiveDateTime) {
		let today = now.date().and_time(NaiveTime::MIN);

		assert_eq!(resolve_token("now", now), Some(now));
		assert_eq!(resolve_token("Today", now), Some(today));
		assert_eq!(resolve_token("yesterday", now), Some(today - Duration::days(1)));
		assert_eq!(resolve_token("tomorrow", now), Some(today + Duration::days(1)));
		assert_eq!(resolve_token("someday", now), None);
	}

	#[rstest]
	fn test_field_reference_wins_over_token(now: NaiveDateTime) {
		// Arrange
		let ctx = MapContext::new()
			.with_now(now)
			.with_value("today", "2020-01-01");

		// Act
		let resolved = resolve_date("today", &ctx);

		// Assert
		assert_eq!(resolved, parse_date("2020-01-01"));
	}

	#[rstest]
	fn test_unresolvable_reference(now: NaiveDateTime) {
		let ctx = MapContext::new().with_now(now);

		assert_eq!(resolve_reference("start_date", &ctx), None);
	}

	#[rstest]
	fn test_empty_field_reference_does_not_resolve_to_a_date(now: NaiveDateTime) {
		let ctx = MapContext::new().with_now(now).with_value("start", "");

		assert_eq!(
			resolve_reference("start", &ctx),
			Some(Reference::Field(String::new()))
		);
		assert_eq!(resolve_date("start", &ctx), None);
	}
}
