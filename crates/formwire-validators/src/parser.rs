//! Rule-string parsing
//!
//! Rules can be declared the way server-side validators usually spell them:
//! rule names separated by `|`, arguments after a `:`, multiple arguments
//! separated by `,`.
//!
//! ```
//! use formwire_validators::{Rule, RuleKind};
//!
//! let rules = Rule::parse_list("required|min:3|required_if:kind,company").unwrap();
//! assert_eq!(rules.len(), 3);
//! assert_eq!(rules[1].kind, RuleKind::Min(3));
//! ```

use crate::rule::{Rule, RuleKind};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleParseError {
	#[error("unknown validation rule: {0}")]
	UnknownRule(String),
	#[error("rule `{0}` requires an argument")]
	MissingArgument(&'static str),
	#[error("invalid argument `{argument}` for rule `{rule}`")]
	InvalidArgument { rule: &'static str, argument: String },
	#[error("rule `{0}` cannot be declared in a rule string")]
	NotDeclarable(&'static str),
}

fn required_arg(rule: &'static str, arg: Option<&str>) -> Result<String, RuleParseError> {
	match arg.map(str::trim) {
		Some(a) if !a.is_empty() => Ok(a.to_string()),
		_ => Err(RuleParseError::MissingArgument(rule)),
	}
}

fn length_arg(rule: &'static str, arg: Option<&str>) -> Result<usize, RuleParseError> {
	let raw = required_arg(rule, arg)?;
	raw.parse().map_err(|_| RuleParseError::InvalidArgument {
		rule,
		argument: raw,
	})
}

fn list_arg(rule: &'static str, arg: Option<&str>) -> Result<Vec<String>, RuleParseError> {
	let raw = required_arg(rule, arg)?;
	let items: Vec<String> = raw
		.split(',')
		.map(|s| s.trim().to_string())
		.filter(|s| !s.is_empty())
		.collect();
	if items.is_empty() {
		return Err(RuleParseError::MissingArgument(rule));
	}
	Ok(items)
}

impl FromStr for Rule {
	type Err = RuleParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		let (name, arg) = match s.split_once(':') {
			Some((n, a)) => (n.trim(), Some(a)),
			None => (s, None),
		};

		let kind = match name {
			"required" => RuleKind::Required,
			"required_if" => {
				let mut parts = list_arg("required_if", arg)?;
				if parts.len() < 2 {
					return Err(RuleParseError::MissingArgument("required_if"));
				}
				let field = parts.remove(0);
				RuleKind::RequiredIf {
					field,
					values: parts,
				}
			}
			"required_with" => RuleKind::RequiredWith(list_arg("required_with", arg)?),
			"min" => RuleKind::Min(length_arg("min", arg)?),
			"max" => RuleKind::Max(length_arg("max", arg)?),
			"confirmed" => RuleKind::Confirmed(
				arg.map(str::trim)
					.filter(|a| !a.is_empty())
					.map(str::to_string),
			),
			"email" => RuleKind::Email,
			"url" => RuleKind::Url,
			"phone" => RuleKind::Phone,
			"accepted" => RuleKind::Accepted,
			"date" => RuleKind::Date,
			"after" => RuleKind::After(required_arg("after", arg)?),
			"before" => RuleKind::Before(required_arg("before", arg)?),
			"same" => RuleKind::Same(required_arg("same", arg)?),
			"custom" => return Err(RuleParseError::NotDeclarable("custom")),
			other => return Err(RuleParseError::UnknownRule(other.to_string())),
		};
		Ok(Rule::new(kind))
	}
}

impl Rule {
	/// Parses a `|`-separated rule string. Empty segments are skipped.
	pub fn parse_list(rules: &str) -> Result<Vec<Rule>, RuleParseError> {
		rules
			.split('|')
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(str::parse)
			.collect()
	}
}
