//! Validation rules for formwire fields
//!
//! ## Rules
//!
//! | Rule | Argument | Fails when |
//! |------|----------|-----------|
//! | `required` | | the value is empty |
//! | `required_if` | field, values | the value is empty and the field equals one of the values |
//! | `required_with` | fields | the value is empty and any field is filled |
//! | `min` / `max` | length | the value is shorter / longer |
//! | `confirmed` | field (optional) | the value differs from the field |
//! | `email`, `url`, `phone` | | the value has the wrong format |
//! | `accepted` | | the value is not `on`, `true`, `1` or boolean true |
//! | `date` | | the value is not a date |
//! | `after` / `before` / `same` | field, token or date | the comparison fails |
//! | `custom` | predicate | the predicate's callback says so |
//!
//! Empty values only fail the presence rules and `accepted`.
//!
//! ## Example
//!
//! ```
//! use formwire_validators::{MapContext, Rule, evaluate};
//!
//! let ctx = MapContext::new().with_value("password", "secret");
//! let rule = Rule::confirmed("password");
//!
//! let verdict = evaluate(&rule, "password_confirmation", &"secre".into(), &ctx);
//! assert!(!verdict.ready().unwrap().is_valid());
//! ```

pub mod context;
pub mod dates;
pub mod engine;
pub mod parser;
pub mod patterns;
pub mod rule;

pub use context::{FieldLookup, MapContext, NoFields};
pub use engine::{
	Evaluation, Failure, PendingState, PendingVerdict, Verdict, VerdictCallback, default_template,
	evaluate,
};
pub use parser::RuleParseError;
pub use rule::{CustomRule, Rule, RuleKind};
