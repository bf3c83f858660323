//! The validation engine.
//!
//! # Examples
//!
//! ```rust
//! # #[cfg(feature = "validators")]
//! # {
//! use formwire::validators::{NoFields, Rule, evaluate};
//!
//! let rules = Rule::parse_list("required|min:3").unwrap();
//! let verdict = evaluate(&rules[1], "name", &"Al".into(), &NoFields).ready().unwrap();
//! assert!(!verdict.is_valid());
//! # }
//! ```

#[cfg(feature = "validators")]
pub use formwire_validators::*;
