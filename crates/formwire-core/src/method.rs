//! HTTP verbs used by form submissions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The verb a form is submitted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
	Get,
	#[default]
	Post,
	Put,
	Patch,
	Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method: {0}")]
pub struct ParseMethodError(pub String);

impl HttpMethod {
	/// Upper-case wire name (`"POST"`).
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
			Self::Put => "PUT",
			Self::Patch => "PATCH",
			Self::Delete => "DELETE",
		}
	}

	/// Lower-case name, as passed to event listeners.
	pub fn as_lower(&self) -> &'static str {
		match self {
			Self::Get => "get",
			Self::Post => "post",
			Self::Put => "put",
			Self::Patch => "patch",
			Self::Delete => "delete",
		}
	}

	/// Whether the verb deletes or updates an existing object.
	///
	/// These verbs trigger a confirmation dialog when the form carries an
	/// object name.
	///
	/// # Examples
	///
	/// ```
	/// use formwire_core::HttpMethod;
	///
	/// assert!(HttpMethod::Delete.is_destructive());
	/// assert!(HttpMethod::Patch.is_destructive());
	/// assert!(!HttpMethod::Post.is_destructive());
	/// ```
	pub fn is_destructive(&self) -> bool {
		matches!(self, Self::Put | Self::Patch | Self::Delete)
	}

	/// The verb segment used in localized message keys.
	///
	/// `patch` shares the `put` messages; `get` has none.
	pub fn message_verb(&self) -> Option<&'static str> {
		match self {
			Self::Get => None,
			Self::Post => Some("post"),
			Self::Put | Self::Patch => Some("put"),
			Self::Delete => Some("delete"),
		}
	}
}

impl FromStr for HttpMethod {
	type Err = ParseMethodError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"get" => Ok(Self::Get),
			"post" => Ok(Self::Post),
			"put" => Ok(Self::Put),
			"patch" => Ok(Self::Patch),
			"delete" => Ok(Self::Delete),
			_ => Err(ParseMethodError(s.to_string())),
		}
	}
}

impl fmt::Display for HttpMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
