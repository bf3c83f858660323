//! Error types of the forms crate
//!
//! Validation failures and server-reported failures are not errors here:
//! the former live in a field's validity map, the latter are data handed to
//! the response interpreter.

use serde_json::Value;

/// A request could not be carried out.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
	#[error("invalid URL `{url}`: {message}")]
	InvalidUrl { url: String, message: String },

	#[error("could not encode payload: {0}")]
	Encode(String),

	#[error("network error: {0}")]
	Network(String),

	#[cfg(feature = "http")]
	#[error("HTTP client error: {0}")]
	Http(#[from] reqwest::Error),
}

impl From<serde_urlencoded::ser::Error> for TransportError {
	fn from(err: serde_urlencoded::ser::Error) -> Self {
		Self::Encode(err.to_string())
	}
}

/// A form could not be built or submitted.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
	#[error("form has no {0} configured")]
	MissingService(&'static str),

	#[error("form has been destroyed")]
	Destroyed,
}

/// A standalone request or quick action did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
	/// The user declined the confirmation dialog.
	#[error("request declined")]
	Declined,

	/// The server answered with a failure status; carries its JSON body.
	#[error("request rejected with status {status}")]
	Rejected { status: u16, body: Value },

	#[error(transparent)]
	Transport(#[from] TransportError),
}

impl RequestError {
	/// The server's error body, if there was one.
	pub fn body(&self) -> Option<&Value> {
		match self {
			Self::Rejected { body, .. } => Some(body),
			_ => None,
		}
	}
}
