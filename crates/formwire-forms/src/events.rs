//! Events published by forms and fields
//!
//! Every event goes out on the [`EventBus`](formwire_core::EventBus) the
//! form was built with, under the names of [`formwire_core::names`].

use crate::response::ServerResponse;
use formwire_core::{FieldValue, HttpMethod};

/// Why a submit attempt did not dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreventReason {
	/// At least one field holds a blocking error.
	Invalid,
	/// Another submission of the same form is in flight.
	AlreadySubmitting,
}

/// Payload of the events on a form's bus.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
	/// `<field>-input-changed`
	InputChanged { field: String, value: FieldValue },
	/// `change-<eventName>`
	Changed { field: String, value: FieldValue },
	/// `validated-<eventName>`, published when overall validity flips.
	Validated { valid: bool },
	/// `prevented_submit-<eventName>`
	PreventedSubmit { reason: PreventReason },
	/// `submitting-<eventName>`
	Submitting,
	/// `response-<eventName>`
	Response {
		success: bool,
		method: HttpMethod,
		response: ServerResponse,
	},
	/// `success-<eventName>`, carrying the response `data`.
	Success { data: Option<serde_json::Value> },
	/// `error-<eventName>`
	Error { response: ServerResponse },
}

impl FormEvent {
	/// The bus name this event is published under.
	pub fn bus_name(&self, event_name: &str) -> String {
		use formwire_core::names;
		match self {
			Self::InputChanged { field, .. } => names::input_changed(field),
			Self::Changed { .. } => names::change(event_name),
			Self::Validated { .. } => names::validated(event_name),
			Self::PreventedSubmit { .. } => names::prevented_submit(event_name),
			Self::Submitting => names::submitting(event_name),
			Self::Response { .. } => names::response(event_name),
			Self::Success { .. } => names::success(event_name),
			Self::Error { .. } => names::error(event_name),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(FormEvent::InputChanged { field: "email".into(), value: FieldValue::Null }, "email-input-changed")]
	#[case(FormEvent::Validated { valid: true }, "validated-ajaxForm")]
	#[case(FormEvent::Submitting, "submitting-ajaxForm")]
	#[case(FormEvent::PreventedSubmit { reason: PreventReason::Invalid }, "prevented_submit-ajaxForm")]
	fn test_bus_names(#[case] event: FormEvent, #[case] expected: &str) {
		assert_eq!(event.bus_name("ajaxForm"), expected);
	}
}
