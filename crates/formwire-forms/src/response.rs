//! Response Interpreter
//!
//! Submission endpoints answer with a JSON object that may carry any of
//! these top-level keys:
//!
//! | Key | Shape | Effect |
//! |-----|-------|--------|
//! | `alert` | `{message, title?, accept?, duration?, type?}` | notification |
//! | `redirect` | string | navigation after the notification |
//! | `reload` | `true` | full reload after the notification |
//! | `data` | any | markup inserted into the form's target on success |
//! | `errors` | `{field: [message, ...]}` | per-field errors on failure |
//! | `message`, `error` | string | fallback error message |
//!
//! [`interpret`] turns a response into what should happen, without doing any
//! of it. The form controller then performs the steps in order.

use crate::notify::{Alert, AlertKind};
use formwire_conf::{ErrorDefault, FormsSettings};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::time::Duration;

/// The `alert` object of a response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlertPayload {
	pub message: String,
	pub title: Option<String>,
	/// Dismiss button text. `accept: true` means a plain `Ok` button.
	pub accept: Option<String>,
	pub duration: Option<Duration>,
	pub kind: Option<AlertKind>,
}

impl AlertPayload {
	/// `None` unless `value` is an object with a non-empty `message`.
	fn from_value(value: Value) -> Option<Self> {
		let Value::Object(mut map) = value else {
			return None;
		};
		let message = map.remove("message").and_then(text)?;
		let accept = match map.remove("accept") {
			Some(Value::Bool(true)) => Some("Ok".to_string()),
			Some(other) => text(other),
			None => None,
		};
		let duration = match map.remove("duration") {
			Some(Value::Number(n)) => n.as_u64(),
			Some(Value::String(s)) => s.trim().parse().ok(),
			_ => None,
		}
		.map(Duration::from_millis);
		let kind = map
			.remove("type")
			.and_then(text)
			.map(|t| AlertKind::from_name(&t));

		Some(Self {
			message,
			title: map.remove("title").and_then(text),
			accept,
			duration,
			kind,
		})
	}

	fn to_value(&self) -> Value {
		let mut map = Map::new();
		map.insert("message".into(), Value::String(self.message.clone()));
		if let Some(title) = &self.title {
			map.insert("title".into(), Value::String(title.clone()));
		}
		if let Some(accept) = &self.accept {
			map.insert("accept".into(), Value::String(accept.clone()));
		}
		if let Some(duration) = self.duration {
			map.insert("duration".into(), Value::from(duration.as_millis() as u64));
		}
		if let Some(kind) = self.kind {
			map.insert("type".into(), Value::String(kind.as_str().to_string()));
		}
		Value::Object(map)
	}
}

/// A submission endpoint's answer.
///
/// Parsing is lenient: keys of an unexpected shape are ignored, a body that
/// is not an object yields an empty response.
///
/// ```
/// use formwire_forms::ServerResponse;
/// use serde_json::json;
///
/// let response = ServerResponse::from_value(json!({
///     "errors": {"name": ["The name field is required."]},
///     "reload": "yes",
/// }));
/// assert_eq!(response.first_error(), Some("The name field is required."));
/// assert!(!response.reload);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServerResponse {
	pub alert: Option<AlertPayload>,
	pub redirect: Option<String>,
	/// Only a JSON `true` counts.
	pub reload: bool,
	pub data: Option<Value>,
	/// Field name to messages, in the order the server sent them.
	pub errors: IndexMap<String, Vec<String>>,
	pub message: Option<String>,
	pub error: Option<String>,
	/// Keys this crate does not interpret.
	pub extra: Map<String, Value>,
}

impl ServerResponse {
	pub fn from_value(body: Value) -> Self {
		let mut map = match body {
			Value::Object(map) => map,
			Value::Null => return Self::default(),
			other => {
				tracing::debug!(body = %other, "response body is not an object, ignored");
				return Self::default();
			}
		};

		let errors = match map.remove("errors") {
			Some(Value::Object(errors)) => errors
				.into_iter()
				.map(|(field, messages)| {
					let messages = match messages {
						Value::Array(items) => items.into_iter().filter_map(text).collect(),
						other => text(other).into_iter().collect(),
					};
					(field, messages)
				})
				.collect(),
			_ => IndexMap::new(),
		};

		Self {
			alert: map.remove("alert").and_then(AlertPayload::from_value),
			redirect: map.remove("redirect").and_then(text),
			reload: matches!(map.remove("reload"), Some(Value::Bool(true))),
			data: map.remove("data").filter(|d| !d.is_null()),
			errors,
			message: map.remove("message").and_then(text),
			error: map.remove("error").and_then(text),
			extra: map,
		}
	}

	/// The first message of the first field with any.
	pub fn first_error(&self) -> Option<&str> {
		self.errors
			.values()
			.find_map(|messages| messages.first())
			.map(String::as_str)
	}

	/// Back to the JSON contract shape.
	pub fn to_value(&self) -> Value {
		let mut map = self.extra.clone();
		if let Some(alert) = &self.alert {
			map.insert("alert".into(), alert.to_value());
		}
		if let Some(redirect) = &self.redirect {
			map.insert("redirect".into(), Value::String(redirect.clone()));
		}
		if self.reload {
			map.insert("reload".into(), Value::Bool(true));
		}
		if let Some(data) = &self.data {
			map.insert("data".into(), data.clone());
		}
		if !self.errors.is_empty() {
			let errors = self
				.errors
				.iter()
				.map(|(k, v)| (k.clone(), Value::from(v.clone())))
				.collect();
			map.insert("errors".into(), Value::Object(errors));
		}
		if let Some(message) = &self.message {
			map.insert("message".into(), Value::String(message.clone()));
		}
		if let Some(error) = &self.error {
			map.insert("error".into(), Value::String(error.clone()));
		}
		Value::Object(map)
	}
}

impl Serialize for ServerResponse {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.to_value().serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for ServerResponse {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		Value::deserialize(deserializer).map(Self::from_value)
	}
}

fn text(value: Value) -> Option<String> {
	match value {
		Value::String(s) if !s.is_empty() => Some(s),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

/// Title and message of a fallback alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertText {
	pub title: String,
	pub message: String,
}

/// Inputs of [`interpret`] that do not come from the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpretOptions {
	/// Show an error alert when a failed response carries none.
	pub alert_error: bool,
	pub alert_duration: Duration,
	pub error_default: ErrorDefault,
	/// Alert for successful responses without one of their own.
	pub success_fallback: Option<AlertText>,
	/// Used to detect redirects back to the same page.
	pub current_url: String,
}

impl InterpretOptions {
	pub fn from_settings(settings: &FormsSettings, current_url: impl Into<String>) -> Self {
		Self {
			alert_error: settings.alert_error,
			alert_duration: settings.alert_duration(),
			error_default: settings.error_default.clone(),
			success_fallback: None,
			current_url: current_url.into(),
		}
	}
}

/// Where the page goes once the response is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
	Stay,
	/// `reload` is set when the target is the current page.
	Redirect { url: String, reload: bool },
	Reload,
}

/// What a response asks for, in the order it must happen.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
	pub alert: Option<Alert>,
	/// Markup to insert into the response target (successful responses).
	pub insert: Option<String>,
	/// First message per field (failed responses).
	pub field_errors: Vec<(String, String)>,
	pub navigation: Navigation,
}

/// Interprets `response`.
///
/// ```
/// use formwire_conf::FormsSettings;
/// use formwire_forms::response::{InterpretOptions, Navigation, interpret};
/// use formwire_forms::ServerResponse;
/// use serde_json::json;
///
/// let options = InterpretOptions::from_settings(&FormsSettings::default(), "/users");
/// let response = ServerResponse::from_value(json!({"redirect": "/thanks"}));
///
/// let plan = interpret(&response, true, &options);
/// assert!(plan.alert.is_none());
/// assert_eq!(plan.navigation, Navigation::Redirect { url: "/thanks".into(), reload: false });
/// ```
pub fn interpret(response: &ServerResponse, success: bool, options: &InterpretOptions) -> Interpretation {
	let alert = match &response.alert {
		Some(payload) => Some(server_alert(payload, success, options)),
		None if success => options.success_fallback.as_ref().map(|text| {
			Alert::new(&text.message, &text.title, AlertKind::Success).with_timer(options.alert_duration)
		}),
		None if options.alert_error => Some(error_alert(response, &options.error_default)),
		None => None,
	};
	let alert = alert.filter(|a| !a.message.is_empty());

	let insert = if success {
		response.data.as_ref().map(|data| match data {
			Value::String(html) => html.clone(),
			other => other.to_string(),
		})
	} else {
		None
	};

	let field_errors = if success {
		Vec::new()
	} else {
		response
			.errors
			.iter()
			.filter_map(|(field, messages)| Some((field.clone(), messages.first()?.clone())))
			.collect()
	};

	let navigation = match &response.redirect {
		Some(url) => Navigation::Redirect {
			url: url.clone(),
			reload: !options.current_url.is_empty() && url.starts_with(&options.current_url),
		},
		None if response.reload => Navigation::Reload,
		None => Navigation::Stay,
	};

	tracing::debug!(
		success,
		alert = alert.is_some(),
		field_errors = field_errors.len(),
		?navigation,
		"response interpreted"
	);

	Interpretation {
		alert,
		insert,
		field_errors,
		navigation,
	}
}

fn server_alert(payload: &AlertPayload, success: bool, options: &InterpretOptions) -> Alert {
	let kind = payload
		.kind
		.unwrap_or(if success { AlertKind::Success } else { AlertKind::Error });
	let alert = Alert::new(
		&payload.message,
		payload.title.clone().unwrap_or_default(),
		kind,
	);
	match &payload.accept {
		Some(button) => alert.with_button(button),
		None => alert.with_timer(payload.duration.unwrap_or(options.alert_duration)),
	}
}

fn error_alert(response: &ServerResponse, defaults: &ErrorDefault) -> Alert {
	let message = response
		.first_error()
		.or(response.error.as_deref())
		.or(response.message.as_deref())
		.unwrap_or(&defaults.message);
	Alert::new(message, &defaults.title, AlertKind::Error).with_button(&defaults.accept)
}
