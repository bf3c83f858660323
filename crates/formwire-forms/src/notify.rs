//! Notification Presenter
//!
//! Alerts, confirmations, prompts and selections are shown by a
//! [`DialogBackend`] (a modal dialog library in a browser, a terminal prompt,
//! a test double). [`NotificationPresenter`] sits in front of it and applies
//! the presentation rules every caller relies on:
//!
//! - error alerts never auto-dismiss and always have a button
//! - an alert with a button is not timed
//! - error and warning dialogs are shown in danger mode

use crate::error::RequestError;
use crate::payload::Payload;
use crate::response::{InterpretOptions, ServerResponse, interpret};
use crate::transport::{SubmitRequest, Transport};
use async_trait::async_trait;
use formwire_core::HttpMethod;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Visual kind of a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
	Success,
	Info,
	Warning,
	Error,
	#[default]
	#[serde(other)]
	Plain,
}

impl AlertKind {
	/// Parses a dialog type name. Unknown names are [`AlertKind::Plain`].
	pub fn from_name(name: &str) -> Self {
		match name.trim().to_ascii_lowercase().as_str() {
			"success" => Self::Success,
			"info" => Self::Info,
			"warning" => Self::Warning,
			"error" => Self::Error,
			_ => Self::Plain,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Success => "success",
			Self::Info => "info",
			Self::Warning => "warning",
			Self::Error => "error",
			Self::Plain => "",
		}
	}

	pub fn is_danger(&self) -> bool {
		matches!(self, Self::Error | Self::Warning)
	}
}

/// A notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
	pub title: String,
	pub message: String,
	pub kind: AlertKind,
	/// Text of the dismiss button; `None` shows no button.
	pub button: Option<String>,
	/// Auto-dismiss delay.
	pub timer: Option<Duration>,
}

impl Alert {
	pub fn new(message: impl Into<String>, title: impl Into<String>, kind: AlertKind) -> Self {
		Self {
			title: title.into(),
			message: message.into(),
			kind,
			button: None,
			timer: None,
		}
	}

	/// With a dismiss button. Buttoned alerts wait for the user.
	pub fn with_button(mut self, text: impl Into<String>) -> Self {
		self.button = Some(text.into()).filter(|t| !t.is_empty());
		if self.button.is_some() {
			self.timer = None;
		}
		self
	}

	pub fn with_timer(mut self, timer: Duration) -> Self {
		if self.button.is_none() {
			self.timer = Some(timer);
		}
		self
	}

	pub fn danger_mode(&self) -> bool {
		self.kind.is_danger()
	}

	/// Applies the presentation rules. Error alerts keep their button text
	/// or get `Ok`, and are never timed.
	pub fn normalized(mut self) -> Self {
		if self.kind == AlertKind::Error {
			self.timer = None;
			if self.button.is_none() {
				self.button = Some("Ok".to_string());
			}
		}
		if self.button.is_some() {
			self.timer = None;
		}
		self
	}
}

/// A yes/no question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
	pub title: String,
	pub message: String,
	pub kind: AlertKind,
	pub accept: String,
	pub cancel: String,
}

impl ConfirmDialog {
	pub fn new(message: impl Into<String>, title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			message: message.into(),
			kind: AlertKind::Warning,
			accept: "Yes".to_string(),
			cancel: "No".to_string(),
		}
	}

	pub fn with_kind(mut self, kind: AlertKind) -> Self {
		self.kind = kind;
		self
	}

	pub fn with_buttons(mut self, accept: impl Into<String>, cancel: impl Into<String>) -> Self {
		self.accept = accept.into();
		self.cancel = cancel.into();
		self
	}

	pub fn danger_mode(&self) -> bool {
		self.kind.is_danger()
	}
}

/// A confirmation with a text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDialog {
	pub dialog: ConfirmDialog,
	pub placeholder: Option<String>,
	/// The input's type attribute (`text`, `email`, ...).
	pub input_type: String,
	pub value: Option<String>,
}

/// A confirmation with a choice between options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectDialog {
	pub dialog: ConfirmDialog,
	/// Option value to label, in display order.
	pub options: IndexMap<String, String>,
	pub value: Option<String>,
	pub placeholder: Option<String>,
}

/// Shows dialogs. Every method resolves once the dialog is gone.
#[async_trait]
pub trait DialogBackend: Send + Sync + fmt::Debug {
	async fn alert(&self, alert: &Alert);

	/// `true` when the user accepted.
	async fn confirm(&self, dialog: &ConfirmDialog) -> bool;

	/// The entered text, or `None` when cancelled.
	async fn prompt(&self, dialog: &PromptDialog) -> Option<String>;

	/// The chosen option value, or `None` when cancelled.
	async fn select(&self, dialog: &SelectDialog) -> Option<String>;
}

/// Applies presentation rules on top of a [`DialogBackend`].
#[derive(Debug, Clone)]
pub struct NotificationPresenter {
	backend: Arc<dyn DialogBackend>,
}

impl NotificationPresenter {
	pub fn new(backend: Arc<dyn DialogBackend>) -> Self {
		Self { backend }
	}

	/// Shows `alert` and waits for it to be dismissed.
	pub async fn show(&self, alert: Alert) {
		let alert = alert.normalized();
		tracing::debug!(kind = alert.kind.as_str(), title = %alert.title, "showing alert");
		self.backend.alert(&alert).await;
	}

	pub async fn confirm(&self, dialog: &ConfirmDialog) -> bool {
		let accepted = self.backend.confirm(dialog).await;
		tracing::debug!(accepted, title = %dialog.title, "confirm dialog closed");
		accepted
	}

	/// Asks for a line of text.
	pub async fn ask(
		&self,
		dialog: ConfirmDialog,
		placeholder: Option<String>,
		input_type: Option<&str>,
		value: Option<String>,
	) -> Option<String> {
		let prompt = PromptDialog {
			dialog,
			placeholder,
			input_type: input_type.unwrap_or("text").to_string(),
			value,
		};
		self.backend.prompt(&prompt).await
	}

	/// Asks for one of `options`. A preselected value that is not among
	/// the options is dropped.
	pub async fn select(
		&self,
		dialog: ConfirmDialog,
		options: IndexMap<String, String>,
		value: Option<String>,
		placeholder: Option<String>,
	) -> Option<String> {
		let value = value.filter(|v| options.contains_key(v));
		let select = SelectDialog {
			dialog,
			options,
			value,
			placeholder,
		};
		let chosen = self.backend.select(&select).await?;
		if select.options.contains_key(&chosen) {
			Some(chosen)
		} else {
			tracing::warn!(value = %chosen, "dialog returned a value that is not an option");
			None
		}
	}

	/// Quick action: confirm, dispatch, show the interpreted response, then
	/// resolve with the response body or reject with it.
	///
	/// Declining the confirmation rejects with [`RequestError::Declined`]
	/// without sending anything. A transport failure shows the default error
	/// alert before rejecting with [`RequestError::Transport`].
	pub async fn send(
		&self,
		transport: &dyn Transport,
		action: QuickAction,
		options: &InterpretOptions,
	) -> Result<ServerResponse, RequestError> {
		if !self.confirm(&action.dialog).await {
			return Err(RequestError::Declined);
		}

		let request = SubmitRequest {
			method: action.method,
			url: action.url,
			payload: action.data,
			headers: action.headers,
		};
		let url = request.url.clone();
		let reply = match transport.send(request).await {
			Ok(reply) => reply,
			Err(err) => {
				// Same error alert as a failed response without a body.
				tracing::error!(%url, error = %err, "quick action failed");
				let response = ServerResponse::from_value(Value::Null);
				if let Some(alert) = interpret(&response, false, options).alert {
					self.show(alert).await;
				}
				return Err(err.into());
			}
		};
		let success = reply.is_success();
		let response = ServerResponse::from_value(reply.body.clone());

		if let Some(alert) = interpret(&response, success, options).alert {
			self.show(alert).await;
		}

		if success {
			Ok(response)
		} else {
			Err(RequestError::Rejected {
				status: reply.status,
				body: reply.body,
			})
		}
	}
}

/// A one-off request guarded by a confirmation.
#[derive(Debug, Clone)]
pub struct QuickAction {
	pub url: String,
	pub method: HttpMethod,
	pub data: Payload,
	pub dialog: ConfirmDialog,
	pub headers: Vec<(String, String)>,
}

impl QuickAction {
	/// A request confirmed with `dialog`.
	pub fn new(url: impl Into<String>, method: HttpMethod, dialog: ConfirmDialog) -> Self {
		Self {
			url: url.into(),
			method,
			data: Payload::new(),
			dialog,
			headers: Vec::new(),
		}
	}

	pub fn with_data(mut self, data: Payload) -> Self {
		self.data = data;
		self
	}

	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));
		self
	}
}
