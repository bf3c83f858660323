//! Test doubles for the forms integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use formwire_conf::FormsSettings;
use formwire_core::{EventBus, HttpMethod, ManualClock};
use formwire_forms::error::TransportError;
use formwire_forms::notify::{Alert, ConfirmDialog, DialogBackend, PromptDialog, SelectDialog};
use formwire_forms::page::{InsertMode, PageHost};
use formwire_forms::{FormBuilder, FormController, FormEvent, Reply, SubmitRequest, Transport};
use futures::channel::oneshot;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// Ordered record of everything the doubles saw.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
	pub fn push(&self, entry: impl Into<String>) {
		self.0.lock().push(entry.into());
	}

	pub fn entries(&self) -> Vec<String> {
		self.0.lock().clone()
	}

	pub fn contains(&self, entry: &str) -> bool {
		self.0.lock().iter().any(|e| e == entry)
	}
}

/// Answers every request with the next scripted reply, or a 200 `{}` once
/// the script is exhausted.
#[derive(Debug, Default)]
pub struct RecordingTransport {
	replies: Mutex<VecDeque<Result<Reply, String>>>,
	requests: Mutex<Vec<SubmitRequest>>,
	gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl RecordingTransport {
	pub fn reply(&self, status: u16, body: Value) {
		self.replies.lock().push_back(Ok(Reply::new(status, body)));
	}

	pub fn fail(&self, message: &str) {
		self.replies.lock().push_back(Err(message.to_string()));
	}

	/// Holds the next request until the returned sender fires.
	pub fn hold(&self) -> oneshot::Sender<()> {
		let (tx, rx) = oneshot::channel();
		*self.gate.lock() = Some(rx);
		tx
	}

	pub fn requests(&self) -> Vec<SubmitRequest> {
		self.requests.lock().clone()
	}
}

#[async_trait]
impl Transport for RecordingTransport {
	async fn send(&self, request: SubmitRequest) -> Result<Reply, TransportError> {
		self.requests.lock().push(request);
		let gate = self.gate.lock().take();
		if let Some(gate) = gate {
			let _ = gate.await;
		}
		let next = self.replies.lock().pop_front();
		match next {
			Some(Ok(reply)) => Ok(reply),
			Some(Err(message)) => Err(TransportError::Network(message)),
			None => Ok(Reply::ok(Value::Object(Default::default()))),
		}
	}
}

/// Dialogs that answer confirmations with a fixed choice.
#[derive(Debug)]
pub struct ScriptedDialogs {
	pub accept: Mutex<bool>,
	pub alerts: Mutex<Vec<Alert>>,
	pub confirms: Mutex<Vec<ConfirmDialog>>,
	journal: Journal,
}

impl ScriptedDialogs {
	pub fn new(journal: Journal) -> Self {
		Self {
			accept: Mutex::new(true),
			alerts: Mutex::new(Vec::new()),
			confirms: Mutex::new(Vec::new()),
			journal,
		}
	}

	pub fn decline(&self) {
		*self.accept.lock() = false;
	}

	pub fn alerts(&self) -> Vec<Alert> {
		self.alerts.lock().clone()
	}

	pub fn confirms(&self) -> Vec<ConfirmDialog> {
		self.confirms.lock().clone()
	}
}

#[async_trait]
impl DialogBackend for ScriptedDialogs {
	async fn alert(&self, alert: &Alert) {
		self.journal.push(format!("alert:{}", alert.message));
		self.alerts.lock().push(alert.clone());
	}

	async fn confirm(&self, dialog: &ConfirmDialog) -> bool {
		self.journal.push(format!("confirm:{}", dialog.title));
		self.confirms.lock().push(dialog.clone());
		*self.accept.lock()
	}

	async fn prompt(&self, _dialog: &PromptDialog) -> Option<String> {
		None
	}

	async fn select(&self, _dialog: &SelectDialog) -> Option<String> {
		None
	}
}

/// A page at a fixed address, optionally carrying an anti-forgery token.
#[derive(Debug)]
pub struct FakePage {
	url: String,
	token: Option<String>,
	journal: Journal,
}

impl FakePage {
	pub fn new(url: &str, token: Option<&str>, journal: Journal) -> Self {
		Self {
			url: url.to_string(),
			token: token.map(str::to_string),
			journal,
		}
	}
}

impl PageHost for FakePage {
	fn current_url(&self) -> String {
		self.url.clone()
	}

	fn navigate(&self, url: &str) {
		self.journal.push(format!("navigate:{url}"));
	}

	fn reload(&self) {
		self.journal.push("reload");
	}

	fn insert_html(&self, selector: &str, mode: InsertMode, html: &str) {
		self.journal.push(format!("insert:{selector}:{mode:?}:{html}"));
	}

	fn rebind(&self, selector: &str) {
		self.journal.push(format!("rebind:{selector}"));
	}

	fn remove_element(&self, selector: &str) {
		self.journal.push(format!("remove:{selector}"));
	}

	fn meta_content(&self, name: &str) -> Option<String> {
		(name == "csrf-token").then(|| self.token.clone()).flatten()
	}
}

/// A form wired to doubles, plus the doubles themselves.
pub struct Harness {
	pub transport: Arc<RecordingTransport>,
	pub dialogs: Arc<ScriptedDialogs>,
	pub clock: Arc<ManualClock>,
	pub journal: Journal,
	pub events: Journal,
	pub bus: EventBus<FormEvent>,
	url: String,
	token: Option<String>,
}

impl Harness {
	pub fn new(url: &str) -> Self {
		let journal = Journal::default();
		let events = Journal::default();
		let bus = EventBus::new();
		let recorder = events.clone();
		bus.subscribe_all(move |name: &str, _event: &FormEvent| recorder.push(name));
		Self {
			transport: Arc::new(RecordingTransport::default()),
			dialogs: Arc::new(ScriptedDialogs::new(journal.clone())),
			clock: Arc::new(ManualClock::new()),
			journal,
			events,
			bus,
			url: url.to_string(),
			token: Some("secret-token".to_string()),
		}
	}

	pub fn without_token(mut self) -> Self {
		self.token = None;
		self
	}

	/// A builder with every service already set.
	pub fn builder(&self, action: &str, method: HttpMethod) -> FormBuilder {
		FormController::builder(action, method)
			.settings(Arc::new(FormsSettings::default()))
			.bus(self.bus.clone())
			.clock(self.clock.clone())
			.transport(self.transport.clone())
			.dialogs(self.dialogs.clone())
			.page(Arc::new(FakePage::new(
				&self.url,
				self.token.as_deref(),
				self.journal.clone(),
			)))
	}

	pub fn form(&self, action: &str, method: HttpMethod) -> FormController {
		self.builder(action, method).build().unwrap()
	}
}
