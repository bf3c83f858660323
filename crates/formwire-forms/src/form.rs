//! Form Controller
//!
//! A [`FormController`] owns its fields' state, drives their validation and
//! carries out submissions:
//!
//! ```text
//! Idle --submit--> Confirming --accepted--> Submitting --handled--> Idle
//!   |                  |
//!   |                  +--declined--> Idle
//!   +--invalid or already submitting--> prevented_submit event
//! ```
//!
//! Validation is clock driven. Edits schedule rule checks a debounce delay
//! ahead; [`FormController::run_pending`] runs those that are due,
//! [`FormController::flush`] runs all of them now and
//! [`FormController::settle`] waits until none are left.

use crate::csrf;
use crate::error::SubmitError;
use crate::events::{FormEvent, PreventReason};
use crate::field::{Field, FieldController, FieldId};
use crate::handle::FieldHandle;
use crate::notify::{AlertKind, ConfirmDialog, DialogBackend, NotificationPresenter};
use crate::page::{PageHost, ResponseTarget};
use crate::payload::Payload;
use crate::response::{AlertText, InterpretOptions, Navigation, ServerResponse, interpret};
use crate::transport::{SubmitRequest, Transport};
use crate::debounce::Debouncer;
use chrono::NaiveDateTime;
use formwire_conf::FormsSettings;
use formwire_core::{Clock, EventBus, FieldValue, HttpMethod, SystemClock};
use formwire_i18n::Translator;
use formwire_validators::{Evaluation, FieldLookup, PendingState, PendingVerdict, Rule, Verdict, evaluate};
use indexmap::IndexMap;
use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// When a submission asks for confirmation first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfirmPolicy {
	Never,
	/// Always confirm. Texts left unset are looked up as
	/// `confirm.<langKey|default>.<verb>.*`.
	Always(ConfirmText),
	/// Confirm `put`, `patch` and `delete` submissions of forms that name
	/// the object they act on.
	#[default]
	OnDestructiveVerb,
}

/// Overrides for the confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfirmText {
	pub title: Option<String>,
	pub message: Option<String>,
	pub kind: Option<AlertKind>,
	pub accept: Option<String>,
	pub cancel: Option<String>,
}

/// What happens to the fields after a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AfterSuccess {
	#[default]
	Keep,
	Clear,
	Reset,
}

/// Submission phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
	#[default]
	Idle,
	Confirming,
	Submitting,
}

/// State of the form's submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
	pub content: String,
	pub disabled: bool,
	pub loading: bool,
}

/// A native submission the host should now carry out itself.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeSubmission {
	pub method: HttpMethod,
	pub action: String,
	pub payload: Payload,
}

/// How a call to [`FormController::submit`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
	Prevented(PreventReason),
	/// The confirmation was declined.
	Cancelled,
	Native(NativeSubmission),
	Completed {
		success: bool,
		response: ServerResponse,
	},
}

#[derive(Debug, Clone)]
struct FormOptions {
	action: String,
	method: HttpMethod,
	static_data: Payload,
	confirm: ConfirmPolicy,
	object_name: Option<String>,
	lang_key: Option<String>,
	response_target: Option<ResponseTarget>,
	after_success: AfterSuccess,
	remove_on_success: Option<String>,
	native: bool,
	success_alert: bool,
	keep_loading_on_redirect: bool,
	event_name: String,
}

/// Builds a [`FormController`].
///
/// The dialog backend and the page host are required; so is the transport
/// unless the form submits natively.
pub struct FormBuilder {
	options: FormOptions,
	submit_content: String,
	settings: Option<Arc<FormsSettings>>,
	translator: Option<Arc<Translator>>,
	bus: Option<EventBus<FormEvent>>,
	clock: Option<Arc<dyn Clock>>,
	transport: Option<Arc<dyn Transport>>,
	dialogs: Option<Arc<dyn DialogBackend>>,
	page: Option<Arc<dyn PageHost>>,
}

impl FormBuilder {
	fn new(action: String, method: HttpMethod) -> Self {
		Self {
			options: FormOptions {
				action,
				method,
				static_data: Payload::new(),
				confirm: ConfirmPolicy::default(),
				object_name: None,
				lang_key: None,
				response_target: None,
				after_success: AfterSuccess::Keep,
				remove_on_success: None,
				native: false,
				success_alert: false,
				keep_loading_on_redirect: false,
				event_name: String::new(),
			},
			submit_content: String::new(),
			settings: None,
			translator: None,
			bus: None,
			clock: None,
			transport: None,
			dialogs: None,
			page: None,
		}
	}

	pub fn settings(mut self, settings: Arc<FormsSettings>) -> Self {
		self.settings = Some(settings);
		self
	}

	pub fn translator(mut self, translator: Arc<Translator>) -> Self {
		self.translator = Some(translator);
		self
	}

	/// The page session's bus. A form without one gets a private bus.
	pub fn bus(mut self, bus: EventBus<FormEvent>) -> Self {
		self.bus = Some(bus);
		self
	}

	pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);
		self
	}

	pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	pub fn dialogs(mut self, dialogs: Arc<dyn DialogBackend>) -> Self {
		self.dialogs = Some(dialogs);
		self
	}

	pub fn page(mut self, page: Arc<dyn PageHost>) -> Self {
		self.page = Some(page);
		self
	}

	/// Values submitted along with the fields. Fields win on name clashes.
	pub fn data(mut self, data: Payload) -> Self {
		self.options.static_data = data;
		self
	}

	pub fn confirm(mut self, policy: ConfirmPolicy) -> Self {
		self.options.confirm = policy;
		self
	}

	/// Names the object the form acts on (`{name}` in localized texts).
	pub fn object_name(mut self, name: impl Into<String>) -> Self {
		self.options.object_name = Some(name.into());
		self
	}

	pub fn lang_key(mut self, key: impl Into<String>) -> Self {
		self.options.lang_key = Some(key.into());
		self
	}

	/// Where `data` of a successful response goes.
	pub fn response_target(mut self, target: ResponseTarget) -> Self {
		self.options.response_target = Some(target);
		self
	}

	pub fn after_success(mut self, after: AfterSuccess) -> Self {
		self.options.after_success = after;
		self
	}

	/// Removes the element matching `selector` after a successful submission.
	pub fn remove_on_success(mut self, selector: impl Into<String>) -> Self {
		self.options.remove_on_success = Some(selector.into());
		self
	}

	/// Submits natively: the controller only prepares the payload.
	pub fn native(mut self, native: bool) -> Self {
		self.options.native = native;
		self
	}

	/// Shows `alert.<langKey|default>.<verb>.*` after successful
	/// submissions whose response has no alert.
	pub fn success_alert(mut self, enabled: bool) -> Self {
		self.options.success_alert = enabled;
		self
	}

	/// Leaves the loading indicator up when the response redirects.
	pub fn keep_loading_on_redirect(mut self, keep: bool) -> Self {
		self.options.keep_loading_on_redirect = keep;
		self
	}

	/// Overrides the event base name of the settings.
	pub fn event_name(mut self, name: impl Into<String>) -> Self {
		self.options.event_name = name.into();
		self
	}

	/// Content of the submit control while idle.
	pub fn submit_content(mut self, content: impl Into<String>) -> Self {
		self.submit_content = content.into();
		self
	}

	pub fn build(self) -> Result<FormController, SubmitError> {
		let dialogs = self.dialogs.ok_or(SubmitError::MissingService("dialog backend"))?;
		let page = self.page.ok_or(SubmitError::MissingService("page host"))?;
		if self.transport.is_none() && !self.options.native {
			return Err(SubmitError::MissingService("transport"));
		}
		let settings = self.settings.unwrap_or_default();
		let mut options = self.options;
		if options.event_name.is_empty() {
			options.event_name = settings.event_name.clone();
		}

		Ok(FormController {
			inner: Arc::new(FormInner {
				options,
				translator: self.translator.unwrap_or_else(|| Arc::new(Translator::bundled())),
				settings,
				bus: self.bus.unwrap_or_default(),
				clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
				transport: self.transport,
				presenter: NotificationPresenter::new(dialogs),
				page,
				state: Mutex::new(FormState::new(self.submit_content)),
			}),
		})
	}
}

struct FormInner {
	options: FormOptions,
	settings: Arc<FormsSettings>,
	translator: Arc<Translator>,
	bus: EventBus<FormEvent>,
	clock: Arc<dyn Clock>,
	transport: Option<Arc<dyn Transport>>,
	presenter: NotificationPresenter,
	page: Arc<dyn PageHost>,
	state: Mutex<FormState>,
}

struct FormState {
	fields: IndexMap<FieldId, FieldController>,
	next_id: u64,
	timers: Debouncer<(FieldId, usize)>,
	pending: Vec<PendingCheck>,
	overall_valid: bool,
	phase: SubmitPhase,
	button: SubmitButton,
	idle_content: String,
	destroyed: bool,
}

/// A rule check taken out of the lock to be evaluated.
struct Check {
	field: FieldId,
	slot: usize,
	generation: u64,
	name: String,
	value: FieldValue,
	rule: Rule,
}

/// A custom rule whose callback has not been resolved yet.
struct PendingCheck {
	field: FieldId,
	slot: usize,
	generation: u64,
	verdict: PendingVerdict,
}

/// Field values as seen by rules at one instant. The first registered
/// field of a name answers for it.
struct Snapshot {
	values: HashMap<String, FieldValue>,
	now: NaiveDateTime,
}

impl FieldLookup for Snapshot {
	fn field_value(&self, name: &str) -> Option<FieldValue> {
		self.values.get(name).cloned()
	}

	fn local_now(&self) -> NaiveDateTime {
		self.now
	}
}

impl FormState {
	fn new(idle_content: String) -> Self {
		Self {
			fields: IndexMap::new(),
			next_id: 1,
			timers: Debouncer::new(),
			pending: Vec::new(),
			overall_valid: true,
			phase: SubmitPhase::Idle,
			button: SubmitButton {
				content: idle_content.clone(),
				disabled: false,
				loading: false,
			},
			idle_content,
			destroyed: false,
		}
	}

	fn snapshot(&self, now: NaiveDateTime) -> Snapshot {
		let mut values = HashMap::with_capacity(self.fields.len());
		for field in self.fields.values() {
			values
				.entry(field.name().to_string())
				.or_insert_with(|| field.value().clone());
		}
		Snapshot { values, now }
	}

	/// Re-evaluates the hidden presence entries of every field but `except`,
	/// since a sibling's value may have changed what they require.
	fn recheck_presence(&mut self, now: NaiveDateTime, except: Option<FieldId>) {
		let snapshot = self.snapshot(now);
		for (id, field) in self.fields.iter_mut() {
			if except == Some(*id) {
				continue;
			}
			if field.recheck_presence(&snapshot) {
				tracing::debug!(field = %field.name(), valid = field.is_valid(), "presence requirement changed");
			}
		}
	}

	fn refresh_validity(&mut self, events: &mut Vec<FormEvent>) {
		let valid = self.fields.values().all(FieldController::is_valid);
		if valid != self.overall_valid {
			self.overall_valid = valid;
			tracing::debug!(valid, "form validity changed");
			events.push(FormEvent::Validated { valid });
		}
		if self.phase == SubmitPhase::Idle && !self.button.loading {
			self.button.disabled = !valid;
		}
	}

	fn start_loader(&mut self, loading_content: &str) {
		if self.button.loading {
			return;
		}
		self.idle_content = std::mem::replace(&mut self.button.content, loading_content.to_string());
		self.button.loading = true;
		self.button.disabled = true;
	}

	fn stop_loader(&mut self) {
		if !self.button.loading {
			return;
		}
		self.button.content = self.idle_content.clone();
		self.button.loading = false;
		self.button.disabled = !self.overall_valid;
	}

	fn payload(&self, static_data: &Payload) -> Payload {
		let mut fields = Payload::new();
		for field in self.fields.values() {
			fields.push(field.name(), field.value().clone());
		}
		let mut payload = Payload::new();
		for (name, value) in static_data.iter() {
			if !fields.contains(name) {
				payload.insert(name, value.clone());
			}
		}
		for (name, value) in fields.iter() {
			payload.insert(name, value.clone());
		}
		payload
	}
}

/// Controller of one form. Cloning yields another handle to the same form.
#[derive(Clone)]
pub struct FormController {
	inner: Arc<FormInner>,
}

impl fmt::Debug for FormController {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("FormController")
			.field("action", &self.inner.options.action)
			.field("method", &self.inner.options.method)
			.field("fields", &state.fields.len())
			.field("valid", &state.overall_valid)
			.field("phase", &state.phase)
			.finish()
	}
}

/// Resets the submission phase however `submit` is left, including when its
/// future is dropped mid-flight.
struct SubmitGuard<'a> {
	form: &'a FormController,
	keep_loading: bool,
}

impl Drop for SubmitGuard<'_> {
	fn drop(&mut self) {
		let mut events = Vec::new();
		{
			let mut st = self.form.inner.state.lock();
			st.phase = SubmitPhase::Idle;
			if !self.keep_loading {
				st.stop_loader();
			}
			st.refresh_validity(&mut events);
		}
		self.form.publish(events);
	}
}

impl FormController {
	/// Starts building a form submitting to `action` with `method`.
	pub fn builder(action: impl Into<String>, method: HttpMethod) -> FormBuilder {
		FormBuilder::new(action.into(), method)
	}

	fn lock(&self) -> MutexGuard<'_, FormState> {
		self.inner.state.lock()
	}

	fn publish(&self, events: Vec<FormEvent>) {
		for event in events {
			let name = event.bus_name(&self.inner.options.event_name);
			self.inner.bus.emit(&name, &event);
		}
	}

	pub fn action(&self) -> &str {
		&self.inner.options.action
	}

	pub fn method(&self) -> HttpMethod {
		self.inner.options.method
	}

	pub fn event_name(&self) -> &str {
		&self.inner.options.event_name
	}

	pub fn bus(&self) -> &EventBus<FormEvent> {
		&self.inner.bus
	}

	pub fn settings(&self) -> &FormsSettings {
		&self.inner.settings
	}

	pub fn translator(&self) -> &Translator {
		&self.inner.translator
	}

	pub fn presenter(&self) -> &NotificationPresenter {
		&self.inner.presenter
	}

	pub fn is_valid(&self) -> bool {
		self.lock().overall_valid
	}

	pub fn phase(&self) -> SubmitPhase {
		self.lock().phase
	}

	pub fn is_submitting(&self) -> bool {
		self.phase() != SubmitPhase::Idle
	}

	pub fn submit_button(&self) -> SubmitButton {
		self.lock().button.clone()
	}

	pub fn field_count(&self) -> usize {
		self.lock().fields.len()
	}

	pub fn is_destroyed(&self) -> bool {
		self.lock().destroyed
	}

	/// Whether any validation is scheduled or awaiting a custom verdict.
	pub fn has_pending(&self) -> bool {
		let st = self.lock();
		!st.timers.is_empty() || !st.pending.is_empty()
	}

	/// Visible messages of every field named `name`.
	pub fn errors_for(&self, name: &str) -> Vec<String> {
		self.lock()
			.fields
			.values()
			.filter(|f| f.name() == name)
			.flat_map(FieldController::visible_errors)
			.collect()
	}

	/// The payload a submission would send now.
	pub fn payload(&self) -> Payload {
		self.lock().payload(&self.inner.options.static_data)
	}

	/// Recomputes overall validity and returns it.
	pub fn validate(&self) -> bool {
		let mut events = Vec::new();
		let valid = {
			let mut st = self.lock();
			st.refresh_validity(&mut events);
			st.overall_valid
		};
		self.publish(events);
		valid
	}

	/// Registers a field. Presence rules are checked silently so that an
	/// untouched required field blocks submission without showing an error.
	pub fn register(&self, field: Field) -> Result<FieldHandle, SubmitError> {
		let mut events = Vec::new();
		let id = {
			let mut st = self.lock();
			if st.destroyed {
				return Err(SubmitError::Destroyed);
			}
			let id = FieldId(st.next_id);
			st.next_id += 1;
			tracing::debug!(field = %field.name(), ?id, "field registered");
			st.fields.insert(id, FieldController::new(id, field));

			let snapshot = st.snapshot(self.inner.clock.local_now());
			if let Some(controller) = st.fields.get_mut(&id) {
				controller.hold_presence(&snapshot);
			}
			st.recheck_presence(snapshot.now, Some(id));
			st.refresh_validity(&mut events);
			id
		};
		self.publish(events);
		Ok(FieldHandle::new(self.clone(), id))
	}

	pub(crate) fn deregister(&self, id: FieldId) {
		let mut events = Vec::new();
		{
			let mut st = self.lock();
			let Some(field) = st.fields.shift_remove(&id) else {
				return;
			};
			tracing::debug!(field = %field.name(), ?id, "field deregistered");
			st.timers.cancel_where(|(f, _)| *f == id);
			st.pending.retain(|p| p.field != id);
			st.recheck_presence(self.inner.clock.local_now(), None);
			st.refresh_validity(&mut events);
		}
		self.publish(events);
	}

	/// Discards every registration. Handles outlive the form harmlessly.
	pub fn destroy(&self) {
		let mut events = Vec::new();
		{
			let mut st = self.lock();
			st.fields.clear();
			st.timers.take_all();
			st.pending.clear();
			st.destroyed = true;
			st.refresh_validity(&mut events);
		}
		tracing::debug!(action = %self.inner.options.action, "form destroyed");
		self.publish(events);
	}

	pub(crate) fn with_field<R>(&self, id: FieldId, f: impl FnOnce(&FieldController) -> R) -> Option<R> {
		self.lock().fields.get(&id).map(f)
	}

	pub(crate) fn set_active(&self, id: FieldId, active: bool) {
		if let Some(field) = self.lock().fields.get_mut(&id) {
			field.set_active(active);
		}
	}

	/// Stores a new value and schedules its validation.
	///
	/// An empty value set on an inactive field is stored quietly: pending
	/// checks are dropped and only hidden presence entries remain.
	pub(crate) fn set_value(&self, id: FieldId, value: FieldValue) {
		let mut events = Vec::new();
		{
			let mut st = self.lock();
			let Some(field) = st.fields.get_mut(&id) else {
				tracing::debug!(?id, "value set on a detached field, ignored");
				return;
			};
			if !field.set_value(value) {
				return;
			}
			let name = field.name().to_string();
			let value = field.value().clone();
			let quiet = value.is_empty() && !field.is_active();
			let delays: Vec<_> = field
				.rules()
				.iter()
				.map(|r| r.debounce.unwrap_or(self.inner.settings.validation_delay()))
				.collect();

			events.push(FormEvent::InputChanged {
				field: name.clone(),
				value: value.clone(),
			});
			events.push(FormEvent::Changed {
				field: name.clone(),
				value,
			});

			st.pending.retain(|p| p.field != id);
			if quiet {
				st.timers.cancel_where(|(f, _)| *f == id);
				let snapshot = st.snapshot(self.inner.clock.local_now());
				if let Some(field) = st.fields.get_mut(&id) {
					field.quiet(&snapshot);
				}
			} else {
				let now = self.inner.clock.now();
				for (slot, delay) in delays.into_iter().enumerate() {
					if st.timers.schedule((id, slot), now + delay) {
						tracing::debug!(field = %name, slot, "validation superseded");
					}
				}
				tracing::debug!(field = %name, "validation scheduled");
			}
			st.recheck_presence(self.inner.clock.local_now(), Some(id));
			st.refresh_validity(&mut events);
		}
		self.publish(events);
	}

	/// Resets (`reset == true`) or clears one field.
	pub(crate) fn restore(&self, id: FieldId, reset: bool) {
		let mut events = Vec::new();
		{
			let mut st = self.lock();
			self.restore_locked(&mut st, id, reset, &mut events);
			st.recheck_presence(self.inner.clock.local_now(), Some(id));
			st.refresh_validity(&mut events);
		}
		self.publish(events);
	}

	fn restore_locked(&self, st: &mut FormState, id: FieldId, reset: bool, events: &mut Vec<FormEvent>) {
		st.timers.cancel_where(|(f, _)| *f == id);
		st.pending.retain(|p| p.field != id);
		let snapshot = st.snapshot(self.inner.clock.local_now());
		let Some(field) = st.fields.get_mut(&id) else {
			return;
		};
		let changed = if reset {
			field.reset(&snapshot)
		} else {
			field.clear(&snapshot)
		};
		if changed {
			let name = field.name().to_string();
			let value = field.value().clone();
			events.push(FormEvent::InputChanged {
				field: name.clone(),
				value: value.clone(),
			});
			events.push(FormEvent::Changed { field: name, value });
		}
	}

	/// Resets every field.
	pub fn reset_all(&self) {
		self.restore_all(true);
	}

	/// Clears every field.
	pub fn clear_all(&self) {
		self.restore_all(false);
	}

	fn restore_all(&self, reset: bool) {
		let mut events = Vec::new();
		{
			let mut st = self.lock();
			let ids: Vec<FieldId> = st.fields.keys().copied().collect();
			for id in ids {
				self.restore_locked(&mut st, id, reset, &mut events);
			}
			st.recheck_presence(self.inner.clock.local_now(), None);
			st.refresh_validity(&mut events);
		}
		self.publish(events);
	}

	/// Runs the checks whose debounce delay has passed and collects custom
	/// verdicts that arrived meanwhile. Returns how many checks ran.
	pub fn run_pending(&self) -> usize {
		let due = self.lock().timers.take_due(self.inner.clock.now());
		let ran = due.len();
		self.run_checks(due);
		self.poll_pending();
		ran
	}

	/// Runs every scheduled check now, regardless of its delay.
	pub fn flush(&self) -> usize {
		let all = self.lock().timers.take_all();
		let ran = all.len();
		self.run_checks(all);
		self.poll_pending();
		ran
	}

	/// Waits until no check is scheduled and every custom verdict is in.
	///
	/// A custom rule that never resolves its callback keeps this waiting.
	pub async fn settle(&self) {
		loop {
			self.run_pending();
			let (next, waiting) = {
				let mut st = self.lock();
				(st.timers.next_deadline(), std::mem::take(&mut st.pending))
			};

			if !waiting.is_empty() {
				let mut events = Vec::new();
				for check in waiting {
					let verdict = check.verdict.await;
					let mut st = self.lock();
					match verdict {
						Some(verdict) => {
							self.apply(&mut st, check.field, check.slot, check.generation, verdict);
						}
						None => tracing::debug!(field = ?check.field, "custom rule dropped its callback"),
					}
					st.refresh_validity(&mut events);
				}
				self.publish(events);
				continue;
			}

			let Some(deadline) = next else {
				break;
			};
			let wait = deadline.saturating_duration_since(self.inner.clock.now());
			if !wait.is_zero() {
				tokio::time::sleep(wait).await;
			}
			if self.inner.clock.now() < deadline {
				self.flush();
			}
		}
	}

	fn run_checks(&self, keys: Vec<(FieldId, usize)>) {
		if keys.is_empty() {
			return;
		}
		let (checks, snapshot) = {
			let st = self.lock();
			let snapshot = st.snapshot(self.inner.clock.local_now());
			let checks: Vec<Check> = keys
				.into_iter()
				.filter_map(|(id, slot)| {
					let field = st.fields.get(&id)?;
					Some(Check {
						field: id,
						slot,
						generation: field.generation(),
						name: field.name().to_string(),
						value: field.value().clone(),
						rule: field.rules().get(slot)?.clone(),
					})
				})
				.collect();
			(checks, snapshot)
		};

		// Custom predicates run without the lock held.
		let outcomes: Vec<(Check, Evaluation)> = checks
			.into_iter()
			.map(|check| {
				let evaluation = evaluate(&check.rule, &check.name, &check.value, &snapshot);
				(check, evaluation)
			})
			.collect();

		let mut events = Vec::new();
		{
			let mut st = self.lock();
			for (check, evaluation) in outcomes {
				match evaluation {
					Evaluation::Ready(verdict) => {
						self.apply(&mut st, check.field, check.slot, check.generation, verdict);
					}
					Evaluation::Pending(verdict) => st.pending.push(PendingCheck {
						field: check.field,
						slot: check.slot,
						generation: check.generation,
						verdict,
					}),
					Evaluation::NoVerdict => {
						tracing::debug!(field = %check.name, "custom rule dropped its callback")
					}
				}
			}
			st.refresh_validity(&mut events);
		}
		self.publish(events);
	}

	fn poll_pending(&self) {
		let mut events = Vec::new();
		{
			let mut st = self.lock();
			let pending = std::mem::take(&mut st.pending);
			for mut check in pending {
				match check.verdict.try_take() {
					PendingState::Ready(verdict) => {
						self.apply(&mut st, check.field, check.slot, check.generation, verdict);
					}
					PendingState::Waiting => st.pending.push(check),
					PendingState::Abandoned => {
						tracing::debug!(field = ?check.field, "custom rule dropped its callback")
					}
				}
			}
			st.refresh_validity(&mut events);
		}
		self.publish(events);
	}

	fn apply(&self, st: &mut FormState, id: FieldId, slot: usize, generation: u64, verdict: Verdict) {
		let Some(field) = st.fields.get_mut(&id) else {
			return;
		};
		if field.generation() != generation {
			tracing::debug!(field = %field.name(), slot, "stale verdict discarded");
			return;
		}
		let message = verdict.failure().map(|failure| {
			if failure.overridden {
				return failure.message.clone();
			}
			self.inner
				.translator
				.validation_message(field.lang_key(), &failure.key, &failure.attribute, &failure.params)
				.unwrap_or_else(|| failure.message.clone())
		});
		tracing::debug!(field = %field.name(), id = ?field.id(), slot, valid = message.is_none(), "validation completed");
		field.apply(slot, message);
	}

	/// Localized label of a field.
	pub(crate) fn label(&self, id: FieldId) -> Option<String> {
		self.with_field(id, |f| {
			self.inner
				.translator
				.field_label(f.lang_key(), f.name(), f.is_required())
		})
	}

	/// Submits the form.
	///
	/// Validation failures, a submission already in flight and a declined
	/// confirmation are outcomes, not errors. Transport failures go down the
	/// same path as failed responses.
	pub async fn submit(&self) -> Result<SubmitOutcome, SubmitError> {
		let options = &self.inner.options;
		let dialog = if options.native {
			None
		} else {
			self.confirm_dialog()
		};

		let mut events = Vec::new();
		let prevented = {
			let mut st = self.lock();
			if st.destroyed {
				return Err(SubmitError::Destroyed);
			}
			st.recheck_presence(self.inner.clock.local_now(), None);
			st.refresh_validity(&mut events);
			if st.phase != SubmitPhase::Idle {
				Some(PreventReason::AlreadySubmitting)
			} else if !st.overall_valid {
				Some(PreventReason::Invalid)
			} else {
				st.phase = if dialog.is_some() {
					SubmitPhase::Confirming
				} else {
					SubmitPhase::Submitting
				};
				None
			}
		};
		if let Some(reason) = prevented {
			tracing::debug!(action = %options.action, ?reason, "submit prevented");
			events.push(FormEvent::PreventedSubmit { reason });
			self.publish(events);
			return Ok(SubmitOutcome::Prevented(reason));
		}
		self.publish(events);

		let mut guard = SubmitGuard {
			form: self,
			keep_loading: false,
		};

		if options.native {
			guard.keep_loading = true;
			return Ok(SubmitOutcome::Native(self.prepare_native()));
		}

		if let Some(dialog) = dialog
			&& !self.inner.presenter.confirm(&dialog).await
		{
			tracing::debug!(action = %options.action, "submit cancelled at confirmation");
			return Ok(SubmitOutcome::Cancelled);
		}

		let transport = self
			.inner
			.transport
			.clone()
			.ok_or(SubmitError::MissingService("transport"))?;

		let payload = {
			let mut st = self.lock();
			st.phase = SubmitPhase::Submitting;
			st.start_loader(&self.inner.settings.loading_content);
			st.payload(&options.static_data)
		};
		self.publish(vec![FormEvent::Submitting]);

		let headers = csrf::header(self.inner.page.as_ref(), &self.inner.settings.csrf)
			.into_iter()
			.collect();
		let request = SubmitRequest {
			method: options.method,
			url: options.action.clone(),
			payload,
			headers,
		};
		tracing::debug!(action = %options.action, method = %options.method, "submitting");

		let (success, body) = match transport.send(request).await {
			Ok(reply) => (reply.is_success(), reply.body),
			Err(err) => {
				tracing::error!(action = %options.action, error = %err, "submission failed");
				(false, Value::Null)
			}
		};
		let response = ServerResponse::from_value(body);
		let plan = interpret(&response, success, &self.interpret_options());

		guard.keep_loading = options.keep_loading_on_redirect
			&& matches!(plan.navigation, Navigation::Redirect { .. });
		{
			let mut events = Vec::new();
			{
				let mut st = self.lock();
				if !guard.keep_loading {
					st.stop_loader();
				}
				st.refresh_validity(&mut events);
			}
			self.publish(events);
		}

		if let Some(alert) = plan.alert.clone() {
			self.inner.presenter.show(alert).await;
		}

		let page = self.inner.page.as_ref();
		if success {
			match (&plan.insert, &options.response_target) {
				(Some(html), Some(target)) => {
					page.insert_html(&target.selector, target.mode, html);
					page.rebind(&target.selector);
				}
				(Some(_), None) => tracing::debug!("response data ignored, no target configured"),
				_ => {}
			}
			match options.after_success {
				AfterSuccess::Keep => {}
				AfterSuccess::Clear => self.clear_all(),
				AfterSuccess::Reset => self.reset_all(),
			}
			if let Some(selector) = &options.remove_on_success {
				page.remove_element(selector);
			}
			self.publish(vec![FormEvent::Success {
				data: response.data.clone(),
			}]);
		} else {
			self.attach_server_errors(&plan.field_errors);
			self.publish(vec![FormEvent::Error {
				response: response.clone(),
			}]);
		}

		self.publish(vec![FormEvent::Response {
			success,
			method: options.method,
			response: response.clone(),
		}]);

		match &plan.navigation {
			Navigation::Redirect { url, reload } => {
				page.navigate(url);
				if *reload {
					page.reload();
				}
			}
			Navigation::Reload => page.reload(),
			Navigation::Stay => {}
		}

		drop(guard);
		tracing::debug!(action = %options.action, success, "submission handled");
		Ok(SubmitOutcome::Completed { success, response })
	}

	fn prepare_native(&self) -> NativeSubmission {
		let options = &self.inner.options;
		let mut payload = {
			let mut st = self.lock();
			st.start_loader(&self.inner.settings.loading_content);
			st.payload(&options.static_data)
		};
		if let Some((field, token)) = csrf::hidden_field(self.inner.page.as_ref(), &self.inner.settings.csrf) {
			payload.prepend(field, token);
		}
		tracing::debug!(action = %options.action, "native submission prepared");
		NativeSubmission {
			method: options.method,
			action: options.action.clone(),
			payload,
		}
	}

	fn attach_server_errors(&self, errors: &[(String, String)]) {
		if errors.is_empty() {
			return;
		}
		let mut events = Vec::new();
		{
			let mut st = self.lock();
			for (name, message) in errors {
				match st.fields.values_mut().find(|f| f.name() == name) {
					Some(field) => field.attach_server_error(message.clone()),
					None => tracing::debug!(field = %name, "server error for unknown field"),
				}
			}
			st.refresh_validity(&mut events);
		}
		self.publish(events);
	}

	fn object_params(&self) -> [(&str, &str); 1] {
		[("name", self.inner.options.object_name.as_deref().unwrap_or_default())]
	}

	fn confirm_dialog(&self) -> Option<ConfirmDialog> {
		let options = &self.inner.options;
		let text = match &options.confirm {
			ConfirmPolicy::Never => return None,
			ConfirmPolicy::Always(text) => text.clone(),
			ConfirmPolicy::OnDestructiveVerb
				if options.method.is_destructive() && options.object_name.is_some() =>
			{
				ConfirmText::default()
			}
			ConfirmPolicy::OnDestructiveVerb => return None,
		};

		let params = self.object_params();
		let lookup = |field: &str| {
			options.method.message_verb().and_then(|verb| {
				self.inner
					.translator
					.try_lookup("confirm", options.lang_key.as_deref(), verb, field, &params)
			})
		};
		Some(ConfirmDialog {
			title: text.title.or_else(|| lookup("title")).unwrap_or_default(),
			message: text.message.or_else(|| lookup("content")).unwrap_or_default(),
			kind: text.kind.unwrap_or(AlertKind::Warning),
			accept: text
				.accept
				.or_else(|| lookup("accept"))
				.unwrap_or_else(|| "Yes".to_string()),
			cancel: text
				.cancel
				.or_else(|| lookup("cancel"))
				.unwrap_or_else(|| "No".to_string()),
		})
	}

	fn interpret_options(&self) -> InterpretOptions {
		let options = &self.inner.options;
		let translator = &self.inner.translator;
		let mut interpret =
			InterpretOptions::from_settings(&self.inner.settings, self.inner.page.current_url());
		let Some(verb) = options.method.message_verb() else {
			return interpret;
		};
		let params = self.object_params();

		if options.success_alert {
			let lang_key = options.lang_key.as_deref();
			let title = translator.try_lookup("alert", lang_key, verb, "title", &params);
			let message = translator.try_lookup("alert", lang_key, verb, "content", &params);
			if let (Some(title), Some(message)) = (title, message) {
				interpret.success_fallback = Some(AlertText { title, message });
			}
		}
		if options.object_name.is_some() {
			if let Some(title) = translator.try_translate(&format!("alert.error.{verb}.title"), &params) {
				interpret.error_default.title = title;
			}
			if let Some(message) = translator.try_translate(&format!("alert.error.{verb}.content"), &params) {
				interpret.error_default.message = message;
			}
		}
		interpret
	}
}
