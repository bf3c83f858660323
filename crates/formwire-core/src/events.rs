//! Scoped publish/subscribe channel
//!
//! An [`EventBus`] is constructed with the page session that owns it and
//! handed to every form and field that publishes on it. Listeners subscribe
//! by event name; names follow the conventions in [`names`].
//!
//! Receivers run synchronously, in subscription order, on the emitting
//! thread. The receiver list is snapshotted before dispatch so a receiver
//! may subscribe, unsubscribe or emit without deadlocking.
//!
//! ```
//! use formwire_core::EventBus;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let bus: EventBus<String> = EventBus::new();
//! let hits = Arc::new(AtomicUsize::new(0));
//! let counter = hits.clone();
//! bus.subscribe("email-input-changed", move |_value: &String| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! bus.emit("email-input-changed", &"a@b.com".to_string());
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

type ReceiverFn<T> = Arc<dyn Fn(&T) + Send + Sync>;
type WildcardFn<T> = Arc<dyn Fn(&str, &T) + Send + Sync>;

/// Identifies one subscription so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Receiver<T> {
	id: SubscriptionId,
	callback: ReceiverFn<T>,
}

impl<T> Clone for Receiver<T> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			callback: Arc::clone(&self.callback),
		}
	}
}

struct Inner<T> {
	receivers: RwLock<HashMap<String, Vec<Receiver<T>>>>,
	wildcard: RwLock<Vec<(SubscriptionId, WildcardFn<T>)>>,
	next_id: AtomicU64,
	closed: AtomicBool,
}

/// A named-event publish/subscribe channel.
///
/// Cloning an `EventBus` yields another handle to the same channel.
pub struct EventBus<T: 'static> {
	inner: Arc<Inner<T>>,
}

impl<T: 'static> Clone for EventBus<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T: 'static> Default for EventBus<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: 'static> fmt::Debug for EventBus<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventBus")
			.field("events", &self.inner.receivers.read().len())
			.field("closed", &self.is_closed())
			.finish()
	}
}

impl<T: 'static> EventBus<T> {
	pub fn new() -> Self {
		Self {
			inner: Arc::new(Inner {
				receivers: RwLock::new(HashMap::new()),
				wildcard: RwLock::new(Vec::new()),
				next_id: AtomicU64::new(1),
				closed: AtomicBool::new(false),
			}),
		}
	}

	fn next_id(&self) -> SubscriptionId {
		SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
	}

	/// Subscribes `callback` to events published under `name`.
	pub fn subscribe<F>(&self, name: impl Into<String>, callback: F) -> SubscriptionId
	where
		F: Fn(&T) + Send + Sync + 'static,
	{
		let id = self.next_id();
		self.inner
			.receivers
			.write()
			.entry(name.into())
			.or_default()
			.push(Receiver {
				id,
				callback: Arc::new(callback),
			});
		id
	}

	/// Subscribes `callback` to every event, receiving the event name too.
	pub fn subscribe_all<F>(&self, callback: F) -> SubscriptionId
	where
		F: Fn(&str, &T) + Send + Sync + 'static,
	{
		let id = self.next_id();
		self.inner.wildcard.write().push((id, Arc::new(callback)));
		id
	}

	/// Removes a subscription. Returns `false` if it was not registered.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut removed = false;
		{
			let mut receivers = self.inner.receivers.write();
			for list in receivers.values_mut() {
				let before = list.len();
				list.retain(|r| r.id != id);
				removed |= list.len() != before;
			}
			receivers.retain(|_, list| !list.is_empty());
		}
		let mut wildcard = self.inner.wildcard.write();
		let before = wildcard.len();
		wildcard.retain(|(wid, _)| *wid != id);
		removed || wildcard.len() != before
	}

	/// Publishes `payload` under `name`. Returns the number of receivers run.
	///
	/// Emitting on a closed bus is a no-op.
	pub fn emit(&self, name: &str, payload: &T) -> usize {
		if self.is_closed() {
			tracing::debug!(event = name, "event emitted on closed bus, dropped");
			return 0;
		}

		let named: Vec<Receiver<T>> = self
			.inner
			.receivers
			.read()
			.get(name)
			.cloned()
			.unwrap_or_default();
		let wildcard: Vec<WildcardFn<T>> = self
			.inner
			.wildcard
			.read()
			.iter()
			.map(|(_, f)| Arc::clone(f))
			.collect();

		for receiver in &named {
			(receiver.callback)(payload);
		}
		for callback in &wildcard {
			callback(name, payload);
		}
		named.len() + wildcard.len()
	}

	/// Number of receivers subscribed to `name` (wildcards excluded).
	pub fn receiver_count(&self, name: &str) -> usize {
		self.inner
			.receivers
			.read()
			.get(name)
			.map_or(0, Vec::len)
	}

	/// Tears the bus down: all subscriptions are dropped and later emits
	/// are ignored. Called when the owning page session ends.
	pub fn close(&self) {
		self.inner.closed.store(true, Ordering::SeqCst);
		self.inner.receivers.write().clear();
		self.inner.wildcard.write().clear();
	}

	pub fn is_closed(&self) -> bool {
		self.inner.closed.load(Ordering::SeqCst)
	}
}

/// Event name conventions.
pub mod names {
	/// `"<field>-input-changed"`: a field's value changed.
	pub fn input_changed(field: &str) -> String {
		format!("{}-input-changed", field)
	}

	/// `"submitting-<eventName>"`: the form is about to dispatch.
	pub fn submitting(event_name: &str) -> String {
		format!("submitting-{}", event_name)
	}

	/// `"response-<eventName>"`: the response has been handled.
	pub fn response(event_name: &str) -> String {
		format!("response-{}", event_name)
	}

	/// `"validated-<eventName>"`: the form's overall validity changed.
	pub fn validated(event_name: &str) -> String {
		format!("validated-{}", event_name)
	}

	/// `"prevented_submit-<eventName>"`: a submit request was rejected.
	pub fn prevented_submit(event_name: &str) -> String {
		format!("prevented_submit-{}", event_name)
	}

	/// `"change-<eventName>"`: one of the form's fields changed.
	pub fn change(event_name: &str) -> String {
		format!("change-{}", event_name)
	}

	/// `"success-<eventName>"`: the submission succeeded.
	pub fn success(event_name: &str) -> String {
		format!("success-{}", event_name)
	}

	/// `"error-<eventName>"`: the submission failed.
	pub fn error(event_name: &str) -> String {
		format!("error-{}", event_name)
	}
}
