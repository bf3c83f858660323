//! Debounce timers
//!
//! One timer per key. Scheduling a key that already has a timer replaces
//! it, so only the latest request for a key ever fires.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

/// Deadlines keyed by `K`, without any threads or tasks behind them. The
/// owner asks which keys are due and runs them itself.
///
/// ```
/// use formwire_forms::debounce::Debouncer;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let mut timers = Debouncer::new();
/// timers.schedule("email", start + Duration::from_millis(100));
/// timers.schedule("email", start + Duration::from_millis(200));
///
/// assert!(timers.take_due(start + Duration::from_millis(150)).is_empty());
/// assert_eq!(timers.take_due(start + Duration::from_millis(200)), vec!["email"]);
/// ```
#[derive(Debug, Clone)]
pub struct Debouncer<K> {
	timers: HashMap<K, Timer>,
	sequence: u64,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
	deadline: Instant,
	sequence: u64,
}

impl<K> Default for Debouncer<K> {
	fn default() -> Self {
		Self {
			timers: HashMap::new(),
			sequence: 0,
		}
	}
}

impl<K: Eq + Hash + Clone> Debouncer<K> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Arms the timer for `key`. Returns `true` if an earlier timer was
	/// superseded.
	pub fn schedule(&mut self, key: K, deadline: Instant) -> bool {
		self.sequence += 1;
		let timer = Timer {
			deadline,
			sequence: self.sequence,
		};
		self.timers.insert(key, timer).is_some()
	}

	pub fn cancel(&mut self, key: &K) -> bool {
		self.timers.remove(key).is_some()
	}

	/// Cancels every timer whose key matches. Returns how many were removed.
	pub fn cancel_where<F: Fn(&K) -> bool>(&mut self, matches: F) -> usize {
		let before = self.timers.len();
		self.timers.retain(|key, _| !matches(key));
		before - self.timers.len()
	}

	pub fn is_scheduled(&self, key: &K) -> bool {
		self.timers.contains_key(key)
	}

	/// Removes and returns the keys due at `now`, earliest first. Keys with
	/// the same deadline come out in the order they were scheduled.
	pub fn take_due(&mut self, now: Instant) -> Vec<K> {
		let mut due: Vec<(K, Timer)> = self
			.timers
			.iter()
			.filter(|(_, t)| t.deadline <= now)
			.map(|(k, t)| (k.clone(), *t))
			.collect();
		due.sort_by_key(|(_, t)| (t.deadline, t.sequence));
		for (key, _) in &due {
			self.timers.remove(key);
		}
		due.into_iter().map(|(k, _)| k).collect()
	}

	/// Removes and returns every key regardless of deadline.
	pub fn take_all(&mut self) -> Vec<K> {
		let mut all: Vec<(K, Timer)> = self.timers.drain().collect();
		all.sort_by_key(|(_, t)| (t.deadline, t.sequence));
		all.into_iter().map(|(k, _)| k).collect()
	}

	pub fn next_deadline(&self) -> Option<Instant> {
		self.timers.values().map(|t| t.deadline).min()
	}

	pub fn len(&self) -> usize {
		self.timers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.timers.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;
	use std::time::Duration;

	fn ms(n: u64) -> Duration {
		Duration::from_millis(n)
	}

	#[rstest]
	fn test_reschedule_supersedes() {
		let start = Instant::now();
		let mut timers = Debouncer::new();

		assert!(!timers.schedule(1, start + ms(100)));
		assert!(timers.schedule(1, start + ms(300)));

		assert_eq!(timers.len(), 1);
		assert_eq!(timers.next_deadline(), Some(start + ms(300)));
	}

	#[rstest]
	fn test_take_due_orders_by_deadline_then_schedule_order() {
		let start = Instant::now();
		let mut timers = Debouncer::new();
		timers.schedule("c", start + ms(50));
		timers.schedule("a", start + ms(100));
		timers.schedule("b", start + ms(100));
		timers.schedule("late", start + ms(500));

		let due = timers.take_due(start + ms(100));

		assert_eq!(due, vec!["c", "a", "b"]);
		assert!(timers.is_scheduled(&"late"));
		assert_eq!(timers.len(), 1);
	}

	#[rstest]
	fn test_cancel_where() {
		let start = Instant::now();
		let mut timers = Debouncer::new();
		timers.schedule((1, 0), start);
		timers.schedule((1, 1), start);
		timers.schedule((2, 0), start);

		let removed = timers.cancel_where(|(field, _)| *field == 1);

		assert_eq!(removed, 2);
		assert_eq!(timers.take_all(), vec![(2, 0)]);
		assert!(timers.is_empty());
	}

	proptest! {
		#[test]
		fn prop_rapid_reschedules_fire_once(offsets in proptest::collection::vec(0u64..90, 1..20)) {
			let start = Instant::now();
			let mut timers = Debouncer::new();
			let mut fired = 0;
			let mut now = start;

			for offset in offsets {
				now = start + ms(offset).max(now - start);
				fired += timers.take_due(now).len();
				timers.schedule("field", now + ms(100));
			}
			fired += timers.take_due(now + ms(100)).len();

			prop_assert_eq!(fired, 1);
			prop_assert!(timers.is_empty());
		}
	}
}
