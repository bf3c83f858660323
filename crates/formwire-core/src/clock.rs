//! Time sources
//!
//! Debounce deadlines are measured against a monotonic [`Instant`]; date
//! rules (`today`, `tomorrow`, ...) read the local wall-clock time. Both come
//! from a [`Clock`] so tests can drive time by hand with [`ManualClock`].

use chrono::NaiveDateTime;
use parking_lot::Mutex;
use std::fmt;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync + fmt::Debug {
	/// Monotonic time used for debounce deadlines.
	fn now(&self) -> Instant;

	/// Local wall-clock time used to resolve relative date tokens.
	fn local_now(&self) -> NaiveDateTime;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> Instant {
		Instant::now()
	}

	fn local_now(&self) -> NaiveDateTime {
		chrono::Local::now().naive_local()
	}
}

/// A clock that only moves when told to.
///
/// # Examples
///
/// ```
/// use formwire_core::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_millis(150));
/// assert_eq!(clock.now() - start, Duration::from_millis(150));
/// ```
#[derive(Debug)]
pub struct ManualClock {
	origin: Instant,
	local_origin: NaiveDateTime,
	elapsed: Mutex<Duration>,
}

impl ManualClock {
	pub fn new() -> Self {
		Self::with_local_time(chrono::Local::now().naive_local())
	}

	/// Starts the wall clock at `local`.
	pub fn with_local_time(local: NaiveDateTime) -> Self {
		Self {
			origin: Instant::now(),
			local_origin: local,
			elapsed: Mutex::new(Duration::ZERO),
		}
	}

	pub fn advance(&self, by: Duration) {
		*self.elapsed.lock() += by;
	}

	pub fn elapsed(&self) -> Duration {
		*self.elapsed.lock()
	}
}

impl Default for ManualClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Instant {
		self.origin + self.elapsed()
	}

	fn local_now(&self) -> NaiveDateTime {
		let elapsed = chrono::Duration::from_std(self.elapsed()).unwrap_or(chrono::Duration::zero());
		self.local_origin + elapsed
	}
}
