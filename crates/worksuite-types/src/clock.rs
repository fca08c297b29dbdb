//! Time source collaborator used for rate windows and `updated_at` stamps.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::types::Timestamp;

pub trait Clock: Send + Sync {
	fn now(&self) -> Timestamp;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> Timestamp {
		crate::types::now()
	}
}

/// Manually advanced clock for deterministic window tests
#[derive(Debug, Default)]
pub struct ManualClock {
	secs: AtomicI64,
}

impl ManualClock {
	pub fn new(start: Timestamp) -> Self {
		Self { secs: AtomicI64::new(start.0) }
	}

	pub fn advance(&self, seconds: i64) {
		self.secs.fetch_add(seconds, Ordering::SeqCst);
	}

	pub fn set(&self, ts: Timestamp) {
		self.secs.store(ts.0, Ordering::SeqCst);
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Timestamp {
		Timestamp(self.secs.load(Ordering::SeqCst))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_manual_clock_advance() {
		let clock = ManualClock::new(Timestamp(100));
		assert_eq!(clock.now(), Timestamp(100));
		clock.advance(59);
		assert_eq!(clock.now(), Timestamp(159));
		clock.set(Timestamp(5));
		assert_eq!(clock.now(), Timestamp(5));
	}
}

// vim: ts=4
