//! Fixed window counter
//!
//! `(window_start, attempts)` is packed into a single `AtomicU64` (seconds in the high
//! half, count in the low half) and advanced with a compare-and-swap loop, so the
//! window reset, the limit check and the increment form one atomic step. Concurrent
//! callers can never be admitted past the limit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::prelude::*;

/// A slot granted by `try_acquire`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquired {
	/// Start of the window the slot was taken from, needed to `release` it
	pub window_start: u32,
	pub remaining: u32,
}

#[derive(Debug)]
pub struct FixedWindowCounter {
	state: AtomicU64,
	window_secs: i64,
}

fn pack(start: u32, attempts: u32) -> u64 {
	(u64::from(start) << 32) | u64::from(attempts)
}

fn unpack(state: u64) -> (u32, u32) {
	let start = u32::try_from(state >> 32).unwrap_or(u32::MAX);
	let attempts = u32::try_from(state & 0xffff_ffff).unwrap_or(u32::MAX);
	(start, attempts)
}

/// Clamp a timestamp into the packed representation (valid until 2106)
fn secs(ts: Timestamp) -> u32 {
	u32::try_from(ts.0.max(0)).unwrap_or(u32::MAX)
}

impl FixedWindowCounter {
	/// A counter whose first window opens at `now`
	pub fn new(window: Duration, now: Timestamp) -> Self {
		let window_secs = i64::try_from(window.as_secs()).unwrap_or(i64::MAX).max(1);
		Self { state: AtomicU64::new(pack(secs(now), 0)), window_secs }
	}

	fn elapsed(&self, start: u32, now: u32) -> bool {
		i64::from(now) - i64::from(start) >= self.window_secs
	}

	/// Take one slot, or return how long until the window resets
	pub fn try_acquire(&self, now: Timestamp, limit: u32) -> Result<Acquired, Duration> {
		let now = secs(now);
		let mut current = self.state.load(Ordering::Acquire);
		loop {
			let (mut start, mut attempts) = unpack(current);
			if self.elapsed(start, now) {
				start = now;
				attempts = 0;
			}

			if attempts >= limit {
				let reset_in = (i64::from(start) + self.window_secs - i64::from(now)).max(0);
				return Err(Duration::from_secs(u64::try_from(reset_in).unwrap_or(0)));
			}

			let next = pack(start, attempts + 1);
			match self.state.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
			{
				Ok(_) => return Ok(Acquired { window_start: start, remaining: limit - attempts - 1 }),
				Err(actual) => current = actual,
			}
		}
	}

	/// Give back a slot taken in `window_start`. No-op once that window has rolled over.
	pub fn release(&self, window_start: u32) {
		let mut current = self.state.load(Ordering::Acquire);
		loop {
			let (start, attempts) = unpack(current);
			if start != window_start || attempts == 0 {
				return;
			}
			let next = pack(start, attempts - 1);
			match self.state.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
			{
				Ok(_) => return,
				Err(actual) => current = actual,
			}
		}
	}

	/// Attempts counted in the window active at `now`
	pub fn attempts(&self, now: Timestamp) -> u32 {
		let (start, attempts) = unpack(self.state.load(Ordering::Acquire));
		if self.elapsed(start, secs(now)) { 0 } else { attempts }
	}

	pub fn is_expired(&self, now: Timestamp) -> bool {
		let (start, _) = unpack(self.state.load(Ordering::Acquire));
		self.elapsed(start, secs(now))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;
	use std::sync::atomic::AtomicU32;

	const MINUTE: Duration = Duration::from_secs(60);

	#[test]
	fn test_pack_unpack() {
		assert_eq!(unpack(pack(1_700_000_000, 42)), (1_700_000_000, 42));
		assert_eq!(unpack(pack(u32::MAX, u32::MAX)), (u32::MAX, u32::MAX));
	}

	#[test]
	fn test_limit_then_reset() {
		let t0 = Timestamp(1_000);
		let counter = FixedWindowCounter::new(MINUTE, t0);

		assert_eq!(counter.try_acquire(t0, 3).unwrap().remaining, 2);
		assert_eq!(counter.try_acquire(t0.add_seconds(10), 3).unwrap().remaining, 1);
		assert_eq!(counter.try_acquire(t0.add_seconds(20), 3).unwrap().remaining, 0);
		assert_eq!(counter.try_acquire(t0.add_seconds(30), 3), Err(Duration::from_secs(30)));
		assert_eq!(counter.attempts(t0.add_seconds(59)), 3);

		// window elapsed: counter resets and the next request is admitted
		let later = t0.add_seconds(60);
		assert!(counter.is_expired(later));
		let acquired = counter.try_acquire(later, 3).unwrap();
		assert_eq!(acquired, Acquired { window_start: 1_060, remaining: 2 });
	}

	#[test]
	fn test_zero_limit_rejects() {
		let t0 = Timestamp(0);
		let counter = FixedWindowCounter::new(MINUTE, t0);
		assert_eq!(counter.try_acquire(t0, 0), Err(MINUTE));
	}

	#[test]
	fn test_release_only_in_same_window() {
		let t0 = Timestamp(5_000);
		let counter = FixedWindowCounter::new(MINUTE, t0);
		let acquired = counter.try_acquire(t0, 1).unwrap();
		assert!(counter.try_acquire(t0, 1).is_err());

		counter.release(acquired.window_start);
		assert_eq!(counter.attempts(t0), 0);
		assert!(counter.try_acquire(t0, 1).is_ok());

		// a stale release does not touch the new window
		let later = t0.add_seconds(61);
		counter.try_acquire(later, 5).unwrap();
		counter.release(acquired.window_start);
		assert_eq!(counter.attempts(later), 1);
	}

	#[test]
	fn test_concurrent_acquire_never_exceeds_limit() {
		const LIMIT: u32 = 25;
		let t0 = Timestamp(1_000);
		let counter = Arc::new(FixedWindowCounter::new(MINUTE, t0));
		let admitted = Arc::new(AtomicU32::new(0));

		let handles: Vec<_> = (0..16)
			.map(|_| {
				let counter = Arc::clone(&counter);
				let admitted = Arc::clone(&admitted);
				std::thread::spawn(move || {
					for _ in 0..20 {
						if counter.try_acquire(t0, LIMIT).is_ok() {
							admitted.fetch_add(1, Ordering::SeqCst);
						}
					}
				})
			})
			.collect();
		for handle in handles {
			handle.join().unwrap();
		}

		assert_eq!(admitted.load(Ordering::SeqCst), LIMIT);
		assert_eq!(counter.attempts(t0), LIMIT);
	}
}

// vim: ts=4
