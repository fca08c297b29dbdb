//! Rate gate
//!
//! Per-minute request ceilings with a global tier and a per-user tier, each a fixed
//! window counter per bucket. Limits are read from the settings store on every
//! admission, so they can be changed at runtime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use super::window::FixedWindowCounter;
use crate::prelude::*;
use crate::settings::{SettingScope, SettingsStore};
use worksuite_types::clock::Clock;

pub const GLOBAL_RATE_LIMIT_KEY: &str = "global_rate_limit";
pub const USER_RATE_LIMIT_KEY: &str = "user_rate_limit";

#[derive(Debug, Clone)]
pub struct RateGateConfig {
	pub window: Duration,
	/// Scope the limit settings are read from
	pub settings_scope: SettingScope,
	/// Used while `global_rate_limit` is not configured
	pub default_global_limit: u32,
	/// Used while `user_rate_limit` is not configured
	pub default_user_limit: u32,
}

impl Default for RateGateConfig {
	fn default() -> Self {
		Self {
			window: Duration::from_secs(60),
			settings_scope: SettingScope::Global,
			default_global_limit: 60,
			default_user_limit: 10,
		}
	}
}

/// Remaining capacity after an admitted request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
	pub global_remaining: u32,
	pub user_remaining: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CounterKey {
	Global(Box<str>),
	User(Box<str>, OwnerId),
}

pub struct RateGate {
	settings: Arc<SettingsStore>,
	clock: Arc<dyn Clock>,
	config: RateGateConfig,
	counters: RwLock<HashMap<CounterKey, Arc<FixedWindowCounter>>>,
}

fn clamp_limit(limit: i64) -> u32 {
	u32::try_from(limit.max(0)).unwrap_or(u32::MAX)
}

impl RateGate {
	pub fn new(settings: Arc<SettingsStore>, clock: Arc<dyn Clock>, config: RateGateConfig) -> Self {
		Self { settings, clock, config, counters: RwLock::new(HashMap::new()) }
	}

	pub fn config(&self) -> &RateGateConfig {
		&self.config
	}

	/// Current `(global, user)` limits. Negative values count as zero.
	pub async fn limits(&self) -> SuiteResult<(u32, u32)> {
		let scope = &self.config.settings_scope;
		let global = self
			.settings
			.get_int(scope, GLOBAL_RATE_LIMIT_KEY, i64::from(self.config.default_global_limit))
			.await?;
		let user = self
			.settings
			.get_int(scope, USER_RATE_LIMIT_KEY, i64::from(self.config.default_user_limit))
			.await?;
		Ok((clamp_limit(global), clamp_limit(user)))
	}

	fn counter(&self, key: CounterKey, now: Timestamp) -> Arc<FixedWindowCounter> {
		if let Some(counter) = self.counters.read().get(&key) {
			return counter.clone();
		}
		self.counters
			.write()
			.entry(key)
			.or_insert_with(|| Arc::new(FixedWindowCounter::new(self.config.window, now)))
			.clone()
	}

	/// Admit or reject one request in `bucket`.
	///
	/// Rejection is `Error::RateLimitExceeded` naming the tier that refused. A request
	/// the user tier rejects gives its global slot back.
	pub async fn admit(&self, bucket: &str, user: Option<OwnerId>) -> SuiteResult<Admission> {
		let (global_limit, user_limit) = self.limits().await?;
		let now = self.clock.now();

		let global = self.counter(CounterKey::Global(bucket.into()), now);
		let acquired = global
			.try_acquire(now, global_limit)
			.map_err(|retry_after| reject(bucket, "global", retry_after))?;

		let user_remaining = match user {
			Some(owner_id) => {
				let counter = self.counter(CounterKey::User(bucket.into(), owner_id), now);
				match counter.try_acquire(now, user_limit) {
					Ok(slot) => Some(slot.remaining),
					Err(retry_after) => {
						global.release(acquired.window_start);
						return Err(reject(bucket, "user", retry_after));
					}
				}
			}
			None => None,
		};

		Ok(Admission { global_remaining: acquired.remaining, user_remaining })
	}

	/// Drop counters whose window has elapsed. Returns how many were removed.
	///
	/// A counter an admission is still holding stays, or a request arriving meanwhile
	/// would start a fresh counter for the same window.
	pub fn purge_expired(&self) -> usize {
		let now = self.clock.now();
		let mut counters = self.counters.write();
		let before = counters.len();
		counters.retain(|_, counter| Arc::strong_count(counter) > 1 || !counter.is_expired(now));
		let purged = before - counters.len();
		if purged > 0 {
			debug!("Purged {} expired rate counters", purged);
		}
		purged
	}

	pub fn tracked_counters(&self) -> usize {
		self.counters.read().len()
	}
}

fn reject(bucket: &str, scope: &'static str, retry_after: Duration) -> Error {
	warn!("Rate limited: bucket '{}' at {} level, retry after {:?}", bucket, scope, retry_after);
	Error::RateLimitExceeded { scope, retry_after }
}


// vim: ts=4
