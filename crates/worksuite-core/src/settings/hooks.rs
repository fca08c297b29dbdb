//! Write hooks invoked by the settings store around every mutation
//!
//! Hooks run in registration order. A `before_write` error aborts the write and is
//! returned to the caller; `after_write` runs only for writes that reached persistence.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::types::SettingScope;
use crate::addon::AddonService;
use crate::prelude::*;
use worksuite_types::clock::Clock;

#[derive(Debug, Clone, Copy)]
pub enum WriteOp<'a> {
	Set(&'a Value),
	Delete,
}

impl WriteOp<'_> {
	pub fn action(&self) -> &'static str {
		match self {
			WriteOp::Set(_) => "set",
			WriteOp::Delete => "delete",
		}
	}
}

#[derive(Debug, Clone, Copy)]
pub struct WriteEvent<'a> {
	pub scope: &'a SettingScope,
	pub key: &'a str,
	pub op: WriteOp<'a>,
}

#[async_trait]
pub trait SettingsHook: Send + Sync {
	fn name(&self) -> &'static str;

	async fn before_write(&self, _event: &WriteEvent<'_>) -> SuiteResult<()> {
		Ok(())
	}

	async fn after_write(&self, _event: &WriteEvent<'_>) {}
}

/// Refuses module-scoped writes for modules missing from the registry
pub struct ModuleScopeGuard {
	addons: AddonService,
}

impl ModuleScopeGuard {
	pub fn new(addons: AddonService) -> Self {
		Self { addons }
	}
}

#[async_trait]
impl SettingsHook for ModuleScopeGuard {
	fn name(&self) -> &'static str {
		"module-scope-guard"
	}

	async fn before_write(&self, event: &WriteEvent<'_>) -> SuiteResult<()> {
		if let Some(module) = event.scope.module_name() {
			self.addons.require_module(module).inspect_err(|_| {
				warn!("Rejected {} of '{}': module '{}' is not registered", event.op.action(), event.key, module);
			})?;
		}
		Ok(())
	}
}

// Auditing
//**********

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
	pub scope: SettingScope,
	pub key: Box<str>,
	pub action: &'static str,
	pub value: Option<Value>,
	pub at: Timestamp,
}

pub trait AuditSink: Send + Sync {
	fn record(&self, record: AuditRecord);
}

/// Emits audit records as structured log events
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
	fn record(&self, record: AuditRecord) {
		info!(
			scope = %record.scope,
			key = %record.key,
			action = record.action,
			at = record.at.0,
			"setting changed"
		);
	}
}

/// Records setting changes while the auditing module is available
pub struct AuditTrail {
	addons: AddonService,
	audit_module: Box<str>,
	sink: Arc<dyn AuditSink>,
	clock: Arc<dyn Clock>,
}

impl AuditTrail {
	pub fn new(
		addons: AddonService,
		audit_module: impl Into<Box<str>>,
		sink: Arc<dyn AuditSink>,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self { addons, audit_module: audit_module.into(), sink, clock }
	}
}

#[async_trait]
impl SettingsHook for AuditTrail {
	fn name(&self) -> &'static str {
		"audit-trail"
	}

	async fn after_write(&self, event: &WriteEvent<'_>) {
		if !self.addons.is_module_available(&self.audit_module) {
			return;
		}
		self.sink.record(AuditRecord {
			scope: event.scope.clone(),
			key: event.key.into(),
			action: event.op.action(),
			value: match event.op {
				WriteOp::Set(value) => Some(value.clone()),
				WriteOp::Delete => None,
			},
			at: self.clock.now(),
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::registry::ModuleRegistry;
	use parking_lot::Mutex;
	use serde_json::json;
	use worksuite_types::clock::ManualClock;
	use worksuite_types::module_adapter::ModuleDescriptor;

	#[derive(Default)]
	struct CollectSink(Mutex<Vec<AuditRecord>>);

	impl AuditSink for CollectSink {
		fn record(&self, record: AuditRecord) {
			self.0.lock().push(record);
		}
	}

	fn addons() -> (Arc<ModuleRegistry>, AddonService) {
		let registry = Arc::new(
			ModuleRegistry::from_descriptors([
				ModuleDescriptor::core("HRCore", true),
				ModuleDescriptor::addon("Auditing", true),
			])
			.unwrap(),
		);
		(registry.clone(), AddonService::new(registry))
	}

	#[tokio::test]
	async fn test_guard_rejects_unregistered_module() {
		let (_, addons) = addons();
		let guard = ModuleScopeGuard::new(addons);
		let value = json!(1);

		let scope = SettingScope::module("Ghost");
		let event = WriteEvent { scope: &scope, key: "x", op: WriteOp::Set(&value) };
		assert!(matches!(guard.before_write(&event).await, Err(Error::ModuleNotRegistered(_))));

		let scope = SettingScope::module("HRCore");
		let event = WriteEvent { scope: &scope, key: "x", op: WriteOp::Delete };
		assert!(guard.before_write(&event).await.is_ok());

		let event = WriteEvent { scope: &SettingScope::Global, key: "x", op: WriteOp::Delete };
		assert!(guard.before_write(&event).await.is_ok());
	}

	#[tokio::test]
	async fn test_audit_only_while_module_available() {
		let (registry, addons) = addons();
		let sink = Arc::new(CollectSink::default());
		let clock = Arc::new(ManualClock::new(Timestamp(500)));
		let trail = AuditTrail::new(addons, "Auditing", sink.clone(), clock);
		let value = json!({ "days": 21 });
		let scope = SettingScope::module("HRCore");

		trail.after_write(&WriteEvent { scope: &scope, key: "leave", op: WriteOp::Set(&value) }).await;
		registry.set_enabled("Auditing", false).unwrap();
		trail.after_write(&WriteEvent { scope: &scope, key: "leave", op: WriteOp::Delete }).await;

		let records = sink.0.lock();
		assert_eq!(records.len(), 1);
		assert_eq!(records[0].action, "set");
		assert_eq!(records[0].value, Some(value));
		assert_eq!(records[0].at, Timestamp(500));
	}
}

// vim: ts=4
