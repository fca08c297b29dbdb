//! Suite builder - wires the module registry, settings store and rate gate

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::SuiteConfig;
use crate::prelude::*;
use worksuite_core::settings::hooks::{AuditSink, AuditTrail, ModuleScopeGuard, SettingsHook, TracingAuditSink};
use worksuite_core::{AddonService, ModuleRegistry, RateGate, RateGateConfig, SettingScope, Settings, SettingsStore};
use worksuite_settings_adapter_sqlite::SettingsAdapterSqlite;
use worksuite_types::clock::{Clock, SystemClock};
use worksuite_types::module_adapter::ModuleProvider;
use worksuite_types::settings_adapter::SettingsAdapter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct SuiteState {
	pub config: SuiteConfig,
	/// Present when modules come from a manifest or an explicitly supplied registry
	pub registry: Option<Arc<ModuleRegistry>>,
	pub addons: AddonService,
	pub settings: Settings,
	pub rate_gate: Arc<RateGate>,
	pub clock: Arc<dyn Clock>,
}

pub type Suite = Arc<SuiteState>;

impl SuiteState {
	/// Drop cached settings and reload them from persistence
	pub async fn refresh(&self) -> SuiteResult<()> {
		self.settings.refresh().await?;
		let purged = self.rate_gate.purge_expired();
		info!("Suite refreshed ({} rate counters purged)", purged);
		Ok(())
	}

	/// Release the settings cache and the persistence adapter
	pub async fn teardown(&self) {
		self.settings.store().teardown().await;
		info!("Suite shut down");
	}

	/// Write the current module registry back to the configured manifest file
	pub async fn save_module_manifest(&self) -> SuiteResult<()> {
		let Some(registry) = &self.registry else {
			return Err(Error::ConfigError("modules are not managed by a registry".into()));
		};
		let Some(path) = &self.config.module_manifest else {
			return Err(Error::ConfigError("no module manifest configured".into()));
		};
		tokio::fs::write(path, registry.to_manifest()?).await?;
		info!("Module manifest saved: {}", path.display());
		Ok(())
	}
}

pub struct SuiteBuilder {
	config: SuiteConfig,
	registry: Option<Arc<ModuleRegistry>>,
	module_provider: Option<Arc<dyn ModuleProvider>>,
	settings_adapter: Option<Arc<dyn SettingsAdapter>>,
	clock: Option<Arc<dyn Clock>>,
	audit_sink: Option<Arc<dyn AuditSink>>,
	hooks: Vec<Arc<dyn SettingsHook>>,
}

impl SuiteBuilder {
	pub fn new(config: SuiteConfig) -> Self {
		SuiteBuilder {
			config,
			registry: None,
			module_provider: None,
			settings_adapter: None,
			clock: None,
			audit_sink: None,
			hooks: Vec::new(),
		}
	}

	// Opts
	pub fn db_path(&mut self, db_path: impl Into<PathBuf>) -> &mut Self {
		self.config.db_path = db_path.into();
		self
	}
	pub fn module_manifest(&mut self, path: impl Into<PathBuf>) -> &mut Self {
		self.config.module_manifest = Some(path.into());
		self
	}
	pub fn cache_scopes(&mut self, cache_scopes: usize) -> &mut Self {
		self.config.cache_scopes = cache_scopes;
		self
	}
	pub fn rate_window_secs(&mut self, secs: u64) -> &mut Self {
		self.config.rate_window_secs = secs;
		self
	}
	pub fn default_global_rate_limit(&mut self, limit: u32) -> &mut Self {
		self.config.default_global_rate_limit = limit;
		self
	}
	pub fn default_user_rate_limit(&mut self, limit: u32) -> &mut Self {
		self.config.default_user_rate_limit = limit;
		self
	}
	pub fn audit_module(&mut self, name: impl Into<Box<str>>) -> &mut Self {
		self.config.audit_module = name.into();
		self
	}
	pub fn init_tracing(&mut self, enable: bool) -> &mut Self {
		self.config.init_tracing = enable;
		self
	}

	// Collaborators
	pub fn module_registry(&mut self, registry: Arc<ModuleRegistry>) -> &mut Self {
		self.registry = Some(registry);
		self.module_provider = None;
		self
	}
	pub fn module_provider(&mut self, provider: Arc<dyn ModuleProvider>) -> &mut Self {
		self.module_provider = Some(provider);
		self.registry = None;
		self
	}
	pub fn settings_adapter(&mut self, adapter: Arc<dyn SettingsAdapter>) -> &mut Self {
		self.settings_adapter = Some(adapter);
		self
	}
	pub fn clock(&mut self, clock: Arc<dyn Clock>) -> &mut Self {
		self.clock = Some(clock);
		self
	}
	pub fn audit_sink(&mut self, sink: Arc<dyn AuditSink>) -> &mut Self {
		self.audit_sink = Some(sink);
		self
	}
	/// Install an additional settings write hook, run after the built-in ones
	pub fn hook(&mut self, hook: Arc<dyn SettingsHook>) -> &mut Self {
		self.hooks.push(hook);
		self
	}

	/// Initialize the suite
	pub async fn build(self) -> SuiteResult<Suite> {
		if self.config.init_tracing {
			crate::logging::init_tracing();
		}
		info!("Worksuite V{}", VERSION);

		// Modules
		//*********
		let (registry, provider): (Option<Arc<ModuleRegistry>>, Arc<dyn ModuleProvider>) =
			match (self.registry, self.module_provider) {
				(Some(registry), _) => {
					let provider: Arc<dyn ModuleProvider> = registry.clone();
					(Some(registry), provider)
				}
				(None, Some(provider)) => (None, provider),
				(None, None) => {
					let registry = match &self.config.module_manifest {
						Some(path) => Arc::new(ModuleRegistry::load(path).await.inspect_err(|err| {
							error!("FATAL: Cannot load module manifest {}: {}", path.display(), err)
						})?),
						None => {
							warn!("No module manifest configured, starting without modules");
							Arc::new(ModuleRegistry::new())
						}
					};
					let provider: Arc<dyn ModuleProvider> = registry.clone();
					(Some(registry), provider)
				}
			};
		let addons = AddonService::new(provider);
		info!(
			"Modules: core {:?}, enabled add-ons {:?}",
			addons.get_core_modules(),
			addons.get_enabled_addons()
		);

		// Settings
		//**********
		let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
		let adapter: Arc<dyn SettingsAdapter> = match self.settings_adapter {
			Some(adapter) => adapter,
			None => Arc::new(SettingsAdapterSqlite::new(&self.config.db_path).await.inspect_err(|err| {
				error!("FATAL: Cannot open settings database {}: {}", self.config.db_path.display(), err)
			})?),
		};
		let audit_sink = self.audit_sink.unwrap_or_else(|| Arc::new(TracingAuditSink));

		let mut store = SettingsStore::new(adapter, self.config.cache_scopes)
			.with_clock(clock.clone())
			.with_hook(Arc::new(ModuleScopeGuard::new(addons.clone())))
			.with_hook(Arc::new(AuditTrail::new(
				addons.clone(),
				self.config.audit_module.clone(),
				audit_sink,
				clock.clone(),
			)));
		for hook in self.hooks {
			store = store.with_hook(hook);
		}
		let store = Arc::new(store);
		store.warm(&SettingScope::Global).await?;
		let settings = Settings::new(store.clone());
		info!("Settings subsystem initialized");

		// Rate gate
		//***********
		let rate_gate = Arc::new(RateGate::new(
			store,
			clock.clone(),
			RateGateConfig {
				window: self.config.rate_window(),
				settings_scope: SettingScope::Global,
				default_global_limit: self.config.default_global_rate_limit,
				default_user_limit: self.config.default_user_rate_limit,
			},
		));
		let (global_limit, user_limit) = rate_gate.limits().await?;
		info!("Rate gate: {} global / {} per user every {}s", global_limit, user_limit, self.config.rate_window_secs);

		Ok(Arc::new(SuiteState { config: self.config, registry, addons, settings, rate_gate, clock }))
	}
}

// vim: ts=4
