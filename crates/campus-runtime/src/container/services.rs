//! # Service Container
//!
//! Opens the store once and builds every service on top of it.
//!
//! ```text
//! CoreConfig ──► FileBackedKVStore (fs2 lock) ──┬─► RuleStoreService
//!                                               ├─► FreezeEngine
//!                                               ├─► OverrideLedger ◄── StaticApproverDirectory
//!                                               └─► PromotionEvaluator ◄── history (per call)
//! ```

use crate::container::config::CoreConfig;
use anyhow::{Context, Result};
use cc_01_rule_store::RuleStoreService;
use cc_02_freeze_engine::FreezeEngine;
use cc_03_promotion::{AcademicHistoryProvider, PromotionEvaluator};
use cc_04_override_ledger::{OverrideLedger, StaticApproverDirectory};
use shared_store::{FileBackedKVStore, SystemTimeSource};
use std::sync::Arc;
use tracing::info;

pub type Store = Arc<FileBackedKVStore>;
pub type Clock = Arc<SystemTimeSource>;

pub type ConcreteRuleStore = RuleStoreService<Store, Clock>;
pub type ConcreteFreezeEngine = FreezeEngine<Store, Clock>;
pub type ConcreteLedger = OverrideLedger<Store, Clock, Arc<StaticApproverDirectory>>;

/// Every Campus-Core service, sharing one store.
pub struct CoreContainer {
    pub config: CoreConfig,
    pub store: Store,
    pub rules: ConcreteRuleStore,
    pub freeze: ConcreteFreezeEngine,
    pub ledger: ConcreteLedger,
    pub approvers: Arc<StaticApproverDirectory>,
}

impl CoreContainer {
    /// Open the configured store and wire the services.
    pub fn open(config: CoreConfig) -> Result<Self> {
        config.validate().context("invalid configuration")?;
        let path = &config.storage.data_file;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create data directory {}", dir.display()))?;
        }
        let store = Arc::new(
            FileBackedKVStore::open(path)
                .with_context(|| format!("failed to open store {}", path.display()))?,
        );
        let clock = Arc::new(SystemTimeSource);
        let approvers = Arc::new(StaticApproverDirectory::new(config.approvers.iter().copied()));

        info!(
            data_file = %path.display(),
            approvers = approvers.len(),
            "campus-core services ready"
        );

        Ok(Self {
            rules: RuleStoreService::new(store.clone(), clock.clone()),
            freeze: FreezeEngine::new(store.clone(), clock.clone(), config.freeze.clone()),
            ledger: OverrideLedger::new(
                store.clone(),
                clock,
                approvers.clone(),
                config.overrides.clone(),
            ),
            approvers,
            store,
            config,
        })
    }

    /// Promotion evaluator over the shared store and the given history.
    pub fn evaluator<H: AcademicHistoryProvider>(&self, history: H) -> PromotionEvaluator<Store, H> {
        PromotionEvaluator::new(self.store.clone(), history)
    }
}
