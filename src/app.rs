//! Application wiring: configuration, JSON store and engine services.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use tally_config::{Config, ConfigManager};
use tally_core::{
    Clock, CommitmentService, CoreError, ObligationService, ScheduleSettings, SystemClock,
};
use tally_domain::{BillerConfig, LedgerEntry};
use tally_storage_json::JsonStore;

use crate::TallyError;

/// One opened data set with its services.
pub struct Tally {
    config: Config,
    store: Arc<JsonStore>,
    clock: Arc<dyn Clock>,
    commitments: CommitmentService,
    obligations: ObligationService,
}

impl Tally {
    /// Loads the configuration from `manager` and opens the data set it points to.
    pub fn load(manager: &ConfigManager) -> Result<Self, TallyError> {
        let config = manager.load()?;
        Self::open(config)
    }

    pub fn open(config: Config) -> Result<Self, TallyError> {
        Self::open_with_clock(config, Arc::new(SystemClock))
    }

    /// Opens the data set with an explicit clock. Tracing is installed on the
    /// first open, using `config.log_filter` unless `RUST_LOG` is set.
    pub fn open_with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self, TallyError> {
        crate::init_with_filter(&config.log_filter);
        let data_file = config.resolve_data_file();
        let store = Arc::new(JsonStore::with_retention(
            data_file,
            config.snapshot_retention,
        )?);

        let settings = ScheduleSettings {
            recurring_horizon: config.recurring_horizon,
            ledger_category: config.card_ledger_category,
        };
        let mut commitments =
            CommitmentService::new(store.clone(), store.clone(), clock.clone())
                .with_settings(settings);
        if config.mirror_card_installments {
            commitments = commitments.with_ledger(store.clone());
        }
        let obligations = ObligationService::new(store.clone(), clock.clone());

        info!(
            "opened {} (horizon {}, card mirroring {})",
            store.path().display(),
            config.recurring_horizon,
            if config.mirror_card_installments { "on" } else { "off" }
        );

        Ok(Self {
            config,
            store,
            clock,
            commitments,
            obligations,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn commitments(&self) -> &CommitmentService {
        &self.commitments
    }

    pub fn obligations(&self) -> &ObligationService {
        &self.obligations
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Registers a cyclical biller so card-installment commitments can reference it.
    pub fn register_biller(
        &self,
        name: &str,
        closing_day: u32,
        due_day: u32,
    ) -> Result<BillerConfig, TallyError> {
        let biller = BillerConfig::new(name, closing_day, due_day)
            .map_err(|err| CoreError::Validation(err.to_string()))?;
        self.store.register_biller(biller.clone())?;
        info!("registered biller {} ({})", biller.name, biller.id);
        Ok(biller)
    }

    pub fn billers(&self) -> Result<Vec<BillerConfig>, TallyError> {
        Ok(self.store.list_billers()?)
    }

    /// Entries mirrored into the ledger for card installments.
    pub fn ledger_entries(&self) -> Result<Vec<LedgerEntry>, TallyError> {
        Ok(self.store.ledger_entries()?)
    }
}
