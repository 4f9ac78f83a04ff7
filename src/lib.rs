#![doc(test(attr(deny(warnings))))]

//! Tally schedules household obligations: one-off payments, installment
//! plans, card purchases split across billing cycles and open-ended
//! recurring bills.
//!
//! The engine lives in `tally-core`; this crate wires it to the persisted
//! configuration and the JSON store.

pub mod app;
pub mod errors;
pub mod utils;

pub use app::Tally;
pub use errors::TallyError;

pub use tally_config::{Config, ConfigManager};
pub use tally_core::{CoreError, ErrorClass};
pub use tally_domain as domain;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter and emits a startup log.
pub fn init() {
    init_with_filter(&Config::default_log_filter());
}

/// Same as [`init`] with an explicit default directive (`RUST_LOG` still wins).
pub fn init_with_filter(filter: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(filter);
        tracing::info!("tally tracing initialized.");
    });
}
