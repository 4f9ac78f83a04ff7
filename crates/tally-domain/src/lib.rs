//! tally-domain
//!
//! Pure domain models (Commitment, Obligation, BillerConfig, ledger entries, summaries).
//! No I/O, no storage. Only data types, core enums and calendar helpers.

pub mod biller;
pub mod commitment;
pub mod common;
pub mod ledger;
pub mod obligation;
pub mod summary;

pub use biller::*;
pub use commitment::*;
pub use common::*;
pub use ledger::*;
pub use obligation::*;
pub use summary::*;
