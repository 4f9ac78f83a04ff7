//! tally-core
//!
//! Obligation scheduling engine for tally.
//! Depends on tally-domain. No terminal I/O; persistence goes through the
//! collaborator traits in [`storage`].

pub mod amounts;
pub mod billing_cycle;
pub mod commitment_service;
pub mod error;
pub mod memory;
pub mod obligation_service;
pub mod schedule;
pub mod status;
pub mod storage;
pub mod time;

pub use amounts::*;
pub use billing_cycle::*;
pub use commitment_service::*;
pub use error::{CoreError, ErrorClass};
pub use memory::InMemoryStore;
pub use obligation_service::*;
pub use schedule::*;
pub use status::*;
pub use storage::*;
pub use time::*;
