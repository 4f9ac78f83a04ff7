//! Cash-ledger entries requested when obligations are mirrored.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Amounted;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
/// Direction of a cash movement.
pub enum Direction {
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntryRequest {
    pub date: NaiveDate,
    pub category_id: Uuid,
    pub direction: Direction,
    pub title: String,
    pub amount: f64,
}

impl LedgerEntryRequest {
    /// Outgoing entry for installment `number` of `count`, titled `"<title> (n/N)"`.
    pub fn installment(
        title: &str,
        number: u32,
        count: u32,
        date: NaiveDate,
        category_id: Uuid,
        amount: f64,
    ) -> Self {
        Self {
            date,
            category_id,
            direction: Direction::Out,
            title: format!("{title} ({number}/{count})"),
            amount,
        }
    }
}

/// A recorded ledger entry as kept by a ledger collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub id: Uuid,
    #[serde(flatten)]
    pub request: LedgerEntryRequest,
}

impl Amounted for LedgerEntry {
    fn amount(&self) -> f64 {
        self.request.amount
    }
}
