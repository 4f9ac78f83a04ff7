//! Derived, never-persisted views over a commitment and its obligations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::commitment::Commitment;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Lifecycle state derived from the obligation set.
pub enum CommitmentStatus {
    Open,
    Paid,
    Recurring,
}

impl fmt::Display for CommitmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CommitmentStatus::Open => "OPEN",
            CommitmentStatus::Paid => "PAID",
            CommitmentStatus::Recurring => "RECURRING",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitmentSummary {
    #[serde(flatten)]
    pub commitment: Commitment,
    pub obligations_total: u32,
    pub obligations_paid: u32,
    pub amount_paid: f64,
    pub amount_remaining: f64,
    pub status: CommitmentStatus,
}
