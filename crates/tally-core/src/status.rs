//! Paid/remaining aggregation and lifecycle status derivation.

use tally_domain::{Amounted, Commitment, CommitmentStatus, CommitmentSummary, Obligation};

pub struct StatusAggregator;

impl StatusAggregator {
    /// Summarizes a commitment from its full obligation list. Recomputed on
    /// every read; nothing here is persisted.
    pub fn summarize(commitment: Commitment, obligations: &[Obligation]) -> CommitmentSummary {
        let mut paid_count = 0u32;
        let mut amount_paid = 0.0;
        let mut amount_remaining = 0.0;
        for obligation in obligations {
            if obligation.paid {
                paid_count += 1;
                amount_paid += obligation.amount();
            } else {
                amount_remaining += obligation.amount();
            }
        }
        let total = obligations.len() as u32;
        let status = Self::status(&commitment, total, paid_count);
        CommitmentSummary {
            commitment,
            obligations_total: total,
            obligations_paid: paid_count,
            amount_paid,
            amount_remaining,
            status,
        }
    }

    fn status(commitment: &Commitment, total: u32, paid: u32) -> CommitmentStatus {
        if commitment.kind.is_recurring() {
            CommitmentStatus::Recurring
        } else if total > 0 && paid >= total {
            CommitmentStatus::Paid
        } else {
            CommitmentStatus::Open
        }
    }
}
