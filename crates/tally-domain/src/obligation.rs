//! One scheduled, dated payment belonging to a commitment.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{Amounted, Identifiable};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Obligation {
    pub id: Uuid,
    pub commitment_id: Uuid,
    /// 1-based, contiguous within the commitment.
    pub number: u32,
    pub due_date: NaiveDate,
    pub amount: f64,
    #[serde(default)]
    pub extra_amount: f64,
    #[serde(default)]
    pub paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_entry_id: Option<Uuid>,
}

impl Obligation {
    /// Creates an unpaid obligation with no adjustment.
    pub fn new(commitment_id: Uuid, number: u32, due_date: NaiveDate, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            commitment_id,
            number,
            due_date,
            amount,
            extra_amount: 0.0,
            paid: false,
            paid_at: None,
            ledger_entry_id: None,
        }
    }

    /// Base amount plus settlement adjustment.
    pub fn settled_amount(&self) -> f64 {
        self.amount + self.extra_amount
    }

    /// Applies a settlement change. `paid_at` is stamped with `now` only on the
    /// unpaid → paid transition and cleared whenever the obligation is unpaid.
    pub fn apply_settlement(&mut self, paid: bool, extra_amount: f64, now: DateTime<Utc>) {
        self.paid_at = match (paid, self.paid_at) {
            (true, Some(existing)) if self.paid => Some(existing),
            (true, _) => Some(now),
            (false, _) => None,
        };
        self.paid = paid;
        self.extra_amount = extra_amount;
    }
}

impl Identifiable for Obligation {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Amounted for Obligation {
    fn amount(&self) -> f64 {
        self.settled_amount()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Obligation {
        let due = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        Obligation::new(Uuid::new_v4(), 1, due, 120.0)
    }

    #[test]
    fn settlement_stamps_and_clears_paid_at() {
        let mut obligation = sample();
        let first = Utc.with_ymd_and_hms(2025, 2, 3, 10, 0, 0).unwrap();
        obligation.apply_settlement(true, 5.0, first);
        assert!(obligation.paid);
        assert_eq!(obligation.paid_at, Some(first));
        assert_eq!(obligation.settled_amount(), 125.0);

        obligation.apply_settlement(false, 0.0, first);
        assert!(!obligation.paid);
        assert!(obligation.paid_at.is_none());
    }

    #[test]
    fn repeated_settlement_keeps_original_timestamp() {
        let mut obligation = sample();
        let first = Utc.with_ymd_and_hms(2025, 2, 3, 10, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        obligation.apply_settlement(true, 0.0, first);
        obligation.apply_settlement(true, 2.5, later);
        assert_eq!(obligation.paid_at, Some(first));
        assert_eq!(obligation.extra_amount, 2.5);
    }
}
