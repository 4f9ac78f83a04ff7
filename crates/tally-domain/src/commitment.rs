//! Domain models for commitments: purchases and shared-expense cases that
//! expand into one or more scheduled obligations.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::common::{Displayable, Identifiable};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Enumerates the scheduling shape of a commitment.
pub enum CommitmentKind {
    /// A single payment.
    OneOff,
    /// A fixed number of installments.
    Installment,
    /// Open-ended recurring payment materialized over a lookahead horizon.
    Recurring,
    /// Installments charged to a cyclical biller (credit card).
    CardInstallment,
}

impl CommitmentKind {
    pub const ALL: [CommitmentKind; 4] = [
        CommitmentKind::OneOff,
        CommitmentKind::Installment,
        CommitmentKind::Recurring,
        CommitmentKind::CardInstallment,
    ];

    /// Stable wire label of the kind.
    pub fn label(self) -> &'static str {
        match self {
            CommitmentKind::OneOff => "ONE_OFF",
            CommitmentKind::Installment => "INSTALLMENT",
            CommitmentKind::Recurring => "RECURRING",
            CommitmentKind::CardInstallment => "CARD_INSTALLMENT",
        }
    }

    /// Whether the first due date is resolved through a billing cycle.
    pub fn requires_biller(self) -> bool {
        matches!(self, CommitmentKind::CardInstallment)
    }

    /// Whether the caller supplies the installment count.
    pub fn is_fixed_count(self) -> bool {
        matches!(
            self,
            CommitmentKind::Installment | CommitmentKind::CardInstallment
        )
    }

    pub fn is_recurring(self) -> bool {
        matches!(self, CommitmentKind::Recurring)
    }

    /// Whether each generated obligation is mirrored into the cash ledger.
    pub fn mirrors_to_ledger(self) -> bool {
        matches!(self, CommitmentKind::CardInstallment)
    }
}

impl fmt::Display for CommitmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown commitment kind `{0}`")]
pub struct ParseKindError(pub String);

impl FromStr for CommitmentKind {
    type Err = ParseKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        CommitmentKind::ALL
            .into_iter()
            .find(|kind| kind.label() == normalized)
            .ok_or_else(|| ParseKindError(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterestRateUnit {
    Monthly,
    Annual,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
/// Informational interest terms attached to a commitment. Not applied to amounts.
pub struct InterestRate {
    pub rate: f64,
    pub unit: InterestRateUnit,
}

/// Input shape for creating or replacing a commitment.
///
/// Amounts arrive raw: either `total_amount` or `unit_amount` may be missing or
/// zero, and `unit_count` / `recurrence_interval_months` may be absent or
/// non-positive. Normalization happens in the core before anything is stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitmentRequest {
    #[serde(default)]
    pub party_id: Option<Uuid>,
    pub title: String,
    pub kind: CommitmentKind,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub unit_amount: Option<f64>,
    #[serde(default)]
    pub unit_count: Option<i32>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub biller_id: Option<Uuid>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub interest: Option<InterestRate>,
    #[serde(default)]
    pub recurrence_interval_months: Option<i32>,
}

impl CommitmentRequest {
    pub fn new(title: impl Into<String>, kind: CommitmentKind, start_date: NaiveDate) -> Self {
        Self {
            party_id: None,
            title: title.into(),
            kind,
            total_amount: None,
            unit_amount: None,
            unit_count: None,
            start_date,
            biller_id: None,
            category_id: None,
            interest: None,
            recurrence_interval_months: None,
        }
    }

    pub fn with_total(mut self, total: f64) -> Self {
        self.total_amount = Some(total);
        self
    }

    pub fn with_unit_amount(mut self, amount: f64) -> Self {
        self.unit_amount = Some(amount);
        self
    }

    pub fn with_count(mut self, count: i32) -> Self {
        self.unit_count = Some(count);
        self
    }

    pub fn with_biller(mut self, biller_id: Uuid) -> Self {
        self.biller_id = Some(biller_id);
        self
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_party(mut self, party_id: Uuid) -> Self {
        self.party_id = Some(party_id);
        self
    }

    pub fn with_interval(mut self, months: i32) -> Self {
        self.recurrence_interval_months = Some(months);
        self
    }

    pub fn with_interest(mut self, rate: f64, unit: InterestRateUnit) -> Self {
        self.interest = Some(InterestRate { rate, unit });
        self
    }
}

/// A persisted commitment header. Amounts are always normalized: `total_amount`
/// and `unit_amount` are mutually consistent for fixed-count kinds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Commitment {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_id: Option<Uuid>,
    pub title: String,
    pub kind: CommitmentKind,
    pub total_amount: f64,
    pub unit_amount: f64,
    pub unit_count: u32,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biller_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest: Option<InterestRate>,
    pub recurrence_interval_months: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identifiable for Commitment {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Commitment {
    fn display_label(&self) -> String {
        format!("{} [{}]", self.title, self.kind)
    }
}
