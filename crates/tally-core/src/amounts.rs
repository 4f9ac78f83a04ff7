//! Amount normalization: turns the raw, partially specified amount fields of a
//! commitment request into one consistent `{total, unit amount, count, interval}`
//! tuple.
//!
//! Per-unit amounts of fixed-count kinds use true division. The final
//! installment does not absorb the rounding remainder, so the obligation sum
//! may drift from the total by a fraction of a cent.

use tally_domain::{CommitmentKind, CommitmentRequest};

use crate::CoreError;

/// Number of obligations materialized for an open-ended recurring commitment.
pub const RECURRING_HORIZON: u32 = 24;
/// Upper bound for installment counts and the recurring horizon.
pub const MAX_UNIT_COUNT: u32 = 600;
/// Upper bound for the spacing between two obligations.
pub const MAX_INTERVAL_MONTHS: u32 = 120;
const DEFAULT_INTERVAL_MONTHS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawAmounts {
    pub total: Option<f64>,
    pub unit_amount: Option<f64>,
    pub unit_count: Option<i32>,
    pub recurrence_interval_months: Option<i32>,
}

impl From<&CommitmentRequest> for RawAmounts {
    fn from(request: &CommitmentRequest) -> Self {
        Self {
            total: request.total_amount,
            unit_amount: request.unit_amount,
            unit_count: request.unit_count,
            recurrence_interval_months: request.recurrence_interval_months,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedAmounts {
    pub total: f64,
    pub unit_amount: f64,
    pub unit_count: u32,
    pub recurrence_interval_months: u32,
}

/// Validates and derives commitment amounts. Side-effect free.
#[derive(Debug, Clone, Copy)]
pub struct AmountNormalizer {
    horizon: u32,
}

impl Default for AmountNormalizer {
    fn default() -> Self {
        Self::new(RECURRING_HORIZON)
    }
}

impl AmountNormalizer {
    pub fn new(horizon: u32) -> Self {
        Self {
            horizon: horizon.clamp(1, MAX_UNIT_COUNT),
        }
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    pub fn normalize(
        &self,
        kind: CommitmentKind,
        raw: &RawAmounts,
    ) -> Result<NormalizedAmounts, CoreError> {
        match kind {
            CommitmentKind::OneOff => {
                let amount = positive(raw.total)
                    .or_else(|| positive(raw.unit_amount))
                    .ok_or(CoreError::AmountRequired)?;
                Ok(NormalizedAmounts {
                    total: amount,
                    unit_amount: amount,
                    unit_count: 1,
                    recurrence_interval_months: DEFAULT_INTERVAL_MONTHS,
                })
            }
            CommitmentKind::Installment | CommitmentKind::CardInstallment => {
                let count = match raw.unit_count {
                    Some(count) if count > MAX_UNIT_COUNT as i32 => {
                        return Err(CoreError::InvalidUnitCount(format!(
                            "{kind} allows at most {MAX_UNIT_COUNT} installments, got {count}"
                        )))
                    }
                    Some(count) if count > 0 => count as u32,
                    Some(count) => {
                        return Err(CoreError::InvalidUnitCount(format!(
                            "{kind} needs a positive installment count, got {count}"
                        )))
                    }
                    None => {
                        return Err(CoreError::InvalidUnitCount(format!(
                            "{kind} needs an installment count"
                        )))
                    }
                };
                let (total, unit_amount) = match (positive(raw.total), positive(raw.unit_amount)) {
                    (Some(total), _) => (total, total / count as f64),
                    (None, Some(unit)) => (unit * count as f64, unit),
                    (None, None) => return Err(CoreError::AmountRequired),
                };
                let interval = if kind == CommitmentKind::CardInstallment {
                    DEFAULT_INTERVAL_MONTHS
                } else {
                    interval_or_default(raw.recurrence_interval_months)?
                };
                Ok(NormalizedAmounts {
                    total,
                    unit_amount,
                    unit_count: count,
                    recurrence_interval_months: interval,
                })
            }
            CommitmentKind::Recurring => {
                let unit_amount = positive(raw.unit_amount)
                    .or_else(|| positive(raw.total))
                    .ok_or(CoreError::AmountRequired)?;
                Ok(NormalizedAmounts {
                    total: unit_amount * self.horizon as f64,
                    unit_amount,
                    unit_count: self.horizon,
                    recurrence_interval_months: interval_or_default(
                        raw.recurrence_interval_months,
                    )?,
                })
            }
        }
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|amount| amount.is_finite() && *amount > 0.0)
}

fn interval_or_default(value: Option<i32>) -> Result<u32, CoreError> {
    match value {
        Some(months) if months > MAX_INTERVAL_MONTHS as i32 => Err(CoreError::Validation(
            format!("recurrence interval must be at most {MAX_INTERVAL_MONTHS} months, got {months}"),
        )),
        Some(months) if months > 0 => Ok(months as u32),
        _ => Ok(DEFAULT_INTERVAL_MONTHS),
    }
}
