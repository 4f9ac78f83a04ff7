//! Expands normalized amounts into a dated series of obligations.

use chrono::NaiveDate;
use uuid::Uuid;

use tally_domain::{shift_month, Obligation};

use crate::{amounts::NormalizedAmounts, CoreError};

pub struct ScheduleGenerator;

impl ScheduleGenerator {
    /// Builds `unit_count` unpaid obligations numbered `1..=N`. Obligation `i`
    /// is due `interval × (i − 1)` months after `first_due`, every one of them
    /// carrying the per-unit amount.
    ///
    /// Fails with `Validation` when a due date would fall outside the calendar.
    pub fn generate(
        commitment_id: Uuid,
        amounts: &NormalizedAmounts,
        first_due: NaiveDate,
    ) -> Result<Vec<Obligation>, CoreError> {
        let interval = amounts.recurrence_interval_months.max(1);
        (0..amounts.unit_count)
            .map(|offset| {
                let due_date = interval
                    .checked_mul(offset)
                    .and_then(|months| i32::try_from(months).ok())
                    .and_then(|months| shift_month(first_due, months))
                    .ok_or_else(|| {
                        CoreError::Validation(format!(
                            "obligation {} falls outside the calendar ({} months after {})",
                            offset + 1,
                            u64::from(interval) * u64::from(offset),
                            first_due
                        ))
                    })?;
                Ok(Obligation::new(
                    commitment_id,
                    offset + 1,
                    due_date,
                    amounts.unit_amount,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amounts(unit_amount: f64, unit_count: u32, interval: u32) -> NormalizedAmounts {
        NormalizedAmounts {
            total: unit_amount * unit_count as f64,
            unit_amount,
            unit_count,
            recurrence_interval_months: interval,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn numbers_are_contiguous_and_count_matches() {
        let id = Uuid::new_v4();
        for count in [1, 2, 12, 24] {
            let schedule =
                ScheduleGenerator::generate(id, &amounts(10.0, count, 1), date(2025, 1, 5)).unwrap();
            assert_eq!(schedule.len(), count as usize);
            let numbers: Vec<u32> = schedule.iter().map(|o| o.number).collect();
            assert_eq!(numbers, (1..=count).collect::<Vec<_>>());
            assert!(schedule.iter().all(|o| o.commitment_id == id));
        }
    }

    #[test]
    fn dates_are_evenly_spaced_by_interval() {
        let schedule =
            ScheduleGenerator::generate(Uuid::new_v4(), &amounts(50.0, 4, 3), date(2025, 11, 10)).unwrap();
        let dates: Vec<NaiveDate> = schedule.iter().map(|o| o.due_date).collect();
        assert_eq!(
            dates,
            vec![
                date(2025, 11, 10),
                date(2026, 2, 10),
                date(2026, 5, 10),
                date(2026, 8, 10)
            ]
        );
    }

    #[test]
    fn month_end_anchor_does_not_drift() {
        let schedule =
            ScheduleGenerator::generate(Uuid::new_v4(), &amounts(1.0, 3, 1), date(2025, 1, 31)).unwrap();
        let dates: Vec<NaiveDate> = schedule.iter().map(|o| o.due_date).collect();
        assert_eq!(
            dates,
            vec![date(2025, 1, 31), date(2025, 2, 28), date(2025, 3, 31)]
        );
    }

    #[test]
    fn every_obligation_starts_unpaid_with_unit_amount() {
        let schedule =
            ScheduleGenerator::generate(Uuid::new_v4(), &amounts(33.333, 3, 1), date(2025, 4, 1)).unwrap();
        for obligation in &schedule {
            assert_eq!(obligation.amount, 33.333);
            assert_eq!(obligation.extra_amount, 0.0);
            assert!(!obligation.paid);
            assert!(obligation.paid_at.is_none());
            assert!(obligation.ledger_entry_id.is_none());
        }
    }

    #[test]
    fn out_of_range_dates_fail_instead_of_wrapping() {
        let err = ScheduleGenerator::generate(
            Uuid::new_v4(),
            &amounts(1.0, 3, 4_000_000),
            date(2025, 1, 1),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = ScheduleGenerator::generate(
            Uuid::new_v4(),
            &amounts(1.0, 3, 200_000_000),
            date(2025, 1, 1),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn long_schedules_stay_monotonic() {
        let schedule =
            ScheduleGenerator::generate(Uuid::new_v4(), &amounts(1.0, 600, 120), date(2025, 1, 31))
                .unwrap();
        assert_eq!(schedule.len(), 600);
        assert!(schedule
            .windows(2)
            .all(|pair| pair[0].due_date < pair[1].due_date));
        assert_eq!(schedule[599].due_date, date(2025 + 599 * 10, 1, 31));
    }
}
