//! First-due-date resolution for purchases charged to a cyclical biller.

use chrono::{Datelike, NaiveDate};

use tally_domain::{clamped_date, shift_month, BillingCycle};

pub struct BillingCycleResolver;

impl BillingCycleResolver {
    /// Due date of the statement a purchase made on `purchase_date` lands in.
    ///
    /// A purchase on or after the closing day misses the current statement and
    /// belongs to the next one. When the due day does not come after the
    /// closing day the payment falls in the month following the closing month.
    /// Days past the end of a month clamp to its last day.
    ///
    /// `None` when the due month falls outside the calendar range.
    pub fn first_due_date(purchase_date: NaiveDate, cycle: BillingCycle) -> Option<NaiveDate> {
        let mut closing = clamped_date(
            purchase_date.year(),
            purchase_date.month(),
            cycle.closing_day,
        )?;
        if purchase_date.day() >= cycle.closing_day {
            closing = shift_month(closing, 1)?;
        }
        let due_month = if cycle.due_day <= cycle.closing_day {
            shift_month(closing, 1)?
        } else {
            closing
        };
        clamped_date(due_month.year(), due_month.month(), cycle.due_day)
    }

    /// First due date for a commitment: the cycle-resolved date when a cycle
    /// applies, otherwise the reference date itself.
    pub fn resolve(reference: NaiveDate, cycle: Option<BillingCycle>) -> Option<NaiveDate> {
        match cycle {
            Some(cycle) => Self::first_due_date(reference, cycle),
            None => Some(reference),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn purchase_after_closing_rolls_to_next_cycle() {
        let due = BillingCycleResolver::first_due_date(date(2025, 1, 20), BillingCycle::new(1, 10));
        assert_eq!(due, Some(date(2025, 2, 10)));
    }

    #[test]
    fn due_day_before_closing_day_wraps_to_following_month() {
        let due = BillingCycleResolver::first_due_date(date(2025, 3, 10), BillingCycle::new(25, 5));
        assert_eq!(due, Some(date(2025, 4, 5)));
    }

    #[test]
    fn purchase_on_closing_day_misses_the_statement() {
        let cycle = BillingCycle::new(25, 5);
        assert_eq!(
            BillingCycleResolver::first_due_date(date(2025, 3, 25), cycle),
            Some(date(2025, 5, 5))
        );
        assert_eq!(
            BillingCycleResolver::first_due_date(date(2025, 3, 24), cycle),
            Some(date(2025, 4, 5))
        );
    }

    #[test]
    fn due_in_closing_month_when_due_day_is_later() {
        let due = BillingCycleResolver::first_due_date(date(2025, 6, 3), BillingCycle::new(7, 15));
        assert_eq!(due, Some(date(2025, 6, 15)));
    }

    #[test]
    fn december_purchase_rolls_into_next_year() {
        let due = BillingCycleResolver::first_due_date(date(2025, 12, 28), BillingCycle::new(20, 5));
        assert_eq!(due, Some(date(2026, 2, 5)));
    }

    #[test]
    fn end_of_month_days_clamp() {
        let due = BillingCycleResolver::first_due_date(date(2025, 1, 31), BillingCycle::new(30, 31));
        assert_eq!(due, Some(date(2025, 2, 28)));
    }

    #[test]
    fn closing_day_31_clamps_in_february() {
        let cycle = BillingCycle::new(31, 10);
        // Closing clamps to Feb 28; a purchase on the 15th makes that statement.
        assert_eq!(
            BillingCycleResolver::first_due_date(date(2025, 2, 15), cycle),
            Some(date(2025, 3, 10))
        );
        // The purchase day is compared against the configured day, not the clamped one.
        assert_eq!(
            BillingCycleResolver::first_due_date(date(2025, 2, 28), cycle),
            Some(date(2025, 3, 10))
        );
        assert_eq!(
            BillingCycleResolver::first_due_date(date(2024, 2, 20), cycle),
            Some(date(2024, 3, 10))
        );
    }

    #[test]
    fn out_of_range_purchase_has_no_due_date() {
        let due = BillingCycleResolver::first_due_date(NaiveDate::MAX, BillingCycle::new(5, 1));
        assert_eq!(due, None);
    }

    #[test]
    fn resolve_without_cycle_keeps_reference_date() {
        let reference = date(2025, 2, 1);
        assert_eq!(BillingCycleResolver::resolve(reference, None), Some(reference));
    }
}
