//! Shared traits and calendar helpers for scheduling primitives.

use chrono::{Datelike, Duration, Months, NaiveDate};
use uuid::Uuid;

/// Exposes a stable identifier for stored entities.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Supplies a common contract for retrieving numeric amounts.
pub trait Amounted {
    fn amount(&self) -> f64;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Shifts `date` by `months` calendar months, clamping the day to the
/// length of the target month (Jan 31 + 1 month = Feb 28/29).
///
/// Returns `None` when the target month lies outside the representable range.
pub fn shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = (date.year() as i64) * 12 + date.month0() as i64 + months as i64;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = index.rem_euclid(12) as u32 + 1;
    clamped_date(year, month, date.day())
}

/// Builds the date `year-month-day`, clamping `day` into the month.
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let day = day.clamp(1, days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Number of days in the given month, `None` outside the calendar range.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = match first.checked_add_months(Months::new(1)) {
        Some(first_next) => first_next - Duration::days(1),
        None => NaiveDate::from_ymd_opt(year, 12, 31)?,
    };
    Some(last.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn shift_month_clamps_to_month_end() {
        assert_eq!(shift_month(date(2025, 1, 31), 1), Some(date(2025, 2, 28)));
        assert_eq!(shift_month(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(shift_month(date(2025, 1, 31), 2), Some(date(2025, 3, 31)));
    }

    #[test]
    fn shift_month_crosses_year_boundaries() {
        assert_eq!(shift_month(date(2025, 11, 15), 3), Some(date(2026, 2, 15)));
        assert_eq!(shift_month(date(2025, 2, 10), -3), Some(date(2024, 11, 10)));
        assert_eq!(shift_month(date(2025, 12, 5), 24), Some(date(2027, 12, 5)));
    }

    #[test]
    fn shift_month_out_of_range_is_none() {
        assert_eq!(shift_month(date(2025, 1, 1), 4_000_000), None);
        assert_eq!(shift_month(date(2025, 1, 1), i32::MAX), None);
        assert_eq!(shift_month(date(2025, 1, 1), i32::MIN), None);
        assert_eq!(shift_month(NaiveDate::MAX, 1), None);
    }

    #[test]
    fn clamped_date_handles_short_months() {
        assert_eq!(clamped_date(2025, 2, 31), Some(date(2025, 2, 28)));
        assert_eq!(clamped_date(2025, 4, 31), Some(date(2025, 4, 30)));
        assert_eq!(days_in_month(2025, 12), Some(31));
        assert_eq!(clamped_date(2025, 13, 1), None);
    }
}
