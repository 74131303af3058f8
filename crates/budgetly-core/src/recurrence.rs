//! Due-date arithmetic for recurring transactions
//!
//! Months and years are calendar-based: the day of month is kept when the
//! target month has it and clamped to the month's last day otherwise
//! (Jan 31 + 1 month = Feb 28/29, Feb 29 + 1 year = Feb 28).

use chrono::{DateTime, Days, Months, NaiveDate, TimeZone};

use crate::error::{Error, Result};
use crate::models::Recurrence;

/// Advance `reference` by exactly one `period`
///
/// Fails with `InvalidPeriod` for `Recurrence::None`.
pub fn next_due_date<Tz: TimeZone>(
    reference: DateTime<Tz>,
    period: Recurrence,
) -> Result<DateTime<Tz>> {
    let next = match period {
        Recurrence::None => return Err(Error::InvalidPeriod(period.to_string())),
        Recurrence::Daily => reference.checked_add_days(Days::new(1)),
        Recurrence::Weekly => reference.checked_add_days(Days::new(7)),
        Recurrence::Monthly => reference.checked_add_months(Months::new(1)),
        Recurrence::Yearly => reference.checked_add_months(Months::new(12)),
    };

    next.ok_or_else(|| {
        Error::InvalidData(format!(
            "no valid {} successor for the reference date",
            period
        ))
    })
}

/// Date-only variant of [`next_due_date`]
pub fn next_due_day(reference: NaiveDate, period: Recurrence) -> Result<NaiveDate> {
    let next = match period {
        Recurrence::None => return Err(Error::InvalidPeriod(period.to_string())),
        Recurrence::Daily => reference.checked_add_days(Days::new(1)),
        Recurrence::Weekly => reference.checked_add_days(Days::new(7)),
        Recurrence::Monthly => reference.checked_add_months(Months::new(1)),
        Recurrence::Yearly => reference.checked_add_months(Months::new(12)),
    };

    next.ok_or_else(|| Error::InvalidData(format!("{} overflows the calendar", reference)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, FixedOffset, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_jan_31_monthly_clamps_to_leap_day() {
        assert_eq!(
            next_due_day(date(2024, 1, 31), Recurrence::Monthly).unwrap(),
            date(2024, 2, 29)
        );
        assert_eq!(
            next_due_day(date(2023, 1, 31), Recurrence::Monthly).unwrap(),
            date(2023, 2, 28)
        );
    }

    #[test]
    fn test_month_end_clamping_keeps_shorter_month_end() {
        assert_eq!(
            next_due_day(date(2024, 3, 31), Recurrence::Monthly).unwrap(),
            date(2024, 4, 30)
        );
        assert_eq!(
            next_due_day(date(2024, 12, 31), Recurrence::Monthly).unwrap(),
            date(2025, 1, 31)
        );
    }

    #[test]
    fn test_leap_day_yearly_clamps() {
        assert_eq!(
            next_due_day(date(2024, 2, 29), Recurrence::Yearly).unwrap(),
            date(2025, 2, 28)
        );
        assert_eq!(
            next_due_day(date(2023, 6, 15), Recurrence::Yearly).unwrap(),
            date(2024, 6, 15)
        );
    }

    #[test]
    fn test_none_is_invalid_period() {
        let err = next_due_day(date(2024, 1, 1), Recurrence::None).unwrap_err();
        assert!(matches!(err, Error::InvalidPeriod(ref p) if p == "none"));

        let err = next_due_date(Utc::now(), Recurrence::None).unwrap_err();
        assert!(matches!(err, Error::InvalidPeriod(_)));
    }

    #[test]
    fn test_every_period_moves_forward_by_its_nominal_length() {
        let mut day = date(2023, 1, 1);
        let end = date(2025, 12, 31);

        while day <= end {
            let daily = next_due_day(day, Recurrence::Daily).unwrap();
            assert_eq!((daily - day).num_days(), 1);

            let weekly = next_due_day(day, Recurrence::Weekly).unwrap();
            assert_eq!((weekly - day).num_days(), 7);

            let monthly = next_due_day(day, Recurrence::Monthly).unwrap();
            let gap = (monthly - day).num_days();
            assert!((28..=31).contains(&gap), "{} -> {} ({} days)", day, monthly, gap);
            assert!(monthly.day() <= day.day());

            let yearly = next_due_day(day, Recurrence::Yearly).unwrap();
            let gap = (yearly - day).num_days();
            assert!((365..=366).contains(&gap), "{} -> {} ({} days)", day, yearly, gap);
            assert_eq!(yearly.year(), day.year() + 1);

            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_datetime_keeps_time_of_day() {
        let reference = Utc.with_ymd_and_hms(2024, 1, 31, 10, 30, 0).unwrap();
        let next = next_due_date(reference, Recurrence::Monthly).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 2, 29, 10, 30, 0).unwrap());
        assert!(next > reference);

        let weekly = next_due_date(reference, Recurrence::Weekly).unwrap();
        assert_eq!(weekly, Utc.with_ymd_and_hms(2024, 2, 7, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_datetime_uses_calendar_of_its_own_offset() {
        // 2024-03-31 02:00 at +05:00 is still March 30 in UTC, so the month
        // step must follow the local calendar to land on April 30.
        let tz = FixedOffset::east_opt(5 * 3600).unwrap();
        let reference = tz.with_ymd_and_hms(2024, 3, 31, 2, 0, 0).unwrap();
        let next = next_due_date(reference, Recurrence::Monthly).unwrap();
        assert_eq!(next.date_naive(), date(2024, 4, 30));

        let in_utc = next_due_date(reference.with_timezone(&Utc), Recurrence::Monthly).unwrap();
        assert_eq!(in_utc.with_timezone(&tz).date_naive(), date(2024, 5, 1));
    }
}
