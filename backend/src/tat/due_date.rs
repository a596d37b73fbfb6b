// backend/src/tat/due_date.rs

use chrono::{DateTime, Days, NaiveDate, Utc};

use super::calendar::BusinessCalendar;
use crate::error::TatError;

#[derive(Debug, Clone, Copy)]
pub struct DueDateEngine<'a> {
    calendar: &'a BusinessCalendar,
}

impl<'a> DueDateEngine<'a> {
    pub fn new(calendar: &'a BusinessCalendar) -> Self {
        Self { calendar }
    }

    /// Advance `tat_days` business days from the calendar date of `start`.
    ///
    /// A zero budget returns the start date itself, which may be a
    /// non-business day; any positive budget lands on a business day.
    pub fn compute_due_date(
        &self,
        start: DateTime<Utc>,
        tat_days: i64,
    ) -> Result<NaiveDate, TatError> {
        if tat_days < 0 {
            return Err(TatError::InvalidBudget(tat_days));
        }

        let mut current = start.date_naive();
        let mut counted = 0;
        while counted < tat_days {
            current = next_day(current)?;
            if self.calendar.is_business_day(current) {
                counted += 1;
            }
        }
        Ok(current)
    }
}

pub(crate) fn next_day(date: NaiveDate) -> Result<NaiveDate, TatError> {
    date.checked_add_days(Days::new(1))
        .ok_or_else(|| TatError::Configuration(format!("date {date} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone, Weekday};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(date: NaiveDate, h: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_time(NaiveTime::from_hms_opt(h, 30, 0).unwrap()))
    }

    fn weekends() -> BusinessCalendar {
        BusinessCalendar::new([], [Weekday::Sat, Weekday::Sun]).unwrap()
    }

    // 2024-01-01 is a Monday.
    fn monday() -> NaiveDate {
        d(2024, 1, 1)
    }

    #[test]
    fn three_days_from_monday_is_thursday() {
        let cal = weekends();
        let due = DueDateEngine::new(&cal).compute_due_date(at(monday(), 9), 3).unwrap();
        assert_eq!(due, d(2024, 1, 4));
    }

    #[test]
    fn holiday_pushes_due_date_out() {
        let cal = BusinessCalendar::new([d(2024, 1, 2)], [Weekday::Sat, Weekday::Sun]).unwrap();
        let due = DueDateEngine::new(&cal).compute_due_date(at(monday(), 9), 3).unwrap();
        assert_eq!(due, d(2024, 1, 5));
    }

    #[test]
    fn no_weekend_config_counts_every_day() {
        let cal = BusinessCalendar::default();
        let due = DueDateEngine::new(&cal).compute_due_date(at(monday(), 9), 5).unwrap();
        assert_eq!(due, d(2024, 1, 6));
    }

    #[test]
    fn zero_budget_returns_start_date() {
        let cal = weekends();
        let saturday = d(2024, 1, 6);
        let due = DueDateEngine::new(&cal).compute_due_date(at(saturday, 23), 0).unwrap();
        assert_eq!(due, saturday);
    }

    #[test]
    fn negative_budget_is_rejected() {
        let cal = weekends();
        let err = DueDateEngine::new(&cal).compute_due_date(at(monday(), 9), -1).unwrap_err();
        assert!(matches!(err, TatError::InvalidBudget(-1)));
    }

    #[test]
    fn time_of_day_is_ignored() {
        let cal = weekends();
        let engine = DueDateEngine::new(&cal);
        assert_eq!(
            engine.compute_due_date(at(monday(), 0), 4).unwrap(),
            engine.compute_due_date(at(monday(), 23), 4).unwrap()
        );
    }

    #[test]
    fn due_date_is_never_a_non_business_day() {
        let holidays = [d(2024, 1, 2), d(2024, 1, 15), d(2024, 1, 16), d(2024, 2, 9)];
        let cal = BusinessCalendar::new(holidays, [Weekday::Fri, Weekday::Sat]).unwrap();
        let engine = DueDateEngine::new(&cal);

        for start_offset in 0..21u64 {
            let start = at(monday() + Days::new(start_offset), 12);
            for tat in 1..30 {
                let due = engine.compute_due_date(start, tat).unwrap();
                assert!(cal.is_business_day(due), "start +{start_offset}, tat {tat} -> {due}");
                // same inputs, same answer
                assert_eq!(engine.compute_due_date(start, tat).unwrap(), due);
            }
        }
    }
}
