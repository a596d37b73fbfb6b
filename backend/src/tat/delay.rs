// backend/src/tat/delay.rs

use chrono::{DateTime, NaiveDate, Utc};

use super::calendar::BusinessCalendar;
use super::due_date::next_day;
use crate::error::TatError;

/// Measures how many business days a due date has been overrun by.
#[derive(Debug, Clone, Copy)]
pub struct DelayEvaluator<'a> {
    calendar: &'a BusinessCalendar,
}

impl<'a> DelayEvaluator<'a> {
    pub fn new(calendar: &'a BusinessCalendar) -> Self {
        Self { calendar }
    }

    /// Business days strictly after `due` up to and including `now`'s date.
    /// Zero while `now` is on or before the due date.
    pub fn days_overrun(&self, due: NaiveDate, now: DateTime<Utc>) -> Result<i64, TatError> {
        let today = now.date_naive();
        let mut current = due;
        let mut overrun = 0;
        while current < today {
            current = next_day(current)?;
            if self.calendar.is_business_day(current) {
                overrun += 1;
            }
        }
        Ok(overrun)
    }

    pub fn is_overdue(&self, due: NaiveDate, now: DateTime<Utc>) -> Result<bool, TatError> {
        Ok(self.days_overrun(due, now)? > 0)
    }
}
