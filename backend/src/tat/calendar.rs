// backend/src/tat/calendar.rs

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::TatError;

/// Weekly off-days plus an explicit holiday list.
///
/// Built once per evaluation from the full holiday list and the active weekend
/// configuration; lookups are constant time and never touch storage.
#[derive(Debug, Clone, Default)]
pub struct BusinessCalendar {
    off_days: [bool; 7],
    holidays: HashSet<NaiveDate>,
}

impl BusinessCalendar {
    /// Fails fast when every weekday is off: no due date could ever be reached.
    pub fn new(
        holidays: impl IntoIterator<Item = NaiveDate>,
        off_days: impl IntoIterator<Item = Weekday>,
    ) -> Result<Self, TatError> {
        let mut mask = [false; 7];
        for day in off_days {
            mask[day.num_days_from_monday() as usize] = true;
        }
        if mask.iter().all(|off| *off) {
            return Err(TatError::Configuration(
                "weekend configuration marks all seven weekdays as off".into(),
            ));
        }

        Ok(Self {
            off_days: mask,
            holidays: holidays.into_iter().collect(),
        })
    }

    /// Build from stored weekday names such as `["saturday", "sunday"]`.
    pub fn from_names<S: AsRef<str>>(
        holidays: impl IntoIterator<Item = NaiveDate>,
        off_day_names: &[S],
    ) -> Result<Self, TatError> {
        let off_days = off_day_names
            .iter()
            .map(|name| parse_weekday(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(holidays, off_days)
    }

    pub fn is_non_business_day(&self, date: NaiveDate) -> bool {
        self.off_days[date.weekday().num_days_from_monday() as usize]
            || self.holidays.contains(&date)
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !self.is_non_business_day(date)
    }
}

/// Case-insensitive; accepts full ("Saturday") and short ("sat") names.
pub fn parse_weekday(name: &str) -> Result<Weekday, TatError> {
    name.trim()
        .parse::<Weekday>()
        .map_err(|_| TatError::Configuration(format!("unknown weekday name '{name}'")))
}
