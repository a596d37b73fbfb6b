// backend/src/tat/classifier.rs

use std::collections::HashSet;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

use super::calendar::BusinessCalendar;
use super::delay::DelayEvaluator;
use super::due_date::DueDateEngine;
use crate::error::TatError;
use crate::models::CaseRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseClass {
    Overdue { due_date: NaiveDate, days_out_of_tat: i64 },
    Unactioned,
    Other,
}

#[derive(Debug, Clone)]
pub struct ClassifiedCase {
    pub case: CaseRecord,
    pub class: CaseClass,
}

/// Result of the first pass: every evaluated case, with overdue ones flagged.
#[derive(Debug, Default)]
pub struct OverduePass {
    cases: Vec<ClassifiedCase>,
}

impl OverduePass {
    /// Ids the second pass must exclude.
    pub fn overdue_ids(&self) -> Vec<i64> {
        self.cases
            .iter()
            .filter(|c| matches!(c.class, CaseClass::Overdue { .. }))
            .map(|c| c.case.case_id)
            .collect()
    }
}

/// Disjoint partition of a case population, in input order per pass.
#[derive(Debug, Default)]
pub struct Classification {
    pub cases: Vec<ClassifiedCase>,
}

impl Classification {
    pub fn overdue_ids(&self) -> HashSet<i64> {
        self.ids_where(|class| matches!(class, CaseClass::Overdue { .. }))
    }

    pub fn unactioned_ids(&self) -> HashSet<i64> {
        self.ids_where(|class| *class == CaseClass::Unactioned)
    }

    pub fn other_ids(&self) -> HashSet<i64> {
        self.ids_where(|class| *class == CaseClass::Other)
    }

    fn ids_where(&self, pred: impl Fn(&CaseClass) -> bool) -> HashSet<i64> {
        self.cases
            .iter()
            .filter(|c| pred(&c.class))
            .map(|c| c.case.case_id)
            .collect()
    }
}

/// Start of the evaluation window containing `now`: its calendar month.
pub fn period_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let first = now.date_naive().with_day(1).unwrap_or_else(|| now.date_naive());
    Utc.from_utc_datetime(&first.and_time(NaiveTime::default()))
}

pub struct CaseClassifier<'a> {
    due_dates: DueDateEngine<'a>,
    delays: DelayEvaluator<'a>,
    now: DateTime<Utc>,
}

impl<'a> CaseClassifier<'a> {
    pub fn new(calendar: &'a BusinessCalendar, now: DateTime<Utc>) -> Self {
        Self {
            due_dates: DueDateEngine::new(calendar),
            delays: DelayEvaluator::new(calendar),
            now,
        }
    }

    /// Open cases always qualify; completed ones only if completed this period.
    pub fn in_window(&self, case: &CaseRecord) -> bool {
        case.completed_at
            .map_or(true, |done| done >= period_start(self.now))
    }

    /// Due date and overrun of one case. Completed cases are measured at completion.
    pub fn evaluate(&self, case: &CaseRecord, tat_days: i64) -> Result<(NaiveDate, i64), TatError> {
        let due_date = self.due_dates.compute_due_date(case.created_at, tat_days)?;
        let measured_at = case.completed_at.map_or(self.now, |done| done.min(self.now));
        let overrun = self.delays.days_overrun(due_date, measured_at)?;
        Ok((due_date, overrun))
    }

    /// First pass over cases that carry an evaluation.
    pub fn overdue_pass(
        &self,
        evaluated: impl IntoIterator<Item = CaseRecord>,
    ) -> Result<OverduePass, TatError> {
        let mut pass = OverduePass::default();
        for case in evaluated {
            let class = self.classify_evaluated(&case)?;
            pass.cases.push(ClassifiedCase { case, class });
        }
        Ok(pass)
    }

    /// Second pass over cases read without an evaluation. Anything already
    /// placed by the first pass is dropped here, so overdue and unactioned
    /// never share an id even if the two reads disagree.
    pub fn unactioned_pass(
        &self,
        first: OverduePass,
        pending: impl IntoIterator<Item = CaseRecord>,
    ) -> Classification {
        let seen: HashSet<i64> = first.cases.iter().map(|c| c.case.case_id).collect();
        let mut cases = first.cases;

        for case in pending {
            if seen.contains(&case.case_id) {
                tracing::debug!(case_id = case.case_id, "case already classified by overdue pass");
                continue;
            }
            let class = if !case.has_evaluation && case.completed_at.is_none() {
                CaseClass::Unactioned
            } else {
                CaseClass::Other
            };
            cases.push(ClassifiedCase { case, class });
        }

        Classification { cases }
    }

    /// Both passes over an in-memory population.
    pub fn classify(&self, population: Vec<CaseRecord>) -> Result<Classification, TatError> {
        let (evaluated, pending): (Vec<_>, Vec<_>) =
            population.into_iter().partition(|c| c.has_evaluation);
        let first = self.overdue_pass(evaluated)?;
        Ok(self.unactioned_pass(first, pending))
    }

    fn classify_evaluated(&self, case: &CaseRecord) -> Result<CaseClass, TatError> {
        if !case.has_evaluation || !self.in_window(case) {
            return Ok(CaseClass::Other);
        }
        let Some(tat_days) = case.tat_days else {
            tracing::warn!(
                case_id = case.case_id,
                customer_id = case.customer_id,
                "no TAT budget for case; customer missing"
            );
            return Ok(CaseClass::Other);
        };

        let (due_date, days_out_of_tat) = self.evaluate(case, i64::from(tat_days))?;
        Ok(if days_out_of_tat > 0 {
            CaseClass::Overdue { due_date, days_out_of_tat }
        } else {
            CaseClass::Other
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, Weekday};

    pub(crate) fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    pub(crate) fn case(id: i64, created_at: DateTime<Utc>, has_evaluation: bool) -> CaseRecord {
        CaseRecord {
            case_id: id,
            customer_id: 1,
            customer_name: Some("Acme Bank".to_string()),
            tat_days: Some(3),
            branch_id: 10,
            branch_name: Some("Downtown".to_string()),
            applicant_name: format!("Applicant {id}"),
            is_priority: false,
            created_at,
            has_evaluation,
            completed_at: None,
            is_seen: false,
        }
    }

    fn weekends() -> BusinessCalendar {
        BusinessCalendar::new([], [Weekday::Sat, Weekday::Sun]).unwrap()
    }

    #[test]
    fn overdue_and_unactioned_cases_land_in_separate_sets() {
        let cal = weekends();
        // Monday 2024-01-01 + 3 → Thursday; now is the following Monday.
        let now = at(2024, 1, 8);
        let classifier = CaseClassifier::new(&cal, now);

        let population = vec![case(1, at(2024, 1, 1), true), case(2, at(2024, 1, 2), false)];
        let result = classifier.classify(population).unwrap();

        assert_eq!(result.overdue_ids(), HashSet::from([1]));
        assert_eq!(result.unactioned_ids(), HashSet::from([2]));
        assert!(result.other_ids().is_empty());
        assert!(matches!(
            result.cases[0].class,
            CaseClass::Overdue { days_out_of_tat: 2, .. }
        ));
    }

    #[test]
    fn on_time_cases_are_other() {
        let cal = weekends();
        let classifier = CaseClassifier::new(&cal, at(2024, 1, 3));
        let result = classifier.classify(vec![case(1, at(2024, 1, 1), true)]).unwrap();
        assert_eq!(result.other_ids(), HashSet::from([1]));
    }

    #[test]
    fn second_read_cannot_reintroduce_an_overdue_case() {
        let cal = weekends();
        let classifier = CaseClassifier::new(&cal, at(2024, 1, 8));

        let first = classifier.overdue_pass(vec![case(1, at(2024, 1, 1), true)]).unwrap();
        assert_eq!(first.overdue_ids(), vec![1]);

        // evaluation disappeared between the two reads
        let skewed = case(1, at(2024, 1, 1), false);
        let result = classifier.unactioned_pass(first, vec![skewed, case(2, at(2024, 1, 5), false)]);

        assert!(result.overdue_ids().is_disjoint(&result.unactioned_ids()));
        assert_eq!(result.unactioned_ids(), HashSet::from([2]));
        assert_eq!(result.cases.len(), 2);
    }

    #[test]
    fn partition_is_disjoint_for_mixed_population() {
        let cal = weekends();
        let now = at(2024, 3, 15);
        let classifier = CaseClassifier::new(&cal, now);

        let population: Vec<CaseRecord> = (0..40)
            .map(|i| {
                let mut c = case(i, now - Duration::days(i), i % 3 != 0);
                if i % 7 == 0 {
                    c.completed_at = Some(now - Duration::days(i / 2));
                }
                c
            })
            .collect();
        let result = classifier.classify(population).unwrap();

        let overdue = result.overdue_ids();
        let unactioned = result.unactioned_ids();
        let other = result.other_ids();
        assert!(overdue.is_disjoint(&unactioned));
        assert!(overdue.is_disjoint(&other));
        assert!(unactioned.is_disjoint(&other));
        assert_eq!(overdue.len() + unactioned.len() + other.len(), 40);
    }

    #[test]
    fn completion_window_limits_completed_cases() {
        let cal = weekends();
        let now = at(2024, 2, 20);
        let classifier = CaseClassifier::new(&cal, now);

        let mut this_month = case(1, at(2024, 1, 1), true);
        this_month.completed_at = Some(at(2024, 2, 5));
        let mut last_month = case(2, at(2024, 1, 1), true);
        last_month.completed_at = Some(at(2024, 1, 30));

        let result = classifier.classify(vec![this_month, last_month]).unwrap();
        assert_eq!(result.overdue_ids(), HashSet::from([1]));
        assert_eq!(result.other_ids(), HashSet::from([2]));
    }

    #[test]
    fn completed_cases_are_measured_at_completion() {
        let cal = weekends();
        let classifier = CaseClassifier::new(&cal, at(2024, 2, 20));

        let mut done = case(1, at(2024, 2, 1), true);
        // Thursday 2024-02-01 + 3 → Tuesday 02-06; completed Thursday 02-08
        done.completed_at = Some(at(2024, 2, 8));
        let (due, overrun) = classifier.evaluate(&done, 3).unwrap();
        assert_eq!(due, NaiveDate::from_ymd_opt(2024, 2, 6).unwrap());
        assert_eq!(overrun, 2);
    }

    #[test]
    fn negative_budget_fails_classification() {
        let cal = weekends();
        let classifier = CaseClassifier::new(&cal, at(2024, 1, 8));
        let mut bad = case(1, at(2024, 1, 1), true);
        bad.tat_days = Some(-2);
        assert!(matches!(
            classifier.classify(vec![bad]),
            Err(TatError::InvalidBudget(-2))
        ));
    }

    #[test]
    fn period_starts_on_first_of_month() {
        assert_eq!(period_start(at(2024, 2, 20)), Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    }
}
