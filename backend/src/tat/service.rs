// backend/src/tat/service.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::calendar::BusinessCalendar;
use super::classifier::CaseClassifier;
use super::hierarchy::HierarchyAggregator;
use crate::error::TatError;
use crate::models::{BulkUploadRecord, CaseRecord, CaseTat, NotificationFilter, NotificationPayload};

/// Holidays plus the active weekend configuration.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Any read failure must surface as `CalendarUnavailable`.
    async fn load_calendar(&self) -> Result<BusinessCalendar, TatError>;
}

/// Case population as seen by the notification view, most recent first.
#[async_trait]
pub trait CaseSource: Send + Sync {
    /// Cases carrying an evaluation, open or completed within the period of `now`.
    async fn evaluated_cases(
        &self,
        filter: &NotificationFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<CaseRecord>, TatError>;

    /// Open cases without an evaluation, excluding `exclude` in the read itself.
    async fn unactioned_cases(
        &self,
        filter: &NotificationFilter,
        exclude: &[i64],
    ) -> Result<Vec<CaseRecord>, TatError>;

    async fn bulk_uploads(
        &self,
        filter: &NotificationFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<BulkUploadRecord>, TatError>;

    async fn case_by_id(&self, case_id: i64) -> Result<Option<CaseRecord>, TatError>;
}

pub struct NotificationService<'a, C: ?Sized, S: ?Sized> {
    calendar: &'a C,
    cases: &'a S,
}

impl<'a, C, S> NotificationService<'a, C, S>
where
    C: CalendarSource + ?Sized,
    S: CaseSource + ?Sized,
{
    pub fn new(calendar: &'a C, cases: &'a S) -> Self {
        Self { calendar, cases }
    }

    pub async fn build(
        &self,
        filter: &NotificationFilter,
        now: DateTime<Utc>,
    ) -> Result<NotificationPayload, TatError> {
        let calendar = self.calendar.load_calendar().await?;
        let classifier = CaseClassifier::new(&calendar, now);

        let evaluated = self.cases.evaluated_cases(filter, now).await?;
        let first = classifier.overdue_pass(evaluated)?;
        let exclude = first.overdue_ids();

        let pending = self.cases.unactioned_cases(filter, &exclude).await?;
        let classification = classifier.unactioned_pass(first, pending);
        let uploads = self.cases.bulk_uploads(filter, now).await?;

        let payload = HierarchyAggregator::new(filter).payload(&classification, &uploads);
        tracing::debug!(
            overdue = exclude.len(),
            customers_delayed = payload.tat_delay_list.len(),
            customers_new = payload.new_applications.len(),
            customers_bulk = payload.new_bulk_uploads.len(),
            "built notification hierarchy"
        );
        Ok(payload)
    }

    pub async fn case_tat(&self, case_id: i64, now: DateTime<Utc>) -> Result<CaseTat, TatError> {
        let case = self
            .cases
            .case_by_id(case_id)
            .await?
            .ok_or(TatError::NotFound { entity: "case", id: case_id })?;
        let tat_days = case
            .tat_days
            .map(i64::from)
            .ok_or(TatError::NotFound { entity: "customer", id: case.customer_id })?;

        let calendar = self.calendar.load_calendar().await?;
        let (due_date, days_out_of_tat) = CaseClassifier::new(&calendar, now).evaluate(&case, tat_days)?;

        Ok(CaseTat {
            case_id,
            created_at: case.created_at,
            tat_days,
            due_date,
            days_out_of_tat,
            is_overdue: days_out_of_tat > 0,
        })
    }
}
