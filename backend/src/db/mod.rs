// backend/src/db/mod.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, Pool, Postgres};

use crate::config::AppConfig;
use crate::error::TatError;
use crate::models::{BulkUploadRecord, CaseRecord, Holiday, NotificationFilter, WeekendConfig};
use crate::tat::ack::{AckStore, AckTarget};
use crate::tat::calendar::BusinessCalendar;
use crate::tat::classifier::period_start;
use crate::tat::service::{CalendarSource, CaseSource};

pub async fn connect(config: &AppConfig) -> anyhow::Result<Pool<Postgres>> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!(max_connections = config.max_connections, "connected to PostgreSQL");
    Ok(pool)
}

pub async fn migrate(pool: &Pool<Postgres>) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

// Case rows with customer and branch joined in; LEFT JOIN so a missing
// referent shows up as NULL names instead of a vanished case.
const CASE_SELECT: &str = r#"
    SELECT c.case_id, c.customer_id, cu.name AS customer_name, cu.tat_days,
           c.branch_id, b.name AS branch_name, c.applicant_name, c.is_priority,
           c.created_at, c.has_evaluation, c.completed_at, c.is_seen
      FROM public.cases c
      LEFT JOIN public.customers cu ON cu.customer_id = c.customer_id
      LEFT JOIN public.branches b ON b.branch_id = c.branch_id
"#;

/// Postgres-backed calendar, case and acknowledgement storage.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CalendarSource for PgStore {
    async fn load_calendar(&self) -> Result<BusinessCalendar, TatError> {
        let unavailable = |e: sqlx::Error| TatError::CalendarUnavailable(e.to_string());

        let holidays = query_as::<_, Holiday>(
            r#"SELECT holiday_id, title, holiday_date FROM public.holidays ORDER BY holiday_date"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        let weekend = query_as::<_, WeekendConfig>(
            r#"SELECT weekend_config_id, days, is_active, created_at
                 FROM public.weekend_configs
                WHERE is_active
                ORDER BY created_at DESC, weekend_config_id DESC
                LIMIT 1"#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        let off_days = match weekend {
            Some(cfg) => cfg.day_names()?,
            None => {
                tracing::debug!("no active weekend config; treating every weekday as a business day");
                Vec::new()
            }
        };

        BusinessCalendar::from_names(holidays.iter().map(|h| h.holiday_date), &off_days)
    }
}

#[async_trait]
impl CaseSource for PgStore {
    async fn evaluated_cases(
        &self,
        filter: &NotificationFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<CaseRecord>, TatError> {
        let sql = format!(
            r#"{CASE_SELECT}
             WHERE c.has_evaluation
               AND (c.completed_at IS NULL OR c.completed_at >= $1)
               AND ($2::bigint IS NULL OR c.customer_id = $2)
               AND ($3::bigint IS NULL OR c.branch_id = $3)
             ORDER BY c.created_at DESC, c.case_id DESC"#
        );
        let rows = query_as::<_, CaseRecord>(&sql)
            .bind(period_start(now))
            .bind(filter.customer_id)
            .bind(filter.branch_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn unactioned_cases(
        &self,
        filter: &NotificationFilter,
        exclude: &[i64],
    ) -> Result<Vec<CaseRecord>, TatError> {
        let sql = format!(
            r#"{CASE_SELECT}
             WHERE NOT c.has_evaluation
               AND c.completed_at IS NULL
               AND NOT (c.case_id = ANY($1))
               AND ($2::bigint IS NULL OR c.customer_id = $2)
               AND ($3::bigint IS NULL OR c.branch_id = $3)
             ORDER BY c.created_at DESC, c.case_id DESC"#
        );
        let rows = query_as::<_, CaseRecord>(&sql)
            .bind(exclude)
            .bind(filter.customer_id)
            .bind(filter.branch_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn bulk_uploads(
        &self,
        filter: &NotificationFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<BulkUploadRecord>, TatError> {
        let rows = query_as::<_, BulkUploadRecord>(
            r#"
            SELECT u.bulk_upload_id, u.customer_id, cu.name AS customer_name, cu.tat_days,
                   u.branch_id, b.name AS branch_name, u.created_at, u.is_seen
              FROM public.bulk_uploads u
              LEFT JOIN public.customers cu ON cu.customer_id = u.customer_id
              LEFT JOIN public.branches b ON b.branch_id = u.branch_id
             WHERE u.created_at >= $1
               AND ($2::bigint IS NULL OR u.customer_id = $2)
               AND ($3::bigint IS NULL OR u.branch_id = $3)
             ORDER BY u.created_at DESC, u.bulk_upload_id DESC
            "#,
        )
        .bind(period_start(now))
        .bind(filter.customer_id)
        .bind(filter.branch_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn case_by_id(&self, case_id: i64) -> Result<Option<CaseRecord>, TatError> {
        let sql = format!("{CASE_SELECT} WHERE c.case_id = $1");
        let row = query_as::<_, CaseRecord>(&sql)
            .bind(case_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl AckStore for PgStore {
    async fn set_seen(&self, target: AckTarget, ids: &[i64]) -> Result<u64, TatError> {
        let sql = match target {
            AckTarget::Case => {
                r#"UPDATE public.cases SET is_seen = TRUE
                    WHERE case_id = ANY($1) AND NOT is_seen"#
            }
            AckTarget::BulkUpload => {
                r#"UPDATE public.bulk_uploads SET is_seen = TRUE
                    WHERE bulk_upload_id = ANY($1) AND NOT is_seen"#
            }
        };
        let res = query(sql).bind(ids).execute(&self.pool).await?;
        Ok(res.rows_affected())
    }

    async fn set_all_seen(&self, target: AckTarget) -> Result<u64, TatError> {
        let sql = match target {
            AckTarget::Case => r#"UPDATE public.cases SET is_seen = TRUE WHERE NOT is_seen"#,
            AckTarget::BulkUpload => {
                r#"UPDATE public.bulk_uploads SET is_seen = TRUE WHERE NOT is_seen"#
            }
        };
        let res = query(sql).execute(&self.pool).await?;
        Ok(res.rows_affected())
    }
}
