// backend/src/models/mod.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::TatError;
use crate::tat::hierarchy::CustomerNode;

// ───────────────────────────────────────
// Calendar inputs
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Holiday {
    pub holiday_id: i64,
    pub title: String,
    pub holiday_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WeekendConfig {
    pub weekend_config_id: i64,
    pub days: serde_json::Value, // jsonb, e.g. ["saturday","sunday"]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl WeekendConfig {
    pub fn day_names(&self) -> Result<Vec<String>, TatError> {
        serde_json::from_value(self.days.clone()).map_err(|e| {
            TatError::Configuration(format!(
                "weekend config {} is not an array of weekday names: {e}",
                self.weekend_config_id
            ))
        })
    }
}

// ───────────────────────────────────────
// Case population (customer/branch joined in)
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CaseRecord {
    pub case_id: i64,
    pub customer_id: i64,
    pub customer_name: Option<String>, // None → customer row missing
    pub tat_days: Option<i32>,         // customer SLA budget
    pub branch_id: i64,
    pub branch_name: Option<String>,
    pub applicant_name: String,
    pub is_priority: bool,
    pub created_at: DateTime<Utc>,
    pub has_evaluation: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_seen: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BulkUploadRecord {
    pub bulk_upload_id: i64,
    pub customer_id: i64,
    pub customer_name: Option<String>,
    pub tat_days: Option<i32>,
    pub branch_id: i64,
    pub branch_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_seen: bool,
}

// ───────────────────────────────────────
// Notification payload leaves
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayedApplication {
    pub case_id: i64,
    pub name: String,
    pub is_priority: bool,
    pub created_at: DateTime<Utc>,
    pub days_out_of_tat: i64,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApplication {
    pub case_id: i64,
    pub name: String,
    pub is_priority: bool,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkUploadLeaf {
    pub bulk_upload_id: i64,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub tat_delay_list: Vec<CustomerNode<DelayedApplication>>,
    pub new_applications: Vec<CustomerNode<NewApplication>>,
    pub new_bulk_uploads: Vec<CustomerNode<BulkUploadLeaf>>,
}

// ───────────────────────────────────────
// DTOs helpful for endpoints
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NotificationFilter {
    pub customer_id: Option<i64>,
    pub branch_id: Option<i64>,
}

impl NotificationFilter {
    pub fn matches(&self, customer_id: i64, branch_id: i64) -> bool {
        self.customer_id.map_or(true, |c| c == customer_id)
            && self.branch_id.map_or(true, |b| b == branch_id)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MarkSeenBody {
    #[serde(default)]
    pub case_ids: Vec<i64>,
    #[serde(default)]
    pub bulk_upload_ids: Vec<i64>,
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkSeenResult {
    pub cases_marked: u64,
    pub bulk_uploads_marked: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CaseTat {
    pub case_id: i64,
    pub created_at: DateTime<Utc>,
    pub tat_days: i64,
    pub due_date: NaiveDate,
    pub days_out_of_tat: i64,
    pub is_overdue: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DueDateResult {
    pub start: DateTime<Utc>,
    pub tat_days: i64,
    pub due_date: NaiveDate,
}
