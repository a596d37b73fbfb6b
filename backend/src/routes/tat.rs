// backend/src/routes/tat.rs

use axum::{extract::{Path, Query, State}, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    error::TatError,
    models::{CaseTat, DueDateResult},
    tat::{due_date::DueDateEngine, service::{CalendarSource, NotificationService}},
    AppState,
};

#[derive(Deserialize)]
pub struct DueDateQ {
    pub start: DateTime<Utc>,
    pub tat_days: i64,
}

/// GET /api/v1/cases/:id/tat
pub async fn get_case_tat(
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
) -> Result<Json<CaseTat>, TatError> {
    let tat = NotificationService::new(&state.store, &state.store)
        .case_tat(case_id, Utc::now())
        .await?;
    Ok(Json(tat))
}

/// GET /api/v1/tat/due-date?start=..&tat_days=..
pub async fn get_due_date(
    State(state): State<AppState>,
    Query(q): Query<DueDateQ>,
) -> Result<Json<DueDateResult>, TatError> {
    // reject before touching the calendar
    if q.tat_days < 0 {
        return Err(TatError::InvalidBudget(q.tat_days));
    }

    let calendar = state.store.load_calendar().await?;
    let due_date = DueDateEngine::new(&calendar).compute_due_date(q.start, q.tat_days)?;
    Ok(Json(DueDateResult { start: q.start, tat_days: q.tat_days, due_date }))
}
