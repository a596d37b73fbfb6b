// backend/src/routes/notifications.rs

use axum::{extract::{Query, State}, Json};
use chrono::Utc;

use crate::{
    error::TatError,
    models::{MarkSeenBody, MarkSeenResult, NotificationFilter, NotificationPayload},
    tat::{
        ack::{AckTarget, AcknowledgementTracker},
        service::NotificationService,
    },
    AppState,
};

/// GET /api/v1/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(filter): Query<NotificationFilter>,
) -> Result<Json<NotificationPayload>, TatError> {
    let payload = NotificationService::new(&state.store, &state.store)
        .build(&filter, Utc::now())
        .await?;
    Ok(Json(payload))
}

/// POST /api/v1/notifications/seen
pub async fn mark_seen(
    State(state): State<AppState>,
    Json(body): Json<MarkSeenBody>,
) -> Result<Json<MarkSeenResult>, TatError> {
    let tracker = AcknowledgementTracker::new(&state.store);

    let result = if body.all {
        MarkSeenResult {
            cases_marked: tracker.mark_all_seen(AckTarget::Case).await?,
            bulk_uploads_marked: tracker.mark_all_seen(AckTarget::BulkUpload).await?,
        }
    } else {
        MarkSeenResult {
            cases_marked: tracker.mark_seen(AckTarget::Case, &body.case_ids).await?,
            bulk_uploads_marked: tracker
                .mark_seen(AckTarget::BulkUpload, &body.bulk_upload_ids)
                .await?,
        }
    };
    Ok(Json(result))
}
