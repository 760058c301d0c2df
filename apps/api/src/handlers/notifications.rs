use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use crewline_core::UserIdentity;
use crewline_domain::NotificationId;
use uuid::Uuid;

use crate::auth::identity_user_id;
use crate::dto::{MarkAllReadResponse, NotificationResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_notifications_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<NotificationResponse>>> {
    let user_id = identity_user_id(&user)?;

    let notifications = state
        .notification_service
        .list_for_user(user_id)
        .await?
        .into_iter()
        .map(NotificationResponse::from)
        .collect();

    Ok(Json(notifications))
}

pub async fn mark_all_read_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<MarkAllReadResponse>> {
    let user_id = identity_user_id(&user)?;
    let marked_read = state.notification_inbox.mark_all_read(user_id).await?;

    Ok(Json(MarkAllReadResponse { marked_read }))
}

pub async fn mark_read_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(notification_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let user_id = identity_user_id(&user)?;

    state
        .notification_service
        .mark_read(NotificationId::from_uuid(notification_id), user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
