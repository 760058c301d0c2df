use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use crewline_core::UserIdentity;
use crewline_domain::{PermissionTier, UserId};
use uuid::Uuid;

use crate::auth::identity_user_id;
use crate::dto::{UpdatePermissionRequest, UserAccountResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<UserAccountResponse>>> {
    let actor = identity_user_id(&user)?;

    let users = state
        .user_admin_service
        .list_users(actor)
        .await?
        .into_iter()
        .map(UserAccountResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn update_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdatePermissionRequest>,
) -> ApiResult<StatusCode> {
    let actor = identity_user_id(&user)?;
    let tier = PermissionTier::from_str(payload.permission.as_str())?;

    state
        .user_admin_service
        .set_permission(actor, UserId::from_uuid(user_id), tier)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
