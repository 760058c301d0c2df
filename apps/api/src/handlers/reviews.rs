use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use crewline_core::{ProjectId, UserIdentity};
use uuid::Uuid;

use crate::dto::ResolvedApproverResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn request_review_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Vec<ResolvedApproverResponse>>)> {
    let approvers = state
        .review_service
        .request_review(user.display_name(), ProjectId::from_uuid(project_id))
        .await?
        .into_iter()
        .map(ResolvedApproverResponse::from)
        .collect();

    Ok((StatusCode::CREATED, Json(approvers)))
}
