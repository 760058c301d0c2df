use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use crewline_core::{AppError, NonEmptyString, UserIdentity};
use crewline_domain::{EmailAddress, PermissionTier, UserId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::info;
use uuid::Uuid;

use crate::dto::UserIdentityResponse;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub const SESSION_USER_KEY: &str = "user_identity";

/// Parses the session subject back into a user id.
pub fn identity_user_id(identity: &UserIdentity) -> Result<UserId, ApiError> {
    Uuid::parse_str(identity.subject())
        .map(UserId::from_uuid)
        .map_err(|error| {
            AppError::Unauthorized(format!("session subject is not a user id: {error}")).into()
        })
}

#[derive(Debug, Deserialize)]
pub struct BootstrapRequest {
    pub email: String,
    pub display_name: String,
    pub token: String,
}

/// Token-gated session issuance for an upstream identity provider or
/// operator. Credential verification itself lives outside this service.
pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<StatusCode> {
    if payload.token != state.bootstrap_token {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let email = EmailAddress::new(&payload.email)?;
    let display_name = NonEmptyString::new(payload.display_name.trim())?;
    let account = state
        .user_directory
        .ensure_account(email.as_str(), display_name.as_str())
        .await?;

    if let Some(ref super_admin_email) = state.bootstrap_super_admin_email
        && account.email.eq_ignore_ascii_case(super_admin_email)
        && account.permission != PermissionTier::SuperAdmin
    {
        state
            .user_directory
            .update_permission(account.id, PermissionTier::SuperAdmin)
            .await?;
    }

    let identity = UserIdentity::new(
        account.id.to_string(),
        account.display_name.clone(),
        Some(account.email.clone()),
    );

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    info!(user_id = %account.id, "session bootstrapped");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    let subject = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .map(|identity| identity.subject().to_owned());

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(subject) = subject {
        info!(user_id = subject, "session ended");
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<UserIdentityResponse>> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let user_id = identity_user_id(&identity)?;
    let tier = state.access_service.current_tier(user_id).await?;

    Ok(Json(UserIdentityResponse {
        user_id: identity.subject().to_owned(),
        display_name: identity.display_name().to_owned(),
        email: identity.email().map(str::to_owned),
        permission: tier.as_str().to_owned(),
    }))
}
