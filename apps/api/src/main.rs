//! Crewline API composition root.

#![forbid(unsafe_code)]

mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use crewline_application::{
    AccessService, DirectMessageDispatcher, NotificationInbox, NotificationService,
    ReviewService, UserAdminService, UserDirectory,
};
use crewline_core::AppError;
use crewline_infrastructure::{
    ConsoleDirectMessageDispatcher, PostgresNotificationRepository, PostgresProjectRepository,
    PostgresUserDirectory, SlackDirectMessageDispatcher, SlackDispatcherConfig,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

    let database_url = required_env("DATABASE_URL")?;
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
    let bootstrap_token = required_env("AUTH_BOOTSTRAP_TOKEN")?;
    let bootstrap_super_admin_email = env::var("BOOTSTRAP_SUPER_ADMIN_EMAIL")
        .ok()
        .filter(|value| !value.trim().is_empty());

    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .unwrap_or_else(|_| "false".to_owned())
        .eq_ignore_ascii_case("true");

    let chat_provider = env::var("CHAT_PROVIDER").unwrap_or_else(|_| "console".to_owned());

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_store = PostgresStore::new(pool.clone())
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;
    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    let dispatcher: Arc<dyn DirectMessageDispatcher> = match chat_provider.as_str() {
        "slack" => {
            let bot_token = required_non_empty_env("SLACK_BOT_TOKEN")?;
            let mut slack_config = SlackDispatcherConfig::new(bot_token);

            if let Ok(base_url) = env::var("SLACK_API_BASE_URL")
                && !base_url.trim().is_empty()
            {
                Url::parse(&base_url).map_err(|error| {
                    AppError::Validation(format!("invalid SLACK_API_BASE_URL: {error}"))
                })?;
                slack_config.api_base_url = base_url;
            }

            Arc::new(SlackDirectMessageDispatcher::new(
                reqwest::Client::new(),
                slack_config,
            ))
        }
        "console" => Arc::new(ConsoleDirectMessageDispatcher::new()),
        _ => {
            return Err(AppError::Validation(format!(
                "CHAT_PROVIDER must be either 'console' or 'slack', got '{chat_provider}'"
            )));
        }
    };

    let user_directory: Arc<dyn UserDirectory> =
        Arc::new(PostgresUserDirectory::new(pool.clone()));
    let notification_repository = Arc::new(PostgresNotificationRepository::new(pool.clone()));
    let project_repository = Arc::new(PostgresProjectRepository::new(pool.clone()));

    let access_service = AccessService::new(user_directory.clone());
    let notification_service =
        NotificationService::new(notification_repository.clone(), dispatcher);
    let notification_inbox = NotificationInbox::new(notification_repository);
    let review_service = ReviewService::new(
        project_repository,
        user_directory.clone(),
        notification_service.clone(),
    );
    let user_admin_service =
        UserAdminService::new(access_service.clone(), user_directory.clone());

    let app_state = AppState {
        access_service,
        notification_service,
        notification_inbox,
        review_service,
        user_admin_service,
        user_directory,
        postgres_pool: pool,
        frontend_url: frontend_url.clone(),
        bootstrap_token,
        bootstrap_super_admin_email,
    };

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/api/notifications",
            get(handlers::notifications::list_notifications_handler),
        )
        .route(
            "/api/notifications/mark-all-read",
            post(handlers::notifications::mark_all_read_handler),
        )
        .route(
            "/api/notifications/{notification_id}/read",
            post(handlers::notifications::mark_read_handler),
        )
        .route(
            "/api/projects/{project_id}/review-requests",
            post(handlers::reviews::request_review_handler),
        )
        .route("/api/admin/users", get(handlers::admin::list_users_handler))
        .route(
            "/api/admin/users/{user_id}/permission",
            put(handlers::admin::update_permission_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "crewline-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
