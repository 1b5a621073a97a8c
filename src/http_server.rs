use crate::error::ApiError;
use crate::schema;
use crate::store::{digest_password, UserStore};
use crate::transform;
use crate::types::{CanonicalChargeback, NewUser, PublicUser};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

/// Shared handle to the user table.
pub type SharedUsers = Arc<RwLock<UserStore>>;

#[derive(Clone)]
pub struct AppState {
    pub users: SharedUsers,
    started: Instant,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(UserStore::new())),
            started: Instant::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_info))
        .route("/health", get(handle_health))
        .route("/webhook", post(handle_transform_webhook))
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(state)
}

/// Bind `host:port` (host may be a name or an address) and return the bound
/// address with a future that serves until the listener fails.
pub async fn bind(
    host: &str,
    port: u16,
    state: AppState,
) -> std::io::Result<(SocketAddr, impl std::future::Future<Output = std::io::Result<()>>)> {
    let listener = TcpListener::bind((host, port)).await?;
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, "HTTP server bound");

    let app = build_router(state);
    Ok((local, async move { axum::serve(listener, app).await }))
}

fn decode_body(body: &Bytes) -> Result<Value, ApiError> {
    Ok(serde_json::from_slice(body)?)
}

// ─── Info & health ───────────────────────────────────────────────────────────

async fn handle_info() -> Json<Value> {
    Json(serde_json::json!({
        "message": "Chargeback Webhook API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn handle_health(State(state): State<AppState>) -> Json<Value> {
    tracing::trace!("health check: ok");
    Json(serde_json::json!({
        "status": "OK",
        "message": "Service is healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.started.elapsed().as_secs_f64(),
    }))
}

// ─── Webhook transform ───────────────────────────────────────────────────────

async fn handle_transform_webhook(body: Bytes) -> Result<Json<CanonicalChargeback>, ApiError> {
    let raw = decode_body(&body)?;
    let envelope = schema::validate_envelope(&raw).map_err(|failure| {
        tracing::debug!(issues = failure.issues.len(), "rejected webhook body");
        ApiError::Validation(failure)
    })?;

    let record = transform::transform(envelope.kind, &envelope.payload)?;
    Ok(Json(record))
}

// ─── Users ───────────────────────────────────────────────────────────────────

fn user_id(raw: &str) -> Result<u64, ApiError> {
    schema::parse_user_id(raw).map_err(ApiError::InvalidParams)
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<PublicUser>> {
    let users = state.users.read().await;
    Json(users.list().into_iter().cloned().map(PublicUser::from).collect())
}

async fn get_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PublicUser>, ApiError> {
    let id = user_id(&id)?;
    let users = state.users.read().await;
    let user = users.get(id).ok_or(ApiError::NotFound("User not found"))?;
    Ok(Json(user.clone().into()))
}

async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    let raw = decode_body(&body)?;
    let input = schema::validate_create_user(&raw).map_err(ApiError::Validation)?;

    let mut users = state.users.write().await;
    if users.find_by_email(&input.email).is_some() {
        return Err(ApiError::Conflict("User with this email already exists"));
    }
    if users.find_by_username(&input.username).is_some() {
        return Err(ApiError::Conflict("User with this username already exists"));
    }

    let created = users.insert(NewUser {
        password_hash: digest_password(&input.password),
        email: input.email,
        username: input.username,
        first_name: input.first_name,
        last_name: input.last_name,
    });
    tracing::info!(user_id = created.id, "user created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn update_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PublicUser>, ApiError> {
    let id = user_id(&id)?;
    let raw = decode_body(&body)?;
    let changes = schema::validate_update_user(&raw).map_err(ApiError::Validation)?;

    let mut users = state.users.write().await;
    let existing = users.get(id).ok_or(ApiError::NotFound("User not found"))?;

    if let Some(email) = changes.email.as_deref() {
        if email != existing.email && users.find_by_email(email).is_some() {
            return Err(ApiError::Conflict("User with this email already exists"));
        }
    }
    if let Some(username) = changes.username.as_deref() {
        if username != existing.username && users.find_by_username(username).is_some() {
            return Err(ApiError::Conflict("User with this username already exists"));
        }
    }

    let updated = users
        .update(id, changes)
        .ok_or(ApiError::NotFound("User not found"))?;
    Ok(Json(updated.into()))
}

async fn delete_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let id = user_id(&id)?;
    let mut users = state.users.write().await;
    if users.delete(id) {
        tracing::info!(user_id = id, "user deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("User not found"))
    }
}
