use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    middleware,
    routing::{get, patch, post},
};
use chrono::Utc;
use serde_json::{Value, json};
use uuid::Uuid;

use civicledger_ledger::{Block, verify_blocks};
use civicledger_types::{
    Application, ApplicationStatistics, ApplicationStatus, CivicError, Credentials,
    NewApplication, Session,
};

use crate::audit::{self, ACTION_ADMIN_LOGIN, ACTION_STATUS_CHANGED};
use crate::state::AppState;

type ApiError = (StatusCode, Json<Value>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Public: intake and tracking
        .route("/api/applications", post(submit_application))
        .route(
            "/api/applications/track/{reference_number}",
            get(track_application),
        )
        .route("/api/applications/{id}/documents", post(attach_documents))
        // Admin: authentication and review
        .route("/api/admin/login", post(login))
        .route("/api/admin/logout", post(logout))
        .route("/api/admin/session", get(session_info))
        .route("/api/admin/applications", get(list_applications))
        .route("/api/admin/applications/{id}", get(get_application))
        .route(
            "/api/admin/applications/{id}/status",
            patch(update_application_status),
        )
        .route("/api/admin/statistics", get(statistics))
        // Admin: audit chain read-out
        .route("/api/audit-log", get(audit_log))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            audit::record_api_call,
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

fn error_response(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({"error": message})))
}

/// Resolve the bearer token in `Authorization` to an admin session.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<Session, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| state.sessions.get(token).map(|s| s.clone()))
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

async fn submit_application(
    State(state): State<AppState>,
    Json(intake): Json<NewApplication>,
) -> Result<Json<Application>, ApiError> {
    let application = state
        .storage
        .create_application(intake)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, &e.to_string()))?;
    tracing::info!(
        "application {} submitted for stand {}",
        application.reference_number,
        application.stand_number
    );
    Ok(Json(application))
}

async fn track_application(
    State(state): State<AppState>,
    Path(reference_number): Path<String>,
) -> Result<Json<Application>, ApiError> {
    state
        .storage
        .get_application_by_reference(&reference_number)
        .map(Json)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Application not found"))
}

#[derive(serde::Deserialize)]
struct AttachDocumentsRequest {
    documents: Vec<String>,
}

/// Attach document references (already stored by the upload collaborator) to
/// an existing application.
async fn attach_documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AttachDocumentsRequest>,
) -> Result<Json<Application>, ApiError> {
    if request.documents.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "No documents provided"));
    }
    state
        .storage
        .attach_documents(id, &request.documents)
        .map(Json)
        .map_err(|_| error_response(StatusCode::NOT_FOUND, "Application not found"))
}

async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<Value>, ApiError> {
    if credentials.username.is_empty() || credentials.password.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Username and password required",
        ));
    }

    let admin = state
        .storage
        .get_admin_by_username(&credentials.username)
        .filter(|admin| admin.password == credentials.password)
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;

    let token = Uuid::new_v4().to_string();
    state.sessions.insert(
        token.clone(),
        Session {
            admin_id: admin.id,
            username: admin.username.clone(),
            created_at: Utc::now(),
        },
    );

    if let Err(e) = state
        .ledger
        .append(ACTION_ADMIN_LOGIN, json!({"username": admin.username}))
        .await
    {
        tracing::error!("failed to record admin login: {e}");
    }

    Ok(Json(json!({
        "token": token,
        "id": admin.id,
        "username": admin.username,
        "full_name": admin.full_name,
    })))
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        state.sessions.remove(token);
    }
    Json(json!({"message": "Logged out successfully"}))
}

async fn session_info(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    match authorize(&state, &headers) {
        Ok(session) => Json(json!({
            "authenticated": true,
            "admin_id": session.admin_id,
            "username": session.username,
        })),
        Err(_) => Json(json!({"authenticated": false})),
    }
}

async fn list_applications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Application>>, ApiError> {
    authorize(&state, &headers)?;
    Ok(Json(state.storage.all_applications()))
}

async fn get_application(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, ApiError> {
    authorize(&state, &headers)?;
    state
        .storage
        .get_application(id)
        .map(Json)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Application not found"))
}

#[derive(serde::Deserialize)]
struct UpdateStatusRequest {
    status: String,
    #[serde(default)]
    admin_notes: Option<String>,
}

async fn update_application_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Application>, ApiError> {
    let session = authorize(&state, &headers)?;

    let status: ApplicationStatus = request
        .status
        .parse()
        .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Invalid status"))?;
    let previous_status = state
        .storage
        .get_application(id)
        .map(|application| application.status)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Application not found"))?;

    let application = state
        .storage
        .update_application_status(
            id,
            status,
            Some(&session.username),
            request.admin_notes.as_deref(),
        )
        .map_err(|e| match e {
            CivicError::ApplicationNotFound(_) => {
                error_response(StatusCode::NOT_FOUND, "Application not found")
            }
            other => error_response(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string()),
        })?;

    if let Err(e) = state
        .ledger
        .append(
            ACTION_STATUS_CHANGED,
            json!({
                "application_id": application.id,
                "reference_number": application.reference_number,
                "from": previous_status.as_str(),
                "to": status.as_str(),
                "reviewed_by": session.username,
            }),
        )
        .await
    {
        tracing::error!("failed to record status change: {e}");
    }
    tracing::info!(
        "application {} moved to {}",
        application.reference_number,
        status.as_str()
    );

    Ok(Json(application))
}

async fn statistics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApplicationStatistics>, ApiError> {
    authorize(&state, &headers)?;
    Ok(Json(state.storage.statistics()))
}

#[derive(serde::Serialize)]
struct AuditLogResponse {
    chain: Vec<Block>,
    valid: bool,
    first_invalid_index: Option<u64>,
}

/// Full chain plus its verification verdict, verified over one consistent
/// snapshot.
async fn audit_log(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AuditLogResponse>, ApiError> {
    authorize(&state, &headers)?;

    let chain = state.ledger.export().await;
    let report = verify_blocks(&chain);
    Ok(Json(AuditLogResponse {
        chain,
        valid: report.valid,
        first_invalid_index: report.first_invalid_index,
    }))
}
