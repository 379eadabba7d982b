// API handlers - JSON endpoints consumed by the site
//
// All responses are JSON. Validation endpoints always answer 200 with the
// verdict in the body; only /api/contact maps outcomes to status codes.

use super::AppState;
use crate::config::VERSION;
use crate::contact::{ClientInfo, MessageStore, Notification, SubmitError, SubmitOutcome};
use crate::notify::{EmailStatus, Notifier};
use crate::projects::{ProjectFeed, ProjectSource};
use crate::validation::{EmailValidation, Submission, ValidationResult};
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Body missing or not the expected JSON
    BadRequest(String),
    /// Submission failed validation
    Unprocessable {
        errors: Vec<String>,
        message: String,
    },
    Internal(String),
}

impl ApiError {
    /// Map a failed submission to its response, using the owner address in
    /// the fallback message
    pub fn from_submit(err: SubmitError, owner_email: &str) -> Self {
        let message = err.status_line(owner_email);
        match err {
            SubmitError::Invalid(result) => Self::Unprocessable {
                errors: result.errors,
                message,
            },
            SubmitError::Store(_) => Self::Internal(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Body of every non-2xx response
#[derive(Debug, Serialize)]
struct FailureBody {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, errors) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unprocessable { errors, message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message, Some(errors))
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
        };

        if status.is_server_error() {
            tracing::error!("API error: {} - {}", status, message);
        } else {
            tracing::debug!("API error: {} - {}", status, message);
        }

        let body = FailureBody {
            status: "failed",
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Health and status
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub email: EmailStatus,
}

pub async fn health<S, N>(State(state): State<AppState<S, N>>) -> Json<HealthResponse>
where
    S: MessageStore + ProjectSource + 'static,
    N: Notifier + 'static,
{
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
        email: state.contact.email_status(),
    })
}

#[derive(Debug, Serialize)]
pub struct EmailStatusResponse {
    pub status: EmailStatus,
}

pub async fn email_status<S, N>(State(state): State<AppState<S, N>>) -> Json<EmailStatusResponse>
where
    S: MessageStore + ProjectSource + 'static,
    N: Notifier + 'static,
{
    Json(EmailStatusResponse {
        status: state.contact.email_status(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────────────────────────

/// Project feed; falls back to sample projects when the store is unreadable
pub async fn projects<S, N>(State(state): State<AppState<S, N>>) -> Json<ProjectFeed>
where
    S: MessageStore + ProjectSource + 'static,
    N: Notifier + 'static,
{
    Json(ProjectFeed::load(state.store.as_ref()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

pub async fn validate_form<S, N>(
    State(state): State<AppState<S, N>>,
    payload: Result<Json<Submission>, JsonRejection>,
) -> Result<Json<ValidationResult>, ApiError>
where
    S: MessageStore + ProjectSource + 'static,
    N: Notifier + 'static,
{
    let Json(submission) = payload?;
    Ok(Json(state.contact.validator().validate_form(&submission)))
}

#[derive(Debug, Deserialize)]
pub struct EmailCheckRequest {
    #[serde(default)]
    pub email: String,
}

pub async fn validate_email<S, N>(
    State(state): State<AppState<S, N>>,
    payload: Result<Json<EmailCheckRequest>, JsonRejection>,
) -> Result<Json<EmailValidation>, ApiError>
where
    S: MessageStore + ProjectSource + 'static,
    N: Notifier + 'static,
{
    let Json(request) = payload?;
    Ok(Json(state.contact.validator().validate_email(&request.email)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Contact
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub status: &'static str,
    pub id: String,
    pub notification: Notification,
    /// Status line to show under the form
    pub message: String,
}

impl From<SubmitOutcome> for ContactResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        Self {
            status: "succeeded",
            id: outcome.id,
            notification: outcome.notification,
            message: outcome.notification.status_line().to_string(),
        }
    }
}

/// Validate, store, and (when configured) email a contact form submission
pub async fn contact<S, N>(
    State(state): State<AppState<S, N>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<Submission>, JsonRejection>,
) -> Result<Json<ContactResponse>, ApiError>
where
    S: MessageStore + ProjectSource + 'static,
    N: Notifier + 'static,
{
    let Json(submission) = payload?;

    let client = ClientInfo {
        ip_address: connect_info.map(|ConnectInfo(addr)| addr.ip().to_string()),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    state
        .contact
        .submit(submission, client)
        .await
        .map(|outcome| Json(outcome.into()))
        .map_err(|e| ApiError::from_submit(e, &state.owner_email))
}
