//! Email notification for new contact messages
//!
//! After a message is stored, the site owner gets an email through a hosted
//! transactional-email service (EmailJS REST API). The service needs three
//! identifiers; if any is missing, notifications are disabled up front and
//! dispatch is never attempted.

use crate::config::EmailConfig;
use crate::validation::Submission;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Whether the notification path is usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmailStatus {
    Configured,
    NotConfigured,
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured => write!(f, "configured"),
            Self::NotConfigured => write!(f, "not-configured"),
        }
    }
}

/// Errors that can occur while dispatching a notification
#[derive(Debug)]
pub enum NotifyError {
    /// One or more service identifiers are missing
    NotConfigured,
    /// Request never got a response
    Network(String),
    /// Service answered with a non-success status
    Api { status: u16, message: String },
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "Email service not configured"),
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::Api { status, message } => write!(f, "Email API error ({}): {}", status, message),
        }
    }
}

impl std::error::Error for NotifyError {}

/// Sends the "new message" email
///
/// Implementations report their status synchronously so callers can skip
/// dispatch without awaiting anything.
pub trait Notifier: Send + Sync {
    fn status(&self) -> EmailStatus;

    fn notify(
        &self,
        submission: &Submission,
        received_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Variables substituted into the email template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateParams {
    pub from_name: String,
    pub from_email: String,
    pub message: String,
    pub timestamp: String,
}

impl TemplateParams {
    pub fn new(submission: &Submission, received_at: DateTime<Utc>) -> Self {
        Self {
            from_name: submission.name.clone(),
            from_email: submission.email.clone(),
            message: submission.message.clone(),
            timestamp: received_at
                .format("%A, %B %-d, %Y at %I:%M:%S %p UTC")
                .to_string(),
        }
    }
}

/// Request body for the EmailJS send endpoint
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams,
}

/// Resolved service identifiers (only exists when all three are present)
#[derive(Debug, Clone)]
struct Credentials {
    service_id: String,
    template_id: String,
    user_id: String,
}

/// EmailJS REST client
pub struct EmailJsNotifier {
    client: reqwest::Client,
    endpoint: String,
    credentials: Option<Credentials>,
}

impl EmailJsNotifier {
    /// Build from config; a missing identifier yields a disabled notifier
    pub fn new(config: &EmailConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let credentials = match (
            non_empty(&config.service_id),
            non_empty(&config.template_id),
            non_empty(&config.user_id),
        ) {
            (Some(service_id), Some(template_id), Some(user_id)) => Some(Credentials {
                service_id: service_id.to_string(),
                template_id: template_id.to_string(),
                user_id: user_id.to_string(),
            }),
            _ => {
                tracing::warn!(
                    "Email notifications disabled, missing: {}",
                    config.missing().join(", ")
                );
                None
            }
        };

        Ok(Self {
            client,
            endpoint: format!("{}/api/v1.0/email/send", config.api_url.trim_end_matches('/')),
            credentials,
        })
    }
}

impl Notifier for EmailJsNotifier {
    fn status(&self) -> EmailStatus {
        if self.credentials.is_some() {
            EmailStatus::Configured
        } else {
            EmailStatus::NotConfigured
        }
    }

    async fn notify(
        &self,
        submission: &Submission,
        received_at: DateTime<Utc>,
    ) -> Result<(), NotifyError> {
        let credentials = self.credentials.as_ref().ok_or(NotifyError::NotConfigured)?;

        let body = SendRequest {
            service_id: &credentials.service_id,
            template_id: &credentials.template_id,
            user_id: &credentials.user_id,
            template_params: TemplateParams::new(submission, received_at),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!("Email notification sent for message from {}", submission.email);
        Ok(())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
