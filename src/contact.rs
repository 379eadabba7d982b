// Contact module - submission orchestration
//
// A submission goes through three steps, strictly in order:
//
//   validate ──✗──→ rejected (nothing stored, nothing sent)
//      │
//   store write ──✗──→ failed (email never attempted)
//      │
//   email dispatch (only when configured; failure is reported, not fatal)
//
// The two external calls never overlap.

use crate::notify::{EmailStatus, Notifier};
use crate::validation::{Submission, ValidationResult, Validator};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Write side of the document store used by the contact form
pub trait MessageStore: Send + Sync {
    /// Persist a message and return its generated id
    fn add_message(&self, message: &NewMessage) -> anyhow::Result<String>;
}

/// A validated submission plus request metadata, ready to persist
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub submission: Submission,
    pub received_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Request metadata captured by the HTTP layer
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// What happened to the owner notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Notification {
    Sent,
    Failed,
    /// Email service not configured; dispatch not attempted
    Skipped,
}

impl Notification {
    /// Status line shown under the form after a successful save
    pub fn status_line(self) -> &'static str {
        match self {
            Self::Sent => "✨ Message sent successfully! Thank you for reaching out.",
            Self::Failed => {
                "✅ Message saved! (Email notification failed, but I'll check the database)"
            }
            Self::Skipped => {
                "✅ Message saved to database! Email notifications will be configured soon."
            }
        }
    }
}

/// Successful submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    pub id: String,
    pub notification: Notification,
}

/// Submission that did not reach the store
#[derive(Debug)]
pub enum SubmitError {
    /// Rejected by validation
    Invalid(ValidationResult),
    /// Store write failed
    Store(anyhow::Error),
}

impl SubmitError {
    /// Status line shown under the form
    pub fn status_line(&self, owner_email: &str) -> String {
        match self {
            Self::Invalid(result) => format!("❌ {}", result.first_error().unwrap_or_default()),
            Self::Store(_) => format!(
                "❌ Sorry, something went wrong. Please email me directly at {}",
                owner_email
            ),
        }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(result) => write!(f, "Invalid submission: {}", result.errors.join("; ")),
            Self::Store(e) => write!(f, "Failed to store message: {:#}", e),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Runs contact submissions against a store and a notifier
pub struct ContactService<S, N> {
    validator: Arc<Validator>,
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> Clone for ContactService<S, N> {
    fn clone(&self) -> Self {
        Self {
            validator: self.validator.clone(),
            store: self.store.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

impl<S: MessageStore, N: Notifier> ContactService<S, N> {
    pub fn new(validator: Arc<Validator>, store: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            validator,
            store,
            notifier,
        }
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn email_status(&self) -> EmailStatus {
        self.notifier.status()
    }

    /// Validate, persist, then notify
    pub async fn submit(
        &self,
        submission: Submission,
        client: ClientInfo,
    ) -> Result<SubmitOutcome, SubmitError> {
        let validation = self.validator.validate_form(&submission);
        if !validation.is_valid {
            tracing::debug!("Submission rejected: {:?}", validation.errors);
            return Err(SubmitError::Invalid(validation));
        }

        let message = NewMessage {
            submission,
            received_at: Utc::now(),
            ip_address: client.ip_address,
            user_agent: client.user_agent,
        };

        let id = self.store.add_message(&message).map_err(|e| {
            tracing::error!("Error saving message: {:#}", e);
            SubmitError::Store(e)
        })?;
        tracing::info!("Message saved with ID: {}", id);

        let notification = match self.notifier.status() {
            EmailStatus::NotConfigured => {
                tracing::warn!("Email not configured, skipping notification");
                Notification::Skipped
            }
            EmailStatus::Configured => {
                match self
                    .notifier
                    .notify(&message.submission, message.received_at)
                    .await
                {
                    Ok(()) => Notification::Sent,
                    Err(e) => {
                        tracing::error!("Email sending failed: {}", e);
                        Notification::Failed
                    }
                }
            }
        };

        Ok(SubmitOutcome { id, notification })
    }
}
