// HTTP server - axum router and lifecycle
//
// Request flow for the contact form:
//
//   POST /api/contact
//        │
//        ▼
//   ContactService::submit ── validate ── store ── notify
//        │
//        ▼
//   200 {status: "succeeded", ...} | 422 {errors, ...} | 500 {message}

pub mod api;

use crate::contact::{ContactService, MessageStore};
use crate::notify::Notifier;
use crate::projects::ProjectSource;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared state for all handlers
pub struct AppState<S, N> {
    pub contact: ContactService<S, N>,
    /// Read side for the project feed
    pub store: Arc<S>,
    /// Shown to visitors when a message cannot be saved
    pub owner_email: Arc<str>,
}

impl<S, N> Clone for AppState<S, N> {
    fn clone(&self) -> Self {
        Self {
            contact: self.contact.clone(),
            store: self.store.clone(),
            owner_email: self.owner_email.clone(),
        }
    }
}

impl<S, N> AppState<S, N>
where
    S: MessageStore + ProjectSource + 'static,
    N: Notifier + 'static,
{
    pub fn new(contact: ContactService<S, N>, store: Arc<S>, owner_email: &str) -> Self {
        Self {
            contact,
            store,
            owner_email: Arc::from(owner_email),
        }
    }
}

/// Build the API router
pub fn build_router<S, N>(state: AppState<S, N>) -> Router
where
    S: MessageStore + ProjectSource + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/api/health", get(api::health::<S, N>))
        .route("/api/projects", get(api::projects::<S, N>))
        .route("/api/contact", post(api::contact::<S, N>))
        // Inline feedback while the visitor types
        .route("/api/validate", post(api::validate_form::<S, N>))
        .route("/api/validate/email", post(api::validate_email::<S, N>))
        .route("/api/email/status", get(api::email_status::<S, N>))
        .with_state(state)
}

/// Serve the router until `shutdown_rx` fires
pub async fn start_server(
    bind_addr: SocketAddr,
    app: Router,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> Result<()> {
    tracing::info!("Starting server on {}", bind_addr);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    // Connect info feeds the client address stored with each message
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_rx.await.ok();
    })
    .await
    .context("Server error")?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}
