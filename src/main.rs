// folio - portfolio backend
//
// Serves the JSON API behind a personal portfolio site: the project
// showcase and the contact form.
//
// Architecture:
// - Server (axum): JSON endpoints for the site
// - Validation: email and form checks, shared by the server and the CLI
// - Store (SQLite): projects and contact messages
// - Notify: owner email via EmailJS, when configured
// - Contact: validate -> store -> notify for each submission

mod cli;
mod config;
mod contact;
mod notify;
mod projects;
mod server;
mod startup;
mod store;
mod validation;

use anyhow::{Context, Result};
use config::{Config, LogRotation, LoggingConfig};
use contact::ContactService;
use notify::EmailJsNotifier;
use server::AppState;
use std::sync::Arc;
use store::Store;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use validation::{DomainTables, Validator};

/// Directives used when RUST_LOG is unset
fn default_filter(level: &str) -> String {
    format!("folio={},axum=debug", level)
}

/// Initialize tracing: stdout plus an optional JSON file layer.
///
/// Precedence: RUST_LOG env var > config file > default "info".
/// The returned guard must live until exit so buffered file logs flush.
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&logging.level).into());

    if !logging.file_enabled {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
        return None;
    }

    if let Err(e) = std::fs::create_dir_all(&logging.file_dir) {
        eprintln!(
            "Warning: Could not create log directory {:?}: {}",
            logging.file_dir, e
        );
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
        return None;
    }

    let file_appender = match logging.file_rotation {
        LogRotation::Hourly => {
            tracing_appender::rolling::hourly(&logging.file_dir, &logging.file_prefix)
        }
        LogRotation::Daily => {
            tracing_appender::rolling::daily(&logging.file_dir, &logging.file_prefix)
        }
        LogRotation::Never => {
            tracing_appender::rolling::never(&logging.file_dir, &logging.file_prefix)
        }
    };

    // Writes happen on a background thread
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Subcommands run to completion and exit
    if cli::handle_cli() {
        return Ok(());
    }

    Config::ensure_config_exists();

    // A malformed config file is fatal
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let _file_guard = init_tracing(&config.logging);

    let tables = DomainTables::load(config.tables_path.as_deref())?;
    let validator = Arc::new(Validator::new(tables.clone()));

    let store = Arc::new(Store::open(&config.db_path)?);
    tracing::info!("Store opened at {}", config.db_path.display());

    let notifier = Arc::new(
        EmailJsNotifier::new(&config.email).context("Failed to create email client")?,
    );

    let contact = ContactService::new(validator, store.clone(), notifier);
    let state = AppState::new(contact, store, &config.owner_email);
    let app = server::build_router(state);

    startup::print_startup(&config, &tables);
    startup::log_startup(&config, &tables);

    // Oneshot: the server stops accepting once this fires
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let bind_addr = config.bind_addr;
    let mut server_handle =
        tokio::spawn(async move { server::start_server(bind_addr, app, shutdown_rx).await });

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
        }
        // Server exited on its own (e.g. bind failure)
        result = &mut server_handle => {
            return result?;
        }
    }

    tracing::info!("Shutting down...");
    let _ = shutdown_tx.send(());
    server_handle.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_names_only_linked_crates() {
        let filter = default_filter("debug");
        assert_eq!(filter, "folio=debug,axum=debug");
        assert!(EnvFilter::try_new(&filter).is_ok());
    }
}
