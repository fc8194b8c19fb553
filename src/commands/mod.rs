mod browse;
mod config_cmd;
mod info;
mod prefs;
mod product;
mod records;
mod status;

pub use browse::BrowseCommand;
pub use config_cmd::ConfigCommand;
pub use info::InfoCommand;
pub use prefs::PrefsCommand;
pub use product::ProductCommand;
pub use records::RecordsCommand;
pub use status::StatusCommand;

use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use miclo_core::{
    FilePreferenceStore, HttpRemote, PreferenceResolver, RecordItem, Session, SessionOptions,
};

use crate::config::Config;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Builds a session against the configured server and data directory.
fn open_session(config: &Config) -> Result<Session, CommandError> {
    let remote = HttpRemote::new(
        config.server_url.value.clone(),
        config.endpoints.clone(),
        Duration::from_secs(config.request_timeout_secs.value),
    )
    .map_err(|e| CommandError::ClientError(e.to_string()))?;

    let store = FilePreferenceStore::new(config.data_dir.value.clone());
    let options = SessionOptions {
        discard_superseded: config.discard_superseded.value,
    };

    Ok(Session::new(Arc::new(remote), Arc::new(store), options))
}

/// Preference resolver backed by the configured data directory.
fn open_preferences(config: &Config) -> PreferenceResolver {
    PreferenceResolver::new(Arc::new(FilePreferenceStore::new(
        config.data_dir.value.clone(),
    )))
}

fn runtime() -> Result<tokio::runtime::Runtime, CommandError> {
    tokio::runtime::Runtime::new().map_err(|e| CommandError::RuntimeError(e.to_string()))
}

/// Starts the session and waits until every start-of-process fetch has
/// settled, not just the first one.
async fn start_and_settle(session: &Session) {
    if let Some(handle) = session.start() {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Start task failed");
        }
    }

    let state = session.state();
    let mut products = state.products().clone();
    let mut comparisons = state.comparisons().clone();
    let mut favorites = state.favorites().clone();
    let mut info = state.info().clone();
    tokio::join!(
        products.wait_idle(),
        comparisons.wait_idle(),
        favorites.wait_idle(),
        info.wait_idle()
    );
}

fn print_items(items: &[RecordItem]) {
    if items.is_empty() {
        println!("  (none)");
        return;
    }

    for item in items {
        let product = &item.product;
        let marker = if item.favorite { "*" } else { " " };
        let category = product
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {:<24} {:<16} {:<10} ${:<8.0} {}",
            marker, product.name, product.brand_name, category, product.price, product.id
        );
    }
}

/// Errors from session-backed commands
#[derive(Debug)]
pub enum CommandError {
    RuntimeError(String),
    ClientError(String),
    NotFound(String),
    InvalidInput(String),
    SubmitFailed,
    Persistence(String),
    Json(serde_json::Error),
    Io(std::io::Error),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::RuntimeError(e) => write!(f, "Runtime error: {}", e),
            CommandError::ClientError(e) => write!(f, "Failed to create HTTP client: {}", e),
            CommandError::NotFound(id) => write!(f, "Product not found: {}", id),
            CommandError::InvalidInput(msg) => write!(f, "{}", msg),
            CommandError::SubmitFailed => {
                write!(f, "Submission failed. Check the logs and try again.")
            }
            CommandError::Persistence(e) => write!(f, "{}", e),
            CommandError::Json(e) => write!(f, "JSON error: {}", e),
            CommandError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Json(e) => Some(e),
            CommandError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(e: serde_json::Error) -> Self {
        CommandError::Json(e)
    }
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        CommandError::Io(e)
    }
}
