use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api_client::{ApiClient, Redirect};
use crate::config::Config;
use crate::session::{FileStore, SessionStore};

/// Shared client state handed to every command.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
}

impl AppState {
    /// Opens the on-disk session and builds the API client around it.
    pub fn build(config: Config, redirect: Redirect) -> Result<Self> {
        let store = FileStore::open(&config.session_file).with_context(|| {
            format!(
                "Failed to open session file {}",
                config.session_file.display()
            )
        })?;
        let session = Arc::new(SessionStore::new(store));
        let api = ApiClient::new(
            config.api_base_url.clone(),
            config.timeout,
            session.clone(),
            redirect,
        )
        .context("Failed to build HTTP client")?;

        Ok(Self {
            config,
            session,
            api,
        })
    }
}
