mod api;
mod api_client;
mod cli;
mod config;
mod errors;
mod models;
mod render;
mod routes;
mod session;
mod state;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api_client::Redirect;
use crate::cli::Cli;
use crate::routes::Route;
use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let config = Config::from_env()?;

    // Logs go to stderr; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!(
        "Resumix client v{} against {} (session file {})",
        env!("CARGO_PKG_VERSION"),
        config.api_base_url,
        config.session_file.display()
    );

    let redirect: Redirect = Arc::new(|route: Route| {
        warn!("Session ended, redirecting to {route}");
        eprintln!("Your session has expired. Run `resumix login` to continue ({route}).");
    });

    let state = AppState::build(config, redirect)?;
    cli::run(args, &state).await
}
