use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::api::{admin, auth, resume};
use crate::errors::ClientError;
use crate::render;
use crate::routes::{self, Decision, Route, LOGIN};
use crate::state::AppState;

/// Command-line client for the Resumix resume-analysis service.
#[derive(Parser)]
#[command(name = "resumix", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "RESUMIX_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and store the session.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, env = "RESUMIX_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Drop the stored session.
    Logout,
    /// Show the signed-in user and available views.
    Whoami,
    /// Check whether a view path would be shown or redirected.
    Open { path: String },
    /// Upload a resume and analyze it against a job description.
    Upload {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, conflicts_with = "job_description_file")]
        job_description: Option<String>,
        #[arg(long)]
        job_description_file: Option<PathBuf>,
    },
    /// List previous analyses.
    History,
    /// Show usage statistics and users (admins only).
    Admin,
}

pub async fn run(cli: Cli, state: &AppState) -> Result<()> {
    match cli.command {
        Commands::Login { email, password } => {
            let user = auth::login(&state.api, &email, &password)
                .await
                .map_err(|e| failure(state, &e, auth::login_failure_message(&e)))?;
            println!("Signed in as {}", render::user(&user));
        }
        Commands::Register {
            email,
            first_name,
            last_name,
            password,
        } => {
            let req = auth::RegisterRequest {
                email,
                first_name,
                last_name,
                password,
            };
            let user = auth::register(&state.api, &req)
                .await
                .map_err(|e| failure(state, &e, auth::register_failure_message(&e)))?;
            println!("Registered {}", render::user(&user));
        }
        Commands::Logout => {
            auth::logout(&state.session)?;
            println!("Signed out");
        }
        Commands::Whoami => {
            let session = state.session.snapshot();
            match &session.user {
                Some(user) if session.is_authenticated() => println!("{}", render::user(user)),
                _ if session.is_authenticated() => println!("Signed in"),
                _ => println!("Not signed in"),
            }
            println!("{}", render::nav(&routes::nav_links(&session)));
        }
        Commands::Open { path } => {
            let session = state.session.snapshot();
            match routes::authorize_path(&path, &session) {
                Decision::Allow => println!("{path}: allowed"),
                Decision::RedirectTo(target) => println!(
                    "{path}: redirect to {target} (lands on {})",
                    routes::resolve(&path, &session)
                ),
            }
        }
        Commands::Upload {
            file,
            job_description,
            job_description_file,
        } => {
            if !enter(state, Route::Upload) {
                return Ok(());
            }
            let job_description = match (job_description, job_description_file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => String::new(),
            };
            let resume_file = resume::ResumeFile::read(&file)
                .await
                .map_err(|e| failure(state, &e, resume::analyze_failure_message(&e)))?;
            let analysis =
                resume::upload_and_analyze(&state.api, Some(&resume_file), &job_description)
                    .await
                    .map_err(|e| failure(state, &e, resume::analyze_failure_message(&e)))?;
            print!("{}", render::analysis(&analysis));
        }
        Commands::History => {
            if !enter(state, Route::Dashboard) {
                return Ok(());
            }
            let items = resume::history(&state.api)
                .await
                .map_err(|e| failure(state, &e, resume::HISTORY_FAILED.to_string()))?;
            print!("{}", render::history(&items));
        }
        Commands::Admin => {
            if !enter(state, Route::Admin) {
                return Ok(());
            }
            let dashboard = admin::load_dashboard(&state.api)
                .await
                .map_err(|e| failure(state, &e, admin::LOAD_FAILED.to_string()))?;
            print!("{}", render::admin(&dashboard));
        }
    }
    Ok(())
}

/// Runs the route guard for a view. Prints the redirect and returns false when denied.
fn enter(state: &AppState, route: Route) -> bool {
    match routes::authorize(Some(route), &state.session.snapshot()) {
        Decision::Allow => true,
        Decision::RedirectTo(target) => {
            info!("{route} redirected to {target}");
            println!("Redirected to {target}");
            false
        }
    }
}

/// Turns a client error into the message the view shows.
/// A 401 that outlived the refresh leaves a dead session behind; it is dropped and the
/// user sent to login. A failed refresh already did both, so it finds no session here.
fn failure(state: &AppState, err: &ClientError, message: String) -> anyhow::Error {
    warn!(code = err.code(), "{err}");
    if err.ends_session() && state.session.is_authenticated() {
        if let Err(e) = auth::logout(&state.session) {
            warn!("Failed to clear expired session: {e}");
        }
        state.api.redirect(LOGIN);
    }
    anyhow::anyhow!(message)
}
