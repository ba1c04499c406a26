use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::user::UserSummary;
use crate::session::SessionStore;

pub const LOGIN_PATH: &str = "/api/auth/login/";
pub const REGISTER_PATH: &str = "/api/auth/register/";

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Token pair plus user, returned by both login and registration.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserSummary,
}

/// Logs in and stores the resulting session.
pub async fn login(api: &ApiClient, email: &str, password: &str) -> Result<UserSummary, ClientError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ClientError::Input("Email and password are required".into()));
    }

    let auth: AuthResponse = api
        .post_json(LOGIN_PATH, &LoginRequest { email, password })
        .await?;
    api.session()
        .set_session(&auth.access, &auth.refresh, &auth.user)?;

    info!(user_id = auth.user.id, "Logged in");
    Ok(auth.user)
}

/// Registers a new account and stores the resulting session.
pub async fn register(api: &ApiClient, req: &RegisterRequest) -> Result<UserSummary, ClientError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ClientError::Input("Email and password are required".into()));
    }

    let auth: AuthResponse = api.post_json(REGISTER_PATH, req).await?;
    api.session()
        .set_session(&auth.access, &auth.refresh, &auth.user)?;

    info!(user_id = auth.user.id, "Registered");
    Ok(auth.user)
}

/// Explicit logout: no backend call, just drops the stored session.
pub fn logout(session: &SessionStore) -> Result<(), ClientError> {
    session.clear_session()
}

pub fn login_failure_message(err: &ClientError) -> String {
    err.detail_or("Login failed")
}

pub fn register_failure_message(err: &ClientError) -> String {
    err.body_or("Registration failed")
}
