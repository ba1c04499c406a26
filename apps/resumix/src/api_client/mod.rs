/// API Client — the single point of entry for all backend calls.
///
/// Every request goes through `dispatch`, which attaches the bearer token and
/// recovers from an expired access token with at most one refresh-and-retry.
/// A failed refresh clears the session and redirects to login.
use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::errors::ClientError;
use crate::routes::{Route, LOGIN};
use crate::session::SessionStore;

pub mod request;

use request::Attempt;
pub use request::{ApiResponse, Body, PendingRequest};

pub const REFRESH_PATH: &str = "/api/auth/refresh/";

/// Navigation capability invoked when the session is torn down.
pub type Redirect = Arc<dyn Fn(Route) + Send + Sync>;

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
    redirect: Redirect,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Arc<SessionStore>,
        redirect: Redirect,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            redirect,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Returns `request` carrying the current access token, if there is one.
    pub fn attach_auth(&self, request: &PendingRequest) -> PendingRequest {
        match self.session.access_token() {
            Some(token) => request
                .clone()
                .with_header("Authorization", format!("Bearer {token}")),
            None => request.clone(),
        }
    }

    /// Sends `request`, refreshing the access token and resending once on a 401.
    pub async fn dispatch(&self, request: PendingRequest) -> Result<ApiResponse, ClientError> {
        let mut attempt = Attempt::first(request);

        loop {
            let response = self.send(&self.attach_auth(&attempt.request)).await?;

            if response.status != StatusCode::UNAUTHORIZED {
                return response.into_result();
            }

            if attempt.retried {
                warn!(
                    "{} {} still unauthorized after token refresh",
                    attempt.request.method, attempt.request.path
                );
                return response.into_result();
            }

            if self.session.refresh_token().is_none() {
                debug!(
                    "{} {} unauthorized and no refresh token stored",
                    attempt.request.method, attempt.request.path
                );
                return response.into_result();
            }

            match self.refresh().await {
                Ok(access) => {
                    // A concurrent failed refresh may have cleared the session meanwhile
                    if !self.session.set_access_token(&access)? {
                        return response.into_result();
                    }
                    attempt = attempt.into_retry();
                }
                Err(e) => {
                    self.force_logout();
                    return Err(e);
                }
            }
        }
    }

    /// Exchanges the stored refresh token for a new access token.
    /// Sent without an Authorization header.
    pub async fn refresh(&self) -> Result<String, ClientError> {
        let refresh = self
            .session
            .refresh_token()
            .ok_or_else(|| ClientError::RefreshFailed("no refresh token stored".into()))?;

        let response = self
            .client
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh: &refresh })
            .send()
            .await
            .map_err(|e| ClientError::RefreshFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Token refresh rejected with {status}: {body}");
            return Err(ClientError::RefreshFailed(format!("status {}", status.as_u16())));
        }

        let parsed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ClientError::RefreshFailed(e.to_string()))?;

        info!("Access token refreshed");
        Ok(parsed.access)
    }

    /// Invokes the navigation capability the client was built with.
    pub fn redirect(&self, route: Route) {
        (self.redirect)(route);
    }

    fn force_logout(&self) {
        if let Err(e) = self.session.clear_session() {
            error!("Failed to clear session after refresh failure: {e}");
        }
        self.redirect(LOGIN);
    }

    async fn send(&self, request: &PendingRequest) -> Result<ApiResponse, ClientError> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path));

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::File {
                field,
                file_name,
                bytes,
            } => builder.multipart(
                Form::new().part(
                    field.clone(),
                    Part::bytes(bytes.to_vec()).file_name(file_name.clone()),
                ),
            ),
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!("{} {} -> {}", request.method, request.path, status);
        Ok(ApiResponse { status, body })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.dispatch(PendingRequest::get(path)).await?.json()
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.dispatch(PendingRequest::post_json(path, body)?)
            .await?
            .json()
    }
}
