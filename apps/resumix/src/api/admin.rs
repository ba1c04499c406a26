use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::admin::{AdminDashboard, UsageStats};
use crate::models::user::UserSummary;

pub const USERS_PATH: &str = "/api/admin/users/";
pub const STATS_PATH: &str = "/api/admin/stats/";

/// Shown for any admin load failure, whatever the cause.
pub const LOAD_FAILED: &str = "Unable to load admin data";

pub async fn users(api: &ApiClient) -> Result<Vec<UserSummary>, ClientError> {
    api.get_json(USERS_PATH).await
}

pub async fn stats(api: &ApiClient) -> Result<UsageStats, ClientError> {
    api.get_json(STATS_PATH).await
}

/// Fetches users and stats concurrently; either failing fails the whole load.
pub async fn load_dashboard(api: &ApiClient) -> Result<AdminDashboard, ClientError> {
    let (users, stats) = tokio::try_join!(users(api), stats(api))?;
    Ok(AdminDashboard { users, stats })
}
