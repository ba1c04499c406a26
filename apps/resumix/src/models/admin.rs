#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use crate::models::user::UserSummary;

/// Response of `GET /api/admin/stats/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_users: u64,
    pub total_resumes: u64,
    pub total_analyses: u64,
    pub average_match_score: f64,
}

/// Everything the admin view shows, loaded together.
#[derive(Debug, Clone)]
pub struct AdminDashboard {
    pub users: Vec<UserSummary>,
    pub stats: UsageStats,
}
