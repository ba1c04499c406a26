//! Plain-text views for command output.

use std::fmt::Write;

use crate::models::admin::AdminDashboard;
use crate::models::analysis::{join_skills, Analysis};
use crate::models::user::UserSummary;
use crate::routes::NavLink;

pub fn analysis(a: &Analysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Predicted Role: {}", a.predicted_role);
    let _ = writeln!(out, "Match Score: {}%", a.match_score);
    let _ = writeln!(out, "Skills Found: {}", join_skills(&a.skills_found));
    let _ = writeln!(out, "Missing Skills: {}", join_skills(&a.skills_missing));
    let _ = writeln!(out, "Suggestions: {}", a.suggestions);
    let _ = writeln!(out, "Score Breakdown:");
    for (metric, value) in a.breakdown() {
        let _ = writeln!(out, "  {:<10} {value:>6.1}", metric.label());
    }
    out
}

pub fn history(items: &[Analysis]) -> String {
    if items.is_empty() {
        return "No analysis history found.\n".to_string();
    }
    let mut out = String::new();
    for item in items {
        let _ = writeln!(out, "Predicted Role: {}", item.predicted_role);
        let _ = writeln!(out, "  Match: {}%", item.match_score);
        let _ = writeln!(out, "  Missing: {}", join_skills(&item.skills_missing));
        if let Some(created_at) = item.created_at {
            let _ = writeln!(out, "  {}", created_at.format("%Y-%m-%d %H:%M UTC"));
        }
    }
    out
}

pub fn admin(dashboard: &AdminDashboard) -> String {
    let stats = &dashboard.stats;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Users: {} | Resumes: {} | Analyses: {} | Avg Match: {}%",
        stats.total_users, stats.total_resumes, stats.total_analyses, stats.average_match_score
    );
    let _ = writeln!(out);
    if dashboard.users.is_empty() {
        let _ = writeln!(out, "No users found.");
        return out;
    }
    let _ = writeln!(out, "{:<30} {:<24} {:<6} Active", "Email", "Name", "Role");
    for user in &dashboard.users {
        let _ = writeln!(
            out,
            "{:<30} {:<24} {:<6} {}",
            user.email,
            user.full_name(),
            role_label(user),
            user.is_active
        );
    }
    out
}

pub fn user(user: &UserSummary) -> String {
    format!("{} <{}> ({})", user.full_name(), user.email, role_label(user))
}

fn role_label(user: &UserSummary) -> String {
    user.role.map_or_else(|| "-".to_string(), |r| r.to_string())
}

pub fn nav(links: &[NavLink]) -> String {
    links
        .iter()
        .map(NavLink::label)
        .collect::<Vec<_>>()
        .join(" | ")
}
