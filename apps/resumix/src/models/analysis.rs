#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of `POST /api/resume/upload/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedResume {
    pub id: i64,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One analysis of a resume against a job description.
/// The analyze endpoint and the history listing share this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub resume: Option<i64>,
    #[serde(default)]
    pub predicted_role: String,
    pub match_score: f64,
    pub keyword_similarity: f64,
    pub skill_match_score: f64,
    pub experience_relevance: f64,
    pub ats_compliance: f64,
    #[serde(default)]
    pub skills_found: Vec<String>,
    #[serde(default)]
    pub skills_missing: Vec<String>,
    #[serde(default)]
    pub suggestions: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Keyword,
    Skill,
    Experience,
    Ats,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Keyword => "Keyword",
            Metric::Skill => "Skill",
            Metric::Experience => "Experience",
            Metric::Ats => "ATS",
        }
    }
}

impl Analysis {
    /// Per-metric scores on a 0–100 scale, in display order.
    pub fn breakdown(&self) -> [(Metric, f64); 4] {
        [
            (Metric::Keyword, self.keyword_similarity),
            (Metric::Skill, self.skill_match_score),
            (Metric::Experience, self.experience_relevance),
            (Metric::Ats, self.ats_compliance),
        ]
    }
}

/// Joins a skill list for display, `"None"` when empty.
pub fn join_skills(skills: &[String]) -> String {
    if skills.is_empty() {
        "None".to_string()
    } else {
        skills.join(", ")
    }
}
