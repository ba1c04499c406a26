use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::api_client::{ApiClient, PendingRequest};
use crate::errors::ClientError;
use crate::models::analysis::{Analysis, UploadedResume};

pub const UPLOAD_PATH: &str = "/api/resume/upload/";
pub const ANALYZE_PATH: &str = "/api/resume/analyze/";
pub const HISTORY_PATH: &str = "/api/resume/history/";

pub const ALLOWED_EXTENSIONS: [&str; 2] = ["pdf", "docx"];
pub const MAX_FILE_SIZE_MB: usize = 5;

pub const ANALYZE_FAILED: &str = "Failed to analyze resume";
pub const HISTORY_FAILED: &str = "Failed to load history";

/// A resume read into memory, ready to upload.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl ResumeFile {
    /// Reads `path`, rejecting anything but a PDF or DOCX within the size limit.
    pub async fn read(path: &Path) -> Result<Self, ClientError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::Input(format!("Not a file: {}", path.display())))?
            .to_string();
        check_extension(&file_name)?;

        let bytes = Bytes::from(tokio::fs::read(path).await?);
        check_size(bytes.len())?;

        Ok(Self { file_name, bytes })
    }
}

fn check_extension(file_name: &str) -> Result<(), ClientError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(ClientError::Input(
            "Only PDF and DOCX files are supported".into(),
        ))
    }
}

fn check_size(len: usize) -> Result<(), ClientError> {
    if len > MAX_FILE_SIZE_MB * 1024 * 1024 {
        return Err(ClientError::Input(format!(
            "File size must be <= {MAX_FILE_SIZE_MB}MB"
        )));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    resume_id: i64,
    job_description: &'a str,
}

pub async fn upload(api: &ApiClient, file: &ResumeFile) -> Result<UploadedResume, ClientError> {
    let request = PendingRequest::post_file(UPLOAD_PATH, "file", &file.file_name, file.bytes.clone());
    let uploaded: UploadedResume = api.dispatch(request).await?.json()?;
    info!(resume_id = uploaded.id, "Resume uploaded");
    Ok(uploaded)
}

pub async fn analyze(
    api: &ApiClient,
    resume_id: i64,
    job_description: &str,
) -> Result<Analysis, ClientError> {
    api.post_json(
        ANALYZE_PATH,
        &AnalyzeRequest {
            resume_id,
            job_description,
        },
    )
    .await
}

/// Uploads the resume, then analyzes it against the job description.
pub async fn upload_and_analyze(
    api: &ApiClient,
    file: Option<&ResumeFile>,
    job_description: &str,
) -> Result<Analysis, ClientError> {
    let file = match file {
        Some(f) if !job_description.trim().is_empty() => f,
        _ => {
            return Err(ClientError::Input(
                "Upload a file and provide a job description".into(),
            ))
        }
    };

    let uploaded = upload(api, file).await?;
    let analysis = analyze(api, uploaded.id, job_description).await?;
    info!(
        resume_id = uploaded.id,
        match_score = analysis.match_score,
        "Resume analyzed"
    );
    Ok(analysis)
}

pub async fn history(api: &ApiClient) -> Result<Vec<Analysis>, ClientError> {
    api.get_json(HISTORY_PATH).await
}

pub fn analyze_failure_message(err: &ClientError) -> String {
    err.body_or(ANALYZE_FAILED)
}
