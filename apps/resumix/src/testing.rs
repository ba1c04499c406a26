//! Test fixtures: an in-process mock of the resume-analysis backend.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::api_client::Redirect;
use crate::models::user::{Role, UserSummary};
use crate::routes::Route;

pub type Redirects = Arc<Mutex<Vec<Route>>>;

pub fn user_with_role(role: Role) -> UserSummary {
    UserSummary {
        id: 1,
        email: "a@x.com".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        role: Some(role),
        is_active: true,
        date_joined: None,
    }
}

/// A redirect capability that records every navigation.
pub fn recording_redirect() -> (Redirect, Redirects) {
    let seen: Redirects = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let redirect: Redirect = Arc::new(move |route: Route| sink.lock().unwrap().push(route));
    (redirect, seen)
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    access: String,
    refresh: String,
    user: UserSummary,
}

#[derive(Default)]
struct Inner {
    valid_tokens: HashSet<String>,
    admin_tokens: HashSet<String>,
    refresh_map: HashMap<String, String>,
    accounts: HashMap<String, Account>,
    status_overrides: HashMap<String, u16>,
    login_reply: Option<(u16, Value)>,
    requests: Vec<Recorded>,
    refresh_tokens_seen: Vec<String>,
    uploads: Vec<(String, usize)>,
    analyze_bodies: Vec<Value>,
}

/// Protected endpoints answer 401 unless the bearer token was registered with
/// `with_valid_token`. Refresh only succeeds for pairs registered with `with_refresh`,
/// and never marks the new token valid on its own.
#[derive(Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_valid_token(self, token: &str) -> Self {
        self.inner.lock().unwrap().valid_tokens.insert(token.into());
        self
    }

    pub fn with_admin_token(self, token: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.valid_tokens.insert(token.into());
            inner.admin_tokens.insert(token.into());
        }
        self
    }

    pub fn with_refresh(self, refresh: &str, access: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .refresh_map
            .insert(refresh.into(), access.into());
        self
    }

    pub fn with_account(self, email: &str, password: &str, access: &str, refresh: &str, role: Role) -> Self {
        let user = UserSummary {
            email: email.into(),
            ..user_with_role(role)
        };
        self.inner.lock().unwrap().accounts.insert(
            email.into(),
            Account {
                password: password.into(),
                access: access.into(),
                refresh: refresh.into(),
                user,
            },
        );
        self
    }

    /// Forces `path` to answer `status` for authorized callers.
    pub fn with_status(self, path: &str, status: u16) -> Self {
        self.inner
            .lock()
            .unwrap()
            .status_overrides
            .insert(path.into(), status);
        self
    }

    /// Answers every login with `status` and `body`. A 2xx body's `access` token becomes valid.
    pub fn with_login_reply(self, status: u16, body: Value) -> Self {
        self.inner.lock().unwrap().login_reply = Some((status, body));
        self
    }

    pub async fn spawn(&self) -> String {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn auth_headers(&self, path: &str) -> Vec<Option<String>> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .map(|r| r.authorization)
            .collect()
    }

    pub fn refresh_calls(&self) -> usize {
        self.inner.lock().unwrap().refresh_tokens_seen.len()
    }

    pub fn refresh_tokens_seen(&self) -> Vec<String> {
        self.inner.lock().unwrap().refresh_tokens_seen.clone()
    }

    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.inner.lock().unwrap().uploads.clone()
    }

    pub fn analyze_bodies(&self) -> Vec<Value> {
        self.inner.lock().unwrap().analyze_bodies.clone()
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/api/auth/login/", post(login))
            .route("/api/auth/register/", post(register))
            .route("/api/auth/refresh/", post(refresh))
            .route("/api/resume/upload/", post(upload))
            .route("/api/resume/analyze/", post(analyze))
            .route("/api/resume/history/", get(history))
            .route("/api/admin/users/", get(admin_users))
            .route("/api/admin/stats/", get(admin_stats))
            .with_state(self.clone())
    }

    fn record(&self, method: &str, path: &str, headers: &HeaderMap) -> Option<String> {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.inner.lock().unwrap().requests.push(Recorded {
            method: method.into(),
            path: path.into(),
            authorization: authorization.clone(),
        });
        authorization
    }

    /// Records the call, then checks the bearer token and any forced status.
    fn guard(&self, method: &str, path: &str, headers: &HeaderMap, admin: bool) -> Result<(), Response> {
        let authorization = self.record(method, path, headers);
        let inner = self.inner.lock().unwrap();
        let token = authorization
            .as_deref()
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|t| inner.valid_tokens.contains(*t));
        let Some(token) = token else {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Given token not valid for any token type"})),
            )
                .into_response());
        };
        if admin && !inner.admin_tokens.contains(token) {
            return Err((
                StatusCode::FORBIDDEN,
                Json(json!({"detail": "You do not have permission to perform this action."})),
            )
                .into_response());
        }
        if let Some(status) = inner.status_overrides.get(path) {
            let status = StatusCode::from_u16(*status).unwrap();
            return Err((status, Json(json!({"detail": "forced failure"}))).into_response());
        }
        Ok(())
    }
}

pub fn analysis_json() -> Value {
    json!({
        "id": 11,
        "resume": 42,
        "predicted_role": "Backend Engineer",
        "match_score": 78.4,
        "keyword_similarity": 65.0,
        "skill_match_score": 82.0,
        "experience_relevance": 70.5,
        "ats_compliance": 90.0,
        "skills_found": ["rust", "postgres"],
        "skills_missing": ["kubernetes"],
        "suggestions": "Quantify impact in recent roles.",
        "created_at": "2025-06-01T12:00:00Z"
    })
}

async fn login(State(mock): State<MockBackend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    mock.record("POST", "/api/auth/login/", &headers);
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let mut inner = mock.inner.lock().unwrap();
    if let Some((status, body)) = inner.login_reply.clone() {
        let status = StatusCode::from_u16(status).unwrap();
        if status.is_success() {
            if let Some(access) = body["access"].as_str() {
                inner.valid_tokens.insert(access.to_string());
            }
        }
        return (status, Json(body)).into_response();
    }
    match inner.accounts.get(email).cloned() {
        Some(account) if account.password == password => {
            inner.valid_tokens.insert(account.access.clone());
            if account.user.is_admin() {
                inner.admin_tokens.insert(account.access.clone());
            }
            Json(json!({
                "access": account.access,
                "refresh": account.refresh,
                "user": account.user,
            }))
            .into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Invalid credentials"})),
        )
            .into_response(),
    }
}

async fn register(State(mock): State<MockBackend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    mock.record("POST", "/api/auth/register/", &headers);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();
    let mut inner = mock.inner.lock().unwrap();
    if inner.accounts.contains_key(&email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"email": ["user with this email already exists."]})),
        )
            .into_response();
    }
    if password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"password": ["Ensure this field has at least 8 characters."]})),
        )
            .into_response();
    }
    let user = UserSummary {
        id: 2,
        email: email.clone(),
        first_name: body["first_name"].as_str().unwrap_or_default().into(),
        last_name: body["last_name"].as_str().unwrap_or_default().into(),
        role: Some(Role::User),
        is_active: true,
        date_joined: None,
    };
    inner.valid_tokens.insert("reg-access".into());
    (
        StatusCode::CREATED,
        Json(json!({"access": "reg-access", "refresh": "reg-refresh", "user": user})),
    )
        .into_response()
}

async fn refresh(State(mock): State<MockBackend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    mock.record("POST", "/api/auth/refresh/", &headers);
    let token = body["refresh"].as_str().unwrap_or_default().to_string();
    let mut inner = mock.inner.lock().unwrap();
    inner.refresh_tokens_seen.push(token.clone());
    match inner.refresh_map.get(&token) {
        Some(access) => Json(json!({"access": access})).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token is invalid or expired", "code": "token_not_valid"})),
        )
            .into_response(),
    }
}

async fn upload(State(mock): State<MockBackend>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    if let Err(denied) = mock.guard("POST", "/api/resume/upload/", &headers, false) {
        return denied;
    }
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or_default().to_string();
            let size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            mock.inner.lock().unwrap().uploads.push((name.clone(), size));
            return (
                StatusCode::CREATED,
                Json(json!({
                    "id": 42,
                    "file": format!("/media/resumes/{name}"),
                    "uploaded_at": "2025-06-01T11:59:00Z",
                    "message": "Resume uploaded and parsed successfully"
                })),
            )
                .into_response();
        }
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"file": ["No file was submitted."]})),
    )
        .into_response()
}

async fn analyze(State(mock): State<MockBackend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(denied) = mock.guard("POST", "/api/resume/analyze/", &headers, false) {
        return denied;
    }
    mock.inner.lock().unwrap().analyze_bodies.push(body.clone());
    if body["job_description"].as_str().unwrap_or_default().len() < 30 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"job_description": ["Ensure this field has at least 30 characters."]})),
        )
            .into_response();
    }
    Json(analysis_json()).into_response()
}

async fn history(State(mock): State<MockBackend>, headers: HeaderMap) -> Response {
    if let Err(denied) = mock.guard("GET", "/api/resume/history/", &headers, false) {
        return denied;
    }
    Json(json!([analysis_json()])).into_response()
}

async fn admin_users(State(mock): State<MockBackend>, headers: HeaderMap) -> Response {
    if let Err(denied) = mock.guard("GET", "/api/admin/users/", &headers, true) {
        return denied;
    }
    Json(json!([
        {"id": 1, "email": "admin@x.com", "first_name": "Root", "last_name": "",
         "role": "admin", "is_active": true, "date_joined": "2025-01-01T00:00:00Z"},
        {"id": 2, "email": "a@x.com", "first_name": "Ada", "last_name": "Lovelace",
         "role": "user", "is_active": false, "date_joined": "2025-02-01T00:00:00Z"}
    ]))
    .into_response()
}

async fn admin_stats(State(mock): State<MockBackend>, headers: HeaderMap) -> Response {
    if let Err(denied) = mock.guard("GET", "/api/admin/stats/", &headers, true) {
        return denied;
    }
    Json(json!({
        "total_users": 2,
        "total_resumes": 5,
        "total_analyses": 7,
        "average_match_score": 64.25
    }))
    .into_response()
}
