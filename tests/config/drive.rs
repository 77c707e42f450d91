use std::{
    collections::HashMap,
    io::Write,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Form, Json, Router,
};
use drive_csv_sync::{
    config::{DriveConfig, Scope},
    drive::Endpoints,
};
use serde_json::{json, Value};
use tempfile::NamedTempFile;

pub const ACCESS_TOKEN: &str = "fake-access-token";
const PRIVATE_KEY: &str = include_str!("../fixtures/private_key.pem");
const BOUNDARY: &str = "--drive-csv-sync";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub parents: Vec<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Token,
    List(HashMap<String, String>),
    Delete(String),
    Create,
    Update(String),
}

#[derive(Default, Clone)]
pub struct FakeOptions {
    /// Status and json body answered by the token endpoint instead of a token.
    pub token_error: Option<(u16, Value)>,
    pub deny_delete: bool,
    /// Ignore pageSize and answer every stored file.
    pub oversized_pages: bool,
    /// Lifetime of issued tokens in seconds, 3599 when unset.
    pub token_expires_in: Option<i64>,
}

#[derive(Default)]
struct FakeState {
    options: FakeOptions,
    files: Mutex<Vec<StoredFile>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeState {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// In process Drive v3 and OAuth2 token endpoint.
pub struct FakeDrive {
    state: Arc<FakeState>,
    base_url: String,
}

#[allow(dead_code)] //each integration test binary uses a subset
impl FakeDrive {
    pub async fn start() -> Self {
        Self::start_with(FakeOptions::default()).await
    }

    pub async fn start_with(options: FakeOptions) -> Self {
        let state = Arc::new(FakeState {
            options,
            ..Default::default()
        });
        let app = Router::new()
            .route("/token", post(token))
            .route("/drive/v3/files", get(list))
            .route("/drive/v3/files/:id", delete(remove))
            .route("/upload/drive/v3/files", post(create))
            .route("/upload/drive/v3/files/:id", axum::routing::patch(update))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        Self { state, base_url }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(
            &format!("{}/drive/v3", self.base_url),
            &format!("{}/upload/drive/v3", self.base_url),
        )
    }

    pub fn token_uri(&self) -> String {
        format!("{}/token", self.base_url)
    }

    pub fn credentials_file(&self) -> NamedTempFile {
        credentials_file(&self.token_uri())
    }

    /// Config pointing at this server, with its credential file kept alive by the caller.
    pub fn config(&self, folder_id: &str) -> (DriveConfig, NamedTempFile) {
        let file = self.credentials_file();
        let config = DriveConfig::new(file.path(), folder_id)
            .with_scopes(vec![Scope::Drive, Scope::DriveFile])
            .with_endpoints(self.endpoints());
        (config, file)
    }

    pub fn add_file(&self, name: &str, content: &str) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.state.files.lock().unwrap().push(StoredFile {
            id: id.to_owned(),
            name: name.to_owned(),
            mime_type: "text/csv".to_owned(),
            parents: vec!["folder".to_owned()],
            content: content.to_owned(),
        });
        id
    }

    pub fn files(&self) -> Vec<StoredFile> {
        self.state.files.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }
}

pub fn service_account_json(token_uri: &str) -> String {
    json!({
        "type": "service_account",
        "project_id": "project_id",
        "private_key_id": "private_key_id",
        "private_key": PRIVATE_KEY,
        "client_email": "robot@project_id.iam.gserviceaccount.com",
        "client_id": "client_id",
        "auth_uri": "https://accounts.google.com/o/oauth2/auth",
        "token_uri": token_uri,
        "auth_provider_x509_cert_url": "https://www.googleapis.com/oauth2/v1/certs",
        "client_x509_cert_url": "https://www.googleapis.com/robot/v1/metadata/x509/robot"
    })
    .to_string()
}

pub fn credentials_file(token_uri: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(service_account_json(token_uri).as_bytes())
        .unwrap();
    file
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .map(|h| h == format!("Bearer {}", ACCESS_TOKEN))
        .unwrap_or(false)
}

fn error(status: StatusCode, message: &str) -> Response {
    let body = json!({"error": {"code": status.as_u16(), "message": message}});
    (status, Json(body)).into_response()
}

fn file_json(f: &StoredFile) -> Value {
    json!({"kind": "drive#file", "id": f.id, "name": f.name, "mimeType": f.mime_type})
}

async fn token(
    State(state): State<Arc<FakeState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.record(Call::Token);
    if let Some((status, body)) = state.options.token_error.clone() {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, Json(body)).into_response();
    }
    let grant_type = form.get("grant_type").map(String::as_str);
    let assertion_parts = form.get("assertion").map(|a| a.split('.').count());
    if grant_type != Some("urn:ietf:params:oauth:grant-type:jwt-bearer") || assertion_parts != Some(3)
    {
        let body = json!({"error": "invalid_grant", "error_description": "bad assertion"});
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }
    let expires_in = state.options.token_expires_in.unwrap_or(3599);
    Json(json!({"access_token": ACCESS_TOKEN, "expires_in": expires_in, "token_type": "Bearer"}))
        .into_response()
}

async fn list(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record(Call::List(query.clone()));
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid Credentials");
    }
    let page_size = match state.options.oversized_pages {
        true => usize::MAX,
        false => query
            .get("pageSize")
            .and_then(|p| p.parse().ok())
            .unwrap_or(100),
    };
    let projected = query.get("fields").map(String::as_str) == Some("files(id, name)");
    let files = state
        .files
        .lock()
        .unwrap()
        .iter()
        .take(page_size)
        .map(|f| match projected {
            true => json!({"id": f.id, "name": f.name}),
            false => file_json(f),
        })
        .collect::<Vec<_>>();
    Json(json!({ "files": files })).into_response()
}

async fn remove(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    state.record(Call::Delete(id.to_owned()));
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid Credentials");
    }
    if state.options.deny_delete {
        return error(StatusCode::FORBIDDEN, "The user does not have sufficient permissions");
    }
    let mut files = state.files.lock().unwrap();
    match files.iter().position(|f| f.id == id) {
        Some(i) => {
            files.remove(i);
            StatusCode::NO_CONTENT.into_response()
        }
        None => error(StatusCode::NOT_FOUND, "File not found"),
    }
}

/// Splits a multipart/related body into its json metadata and media content.
fn parts(headers: &HeaderMap, body: &str) -> Option<(Value, String)> {
    let content_type = headers.get("content-type")?.to_str().ok()?;
    if content_type != "multipart/related; boundary=drive-csv-sync" {
        return None;
    }
    let mut sections = body.split(BOUNDARY).skip(1);
    let metadata = sections.next()?.split_once("\r\n\r\n")?.1.trim_end();
    let media = sections.next()?.split_once("\r\n\r\n")?.1;
    let media = media.strip_suffix("\r\n").unwrap_or(media);
    Some((serde_json::from_str(metadata).ok()?, media.to_owned()))
}

fn str_field(metadata: &Value, key: &str) -> Option<String> {
    metadata.get(key).and_then(|v| v.as_str()).map(str::to_owned)
}

async fn create(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    state.record(Call::Create);
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid Credentials");
    }
    if query.get("uploadType").map(String::as_str) != Some("multipart") {
        return error(StatusCode::BAD_REQUEST, "Invalid upload type");
    }
    let Some((metadata, content)) = parts(&headers, &body) else {
        return error(StatusCode::BAD_REQUEST, "Malformed multipart body");
    };
    let parents = metadata
        .get("parents")
        .and_then(|p| p.as_array())
        .map(|p| {
            p.iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    if parents.is_empty() {
        return error(StatusCode::BAD_REQUEST, "A parent folder is required");
    }
    let file = StoredFile {
        id: uuid::Uuid::new_v4().simple().to_string(),
        name: str_field(&metadata, "name").unwrap_or_else(|| "Untitled".to_owned()),
        mime_type: str_field(&metadata, "mimeType")
            .unwrap_or_else(|| "application/octet-stream".to_owned()),
        parents,
        content,
    };
    let response = file_json(&file);
    state.files.lock().unwrap().push(file);
    Json(response).into_response()
}

async fn update(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: String,
) -> Response {
    state.record(Call::Update(id.to_owned()));
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid Credentials");
    }
    let Some((metadata, content)) = parts(&headers, &body) else {
        return error(StatusCode::BAD_REQUEST, "Malformed multipart body");
    };
    if metadata.get("id").is_some() || metadata.get("parents").is_some() {
        return error(StatusCode::FORBIDDEN, "The resource body includes fields which are not directly writable.");
    }
    let mut files = state.files.lock().unwrap();
    match files.iter_mut().find(|f| f.id == id) {
        Some(f) => {
            if let Some(name) = str_field(&metadata, "name") {
                f.name = name;
            }
            if let Some(mime_type) = str_field(&metadata, "mimeType") {
                f.mime_type = mime_type;
            }
            f.content = content;
            Json(file_json(f)).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "File not found"),
    }
}
