//! Test harness: an in-process stand-in for the backend API and a site
//! router wired to it.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use sikati::client::ApiClient;
use sikati::config::Config;
use sikati::models::{Role, User};
use sikati::session::MemoryStorage;
use sikati::AppState;

pub const ADMIN_EMAIL: &str = "admin@sikati.test";
pub const STAFF_EMAIL: &str = "staff@sikati.test";
pub const PASSWORD: &str = "secret123";
pub const ADMIN_TOKEN: &str = "admin-token";

/// Records keyed by collection (`quotes`, `emergency`) then id.
#[derive(Default)]
pub struct Backend {
    records: DashMap<String, Mutex<BTreeMap<String, Value>>>,
    calls: DashMap<String, usize>,
    delay: Mutex<Option<Duration>>,
    next_id: AtomicUsize,
}

impl Backend {
    /// Number of requests seen for e.g. `"GET emergency"` or `"DELETE quotes/q123"`.
    pub fn calls(&self, route: &str) -> usize {
        self.calls.get(route).map(|c| *c).unwrap_or(0)
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn seed(&self, collection: &str, id: &str, mut record: Value) {
        record["id"] = json!(id);
        record["createdAt"] = json!("2025-05-01T10:00:00Z");
        self.records
            .entry(collection.to_string())
            .or_default()
            .lock()
            .insert(id.to_string(), record);
    }

    pub fn record(&self, collection: &str, id: &str) -> Option<Value> {
        self.records
            .get(collection)
            .and_then(|c| c.lock().get(id).cloned())
    }

    pub fn count(&self, collection: &str) -> usize {
        self.records.get(collection).map(|c| c.lock().len()).unwrap_or(0)
    }

    fn hit(&self, route: String) {
        *self.calls.entry(route).or_insert(0) += 1;
    }

    async fn pause(&self) {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", ADMIN_TOKEN))
        .unwrap_or(false)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn login(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.hit("POST login".to_string());
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let role = match (email, password) {
        (ADMIN_EMAIL, PASSWORD) => "admin",
        (STAFF_EMAIL, PASSWORD) => "staff",
        _ => return error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    };
    let token = if role == "admin" { ADMIN_TOKEN } else { "staff-token" };
    Json(json!({
        "data": {
            "user": { "_id": "u1", "email": email, "name": "Test User", "role": role },
            "token": token,
        }
    }))
    .into_response()
}

async fn list(
    State(backend): State<Arc<Backend>>,
    Path(collection): Path<String>,
    headers: HeaderMap,
) -> Response {
    backend.hit(format!("GET {}", collection));
    backend.pause().await;
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let items: Vec<Value> = backend
        .records
        .get(&collection)
        .map(|c| c.lock().values().cloned().collect())
        .unwrap_or_default();
    Json(json!({ "data": items })).into_response()
}

async fn create(
    State(backend): State<Arc<Backend>>,
    Path(collection): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    backend.hit(format!("POST {}", collection));
    let n = backend.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let id = format!("{}-{}", collection, n);
    body["_id"] = json!(id);
    body["createdAt"] = json!(chrono::Utc::now().to_rfc3339());
    backend
        .records
        .entry(collection)
        .or_default()
        .lock()
        .insert(id, body.clone());
    (StatusCode::CREATED, Json(json!({ "data": body }))).into_response()
}

async fn read(
    State(backend): State<Arc<Backend>>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    backend.hit(format!("GET {}/{}", collection, id));
    backend.pause().await;
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    match backend.record(&collection, &id) {
        Some(record) => Json(json!({ "data": record })).into_response(),
        None => error(StatusCode::NOT_FOUND, "Not found"),
    }
}

async fn update(
    State(backend): State<Arc<Backend>>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.hit(format!("PUT {}/{}", collection, id));
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let Some(mut record) = backend.record(&collection, &id) else {
        return error(StatusCode::NOT_FOUND, "Not found");
    };
    if let (Some(target), Some(changes)) = (record.as_object_mut(), body.as_object()) {
        for (k, v) in changes {
            target.insert(k.clone(), v.clone());
        }
    }
    if let Some(c) = backend.records.get(&collection) {
        c.lock().insert(id, record.clone());
    }
    Json(json!({ "data": record })).into_response()
}

async fn remove(
    State(backend): State<Arc<Backend>>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    backend.hit(format!("DELETE {}/{}", collection, id));
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let removed = backend
        .records
        .get(&collection)
        .and_then(|c| c.lock().remove(&id));
    match removed {
        Some(_) => Json(json!({ "message": "Deleted" })).into_response(),
        None => error(StatusCode::NOT_FOUND, "Not found"),
    }
}

/// Start the fake backend on an ephemeral port; returns it with its base URL.
pub async fn spawn_backend() -> (Arc<Backend>, String) {
    let backend = Arc::new(Backend::default());
    let app = Router::new()
        .route("/api", get(|| async { "ok" }))
        .route("/api/", get(|| async { "ok" }))
        .route("/api/auth/login", post(login))
        .route("/api/contact/:collection", get(list).post(create))
        .route(
            "/api/contact/:collection/:id",
            get(read).put(update).delete(remove),
        )
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (backend, format!("http://{}/api", addr))
}

pub struct Site {
    pub state: Arc<AppState>,
    pub app: Router,
    pub backend: Arc<Backend>,
    _data: tempfile::TempDir,
}

pub async fn site() -> Site {
    let (backend, url) = spawn_backend().await;
    let data = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.api.base_url = url;
    config.server.data_dir = data.path().to_path_buf();
    let api = ApiClient::new(&config.api).unwrap();
    let state = Arc::new(AppState::new(config, api, Arc::new(MemoryStorage::new())));
    let app = sikati::api::create_router(state.clone());
    Site {
        state,
        app,
        backend,
        _data: data,
    }
}

impl Site {
    /// Cookie header for a logged-in browser session with the given role.
    pub fn session_cookie(&self, role: Role) -> String {
        let sid = format!("sid-{}", role.as_str());
        let token = if role.is_admin() { ADMIN_TOKEN } else { "staff-token" };
        let user = User {
            id: "u1".to_string(),
            email: ADMIN_EMAIL.to_string(),
            name: Some("Test Admin".to_string()),
            role,
        };
        self.state
            .session(&sid)
            .login(user, token.to_string())
            .unwrap();
        format!("{}={}", self.state.config.session.cookie_name, sid)
    }

    pub fn admin_cookie(&self) -> String {
        self.session_cookie(Role::Admin)
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form_body(fields))).unwrap())
            .await
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode(value: &str) -> String {
    let mut out = String::new();
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

pub fn quote_json() -> Value {
    json!({
        "contactName": "Sam Ortiz",
        "companyName": "City of Austin",
        "email": "sam@austin.gov",
        "phone": "555-0101",
        "eventType": "government",
        "startDate": "2025-06-01",
        "duration": "2-3days",
        "staffNeeded": 12,
        "location": "Convention Center",
        "services": ["Event Staff", "Security Personnel", "Technical Support"],
        "budgetRange": "10k-25k",
    })
}

pub fn emergency_json() -> Value {
    json!({
        "name": "Dana Reyes",
        "phone": "555-0199",
        "email": "dana@venue.com",
        "company": "Riverside Arena",
        "urgency": "immediate",
        "staffNeeded": 5,
        "location": "Gate 4",
        "startDateTime": "2025-03-01T08:00",
        "workType": "security",
        "emergencyDescription": "Guards called in sick",
        "contact": "call",
    })
}

pub const QUOTE_FORM: &[(&str, &str)] = &[
    ("contactName", "Sam Ortiz"),
    ("companyName", "City of Austin"),
    ("email", "sam@austin.gov"),
    ("phone", "555-0101"),
    ("eventType", "government"),
    ("startDate", "2025-06-01"),
    ("duration", "2-3days"),
    ("staffNeeded", "12"),
    ("location", "Convention Center"),
    ("services", "Event Staff"),
    ("services", "Security Personnel"),
    ("budgetRange", "10k-25k"),
];

pub const EMERGENCY_FORM: &[(&str, &str)] = &[
    ("name", "Dana Reyes"),
    ("phone", "555-0199"),
    ("email", "dana@venue.com"),
    ("company", "Riverside Arena"),
    ("urgency", "immediate"),
    ("staffNeeded", "5"),
    ("location", "Gate 4"),
    ("startDateTime", "2025-03-01T08:00"),
    ("workType", "security"),
    ("emergencyDescription", "Guards called in sick"),
    ("contact", "call"),
];
