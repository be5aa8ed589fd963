//! In-process stand-in for the Canvas endpoints used by a run.

use crate::model::{CanvasConfig, Secret};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const SCOPED_TOKEN: &str = "scoped-token";
pub const LAUNCH_URL: &str = "https://rollcall.example/launch?session=one-time";

#[derive(Clone)]
pub struct FakeCanvas {
    state: Arc<Mutex<FakeState>>,
}

pub struct FakeState {
    pub create_reply: (u16, Value),
    pub delete_status: u16,
    pub launch_reply: (u16, Value),
    /// (user id, authorization header, request body)
    pub created: Vec<(String, String, Value)>,
    /// (user id, token id)
    pub deleted: Vec<(String, String)>,
    /// (account id, authorization header, `url` query parameter)
    pub launches: Vec<(String, String, String)>,
}

impl Default for FakeCanvas {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                create_reply: (200, json!({"id": 7001, "visible_token": SCOPED_TOKEN})),
                delete_status: 200,
                launch_reply: (200, json!({"id": 12, "name": "Roll Call", "url": LAUNCH_URL})),
                created: Vec::new(),
                deleted: Vec::new(),
                launches: Vec::new(),
            })),
        }
    }
}

impl FakeCanvas {
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn respond_to_create(&self, status: u16, body: Value) {
        self.state().create_reply = (status, body);
    }

    pub fn respond_to_delete(&self, status: u16) {
        self.state().delete_status = status;
    }

    pub fn respond_to_launch(&self, status: u16, body: Value) {
        self.state().launch_reply = (status, body);
    }
}

fn authorization(headers: &HeaderMap) -> String {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn reply((status, body): (u16, Value)) -> (StatusCode, Json<Value>) {
    (StatusCode::from_u16(status).unwrap(), Json(body))
}

async fn create_token(
    State(fake): State<FakeCanvas>,
    Path(user): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = fake.state();
    state.created.push((user, authorization(&headers), body));
    reply(state.create_reply.clone())
}

async fn delete_token(
    State(fake): State<FakeCanvas>,
    Path((user, id)): Path<(String, String)>,
) -> StatusCode {
    let mut state = fake.state();
    state.deleted.push((user, id));
    StatusCode::from_u16(state.delete_status).unwrap()
}

async fn sessionless_launch(
    State(fake): State<FakeCanvas>,
    Path(account): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let mut state = fake.state();
    let url = query.get("url").cloned().unwrap_or_default();
    state.launches.push((account, authorization(&headers), url));
    reply(state.launch_reply.clone())
}

/// Serve `fake` on an ephemeral port and return a config pointing at it.
pub async fn spawn(fake: FakeCanvas) -> CanvasConfig {
    let app = Router::new()
        .route("/api/v1/users/{user}/tokens", post(create_token))
        .route("/api/v1/users/{user}/tokens/{id}", delete(delete_token))
        .route(
            "/api/v1/accounts/{account}/external_tools/sessionless_launch",
            get(sessionless_launch),
        )
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    CanvasConfig {
        base_url: format!("http://{addr}/api/v1"),
        admin_token: Secret::new(ADMIN_TOKEN),
        user_id: "42".into(),
        account_id: "1".into(),
        tool_url: "https://rollcall.instructure.com/launch".into(),
        request_timeout: Duration::from_secs(5),
        user_agent: "rollcall-report-test".into(),
    }
}
