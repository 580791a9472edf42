use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{AppendHeaders, IntoResponse},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

mod tls;

pub use tls::{serve_tls, TlsListener, CERT_NAMES};

/// What the server saw for a request to `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Counters shared by all handlers of one server instance.
#[derive(Debug, Default)]
pub struct ServerState {
    redirected_hits: AtomicUsize,
}

impl ServerState {
    pub fn redirected_hits(&self) -> usize {
        self.redirected_hits.load(Ordering::SeqCst)
    }
}

pub type Shared = Arc<ServerState>;

pub fn app() -> Router {
    router(Shared::default())
}

pub fn router(state: Shared) -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/redirect", get(redirect))
        .route("/redirected", get(redirected))
        .route("/delay/{ms}", get(delay))
        .route("/json", get(message))
        .route("/list", get(list))
        .route("/headers/multi", get(multi_header))
        .route("/cookies/set", get(set_cookie))
        .route("/cookies/echo", get(echo_cookie))
        .route("/status/{code}", get(status))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, Shared::default()).await
}

pub async fn serve(listener: TcpListener, state: Shared) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

async fn echo(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
    body: Bytes,
) -> Json<Echo> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        headers: flat,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn redirect() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "/redirected")])
}

async fn redirected(State(state): State<Shared>) -> Json<serde_json::Value> {
    state.redirected_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "redirected": true }))
}

async fn delay(Path(ms): Path<u64>) -> StatusCode {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    StatusCode::OK
}

async fn message() -> Json<serde_json::Value> {
    Json(json!({ "message": "ok" }))
}

async fn list() -> Json<Vec<u32>> {
    Json(vec![1, 2, 3])
}

async fn multi_header() -> impl IntoResponse {
    (
        AppendHeaders([("x-multi", "a"), ("x-multi", "b")]),
        "ok",
    )
}

async fn set_cookie() -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/cookies/echo"),
            (header::SET_COOKIE, "session=abc; Path=/"),
        ],
    )
}

async fn echo_cookie(headers: HeaderMap) -> Json<serde_json::Value> {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({ "cookie": cookie }))
}

async fn status(Path(code): Path<u16>) -> Result<StatusCode, StatusCode> {
    StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)
}
