#![allow(dead_code)]

use super::{a_record_json, a_record_reply};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// How the mock DoH endpoint answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DohMode {
    /// `application/dns-message` with an A record.
    Wire,
    /// `application/dns-json` with the equivalent A record.
    Json,
    /// Empty body with this status.
    Status(u16),
    /// Holds every request far longer than any client bound, then answers
    /// as `Wire`.
    Stall,
}

const STALL: Duration = Duration::from_secs(30);

/// What the last request looked like.
#[derive(Debug, Clone, Default)]
pub struct SeenRequest {
    pub method: String,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub params: HashMap<String, String>,
}

#[derive(Clone)]
struct DohState {
    mode: DohMode,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

/// Plain-HTTP stand-in for a DoH server on loopback.
pub struct MockDohServer {
    addr: SocketAddr,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDohServer {
    pub async fn start(mode: DohMode) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let seen = Arc::new(Mutex::new(Vec::new()));

        let state = DohState {
            mode,
            seen: seen.clone(),
        };

        let app = Router::new()
            .route("/dns-query", post(handle_post).get(handle_get))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Self {
            addr,
            seen,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}/dns-query", self.addr)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Drop for MockDohServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn record(state: &DohState, method: &str, headers: &HeaderMap, params: HashMap<String, String>) {
    state.seen.lock().unwrap().push(SeenRequest {
        method: method.to_string(),
        content_type: header_value(headers, header::CONTENT_TYPE),
        accept: header_value(headers, header::ACCEPT),
        params,
    });
}

async fn handle_post(State(state): State<DohState>, headers: HeaderMap, body: Bytes) -> Response {
    record(&state, "POST", &headers, HashMap::new());
    stall_if_asked(state.mode).await;
    answer(state.mode, &body, None)
}

async fn handle_get(
    State(state): State<DohState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    record(&state, "GET", &headers, params.clone());
    stall_if_asked(state.mode).await;

    if let Some(encoded) = params.get("dns") {
        return match URL_SAFE_NO_PAD.decode(encoded) {
            Ok(query) => answer(state.mode, &query, None),
            Err(_) => StatusCode::BAD_REQUEST.into_response(),
        };
    }

    match params.get("name") {
        Some(name) => answer(state.mode, &[], Some(name)),
        None => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn stall_if_asked(mode: DohMode) {
    if mode == DohMode::Stall {
        tokio::time::sleep(STALL).await;
    }
}

fn answer(mode: DohMode, query: &[u8], json_name: Option<&String>) -> Response {
    match mode {
        DohMode::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        DohMode::Wire | DohMode::Stall => (
            [(header::CONTENT_TYPE, "application/dns-message")],
            a_record_reply(query),
        )
            .into_response(),
        DohMode::Json => {
            let name = match json_name {
                Some(name) => name.clone(),
                None => hickory_proto::op::Message::from_vec(query)
                    .map(|m| m.queries()[0].name().to_utf8())
                    .unwrap_or_default(),
            };
            (
                [(header::CONTENT_TYPE, "application/dns-json")],
                a_record_json(&name),
            )
                .into_response()
        }
    }
}
