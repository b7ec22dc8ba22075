//! Local stand-in for the gtx translation endpoint

use std::collections::HashMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

#[derive(Clone)]
struct StubState {
    translations: Arc<HashMap<String, String>>,
    failures_left: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

/// Serves `/translate_a/single` on an ephemeral port
pub struct StubServer {
    pub url: String,
    state: StubState,
}

impl StubServer {
    /// Answer with `translations` (source text → translated text), after
    /// replying 500 to the first `failures` requests
    pub async fn start(translations: &[(&str, &str)], failures: usize) -> Self {
        let state = StubState {
            translations: Arc::new(
                translations
                    .iter()
                    .map(|(q, t)| (q.to_string(), t.to_string()))
                    .collect(),
            ),
            failures_left: Arc::new(AtomicUsize::new(failures)),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/translate_a/single", get(translate))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}/translate_a/single", addr),
            state,
        }
    }

    /// Query parameters of every request received, in arrival order
    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn translate(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.requests.lock().unwrap().push(params.clone());

    let failing = state
        .failures_left
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "stub failure").into_response();
    }

    let q = params.get("q").cloned().unwrap_or_default();
    let sl = params.get("sl").cloned().unwrap_or_default();
    match state.translations.get(&q) {
        Some(translated) => {
            // One segment per sentence, like the real endpoint
            let segments: Vec<serde_json::Value> = translated
                .split_inclusive(". ")
                .map(|segment| json!([segment, q, null, null, 10]))
                .collect();
            Json(json!([segments, null, sl])).into_response()
        }
        None => Json(json!([null, null, sl])).into_response(),
    }
}

/// A URL on a local port nothing is listening on
pub fn unreachable_url() -> String {
    let listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/translate_a/single", addr)
}
