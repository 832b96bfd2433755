//! Shared helpers for the HTTP tests

#![allow(dead_code)]

use axum::{body::Body, http::Request, response::Response, Router};
use http_body_util::BodyExt;
use modern_app::{
    create_router, AppState, AtomicCounters, DecisionPolicy, OrderDecision, OrderOutcome,
    SyntheticOrder,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub fn decision(id: u64, amount: u32, delay_ms: u64, outcome: OrderOutcome) -> OrderDecision {
    OrderDecision {
        order: SyntheticOrder {
            id,
            amount,
            delay: Duration::from_millis(delay_ms),
        },
        outcome,
    }
}

/// Router plus a handle on its counters
pub fn app_with(policy: impl DecisionPolicy + 'static) -> (Router, Arc<AtomicCounters>) {
    let counters = Arc::new(AtomicCounters::new());
    let state = AppState::new("modern-app-test", counters.clone(), Arc::new(policy));
    (create_router(state), counters)
}

pub async fn send(app: &Router, method: &str, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Value of a single series from a `/metrics` body
pub fn metric_value(text: &str, name: &str) -> f64 {
    text.lines()
        .find_map(|line| {
            let (series, value) = line.split_once(' ')?;
            (series == name).then(|| value.parse().ok()).flatten()
        })
        .unwrap_or_else(|| panic!("series {name} missing from:\n{text}"))
}
