//! HTTP surface
//!
//! - `GET|POST /order`: simulate processing one order
//! - `GET /metrics`: Prometheus text exposition of the order counters
//! - `GET /`: service info
//! - `GET /health`: liveness

pub mod metrics;
pub mod order;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::counters::CounterStore;
use crate::policy::DecisionPolicy;

/// Shared handler state; every field is cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub service_name: Arc<str>,
    pub counters: Arc<dyn CounterStore>,
    pub policy: Arc<dyn DecisionPolicy>,
}

impl AppState {
    pub fn new(
        service_name: impl Into<Arc<str>>,
        counters: Arc<dyn CounterStore>,
        policy: Arc<dyn DecisionPolicy>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            counters,
            policy,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/order", get(order::handle_order).post(order::handle_order))
        .route("/metrics", get(metrics::handle_metrics))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct ServiceInfo {
    message: String,
    endpoints: [&'static str; 4],
}

async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: format!("{} is running", state.service_name),
        endpoints: ["/order", "/metrics", "/health", "/"],
    })
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": &*state.service_name,
        "version": env!("CARGO_PKG_VERSION")
    }))
}
