//! modern-app
//!
//! Order processing simulator used to exercise an observability stack:
//! every `/order` request produces a trace span, log lines carrying the
//! trace ids, and counter updates exported on `/metrics`.

pub mod api;
pub mod config;
pub mod counters;
pub mod error;
pub mod logging;
pub mod policy;
pub mod server;
pub mod summary;
pub mod telemetry;

pub use api::{create_router, AppState};
pub use config::{Config, LogFormat};
pub use counters::{AtomicCounters, CounterSnapshot, CounterStore};
pub use error::StartupError;
pub use policy::{DecisionPolicy, OrderDecision, OrderOutcome, RandomPolicy, SyntheticOrder};
pub use telemetry::Telemetry;
