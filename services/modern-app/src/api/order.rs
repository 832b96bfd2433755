//! Simulated order processing

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, field, info, info_span, warn, Instrument, Span};

use super::AppState;
use crate::policy::{OrderOutcome, SyntheticOrder};
use crate::telemetry::trace_ids;

pub const CURRENCY: &str = "BRL";

/// Synthesize an order, wait out its simulated delay and answer with its outcome.
///
/// The `OrderProcessing` span covers the whole request and closes on every
/// exit path when the instrumented future completes. Processing runs on its
/// own task, so an order is still counted and logged when the client goes
/// away before the response is written.
pub async fn handle_order(State(state): State<AppState>) -> Response {
    let span = info_span!(
        "OrderProcessing",
        order.id = field::Empty,
        order.amount = field::Empty,
        order.currency = field::Empty,
        order.status = field::Empty
    );

    match tokio::spawn(process_order(state).instrument(span)).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Order processing task failed");
            plain_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

async fn process_order(state: AppState) -> Response {
    let decision = state.policy.decide();
    let order = decision.order;

    tokio::time::sleep(order.delay).await;

    let span = Span::current();
    span.record("order.status", decision.outcome.status());

    match decision.outcome {
        OrderOutcome::OutOfStock => {
            state.counters.record_out_of_stock();
            let (trace_id, span_id) = trace_ids(&span);
            warn!(
                order.id = order.id,
                trace_id = %trace_id,
                span_id = %span_id,
                service.name = %state.service_name,
                "Order {} failed: Out of stock",
                order.id
            );
            plain_error(StatusCode::CONFLICT, "Out of stock")
        }
        OrderOutcome::PaymentDeclined => {
            state.counters.record_payment_declined();
            let (trace_id, span_id) = trace_ids(&span);
            error!(
                order.id = order.id,
                trace_id = %trace_id,
                span_id = %span_id,
                service.name = %state.service_name,
                "Order {} failed: Payment declined",
                order.id
            );
            plain_error(StatusCode::PAYMENT_REQUIRED, "Payment declined")
        }
        OrderOutcome::Success => {
            state.counters.record_success(order.delay);
            span.record("order.id", order.id);
            span.record("order.amount", order.amount);
            span.record("order.currency", CURRENCY);

            let (trace_id, span_id) = trace_ids(&span);
            info!(
                order.id = order.id,
                order.amount = order.amount,
                trace_id = %trace_id,
                span_id = %span_id,
                service.name = %state.service_name,
                "Processed order {}: {} {}",
                order.id,
                order.amount,
                CURRENCY
            );
            (StatusCode::OK, success_body(&order)).into_response()
        }
    }
}

/// Body of a successful order response
pub fn success_body(order: &SyntheticOrder) -> String {
    format!("Order {} processed: {} {}\n", order.id, order.amount, CURRENCY)
}

/// Plain-text error body, newline terminated
fn plain_error(status: StatusCode, message: &str) -> Response {
    (status, format!("{message}\n")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::counters::{AtomicCounters, CounterStore};
    use crate::policy::FixedPolicy;

    fn state_with(outcome: OrderOutcome) -> (AppState, Arc<AtomicCounters>) {
        let counters = Arc::new(AtomicCounters::new());
        let order = SyntheticOrder {
            id: 4242,
            amount: 57,
            delay: Duration::from_millis(5),
        };
        let state = AppState::new(
            "modern-app",
            counters.clone(),
            Arc::new(FixedPolicy::new(order, outcome)),
        );
        (state, counters)
    }

    #[test]
    fn test_success_body() {
        let order = SyntheticOrder {
            id: 17,
            amount: 99,
            delay: Duration::ZERO,
        };
        assert_eq!(success_body(&order), "Order 17 processed: 99 BRL\n");
    }

    #[tokio::test]
    async fn test_success_updates_processed_and_time() {
        let (state, counters) = state_with(OrderOutcome::Success);

        let response = handle_order(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.orders_processed, 1);
        assert_eq!(snapshot.orders_failed, 0);
        assert_eq!(snapshot.total_processing_time(), Duration::from_millis(5));
    }

    #[tokio::test]
    async fn test_out_of_stock_is_409() {
        let (state, counters) = state_with(OrderOutcome::OutOfStock);

        let response = handle_order(State(state)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.orders_processed, 0);
        assert_eq!(snapshot.orders_failed, 1);
        assert_eq!(snapshot.out_of_stock_failures, 1);
        assert_eq!(snapshot.processing_time_nanos, 0);
    }

    #[tokio::test]
    async fn test_payment_declined_is_402() {
        let (state, counters) = state_with(OrderOutcome::PaymentDeclined);

        let response = handle_order(State(state)).await;
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.orders_failed, 1);
        assert_eq!(snapshot.payment_failures, 1);
        assert_eq!(snapshot.out_of_stock_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_completes_after_caller_gives_up() {
        let (state, counters) = state_with(OrderOutcome::Success);

        let abandoned = tokio::time::timeout(Duration::from_millis(1), handle_order(State(state)));
        assert!(abandoned.await.is_err());
        assert_eq!(counters.snapshot().orders_processed, 0);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(counters.snapshot().orders_processed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_simulated_delay() {
        let (state, _counters) = state_with(OrderOutcome::Success);
        let started = tokio::time::Instant::now();

        handle_order(State(state)).await;

        assert!(started.elapsed() >= Duration::from_millis(5));
    }
}
