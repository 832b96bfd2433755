//! Prometheus text exposition of the order counters

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use std::fmt::Write;

use super::AppState;
use crate::counters::CounterSnapshot;

pub async fn handle_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = render_metrics(&state.counters.snapshot());
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], body)
}

/// Render the five order series, each preceded by its HELP and TYPE lines.
///
/// The average processing time is expressed in nanoseconds.
pub fn render_metrics(snapshot: &CounterSnapshot) -> String {
    let mut out = String::with_capacity(1024);

    let series: [(&str, &str, &str, String); 5] = [
        (
            "orders_processed_total",
            "Total number of orders processed",
            "counter",
            snapshot.orders_processed.to_string(),
        ),
        (
            "orders_failed_total",
            "Total number of failed orders",
            "counter",
            snapshot.orders_failed.to_string(),
        ),
        (
            "orders_payment_failures_total",
            "Total number of payment failures",
            "counter",
            snapshot.payment_failures.to_string(),
        ),
        (
            "orders_out_of_stock_failures_total",
            "Total number of out-of-stock failures",
            "counter",
            snapshot.out_of_stock_failures.to_string(),
        ),
        (
            "orders_avg_processing_time",
            "Average processing time for orders",
            "gauge",
            format!("{:.2}", snapshot.average_processing_time_nanos()),
        ),
    ];

    for (i, (name, help, kind, value)) in series.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        // Writing into a String cannot fail
        let _ = writeln!(out, "# HELP {name} {help}");
        let _ = writeln!(out, "# TYPE {name} {kind}");
        let _ = writeln!(out, "{name} {value}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_traffic() {
        let text = render_metrics(&CounterSnapshot::default());

        assert!(text.contains("\norders_processed_total 0\n"));
        assert!(text.contains("\norders_failed_total 0\n"));
        assert!(text.contains("\norders_payment_failures_total 0\n"));
        assert!(text.contains("\norders_out_of_stock_failures_total 0\n"));
        assert!(text.ends_with("\norders_avg_processing_time 0.00\n"));
    }

    #[test]
    fn test_exact_layout() {
        let snapshot = CounterSnapshot {
            orders_processed: 3,
            orders_failed: 2,
            payment_failures: 1,
            out_of_stock_failures: 1,
            processing_time_nanos: 1_000_000_000,
        };

        let expected = "\
# HELP orders_processed_total Total number of orders processed
# TYPE orders_processed_total counter
orders_processed_total 3

# HELP orders_failed_total Total number of failed orders
# TYPE orders_failed_total counter
orders_failed_total 2

# HELP orders_payment_failures_total Total number of payment failures
# TYPE orders_payment_failures_total counter
orders_payment_failures_total 1

# HELP orders_out_of_stock_failures_total Total number of out-of-stock failures
# TYPE orders_out_of_stock_failures_total counter
orders_out_of_stock_failures_total 1

# HELP orders_avg_processing_time Average processing time for orders
# TYPE orders_avg_processing_time gauge
orders_avg_processing_time 333333333.33
";

        assert_eq!(render_metrics(&snapshot), expected);
    }

    #[test]
    fn test_every_sample_has_help_and_type() {
        let text = render_metrics(&CounterSnapshot::default());
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();

        assert_eq!(lines.len(), 15);
        for chunk in lines.chunks(3) {
            let name = chunk[2].split_whitespace().next().unwrap();
            assert_eq!(chunk[0].split_whitespace().nth(2), Some(name));
            assert_eq!(chunk[1].split_whitespace().nth(2), Some(name));
            assert!(chunk[1].ends_with("counter") || chunk[1].ends_with("gauge"));
            assert!(chunk[2].split_whitespace().nth(1).unwrap().parse::<f64>().is_ok());
        }
    }
}
