//! Order Counters
//!
//! Process-wide tallies shared by the request handlers, the metrics endpoint
//! and the periodic summary logger. Handlers only see the [`CounterStore`]
//! trait, so tests can run against their own isolated store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Increment and read operations over the order counters.
///
/// Every counter is updated and read on its own; a snapshot taken while
/// failures are being recorded may observe `orders_failed` one step ahead of
/// the failure-specific counters.
pub trait CounterStore: Send + Sync {
    /// A successful order and the time spent processing it
    fn record_success(&self, processing_time: Duration);

    /// A failed order due to missing stock
    fn record_out_of_stock(&self);

    /// A failed order due to a declined payment
    fn record_payment_declined(&self);

    /// Independent read of every counter
    fn snapshot(&self) -> CounterSnapshot;
}

/// Point-in-time copy of the order counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub orders_processed: u64,
    pub orders_failed: u64,
    pub payment_failures: u64,
    pub out_of_stock_failures: u64,
    /// Cumulative processing time of successful orders, in nanoseconds
    pub processing_time_nanos: u64,
}

impl CounterSnapshot {
    /// Mean processing time of successful orders in nanoseconds, 0 without successes
    pub fn average_processing_time_nanos(&self) -> f64 {
        if self.orders_processed == 0 {
            return 0.0;
        }
        self.processing_time_nanos as f64 / self.orders_processed as f64
    }

    pub fn total_processing_time(&self) -> Duration {
        Duration::from_nanos(self.processing_time_nanos)
    }
}

/// Lock-free [`CounterStore`] backed by atomics
#[derive(Debug, Default)]
pub struct AtomicCounters {
    orders_processed: AtomicU64,
    orders_failed: AtomicU64,
    payment_failures: AtomicU64,
    out_of_stock_failures: AtomicU64,
    processing_time_nanos: AtomicU64,
}

impl AtomicCounters {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for AtomicCounters {
    fn record_success(&self, processing_time: Duration) {
        let nanos = u64::try_from(processing_time.as_nanos()).unwrap_or(u64::MAX);
        self.orders_processed.fetch_add(1, Ordering::Relaxed);
        self.processing_time_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    fn record_out_of_stock(&self) {
        self.orders_failed.fetch_add(1, Ordering::Relaxed);
        self.out_of_stock_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_payment_declined(&self) {
        self.orders_failed.fetch_add(1, Ordering::Relaxed);
        self.payment_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            orders_processed: self.orders_processed.load(Ordering::Relaxed),
            orders_failed: self.orders_failed.load(Ordering::Relaxed),
            payment_failures: self.payment_failures.load(Ordering::Relaxed),
            out_of_stock_failures: self.out_of_stock_failures.load(Ordering::Relaxed),
            processing_time_nanos: self.processing_time_nanos.load(Ordering::Relaxed),
        }
    }
}
