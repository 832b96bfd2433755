//! Order Decision Policies
//!
//! A [`DecisionPolicy`] produces the synthetic order for a request together
//! with its simulated processing delay and business outcome. Production uses
//! [`RandomPolicy`]; tests plug in [`FixedPolicy`] or [`SequencePolicy`] to get
//! deterministic outcomes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

/// Exclusive upper bound for synthetic order ids
pub const MAX_ORDER_ID: u64 = 1_000_000;
/// Inclusive amount range in BRL
pub const MIN_AMOUNT: u32 = 1;
pub const MAX_AMOUNT: u32 = 100;
/// Exclusive upper bound of the simulated delay, in milliseconds
pub const MAX_DELAY_MS: u64 = 1_000;

/// Fake order synthesized for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticOrder {
    pub id: u64,
    /// Amount in BRL
    pub amount: u32,
    /// Simulated processing time
    pub delay: Duration,
}

/// Business classification of a processed order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderOutcome {
    Success,
    OutOfStock,
    PaymentDeclined,
}

impl OrderOutcome {
    /// Value of the `order.status` span attribute
    pub fn status(&self) -> &'static str {
        match self {
            OrderOutcome::Success => "success",
            OrderOutcome::OutOfStock => "out_of_stock",
            OrderOutcome::PaymentDeclined => "payment_failed",
        }
    }
}

impl fmt::Display for OrderOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status())
    }
}

/// Order plus the outcome the handler must apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderDecision {
    pub order: SyntheticOrder,
    pub outcome: OrderOutcome,
}

/// Source of order decisions for the order handler
pub trait DecisionPolicy: Send + Sync {
    fn decide(&self) -> OrderDecision;
}

/// Uniformly random orders with independently drawn failure classes.
///
/// The out-of-stock draw happens first; the payment draw only applies to
/// orders that passed it, so the overall failure rate is
/// `1 - (1 - out_of_stock_rate) * (1 - payment_decline_rate)`.
pub struct RandomPolicy {
    rng: Mutex<StdRng>,
    out_of_stock_rate: f64,
    payment_decline_rate: f64,
}

impl RandomPolicy {
    /// Policy seeded once from OS entropy
    pub fn from_entropy(out_of_stock_rate: f64, payment_decline_rate: f64) -> Self {
        Self::with_rng(StdRng::from_entropy(), out_of_stock_rate, payment_decline_rate)
    }

    /// Reproducible policy for a fixed seed
    pub fn seeded(seed: u64, out_of_stock_rate: f64, payment_decline_rate: f64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), out_of_stock_rate, payment_decline_rate)
    }

    fn with_rng(rng: StdRng, out_of_stock_rate: f64, payment_decline_rate: f64) -> Self {
        Self {
            rng: Mutex::new(rng),
            out_of_stock_rate: out_of_stock_rate.clamp(0.0, 1.0),
            payment_decline_rate: payment_decline_rate.clamp(0.0, 1.0),
        }
    }
}

impl DecisionPolicy for RandomPolicy {
    fn decide(&self) -> OrderDecision {
        // A panicked holder cannot leave the rng in an invalid state
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let order = SyntheticOrder {
            id: rng.gen_range(0..MAX_ORDER_ID),
            amount: rng.gen_range(MIN_AMOUNT..=MAX_AMOUNT),
            delay: Duration::from_millis(rng.gen_range(0..MAX_DELAY_MS)),
        };

        let outcome = if rng.gen::<f64>() < self.out_of_stock_rate {
            OrderOutcome::OutOfStock
        } else if rng.gen::<f64>() < self.payment_decline_rate {
            OrderOutcome::PaymentDeclined
        } else {
            OrderOutcome::Success
        };

        OrderDecision { order, outcome }
    }
}

/// Always returns the same decision
#[derive(Debug, Clone, Copy)]
pub struct FixedPolicy(pub OrderDecision);

impl FixedPolicy {
    pub fn new(order: SyntheticOrder, outcome: OrderOutcome) -> Self {
        Self(OrderDecision { order, outcome })
    }
}

impl DecisionPolicy for FixedPolicy {
    fn decide(&self) -> OrderDecision {
        self.0
    }
}

/// Replays a scripted list of decisions, repeating the last one once exhausted
pub struct SequencePolicy {
    remaining: Mutex<VecDeque<OrderDecision>>,
    last: OrderDecision,
}

impl SequencePolicy {
    /// Returns `None` for an empty script
    pub fn new(decisions: impl IntoIterator<Item = OrderDecision>) -> Option<Self> {
        let remaining: VecDeque<_> = decisions.into_iter().collect();
        let last = *remaining.back()?;
        Some(Self {
            remaining: Mutex::new(remaining),
            last,
        })
    }
}

impl DecisionPolicy for SequencePolicy {
    fn decide(&self) -> OrderDecision {
        let mut remaining = self
            .remaining
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        remaining.pop_front().unwrap_or(self.last)
    }
}
