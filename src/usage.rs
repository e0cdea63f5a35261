//! Session-scoped usage accounting.
//!
//! [`UsageAccumulator`] is the one piece of shared mutable state in the
//! system: token and cost totals for a session, incremented after each
//! successful task, never decremented, reset only by dropping the value.
//! It is an explicit object owned by the caller — not hidden global state —
//! so tests and concurrent sessions construct their own.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Monotonic token/cost totals, safe to increment from concurrent tasks.
#[derive(Debug, Default)]
pub struct UsageAccumulator {
    total_tokens: AtomicU64,
    // f64 stored as bits; updated with a CAS loop so concurrent adds are
    // never lost.
    total_cost_bits: AtomicU64,
}

impl UsageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed task. Monotonic: counts only go up.
    pub fn accumulate(&self, prompt_tokens: u64, completion_tokens: u64, cost: f64) {
        self.total_tokens
            .fetch_add(prompt_tokens + completion_tokens, Ordering::Relaxed);
        let mut current = self.total_cost_bits.load(Ordering::Relaxed);
        loop {
            let updated = (f64::from_bits(current) + cost).to_bits();
            match self.total_cost_bits.compare_exchange_weak(
                current,
                updated,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens.load(Ordering::Relaxed)
    }

    pub fn total_cost(&self) -> f64 {
        f64::from_bits(self.total_cost_bits.load(Ordering::Relaxed))
    }

    /// Facts-only copy for display layers.
    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            total_tokens: self.total_tokens(),
            total_cost: self.total_cost(),
        }
    }
}

/// Point-in-time view of an accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub total_tokens: u64,
    pub total_cost: f64,
}
