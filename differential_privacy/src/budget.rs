//
// Copyright 2026 The Project Oak Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Privacy budget accounting.
//!
//! A [`PrivacyBudgetLedger`] owns a fixed total ε and hands out allocations from it until it runs
//! dry. Allocations are all-or-nothing and never refunded, so the remaining budget only ever
//! decreases. Every grant is appended to an audit log.

use std::time::SystemTime;

use log::{info, warn};
use parking_lot::Mutex;
use serde::Serialize;

use crate::checks;

/// A source of timestamps for the audit log.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// A `Clock` implementation that uses `std::time::SystemTime` as a time source.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeClock;

impl Clock for SystemTimeClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Immutable record of a granted allocation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BudgetAllocation {
    pub query_label: String,
    pub epsilon_spent: f64,
    pub timestamp: SystemTime,
}

/// Point-in-time view of a ledger.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub total: f64,
    pub remaining: f64,
    pub used: f64,
    pub utilization_percentage: f64,
}

struct LedgerState {
    /// Sum of all granted allocations. Never exceeds the total.
    spent: f64,
    allocations: Vec<BudgetAllocation>,
}

/// Tracks cumulative ε spend against a fixed total.
///
/// The ledger is safe to share between threads (typically behind an `Arc`). [`allocate`] holds a
/// single lock for the compare-and-deduct step, so two requests that each fit but jointly exceed
/// the remaining budget can never both succeed.
///
/// [`allocate`]: PrivacyBudgetLedger::allocate
pub struct PrivacyBudgetLedger {
    total: f64,
    state: Mutex<LedgerState>,
    clock: Box<dyn Clock>,
}

impl PrivacyBudgetLedger {
    /// Creates a ledger with `total_epsilon` available. Fails if the total is not strictly
    /// positive and finite.
    pub fn new(total_epsilon: f64) -> crate::Result<Self> {
        Self::new_with_clock(total_epsilon, Box::new(SystemTimeClock))
    }

    pub fn new_with_clock(total_epsilon: f64, clock: Box<dyn Clock>) -> crate::Result<Self> {
        checks::check_epsilon("PrivacyBudgetLedger::new", total_epsilon)?;
        Ok(Self {
            total: total_epsilon,
            state: Mutex::new(LedgerState {
                spent: 0.0,
                allocations: Vec::new(),
            }),
            clock,
        })
    }

    /// Requests `epsilon` for the query identified by `query_label`.
    ///
    /// Returns `Ok(true)` if the allocation was granted and deducted, `Ok(false)` if the remaining
    /// budget is insufficient (the ledger is left unchanged). A denial is an expected outcome, not
    /// an error. Fails with [`crate::Error::InvalidEpsilon`] if `epsilon` is not strictly positive
    /// and finite.
    pub fn allocate(&self, query_label: &str, epsilon: f64) -> crate::Result<bool> {
        checks::check_epsilon(query_label, epsilon)?;
        let mut state = self.state.lock();
        let spent = state.spent + epsilon;
        if spent > self.total {
            warn!(
                "denied privacy budget allocation for {}: requested {}, remaining {}",
                query_label,
                epsilon,
                self.total - state.spent
            );
            return Ok(false);
        }
        state.spent = spent;
        state.allocations.push(BudgetAllocation {
            query_label: query_label.to_string(),
            epsilon_spent: epsilon,
            timestamp: self.clock.now(),
        });
        info!(
            "granted privacy budget allocation for {}: {} (remaining {})",
            query_label,
            epsilon,
            self.total - state.spent
        );
        Ok(true)
    }

    pub fn status(&self) -> BudgetStatus {
        let used = self.state.lock().spent;
        BudgetStatus {
            total: self.total,
            remaining: self.total - used,
            used,
            utilization_percentage: used / self.total * 100.0,
        }
    }

    pub fn remaining(&self) -> f64 {
        self.total - self.state.lock().spent
    }

    /// Returns a copy of the audit log, oldest allocation first.
    pub fn allocations(&self) -> Vec<BudgetAllocation> {
        self.state.lock().allocations.clone()
    }
}

impl core::fmt::Debug for PrivacyBudgetLedger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrivacyBudgetLedger")
            .field("total", &self.total)
            .field("remaining", &self.remaining())
            .finish_non_exhaustive()
    }
}
