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

//! Differentially private aggregate queries over records.
//!
//! Every query first asks the ledger for its ε and only computes and noises the statistic once the
//! allocation is granted. Parameters are validated before the ledger is consulted so that a
//! malformed query never consumes budget.

use differential_privacy::{budget::PrivacyBudgetLedger, checks, noise::Noise};
use log::warn;

use crate::{record::Record, Error, Result};

/// Adding or removing one record changes a count by at most one.
pub const COUNT_SENSITIVITY: f64 = 1.0;

/// Clamping bounds for the per-record contribution to a sum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContributionBounds {
    pub lower: f64,
    pub upper: f64,
}

impl ContributionBounds {
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !(lower.is_finite() && upper.is_finite() && lower <= upper) {
            return Err(Error::InvalidConfiguration(format!(
                "contribution bounds [{}, {}] are not a finite interval",
                lower, upper
            )));
        }
        Ok(Self { lower, upper })
    }

    /// The largest change a single clamped contribution can make to a sum.
    pub fn sensitivity(&self) -> f64 {
        self.lower.abs().max(self.upper.abs())
    }

    fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }
}

/// Answers aggregate queries with Laplace (or other) noise, charged against a shared ledger.
pub struct PrivateAggregator<'a, N: Noise> {
    ledger: &'a PrivacyBudgetLedger,
    noise: N,
}

impl<'a, N: Noise> PrivateAggregator<'a, N> {
    pub fn new(ledger: &'a PrivacyBudgetLedger, noise: N) -> Self {
        Self { ledger, noise }
    }

    /// Returns a noised count of `records`, or `None` if the ledger denied `epsilon`.
    pub fn count(&mut self, label: &str, records: &[Record], epsilon: f64) -> Result<Option<f64>> {
        self.release(label, COUNT_SENSITIVITY, epsilon, || records.len() as f64)
    }

    /// Returns a noised sum of the integer values of `field`, each clamped to `bounds`, or `None`
    /// if the ledger denied `epsilon`. Records without an integer value contribute 0.
    pub fn sum(
        &mut self,
        label: &str,
        records: &[Record],
        field: &str,
        bounds: ContributionBounds,
        epsilon: f64,
    ) -> Result<Option<f64>> {
        self.release(label, bounds.sensitivity(), epsilon, || {
            records
                .iter()
                .filter_map(|record| record.get(field).and_then(|value| value.as_i64()))
                .map(|value| bounds.clamp(value as f64))
                .sum()
        })
    }

    fn release<F: FnOnce() -> f64>(
        &mut self,
        label: &str,
        sensitivity: f64,
        epsilon: f64,
        statistic: F,
    ) -> Result<Option<f64>> {
        checks::check_noise_parameters(label, sensitivity, epsilon)?;
        if !self.ledger.allocate(label, epsilon)? {
            warn!("query {} was not answered: privacy budget exhausted", label);
            return Ok(None);
        }
        Ok(Some(self.noise.add_noise(statistic(), sensitivity, epsilon)?))
    }
}
