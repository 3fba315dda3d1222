//
// Copyright 2021 The Project Oak Authors
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

//! Methods to generate and add noise to data.
//!
//! Noise primitives do not consult a privacy budget. Callers are expected to obtain an ε
//! allocation from [`crate::budget::PrivacyBudgetLedger`] before releasing a noised value.

pub mod laplace_noise;

/// Trait definition for primitives that add noise to data to make it differentially private.
pub trait Noise {
    /// Adds noise to the specified f64 `true_value` so that the output is ε-differentially private
    /// given the L_1 `sensitivity` of the query that produced it.
    fn add_noise(&mut self, true_value: f64, sensitivity: f64, epsilon: f64) -> crate::Result<f64>;

    /// Adds noise to the specified i64 `true_value`, rounding the result to the nearest integer.
    ///
    /// Intended for counting queries, where a fractional release would be meaningless.
    fn add_noise_i64(
        &mut self,
        true_value: i64,
        sensitivity: f64,
        epsilon: f64,
    ) -> crate::Result<i64> {
        let noised = self.add_noise(true_value as f64, sensitivity, epsilon)?;
        // `as` saturates at the i64 bounds.
        Ok(noised.round() as i64)
    }
}

impl<N: Noise + ?Sized> Noise for &mut N {
    fn add_noise(&mut self, true_value: f64, sensitivity: f64, epsilon: f64) -> crate::Result<f64> {
        (**self).add_noise(true_value, sensitivity, epsilon)
    }
}
