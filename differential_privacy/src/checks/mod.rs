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

//! Checks for differentially private functions.
//!
//! Invalid parameters are always reported to the caller. Nothing here clamps or substitutes a
//! value, since a silently adjusted ε or sensitivity changes the privacy guarantee.

use crate::Error;

fn is_strictly_positive(x: f64) -> bool {
    x > 0.0 && x.is_finite()
}

/// Returns an error if ε is non-positive, +∞ or NaN.
pub fn check_epsilon(label: &str, epsilon: f64) -> crate::Result<()> {
    if !is_strictly_positive(epsilon) {
        return Err(Error::InvalidEpsilon {
            label: label.to_string(),
            epsilon,
        });
    }
    Ok(())
}

/// Returns an error if `sensitivity` or ε is non-positive, +∞ or NaN.
pub fn check_noise_parameters(label: &str, sensitivity: f64, epsilon: f64) -> crate::Result<()> {
    if !is_strictly_positive(sensitivity) {
        return Err(Error::InvalidParameters(format!(
            "{}: sensitivity is {}, should be strictly positive (and cannot be infinity or NaN)",
            label, sensitivity
        )));
    }
    if !is_strictly_positive(epsilon) {
        return Err(Error::InvalidParameters(format!(
            "{}: epsilon is {}, should be strictly positive (and cannot be infinity or NaN)",
            label, epsilon
        )));
    }
    Ok(())
}
