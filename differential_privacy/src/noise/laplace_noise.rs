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

//! The Laplace mechanism.
//!
//! Samples are produced by inverting the Laplace CDF on a single centred uniform draw `u` from
//! (-0.5, 0.5):
//!
//! ```text
//! u ≥ 0:  sample = -scale · ln(1 − 2u)
//! u < 0:  sample =  scale · ln(1 + 2u)
//! ```
//!
//! Given a fixed [`UniformSource`] the output is therefore fully deterministic.

use crate::{
    checks,
    noise::Noise,
    rand::{Rand, UniformSource},
};

// Noise instance that adds Laplace noise with location 0 and scale `sensitivity / epsilon` to its
// input.
pub struct Laplace<S: UniformSource = Rand> {
    source: S,
}

impl Laplace<Rand> {
    /// Creates an instance backed by an OS-seeded random source.
    pub fn new() -> crate::Result<Self> {
        Ok(Self::with_source(Rand::new()?))
    }
}

impl<S: UniformSource> Laplace<S> {
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Returns the scale `b = sensitivity / epsilon` of the noise distribution.
    pub fn scale(sensitivity: f64, epsilon: f64) -> crate::Result<f64> {
        checks::check_noise_parameters("scale (Laplace)", sensitivity, epsilon)?;
        Ok(sensitivity / epsilon)
    }

    /// Returns the variance `2b²` of the noise added for the given parameters.
    pub fn variance(sensitivity: f64, epsilon: f64) -> crate::Result<f64> {
        let scale = Self::scale(sensitivity, epsilon)?;
        Ok(2.0 * scale * scale)
    }

    /// Draws one sample from Laplace(0, `scale`).
    pub fn sample(&mut self, scale: f64) -> f64 {
        let u = self.source.centered_uniform();
        if u >= 0.0 {
            -scale * (1.0 - 2.0 * u).ln()
        } else {
            scale * (1.0 + 2.0 * u).ln()
        }
    }
}

impl<S: UniformSource> Noise for Laplace<S> {
    fn add_noise(&mut self, true_value: f64, sensitivity: f64, epsilon: f64) -> crate::Result<f64> {
        checks::check_noise_parameters("add_noise (Laplace)", sensitivity, epsilon)?;
        let scale = sensitivity / epsilon;
        Ok(true_value + self.sample(scale))
    }
}
