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

//! Sources of uniform randomness for the noise mechanisms.
//!
//! Noise is always derived from a single centred uniform draw, so the mechanisms only depend on
//! the [`UniformSource`] trait. Production code uses [`Rand`]; tests substitute a
//! [`ScriptedSource`] to make noised outputs exact.

use rand::{
    rngs::{OsRng, StdRng},
    RngCore, SeedableRng,
};

/// A source of uniform draws from the open interval (-0.5, 0.5).
pub trait UniformSource {
    /// Returns a draw from (-0.5, 0.5). Neither endpoint is ever returned.
    fn centered_uniform(&mut self) -> f64;
}

impl<S: UniformSource + ?Sized> UniformSource for &mut S {
    fn centered_uniform(&mut self) -> f64 {
        (**self).centered_uniform()
    }
}

/// Wrapper for the actual random number generator.
pub struct Rand {
    /// The internal random number generator used for sampling the noise.
    rng: StdRng,
}

impl Rand {
    /// Creates a source seeded from the operating system's entropy pool.
    pub fn new() -> crate::Result<Self> {
        Ok(Self::new_with_rng(StdRng::from_rng(OsRng)?))
    }

    /// Creates a reproducible source. Only suitable for simulations and tests.
    pub fn from_seed(seed: u64) -> Self {
        Self::new_with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn new_with_rng(rng: StdRng) -> Self {
        Self { rng }
    }

    /// Returns an f64 from the interval (0,1] such that each float in the interval is returned
    /// with positive probability and the resulting distribution simulates a continuous uniform
    /// distribution on (0, 1].
    pub fn uniform(&mut self) -> f64 {
        let i = self.rng.next_u64() % (1 << 53);
        let r = (1.0 + (i as f64) / ((1_u64 << 53) as f64)) / 2.0_f64.powf(self.geometric());
        // Avoid returning 0, the noise is derived from a logarithm of the output.
        if r == 0.0 {
            return 1.0;
        }
        r
    }

    /// Returns an f64 that counts the number of Bernoulli trials until the first success for a
    /// success probability of 0.5.
    fn geometric(&mut self) -> f64 {
        // 1 plus the number of leading zeros from an infinite stream of random bits follows the
        // desired geometric distribution.
        let mut b = 1;
        let mut r = 0;
        while r == 0 {
            r = self.rng.next_u32();
            b += r.leading_zeros();
        }
        b as f64
    }
}

impl UniformSource for Rand {
    fn centered_uniform(&mut self) -> f64 {
        loop {
            // uniform() is in (0, 1]; a draw of exactly 1 would map onto the excluded endpoint.
            let u = self.uniform();
            if u < 1.0 {
                return u - 0.5;
            }
        }
    }
}

/// Replays a fixed sequence of centred draws, starting over once the sequence is exhausted.
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    draws: Vec<f64>,
    position: usize,
}

impl ScriptedSource {
    /// Creates a source replaying `draws`.
    ///
    /// Fails if the sequence is empty or any draw lies outside (-0.5, 0.5).
    pub fn new(draws: Vec<f64>) -> crate::Result<Self> {
        if draws.is_empty() {
            return Err(crate::Error::InvalidParameters(
                "scripted source needs at least one draw".to_string(),
            ));
        }
        if let Some(bad) = draws.iter().find(|u| !(**u > -0.5 && **u < 0.5)) {
            return Err(crate::Error::InvalidParameters(format!(
                "scripted draw {} is outside (-0.5, 0.5)",
                bad
            )));
        }
        Ok(Self { draws, position: 0 })
    }
}

impl UniformSource for ScriptedSource {
    fn centered_uniform(&mut self) -> f64 {
        let u = self.draws[self.position];
        self.position = (self.position + 1) % self.draws.len();
        u
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    #[googletest::test]
    fn centered_draws_stay_inside_open_interval() {
        let mut rand = Rand::from_seed(7);
        for _ in 0..10_000 {
            let u = rand.centered_uniform();
            assert_that!(u, gt(-0.5));
            assert_that!(u, lt(0.5));
        }
    }

    #[googletest::test]
    fn seeded_sources_are_reproducible() {
        let mut first = Rand::from_seed(42);
        let mut second = Rand::from_seed(42);
        for _ in 0..100 {
            assert_that!(first.centered_uniform(), eq(second.centered_uniform()));
        }
    }

    #[googletest::test]
    fn uniform_mean_is_one_half() {
        let mut rand = Rand::from_seed(3);
        let n = 50_000;
        let mean = (0..n).map(|_| rand.uniform()).sum::<f64>() / n as f64;
        assert_that!(mean, near(0.5, 0.01));
    }

    #[googletest::test]
    fn scripted_source_cycles() -> Result<()> {
        let mut source = ScriptedSource::new(vec![0.1, -0.2])?;
        assert_that!(source.centered_uniform(), eq(0.1));
        assert_that!(source.centered_uniform(), eq(-0.2));
        assert_that!(source.centered_uniform(), eq(0.1));
        Ok(())
    }

    #[googletest::test]
    fn scripted_source_rejects_endpoints() {
        assert_that!(ScriptedSource::new(vec![0.5]), err(anything()));
        assert_that!(ScriptedSource::new(vec![-0.5]), err(anything()));
        assert_that!(ScriptedSource::new(vec![]), err(anything()));
    }
}
