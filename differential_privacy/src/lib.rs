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

//! Differential privacy primitives: a Laplace noise mechanism and a privacy budget ledger that
//! authorizes each noised release.
//!
//! The two are independent. A caller composes them by first asking the ledger for an
//! ε allocation and only adding noise once the allocation has been granted:
//!
//! ```
//! use differential_privacy::{
//!     budget::PrivacyBudgetLedger,
//!     noise::{laplace_noise::Laplace, Noise},
//! };
//!
//! let ledger = PrivacyBudgetLedger::new(1.0)?;
//! let mut laplace = Laplace::new()?;
//! if ledger.allocate("visits", 0.5)? {
//!     let noised = laplace.add_noise(1234.0, 1.0, 0.5)?;
//!     println!("visits ≈ {noised}");
//! }
//! # Ok::<(), differential_privacy::Error>(())
//! ```

pub mod budget;
pub mod checks;
pub mod noise;
pub mod rand;

/// Errors returned by the differential privacy primitives.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{label}: epsilon is {epsilon}, should be strictly positive and finite")]
    InvalidEpsilon { label: String, epsilon: f64 },
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("failed to initialize random source: {0}")]
    RandomSource(#[from] ::rand::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
