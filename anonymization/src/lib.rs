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

//! Anonymization primitives for record batches.
//!
//! - [`pseudonym`]: deterministic, purpose-scoped pseudonyms for direct identifiers.
//! - [`grouper`] and [`k_anonymity`]: k-anonymization of quasi-identifiers by generalization along
//!   per-field [`hierarchy`] levels, with suppression of records that cannot be hidden.
//! - [`aggregate`]: noised counts and sums charged against a
//!   [`differential_privacy::budget::PrivacyBudgetLedger`].
//!
//! ```
//! use anonymization::{
//!     hierarchy::{Generalization, GeneralizationHierarchy, Hierarchies},
//!     k_anonymity::anonymize,
//!     record::Record,
//! };
//!
//! let records = vec![
//!     Record::new().with("age", 25).with("zip", "12345"),
//!     Record::new().with("age", 27).with("zip", "12346"),
//!     Record::new().with("age", 32).with("zip", "54321"),
//! ];
//! let hierarchies = Hierarchies::from([
//!     ("age".to_string(), GeneralizationHierarchy::new(vec![Generalization::range(10)])),
//!     ("zip".to_string(), GeneralizationHierarchy::new(vec![Generalization::prefix(3)])),
//! ]);
//!
//! let dataset = anonymize(&records, &["age", "zip"], &hierarchies, 2)?;
//! assert_eq!(dataset.summary.released_records, 2);
//! assert_eq!(dataset.summary.suppressed_records, 1);
//! # Ok::<(), anonymization::Error>(())
//! ```

pub mod aggregate;
pub mod config;
mod error;
pub mod grouper;
pub mod hierarchy;
pub mod k_anonymity;
pub mod pseudonym;
pub mod record;

pub use config::{AnonymizationConfig, Anonymizer, PseudonymizationConfig};
pub use error::{Error, Result};
pub use k_anonymity::{anonymize, AnonymizationGroup, AnonymizationSummary, AnonymizedDataset};
pub use pseudonym::{Pseudonymizer, SaltStore};
pub use record::{Record, Value};
