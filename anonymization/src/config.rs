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

//! JSON configuration of an anonymization run and the [`Anonymizer`] that executes it.

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    hierarchy::Hierarchies,
    k_anonymity::{self, AnonymizedDataset},
    pseudonym::Pseudonymizer,
    record::Record,
    Error, Result,
};

/// Direct identifiers to replace with pseudonyms before anonymization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PseudonymizationConfig {
    pub purpose: String,
    pub fields: Vec<String>,
}

/// Parameters of an anonymization run.
///
/// ```json
/// {
///   "k": 2,
///   "quasi_identifiers": ["age", "zip"],
///   "hierarchies": {
///     "age": [{"range": {"width": 10}}, {"label": "*"}],
///     "zip": [{"prefix": {"keep": 3}}]
///   },
///   "pseudonymize": {"purpose": "research", "fields": ["email"]}
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    pub k: usize,
    pub quasi_identifiers: Vec<String>,
    pub hierarchies: Hierarchies,
    #[serde(default)]
    pub pseudonymize: Option<PseudonymizationConfig>,
}

impl AnonymizationConfig {
    pub fn validate(&self) -> Result<()> {
        k_anonymity::validate_parameters(&self.quasi_identifiers, &self.hierarchies, self.k)?;
        if let Some(pseudonymize) = &self.pseudonymize {
            if pseudonymize.purpose.is_empty() {
                return Err(Error::InvalidConfiguration(
                    "pseudonymization purpose is empty".to_string(),
                ));
            }
            if let Some(field) =
                pseudonymize.fields.iter().find(|field| self.quasi_identifiers.contains(*field))
            {
                return Err(Error::InvalidConfiguration(format!(
                    "field {} is both a quasi-identifier and a direct identifier",
                    field
                )));
            }
        }
        Ok(())
    }
}

/// Runs a validated [`AnonymizationConfig`] over record batches.
#[derive(Clone)]
pub struct Anonymizer {
    config: AnonymizationConfig,
    pseudonymizer: Pseudonymizer,
}

impl Anonymizer {
    pub fn new(config: AnonymizationConfig, pseudonymizer: Pseudonymizer) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, pseudonymizer })
    }

    /// Pseudonymizes the configured direct identifiers, then k-anonymizes the batch.
    pub fn run(&self, records: &[Record]) -> Result<AnonymizedDataset> {
        let pseudonymized;
        let records = match &self.config.pseudonymize {
            Some(pseudonymize) => {
                pseudonymized = records
                    .iter()
                    .map(|record| {
                        self.pseudonymizer.pseudonymize_fields(
                            record,
                            &pseudonymize.fields,
                            &pseudonymize.purpose,
                        )
                    })
                    .collect::<Result<Vec<Record>>>()?;
                info!(
                    "pseudonymized {} fields of {} records",
                    pseudonymize.fields.len(),
                    pseudonymized.len()
                );
                &pseudonymized[..]
            }
            None => records,
        };
        k_anonymity::anonymize(
            records,
            &self.config.quasi_identifiers,
            &self.config.hierarchies,
            self.config.k,
        )
    }
}
