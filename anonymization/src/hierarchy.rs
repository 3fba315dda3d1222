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

//! Generalization hierarchies for quasi-identifier fields.
//!
//! A hierarchy is an ordered list of levels. Level 0 is the raw value; each further level is a
//! [`Generalization`] step, from the least to the most general. Every level is computed from the
//! raw value rather than from the previous level, so a 10-wide bucket followed by a 50-wide bucket
//! yields exact 50-wide ranges.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{record::Value, Error, Result};

/// Wildcard released when a value cannot be represented at a level.
pub const WILDCARD: &str = "*";

fn default_mask() -> char {
    '*'
}

/// A single coarsening step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Generalization {
    /// Replaces an integer `v` with the bucket `"LOW-HIGH"` of the given width containing it.
    Range { width: i64 },
    /// Keeps the first `keep` characters and replaces each remaining character with `mask`.
    Prefix {
        keep: usize,
        #[serde(default = "default_mask")]
        mask: char,
    },
    /// Replaces any value with a fixed label.
    Label(String),
}

impl Generalization {
    pub fn range(width: i64) -> Self {
        Generalization::Range { width }
    }

    pub fn prefix(keep: usize) -> Self {
        Generalization::Prefix { keep, mask: default_mask() }
    }

    pub fn label(label: &str) -> Self {
        Generalization::Label(label.to_string())
    }

    fn validate(&self, field: &str) -> Result<()> {
        match self {
            Generalization::Range { width } if *width < 1 => Err(Error::InvalidConfiguration(
                format!("range width for field {} is {}, should be at least 1", field, width),
            )),
            _ => Ok(()),
        }
    }

    /// Applies this step to a raw value.
    pub fn apply(&self, value: &Value) -> Value {
        match self {
            Generalization::Range { width } => match value.as_i64() {
                Some(v) if *width > 0 => {
                    let low = v.div_euclid(*width).saturating_mul(*width);
                    let high = low.saturating_add(width - 1);
                    Value::Str(format!("{}-{}", low, high))
                }
                // Non-numeric values have no bucket; release the wildcard rather than the value.
                _ => Value::Str(WILDCARD.to_string()),
            },
            Generalization::Prefix { keep, mask } => {
                let raw = value.to_string();
                let masked = raw
                    .chars()
                    .enumerate()
                    .map(|(i, c)| if i < *keep { c } else { *mask })
                    .collect();
                Value::Str(masked)
            }
            Generalization::Label(label) => Value::Str(label.clone()),
        }
    }
}

/// Ordered levels of generalization for one field, level 0 being the raw value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneralizationHierarchy {
    steps: Vec<Generalization>,
}

impl GeneralizationHierarchy {
    /// Creates a hierarchy whose levels 1..=n are the given steps.
    pub fn new(steps: Vec<Generalization>) -> Self {
        Self { steps }
    }

    /// Returns the hierarchy extended with one more, more general, level.
    pub fn then(mut self, step: Generalization) -> Self {
        self.steps.push(step);
        self
    }

    /// Number of levels including the raw level.
    pub fn levels(&self) -> usize {
        self.steps.len() + 1
    }

    /// The most general level available.
    pub fn top_level(&self) -> usize {
        self.steps.len()
    }

    /// Fails unless the hierarchy has at least one generalization step and every step is usable.
    pub fn validate(&self, field: &str) -> Result<()> {
        if self.steps.is_empty() {
            return Err(Error::InvalidConfiguration(format!(
                "hierarchy for field {} has no generalization levels",
                field
            )));
        }
        self.steps.iter().try_for_each(|step| step.validate(field))
    }

    /// Returns `value` generalized to `level`. Levels above the top are clamped to the top.
    pub fn generalize(&self, value: &Value, level: usize) -> Value {
        match level.min(self.top_level()) {
            0 => value.clone(),
            level => self.steps[level - 1].apply(value),
        }
    }
}

/// Generalization hierarchies keyed by field name.
pub type Hierarchies = BTreeMap<String, GeneralizationHierarchy>;
