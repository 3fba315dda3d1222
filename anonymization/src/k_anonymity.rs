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

//! k-anonymization by iterative generalization with a suppression fallback.
//!
//! Each pass works on one generation: the records that are still pending, all generalized to the
//! same level vector. The pass groups them on their generalized quasi-identifiers, releases every
//! group of at least `k` records and carries the rest into the next generation, one level more
//! general on every field that still has a level left. Once no field can be generalized further,
//! the remaining records are suppressed. Released groups are never revisited.

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    grouper::{group_by_key, missing_value},
    hierarchy::{GeneralizationHierarchy, Hierarchies},
    record::{Record, Value},
    Error, Result,
};

/// A released equivalence class.
#[derive(Clone, Debug, PartialEq)]
pub struct AnonymizationGroup {
    /// The shared generalized quasi-identifier values, in declaration order.
    pub key: Vec<Value>,
    /// Generalization level applied to each quasi-identifier field, in declaration order.
    pub levels: Vec<usize>,
    /// Released records, in input order.
    pub records: Vec<Record>,
}

impl AnonymizationGroup {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AnonymizationSummary {
    pub input_records: usize,
    pub released_records: usize,
    pub suppressed_records: usize,
    pub released_groups: usize,
    /// Number of generalization passes performed after the initial grouping.
    pub generalization_passes: usize,
}

/// Result of a k-anonymization run.
#[derive(Clone, Debug, PartialEq)]
pub struct AnonymizedDataset {
    pub quasi_identifiers: Vec<String>,
    pub k: usize,
    pub groups: Vec<AnonymizationGroup>,
    pub summary: AnonymizationSummary,
}

impl AnonymizedDataset {
    /// Iterates over all released records, group by group.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.groups.iter().flat_map(|group| group.records.iter())
    }

    pub fn into_records(self) -> Vec<Record> {
        self.groups.into_iter().flat_map(|group| group.records).collect()
    }
}

/// Checks the parameters of a run: `k` must be at least 1 and every quasi-identifier needs a
/// valid hierarchy.
pub fn validate_parameters<F: AsRef<str>>(
    qi_fields: &[F],
    hierarchies: &Hierarchies,
    k: usize,
) -> Result<()> {
    if k < 1 {
        return Err(Error::InvalidConfiguration("k is 0, should be at least 1".to_string()));
    }
    for field in qi_fields {
        let field = field.as_ref();
        hierarchies
            .get(field)
            .ok_or_else(|| {
                Error::InvalidConfiguration(format!(
                    "quasi-identifier {} has no generalization hierarchy",
                    field
                ))
            })?
            .validate(field)?;
    }
    Ok(())
}

/// One quasi-identifier field with its hierarchy.
struct QuasiIdentifier<'a> {
    name: &'a str,
    hierarchy: &'a GeneralizationHierarchy,
}

/// The pending records of one pass, all at the same generalization levels.
struct Generation {
    levels: Vec<usize>,
    members: Vec<usize>,
}

impl Generation {
    /// Returns the next generation for `members`, or `None` if every field is already at its top
    /// level.
    fn next(&self, qis: &[QuasiIdentifier], members: Vec<usize>) -> Option<Generation> {
        let levels: Vec<usize> = self
            .levels
            .iter()
            .zip(qis)
            .map(|(level, qi)| (level + 1).min(qi.hierarchy.top_level()))
            .collect();
        if levels == self.levels {
            return None;
        }
        Some(Generation { levels, members })
    }
}

fn generalized_key(record: &Record, qis: &[QuasiIdentifier], levels: &[usize]) -> Vec<Value> {
    qis.iter()
        .zip(levels)
        .map(|(qi, level)| match record.get(qi.name) {
            Some(value) => qi.hierarchy.generalize(value, *level),
            None => missing_value(),
        })
        .collect()
}

fn generalized_record(record: &Record, qis: &[QuasiIdentifier], levels: &[usize]) -> Record {
    record
        .iter()
        .map(|(name, value)| {
            let released = match qis.iter().position(|qi| qi.name == name) {
                Some(i) => qis[i].hierarchy.generalize(value, levels[i]),
                None => value.clone(),
            };
            (name, released)
        })
        .collect()
}

/// Anonymizes `records` so that every released group shares its generalized quasi-identifiers
/// with at least `k - 1` other records.
///
/// Fails with [`Error::InvalidConfiguration`] if `k` is 0 or a field of `qi_fields` has no
/// generalization levels in `hierarchies`. Records that cannot reach a group of size `k` even at
/// the most general level are suppressed and counted in the summary.
pub fn anonymize<F: AsRef<str>>(
    records: &[Record],
    qi_fields: &[F],
    hierarchies: &Hierarchies,
    k: usize,
) -> Result<AnonymizedDataset> {
    validate_parameters(qi_fields, hierarchies, k)?;
    let qis: Vec<QuasiIdentifier> = qi_fields
        .iter()
        .filter_map(|field| {
            let name = field.as_ref();
            hierarchies.get(name).map(|hierarchy| QuasiIdentifier { name, hierarchy })
        })
        .collect();

    let mut groups = Vec::new();
    let mut suppressed = 0;
    let mut generations_grouped: usize = 0;
    let mut generation =
        Generation { levels: vec![0; qis.len()], members: (0..records.len()).collect() };

    loop {
        if generation.members.len() < k {
            // No subset of the pending records can reach k.
            suppressed = generation.members.len();
            break;
        }
        generations_grouped += 1;

        let classes = group_by_key(
            generation
                .members
                .iter()
                .map(|&i| (generalized_key(&records[i], &qis, &generation.levels), i)),
        );
        let mut pending = Vec::new();
        let mut released_this_pass = 0;
        for (key, members) in classes {
            if members.len() >= k {
                released_this_pass += members.len();
                groups.push(AnonymizationGroup {
                    key,
                    levels: generation.levels.clone(),
                    records: members
                        .iter()
                        .map(|&i| generalized_record(&records[i], &qis, &generation.levels))
                        .collect(),
                });
            } else {
                pending.extend(members);
            }
        }
        debug!(
            "anonymization pass at levels {:?}: released {} records, {} pending",
            generation.levels,
            released_this_pass,
            pending.len()
        );

        if pending.is_empty() {
            break;
        }
        // Regrouping must see records in input order so groups keep input order.
        pending.sort_unstable();
        let pending_len = pending.len();
        match generation.next(&qis, pending) {
            Some(next) => generation = next,
            None => {
                suppressed = pending_len;
                break;
            }
        }
    }

    let summary = AnonymizationSummary {
        input_records: records.len(),
        released_records: records.len() - suppressed,
        suppressed_records: suppressed,
        released_groups: groups.len(),
        generalization_passes: generations_grouped.saturating_sub(1),
    };
    if suppressed > 0 && summary.released_records == 0 {
        warn!("k-anonymization with k={} suppressed all {} records", k, suppressed);
    }
    info!(
        "k-anonymization with k={}: released {} records in {} groups, \
         suppressed {} after {} passes",
        k,
        summary.released_records,
        summary.released_groups,
        summary.suppressed_records,
        summary.generalization_passes
    );

    Ok(AnonymizedDataset {
        quasi_identifiers: qis.iter().map(|qi| qi.name.to_string()).collect(),
        k,
        groups,
        summary,
    })
}
