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

//! Partitioning of records into equivalence classes on their quasi-identifiers.

use std::{collections::HashMap, hash::Hash};

use crate::record::{Record, Value};

/// Records sharing identical values for every quasi-identifier field.
#[derive(Clone, Debug, PartialEq)]
pub struct QuasiIdentifierGroup<'a> {
    /// The shared values, one per quasi-identifier field in declaration order.
    pub key: Vec<Value>,
    /// The records of the group, in input order.
    pub records: Vec<&'a Record>,
}

/// Value used in grouping keys for a field the record does not have.
pub fn missing_value() -> Value {
    Value::Str(String::new())
}

/// Builds the grouping key of `record`. Missing fields are keyed as the empty string.
pub fn quasi_identifier_key<F: AsRef<str>>(record: &Record, qi_fields: &[F]) -> Vec<Value> {
    qi_fields
        .iter()
        .map(|field| record.get(field.as_ref()).cloned().unwrap_or_else(missing_value))
        .collect()
}

/// Groups `items` by key. Groups are returned in order of first appearance of their key and
/// preserve the relative order of their items.
pub(crate) fn group_by_key<K, T, I>(items: I) -> Vec<(K, Vec<T>)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = (K, T)>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();
    for (key, item) in items {
        match index.get(&key) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![item]));
            }
        }
    }
    groups
}

/// Partitions `records` into groups sharing identical values for every field in `qi_fields`.
///
/// This is a pure function of its inputs; the result does not depend on anything but the order of
/// `records`.
pub fn group<'a, F: AsRef<str>>(
    records: &'a [Record],
    qi_fields: &[F],
) -> Vec<QuasiIdentifierGroup<'a>> {
    group_by_key(records.iter().map(|record| (quasi_identifier_key(record, qi_fields), record)))
        .into_iter()
        .map(|(key, records)| QuasiIdentifierGroup { key, records })
        .collect()
}

/// Returns the size of the smallest group of `records` on `qi_fields`, i.e. the largest k for
/// which the records are k-anonymous. Returns `None` for an empty record set.
pub fn minimum_group_size<F: AsRef<str>>(records: &[Record], qi_fields: &[F]) -> Option<usize> {
    group(records, qi_fields).iter().map(|group| group.records.len()).min()
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    fn person(age: i64, zip: &str) -> Record {
        Record::new().with("age", age).with("zip", zip)
    }

    #[googletest::test]
    fn groups_identical_keys_in_first_appearance_order() {
        let records = vec![person(30, "111"), person(40, "222"), person(30, "111")];
        let groups = group(&records, &["age", "zip"]);

        assert_that!(groups, len(eq(2)));
        assert_that!(groups[0].key, eq(vec![Value::Int(30), Value::from("111")]));
        assert_that!(groups[0].records, eq(vec![&records[0], &records[2]]));
        assert_that!(groups[1].records, eq(vec![&records[1]]));
    }

    #[googletest::test]
    fn missing_fields_group_under_empty_sentinel() {
        let records = vec![
            Record::new().with("age", 30),
            Record::new().with("age", 30).with("zip", ""),
            Record::new().with("age", 30).with("zip", "111"),
        ];
        let groups = group(&records, &["age", "zip"]);

        assert_that!(groups, len(eq(2)));
        assert_that!(groups[0].key, eq(vec![Value::Int(30), missing_value()]));
        assert_that!(groups[0].records, len(eq(2)));
    }

    #[googletest::test]
    fn no_fields_puts_everything_in_one_group() {
        let records = vec![person(1, "a"), person(2, "b")];
        let groups = group::<&str>(&records, &[]);

        assert_that!(groups, len(eq(1)));
        assert_that!(groups[0].records, len(eq(2)));
    }

    #[googletest::test]
    fn minimum_group_size_is_smallest_class() {
        let records = vec![person(30, "111"), person(30, "111"), person(40, "222")];
        assert_that!(minimum_group_size(&records, &["age", "zip"]), some(eq(1)));
        assert_that!(minimum_group_size::<&str>(&records, &[]), some(eq(3)));
        assert_that!(minimum_group_size::<&str>(&[], &["age"]), none());
    }
}
