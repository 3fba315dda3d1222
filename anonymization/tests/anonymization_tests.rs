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

use std::collections::HashMap;

use anonymization::{
    anonymize,
    grouper::{group, minimum_group_size},
    hierarchy::{Generalization, GeneralizationHierarchy, Hierarchies, WILDCARD},
    Record, Value,
};
use googletest::prelude::*;

const QUASI_IDENTIFIERS: [&str; 3] = ["age", "zip", "city"];

fn hierarchies() -> Hierarchies {
    Hierarchies::from([
        (
            "age".to_string(),
            GeneralizationHierarchy::new(vec![
                Generalization::range(10),
                Generalization::label(WILDCARD),
            ]),
        ),
        (
            "zip".to_string(),
            GeneralizationHierarchy::new(vec![
                Generalization::prefix(3),
                Generalization::prefix(0),
            ]),
        ),
        (
            "city".to_string(),
            GeneralizationHierarchy::new(vec![Generalization::label("Region_Generalized")]),
        ),
    ])
}

fn person(id: i64, age: i64, zip: &str, city: &str) -> Record {
    Record::new().with("id", id).with("age", age).with("zip", zip).with("city", city)
}

fn str_value(s: &str) -> Value {
    Value::Str(s.to_string())
}

#[googletest::test]
fn end_to_end_scenario() {
    let records = vec![
        Record::new().with("age", 25).with("zip", "12345"),
        Record::new().with("age", 27).with("zip", "12346"),
        Record::new().with("age", 32).with("zip", "54321"),
    ];
    let hierarchies = Hierarchies::from([
        ("age".to_string(), GeneralizationHierarchy::new(vec![Generalization::range(10)])),
        ("zip".to_string(), GeneralizationHierarchy::new(vec![Generalization::prefix(3)])),
    ]);

    let dataset = anonymize(&records, &["age", "zip"], &hierarchies, 2).unwrap();

    assert_that!(dataset.summary.released_records, eq(2));
    assert_that!(dataset.summary.suppressed_records, eq(1));
    assert_that!(dataset.groups, len(eq(1)));
    assert_that!(
        dataset.into_records(),
        eq(vec![
            Record::new().with("age", "20-29").with("zip", "123**"),
            Record::new().with("age", "20-29").with("zip", "123**"),
        ])
    );
}

#[googletest::test]
fn singleton_is_suppressed_when_others_reach_k_first() {
    let mut records: Vec<Record> =
        (1..=5).map(|i| person(i, 30 + i, &format!("1230{i}"), "Springfield")).collect();
    records.push(person(99, 80, "99999", "Shelbyville"));

    let dataset = anonymize(&records, &QUASI_IDENTIFIERS, &hierarchies(), 5).unwrap();

    assert_that!(dataset.summary.released_records, eq(5));
    assert_that!(dataset.summary.suppressed_records, eq(1));
    assert!(dataset.records().all(|record| record.get("id") != Some(&Value::Int(99))));
}

#[googletest::test]
fn singleton_collapses_into_a_group_of_k_at_the_wildcard() {
    let mut records: Vec<Record> =
        (1..=4).map(|i| person(i, 30 + i, &format!("1230{i}"), "Springfield")).collect();
    records.push(person(99, 80, "99999", "Shelbyville"));

    let dataset = anonymize(&records, &QUASI_IDENTIFIERS, &hierarchies(), 5).unwrap();

    assert_that!(dataset.groups, len(eq(1)));
    assert_that!(dataset.groups[0].records, len(eq(5)));
    assert_that!(
        dataset.groups[0].key,
        eq(vec![str_value(WILDCARD), str_value("*****"), str_value("Region_Generalized")])
    );
    assert_that!(dataset.summary.suppressed_records, eq(0));
}

#[googletest::test]
fn released_values_match_the_applied_level() {
    let records: Vec<Record> = (0..120)
        .map(|i| {
            let city = ["Springfield", "Shelbyville", "Ogdenville"][(i % 3) as usize];
            person(i, 20 + (i * 13) % 50, &format!("{:05}", 10_000 + (i * 37) % 400), city)
        })
        .collect();
    let raw_by_id: HashMap<Value, &Record> =
        records.iter().map(|record| (record.get("id").unwrap().clone(), record)).collect();
    let hierarchies = hierarchies();

    let dataset = anonymize(&records, &QUASI_IDENTIFIERS, &hierarchies, 4).unwrap();

    for group in &dataset.groups {
        for record in &group.records {
            let raw = raw_by_id[record.get("id").unwrap()];
            for (field, level) in QUASI_IDENTIFIERS.iter().zip(&group.levels) {
                let expected = hierarchies[*field].generalize(raw.get(field).unwrap(), *level);
                assert_that!(record.get(field), some(eq(&expected)));
            }
        }
    }
}

#[googletest::test]
fn released_groups_never_fall_below_k() {
    let records: Vec<Record> = (0..500)
        .map(|i| {
            let city = ["Springfield", "Shelbyville", "Ogdenville", "North Haverbrook"]
                [((i * 7) % 4) as usize];
            person(i, 18 + (i * 29) % 70, &format!("{:05}", (i * 7919) % 100_000), city)
        })
        .collect();

    for k in [1, 2, 5, 11, 50] {
        let dataset = anonymize(&records, &QUASI_IDENTIFIERS, &hierarchies(), k).unwrap();
        let released: Vec<Record> = dataset.records().cloned().collect();

        assert_that!(
            dataset.summary.released_records + dataset.summary.suppressed_records,
            eq(records.len())
        );
        for class in group(&released, &QUASI_IDENTIFIERS) {
            assert_that!(class.records.len(), ge(k));
        }
        if let Some(min) = minimum_group_size(&released, &QUASI_IDENTIFIERS) {
            assert_that!(min, ge(k));
        }
    }
}

#[googletest::test]
fn results_do_not_depend_on_repeated_runs() {
    let records: Vec<Record> =
        (0..60).map(|i| person(i, 20 + i % 30, &format!("{:05}", i * 11), "Springfield")).collect();

    let first = anonymize(&records, &QUASI_IDENTIFIERS, &hierarchies(), 3).unwrap();
    let second = anonymize(&records, &QUASI_IDENTIFIERS, &hierarchies(), 3).unwrap();

    assert_that!(first, eq(second));
}
