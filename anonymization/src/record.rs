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

//! Records are ordered field → value mappings. They are never mutated once built: every
//! transformation (generalization, pseudonymization) produces a new record.

use core::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

/// A single field value. Categorical values are represented as strings.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Str(String),
}

impl Value {
    /// Returns the value as an integer, parsing strings that hold one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Str(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// An ordered mapping from field name to value. Field order is the insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record extended with `field`, replacing an existing value in place if the
    /// field is already present.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((field.to_string(), value)),
        }
        self
    }

    /// Returns a copy of this record with `field` set to `value`.
    pub fn replace(&self, field: &str, value: impl Into<Value>) -> Self {
        self.clone().with(field, value)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(name, _)| name == field).map(|(_, value)| value)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter().fold(Record::new(), |record, (field, value)| {
            let field: String = field.into();
            record.with(&field, value)
        })
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of field names to string or integer values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
        let mut record = Record::new();
        while let Some((field, value)) = access.next_entry::<String, Value>()? {
            record = record.with(&field, value);
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Record, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    #[googletest::test]
    fn preserves_insertion_order() {
        let record = Record::new().with("zip", "12345").with("age", 25).with("city", "Springfield");
        let names: Vec<&str> = record.iter().map(|(name, _)| name).collect();
        assert_that!(names, eq(vec!["zip", "age", "city"]));
    }

    #[googletest::test]
    fn replace_leaves_original_untouched() {
        let original = Record::new().with("age", 25);
        let replaced = original.replace("age", "20-29");

        assert_that!(original.get("age"), some(eq(&Value::Int(25))));
        assert_that!(replaced.get("age"), some(eq(&Value::Str("20-29".to_string()))));
        assert_that!(replaced.len(), eq(1));
    }

    #[googletest::test]
    fn integers_parse_from_strings() {
        assert_that!(Value::from("  42 ").as_i64(), some(eq(42)));
        assert_that!(Value::from("forty-two").as_i64(), none());
        assert_that!(Value::from(7).as_i64(), some(eq(7)));
    }

    #[googletest::test]
    fn json_round_trip_keeps_field_order() {
        let json = r#"{"zip":"12345","age":25,"name":"alice"}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_that!(record.get("age"), some(eq(&Value::Int(25))));
        assert_that!(serde_json::to_string(&record).unwrap(), eq(json));
    }
}
