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

//! Purpose-scoped pseudonymization.
//!
//! A pseudonym is `pseudo_` followed by the first 16 hex characters of HMAC-SHA-256 over the
//! identifier, keyed with a secret salt. Every purpose gets its own salt, so the same identifier
//! maps to unrelated pseudonyms under different purposes.

use std::{collections::HashMap, sync::Arc};

use hmac::{Hmac, Mac};
use log::debug;
use parking_lot::Mutex;
use rand_core::{OsRng, RngCore};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::{
    record::{Record, Value},
    Error, Result,
};

pub const PSEUDONYM_PREFIX: &str = "pseudo_";

/// Number of hex characters of the MAC kept in a pseudonym.
const PSEUDONYM_HEX_LENGTH: usize = 16;

/// 32 bytes = 256 bits.
const SALT_LENGTH: usize = 32;

type Salt = Zeroizing<[u8; SALT_LENGTH]>;

/// Holds one secret salt per purpose.
///
/// Salts are created on first use and kept for the lifetime of the store. Creation happens under
/// the store's lock, so concurrent first uses of a purpose observe the same salt.
#[derive(Default)]
pub struct SaltStore {
    salts: Mutex<HashMap<String, Arc<Salt>>>,
}

impl SaltStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the salt for `purpose`, generating it if this is the first use.
    fn salt_for(&self, purpose: &str) -> Result<Arc<Salt>> {
        let mut salts = self.salts.lock();
        if let Some(salt) = salts.get(purpose) {
            return Ok(Arc::clone(salt));
        }
        let mut salt = Zeroizing::new([0u8; SALT_LENGTH]);
        OsRng.try_fill_bytes(&mut salt[..])?;
        let salt = Arc::new(salt);
        salts.insert(purpose.to_string(), Arc::clone(&salt));
        debug!("created pseudonymization salt for a new purpose ({} purposes)", salts.len());
        Ok(salt)
    }

    /// Whether a salt has been created for `purpose`.
    pub fn contains(&self, purpose: &str) -> bool {
        self.salts.lock().contains_key(purpose)
    }

    /// Number of purposes with a salt.
    pub fn len(&self) -> usize {
        self.salts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.salts.lock().is_empty()
    }
}

/// Derives deterministic, purpose-scoped pseudonyms. Clones share the same [`SaltStore`].
#[derive(Clone, Default)]
pub struct Pseudonymizer {
    salts: Arc<SaltStore>,
}

impl Pseudonymizer {
    /// Creates a pseudonymizer with its own, empty salt store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_salt_store(salts: Arc<SaltStore>) -> Self {
        Self { salts }
    }

    pub fn salt_store(&self) -> &Arc<SaltStore> {
        &self.salts
    }

    /// Returns the pseudonym of `identifier` for `purpose`.
    ///
    /// The same pair always yields the same token for the lifetime of the salt store. Fails with
    /// [`Error::InvalidInput`] if either argument is empty.
    pub fn pseudonymize(&self, identifier: &str, purpose: &str) -> Result<String> {
        if identifier.is_empty() {
            return Err(Error::InvalidInput("identifier is empty".to_string()));
        }
        if purpose.is_empty() {
            return Err(Error::InvalidInput("purpose is empty".to_string()));
        }
        let salt = self.salts.salt_for(purpose)?;
        let mut mac = Hmac::<Sha256>::new_from_slice(&salt[..])
            .map_err(|err| Error::InvalidInput(format!("unusable salt: {}", err)))?;
        mac.update(identifier.as_bytes());
        let digest = hex::encode(mac.finalize().into_bytes());
        Ok(format!("{}{}", PSEUDONYM_PREFIX, &digest[..PSEUDONYM_HEX_LENGTH]))
    }

    /// Returns a copy of `record` with each of `fields` replaced by its pseudonym. Fields the
    /// record does not have are left absent.
    pub fn pseudonymize_fields<F: AsRef<str>>(
        &self,
        record: &Record,
        fields: &[F],
        purpose: &str,
    ) -> Result<Record> {
        fields.iter().try_fold(record.clone(), |record, field| {
            let field = field.as_ref();
            let token = match record.get(field) {
                Some(Value::Str(identifier)) => Some(self.pseudonymize(identifier, purpose)?),
                Some(Value::Int(identifier)) => {
                    Some(self.pseudonymize(&identifier.to_string(), purpose)?)
                }
                None => None,
            };
            Ok(match token {
                Some(token) => record.with(field, token),
                None => record,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    #[googletest::test]
    fn pseudonyms_are_deterministic_per_purpose() {
        let pseudonymizer = Pseudonymizer::new();
        let first = pseudonymizer.pseudonymize("user123", "analytics").unwrap();
        let second = pseudonymizer.pseudonymize("user123", "analytics").unwrap();
        let marketing = pseudonymizer.pseudonymize("user123", "marketing").unwrap();

        assert_that!(first, eq(second));
        assert_that!(first, not(eq(marketing)));
        assert_that!(pseudonymizer.salt_store().len(), eq(2));
    }

    #[googletest::test]
    fn pseudonyms_have_fixed_shape() {
        let token = Pseudonymizer::new().pseudonymize("user123", "analytics").unwrap();

        assert_that!(token, starts_with(PSEUDONYM_PREFIX));
        assert_that!(token.len(), eq(PSEUDONYM_PREFIX.len() + PSEUDONYM_HEX_LENGTH));
        assert!(token[PSEUDONYM_PREFIX.len()..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_that!(token.contains("user123"), eq(false));
    }

    #[googletest::test]
    fn distinct_identifiers_get_distinct_pseudonyms() {
        let pseudonymizer = Pseudonymizer::new();
        let a = pseudonymizer.pseudonymize("alice", "analytics").unwrap();
        let b = pseudonymizer.pseudonymize("bob", "analytics").unwrap();
        assert_that!(a, not(eq(b)));
    }

    #[googletest::test]
    fn independent_stores_do_not_link() {
        let a = Pseudonymizer::new().pseudonymize("user123", "analytics").unwrap();
        let b = Pseudonymizer::new().pseudonymize("user123", "analytics").unwrap();
        assert_that!(a, not(eq(b)));
    }

    #[googletest::test]
    fn clones_share_salts() {
        let pseudonymizer = Pseudonymizer::new();
        let clone = pseudonymizer.clone();
        assert_that!(
            pseudonymizer.pseudonymize("user123", "analytics").unwrap(),
            eq(clone.pseudonymize("user123", "analytics").unwrap())
        );
    }

    #[googletest::test]
    fn pseudonymizers_on_one_salt_store_agree() {
        let salts = Arc::new(SaltStore::new());
        let analytics = Pseudonymizer::with_salt_store(Arc::clone(&salts));
        let reporting = Pseudonymizer::with_salt_store(Arc::clone(&salts));

        assert_that!(
            analytics.pseudonymize("user123", "analytics").unwrap(),
            eq(reporting.pseudonymize("user123", "analytics").unwrap())
        );
        assert_that!(salts.contains("analytics"), eq(true));
        assert_that!(salts.len(), eq(1));
    }

    #[googletest::test]
    fn rejects_empty_arguments() {
        let pseudonymizer = Pseudonymizer::new();
        assert!(matches!(pseudonymizer.pseudonymize("", "analytics"), Err(Error::InvalidInput(_))));
        assert!(matches!(pseudonymizer.pseudonymize("user123", ""), Err(Error::InvalidInput(_))));
        assert_that!(pseudonymizer.salt_store().is_empty(), eq(true));
    }

    #[googletest::test]
    fn concurrent_first_use_creates_one_salt() {
        let pseudonymizer = Pseudonymizer::new();
        let tokens: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let pseudonymizer = pseudonymizer.clone();
                    scope.spawn(move || pseudonymizer.pseudonymize("user123", "analytics").unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_that!(pseudonymizer.salt_store().len(), eq(1));
        assert!(tokens.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[googletest::test]
    fn pseudonymizes_selected_fields_only() {
        let pseudonymizer = Pseudonymizer::new();
        let record =
            Record::new().with("email", "a@example.com").with("member", 42).with("age", 30);
        let released = pseudonymizer
            .pseudonymize_fields(&record, &["email", "member", "phone"], "research")
            .unwrap();

        assert_that!(
            released.get("email"),
            some(eq(&Value::Str(pseudonymizer.pseudonymize("a@example.com", "research").unwrap())))
        );
        assert_that!(
            released.get("member"),
            some(eq(&Value::Str(pseudonymizer.pseudonymize("42", "research").unwrap())))
        );
        assert_that!(released.get("age"), some(eq(&Value::Int(30))));
        assert_that!(released.contains("phone"), eq(false));
        assert_that!(record.get("email"), some(eq(&Value::from("a@example.com"))));
    }
}
