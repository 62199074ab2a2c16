use std::sync::Arc;

use actix_web::web;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde_json::Value;

use crate::error::Error;
use crate::validation::Fields;

/// One-way transform applied to secret fields before they reach the store.
pub trait SecretHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, Error>;
}

/// Argon2id with a configurable iteration count and a fresh random salt per
/// call. Produces PHC strings (`$argon2id$v=19$...`).
#[derive(Clone, Debug)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub const MAX_ITERATIONS: u32 = 16;

    pub fn new(iterations: u32) -> Result<Argon2Hasher, Error> {
        let iterations = iterations.clamp(1, Self::MAX_ITERATIONS);
        let params = Params::new(
            Params::DEFAULT_M_COST,
            iterations,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|err| Error::InvalidConfiguration(err.to_string()))?;

        Ok(Argon2Hasher { params })
    }
}

impl SecretHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, Error> {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt =
            SaltString::encode_b64(&salt).map_err(|err| Error::FailedToHashSecret(err.to_string()))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let hash = argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|err| Error::FailedToHashSecret(err.to_string()))?;

        Ok(hash.to_string())
    }
}

/// The fields of a resource that are derived from the input instead of
/// stored verbatim, each paired with the transform that derives them.
#[derive(Clone, Default)]
pub struct TransformRegistry {
    entries: Vec<(&'static str, Arc<dyn SecretHasher>)>,
}

impl TransformRegistry {
    pub fn empty() -> TransformRegistry {
        TransformRegistry { entries: vec![] }
    }

    pub fn with(mut self, column: &'static str, transform: Arc<dyn SecretHasher>) -> Self {
        self.entries.push((column, transform));
        self
    }

    /// Replaces each registered column that is present in `fields` with its
    /// transformed value. Absent columns stay absent.
    ///
    /// Hashing is CPU and memory heavy, so it runs on the blocking pool and
    /// never on the worker serving the request.
    pub async fn apply(&self, mut fields: Fields) -> Result<Fields, Error> {
        if !self
            .entries
            .iter()
            .any(|(column, _)| fields.contains_key(*column))
        {
            return Ok(fields);
        }

        let registry = self.clone();
        web::block(move || -> Result<Fields, Error> {
            registry.transform(&mut fields)?;
            Ok(fields)
        })
        .await
        .map_err(|err| Error::FailedToHashSecret(err.to_string()))?
    }

    fn transform(&self, fields: &mut Fields) -> Result<(), Error> {
        for (column, transform) in &self.entries {
            let transformed = match fields.get(*column) {
                Some(Value::String(plaintext)) => transform.hash(plaintext)?,
                Some(_) => {
                    return Err(Error::ExistentialState(format!(
                        "secret column {} is not a string",
                        column
                    )))
                }
                None => continue,
            };
            fields.insert(column.to_string(), Value::String(transformed));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};

    use argon2::password_hash::{PasswordHash, PasswordVerifier};
    use serde_json::json;

    use super::*;

    struct Reverse;

    impl SecretHasher for Reverse {
        fn hash(&self, plaintext: &str) -> Result<String, Error> {
            Ok(plaintext.chars().rev().collect())
        }
    }

    #[test]
    fn argon2_output_verifies_and_differs_from_input() {
        let hasher = Argon2Hasher::new(1).unwrap();
        let hash = hasher.hash("secret123").unwrap();

        assert_ne!(hash, "secret123");
        assert!(hash.starts_with("$argon2id$"));
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default()
            .verify_password(b"secret123", &parsed)
            .is_ok());
    }

    #[test]
    fn argon2_salts_every_hash() {
        let hasher = Argon2Hasher::new(1).unwrap();

        assert_ne!(
            hasher.hash("1234567890").unwrap(),
            hasher.hash("1234567890").unwrap()
        );
    }

    struct ThreadRecorder {
        seen: Mutex<Vec<ThreadId>>,
    }

    impl SecretHasher for ThreadRecorder {
        fn hash(&self, plaintext: &str) -> Result<String, Error> {
            self.seen.lock().unwrap().push(thread::current().id());
            Ok(plaintext.to_uppercase())
        }
    }

    #[tokio::test]
    async fn registry_only_touches_present_columns() {
        let reverse: Arc<dyn SecretHasher> = Arc::new(Reverse);
        let registry = TransformRegistry::empty()
            .with("mobile", Arc::clone(&reverse))
            .with("password", reverse);
        let fields = json!({ "name": "Acme", "password": "abc" })
            .as_object()
            .cloned()
            .unwrap();

        let fields = registry.apply(fields).await.unwrap();

        assert_eq!(fields["password"], "cba");
        assert_eq!(fields["name"], "Acme");
        assert!(!fields.contains_key("mobile"));
    }

    #[tokio::test]
    async fn registry_hashes_off_the_calling_thread() {
        let recorder = Arc::new(ThreadRecorder {
            seen: Mutex::new(vec![]),
        });
        let registry = TransformRegistry::empty().with("password", recorder.clone());
        let fields = json!({ "password": "abc" }).as_object().cloned().unwrap();

        let fields = registry.apply(fields).await.unwrap();

        assert_eq!(fields["password"], "ABC");
        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_ne!(seen[0], thread::current().id());
    }

    #[tokio::test]
    async fn registry_skips_the_pool_when_nothing_is_secret() {
        let recorder = Arc::new(ThreadRecorder {
            seen: Mutex::new(vec![]),
        });
        let registry = TransformRegistry::empty().with("password", recorder.clone());
        let fields = json!({ "name": "Acme" }).as_object().cloned().unwrap();

        let fields = registry.apply(fields).await.unwrap();

        assert_eq!(fields["name"], "Acme");
        assert!(recorder.seen.lock().unwrap().is_empty());
    }
}
