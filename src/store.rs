//! Content-addressed mapping store.
//!
//! Every [`SefRecord`] is serialized once and written under the SHA-256
//! hash of its SEF path; when the canonical path hashes differently, an
//! identical copy is written under that hash too. Either path therefore
//! looks the record up directly, with no secondary index and no scan.
//!
//! The hash is purely a storage key. It is never reversed and carries no
//! secrecy requirement; collision resistance is what matters.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;

use crate::medium::StorageMedium;
use crate::models::SefRecord;

/// Faults surfaced by the mapping store.
///
/// A lookup miss is `Ok(None)` from [`MappingStore::get`], never an error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persistence medium failed to read an entry.
    #[error("failed to read record at key {key}: {cause}")]
    Read { key: String, cause: anyhow::Error },

    /// The persistence medium rejected a write.
    #[error("failed to write record at key {key}: {cause}")]
    Write { key: String, cause: anyhow::Error },

    /// A stored entry exists but does not decode as a record.
    #[error("stored record at key {key} is corrupt")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable, content-addressed storage of [`SefRecord`]s.
pub struct MappingStore {
    medium: Arc<dyn StorageMedium>,
}

impl MappingStore {
    pub fn new(medium: Arc<dyn StorageMedium>) -> Self {
        Self { medium }
    }

    /// Storage key for a site-relative path: lowercase-hex SHA-256 of its
    /// UTF-8 bytes.
    pub fn path_key(path: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(path.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Persist `record` under the hashes of both of its paths.
    ///
    /// Exactly two writes when the hashes differ, one when the canonical
    /// and SEF paths coincide. Existing values are overwritten; last
    /// writer wins.
    pub async fn put(&self, record: &SefRecord) -> Result<(), StoreError> {
        let sef_key = Self::path_key(&record.sef_path);
        let canonical_key = Self::path_key(&record.path);

        let body = serde_json::to_vec(record).map_err(|e| StoreError::Write {
            key: sef_key.clone(),
            cause: e.into(),
        })?;

        self.medium
            .write(&sef_key, &body)
            .await
            .map_err(|e| StoreError::Write {
                key: sef_key.clone(),
                cause: e,
            })?;

        if canonical_key != sef_key {
            self.medium
                .write(&canonical_key, &body)
                .await
                .map_err(|e| StoreError::Write {
                    key: canonical_key.clone(),
                    cause: e,
                })?;
        }

        tracing::debug!(path = %record.path, sef_path = %record.sef_path, "stored record");
        Ok(())
    }

    /// Look up the record stored under `path`'s hash.
    pub async fn get(&self, path: &str) -> Result<Option<SefRecord>, StoreError> {
        let key = Self::path_key(path);

        let bytes = self
            .medium
            .read(&key)
            .await
            .map_err(|e| StoreError::Read {
                key: key.clone(),
                cause: e,
            })?;

        let Some(bytes) = bytes else {
            return Ok(None);
        };

        let record =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt { key, source: e })?;
        Ok(Some(record))
    }

    /// Whether a record is stored under `path`'s hash.
    #[allow(dead_code)]
    pub async fn contains(&self, path: &str) -> Result<bool, StoreError> {
        let key = Self::path_key(path);
        self.medium
            .exists(&key)
            .await
            .map_err(|e| StoreError::Read { key, cause: e })
    }
}
