//! Shape-independent store machinery: the load pipeline and the single
//! write funnel used by both store variants.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::errors::{StoreError, StoreResult};
use super::options::StoreOptions;
use crate::codec::{CodecResult, TypeCodec};
use crate::document::Document;
use crate::metadata::{StorageKey, StoreMetadata, StoreShape};
use crate::migration::{migrate, MigrationContext, MigrationTable};
use crate::storage::StorageService;

/// A payload that survived the load pipeline.
#[derive(Debug)]
pub(crate) struct LoadedPayload<P> {
    pub payload: P,
    pub source_version: u32,
    pub migrated: bool,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

/// Result of running the load pipeline.
pub(crate) enum Pipeline<P> {
    Empty,
    Skipped(StoreError),
    Loaded(LoadedPayload<P>),
}

#[derive(Debug)]
pub(crate) struct StoreCore {
    pub uid: String,
    pub version: u32,
    pub shape: StoreShape,
    pub storage: Arc<dyn StorageService>,
    pub codec: TypeCodec,
    pub migrations: MigrationTable,
    pub options: StoreOptions,
}

impl StoreCore {
    pub fn key(&self) -> StorageKey {
        StorageKey::new(self.uid.clone(), self.shape)
    }

    /// storage -> envelope -> migration -> typed binding
    ///
    /// Only version inversion and handler failures are returned as `Err`.
    pub fn load_with<P>(
        &self,
        decode: impl FnOnce(&TypeCodec, Document) -> CodecResult<P>,
    ) -> StoreResult<Pipeline<P>> {
        let key = self.key();

        let text = match self.storage.read(&key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!(uid = %self.uid, "No stored content");
                return Ok(Pipeline::Empty);
            }
            Err(source) => {
                return Ok(self.skip(StoreError::Storage {
                    uid: self.uid.clone(),
                    source,
                }))
            }
        };

        let mut raw = match self
            .codec
            .decode_envelope(&text)
            .and_then(|raw| raw.check_shape(self.shape).map(|()| raw))
        {
            Ok(raw) => raw,
            Err(source) => {
                return Ok(self.skip(StoreError::CorruptEnvelope {
                    uid: self.uid.clone(),
                    source,
                }))
            }
        };

        if let Some(stored_uid) = raw.uid.as_deref().filter(|u| *u != self.uid) {
            warn!(uid = %self.uid, stored_uid, "Envelope uid differs from store uid");
        }

        let source_version = raw.payload_type_version;
        let outcome = migrate(
            MigrationContext::new(&self.uid, self.shape),
            self.version,
            &self.migrations,
            Some(&mut raw.payload),
            Some(source_version),
        );

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                let err = StoreError::from_migration(&self.uid, err);
                if err.is_fatal() {
                    return Err(err);
                }
                return Ok(self.skip(err));
            }
        };

        let payload = match decode(&self.codec, raw.payload) {
            Ok(payload) => payload,
            Err(source) => {
                return Ok(self.skip(StoreError::Deserialization {
                    uid: self.uid.clone(),
                    source,
                }))
            }
        };

        debug!(
            uid = %self.uid,
            version = source_version,
            migrated = outcome.migrated(),
            "Payload loaded"
        );

        Ok(Pipeline::Loaded(LoadedPayload {
            payload,
            source_version,
            migrated: outcome.migrated(),
            created: raw.created,
            modified: raw.modified,
        }))
    }

    fn skip<P>(&self, err: StoreError) -> Pipeline<P> {
        warn!(uid = %self.uid, code = err.code(), error = %error_chain(&err), "Load discarded stored content");
        Pipeline::Skipped(err)
    }

    /// Renders and writes the envelope; stamps `modified` on success.
    pub fn write<M>(
        &self,
        meta: &mut StoreMetadata<M>,
        encode: impl FnOnce(&TypeCodec, Option<&M>) -> CodecResult<Document>,
    ) -> StoreResult<()> {
        let serialization = |source| StoreError::Serialization {
            uid: self.uid.clone(),
            source,
        };

        let payload = encode(&self.codec, meta.payload()).map_err(serialization)?;

        // `modified` is written as the time of this persist.
        let previous = meta.modified();
        let now = Utc::now();
        meta.touch(now);

        let text = match self.codec.encode_envelope(meta, payload) {
            Ok(text) => text,
            Err(source) => {
                meta.restore_timestamps(None, previous);
                return Err(serialization(source));
            }
        };

        if let Err(source) = self.storage.write(&self.key(), &text) {
            meta.restore_timestamps(None, previous);
            return Err(StoreError::Storage {
                uid: self.uid.clone(),
                source,
            });
        }

        debug!(uid = %self.uid, bytes = text.len(), "Store persisted");
        Ok(())
    }

    pub fn delete(&self) -> StoreResult<()> {
        self.storage
            .delete(&self.key())
            .map_err(|source| StoreError::Storage {
                uid: self.uid.clone(),
                source,
            })
    }

    pub fn size_on_disk(&self) -> StoreResult<u64> {
        self.storage
            .size(&self.key())
            .map_err(|source| StoreError::Storage {
                uid: self.uid.clone(),
                source,
            })
    }
}

/// Renders an error with its source chain for log lines.
pub(crate) fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
