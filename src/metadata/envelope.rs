//! Persisted envelope wire format
//!
//! ```json
//! {
//!   "class": "stashdb.StoreMetadata",
//!   "uid": "users",
//!   "payloadTypeVersion": 2,
//!   "singleton": false,
//!   "created": "2024-01-01T00:00:00Z",
//!   "modified": "2024-01-02T00:00:00Z",
//!   "payload": [ ... ]
//! }
//! ```
//!
//! The loader checks `class` and `payloadTypeVersion` before touching the
//! payload.

use chrono::{DateTime, Utc};

use super::errors::{EnvelopeError, EnvelopeResult};
use super::types::{StoreMetadata, StoreShape};
use crate::document::{Document, DocumentMap};

/// Discriminator every stashdb envelope must carry.
pub const ENVELOPE_CLASS: &str = "stashdb.StoreMetadata";

pub const FIELD_CLASS: &str = "class";
pub const FIELD_UID: &str = "uid";
pub const FIELD_VERSION: &str = "payloadTypeVersion";
pub const FIELD_SINGLETON: &str = "singleton";
pub const FIELD_CREATED: &str = "created";
pub const FIELD_MODIFIED: &str = "modified";
pub const FIELD_PAYLOAD: &str = "payload";

/// A decoded envelope whose payload is still untyped.
#[derive(Debug, Clone)]
pub struct RawEnvelope {
    pub uid: Option<String>,
    pub payload_type_version: u32,
    pub singleton: Option<bool>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub payload: Document,
}

impl RawEnvelope {
    /// Parses envelope text and validates the header fields.
    pub fn parse(text: &str) -> EnvelopeResult<Self> {
        Self::from_document(Document::parse(text)?)
    }

    pub fn from_document(doc: Document) -> EnvelopeResult<Self> {
        let found = doc.type_name();
        let Document::Mapping(mut map) = doc else {
            return Err(EnvelopeError::NotAnObject { found });
        };

        match map.get(FIELD_CLASS) {
            None => return Err(EnvelopeError::MissingClass),
            Some(Document::String(class)) if class == ENVELOPE_CLASS => {}
            Some(other) => {
                return Err(EnvelopeError::ClassMismatch {
                    expected: ENVELOPE_CLASS,
                    found: describe(other),
                })
            }
        }

        let payload_type_version = match map.get(FIELD_VERSION) {
            None | Some(Document::Null) => return Err(EnvelopeError::MissingVersion),
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| EnvelopeError::InvalidVersion { found: describe(v) })?,
        };

        let uid = map.get(FIELD_UID).and_then(Document::as_str).map(str::to_string);
        let singleton = map.get(FIELD_SINGLETON).and_then(Document::as_bool);
        let created = timestamp(&map, FIELD_CREATED)?;
        let modified = timestamp(&map, FIELD_MODIFIED)?;
        let payload = map.remove(FIELD_PAYLOAD).unwrap_or(Document::Null);

        Ok(Self {
            uid,
            payload_type_version,
            singleton,
            created,
            modified,
            payload,
        })
    }

    /// Rejects an envelope written by a store of the other shape.
    ///
    /// Envelopes without a `singleton` flag are accepted for either shape.
    pub fn check_shape(&self, expected: StoreShape) -> EnvelopeResult<()> {
        match self.singleton.map(StoreShape::from_singleton_flag) {
            Some(found) if found != expected => Err(EnvelopeError::ShapeMismatch {
                expected: expected.as_str(),
                found: found.as_str(),
            }),
            _ => Ok(()),
        }
    }
}

/// Builds the envelope document for a metadata header and encoded payload.
pub fn envelope_document<T>(meta: &StoreMetadata<T>, payload: Document) -> Document {
    let mut map = DocumentMap::with_capacity(7);
    map.insert(FIELD_CLASS, Document::from(ENVELOPE_CLASS));
    map.insert(FIELD_UID, Document::from(meta.uid()));
    map.insert(FIELD_VERSION, Document::from(u64::from(meta.payload_type_version())));
    map.insert(FIELD_SINGLETON, Document::from(meta.is_singleton()));
    map.insert(FIELD_CREATED, Document::from(meta.created().to_rfc3339()));
    if let Some(modified) = meta.modified() {
        map.insert(FIELD_MODIFIED, Document::from(modified.to_rfc3339()));
    }
    map.insert(FIELD_PAYLOAD, payload);
    Document::Mapping(map)
}

fn timestamp(map: &DocumentMap, field: &'static str) -> EnvelopeResult<Option<DateTime<Utc>>> {
    match map.get(field) {
        None | Some(Document::Null) => Ok(None),
        Some(Document::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|_| EnvelopeError::InvalidTimestamp {
                field,
                value: s.clone(),
            }),
        Some(other) => Err(EnvelopeError::InvalidTimestamp {
            field,
            value: describe(other),
        }),
    }
}

fn describe(doc: &Document) -> String {
    doc.to_json_string()
}
