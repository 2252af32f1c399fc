//! Typed binding between records and documents
//!
//! Outbound: record -> serde -> Document -> converters -> envelope text.
//! Inbound: envelope text -> Document -> (migration) -> converters -> serde -> record.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::converter::ConverterSet;
use super::errors::{CodecError, CodecResult};
use crate::document::Document;
use crate::metadata::{envelope_document, EnvelopeResult, RawEnvelope, StoreMetadata};

/// Converts between typed records and documents for one store.
#[derive(Debug, Clone, Default)]
pub struct TypeCodec {
    converters: ConverterSet,
    pretty: bool,
}

impl TypeCodec {
    pub fn new(converters: ConverterSet) -> Self {
        Self {
            converters,
            pretty: false,
        }
    }

    /// Emits indented JSON when enabled.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn converters(&self) -> &ConverterSet {
        &self.converters
    }

    /// Serializes one record and applies encode converters.
    pub fn to_document<T: Serialize>(&self, value: &T) -> CodecResult<Document> {
        let value = serde_json::to_value(value).map_err(CodecError::Serialize)?;
        let mut doc = Document::from(value);
        self.converters.encode_record(&mut doc)?;
        Ok(doc)
    }

    /// Applies decode converters to one record and binds it.
    pub fn from_document<T: DeserializeOwned>(&self, mut doc: Document) -> CodecResult<T> {
        self.converters.decode_record(&mut doc)?;
        serde_json::from_value(Value::from(doc)).map_err(CodecError::Deserialize)
    }

    pub fn encode_collection<'a, T, I>(&self, items: I) -> CodecResult<Document>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        items
            .into_iter()
            .map(|item| self.to_document(item))
            .collect::<CodecResult<Vec<_>>>()
            .map(Document::Sequence)
    }

    pub fn decode_collection<T: DeserializeOwned>(&self, payload: Document) -> CodecResult<Vec<T>> {
        match payload {
            Document::Null => Ok(Vec::new()),
            Document::Sequence(items) => items
                .into_iter()
                .map(|item| self.from_document(item))
                .collect(),
            other => Err(CodecError::Shape {
                expected: "sequence",
                found: other.type_name(),
            }),
        }
    }

    pub fn encode_singleton<T: Serialize>(&self, value: Option<&T>) -> CodecResult<Document> {
        match value {
            Some(value) => self.to_document(value),
            None => Ok(Document::Null),
        }
    }

    pub fn decode_singleton<T: DeserializeOwned>(&self, payload: Document) -> CodecResult<Option<T>> {
        if payload.is_null() {
            return Ok(None);
        }
        self.from_document(payload).map(Some)
    }

    /// Wraps an encoded payload in the envelope and renders it.
    pub fn encode_envelope<M>(&self, meta: &StoreMetadata<M>, payload: Document) -> CodecResult<String> {
        let doc = envelope_document(meta, payload);
        if self.pretty {
            Ok(doc.to_json_string_pretty()?)
        } else {
            Ok(doc.to_json_string())
        }
    }

    pub fn decode_envelope(&self, text: &str) -> EnvelopeResult<RawEnvelope> {
        RawEnvelope::parse(text)
    }
}
