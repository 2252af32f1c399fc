//! Converter trait, scoping and the per-store converter registry

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::errors::CodecResult;
use crate::document::{Document, DocumentPath};

/// Rewrites record documents on their way to and from storage.
///
/// `encode` runs after serde serialization, `decode` runs after migration
/// and before typed binding. Both see one record at a time.
pub trait Converter: Send + Sync + fmt::Debug {
    /// Stable name, used to match override entries.
    fn name(&self) -> &'static str;

    fn encode(&self, node: &mut Document) -> CodecResult<()>;

    fn decode(&self, node: &mut Document) -> CodecResult<()>;
}

/// Where a converter applies inside each record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConverterScope {
    /// The whole record document
    Record,
    /// Nodes reached by a path inside the record
    Path(DocumentPath),
}

impl ConverterScope {
    fn path(&self) -> DocumentPath {
        match self {
            ConverterScope::Record => DocumentPath::root(),
            ConverterScope::Path(path) => path.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct ScopedConverter {
    scope: ConverterScope,
    converter: Arc<dyn Converter>,
}

impl ScopedConverter {
    fn same_slot(&self, other: &ScopedConverter) -> bool {
        self.scope == other.scope && self.converter.name() == other.converter.name()
    }
}

/// Ordered list of scoped converters.
///
/// Encoding applies converters in registration order; decoding applies
/// them in reverse.
#[derive(Debug, Clone, Default)]
pub struct ConverterSet {
    entries: Vec<ScopedConverter>,
}

impl ConverterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, scope: ConverterScope, converter: impl Converter + 'static) -> Self {
        self.push(scope, Arc::new(converter));
        self
    }

    pub fn push(&mut self, scope: ConverterScope, converter: Arc<dyn Converter>) {
        self.entries.push(ScopedConverter { scope, converter });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layers `overrides` on top of `self`; an override in the same scope
    /// with the same converter name replaces the existing entry.
    pub fn merged_with(&self, overrides: &ConverterSet) -> ConverterSet {
        let mut merged = self.clone();
        for entry in &overrides.entries {
            match merged.entries.iter_mut().find(|e| e.same_slot(entry)) {
                Some(existing) => *existing = entry.clone(),
                None => merged.entries.push(entry.clone()),
            }
        }
        merged
    }

    pub fn encode_record(&self, record: &mut Document) -> CodecResult<()> {
        for entry in &self.entries {
            let converter = &entry.converter;
            entry
                .scope
                .path()
                .visit_mut(record, &mut |node: &mut Document| converter.encode(node))?;
        }
        Ok(())
    }

    pub fn decode_record(&self, record: &mut Document) -> CodecResult<()> {
        for entry in self.entries.iter().rev() {
            let converter = &entry.converter;
            entry
                .scope
                .path()
                .visit_mut(record, &mut |node: &mut Document| converter.decode(node))?;
        }
        Ok(())
    }
}

/// Store-wide default converters plus per-uid overrides.
#[derive(Debug, Clone, Default)]
pub struct ConverterRegistry {
    defaults: ConverterSet,
    per_store: HashMap<String, ConverterSet>,
}

impl ConverterRegistry {
    pub fn new(defaults: ConverterSet) -> Self {
        Self {
            defaults,
            per_store: HashMap::new(),
        }
    }

    pub fn defaults(&self) -> &ConverterSet {
        &self.defaults
    }

    pub fn set_defaults(&mut self, defaults: ConverterSet) {
        self.defaults = defaults;
    }

    /// Installs converters for one store, layered over the defaults.
    pub fn configure(&mut self, uid: impl Into<String>, converters: ConverterSet) {
        self.per_store.insert(uid.into(), converters);
    }

    /// Effective converters for a store.
    pub fn for_uid(&self, uid: &str) -> ConverterSet {
        match self.per_store.get(uid) {
            Some(overrides) => self.defaults.merged_with(overrides),
            None => self.defaults.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::errors::CodecError;
    use serde_json::json;

    /// Appends a marker to every string on encode and strips it on decode.
    #[derive(Debug)]
    struct Suffix(&'static str);

    impl Converter for Suffix {
        fn name(&self) -> &'static str {
            "suffix"
        }

        fn encode(&self, node: &mut Document) -> CodecResult<()> {
            if let Document::String(s) = node {
                s.push_str(self.0);
            }
            Ok(())
        }

        fn decode(&self, node: &mut Document) -> CodecResult<()> {
            if let Document::String(s) = node {
                let stripped = s
                    .strip_suffix(self.0)
                    .ok_or_else(|| CodecError::conversion("suffix", s.clone(), "missing suffix"))?;
                *s = stripped.to_string();
            }
            Ok(())
        }
    }

    fn path(raw: &str) -> ConverterScope {
        ConverterScope::Path(DocumentPath::parse(raw).unwrap())
    }

    #[test]
    fn test_path_scoped_encode_decode() {
        let set = ConverterSet::new().with(path("name"), Suffix("!"));
        let mut doc = Document::from(json!({"name": "ada", "other": "x"}));

        set.encode_record(&mut doc).unwrap();
        assert_eq!(doc, Document::from(json!({"name": "ada!", "other": "x"})));

        set.decode_record(&mut doc).unwrap();
        assert_eq!(doc, Document::from(json!({"name": "ada", "other": "x"})));
    }

    #[test]
    fn test_decode_failure_propagates() {
        let set = ConverterSet::new().with(path("name"), Suffix("!"));
        let mut doc = Document::from(json!({"name": "ada"}));
        assert!(matches!(
            set.decode_record(&mut doc),
            Err(CodecError::Conversion { .. })
        ));
    }

    #[test]
    fn test_registry_overrides_replace_same_slot() {
        let defaults = ConverterSet::new()
            .with(path("name"), Suffix("!"))
            .with(path("tags[]"), Suffix("?"));
        let mut registry = ConverterRegistry::new(defaults);
        registry.configure("special", ConverterSet::new().with(path("name"), Suffix("#")));

        assert_eq!(registry.for_uid("plain").len(), 2);
        let special = registry.for_uid("special");
        assert_eq!(special.len(), 2);

        let mut doc = Document::from(json!({"name": "ada", "tags": ["t"]}));
        special.encode_record(&mut doc).unwrap();
        assert_eq!(doc, Document::from(json!({"name": "ada#", "tags": ["t?"]})));
    }

    #[test]
    fn test_record_scope_sees_whole_record() {
        let set = ConverterSet::new().with(ConverterScope::Record, Suffix("!"));
        let mut doc = Document::from("bare");
        set.encode_record(&mut doc).unwrap();
        assert_eq!(doc.as_str(), Some("bare!"));
    }
}
