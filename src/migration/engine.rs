//! Forward-only version walk over an untyped payload
//!
//! Rules:
//! - absent payload or unknown version: nothing to do
//! - stored version newer than target: VersionInversion, payload untouched
//! - equal versions: nothing to do
//! - otherwise every handler keyed in `[stored, target)` runs once, ascending
//!
//! Collection payloads are sequences; each handler is applied to every
//! element before the next version starts.

use tracing::{debug, error, info};

use super::errors::{MigrationError, MigrationResult};
use super::handler::MigrationTable;
use crate::document::Document;
use crate::metadata::StoreShape;

/// Identifies the store being migrated, for error context and logs.
#[derive(Debug, Clone, Copy)]
pub struct MigrationContext<'a> {
    pub uid: &'a str,
    pub shape: StoreShape,
}

impl<'a> MigrationContext<'a> {
    pub fn new(uid: &'a str, shape: StoreShape) -> Self {
        Self { uid, shape }
    }
}

/// What a migration run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Source versions of the handlers that ran, in order
    pub applied: Vec<u32>,
}

impl MigrationOutcome {
    pub fn migrated(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Migrates `payload` from `source_version` up to `target_version`.
///
/// The document may be partially rewritten when an error is returned;
/// callers must discard it.
pub fn migrate(
    ctx: MigrationContext<'_>,
    target_version: u32,
    table: &MigrationTable,
    payload: Option<&mut Document>,
    source_version: Option<u32>,
) -> MigrationResult<MigrationOutcome> {
    let (Some(payload), Some(source)) = (payload, source_version) else {
        return Ok(MigrationOutcome::default());
    };

    if source > target_version {
        error!(
            uid = ctx.uid,
            stored = source,
            current = target_version,
            "Stored payload is newer than running code"
        );
        return Err(MigrationError::VersionInversion {
            uid: ctx.uid.to_string(),
            stored: source,
            current: target_version,
        });
    }

    if source == target_version || payload.is_null() {
        return Ok(MigrationOutcome::default());
    }

    if ctx.shape == StoreShape::Collection && payload.as_sequence().is_none() {
        return Err(MigrationError::PayloadShape {
            uid: ctx.uid.to_string(),
            found: payload.type_name(),
        });
    }

    let mut outcome = MigrationOutcome::default();

    for handler in table.range(source, target_version) {
        let version = handler.source_version();
        debug!(uid = ctx.uid, version, "Applying migration handler");

        if ctx.shape == StoreShape::Collection {
            let items = payload.as_sequence_mut().ok_or(MigrationError::PayloadShape {
                uid: ctx.uid.to_string(),
                found: "non-sequence",
            })?;
            for (idx, item) in items.iter_mut().enumerate() {
                handler.apply(item).map_err(|source| {
                    error!(uid = ctx.uid, version, element = idx, error = %source, "Migration handler failed");
                    MigrationError::Failed {
                        uid: ctx.uid.to_string(),
                        version,
                        element: Some(idx),
                        source,
                    }
                })?;
            }
        } else {
            handler.apply(payload).map_err(|source| {
                error!(uid = ctx.uid, version, error = %source, "Migration handler failed");
                MigrationError::Failed {
                    uid: ctx.uid.to_string(),
                    version,
                    element: None,
                    source,
                }
            })?;
        }

        outcome.applied.push(version);
    }

    if outcome.migrated() {
        info!(
            uid = ctx.uid,
            from = source,
            to = target_version,
            handlers = outcome.applied.len(),
            "Payload migrated"
        );
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::MigrationStepError;
    use serde_json::json;

    fn bump_counter(doc: &mut Document) -> Result<(), MigrationStepError> {
        let n = doc.field("n").ok().and_then(Document::as_i64).unwrap_or(0);
        doc.set_field("n", n + 1)?;
        Ok(())
    }

    fn counting_table(versions: &[u32]) -> MigrationTable {
        let mut table = MigrationTable::new();
        for &v in versions {
            table.register(v, bump_counter).unwrap();
        }
        table
    }

    const COLLECTION: MigrationContext<'static> = MigrationContext {
        uid: "test",
        shape: StoreShape::Collection,
    };
    const SINGLETON: MigrationContext<'static> = MigrationContext {
        uid: "test",
        shape: StoreShape::Singleton,
    };

    #[test]
    fn test_absent_payload_is_noop() {
        let table = counting_table(&[0]);
        let outcome = migrate(COLLECTION, 1, &table, None, Some(0)).unwrap();
        assert!(!outcome.migrated());
    }

    #[test]
    fn test_unknown_version_is_noop() {
        let table = counting_table(&[0]);
        let mut doc = Document::from(json!([{}]));
        let outcome = migrate(COLLECTION, 1, &table, Some(&mut doc), None).unwrap();
        assert!(!outcome.migrated());
        assert_eq!(doc, Document::from(json!([{}])));
    }

    #[test]
    fn test_equal_versions_is_noop() {
        let table = counting_table(&[0, 1, 2]);
        let mut doc = Document::from(json!({"n": 0}));
        let outcome = migrate(SINGLETON, 2, &table, Some(&mut doc), Some(2)).unwrap();
        assert!(!outcome.migrated());
        assert_eq!(doc.require_i64("n").unwrap(), 0);
    }

    #[test]
    fn test_inversion_fails_without_mutation() {
        let table = counting_table(&[0, 1, 2]);
        let mut doc = Document::from(json!({"n": 0}));
        let err = migrate(SINGLETON, 1, &table, Some(&mut doc), Some(2)).unwrap_err();
        assert!(matches!(
            err,
            MigrationError::VersionInversion { stored: 2, current: 1, .. }
        ));
        assert_eq!(doc.require_i64("n").unwrap(), 0);
    }

    #[test]
    fn test_singleton_handlers_run_once_each() {
        let table = counting_table(&[0, 1, 2, 3]);
        let mut doc = Document::from(json!({"n": 0}));
        let outcome = migrate(SINGLETON, 3, &table, Some(&mut doc), Some(1)).unwrap();
        assert_eq!(outcome.applied, vec![1, 2]);
        assert_eq!(doc.require_i64("n").unwrap(), 2);
    }

    #[test]
    fn test_collection_handlers_run_per_element() {
        let table = counting_table(&[0, 1]);
        let mut doc = Document::from(json!([{"n": 0}, {"n": 10}]));
        let outcome = migrate(COLLECTION, 2, &table, Some(&mut doc), Some(0)).unwrap();
        assert_eq!(outcome.applied, vec![0, 1]);
        assert_eq!(doc, Document::from(json!([{"n": 2}, {"n": 12}])));
    }

    #[test]
    fn test_missing_intermediate_handlers_skipped() {
        let table = counting_table(&[0, 4]);
        let mut doc = Document::from(json!({"n": 0}));
        let outcome = migrate(SINGLETON, 6, &table, Some(&mut doc), Some(0)).unwrap();
        assert_eq!(outcome.applied, vec![0, 4]);
    }

    #[test]
    fn test_gaps_only_is_not_migrated() {
        let table = counting_table(&[5]);
        let mut doc = Document::from(json!({"n": 0}));
        let outcome = migrate(SINGLETON, 3, &table, Some(&mut doc), Some(0)).unwrap();
        assert!(!outcome.migrated());
    }

    #[test]
    fn test_null_singleton_is_noop() {
        let table = counting_table(&[0]);
        let mut doc = Document::Null;
        let outcome = migrate(SINGLETON, 1, &table, Some(&mut doc), Some(0)).unwrap();
        assert!(!outcome.migrated());
        assert!(doc.is_null());
    }

    #[test]
    fn test_collection_payload_must_be_sequence() {
        let table = counting_table(&[0]);
        let mut doc = Document::from(json!({"n": 0}));
        let err = migrate(COLLECTION, 1, &table, Some(&mut doc), Some(0)).unwrap_err();
        assert!(matches!(err, MigrationError::PayloadShape { found: "mapping", .. }));
    }

    #[test]
    fn test_handler_failure_is_wrapped() {
        let mut table = MigrationTable::new();
        table.register(0, bump_counter).unwrap();
        table
            .register(1, |doc| {
                doc.require_str("missing")?;
                Ok(())
            })
            .unwrap();

        let mut doc = Document::from(json!([{"n": 0}]));
        let err = migrate(COLLECTION, 2, &table, Some(&mut doc), Some(0)).unwrap_err();
        match err {
            MigrationError::Failed { uid, version, element, .. } => {
                assert_eq!(uid, "test");
                assert_eq!(version, 1);
                assert_eq!(element, Some(0));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
