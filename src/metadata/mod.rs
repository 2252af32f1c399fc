//! Store Metadata and the persistence envelope
//!
//! Every persisted unit is stamped with identity, schema version, shape and
//! timestamps. A loader validates the discriminator and version before any
//! migration runs.

mod envelope;
mod errors;
mod types;

pub use envelope::{envelope_document, RawEnvelope, ENVELOPE_CLASS};
pub use errors::{EnvelopeError, EnvelopeResult};
pub use types::{StorageKey, StoreMetadata, StoreShape};
