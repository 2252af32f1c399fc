//! Type Codec for stashdb
//!
//! Binds documents to typed records and back, with pluggable converters
//! scoped per record or per field path and configurable per store.
//!
//! # Design Principles
//!
//! - Text is always parsed into a `Document` first, never straight into records
//! - Converters run on documents, so serde derives stay untouched
//! - Stateless built-in converters, no per-thread formatter caches

mod canonical;
mod converter;
mod datetime;
mod errors;
mod type_codec;

pub use canonical::StringCanonicalizer;
pub use converter::{Converter, ConverterRegistry, ConverterScope, ConverterSet};
pub use datetime::DateTimeConverter;
pub use errors::{CodecError, CodecResult};
pub use type_codec::TypeCodec;
