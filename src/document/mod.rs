//! Generic Document Model for stashdb
//!
//! Every payload loaded from storage is first parsed into a `Document`,
//! a closed set of JSON shapes, so that migration handlers can rewrite
//! fields before anything is bound to a typed record.
//!
//! # Design Principles
//!
//! - Closed shape set (null, bool, number, string, sequence, mapping)
//! - Mapping key order is preserved across parse and render
//! - Never retained after typed binding

mod errors;
mod map;
mod path;
mod value;

pub use errors::{DocumentError, DocumentResult};
pub use map::DocumentMap;
pub use path::DocumentPath;
pub use value::Document;
