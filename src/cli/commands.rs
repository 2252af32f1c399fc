//! CLI command implementations
//!
//! Commands only read store files; they never load a store, run
//! migrations or write anything.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tracing::debug;

use crate::config::StashConfig;
use crate::document::Document;
use crate::metadata::{RawEnvelope, StoreShape, ENVELOPE_CLASS};

use super::args::Command;
use super::errors::CliResult;
use super::io::write_response;

/// Parse args and run the command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Inspect { file } => write_response(inspect(&file)?),
        Command::List { config } => write_response(list(&config)?),
    }
}

/// Describes one persisted envelope.
pub fn inspect(file: &Path) -> CliResult<Value> {
    let text = fs::read_to_string(file)?;
    let raw = RawEnvelope::parse(&text)?;
    debug!(file = %file.display(), "Envelope inspected");
    Ok(describe(&raw))
}

/// Lists every store file under the configured base directory.
///
/// Files that fail to decode are listed with their error code instead of
/// aborting the listing.
pub fn list(config_path: &Path) -> CliResult<Value> {
    let config = StashConfig::load(config_path)?;
    let base = config.base_path();

    let mut names: Vec<String> = Vec::new();
    if base.exists() {
        for entry in fs::read_dir(base)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_store_file(&name) {
                names.push(name);
            }
        }
    }
    names.sort();

    let mut stores = Vec::with_capacity(names.len());
    for name in names {
        let text = fs::read_to_string(base.join(&name))?;
        let entry = match RawEnvelope::parse(&text) {
            Ok(raw) => json!({
                "file": name,
                "uid": raw.uid,
                "payloadTypeVersion": raw.payload_type_version,
                "shape": shape_of(&raw).as_str(),
            }),
            Err(err) => json!({
                "file": name,
                "error": err.to_string(),
            }),
        };
        stores.push(entry);
    }

    Ok(json!({
        "baseDir": base.display().to_string(),
        "stores": stores,
    }))
}

fn is_store_file(name: &str) -> bool {
    name.starts_with("storage.") && name.ends_with(".json")
}

/// Header fields plus the element count of the payload.
fn describe(raw: &RawEnvelope) -> Value {
    let elements = match &raw.payload {
        Document::Null => 0,
        Document::Sequence(items) => items.len(),
        _ => 1,
    };
    json!({
        "class": ENVELOPE_CLASS,
        "uid": raw.uid,
        "payloadTypeVersion": raw.payload_type_version,
        "shape": shape_of(raw).as_str(),
        "created": raw.created.map(|t| t.to_rfc3339()),
        "modified": raw.modified.map(|t| t.to_rfc3339()),
        "elements": elements,
    })
}

/// Shape from the singleton flag, else inferred from the payload.
fn shape_of(raw: &RawEnvelope) -> StoreShape {
    match raw.singleton {
        Some(flag) => StoreShape::from_singleton_flag(flag),
        None if raw.payload.as_sequence().is_some() => StoreShape::Collection,
        None => StoreShape::Singleton,
    }
}
