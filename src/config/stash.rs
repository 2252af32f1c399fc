//! JSON configuration file
//!
//! ```json
//! {
//!   "base_dir": "./data",
//!   "auto_save": true,
//!   "removal_persist": "on_change",
//!   "pretty": false,
//!   "date_format": "%d.%m.%Y %H:%M:%S",
//!   "date_paths": ["createdAt", "events[].at"],
//!   "trim_paths": ["name"],
//!   "stores": { "audit": { "auto_save": false } }
//! }
//! ```
//!
//! Only `base_dir` is required.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::{ConfigError, ConfigResult};
use crate::codec::{
    ConverterRegistry, ConverterScope, ConverterSet, DateTimeConverter, StringCanonicalizer,
    TypeCodec,
};
use crate::document::DocumentPath;
use crate::storage::FileStorage;
use crate::store::{RemovalPersistPolicy, StoreOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StashConfig {
    /// Directory holding every store file (required)
    pub base_dir: PathBuf,

    /// Persist after every mutation (default true)
    #[serde(default = "default_auto_save")]
    pub auto_save: bool,

    #[serde(default)]
    pub removal_persist: RemovalPersistPolicy,

    /// Indented envelope output (default false)
    #[serde(default)]
    pub pretty: bool,

    /// strftime pattern applied at `date_paths`
    #[serde(default)]
    pub date_format: Option<String>,

    #[serde(default)]
    pub date_paths: Vec<String>,

    /// Paths whose string values are trimmed
    #[serde(default)]
    pub trim_paths: Vec<String>,

    /// Per-uid overrides
    #[serde(default)]
    pub stores: BTreeMap<String, StoreOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreOverride {
    #[serde(default)]
    pub auto_save: Option<bool>,
    #[serde(default)]
    pub removal_persist: Option<RemovalPersistPolicy>,
}

fn default_auto_save() -> bool {
    true
}

impl StashConfig {
    /// Configuration with defaults for everything but the base directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            auto_save: default_auto_save(),
            removal_persist: RemovalPersistPolicy::default(),
            pretty: false,
            date_format: None,
            date_paths: Vec::new(),
            trim_paths: Vec::new(),
            stores: BTreeMap::new(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        debug!(path = %path.display(), base_dir = %config.base_dir.display(), "Config loaded");
        Ok(config)
    }

    pub fn from_json(text: &str) -> ConfigResult<Self> {
        let config: StashConfig = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.base_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid("base_dir must not be empty"));
        }

        match &self.date_format {
            Some(pattern) => {
                if DateTimeConverter::try_new(pattern.clone()).is_err() {
                    return Err(ConfigError::invalid(format!(
                        "date_format '{}' is not a valid strftime pattern",
                        pattern
                    )));
                }
                if self.date_paths.is_empty() {
                    return Err(ConfigError::invalid("date_format is set but date_paths is empty"));
                }
            }
            None if !self.date_paths.is_empty() => {
                return Err(ConfigError::invalid("date_paths requires date_format"));
            }
            None => {}
        }

        // Surface path syntax errors at startup rather than on first load.
        self.date_paths
            .iter()
            .chain(&self.trim_paths)
            .try_for_each(|p| parse_path(p).map(|_| ()))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_dir
    }

    pub fn storage(&self) -> FileStorage {
        FileStorage::new(self.base_dir.clone())
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            auto_save: self.auto_save,
            removal_persist: self.removal_persist,
        }
    }

    /// Store options with any per-uid override applied.
    pub fn options_for(&self, uid: &str) -> StoreOptions {
        let mut options = self.store_options();
        if let Some(over) = self.stores.get(uid) {
            if let Some(auto_save) = over.auto_save {
                options.auto_save = auto_save;
            }
            if let Some(policy) = over.removal_persist {
                options.removal_persist = policy;
            }
        }
        options
    }

    /// Builds the store-wide default converters.
    pub fn converters(&self) -> ConfigResult<ConverterRegistry> {
        let mut defaults = ConverterSet::new();
        if let Some(pattern) = &self.date_format {
            for raw in &self.date_paths {
                defaults = defaults.with(
                    ConverterScope::Path(parse_path(raw)?),
                    DateTimeConverter::new(pattern.clone()),
                );
            }
        }
        for raw in &self.trim_paths {
            defaults = defaults.with(
                ConverterScope::Path(parse_path(raw)?),
                StringCanonicalizer::trimming(),
            );
        }
        Ok(ConverterRegistry::new(defaults))
    }

    /// Codec for one store: registry converters plus the output style.
    pub fn codec_for(&self, registry: &ConverterRegistry, uid: &str) -> TypeCodec {
        TypeCodec::new(registry.for_uid(uid)).with_pretty(self.pretty)
    }
}

fn parse_path(raw: &str) -> ConfigResult<DocumentPath> {
    DocumentPath::parse(raw).map_err(|source| ConfigError::Path {
        path: raw.to_string(),
        source,
    })
}
