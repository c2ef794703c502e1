use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::schema::{ChecklistSchema, SchemaError, Section};
use crate::report::StatusStyle;
use crate::store::RecordStore;

pub const CONFIG_FILE: &str = "config.json";
pub const APP_DIR: &str = "scrum-helper";

fn default_records_dir() -> PathBuf {
    PathBuf::from("scrum_daily_logs")
}

fn default_subject_prefix() -> String {
    "Daily Scrum Report".into()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid checklist: {0}")]
    Schema(#[from] SchemaError),
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".into(),
            port: 587,
        }
    }
}

/// Settings read at startup. Credentials are deliberately not part of it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ScrumConfig {
    pub records_dir: PathBuf,
    pub smtp: SmtpConfig,
    pub subject_prefix: String,
    pub status_style: StatusStyle,
    pub atomic_writes: bool,
    /// Custom checklist; `None` means the built-in one.
    pub sections: Option<Vec<Section>>,
    pub debug_logging: bool,
}

impl Default for ScrumConfig {
    fn default() -> Self {
        Self {
            records_dir: default_records_dir(),
            smtp: SmtpConfig::default(),
            subject_prefix: default_subject_prefix(),
            status_style: StatusStyle::default(),
            atomic_writes: false,
            sections: None,
            debug_logging: false,
        }
    }
}

/// `<config_dir>/scrum-helper/config.json`, if the platform has a config dir.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

impl ScrumConfig {
    /// Load from the default location. No config dir or no file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.schema()?;
        Ok(config)
    }

    pub fn schema(&self) -> Result<ChecklistSchema, SchemaError> {
        match &self.sections {
            Some(sections) => ChecklistSchema::new(sections.clone()),
            None => Ok(ChecklistSchema::builtin()),
        }
    }

    pub fn record_store(&self) -> RecordStore {
        RecordStore::new(&self.records_dir).with_atomic_writes(self.atomic_writes)
    }
}
