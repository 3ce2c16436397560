/// Configuration for loading, checking, resolving and saving language files
///
/// The configuration is passed explicitly to every operation that needs it.
use crate::duplicates::DuplicateScope;
use crate::parser::ParsePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionOptions {
    /// Directory holding the selection sidecar files.
    pub state_dir: PathBuf,
    pub language_file: String,
    pub file_file: String,
    /// Drop a persisted selection whose file no longer exists.
    pub revalidate: bool,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            language_file: "selected_language.json".to_string(),
            file_file: "selected_file.json".to_string(),
            revalidate: true,
        }
    }
}

impl SelectionOptions {
    pub fn language_path(&self) -> PathBuf {
        self.state_dir.join(&self.language_file)
    }

    pub fn file_path(&self) -> PathBuf {
        self.state_dir.join(&self.file_file)
    }
}

/// Per-user data directory, falling back to the working directory.
pub fn default_state_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("langfile"))
        .unwrap_or_else(|| PathBuf::from(".langfile"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseOptions {
    pub policy: ParsePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckOptions {
    pub duplicate_scope: DuplicateScope,
    /// Refuse to save while a group lists ids that have no record.
    pub reject_dangling_members: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WriteOptions {
    /// Keep a timestamped copy of the file being replaced.
    pub backup: bool,
    /// Re-encode with the encoding and line endings the file was loaded with.
    pub preserve_layout: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            backup: true,
            preserve_layout: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageConfig {
    pub language_folder: PathBuf,
    /// File used when neither the selection nor the locale picks one.
    pub standard_file: String,
    /// Signature line identifying the default language file.
    pub default_signature: String,
    pub selection: SelectionOptions,
    pub parse: ParseOptions,
    pub checks: CheckOptions,
    pub write: WriteOptions,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            language_folder: PathBuf::from("Languages"),
            standard_file: "English.txt".to_string(),
            default_signature: "English (United States)".to_string(),
            selection: SelectionOptions::default(),
            parse: ParseOptions::default(),
            checks: CheckOptions::default(),
            write: WriteOptions::default(),
        }
    }
}

impl LanguageConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_json()?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Parse)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    pub fn standard_file_path(&self) -> PathBuf {
        self.language_folder.join(&self.standard_file)
    }
}
