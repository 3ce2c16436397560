/// Persisted "last selected language" state
///
/// Stored as two small JSON sidecars, `{ "selectedLanguage": ... }` and
/// `{ "selectedFile": ... }`, so other tools can read either one alone.
use crate::config::SelectionOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("selection state I/O failed for {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("selection state in {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LanguageSidecar {
    selected_language: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileSidecar {
    selected_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSelection {
    pub language: String,
    pub file: PathBuf,
}

impl LanguageSelection {
    pub fn new(language: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            language: language.into(),
            file: file.into(),
        }
    }

    /// `Ok(None)` unless both sidecars exist and name a file.
    pub fn load(options: &SelectionOptions) -> Result<Option<Self>, SelectionError> {
        let file: Option<FileSidecar> = read_sidecar(&options.file_path())?;
        let Some(file) = file.filter(|f| !f.selected_file.as_os_str().is_empty()) else {
            return Ok(None);
        };
        let language: Option<LanguageSidecar> = read_sidecar(&options.language_path())?;

        Ok(Some(Self {
            language: language.map(|l| l.selected_language).unwrap_or_default(),
            file: file.selected_file,
        }))
    }

    pub fn save(&self, options: &SelectionOptions) -> Result<(), SelectionError> {
        fs::create_dir_all(&options.state_dir).map_err(|source| SelectionError::Io {
            path: options.state_dir.clone(),
            source,
        })?;
        write_sidecar(
            &options.language_path(),
            &LanguageSidecar {
                selected_language: self.language.clone(),
            },
        )?;
        write_sidecar(
            &options.file_path(),
            &FileSidecar {
                selected_file: self.file.clone(),
            },
        )
    }

    pub fn clear(options: &SelectionOptions) -> Result<(), SelectionError> {
        for path in [options.language_path(), options.file_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(SelectionError::Io { path, source }),
            }
        }
        Ok(())
    }
}

fn read_sidecar<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, SelectionError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SelectionError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| SelectionError::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn write_sidecar<T: Serialize>(path: &Path, value: &T) -> Result<(), SelectionError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| SelectionError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| SelectionError::Io {
        path: path.to_path_buf(),
        source,
    })
}
