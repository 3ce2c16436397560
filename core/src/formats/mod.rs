/// Exchange formats for handing record text to translators and back.
/// Export writes the translatable text; merge only updates text of records
/// that already exist in the document.
pub mod json;
pub mod tsv;

use crate::document::LanguageDocument;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeFormat {
    Tsv,
    Json,
}

impl ExchangeFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "tsv" | "tab" => Some(Self::Tsv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl FromStr for ExchangeFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| FormatError::UnsupportedFormat(s.to_string()))
    }
}

/// What a merge changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    /// Ids whose text was replaced.
    pub updated: Vec<f32>,
    /// Ids present in the input but not in the document.
    pub unknown: Vec<f32>,
    /// 1-based input lines that could not be read.
    pub malformed: Vec<usize>,
}

pub trait ExchangeHandler: Send + Sync {
    fn export(&self, document: &LanguageDocument) -> Result<String, FormatError>;

    fn merge(
        &self,
        document: &mut LanguageDocument,
        content: &str,
    ) -> Result<MergeReport, FormatError>;

    fn format(&self) -> ExchangeFormat;
}

pub fn get_handler(format: ExchangeFormat) -> Box<dyn ExchangeHandler> {
    match format {
        ExchangeFormat::Tsv => Box::new(tsv::TsvHandler::new()),
        ExchangeFormat::Json => Box::new(json::JsonHandler::new()),
    }
}

/// Set `text` on the record with `id`. Returns `false` for unknown ids.
pub(crate) fn replace_text(document: &mut LanguageDocument, id: f32, text: String) -> bool {
    match document.record_mut(id) {
        Some(record) => {
            record.text = Some(text);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_format_from_path() {
        assert_eq!(ExchangeFormat::from_path(Path::new("out/English.tsv")), Some(ExchangeFormat::Tsv));
        assert_eq!(ExchangeFormat::from_path(Path::new("English.JSON")), Some(ExchangeFormat::Json));
        assert_eq!(ExchangeFormat::from_path(Path::new("English.txt")), None);
        assert!(matches!(
            "xml".parse::<ExchangeFormat>(),
            Err(FormatError::UnsupportedFormat(_))
        ));
        assert_eq!(get_handler(ExchangeFormat::Tsv).format(), ExchangeFormat::Tsv);
    }
}
