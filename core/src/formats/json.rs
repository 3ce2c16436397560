/// JSON export of the whole document
use super::{replace_text, ExchangeFormat, ExchangeHandler, FormatError, MergeReport};
use crate::document::LanguageDocument;

pub struct JsonHandler;

impl JsonHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeHandler for JsonHandler {
    fn export(&self, document: &LanguageDocument) -> Result<String, FormatError> {
        serde_json::to_string_pretty(document)
            .map_err(|e| FormatError::SerializationError(format!("JSON serialize error: {}", e)))
    }

    fn merge(
        &self,
        document: &mut LanguageDocument,
        content: &str,
    ) -> Result<MergeReport, FormatError> {
        let incoming: LanguageDocument = serde_json::from_str(content)
            .map_err(|e| FormatError::ParseError(format!("JSON parse error: {}", e)))?;

        let mut report = MergeReport::default();
        for record in incoming.ids {
            let Some(text) = record.text else {
                continue;
            };
            if replace_text(document, record.id, text) {
                report.updated.push(record.id);
            } else {
                report.unknown.push(record.id);
            }
        }
        Ok(report)
    }

    fn format(&self) -> ExchangeFormat {
        ExchangeFormat::Json
    }
}
