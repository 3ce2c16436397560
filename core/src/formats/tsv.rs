/// Tab-separated export of record text, one `id<TAB>text` row per record.
/// Tabs and line breaks inside text are escaped as `%tab%` and `%newline%`.
/// A `%` followed by a token name (`tab`, `newline`, `percent`) is written as
/// `%percent%`, so any text reads back unchanged.
use super::{replace_text, ExchangeFormat, ExchangeHandler, FormatError, MergeReport};
use crate::document::LanguageDocument;
use crate::extract::parse_float_token;
use log::warn;

const TAB_TOKEN: &str = "%tab%";
const NEWLINE_TOKEN: &str = "%newline%";
const PERCENT_TOKEN: &str = "%percent%";
const TOKENS: [(&str, char); 3] = [(TAB_TOKEN, '\t'), (NEWLINE_TOKEN, '\n'), (PERCENT_TOKEN, '%')];
const HEADER_ID: &str = "id";

pub fn escape(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_str();
    while let Some(c) = rest.chars().next() {
        match c {
            '\t' => out.push_str(TAB_TOKEN),
            '\n' => out.push_str(NEWLINE_TOKEN),
            '%' if TOKENS
                .iter()
                .any(|(token, _)| rest.starts_with(&token[..token.len() - 1])) =>
            {
                out.push_str(PERCENT_TOKEN)
            }
            c => out.push(c),
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        match TOKENS.iter().find(|(token, _)| rest.starts_with(token)) {
            Some((token, replacement)) => {
                out.push(*replacement);
                rest = &rest[token.len()..];
            }
            None => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out
}

pub struct TsvHandler;

impl TsvHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TsvHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeHandler for TsvHandler {
    fn export(&self, document: &LanguageDocument) -> Result<String, FormatError> {
        let mut records: Vec<_> = document
            .ids
            .iter()
            .filter_map(|record| record.text.as_deref().map(|text| (record.id, text)))
            .collect();
        records.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut out = format!("{HEADER_ID}\t{}\n", escape(&document.header.language_name));
        for (id, text) in records {
            out.push_str(&format!("{id}\t{}\n", escape(text)));
        }
        Ok(out)
    }

    fn merge(
        &self,
        document: &mut LanguageDocument,
        content: &str,
    ) -> Result<MergeReport, FormatError> {
        let mut report = MergeReport::default();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let Some((id, text)) = line.split_once('\t') else {
                report.malformed.push(index + 1);
                continue;
            };
            if index == 0 && id.trim() == HEADER_ID {
                continue;
            }
            let Some(id) = parse_float_token(id) else {
                report.malformed.push(index + 1);
                continue;
            };

            if replace_text(document, id, unescape(text)) {
                report.updated.push(id);
            } else {
                warn!("tsv row {} names unknown id {}", index + 1, id);
                report.unknown.push(id);
            }
        }

        Ok(report)
    }

    fn format(&self) -> ExchangeFormat {
        ExchangeFormat::Tsv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ComponentType, IdRecord, LanguageHeader};

    fn document() -> LanguageDocument {
        let mut document = LanguageDocument::new(LanguageHeader::new("English", "English (United States)"));
        document.ids.push(IdRecord::new(2.0, ComponentType::Text).with_text("Quit\tnow"));
        document.ids.push(IdRecord::new(-1.0, ComponentType::Text).with_text("Play"));
        document.ids.push(IdRecord::new(3.0, ComponentType::RectAdjust));
        document
    }

    #[test]
    fn escapes_tabs_and_newlines() {
        assert_eq!(escape("a\tb\r\nc\nd"), "a%tab%b%newline%c%newline%d");
        assert_eq!(unescape("a%tab%b%newline%c"), "a\tb\nc");
    }

    #[test]
    fn literal_tokens_survive_a_round_trip() {
        for text in ["%tab%", "50%newline%", "%percent%", "100% sure", "%%tab%%", "a\t%tab%\nb", "%tab\t", "%newline\n", "%percent%%"] {
            assert_eq!(unescape(&escape(text)), text, "{text:?}");
            assert!(!escape(text).contains('\t'));
        }
        assert_eq!(escape("%tab%"), "%percent%tab%");
        assert_eq!(escape("100% sure"), "100% sure");
    }

    #[test]
    fn exports_text_records_sorted() {
        let out = TsvHandler::new().export(&document()).unwrap();
        assert_eq!(out, "id\tEnglish\n-1\tPlay\n2\tQuit%tab%now\n");
    }

    #[test]
    fn merge_updates_known_ids_only() {
        let mut document = document();
        let input = "id\tPortuguês\n-1\tJogar\n2\tSair%newline%agora\n9\tNada\nbroken line\nx\ty\n";
        let report = TsvHandler::new().merge(&mut document, input).unwrap();

        assert_eq!(report.updated, vec![-1.0, 2.0]);
        assert_eq!(report.unknown, vec![9.0]);
        assert_eq!(report.malformed, vec![5, 6]);
        assert_eq!(document.record(-1.0).unwrap().text.as_deref(), Some("Jogar"));
        assert_eq!(document.record(2.0).unwrap().text.as_deref(), Some("Sair\nagora"));
    }
}
