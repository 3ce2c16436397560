/// In-memory language document with load/save
///
/// A load always replaces the whole working set; records are never merged
/// across loads.
use crate::backup::{write_atomically, BackupError, SaveOutcome};
use crate::config::{CheckOptions, LanguageConfig};
use crate::duplicates::{
    check_consistency, find_unencodable_header, ConsistencyReport, DanglingMember,
    DuplicateIdError, UnencodableHeader, UnencodableText,
};
use crate::encoding::{self, FileLayout, TextEncoding};
use crate::parser::{self, ParseError, ParseOutcome, ParsePolicy};
use crate::record::{CommentRecord, GroupRecord, IdRecord, LanguageHeader};
use crate::serializer;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LanguageFileError {
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("refusing to save: {} duplicate id(s)", .0.len())]
    DuplicateIds(Vec<DuplicateIdError>),
    #[error("refusing to save: {} record(s) with unencodable text", .0.len())]
    UnencodableText(Vec<UnencodableText>),
    #[error("refusing to save: {}", join_header_errors(.0))]
    UnencodableHeader(Vec<UnencodableHeader>),
    #[error("refusing to save: {} dangling group member(s)", .0.len())]
    DanglingMembers(Vec<DanglingMember>),
    #[error(transparent)]
    Backup(#[from] BackupError),
}

fn join_header_errors(errors: &[UnencodableHeader]) -> String {
    errors
        .iter()
        .map(|error| error.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageDocument {
    pub header: LanguageHeader,
    pub ids: Vec<IdRecord>,
    pub groups: Vec<GroupRecord>,
    pub comments: Vec<CommentRecord>,
    /// Layout the document was read with; reused on save.
    #[serde(skip)]
    pub layout: FileLayout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub document: LanguageDocument,
    /// Lines dropped under [`ParsePolicy::Lenient`].
    pub skipped: Vec<ParseError>,
}

impl LanguageDocument {
    pub fn new(header: LanguageHeader) -> Self {
        Self {
            header,
            ..Self::default()
        }
    }

    pub fn from_outcome(outcome: ParseOutcome) -> (Self, Vec<ParseError>) {
        let document = Self {
            header: outcome.header,
            ids: outcome.ids,
            groups: outcome.groups,
            comments: outcome.comments,
            layout: FileLayout::default(),
        };
        (document, outcome.skipped)
    }

    pub fn parse(text: &str, policy: ParsePolicy) -> Result<LoadReport, ParseError> {
        let (document, skipped) = Self::from_outcome(parser::parse(text, policy)?);
        Ok(LoadReport { document, skipped })
    }

    pub fn load(path: &Path, config: &LanguageConfig) -> Result<LoadReport, LanguageFileError> {
        let (text, layout) = encoding::read_text(path).map_err(|source| LanguageFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut report = Self::parse(&text, config.parse.policy)?;
        report.document.layout = layout;
        info!(
            "loaded {} ({} records, {} groups, {} comments)",
            path.display(),
            report.document.ids.len(),
            report.document.groups.len(),
            report.document.comments.len()
        );
        Ok(report)
    }

    /// Clear the working set and rebuild it from `path`. On error the current
    /// contents are kept.
    pub fn reload(
        &mut self,
        path: &Path,
        config: &LanguageConfig,
    ) -> Result<Vec<ParseError>, LanguageFileError> {
        let report = Self::load(path, config)?;
        *self = report.document;
        Ok(report.skipped)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.groups.clear();
        self.comments.clear();
    }

    pub fn to_text(&self) -> String {
        serializer::serialize(
            &self.header,
            &self.ids,
            &self.groups,
            &self.comments,
            self.layout.line_ending,
        )
    }

    pub fn check(&self, checks: &CheckOptions) -> ConsistencyReport {
        let mut report =
            check_consistency(&self.ids, &self.groups, &self.comments, checks.duplicate_scope);
        report.header = find_unencodable_header(&self.header);
        report
    }

    /// Write the document to `path`. Nothing is written while duplicate ids
    /// or unencodable text exist.
    ///
    /// A Latin-1 file whose text no longer fits in Latin-1 is rewritten as
    /// UTF-8.
    pub fn save(
        &self,
        path: &Path,
        config: &LanguageConfig,
    ) -> Result<SaveOutcome, LanguageFileError> {
        let report = self.check(&config.checks);
        if !report.duplicates.is_empty() {
            for duplicate in report.duplicates.iter() {
                warn!("{}", duplicate);
            }
            return Err(LanguageFileError::DuplicateIds(
                report.duplicates.into_errors(),
            ));
        }
        if !report.header.is_empty() {
            return Err(LanguageFileError::UnencodableHeader(report.header));
        }
        if !report.unencodable.is_empty() {
            return Err(LanguageFileError::UnencodableText(report.unencodable));
        }
        if !report.dangling.is_empty() {
            if config.checks.reject_dangling_members {
                return Err(LanguageFileError::DanglingMembers(report.dangling));
            }
            for dangling in &report.dangling {
                warn!("{}", dangling);
            }
        }

        let mut layout = if config.write.preserve_layout {
            self.layout
        } else {
            FileLayout::default()
        };
        let text = serializer::serialize(
            &self.header,
            &self.ids,
            &self.groups,
            &self.comments,
            layout.line_ending,
        );
        if !layout.encoding.can_encode(&text) {
            warn!(
                "{} has text outside {:?}; writing it as UTF-8",
                path.display(),
                layout.encoding
            );
            layout.encoding = TextEncoding::Utf8;
        }
        let outcome = write_atomically(
            path,
            &encoding::encode(&text, layout.encoding),
            config.write.backup,
        )?;
        info!("saved {} records to {}", self.ids.len(), path.display());
        Ok(outcome)
    }

    /// Typed lookup; with duplicate ids the last record wins, as it would
    /// when records are applied in file order.
    pub fn record(&self, id: f32) -> Option<&IdRecord> {
        self.ids.iter().rev().find(|record| record.id == id)
    }

    pub fn record_mut(&mut self, id: f32) -> Option<&mut IdRecord> {
        self.ids.iter_mut().rev().find(|record| record.id == id)
    }

    pub fn group(&self, id: f32) -> Option<&GroupRecord> {
        self.groups.iter().rev().find(|group| group.text_id == id)
    }

    pub fn comment(&self, id: f32) -> Option<&CommentRecord> {
        self.comments.iter().rev().find(|comment| comment.comments == id)
    }

    /// Replace the record with the same id, or append it.
    pub fn upsert_record(&mut self, record: IdRecord) {
        match self.record_mut(record.id) {
            Some(existing) => *existing = record,
            None => self.ids.push(record),
        }
    }

    pub fn remove_record(&mut self, id: f32) -> Option<IdRecord> {
        let index = self.ids.iter().rposition(|record| record.id == id)?;
        Some(self.ids.remove(index))
    }

    /// Records listed by a group, in list order. Dangling members are skipped.
    pub fn group_members(&self, group: &GroupRecord) -> Vec<&IdRecord> {
        group
            .member_ids()
            .into_iter()
            .filter_map(|id| self.record(id))
            .collect()
    }
}

/// A document shared between threads. Every access runs under one lock.
#[derive(Debug, Clone, Default)]
pub struct SharedDocument(Arc<Mutex<LanguageDocument>>);

impl SharedDocument {
    pub fn new(document: LanguageDocument) -> Self {
        Self(Arc::new(Mutex::new(document)))
    }

    pub fn read<R>(&self, f: impl FnOnce(&LanguageDocument) -> R) -> R {
        let guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut LanguageDocument) -> R) -> R {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Parses outside the lock and swaps the new contents in.
    pub fn reload(
        &self,
        path: &Path,
        config: &LanguageConfig,
    ) -> Result<Vec<ParseError>, LanguageFileError> {
        let report = LanguageDocument::load(path, config)?;
        self.update(|document| *document = report.document);
        Ok(report.skipped)
    }

    pub fn save(
        &self,
        path: &Path,
        config: &LanguageConfig,
    ) -> Result<SaveOutcome, LanguageFileError> {
        self.read(|document| document.save(path, config))
    }

    pub fn snapshot(&self) -> LanguageDocument {
        self.read(|document| document.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{LineEnding, TextEncoding};
    use crate::record::ComponentType;
    use std::fs;
    use tempfile::tempdir;

    fn config() -> LanguageConfig {
        let mut config = LanguageConfig::default();
        config.write.backup = false;
        config
    }

    fn sample() -> LanguageDocument {
        let mut document = LanguageDocument::new(LanguageHeader::new("English", "English (United States)"));
        document.ids.push(IdRecord::new(1.0, ComponentType::Text).with_text("Play"));
        document.ids.push(IdRecord::new(2.0, ComponentType::Text).with_text("Quit"));
        document.groups.push(GroupRecord::new(1.0, "Main", &[1.0, 2.0]));
        document
    }

    #[test]
    fn save_refuses_duplicates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("English.txt");
        let mut document = sample();
        document.ids.push(IdRecord::new(2.0, ComponentType::Text).with_text("Again"));

        match document.save(&path, &config()) {
            Err(LanguageFileError::DuplicateIds(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].id, 2.0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!path.exists());
    }

    #[test]
    fn save_refuses_unencodable_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("English.txt");
        let mut document = sample();
        document.record_mut(1.0).unwrap().text = Some("line\nbreak".into());
        assert!(matches!(
            document.save(&path, &config()),
            Err(LanguageFileError::UnencodableText(_))
        ));
    }

    #[test]
    fn save_refuses_header_that_would_not_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("English.txt");
        let mut document = sample();
        document.header = LanguageHeader::new("Eng]lish", "English\nid:99; {forged} CType:1;");

        match document.save(&path, &config()) {
            Err(LanguageFileError::UnencodableHeader(fields)) => assert_eq!(fields.len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!path.exists());

        document.header = LanguageHeader::new("English", "English\r");
        assert!(matches!(
            document.save(&path, &config()),
            Err(LanguageFileError::UnencodableHeader(_))
        ));
    }

    #[test]
    fn latin1_file_falls_back_to_utf8_for_wider_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Portugues.txt");
        fs::write(
            &path,
            b"Linguagem - [Portugu\xeas]\nPortugu\xeas (Brasil)\nid:1; {Ol\xe1} CType:1;\n",
        )
        .unwrap();

        let mut document = LanguageDocument::load(&path, &config()).unwrap().document;
        assert_eq!(document.layout.encoding, TextEncoding::Latin1);

        // Latin-1 text keeps the file single-byte.
        document.record_mut(1.0).unwrap().text = Some("Olá você".into());
        document.save(&path, &config()).unwrap();
        assert!(fs::read(&path).unwrap().ends_with(b"{Ol\xe1 voc\xea} CType:1;\n"));

        document.record_mut(1.0).unwrap().text = Some("日本語".into());
        document.save(&path, &config()).unwrap();

        let reloaded = LanguageDocument::load(&path, &config()).unwrap().document;
        assert_eq!(reloaded.layout.encoding, TextEncoding::Utf8);
        assert_eq!(reloaded.header.language_name, "Português");
        assert_eq!(reloaded.record(1.0).unwrap().text.as_deref(), Some("日本語"));
    }

    #[test]
    fn dangling_members_only_block_when_configured() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("English.txt");
        let mut document = sample();
        document.groups.push(GroupRecord::new(2.0, "Ghosts", &[99.0]));

        assert!(document.save(&path, &config()).is_ok());

        let mut strict = config();
        strict.checks.reject_dangling_members = true;
        assert!(matches!(
            document.save(&path, &strict),
            Err(LanguageFileError::DanglingMembers(_))
        ));
    }

    #[test]
    fn save_preserves_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("English.txt");
        let bytes = encoding::encode(
            "Linguagem - [English]\r\nEnglish\r\nid:1; {Play} CType:1;\r\n",
            TextEncoding::Utf8Bom,
        );
        fs::write(&path, bytes).unwrap();

        let mut report = LanguageDocument::load(&path, &config()).unwrap();
        assert_eq!(report.document.layout.line_ending, LineEnding::Crlf);
        report.document.record_mut(1.0).unwrap().text = Some("Start".into());
        report.document.save(&path, &config()).unwrap();

        let written = fs::read(&path).unwrap();
        assert!(written.starts_with(&[0xEF, 0xBB, 0xBF]));
        assert_eq!(
            encoding::decode(&written, TextEncoding::Utf8Bom).unwrap(),
            "Linguagem - [English]\r\nEnglish\r\nid:1; {Start} CType:1;\r\n"
        );
    }

    #[test]
    fn reload_replaces_instead_of_merging() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("English.txt");
        fs::write(&path, "Linguagem - [English]\nEnglish\nid:7; {Only} CType:1;\n").unwrap();

        let mut document = sample();
        let skipped = document.reload(&path, &config()).unwrap();
        assert!(skipped.is_empty());
        assert_eq!(document.ids.len(), 1);
        assert!(document.groups.is_empty());
        assert_eq!(document.record(7.0).unwrap().text.as_deref(), Some("Only"));
    }

    #[test]
    fn lookups_and_edits() {
        let mut document = sample();
        document.ids.push(IdRecord::new(1.0, ComponentType::Text).with_text("Play again"));
        assert_eq!(document.record(1.0).unwrap().text.as_deref(), Some("Play again"));

        document.upsert_record(IdRecord::new(3.0, ComponentType::Dropdown));
        document.upsert_record(IdRecord::new(2.0, ComponentType::Text).with_text("Exit"));
        assert_eq!(document.ids.len(), 4);
        assert_eq!(document.record(2.0).unwrap().text.as_deref(), Some("Exit"));

        let removed = document.remove_record(1.0).unwrap();
        assert_eq!(removed.text.as_deref(), Some("Play again"));
        assert_eq!(document.record(1.0).unwrap().text.as_deref(), Some("Play"));

        let group = document.group(1.0).unwrap().clone();
        let members: Vec<f32> = document.group_members(&group).iter().map(|r| r.id).collect();
        assert_eq!(members, vec![1.0, 2.0]);
        assert!(document.comment(1.0).is_none());
    }

    #[test]
    fn shared_document_updates_under_lock() {
        let shared = SharedDocument::new(sample());
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    shared.update(|document| {
                        document.upsert_record(IdRecord::new(100.0 + n as f32, ComponentType::Text))
                    })
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.read(|document| document.ids.len()), 6);
        assert_eq!(shared.snapshot().ids.len(), 6);
    }
}
