/// Consistency checks run before a language file is written
///
/// Duplicate ids are reported as data. The save path refuses to write while
/// the report is non-empty.
use crate::record::{CommentRecord, GroupRecord, IdNamespace, IdRecord, LanguageHeader};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// How far apart two equal ids must be to count as a collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DuplicateScope {
    /// Repeats are only looked for inside each namespace.
    #[default]
    PerNamespace,
    /// Groups, records and comments share one id space.
    Shared,
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("duplicate id {id} ({})", join_labels(.namespaces))]
pub struct DuplicateIdError {
    pub id: f32,
    /// One entry per extra occurrence, labelled with the namespace it was found in.
    pub namespaces: Vec<IdNamespace>,
}

fn join_labels(namespaces: &[IdNamespace]) -> String {
    namespaces
        .iter()
        .map(|ns| ns.label())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DuplicateReport {
    entries: Vec<DuplicateIdError>,
}

impl DuplicateReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, id: f32) -> Option<&[IdNamespace]> {
        let key = id_key(id);
        self.entries
            .iter()
            .find(|entry| id_key(entry.id) == key)
            .map(|entry| entry.namespaces.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DuplicateIdError> {
        self.entries.iter()
    }

    pub fn into_errors(self) -> Vec<DuplicateIdError> {
        self.entries
    }
}

// -0.0 and 0.0 are the same id.
fn id_key(id: f32) -> u32 {
    if id == 0.0 {
        0
    } else {
        id.to_bits()
    }
}

#[derive(Default)]
struct ReportBuilder {
    index: HashMap<u32, usize>,
    entries: Vec<DuplicateIdError>,
}

impl ReportBuilder {
    fn flag(&mut self, id: f32, namespace: IdNamespace) {
        let key = id_key(id);
        match self.index.get(&key) {
            Some(&at) => self.entries[at].namespaces.push(namespace),
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(DuplicateIdError {
                    id,
                    namespaces: vec![namespace],
                });
            }
        }
    }

    fn finish(mut self) -> DuplicateReport {
        self.entries.sort_by(|a, b| a.id.total_cmp(&b.id));
        DuplicateReport {
            entries: self.entries,
        }
    }
}

/// Only the second and later occurrences are flagged; the first one of a
/// repeated id is never listed.
pub fn find_duplicate_ids(
    groups: &[GroupRecord],
    ids: &[IdRecord],
    comments: &[CommentRecord],
    scope: DuplicateScope,
) -> DuplicateReport {
    let namespaces: [(IdNamespace, Vec<f32>); 3] = [
        (IdNamespace::Group, groups.iter().map(|g| g.text_id).collect()),
        (IdNamespace::Text, ids.iter().map(|r| r.id).collect()),
        (IdNamespace::Comment, comments.iter().map(|c| c.comments).collect()),
    ];

    let mut builder = ReportBuilder::default();
    let mut shared_seen = HashSet::new();

    for (namespace, keys) in namespaces {
        let mut local_seen = HashSet::new();
        let seen = match scope {
            DuplicateScope::PerNamespace => &mut local_seen,
            DuplicateScope::Shared => &mut shared_seen,
        };
        for id in keys {
            if !seen.insert(id_key(id)) {
                builder.flag(id, namespace);
            }
        }
    }

    builder.finish()
}

/// A group member id with no matching id record.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("group {group_id} references missing id {member_id}")]
pub struct DanglingMember {
    pub group_id: f32,
    pub member_id: f32,
}

pub fn find_dangling_group_members(groups: &[GroupRecord], ids: &[IdRecord]) -> Vec<DanglingMember> {
    let known: HashSet<u32> = ids.iter().map(|record| id_key(record.id)).collect();
    groups
        .iter()
        .flat_map(|group| {
            group
                .member_ids()
                .into_iter()
                .filter(|member| !known.contains(&id_key(*member)))
                .map(move |member_id| DanglingMember {
                    group_id: group.text_id,
                    member_id,
                })
        })
        .collect()
}

/// Text the line format cannot carry: braces end the text field early and
/// line breaks split the record.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{namespace} {id} has text with braces or line breaks")]
pub struct UnencodableText {
    pub namespace: IdNamespace,
    pub id: f32,
}

fn is_unencodable(text: &str) -> bool {
    text.contains(&['{', '}', '\n', '\r'][..])
}

pub fn find_unencodable_text(
    ids: &[IdRecord],
    groups: &[GroupRecord],
    comments: &[CommentRecord],
) -> Vec<UnencodableText> {
    let records = ids.iter().filter_map(|record| {
        record
            .text
            .as_deref()
            .filter(|text| is_unencodable(text))
            .map(|_| UnencodableText {
                namespace: IdNamespace::Text,
                id: record.id,
            })
    });
    let groups = groups
        .iter()
        .filter(|group| is_unencodable(&group.text) || group.ids.contains(&['\n', '\r', ']'][..]))
        .map(|group| UnencodableText {
            namespace: IdNamespace::Group,
            id: group.text_id,
        });
    let comments = comments
        .iter()
        .filter(|comment| is_unencodable(&comment.text_comments))
        .map(|comment| UnencodableText {
            namespace: IdNamespace::Comment,
            id: comment.comments,
        });

    records.chain(groups).chain(comments).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderField {
    LanguageName,
    LocaleName,
}

impl HeaderField {
    pub fn label(self) -> &'static str {
        match self {
            Self::LanguageName => "language name",
            Self::LocaleName => "locale name",
        }
    }
}

/// A header value that would not read back as written: a `]` closes the
/// language name early and a line break pushes the rest into the records.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{} `{value}` cannot be stored in the header", .field.label())]
pub struct UnencodableHeader {
    pub field: HeaderField,
    pub value: String,
}

pub fn find_unencodable_header(header: &LanguageHeader) -> Vec<UnencodableHeader> {
    let mut found = Vec::new();
    if header.language_name.contains(&[']', '\n', '\r'][..]) {
        found.push(UnencodableHeader {
            field: HeaderField::LanguageName,
            value: header.language_name.clone(),
        });
    }
    if header.locale_name.contains(&['\n', '\r'][..]) {
        found.push(UnencodableHeader {
            field: HeaderField::LocaleName,
            value: header.locale_name.clone(),
        });
    }
    found
}

/// Everything the save path looks at, gathered in one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsistencyReport {
    pub duplicates: DuplicateReport,
    pub dangling: Vec<DanglingMember>,
    pub unencodable: Vec<UnencodableText>,
    pub header: Vec<UnencodableHeader>,
}

impl ConsistencyReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty()
            && self.dangling.is_empty()
            && self.unencodable.is_empty()
            && self.header.is_empty()
    }
}

pub fn check_consistency(
    ids: &[IdRecord],
    groups: &[GroupRecord],
    comments: &[CommentRecord],
    scope: DuplicateScope,
) -> ConsistencyReport {
    ConsistencyReport {
        duplicates: find_duplicate_ids(groups, ids, comments, scope),
        dangling: find_dangling_group_members(groups, ids),
        unencodable: find_unencodable_text(ids, groups, comments),
        header: Vec::new(),
    }
}
