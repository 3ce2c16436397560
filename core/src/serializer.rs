/// Language file serializer
///
/// Inverse of the parser. Optional fields are written in a fixed order and only
/// when present; `CType` always closes an id line.
use crate::encoding::LineEnding;
use crate::record::{CommentRecord, GroupRecord, IdRecord, LanguageHeader};
use std::fmt::Write;

pub const HEADER_PREFIX: &str = "Linguagem - ";

pub fn serialize(
    header: &LanguageHeader,
    ids: &[IdRecord],
    groups: &[GroupRecord],
    comments: &[CommentRecord],
    line_ending: LineEnding,
) -> String {
    let newline = line_ending.as_str();
    let mut out = String::new();

    out.push_str(&format!("{HEADER_PREFIX}[{}]", header.language_name));
    out.push_str(newline);
    out.push_str(&header.locale_name);
    out.push_str(newline);

    let mut ids: Vec<&IdRecord> = ids.iter().collect();
    ids.sort_by(|a, b| a.id.total_cmp(&b.id));
    for record in ids {
        out.push_str(&serialize_id_record(record));
        out.push_str(newline);
    }

    let mut groups: Vec<&GroupRecord> = groups.iter().collect();
    groups.sort_by(|a, b| a.text_id.total_cmp(&b.text_id));
    for group in groups {
        out.push_str(&serialize_group(group));
        out.push_str(newline);
    }

    let mut comments: Vec<&CommentRecord> = comments.iter().collect();
    comments.sort_by(|a, b| a.comments.total_cmp(&b.comments));
    for comment in comments {
        out.push_str(&serialize_comment(comment));
        out.push_str(newline);
    }

    out
}

/// A single `id:` line without line terminator.
pub fn serialize_id_record(record: &IdRecord) -> String {
    let mut line = format!("id:{}; ", record.id);

    // `write!` into a String cannot fail.
    if let Some(text) = &record.text {
        let _ = write!(line, "{{{text}}} ");
    }
    if let Some(size) = record.font_size {
        let _ = write!(line, "S:{size}; ");
    }
    if let Some(font) = record.font {
        let _ = write!(line, "Font:{font}; ");
    }
    if let Some(rotation) = record.rotation {
        let _ = write!(
            line,
            "XRotation:{}; YRotation:{}; ZRotation:{}; WRotation:{}; ",
            rotation.x, rotation.y, rotation.z, rotation.w
        );
    }
    if let Some(scale) = record.local_scale {
        let _ = write!(
            line,
            "XScale:{}; YScale:{}; ZScale:{}; ",
            scale.x, scale.y, scale.z
        );
    }
    if let Some(min) = record.anchor_min {
        let _ = write!(line, "XAnchorMin:{}; YAnchorMin:{}; ", min.x, min.y);
    }
    if let Some(max) = record.anchor_max {
        let _ = write!(line, "XAnchorMax:{}; YAnchorMax:{}; ", max.x, max.y);
    }
    if let Some(position) = record.anchored_position {
        let _ = write!(line, "X:{}; Y:{}; ", position.x, position.y);
    }
    if let Some(size) = record.size_delta {
        let _ = write!(line, "Width:{}; Height:{}; ", size.x, size.y);
    }
    if let Some(pivot) = record.pivot {
        let _ = write!(line, "XPivot:{}; YPivot:{}; ", pivot.x, pivot.y);
    }
    if let Some(alignment) = record.alignment {
        let _ = write!(line, "Ali:{alignment}; ");
    }
    if let Some(reverse) = record.reverse {
        let _ = write!(line, "Rev:{}; ", if reverse { 2 } else { 1 });
    }

    let _ = write!(line, "CType:{};", record.component_type.code());
    line
}

pub fn serialize_group(group: &GroupRecord) -> String {
    format!("[Text:{}; {{{}}} ids:{}]", group.text_id, group.text, group.ids)
}

pub fn serialize_comment(comment: &CommentRecord) -> String {
    format!("[Comments:{}; {{{}}}]", comment.comments, comment.text_comments)
}
