/// Language file parser
///
/// Turns the line-oriented record format into typed records. Optional fields
/// are located independently, so field order on disk does not matter.
use crate::extract::{
    extract_bool_value, extract_float_value, extract_int_value, extract_text_within_braces,
    has_braced_text, has_key, parse_float_token, remove_content_within_braces, token_after,
    token_after_boundary,
};
use crate::record::{CommentRecord, ComponentType, GroupRecord, IdRecord, LanguageHeader};
use glam::{Quat, Vec2, Vec3};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static LANGUAGE_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]").expect("valid language name regex"));

pub const ID_KEY: &str = "id:";
pub const GROUP_KEY: &str = "[Text:";
pub const COMMENT_KEY: &str = "[Comments:";
const GROUP_MEMBERS_KEY: &str = "ids:";

const ROTATION_KEYS: [&str; 4] = ["XRotation:", "YRotation:", "ZRotation:", "WRotation:"];
const SCALE_KEYS: [&str; 3] = ["XScale:", "YScale:", "ZScale:"];
const ANCHOR_MIN_KEYS: [&str; 2] = ["XAnchorMin:", "YAnchorMin:"];
const ANCHOR_MAX_KEYS: [&str; 2] = ["XAnchorMax:", "YAnchorMax:"];
const POSITION_KEYS: [&str; 2] = ["X:", "Y:"];
const SIZE_KEYS: [&str; 2] = ["Width:", "Height:"];
const PIVOT_KEYS: [&str; 2] = ["XPivot:", "YPivot:"];

/// What to do with a line whose leading key cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Skip the line and keep going; the error is kept in [`ParseOutcome::skipped`].
    #[default]
    Lenient,
    /// Abort the whole parse on the first bad line.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorReason {
    #[error("missing value for `{key}`")]
    MissingValue { key: &'static str },
    #[error("`{key}` value `{value}` is not a number")]
    InvalidNumber { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    pub reason: ParseErrorReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub header: LanguageHeader,
    pub ids: Vec<IdRecord>,
    pub groups: Vec<GroupRecord>,
    pub comments: Vec<CommentRecord>,
    pub skipped: Vec<ParseError>,
}

pub fn parse(text: &str, policy: ParsePolicy) -> Result<ParseOutcome, ParseError> {
    parse_lines(text.lines(), policy)
}

pub fn parse_lines<'a, I>(lines: I, policy: ParsePolicy) -> Result<ParseOutcome, ParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut outcome = ParseOutcome::default();

    for (index, raw) in lines.into_iter().enumerate() {
        let raw = raw.trim_end_matches('\r');
        match index {
            0 => {
                outcome.header.language_name = language_name(raw.trim_start_matches('\u{feff}'));
                continue;
            }
            1 => {
                outcome.header.locale_name = raw.to_string();
                continue;
            }
            _ => {}
        }

        let line = raw.trim_start();
        let line_no = index + 1;
        let parsed = if line.starts_with(ID_KEY) {
            parse_id_line(line, line_no).map(|record| outcome.ids.push(record))
        } else if line.starts_with(GROUP_KEY) {
            parse_group_line(line, line_no).map(|group| outcome.groups.push(group))
        } else if line.starts_with(COMMENT_KEY) {
            parse_comment_line(line, line_no).map(|comment| outcome.comments.push(comment))
        } else {
            Ok(())
        };

        if let Err(error) = parsed {
            match policy {
                ParsePolicy::Strict => return Err(error),
                ParsePolicy::Lenient => {
                    warn!("skipping malformed record: {}", error);
                    outcome.skipped.push(error);
                }
            }
        }
    }

    debug!(
        "parsed {} id records, {} groups, {} comments ({} skipped)",
        outcome.ids.len(),
        outcome.groups.len(),
        outcome.comments.len(),
        outcome.skipped.len()
    );

    Ok(outcome)
}

fn language_name(line: &str) -> String {
    LANGUAGE_NAME_REGEX
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| line.trim().to_string())
}

fn leading_value(line: &str, key: &'static str, line_no: usize) -> Result<f32, ParseError> {
    let token = token_after(line, key)
        .filter(|token| !token.is_empty())
        .ok_or(ParseError {
            line: line_no,
            reason: ParseErrorReason::MissingValue { key },
        })?;

    parse_float_token(token).ok_or_else(|| ParseError {
        line: line_no,
        reason: ParseErrorReason::InvalidNumber {
            key,
            value: token.to_string(),
        },
    })
}

fn any_key(line: &str, keys: &[&str]) -> bool {
    keys.iter().any(|key| has_key(line, key))
}

fn vec2_of(line: &str, keys: &[&str; 2]) -> Option<Vec2> {
    any_key(line, keys).then(|| {
        Vec2::new(
            extract_float_value(line, keys[0]),
            extract_float_value(line, keys[1]),
        )
    })
}

/// `CType` is an integer code, but older files sometimes carry `1.0`.
fn component_code(fields: &str) -> i32 {
    token_after_boundary(fields, "CType:")
        .and_then(|token| {
            token
                .parse::<i32>()
                .ok()
                .or_else(|| parse_float_token(token).map(|code| code.round() as i32))
        })
        .unwrap_or(0)
}

pub fn parse_id_line(line: &str, line_no: usize) -> Result<IdRecord, ParseError> {
    // Keys are looked up outside the braced text so free text cannot forge them.
    let fields = remove_content_within_braces(line);
    let id = leading_value(&fields, ID_KEY, line_no)?;

    let component_code = component_code(&fields);
    let mut record = IdRecord::new(id, ComponentType::from_code(component_code));

    if has_braced_text(line) {
        record.text = Some(extract_text_within_braces(line));
    }
    if has_key(&fields, "S:") {
        record.font_size = Some(extract_float_value(&fields, "S:"));
    }
    if has_key(&fields, "Font:") {
        record.font = Some(extract_float_value(&fields, "Font:"));
    }
    if any_key(&fields, &ROTATION_KEYS) {
        record.rotation = Some(Quat::from_xyzw(
            extract_float_value(&fields, ROTATION_KEYS[0]),
            extract_float_value(&fields, ROTATION_KEYS[1]),
            extract_float_value(&fields, ROTATION_KEYS[2]),
            extract_float_value(&fields, ROTATION_KEYS[3]),
        ));
    }
    if any_key(&fields, &SCALE_KEYS) {
        record.local_scale = Some(Vec3::new(
            extract_float_value(&fields, SCALE_KEYS[0]),
            extract_float_value(&fields, SCALE_KEYS[1]),
            extract_float_value(&fields, SCALE_KEYS[2]),
        ));
    }
    record.anchor_min = vec2_of(&fields, &ANCHOR_MIN_KEYS);
    record.anchor_max = vec2_of(&fields, &ANCHOR_MAX_KEYS);
    record.anchored_position = vec2_of(&fields, &POSITION_KEYS);
    record.size_delta = vec2_of(&fields, &SIZE_KEYS);
    record.pivot = vec2_of(&fields, &PIVOT_KEYS);
    if has_key(&fields, "Ali:") {
        record.alignment = Some(extract_int_value(&fields, "Ali:"));
    }
    if has_key(&fields, "Rev:") {
        record.reverse = Some(extract_bool_value(&fields, "Rev:", false));
    }

    Ok(record)
}

pub fn parse_group_line(line: &str, line_no: usize) -> Result<GroupRecord, ParseError> {
    let fields = remove_content_within_braces(line);
    let text_id = leading_value(&fields, GROUP_KEY, line_no)?;

    let ids = fields
        .find(GROUP_MEMBERS_KEY)
        .map(|at| {
            let rest = &fields[at + GROUP_MEMBERS_KEY.len()..];
            let end = rest.rfind(']').unwrap_or(rest.len());
            rest[..end].trim().to_string()
        })
        .unwrap_or_default();

    Ok(GroupRecord {
        text_id,
        text: extract_text_within_braces(line),
        ids,
        view: false,
    })
}

pub fn parse_comment_line(line: &str, line_no: usize) -> Result<CommentRecord, ParseError> {
    let fields = remove_content_within_braces(line);
    let comments = leading_value(&fields, COMMENT_KEY, line_no)?;
    Ok(CommentRecord {
        comments,
        text_comments: extract_text_within_braces(line),
    })
}
