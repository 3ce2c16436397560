/// Record data model for language files
use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// UI component kind a record targets. The numeric codes are part of the
/// file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentType {
    Text,
    TextMesh,
    InputField,
    Script,
    CreateFile,
    Dropdown,
    RectAdjust,
    /// Code outside 1..=7, kept so it survives a load/save cycle.
    Other(i32),
}

impl ComponentType {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Text,
            2 => Self::TextMesh,
            3 => Self::InputField,
            4 => Self::Script,
            5 => Self::CreateFile,
            6 => Self::Dropdown,
            7 => Self::RectAdjust,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Text => 1,
            Self::TextMesh => 2,
            Self::InputField => 3,
            Self::Script => 4,
            Self::CreateFile => 5,
            Self::Dropdown => 6,
            Self::RectAdjust => 7,
            Self::Other(code) => code,
        }
    }
}

impl Default for ComponentType {
    fn default() -> Self {
        Self::Other(0)
    }
}

/// One localizable element. `None` fields are absent from the file and are
/// neither emitted nor applied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdRecord {
    pub id: f32,
    pub component_type: ComponentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Quat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_scale: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_min: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_max: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchored_position: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_delta: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
}

impl IdRecord {
    pub fn new(id: f32, component_type: ComponentType) -> Self {
        Self {
            id,
            component_type,
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Named bucket of record ids, used for organising the editor view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub text_id: f32,
    pub text: String,
    /// Semicolon-terminated member list, e.g. `1;2;-3;`.
    pub ids: String,
    /// Expanded state in the editor. Never written to disk.
    #[serde(skip)]
    pub view: bool,
}

impl GroupRecord {
    pub fn new(text_id: f32, text: impl Into<String>, members: &[f32]) -> Self {
        let ids = members.iter().map(|id| format!("{id};")).collect();
        Self {
            text_id,
            text: text.into(),
            ids,
            view: false,
        }
    }

    /// Member ids in list order. Tokens that are not numbers are skipped.
    pub fn member_ids(&self) -> Vec<f32> {
        self.ids
            .split(';')
            .filter_map(crate::extract::parse_float_token)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub comments: f32,
    pub text_comments: String,
}

impl CommentRecord {
    pub fn new(comments: f32, text_comments: impl Into<String>) -> Self {
        Self {
            comments,
            text_comments: text_comments.into(),
        }
    }
}

/// The two leading lines of every language file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageHeader {
    pub language_name: String,
    pub locale_name: String,
}

impl LanguageHeader {
    pub fn new(language_name: impl Into<String>, locale_name: impl Into<String>) -> Self {
        Self {
            language_name: language_name.into(),
            locale_name: locale_name.into(),
        }
    }
}

/// The three id namespaces of a language file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IdNamespace {
    Group,
    Text,
    Comment,
}

impl IdNamespace {
    pub fn label(self) -> &'static str {
        match self {
            Self::Group => "Group ID",
            Self::Text => "Text ID",
            Self::Comment => "Comment ID",
        }
    }
}

impl fmt::Display for IdNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_codes_are_stable() {
        for code in 1..=7 {
            assert_eq!(ComponentType::from_code(code).code(), code);
        }
        assert_eq!(ComponentType::from_code(1), ComponentType::Text);
        assert_eq!(ComponentType::from_code(7), ComponentType::RectAdjust);
        assert_eq!(ComponentType::from_code(42), ComponentType::Other(42));
    }

    #[test]
    fn group_members_skip_garbage() {
        let group = GroupRecord {
            text_id: 1.0,
            text: "Menu".into(),
            ids: "1;2; x ;-3;".into(),
            view: true,
        };
        assert_eq!(group.member_ids(), vec![1.0, 2.0, -3.0]);
    }

    #[test]
    fn group_new_formats_member_list() {
        let group = GroupRecord::new(4.0, "HUD", &[1.0, -2.0, 3.5]);
        assert_eq!(group.ids, "1;-2;3.5;");
    }

    #[test]
    fn namespace_labels() {
        assert_eq!(IdNamespace::Group.to_string(), "Group ID");
        assert_eq!(IdNamespace::Text.to_string(), "Text ID");
        assert_eq!(IdNamespace::Comment.to_string(), "Comment ID");
    }
}
