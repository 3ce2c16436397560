/// Consumer surface for pushing records into UI components
///
/// Bindings implement [`ApplyTarget`] (or read [`AppliedFields`]) and never
/// touch the text format.
use crate::record::{ComponentType, IdRecord};
use glam::{Quat, Vec2, Vec3};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum AppliedField {
    Text(String),
    FontSize(f32),
    Font(f32),
    Rotation(Quat),
    LocalScale(Vec3),
    AnchorMin(Vec2),
    AnchorMax(Vec2),
    AnchoredPosition(Vec2),
    SizeDelta(Vec2),
    Pivot(Vec2),
    Alignment(i32),
    Reverse(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFields {
    pub id: f32,
    pub component_type: ComponentType,
    /// Present fields in file order.
    pub fields: Vec<AppliedField>,
}

impl AppliedFields {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn text(&self) -> Option<&str> {
        self.fields.iter().find_map(|field| match field {
            AppliedField::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

pub fn apply_record(record: &IdRecord) -> AppliedFields {
    let mut fields = Vec::new();

    if let Some(text) = &record.text {
        fields.push(AppliedField::Text(text.clone()));
    }
    fields.extend(record.font_size.map(AppliedField::FontSize));
    fields.extend(record.font.map(AppliedField::Font));
    fields.extend(record.rotation.map(AppliedField::Rotation));
    fields.extend(record.local_scale.map(AppliedField::LocalScale));
    fields.extend(record.anchor_min.map(AppliedField::AnchorMin));
    fields.extend(record.anchor_max.map(AppliedField::AnchorMax));
    fields.extend(record.anchored_position.map(AppliedField::AnchoredPosition));
    fields.extend(record.size_delta.map(AppliedField::SizeDelta));
    fields.extend(record.pivot.map(AppliedField::Pivot));
    fields.extend(record.alignment.map(AppliedField::Alignment));
    fields.extend(record.reverse.map(AppliedField::Reverse));

    AppliedFields {
        id: record.id,
        component_type: record.component_type,
        fields,
    }
}

/// A UI binding that accepts record fields. Every method defaults to a no-op
/// so a binding only implements what its component supports.
pub trait ApplyTarget {
    fn set_text(&mut self, _text: &str) {}
    fn set_font_size(&mut self, _size: f32) {}
    fn set_font(&mut self, _font: f32) {}
    fn set_rotation(&mut self, _rotation: Quat) {}
    fn set_local_scale(&mut self, _scale: Vec3) {}
    fn set_anchor_min(&mut self, _anchor: Vec2) {}
    fn set_anchor_max(&mut self, _anchor: Vec2) {}
    fn set_anchored_position(&mut self, _position: Vec2) {}
    fn set_size_delta(&mut self, _size: Vec2) {}
    fn set_pivot(&mut self, _pivot: Vec2) {}
    fn set_alignment(&mut self, _alignment: i32) {}
    fn set_reverse(&mut self, _reverse: bool) {}
}

/// Drive `target` with every present field of `record`; returns what was applied.
pub fn apply_to<T: ApplyTarget + ?Sized>(record: &IdRecord, target: &mut T) -> AppliedFields {
    let applied = apply_record(record);
    for field in &applied.fields {
        match field {
            AppliedField::Text(text) => target.set_text(text),
            AppliedField::FontSize(size) => target.set_font_size(*size),
            AppliedField::Font(font) => target.set_font(*font),
            AppliedField::Rotation(rotation) => target.set_rotation(*rotation),
            AppliedField::LocalScale(scale) => target.set_local_scale(*scale),
            AppliedField::AnchorMin(anchor) => target.set_anchor_min(*anchor),
            AppliedField::AnchorMax(anchor) => target.set_anchor_max(*anchor),
            AppliedField::AnchoredPosition(position) => target.set_anchored_position(*position),
            AppliedField::SizeDelta(size) => target.set_size_delta(*size),
            AppliedField::Pivot(pivot) => target.set_pivot(*pivot),
            AppliedField::Alignment(alignment) => target.set_alignment(*alignment),
            AppliedField::Reverse(reverse) => target.set_reverse(*reverse),
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Label {
        text: String,
        size: f32,
        calls: usize,
    }

    impl ApplyTarget for Label {
        fn set_text(&mut self, text: &str) {
            self.text = text.to_string();
            self.calls += 1;
        }

        fn set_font_size(&mut self, size: f32) {
            self.size = size;
            self.calls += 1;
        }
    }

    #[test]
    fn only_present_fields_are_applied() {
        let mut record = IdRecord::new(-2.0, ComponentType::Text).with_text("Label");
        record.font_size = Some(14.0);
        record.pivot = Some(Vec2::new(0.5, 0.5));

        let applied = apply_record(&record);
        assert_eq!(
            applied.fields,
            vec![
                AppliedField::Text("Label".into()),
                AppliedField::FontSize(14.0),
                AppliedField::Pivot(Vec2::new(0.5, 0.5)),
            ]
        );
        assert_eq!(applied.text(), Some("Label"));
        assert_eq!(applied.component_type, ComponentType::Text);
    }

    #[test]
    fn target_receives_supported_fields() {
        let mut record = IdRecord::new(1.0, ComponentType::Text).with_text("Play");
        record.font_size = Some(18.0);
        record.alignment = Some(4);

        let mut label = Label::default();
        let applied = apply_to(&record, &mut label);

        assert_eq!(label.text, "Play");
        assert_eq!(label.size, 18.0);
        assert_eq!(label.calls, 2);
        assert_eq!(applied.fields.len(), 3);
    }

    #[test]
    fn bare_record_applies_nothing() {
        let applied = apply_record(&IdRecord::new(5.0, ComponentType::Script));
        assert!(applied.is_empty());
        assert_eq!(applied.text(), None);
    }
}
