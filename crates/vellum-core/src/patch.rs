//! Property edits dispatched from inspectors.

use crate::object::DrawableObject;
use crate::shapes::{LineCap, LineJoin, SerializableColor, Shape, TextAlign};
use serde::{Deserialize, Serialize};

/// A set of property changes. `None` fields are left alone.
///
/// Sizes are given in scaled (on-screen) units and stored divided by the
/// object's scale. The angle is taken modulo 360 and applied about the
/// object's center.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectPatch {
    pub name: Option<String>,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub radius: Option<f64>,
    pub rx: Option<f64>,
    pub ry: Option<f64>,
    pub angle: Option<f64>,
    pub opacity: Option<f64>,
    pub fill: Option<SerializableColor>,
    pub stroke: Option<SerializableColor>,
    pub stroke_width: Option<f64>,
    pub line_cap: Option<LineCap>,
    pub line_join: Option<LineJoin>,
    pub dash: Option<Vec<f64>>,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub text_align: Option<TextAlign>,
}

impl ObjectPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether the patch changes placement or size. Locked objects reject
    /// these fields.
    pub fn changes_transform(&self) -> bool {
        self.left.is_some()
            || self.top.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.radius.is_some()
            || self.rx.is_some()
            || self.ry.is_some()
            || self.angle.is_some()
    }

    /// Whether the patch carries paint or text fields, which cascade into a
    /// group's children.
    pub fn changes_style(&self) -> bool {
        self.opacity.is_some()
            || self.fill.is_some()
            || self.stroke.is_some()
            || self.stroke_width.is_some()
            || self.line_cap.is_some()
            || self.line_join.is_some()
            || self.dash.is_some()
            || self.text.is_some()
            || self.font_size.is_some()
            || self.font_family.is_some()
            || self.text_align.is_some()
    }

    /// Apply placement, size and name fields. Skipped for locked objects;
    /// size is ignored on groups. Returns `true` if anything was written.
    pub fn apply_geometry(&self, object: &mut DrawableObject) -> bool {
        let mut changed = false;
        if let Some(name) = &self.name {
            object.name = name.clone();
            changed = true;
        }
        if object.is_locked() || !self.changes_transform() {
            return changed;
        }
        if let Some(left) = self.left {
            object.transform.left = left;
        }
        if let Some(top) = self.top {
            object.transform.top = top;
        }
        // A group's box follows its children.
        if !object.is_group() {
            if let Some(width) = self.width {
                object.shape.set_width(unscale(width, object.transform.scale_x));
            }
            if let Some(height) = self.height {
                object.shape.set_height(unscale(height, object.transform.scale_y));
            }
        }
        match &mut object.shape {
            Shape::Circle(circle) => {
                if let Some(radius) = self.radius {
                    circle.radius = radius.max(0.0);
                }
            }
            Shape::Ellipse(ellipse) => {
                if let Some(rx) = self.rx {
                    ellipse.rx = rx.max(0.0);
                }
                if let Some(ry) = self.ry {
                    ellipse.ry = ry.max(0.0);
                }
            }
            _ => {}
        }
        if let Some(angle) = self.angle {
            object.rotate_about_center(angle % 360.0);
        }
        true
    }

    /// Apply paint and text fields. Returns `true` if anything was written.
    pub fn apply_style(&self, object: &mut DrawableObject) -> bool {
        if !self.changes_style() {
            return false;
        }
        let style = &mut object.style;
        if let Some(opacity) = self.opacity {
            let opacity = opacity.clamp(0.0, 1.0);
            if object.visible {
                style.opacity = opacity;
            } else {
                object.saved_opacity = Some(opacity);
            }
        }
        if let Some(fill) = self.fill {
            style.fill = fill;
        }
        if let Some(stroke) = self.stroke {
            style.stroke = stroke;
        }
        if let Some(width) = self.stroke_width {
            style.stroke_width = width.max(0.0);
        }
        if let Some(cap) = self.line_cap {
            style.line_cap = cap;
        }
        if let Some(join) = self.line_join {
            style.line_join = join;
        }
        if let Some(dash) = &self.dash {
            style.dash = dash.clone();
        }
        if let Shape::TextBox(text) = &mut object.shape {
            if let Some(content) = &self.text {
                text.text = content.clone();
            }
            if let Some(size) = self.font_size {
                text.font_size = size.max(1.0);
            }
            if let Some(family) = &self.font_family {
                text.font_family = family.clone();
            }
            if let Some(align) = self.text_align {
                text.text_align = align;
            }
        }
        true
    }
}

fn unscale(value: f64, scale: f64) -> f64 {
    if scale.abs() > f64::EPSILON { value / scale } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;
    use kurbo::Size;

    #[test]
    fn test_size_divided_by_scale() {
        let mut object = factory::rect(10.0, 10.0);
        object.transform.scale_x = 2.0;
        object.transform.scale_y = 4.0;
        let patch = ObjectPatch {
            width: Some(100.0),
            height: Some(100.0),
            ..ObjectPatch::default()
        };
        assert!(patch.apply_geometry(&mut object));
        assert_eq!(object.size(), Size::new(50.0, 25.0));
        assert_eq!(object.scaled_size(), Size::new(100.0, 100.0));
    }

    #[test]
    fn test_group_ignores_size_fields() {
        let child = factory::rect(30.0, 30.0);
        let mut group = DrawableObject::new(Shape::Group(crate::shapes::Group::new(
            vec![child.clone()],
            Size::new(30.0, 30.0),
        )));
        let patch = ObjectPatch {
            left: Some(15.0),
            width: Some(300.0),
            height: Some(90.0),
            ..ObjectPatch::default()
        };
        assert!(patch.apply_geometry(&mut group));
        assert_eq!(group.size(), Size::new(30.0, 30.0));
        assert_eq!(group.transform.left, 15.0);
        let kept = &group.shape.as_group().unwrap().children()[0];
        assert_eq!(kept.size(), child.size());
    }

    #[test]
    fn test_angle_wraps_and_keeps_center() {
        let mut object = factory::rect(40.0, 20.0);
        object.set_position(100.0, 100.0);
        let center = object.center();
        let patch = ObjectPatch {
            angle: Some(450.0),
            ..ObjectPatch::default()
        };
        patch.apply_geometry(&mut object);
        assert!((object.transform.angle - 90.0).abs() < 1e-9);
        assert!(object.center().distance(center) < 1e-9);
    }

    #[test]
    fn test_locked_rejects_geometry_not_style() {
        let mut object = factory::rect(10.0, 10.0);
        object.locked = true;
        let patch = ObjectPatch {
            left: Some(50.0),
            fill: Some(SerializableColor::red()),
            ..ObjectPatch::default()
        };
        assert!(!patch.apply_geometry(&mut object));
        assert!(patch.apply_style(&mut object));
        assert_eq!(object.transform.left, 0.0);
        assert_eq!(object.style.fill, SerializableColor::red());
    }

    #[test]
    fn test_opacity_on_hidden_object_is_stored() {
        let mut object = factory::rect(10.0, 10.0);
        object.set_visible(false);
        let patch = ObjectPatch {
            opacity: Some(1.7),
            ..ObjectPatch::default()
        };
        patch.apply_style(&mut object);
        assert_eq!(object.effective_opacity(), 0.0);
        object.set_visible(true);
        assert_eq!(object.style.opacity, 1.0);
    }

    #[test]
    fn test_text_fields_only_touch_text_boxes() {
        let patch = ObjectPatch {
            text: Some("Hello".into()),
            font_size: Some(32.0),
            ..ObjectPatch::default()
        };
        let mut text = factory::textbox("Edit Text");
        patch.apply_style(&mut text);
        let Shape::TextBox(body) = &text.shape else {
            panic!("expected a text box");
        };
        assert_eq!(body.text, "Hello");
        assert_eq!(body.font_size, 32.0);

        let mut rect = factory::rect(1.0, 1.0);
        let before = rect.clone();
        patch.apply_style(&mut rect);
        assert_eq!(rect, before);
    }

    #[test]
    fn test_circle_radius() {
        let mut circle = factory::circle(5.0);
        let patch = ObjectPatch {
            radius: Some(12.0),
            ..ObjectPatch::default()
        };
        patch.apply_geometry(&mut circle);
        assert_eq!(circle.size(), Size::new(24.0, 24.0));
    }
}
