//! Drawable objects: the atomic scene elements.

use crate::geometry::{self, normalize_angle};
use crate::shapes::{ObjectId, Shape, ShapeKind, ShapeStyle};
use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placement of an object in its parent's space.
///
/// The object's local box spans `(0, 0)..(width, height)`; the transform
/// scales it, rotates it about its top-left corner, then moves that corner to
/// `(left, top)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub left: f64,
    pub top: f64,
    /// Rotation in degrees, kept in `[0, 360)`.
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Transform {
    /// An unrotated, unscaled transform at the given position.
    pub fn at(left: f64, top: f64) -> Self {
        Self {
            left,
            top,
            ..Self::default()
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn affine(&self) -> Affine {
        geometry::compose(self.left, self.top, self.angle, self.scale_x, self.scale_y)
    }

    /// Recover a transform from a matrix. Shear cannot be represented and is
    /// dropped with a warning.
    pub fn from_affine(affine: Affine) -> Self {
        let parts = geometry::decompose(affine);
        if parts.has_skew() {
            log::warn!("Dropping skew {:.6} while decomposing transform", parts.skew);
        }
        Self {
            left: parts.left,
            top: parts.top,
            angle: parts.angle,
            scale_x: parts.scale_x,
            scale_y: parts.scale_y,
        }
    }
}

fn default_visible() -> bool {
    true
}

/// An atomic or composite visual element placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawableObject {
    /// Stable identifier. Nil means "not assigned yet".
    #[serde(default)]
    pub(crate) id: ObjectId,
    /// Display name, defaults to the kind tag.
    #[serde(default)]
    pub name: String,
    /// Kind-specific geometry.
    pub shape: Shape,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub style: ShapeStyle,
    /// Dense stacking index among siblings, owned by the scene graph.
    #[serde(default)]
    pub(crate) z_index: usize,
    #[serde(default = "default_visible")]
    pub(crate) visible: bool,
    /// Locked objects reject transform-producing operations.
    #[serde(default)]
    pub locked: bool,
    /// Opacity to restore when a hidden object is shown again.
    #[serde(skip)]
    pub(crate) saved_opacity: Option<f64>,
}

impl DrawableObject {
    /// Create an object with a fresh id, default style and identity transform.
    pub fn new(shape: Shape) -> Self {
        Self::with_id(Uuid::new_v4(), shape)
    }

    /// Create an object with a specific id.
    pub fn with_id(id: ObjectId, shape: Shape) -> Self {
        Self {
            id,
            name: shape.kind().tag().to_string(),
            shape,
            transform: Transform::default(),
            style: ShapeStyle::default(),
            z_index: 0,
            visible: true,
            locked: false,
            saved_opacity: None,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn z_index(&self) -> usize {
        self.z_index
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_group(&self) -> bool {
        self.shape.is_group()
    }

    /// Intrinsic size, before scale.
    pub fn size(&self) -> Size {
        self.shape.size()
    }

    /// Size after scale: `width * scale_x`, `height * scale_y`.
    pub fn scaled_size(&self) -> Size {
        let size = self.size();
        Size::new(
            size.width * self.transform.scale_x,
            size.height * self.transform.scale_y,
        )
    }

    pub fn affine(&self) -> Affine {
        self.transform.affine()
    }

    /// Unrotated box `(left, top)..(left + w*sx, top + h*sy)`.
    ///
    /// This is the rectangle edge snapping and alignment work with.
    pub fn extent(&self) -> Rect {
        let size = self.scaled_size();
        Rect::new(
            self.transform.left,
            self.transform.top,
            self.transform.left + size.width,
            self.transform.top + size.height,
        )
    }

    /// Axis-aligned bounds of the rotated box in the parent's space.
    pub fn bounds(&self) -> Rect {
        self.affine().transform_rect_bbox(self.size().to_rect())
    }

    /// Center of the box in the parent's space.
    pub fn center(&self) -> Point {
        let size = self.size();
        self.affine() * Point::new(size.width / 2.0, size.height / 2.0)
    }

    /// Outline in the parent's space.
    pub fn path(&self) -> BezPath {
        self.affine() * self.shape.to_path()
    }

    /// Check whether a point in the parent's space falls inside the box.
    pub fn contains_point(&self, point: Point, tolerance: f64) -> bool {
        let affine = self.affine();
        if affine.determinant().abs() < f64::EPSILON {
            return false;
        }
        let local = affine.inverse() * point;
        let size = self.size();
        // Tolerance is in parent units; map it into the local box per axis.
        let tx = tolerance / self.transform.scale_x.abs().max(f64::EPSILON);
        let ty = tolerance / self.transform.scale_y.abs().max(f64::EPSILON);
        local.x >= -tx && local.x <= size.width + tx && local.y >= -ty && local.y <= size.height + ty
    }

    pub fn set_position(&mut self, left: f64, top: f64) {
        self.transform.left = left;
        self.transform.top = top;
    }

    /// Rotate to an absolute angle while keeping the box center fixed.
    pub fn rotate_about_center(&mut self, angle: f64) {
        let before = self.center();
        self.transform.angle = normalize_angle(angle);
        let after = self.center();
        let shift: Vec2 = before - after;
        self.transform.left += shift.x;
        self.transform.top += shift.y;
    }

    /// Show or hide the object. Returns `true` if the state changed.
    ///
    /// Hiding zeroes the opacity and remembers the previous value; showing
    /// restores it.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        if self.visible == visible {
            return false;
        }
        if visible {
            self.style.opacity = self.saved_opacity.take().unwrap_or(1.0);
        } else {
            let current = self.style.opacity;
            self.saved_opacity = Some(if current > 0.0 { current } else { 1.0 });
            self.style.opacity = 0.0;
        }
        self.visible = visible;
        true
    }

    pub fn toggle_visibility(&mut self) {
        self.set_visible(!self.visible);
    }

    /// Opacity the surface should paint with.
    pub fn effective_opacity(&self) -> f64 {
        if self.visible { self.style.opacity } else { 0.0 }
    }

    /// Opacity the user set, regardless of visibility.
    pub fn stored_opacity(&self) -> f64 {
        if self.visible {
            self.style.opacity
        } else {
            self.saved_opacity.unwrap_or(1.0)
        }
    }

    /// Fold the scale into the intrinsic size and reset the stroke width.
    ///
    /// Groups are left untouched; returns `false` for them.
    pub fn bake_scale(&mut self) -> bool {
        if self.is_group() {
            return false;
        }
        let scaled = self.scaled_size();
        self.shape.set_width(scaled.width.abs());
        self.shape.set_height(scaled.height.abs());
        self.transform.scale_x = 1.0;
        self.transform.scale_y = 1.0;
        self.style.stroke_width = 1.0;
        true
    }

    /// Ids of every object nested inside this one (empty unless a group).
    pub fn descendant_ids(&self) -> Vec<ObjectId> {
        self.shape
            .as_group()
            .map(|group| group.descendant_ids())
            .unwrap_or_default()
    }

    /// Assign fresh ids to this object and everything nested in it.
    /// Used when duplicating objects.
    pub fn regenerate_ids(&mut self) {
        self.id = Uuid::new_v4();
        if let Some(group) = self.shape.as_group_mut() {
            for child in group.children_mut() {
                child.regenerate_ids();
            }
        }
    }

    /// Copy suitable for persisting: hidden objects carry their stored
    /// opacity and no transient state.
    pub(crate) fn to_persisted(&self) -> Self {
        let mut copy = self.clone();
        copy.style.opacity = self.stored_opacity();
        copy.saved_opacity = None;
        if let Some(group) = copy.shape.as_group_mut() {
            for child in group.children_mut() {
                *child = child.to_persisted();
            }
        }
        copy
    }

    /// Re-apply the hidden state after loading a persisted object.
    pub(crate) fn restore_loaded(&mut self) {
        if !self.visible {
            self.visible = true;
            self.set_visible(false);
        }
        if let Some(group) = self.shape.as_group_mut() {
            for child in group.children_mut() {
                child.restore_loaded();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;

    #[test]
    fn test_new_object_defaults() {
        let object = factory::rect(100.0, 50.0);
        assert!(!object.id().is_nil());
        assert_eq!(object.name, "rect");
        assert!(object.is_visible());
        assert!(!object.is_locked());
        assert_eq!(object.transform, Transform::default());
    }

    #[test]
    fn test_extent_uses_scale() {
        let mut object = factory::rect(100.0, 50.0);
        object.transform = Transform {
            left: 10.0,
            top: 20.0,
            scale_x: 2.0,
            scale_y: 0.5,
            ..Transform::default()
        };
        assert_eq!(object.extent(), Rect::new(10.0, 20.0, 210.0, 45.0));
    }

    #[test]
    fn test_bounds_of_rotated_object() {
        let mut object = factory::rect(100.0, 50.0);
        object.transform.angle = 90.0;
        let bounds = object.bounds();
        assert!((bounds.x0 + 50.0).abs() < 1e-9);
        assert!((bounds.x1 - 0.0).abs() < 1e-9);
        assert!((bounds.y1 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_about_center_keeps_center() {
        let mut object = factory::rect(100.0, 50.0);
        object.set_position(30.0, 40.0);
        let before = object.center();
        object.rotate_about_center(405.0);
        assert!((object.transform.angle - 45.0).abs() < 1e-9);
        let after = object.center();
        assert!(before.distance(after) < 1e-9);
    }

    #[test]
    fn test_contains_point_rotated() {
        let mut object = factory::rect(100.0, 10.0);
        object.transform.angle = 90.0;
        // The box now extends downwards along +y and to the left along -x.
        assert!(object.contains_point(Point::new(-5.0, 50.0), 0.0));
        assert!(!object.contains_point(Point::new(50.0, 5.0), 0.0));
    }

    #[test]
    fn test_visibility_restores_opacity() {
        let mut object = factory::rect(10.0, 10.0);
        object.style.opacity = 0.4;

        assert!(object.set_visible(false));
        assert!(!object.set_visible(false));
        assert_eq!(object.effective_opacity(), 0.0);
        assert_eq!(object.style.opacity, 0.0);
        assert!((object.stored_opacity() - 0.4).abs() < f64::EPSILON);

        object.toggle_visibility();
        assert!(object.is_visible());
        assert!((object.style.opacity - 0.4).abs() < f64::EPSILON);
        assert!(object.saved_opacity.is_none());
    }

    #[test]
    fn test_hiding_transparent_object_restores_full_opacity() {
        let mut object = factory::rect(10.0, 10.0);
        object.style.opacity = 0.0;
        object.set_visible(false);
        object.set_visible(true);
        assert_eq!(object.style.opacity, 1.0);
    }

    #[test]
    fn test_persisted_copy_carries_stored_opacity() {
        let mut object = factory::rect(10.0, 10.0);
        object.style.opacity = 0.7;
        object.set_visible(false);

        let persisted = object.to_persisted();
        assert!(!persisted.is_visible());
        assert!((persisted.style.opacity - 0.7).abs() < f64::EPSILON);
        assert!(persisted.saved_opacity.is_none());

        let mut loaded = persisted;
        loaded.restore_loaded();
        assert_eq!(loaded.effective_opacity(), 0.0);
        assert!((loaded.stored_opacity() - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bake_scale() {
        let mut object = factory::rect(100.0, 50.0);
        object.transform.scale_x = 2.0;
        object.transform.scale_y = 3.0;
        assert!(object.bake_scale());
        assert_eq!(object.size(), Size::new(200.0, 150.0));
        assert_eq!(object.transform.scale_x, 1.0);
        assert_eq!(object.style.stroke_width, 1.0);
    }

    #[test]
    fn test_regenerate_ids() {
        let mut object = factory::rect(10.0, 10.0);
        let old = object.id();
        object.regenerate_ids();
        assert_ne!(object.id(), old);
    }

    #[test]
    fn test_transform_affine_roundtrip() {
        let transform = Transform {
            left: 12.0,
            top: -4.0,
            angle: 33.0,
            scale_x: 1.25,
            scale_y: 0.8,
        };
        let back = Transform::from_affine(transform.affine());
        assert!((back.left - 12.0).abs() < 1e-9);
        assert!((back.top + 4.0).abs() < 1e-9);
        assert!((back.angle - 33.0).abs() < 1e-9);
        assert!((back.scale_x - 1.25).abs() < 1e-9);
        assert!((back.scale_y - 0.8).abs() < 1e-9);
    }
}
