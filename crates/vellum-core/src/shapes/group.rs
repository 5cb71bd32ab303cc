//! Group shape for combining multiple objects.

use super::{ObjectId, ShapeGeometry};
use crate::object::DrawableObject;
use kurbo::{BezPath, Size};
use serde::{Deserialize, Serialize};

/// An ordered list of child objects that move and stack as one unit.
///
/// Child transforms are stored in the group's local space: the top-left of
/// the group's box is the origin. Children are ordered back to front.
/// Groups can contain other groups, enabling nested hierarchies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Box width in local units.
    pub width: f64,
    /// Box height in local units.
    pub height: f64,
    /// Child objects, back to front.
    pub(crate) children: Vec<DrawableObject>,
}

impl Group {
    /// Create a group from children already expressed in local space.
    pub fn new(children: Vec<DrawableObject>, size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            children,
        }
    }

    /// Get the children of this group.
    pub fn children(&self) -> &[DrawableObject] {
        &self.children
    }

    /// Get mutable access to children.
    pub(crate) fn children_mut(&mut self) -> &mut Vec<DrawableObject> {
        &mut self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Dissolve this group and return its children (still in local space).
    pub fn ungroup(self) -> Vec<DrawableObject> {
        self.children
    }

    /// All descendant ids, depth first (not including the group itself).
    pub fn descendant_ids(&self) -> Vec<ObjectId> {
        let mut ids = Vec::new();
        for child in &self.children {
            ids.push(child.id());
            if let Some(group) = child.shape.as_group() {
                ids.extend(group.descendant_ids());
            }
        }
        ids
    }
}

impl ShapeGeometry for Group {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for child in &self.children {
            path.extend(child.path());
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;
    use kurbo::Shape as KurboShape;

    fn rect_at(left: f64, top: f64, width: f64, height: f64) -> DrawableObject {
        let mut object = factory::rect(width, height);
        object.transform.left = left;
        object.transform.top = top;
        object
    }

    #[test]
    fn test_group_creation() {
        let group = Group::new(
            vec![rect_at(0.0, 0.0, 100.0, 50.0), rect_at(200.0, 200.0, 50.0, 100.0)],
            Size::new(250.0, 300.0),
        );
        assert_eq!(group.len(), 2);
        assert_eq!(group.size(), Size::new(250.0, 300.0));
    }

    #[test]
    fn test_nested_descendants() {
        let inner_child = rect_at(0.0, 0.0, 10.0, 10.0);
        let inner_child_id = inner_child.id();
        let inner = DrawableObject::new(crate::shapes::Shape::Group(Group::new(
            vec![inner_child],
            Size::new(10.0, 10.0),
        )));
        let inner_id = inner.id();
        let sibling = rect_at(20.0, 20.0, 10.0, 10.0);
        let sibling_id = sibling.id();

        let outer = Group::new(vec![inner, sibling], Size::new(30.0, 30.0));
        assert_eq!(outer.descendant_ids(), vec![inner_id, inner_child_id, sibling_id]);
    }

    #[test]
    fn test_group_path_covers_children() {
        let group = Group::new(
            vec![rect_at(0.0, 0.0, 100.0, 50.0), rect_at(200.0, 200.0, 50.0, 100.0)],
            Size::new(250.0, 300.0),
        );
        let bounds = group.to_path().bounding_box();
        assert!((bounds.x1 - 250.0).abs() < 1e-9);
        assert!((bounds.y1 - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_ungroup_returns_children() {
        let group = Group::new(
            vec![rect_at(0.0, 0.0, 100.0, 50.0), rect_at(200.0, 200.0, 50.0, 100.0)],
            Size::new(250.0, 300.0),
        );
        assert_eq!(group.ungroup().len(), 2);
    }
}
